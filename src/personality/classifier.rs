//! External chunk classifier seam
//!
//! The pipeline only needs "messages in, labels out, may fail". The
//! production implementation talks to an LLM; tests plug in their own.

use std::sync::Arc;

use async_trait::async_trait;

use super::votes::ChunkResponse;
use crate::llm::prompts::render_transcript;
use crate::llm::GenerationParams;
use crate::llm::LlmService;
use crate::llm::MbtiPrompts;
use crate::models::ChunkRange;
use crate::models::Message;
use crate::ChatLensError;
use crate::Result;

/// Everything a classifier needs to label one chunk
#[derive(Debug, Clone)]
pub struct ClassificationRequest {
    pub range: ChunkRange,
    pub messages: Vec<Message>,
    /// Fully rendered prompt
    pub prompt: String,
}

impl ClassificationRequest {
    pub fn new(range: ChunkRange, messages: &[Message]) -> Self {
        let prompt = MbtiPrompts::chunk_classification()
            .render_one("transcript", render_transcript(messages));
        Self {
            range,
            messages: messages.to_vec(),
            prompt,
        }
    }
}

/// Labels the participants of one chunk
#[async_trait]
pub trait ChunkClassifier: Send + Sync {
    /// Classify a chunk; an `Err` marks the chunk as failed for this run only
    async fn classify(&self, request: &ClassificationRequest) -> Result<ChunkResponse>;

    /// Free-form prose for a final type; `None` when unsupported
    async fn describe(&self, _mbti_type: &str) -> Result<Option<String>> {
        Ok(None)
    }

    fn name(&self) -> &str;
}

#[async_trait]
impl<T: ChunkClassifier + ?Sized> ChunkClassifier for Arc<T> {
    async fn classify(&self, request: &ClassificationRequest) -> Result<ChunkResponse> {
        (**self).classify(request).await
    }

    async fn describe(&self, mbti_type: &str) -> Result<Option<String>> {
        (**self).describe(mbti_type).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Classifier backed by a chat completion model
pub struct LlmClassifier {
    llm: Arc<LlmService>,
    structured_output: bool,
}

impl LlmClassifier {
    pub const fn new(llm: Arc<LlmService>, structured_output: bool) -> Self {
        Self {
            llm,
            structured_output,
        }
    }
}

#[async_trait]
impl ChunkClassifier for LlmClassifier {
    async fn classify(&self, request: &ClassificationRequest) -> Result<ChunkResponse> {
        let params = GenerationParams {
            json_mode: self.structured_output,
            ..GenerationParams::default()
        };
        let content = self
            .llm
            .generate_with_params(&request.prompt, params)
            .await?;
        parse_response(request.range, &content)
    }

    async fn describe(&self, mbti_type: &str) -> Result<Option<String>> {
        let prompt = MbtiPrompts::type_description().render_one("mbti_type", mbti_type);
        let params = GenerationParams {
            temperature: 0.7,
            json_mode: false,
        };
        let text = self.llm.generate_with_params(&prompt, params).await?;
        Ok(Some(text.trim().to_string()))
    }

    fn name(&self) -> &str {
        self.llm.model()
    }
}

/// A blank completion is a failed chunk, never a cacheable answer
fn parse_response(range: ChunkRange, content: &str) -> Result<ChunkResponse> {
    if content.trim().is_empty() {
        return Err(ChatLensError::Classifier(format!(
            "empty completion for chunk {range}"
        )));
    }
    Ok(ChunkResponse::from_content(content))
}
