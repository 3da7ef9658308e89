//! MBTI inference handler

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::cli::output::*;
use crate::llm::LlmService;
use crate::models::MessageStore;
use crate::personality::cache_path_for;
use crate::personality::ChunkCache;
use crate::personality::LlmClassifier;
use crate::personality::MbtiPipeline;
use crate::personality::PipelineOptions;
use crate::transcript::read_transcript;
use crate::transcript::ChatDialect;
use crate::AppConfig;
use crate::ChatLensError;
use crate::Result;

/// Overrides for the `[analysis]` section, taken from the command line
#[derive(Debug, Clone, Default)]
pub struct MbtiOverrides {
    pub target_chunks: Option<usize>,
    pub min_messages: Option<usize>,
    pub alpha: Option<f64>,
    pub describe: bool,
}

impl MbtiOverrides {
    /// Merge into the config-derived options, re-checking ranges
    pub fn apply(&self, mut options: PipelineOptions) -> Result<PipelineOptions> {
        if let Some(target) = self.target_chunks {
            if target == 0 {
                return Err(ChatLensError::InvalidInput(
                    "--target-chunks must be at least 1".to_string(),
                ));
            }
            options.target_chunk_count = target;
        }
        if let Some(min) = self.min_messages {
            if min == 0 {
                return Err(ChatLensError::InvalidInput(
                    "--min-messages must be at least 1".to_string(),
                ));
            }
            options.min_messages_per_participant = min;
        }
        if let Some(alpha) = self.alpha {
            if !(alpha > 0.0 && alpha < 1.0) {
                return Err(ChatLensError::InvalidInput(format!(
                    "--alpha must be in (0, 1), got {alpha}"
                )));
            }
            options.significance_alpha = alpha;
        }
        options.describe = self.describe;
        Ok(options)
    }
}

/// Load a transcript and narrow it to `[from, to)`
pub fn load_message_range(
    file: &Path,
    format: ChatDialect,
    from: usize,
    to: Option<usize>,
) -> Result<MessageStore> {
    let store = read_transcript(file, format)?;
    if from == 0 && to.is_none() {
        return Ok(store);
    }

    let sliced = store.sub_range(from, to);
    if sliced.is_empty() {
        return Err(ChatLensError::InvalidInput(format!(
            "message range {from}..{} selects nothing out of {} messages",
            to.map_or_else(String::new, |t| t.to_string()),
            store.len()
        )));
    }
    info!("Analysing messages {}..{} of {}", from, from + sliced.len(), store.len());
    Ok(sliced)
}

/// Handle mbti command
pub async fn handle_mbti_command(
    config: &AppConfig,
    file: &Path,
    format: ChatDialect,
    from: usize,
    to: Option<usize>,
    overrides: &MbtiOverrides,
    json: bool,
) -> Result<()> {
    let options = overrides.apply(PipelineOptions::from_config(config))?;
    let store = load_message_range(file, format, from, to)?;

    let llm = Arc::new(LlmService::new(config)?);
    let classifier = LlmClassifier::new(llm, config.llm.structured_output);
    let mut cache = ChunkCache::load(cache_path_for(file, &config.analysis.cache_suffix))?;

    if !json {
        print_info(&format!(
            "Analysing {} messages from {} participants",
            store.len(),
            store.participants().len()
        ));
    }

    let pipeline = MbtiPipeline::new(classifier, options);
    let report = pipeline.run(&store, &mut cache).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_mbti_report(&report);
        print_success(&format!("Cache saved to {}", cache.path().display()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply() {
        let overrides = MbtiOverrides {
            target_chunks: Some(20),
            alpha: Some(0.3),
            ..Default::default()
        };
        let options = overrides.apply(PipelineOptions::default()).unwrap();
        assert_eq!(options.target_chunk_count, 20);
        assert_eq!(options.min_messages_per_participant, 3);
        assert!((options.significance_alpha - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_overrides_reject_bad_alpha() {
        let overrides = MbtiOverrides {
            alpha: Some(1.5),
            ..Default::default()
        };
        assert!(matches!(
            overrides.apply(PipelineOptions::default()),
            Err(ChatLensError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_empty_message_range_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.txt");
        std::fs::write(
            &path,
            "[7/29/24, 3:06:05 PM] Matthieu: R u at the apart?\n[7/29/24, 3:07:00 PM] Andrew: Yep\n",
        )
        .unwrap();

        let store = load_message_range(&path, ChatDialect::WhatsappBracket, 1, None).unwrap();
        assert_eq!(store.len(), 1);
        assert!(matches!(
            load_message_range(&path, ChatDialect::WhatsappBracket, 5, None),
            Err(ChatLensError::InvalidInput(_))
        ));
    }
}
