//! Prompt templates for personality classification

use std::collections::HashMap;

use crate::models::Message;

/// Template for generating prompts
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
    variables: Vec<String>,
}

impl PromptTemplate {
    /// Create a new prompt template
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        let variables = extract_variables(&template);
        Self {
            template,
            variables,
        }
    }

    /// Fill in the template with variables
    #[must_use]
    pub fn render(&self, values: &HashMap<String, String>) -> String {
        let mut result = self.template.clone();
        for var in &self.variables {
            if let Some(value) = values.get(var) {
                result = result.replace(&format!("{{{{{var}}}}}"), value);
            }
        }
        result
    }

    /// Render a template that takes a single variable
    #[must_use]
    pub fn render_one(&self, name: &str, value: impl Into<String>) -> String {
        let values = HashMap::from([(name.to_string(), value.into())]);
        self.render(&values)
    }

    /// Get required variables
    #[must_use]
    pub fn variables(&self) -> &[String] {
        &self.variables
    }
}

/// Extract `{{name}}` placeholders in order of first use
fn extract_variables(template: &str) -> Vec<String> {
    let mut variables = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            break;
        };
        let name = after[..close].trim();
        if !name.is_empty() && !variables.iter().any(|v| v == name) {
            variables.push(name.to_string());
        }
        rest = &after[close + 2..];
    }

    variables
}

/// Render chunk messages as `participant - text` lines
pub fn render_transcript(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| format!("{} - {}", m.participant, m.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Standard personality prompt templates
pub struct MbtiPrompts;

impl MbtiPrompts {
    /// Per-chunk classification prompt; takes `{{transcript}}`
    #[must_use]
    pub fn chunk_classification() -> PromptTemplate {
        PromptTemplate::new(
            r"Analyze the following chat conversation chunk and predict the MBTI personality types of the participants. Provide only the MBTI type for each participant:

{{transcript}}

Answer with one line per participant in the form `name: TYPE`, or with a JSON object mapping each participant name exactly as written above to their four-letter type.",
        )
    }

    /// Short prose description of a final type; takes `{{mbti_type}}`
    #[must_use]
    pub fn type_description() -> PromptTemplate {
        PromptTemplate::new(
            r"Provide a short description of the MBTI personality type {{mbti_type}}. Describe how a person of this type typically communicates in a group chat, in three or four sentences.",
        )
    }
}
