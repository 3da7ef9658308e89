use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

/// Environment variable consulted when `llm.llm_key` is left empty
pub const LLM_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub backtrace: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_endpoint")]
    pub llm_endpoint: String,
    #[serde(default)]
    pub llm_key: String,
    #[serde(default = "default_llm_model")]
    pub llm_model: String,
    /// Ask the provider for a JSON object instead of free text
    #[serde(default = "default_structured_output")]
    pub structured_output: bool,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

pub(crate) fn default_llm_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

pub(crate) fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

pub(crate) const fn default_structured_output() -> bool {
    true
}

pub(crate) const fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            llm_endpoint: default_llm_endpoint(),
            llm_key: String::new(),
            llm_model: default_llm_model(),
            structured_output: default_structured_output(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_target_chunk_count")]
    pub target_chunk_count: usize,
    #[serde(default = "default_min_messages_per_participant")]
    pub min_messages_per_participant: usize,
    /// Axes whose binomial p-value is >= alpha are reported as undecided
    #[serde(default = "default_significance_alpha")]
    pub significance_alpha: f64,
    #[serde(default = "default_cache_suffix")]
    pub cache_suffix: String,
    /// Rewrite the cache file after this many fresh results (0 = end of run only)
    #[serde(default)]
    pub cache_checkpoint_every: usize,
    #[serde(default = "default_word_cloud_size_ratio")]
    pub word_cloud_size_ratio: f64,
    #[serde(default = "default_top_words")]
    pub top_words: usize,
    /// Full AFINN word list (`word<TAB>score`); the bundled abridged list is used when unset
    #[serde(default)]
    pub sentiment_lexicon: Option<PathBuf>,
}

pub(crate) const fn default_target_chunk_count() -> usize {
    100
}

pub(crate) const fn default_min_messages_per_participant() -> usize {
    3
}

pub(crate) const fn default_significance_alpha() -> f64 {
    0.05
}

pub(crate) fn default_cache_suffix() -> String {
    "_cache.json".to_string()
}

pub(crate) const fn default_word_cloud_size_ratio() -> f64 {
    1.5
}

pub(crate) const fn default_top_words() -> usize {
    30
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            target_chunk_count: default_target_chunk_count(),
            min_messages_per_participant: default_min_messages_per_participant(),
            significance_alpha: default_significance_alpha(),
            cache_suffix: default_cache_suffix(),
            cache_checkpoint_every: 0,
            word_cloud_size_ratio: default_word_cloud_size_ratio(),
            top_words: default_top_words(),
            sentiment_lexicon: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default config file path
    pub fn load() -> crate::Result<Self> {
        // Try to load from config.toml first, then fall back to config.example.toml
        if Path::new("config.toml").exists() {
            Self::from_file("config.toml")
        } else if Path::new("config.example.toml").exists() {
            tracing::warn!(
                "Using config.example.toml. Please create config.toml for production use."
            );
            Self::from_file("config.example.toml")
        } else {
            tracing::warn!("No config file found, using built-in defaults");
            Ok(Self::default())
        }
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> crate::Result<()> {
        let analysis = &self.analysis;
        if analysis.target_chunk_count == 0 {
            return Err(crate::ChatLensError::ConfigError(
                "analysis.target_chunk_count must be at least 1".to_string(),
            ));
        }
        if analysis.min_messages_per_participant == 0 {
            return Err(crate::ChatLensError::ConfigError(
                "analysis.min_messages_per_participant must be at least 1".to_string(),
            ));
        }
        if !(analysis.significance_alpha > 0.0 && analysis.significance_alpha < 1.0) {
            return Err(crate::ChatLensError::ConfigError(format!(
                "analysis.significance_alpha must be in (0, 1), got {}",
                analysis.significance_alpha
            )));
        }
        if url::Url::parse(&self.llm.llm_endpoint).is_err() {
            return Err(crate::ChatLensError::ConfigError(format!(
                "llm.llm_endpoint is not a valid URL: {}",
                self.llm.llm_endpoint
            )));
        }
        Ok(())
    }

    /// Get LLM endpoint
    pub fn llm_endpoint(&self) -> &str {
        &self.llm.llm_endpoint
    }

    /// Get LLM key, falling back to the environment when the file leaves it empty
    pub fn llm_key(&self) -> String {
        if self.llm.llm_key.is_empty() {
            std::env::var(LLM_KEY_ENV).unwrap_or_default()
        } else {
            self.llm.llm_key.clone()
        }
    }

    /// Get LLM model
    pub fn llm_model(&self) -> &str {
        &self.llm.llm_model
    }

    /// Get target chunk count
    pub fn target_chunk_count(&self) -> usize {
        self.analysis.target_chunk_count
    }

    /// Get minimum messages per participant per chunk
    pub fn min_messages_per_participant(&self) -> usize {
        self.analysis.min_messages_per_participant
    }

    /// Get significance threshold
    pub fn significance_alpha(&self) -> f64 {
        self.analysis.significance_alpha
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                backtrace: true,
            },
            llm: LlmConfig::default(),
            analysis: AnalysisConfig::default(),
        }
    }
}
