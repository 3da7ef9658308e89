//! Unit tests for error handling
//!
//! Tests error types, conversions, and error message formatting.

#[cfg(test)]
mod tests {
    use std::io;

    use crate::errors::ChatLensError;

    // ====== Error Type Tests ======

    #[test]
    fn test_custom_error() {
        let error = ChatLensError::Custom("Test error message".to_string());
        let display = format!("{}", error);
        assert_eq!(display, "Test error message");
    }

    #[test]
    fn test_config_error() {
        let error = ChatLensError::ConfigError("alpha must be in (0, 1)".to_string());
        assert!(matches!(error, ChatLensError::ConfigError(_)));
        let display = format!("{}", error);
        assert!(display.contains("configuration"));
    }

    #[test]
    fn test_empty_transcript_error_names_the_file() {
        let error = ChatLensError::EmptyTranscript("_chat.txt".to_string());
        assert_eq!(
            error.to_string(),
            "No messages could be extracted from _chat.txt"
        );
    }

    #[test]
    fn test_classifier_error() {
        let error = ChatLensError::Classifier("response has no choices".to_string());
        assert!(matches!(error, ChatLensError::Classifier(_)));
        assert!(error.to_string().contains("no choices"));
    }

    // ====== Error Conversion Tests ======

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let err: ChatLensError = io_err.into();

        assert!(matches!(err, ChatLensError::Io(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: ChatLensError = json_err.into();

        assert!(matches!(err, ChatLensError::Serialization(_)));
    }

    #[test]
    fn test_error_from_toml() {
        let toml_err = toml::from_str::<toml::Value>("= broken").unwrap_err();
        let err: ChatLensError = toml_err.into();

        assert!(matches!(err, ChatLensError::TomlParsing(_)));
    }

    #[test]
    fn test_question_mark_propagation() {
        fn read_missing() -> crate::Result<String> {
            let content = std::fs::read_to_string("/definitely/not/here/chat.txt")?;
            Ok(content)
        }

        assert!(matches!(read_missing(), Err(ChatLensError::Io(_))));
    }
}
