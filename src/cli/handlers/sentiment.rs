//! Weekly sentiment handler

use std::path::Path;

use crate::cli::output::*;
use crate::sentiment::SentimentLexicon;
use crate::transcript::read_transcript;
use crate::transcript::ChatDialect;
use crate::AppConfig;
use crate::Result;

/// Handle sentiment command
pub async fn handle_sentiment_command(
    config: &AppConfig,
    file: &Path,
    format: ChatDialect,
    json: bool,
) -> Result<()> {
    let store = read_transcript(file, format)?;

    let custom;
    let lexicon = match &config.analysis.sentiment_lexicon {
        Some(path) => {
            custom = SentimentLexicon::from_file(path)?;
            &custom
        }
        None => SentimentLexicon::bundled(),
    };
    let weekly = lexicon.weekly_sentiment(&store);

    if json {
        println!("{}", serde_json::to_string_pretty(&weekly)?);
        return Ok(());
    }

    print_info(&format!(
        "Weekly sentiment for {} participants ({} lexicon words)",
        weekly.len(),
        lexicon.len()
    ));
    println!();
    print_sentiment_report(&weekly);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChatLensError;

    #[tokio::test]
    async fn test_configured_lexicon_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let chat = dir.path().join("chat.txt");
        std::fs::write(&chat, "[7/29/24, 3:07:00 PM] Andrew: Yep\n").unwrap();
        let lexicon = dir.path().join("lexicon.txt");
        std::fs::write(&lexicon, "no scores here\n").unwrap();

        let mut config = AppConfig::default();
        config.analysis.sentiment_lexicon = Some(lexicon);
        let result =
            handle_sentiment_command(&config, &chat, ChatDialect::WhatsappBracket, true).await;
        assert!(matches!(result, Err(ChatLensError::ConfigError(_))));

        config.analysis.sentiment_lexicon = None;
        handle_sentiment_command(&config, &chat, ChatDialect::WhatsappBracket, true)
            .await
            .unwrap();
    }
}
