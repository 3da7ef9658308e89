use chatlens::cli::*;
use chatlens::config::AppConfig;
use chatlens::Result;
use clap::Parser;
use tracing::debug;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::load()?,
    };

    // Initialize logging
    if cli.verbose {
        chatlens::logging::init_logging_with_level("debug")?;
    } else {
        chatlens::logging::init_logging_with_config(&config)?;
    }
    debug!("Configuration loaded successfully");

    // Execute the requested command
    match cli.command {
        Commands::Mbti {
            file,
            format,
            target_chunks,
            min_messages,
            alpha,
            from,
            to,
            describe,
            json,
        } => {
            let overrides = MbtiOverrides {
                target_chunks,
                min_messages,
                alpha,
                describe,
            };
            handle_mbti_command(&config, &file, format, from, to, &overrides, json).await?;
        }
        Commands::Words {
            file,
            format,
            top,
            size_ratio,
            json,
        } => {
            handle_words_command(&config, &file, format, top, size_ratio, json).await?;
        }
        Commands::Stats { file, format } => {
            handle_stats_command(&file, format).await?;
        }
        Commands::Sentiment { file, format, json } => {
            handle_sentiment_command(&config, &file, format, json).await?;
        }
        Commands::Config => {
            handle_config_command(&config).await?;
        }
    }

    Ok(())
}
