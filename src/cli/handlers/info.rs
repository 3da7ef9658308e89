//! Information display handlers (stats, config)

use std::path::Path;

use crate::cli::output::*;
use crate::transcript::read_transcript;
use crate::transcript::ChatDialect;
use crate::AppConfig;
use crate::Result;

/// Handle stats command
pub async fn handle_stats_command(file: &Path, format: ChatDialect) -> Result<()> {
    let store = read_transcript(file, format)?;
    print_message_stats(&store);
    Ok(())
}

/// Handle config command
pub async fn handle_config_command(config: &AppConfig) -> Result<()> {
    print_config(config);
    Ok(())
}
