//! History and configuration display handlers

use crate::cli::output::print_history;
use crate::cli::output::print_warning;
use crate::database::Database;
use crate::history::HistoryStore;
use crate::AppConfig;
use crate::Result;

pub async fn handle_history_command(config: &AppConfig, username: &str) -> Result<()> {
    let database = Database::from_config(config).await?;
    let entries = database.list_for_user(username).await?;

    if entries.is_empty() {
        print_warning(&format!("No history for {username}"));
        return Ok(());
    }

    print_history(username, &entries);
    Ok(())
}

pub fn handle_config_command(config: &AppConfig) -> Result<()> {
    println!("📋 Effective configuration (secrets masked):\n");
    println!("{}", config.to_masked_toml()?);
    Ok(())
}
