use clap::Parser;
use helpdesk_rag::cli::handle_ask_command;
use helpdesk_rag::cli::handle_cluster_command;
use helpdesk_rag::cli::handle_config_command;
use helpdesk_rag::cli::handle_history_command;
use helpdesk_rag::cli::handle_init_command;
use helpdesk_rag::cli::handle_populate_command;
use helpdesk_rag::cli::handle_serve_api;
use helpdesk_rag::cli::Cli;
use helpdesk_rag::cli::Commands;
use helpdesk_rag::config::AppConfig;
use helpdesk_rag::Result;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging
    if cli.verbose {
        helpdesk_rag::logging::init_logging_with_level("debug")?;
    } else {
        helpdesk_rag::logging::init_logging_with_config(&config.logging)?;
    }
    info!("Configuration loaded successfully");

    // Execute the requested command
    match cli.command {
        Commands::Init => {
            handle_init_command(&config).await?;
        }
        Commands::Serve { host, port, cors } => {
            handle_serve_api(&config, host, port, cors).await?;
        }
        Commands::Ask { question, user } => {
            handle_ask_command(&config, question, user).await?;
        }
        Commands::Populate {
            file,
            user,
            delay_ms,
        } => {
            handle_populate_command(&config, &file, &user, delay_ms).await?;
        }
        Commands::Cluster => {
            handle_cluster_command(&config).await?;
        }
        Commands::History { user } => {
            handle_history_command(&config, &user).await?;
        }
        Commands::Config => {
            handle_config_command(&config)?;
        }
    }

    Ok(())
}
