//! CLI definitions and command implementations.

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use crate::state::AppState;

/// TheLUX Chat session service.
#[derive(Debug, Parser)]
#[command(name = "luxchat", version, about = "TheLUX Chat session service")]
pub struct Cli {
    /// Increase logging verbosity (-v: debug, -vv: trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit machine-readable JSON output.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value_t = 8080, env = "LUXCHAT_PORT")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1", env = "LUXCHAT_HOST")]
        host: String,
    },

    /// Show database status (chatbot and transcript counts).
    Status,

    /// Generate shell completions.
    Completions {
        /// The shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Print row counts for the local database.
pub async fn status(state: &AppState, json: bool) -> anyhow::Result<()> {
    let chatbots = state.session_service.config_provider().count().await?;
    let transcripts = state.session_service.store().count().await?;

    if json {
        let status = serde_json::json!({
            "data_dir": state.data_dir.display().to_string(),
            "chatbots": chatbots,
            "transcripts": transcripts,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!();
        println!(
            "  {} TheLUX Chat status",
            console::style("💬").bold()
        );
        println!();
        println!(
            "  Data dir:    {}",
            console::style(state.data_dir.display()).cyan()
        );
        println!("  Chatbots:    {chatbots}");
        println!("  Transcripts: {transcripts}");
        println!();
    }

    Ok(())
}
