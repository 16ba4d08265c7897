//! # tinytutor-cli
//!
//! Command-line interface for TinyTutor.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tinytutor_core::Config;
use tinytutor_session::SqliteSessionStore;

mod commands;

/// Application context containing shared state.
pub struct AppContext {
    pub config: Config,
    pub store: Arc<SqliteSessionStore>,
}

/// TinyTutor - AI tutoring sessions for kids
#[derive(Parser)]
#[command(name = "tinytutor")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new tutoring session for a topic
    New {
        /// What to learn about
        topic: String,
        /// Language code for the session (e.g. en, es)
        #[arg(short, long)]
        language: Option<String>,
    },
    /// List all sessions, most recently opened first
    List,
    /// Search sessions by topic
    Search {
        /// Substring to look for in topics
        query: String,
    },
    /// Open a session, generating its tutorial if needed
    Open {
        /// Session id
        id: i64,
        /// Regenerate the tutorial in this language
        #[arg(short, long)]
        language: Option<String>,
    },
    /// Ask a follow-up question about a session's tutorial
    Ask {
        /// Session id
        id: i64,
        /// The question
        question: String,
    },
    /// Describe an image for a child
    Explain {
        /// Path to the image file
        path: PathBuf,
        /// Language for the description
        #[arg(short, long)]
        language: Option<String>,
    },
    /// Delete a session
    Delete {
        /// Session id
        id: i64,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config, using defaults: {}", e);
        Config::default()
    });

    // Open the session store
    let store = Arc::new(SqliteSessionStore::new(config.data_dir())?);

    let ctx = AppContext { config, store };

    match cli.command {
        Commands::New { topic, language } => {
            commands::session::new_session(&ctx, &topic, language.as_deref()).await?;
        }
        Commands::List => {
            commands::session::list(&ctx).await?;
        }
        Commands::Search { query } => {
            commands::session::search(&ctx, &query).await?;
        }
        Commands::Open { id, language } => {
            commands::tutor::open(&ctx, id, language.as_deref()).await?;
        }
        Commands::Ask { id, question } => {
            commands::tutor::ask(&ctx, id, &question).await?;
        }
        Commands::Explain { path, language } => {
            commands::tutor::explain(&ctx, &path, language.as_deref()).await?;
        }
        Commands::Delete { id } => {
            commands::session::delete(&ctx, id).await?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(&ctx)?,
        },
    }

    Ok(())
}
