use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use watchtrack_core::AppConfig;
use watchtrack_core::constants::EXPORT_FILE_NAME;

mod commands;

#[derive(Parser)]
#[command(name = "watchtrack")]
#[command(about = "Keep track of the episode you are on in every show", long_about = None)]
struct Cli {
    /// Database file (defaults to the platform data directory)
    #[arg(long, env = "WATCHTRACK_DB_PATH", global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
pub(crate) struct Credentials {
    #[arg(long, env = "WATCHTRACK_PHONE")]
    pub(crate) phone: String,
    #[arg(long, env = "WATCHTRACK_PASSWORD", hide_env_values = true)]
    pub(crate) password: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new account
    Signup {
        #[command(flatten)]
        creds: Credentials,
    },
    /// Change the account password
    Passwd {
        #[command(flatten)]
        creds: Credentials,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },
    /// Add a show, or set its episode if it is already tracked
    Add {
        #[command(flatten)]
        creds: Credentials,
        name: String,
        #[arg(default_value_t = 1)]
        episode: u32,
    },
    /// List tracked shows
    List {
        #[command(flatten)]
        creds: Credentials,
        #[arg(short, long, default_value = "")]
        search: String,
        #[arg(long)]
        json: bool,
    },
    /// Move a show one episode forward
    Inc {
        #[command(flatten)]
        creds: Credentials,
        name: String,
    },
    /// Move a show one episode back
    Dec {
        #[command(flatten)]
        creds: Credentials,
        name: String,
    },
    /// Set a show's episode
    Set {
        #[command(flatten)]
        creds: Credentials,
        name: String,
        episode: u32,
    },
    /// Stop tracking a show
    Rm {
        #[command(flatten)]
        creds: Credentials,
        name: String,
    },
    /// Remove every tracked show
    Clear {
        #[command(flatten)]
        creds: Credentials,
        #[arg(long)]
        yes: bool,
    },
    /// Write progress to a JSON file ("-" for stdout)
    Export {
        #[command(flatten)]
        creds: Credentials,
        #[arg(short, long, default_value = EXPORT_FILE_NAME)]
        output: PathBuf,
    },
    /// Load progress from a JSON file
    Import {
        #[command(flatten)]
        creds: Credentials,
        file: PathBuf,
        /// Add every entry as a new show, even when the name already exists
        #[arg(long)]
        append: bool,
    },
    /// Copy every show of one account to another
    Migrate {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
    /// Show or change feature flags
    Flags {
        #[command(subcommand)]
        action: FlagsAction,
    },
    /// Print the collection every time it changes
    Watch {
        #[command(flatten)]
        creds: Credentials,
        #[arg(short, long, default_value = "")]
        search: String,
    },
}

#[derive(Subcommand)]
pub(crate) enum FlagsAction {
    Show,
    Set {
        /// Allow clearing the whole collection (true/false)
        #[arg(long, action = clap::ArgAction::Set)]
        delete_all: bool,
    },
}

pub(crate) fn ensure_db_dir(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating database directory {}", parent.display()))?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env();
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    let ctx = commands::Context::open(config)?;

    match cli.command {
        Commands::Signup { creds } => commands::account::signup(&ctx, &creds).await,
        Commands::Passwd { creds, new, confirm } => {
            commands::account::passwd(&ctx, &creds, &new, &confirm).await
        },
        Commands::Add { creds, name, episode } => {
            commands::videos::add(&ctx, &creds, &name, episode).await
        },
        Commands::List { creds, search, json } => {
            commands::videos::list(&ctx, &creds, &search, json).await
        },
        Commands::Inc { creds, name } => commands::videos::step(&ctx, &creds, &name, true).await,
        Commands::Dec { creds, name } => commands::videos::step(&ctx, &creds, &name, false).await,
        Commands::Set { creds, name, episode } => {
            commands::videos::set(&ctx, &creds, &name, episode).await
        },
        Commands::Rm { creds, name } => commands::videos::remove(&ctx, &creds, &name).await,
        Commands::Clear { creds, yes } => commands::videos::clear(&ctx, &creds, yes).await,
        Commands::Export { creds, output } => {
            commands::transfer::export(&ctx, &creds, &output).await
        },
        Commands::Import { creds, file, append } => {
            commands::transfer::import(&ctx, &creds, &file, append).await
        },
        Commands::Migrate { from, to } => commands::transfer::migrate(&ctx, &from, &to).await,
        Commands::Flags { action } => commands::flags::run(&ctx, action).await,
        Commands::Watch { creds, search } => commands::watch::run(&ctx, &creds, &search).await,
    }
}
