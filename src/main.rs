use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use flockchat::admin::AdminAction;
use flockchat::commands::watch::WatchOptions;
use flockchat::config::Config;
use flockchat::error::Result;
use flockchat::output::Format;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "flockchat",
    version,
    about = "Serverless chat for everyone logged into the same machine"
)]
struct Cli {
    /// Output format
    #[arg(long, global = true, value_enum, default_value = "json")]
    format: Format,
    /// Shorthand for --format pretty
    #[arg(long, global = true, hide = true)]
    pretty: bool,
    /// Directory holding the shared documents (default: per-user config dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory and empty documents
    Init,
    /// Log in: add a user to the active set
    Join {
        /// Username (trimmed, case-sensitive)
        name: String,
        /// Passcode, required when joining as `admin`
        #[arg(long)]
        passcode: Option<String>,
    },
    /// Log out: remove a user from the active set
    Leave {
        /// Username to remove
        name: String,
    },
    /// List active users
    Users,
    /// Post a chat message
    Send {
        /// Message text
        text: String,
        /// Sender (defaults to $FLOCKCHAT_USER)
        #[arg(long = "as")]
        sender: Option<String>,
    },
    /// Post a local GIF by path
    Gif {
        /// Path to the animated image
        path: PathBuf,
        /// Sender (defaults to $FLOCKCHAT_USER)
        #[arg(long = "as")]
        sender: Option<String>,
    },
    /// Show chat history, oldest first
    History {
        /// Only the last N messages
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Share a local file with everyone
    Share {
        /// File to share
        path: PathBuf,
        /// Sharer (defaults to $FLOCKCHAT_USER)
        #[arg(long = "as")]
        sender: Option<String>,
    },
    /// List shared files that still exist, newest first
    Files,
    /// Drop shared-file entries whose file is gone
    PruneFiles,
    /// Poll the shared documents and print every change
    Watch {
        /// Poll interval in milliseconds (default from config)
        #[arg(long)]
        interval_ms: Option<u64>,
        /// Stop after this many milliseconds
        #[arg(long)]
        for_ms: Option<u64>,
        /// Join as this user for the duration of the watch
        #[arg(long)]
        join: Option<String>,
        /// Passcode, required when joining as `admin`
        #[arg(long)]
        passcode: Option<String>,
    },
    /// Passcode-gated maintenance
    Admin {
        /// Admin passcode
        #[arg(long)]
        passcode: String,
        #[command(subcommand)]
        action: AdminCommand,
    },
}

#[derive(Subcommand)]
enum AdminCommand {
    /// Remove every user from the active set
    LogoutAll,
    /// Archive chat history and start a fresh log
    ArchiveChat,
    /// Archive the shared-files list and start a fresh one
    ArchiveFiles,
}

impl From<AdminCommand> for AdminAction {
    fn from(cmd: AdminCommand) -> Self {
        match cmd {
            AdminCommand::LogoutAll => AdminAction::LogoutAll,
            AdminCommand::ArchiveChat => AdminAction::ArchiveChat,
            AdminCommand::ArchiveFiles => AdminAction::ArchiveFiles,
        }
    }
}

fn run(cli: Cli, format: Format) -> Result<()> {
    let config = Config::load(cli.data_dir.as_deref())?;

    match cli.command {
        Commands::Init => flockchat::commands::init::run(&config, format),
        Commands::Join { name, passcode } => {
            flockchat::commands::presence::join(&config, &name, passcode.as_deref(), format)
        }
        Commands::Leave { name } => flockchat::commands::presence::leave(&config, &name, format),
        Commands::Users => flockchat::commands::presence::list(&config, format),
        Commands::Send { text, sender } => {
            flockchat::commands::chat::send(&config, sender.as_deref(), &text, format)
        }
        Commands::Gif { path, sender } => {
            flockchat::commands::chat::gif(&config, sender.as_deref(), &path, format)
        }
        Commands::History { limit } => flockchat::commands::chat::history(&config, limit, format),
        Commands::Share { path, sender } => {
            flockchat::commands::files::share(&config, sender.as_deref(), &path, format)
        }
        Commands::Files => flockchat::commands::files::list(&config, format),
        Commands::PruneFiles => flockchat::commands::files::prune(&config, format),
        Commands::Watch {
            interval_ms,
            for_ms,
            join,
            passcode,
        } => flockchat::commands::watch::run(
            &config,
            WatchOptions {
                interval: interval_ms.map(Duration::from_millis),
                run_for: for_ms.map(Duration::from_millis),
                join: join.as_deref(),
                passcode: passcode.as_deref(),
            },
            format,
        ),
        Commands::Admin { passcode, action } => {
            flockchat::commands::admin::run(&config, &passcode, action.into(), format)
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = if cli.pretty {
        Format::Pretty
    } else {
        cli.format
    };
    if let Err(e) = run(cli, format) {
        match format {
            Format::Json => {
                eprintln!(
                    "{}",
                    serde_json::json!({
                        "error": e.code(),
                        "message": e.to_string()
                    })
                );
            }
            _ => eprintln!("error: {e}"),
        }
        std::process::exit(1);
    }
}
