//! `mailsuggest` - recipient autocomplete from the command line
//!
//! Looks up, records and forgets previously used recipients, and can serve the
//! web client's autocomplete actions over stdin/stdout.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod settings;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use mailsuggest_core::{
    Action, Query, RecipientKind, RecipientStore, Response, SqliteHistoryStore, SuggestionEngine,
    XmlHistoryStore, handle_action,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use settings::{Settings, StoreBackend};

/// Recipient autocomplete over a webmail recipient history.
#[derive(Debug, Parser)]
#[command(name = "mailsuggest", version, about)]
struct Cli {
    /// Settings file (defaults to the user config directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// History backend, overriding the settings file.
    #[arg(long, global = true, value_enum)]
    store: Option<StoreBackend>,

    /// History location, overriding the settings file.
    #[arg(long, global = true)]
    history: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(flatten)]
    History(HistoryCommand),
    /// Print the effective settings.
    Settings {
        /// Also write them to the settings file.
        #[arg(long)]
        write: bool,
    },
}

/// Commands that work on the recipient history.
#[derive(Debug, Subcommand)]
enum HistoryCommand {
    /// Suggest recipients for typed text.
    Suggest {
        /// Text typed into the address field.
        text: String,
        /// Maximum number of suggestions.
        #[arg(long)]
        max: Option<usize>,
        /// Print suggestions as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Forget recipients (exact, case-sensitive addresses).
    Delete {
        /// Addresses to remove.
        #[arg(required = true)]
        emails: Vec<String>,
    },
    /// Record that a message was sent to a recipient.
    Record {
        /// Recipient address.
        email: String,
        /// Display name.
        #[arg(long, default_value = "")]
        name: String,
        /// The recipient is a distribution list.
        #[arg(long)]
        list: bool,
    },
    /// Print the whole history as JSON.
    List,
    /// Copy an XML history document into the configured store.
    Import {
        /// History document to read.
        file: PathBuf,
    },
    /// Answer JSON actions read line by line from stdin.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailsuggest=info,mailsuggest_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let settings_path = cli.config.clone().unwrap_or_else(Settings::default_path);
    let mut settings = Settings::load(&settings_path).await?;
    if let Some(backend) = cli.store {
        settings.backend = backend;
    }
    if let Some(path) = cli.history.clone() {
        settings.history_path = Some(path);
    }

    let command = match cli.command {
        Command::History(command) => command,
        Command::Settings { write } => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
            if write {
                settings.save(&settings_path).await?;
            }
            return Ok(());
        }
    };

    let history_path = settings.history_path();
    debug!(backend = ?settings.backend, path = %history_path.display(), "Opening recipient history");

    match settings.backend {
        StoreBackend::Sqlite => {
            if let Some(parent) = history_path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            let store = SqliteHistoryStore::new(database_path(&history_path)?)
                .await
                .with_context(|| format!("opening {}", history_path.display()))?;
            run(&SuggestionEngine::new(store), command, &settings).await
        }
        StoreBackend::Xml => {
            let store = XmlHistoryStore::new(history_path);
            run(&SuggestionEngine::new(store), command, &settings).await
        }
    }
}

/// The database location as the UTF-8 string `SQLite` needs.
fn database_path(path: &Path) -> anyhow::Result<&str> {
    path.to_str()
        .with_context(|| format!("history path {} is not valid UTF-8", path.display()))
}

async fn run<S: RecipientStore>(
    engine: &SuggestionEngine<S>,
    command: HistoryCommand,
    settings: &Settings,
) -> anyhow::Result<()> {
    match command {
        HistoryCommand::Suggest { text, max, json } => {
            let query = Query::new(text).with_max_results(max.unwrap_or(settings.max_results));
            let suggestions = engine.suggest(&query).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&suggestions)?);
            } else {
                for suggestion in suggestions {
                    println!("{}", suggestion.display_label);
                }
            }
        }
        HistoryCommand::Delete { emails } => {
            let emails: HashSet<String> = emails.into_iter().collect();
            let remaining = engine
                .delete_recipients(&emails)
                .await
                .context("loading recipient history")?;
            engine
                .save(&remaining)
                .await
                .context("saving recipient history")?;
            info!(remaining = remaining.len(), "Recipient history updated");
        }
        HistoryCommand::Record { email, name, list } => {
            let kind = if list {
                RecipientKind::DistributionList
            } else {
                RecipientKind::Person
            };
            engine
                .record(&name, &email, kind)
                .await
                .with_context(|| format!("recording {email}"))?;
        }
        HistoryCommand::List => {
            let records = engine
                .store()
                .load()
                .await
                .context("loading recipient history")?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        HistoryCommand::Import { file } => {
            let records = XmlHistoryStore::new(&file)
                .load()
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            engine
                .save(&records)
                .await
                .context("saving recipient history")?;
            info!(count = records.len(), "Recipient history imported");
        }
        HistoryCommand::Serve => serve(engine, settings.max_results).await?,
    }

    Ok(())
}

/// One JSON action per input line, one JSON response per output line.
async fn serve<S: RecipientStore>(
    engine: &SuggestionEngine<S>,
    max_results: usize,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Action>(&line) {
            Ok(action) => handle_action(engine, action, max_results)
                .await
                .unwrap_or_else(|e| Response::Error {
                    message: e.to_string(),
                }),
            Err(e) => Response::Error {
                message: format!("invalid action: {e}"),
            },
        };

        println!("{}", serde_json::to_string(&response)?);
    }

    Ok(())
}
