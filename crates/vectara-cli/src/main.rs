//! vectara-sync - index and prune documents in a Vectara corpus
//!
//! Connects with the credentials from the configuration file, resolves the
//! configured corpus (creating it if needed) and runs one command against it.
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info};

use vectara_client::VectaraClient;

mod config;
mod error;
mod records;

use config::SyncConfig;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (default: ~/.config/vectara-sync/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Authenticate and print the resolved corpus id
    Check,

    /// Index documents from a JSON Lines file
    Index {
        /// Input file, one record per line
        #[arg(long)]
        input: PathBuf,
    },

    /// Delete every document whose metadata field matches one of the values
    DeleteByMetadata {
        /// Metadata field to match
        #[arg(long)]
        field: String,

        /// Value to match (repeatable)
        #[arg(long = "value", required = true)]
        values: Vec<String>,
    },

    /// Delete documents by id
    Delete {
        /// Document id (repeatable)
        #[arg(long = "id", required = true)]
        ids: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    let sync_config = SyncConfig::load(args.config.as_deref())?;
    let config = sync_config.client_config()?;

    let client = VectaraClient::connect(config)
        .await
        .context("Failed to connect to Vectara")?;

    match args.command {
        Command::Check => {
            client.check().await?;
            println!("{}", client.corpus_id());
            Ok(ExitCode::SUCCESS)
        }
        Command::Index { input } => {
            let file = File::open(&input)
                .with_context(|| format!("Failed to open {}", input.display()))?;
            let documents = records::read_documents(BufReader::new(file))?;

            let indexed = client.index(&documents).await?;
            info!("Indexed {indexed} of {} documents", documents.len());
            Ok(ExitCode::SUCCESS)
        }
        Command::DeleteByMetadata { field, values } => {
            let failed = client.delete_by_metadata(&field, &values).await?;
            Ok(report_failed(&failed))
        }
        Command::Delete { ids } => {
            let failed = client.delete_by_id(&ids).await?;
            Ok(report_failed(&failed))
        }
    }
}

/// Prints ids that were not deleted, one per line.
fn report_failed(failed: &[String]) -> ExitCode {
    if failed.is_empty() {
        return ExitCode::SUCCESS;
    }

    for id in failed {
        println!("{id}");
    }
    error!("{} documents were not deleted", failed.len());
    ExitCode::FAILURE
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::panic)]

    use super::*;

    #[test]
    fn test_parse_delete_by_metadata() {
        let args = Args::try_parse_from([
            "vectara-sync",
            "--config",
            "sync.toml",
            "delete-by-metadata",
            "--field",
            "_ab_stream",
            "--value",
            "users",
            "--value",
            "orders",
        ])
        .unwrap();

        assert_eq!(args.config, Some(PathBuf::from("sync.toml")));
        match args.command {
            Command::DeleteByMetadata { field, values } => {
                assert_eq!(field, "_ab_stream");
                assert_eq!(values, vec!["users", "orders"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_delete_requires_id() {
        assert!(Args::try_parse_from(["vectara-sync", "delete"]).is_err());
    }

    #[test]
    fn test_report_failed_exit_code() {
        assert_eq!(report_failed(&[]), ExitCode::SUCCESS);
        assert_eq!(report_failed(&["x".to_string()]), ExitCode::FAILURE);
    }
}
