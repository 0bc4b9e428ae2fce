use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use trending_sync::trending::Period;
use trending_sync::{logging, paths, Config};

mod commands;

#[derive(Parser)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about = "Sync GitHub trending repositories into a Notion database", long_about = None)]
struct Cli {
    /// Config file (default: ~/.trending-sync/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// More diagnostics on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch trending repositories and write them to the database
    Sync {
        /// Trending window
        #[arg(long, value_enum)]
        period: Option<Period>,

        /// Number of repositories to process
        #[arg(long)]
        limit: Option<usize>,

        /// Database id (overrides config)
        #[arg(long)]
        database: Option<String>,

        /// Print payloads instead of writing them
        #[arg(long)]
        dry_run: bool,

        /// Skip README summaries
        #[arg(long)]
        no_enrich: bool,
    },

    /// Show the database's columns
    Schema {
        /// Database id (overrides config)
        #[arg(long)]
        database: Option<String>,

        /// Save the raw property JSON to a file
        #[arg(long, value_name = "PATH")]
        save: Option<PathBuf>,
    },

    /// Show which repository fields map to which columns
    Fields {
        /// Database id (overrides config)
        #[arg(long)]
        database: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = Config::load(&paths::resolve_config(cli.config.as_deref()))?;

    match cli.command {
        Commands::Sync {
            period,
            limit,
            database,
            dry_run,
            no_enrich,
        } => {
            commands::sync::execute(
                &config,
                commands::sync::SyncOptions {
                    period,
                    limit,
                    database,
                    dry_run,
                    no_enrich,
                },
            )?;
        }
        Commands::Schema { database, save } => {
            commands::schema::execute(&config, database.as_deref(), save.as_deref())?;
        }
        Commands::Fields { database } => {
            let code = commands::fields::execute(&config, database.as_deref())?;
            if code != 0 {
                std::process::exit(code);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_sync_flags() {
        let cli = Cli::try_parse_from([
            "trending-sync",
            "-vv",
            "sync",
            "--period",
            "weekly",
            "--limit",
            "5",
            "--dry-run",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Sync {
                period,
                limit,
                dry_run,
                no_enrich,
                ..
            } => {
                assert_eq!(period, Some(Period::Weekly));
                assert_eq!(limit, Some(5));
                assert!(dry_run);
                assert!(!no_enrich);
            }
            _ => panic!("expected sync"),
        }
    }

    #[test]
    fn test_rejects_unknown_period() {
        assert!(Cli::try_parse_from(["trending-sync", "sync", "--period", "yearly"]).is_err());
    }
}
