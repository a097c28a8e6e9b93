use clap::Parser;
use std::process::ExitCode;

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands, ConfigCommands};
use commands::config::{load_config, ConfigSetOptions};
use commands::filter::FilterOptions;
use commands::matching::MatchOptions;
use commands::{CommandContext, CommandError, Outcome};

/// Exit code when the query was only partly understood.
const EXIT_PARTIAL: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(&cli);

    match run(&cli) {
        Ok(Outcome::Clean) => ExitCode::SUCCESS,
        Ok(Outcome::Partial) => ExitCode::from(EXIT_PARTIAL),
        Err(e) => {
            if cli.json {
                let error_json = serde_json::json!({
                    "error": {
                        "code": error_code(&e),
                        "message": e.to_string(),
                    }
                });
                match serde_json::to_string_pretty(&error_json) {
                    Ok(json) => eprintln!("{json}"),
                    Err(_) => eprintln!("Error: {e}"),
                }
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::FAILURE
        }
    }
}

/// Installs the stderr log subscriber.
///
/// `TQ_LOG` takes an `EnvFilter` directive and wins over the flags.
fn setup_logging(cli: &Cli) {
    use tracing_subscriber::EnvFilter;

    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_env("TQ_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> commands::Result<Outcome> {
    // Completions and config path must work even with a broken config file
    match &cli.command {
        Commands::Completions { shell } => {
            commands::completions::execute(shell)?;
            return Ok(Outcome::Clean);
        }
        Commands::Config {
            command: Some(ConfigCommands::Path),
        } => {
            let ctx = CommandContext::from_cli(cli, None);
            return commands::config::execute_path(&ctx);
        }
        _ => {}
    }

    let config = load_config()?;
    let ctx = CommandContext::from_cli(cli, config.output.color);

    match &cli.command {
        Commands::Tokens { query } => commands::tokens::execute(&ctx, query),
        Commands::Parse { query } => commands::parse::execute(&ctx, query),
        Commands::Filter {
            query,
            projects,
            search,
            sort,
            order,
        } => {
            let opts = FilterOptions {
                query: query.clone(),
                projects: projects.clone(),
                search_mode: search.map(Into::into),
                sort_by: sort.map(Into::into),
                sort_order: order.map(Into::into),
            };
            commands::filter::execute(&ctx, &opts, &config)
        }
        Commands::Match {
            pattern,
            texts,
            threshold,
        } => {
            let opts = MatchOptions {
                pattern: pattern.clone(),
                texts: texts.clone(),
                threshold: *threshold,
            };
            commands::matching::execute(&ctx, &opts)
        }
        Commands::Config { command } => match command {
            None | Some(ConfigCommands::Show) => commands::config::execute_show(&ctx),
            Some(ConfigCommands::Set { key, value }) => {
                let opts = ConfigSetOptions {
                    key: key.clone(),
                    value: value.clone(),
                };
                commands::config::execute_set(&ctx, &opts)
            }
            Some(ConfigCommands::Path) => commands::config::execute_path(&ctx),
        },
        // Handled before the config is loaded
        Commands::Completions { .. } => Ok(Outcome::Clean),
    }
}

/// Returns the error code string for JSON output.
fn error_code(e: &CommandError) -> &'static str {
    match e {
        CommandError::Query(taskq_query::QueryError::Lex(_)) => "LEX_ERROR",
        CommandError::Query(_) => "QUERY_ERROR",
        CommandError::Projects { .. } => "PROJECTS_ERROR",
        CommandError::Config(_) => "CONFIG_ERROR",
        CommandError::Io(_) => "IO_ERROR",
        CommandError::Json(_) => "JSON_ERROR",
    }
}
