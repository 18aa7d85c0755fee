//! dotquery - chainable queries over JSON and JSONL documents
//!
//! Each invocation reads a QuerySet from stdin (except `query`, which starts
//! one) and writes the refined QuerySet or the matching documents to stdout:
//!
//! ```text
//! dotquery query "equals a.b 1" docs/ | dotquery and "greater c 10" | dotquery resolve
//! ```

use std::io::{self, IsTerminal, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};

use dotquery::config::CONFIG_ENV_VAR;
use dotquery::query::tokenize_dsl;
use dotquery::{parse_dsl, Config, DotQueryError, QuerySet, Result, WireStyle};

const LOG_ENV_VAR: &str = "DOTQUERY_LOG";

#[derive(Parser, Debug)]
#[command(name = "dotquery")]
#[command(author, version, about = "A chainable query tool for JSON data")]
#[command(
    after_help = "Example: dotquery query \"equals a.b 1\" docs/ | dotquery and \"greater c 10\" | dotquery resolve"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Print the QuerySet on a single line
    #[arg(long, global = true)]
    compact: bool,

    /// Configuration file (JSON)
    #[arg(long, global = true, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start a new query chain
    Query {
        /// The query DSL string
        dsl: String,

        /// One or more data sources (file, directory, glob)
        #[arg(required = true)]
        sources: Vec<String>,
    },

    /// Combine with the piped query using AND
    And {
        /// The query DSL string to add
        dsl: String,
    },

    /// Combine with the piped query using OR
    Or {
        /// The query DSL string to add
        dsl: String,
    },

    /// Negate the piped query
    Not,

    /// Resolve the piped query and print matching documents
    Resolve,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Query { .. } => "query",
            Command::And { .. } => "and",
            Command::Or { .. } => "or",
            Command::Not => "not",
            Command::Resolve => "resolve",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(
        env_logger::Env::new().filter_or(LOG_ENV_VAR, default_filter),
    )
    .format_timestamp(None)
    .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load_or_default(cli.config.as_deref())?;
    let style = if cli.compact || config.output.compact {
        WireStyle::Compact
    } else {
        WireStyle::Pretty
    };

    if let Command::Query { dsl, sources } = &cli.command {
        let set = QuerySet::new(parse_dsl(dsl)?, sources.clone());
        emit(&set.to_wire(style))?;
        return Ok(());
    }

    let mut set = read_piped_set(cli.command.name())?;
    match cli.command {
        Command::Query { .. } => {}
        Command::And { dsl } => {
            set.and(tokenize_dsl(&dsl)?)?;
            emit(&set.to_wire(style))?;
        }
        Command::Or { dsl } => {
            set.or(tokenize_dsl(&dsl)?)?;
            emit(&set.to_wire(style))?;
        }
        Command::Not => {
            set.negate();
            emit(&set.to_wire(style))?;
        }
        Command::Resolve => resolve(&set, config)?,
    }
    Ok(())
}

fn read_piped_set(command: &str) -> Result<QuerySet> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Err(DotQueryError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("command '{command}' requires a QuerySet piped from stdin"),
        )));
    }

    let mut incoming = String::new();
    stdin.lock().read_to_string(&mut incoming)?;
    QuerySet::from_wire(&incoming)
}

fn emit(text: &str) -> Result<()> {
    let mut out = io::stdout().lock();
    finish(writeln!(out, "{text}").and_then(|()| out.flush()))
}

fn resolve(set: &QuerySet, config: Config) -> Result<()> {
    let mut out = io::stdout().lock();
    for document in set.resolve_with(config.sources).documents() {
        if let Err(error) = writeln!(out, "{document}") {
            return finish(Err(error));
        }
    }
    finish(out.flush())
}

/// A reader that went away (e.g. `| head`) ends output quietly.
fn finish(written: io::Result<()>) -> Result<()> {
    match written {
        Err(error) if error.kind() != io::ErrorKind::BrokenPipe => Err(error.into()),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_stdout_is_not_an_error() {
        let closed = io::Error::new(io::ErrorKind::BrokenPipe, "reader closed");
        assert!(finish(Err(closed)).is_ok());
        assert!(finish(Ok(())).is_ok());
    }

    #[test]
    fn other_write_failures_are_reported() {
        let full = io::Error::other("disk full");
        match finish(Err(full)) {
            Err(DotQueryError::Io(error)) => assert_eq!(error.kind(), io::ErrorKind::Other),
            other => panic!("expected io error, got {other:?}"),
        }
    }

    #[test]
    fn query_subcommand_requires_sources() {
        assert!(Cli::try_parse_from(["dotquery", "query", "equals a 1"]).is_err());
        let cli = Cli::try_parse_from(["dotquery", "--compact", "query", "equals a 1", "x.json"])
            .expect("parse args");
        assert!(cli.compact);
        assert_eq!(cli.command.name(), "query");
    }
}
