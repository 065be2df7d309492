mod adapters;
mod commands;
mod helpers;

use clap::Parser;
use lca_core::config::EngineConfigError;
use lca_core::domain::LcaError;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub fn run_from_env() -> i32 {
    match run(std::env::args().skip(1)) {
        Ok(code) => code,
        Err(error) => {
            let lca_error = error.as_lca_error();
            eprintln!("{}", lca_error.diagnostic_line());
            lca_error.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("lca-engine".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    parse_and_dispatch(full_args)
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => {
            init_tracing(&cli.log_level);
            dispatch_parsed(cli.command)
        }
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

/// `RUST_LOG` wins over `--log-level`; output goes to stderr so stdout stays
/// reserved for reports.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
}

#[derive(Parser)]
#[command(name = "lca-engine", version, about = "Material impact calculation for building projects")]
struct Cli {
    /// Log filter such as `warn`, `info` or `lca_core=debug`
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Calculate a stored project and write its results
    Calculate(commands::CalculateArgs),
    /// Suggest reference materials for material names
    Match(commands::MatchArgs),
    /// Show the service life resolved for a classification code
    Amortization(commands::AmortizationArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Calculate(args) => commands::run_calculate_command(args),
        CliCommand::Match(args) => commands::run_match_command(args),
        CliCommand::Amortization(args) => commands::run_amortization_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(LcaError),
    #[error(transparent)]
    Config(#[from] EngineConfigError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    fn as_lca_error(&self) -> LcaError {
        match self {
            Self::Usage(message) => LcaError::input_validation("INPUT.CLI_USAGE", message.clone()),
            Self::Compute(error) => error.clone(),
            Self::Config(error @ EngineConfigError::Read { .. }) => {
                LcaError::io_system("IO.CONFIG_READ", error.to_string())
            }
            Self::Config(error) => LcaError::input_validation("INPUT.CONFIG", error.to_string()),
            Self::Internal(error) if error.chain().any(|cause| cause.is::<serde_json::Error>()) => {
                LcaError::input_validation("INPUT.CLI_JSON", format!("{error:#}"))
            }
            Self::Internal(error) => LcaError::io_system("IO.CLI", format!("{error:#}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CliError, run};
    use lca_core::config::EngineConfigError;
    use lca_core::domain::LcaErrorCategory;
    use std::path::PathBuf;

    #[test]
    fn help_exits_cleanly() {
        assert_eq!(run(["--help"]).expect("help should succeed"), 0);
    }

    #[test]
    fn unknown_subcommand_is_a_usage_error() {
        let error = run(["frobnicate"]).expect_err("unknown command should fail");
        let mapped = error.as_lca_error();
        assert_eq!(mapped.placeholder(), "INPUT.CLI_USAGE");
        assert_eq!(mapped.exit_code(), 2);
    }

    #[test]
    fn config_errors_map_by_kind() {
        let read = CliError::Config(EngineConfigError::Read {
            path: PathBuf::from("engine.json"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });
        assert_eq!(read.as_lca_error().category(), LcaErrorCategory::IoSystemError);

        let invalid = CliError::Config(EngineConfigError::Invalid {
            path: PathBuf::from("engine.json"),
            message: "batchSize must be at least 1".to_string(),
        });
        assert_eq!(invalid.as_lca_error().placeholder(), "INPUT.CONFIG");
    }

    #[test]
    fn malformed_json_inputs_are_validation_errors() {
        let parse = serde_json::from_str::<serde_json::Value>("[ not json")
            .expect_err("malformed json should fail");
        let malformed = CliError::Internal(anyhow::Error::new(parse).context("failed to parse material names"));
        let mapped = malformed.as_lca_error();
        assert_eq!(mapped.category(), LcaErrorCategory::InputValidationError);
        assert_eq!(mapped.placeholder(), "INPUT.CLI_JSON");
        assert!(mapped.message().contains("failed to parse material names"));

        let missing = CliError::Internal(
            anyhow::Error::new(std::io::Error::from(std::io::ErrorKind::NotFound)).context("failed to read"),
        );
        assert_eq!(missing.as_lca_error().exit_code(), 3);
    }
}
