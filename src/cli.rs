//! Command-line surface: argument parsing and the non-interactive commands.

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tcalc::application::evaluate_and_record;
use tcalc::infrastructure::{CalcConfig, EvaluationLogger};

#[derive(Debug, Parser)]
#[command(author, version, about = "Keypad calculator for the terminal", long_about = None)]
pub struct Args {
    /// CSV file successful evaluations are appended to.
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Do not record evaluations.
    #[arg(long, global = true)]
    pub no_log: bool,

    /// Print debug diagnostics to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Evaluate one expression and print the result.
    Eval {
        /// Arithmetic expression, e.g. "2*3+4".
        #[arg(allow_hyphen_values = true)]
        expression: String,

        /// Print a JSON object instead of plain text.
        #[arg(long)]
        json: bool,
    },

    /// Print logged evaluations, oldest first.
    History {
        /// Only print the newest N records.
        #[arg(long, value_name = "N")]
        limit: Option<usize>,

        /// Print one JSON object per line.
        #[arg(long)]
        json: bool,
    },
}

impl Args {
    /// Applies command-line overrides on top of the loaded configuration.
    pub fn apply(&self, mut config: CalcConfig) -> CalcConfig {
        if let Some(path) = &self.log_file {
            config.log_path = path.clone();
        }
        if self.no_log {
            config.logging_enabled = false;
        }
        config
    }

    /// Default diagnostics level when `TCALC_LOG` is unset.
    pub fn default_log_level(&self) -> &'static str {
        match (&self.command, self.verbose) {
            (_, true) => "debug",
            (None, false) => "off",
            (Some(_), false) => "warn",
        }
    }
}

pub fn init_tracing(default_level: &str) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_env("TCALC_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

pub fn logger_for(config: &CalcConfig) -> Option<EvaluationLogger> {
    config
        .logging_enabled
        .then(|| EvaluationLogger::new(config.log_path.clone()))
}

#[derive(Debug, Serialize)]
struct EvalOutput<'a> {
    expression: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn run_eval(
    expression: &str,
    json: bool,
    logger: Option<&EvaluationLogger>,
) -> anyhow::Result<ExitCode> {
    let outcome = evaluate_and_record(expression, logger);
    let code = if outcome.is_ok() { ExitCode::SUCCESS } else { ExitCode::FAILURE };

    if json {
        let output = match outcome {
            Ok(value) => EvalOutput { expression, result: Some(value.to_string()), error: None },
            Err(err) => EvalOutput { expression, result: None, error: Some(err.to_string()) },
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        match outcome {
            Ok(value) => println!("{value}"),
            Err(err) => eprintln!("Error: {err}"),
        }
    }

    Ok(code)
}

pub fn run_history(logger: &EvaluationLogger, limit: Option<usize>, json: bool) -> anyhow::Result<()> {
    let records = logger.read_records()?;
    let skip = limit.map_or(0, |limit| records.len().saturating_sub(limit));

    for record in records.iter().skip(skip) {
        if json {
            println!("{}", serde_json::to_string(record)?);
        } else {
            println!(
                "{}  {} = {}",
                record.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
                record.expression,
                record.result
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_no_command_runs_keypad() {
        let args = Args::try_parse_from(["tcalc"]).unwrap();
        assert!(args.command.is_none());
        assert_eq!(args.default_log_level(), "off");
    }

    #[test]
    fn test_eval_accepts_leading_minus() {
        let args = Args::try_parse_from(["tcalc", "eval", "-2**2", "--json"]).unwrap();
        match args.command {
            Some(Command::Eval { expression, json }) => {
                assert_eq!(expression, "-2**2");
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::try_parse_from(["tcalc", "history", "--limit", "3", "--no-log", "-v"]).unwrap();
        assert!(args.no_log);
        assert_eq!(args.default_log_level(), "debug");
        assert!(matches!(args.command, Some(Command::History { limit: Some(3), json: false })));
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::try_parse_from(["tcalc", "--log-file", "other.csv", "--no-log"]).unwrap();
        let config = args.apply(CalcConfig::default());
        assert_eq!(config.log_path, PathBuf::from("other.csv"));
        assert!(!config.logging_enabled);
        assert!(logger_for(&config).is_none());
    }

    #[test]
    fn test_config_is_kept_without_flags() {
        let args = Args::try_parse_from(["tcalc", "eval", "1"]).unwrap();
        assert_eq!(args.apply(CalcConfig::default()), CalcConfig::default());
        assert_eq!(args.default_log_level(), "warn");
    }

    #[test]
    fn test_run_eval_exit_codes() {
        let dir = TempDir::new().unwrap();
        let logger = EvaluationLogger::new(dir.path().join("log.csv"));

        assert_eq!(run_eval("1+1", false, Some(&logger)).unwrap(), ExitCode::SUCCESS);
        assert_eq!(run_eval("1/0", true, Some(&logger)).unwrap(), ExitCode::FAILURE);
        assert_eq!(logger.read_records().unwrap().len(), 1);
    }

    #[test]
    fn test_eval_output_json_shape() {
        let output = EvalOutput { expression: "10/4", result: Some("2.5".to_string()), error: None };
        assert_eq!(
            serde_json::to_string(&output).unwrap(),
            r#"{"expression":"10/4","result":"2.5"}"#
        );
    }
}
