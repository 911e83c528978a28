// ReadActor CLI - reconcile a person table against ReadAct and Wikidata

mod exit_codes;
mod logging;
mod run;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use readactor_config::{ConfigError, Settings};
use readactor_recon::ReconError;

use exit_codes::{recon_exit_code, EXIT_CONFIG, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser, Debug)]
#[command(name = "readactor")]
#[command(about = "Check a person table against the ReadAct reference table and Wikidata")]
#[command(long_version = long_version())]
#[command(version, disable_version_flag = true)]
#[command(after_help = "\
Examples:
  readactor                       # ./Person.csv, updated in place
  readactor data/Person.csv -o    # write data/Person_updated.csv
  readactor data/Person.csv -s    # print the reconciled table, write nothing
  readactor -d                    # print the log of previous runs")]
struct Cli {
    /// Person table, or a directory containing Person.csv
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Package version
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: Option<bool>,

    /// Print full log output to console
    #[arg(short, long)]
    debug: bool,

    /// Prompt user for confirmation to continue
    #[arg(short, long)]
    interactive: bool,

    /// Print no log output to console other than completion message and error level events
    #[arg(short, long)]
    quiet: bool,

    /// Do not update input table, but create a new file <stem>_updated.csv instead
    #[arg(short, long, conflicts_with = "summary")]
    output: bool,

    /// Do not update input table, but summarise results in console
    #[arg(short, long)]
    summary: bool,

    /// Print the per-row report as JSON on stdout
    #[arg(long, conflicts_with = "summary")]
    json: bool,

    /// Reference table URL or path (overrides settings)
    #[arg(long, env = "READACTOR_REFERENCE")]
    reference: Option<String>,

    /// Wikidata SPARQL endpoint (overrides settings)
    #[arg(long, env = "READACTOR_SPARQL_ENDPOINT")]
    endpoint: Option<String>,

    /// Settings file (default: <config dir>/readactor/settings.toml)
    #[arg(long, env = "READACTOR_CONFIG")]
    config: Option<PathBuf>,
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match dispatch(cli) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn dispatch(cli: Cli) -> Result<(), CliError> {
    let settings = load_settings(cli.config.as_deref())?;

    if cli.debug {
        return logging::print_log(&settings.log.file);
    }

    logging::init(&settings.log.file, cli.quiet)?;

    run::cmd_run(
        run::RunArgs {
            path: cli.path,
            interactive: cli.interactive,
            output: cli.output,
            summary: cli.summary,
            json: cli.json,
            reference: cli.reference,
            endpoint: cli.endpoint,
        },
        &settings,
    )
}

fn load_settings(explicit: Option<&std::path::Path>) -> Result<Settings, CliError> {
    let result = match explicit {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    result.map_err(CliError::config)
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn config(err: ConfigError) -> Self {
        let hint = match &err {
            ConfigError::Read { .. } => None,
            _ => Some(format!("default location: {}", Settings::config_path_display())),
        };
        Self { code: EXIT_CONFIG, message: err.to_string(), hint }
    }

    /// Create error from a reconciliation error with proper exit code.
    pub fn recon(err: ReconError) -> Self {
        let code = recon_exit_code(&err);
        let hint = match &err {
            ReconError::Conflict(_) => Some(
                "nothing was written; fix the row, or put \"skip\" in its note column, and run again"
                    .to_string(),
            ),
            ReconError::MissingColumn(_) => {
                Some("the reference table is broken; please inform its maintainers".to_string())
            }
            ReconError::Lookup { .. } => Some("check the network or try again later".to_string()),
            ReconError::IdentifierOverflow { .. } | ReconError::IdentifierExhausted { .. } => {
                Some("person_id numbering needs a new scheme; please inform the reference table maintainers".to_string())
            }
            ReconError::NoIdentifierSeed { .. } => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
