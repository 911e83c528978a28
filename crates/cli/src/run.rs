//! `readactor [PATH]`: load, reconcile, write.

use std::path::PathBuf;
use std::time::Duration;

use dialoguer::Confirm;
use readactor_config::Settings;
use readactor_io::{
    load_reference, read_candidates, resolve_input_path, write_table, IoError, ReferenceSource,
    WriteMode, WriteReport,
};
use readactor_recon::{ReconOptions, Reconciler, ReferenceIndex, RunReport};
use readactor_wikidata::{ClientOptions, WikidataClient, USER_AGENT};
use tracing::{error, info};

use crate::exit_codes::{EXIT_DECLINED, EXIT_ERROR, EXIT_LOOKUP, EXIT_REFERENCE, EXIT_TABLE_IO};
use crate::CliError;

pub struct RunArgs {
    pub path: PathBuf,
    pub interactive: bool,
    pub output: bool,
    pub summary: bool,
    pub json: bool,
    pub reference: Option<String>,
    pub endpoint: Option<String>,
}

impl RunArgs {
    fn write_mode(&self) -> WriteMode {
        if self.output {
            WriteMode::NewFile
        } else if self.summary {
            WriteMode::Summary
        } else {
            WriteMode::InPlace
        }
    }
}

pub fn cmd_run(args: RunArgs, settings: &Settings) -> Result<(), CliError> {
    if args.interactive {
        confirm_update()?;
    }

    let input = resolve_input_path(&args.path);
    if !input.is_file() {
        return Err(CliError::args(format!("no such file: {}", input.display()))
            .with_hint("pass a CSV file, or a directory containing Person.csv"));
    }
    let mut table = read_candidates(&input).map_err(|e| io_err(EXIT_TABLE_IO, e))?;

    let source = ReferenceSource::parse(args.reference.as_deref().unwrap_or(&settings.reference.source));
    let reference = load_reference(&source, Duration::from_secs(settings.reference.timeout_secs))
        .map_err(|e| io_err(EXIT_REFERENCE, e))?;
    let index = ReferenceIndex::build(&reference).map_err(|e| {
        error!("{e}");
        CliError::recon(e)
    })?;
    info!(
        "Reference table: {} rows, last person_id {}",
        index.len(),
        index
            .max_person_id()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "none".into())
    );

    let lookup = wikidata_client(args.endpoint.as_deref(), settings)?;
    let options = ReconOptions {
        bot_name: settings.recon.bot_name.clone(),
        max_name_results: settings.recon.max_name_results,
        id_warn_threshold: settings.recon.id_warn_threshold,
        ..Default::default()
    };

    info!("Checking {} rows of {}", table.len(), input.display());
    let report = Reconciler::new(&index, &lookup, options)
        .run(&mut table.records)
        .map_err(|e| {
            error!("{e}");
            CliError::recon(e)
        })?;

    let mode = args.write_mode();
    let written = write_table(&table, &input, mode).map_err(|e| io_err(EXIT_TABLE_IO, e))?;
    print_results(&args, &report, &written)
}

fn confirm_update() -> Result<(), CliError> {
    let declined = |hint: Option<String>| CliError {
        code: EXIT_DECLINED,
        message: "update declined".into(),
        hint,
    };

    match Confirm::new()
        .with_prompt("Do you want to update the table?")
        .default(false)
        .interact()
    {
        Ok(true) => Ok(()),
        Ok(false) => Err(declined(None)),
        Err(e) => Err(declined(Some(format!(
            "cannot prompt for confirmation ({e}); run without --interactive"
        )))),
    }
}

fn wikidata_client(endpoint: Option<&str>, settings: &Settings) -> Result<WikidataClient, CliError> {
    let wd = &settings.wikidata;
    let options = ClientOptions {
        label_language: wd.label_language.clone(),
        timeout: Duration::from_secs(wd.timeout_secs),
        user_agent: wd
            .user_agent
            .clone()
            .filter(|ua| !ua.trim().is_empty())
            .unwrap_or_else(|| USER_AGENT.to_string()),
    };
    WikidataClient::with_base_url(endpoint.unwrap_or(&wd.endpoint), options).map_err(|e| CliError {
        code: EXIT_LOOKUP,
        message: e.to_string(),
        hint: None,
    })
}

fn print_results(args: &RunArgs, report: &RunReport, written: &WriteReport) -> Result<(), CliError> {
    if let Some(csv) = &written.summary {
        print!("{csv}");
    }

    if args.json {
        let json = serde_json::to_string_pretty(report).map_err(|e| CliError {
            code: EXIT_ERROR,
            message: format!("JSON serialization error: {e}"),
            hint: None,
        })?;
        println!("{json}");
    }

    // Completion line goes to stderr so stdout stays machine-readable
    match &written.destination {
        Some(path) => eprintln!("Done: {}. Written to {}", report.summary, path.display()),
        None => eprintln!("Done: {}. Input table left unchanged", report.summary),
    }
    Ok(())
}

fn io_err(code: u8, err: IoError) -> CliError {
    error!("{err}");
    CliError {
        code,
        message: err.to_string(),
        hint: None,
    }
}
