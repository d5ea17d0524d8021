mod logging;
mod settings;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use pgscaffold_core::{EntityGraph, Error as CoreError};
use pgscaffold_generate::{
    GenVersion, GenerateError, GenerateOptions, GenerationPipeline, GenerationReport,
};
use pgscaffold_introspect::{CatalogSource, JsonCatalogSource, resolve_with_options};
use pgscaffold_preserve::{CycleReport, PreserveError, Preserver, write_atomic};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use logging::init_logging;
use settings::{Settings, load_or_create_settings};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("schema error: {0}")]
    Core(#[from] CoreError),
    #[error("generation error: {0}")]
    Generate(#[from] GenerateError),
    #[error("preservation error: {0}")]
    Preserve(#[from] PreserveError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("settings decode error: {0}")]
    TomlDecode(#[from] toml::de::Error),
    #[error("settings encode error: {0}")]
    TomlEncode(#[from] toml::ser::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("logging error: {0}")]
    Logging(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Parser, Debug)]
#[command(
    name = "pg-scaffold",
    version,
    about = "Resolve a schema catalog and regenerate code without losing custom edits"
)]
struct Cli {
    /// TOML settings file; created with defaults when missing.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Append JSON-lines logs to this file.
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve a catalog document into the entity graph.
    Resolve(ResolveArgs),
    /// Regenerate the output tree, carrying custom code over.
    Generate(GenerateArgs),
    /// Copy custom code from one generated tree into another.
    Preserve(PreserveArgs),
}

#[derive(Args, Debug)]
struct ResolveArgs {
    /// Catalog JSON document.
    #[arg(long, value_name = "PATH")]
    catalog: PathBuf,
    /// Write the entity graph here instead of stdout.
    #[arg(long, value_name = "PATH")]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Catalog JSON document.
    #[arg(long, value_name = "PATH")]
    catalog: PathBuf,
    /// Directory that receives the generated tree.
    #[arg(long, value_name = "DIR")]
    output_dir: PathBuf,
    /// Generator set (`v1` or `v2`); defaults to the settings file value.
    #[arg(long, value_name = "VERSION")]
    gen_version: Option<GenVersion>,
    /// Write the generation report as JSON.
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct PreserveArgs {
    /// Previously generated tree holding custom code.
    #[arg(long, value_name = "DIR")]
    from: PathBuf,
    /// Freshly generated tree to restore into.
    #[arg(long, value_name = "DIR")]
    into: PathBuf,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    let settings = match cli.config.as_deref() {
        Some(path) => load_or_create_settings(path)?,
        None => Settings::default(),
    };

    let run_id = Uuid::new_v4().to_string();
    let timer = Instant::now();
    tracing::info!(event = "run_started", run_id = %run_id, command = command_name(&cli.command));

    let result = match cli.command {
        Command::Resolve(args) => run_resolve(args, &settings),
        Command::Generate(args) => run_generate(args, &settings),
        Command::Preserve(args) => run_preserve(args, &settings),
    };

    let duration_ms = timer.elapsed().as_millis() as u64;
    match &result {
        Ok(()) => tracing::info!(
            event = "run_finished",
            run_id = %run_id,
            status = "success",
            duration_ms
        ),
        Err(err) => tracing::error!(
            event = "run_finished",
            run_id = %run_id,
            status = "failed",
            error = %err,
            duration_ms
        ),
    }
    result
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Resolve(_) => "resolve",
        Command::Generate(_) => "generate",
        Command::Preserve(_) => "preserve",
    }
}

fn run_resolve(args: ResolveArgs, settings: &Settings) -> Result<(), CliError> {
    let source = JsonCatalogSource::new(&args.catalog);
    let catalog = source.load()?;
    tracing::info!(event = "catalog_loaded", source = %source.describe());

    let graph: EntityGraph = resolve_with_options(&catalog, settings.resolve.clone())?;

    match args.out {
        Some(path) => {
            write_json(&path, &graph)?;
            tracing::info!(event = "graph_written", path = %path.display());
            println!(
                "resolved {} entities ({} relationship edges) into {}",
                graph.len(),
                graph.edge_count(),
                path.display()
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, &graph)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}

fn run_generate(args: GenerateArgs, settings: &Settings) -> Result<(), CliError> {
    let options = GenerateOptions {
        output_dir: args.output_dir,
        gen_version: args.gen_version.unwrap_or(settings.generate.gen_version),
        preserve: settings.preserve.clone(),
        resolve: settings.resolve.clone(),
    };

    let source = JsonCatalogSource::new(&args.catalog);
    let result = GenerationPipeline::new(options).run(&source)?;

    if let Some(path) = args.report.as_deref() {
        write_json(path, &result.report)?;
        tracing::info!(event = "report_written", path = %path.display());
    }

    print_generation_summary(&result.report);
    Ok(())
}

fn run_preserve(args: PreserveArgs, settings: &Settings) -> Result<(), CliError> {
    let preserver = Preserver::new(settings.preserve.clone());
    let report = preserver.preserve_and_restore(&args.from, &args.into)?;
    print_cycle_summary(&report);
    Ok(())
}

fn print_generation_summary(report: &GenerationReport) {
    println!(
        "generated {} files for {} entities into {} ({}, run {})",
        report.files_written.len(),
        report.entities,
        report.output_dir.display(),
        report.gen_version,
        report.run_id
    );
    println!(
        "preserved {} blocks from {} files, restored into {} files",
        report.blocks_preserved,
        report.files_preserved,
        report.files_restored.len()
    );
    for path in &report.files_protected {
        println!("protected (no provenance header): {path}");
    }
    for path in &report.skipped {
        println!("skipped: {path}");
    }
    for warning in &report.warnings {
        println!("warning: {warning}");
    }
}

fn print_cycle_summary(report: &CycleReport) {
    println!(
        "preserved {} blocks from {} files, restored into {} files",
        report.blocks_preserved,
        report.files_preserved,
        report.files_updated.len()
    );
    for path in &report.skipped {
        println!("skipped: {path}");
    }
    for warning in &report.warnings {
        println!("warning: {warning}");
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), CliError> {
    let mut data = serde_json::to_vec_pretty(value)?;
    data.push(b'\n');
    write_atomic(path, &data)?;
    Ok(())
}
