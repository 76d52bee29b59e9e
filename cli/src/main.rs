mod formatter;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use formatter::Formatter;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tenet::{DocNode, Engine, ResourceLimits};
use tracing::debug;

/// Exit code for documents that evaluated with errors
const EXIT_WITH_ERRORS: i32 = 2;

#[derive(Parser)]
#[command(name = "tenet")]
#[command(about = "Reason over declarative documents.")]
#[command(
    long_about = "Tenet evaluates document trees that declare symbols, rules and queries.\nDocuments are read as JSON trees; imports are resolved relative to the importing file."
)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    options: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalOptions {
    /// Log pipeline phases to stderr (same as RUST_LOG=tenet=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Maximum evaluation depth (nested expressions plus rule calls)
    #[arg(long, global = true, value_name = "N")]
    max_depth: Option<usize>,

    /// Maximum chain of nested imports
    #[arg(long, global = true, value_name = "N")]
    max_import_depth: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a document and display results
    ///
    /// Prints every recorded result, followed by the errors that were
    /// reported along the way. Partial results are shown even when some
    /// constructs failed.
    Run {
        /// Document tree to evaluate (JSON)
        file: PathBuf,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
        /// Print the execution trace
        #[arg(long)]
        trace: bool,
        /// Exit with status 2 when any error was reported
        #[arg(long)]
        strict: bool,
    },
    /// Resolve and compile a document without evaluating it
    ///
    /// Reports resolution, compilation and import errors. Exits with
    /// status 2 when there are any.
    Check {
        /// Document tree to check (JSON)
        file: PathBuf,
    },
    /// Show the resolved symbol table
    Symbols {
        /// Document tree to inspect (JSON)
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.options.verbose);

    let engine = Engine::with_limits(limits(&cli.options));
    let result = match &cli.command {
        Commands::Run {
            file,
            json,
            trace,
            strict,
        } => run_command(&engine, file, *json, *trace, *strict),
        Commands::Check { file } => check_command(&engine, file),
        Commands::Symbols { file } => symbols_command(&engine, file),
    };

    match result {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "tenet=debug" } else { "tenet=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(io::stderr)
        .init();
}

fn limits(options: &GlobalOptions) -> ResourceLimits {
    let mut limits = ResourceLimits::default();
    if let Some(depth) = options.max_depth {
        limits.max_evaluation_depth = depth;
    }
    if let Some(depth) = options.max_import_depth {
        limits.max_import_depth = depth;
    }
    limits
}

fn run_command(engine: &Engine, file: &Path, json: bool, trace: bool, strict: bool) -> Result<i32> {
    let doc = read_document(file)?;
    let source = file.display().to_string();

    let result = engine.evaluate(Some(&doc), Some(&source));
    debug!(
        results = result.results.len(),
        errors = result.errors.len(),
        "evaluated {}",
        source
    );

    if json {
        println!("{}", result.to_json().context("Failed to serialize the result")?);
    } else {
        print!("{}", Formatter::new().format_result(&result, trace));
    }

    Ok(if strict && result.has_errors() {
        EXIT_WITH_ERRORS
    } else {
        0
    })
}

fn check_command(engine: &Engine, file: &Path) -> Result<i32> {
    let doc = read_document(file)?;
    let source = file.display().to_string();
    let linked = engine.link(Some(&doc), Some(&source));

    if linked.errors.is_empty() {
        println!(
            "{}: ok ({} symbols, {} rules)",
            source,
            linked.symbols.len(),
            linked.rules.len()
        );
        return Ok(0);
    }

    print!("{}", Formatter::new().format_errors(&linked.errors));
    Ok(EXIT_WITH_ERRORS)
}

fn symbols_command(engine: &Engine, file: &Path) -> Result<i32> {
    let doc = read_document(file)?;
    let source = file.display().to_string();
    let linked = engine.link(Some(&doc), Some(&source));

    let formatter = Formatter::new();
    print!("{}", formatter.format_symbols(&linked.symbols));
    if !linked.errors.is_empty() {
        eprint!("{}", formatter.format_errors(&linked.errors));
    }
    Ok(0)
}

fn read_document(file: &Path) -> Result<DocNode> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read '{}'", file.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("'{}' is not a valid document tree", file.display()))
}
