//! Typeflat Command-Line Tool
//!
//! Rewrites circular `Insert`/`Update` declarations in a generated
//! `database.types.ts` into flat object types.

mod formatter;

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use formatter::OutputFormat;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use typeflat_core::{
    flatten, flatten_file, BlockStatus, FlattenConfig, FlattenReport, TableReport,
    DEFAULT_TYPES_PATH,
};

/// Typeflat - flatten circular database type declarations
#[derive(Parser, Debug)]
#[command(name = "typeflat")]
#[command(version, about = "Flatten circular Insert/Update declarations in generated database types")]
pub struct Args {
    /// Declaration file to rewrite (`-` reads stdin)
    #[arg(default_value = DEFAULT_TYPES_PATH)]
    pub path: PathBuf,

    /// Write to another file instead (`-` writes stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Report circular declarations and exit non-zero if any remain
    #[arg(long, conflicts_with = "dry_run")]
    pub check: bool,

    /// Flatten and report without writing
    #[arg(long)]
    pub dry_run: bool,

    /// Do not add missing Relationships markers
    #[arg(long)]
    pub no_relationships: bool,

    /// Root type name used by circular references
    #[arg(long, default_value = "Database")]
    pub root_type: String,

    /// Indent width in spaces for synthesized blocks
    #[arg(long, default_value_t = 2)]
    pub indent: usize,

    /// Report format
    #[arg(long, default_value = "text", value_enum)]
    pub format: OutputFormat,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Build the flattening configuration.
    pub fn into_config(&self) -> FlattenConfig {
        let config = FlattenConfig::new()
            .with_root_type(&self.root_type)
            .with_indent_width(self.indent);
        if self.no_relationships {
            config.without_relationships()
        } else {
            config
        }
    }

    /// Whether the run must not write anything.
    fn pending(&self) -> bool {
        self.check || self.dry_run
    }
}

/// CLI errors.
#[derive(Debug, Error)]
enum CliError {
    /// Already rendered with source context.
    #[error("{0}")]
    Flatten(String),

    #[error("cannot read {path}: {source}")]
    Read { path: String, source: io::Error },

    #[error("cannot write {path}: {source}")]
    Write { path: String, source: io::Error },

    #[error("cannot render report: {0}")]
    Report(#[from] serde_json::Error),
}

fn main() {
    let args = Args::parse();

    // Logs go to stderr so `--output -` stays clean
    let default_filter = if args.verbose {
        "typeflat=debug,typeflat_core=debug"
    } else {
        "typeflat=info,typeflat_core=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    match run(&args) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}", e.to_string().trim_end());
            std::process::exit(1);
        }
    }
}

/// Run the tool. Returns `Ok(false)` when `--check` finds work to do.
fn run(args: &Args) -> Result<bool, CliError> {
    let config = args.into_config();
    let in_place = !args.pending() && args.output.is_none() && !is_stdio(&args.path);

    let outcome = if in_place {
        // Writes only when the content changed
        flatten_file(&args.path, &config).map_err(|e| {
            let source = std::fs::read_to_string(&args.path).ok();
            flatten_error(&args.path, &e, source.as_deref())
        })?
    } else {
        let source = read_input(&args.path)?;
        flatten(&source, &config).map_err(|e| flatten_error(&args.path, &e, Some(&source)))?
    };

    let destination = args.output.as_deref().unwrap_or(&args.path);
    let to_stdout = is_stdio(destination);

    if !args.pending() && !in_place {
        write_output(destination, &outcome.output)?;
        tracing::info!(path = %crate::display(destination), "wrote output");
    }

    let report = formatter::format_report(
        &outcome.report,
        args.format,
        outcome.changed(),
        args.pending(),
    )?;
    if to_stdout && !args.pending() {
        eprintln!("{}", report);
    } else {
        println!("{}", report);
    }

    if args.check {
        let findings = audit(&outcome.report);
        for (table, finding) in &findings {
            tracing::warn!(
                schema = table.schema.as_deref().unwrap_or("-"),
                table = %table.table,
                "{}",
                finding
            );
        }
        return Ok(findings.is_empty());
    }

    Ok(true)
}

/// Tables that fail `--check`, each with the reason.
///
/// A circular block that could not be resolved fails the check as well as
/// one that would be rewritten.
fn audit(report: &FlattenReport) -> Vec<(&TableReport, &'static str)> {
    report
        .tables
        .iter()
        .filter_map(|table| {
            let blocks = [table.insert, table.update];
            let finding = if blocks.contains(&BlockStatus::Fixed) {
                "table has circular declarations"
            } else if blocks.contains(&BlockStatus::Skipped) {
                "circular declaration references a table without Row fields"
            } else if table.relationships_added {
                "table is missing a Relationships marker"
            } else {
                return None;
            };
            Some((table, finding))
        })
        .collect()
}

fn flatten_error(path: &Path, error: &typeflat_core::Error, source: Option<&str>) -> CliError {
    let rendered = match source {
        Some(source) => error.format_with_source(source),
        None => format!("error: {}", error),
    };
    CliError::Flatten(format!("{}: {}", display(path), rendered))
}

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn display(path: &Path) -> String {
    if is_stdio(path) {
        "<stdin>".to_string()
    } else {
        path.display().to_string()
    }
}

fn read_input(path: &Path) -> Result<String, CliError> {
    let read_err = |source: io::Error| CliError::Read {
        path: display(path),
        source,
    };

    if is_stdio(path) {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).map_err(read_err)?;
        return Ok(buf);
    }

    std::fs::read_to_string(path).map_err(read_err)
}

fn write_output(path: &Path, contents: &str) -> Result<(), CliError> {
    let write_err = |source: io::Error| CliError::Write {
        path: if is_stdio(path) {
            "<stdout>".to_string()
        } else {
            path.display().to_string()
        },
        source,
    };

    if is_stdio(path) {
        let mut stdout = io::stdout();
        stdout.write_all(contents.as_bytes()).map_err(write_err)?;
        return stdout.flush().map_err(write_err);
    }

    std::fs::write(path, contents).map_err(write_err)
}
