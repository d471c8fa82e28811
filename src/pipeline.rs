//! One extraction run over an input directory.
//!
//! Modules are processed one at a time in sorted order. For each module all
//! checks run before anything is written; a failure stops the run, and
//! modules completed earlier stay rewritten.

use std::path::{Path, PathBuf};

use log::info;

use crate::config::TablegenConfig;
use crate::core::parsing::reset_span_locations;
use crate::core::SourceModule;
use crate::errors::{Error, Result};
use crate::io;
use crate::rewriter::{rewrite_module, RewriteOptions};
use crate::scanner::scan_module;
use crate::writer::TableWriter;

/// What a run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub modules_scanned: usize,
    pub modules_rewritten: Vec<PathBuf>,
    pub csv_files: Vec<PathBuf>,
}

impl RunSummary {
    pub fn tables_written(&self) -> usize {
        self.csv_files.len()
    }
}

/// Result of [`process_module`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleOutcome {
    /// No table declarations; the file was not touched.
    Skipped,
    Rewritten { csv_files: Vec<PathBuf> },
}

pub fn run(config: &TablegenConfig) -> Result<RunSummary> {
    config.validate()?;
    let input_dir = &config.input_dir;
    if !io::dir_exists(input_dir) {
        return Err(Error::configuration(format!(
            "input directory {} does not exist",
            input_dir.display()
        )));
    }
    let output_dir = config.output_dir();
    io::ensure_dir(&output_dir)?;

    let writer = TableWriter::new(&output_dir);
    let options = RewriteOptions {
        runtime_crate: config.runtime_crate.clone(),
        csv_dir: relative_csv_dir(input_dir, &output_dir)?,
    };

    let mut summary = RunSummary::default();
    for path in io::find_modules(input_dir)? {
        summary.modules_scanned += 1;
        match process_module(&path, &config.suffix, &writer, &options)? {
            ModuleOutcome::Skipped => {}
            ModuleOutcome::Rewritten { csv_files } => {
                summary.modules_rewritten.push(path);
                summary.csv_files.extend(csv_files);
            }
        }
    }

    info!(
        "{} modules scanned, {} rewritten, {} tables externalized",
        summary.modules_scanned,
        summary.modules_rewritten.len(),
        summary.tables_written()
    );
    Ok(summary)
}

/// Scan, rewrite in memory, then write the CSV files and the module.
pub fn process_module(
    path: &Path,
    suffix: &str,
    writer: &TableWriter,
    options: &RewriteOptions,
) -> Result<ModuleOutcome> {
    let text = io::read_file(path)?;
    let module = SourceModule::parse(path, text);
    let prepared = module.and_then(|module| {
        let tables = scan_module(&module, suffix)?;
        if tables.is_empty() {
            return Ok(None);
        }
        let rewritten = rewrite_module(&module, &tables, options)?;
        Ok(Some((tables, rewritten)))
    });
    reset_span_locations();

    let Some((tables, rewritten)) = prepared? else {
        info!("{}: no tables, skipped", path.display());
        return Ok(ModuleOutcome::Skipped);
    };

    let csv_files = tables
        .iter()
        .map(|table| writer.write(table))
        .collect::<Result<Vec<_>>>()?;
    io::write_file(path, &rewritten)?;

    info!(
        "{}: externalized {}",
        path.display(),
        tables
            .iter()
            .map(|table| format!("{} ({} rows)", table.identifier, table.rows.len()))
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(ModuleOutcome::Rewritten { csv_files })
}

/// `output_dir` as seen from `input_dir`, with `/` separators for
/// `include_str!`.
fn relative_csv_dir(input_dir: &Path, output_dir: &Path) -> Result<String> {
    let absolute = |path: &Path| std::path::absolute(path).map_err(|err| Error::io(path, err));
    let from = absolute(input_dir)?;
    let to = absolute(output_dir)?;
    let relative = pathdiff::diff_paths(&to, &from).unwrap_or(to);

    let parts: Vec<String> = relative
        .components()
        .map(|part| part.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}
