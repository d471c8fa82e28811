//! CSV side files, one per externalized table.

use std::path::{Path, PathBuf};

use log::debug;

use crate::core::CandidateTable;
use crate::errors::{Error, Result};
use crate::io;

/// Writes `<output_dir>/<IDENT>.csv` for each table.
#[derive(Debug, Clone)]
pub struct TableWriter {
    output_dir: PathBuf,
}

impl TableWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn path_for(&self, table: &CandidateTable) -> PathBuf {
        self.output_dir.join(table.csv_file_name())
    }

    /// CSV bytes for `table`: no header, key first, rows in source order.
    pub fn render(&self, table: &CandidateTable) -> Result<Vec<u8>> {
        let path = self.path_for(table);
        let csv_error = |source| Error::Csv {
            path: path.clone(),
            source,
        };

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(false)
            .from_writer(Vec::new());
        for row in &table.rows {
            writer.write_record(row.to_record()).map_err(csv_error)?;
        }
        writer
            .into_inner()
            .map_err(|err| csv_error(err.into_error().into()))
    }

    /// Render and write `table`, replacing any previous file.
    pub fn write(&self, table: &CandidateTable) -> Result<PathBuf> {
        let bytes = self.render(table)?;
        let path = self.path_for(table);
        io::write_bytes(&path, &bytes)?;
        debug!("wrote {} rows to {}", table.rows.len(), path.display());
        Ok(path)
    }
}
