use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::errors::{Error, Result};

/// Lists the source modules of an input directory.
///
/// Only files directly inside the root are considered; subdirectories
/// (including the CSV output directory) are never entered.
pub struct ModuleWalker {
    root: PathBuf,
}

const MODULE_EXTENSION: &str = "rs";

impl ModuleWalker {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Matching files in sorted path order.
    pub fn walk(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry.map_err(|err| {
                let path = err.path().unwrap_or(&self.root).to_path_buf();
                match err.into_io_error() {
                    Some(source) => Error::io(path, source),
                    None => Error::configuration(format!(
                        "cannot list {}: filesystem loop",
                        path.display()
                    )),
                }
            })?;

            if entry.file_type().is_file() && self.should_process(entry.path()) {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    fn should_process(&self, path: &Path) -> bool {
        path.extension()
            .is_some_and(|ext| ext == MODULE_EXTENSION)
    }
}

pub fn find_modules(root: &Path) -> Result<Vec<PathBuf>> {
    ModuleWalker::new(root.to_path_buf()).walk()
}
