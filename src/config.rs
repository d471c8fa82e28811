//! Run configuration.
//!
//! Values come from built-in defaults, then `tablegen.toml` (in the working
//! directory, or the file named by `--config`), then command-line flags.
//! With no file and no flags the tool processes `csv/` and writes CSV
//! files to `csv/output/`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::io;

pub const CONFIG_FILE_NAME: &str = "tablegen.toml";

pub const DEFAULT_INPUT_DIR: &str = "csv";
pub const DEFAULT_OUTPUT_SUBDIR: &str = "output";
pub const DEFAULT_SUFFIX: &str = "_MAP";
pub const DEFAULT_RUNTIME_CRATE: &str = "tablegen_runtime";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TablegenConfig {
    /// Directory whose `*.rs` files are scanned and rewritten.
    pub input_dir: PathBuf,
    /// Where CSV files go; `<input_dir>/output` when unset.
    pub output_dir: Option<PathBuf>,
    /// Identifier suffix marking a table declaration.
    pub suffix: String,
    /// Crate path the generated `use` of `load_table` refers to.
    pub runtime_crate: String,
}

impl Default for TablegenConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: None,
            suffix: DEFAULT_SUFFIX.to_string(),
            runtime_crate: DEFAULT_RUNTIME_CRATE.to_string(),
        }
    }
}

impl TablegenConfig {
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| self.input_dir.join(DEFAULT_OUTPUT_SUBDIR))
    }

    pub fn validate(&self) -> Result<()> {
        if self.suffix.is_empty() {
            return Err(Error::configuration("suffix must not be empty"));
        }
        if !self
            .suffix
            .chars()
            .all(|ch| ch.is_alphanumeric() || ch == '_')
        {
            return Err(Error::configuration(format!(
                "suffix `{}` cannot end an identifier",
                self.suffix
            )));
        }
        if !is_crate_path(&self.runtime_crate) {
            return Err(Error::configuration(format!(
                "runtime_crate `{}` is not a Rust path",
                self.runtime_crate
            )));
        }
        Ok(())
    }
}

fn is_crate_path(path: &str) -> bool {
    let path = path.strip_prefix("::").unwrap_or(path);
    path.split("::").all(|segment| syn::parse_str::<syn::Ident>(segment).is_ok())
}

pub fn parse_config(contents: &str) -> Result<TablegenConfig> {
    let config: TablegenConfig = toml::from_str(contents)
        .map_err(|e| Error::configuration(format!("Failed to parse {CONFIG_FILE_NAME}: {e}")))?;
    config.validate()?;
    Ok(config)
}

/// Load `explicit`, or `tablegen.toml` from the working directory when it
/// exists, or the defaults.
///
/// A file that exists but does not parse is an error, never silently
/// replaced by defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<TablegenConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let path = PathBuf::from(CONFIG_FILE_NAME);
            if !path.is_file() {
                log::debug!("No {CONFIG_FILE_NAME} found. Using default config.");
                return Ok(TablegenConfig::default());
            }
            path
        }
    };

    let contents = io::read_file(&path)?;
    let config = parse_config(&contents)
        .map_err(|err| Error::configuration(format!("{}: {err}", path.display())))?;
    log::debug!("Loaded config from {}", path.display());
    Ok(config)
}
