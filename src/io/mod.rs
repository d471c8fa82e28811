pub mod walker;

pub use walker::{find_modules, ModuleWalker};

use std::fs;
use std::path::Path;

use crate::errors::{Error, Result};

pub fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|err| Error::io(path, err))
}

pub fn write_file(path: &Path, content: &str) -> Result<()> {
    write_bytes(path, content.as_bytes())
}

pub fn write_bytes(path: &Path, content: &[u8]) -> Result<()> {
    fs::write(path, content).map_err(|err| Error::io(path, err))
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|err| Error::io(path, err))?;
    }
    Ok(())
}

pub fn dir_exists(path: &Path) -> bool {
    path.exists() && path.is_dir()
}
