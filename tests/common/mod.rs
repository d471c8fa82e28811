// Test utility module for tablegen integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tablegen::TablegenConfig;
use tempfile::TempDir;

pub const MONSTERS: &str = indoc::indoc! {r#"
    use std::collections::HashMap;
    use std::sync::LazyLock;

    #[derive(Debug)]
    pub struct Monster(pub String, pub i64, pub f64);

    pub static MONSTER_MAP: LazyLock<HashMap<i64, Box<Monster>>> = LazyLock::new(|| {
        HashMap::from([
            (1, Box::new(Monster("Slime".into(), 10, 1.5))),
            (2, Box::new(Monster("Orc".into(), 20, -2.0))),
        ])
    });
"#};

/// A temporary project root with a `csv/` input directory.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir(dir.path().join("csv")).expect("Failed to create input dir");
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn input_dir(&self) -> PathBuf {
        self.root().join("csv")
    }

    pub fn config(&self) -> TablegenConfig {
        TablegenConfig {
            input_dir: self.input_dir(),
            ..TablegenConfig::default()
        }
    }

    pub fn write_module(&self, name: &str, text: &str) -> PathBuf {
        let path = self.input_dir().join(name);
        fs::write(&path, text).expect("Failed to write module");
        path
    }

    pub fn read_module(&self, name: &str) -> String {
        fs::read_to_string(self.input_dir().join(name)).expect("Failed to read module")
    }

    pub fn csv_path(&self, table: &str) -> PathBuf {
        self.input_dir().join("output").join(format!("{table}.csv"))
    }

    pub fn read_csv(&self, table: &str) -> String {
        fs::read_to_string(self.csv_path(table)).expect("Failed to read CSV")
    }
}
