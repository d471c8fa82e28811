//! Externalizes static lookup tables from Rust source into CSV files.
//!
//! A table is a top-level `static` whose name ends with `_MAP` and whose
//! lazily-built map is written out as literals:
//!
//! ```rust,ignore
//! pub static MONSTER_MAP: LazyLock<HashMap<i64, Box<Monster>>> = LazyLock::new(|| {
//!     HashMap::from([
//!         (1, Box::new(Monster("Slime".into(), 10, 1.5))),
//!         (2, Box::new(Monster("Orc".into(), 20, -2.0))),
//!     ])
//! });
//! ```
//!
//! [`pipeline::run`] writes each such table to `<output_dir>/MONSTER_MAP.csv`
//! and rewrites the module so the map is filled by
//! `tablegen_runtime::load_table` from the embedded CSV text instead.

pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod io;
pub mod pipeline;
pub mod rewriter;
pub mod scanner;
pub mod writer;

pub use crate::config::{load_config, TablegenConfig};
pub use crate::core::{CandidateTable, KeyKind, RowRecord, SourceModule};
pub use crate::errors::{Error, Result};
pub use crate::pipeline::{process_module, run, ModuleOutcome, RunSummary};
pub use crate::rewriter::{rewrite_module, RewriteOptions};
pub use crate::scanner::scan_module;
pub use crate::writer::TableWriter;
