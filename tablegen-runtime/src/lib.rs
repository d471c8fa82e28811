//! Runtime support for tables externalized by `tablegen`.
//!
//! The generator moves the literal rows of a `static` lookup table into a CSV
//! file and rewrites the declaration to rebuild the table from that file on
//! first use:
//!
//! ```ignore
//! use tablegen_runtime::load_table;
//!
//! pub static MONSTER_MAP: LazyLock<HashMap<i64, Box<Monster>>> = LazyLock::new(|| {
//!     load_table(MONSTER_MAP_CSV, "csv/monsters.rs", "Monster").unwrap_or_else(|err| panic!("{err}"))
//! });
//!
//! static MONSTER_MAP_CSV: &str = include_str!("output/MONSTER_MAP.csv");
//! ```
//!
//! # Row format
//!
//! One CSV record per entry, no header. The first column is the key, the
//! rest are the struct's fields in declaration order:
//!
//! ```text
//! 1,"""Slime""",10,1.5
//! 2,"""Orc""",20,-2.0
//! r"slime",...
//! ```
//!
//! - key tokens starting with `r` are string keys (`r"slime"` → `slime`),
//!   all others are base-10 integers;
//! - integer and float fields are parsed as written;
//! - string and char fields carry their quotes, one character is stripped
//!   from each end;
//! - bool fields are `true` or `false`.
//!
//! Fields are matched by position, not by name. Reordering the fields of a
//! record struct invalidates every CSV generated before the change.

mod de;
mod error;
mod loader;

pub use de::RAW_KEY_PREFIX;
pub use error::{CoerceError, LoadError};
pub use loader::load_table;
