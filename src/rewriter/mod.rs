//! Rewrites a module so its tables load from CSV at start-up.
//!
//! The new text is built by splicing edits into the original source:
//!
//! 1. `use` declarations for the loader (and `serde::Deserialize` when a
//!    derive is injected), unless already in scope;
//! 2. `#[derive(Deserialize)]` on record structs defined in the module;
//! 3. each table initializer body replaced by a `load_table` call;
//! 4. a `<IDENT>_CSV` embedding static per table and one `init_tables`
//!    function appended at the end.
//!
//! Everything else stays byte-for-byte as it was.

pub mod codegen;
pub mod edits;
pub mod imports;

use std::collections::BTreeSet;

use log::warn;
use syn::Item;

use crate::core::{CandidateTable, SourceModule};
use crate::errors::{Error, Result};
use crate::scanner::find_struct;

pub use edits::{apply_edits, Edit};
pub use imports::{Import, ImportSet};

const DESERIALIZE_PATH: &str = "serde::Deserialize";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOptions {
    /// Path of the runtime crate, e.g. `tablegen_runtime`.
    pub runtime_crate: String,
    /// CSV directory relative to the module's directory, `/`-separated.
    pub csv_dir: String,
}

/// New text for `module` with every table in `tables` externalized.
///
/// Nothing is written; all checks happen before the caller touches disk.
pub fn rewrite_module(
    module: &SourceModule,
    tables: &[CandidateTable],
    options: &RewriteOptions,
) -> Result<String> {
    check_generated_names(module, tables)?;

    let mut edits = Vec::new();
    let mut imports = ImportSet::from_items(&module.ast.items);
    let mut wanted = vec![format!("{}::{}", options.runtime_crate, codegen::LOADER_FN)];

    let records: BTreeSet<&str> = tables
        .iter()
        .map(|table| table.element_type_name.as_str())
        .collect();
    let mut derived = false;
    for record in records {
        match find_struct(module, record) {
            Some(item) => {
                if let Some(edit) = codegen::derive_edit(module, item)? {
                    edits.push(edit);
                    derived = true;
                }
            }
            None => warn!(
                "{}: struct {record} is not defined in this module; it must implement Deserialize",
                module.display_path
            ),
        }
    }
    if derived {
        wanted.push(DESERIALIZE_PATH.to_string());
    }

    let mut added = Vec::new();
    for path in wanted {
        match imports.require(&path) {
            Import::Present => {}
            Import::Added => added.push(path),
            Import::Conflict { existing } => {
                let name = path.rsplit("::").next().unwrap_or(&path).to_string();
                return Err(Error::ImportConflict {
                    file: module.display_path.clone(),
                    name,
                    existing,
                    wanted: path,
                });
            }
        }
    }
    edits.extend(imports::import_edit(module, &added)?);

    for table in tables {
        edits.push(Edit::replace(
            table.body.clone(),
            codegen::loader_call(table, &module.display_path),
        ));
    }
    edits.push(Edit::insert(module.text.len(), appendix(module, tables, options)));

    apply_edits(&module.text, edits).ok_or_else(|| Error::Structural {
        file: module.display_path.clone(),
        line: tables.first().map_or(1, |table| table.line),
        column: 1,
        construct: String::new(),
        message: "generated edits overlap".into(),
    })
}

fn appendix(module: &SourceModule, tables: &[CandidateTable], options: &RewriteOptions) -> String {
    let mut out = String::new();
    if !module.text.ends_with('\n') {
        out.push('\n');
    }
    out.push('\n');
    for table in tables {
        out.push_str(&codegen::embed_static(table, &options.csv_dir));
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&codegen::init_function(tables));
    out.push('\n');
    out
}

/// The generated items must not collide with items already in the module.
fn check_generated_names(module: &SourceModule, tables: &[CandidateTable]) -> Result<()> {
    let mut reserved: Vec<String> = tables.iter().map(CandidateTable::embed_name).collect();
    reserved.push(codegen::INIT_FN.to_string());

    for item in &module.ast.items {
        let ident = match item {
            Item::Fn(item) => &item.sig.ident,
            Item::Static(item) => &item.ident,
            Item::Const(item) => &item.ident,
            _ => continue,
        };
        if reserved.iter().any(|name| ident == name) {
            return Err(module.structural(
                ident,
                format!("`{ident}` is generated by tablegen and already exists in this module"),
            ));
        }
    }
    Ok(())
}
