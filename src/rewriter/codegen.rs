//! Text of the generated declarations.
//!
//! String literals are emitted with `{:?}`, which always yields a valid
//! Rust string literal for any path or name.

use syn::punctuated::Punctuated;
use syn::{ItemStruct, Token, Visibility};

use crate::core::{CandidateTable, SourceModule};
use crate::errors::Result;
use crate::rewriter::edits::Edit;

pub const LOADER_FN: &str = "load_table";
pub const INIT_FN: &str = "init_tables";

/// New initializer closure body for `table`.
pub fn loader_call(table: &CandidateTable, module_path: &str) -> String {
    format!(
        "{LOADER_FN}({}, {:?}, {:?}).unwrap_or_else(|err| panic!(\"{{err}}\"))",
        table.embed_name(),
        module_path,
        table.element_type_name
    )
}

/// `static <IDENT>_CSV: &str = include_str!("<csv_dir>/<IDENT>.csv");`
///
/// `csv_dir` is relative to the module's directory, with `/` separators.
pub fn embed_static(table: &CandidateTable, csv_dir: &str) -> String {
    let file = table.csv_file_name();
    let path = if csv_dir.is_empty() {
        file
    } else {
        format!("{}/{file}", csv_dir.trim_end_matches('/'))
    };
    format!(
        "static {}: &str = include_str!({path:?});",
        table.embed_name()
    )
}

/// The start-up routine forcing every table of the module.
pub fn init_function(tables: &[CandidateTable]) -> String {
    let mut out = String::new();
    out.push_str("/// Loads every table of this module; call once at start-up.\n");
    out.push_str(&format!("pub fn {INIT_FN}() {{\n"));
    for table in tables {
        out.push_str(&format!(
            "    {}::force(&{});\n",
            table.lazy_path, table.identifier
        ));
    }
    out.push('}');
    out
}

/// Whether `item` already has `Deserialize` (under any path) in a derive.
pub fn derives_deserialize(item: &ItemStruct) -> bool {
    item.attrs
        .iter()
        .filter(|attr| attr.path().is_ident("derive"))
        .any(|attr| {
            attr.parse_args_with(Punctuated::<syn::Path, Token![,]>::parse_terminated)
                .map(|paths| {
                    paths.iter().any(|path| {
                        path.segments
                            .last()
                            .is_some_and(|segment| segment.ident == "Deserialize")
                    })
                })
                .unwrap_or(false)
        })
}

/// Insert `#[derive(Deserialize)]` right above the `struct` keyword (below
/// any doc comments and attributes), or `None` if it already derives it.
pub fn derive_edit(module: &SourceModule, item: &ItemStruct) -> Result<Option<Edit>> {
    if derives_deserialize(item) {
        return Ok(None);
    }

    let start = match &item.vis {
        Visibility::Inherited => module.range(item.struct_token.span)?.start,
        vis => module.range(syn::spanned::Spanned::span(vis))?.start,
    };
    let line_start = module.text[..start].rfind('\n').map_or(0, |idx| idx + 1);
    let indent = &module.text[line_start..start];
    let indent = if indent.chars().all(char::is_whitespace) {
        indent
    } else {
        ""
    };

    Ok(Some(Edit::insert(
        start,
        format!("#[derive(Deserialize)]\n{indent}"),
    )))
}
