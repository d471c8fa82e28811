//! Finds table declarations in a parsed module.

pub mod extractor;
pub mod matcher;

use log::debug;
use syn::spanned::Spanned;
use syn::visit::Visit;
use syn::{Field, Fields, Item, ItemStruct, TypeReference};

use crate::core::{CandidateTable, SourceModule};
use crate::errors::Result;

pub use extractor::extract_rows;
pub use matcher::{match_table, TableMatch, TableShape};

/// Every table declaration of `module` with its rows, in source order.
///
/// Only top-level items are inspected. Any declaration that matches the
/// table outline but cannot be extracted fails the whole module.
pub fn scan_module(module: &SourceModule, suffix: &str) -> Result<Vec<CandidateTable>> {
    let mut tables = Vec::new();

    for item in &module.ast.items {
        let shape = match match_table(item, suffix) {
            TableMatch::Match(shape) => shape,
            TableMatch::NoMatch { reason } => {
                if let Item::Static(item) = item {
                    if item.ident.to_string().ends_with(suffix) {
                        debug!(
                            "{}: skipping {}: {}",
                            module.display_path, item.ident, reason
                        );
                    }
                }
                continue;
            }
        };

        let definition = find_struct(module, &shape.element.to_string());
        if let Some(field) = definition.and_then(|record| borrowed_field(&record.fields)) {
            return Err(module.structural(
                &field.ty,
                format!(
                    "struct {} field `{}` borrows its data; records loaded at start-up need owned fields such as String",
                    shape.element,
                    module.snippet(field.ty.span())?
                ),
            ));
        }

        let rows = extract_rows(module, &shape)?;
        if let (Some(definition), Some(first)) = (definition, rows.first()) {
            let declared = field_count(&definition.fields);
            if declared != first.field_tokens.len() {
                return Err(module.structural(
                    &shape.entries[0],
                    format!(
                        "{} rows have {} fields but struct {} declares {}",
                        shape.identifier(),
                        first.field_tokens.len(),
                        shape.element,
                        declared
                    ),
                ));
            }
        }

        debug!(
            "{}: found {} with {} rows",
            module.display_path,
            shape.identifier(),
            rows.len()
        );
        tables.push(CandidateTable {
            identifier: shape.identifier(),
            element_type_name: shape.element.to_string(),
            key_kind: shape.key_kind,
            lazy_path: shape.lazy_path(),
            body: module.range(shape.body.span())?,
            line: shape.item.ident.span().start().line,
            rows,
        });
    }

    Ok(tables)
}

/// Top-level struct named `name`.
pub fn find_struct<'a>(module: &'a SourceModule, name: &str) -> Option<&'a ItemStruct> {
    module.ast.items.iter().find_map(|item| match item {
        Item::Struct(item) if item.ident == name => Some(item),
        _ => None,
    })
}

/// First field whose type contains a reference anywhere, e.g. `&'static str`
/// or `Option<&[u8]>`.
fn borrowed_field(fields: &Fields) -> Option<&Field> {
    struct FindReference(bool);

    impl<'ast> Visit<'ast> for FindReference {
        fn visit_type_reference(&mut self, _: &'ast TypeReference) {
            self.0 = true;
        }
    }

    fields.iter().find(|field| {
        let mut finder = FindReference(false);
        finder.visit_type(&field.ty);
        finder.0
    })
}

fn field_count(fields: &Fields) -> usize {
    match fields {
        Fields::Named(named) => named.named.len(),
        Fields::Unnamed(unnamed) => unnamed.unnamed.len(),
        Fields::Unit => 0,
    }
}
