//! Top-level `use` bookkeeping.
//!
//! Every `use` tree is flattened into `name -> canonical path` bindings, so
//! `use serde::{Deserialize, Serialize};` and `use serde::Deserialize;` both
//! bind `Deserialize` to `serde::Deserialize`. Items defined in the module
//! bind their own name to `self::<name>`.

use std::collections::HashMap;

use syn::spanned::Spanned;
use syn::{Ident, Item, UseTree};

use crate::core::SourceModule;
use crate::errors::Result;
use crate::rewriter::edits::Edit;

/// Outcome of [`ImportSet::require`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Import {
    /// Already in scope, by name or through a glob.
    Present,
    /// Not in scope; a `use` has to be added.
    Added,
    /// The name is taken by another path.
    Conflict { existing: String },
}

#[derive(Debug, Default)]
pub struct ImportSet {
    bindings: HashMap<String, String>,
    globs: Vec<String>,
}

impl ImportSet {
    pub fn from_items(items: &[Item]) -> Self {
        let mut set = Self::default();
        for item in items {
            match item {
                Item::Use(item) => set.flatten(&item.tree, Vec::new()),
                other => {
                    if let Some(name) = defined_name(other) {
                        set.bindings
                            .entry(name.clone())
                            .or_insert_with(|| format!("self::{name}"));
                    }
                }
            }
        }
        set
    }

    fn flatten(&mut self, tree: &UseTree, mut prefix: Vec<String>) {
        match tree {
            UseTree::Path(path) => {
                prefix.push(path.ident.to_string());
                self.flatten(&path.tree, prefix);
            }
            UseTree::Name(name) => self.bind(prefix, &name.ident, None),
            UseTree::Rename(rename) => self.bind(prefix, &rename.ident, Some(&rename.rename)),
            UseTree::Glob(_) => self.globs.push(prefix.join("::")),
            UseTree::Group(group) => {
                for tree in &group.items {
                    self.flatten(tree, prefix.clone());
                }
            }
        }
    }

    fn bind(&mut self, mut path: Vec<String>, ident: &Ident, rename: Option<&Ident>) {
        if ident != "self" {
            path.push(ident.to_string());
        }
        let Some(last) = path.last().cloned() else {
            return;
        };
        let name = match rename {
            Some(rename) if rename == "_" => return,
            Some(rename) => rename.to_string(),
            None => last,
        };
        self.bindings.insert(name, path.join("::"));
    }

    /// Check whether `path` can be referred to by its last segment, and
    /// record it when it still has to be imported.
    pub fn require(&mut self, path: &str) -> Import {
        let canonical = path.trim_start_matches("::");
        let (prefix, name) = canonical.rsplit_once("::").unwrap_or(("", canonical));

        match self.bindings.get(name) {
            Some(existing) if existing == canonical => Import::Present,
            Some(existing) => Import::Conflict {
                existing: existing.clone(),
            },
            None if self.globs.iter().any(|glob| glob == prefix) => Import::Present,
            None => {
                self.bindings
                    .insert(name.to_string(), canonical.to_string());
                Import::Added
            }
        }
    }
}

fn defined_name(item: &Item) -> Option<String> {
    let ident = match item {
        Item::Fn(item) => &item.sig.ident,
        Item::Struct(item) => &item.ident,
        Item::Enum(item) => &item.ident,
        Item::Union(item) => &item.ident,
        Item::Trait(item) => &item.ident,
        Item::Type(item) => &item.ident,
        Item::Static(item) => &item.ident,
        Item::Const(item) => &item.ident,
        Item::Mod(item) => &item.ident,
        _ => return None,
    };
    Some(ident.to_string())
}

/// One edit adding `use <path>;` for each of `paths`.
///
/// New imports go on the line after the last top-level `use`, keeping a
/// trailing comment on its line. Without a `use` they go after the inner
/// attributes, else at the top of the module.
pub fn import_edit(module: &SourceModule, paths: &[String]) -> Result<Option<Edit>> {
    if paths.is_empty() {
        return Ok(None);
    }
    let lines: Vec<String> = paths.iter().map(|path| format!("use {path};")).collect();
    let block = lines.join("\n");

    let last_use = module.ast.items.iter().rev().find_map(|item| match item {
        Item::Use(item) => Some(item),
        _ => None,
    });
    let edit = if let Some(item) = last_use {
        let end = module.range(item.span())?.end;
        let line_end = module.text[end..]
            .find('\n')
            .map_or(module.text.len(), |offset| end + offset);
        let rest = module.text[end..line_end].trim_start();
        let at = if rest.is_empty() || rest.starts_with("//") {
            line_end
        } else {
            end
        };
        Edit::insert(at, format!("\n{block}"))
    } else if let Some(attr) = module.ast.attrs.last() {
        Edit::insert(module.range(attr.span())?.end, format!("\n\n{block}"))
    } else {
        Edit::insert(module.body_start(), format!("{block}\n\n"))
    };
    Ok(Some(edit))
}
