//! The table-shape predicate.
//!
//! All assumptions about what a table declaration looks like live here:
//!
//! ```rust,ignore
//! pub static MONSTER_MAP: LazyLock<HashMap<i64, Box<Monster>>> = LazyLock::new(|| {
//!     HashMap::from([
//!         (1, Box::new(Monster("Slime".into(), 10, 1.5))),
//!     ])
//! });
//! ```
//!
//! The predicate only checks the declaration's outline (name, declared
//! type, initializer). Entries are checked by the extractor, which fails
//! hard instead of skipping.

use syn::punctuated::Punctuated;
use syn::{Expr, GenericArgument, Ident, Item, ItemStatic, PathArguments, PathSegment, Token, Type};

use crate::core::KeyKind;

const LAZY_WRAPPERS: &[&str] = &["LazyLock", "Lazy"];
const MAP_TYPES: &[&str] = &["HashMap", "BTreeMap"];
const INTEGER_KEYS: &[&str] = &[
    "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64", "u128", "usize",
];

/// Outline of a matched table declaration.
#[derive(Debug, Clone, Copy)]
pub struct TableShape<'ast> {
    pub item: &'ast ItemStatic,
    pub key_kind: KeyKind,
    pub element: &'ast Ident,
    pub lazy_type: &'ast syn::Path,
    /// Initializer closure body; replaced wholesale by the rewriter.
    pub body: &'ast Expr,
    pub entries: &'ast Punctuated<Expr, Token![,]>,
}

impl TableShape<'_> {
    pub fn identifier(&self) -> String {
        self.item.ident.to_string()
    }

    /// Lazy wrapper path without generic arguments, e.g. `std::sync::LazyLock`.
    pub fn lazy_path(&self) -> String {
        let segments: Vec<String> = self
            .lazy_type
            .segments
            .iter()
            .map(|segment| segment.ident.to_string())
            .collect();
        let prefix = if self.lazy_type.leading_colon.is_some() {
            "::"
        } else {
            ""
        };
        format!("{prefix}{}", segments.join("::"))
    }
}

#[derive(Debug, Clone, Copy)]
pub enum TableMatch<'ast> {
    NoMatch { reason: &'static str },
    Match(TableShape<'ast>),
}

macro_rules! require {
    ($value:expr, $reason:literal) => {
        match $value {
            Some(value) => value,
            None => return TableMatch::NoMatch { reason: $reason },
        }
    };
}

/// Decide whether `item` is a table declaration named with `suffix`.
pub fn match_table<'ast>(item: &'ast Item, suffix: &str) -> TableMatch<'ast> {
    let Item::Static(item) = item else {
        return TableMatch::NoMatch {
            reason: "not a static item",
        };
    };
    if !item.ident.to_string().ends_with(suffix) {
        return TableMatch::NoMatch {
            reason: "name does not carry the table suffix",
        };
    }

    let (lazy_type, map_type) = require!(
        lazy_wrapper(&item.ty),
        "declared type is not `LazyLock<..>` or `Lazy<..>`"
    );
    let (key_kind, element) = require!(
        map_parts(map_type),
        "declared type is not a map from a scalar key to `Box<Struct>`"
    );
    let body = require!(
        lazy_closure_body(&item.expr),
        "initializer is not `Lazy::new(|| ..)`"
    );
    let array = require!(
        map_from_array(unwrap_block(body)),
        "initializer does not build the map with `Map::from([..])`"
    );
    if array.elems.is_empty() {
        return TableMatch::NoMatch {
            reason: "table has no literal entries",
        };
    }

    TableMatch::Match(TableShape {
        item,
        key_kind,
        element,
        lazy_type,
        body,
        entries: &array.elems,
    })
}

fn type_path(ty: &Type) -> Option<&syn::Path> {
    match ty {
        Type::Path(path) if path.qself.is_none() => Some(&path.path),
        _ => None,
    }
}

fn type_arguments(segment: &PathSegment) -> Vec<&Type> {
    match &segment.arguments {
        PathArguments::AngleBracketed(args) => args
            .args
            .iter()
            .filter_map(|arg| match arg {
                GenericArgument::Type(ty) => Some(ty),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn lazy_wrapper(ty: &Type) -> Option<(&syn::Path, &Type)> {
    let path = type_path(ty)?;
    let segment = path.segments.last()?;
    if !LAZY_WRAPPERS.iter().any(|name| segment.ident == name) {
        return None;
    }
    match type_arguments(segment).as_slice() {
        [inner] => Some((path, *inner)),
        _ => None,
    }
}

fn map_parts(ty: &Type) -> Option<(KeyKind, &Ident)> {
    let segment = type_path(ty)?.segments.last()?;
    if !MAP_TYPES.iter().any(|name| segment.ident == name) {
        return None;
    }
    let args = type_arguments(segment);
    let [key, value] = args.as_slice() else {
        return None;
    };
    Some((key_kind(key)?, boxed_struct(*value)?))
}

fn key_kind(ty: &Type) -> Option<KeyKind> {
    let ident = type_path(ty)?.get_ident()?;
    if INTEGER_KEYS.iter().any(|name| ident == name) {
        Some(KeyKind::Integer)
    } else if ident == "String" {
        Some(KeyKind::String)
    } else {
        None
    }
}

fn boxed_struct(ty: &Type) -> Option<&Ident> {
    let segment = type_path(ty)?.segments.last()?;
    if segment.ident != "Box" {
        return None;
    }
    match type_arguments(segment).as_slice() {
        [inner] => type_path(*inner)?.get_ident(),
        _ => None,
    }
}

fn lazy_closure_body(expr: &Expr) -> Option<&Expr> {
    let Expr::Call(call) = expr else {
        return None;
    };
    let Expr::Path(func) = call.func.as_ref() else {
        return None;
    };
    if func.path.segments.last()?.ident != "new" || call.args.len() != 1 {
        return None;
    }
    match call.args.first()? {
        Expr::Closure(closure) if closure.inputs.is_empty() => Some(&closure.body),
        _ => None,
    }
}

/// `{ expr }` → `expr`; anything else is returned as is.
fn unwrap_block(expr: &Expr) -> &Expr {
    if let Expr::Block(block) = expr {
        if let [syn::Stmt::Expr(inner, None)] = block.block.stmts.as_slice() {
            if block.label.is_none() {
                return inner;
            }
        }
    }
    expr
}

fn map_from_array(expr: &Expr) -> Option<&syn::ExprArray> {
    let Expr::Call(call) = expr else {
        return None;
    };
    let Expr::Path(func) = call.func.as_ref() else {
        return None;
    };
    let segments: Vec<&PathSegment> = func.path.segments.iter().collect();
    let [.., map, from] = segments.as_slice() else {
        return None;
    };
    if from.ident != "from" || !MAP_TYPES.iter().any(|name| map.ident == name) {
        return None;
    }
    if call.args.len() != 1 {
        return None;
    }
    match call.args.first()? {
        Expr::Array(array) => Some(array),
        _ => None,
    }
}
