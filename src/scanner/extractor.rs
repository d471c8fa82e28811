//! Converts the entries of a matched table literal into row tokens.
//!
//! Tokens are normalized so the runtime loader can read them without a
//! Rust lexer: numbers lose suffixes and separators, strings and chars are
//! re-quoted from their unescaped value, string keys always carry the
//! runtime's raw-key prefix (`r"..."`).

use syn::{Expr, ExprCall, Lit, UnOp};
use tablegen_runtime::RAW_KEY_PREFIX;

use crate::core::{KeyKind, RowRecord, SourceModule};
use crate::errors::Result;
use crate::scanner::matcher::TableShape;

const STRING_CONVERSIONS: &[&str] = &["into", "to_string", "to_owned"];

/// Rows of `shape`, in source order.
pub fn extract_rows(module: &SourceModule, shape: &TableShape<'_>) -> Result<Vec<RowRecord>> {
    let mut rows: Vec<RowRecord> = Vec::with_capacity(shape.entries.len());
    for entry in shape.entries {
        let row = extract_row(module, shape, entry)?;
        if let Some(first) = rows.first() {
            if first.field_tokens.len() != row.field_tokens.len() {
                return Err(module.structural(
                    entry,
                    format!(
                        "entry has {} fields but the first entry of {} has {}",
                        row.field_tokens.len(),
                        shape.identifier(),
                        first.field_tokens.len()
                    ),
                ));
            }
        }
        rows.push(row);
    }
    Ok(rows)
}

fn extract_row(module: &SourceModule, shape: &TableShape<'_>, entry: &Expr) -> Result<RowRecord> {
    let Expr::Tuple(tuple) = entry else {
        return Err(module.structural(entry, "expected a `(key, Box::new(..))` entry"));
    };
    let elems: Vec<&Expr> = tuple.elems.iter().collect();
    let [key, value] = elems.as_slice() else {
        return Err(module.structural(entry, "expected a `(key, Box::new(..))` entry"));
    };

    let key_token = key_token(module, shape.key_kind, key)?;
    let record = boxed_record(module, shape, value)?;
    let field_tokens = record
        .args
        .iter()
        .map(|arg| field_token(module, arg))
        .collect::<Result<Vec<_>>>()?;

    Ok(RowRecord {
        key_token,
        field_tokens,
    })
}

/// `Box::new(Element(..))` → the `Element(..)` call.
fn boxed_record<'a>(
    module: &SourceModule,
    shape: &TableShape<'_>,
    value: &'a Expr,
) -> Result<&'a ExprCall> {
    let inner = match value {
        Expr::Call(call) if call_path_ends_with(call, &["Box", "new"]) && call.args.len() == 1 => {
            &call.args[0]
        }
        _ => return Err(module.structural(value, "expected `Box::new(..)` as the entry value")),
    };

    let element = shape.element.to_string();
    match inner {
        Expr::Call(call) if call_path_ends_with(call, &[element.as_str()]) => Ok(call),
        Expr::Struct(_) => Err(module.structural(
            inner,
            format!(
                "fields of {} must be positional; write `{}(..)` instead of named fields",
                shape.element, shape.element
            ),
        )),
        _ => Err(module.structural(
            inner,
            format!("expected a `{}(..)` constructor", shape.element),
        )),
    }
}

fn call_path_ends_with(call: &ExprCall, names: &[&str]) -> bool {
    let Expr::Path(func) = call.func.as_ref() else {
        return false;
    };
    let segments: Vec<String> = func
        .path
        .segments
        .iter()
        .map(|segment| segment.ident.to_string())
        .collect();
    segments.ends_with(&names.iter().map(|name| name.to_string()).collect::<Vec<_>>())
}

/// Strip `.into()`, `.to_string()`, `.to_owned()` and `String::from(..)`.
fn peel_conversion(expr: &Expr) -> &Expr {
    match expr {
        Expr::MethodCall(call)
            if call.args.is_empty()
                && STRING_CONVERSIONS.iter().any(|name| call.method == name) =>
        {
            peel_conversion(&call.receiver)
        }
        Expr::Call(call) if call_path_ends_with(call, &["String", "from"]) && call.args.len() == 1 => {
            peel_conversion(&call.args[0])
        }
        _ => expr,
    }
}

fn is_raw(lit: &syn::LitStr) -> bool {
    lit.token().to_string().starts_with('r')
}

fn key_token(module: &SourceModule, kind: KeyKind, key: &Expr) -> Result<String> {
    let token = match (peel_conversion(key), kind) {
        (Expr::Lit(lit), KeyKind::String) => match &lit.lit {
            Lit::Str(text) if is_raw(text) => Some(format!("{RAW_KEY_PREFIX}\"{}\"", text.value())),
            Lit::Str(_) => {
                return Err(module.structural(
                    key,
                    "string keys must use raw string syntax, e.g. r\"name\"",
                ))
            }
            _ => None,
        },
        (Expr::Lit(lit), KeyKind::Integer) => match &lit.lit {
            Lit::Int(int) => Some(int.base10_digits().to_string()),
            _ => None,
        },
        (Expr::Unary(unary), KeyKind::Integer) if matches!(unary.op, UnOp::Neg(_)) => {
            match unary.expr.as_ref() {
                Expr::Lit(lit) => match &lit.lit {
                    Lit::Int(int) => Some(format!("-{}", int.base10_digits())),
                    _ => None,
                },
                _ => None,
            }
        }
        _ => None,
    };

    token.ok_or_else(|| {
        module.structural(
            key,
            format!("expected {} as key of this table", kind.describe()),
        )
    })
}

fn field_token(module: &SourceModule, field: &Expr) -> Result<String> {
    let token = match peel_conversion(field) {
        Expr::Lit(lit) => literal_token(&lit.lit),
        Expr::Unary(unary) if matches!(unary.op, UnOp::Neg(_)) => match unary.expr.as_ref() {
            Expr::Lit(lit) => match &lit.lit {
                Lit::Int(int) => Some(format!("-{}", int.base10_digits())),
                Lit::Float(float) => Some(format!("-{}", float.base10_digits())),
                _ => None,
            },
            _ => None,
        },
        _ => None,
    };

    token.ok_or_else(|| {
        module.structural(
            field,
            "field values must be integer, float, string, char or bool literals",
        )
    })
}

fn literal_token(lit: &Lit) -> Option<String> {
    match lit {
        Lit::Int(int) => Some(int.base10_digits().to_string()),
        Lit::Float(float) => Some(float.base10_digits().to_string()),
        Lit::Str(text) => Some(format!("\"{}\"", text.value())),
        Lit::Char(ch) => Some(format!("'{}'", ch.value())),
        Lit::Bool(flag) => Some(flag.value.to_string()),
        _ => None,
    }
}
