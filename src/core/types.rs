use std::ops::Range;

/// Key type of an externalized table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// Any primitive integer; keys are written as bare base-10 literals.
    Integer,
    /// `String`; keys are written with raw quoting, `r"..."`.
    String,
}

impl KeyKind {
    pub fn describe(self) -> &'static str {
        match self {
            Self::Integer => "an integer literal",
            Self::String => "a raw string literal",
        }
    }
}

/// One mapping entry as literal text tokens, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRecord {
    pub key_token: String,
    pub field_tokens: Vec<String>,
}

impl RowRecord {
    /// CSV record: key first, then the positional fields.
    pub fn to_record(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.key_token.as_str()).chain(self.field_tokens.iter().map(String::as_str))
    }
}

/// A table declaration found in a module, with its extracted rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateTable {
    /// Name of the `static`, e.g. `MONSTER_MAP`.
    pub identifier: String,
    /// Struct held behind the `Box`, e.g. `Monster`.
    pub element_type_name: String,
    pub key_kind: KeyKind,
    /// Path of the lazy wrapper as written, e.g. `LazyLock` or `once_cell::sync::Lazy`.
    pub lazy_path: String,
    /// Byte range of the initializer closure body that holds the literal.
    pub body: Range<usize>,
    /// 1-based line of the declaration.
    pub line: usize,
    pub rows: Vec<RowRecord>,
}

impl CandidateTable {
    pub fn csv_file_name(&self) -> String {
        format!("{}.csv", self.identifier)
    }

    /// Name of the generated `static` embedding the CSV text.
    pub fn embed_name(&self) -> String {
        format!("{}_CSV", self.identifier)
    }

    pub fn field_count(&self) -> Option<usize> {
        self.rows.first().map(|row| row.field_tokens.len())
    }
}
