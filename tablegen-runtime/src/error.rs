//! Error types for table loading.

use std::fmt::Display;
use thiserror::Error;

/// Failure to coerce a single CSV token into the value a field asked for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum CoerceError {
    /// Token is not a valid literal of the requested scalar kind.
    #[error("cannot convert `{token}` to {kind}")]
    Parse { token: String, kind: &'static str },

    /// Token is too short to carry a delimiter at each end.
    #[error("`{token}` is missing its quoting delimiters")]
    Unquoted { token: String },

    /// Char field whose unquoted token is not exactly one character.
    #[error("`{token}` does not hold exactly one character")]
    NotAChar { token: String },

    /// Key token of the wrong kind for the table's key type.
    #[error("key `{token}` is not a {expected} key")]
    KeyKind { token: String, expected: &'static str },

    /// Field type has no positional CSV representation.
    #[error("unsupported field kind: {0}")]
    Unsupported(&'static str),

    /// Failure attributed to a positional field of a row.
    #[error("field {field}: {source}")]
    AtField {
        field: usize,
        #[source]
        source: Box<CoerceError>,
    },

    /// Message raised by a `Deserialize` implementation.
    #[error("{0}")]
    Custom(String),
}

impl CoerceError {
    pub(crate) fn parse(token: &str, kind: &'static str) -> Self {
        Self::Parse {
            token: token.to_owned(),
            kind,
        }
    }

    pub(crate) fn at_field(self, field: usize) -> Self {
        match self {
            already @ Self::AtField { .. } => already,
            other => Self::AtField {
                field,
                source: Box::new(other),
            },
        }
    }
}

impl serde::de::Error for CoerceError {
    fn custom<T: Display>(msg: T) -> Self {
        Self::Custom(msg.to_string())
    }
}

/// Error raised while rebuilding a table from its embedded CSV text.
///
/// Every variant names the module the table was generated from and the
/// record struct, so a start-up panic points straight at the broken file.
/// Rows and fields are zero-based; `row` counts CSV records, `field` counts
/// the columns after the key.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    /// The CSV text itself could not be read.
    #[error("{module}: {record}: malformed CSV: {source}")]
    Csv {
        module: String,
        record: String,
        #[source]
        source: csv::Error,
    },

    /// The value type cannot be filled positionally.
    #[error("{module}: {record} is not a struct that can be loaded positionally: {reason}")]
    NotARecord {
        module: String,
        record: String,
        reason: String,
    },

    /// Row width does not match the struct's field count plus the key column.
    #[error("{module}: {record} row {row}: expected {expected} fields, found {found}")]
    FieldCount {
        module: String,
        record: String,
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A field token could not be coerced.
    #[error("{module}: {record} row {row} field {field}: {source}")]
    Field {
        module: String,
        record: String,
        row: usize,
        field: usize,
        #[source]
        source: CoerceError,
    },

    /// Struct-level failure not attributable to a single field.
    #[error("{module}: {record} row {row}: {source}")]
    Row {
        module: String,
        record: String,
        row: usize,
        #[source]
        source: CoerceError,
    },

    /// The key column could not be converted.
    #[error("{module}: {record} row {row}: cannot convert key: {source}")]
    Key {
        module: String,
        record: String,
        row: usize,
        #[source]
        source: CoerceError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_field_does_not_nest() {
        let err = CoerceError::parse("x", "i64").at_field(2).at_field(5);
        match err {
            CoerceError::AtField { field, source } => {
                assert_eq!(field, 2);
                assert_eq!(*source, CoerceError::parse("x", "i64"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_field_count_message_names_context() {
        let err = LoadError::FieldCount {
            module: "csv/monsters.rs".into(),
            record: "Monster".into(),
            row: 3,
            expected: 4,
            found: 3,
        };
        let message = err.to_string();
        assert!(message.contains("csv/monsters.rs"));
        assert!(message.contains("Monster"));
        assert!(message.contains("row 3"));
    }
}
