use serde::de::DeserializeOwned;

use crate::de::{field_count, KeyDeserializer, RowDeserializer};
use crate::error::{CoerceError, LoadError};

/// Rebuild a table from the CSV text embedded by the generator.
///
/// Every record is `key, field0, field1, ...`. `V` is filled positionally:
/// column `i + 1` goes to the `i`-th field `V`'s `Deserialize` impl reads,
/// whatever its name. The key is a string when its token starts with `r`
/// and a base-10 integer otherwise.
///
/// `module` and `record` only feed error messages; they name the source file
/// the table was extracted from and the struct it holds.
///
/// Rows are inserted in file order, so a repeated key keeps the last row.
///
/// # Errors
///
/// Fails on the first malformed row; nothing from that row is inserted.
pub fn load_table<M, K, V>(csv: &str, module: &str, record: &str) -> Result<M, LoadError>
where
    M: Default + Extend<(K, Box<V>)>,
    K: DeserializeOwned,
    V: DeserializeOwned,
{
    let expected = field_count::<V>().map_err(|reason| LoadError::NotARecord {
        module: module.to_owned(),
        record: record.to_owned(),
        reason,
    })? + 1;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(csv.as_bytes());

    let mut table = M::default();
    let mut rows = 0;
    for (row, result) in reader.records().enumerate() {
        let fields = result.map_err(|source| LoadError::Csv {
            module: module.to_owned(),
            record: record.to_owned(),
            source,
        })?;

        if fields.len() != expected {
            return Err(LoadError::FieldCount {
                module: module.to_owned(),
                record: record.to_owned(),
                row,
                expected,
                found: fields.len(),
            });
        }

        let tokens: Vec<&str> = fields.iter().collect();
        let value = V::deserialize(RowDeserializer::new(&tokens[1..])).map_err(|err| match err {
            CoerceError::AtField { field, source } => LoadError::Field {
                module: module.to_owned(),
                record: record.to_owned(),
                row,
                field,
                source: *source,
            },
            other => LoadError::Row {
                module: module.to_owned(),
                record: record.to_owned(),
                row,
                source: other,
            },
        })?;

        let key = K::deserialize(KeyDeserializer::new(tokens[0])).map_err(|source| {
            LoadError::Key {
                module: module.to_owned(),
                record: record.to_owned(),
                row,
                source,
            }
        })?;

        table.extend(std::iter::once((key, Box::new(value))));
        rows = row + 1;
    }

    log::debug!("{module}: loaded {rows} {record} rows");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use std::collections::{BTreeMap, HashMap};

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct Monster(String, i64, f64);

    const MONSTERS: &str = "1,\"\"\"Slime\"\"\",10,1.5\n2,\"\"\"Orc\"\"\",20,-2.0\n";

    fn load(csv: &str) -> Result<HashMap<i64, Box<Monster>>, LoadError> {
        load_table(csv, "csv/monsters.rs", "Monster")
    }

    #[test]
    fn test_loads_monster_table() {
        let table = load(MONSTERS).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(*table[&1], Monster("Slime".into(), 10, 1.5));
        assert_eq!(table[&2].2, -2.0);
    }

    #[test]
    fn test_empty_csv_gives_empty_table() {
        assert!(load("").unwrap().is_empty());
    }

    #[test]
    fn test_short_row_is_rejected_with_row_index() {
        let err = load("1,\"\"\"Slime\"\"\",10,1.5\n2,\"\"\"Orc\"\"\",20\n").unwrap_err();
        assert!(matches!(
            err,
            LoadError::FieldCount {
                row: 1,
                expected: 4,
                found: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_long_row_is_rejected() {
        let err = load("1,\"\"\"Slime\"\"\",10,1.5,9\n").unwrap_err();
        assert!(matches!(err, LoadError::FieldCount { row: 0, found: 5, .. }));
    }

    #[test]
    fn test_bad_float_reports_row_and_field() {
        let err = load("1,\"\"\"Slime\"\"\",10,fast\n").unwrap_err();
        match err {
            LoadError::Field { row, field, .. } => {
                assert_eq!(row, 0);
                assert_eq!(field, 2);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_bad_key_reports_row() {
        let err = load("one,\"\"\"Slime\"\"\",10,1.5\n").unwrap_err();
        assert!(matches!(err, LoadError::Key { row: 0, .. }));
    }

    #[test]
    fn test_string_keys_into_btree_map() {
        let csv = "r\"slime\",\"\"\"Slime\"\"\",10,1.5\nr\"42\",\"\"\"Answer\"\"\",42,0.0\n";
        let table: BTreeMap<String, Box<Monster>> =
            load_table(csv, "csv/monsters.rs", "Monster").unwrap();
        let keys: Vec<&str> = table.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["42", "slime"]);
        assert_eq!(table["42"].0, "Answer");
    }

    #[test]
    fn test_duplicate_key_keeps_last_row() {
        let csv = "1,\"\"\"Slime\"\"\",10,1.5\n1,\"\"\"King Slime\"\"\",99,3.0\n";
        let table = load(csv).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table[&1].0, "King Slime");
    }

    #[test]
    fn test_non_struct_value_is_rejected() {
        let err = load_table::<HashMap<i64, Box<i64>>, i64, i64>("1,2\n", "m.rs", "i64")
            .unwrap_err();
        assert!(matches!(err, LoadError::NotARecord { .. }));
    }
}
