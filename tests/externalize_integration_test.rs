mod common;

use std::collections::{BTreeMap, HashMap};

use common::{Workspace, MONSTERS};
use indoc::{formatdoc, indoc};
use pretty_assertions::assert_eq;
use serde::Deserialize;
use tablegen::{run, Error};
use tablegen_runtime::{load_table, LoadError};

#[derive(Debug, PartialEq, Deserialize)]
struct Monster(String, i64, f64);

#[derive(Debug, PartialEq, Deserialize)]
struct Item(u32, bool);

#[test]
fn test_monster_table_round_trip() {
    let workspace = Workspace::new();
    workspace.write_module("monsters.rs", MONSTERS);

    let summary = run(&workspace.config()).unwrap();
    assert_eq!(summary.tables_written(), 1);

    let csv = workspace.read_csv("MONSTER_MAP");
    assert_eq!(
        csv,
        "1,\"\"\"Slime\"\"\",10,1.5\n2,\"\"\"Orc\"\"\",20,-2.0\n"
    );

    let table: HashMap<i64, Box<Monster>> = load_table(&csv, "csv/monsters.rs", "Monster").unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(*table[&1], Monster("Slime".into(), 10, 1.5));
    assert_eq!(*table[&2], Monster("Orc".into(), 20, -2.0));
}

#[test]
fn test_rewritten_module_loads_from_embedded_csv() {
    let workspace = Workspace::new();
    let path = workspace.write_module("monsters.rs", MONSTERS);
    run(&workspace.config()).unwrap();

    let rewritten = workspace.read_module("monsters.rs");
    let module_path = path.to_string_lossy().replace('\\', "/");
    assert_eq!(
        rewritten,
        formatdoc! {r#"
                use std::collections::HashMap;
                use std::sync::LazyLock;
                use tablegen_runtime::load_table;
                use serde::Deserialize;

                #[derive(Debug)]
                #[derive(Deserialize)]
                pub struct Monster(pub String, pub i64, pub f64);

                pub static MONSTER_MAP: LazyLock<HashMap<i64, Box<Monster>>> = LazyLock::new(|| load_table(MONSTER_MAP_CSV, {:?}, "Monster").unwrap_or_else(|err| panic!("{{err}}")));

                static MONSTER_MAP_CSV: &str = include_str!("output/MONSTER_MAP.csv");

                /// Loads every table of this module; call once at start-up.
                pub fn init_tables() {{
                    LazyLock::force(&MONSTER_MAP);
                }}
            "#,
            module_path
        }
    );
    syn::parse_file(&rewritten).unwrap();

    // The runtime crate compiles and loads these fixtures; keep them equal
    // to what the generator emits.
    assert_eq!(
        rewritten.replace(&module_path, "csv/monsters.rs"),
        include_str!("../tablegen-runtime/tests/fixtures/monsters.rs")
    );
    assert_eq!(
        workspace.read_csv("MONSTER_MAP"),
        include_str!("../tablegen-runtime/tests/fixtures/output/MONSTER_MAP.csv")
    );
}

#[test]
fn test_string_keys_stay_strings() {
    let workspace = Workspace::new();
    workspace.write_module(
        "items.rs",
        indoc! {r##"
            pub struct Item(pub u32, pub bool);

            pub static ITEM_MAP: LazyLock<BTreeMap<String, Box<Item>>> = LazyLock::new(|| {
                BTreeMap::from([
                    (r"42".into(), Box::new(Item(1, true))),
                    (r#"say "hi", twice"#.to_string(), Box::new(Item(2, false))),
                ])
            });
        "##},
    );
    run(&workspace.config()).unwrap();

    let csv = workspace.read_csv("ITEM_MAP");
    let table: BTreeMap<String, Box<Item>> = load_table(&csv, "csv/items.rs", "Item").unwrap();
    assert_eq!(
        table.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["42", "say \"hi\", twice"]
    );
    assert_eq!(*table["42"], Item(1, true));

    let as_integers: Result<HashMap<i64, Box<Item>>, LoadError> =
        load_table(&csv, "csv/items.rs", "Item");
    assert!(matches!(as_integers, Err(LoadError::Key { row: 0, .. })));
}

#[test]
fn test_module_without_tables_is_untouched() {
    let workspace = Workspace::new();
    let code = "// helpers\npub static LIMIT: u8 = 3;\n\npub fn limit() -> u8 {\n    LIMIT\n}\n";
    workspace.write_module("helpers.rs", code);

    let summary = run(&workspace.config()).unwrap();
    assert_eq!(summary.modules_scanned, 1);
    assert!(summary.modules_rewritten.is_empty());
    assert_eq!(workspace.read_module("helpers.rs"), code);
    assert_eq!(
        std::fs::read_dir(workspace.input_dir().join("output"))
            .unwrap()
            .count(),
        0
    );
}

#[test]
fn test_short_row_aborts_without_writing() {
    let workspace = Workspace::new();
    let code = MONSTERS.replace(
        "Monster(\"Orc\".into(), 20, -2.0)",
        "Monster(\"Orc\".into(), 20)",
    );
    workspace.write_module("monsters.rs", &code);

    match run(&workspace.config()).unwrap_err() {
        Error::Structural { file, line, .. } => {
            assert!(file.ends_with("csv/monsters.rs"));
            assert_eq!(line, 10);
        }
        other => panic!("unexpected {other}"),
    }
    assert_eq!(workspace.read_module("monsters.rs"), code);
    assert!(!workspace.csv_path("MONSTER_MAP").exists());
}

#[test]
fn test_rows_must_fill_the_struct() {
    let workspace = Workspace::new();
    let code = MONSTERS
        .replace("(\"Slime\".into(), 10, 1.5)", "(\"Slime\".into(), 10)")
        .replace("(\"Orc\".into(), 20, -2.0)", "(\"Orc\".into(), 20)");
    workspace.write_module("monsters.rs", &code);

    let err = run(&workspace.config()).unwrap_err();
    assert!(err
        .to_string()
        .contains("MONSTER_MAP rows have 2 fields but struct Monster declares 3"));
    assert_eq!(workspace.read_module("monsters.rs"), code);
}

#[test]
fn test_existing_imports_are_not_duplicated() {
    let workspace = Workspace::new();
    workspace.write_module(
        "items.rs",
        indoc! {r#"
            use serde::{Deserialize, Serialize};
            use tablegen_runtime::load_table;

            #[derive(Serialize)]
            pub struct Item(pub u32, pub bool);

            pub static ITEM_MAP: LazyLock<HashMap<u16, Box<Item>>> = LazyLock::new(|| HashMap::from([(7, Box::new(Item(1, true)))]));
        "#},
    );
    run(&workspace.config()).unwrap();

    let rewritten = workspace.read_module("items.rs");
    assert_eq!(rewritten.matches("load_table;").count(), 1);
    assert_eq!(rewritten.matches("Deserialize").count(), 2);
    assert!(rewritten.contains("#[derive(Serialize)]\n#[derive(Deserialize)]\npub struct Item"));
}

#[test]
fn test_rerun_is_idempotent() {
    let workspace = Workspace::new();
    workspace.write_module("monsters.rs", MONSTERS);
    run(&workspace.config()).unwrap();
    let module = workspace.read_module("monsters.rs");
    let csv = workspace.read_csv("MONSTER_MAP");

    let summary = run(&workspace.config()).unwrap();
    assert!(summary.modules_rewritten.is_empty());
    assert_eq!(workspace.read_module("monsters.rs"), module);
    assert_eq!(workspace.read_csv("MONSTER_MAP"), csv);
}

#[test]
fn test_modules_before_a_failure_stay_rewritten() {
    let workspace = Workspace::new();
    workspace.write_module("a_monsters.rs", MONSTERS);
    workspace.write_module(
        "b_broken.rs",
        "static BAD_MAP: LazyLock<HashMap<i64, Box<Bad>>> = LazyLock::new(|| HashMap::from([(1, Box::new(Bad(1 + 1)))]));\n",
    );

    assert!(run(&workspace.config()).is_err());
    assert!(workspace.read_module("a_monsters.rs").contains("init_tables"));
    assert!(workspace.csv_path("MONSTER_MAP").exists());
    assert!(!workspace.csv_path("BAD_MAP").exists());
}
