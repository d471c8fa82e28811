mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::{Workspace, MONSTERS};

fn tablegen(workspace: &Workspace) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("tablegen");
    cmd.current_dir(workspace.root())
        .env_remove("TABLEGEN_INPUT_DIR")
        .env_remove("TABLEGEN_OUTPUT_DIR")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_no_flags_processes_csv_directory() {
    let workspace = Workspace::new();
    workspace.write_module("monsters.rs", MONSTERS);

    tablegen(&workspace).assert().success();

    assert!(workspace.csv_path("MONSTER_MAP").exists());
    let module = workspace.read_module("monsters.rs");
    assert!(module.contains(r#"load_table(MONSTER_MAP_CSV, "csv/monsters.rs", "Monster")"#));
}

#[test]
fn test_flags_and_config_file() {
    let workspace = Workspace::new();
    std::fs::create_dir(workspace.root().join("tables")).unwrap();
    std::fs::write(
        workspace.root().join("tables").join("monsters.rs"),
        MONSTERS.replace("MONSTER_MAP", "MONSTER_TABLE"),
    )
    .unwrap();
    std::fs::write(
        workspace.root().join("tablegen.toml"),
        "input_dir = \"tables\"\nsuffix = \"_MAP\"\n",
    )
    .unwrap();

    tablegen(&workspace)
        .args(["--suffix", "_TABLE", "--output-dir", "data"])
        .assert()
        .success();

    assert!(workspace.root().join("data").join("MONSTER_TABLE.csv").exists());
    let module =
        std::fs::read_to_string(workspace.root().join("tables").join("monsters.rs")).unwrap();
    assert!(module.contains(r#"include_str!("../data/MONSTER_TABLE.csv")"#));
}

#[test]
fn test_structural_error_exits_non_zero() {
    let workspace = Workspace::new();
    workspace.write_module(
        "bad.rs",
        "static BAD_MAP: LazyLock<HashMap<i64, Box<Bad>>> = LazyLock::new(|| HashMap::from([(\"k\", Box::new(Bad(1)))]));\n",
    );

    let output = tablegen(&workspace).assert().failure().get_output().clone();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("csv/bad.rs:1:"));
    assert!(stderr.contains("Fix the table declaration and rerun"));
    assert!(!workspace.csv_path("BAD_MAP").exists());
}

#[test]
fn test_borrowed_record_field_is_rejected() {
    let workspace = Workspace::new();
    let source = indoc::indoc! {r#"
        pub struct Item(pub &'static str, pub u8);

        pub static ITEM_MAP: LazyLock<HashMap<String, Box<Item>>> = LazyLock::new(|| {
            HashMap::from([(r"potion".into(), Box::new(Item("Potion", 5)))])
        });
    "#};
    workspace.write_module("items.rs", source);

    let output = tablegen(&workspace).assert().failure().get_output().clone();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("csv/items.rs:1:"));
    assert!(stderr.contains("owned fields such as String"));
    assert_eq!(workspace.read_module("items.rs"), source);
    assert!(!workspace.csv_path("ITEM_MAP").exists());
}

#[test]
fn test_missing_input_directory_fails() {
    let workspace = Workspace::new();
    std::fs::remove_dir(workspace.input_dir()).unwrap();

    let output = tablegen(&workspace).assert().failure().get_output().clone();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to externalize tables in csv"));
}
