use std::collections::HashMap;
use std::sync::LazyLock;
use tablegen_runtime::load_table;
use serde::Deserialize;

#[derive(Debug)]
#[derive(Deserialize)]
pub struct Monster(pub String, pub i64, pub f64);

pub static MONSTER_MAP: LazyLock<HashMap<i64, Box<Monster>>> = LazyLock::new(|| load_table(MONSTER_MAP_CSV, "csv/monsters.rs", "Monster").unwrap_or_else(|err| panic!("{err}")));

static MONSTER_MAP_CSV: &str = include_str!("output/MONSTER_MAP.csv");

/// Loads every table of this module; call once at start-up.
pub fn init_tables() {
    LazyLock::force(&MONSTER_MAP);
}
