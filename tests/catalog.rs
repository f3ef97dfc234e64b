//! Battery catalog storage and import feeding the search.

use std::fs;

use rusqlite::Connection;
use splitter_calculator::db;
use splitter_calculator::import::import_to_database;
use splitter_calculator::{SearchParams, search_optimal_combination};

fn open() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

#[test]
fn imports_directory_tree() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("base.batteries"),
        "fuel-gen: Fuel Generator, power=1100, duration=40\n\
         steam: Steam Engine, power=800, consume=0.05\n",
    )
    .unwrap();
    fs::create_dir(dir.path().join("mods")).unwrap();
    fs::write(
        dir.path().join("mods").join("extra.batteries"),
        "# modded\nbiomass: Biomass Burner, power=300, duration=10\nnot a battery\n",
    )
    .unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored: Nope, power=1, consume=1\n").unwrap();

    let conn = open();
    let stats = import_to_database(&conn, dir.path()).unwrap();

    assert_eq!(stats.files, 2);
    assert_eq!(stats.batteries, 3);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.errors, 0);
    assert_eq!(db::list_batteries(&conn).unwrap().len(), 3);
    assert!(db::get_battery(&conn, "ignored").unwrap().is_none());
}

#[test]
fn imports_single_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.txt");
    fs::write(&path, "coal: Coal Generator, power=600, duration=15\n").unwrap();

    let conn = open();
    let stats = import_to_database(&conn, &path).unwrap();
    assert_eq!(stats.batteries, 1);

    let coal = db::get_battery(&conn, "coal").unwrap().unwrap();
    assert!((coal.duration() - 15.0).abs() < 1e-9);
}

#[test]
fn missing_file_counts_as_error() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open();
    let stats = import_to_database(&conn, &dir.path().join("absent.batteries")).unwrap();
    assert_eq!(stats.errors, 1);
    assert_eq!(stats.files, 0);
}

#[test]
fn only_selected_batteries_are_searched() {
    let conn = open();
    db::upsert_battery(
        &conn,
        &db::BatteryRecord::new("fuel-gen", "Fuel Generator", 1100.0, 0.025),
    )
    .unwrap();
    db::upsert_battery(&conn, &db::BatteryRecord::new("steam", "Steam Engine", 800.0, 0.025))
        .unwrap();
    db::set_selected(&conn, "fuel-gen", false).unwrap();

    let types = db::selected_battery_types(&conn).unwrap();
    let params = SearchParams::new(800.0, 0.0, 0.025, 3);
    let ranked = search_optimal_combination(&params, &types).unwrap();

    for r in &ranked {
        assert!(
            r.solution
                .batteries
                .iter()
                .all(|a| a.battery.name == "Steam Engine")
        );
    }
}
