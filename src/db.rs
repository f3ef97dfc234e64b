//! Battery catalog schema and operations

use anyhow::{Result, bail};
use rusqlite::{Connection, OptionalExtension};

use crate::models::BatteryType;

/// A stored battery definition.
#[derive(Debug, Clone, PartialEq)]
pub struct BatteryRecord {
    pub id: String,
    pub name: String,
    pub power_watts: f64,
    pub consume_rate: f64,
    pub selected: bool,
}

impl BatteryRecord {
    pub fn new(id: &str, name: &str, power_watts: f64, consume_rate: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            power_watts,
            consume_rate,
            selected: true,
        }
    }

    /// Define a battery by how long one supply unit lasts instead of its rate.
    pub fn with_duration(id: &str, name: &str, power_watts: f64, duration: f64) -> Self {
        Self::new(id, name, power_watts, 1.0 / duration)
    }

    pub fn duration(&self) -> f64 {
        1.0 / self.consume_rate
    }

    pub fn to_battery_type(&self) -> BatteryType {
        BatteryType::new(self.name.clone(), self.power_watts, self.consume_rate)
    }
}

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS batteries (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            power_watts REAL NOT NULL,
            consume_rate REAL NOT NULL,
            selected INTEGER NOT NULL DEFAULT 1
        );

        CREATE INDEX IF NOT EXISTS idx_batteries_selected ON batteries(selected);
        "#,
    )?;
    Ok(())
}

/// Insert or replace a battery
pub fn upsert_battery(conn: &Connection, battery: &BatteryRecord) -> Result<()> {
    if !(battery.power_watts > 0.0 && battery.consume_rate > 0.0) {
        bail!(
            "battery '{}' needs positive power and consume rate",
            battery.id
        );
    }

    conn.execute(
        "INSERT OR REPLACE INTO batteries (id, name, power_watts, consume_rate, selected)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            &battery.id,
            &battery.name,
            battery.power_watts,
            battery.consume_rate,
            battery.selected,
        ),
    )?;
    Ok(())
}

/// Remove a battery, returning whether it existed
pub fn remove_battery(conn: &Connection, id: &str) -> Result<bool> {
    let removed = conn.execute("DELETE FROM batteries WHERE id = ?1", [id])?;
    Ok(removed > 0)
}

/// Include or exclude a battery from searches
pub fn set_selected(conn: &Connection, id: &str, selected: bool) -> Result<bool> {
    let updated = conn.execute(
        "UPDATE batteries SET selected = ?1 WHERE id = ?2",
        (selected, id),
    )?;
    Ok(updated > 0)
}

pub fn get_battery(conn: &Connection, id: &str) -> Result<Option<BatteryRecord>> {
    let battery = conn
        .query_row(
            "SELECT id, name, power_watts, consume_rate, selected FROM batteries WHERE id = ?1",
            [id],
            row_to_record,
        )
        .optional()?;
    Ok(battery)
}

/// List all batteries in the catalog
pub fn list_batteries(conn: &Connection) -> Result<Vec<BatteryRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, power_watts, consume_rate, selected FROM batteries ORDER BY id",
    )?;

    let rows = stmt.query_map([], row_to_record)?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

/// Battery types the search should consider
pub fn selected_battery_types(conn: &Connection) -> Result<Vec<BatteryType>> {
    Ok(list_batteries(conn)?
        .iter()
        .filter(|b| b.selected)
        .map(BatteryRecord::to_battery_type)
        .collect())
}

/// Clear the whole catalog (for re-import)
pub fn clear_batteries(conn: &Connection) -> Result<()> {
    conn.execute_batch("DELETE FROM batteries;")?;
    Ok(())
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<BatteryRecord> {
    Ok(BatteryRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        power_watts: row.get(2)?,
        consume_rate: row.get(3)?,
        selected: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn test_upsert_and_list() {
        let conn = open();
        upsert_battery(&conn, &BatteryRecord::new("b", "Beta", 800.0, 0.05)).unwrap();
        upsert_battery(&conn, &BatteryRecord::with_duration("a", "Alpha", 1100.0, 40.0)).unwrap();

        let all = list_batteries(&conn).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "a");
        assert!((all[0].consume_rate - 0.025).abs() < 1e-12);
        assert!((all[0].duration() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_selection_filters_search_types() {
        let conn = open();
        upsert_battery(&conn, &BatteryRecord::new("a", "Alpha", 1100.0, 0.025)).unwrap();
        upsert_battery(&conn, &BatteryRecord::new("b", "Beta", 800.0, 0.05)).unwrap();
        assert!(set_selected(&conn, "b", false).unwrap());
        assert!(!set_selected(&conn, "missing", false).unwrap());

        let types = selected_battery_types(&conn).unwrap();
        assert_eq!(types, vec![BatteryType::new("Alpha", 1100.0, 0.025)]);
        assert!(!get_battery(&conn, "b").unwrap().unwrap().selected);
    }

    #[test]
    fn test_remove_and_clear() {
        let conn = open();
        upsert_battery(&conn, &BatteryRecord::new("a", "Alpha", 1100.0, 0.025)).unwrap();
        upsert_battery(&conn, &BatteryRecord::new("b", "Beta", 800.0, 0.05)).unwrap();
        assert!(remove_battery(&conn, "a").unwrap());
        assert!(!remove_battery(&conn, "a").unwrap());
        assert!(get_battery(&conn, "a").unwrap().is_none());

        clear_batteries(&conn).unwrap();
        assert!(list_batteries(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_rejects_non_positive_values() {
        let conn = open();
        assert!(upsert_battery(&conn, &BatteryRecord::new("x", "Broken", 0.0, 0.1)).is_err());
        assert!(upsert_battery(&conn, &BatteryRecord::new("y", "Broken", 10.0, -1.0)).is_err());
    }
}
