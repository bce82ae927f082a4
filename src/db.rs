//! SQLite snapshot store for city metrics, badge counts and submissions

use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};

use crate::models::{BadgeStat, CityMetric, SubmissionRecord};

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Cumulative issuance per city
        CREATE TABLE IF NOT EXISTS city_metrics (
            city TEXT PRIMARY KEY,
            ply_total REAL NOT NULL DEFAULT 0,
            crt_total REAL NOT NULL DEFAULT 0,
            submissions INTEGER NOT NULL DEFAULT 0
        );

        -- How many submissions earned each badge
        CREATE TABLE IF NOT EXISTS badge_stats (
            badge_id TEXT PRIMARY KEY,
            earned_by INTEGER NOT NULL DEFAULT 0
        );

        -- Every scored scan, valid or not
        CREATE TABLE IF NOT EXISTS submissions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            city TEXT NOT NULL,
            material_id TEXT NOT NULL,
            weight_kg REAL NOT NULL,
            condition TEXT NOT NULL,
            amount REAL NOT NULL,
            valid INTEGER NOT NULL,
            source TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_submissions_city ON submissions(city);
        "#,
    )?;
    Ok(())
}

/// Clear all stored data (for re-ingestion)
pub fn clear_data(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        DELETE FROM submissions;
        DELETE FROM badge_stats;
        DELETE FROM city_metrics;
        "#,
    )?;
    Ok(())
}

/// Insert or replace a city snapshot
pub fn upsert_city_metric(conn: &Connection, metric: &CityMetric) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO city_metrics (city, ply_total, crt_total, submissions)
         VALUES (?1, ?2, ?3, ?4)",
        (
            &metric.city,
            metric.ply_total,
            metric.crt_total,
            metric.submissions as i64,
        ),
    )?;
    Ok(())
}

/// Add one submission's tokens to a city's running totals
pub fn credit_city(conn: &Connection, city: &str, ply: f64, crt: f64) -> Result<()> {
    conn.execute(
        "INSERT INTO city_metrics (city, ply_total, crt_total, submissions)
         VALUES (?1, ?2, ?3, 1)
         ON CONFLICT(city) DO UPDATE SET
             ply_total = ply_total + excluded.ply_total,
             crt_total = crt_total + excluded.crt_total,
             submissions = submissions + 1",
        (city, ply, crt),
    )?;
    Ok(())
}

pub fn get_city_metric(conn: &Connection, city: &str) -> Result<Option<CityMetric>> {
    let metric = conn
        .query_row(
            "SELECT city, ply_total, crt_total, submissions FROM city_metrics WHERE city = ?1",
            [city],
            |row| {
                Ok(CityMetric {
                    city: row.get(0)?,
                    ply_total: row.get(1)?,
                    crt_total: row.get(2)?,
                    submissions: row.get::<_, i64>(3)? as u64,
                })
            },
        )
        .optional()?;
    Ok(metric)
}

/// List all city snapshots
pub fn list_city_metrics(conn: &Connection) -> Result<Vec<CityMetric>> {
    let mut stmt = conn.prepare(
        "SELECT city, ply_total, crt_total, submissions FROM city_metrics ORDER BY city",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(CityMetric {
            city: row.get(0)?,
            ply_total: row.get(1)?,
            crt_total: row.get(2)?,
            submissions: row.get::<_, i64>(3)? as u64,
        })
    })?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

/// Insert a scored submission
pub fn record_submission(conn: &Connection, record: &SubmissionRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO submissions (city, material_id, weight_kg, condition, amount, valid, source)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        (
            &record.city,
            &record.material_id,
            record.weight_kg,
            &record.condition,
            record.amount,
            record.valid,
            &record.source,
        ),
    )?;
    Ok(())
}

/// Count one more holder of a badge
pub fn increment_badge(conn: &Connection, badge_id: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO badge_stats (badge_id, earned_by) VALUES (?1, 1)
         ON CONFLICT(badge_id) DO UPDATE SET earned_by = earned_by + 1",
        [badge_id],
    )?;
    Ok(())
}

/// Insert or replace a badge count
pub fn upsert_badge_stat(conn: &Connection, stat: &BadgeStat) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO badge_stats (badge_id, earned_by) VALUES (?1, ?2)",
        (&stat.badge_id, stat.earned_by as i64),
    )?;
    Ok(())
}

pub fn list_badge_stats(conn: &Connection) -> Result<Vec<BadgeStat>> {
    let mut stmt = conn.prepare("SELECT badge_id, earned_by FROM badge_stats ORDER BY badge_id")?;

    let rows = stmt.query_map([], |row| {
        Ok(BadgeStat {
            badge_id: row.get(0)?,
            earned_by: row.get::<_, i64>(1)? as u64,
        })
    })?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

/// Total scans recorded, the denominator for badge rarity
pub fn total_scans(conn: &Connection) -> Result<u64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM submissions", [], |row| row.get(0))?;
    Ok(count as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn record(city: &str, amount: f64) -> SubmissionRecord {
        SubmissionRecord {
            city: city.to_string(),
            material_id: "PET".to_string(),
            weight_kg: 1.0,
            condition: "good".to_string(),
            amount,
            valid: true,
            source: None,
        }
    }

    #[test]
    fn credit_city_accumulates() {
        let conn = open();
        credit_city(&conn, "lagos", 1.5, 0.2).unwrap();
        credit_city(&conn, "lagos", 2.0, 0.0).unwrap();

        let m = get_city_metric(&conn, "lagos").unwrap().unwrap();
        assert_eq!(m.ply_total, 3.5);
        assert_eq!(m.crt_total, 0.2);
        assert_eq!(m.submissions, 2);
        assert!(get_city_metric(&conn, "accra").unwrap().is_none());
    }

    #[test]
    fn upsert_replaces_snapshot() {
        let conn = open();
        credit_city(&conn, "kigali", 9.0, 1.0).unwrap();
        upsert_city_metric(
            &conn,
            &CityMetric {
                city: "kigali".to_string(),
                ply_total: 100.0,
                crt_total: 5.0,
                submissions: 40,
            },
        )
        .unwrap();
        let all = list_city_metrics(&conn).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].ply_total, 100.0);
        assert_eq!(all[0].submissions, 40);
    }

    #[test]
    fn badges_and_scans() {
        let conn = open();
        increment_badge(&conn, "first_scan").unwrap();
        increment_badge(&conn, "first_scan").unwrap();
        increment_badge(&conn, "e_waste_hero").unwrap();
        record_submission(&conn, &record("lagos", 0.5)).unwrap();
        record_submission(&conn, &record("accra", 0.7)).unwrap();

        let stats = list_badge_stats(&conn).unwrap();
        assert_eq!(
            stats,
            vec![
                BadgeStat {
                    badge_id: "e_waste_hero".to_string(),
                    earned_by: 1
                },
                BadgeStat {
                    badge_id: "first_scan".to_string(),
                    earned_by: 2
                },
            ]
        );
        assert_eq!(total_scans(&conn).unwrap(), 2);
    }

    #[test]
    fn clear_data_empties_tables() {
        let conn = open();
        credit_city(&conn, "lagos", 1.0, 0.0).unwrap();
        upsert_badge_stat(
            &conn,
            &BadgeStat {
                badge_id: "first_scan".to_string(),
                earned_by: 3,
            },
        )
        .unwrap();
        record_submission(&conn, &record("lagos", 1.0)).unwrap();

        clear_data(&conn).unwrap();
        assert!(list_city_metrics(&conn).unwrap().is_empty());
        assert!(list_badge_stats(&conn).unwrap().is_empty());
        assert_eq!(total_scans(&conn).unwrap(), 0);
    }
}
