//! Integration tests: scan logs through scoring into the snapshot store,
//! then out again as forecasts and badge rarity.

use std::fs;

use ply_rewards::{db, forecast, ingest};
use rusqlite::Connection;
use tempfile::TempDir;

fn create_test_store() -> (Connection, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let conn = Connection::open(temp_dir.path().join("rewards.db")).expect("Failed to open db");
    db::init_schema(&conn).expect("Failed to init schema");
    (conn, temp_dir)
}

const LAGOS_LOG: &str = "\
# kiosk lag-01
city=lagos material=PET weight=1.0 condition=good badges=first_scan
city=lagos material=HDPE weight=30 condition=good crt=0.5

city=lagos material=PET weight=2.0 condition=good contamination=0.9 device=lag-01
city=lagos material=GLASS weight=1.0 condition=good
";

const NAIROBI_LOG: &str = "\
city=Nairobi material=laptop weight=2.1 condition=like-new packaging=true badges=first_scan,e_waste_hero crt=3
city=nairobi material=PET weight=-1 condition=good
";

#[test]
fn test_ingest_directory_rolls_up_cities() {
    let (conn, temp_dir) = create_test_store();
    let logs = temp_dir.path().join("logs");
    fs::create_dir_all(logs.join("east")).unwrap();
    fs::write(logs.join("lagos.log"), LAGOS_LOG).unwrap();
    fs::write(logs.join("east").join("nairobi.log"), NAIROBI_LOG).unwrap();
    fs::write(logs.join("notes.txt"), "city=accra material=PET weight=1 condition=good").unwrap();

    let stats = ingest::ingest_directory(&conn, &logs).unwrap();

    assert_eq!(stats.files, 2);
    assert_eq!(stats.accepted, 3);
    assert_eq!(stats.invalid, 1);
    // unknown material and negative weight
    assert_eq!(stats.rejected, 2);

    // PET 1kg good = 0.5, HDPE capped = 5 * 1.2 * 2.0 = 12.0
    let lagos = db::get_city_metric(&conn, "lagos").unwrap().unwrap();
    assert_eq!(lagos.submissions, 2);
    assert!((lagos.ply_total - 12.5).abs() < 1e-9);
    assert!((lagos.crt_total - 0.5).abs() < 1e-9);

    // LAPTOP like-new with packaging = 15 * 5.0 * 1.5 * 1.2 = 135.0
    let nairobi = db::get_city_metric(&conn, "nairobi").unwrap().unwrap();
    assert_eq!(nairobi.submissions, 1);
    assert!((nairobi.ply_total - 135.0).abs() < 1e-9);

    assert!(db::get_city_metric(&conn, "accra").unwrap().is_none());

    // The contaminated scan is stored for auditing but not credited
    assert_eq!(db::total_scans(&conn).unwrap(), 4);
}

#[test]
fn test_forecast_and_rarity_from_store() {
    let (conn, temp_dir) = create_test_store();
    let logs = temp_dir.path().join("logs");
    fs::create_dir_all(&logs).unwrap();
    fs::write(logs.join("lagos.log"), LAGOS_LOG).unwrap();
    fs::write(logs.join("nairobi.log"), NAIROBI_LOG).unwrap();

    ingest::ingest_directory(&conn, &logs).unwrap();

    let metrics = db::list_city_metrics(&conn).unwrap();
    let forecasts = forecast::forecast_all(&metrics, forecast::DEFAULT_DAILY_GROWTH_RATE);
    assert_eq!(forecasts[0].city, "nairobi");
    assert!((forecasts[0].projected_ply - 135.135).abs() < 1e-9);
    assert!((forecasts[1].projected_ply - 12.5125).abs() < 1e-9);

    let stats = db::list_badge_stats(&conn).unwrap();
    let total = db::total_scans(&conn).unwrap();
    let rarity = forecast::badge_rarity(&stats, total).unwrap();

    assert_eq!(rarity.len(), 2);
    assert_eq!(rarity[0].badge_id, "e_waste_hero");
    assert_eq!(rarity[0].rarity, 0.25);
    assert_eq!(rarity[1].badge_id, "first_scan");
    assert_eq!(rarity[1].rarity, 0.5);
}

#[test]
fn test_empty_store_rarity_is_undefined() {
    let (conn, _temp_dir) = create_test_store();
    let stats = db::list_badge_stats(&conn).unwrap();
    let total = db::total_scans(&conn).unwrap();
    assert!(forecast::badge_rarity(&stats, total).is_err());
    assert!(db::list_city_metrics(&conn).unwrap().is_empty());
}

#[test]
fn test_ingest_rejects_missing_directory() {
    let (conn, temp_dir) = create_test_store();
    let missing = temp_dir.path().join("does-not-exist");
    assert!(ingest::ingest_directory(&conn, &missing).is_err());
}
