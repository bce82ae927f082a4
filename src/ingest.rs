//! Scan-log ingestion
//!
//! Collection points write one submission per line as `key=value` pairs.
//! Each line is scored and its tokens rolled up into the snapshot store.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use regex::Regex;
use rusqlite::Connection;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::catalog;
use crate::db;
use crate::models::{BonusFlags, DeviceReading, RewardResult, SubmissionRecord};
use crate::scorer;

/// One parsed log line, before scoring
#[derive(Debug, Clone, PartialEq)]
pub struct ScanLine {
    pub city: String,
    pub material_id: String,
    pub weight_kg: f64,
    pub condition: String,
    pub has_original_packaging: bool,
    pub device_id: Option<String>,
    pub contamination: Option<f64>,
    pub has_image_evidence: bool,
    pub crt: f64,
    pub badges: Vec<String>,
}

pub struct LineParser {
    pair_re: Regex,
}

impl LineParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            pair_re: Regex::new(r"([A-Za-z_]+)=(\S+)")?,
        })
    }

    /// Parse a line. Blank lines and `#` comments yield `Ok(None)`.
    pub fn parse(&self, line: &str) -> Result<Option<ScanLine>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let fields: HashMap<String, &str> = self
            .pair_re
            .captures_iter(line)
            .filter_map(|cap| {
                let key = cap.get(1)?.as_str().to_ascii_lowercase();
                let value = cap.get(2)?.as_str();
                Some((key, value))
            })
            .collect();

        if fields.is_empty() {
            bail!("no key=value pairs found");
        }

        let weight = required(&fields, "weight")?;
        let weight_kg = weight
            .parse::<f64>()
            .with_context(|| format!("invalid weight '{}'", weight))?;

        let contamination = match fields.get("contamination") {
            Some(v) => Some(
                v.parse::<f64>()
                    .with_context(|| format!("invalid contamination '{}'", v))?,
            ),
            None => None,
        };

        let crt = match fields.get("crt") {
            Some(v) => v
                .parse::<f64>()
                .with_context(|| format!("invalid crt '{}'", v))?,
            None => 0.0,
        };
        if !crt.is_finite() || crt < 0.0 {
            bail!("crt credit must be a non-negative number, got {}", crt);
        }

        // A badge is earned at most once per scan
        let mut badges: Vec<String> = Vec::new();
        if let Some(v) = fields.get("badges") {
            for badge in v.split(',').map(str::trim).filter(|b| !b.is_empty()) {
                if !badges.iter().any(|b| b == badge) {
                    badges.push(badge.to_string());
                }
            }
        }

        Ok(Some(ScanLine {
            city: required(&fields, "city")?.to_ascii_lowercase(),
            material_id: required(&fields, "material")?.to_string(),
            weight_kg,
            condition: required(&fields, "condition")?.to_string(),
            has_original_packaging: parse_flag(fields.get("packaging").copied())?,
            device_id: fields.get("device").map(|d| d.to_string()),
            contamination,
            has_image_evidence: parse_flag(fields.get("image").copied())?,
            crt,
            badges,
        }))
    }
}

fn required<'a>(fields: &HashMap<String, &'a str>, key: &str) -> Result<&'a str> {
    fields
        .get(key)
        .copied()
        .ok_or_else(|| anyhow!("missing field '{}'", key))
}

fn parse_flag(value: Option<&str>) -> Result<bool> {
    match value.map(|v| v.to_ascii_lowercase()) {
        None => Ok(false),
        Some(v) => match v.as_str() {
            "true" | "yes" | "1" => Ok(true),
            "false" | "no" | "0" => Ok(false),
            _ => bail!("invalid flag value '{}'", v),
        },
    }
}

/// Score a parsed line against the catalog
pub fn score_line(scan: &ScanLine) -> Result<RewardResult> {
    let material = catalog::lookup(&scan.material_id)?;
    let condition = scorer::parse_condition(material, &scan.condition)?;

    let reading = scan.contamination.map(|contamination_score| DeviceReading {
        device_id: scan
            .device_id
            .clone()
            .unwrap_or_else(|| "unknown".to_string()),
        weight_kg: scan.weight_kg,
        contamination_score,
        has_image_evidence: scan.has_image_evidence,
    });
    let flags = BonusFlags {
        has_original_packaging: scan.has_original_packaging,
        reading,
    };

    Ok(scorer::score(material, scan.weight_kg, condition, &flags)?)
}

/// Find all scan log files under a directory
pub fn find_scan_logs(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("{} is not a directory", dir.display());
    }

    let mut logs: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "log"))
        .collect();
    logs.sort();
    Ok(logs)
}

/// Score one line and, if it parses, record it. Returns the reward for
/// scored lines and `None` for blanks and comments.
pub fn ingest_line(
    conn: &Connection,
    parser: &LineParser,
    line: &str,
    source: Option<&str>,
) -> Result<Option<RewardResult>> {
    let Some(scan) = parser.parse(line)? else {
        return Ok(None);
    };
    let result = score_line(&scan)?;
    record_scan(conn, &scan, &result, source)?;
    Ok(Some(result))
}

/// Store a scored scan and roll its tokens into the city and badge totals.
/// The audit row and the credits commit together or not at all.
pub fn record_scan(
    conn: &Connection,
    scan: &ScanLine,
    result: &RewardResult,
    source: Option<&str>,
) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    db::record_submission(
        &tx,
        &SubmissionRecord {
            city: scan.city.clone(),
            material_id: result.material_id.clone(),
            weight_kg: scan.weight_kg,
            condition: result.condition.name().to_string(),
            amount: result.amount,
            valid: result.valid,
            source: source.map(str::to_string),
        },
    )?;

    // Scans that fail device validation are kept for auditing but credit nothing
    if result.valid {
        db::credit_city(&tx, &scan.city, result.amount, scan.crt)?;
        for badge in &scan.badges {
            db::increment_badge(&tx, badge)?;
        }
    }
    tx.commit()?;
    Ok(())
}

/// Ingest every scan log under a directory into the snapshot store.
///
/// Lines that fail to parse or score are counted and skipped; store
/// failures abort the run.
pub fn ingest_directory(conn: &Connection, dir: &Path) -> Result<IngestStats> {
    let mut stats = IngestStats::default();
    let parser = LineParser::new()?;

    info!(dir = %dir.display(), "scanning for scan logs");
    let logs = find_scan_logs(dir)?;
    info!(count = logs.len(), "found scan log files");

    for path in &logs {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let source = path.display().to_string();
        stats.files += 1;

        for (lineno, line) in content.lines().enumerate() {
            let scored = parser
                .parse(line)
                .and_then(|scan| scan.map(|s| score_line(&s).map(|r| (s, r))).transpose());

            match scored {
                Ok(Some((scan, result))) => {
                    record_scan(conn, &scan, &result, Some(&source))?;
                    if result.valid {
                        stats.accepted += 1;
                        stats.ply_credited += result.amount;
                    } else {
                        stats.invalid += 1;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(file = %source, line = lineno + 1, error = %e, "rejected scan line");
                    stats.rejected += 1;
                }
            }
        }
        debug!(file = %source, "ingested");
    }

    info!(%stats, "ingestion complete");
    Ok(stats)
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct IngestStats {
    pub files: usize,
    pub accepted: usize,
    /// Scored but failed device validation
    pub invalid: usize,
    /// Could not be parsed or scored
    pub rejected: usize,
    pub ply_credited: f64,
}

impl fmt::Display for IngestStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ingested {} files: {} accepted ({:.1} PLY), {} failed validation, {} rejected",
            self.files, self.accepted, self.ply_credited, self.invalid, self.rejected
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_line() {
        let parser = LineParser::new().unwrap();
        let scan = parser
            .parse("city=Lagos material=PET weight=1.5 condition=good contamination=0.2 image=true crt=0.4 badges=first_scan,eco_warrior")
            .unwrap()
            .unwrap();
        assert_eq!(scan.city, "lagos");
        assert_eq!(scan.material_id, "PET");
        assert_eq!(scan.weight_kg, 1.5);
        assert_eq!(scan.contamination, Some(0.2));
        assert!(scan.has_image_evidence);
        assert!(!scan.has_original_packaging);
        assert_eq!(scan.crt, 0.4);
        assert_eq!(scan.badges, ["first_scan", "eco_warrior"]);
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        let parser = LineParser::new().unwrap();
        assert_eq!(parser.parse("").unwrap(), None);
        assert_eq!(parser.parse("   ").unwrap(), None);
        assert_eq!(parser.parse("# kiosk 12, morning shift").unwrap(), None);
    }

    #[test]
    fn missing_fields_are_errors() {
        let parser = LineParser::new().unwrap();
        let err = parser
            .parse("city=lagos material=PET condition=good")
            .unwrap_err();
        assert!(err.to_string().contains("weight"));
        assert!(parser.parse("just some text").is_err());
        assert!(parser.parse("city=lagos material=PET weight=1 condition=good image=maybe").is_err());
    }

    #[test]
    fn scores_e_waste_with_packaging() {
        let parser = LineParser::new().unwrap();
        let scan = parser
            .parse("city=nairobi material=laptop weight=2.1 condition=functional packaging=true")
            .unwrap()
            .unwrap();
        let result = score_line(&scan).unwrap();
        assert_eq!(result.amount, 90.0);
        assert!(result.valid);
    }

    fn memory_store() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        db::init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn repeated_badge_counts_once_per_scan() {
        let parser = LineParser::new().unwrap();
        let scan = parser
            .parse("city=lagos material=PET weight=1 condition=good badges=first_scan,eco_warrior,first_scan")
            .unwrap()
            .unwrap();
        assert_eq!(scan.badges, ["first_scan", "eco_warrior"]);

        let conn = memory_store();
        ingest_line(
            &conn,
            &parser,
            "city=lagos material=PET weight=1 condition=good badges=first_scan,first_scan",
            None,
        )
        .unwrap();

        let stats = db::list_badge_stats(&conn).unwrap();
        let total = db::total_scans(&conn).unwrap();
        assert_eq!(total, 1);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].earned_by, 1);
        let rarity = crate::forecast::badge_rarity(&stats, total).unwrap();
        assert_eq!(rarity[0].rarity, 1.0);
    }

    #[test]
    fn failed_badge_update_rolls_back_scan() {
        let parser = LineParser::new().unwrap();
        let conn = memory_store();
        conn.execute("DROP TABLE badge_stats", []).unwrap();

        let line = "city=lagos material=PET weight=1 condition=good badges=first_scan";
        assert!(ingest_line(&conn, &parser, line, None).is_err());

        assert_eq!(db::total_scans(&conn).unwrap(), 0);
        assert!(db::get_city_metric(&conn, "lagos").unwrap().is_none());
    }

    #[test]
    fn wrong_family_condition_fails_scoring() {
        let parser = LineParser::new().unwrap();
        let scan = parser
            .parse("city=accra material=PET weight=1 condition=like-new")
            .unwrap()
            .unwrap();
        assert!(score_line(&scan).is_err());
    }
}
