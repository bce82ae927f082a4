//! PLY Rewards CLI
//!
//! Scores recycling submissions and reports city forecasts and badge rarity.

use std::fmt::Display;
use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ply_rewards::config::{DEFAULT_LOG_FILTER, Settings};
use ply_rewards::models::{
    BonusFlags, Condition, DeviceReading, EWasteCondition, MaterialFamily, PlasticCondition,
    UserActivityContext,
};
use ply_rewards::{bonus, catalog, db, forecast, ingest, scorer};

#[derive(Parser)]
#[command(name = "ply-rewards")]
#[command(about = "Reward scoring and forecasts for recycle-to-earn submissions")]
struct Cli {
    /// Path to the SQLite snapshot database [env: PLY_REWARDS_DB]
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Print reports as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize empty database with schema
    Init,

    /// Load sample cities, badges and submissions
    LoadSample,

    /// Ingest a directory of scan logs
    Ingest {
        /// Directory containing *.log scan files
        dir: PathBuf,

        /// Clear existing data before ingestion
        #[arg(long)]
        clear: bool,
    },

    /// Score a single submission
    Score {
        /// Material identifier (e.g. "PET", "LAPTOP")
        material: String,

        /// Weight in kg (optional for e-waste)
        #[arg(short, long)]
        weight: Option<f64>,

        /// Condition (plastics: poor/fair/good/excellent, e-waste: damaged/functional/like-new)
        #[arg(short, long)]
        condition: String,

        /// Device still has its original packaging (e-waste)
        #[arg(long)]
        packaging: bool,

        /// Contamination score reported by a collection point (0.0-1.0)
        #[arg(long)]
        contamination: Option<f64>,

        /// Collection point captured image evidence
        #[arg(long)]
        image: bool,

        /// Collection point identifier
        #[arg(long, default_value = "cli")]
        device: String,

        /// Consecutive active days, to apply streak bonus
        #[arg(long)]
        streak: Option<u32>,

        /// Referral count, to apply referral bonus
        #[arg(long)]
        referrals: Option<u32>,
    },

    /// Apply streak and referral bonuses to a base reward
    Bonus {
        /// Base PLY amount
        base: f64,

        #[arg(short, long, default_value = "0")]
        streak: u32,

        #[arg(short, long, default_value = "0")]
        referrals: u32,
    },

    /// Project next-period token totals per city
    Forecast {
        /// Only this city
        city: Option<String>,

        /// Daily growth rate [env: PLY_REWARDS_GROWTH_RATE, default: 0.001]
        #[arg(short, long)]
        rate: Option<f64>,
    },

    /// Badge rarity from stored badge counts
    Rarity,

    /// List all materials in the catalog
    ListMaterials,

    /// Show details for a specific material
    Material {
        /// Material ID
        id: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let growth_override = match &cli.command {
        Commands::Forecast { rate, .. } => *rate,
        _ => None,
    };
    let settings = Settings::from_env().with_overrides(cli.database.clone(), growth_override);
    let json = cli.json;

    match cli.command {
        Commands::Init => {
            let _conn = open_store(&settings)?;
            println!("Database initialized at: {}", settings.database.display());
        }

        Commands::LoadSample => {
            let conn = open_store(&settings)?;
            load_sample_data(&conn)?;
            println!("Sample data loaded successfully!");
        }

        Commands::Ingest { dir, clear } => {
            let conn = open_store(&settings)?;
            if clear {
                println!("Clearing existing data...");
                db::clear_data(&conn)?;
            }

            let stats = ingest::ingest_directory(&conn, &dir)?;
            println!("{}", stats);
        }

        Commands::Score {
            material,
            weight,
            condition,
            packaging,
            contamination,
            image,
            device,
            streak,
            referrals,
        } => {
            let material = catalog::lookup(&material)?;
            let condition = scorer::parse_condition(material, &condition)?;

            let result = match weight {
                Some(weight_kg) => {
                    let reading = contamination.map(|contamination_score| DeviceReading {
                        device_id: device,
                        weight_kg,
                        contamination_score,
                        has_image_evidence: image,
                    });
                    let flags = BonusFlags {
                        has_original_packaging: packaging,
                        reading,
                    };
                    scorer::score(material, weight_kg, condition, &flags)?
                }
                None => match condition {
                    Condition::EWaste(c) if contamination.is_none() => {
                        scorer::calculate_e_waste_reward(material.id, c, packaging)?
                    }
                    Condition::EWaste(_) => bail!("--contamination requires --weight"),
                    Condition::Plastic(_) => bail!("--weight is required for plastic materials"),
                },
            };

            if streak.is_some() || referrals.is_some() {
                let ctx = UserActivityContext {
                    streak_days: streak.unwrap_or(0),
                    referrals: referrals.unwrap_or(0),
                };
                let activity = scorer::apply_activity(&result, &ctx);
                if json {
                    print_json(&serde_json::json!({ "reward": result, "activity": activity }))?;
                } else {
                    println!("{}", result);
                    println!("{}", activity);
                }
            } else {
                emit(json, &result)?;
            }
        }

        Commands::Bonus {
            base,
            streak,
            referrals,
        } => {
            let ctx = UserActivityContext {
                streak_days: streak,
                referrals,
            };
            emit(json, &ctx.apply(base))?;
        }

        Commands::Forecast { city, .. } => {
            let conn = open_store(&settings)?;
            let metrics = match city {
                Some(name) => match db::get_city_metric(&conn, &name.to_ascii_lowercase())? {
                    Some(m) => vec![m],
                    None => bail!("City '{}' not found", name),
                },
                None => db::list_city_metrics(&conn)?,
            };

            let results = forecast::forecast_all(&metrics, settings.daily_growth_rate);
            if json {
                print_json(&results)?;
            } else if results.is_empty() {
                println!("No city metrics in database. Run 'ingest' or 'load-sample' first.");
            } else {
                println!(
                    "Forecast at {:.2}% daily growth\n",
                    settings.daily_growth_rate * 100.0
                );
                println!(
                    "{:<20} {:>14} {:>14} {:>12} {:>12} {:>8}",
                    "City", "PLY", "PLY next", "CRT", "CRT next", "Scans"
                );
                println!("{}", "-".repeat(85));
                for r in &results {
                    print!("{}", r);
                }
            }
        }

        Commands::Rarity => {
            let conn = open_store(&settings)?;
            let stats = db::list_badge_stats(&conn)?;
            let total = db::total_scans(&conn)?;
            let entries = forecast::badge_rarity(&stats, total)?;

            if json {
                print_json(&entries)?;
            } else {
                println!("Badge rarity across {} scans:\n", total);
                println!("{:<24} {:>10} {:>10}", "Badge", "Earned", "Rarity");
                println!("{}", "-".repeat(46));
                for e in entries {
                    println!("{:<24} {:>10} {:>10.4}", e.badge_id, e.earned_by, e.rarity);
                }
            }
        }

        Commands::ListMaterials => {
            if json {
                print_json(&catalog::all().collect::<Vec<_>>())?;
            } else {
                println!(
                    "{:<16} {:<28} {:<8} {:>6} {:<12} {:<8}",
                    "ID", "Name", "Family", "Mult", "Difficulty", "Hazard"
                );
                println!("{}", "-".repeat(84));
                for m in catalog::all() {
                    println!(
                        "{:<16} {:<28} {:<8} {:>6.2} {:<12} {:<8}",
                        m.id,
                        m.name,
                        m.family.to_string(),
                        m.multiplier,
                        m.difficulty.name(),
                        m.hazard.name()
                    );
                }
            }
        }

        Commands::Material { id } => {
            let m = catalog::lookup(&id)?;
            if json {
                print_json(m)?;
            } else {
                println!("Material: {}", m.name);
                println!("  ID: {}", m.id);
                println!("  Family: {}", m.family);
                println!("  Category: {}", m.category);
                if let Some(code) = m.resin_code {
                    println!("  Resin code: {}", code);
                }
                println!("  Multiplier: x{}", m.multiplier);
                println!("  Difficulty: {}", m.difficulty.name());
                println!("  Hazard: {}", m.hazard.name());
                match m.family {
                    MaterialFamily::Plastic => {
                        let r = scorer::calculate_reward(m.id, 1.0, PlasticCondition::Good)?;
                        println!("  Reward at 1 kg, good: {:.1} PLY", r.amount);
                    }
                    MaterialFamily::EWaste => {
                        let r = scorer::calculate_e_waste_reward(
                            m.id,
                            EWasteCondition::Functional,
                            false,
                        )?;
                        println!("  Reward functional, no packaging: {:.1} PLY", r.amount);
                    }
                }
                println!(
                    "  Streak tiers: x{} at 7 days, x{} at 14, x{} at 30",
                    bonus::streak_multiplier(7),
                    bonus::streak_multiplier(14),
                    bonus::streak_multiplier(30)
                );
            }
        }
    }

    Ok(())
}

fn open_store(settings: &Settings) -> Result<Connection> {
    let conn = Connection::open(&settings.database)?;
    db::init_schema(&conn)?;
    Ok(conn)
}

fn emit<T: Serialize + Display>(json: bool, value: &T) -> Result<()> {
    if json {
        print_json(value)
    } else {
        println!("{}", value);
        Ok(())
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Load sample scan data for testing without collection-point logs
fn load_sample_data(conn: &Connection) -> Result<()> {
    const SAMPLE_SCANS: &[&str] = &[
        "city=lagos material=PET weight=4.2 condition=good badges=first_scan",
        "city=lagos material=HDPE weight=12.0 condition=excellent crt=0.8",
        "city=lagos material=PET weight=2.0 condition=fair contamination=0.1 image=true device=lag-kiosk-01",
        "city=lagos material=PS weight=1.1 condition=poor contamination=0.7 device=lag-kiosk-01",
        "city=lagos material=SMARTPHONE weight=0.2 condition=functional packaging=true badges=e_waste_hero",
        "city=nairobi material=PP weight=6.5 condition=good badges=first_scan crt=0.3",
        "city=nairobi material=LAPTOP weight=2.1 condition=like-new badges=e_waste_hero,eco_warrior crt=4.5",
        "city=nairobi material=LDPE weight=3.0 condition=good",
        "city=accra material=PET weight=25.0 condition=good badges=first_scan,bulk_recycler",
        "city=accra material=BATTERY weight=0.5 condition=damaged crt=1.2",
        "city=accra material=CABLE weight=0.8 condition=functional",
    ];

    db::clear_data(conn)?;

    let parser = ingest::LineParser::new()?;
    for line in SAMPLE_SCANS {
        ingest::ingest_line(conn, &parser, line, Some("sample"))?;
    }

    println!("Loaded {} sample scans", SAMPLE_SCANS.len());
    Ok(())
}
