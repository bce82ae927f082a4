//! PLY Rewards
//!
//! Reward scoring and forecast engine for recycle-to-earn submissions.
//! Scores plastic and e-waste scans, applies streak and referral bonuses,
//! and projects per-city token issuance and badge rarity.

pub mod bonus;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod forecast;
pub mod ingest;
pub mod models;
pub mod scorer;
pub mod validation;

pub use error::{Result, RewardError};
