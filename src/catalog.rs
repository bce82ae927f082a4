//! Static material catalog
//!
//! Two disjoint tables, plastics keyed by resin type and e-waste keyed by
//! device category. Both are built on first access and never mutated.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::error::{Result, RewardError};
use crate::models::{DifficultyTier, HazardLevel, MaterialFamily, MaterialType};

static PLASTICS: &[MaterialType] = &[
    MaterialType {
        id: "PET",
        name: "Polyethylene Terephthalate",
        family: MaterialFamily::Plastic,
        category: "Bottles & Containers",
        resin_code: Some(1),
        multiplier: 1.0,
        difficulty: DifficultyTier::Easy,
        hazard: HazardLevel::None,
    },
    MaterialType {
        id: "HDPE",
        name: "High-Density Polyethylene",
        family: MaterialFamily::Plastic,
        category: "Jugs & Detergent Bottles",
        resin_code: Some(2),
        multiplier: 1.2,
        difficulty: DifficultyTier::Easy,
        hazard: HazardLevel::None,
    },
    MaterialType {
        id: "PVC",
        name: "Polyvinyl Chloride",
        family: MaterialFamily::Plastic,
        category: "Pipes & Packaging Film",
        resin_code: Some(3),
        multiplier: 0.8,
        difficulty: DifficultyTier::Hard,
        hazard: HazardLevel::Moderate,
    },
    MaterialType {
        id: "LDPE",
        name: "Low-Density Polyethylene",
        family: MaterialFamily::Plastic,
        category: "Bags & Wraps",
        resin_code: Some(4),
        multiplier: 0.9,
        difficulty: DifficultyTier::Medium,
        hazard: HazardLevel::None,
    },
    MaterialType {
        id: "PP",
        name: "Polypropylene",
        family: MaterialFamily::Plastic,
        category: "Caps & Food Tubs",
        resin_code: Some(5),
        multiplier: 1.1,
        difficulty: DifficultyTier::Medium,
        hazard: HazardLevel::None,
    },
    MaterialType {
        id: "PS",
        name: "Polystyrene",
        family: MaterialFamily::Plastic,
        category: "Foam & Disposable Cutlery",
        resin_code: Some(6),
        multiplier: 0.7,
        difficulty: DifficultyTier::Hard,
        hazard: HazardLevel::Low,
    },
    MaterialType {
        id: "OTHER",
        name: "Other Plastics",
        family: MaterialFamily::Plastic,
        category: "Mixed & Multi-layer",
        resin_code: Some(7),
        multiplier: 0.5,
        difficulty: DifficultyTier::Specialized,
        hazard: HazardLevel::Low,
    },
];

static E_WASTE: &[MaterialType] = &[
    MaterialType {
        id: "SMARTPHONE",
        name: "Smartphone",
        family: MaterialFamily::EWaste,
        category: "Mobile Devices",
        resin_code: None,
        multiplier: 3.0,
        difficulty: DifficultyTier::Hard,
        hazard: HazardLevel::High,
    },
    MaterialType {
        id: "LAPTOP",
        name: "Laptop",
        family: MaterialFamily::EWaste,
        category: "Computers",
        resin_code: None,
        multiplier: 5.0,
        difficulty: DifficultyTier::Hard,
        hazard: HazardLevel::High,
    },
    MaterialType {
        id: "TABLET",
        name: "Tablet",
        family: MaterialFamily::EWaste,
        category: "Mobile Devices",
        resin_code: None,
        multiplier: 4.0,
        difficulty: DifficultyTier::Hard,
        hazard: HazardLevel::High,
    },
    MaterialType {
        id: "DESKTOP",
        name: "Desktop Computer",
        family: MaterialFamily::EWaste,
        category: "Computers",
        resin_code: None,
        multiplier: 6.0,
        difficulty: DifficultyTier::Hard,
        hazard: HazardLevel::Moderate,
    },
    MaterialType {
        id: "MONITOR",
        name: "Monitor",
        family: MaterialFamily::EWaste,
        category: "Displays",
        resin_code: None,
        multiplier: 3.5,
        difficulty: DifficultyTier::Specialized,
        hazard: HazardLevel::High,
    },
    MaterialType {
        id: "BATTERY",
        name: "Battery",
        family: MaterialFamily::EWaste,
        category: "Batteries",
        resin_code: None,
        multiplier: 2.0,
        difficulty: DifficultyTier::Specialized,
        hazard: HazardLevel::High,
    },
    MaterialType {
        id: "CABLE",
        name: "Cables & Chargers",
        family: MaterialFamily::EWaste,
        category: "Accessories",
        resin_code: None,
        multiplier: 0.5,
        difficulty: DifficultyTier::Easy,
        hazard: HazardLevel::Low,
    },
    MaterialType {
        id: "SMALL_APPLIANCE",
        name: "Small Appliance",
        family: MaterialFamily::EWaste,
        category: "Household",
        resin_code: None,
        multiplier: 2.5,
        difficulty: DifficultyTier::Medium,
        hazard: HazardLevel::Moderate,
    },
];

static INDEX: LazyLock<HashMap<&'static str, &'static MaterialType>> = LazyLock::new(|| {
    PLASTICS
        .iter()
        .chain(E_WASTE.iter())
        .map(|m| (m.id, m))
        .collect()
});

/// Look up a material by identifier (case-insensitive).
pub fn lookup(material_id: &str) -> Result<&'static MaterialType> {
    let key = material_id.trim().to_ascii_uppercase();
    INDEX
        .get(key.as_str())
        .copied()
        .ok_or_else(|| RewardError::UnknownMaterial(material_id.to_string()))
}

/// Look up a plastic by its SPI resin code (1-7).
pub fn lookup_resin_code(code: u8) -> Result<&'static MaterialType> {
    PLASTICS
        .iter()
        .find(|m| m.resin_code == Some(code))
        .ok_or_else(|| RewardError::UnknownMaterial(format!("resin code {}", code)))
}

pub fn plastics() -> impl Iterator<Item = &'static MaterialType> {
    PLASTICS.iter()
}

pub fn e_waste() -> impl Iterator<Item = &'static MaterialType> {
    E_WASTE.iter()
}

/// Every material, plastics first, each family in table order.
pub fn all() -> impl Iterator<Item = &'static MaterialType> {
    plastics().chain(e_waste())
}
