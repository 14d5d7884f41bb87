//! Error types for sectorwars-core

use crate::{PlanetId, PlayerId, Resource};
use thiserror::Error;

/// Core error type
///
/// Every variant is a deterministic business-rule rejection: the operation
/// that returned it left the ledgers untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Insufficient turns: requested {requested}, available {available}")]
    InsufficientTurns { requested: u32, available: u32 },

    #[error("Insufficient {resource} stock: requested {requested}, available {available}")]
    InsufficientStock {
        resource: Resource,
        requested: u64,
        available: u64,
    },

    #[error("Invalid colonist allocation: total must stay {expected}, got {got}")]
    InvalidAllocation { expected: u128, got: u128 },

    #[error("Invalid production upgrade level {level} (max {max})")]
    InvalidUpgradeLevel { level: u8, max: u8 },

    #[error("Invalid citadel level {level} (max {max})")]
    InvalidCitadelLevel { level: u8, max: u8 },

    #[error("Invalid bonus tier {tier} ({available} tiers configured)")]
    InvalidBonusTier { tier: usize, available: usize },

    #[error("Turn account not found: {0}")]
    AccountNotFound(PlayerId),

    #[error("Planet not found: {0}")]
    PlanetNotFound(PlanetId),

    #[error("Planet already colonized: {0}")]
    PlanetExists(PlanetId),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
