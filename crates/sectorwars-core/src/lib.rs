//! SectorWars Core - Player economy state model
//!
//! This crate provides the rules and state for a player's economy:
//! - Turn accounts with continuous, capped regeneration (`PlayerTurnAccount`)
//! - Faction reputation with levels, decay, and propagation (`FactionReputation`)
//! - Planetary production and storage (`PlanetResourceState`)
//! - The `Economy` orchestrator that applies time-based updates lazily
//!
//! ## Lazy Evaluation
//!
//! Nothing runs in the background. Regeneration, decay, and production are
//! pure functions of the stored state and the current time, settled on the
//! next read of the affected row:
//!
//! ```text
//! elapsed time ─▶ regenerate / decay / produce ─▶ ledger ─▶ caller debits/credits
//! ```
//!
//! ## Storage
//!
//! The `Ledger` trait is the persistence seam. `MemoryLedger` lives here;
//! `sectorwars-db` provides a native_db-backed store.

pub mod config;
pub mod economy;
mod error;
mod identity;
pub mod ledger;
mod locks;
pub mod production;
pub mod reputation;
mod resource;
pub mod time;
pub mod turns;

pub use config::{
    EconomyConfig, FactionRelation, PlanetType, PlanetTypeProfile, ProductionConfig,
    ReputationConfig, Stance, TurnConfig, REPUTATION_MAX, REPUTATION_MIN,
};
pub use economy::{Economy, ReputationUpdate};
pub use error::{Error, Result};
pub use identity::{FactionId, PlanetId, PlayerId};
pub use ledger::{Ledger, MemoryLedger};
pub use locks::{RowKey, RowLocks};
pub use production::{PlanetResourceState, ProductionReport};
pub use reputation::{
    get_level, CombatResponse, FactionReputation, PortAccess, ReputationChange, ReputationLevel,
    Standing,
};
pub use resource::{ColonistAllocation, ColonistRole, Resource, ResourceTable};
pub use time::{Clock, ManualClock, SystemClock, Timestamp};
pub use turns::{PlayerTurnAccount, TurnCost};
