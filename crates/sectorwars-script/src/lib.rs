//! SectorWars Script - RON configuration loader
//!
//! Loads economy data from RON files:
//! - Balancing tables (turns, reputation rules, production) into `EconomyConfig`
//! - Faction definitions with allies, enemies, and territory strictness
//!
//! Faction files replace the built-in relation table when present.

mod error;
mod loader;
mod schema;

pub use error::{Error, Result};
pub use loader::{load_config, EconomyDefs, Loader};
pub use schema::faction::{FactionDef, FactionDefs};
