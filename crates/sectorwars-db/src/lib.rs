//! SectorWars DB - Persistent economy ledger using native_db
//!
//! Provides durable storage for:
//! - Player turn accounts
//! - Faction reputation records (one row per player and faction)
//! - Planetary production state
//!
//! [`Store`] implements [`sectorwars_core::Ledger`], so it plugs straight
//! into an `Economy`.

mod error;
mod models;
mod queries;
mod store;

pub use error::{Error, Result};
pub use store::Store;
