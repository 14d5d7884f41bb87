//! Database models for persistent storage.
//!
//! Each ledger row keeps its indexed columns in plain fields and the full
//! record as a bincode blob, so the record shape can grow without new
//! native_db model versions.

mod planet;
mod reputation;
mod turns;

pub use planet::*;
pub use reputation::*;
pub use turns::*;
