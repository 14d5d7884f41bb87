//! Schema definitions for economy data files

pub mod faction;
