//! Faction definition schema

use indexmap::IndexMap;
use sectorwars_core::FactionId;
use serde::{Deserialize, Serialize};

/// Definition of a faction players can build standing with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactionDef {
    /// Unique identifier, used as the reputation key
    pub id: FactionId,
    /// Display name
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Factions whose reputation moves with this one
    #[serde(default)]
    pub allies: Vec<FactionId>,
    /// Factions whose reputation moves against this one
    #[serde(default)]
    pub enemies: Vec<FactionId>,
    /// Closes territory at -200 instead of -400
    #[serde(default)]
    pub strict: bool,
}

impl FactionDef {
    /// Create a new faction definition
    pub fn new(id: impl Into<FactionId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            allies: Vec::new(),
            enemies: Vec::new(),
            strict: false,
        }
    }

    pub fn with_allies(mut self, allies: impl IntoIterator<Item = impl Into<FactionId>>) -> Self {
        self.allies.extend(allies.into_iter().map(Into::into));
        self
    }

    pub fn with_enemies(mut self, enemies: impl IntoIterator<Item = impl Into<FactionId>>) -> Self {
        self.enemies.extend(enemies.into_iter().map(Into::into));
        self
    }

    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }
}

/// Faction definitions in load order
pub type FactionDefs = IndexMap<FactionId, FactionDef>;
