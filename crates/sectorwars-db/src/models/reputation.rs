use crate::error::{Error, Result};
use native_db::*;
use native_model::{native_model, Model};
use sectorwars_core::{FactionId, FactionReputation, PlayerId};
use serde::{Deserialize, Serialize};

/// Stored reputation record, one row per (player, faction) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 2, version = 1)]
#[native_db]
pub struct StoredReputation {
    /// `<player:020>:<faction>`
    #[primary_key]
    pub key: String,
    /// Owning player, for per-player scans.
    #[secondary_key]
    pub player_id: u64,
    pub faction_id: String,
    /// Score at the time of the last write, for inspection.
    pub score: i32,
    /// Serialized `FactionReputation`.
    pub data: Vec<u8>,
}

impl StoredReputation {
    /// Primary key for a player's record with a faction
    pub fn key(player: PlayerId, faction: &FactionId) -> String {
        format!("{:020}:{}", player.raw(), faction.as_str())
    }

    pub fn from_record(record: &FactionReputation) -> Result<Self> {
        Ok(Self {
            key: Self::key(record.player_id, &record.faction_id),
            player_id: record.player_id.raw(),
            faction_id: record.faction_id.as_str().to_string(),
            score: record.score,
            data: bincode::serialize(record)?,
        })
    }

    pub fn to_record(&self) -> Result<FactionReputation> {
        let record: FactionReputation = bincode::deserialize(&self.data)?;
        if Self::key(record.player_id, &record.faction_id) != self.key {
            return Err(Error::Corrupt {
                key: self.key.clone(),
                reason: format!(
                    "blob belongs to {} / {}",
                    record.player_id, record.faction_id
                ),
            });
        }
        Ok(record)
    }
}
