use crate::error::{Error, Result};
use native_db::*;
use native_model::{native_model, Model};
use sectorwars_core::PlayerTurnAccount;
use serde::{Deserialize, Serialize};

/// Stored turn account, one row per player.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 1, version = 1)]
#[native_db]
pub struct StoredTurnAccount {
    #[primary_key]
    pub player_id: u64,
    /// Serialized `PlayerTurnAccount`.
    pub data: Vec<u8>,
}

impl StoredTurnAccount {
    pub fn from_account(account: &PlayerTurnAccount) -> Result<Self> {
        Ok(Self {
            player_id: account.player_id.raw(),
            data: bincode::serialize(account)?,
        })
    }

    pub fn to_account(&self) -> Result<PlayerTurnAccount> {
        let account: PlayerTurnAccount = bincode::deserialize(&self.data)?;
        if account.player_id.raw() != self.player_id {
            return Err(Error::Corrupt {
                key: self.player_id.to_string(),
                reason: format!("blob belongs to {}", account.player_id),
            });
        }
        Ok(account)
    }
}
