//! Scans over the stored ledgers.

use crate::error::{Error, Result};
use crate::models::*;
use crate::store::Store;
use sectorwars_core::{FactionReputation, PlanetResourceState, PlayerId, PlayerTurnAccount};

impl Store {
    /// Every reputation record held by a player.
    pub fn reputations_of(&self, player: PlayerId) -> Result<Vec<FactionReputation>> {
        let r = self.db.r_transaction()?;
        let scan = r
            .scan()
            .secondary::<StoredReputation>(StoredReputationKey::player_id)?;
        let iter = scan.start_with(player.raw())?;
        let rows: std::result::Result<Vec<StoredReputation>, _> = iter.collect();
        let rows = rows.map_err(|e| Error::Database(e.to_string()))?;
        rows.iter().map(StoredReputation::to_record).collect()
    }

    /// Every planet owned by a player.
    pub fn planets_of(&self, owner: PlayerId) -> Result<Vec<PlanetResourceState>> {
        let r = self.db.r_transaction()?;
        let scan = r.scan().secondary::<StoredPlanet>(StoredPlanetKey::owner)?;
        let iter = scan.start_with(owner.raw())?;
        let rows: std::result::Result<Vec<StoredPlanet>, _> = iter.collect();
        let rows = rows.map_err(|e| Error::Database(e.to_string()))?;
        rows.iter().map(StoredPlanet::to_planet).collect()
    }

    /// Number of planets a player owns.
    pub fn count_planets_of(&self, owner: PlayerId) -> Result<usize> {
        let r = self.db.r_transaction()?;
        let scan = r.scan().secondary::<StoredPlanet>(StoredPlanetKey::owner)?;
        let iter = scan.start_with(owner.raw())?;
        Ok(iter.count())
    }

    /// Every turn account in the store.
    pub fn all_turn_accounts(&self) -> Result<Vec<PlayerTurnAccount>> {
        let r = self.db.r_transaction()?;
        let scan = r.scan().primary::<StoredTurnAccount>()?;
        let iter = scan.all()?;
        let rows: std::result::Result<Vec<StoredTurnAccount>, _> = iter.collect();
        let rows = rows.map_err(|e| Error::Database(e.to_string()))?;
        rows.iter().map(StoredTurnAccount::to_account).collect()
    }

    /// Players ranked by their last written score with one faction,
    /// highest first. Decay pending since the last write is not applied.
    pub fn faction_leaderboard(&self, faction: &str, limit: usize) -> Result<Vec<(PlayerId, i32)>> {
        let r = self.db.r_transaction()?;
        let scan = r.scan().primary::<StoredReputation>()?;
        let iter = scan.all()?;
        let rows: std::result::Result<Vec<StoredReputation>, _> = iter.collect();
        let rows = rows.map_err(|e| Error::Database(e.to_string()))?;
        let mut board: Vec<(PlayerId, i32)> = rows
            .into_iter()
            .filter(|row| row.faction_id == faction)
            .map(|row| (PlayerId::new(row.player_id), row.score))
            .collect();
        board.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.raw().cmp(&b.0.raw())));
        board.truncate(limit);
        Ok(board)
    }
}
