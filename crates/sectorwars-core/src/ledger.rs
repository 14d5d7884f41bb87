//! Ledger storage seam
//!
//! The orchestrator reads and writes state only through [`Ledger`]. The
//! in-memory implementation here backs tests and simulations; the
//! `sectorwars-db` crate provides a persistent one.

use crate::production::PlanetResourceState;
use crate::reputation::FactionReputation;
use crate::turns::PlayerTurnAccount;
use crate::{Error, FactionId, PlanetId, PlayerId, Result};
use indexmap::IndexMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Persistent storage for the three ledgers
///
/// Implementations must make each `save_*` call atomic: either every record
/// passed is written or none is.
pub trait Ledger: Send + Sync {
    fn load_turn_account(&self, player: PlayerId) -> Result<Option<PlayerTurnAccount>>;

    fn save_turn_account(&self, account: &PlayerTurnAccount) -> Result<()>;

    fn load_reputation(&self, player: PlayerId, faction: &FactionId) -> Result<Option<FactionReputation>>;

    /// Every reputation record held by a player
    fn load_reputations(&self, player: PlayerId) -> Result<Vec<FactionReputation>>;

    /// Write several records of one player in a single transaction
    fn save_reputations(&self, records: &[FactionReputation]) -> Result<()>;

    fn load_planet(&self, planet: PlanetId) -> Result<Option<PlanetResourceState>>;

    fn planets_owned_by(&self, owner: PlayerId) -> Result<Vec<PlanetResourceState>>;

    fn save_planet(&self, planet: &PlanetResourceState) -> Result<()>;

    /// Remove a planet; returns the removed state if it existed
    fn delete_planet(&self, planet: PlanetId) -> Result<Option<PlanetResourceState>>;
}

#[derive(Debug, Default)]
struct Tables {
    accounts: IndexMap<PlayerId, PlayerTurnAccount>,
    reputations: IndexMap<(PlayerId, FactionId), FactionReputation>,
    planets: IndexMap<PlanetId, PlanetResourceState>,
}

/// Ledger kept entirely in memory
#[derive(Debug, Default)]
pub struct MemoryLedger {
    tables: RwLock<Tables>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| Error::Storage("memory ledger lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| Error::Storage("memory ledger lock poisoned".to_string()))
    }
}

impl Ledger for MemoryLedger {
    fn load_turn_account(&self, player: PlayerId) -> Result<Option<PlayerTurnAccount>> {
        Ok(self.read()?.accounts.get(&player).cloned())
    }

    fn save_turn_account(&self, account: &PlayerTurnAccount) -> Result<()> {
        self.write()?
            .accounts
            .insert(account.player_id, account.clone());
        Ok(())
    }

    fn load_reputation(&self, player: PlayerId, faction: &FactionId) -> Result<Option<FactionReputation>> {
        Ok(self
            .read()?
            .reputations
            .get(&(player, faction.clone()))
            .cloned())
    }

    fn load_reputations(&self, player: PlayerId) -> Result<Vec<FactionReputation>> {
        Ok(self
            .read()?
            .reputations
            .values()
            .filter(|r| r.player_id == player)
            .cloned()
            .collect())
    }

    fn save_reputations(&self, records: &[FactionReputation]) -> Result<()> {
        let mut tables = self.write()?;
        for record in records {
            tables
                .reputations
                .insert((record.player_id, record.faction_id.clone()), record.clone());
        }
        Ok(())
    }

    fn load_planet(&self, planet: PlanetId) -> Result<Option<PlanetResourceState>> {
        Ok(self.read()?.planets.get(&planet).cloned())
    }

    fn planets_owned_by(&self, owner: PlayerId) -> Result<Vec<PlanetResourceState>> {
        Ok(self
            .read()?
            .planets
            .values()
            .filter(|p| p.owner == owner)
            .cloned()
            .collect())
    }

    fn save_planet(&self, planet: &PlanetResourceState) -> Result<()> {
        self.write()?.planets.insert(planet.planet_id, planet.clone());
        Ok(())
    }

    fn delete_planet(&self, planet: PlanetId) -> Result<Option<PlanetResourceState>> {
        Ok(self.write()?.planets.shift_remove(&planet))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PlanetType, TurnConfig};
    use crate::ColonistAllocation;
    use chrono::Utc;

    #[test]
    fn test_memory_ledger_roundtrip() {
        let ledger = MemoryLedger::new();
        let now = Utc::now();
        let player = PlayerId::new(3);

        assert!(ledger.load_turn_account(player).unwrap().is_none());
        let account = PlayerTurnAccount::new(player, &TurnConfig::default(), now);
        ledger.save_turn_account(&account).unwrap();
        assert_eq!(ledger.load_turn_account(player).unwrap(), Some(account));

        let fed = FactionReputation::new(player, FactionId::new("federation"), now);
        let pirates = FactionReputation::new(player, FactionId::new("pirates"), now);
        let other = FactionReputation::new(PlayerId::new(4), FactionId::new("pirates"), now);
        ledger.save_reputations(&[fed.clone(), pirates, other]).unwrap();
        assert_eq!(ledger.load_reputations(player).unwrap().len(), 2);
        assert_eq!(
            ledger.load_reputation(player, &FactionId::new("federation")).unwrap(),
            Some(fed)
        );
    }

    #[test]
    fn test_memory_ledger_planets() {
        let ledger = MemoryLedger::new();
        let owner = PlayerId::new(1);
        let planet = PlanetResourceState::new(
            PlanetId::new(9),
            owner,
            12,
            PlanetType::Desert,
            ColonistAllocation::new(1, 1, 1),
            Utc::now(),
        );
        ledger.save_planet(&planet).unwrap();
        assert_eq!(ledger.planets_owned_by(owner).unwrap().len(), 1);
        assert_eq!(ledger.delete_planet(PlanetId::new(9)).unwrap(), Some(planet));
        assert!(ledger.load_planet(PlanetId::new(9)).unwrap().is_none());
        assert!(ledger.delete_planet(PlanetId::new(9)).unwrap().is_none());
    }
}
