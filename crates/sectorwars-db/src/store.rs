//! Database store wrapper.

use crate::error::{Error, Result};
use crate::models::*;
use native_db::*;
use sectorwars_core::{
    FactionId, FactionReputation, Ledger, PlanetId, PlanetResourceState, PlayerId,
    PlayerTurnAccount,
};
use std::path::Path;
use std::sync::LazyLock;

// Static models for the database
static MODELS: LazyLock<Models> = LazyLock::new(|| {
    let mut models = Models::new();
    models.define::<StoredTurnAccount>().unwrap();
    models.define::<StoredReputation>().unwrap();
    models.define::<StoredPlanet>().unwrap();
    models
});

/// Database store for the economy ledgers.
pub struct Store {
    pub(crate) db: Database<'static>,
}

impl Store {
    /// Open or create a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Builder::new()
            .create(&MODELS, path.as_ref())
            .map_err(|e| Error::Database(e.to_string()))?;
        tracing::info!(path = %path.as_ref().display(), "ledger store opened");
        Ok(Self { db })
    }

    /// Create an in-memory database.
    pub fn in_memory() -> Result<Self> {
        let db = Builder::new()
            .create_in_memory(&MODELS)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(Self { db })
    }

    /// Load a player's turn account.
    pub fn get_turn_account(&self, player: PlayerId) -> Result<Option<PlayerTurnAccount>> {
        let r = self.db.r_transaction()?;
        let stored: Option<StoredTurnAccount> = r.get().primary(player.raw())?;
        stored.map(|s| s.to_account()).transpose()
    }

    /// Save a turn account.
    pub fn put_turn_account(&self, account: &PlayerTurnAccount) -> Result<()> {
        let stored = StoredTurnAccount::from_account(account)?;
        let rw = self.db.rw_transaction()?;
        rw.upsert(stored)?;
        rw.commit()?;
        Ok(())
    }

    /// Load one reputation record.
    pub fn get_reputation(
        &self,
        player: PlayerId,
        faction: &FactionId,
    ) -> Result<Option<FactionReputation>> {
        let r = self.db.r_transaction()?;
        let stored: Option<StoredReputation> =
            r.get().primary(StoredReputation::key(player, faction))?;
        stored.map(|s| s.to_record()).transpose()
    }

    /// Save several reputation records in one transaction.
    ///
    /// Nothing is written if any record fails to encode.
    pub fn put_reputations(&self, records: &[FactionReputation]) -> Result<()> {
        let stored = records
            .iter()
            .map(StoredReputation::from_record)
            .collect::<Result<Vec<_>>>()?;
        let rw = self.db.rw_transaction()?;
        for row in stored {
            rw.upsert(row)?;
        }
        rw.commit()?;
        Ok(())
    }

    /// Load a planet.
    pub fn get_planet(&self, planet: PlanetId) -> Result<Option<PlanetResourceState>> {
        let r = self.db.r_transaction()?;
        let stored: Option<StoredPlanet> = r.get().primary(planet.raw())?;
        stored.map(|s| s.to_planet()).transpose()
    }

    /// Save a planet.
    pub fn put_planet(&self, planet: &PlanetResourceState) -> Result<()> {
        let stored = StoredPlanet::from_planet(planet)?;
        let rw = self.db.rw_transaction()?;
        rw.upsert(stored)?;
        rw.commit()?;
        Ok(())
    }

    /// Delete a planet, returning what was stored.
    pub fn remove_planet(&self, planet: PlanetId) -> Result<Option<PlanetResourceState>> {
        let rw = self.db.rw_transaction()?;
        let stored: Option<StoredPlanet> = rw.get().primary(planet.raw())?;
        let removed = match stored {
            Some(s) => {
                let state = s.to_planet()?;
                rw.remove(s)?;
                Some(state)
            }
            None => None,
        };
        rw.commit()?;
        Ok(removed)
    }
}

impl Ledger for Store {
    fn load_turn_account(&self, player: PlayerId) -> sectorwars_core::Result<Option<PlayerTurnAccount>> {
        Ok(self.get_turn_account(player)?)
    }

    fn save_turn_account(&self, account: &PlayerTurnAccount) -> sectorwars_core::Result<()> {
        Ok(self.put_turn_account(account)?)
    }

    fn load_reputation(
        &self,
        player: PlayerId,
        faction: &FactionId,
    ) -> sectorwars_core::Result<Option<FactionReputation>> {
        Ok(self.get_reputation(player, faction)?)
    }

    fn load_reputations(&self, player: PlayerId) -> sectorwars_core::Result<Vec<FactionReputation>> {
        Ok(self.reputations_of(player)?)
    }

    fn save_reputations(&self, records: &[FactionReputation]) -> sectorwars_core::Result<()> {
        Ok(self.put_reputations(records)?)
    }

    fn load_planet(&self, planet: PlanetId) -> sectorwars_core::Result<Option<PlanetResourceState>> {
        Ok(self.get_planet(planet)?)
    }

    fn planets_owned_by(&self, owner: PlayerId) -> sectorwars_core::Result<Vec<PlanetResourceState>> {
        Ok(self.planets_of(owner)?)
    }

    fn save_planet(&self, planet: &PlanetResourceState) -> sectorwars_core::Result<()> {
        Ok(self.put_planet(planet)?)
    }

    fn delete_planet(&self, planet: PlanetId) -> sectorwars_core::Result<Option<PlanetResourceState>> {
        Ok(self.remove_planet(planet)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use sectorwars_core::{
        ColonistAllocation, Economy, EconomyConfig, ManualClock, PlanetType, Resource, TurnConfig,
    };
    use std::sync::Arc;

    fn now() -> sectorwars_core::Timestamp {
        Utc.with_ymd_and_hms(2102, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_turn_account_roundtrip() {
        let store = Store::in_memory().unwrap();
        let player = PlayerId::new(42);
        assert!(store.get_turn_account(player).unwrap().is_none());

        let mut account = PlayerTurnAccount::new(player, &TurnConfig::default(), now());
        account.spend(250).unwrap();
        account.regen_carry = 0.75;
        store.put_turn_account(&account).unwrap();

        assert_eq!(store.get_turn_account(player).unwrap(), Some(account));
        assert_eq!(store.all_turn_accounts().unwrap().len(), 1);
    }

    #[test]
    fn test_reputations_scanned_per_player() {
        let store = Store::in_memory().unwrap();
        let alice = PlayerId::new(1);
        let bob = PlayerId::new(2);
        let config = EconomyConfig::default().reputation;

        let mut fed = FactionReputation::new(alice, FactionId::new("federation"), now());
        fed.adjust(120, "patrol", now(), &config);
        let pirates = FactionReputation::new(alice, FactionId::new("pirates"), now());
        let mut other = FactionReputation::new(bob, FactionId::new("federation"), now());
        other.adjust(300, "escort", now(), &config);

        store
            .put_reputations(&[fed.clone(), pirates, other])
            .unwrap();

        let alice_records = store.reputations_of(alice).unwrap();
        assert_eq!(alice_records.len(), 2);
        assert!(alice_records.iter().all(|r| r.player_id == alice));
        assert_eq!(
            store.get_reputation(alice, &FactionId::new("federation")).unwrap(),
            Some(fed)
        );
        assert!(store
            .get_reputation(bob, &FactionId::new("pirates"))
            .unwrap()
            .is_none());

        let board = store.faction_leaderboard("federation", 10).unwrap();
        assert_eq!(board, vec![(bob, 300), (alice, 120)]);
    }

    #[test]
    fn test_planet_lifecycle() {
        let store = Store::in_memory().unwrap();
        let owner = PlayerId::new(5);
        let planet = PlanetResourceState::new(
            PlanetId::new(77),
            owner,
            310,
            PlanetType::Volcanic,
            ColonistAllocation::new(100, 0, 50),
            now(),
        );
        store.put_planet(&planet).unwrap();
        assert_eq!(store.count_planets_of(owner).unwrap(), 1);
        assert_eq!(store.planets_of(owner).unwrap(), vec![planet.clone()]);
        assert!(store.planets_of(PlayerId::new(6)).unwrap().is_empty());

        assert_eq!(store.remove_planet(PlanetId::new(77)).unwrap(), Some(planet));
        assert!(store.get_planet(PlanetId::new(77)).unwrap().is_none());
        assert!(store.remove_planet(PlanetId::new(77)).unwrap().is_none());
    }

    #[test]
    fn test_economy_over_store() {
        let clock = Arc::new(ManualClock::new(now()));
        let economy =
            Economy::new(EconomyConfig::default(), Store::in_memory().unwrap(), clock.clone())
                .unwrap();
        let player = PlayerId::new(9);

        economy.open_account(player).unwrap();
        assert_eq!(economy.spend_turns(player, 400).unwrap(), 600);
        clock.advance(Duration::hours(12));
        assert_eq!(economy.get_current_turns(player).unwrap(), 1000);

        let planet = PlanetResourceState::new(
            PlanetId::new(1),
            player,
            20,
            PlanetType::Terran,
            ColonistAllocation::new(0, 100, 0),
            now(),
        );
        economy.colonize_planet(planet).unwrap();
        clock.advance_hours(2);
        let stock = economy.resource_stock(PlanetId::new(1)).unwrap();
        assert!(stock[Resource::Organics] > 0);

        let update = economy
            .adjust_reputation(player, &FactionId::new("merchants"), 40, "trade run")
            .unwrap();
        assert_eq!(update.record.score, 40);
        assert_eq!(economy.ledger().reputations_of(player).unwrap().len(), 3);
    }
}
