//! Economy orchestrator
//!
//! The single entry point for game-action handlers. Every query settles
//! pending time-based changes (turn regeneration, reputation decay,
//! planetary production) before returning, and every mutation validates
//! before writing. Each operation holds the row lock of the entity it
//! touches for its whole read-modify-write, so concurrent handlers for the
//! same player or planet are serialized.
//!
//! ```
//! use sectorwars_core::{Economy, EconomyConfig, MemoryLedger, PlayerId, SystemClock};
//!
//! let economy = Economy::new(EconomyConfig::default(), MemoryLedger::new(), SystemClock).unwrap();
//! let player = PlayerId::new(1);
//! economy.open_account(player).unwrap();
//! economy.spend_turns(player, 3).unwrap();
//! assert!(economy.get_current_turns(player).unwrap() <= 1000);
//! ```

use crate::config::EconomyConfig;
use crate::ledger::Ledger;
use crate::locks::{RowKey, RowLocks};
use crate::production::PlanetResourceState;
use crate::reputation::{propagated_delta, FactionReputation, Standing};
use crate::time::{Clock, SystemClock, Timestamp};
use crate::turns::{PlayerTurnAccount, TurnCost};
use crate::{ColonistAllocation, Error, FactionId, PlanetId, PlayerId, Resource, ResourceTable, Result};
use tracing::{debug, info, warn};

/// Result of a reputation adjustment
#[derive(Debug, Clone, PartialEq)]
pub struct ReputationUpdate {
    /// The directly adjusted record
    pub record: FactionReputation,
    /// Points actually applied to the direct record after clamping
    pub applied: i32,
    /// Changes spilled over to related factions, after clamping
    pub propagated: Vec<(FactionId, i32)>,
}

/// Facade over the turn, reputation, and planet ledgers
pub struct Economy<L, C = SystemClock> {
    config: EconomyConfig,
    ledger: L,
    clock: C,
    locks: RowLocks,
}

impl<L: Ledger, C: Clock> Economy<L, C> {
    /// Create an orchestrator; fails if the configuration is invalid
    pub fn new(config: EconomyConfig, ledger: L, clock: C) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ledger,
            clock,
            locks: RowLocks::new(),
        })
    }

    pub fn config(&self) -> &EconomyConfig {
        &self.config
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn now(&self) -> Timestamp {
        self.clock.now()
    }


    /// Create the turn account for a new player (idempotent)
    pub fn open_account(&self, player: PlayerId) -> Result<PlayerTurnAccount> {
        self.locks.with(RowKey::Turns(player), || {
            if let Some(existing) = self.ledger.load_turn_account(player)? {
                return Ok(existing);
            }
            let account = PlayerTurnAccount::new(player, &self.config.turns, self.now());
            self.ledger.save_turn_account(&account)?;
            info!(player = %player, max_turns = account.max_turns, "turn account opened");
            Ok(account)
        })
    }

    /// Run `f` on a regenerated account under its row lock
    ///
    /// The account is persisted only when `f` succeeds.
    fn with_account<T>(
        &self,
        player: PlayerId,
        f: impl FnOnce(&mut PlayerTurnAccount) -> Result<T>,
    ) -> Result<T> {
        self.locks.with(RowKey::Turns(player), || {
            let mut account = self
                .ledger
                .load_turn_account(player)?
                .ok_or(Error::AccountNotFound(player))?;
            let gained = account.regenerate(self.now(), &self.config.turns);
            if gained > 0 {
                debug!(player = %player, gained, current = account.current_turns, "turns regenerated");
            }
            let out = f(&mut account)?;
            self.ledger.save_turn_account(&account)?;
            Ok(out)
        })
    }

    /// The regenerated account
    pub fn turn_account(&self, player: PlayerId) -> Result<PlayerTurnAccount> {
        self.with_account(player, |account| Ok(account.clone()))
    }

    /// Turns available now
    pub fn get_current_turns(&self, player: PlayerId) -> Result<u32> {
        self.with_account(player, |account| Ok(account.current_turns))
    }

    /// Whether the player could pay `amount` turns right now
    pub fn can_afford(&self, player: PlayerId, amount: u32) -> Result<bool> {
        self.with_account(player, |account| Ok(account.current_turns >= amount))
    }

    /// Deduct turns; returns the remaining balance
    pub fn spend_turns(&self, player: PlayerId, amount: u32) -> Result<u32> {
        self.with_account(player, |account| {
            account.spend(amount).inspect_err(|_| {
                debug!(player = %player, amount, available = account.current_turns, "insufficient turns");
            })?;
            Ok(account.current_turns)
        })
    }

    /// Charge an action's turn cost
    ///
    /// Free actions return without touching the account at all.
    pub fn charge(&self, player: PlayerId, cost: TurnCost) -> Result<()> {
        match cost {
            TurnCost::Free => Ok(()),
            TurnCost::Turns(amount) => self.spend_turns(player, amount).map(|_| ()),
        }
    }

    /// Grant reward turns, capped at the account maximum; returns turns added
    pub fn add_bonus_turns(&self, player: PlayerId, delta: u32) -> Result<u32> {
        self.with_account(player, |account| {
            let added = account.grant(delta);
            info!(player = %player, requested = delta, added, "bonus turns granted");
            Ok(added)
        })
    }

    /// Switch the companion-assistance bonus tier
    ///
    /// Regeneration up to now is settled at the old multiplier first.
    pub fn set_bonus_tier(&self, player: PlayerId, tier: usize) -> Result<f64> {
        let multiplier = self
            .config
            .turns
            .tier_multiplier(tier)
            .ok_or(Error::InvalidBonusTier {
                tier,
                available: self.config.turns.bonus_tiers.len(),
            })?;
        self.with_account(player, |account| {
            account.set_multiplier(multiplier);
            Ok(account.bonus_multiplier)
        })
    }

    /// Permanently raise a player's turn cap; returns the new cap
    pub fn raise_max_turns(&self, player: PlayerId, delta: u32) -> Result<u32> {
        self.with_account(player, |account| {
            account.raise_max(delta);
            Ok(account.max_turns)
        })
    }


    /// Load a record (or a fresh neutral one) with decay caught up to `now`
    fn load_decayed(&self, player: PlayerId, faction: &FactionId, now: Timestamp) -> Result<(FactionReputation, bool)> {
        match self.ledger.load_reputation(player, faction)? {
            Some(mut record) => {
                let before = record.clone();
                let moved = record.decay(now, &self.config.reputation);
                if moved > 0 {
                    debug!(player = %player, faction = %faction, moved, score = record.score, "reputation decayed");
                }
                let changed = record != before;
                Ok((record, changed))
            }
            None => Ok((FactionReputation::new(player, faction.clone(), now), false)),
        }
    }

    /// A player's record with one faction, decay applied
    pub fn reputation(&self, player: PlayerId, faction: &FactionId) -> Result<FactionReputation> {
        self.locks.with(RowKey::Reputation(player), || {
            let (record, changed) = self.load_decayed(player, faction, self.now())?;
            if changed {
                self.ledger.save_reputations(std::slice::from_ref(&record))?;
            }
            Ok(record)
        })
    }

    /// Every record a player holds, decay applied
    pub fn reputations(&self, player: PlayerId) -> Result<Vec<FactionReputation>> {
        self.locks.with(RowKey::Reputation(player), || {
            let now = self.now();
            let mut records = self.ledger.load_reputations(player)?;
            let mut dirty = Vec::new();
            for record in &mut records {
                let before = record.clone();
                record.decay(now, &self.config.reputation);
                if *record != before {
                    dirty.push(record.clone());
                }
            }
            if !dirty.is_empty() {
                self.ledger.save_reputations(&dirty)?;
            }
            Ok(records)
        })
    }

    /// Derived standing effects with one faction
    pub fn standing(&self, player: PlayerId, faction: &FactionId) -> Result<Standing> {
        let record = self.reputation(player, faction)?;
        Ok(record.standing(&self.config.reputation))
    }

    /// Apply a direct reputation change and its spill-over to related factions
    ///
    /// Changes are clamped, never rejected. All touched records are written
    /// in one ledger call.
    pub fn adjust_reputation(
        &self,
        player: PlayerId,
        faction: &FactionId,
        delta: i32,
        reason: &str,
    ) -> Result<ReputationUpdate> {
        self.locks.with(RowKey::Reputation(player), || {
            let now = self.now();
            let config = &self.config.reputation;

            let (mut record, _) = self.load_decayed(player, faction, now)?;
            let old_level = record.level();
            let applied = record.adjust(delta, reason, now, config);
            if record.level() != old_level {
                info!(
                    player = %player,
                    faction = %faction,
                    from = %old_level,
                    to = %record.level(),
                    score = record.score,
                    "reputation level changed"
                );
            }

            let mut touched = vec![record.clone()];
            let mut propagated = Vec::new();
            for (other, stance) in config.related(faction) {
                let spill = propagated_delta(applied, stance, config);
                if spill == 0 {
                    continue;
                }
                let (mut related, _) = self.load_decayed(player, &other, now)?;
                let spill_reason = format!("{reason} (via {faction})");
                let moved = related.apply_propagated(spill, &spill_reason, now, config);
                debug!(player = %player, faction = %other, delta = moved, "reputation propagated");
                propagated.push((other, moved));
                touched.push(related);
            }

            self.ledger.save_reputations(&touched)?;
            Ok(ReputationUpdate {
                record,
                applied,
                propagated,
            })
        })
    }

    /// One decay step for an idle record; returns whether the score moved
    pub fn apply_weekly_decay(&self, player: PlayerId, faction: &FactionId) -> Result<bool> {
        self.locks.with(RowKey::Reputation(player), || {
            let Some(mut record) = self.ledger.load_reputation(player, faction)? else {
                return Ok(false);
            };
            let moved = record.apply_weekly_decay(self.now(), &self.config.reputation);
            if moved {
                self.ledger.save_reputations(std::slice::from_ref(&record))?;
            }
            Ok(moved)
        })
    }

    /// Set a record back to zero (the paid amnesty action)
    pub fn reset_to_neutral(&self, player: PlayerId, faction: &FactionId, reason: &str) -> Result<FactionReputation> {
        self.locks.with(RowKey::Reputation(player), || {
            let now = self.now();
            let (mut record, _) = self.load_decayed(player, faction, now)?;
            let old_score = record.score;
            record.reset_to_neutral(reason, now, &self.config.reputation);
            self.ledger.save_reputations(std::slice::from_ref(&record))?;
            info!(player = %player, faction = %faction, old_score, "reputation reset to neutral");
            Ok(record)
        })
    }


    /// Register a newly colonized planet
    pub fn colonize_planet(&self, mut planet: PlanetResourceState) -> Result<()> {
        let id = planet.planet_id;
        self.locks.with(RowKey::Planet(id), || {
            if self.ledger.load_planet(id)?.is_some() {
                return Err(Error::PlanetExists(id));
            }
            planet.validate(&self.config.production)?;
            planet.clamp_to_capacity(&self.config.production);
            planet.last_production_timestamp = self.now();
            self.ledger.save_planet(&planet)?;
            info!(planet = %id, owner = %planet.owner, kind = ?planet.planet_type, "planet colonized");
            Ok(())
        })
    }

    /// Remove a planet (abandoned or captured); returns its final state
    pub fn abandon_planet(&self, id: PlanetId) -> Result<PlanetResourceState> {
        let key = RowKey::Planet(id);
        let removed = self.locks.with(key, || {
            let removed = self.ledger.delete_planet(id)?.ok_or(Error::PlanetNotFound(id))?;
            self.locks.forget(key);
            Ok(removed)
        })?;
        info!(planet = %id, owner = %removed.owner, "planet abandoned");
        Ok(removed)
    }

    /// Run `f` on a planet with production settled to now
    ///
    /// The planet is persisted only when `f` succeeds.
    fn with_planet<T>(
        &self,
        id: PlanetId,
        f: impl FnOnce(&mut PlanetResourceState) -> Result<T>,
    ) -> Result<T> {
        self.locks.with(RowKey::Planet(id), || {
            let mut planet = self.ledger.load_planet(id)?.ok_or(Error::PlanetNotFound(id))?;
            let report = planet.advance_to(self.now(), &self.config.production);
            if Resource::ALL.iter().any(|r| report.discarded[*r] > 0) {
                warn!(
                    planet = %id,
                    ore = report.discarded.ore,
                    organics = report.discarded.organics,
                    equipment = report.discarded.equipment,
                    "storage full, production discarded"
                );
            }
            let out = f(&mut planet)?;
            self.ledger.save_planet(&planet)?;
            Ok(out)
        })
    }

    /// A planet's state with production settled
    pub fn planet(&self, id: PlanetId) -> Result<PlanetResourceState> {
        self.with_planet(id, |planet| Ok(planet.clone()))
    }

    /// Current stock of every resource
    pub fn resource_stock(&self, id: PlanetId) -> Result<ResourceTable<u64>> {
        self.with_planet(id, |planet| Ok(planet.stock))
    }

    /// Every planet a player owns, production settled
    pub fn planets_owned_by(&self, owner: PlayerId) -> Result<Vec<PlanetResourceState>> {
        let ids: Vec<PlanetId> = self
            .ledger
            .planets_owned_by(owner)?
            .into_iter()
            .map(|p| p.planet_id)
            .collect();
        let mut planets = Vec::with_capacity(ids.len());
        for id in ids {
            match self.planet(id) {
                Ok(planet) => planets.push(planet),
                // abandoned between the scan and the lock
                Err(Error::PlanetNotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(planets)
    }

    /// Remove resources from a planet; returns the remaining stock
    pub fn withdraw_resource(&self, id: PlanetId, resource: Resource, amount: u64) -> Result<u64> {
        self.with_planet(id, |planet| {
            planet.withdraw(resource, amount)?;
            Ok(planet.stock[resource])
        })
    }

    /// Store resources on a planet up to capacity; returns units accepted
    pub fn deposit_resource(&self, id: PlanetId, resource: Resource, amount: u64) -> Result<u64> {
        self.with_planet(id, |planet| {
            Ok(planet.deposit(resource, amount, &self.config.production))
        })
    }

    /// Reassign colonists between roles; production so far is settled at
    /// the old allocation
    pub fn reallocate_colonists(&self, id: PlanetId, allocation: ColonistAllocation) -> Result<()> {
        self.with_planet(id, |planet| {
            planet.reallocate_colonists(allocation)?;
            debug!(planet = %id, ?allocation, "colonists reallocated");
            Ok(())
        })
    }

    /// Set a resource's production upgrade level
    pub fn upgrade_production(&self, id: PlanetId, resource: Resource, level: u8) -> Result<()> {
        self.with_planet(id, |planet| {
            planet.set_upgrade_level(resource, level, &self.config.production)
        })
    }

    /// Change the citadel level; returns stock lost to a smaller store
    pub fn set_citadel_level(&self, id: PlanetId, level: u8) -> Result<ResourceTable<u64>> {
        self.with_planet(id, |planet| planet.set_citadel_level(level, &self.config.production))
    }

    /// Hourly output at the current allocation
    pub fn production_rates(&self, id: PlanetId) -> Result<ResourceTable<f64>> {
        self.with_planet(id, |planet| Ok(planet.production_rates(&self.config.production)))
    }
}
