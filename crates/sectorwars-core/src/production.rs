//! Planetary production
//!
//! Each resource accrues as
//! `colonists_in_role * type_efficiency * hours * (1 + 0.1 * upgrade_level)`
//! and is stored up to the planet's capacity. Output beyond capacity is
//! discarded, not banked. Sub-unit output is carried to the next tick so
//! frequent reads neither lose nor invent production.

use crate::config::{PlanetType, ProductionConfig};
use crate::time::{elapsed_hours, Timestamp};
use crate::{ColonistAllocation, Error, PlanetId, PlayerId, Resource, ResourceTable, Result};
use serde::{Deserialize, Serialize};

/// Outcome of one production tick
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductionReport {
    /// Units added to stock
    pub produced: ResourceTable<u64>,
    /// Units lost to a full store
    pub discarded: ResourceTable<u64>,
}

impl ProductionReport {
    pub fn is_empty(&self) -> bool {
        Resource::ALL
            .iter()
            .all(|r| self.produced[*r] == 0 && self.discarded[*r] == 0)
    }
}

/// Resource state of one colonized planet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetResourceState {
    pub planet_id: PlanetId,
    pub owner: PlayerId,
    pub sector_id: u32,
    pub planet_type: PlanetType,
    pub citadel_level: u8,
    pub colonists: ColonistAllocation,
    pub stock: ResourceTable<u64>,
    /// Production upgrade level per resource, `[0, max_upgrade_level]`
    pub upgrades: ResourceTable<u8>,
    /// Instant up to which production has been settled
    pub last_production_timestamp: Timestamp,
    /// Fractional output below one unit, per resource
    #[serde(default)]
    pub production_carry: ResourceTable<f64>,
}

impl PlanetResourceState {
    /// A freshly colonized planet with empty stores
    pub fn new(
        planet_id: PlanetId,
        owner: PlayerId,
        sector_id: u32,
        planet_type: PlanetType,
        colonists: ColonistAllocation,
        now: Timestamp,
    ) -> Self {
        Self {
            planet_id,
            owner,
            sector_id,
            planet_type,
            citadel_level: 0,
            colonists,
            stock: ResourceTable::default(),
            upgrades: ResourceTable::default(),
            last_production_timestamp: now,
            production_carry: ResourceTable::default(),
        }
    }

    /// Storage capacity per resource
    pub fn storage_capacity(&self, config: &ProductionConfig) -> u64 {
        config.storage_capacity(self.citadel_level, self.planet_type)
    }

    /// Whether this planet produces at all
    pub fn is_producer(&self, config: &ProductionConfig) -> bool {
        !config.is_non_producing(self.sector_id)
    }

    /// Output per hour for each resource at the current allocation
    pub fn production_rates(&self, config: &ProductionConfig) -> ResourceTable<f64> {
        if !self.is_producer(config) {
            return ResourceTable::splat(0.0);
        }
        let profile = config.profile(self.planet_type);
        ResourceTable::from_fn(|r| {
            self.colonists.in_role(r.role()) as f64
                * profile.efficiency[r]
                * config.upgrade_multiplier(self.upgrades[r])
        })
    }

    /// Accrue `elapsed_hours` of production into stock, capped at capacity
    ///
    /// Negative or non-finite durations produce nothing.
    pub fn tick_production(&mut self, elapsed_hours: f64, config: &ProductionConfig) -> ProductionReport {
        let mut report = ProductionReport::default();
        if !elapsed_hours.is_finite() || elapsed_hours <= 0.0 {
            return report;
        }
        let capacity = self.storage_capacity(config);
        let rates = self.production_rates(config);

        for r in Resource::ALL {
            let amount = rates[r] * elapsed_hours + self.production_carry[r];
            let whole = amount.floor();
            // float-to-int casts saturate
            let units = whole as u64;
            let room = capacity.saturating_sub(self.stock[r]);
            if units >= room {
                self.stock[r] = capacity.max(self.stock[r]);
                self.production_carry[r] = 0.0;
                report.produced[r] = room;
                report.discarded[r] = units - room;
            } else {
                self.stock[r] += units;
                self.production_carry[r] = amount - whole;
                report.produced[r] = units;
            }
        }
        report
    }

    /// Settle production up to `now`
    pub fn advance_to(&mut self, now: Timestamp, config: &ProductionConfig) -> ProductionReport {
        let hours = elapsed_hours(self.last_production_timestamp, now);
        if now > self.last_production_timestamp {
            self.last_production_timestamp = now;
        }
        self.tick_production(hours, config)
    }

    /// Replace the allocation; the total colonist count must not change
    pub fn reallocate_colonists(&mut self, allocation: ColonistAllocation) -> Result<()> {
        let expected = self.colonists.total();
        let got = allocation.total();
        if got != expected {
            return Err(Error::InvalidAllocation { expected, got });
        }
        self.colonists = allocation;
        Ok(())
    }

    /// Remove units from stock
    pub fn withdraw(&mut self, resource: Resource, amount: u64) -> Result<()> {
        let available = self.stock[resource];
        if amount > available {
            return Err(Error::InsufficientStock {
                resource,
                requested: amount,
                available,
            });
        }
        self.stock[resource] = available - amount;
        Ok(())
    }

    /// Add units to stock up to capacity; returns the units accepted
    pub fn deposit(&mut self, resource: Resource, amount: u64, config: &ProductionConfig) -> u64 {
        let room = self.storage_capacity(config).saturating_sub(self.stock[resource]);
        let accepted = amount.min(room);
        self.stock[resource] += accepted;
        accepted
    }

    /// Set the production upgrade level for one resource
    pub fn set_upgrade_level(&mut self, resource: Resource, level: u8, config: &ProductionConfig) -> Result<()> {
        check_upgrade_level(level, config)?;
        self.upgrades[resource] = level;
        Ok(())
    }

    /// Change the citadel level; stock above the new capacity is lost
    pub fn set_citadel_level(&mut self, level: u8, config: &ProductionConfig) -> Result<ResourceTable<u64>> {
        check_citadel_level(level, config)?;
        self.citadel_level = level;
        Ok(self.clamp_to_capacity(config))
    }

    /// Check that upgrade and citadel levels lie within the configured tables
    pub fn validate(&self, config: &ProductionConfig) -> Result<()> {
        check_citadel_level(self.citadel_level, config)?;
        for r in Resource::ALL {
            check_upgrade_level(self.upgrades[r], config)?;
        }
        Ok(())
    }

    /// Trim stock to capacity, returning what was removed
    pub fn clamp_to_capacity(&mut self, config: &ProductionConfig) -> ResourceTable<u64> {
        let capacity = self.storage_capacity(config);
        ResourceTable::from_fn(|r| {
            let excess = self.stock[r].saturating_sub(capacity);
            self.stock[r] -= excess;
            excess
        })
    }
}

fn check_upgrade_level(level: u8, config: &ProductionConfig) -> Result<()> {
    if level > config.max_upgrade_level {
        return Err(Error::InvalidUpgradeLevel {
            level,
            max: config.max_upgrade_level,
        });
    }
    Ok(())
}

fn check_citadel_level(level: u8, config: &ProductionConfig) -> Result<()> {
    let max = config.max_citadel_level();
    if level > max {
        return Err(Error::InvalidCitadelLevel { level, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn epoch() -> Timestamp {
        Utc.with_ymd_and_hms(2102, 9, 1, 0, 0, 0).unwrap()
    }

    fn planet() -> PlanetResourceState {
        PlanetResourceState::new(
            PlanetId::new(7),
            PlayerId::new(1),
            42,
            PlanetType::Terran,
            ColonistAllocation::new(50, 30, 20),
            epoch(),
        )
    }

    #[test]
    fn test_basic_tick() {
        let config = ProductionConfig::default();
        let mut p = planet();
        let report = p.tick_production(2.0, &config);
        assert_eq!(report.produced, ResourceTable::new(100, 60, 40));
        assert_eq!(p.stock, ResourceTable::new(100, 60, 40));
        assert!(report.discarded == ResourceTable::splat(0));
    }

    #[test]
    fn test_upgrades_add_ten_percent_per_level() {
        let config = ProductionConfig::default();
        let mut p = planet();
        p.set_upgrade_level(Resource::Ore, 10, &config).unwrap();
        p.tick_production(1.0, &config);
        assert_eq!(p.stock.ore, 100);
        assert_eq!(
            p.set_upgrade_level(Resource::Ore, 11, &config),
            Err(Error::InvalidUpgradeLevel { level: 11, max: 10 })
        );
    }

    #[test]
    fn test_capacity_discards_excess() {
        let config = ProductionConfig::default();
        let mut p = planet();
        p.stock.ore = 980;
        let report = p.tick_production(1.0, &config);
        assert_eq!(p.stock.ore, 1000);
        assert_eq!(report.produced.ore, 20);
        assert_eq!(report.discarded.ore, 30);

        // nothing is banked for later
        p.withdraw(Resource::Ore, 100).unwrap();
        p.tick_production(0.5, &config);
        assert_eq!(p.stock.ore, 925);
    }

    #[test]
    fn test_fraction_carries_between_ticks() {
        let config = ProductionConfig::default();
        let mut p = planet();
        p.colonists = ColonistAllocation::new(1, 0, 0);
        for _ in 0..4 {
            p.tick_production(0.25, &config);
        }
        assert_eq!(p.stock.ore, 1);
    }

    #[test]
    fn test_terra_never_produces() {
        let config = ProductionConfig::default();
        let mut p = planet();
        p.sector_id = 1;
        assert!(!p.is_producer(&config));
        assert!(p.tick_production(1000.0, &config).is_empty());
        assert_eq!(p.stock, ResourceTable::splat(0));
    }

    #[test]
    fn test_advance_to_ignores_skew() {
        let config = ProductionConfig::default();
        let mut p = planet();
        assert!(p.advance_to(epoch() - Duration::hours(3), &config).is_empty());
        assert_eq!(p.last_production_timestamp, epoch());
        p.advance_to(epoch() + Duration::hours(1), &config);
        assert_eq!(p.stock.organics, 30);
    }

    #[test]
    fn test_reallocate_conserves_total() {
        let mut p = planet();
        p.reallocate_colonists(ColonistAllocation::new(40, 40, 20)).unwrap();
        assert_eq!(p.colonists, ColonistAllocation::new(40, 40, 20));

        let err = p
            .reallocate_colonists(ColonistAllocation::new(40, 40, 30))
            .unwrap_err();
        assert_eq!(err, Error::InvalidAllocation { expected: 100, got: 110 });
        assert_eq!(p.colonists, ColonistAllocation::new(40, 40, 20));
    }

    #[test]
    fn test_withdraw_and_deposit() {
        let config = ProductionConfig::default();
        let mut p = planet();
        assert_eq!(p.deposit(Resource::Equipment, 1500, &config), 1000);
        p.withdraw(Resource::Equipment, 400).unwrap();
        assert_eq!(p.stock.equipment, 600);
        assert!(matches!(
            p.withdraw(Resource::Equipment, 601),
            Err(Error::InsufficientStock { available: 600, .. })
        ));
        assert_eq!(p.stock.equipment, 600);
    }

    #[test]
    fn test_citadel_level_changes_capacity() {
        let config = ProductionConfig::default();
        let mut p = planet();
        p.set_citadel_level(2, &config).unwrap();
        assert_eq!(p.storage_capacity(&config), 15_000);
        p.deposit(Resource::Ore, 9_000, &config);

        let lost = p.set_citadel_level(1, &config).unwrap();
        assert_eq!(lost.ore, 4_000);
        assert_eq!(p.stock.ore, 5_000);
        assert!(p.set_citadel_level(6, &config).is_err());
    }

    #[test]
    fn test_production_rates() {
        let config = ProductionConfig::default();
        let mut p = planet();
        p.planet_type = PlanetType::Oceanic;
        let rates = p.production_rates(&config);
        assert!((rates.organics - 42.0).abs() < 1e-9);
        assert!((rates.ore - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_reallocate_rejects_overflowing_totals() {
        let mut p = planet();
        p.colonists = ColonistAllocation::new(u64::MAX, 1, 0);
        let err = p
            .reallocate_colonists(ColonistAllocation::new(u64::MAX, 0, 500))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidAllocation { .. }));
        assert_eq!(p.colonists, ColonistAllocation::new(u64::MAX, 1, 0));
    }

    #[test]
    fn test_validate_levels() {
        let config = ProductionConfig::default();
        let mut p = planet();
        p.validate(&config).unwrap();

        p.upgrades.ore = 200;
        assert_eq!(
            p.validate(&config),
            Err(Error::InvalidUpgradeLevel { level: 200, max: 10 })
        );

        p.upgrades.ore = 10;
        p.citadel_level = 200;
        assert_eq!(
            p.validate(&config),
            Err(Error::InvalidCitadelLevel { level: 200, max: 5 })
        );
    }
}
