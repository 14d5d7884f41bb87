//! Economy configuration - the balancing constants of the game
//!
//! All rates, caps, and tables live here as data rather than literals so
//! that tests and balancing passes can inject their own values. The
//! `Default` implementation is the built-in SectorWars 2102 table set;
//! `sectorwars-script` loads overrides from RON.

use crate::{Error, FactionId, Resource, ResourceTable, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Lowest reputation score
pub const REPUTATION_MIN: i32 = -800;
/// Highest reputation score
pub const REPUTATION_MAX: i32 = 800;

/// Complete economy configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    pub turns: TurnConfig,
    pub reputation: ReputationConfig,
    pub production: ProductionConfig,
}

impl EconomyConfig {
    /// Check every table for values that would break an invariant
    pub fn validate(&self) -> Result<()> {
        self.turns.validate()?;
        self.reputation.validate()?;
        self.production.validate()
    }
}

/// Turn regeneration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnConfig {
    /// Turn cap for a new account
    pub base_max_turns: u32,
    /// Seconds needed to regenerate a full `max_turns` at multiplier 1.0
    pub regen_period_secs: u64,
    /// Companion-assistance bonus multipliers, tier 0 first
    pub bonus_tiers: Vec<f64>,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            base_max_turns: 1000,
            regen_period_secs: crate::time::SECONDS_PER_DAY,
            bonus_tiers: vec![1.0, 1.1, 1.2, 1.35, 1.5],
        }
    }
}

impl TurnConfig {
    fn validate(&self) -> Result<()> {
        if self.base_max_turns == 0 {
            return Err(invalid("turns.base_max_turns must be positive"));
        }
        if self.regen_period_secs == 0 {
            return Err(invalid("turns.regen_period_secs must be positive"));
        }
        if self.bonus_tiers.is_empty() {
            return Err(invalid("turns.bonus_tiers must list at least one tier"));
        }
        if let Some(bad) = self
            .bonus_tiers
            .iter()
            .find(|m| !m.is_finite() || **m < 1.0)
        {
            return Err(invalid(format!("turns.bonus_tiers: {bad} is below 1.0")));
        }
        Ok(())
    }

    /// Multiplier for a tier index
    pub fn tier_multiplier(&self, tier: usize) -> Option<f64> {
        self.bonus_tiers.get(tier).copied()
    }
}

/// How two factions regard each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stance {
    /// Reputation moves in the same direction
    Ally,
    /// Reputation moves in the opposite direction
    Enemy,
}

/// A symmetric relation between two factions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionRelation {
    pub a: FactionId,
    pub b: FactionId,
    pub stance: Stance,
}

impl FactionRelation {
    pub fn new(a: impl Into<FactionId>, b: impl Into<FactionId>, stance: Stance) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
            stance,
        }
    }

    /// The other side of this relation, if `faction` takes part in it
    pub fn counterpart(&self, faction: &FactionId) -> Option<&FactionId> {
        if &self.a == faction {
            Some(&self.b)
        } else if &self.b == faction {
            Some(&self.a)
        } else {
            None
        }
    }
}

/// Reputation rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReputationConfig {
    /// Days of inactivity before one decay step
    pub decay_interval_days: u32,
    /// Points moved toward zero per decay step
    pub decay_step: u32,
    /// Fraction of a direct change applied to allies, same sign
    pub ally_propagation: f64,
    /// Fraction of a direct change applied to enemies, opposite sign
    pub enemy_propagation: f64,
    /// Maximum history entries kept per record
    pub history_limit: usize,
    /// Faction relation table
    pub relations: Vec<FactionRelation>,
    /// Factions that close their territory below -200 instead of -400
    pub strict_factions: Vec<FactionId>,
}

impl Default for ReputationConfig {
    fn default() -> Self {
        Self {
            decay_interval_days: 7,
            decay_step: 1,
            ally_propagation: 0.25,
            enemy_propagation: 0.25,
            history_limit: 50,
            relations: vec![
                FactionRelation::new("federation", "military", Stance::Ally),
                FactionRelation::new("merchants", "independents", Stance::Ally),
                FactionRelation::new("explorers", "independents", Stance::Ally),
                FactionRelation::new("federation", "pirates", Stance::Enemy),
                FactionRelation::new("military", "pirates", Stance::Enemy),
                FactionRelation::new("merchants", "pirates", Stance::Enemy),
            ],
            strict_factions: vec![FactionId::new("pirates"), FactionId::new("military")],
        }
    }
}

impl ReputationConfig {
    fn validate(&self) -> Result<()> {
        if self.decay_interval_days == 0 {
            return Err(invalid("reputation.decay_interval_days must be positive"));
        }
        for (name, ratio) in [
            ("ally_propagation", self.ally_propagation),
            ("enemy_propagation", self.enemy_propagation),
        ] {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(invalid(format!("reputation.{name} must be within [0, 1]")));
            }
        }
        if let Some(rel) = self.relations.iter().find(|r| r.a == r.b) {
            return Err(invalid(format!("faction {} cannot relate to itself", rel.a)));
        }
        Ok(())
    }

    /// Factions related to `faction`, with the stance toward each
    pub fn related(&self, faction: &FactionId) -> Vec<(FactionId, Stance)> {
        let mut out: Vec<(FactionId, Stance)> = Vec::new();
        for rel in &self.relations {
            if let Some(other) = rel.counterpart(faction) {
                if !out.iter().any(|(f, _)| f == other) {
                    out.push((other.clone(), rel.stance));
                }
            }
        }
        out
    }

    /// Whether a faction uses the strict territory threshold
    pub fn is_strict(&self, faction: &FactionId) -> bool {
        self.strict_factions.contains(faction)
    }
}

/// Classification of a planet's world type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlanetType {
    Terran,
    Oceanic,
    Tropical,
    Mountainous,
    Jungle,
    Desert,
    Ice,
    Arctic,
    Volcanic,
    Barren,
    GasGiant,
    Artificial,
}

/// Per-type production and storage multipliers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanetTypeProfile {
    /// Units produced per colonist-hour, per resource
    pub efficiency: ResourceTable<f64>,
    /// Multiplier applied to the citadel storage capacity
    pub storage_modifier: f64,
}

impl PlanetTypeProfile {
    pub fn new(ore: f64, organics: f64, equipment: f64, storage_modifier: f64) -> Self {
        Self {
            efficiency: ResourceTable::new(ore, organics, equipment),
            storage_modifier,
        }
    }
}

/// Planetary production rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductionConfig {
    /// Output bonus per production upgrade level
    pub upgrade_bonus_per_level: f64,
    /// Highest production upgrade level
    pub max_upgrade_level: u8,
    /// Base storage capacity indexed by citadel level
    pub citadel_capacity: Vec<u64>,
    /// Multipliers by planet type
    pub planet_types: IndexMap<PlanetType, PlanetTypeProfile>,
    /// Sectors whose planets never produce (Terra in sector 1)
    pub non_producing_sectors: Vec<u32>,
}

impl Default for ProductionConfig {
    fn default() -> Self {
        let planet_types = IndexMap::from([
            (PlanetType::Terran, PlanetTypeProfile::new(1.0, 1.0, 1.0, 1.0)),
            (PlanetType::Oceanic, PlanetTypeProfile::new(0.6, 1.4, 0.8, 1.0)),
            (PlanetType::Tropical, PlanetTypeProfile::new(0.7, 1.5, 0.7, 0.9)),
            (PlanetType::Mountainous, PlanetTypeProfile::new(1.5, 0.6, 1.0, 1.2)),
            (PlanetType::Jungle, PlanetTypeProfile::new(0.6, 1.3, 0.7, 0.9)),
            (PlanetType::Desert, PlanetTypeProfile::new(1.2, 0.4, 1.0, 1.1)),
            (PlanetType::Ice, PlanetTypeProfile::new(0.9, 0.3, 0.8, 0.8)),
            (PlanetType::Arctic, PlanetTypeProfile::new(0.8, 0.4, 0.9, 0.8)),
            (PlanetType::Volcanic, PlanetTypeProfile::new(1.6, 0.2, 1.1, 0.9)),
            (PlanetType::Barren, PlanetTypeProfile::new(1.1, 0.1, 0.9, 1.3)),
            (PlanetType::GasGiant, PlanetTypeProfile::new(1.4, 0.2, 0.6, 1.5)),
            (PlanetType::Artificial, PlanetTypeProfile::new(0.5, 0.5, 1.6, 1.0)),
        ]);
        Self {
            upgrade_bonus_per_level: 0.1,
            max_upgrade_level: 10,
            citadel_capacity: vec![1_000, 5_000, 15_000, 40_000, 80_000, 150_000],
            planet_types,
            non_producing_sectors: vec![1],
        }
    }
}

impl ProductionConfig {
    fn validate(&self) -> Result<()> {
        if !self.upgrade_bonus_per_level.is_finite() || self.upgrade_bonus_per_level < 0.0 {
            return Err(invalid("production.upgrade_bonus_per_level must be >= 0"));
        }
        if self.citadel_capacity.is_empty() {
            return Err(invalid("production.citadel_capacity must list level 0"));
        }
        if self.citadel_capacity.windows(2).any(|w| w[1] < w[0]) {
            return Err(invalid("production.citadel_capacity must not decrease"));
        }
        for (kind, profile) in &self.planet_types {
            let bad_efficiency = Resource::ALL
                .iter()
                .any(|r| !profile.efficiency[*r].is_finite() || profile.efficiency[*r] < 0.0);
            if bad_efficiency {
                return Err(invalid(format!("{kind:?}: efficiency must be >= 0")));
            }
            if !profile.storage_modifier.is_finite() || profile.storage_modifier <= 0.0 {
                return Err(invalid(format!("{kind:?}: storage_modifier must be > 0")));
            }
        }
        Ok(())
    }

    /// Highest citadel level with a configured capacity
    pub fn max_citadel_level(&self) -> u8 {
        u8::try_from(self.citadel_capacity.len().saturating_sub(1)).unwrap_or(u8::MAX)
    }

    /// Profile for a planet type; unknown types produce nothing
    pub fn profile(&self, kind: PlanetType) -> PlanetTypeProfile {
        self.planet_types
            .get(&kind)
            .copied()
            .unwrap_or(PlanetTypeProfile::new(0.0, 0.0, 0.0, 1.0))
    }

    /// Storage capacity for a citadel level on a planet type
    pub fn storage_capacity(&self, citadel_level: u8, kind: PlanetType) -> u64 {
        let base = self
            .citadel_capacity
            .get(usize::from(citadel_level))
            .or(self.citadel_capacity.last())
            .copied()
            .unwrap_or(0);
        (base as f64 * self.profile(kind).storage_modifier).round() as u64
    }

    /// Output multiplier for an upgrade level
    pub fn upgrade_multiplier(&self, level: u8) -> f64 {
        1.0 + self.upgrade_bonus_per_level * f64::from(level)
    }

    /// Whether planets in this sector are excluded from production
    pub fn is_non_producing(&self, sector_id: u32) -> bool {
        self.non_producing_sectors.contains(&sector_id)
    }
}

fn invalid(msg: impl Into<String>) -> Error {
    Error::InvalidConfig(msg.into())
}
