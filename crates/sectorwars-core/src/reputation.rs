//! Faction reputation
//!
//! A reputation record is a signed score in `[-800, 800]` per
//! (player, faction) pair. The score maps onto 17 named levels and a set of
//! derived standing effects (trade prices, port access, NPC combat response).
//!
//! Scores drift back toward zero while a player leaves a faction alone:
//! one step per decay window of inactivity. A hostile act (a direct
//! negative change) pauses that drift until the player does the faction a
//! good turn or pays for a reset.

use crate::config::{ReputationConfig, Stance, REPUTATION_MAX, REPUTATION_MIN};
use crate::time::Timestamp;
use crate::{FactionId, PlayerId};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The 17 reputation levels, from -8 to +8
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReputationLevel {
    PublicEnemy,
    Criminal,
    Outlaw,
    Pirate,
    Smuggler,
    Untrustworthy,
    Suspicious,
    Questionable,
    Neutral,
    Recognized,
    Acknowledged,
    Trusted,
    Respected,
    Valued,
    Honored,
    Revered,
    Exalted,
}

impl ReputationLevel {
    /// Inclusive lower bound of each level above `PublicEnemy`, highest first
    const THRESHOLDS: [(i32, ReputationLevel); 16] = [
        (700, ReputationLevel::Exalted),
        (600, ReputationLevel::Revered),
        (500, ReputationLevel::Honored),
        (400, ReputationLevel::Valued),
        (300, ReputationLevel::Respected),
        (200, ReputationLevel::Trusted),
        (100, ReputationLevel::Acknowledged),
        (50, ReputationLevel::Recognized),
        (-50, ReputationLevel::Neutral),
        (-100, ReputationLevel::Questionable),
        (-200, ReputationLevel::Suspicious),
        (-300, ReputationLevel::Untrustworthy),
        (-400, ReputationLevel::Smuggler),
        (-500, ReputationLevel::Pirate),
        (-600, ReputationLevel::Outlaw),
        (-700, ReputationLevel::Criminal),
    ];

    /// Classify any score; total over all integers
    pub fn from_score(score: i32) -> Self {
        Self::THRESHOLDS
            .iter()
            .find(|(floor, _)| score >= *floor)
            .map(|(_, level)| *level)
            .unwrap_or(ReputationLevel::PublicEnemy)
    }

    /// Numeric rank from -8 (Public Enemy) to +8 (Exalted)
    pub fn rank(&self) -> i8 {
        *self as i8 - 8
    }

    /// Display title
    pub fn title(&self) -> &'static str {
        match self {
            ReputationLevel::PublicEnemy => "Public Enemy",
            ReputationLevel::Criminal => "Criminal",
            ReputationLevel::Outlaw => "Outlaw",
            ReputationLevel::Pirate => "Pirate",
            ReputationLevel::Smuggler => "Smuggler",
            ReputationLevel::Untrustworthy => "Untrustworthy",
            ReputationLevel::Suspicious => "Suspicious",
            ReputationLevel::Questionable => "Questionable",
            ReputationLevel::Neutral => "Neutral",
            ReputationLevel::Recognized => "Recognized",
            ReputationLevel::Acknowledged => "Acknowledged",
            ReputationLevel::Trusted => "Trusted",
            ReputationLevel::Respected => "Respected",
            ReputationLevel::Valued => "Valued",
            ReputationLevel::Honored => "Honored",
            ReputationLevel::Revered => "Revered",
            ReputationLevel::Exalted => "Exalted",
        }
    }
}

impl fmt::Display for ReputationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Map a score to its level
pub fn get_level(score: i32) -> ReputationLevel {
    ReputationLevel::from_score(score)
}

/// How faction NPCs react to the player in combat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatResponse {
    Friendly,
    Neutral,
    Hostile,
}

/// Docking privileges at faction ports
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PortAccess {
    None,
    Limited,
    Standard,
    Full,
}

/// Everything a score means for gameplay
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub score: i32,
    pub level: ReputationLevel,
    /// Linear trade modifier in `[-0.3, 0.3]`, rounded to two places
    pub trade_modifier: f64,
    /// Multiplier on faction port prices (below 1.0 is a discount)
    pub price_multiplier: f64,
    pub port_access: PortAccess,
    pub combat_response: CombatResponse,
    pub territory_access: bool,
}

impl Standing {
    /// Derive the standing for a score; `strict` factions close their
    /// territory at -200 rather than -400
    pub fn from_score(score: i32, strict: bool) -> Self {
        let trade_modifier = (f64::from(score) / f64::from(REPUTATION_MAX) * 0.3 * 100.0).round() / 100.0;
        let price_multiplier = match score {
            s if s >= 600 => 0.85,
            s if s >= 400 => 0.92,
            s if s >= 200 => 0.96,
            s if s <= -600 => 1.30,
            s if s <= -400 => 1.20,
            s if s <= -200 => 1.10,
            _ => 1.0,
        };
        let port_access = match score {
            s if s >= 600 => PortAccess::Full,
            s if s >= 200 => PortAccess::Standard,
            s if s >= -200 => PortAccess::Limited,
            _ => PortAccess::None,
        };
        let combat_response = match score {
            s if s >= 400 => CombatResponse::Friendly,
            s if s >= -200 => CombatResponse::Neutral,
            _ => CombatResponse::Hostile,
        };
        let territory_floor = if strict { -200 } else { -400 };
        Self {
            score,
            level: ReputationLevel::from_score(score),
            trade_modifier,
            price_multiplier,
            port_access,
            combat_response,
            territory_access: score >= territory_floor,
        }
    }
}

/// One entry in a record's change history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReputationChange {
    pub timestamp: Timestamp,
    pub old_value: i32,
    pub new_value: i32,
    /// Requested delta before clamping
    pub delta: i32,
    pub reason: String,
}

/// A player's standing with one faction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactionReputation {
    pub player_id: PlayerId,
    pub faction_id: FactionId,
    pub score: i32,
    pub last_activity_timestamp: Timestamp,
    /// Start of the current decay window
    pub decay_anchor: Timestamp,
    /// Set by hostile acts; no decay while set
    pub decay_paused: bool,
    /// Most recent changes, oldest first
    pub history: Vec<ReputationChange>,
}

impl FactionReputation {
    /// A fresh neutral record
    pub fn new(player_id: PlayerId, faction_id: FactionId, now: Timestamp) -> Self {
        Self {
            player_id,
            faction_id,
            score: 0,
            last_activity_timestamp: now,
            decay_anchor: now,
            decay_paused: false,
            history: Vec::new(),
        }
    }

    pub fn level(&self) -> ReputationLevel {
        ReputationLevel::from_score(self.score)
    }

    /// Apply a direct change from the player's own actions
    ///
    /// Counts as activity: the decay window restarts. A negative change is
    /// a hostile act and pauses decay; a positive one lifts the pause.
    pub fn adjust(&mut self, delta: i32, reason: &str, now: Timestamp, config: &ReputationConfig) -> i32 {
        let applied = self.record(delta, reason, now, config.history_limit);
        self.last_activity_timestamp = now;
        self.decay_anchor = now;
        if delta < 0 {
            self.decay_paused = true;
        } else if delta > 0 {
            self.decay_paused = false;
        }
        applied
    }

    /// Apply a change spilling over from a related faction
    ///
    /// Does not count as activity with this faction.
    pub fn apply_propagated(
        &mut self,
        delta: i32,
        reason: &str,
        now: Timestamp,
        config: &ReputationConfig,
    ) -> i32 {
        self.record(delta, reason, now, config.history_limit)
    }

    /// Catch up on every whole decay window elapsed since the anchor
    ///
    /// Returns the points moved toward zero. Never crosses zero.
    pub fn decay(&mut self, now: Timestamp, config: &ReputationConfig) -> i32 {
        let window = decay_window(config);
        let elapsed = now.signed_duration_since(self.decay_anchor);
        if self.decay_paused || elapsed < window {
            return 0;
        }
        let periods = elapsed.num_seconds() / window.num_seconds();
        self.decay_anchor = self.decay_anchor + Duration::seconds(periods * window.num_seconds());
        if self.score == 0 {
            return 0;
        }

        let step = i64::from(config.decay_step).saturating_mul(periods);
        let magnitude = i64::from(self.score.unsigned_abs()).min(step);
        // magnitude <= |score| <= 800
        let moved = magnitude as i32;
        self.score -= moved * self.score.signum();
        moved
    }

    /// A single decay step if the record has been idle a full window
    pub fn apply_weekly_decay(&mut self, now: Timestamp, config: &ReputationConfig) -> bool {
        let idle = now.signed_duration_since(self.decay_anchor) >= decay_window(config);
        if self.decay_paused || !idle || self.score == 0 {
            return false;
        }
        let step = i32::try_from(config.decay_step).unwrap_or(i32::MAX).min(self.score.abs());
        self.score -= step * self.score.signum();
        self.decay_anchor = now;
        true
    }

    /// Wipe the score back to zero
    pub fn reset_to_neutral(&mut self, reason: &str, now: Timestamp, config: &ReputationConfig) {
        let old_value = self.score;
        self.score = 0;
        self.decay_paused = false;
        self.last_activity_timestamp = now;
        self.decay_anchor = now;
        self.push_history(
            ReputationChange {
                timestamp: now,
                old_value,
                new_value: 0,
                delta: -old_value,
                reason: reason.to_string(),
            },
            config.history_limit,
        );
    }

    /// Derived standing effects
    pub fn standing(&self, config: &ReputationConfig) -> Standing {
        Standing::from_score(self.score, config.is_strict(&self.faction_id))
    }

    fn record(&mut self, delta: i32, reason: &str, now: Timestamp, history_limit: usize) -> i32 {
        let old_value = self.score;
        self.score = clamp_score(i64::from(self.score) + i64::from(delta));
        self.push_history(
            ReputationChange {
                timestamp: now,
                old_value,
                new_value: self.score,
                delta,
                reason: reason.to_string(),
            },
            history_limit,
        );
        self.score - old_value
    }

    fn push_history(&mut self, change: ReputationChange, limit: usize) {
        if limit == 0 {
            return;
        }
        self.history.push(change);
        if self.history.len() > limit {
            let excess = self.history.len() - limit;
            self.history.drain(..excess);
        }
    }
}

/// Clamp a widened score into the legal range
pub fn clamp_score(raw: i64) -> i32 {
    // Bounds fit in i32 after the clamp.
    raw.clamp(i64::from(REPUTATION_MIN), i64::from(REPUTATION_MAX)) as i32
}

/// The delta a related faction receives when `delta` is applied directly
///
/// Allies move the same way, enemies the opposite way, each scaled by the
/// configured ratio and truncated toward zero.
pub fn propagated_delta(delta: i32, stance: Stance, config: &ReputationConfig) -> i32 {
    let (ratio, sign) = match stance {
        Stance::Ally => (config.ally_propagation, 1.0),
        Stance::Enemy => (config.enemy_propagation, -1.0),
    };
    // |delta * ratio| <= |delta|, so the cast cannot overflow
    (f64::from(delta) * ratio * sign).trunc() as i32
}

fn decay_window(config: &ReputationConfig) -> Duration {
    Duration::days(i64::from(config.decay_interval_days.max(1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn epoch() -> Timestamp {
        Utc.with_ymd_and_hms(2102, 6, 1, 0, 0, 0).unwrap()
    }

    fn record(score: i32) -> FactionReputation {
        let mut rep = FactionReputation::new(PlayerId::new(1), FactionId::new("federation"), epoch());
        rep.score = score;
        rep
    }

    #[test]
    fn test_level_boundaries() {
        assert_eq!(get_level(-250), ReputationLevel::Untrustworthy);
        assert_eq!(get_level(-300), ReputationLevel::Untrustworthy);
        assert_eq!(get_level(-201), ReputationLevel::Untrustworthy);
        assert_eq!(get_level(-200), ReputationLevel::Suspicious);
        assert_eq!(get_level(-50), ReputationLevel::Neutral);
        assert_eq!(get_level(49), ReputationLevel::Neutral);
        assert_eq!(get_level(50), ReputationLevel::Recognized);
        assert_eq!(get_level(700), ReputationLevel::Exalted);
        assert_eq!(get_level(800), ReputationLevel::Exalted);
        assert_eq!(get_level(-701), ReputationLevel::PublicEnemy);
        assert_eq!(get_level(-800), ReputationLevel::PublicEnemy);
    }

    #[test]
    fn test_level_ranks() {
        assert_eq!(ReputationLevel::PublicEnemy.rank(), -8);
        assert_eq!(ReputationLevel::Neutral.rank(), 0);
        assert_eq!(ReputationLevel::Exalted.rank(), 8);
        assert_eq!(ReputationLevel::Untrustworthy.title(), "Untrustworthy");
    }

    #[test]
    fn test_adjust_clamps() {
        let config = ReputationConfig::default();
        let mut rep = record(790);
        assert_eq!(rep.adjust(50, "mission", epoch(), &config), 10);
        assert_eq!(rep.score, 800);
        assert_eq!(rep.adjust(i32::MIN, "war crime", epoch(), &config), -1600);
        assert_eq!(rep.score, -800);
        assert!(rep.decay_paused);
        assert_eq!(rep.history.len(), 2);
        assert_eq!(rep.history[1].new_value, -800);
    }

    #[test]
    fn test_decay_single_window() {
        let config = ReputationConfig::default();
        let mut rep = record(120);
        assert_eq!(rep.decay(epoch() + Duration::days(6), &config), 0);
        assert_eq!(rep.decay(epoch() + Duration::days(7), &config), 1);
        assert_eq!(rep.score, 119);
        // window restarted at day 7
        assert_eq!(rep.decay(epoch() + Duration::days(13), &config), 0);
        assert_eq!(rep.decay(epoch() + Duration::days(14), &config), 1);
    }

    #[test]
    fn test_decay_catches_up_without_crossing_zero() {
        let config = ReputationConfig::default();
        let mut rep = record(-3);
        assert_eq!(rep.decay(epoch() + Duration::days(70), &config), 3);
        assert_eq!(rep.score, 0);

        let mut rep = record(300);
        assert_eq!(rep.decay(epoch() + Duration::days(70), &config), 10);
        assert_eq!(rep.score, 290);
    }

    #[test]
    fn test_hostile_act_pauses_decay() {
        let config = ReputationConfig::default();
        let mut rep = record(0);
        rep.adjust(-150, "attacked patrol", epoch(), &config);
        assert_eq!(rep.decay(epoch() + Duration::days(60), &config), 0);
        assert_eq!(rep.score, -150);

        rep.adjust(10, "delivered aid", epoch() + Duration::days(60), &config);
        assert!(!rep.decay_paused);
        assert_eq!(rep.decay(epoch() + Duration::days(67), &config), 1);
        assert_eq!(rep.score, -139);
    }

    #[test]
    fn test_weekly_decay_single_step() {
        let config = ReputationConfig::default();
        let mut rep = record(-40);
        assert!(!rep.apply_weekly_decay(epoch() + Duration::days(3), &config));
        assert!(rep.apply_weekly_decay(epoch() + Duration::days(30), &config));
        assert_eq!(rep.score, -39);
        assert_eq!(rep.decay_anchor, epoch() + Duration::days(30));
    }

    #[test]
    fn test_weekly_decay_skips_paused_record() {
        let config = ReputationConfig::default();
        let mut rep = record(0);
        rep.adjust(-150, "attacked patrol", epoch(), &config);
        assert!(!rep.apply_weekly_decay(epoch() + Duration::days(30), &config));
        assert_eq!(rep.score, -150);
        assert!(rep.decay_paused);
    }

    #[test]
    fn test_reset_to_neutral() {
        let config = ReputationConfig::default();
        let mut rep = record(0);
        rep.adjust(-500, "piracy", epoch(), &config);
        rep.reset_to_neutral("amnesty", epoch(), &config);
        assert_eq!(rep.score, 0);
        assert!(!rep.decay_paused);
        assert_eq!(rep.history.last().map(|c| c.delta), Some(500));
    }

    #[test]
    fn test_history_is_bounded() {
        let config = ReputationConfig {
            history_limit: 3,
            ..ReputationConfig::default()
        };
        let mut rep = record(0);
        for i in 0..10 {
            rep.adjust(1, &format!("trade {i}"), epoch(), &config);
        }
        assert_eq!(rep.history.len(), 3);
        assert_eq!(rep.history[0].reason, "trade 7");
    }

    #[test]
    fn test_propagated_delta() {
        let config = ReputationConfig::default();
        assert_eq!(propagated_delta(100, Stance::Ally, &config), 25);
        assert_eq!(propagated_delta(100, Stance::Enemy, &config), -25);
        assert_eq!(propagated_delta(-100, Stance::Enemy, &config), 25);
        assert_eq!(propagated_delta(3, Stance::Ally, &config), 0);
    }

    #[test]
    fn test_standing_effects() {
        let s = Standing::from_score(800, false);
        assert_eq!(s.trade_modifier, 0.3);
        assert_eq!(s.price_multiplier, 0.85);
        assert_eq!(s.port_access, PortAccess::Full);
        assert_eq!(s.combat_response, CombatResponse::Friendly);

        let s = Standing::from_score(-300, true);
        assert_eq!(s.level, ReputationLevel::Untrustworthy);
        assert_eq!(s.price_multiplier, 1.10);
        assert_eq!(s.port_access, PortAccess::None);
        assert_eq!(s.combat_response, CombatResponse::Hostile);
        assert!(!s.territory_access);
        assert!(Standing::from_score(-300, false).territory_access);

        assert_eq!(Standing::from_score(0, false).price_multiplier, 1.0);
    }
}
