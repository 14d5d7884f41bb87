//! Turn accounts - the action currency
//!
//! Turns regenerate continuously whether the player is online or not. The
//! account stores only the last settled state; `regenerate` brings it up
//! to `now` on demand.

use crate::config::TurnConfig;
use crate::time::{elapsed_seconds, Timestamp};
use crate::{Error, PlayerId, Result};
use serde::{Deserialize, Serialize};

/// A player's turn pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerTurnAccount {
    pub player_id: PlayerId,
    /// Turns available now, within `[0, max_turns]`
    pub current_turns: u32,
    pub max_turns: u32,
    /// Instant up to which regeneration has been settled
    pub last_regen_timestamp: Timestamp,
    /// Regeneration speed-up, always >= 1.0
    pub bonus_multiplier: f64,
    /// Fractional turn progress in `[0, 1)`
    #[serde(default)]
    pub regen_carry: f64,
}

impl PlayerTurnAccount {
    /// Create a full account at the configured base cap
    pub fn new(player_id: PlayerId, config: &TurnConfig, now: Timestamp) -> Self {
        Self {
            player_id,
            current_turns: config.base_max_turns,
            max_turns: config.base_max_turns,
            last_regen_timestamp: now,
            bonus_multiplier: 1.0,
            regen_carry: 0.0,
        }
    }

    /// Turns regenerated over `seconds` at the current cap and multiplier
    pub fn regen_over(&self, seconds: f64, config: &TurnConfig) -> f64 {
        seconds * f64::from(self.max_turns) * self.bonus_multiplier / config.regen_period_secs as f64
    }

    /// Settle regeneration up to `now` and return the whole turns gained
    ///
    /// Negative elapsed time is treated as zero. At the cap the carry is
    /// dropped so that a spend right after does not get a partial turn back
    /// for free.
    pub fn regenerate(&mut self, now: Timestamp, config: &TurnConfig) -> u32 {
        let elapsed = elapsed_seconds(self.last_regen_timestamp, now);
        if now > self.last_regen_timestamp {
            self.last_regen_timestamp = now;
        }
        if self.current_turns >= self.max_turns {
            self.current_turns = self.max_turns;
            self.regen_carry = 0.0;
            return 0;
        }

        let headroom = self.max_turns - self.current_turns;
        let progress = self.regen_over(elapsed, config) + self.regen_carry;
        if progress >= f64::from(headroom) {
            self.current_turns = self.max_turns;
            self.regen_carry = 0.0;
            return headroom;
        }

        let whole = progress.floor();
        // whole < headroom <= u32::MAX here
        let gained = whole as u32;
        self.current_turns += gained;
        self.regen_carry = progress - whole;
        gained
    }

    /// Deduct turns; the caller must have regenerated first
    pub fn spend(&mut self, amount: u32) -> Result<()> {
        if amount > self.current_turns {
            return Err(Error::InsufficientTurns {
                requested: amount,
                available: self.current_turns,
            });
        }
        self.current_turns -= amount;
        Ok(())
    }

    /// Grant turns, capped at `max_turns`; returns the turns actually added
    pub fn grant(&mut self, delta: u32) -> u32 {
        let before = self.current_turns;
        self.current_turns = self.current_turns.saturating_add(delta).min(self.max_turns);
        self.current_turns - before
    }

    /// Permanently raise the cap
    pub fn raise_max(&mut self, delta: u32) {
        self.max_turns = self.max_turns.saturating_add(delta);
    }

    /// Replace the regeneration multiplier (values below 1.0 are raised to 1.0)
    pub fn set_multiplier(&mut self, multiplier: f64) {
        self.bonus_multiplier = if multiplier.is_finite() {
            multiplier.max(1.0)
        } else {
            1.0
        };
    }

    /// Whether the pool is full
    pub fn is_full(&self) -> bool {
        self.current_turns >= self.max_turns
    }
}

/// Turn price of a player action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnCost {
    /// Never touches the turn account (e.g. defending)
    Free,
    Turns(u32),
}

impl TurnCost {
    pub fn amount(&self) -> u32 {
        match self {
            TurnCost::Free => 0,
            TurnCost::Turns(n) => *n,
        }
    }
}
