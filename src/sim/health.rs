//! Player health, invincibility and the channel the HUD reads them from
//!
//! Invincibility is stored only as an expiry timestamp. Both the damage check
//! and the HUD countdown derive from `expiry - now`, so there is no second
//! timer that can drift.

use std::cell::Cell;

use serde::{Deserialize, Serialize};

/// Result of an `apply_damage` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Invincible, nothing changed
    Absorbed,
    /// Health reduced and still above zero
    Applied { remaining: u32 },
    /// Health reached zero
    Depleted,
}

/// Health state owned by the simulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerHealth {
    current: u32,
    max: u32,
    /// Play time at which invincibility ends
    invincible_until: Option<f64>,
}

impl PlayerHealth {
    pub fn new(max: u32) -> Self {
        Self {
            current: max,
            max,
            invincible_until: None,
        }
    }

    #[inline]
    pub fn current(&self) -> u32 {
        self.current
    }

    #[inline]
    pub fn max(&self) -> u32 {
        self.max
    }

    #[inline]
    pub fn invincible_until(&self) -> Option<f64> {
        self.invincible_until
    }

    /// Compares against the expiry, never a cached flag
    #[inline]
    pub fn is_invincible(&self, now: f64) -> bool {
        self.invincible_until.is_some_and(|until| now < until)
    }

    /// Subtract `amount`, flooring at zero. No-op while invincible.
    pub fn apply_damage(&mut self, amount: u32, now: f64) -> DamageOutcome {
        if self.is_invincible(now) {
            return DamageOutcome::Absorbed;
        }
        self.current = self.current.saturating_sub(amount);
        if self.current == 0 {
            DamageOutcome::Depleted
        } else {
            DamageOutcome::Applied {
                remaining: self.current,
            }
        }
    }

    pub fn refill(&mut self) {
        self.current = self.max;
    }

    /// Invincible from `now` for `duration` seconds; returns the expiry
    pub fn grant_invincibility(&mut self, duration: f32, now: f64) -> f64 {
        let until = now + duration as f64;
        self.invincible_until = Some(until);
        until
    }

    /// Seconds of invincibility left, `None` once expired
    pub fn invincibility_remaining(&self, now: f64) -> Option<f64> {
        self.invincible_until
            .map(|until| until - now)
            .filter(|remaining| *remaining > 0.0)
    }

    pub fn snapshot(&self) -> HealthSnapshot {
        HealthSnapshot {
            current: self.current,
            max: self.max,
            invincible_until: self.invincible_until,
        }
    }
}

/// What the HUD sees
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HealthSnapshot {
    pub current: u32,
    pub max: u32,
    pub invincible_until: Option<f64>,
}

/// Single-writer, many-reader health channel
///
/// The simulation publishes after each step; readers compare revisions to
/// notice changes. Everything runs on one thread, so `Cell` is enough.
#[derive(Debug, Default)]
pub struct HealthChannel {
    snapshot: Cell<HealthSnapshot>,
    revision: Cell<u64>,
}

impl HealthChannel {
    pub fn new(initial: HealthSnapshot) -> Self {
        Self {
            snapshot: Cell::new(initial),
            revision: Cell::new(1),
        }
    }

    /// Store `snapshot`; bumps the revision only when something changed
    pub fn publish(&self, snapshot: HealthSnapshot) -> bool {
        if self.snapshot.get() == snapshot {
            return false;
        }
        self.snapshot.set(snapshot);
        self.revision.set(self.revision.get() + 1);
        true
    }

    #[inline]
    pub fn read(&self) -> HealthSnapshot {
        self.snapshot.get()
    }

    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision.get()
    }
}
