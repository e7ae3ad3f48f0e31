//! HUD view model derived from the health channel

use crate::sim::health::HealthSnapshot;

/// What the health bar and invincibility badge show
#[derive(Debug, Clone, PartialEq)]
pub struct HudModel {
    /// Health bar fill in [0, 100]
    pub health_percent: f32,
    /// "current / max"
    pub health_label: String,
    /// Whole seconds of invincibility left, `None` when not invincible
    pub invincibility_secs: Option<u32>,
}

impl HudModel {
    /// Derive the HUD from a snapshot at play time `now`.
    /// The countdown is computed from the expiry alone.
    pub fn from_snapshot(snapshot: &HealthSnapshot, now: f64) -> Self {
        let health_percent = if snapshot.max == 0 {
            0.0
        } else {
            (snapshot.current as f32 / snapshot.max as f32 * 100.0).clamp(0.0, 100.0)
        };
        let invincibility_secs = snapshot
            .invincible_until
            .map(|until| until - now)
            .filter(|remaining| *remaining > 0.0)
            .map(|remaining| remaining.ceil() as u32);

        Self {
            health_percent,
            health_label: format!("{} / {}", snapshot.current, snapshot.max),
            invincibility_secs,
        }
    }

    /// CSS width of the health bar fill
    pub fn health_width(&self) -> String {
        format!("{:.0}%", self.health_percent)
    }

    /// Badge text, `None` when the badge should be hidden
    pub fn invincibility_text(&self) -> Option<String> {
        self.invincibility_secs.map(|secs| format!("Invincible: {}s", secs))
    }
}
