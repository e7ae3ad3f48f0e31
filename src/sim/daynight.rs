//! Day-night lighting cycle
//!
//! A cyclic timeline of named phases. The lighting at any instant is a linear
//! interpolation between the current phase and the next one, parameterized by
//! progress through the current phase. Advanced by whole seconds from the
//! coarse 1 Hz tick, never from the render loop.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{lerp, lerp_vec3, rgb};

/// Tolerance for the phase fractions summing to 1.0
const FRACTION_SUM_TOLERANCE: f32 = 1e-4;

/// Rejected cycle configuration
#[derive(Debug, Error, PartialEq)]
pub enum CycleError {
    #[error("day-night cycle has no phases")]
    NoPhases,
    #[error("day-night cycle duration must be positive, got {0}")]
    BadDuration(f32),
    #[error("phase `{name}` has a non-positive duration fraction {fraction}")]
    BadFraction { name: String, fraction: f32 },
    #[error("phase duration fractions sum to {0}, expected 1.0")]
    FractionSum(f32),
}

/// Every light channel driven by the cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lighting {
    pub ambient_color: Vec3,
    pub ambient_intensity: f32,
    pub directional_color: Vec3,
    pub directional_intensity: f32,
    pub background: Vec3,
    pub fog: Vec3,
}

impl Lighting {
    /// Channel-wise interpolation toward `other`
    pub fn lerp(&self, other: &Lighting, t: f32) -> Lighting {
        Lighting {
            ambient_color: lerp_vec3(self.ambient_color, other.ambient_color, t),
            ambient_intensity: lerp(self.ambient_intensity, other.ambient_intensity, t),
            directional_color: lerp_vec3(self.directional_color, other.directional_color, t),
            directional_intensity: lerp(self.directional_intensity, other.directional_intensity, t),
            background: lerp_vec3(self.background, other.background, t),
            fog: lerp_vec3(self.fog, other.fog, t),
        }
    }
}

/// A named segment of the cycle with its boundary lighting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub name: String,
    /// Share of the total cycle length (all phases sum to 1.0)
    pub fraction: f32,
    pub lighting: Lighting,
}

/// Static cycle configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayNightCycle {
    /// Total cycle length in simulated seconds
    pub duration: f32,
    pub phases: Vec<Phase>,
}

impl Default for DayNightCycle {
    fn default() -> Self {
        let phase = |name: &str, fraction: f32, ambient: (u32, f32), directional: (u32, f32), background: u32, fog: u32| Phase {
            name: name.to_string(),
            fraction,
            lighting: Lighting {
                ambient_color: rgb(ambient.0),
                ambient_intensity: ambient.1,
                directional_color: rgb(directional.0),
                directional_intensity: directional.1,
                background: rgb(background),
                fog: rgb(fog),
            },
        };

        // Binary-exact fractions keep phase boundaries on whole seconds
        Self {
            duration: 120.0,
            phases: vec![
                phase("dawn", 0.125, (0xffc9a3, 0.45), (0xffa060, 0.7), 0xf4a582, 0xe8b59a),
                phase("day", 0.375, (0xffffff, 0.6), (0xffffff, 1.2), 0x87ceeb, 0xb0d8ee),
                phase("dusk", 0.125, (0xd08c70, 0.4), (0xff7040, 0.6), 0x8a4f6e, 0x6e4a5e),
                phase("night", 0.375, (0x404870, 0.2), (0x8090c0, 0.25), 0x0a0c1e, 0x141828),
            ],
        }
    }
}

impl DayNightCycle {
    pub fn validate(&self) -> Result<(), CycleError> {
        if self.phases.is_empty() {
            return Err(CycleError::NoPhases);
        }
        if self.duration.is_nan() || self.duration <= 0.0 {
            return Err(CycleError::BadDuration(self.duration));
        }
        for phase in &self.phases {
            if phase.fraction.is_nan() || phase.fraction <= 0.0 {
                return Err(CycleError::BadFraction {
                    name: phase.name.clone(),
                    fraction: phase.fraction,
                });
            }
        }
        let sum: f32 = self.phases.iter().map(|p| p.fraction).sum();
        if (sum - 1.0).abs() > FRACTION_SUM_TOLERANCE {
            return Err(CycleError::FractionSum(sum));
        }
        Ok(())
    }

    /// Wrap any time into [0, duration)
    #[inline]
    pub fn wrap(&self, t: f32) -> f32 {
        let wrapped = t.rem_euclid(self.duration);
        // rem_euclid can round up to exactly `duration` for tiny negative inputs
        if wrapped >= self.duration { 0.0 } else { wrapped }
    }

    /// Start time (seconds) of the phase at `index`
    pub fn phase_start(&self, index: usize) -> f32 {
        self.phases[..index].iter().map(|p| p.fraction * self.duration).sum()
    }

    /// Index of the phase containing `t` and the progress in [0, 1] through it
    pub fn phase_at(&self, t: f32) -> (usize, f32) {
        let t = self.wrap(t);
        let mut start = 0.0;
        for (i, phase) in self.phases.iter().enumerate() {
            let length = phase.fraction * self.duration;
            if t < start + length {
                return (i, ((t - start) / length).clamp(0.0, 1.0));
            }
            start += length;
        }
        // Fractions summing a hair under 1.0 leave a sliver at the end of the cycle
        (self.phases.len() - 1, 1.0)
    }

    /// Interpolated lighting at cycle time `t`
    pub fn lighting_at(&self, t: f32) -> Lighting {
        let (index, progress) = self.phase_at(t);
        let current = &self.phases[index].lighting;
        let next = &self.phases[(index + 1) % self.phases.len()].lighting;
        current.lerp(next, progress)
    }
}

/// Time-varying cycle state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayNightState {
    /// Position in the cycle, in [0, duration)
    pub current_time: f32,
    pub lighting: Lighting,
}

impl DayNightState {
    pub fn new(cycle: &DayNightCycle) -> Self {
        Self::at(cycle, 0.0)
    }

    pub fn at(cycle: &DayNightCycle, t: f32) -> Self {
        let current_time = cycle.wrap(t);
        Self {
            current_time,
            lighting: cycle.lighting_at(current_time),
        }
    }

    /// Advance by `seconds` and recompute the lighting
    pub fn advance(&mut self, cycle: &DayNightCycle, seconds: f32) {
        *self = Self::at(cycle, self.current_time + seconds);
    }

    /// Name of the phase the cycle is currently in
    pub fn phase_name<'a>(&self, cycle: &'a DayNightCycle) -> &'a str {
        let (index, _) = cycle.phase_at(self.current_time);
        &cycle.phases[index].name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_cycle_is_valid() {
        assert_eq!(DayNightCycle::default().validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_bad_fractions() {
        let mut cycle = DayNightCycle::default();
        cycle.phases[0].fraction = 0.5;
        assert!(matches!(cycle.validate(), Err(CycleError::FractionSum(_))));

        cycle.phases[0].fraction = 0.0;
        assert!(matches!(cycle.validate(), Err(CycleError::BadFraction { .. })));

        let empty = DayNightCycle { duration: 120.0, phases: Vec::new() };
        assert_eq!(empty.validate(), Err(CycleError::NoPhases));
    }

    #[test]
    fn test_boundaries_hit_configured_values_exactly() {
        let cycle = DayNightCycle::default();
        for i in 0..cycle.phases.len() {
            let start = cycle.phase_start(i);
            let (index, progress) = cycle.phase_at(start);
            assert_eq!(index, i);
            assert_eq!(progress, 0.0);
            assert_eq!(cycle.lighting_at(start), cycle.phases[i].lighting);
        }
    }

    #[test]
    fn test_last_phase_wraps_to_first() {
        let cycle = DayNightCycle::default();
        // Just before the end of the cycle: night heading back into dawn
        let (index, progress) = cycle.phase_at(cycle.duration - 1e-3);
        assert_eq!(index, cycle.phases.len() - 1);
        assert!(progress > 0.99);
        let lit = cycle.lighting_at(cycle.duration - 1e-3);
        let dawn = cycle.phases[0].lighting;
        assert!((lit.ambient_intensity - dawn.ambient_intensity).abs() < 1e-3);
    }

    #[test]
    fn test_midpoint_interpolates() {
        let cycle = DayNightCycle::default();
        // Dawn spans [0, 15); halfway is 7.5
        let lit = cycle.lighting_at(7.5);
        let dawn = cycle.phases[0].lighting;
        let day = cycle.phases[1].lighting;
        let expected = (dawn.directional_intensity + day.directional_intensity) / 2.0;
        assert!((lit.directional_intensity - expected).abs() < 1e-5);
    }

    #[test]
    fn test_state_advances_and_wraps() {
        let cycle = DayNightCycle::default();
        let mut state = DayNightState::new(&cycle);
        assert_eq!(state.phase_name(&cycle), "dawn");

        for _ in 0..15 {
            state.advance(&cycle, 1.0);
        }
        assert_eq!(state.current_time, 15.0);
        assert_eq!(state.phase_name(&cycle), "day");

        for _ in 0..105 {
            state.advance(&cycle, 1.0);
        }
        assert_eq!(state.current_time, 0.0);
        assert_eq!(state.lighting, cycle.phases[0].lighting);
    }

    proptest! {
        #[test]
        fn prop_cycle_is_periodic(seconds in 0u32..10_000) {
            let cycle = DayNightCycle::default();
            let t = seconds as f32;
            prop_assert_eq!(cycle.phase_at(t), cycle.phase_at(t + cycle.duration));
            prop_assert_eq!(cycle.lighting_at(t), cycle.lighting_at(t + cycle.duration));
        }

        #[test]
        fn prop_progress_stays_in_unit_range(t in -1000.0f32..1000.0) {
            let cycle = DayNightCycle::default();
            let (index, progress) = cycle.phase_at(t);
            prop_assert!(index < cycle.phases.len());
            prop_assert!((0.0..=1.0).contains(&progress));
        }
    }
}
