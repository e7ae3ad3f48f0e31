//! Weapon/combat state machine
//!
//! States: unarmed or equipped with one weapon. Orthogonal to that, the
//! primary attack runs a short animation during which further attacks are
//! dropped. Damage is computed from a lookup table and reported as an event;
//! there are no targets to apply it to.

use std::f32::consts::PI;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// Weapons that can be equipped from power-ups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Weapon {
    Gun1,
    Gun2,
    Sword,
}

impl Weapon {
    #[inline]
    pub fn is_gun(self) -> bool {
        matches!(self, Weapon::Gun1 | Weapon::Gun2)
    }

    /// Resting transform of the weapon, in camera space
    pub fn rest_pose(self) -> WeaponPose {
        match self {
            Weapon::Gun1 => WeaponPose {
                offset: Vec3::new(0.3, -0.3, -0.6),
                rotation: Vec3::new(0.0, 0.0, 0.0),
            },
            Weapon::Gun2 => WeaponPose {
                offset: Vec3::new(0.35, -0.35, -0.7),
                rotation: Vec3::new(0.0, 0.05, 0.0),
            },
            Weapon::Sword => WeaponPose {
                offset: Vec3::new(0.4, -0.4, -0.5),
                rotation: Vec3::new(-0.3, 0.0, -0.35),
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Weapon::Gun1 => "pistol",
            Weapon::Gun2 => "rifle",
            Weapon::Sword => "sword",
        }
    }
}

/// Camera-space weapon transform (Euler XYZ rotation in radians)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WeaponPose {
    pub offset: Vec3,
    pub rotation: Vec3,
}

/// What kind of blow was thrown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackKind {
    Punch,
    Kick,
    Weapon(Weapon),
}

impl AttackKind {
    /// Punches and kicks dip the camera
    #[inline]
    pub fn is_melee_strike(self) -> bool {
        matches!(self, AttackKind::Punch | AttackKind::Kick)
    }
}

/// Fixed damage per attack kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageTable {
    pub punch: u32,
    pub kick: u32,
    pub gun1: u32,
    pub gun2: u32,
    pub sword: u32,
}

impl Default for DamageTable {
    fn default() -> Self {
        Self {
            punch: 10,
            kick: 15,
            gun1: 25,
            gun2: 40,
            sword: 35,
        }
    }
}

impl DamageTable {
    pub fn damage_for(&self, kind: AttackKind) -> u32 {
        match kind {
            AttackKind::Punch => self.punch,
            AttackKind::Kick => self.kick,
            AttackKind::Weapon(Weapon::Gun1) => self.gun1,
            AttackKind::Weapon(Weapon::Gun2) => self.gun2,
            AttackKind::Weapon(Weapon::Sword) => self.sword,
        }
    }
}

/// A reported damage value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attack {
    pub kind: AttackKind,
    pub damage: u32,
}

/// Combat state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Combat {
    pub equipped: Option<Weapon>,
    /// Start time of the running primary attack animation
    pub attack_started: Option<f64>,
    /// Current weapon transform (rest pose when idle)
    pub pose: WeaponPose,
    /// Camera dip from a punch or kick ends at this time
    pub dip_until: Option<f64>,
}

impl Combat {
    /// Swap to `weapon`, returning whatever was held before
    pub fn equip(&mut self, weapon: Weapon) -> Option<Weapon> {
        let previous = self.equipped.replace(weapon);
        self.attack_started = None;
        self.pose = weapon.rest_pose();
        previous
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.attack_started.is_some()
    }

    /// Primary action: punch when unarmed, otherwise use the weapon.
    /// Dropped (returns `None`) while the previous attack is still animating.
    pub fn primary_attack(&mut self, now: f64, tuning: &Tuning) -> Option<Attack> {
        if self.is_animating() {
            return None;
        }
        let kind = match self.equipped {
            Some(weapon) => AttackKind::Weapon(weapon),
            None => AttackKind::Punch,
        };
        self.attack_started = Some(now);
        Some(self.strike(kind, now, tuning))
    }

    /// Secondary action: an instantaneous kick that never animates the weapon
    pub fn kick(&mut self, now: f64, tuning: &Tuning) -> Option<Attack> {
        if self.is_animating() {
            return None;
        }
        Some(self.strike(AttackKind::Kick, now, tuning))
    }

    fn strike(&mut self, kind: AttackKind, now: f64, tuning: &Tuning) -> Attack {
        if kind.is_melee_strike() {
            self.dip_until = Some(now + tuning.melee_dip_duration as f64);
        }
        Attack {
            kind,
            damage: tuning.damage.damage_for(kind),
        }
    }

    /// Progress of the running attack animation in [0, 1]
    pub fn attack_progress(&self, now: f64, tuning: &Tuning) -> Option<f32> {
        self.attack_started
            .map(|start| (((now - start) / tuning.attack_duration as f64) as f32).clamp(0.0, 1.0))
    }

    /// Advance the attack animation; returns true when it finished this frame
    pub fn update(&mut self, now: f64, tuning: &Tuning) -> bool {
        let Some(start) = self.attack_started else {
            return false;
        };
        let progress = ((now - start) / tuning.attack_duration as f64) as f32;
        let rest = self.equipped.map(Weapon::rest_pose).unwrap_or_default();

        if progress >= 1.0 {
            self.attack_started = None;
            self.pose = rest;
            return true;
        }

        let wave = (progress.max(0.0) * PI).sin();
        self.pose = rest;
        match self.equipped {
            Some(Weapon::Sword) => self.pose.rotation.x = rest.rotation.x - wave * tuning.max_swing_angle,
            Some(weapon) if weapon.is_gun() => self.pose.offset.z = rest.offset.z + wave * tuning.max_recoil,
            _ => {}
        }
        false
    }

    /// Current downward camera offset from a punch/kick
    pub fn camera_dip(&self, now: f64, tuning: &Tuning) -> f32 {
        match self.dip_until {
            Some(until) if now < until => tuning.melee_dip,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unarmed_primary_is_punch() {
        let tuning = Tuning::default();
        let mut combat = Combat::default();
        let attack = combat.primary_attack(0.0, &tuning).unwrap();
        assert_eq!(attack.kind, AttackKind::Punch);
        assert_eq!(attack.damage, tuning.damage.punch);
        assert!(combat.is_animating());
        assert_eq!(combat.camera_dip(0.05, &tuning), tuning.melee_dip);
        assert_eq!(combat.camera_dip(0.5, &tuning), 0.0);
    }

    #[test]
    fn test_attack_dropped_while_animating() {
        let tuning = Tuning::default();
        let mut combat = Combat::default();
        combat.equip(Weapon::Gun2);
        assert!(combat.primary_attack(0.0, &tuning).is_some());
        combat.update(0.1, &tuning);
        assert!(combat.primary_attack(0.1, &tuning).is_none());
        assert!(combat.kick(0.1, &tuning).is_none());

        assert!(combat.update(0.25, &tuning));
        assert!(!combat.is_animating());
        let attack = combat.primary_attack(0.25, &tuning).unwrap();
        assert_eq!(attack.damage, tuning.damage.gun2);
    }

    #[test]
    fn test_kick_does_not_animate() {
        let tuning = Tuning::default();
        let mut combat = Combat::default();
        combat.equip(Weapon::Sword);
        let attack = combat.kick(1.0, &tuning).unwrap();
        assert_eq!(attack.kind, AttackKind::Kick);
        assert_eq!(attack.damage, tuning.damage.kick);
        assert!(!combat.is_animating());
        assert!(combat.camera_dip(1.01, &tuning) > 0.0);
    }

    #[test]
    fn test_sword_swing_peaks_midway() {
        let tuning = Tuning::default();
        let mut combat = Combat::default();
        combat.equip(Weapon::Sword);
        let rest = Weapon::Sword.rest_pose();

        combat.primary_attack(0.0, &tuning);
        combat.update(tuning.attack_duration as f64 / 2.0, &tuning);
        let swing = rest.rotation.x - combat.pose.rotation.x;
        assert!((swing - tuning.max_swing_angle).abs() < 1e-4);
        // Swords never recoil
        assert_eq!(combat.pose.offset, rest.offset);

        combat.update(tuning.attack_duration as f64, &tuning);
        assert_eq!(combat.pose, rest);
    }

    #[test]
    fn test_gun_recoil() {
        let tuning = Tuning::default();
        let mut combat = Combat::default();
        combat.equip(Weapon::Gun1);
        let rest = Weapon::Gun1.rest_pose();

        combat.primary_attack(0.0, &tuning);
        combat.update(0.05, &tuning);
        let recoil = combat.pose.offset.z - rest.offset.z;
        let expected = (0.25 * PI).sin() * tuning.max_recoil;
        assert!((recoil - expected).abs() < 1e-4);
        assert_eq!(combat.pose.rotation, rest.rotation);
        // Guns do not dip the camera
        assert_eq!(combat.camera_dip(0.05, &tuning), 0.0);
    }

    #[test]
    fn test_equip_replaces_previous() {
        let mut combat = Combat::default();
        assert_eq!(combat.equip(Weapon::Gun1), None);
        assert_eq!(combat.equip(Weapon::Sword), Some(Weapon::Gun1));
        assert_eq!(combat.pose, Weapon::Sword.rest_pose());
    }
}
