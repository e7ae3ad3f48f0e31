//! Power-ups placed in the world and the per-frame pickup detector

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::combat::Weapon;

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    Gun1,
    Gun2,
    Sword,
    Health,
    Invincibility,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 5] = [
        PowerUpKind::Gun1,
        PowerUpKind::Gun2,
        PowerUpKind::Sword,
        PowerUpKind::Health,
        PowerUpKind::Invincibility,
    ];

    /// The weapon this power-up equips, if it is a weapon
    pub fn weapon(self) -> Option<Weapon> {
        match self {
            PowerUpKind::Gun1 => Some(Weapon::Gun1),
            PowerUpKind::Gun2 => Some(Weapon::Gun2),
            PowerUpKind::Sword => Some(Weapon::Sword),
            PowerUpKind::Health | PowerUpKind::Invincibility => None,
        }
    }
}

/// A pickup entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldPowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub position: Vec3,
    /// Once set the power-up is out of the world for good
    pub collected: bool,
}

/// Index of the first uncollected power-up within `distance` of `player`
pub fn find_collectible(power_ups: &[WorldPowerUp], player: Vec3, distance: f32) -> Option<usize> {
    let limit_sq = distance * distance;
    power_ups
        .iter()
        .position(|p| !p.collected && p.position.distance_squared(player) < limit_sq)
}

/// Mark the power-up with `id` collected. `None` if it does not exist or was
/// already collected, so a repeated collection has no effect.
pub fn collect(power_ups: &mut [WorldPowerUp], id: u32) -> Option<PowerUpKind> {
    let power_up = power_ups.iter_mut().find(|p| p.id == id)?;
    if power_up.collected {
        return None;
    }
    power_up.collected = true;
    Some(power_up.kind)
}

/// Power-ups still in the world
pub fn active(power_ups: &[WorldPowerUp]) -> impl Iterator<Item = &WorldPowerUp> {
    power_ups.iter().filter(|p| !p.collected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn power_up(id: u32, kind: PowerUpKind, x: f32, z: f32) -> WorldPowerUp {
        WorldPowerUp {
            id,
            kind,
            position: Vec3::new(x, 1.0, z),
            collected: false,
        }
    }

    #[test]
    fn test_detects_only_within_distance() {
        let items = vec![power_up(1, PowerUpKind::Health, 10.0, 0.0)];
        assert_eq!(find_collectible(&items, Vec3::new(0.0, 1.7, 0.0), 2.0), None);
        assert_eq!(find_collectible(&items, Vec3::new(9.0, 1.7, 0.0), 2.0), Some(0));
    }

    #[test]
    fn test_first_match_in_order() {
        let items = vec![
            power_up(1, PowerUpKind::Gun1, 0.5, 0.0),
            power_up(2, PowerUpKind::Sword, -0.5, 0.0),
        ];
        assert_eq!(find_collectible(&items, Vec3::new(0.0, 1.0, 0.0), 2.0), Some(0));
    }

    #[test]
    fn test_collection_is_idempotent() {
        let mut items = vec![power_up(7, PowerUpKind::Invincibility, 0.0, 0.0)];
        assert_eq!(collect(&mut items, 7), Some(PowerUpKind::Invincibility));
        assert_eq!(collect(&mut items, 7), None);
        assert_eq!(collect(&mut items, 99), None);
        assert_eq!(find_collectible(&items, Vec3::new(0.0, 1.0, 0.0), 2.0), None);
        assert_eq!(active(&items).count(), 0);
    }

    #[test]
    fn test_weapon_mapping() {
        assert_eq!(PowerUpKind::Gun2.weapon(), Some(Weapon::Gun2));
        assert_eq!(PowerUpKind::Health.weapon(), None);
    }
}
