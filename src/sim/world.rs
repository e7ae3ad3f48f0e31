//! Arena layout: obstacles and power-ups
//!
//! A fixed set of props (boundary walls, the car, the gun store, a few
//! buildings and platforms) plus seeded random buildings, smokestacks and
//! crates. Power-ups get one random spot each inside a zone reserved for
//! their type. Same seed, same arena.

use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geometry::{Footprint, Obstacle, ObstacleKind};
use super::pickup::{PowerUpKind, WorldPowerUp};
use crate::consts::{POWER_UP_HEIGHT, SPAWN_CLEARANCE, SPAWN_X, SPAWN_Z, WALL_HEIGHT, WALL_THICKNESS};
use crate::tuning::Tuning;

/// Random placements give up after this many rejected tries
const MAX_PLACEMENT_ATTEMPTS: u32 = 24;
/// Free space kept between random obstacles
const PLACEMENT_MARGIN: f32 = 1.0;
/// Power-ups keep at least this far from obstacle footprints
const POWER_UP_MARGIN: f32 = 0.5;
const DECORATIVE_BOXES: usize = 5;
const SMOKESTACKS: usize = 3;

/// Static world handed to the resolvers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    /// Half the edge length of the ground plane
    pub ground_half_size: f32,
    pub obstacles: Vec<Obstacle>,
    pub power_ups: Vec<WorldPowerUp>,
}

impl World {
    /// Bare ground, nothing on it
    pub fn empty(tuning: &Tuning) -> Self {
        Self {
            ground_half_size: tuning.ground_size / 2.0,
            obstacles: Vec::new(),
            power_ups: Vec::new(),
        }
    }

    pub fn obstacle(&self, id: u32) -> Option<&Obstacle> {
        self.obstacles.iter().find(|o| o.id == id)
    }

    /// Where power-ups of `kind` may appear
    pub fn power_up_zone(&self, kind: PowerUpKind) -> Footprint {
        let h = self.ground_half_size;
        let (min, max) = match kind {
            PowerUpKind::Gun1 => (Vec2::new(-0.8, -0.2), Vec2::new(-0.4, 0.2)),
            PowerUpKind::Gun2 => (Vec2::new(0.4, -0.2), Vec2::new(0.8, 0.2)),
            PowerUpKind::Sword => (Vec2::new(-0.2, -0.8), Vec2::new(0.2, -0.5)),
            PowerUpKind::Health => (Vec2::new(-0.2, 0.5), Vec2::new(0.2, 0.8)),
            PowerUpKind::Invincibility => (Vec2::new(-0.4, 0.2), Vec2::new(0.4, 0.4)),
        };
        Footprint {
            min: min * h,
            max: max * h,
        }
    }

    fn blocked(&self, footprint: &Footprint) -> bool {
        self.obstacles
            .iter()
            .any(|o| o.footprint().expand(PLACEMENT_MARGIN).overlaps(footprint))
    }
}

/// Sequential ids shared by obstacles and power-ups
struct IdAllocator(u32);

impl IdAllocator {
    fn next(&mut self) -> u32 {
        let id = self.0;
        self.0 += 1;
        id
    }
}

fn random_in(rng: &mut Pcg32, zone: &Footprint) -> Vec2 {
    Vec2::new(
        rng.random_range(zone.min.x..=zone.max.x),
        rng.random_range(zone.min.y..=zone.max.y),
    )
}

/// Try random positions until `make` produces an obstacle that clears the
/// spawn point and everything already placed
fn place_random<F>(world: &mut World, rng: &mut Pcg32, ids: &mut IdAllocator, what: &str, mut make: F)
where
    F: FnMut(&mut Pcg32, u32) -> Obstacle,
{
    let spawn = Vec2::new(SPAWN_X, SPAWN_Z);
    let id = ids.next();
    for _ in 0..MAX_PLACEMENT_ATTEMPTS {
        let candidate = make(rng, id);
        let footprint = candidate.footprint();
        if footprint.expand(SPAWN_CLEARANCE).contains(spawn) || world.blocked(&footprint) {
            continue;
        }
        world.obstacles.push(candidate);
        return;
    }
    log::warn!("No room for {} after {} attempts, skipping", what, MAX_PLACEMENT_ATTEMPTS);
}

fn add_walls(world: &mut World, ids: &mut IdAllocator) {
    let g = world.ground_half_size * 2.0;
    let h = world.ground_half_size;
    let along_x = Vec3::new(g, WALL_HEIGHT, WALL_THICKNESS);
    let along_z = Vec3::new(WALL_THICKNESS, WALL_HEIGHT, g);
    for (x, z, size) in [(0.0, -h, along_x), (0.0, h, along_x), (h, 0.0, along_z), (-h, 0.0, along_z)] {
        world
            .obstacles
            .push(Obstacle::grounded_box(ids.next(), ObstacleKind::Wall, x, z, size));
    }
}

fn add_fixed_props(world: &mut World, ids: &mut IdAllocator) {
    let props = [
        (ObstacleKind::Vehicle, 10.0, 10.0, Vec3::new(4.0, 1.5, 2.0)),
        (ObstacleKind::Store, -15.0, -15.0, Vec3::new(5.0, 4.0, 3.0)),
        (ObstacleKind::Building, 25.0, -25.0, Vec3::new(10.0, 6.0, 10.0)),
        (ObstacleKind::Building, -28.0, 22.0, Vec3::new(12.0, 8.0, 8.0)),
        // Low platform with a stepping stone in front of it
        (ObstacleKind::Building, 0.0, -20.0, Vec3::new(8.0, 2.0, 6.0)),
        (ObstacleKind::Crate, -6.0, -12.0, Vec3::new(3.0, 1.2, 3.0)),
    ];
    for (kind, x, z, size) in props {
        world.obstacles.push(Obstacle::grounded_box(ids.next(), kind, x, z, size));
    }
}

fn add_random_obstacles(world: &mut World, rng: &mut Pcg32, ids: &mut IdAllocator) {
    let h = world.ground_half_size;

    // One building per open corner
    let building_zones = [
        Footprint {
            min: Vec2::splat(0.4 * h),
            max: Vec2::splat(0.8 * h),
        },
        Footprint {
            min: Vec2::splat(-0.8 * h),
            max: Vec2::splat(-0.4 * h),
        },
    ];
    for zone in building_zones {
        place_random(world, rng, ids, "building", |rng, id| {
            let size = Vec3::new(
                rng.random_range(6.0..10.0),
                rng.random_range(5.0..12.0),
                rng.random_range(6.0..10.0),
            );
            let at = random_in(rng, &zone);
            Obstacle::grounded_box(id, ObstacleKind::Building, at.x, at.y, size)
        });
    }

    let scatter = h - 5.0;
    for _ in 0..SMOKESTACKS {
        place_random(world, rng, ids, "smokestack", |rng, id| {
            let radius = rng.random_range(0.8..1.5);
            let height = rng.random_range(12.0..18.0);
            let x = rng.random_range(-scatter..scatter);
            let z = rng.random_range(-scatter..scatter);
            Obstacle::grounded_cylinder(id, ObstacleKind::Smokestack, x, z, radius, height)
        });
    }

    for _ in 0..DECORATIVE_BOXES {
        place_random(world, rng, ids, "crate", |rng, id| {
            let size: f32 = rng.random_range(2.0..6.0);
            let x = rng.random_range(-scatter..scatter);
            let z = rng.random_range(-scatter..scatter);
            Obstacle::grounded_box(id, ObstacleKind::Crate, x, z, Vec3::new(size, size * 1.5, size))
        });
    }
}

fn add_power_ups(world: &mut World, rng: &mut Pcg32, ids: &mut IdAllocator) {
    for kind in PowerUpKind::ALL {
        let zone = world.power_up_zone(kind);
        let clear = |p: Vec2, world: &World| {
            !world
                .obstacles
                .iter()
                .any(|o| o.footprint().expand(POWER_UP_MARGIN).contains(p))
        };

        let spot = (0..MAX_PLACEMENT_ATTEMPTS)
            .map(|_| random_in(rng, &zone))
            .find(|p| clear(*p, world))
            .unwrap_or_else(|| {
                let center = (zone.min + zone.max) * 0.5;
                log::warn!("No free spot for {:?} power-up, using zone center", kind);
                center
            });

        world.power_ups.push(WorldPowerUp {
            id: ids.next(),
            kind,
            position: Vec3::new(spot.x, POWER_UP_HEIGHT, spot.y),
            collected: false,
        });
    }
}

/// Build the arena for `seed`
pub fn build_world(seed: u64, tuning: &Tuning) -> World {
    let mut rng = Pcg32::seed_from_u64(seed);
    let mut ids = IdAllocator(1);
    let mut world = World::empty(tuning);

    add_walls(&mut world, &mut ids);
    add_fixed_props(&mut world, &mut ids);
    add_random_obstacles(&mut world, &mut rng, &mut ids);
    add_power_ups(&mut world, &mut rng, &mut ids);

    log::info!(
        "World built (seed {}): {} obstacles, {} power-ups",
        seed,
        world.obstacles.len(),
        world.power_ups.len()
    );
    world
}
