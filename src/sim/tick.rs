//! Frame step
//!
//! Advances the simulation by one variable-length frame: stance, vertical
//! motion, horizontal motion, pickups, then combat. The day-night cycle runs
//! on its own coarse tick.

use super::combat::AttackKind;
use super::horizontal::resolve_horizontal;
use super::input::FrameInput;
use super::pickup::{self, PowerUpKind};
use super::state::{GameEvent, SimulationState};
use super::vertical::resolve_vertical;
use crate::consts::{COARSE_TICK_SECS, MAX_FRAME_DT};

/// Advance the simulation by `dt` seconds. Play time is left to the caller.
pub fn step(state: &mut SimulationState, input: &FrameInput, dt: f32) {
    let dt = dt.clamp(0.0, MAX_FRAME_DT);
    state.clock += dt as f64;
    state.frame += 1;

    // Stance
    state.player.is_running = input.running;
    state.player.set_crouching(input.crouching, &state.tuning);
    if input.torch_on != state.torch_on {
        state.torch_on = input.torch_on;
        state.push_event(GameEvent::TorchToggled { on: input.torch_on });
    }

    // Vertical
    let vertical = resolve_vertical(
        &mut state.player,
        &state.world.obstacles,
        state.world.ground_half_size,
        input.jump,
        dt,
        &state.tuning,
    );
    if let Some(air) = vertical.jumped {
        state.push_event(GameEvent::Jumped { air });
    }
    if vertical.left_support {
        state.push_event(GameEvent::LeftSupport);
    }
    if let Some(surface) = vertical.landed {
        let height = state.player.last_surface_y;
        state.push_event(GameEvent::Landed { surface, height });
    }

    // Horizontal
    resolve_horizontal(&mut state.player, input, &state.world.obstacles, dt, &state.tuning);

    // Pickups
    collect_power_up(state);

    // Combat
    let now = state.clock;
    state.combat.update(now, &state.tuning);
    if input.primary {
        if let Some(attack) = state.combat.primary_attack(now, &state.tuning) {
            report_attack(state, attack);
        }
    }
    if input.kick {
        if let Some(attack) = state.combat.kick(now, &state.tuning) {
            report_attack(state, attack);
        }
    }
}

/// Collect at most one power-up in reach and apply its effect
fn collect_power_up(state: &mut SimulationState) {
    let Some(index) = pickup::find_collectible(
        &state.world.power_ups,
        state.player.position,
        state.tuning.pickup_distance,
    ) else {
        return;
    };
    let id = state.world.power_ups[index].id;
    let Some(kind) = pickup::collect(&mut state.world.power_ups, id) else {
        return;
    };

    log::info!("Collected {:?} power-up (id {})", kind, id);
    state.push_event(GameEvent::PowerUpCollected { id, kind });

    match kind {
        PowerUpKind::Health => {
            state.health.refill();
            state.push_event(GameEvent::HealthRefilled);
        }
        PowerUpKind::Invincibility => {
            let until = state
                .health
                .grant_invincibility(state.tuning.invincibility_duration, state.play_time);
            state.push_event(GameEvent::InvincibilityGranted { until });
        }
        PowerUpKind::Gun1 | PowerUpKind::Gun2 | PowerUpKind::Sword => {
            if let Some(weapon) = kind.weapon() {
                let previous = state.combat.equip(weapon);
                log::info!("Equipped {} (was {:?})", weapon.name(), previous.map(|w| w.name()));
                state.push_event(GameEvent::WeaponEquipped { previous, weapon });
            }
        }
    }
}

fn report_attack(state: &mut SimulationState, attack: super::combat::Attack) {
    let name = match attack.kind {
        AttackKind::Punch => "punch",
        AttackKind::Kick => "kick",
        AttackKind::Weapon(weapon) => weapon.name(),
    };
    log::debug!("{} deals {} damage", name, attack.damage);
    state.push_event(GameEvent::Attack(attack));
}

/// The 1 Hz environment tick: advance the day-night cycle by one second
pub fn coarse_tick(state: &mut SimulationState) {
    state
        .day_night
        .advance(&state.tuning.day_night, COARSE_TICK_SECS);
}

#[cfg(test)]
mod tests {
    use glam::{Vec2, Vec3};
    use proptest::prelude::*;

    use super::*;
    use crate::consts::SPAWN_Z;
    use crate::sim::combat::Weapon;
    use crate::sim::geometry::{Obstacle, ObstacleKind, intersects_any};
    use crate::sim::health::DamageOutcome;
    use crate::sim::look::LookBasis;
    use crate::sim::pickup::WorldPowerUp;
    use crate::sim::player::Surface;
    use crate::sim::world::World;
    use crate::tuning::Tuning;

    const DT: f32 = 1.0 / 60.0;

    fn bare_state() -> SimulationState {
        let tuning = Tuning::default();
        let world = World::empty(&tuning);
        SimulationState::with_world(0, tuning, world)
    }

    fn power_up(id: u32, kind: PowerUpKind, x: f32, z: f32) -> WorldPowerUp {
        WorldPowerUp {
            id,
            kind,
            position: Vec3::new(x, 1.0, z),
            collected: false,
        }
    }

    fn idle() -> FrameInput {
        FrameInput::default()
    }

    #[test]
    fn test_jump_and_land_scenario() {
        let mut state = bare_state();
        let eye = state.tuning.eye_height;

        step(
            &mut state,
            &FrameInput {
                jump: true,
                ..idle()
            },
            DT,
        );
        assert!(!state.player.on_ground);
        assert_eq!(state.player.vertical_velocity, state.tuning.jump_impulse);

        let mut frames = 0;
        while !state.player.on_ground {
            step(&mut state, &idle(), DT);
            frames += 1;
            assert!(frames < 600);
        }
        assert_eq!(state.player.position.y, eye);
        assert_eq!(state.player.air_jumps_used, 0);

        let events = state.drain_events();
        assert!(events.contains(&GameEvent::Jumped { air: false }));
        assert!(events.contains(&GameEvent::Landed {
            surface: Surface::Ground,
            height: 0.0
        }));
    }

    #[test]
    fn test_walk_off_platform_scenario() {
        let tuning = Tuning::default();
        let mut world = World::empty(&tuning);
        world.obstacles.push(Obstacle::grounded_box(
            1,
            ObstacleKind::Building,
            0.0,
            0.0,
            Vec3::new(4.0, 5.0, 4.0),
        ));
        let mut state = SimulationState::with_world(0, tuning, world);
        state.player.position.z = 0.0;
        state.player.settle(Surface::Platform { obstacle: 1 }, 5.0, &state.tuning);
        let top_eye = 5.0 + state.tuning.eye_height;

        let right = FrameInput {
            right: true,
            look: LookBasis::default(),
            ..idle()
        };
        let mut fell = false;
        for _ in 0..120 {
            let was_on_ground = state.player.on_ground;
            let y_before = state.player.position.y;
            step(&mut state, &right, DT);
            if was_on_ground && !state.player.on_ground {
                assert_eq!(y_before, top_eye);
                assert!(state.player.footprint(&state.tuning).min.x >= 2.0);
                fell = true;
                break;
            }
        }
        assert!(fell);
        assert!(state.drain_events().contains(&GameEvent::LeftSupport));
    }

    #[test]
    fn test_health_pickup_refills() {
        let mut state = bare_state();
        state.apply_damage(60);
        state.world.power_ups.push(power_up(9, PowerUpKind::Health, 0.0, SPAWN_Z));
        step(&mut state, &idle(), DT);
        assert_eq!(state.health.current(), 100);
        assert!(state.world.power_ups[0].collected);
    }

    #[test]
    fn test_invincibility_scenario() {
        let mut tuning = Tuning::default();
        tuning.invincibility_duration = 5.0;
        let world = World::empty(&tuning);
        let mut state = SimulationState::with_world(0, tuning, world);
        state
            .world
            .power_ups
            .push(power_up(1, PowerUpKind::Invincibility, 0.0, SPAWN_Z));

        step(&mut state, &idle(), 0.0);
        assert!(state.health.is_invincible(state.play_time));

        let play = |state: &mut SimulationState, frames: usize| {
            for _ in 0..frames {
                step(state, &idle(), 0.1);
                state.advance_play_time(0.1);
            }
        };

        // t = 2s
        play(&mut state, 20);
        assert_eq!(state.apply_damage(40), DamageOutcome::Absorbed);
        assert_eq!(state.health.current(), 100);

        // t = 6s
        play(&mut state, 40);
        state.apply_damage(40);
        assert_eq!(state.health.current(), 60);
    }

    #[test]
    fn test_one_pickup_per_frame() {
        let mut state = bare_state();
        state.world.power_ups.push(power_up(1, PowerUpKind::Gun1, 0.3, SPAWN_Z));
        state.world.power_ups.push(power_up(2, PowerUpKind::Sword, -0.3, SPAWN_Z));

        step(&mut state, &idle(), DT);
        assert_eq!(state.combat.equipped, Some(Weapon::Gun1));
        assert!(!state.world.power_ups[1].collected);

        step(&mut state, &idle(), DT);
        assert_eq!(state.combat.equipped, Some(Weapon::Sword));
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::WeaponEquipped {
            previous: Some(Weapon::Gun1),
            weapon: Weapon::Sword
        }));
    }

    #[test]
    fn test_attack_events_and_animation() {
        let mut state = bare_state();
        let attack = FrameInput {
            primary: true,
            ..idle()
        };
        step(&mut state, &attack, DT);
        assert!(state.combat.is_animating());
        // Dropped while animating
        step(&mut state, &attack, DT);
        let attacks = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::Attack(_)))
            .count();
        assert_eq!(attacks, 1);

        for _ in 0..20 {
            step(&mut state, &idle(), DT);
        }
        assert!(!state.combat.is_animating());
    }

    #[test]
    fn test_crouch_lowers_camera() {
        let mut state = bare_state();
        step(
            &mut state,
            &FrameInput {
                crouching: true,
                ..idle()
            },
            DT,
        );
        assert_eq!(state.player.position.y, state.tuning.crouch_eye_height);
    }

    #[test]
    fn test_coarse_tick_advances_day_night() {
        let mut state = bare_state();
        coarse_tick(&mut state);
        coarse_tick(&mut state);
        assert_eq!(state.day_night.current_time, 2.0);
    }

    #[test]
    fn test_frame_delta_is_clamped() {
        let mut state = bare_state();
        step(&mut state, &idle(), 5.0);
        assert!((state.clock - MAX_FRAME_DT as f64).abs() < 1e-9);
    }

    /// Random frame input for property tests
    fn arb_input() -> impl Strategy<Value = FrameInput> {
        (
            any::<[bool; 8]>(),
            0.0f32..std::f32::consts::TAU,
        )
            .prop_map(|(b, yaw)| FrameInput {
                forward: b[0],
                back: b[1],
                left: b[2],
                right: b[3],
                running: b[4],
                crouching: b[5],
                jump: b[6],
                primary: b[7],
                look: LookBasis::from_yaw(yaw),
                ..Default::default()
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn prop_frame_invariants(
            seed in 0u64..64,
            inputs in prop::collection::vec(arb_input(), 1..240),
            dt in 0.005f32..0.1,
        ) {
            let mut state = SimulationState::new(seed, Tuning::default());
            let limit = state.tuning.arena_limit();
            let max_air = state.tuning.max_air_jumps;
            let mut air_jumps_since_contact = 0;

            for input in &inputs {
                step(&mut state, input, dt);

                // Air-jump bound
                for event in state.drain_events() {
                    match event {
                        GameEvent::Jumped { air: true } => air_jumps_since_contact += 1,
                        GameEvent::Jumped { air: false } | GameEvent::Landed { .. } => air_jumps_since_contact = 0,
                        _ => {}
                    }
                }
                prop_assert!(air_jumps_since_contact <= max_air);

                let p = &state.player;

                // Ground invariant
                if p.on_ground {
                    prop_assert_eq!(p.vertical_velocity, 0.0);
                    prop_assert_eq!(p.position.y, p.last_surface_y + p.eye_height(&state.tuning));
                }
                prop_assert!(p.air_jumps_used <= max_air);

                // Collision containment
                prop_assert!(!intersects_any(&p.column(&state.tuning), &state.world.obstacles));

                // Arena containment
                prop_assert!(p.position.x.abs() <= limit);
                prop_assert!(p.position.z.abs() <= limit);
                prop_assert!(p.position.y >= 0.0);
            }
        }

        #[test]
        fn prop_speed_never_exceeds_terminal(
            yaw in 0.0f32..std::f32::consts::TAU,
            frames in 1usize..200,
            strafe in proptest::option::of(any::<bool>()),
            running in any::<bool>(),
        ) {
            let mut state = bare_state();
            let input = FrameInput {
                forward: true,
                right: strafe == Some(true),
                left: strafe == Some(false),
                running,
                look: LookBasis::from_yaw(yaw),
                ..Default::default()
            };
            let start = Vec2::new(state.player.position.x, state.player.position.z);
            for _ in 0..frames {
                step(&mut state, &input, DT);
            }
            let end = Vec2::new(state.player.position.x, state.player.position.z);
            let max_speed = state.tuning.base_speed * state.tuning.run_multiplier;
            prop_assert!(start.distance(end) <= max_speed * DT * frames as f32 + 1e-3);
        }
    }
}
