//! Enemy FSM: JustSpawned → WalkingAndFighting → Dying → IsDead
//!
//! Один проход по всем врагам за тик. IsDead → deferred despawn
//! (mark-and-sweep: соседние враги в этом проходе не пропускаются).

use bevy::prelude::*;
use std::collections::HashMap;
use std::f32::consts::FRAC_PI_2;

use super::find_nearest_player;
use crate::ai::{AiState, AiType, EnemyBrain, EnemyConfig};
use crate::combat::WeaponFiring;
use crate::components::{Facing, FrameFlags};
use crate::config::SimulationConfig;
use crate::physics::{step_axis_separated, GroundStep, SpatialQueries};
use crate::player::Player;
use crate::DeterministicRng;

/// Система: один тик FSM для каждого врага
pub fn update_enemies(
    time: Res<Time>,
    config: Res<SimulationConfig>,
    spatial: Res<SpatialQueries>,
    mut rng: ResMut<DeterministicRng>,
    mut firing: WeaponFiring,
    mut enemies: Query<
        (Entity, &mut Transform, &mut Facing, &mut EnemyBrain, &EnemyConfig, &mut FrameFlags),
        Without<Player>,
    >,
    players: Query<(Entity, &Transform, &Player), Without<EnemyBrain>>,
) {
    let delta = time.delta_secs();

    // Позиции на начало прохода (цели aggro: игроки и, реже, другие враги)
    let mut player_positions: Vec<(u32, Entity, Vec3)> = players
        .iter()
        .map(|(entity, transform, player)| (player.index, entity, transform.translation))
        .collect();
    player_positions.sort_by_key(|(index, entity, _)| (*index, entity.index()));

    let mut positions: HashMap<Entity, Vec3> = player_positions
        .iter()
        .map(|(_, entity, position)| (*entity, *position))
        .collect();
    positions.extend(enemies.iter().map(|(entity, transform, ..)| (entity, transform.translation)));

    let active_player_y = player_positions.first().map(|(_, _, position)| position.y);
    let aggro_candidates: Vec<(Entity, Vec3)> = player_positions
        .iter()
        .map(|(_, entity, position)| (*entity, *position))
        .collect();

    let mut order: Vec<Entity> = enemies.iter().map(|(entity, ..)| entity).collect();
    order.sort_by_key(|entity| entity.index());

    for entity in order {
        let Ok((_, mut transform, mut facing, mut brain, enemy, mut flags)) = enemies.get_mut(entity) else {
            continue;
        };

        if config.debug_ai {
            crate::logger::log(&format!("🤖 Enemy {:?} is in state {:?}", entity, brain.state));
        }

        // Остался на этаже выше после crashdown
        if active_player_y.is_some_and(|player_y| config.is_left_behind(transform.translation.y, player_y)) {
            brain.state = AiState::IsDead;
        }

        match brain.state {
            AiState::JustSpawned => {
                brain.aggro_target = brain.inherited_aggro.take();
                brain.state = AiState::WalkingAndFighting;
                brain.remaining_cooldown = rng.up_to(enemy.maximum_random_attack_delay);
            }
            AiState::WalkingAndFighting => {
                let target_position = brain.aggro_target.and_then(|target| positions.get(&target).copied());

                let Some(target_position) = target_position else {
                    // Нет цели (или цель despawned) → ищем ближайшего игрока
                    brain.aggro_target = find_nearest_player(
                        transform.translation,
                        enemy.aggro_radius,
                        &config,
                        aggro_candidates.iter().copied(),
                    );

                    let Some(target) = brain.aggro_target else {
                        continue;
                    };
                    if config.debug_ai {
                        crate::logger::log(&format!("👁️ Enemy {:?} aggroed on {:?}", entity, target));
                    }

                    // Союзники без цели получают её сразу (ещё до своего хода в этом проходе)
                    let allies = brain.friends_to_notify.clone();
                    for ally in allies {
                        if let Ok((_, _, _, mut ally_brain, _, _)) = enemies.get_mut(ally) {
                            if ally_brain.aggro_target.is_none() {
                                ally_brain.aggro_target = Some(target);
                            }
                        }
                    }
                    continue;
                };

                let motor_input = match enemy.ai_type {
                    AiType::InanimateObject | AiType::Stationary => Vec3::ZERO,
                    AiType::RunAtTheKnees => horizontal_direction(target_position - transform.translation),
                    AiType::OneTimeEnemySpawner => {
                        brain.state = AiState::Dying;
                        Vec3::ZERO
                    }
                    AiType::Unrecognized => {
                        crate::logger::log_warning(&format!(
                            "⚠️ Enemy {:?} has unrecognized AI type, skipping tick",
                            entity
                        ));
                        continue;
                    }
                };

                let to_target = horizontal_direction(target_position - transform.translation);
                if to_target != Vec3::ZERO {
                    facing.0 = to_target;
                }

                let mut movement = motor_input * enemy.move_speed * delta;
                if brain.is_enraged() {
                    let stagger_direction = Quat::from_rotation_y(FRAC_PI_2) * motor_input;
                    movement += stagger_direction * brain.stagger_amount * delta;
                }

                let step = GroundStep {
                    height: enemy.height,
                    ignores_terrain: enemy.ignores_terrain,
                };
                let moved = step_axis_separated(transform.translation, movement, step, &**spatial, |_| false);
                if config.debug_physics && moved != transform.translation + movement && movement != Vec3::ZERO {
                    crate::logger::log(&format!("🧱 Enemy {:?} slid/stopped at {:?}", entity, moved));
                }
                transform.translation = moved;
                transform.look_to(facing.0, Vec3::Y);

                let weapon = brain.current_weapon(enemy).cloned();
                match weapon {
                    Some(weapon) if brain.can_attack() => {
                        firing.fire(entity, &transform, &weapon);
                        flags.fired_this_frame = true;
                        brain.remaining_cooldown =
                            weapon.cooldown + rng.up_to(enemy.maximum_random_attack_delay);
                        brain.advance_to_next_attack(enemy.weapons_cycle.len());
                    }
                    _ => {
                        let mut cooldown_to_lose = delta;
                        if brain.is_enraged() {
                            cooldown_to_lose *= enemy.enrage_weapon_cooldown_multiplier;
                        }
                        brain.remaining_cooldown -= cooldown_to_lose;
                    }
                }

                brain.remaining_enrage -= delta;
            }
            AiState::Dying => {
                brain.time_dying += delta;
                if brain.time_dying >= enemy.death_time {
                    brain.state = AiState::IsDead;

                    for template in &enemy.spawn_on_death {
                        let offset = rng.in_unit_disc() * enemy.height;
                        let position = transform.translation + Vec3::new(offset.x, 0.0, offset.y);
                        let shape = firing.mint_shape();
                        let spawned = template.spawn(
                            firing.commands(),
                            shape,
                            position,
                            transform.rotation,
                            brain.aggro_target,
                        );
                        crate::logger::log(&format!(
                            "🥚 Enemy {:?} spawned {} ({:?}) on death",
                            entity, template.name, spawned
                        ));
                    }
                }
            }
            AiState::IsDead => {
                firing.commands().entity(entity).despawn();
                if config.debug_ai {
                    crate::logger::log(&format!("🗑️ Enemy {:?} despawned", entity));
                }
            }
        }
    }
}

fn horizontal_direction(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z).normalize_or_zero()
}
