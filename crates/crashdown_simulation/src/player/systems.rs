//! Player controller: движение, прицел, атака, dodge, crashdown, interactions, реген
//!
//! Порядок внутри тика для каждого живого игрока (по Player::index):
//! movement → dodge refresh → axis-separated шаг → aim → attack → dodge →
//! crashdown → interactions → regen.

use bevy::prelude::*;

use crate::ai::{AiType, EnemyBrain, EnemyConfig};
use crate::combat::WeaponFiring;
use crate::components::{Facing, FrameFlags, Health};
use crate::config::{CameraBasis, SimulationConfig};
use crate::effects::CosmeticEvent;
use crate::frame::SessionStats;
use crate::physics::{move_towards, step_axis_separated, CollisionDomain, GroundStep, SpatialQueries};
use crate::player::{
    CrashdownFailed, CrashdownFlight, CrashdownLanded, InteractionKind, InteractionUsed, Player, PlayerController,
    PlayerInput, PlayerInteraction, Toggled,
};
use crate::registry::{ActorRegistry, InteractionRegistry};

/// Lifetime эффекта приземления (секунды)
const CRASHDOWN_LANDING_EFFECT_LIFETIME: f32 = 2.0;

/// Regen заблокирован, пока игрок держит crashdown key
const CRASHDOWN_KEY_REGEN_DELAY: f32 = 1.0;

type PlayerItem<'a> = (
    Entity,
    &'a Player,
    &'a mut Transform,
    &'a mut Facing,
    &'a mut Health,
    &'a mut PlayerController,
    &'a PlayerInput,
    &'a mut FrameFlags,
);

/// Система: один тик для всех игроков
#[allow(clippy::too_many_arguments)]
pub fn update_players(
    time: Res<Time>,
    (config, camera): (Res<SimulationConfig>, Res<CameraBasis>),
    spatial: Res<SpatialQueries>,
    (actor_registry, interaction_registry): (Res<ActorRegistry>, Res<InteractionRegistry>),
    mut firing: WeaponFiring,
    mut players: Query<PlayerItem, Without<EnemyBrain>>,
    enemy_configs: Query<&EnemyConfig>,
    (mut interactions, mut toggles): (Query<&mut PlayerInteraction>, Query<&mut Toggled>),
    mut stats: ResMut<SessionStats>,
    (mut landed, mut failed, mut used): (
        EventWriter<CrashdownLanded>,
        EventWriter<CrashdownFailed>,
        EventWriter<InteractionUsed>,
    ),
) {
    let delta = time.delta_secs();

    let mut order: Vec<(u32, Entity)> = players
        .iter()
        .map(|(entity, player, ..)| (player.index, entity))
        .collect();
    order.sort_by_key(|(index, entity)| (*index, entity.index()));

    let mut any_alive = false;
    let mut consumed: Vec<Entity> = Vec::new();

    for (_, entity) in order.iter().copied() {
        let Ok((_, _, mut transform, mut facing, mut health, mut controller, input, mut flags)) =
            players.get_mut(entity)
        else {
            continue;
        };

        if !health.is_alive() {
            continue;
        }
        any_alive = true;

        let height = controller.tuning.height;

        // Movement input
        let movement = if controller.is_crashing_down() {
            Vec3::ZERO
        } else if !controller.is_dodging() {
            let world_input = camera.to_world(input.movement);
            if world_input != Vec3::ZERO {
                facing.0 = world_input.normalize();
            }
            world_input * controller.tuning.max_speed * delta
        } else {
            facing.0 * controller.tuning.dodge_speed * delta
        };

        // Dodge refresh: таймер пересёк -refresh_duration
        let previous_dodge_time = controller.remaining_dodge_time;
        controller.remaining_dodge_time -= delta;
        let refresh_threshold = -controller.tuning.dodge_refresh_duration;
        if previous_dodge_time >= refresh_threshold && controller.remaining_dodge_time < refresh_threshold {
            controller.remaining_dodges = controller.maximum_dodges;
            if controller.remaining_dodges > 0 {
                if let Some(effect) = &controller.tuning.dodge_refresh_effect {
                    firing.cosmetic(CosmeticEvent::spawn(effect, transform.translation, Quat::IDENTITY, Some(entity)));
                }
            }
        }

        // Шаг по осям; InanimateObject враги блокируют
        let is_blocked = |candidate: Vec3| {
            spatial
                .overlap_sphere(candidate, height / 2.0, CollisionDomain::Actors)
                .into_iter()
                .filter_map(|shape| actor_registry.get(shape))
                .any(|actor| {
                    enemy_configs
                        .get(actor)
                        .is_ok_and(|enemy| enemy.ai_type == AiType::InanimateObject)
                })
        };
        let step = GroundStep {
            height,
            ignores_terrain: false,
        };
        let moved = step_axis_separated(transform.translation, movement, step, &**spatial, is_blocked);
        if config.debug_physics && movement != Vec3::ZERO && moved == transform.translation {
            crate::logger::log(&format!("🧱 Player {:?} is blocked at {:?}", entity, moved));
        }
        transform.translation = moved;

        // Aim: точка прицела на плоскости игрока, иначе facing
        let aim = input
            .aim_point
            .map(|point| Vec3::new(point.x - moved.x, 0.0, point.z - moved.z).normalize_or_zero())
            .filter(|direction| *direction != Vec3::ZERO)
            .unwrap_or(facing.0);
        controller.aiming = aim;
        if aim != Vec3::ZERO {
            transform.look_to(aim, Vec3::Y);
        }

        // Attack
        match controller.weapon.clone() {
            Some(weapon) if controller.remaining_weapon_cooldown <= 0.0 && input.attack_pressed => {
                firing.fire(entity, &transform, &weapon);
                flags.fired_this_frame = true;
                controller.remaining_weapon_cooldown = weapon.cooldown;
            }
            _ => {
                controller.remaining_weapon_cooldown -= delta;
            }
        }

        // Dodge
        if input.dodge_pressed && !controller.is_dodging() && controller.remaining_dodges > 0 {
            controller.remaining_dodge_time = controller.tuning.dodge_duration;
            controller.remaining_dodges -= 1;
            if let Some(effect) = &controller.tuning.dodge_effect {
                firing.cosmetic(CosmeticEvent::spawn(effect, transform.translation, transform.rotation, None));
            }
        }

        // Crashdown
        if let Some(mut flight) = controller.crashdown {
            if flight.elapsed <= config.crashdown_total_duration {
                flight.elapsed += delta;
                if flight.elapsed < config.crashdown_rise_duration {
                    transform.translation +=
                        Vec3::Y * delta * config.crashdown_rise / config.crashdown_rise_duration.max(f32::EPSILON);
                } else {
                    let fall_duration =
                        (config.crashdown_total_duration - config.crashdown_rise_duration).max(f32::EPSILON);
                    let speed = (config.floor_spacing + config.crashdown_rise) / fall_duration;
                    transform.translation = move_towards(transform.translation, flight.target, speed * delta);
                }
                controller.crashdown = Some(flight);
            } else {
                transform.translation = flight.target + Vec3::Y * height / 2.0;
                controller.crashdown = None;

                let smash = controller.crashdown_smash.clone();
                firing.fire(entity, &transform, &smash);
                if let Some(effect) = &controller.tuning.crashdown_landing_effect {
                    firing.cosmetic(CosmeticEvent::Spawn {
                        effect: effect.clone(),
                        lifetime: CRASHDOWN_LANDING_EFFECT_LIFETIME,
                        position: transform.translation,
                        rotation: Quat::IDENTITY,
                        follow: None,
                    });
                }
                landed.write(CrashdownLanded {
                    player: entity,
                    position: transform.translation,
                });
                crate::logger::log_info(&format!(
                    "💥 Player {:?} crashed down at {:?}",
                    entity, transform.translation
                ));
            }
        } else if controller.has_crashdown_key {
            if input.special_pressed {
                let origin = transform.translation + Vec3::NEG_Y * height * 2.0;
                match spatial.raycast_down(origin, config.floor_spacing * 1.5, CollisionDomain::Terrain) {
                    Some(hit) => {
                        controller.crashdown = Some(CrashdownFlight {
                            target: hit.point,
                            elapsed: 0.0,
                        });
                        controller.has_crashdown_key = false;
                        facing.0 = Vec3::Z;
                        crate::logger::log_info(&format!(
                            "🚀 Player {:?} started crashdown towards {:?}",
                            entity, hit.point
                        ));
                    }
                    None => {
                        failed.write(CrashdownFailed { player: entity });
                        crate::logger::log(&format!("🚫 Player {:?} has no floor below to crash into", entity));
                    }
                }
            }

            // Ключ медленно "жжёт" здоровье, пока им не воспользуются
            let drain = controller.tuning.crashdown_health_drain_per_second * delta;
            health.take_damage(drain);
            controller.health_regen_delay = CRASHDOWN_KEY_REGEN_DELAY;
        }

        // Interactions: обрабатываем только первую; секретные зоны - все
        let overlaps = spatial.overlap_sphere(transform.translation, height / 2.0, CollisionDomain::Interactions);
        let mut handled_interaction = false;
        for shape in overlaps {
            let Some(interaction_entity) = interaction_registry.get(shape) else {
                continue;
            };
            if consumed.contains(&interaction_entity) {
                continue;
            }
            let Ok(mut interaction) = interactions.get_mut(interaction_entity) else {
                continue;
            };

            if interaction.kind == InteractionKind::SecretArea {
                if stats.secret_areas_found.insert(interaction_entity) {
                    crate::logger::log_info(&format!("🗝️ Secret area {:?} found", interaction_entity));
                }
                continue;
            }

            if handled_interaction {
                continue;
            }
            handled_interaction = true;
            interaction.player_near_this_frame = true;

            if !input.interact_pressed {
                continue;
            }

            let kind = interaction.kind.clone();
            match &kind {
                InteractionKind::HealthPowerUp => {
                    health.max *= controller.tuning.health_boost_multiplier;
                    health.current = health.max;
                }
                InteractionKind::WeaponPickup(weapon) => {
                    controller.weapon = Some(weapon.clone());
                    stats.final_weapon_used = Some(weapon.name.clone());
                }
                InteractionKind::DodgePowerUp => {
                    controller.maximum_dodges += 1;
                    controller.remaining_dodges = controller.maximum_dodges;
                }
                InteractionKind::CrashdownKey => {
                    controller.has_crashdown_key = true;
                    health.current = health.max;
                }
                InteractionKind::ToggleSomething { targets, cooldown } => {
                    if interaction.remaining_cooldown <= 0.0 {
                        interaction.remaining_cooldown = *cooldown;
                        for target in targets {
                            if let Ok(mut toggled) = toggles.get_mut(*target) {
                                toggled.active = !toggled.active;
                            }
                        }
                    }
                }
                InteractionKind::Nothing | InteractionKind::SecretArea => {}
            }

            if interaction.remove_after_activation {
                consumed.push(interaction_entity);
                firing.commands().entity(interaction_entity).despawn();
            } else {
                interaction.interacted_this_frame = true;
            }

            used.write(InteractionUsed {
                player: entity,
                interaction: interaction_entity,
                kind: kind.name(),
            });
            crate::logger::log_info(&format!(
                "✋ Player {:?} used {} ({:?})",
                entity,
                kind.name(),
                interaction_entity
            ));
        }

        // Health regen
        if controller.health_regen_delay <= 0.0 {
            if health.current < health.max && controller.tuning.full_regen_wait > 0.0 {
                let regen = health.max / controller.tuning.full_regen_wait * delta;
                if config.debug_combat {
                    crate::logger::log(&format!("💚 Player {:?} regenerates {:.2}", entity, regen));
                }
                health.heal(regen);
            }
        } else {
            controller.health_regen_delay -= delta;
        }
    }

    let all_dead = !order.is_empty() && !any_alive;
    if all_dead && !stats.all_players_dead {
        crate::logger::log_warning("☠️ All players are dead");
    }
    stats.all_players_dead = all_dead;
}
