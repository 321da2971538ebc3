//! Projectile simulation: движение, swept collision, hit/reflect правила
//!
//! Порядок на каждый снаряд:
//! 1. lifetime/budget исчерпан → помечаем на удаление, не двигаем
//! 2. sweep радиусом weapon.radius вдоль forward на speed * dt (домен Actors)
//! 3. каждый shape в порядке результата: актор → урон, иначе отражатель → redirect
//! 4. сдвиг + lifetime -= dt
//!
//! Удаление (mark-and-sweep) - после полного прохода.

use bevy::prelude::*;

use crate::combat::{
    HitHistory, HitTarget, Projectile, ReflectionShape, ReflectorRegistry, TakeDamage,
};
use crate::components::Actor;
use crate::config::SimulationConfig;
use crate::effects::CosmeticEvent;
use crate::physics::{CollisionDomain, SpatialQueries};
use crate::player::PlayerController;
use crate::registry::ActorRegistry;

/// Снаряд, помеченный на удаление в этом тике
struct Expired {
    entity: Entity,
    projectile: Projectile,
    reflection: Option<ReflectionShape>,
}

/// Система: продвинуть все снаряды на один тик
pub fn advance_projectiles(
    time: Res<Time>,
    mut commands: Commands,
    mut projectiles: Query<(Entity, &mut Transform, &mut Projectile, Option<&ReflectionShape>), Without<Actor>>,
    actors: Query<(&Transform, &Actor, Option<&PlayerController>), Without<Projectile>>,
    actor_registry: Res<ActorRegistry>,
    mut reflectors: ResMut<ReflectorRegistry>,
    mut history: ResMut<HitHistory>,
    mut spatial: ResMut<SpatialQueries>,
    config: Res<SimulationConfig>,
    mut damage_events: EventWriter<TakeDamage>,
    mut cosmetics: EventWriter<CosmeticEvent>,
) {
    let delta = time.delta_secs();

    // Стабильный порядок обработки: по wave id, затем по entity
    let mut order: Vec<(u32, Entity)> = projectiles
        .iter()
        .map(|(entity, _, projectile, _)| (projectile.id.0, entity))
        .collect();
    order.sort_by_key(|(id, entity)| (*id, entity.index()));

    let tribe_of = |entity: Option<Entity>| entity.and_then(|e| actors.get(e).ok().map(|(_, actor, _)| actor.tribe));

    let mut expired = Vec::new();

    for (_, entity) in order {
        let Ok((_, mut transform, mut projectile, reflection)) = projectiles.get_mut(entity) else {
            continue;
        };

        if projectile.is_lifetime_over() {
            expired.push(Expired {
                entity,
                projectile: projectile.clone(),
                reflection: reflection.copied(),
            });
            continue;
        }

        let distance = projectile.speed() * delta;
        let forward = transform.forward().as_vec3();
        let own_shape = reflection.map(|r| r.shape);

        let hits = spatial.sweep_sphere(
            transform.translation,
            projectile.weapon.radius,
            forward,
            distance,
            CollisionDomain::Actors,
        );

        for shape in hits {
            if Some(shape) == own_shape {
                continue;
            }

            if let Some(actor_entity) = actor_registry.get(shape) {
                if projectile.remaining_hits == 0 {
                    continue;
                }

                let target = actors.get(actor_entity).ok().map(|(_, actor, controller)| HitTarget {
                    entity: actor_entity,
                    tribe: actor.tribe,
                    dodging: controller.is_some_and(|c| c.is_dodging()),
                });
                if projectile.can_hit_actor(target, &history) {
                    if config.debug_combat {
                        crate::logger::log(&format!(
                            "🎯 Projectile {:?} hit {:?} for {:.1}",
                            projectile.id, actor_entity, projectile.weapon.damage
                        ));
                    }

                    damage_events.write(TakeDamage {
                        target: actor_entity,
                        amount: projectile.weapon.damage,
                        attacker: projectile.owner.filter(|owner| actors.contains(*owner)),
                    });
                    projectile.add_hit_to_actor(actor_entity, &mut history);
                }
                continue;
            }

            let Some(reflector) = reflectors.get(shape) else {
                // Stale shape (актор/снаряд уже уничтожен)
                continue;
            };

            // Despawned отражатель/владелец = null
            let reflector = reflector.filter(|r| actors.contains(*r));
            let owner = projectile.owner.filter(|o| actors.contains(*o));

            let reflector_tribe = tribe_of(reflector);
            let reflects = match (reflector_tribe, projectile.owner_tribe) {
                (Some(reflector_tribe), Some(owner_tribe)) => reflector_tribe != owner_tribe,
                _ => true,
            };
            if !reflects {
                continue;
            }

            if let Some(owner_position) = owner.and_then(|o| actors.get(o).ok().map(|(t, _, _)| t.translation)) {
                projectile.redirect_towards(&mut transform, owner_position);
                if config.debug_combat {
                    crate::logger::log(&format!(
                        "🪞 Projectile {:?} reflected towards {:?}",
                        projectile.id, owner
                    ));
                }
            }
            if let Some(reflector) = reflector {
                projectile.transfer_ownership(reflector, reflector_tribe);
            }
        }

        // Heading мог смениться после отражения
        let forward = transform.forward().as_vec3();
        transform.translation += forward * distance;
        projectile.remaining_lifetime -= delta;
    }

    for Expired {
        entity,
        projectile,
        reflection,
    } in expired
    {
        history.discard(projectile.id);
        if let Some(reflection) = reflection {
            reflectors.unregister(reflection.shape);
            spatial.remove_shape(reflection.shape);
        }
        if projectile.weapon.projectile_locked_effect.is_some() {
            cosmetics.write(CosmeticEvent::Release { owner: entity });
        }
        commands.entity(entity).despawn();
    }
}
