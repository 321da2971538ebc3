//! Registries: collision shape → entity
//!
//! ActorRegistry - shape актора → Entity (O(1) lookup для sweep результатов).
//! InteractionRegistry - shape пикапа/кнопки → Entity.
//!
//! Регистрация через lifecycle компонентов:
//! - `Added<ActorColliders>` → actor-activated (insert)
//! - `RemovedComponents<ActorColliders>` → actor-deactivated (remove)
//!
//! Registries хранят только Entity (non-owning). Despawned entity просто
//! не резолвится через Query - stale shape игнорируется вызывающим кодом.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::combat::{advance_projectiles, ReflectionShape, ReflectorRegistry};
use crate::components::ActorColliders;
use crate::config::SimulationConfig;
use crate::physics::{CollisionDomain, ShapeId, SpatialQueries};
use crate::frame::TickSet;
use crate::player::InteractionShape;

/// Shape → actor entity (+ обратный индекс для deregistration)
#[derive(Resource, Debug, Default)]
pub struct ActorRegistry {
    by_shape: HashMap<ShapeId, Entity>,
    by_actor: HashMap<Entity, Vec<ShapeId>>,
}

impl ActorRegistry {
    pub fn register(&mut self, actor: Entity, shapes: impl IntoIterator<Item = ShapeId>) {
        let entry = self.by_actor.entry(actor).or_default();
        for shape in shapes {
            self.by_shape.insert(shape, actor);
            if !entry.contains(&shape) {
                entry.push(shape);
            }
        }
    }

    /// Убрать все shapes актора, вернуть их (для spatial cleanup)
    pub fn unregister(&mut self, actor: Entity) -> Vec<ShapeId> {
        let shapes = self.by_actor.remove(&actor).unwrap_or_default();
        for shape in &shapes {
            // Shape мог быть переназначен другому актору - не трогаем чужое
            if self.by_shape.get(shape) == Some(&actor) {
                self.by_shape.remove(shape);
            }
        }
        shapes
    }

    pub fn get(&self, shape: ShapeId) -> Option<Entity> {
        self.by_shape.get(&shape).copied()
    }

    pub fn contains(&self, shape: ShapeId) -> bool {
        self.by_shape.contains_key(&shape)
    }

    pub fn len(&self) -> usize {
        self.by_shape.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_shape.is_empty()
    }
}

/// Shape → interaction entity
#[derive(Resource, Debug, Default)]
pub struct InteractionRegistry {
    by_shape: HashMap<ShapeId, Entity>,
    by_entity: HashMap<Entity, ShapeId>,
}

impl InteractionRegistry {
    pub fn register(&mut self, entity: Entity, shape: ShapeId) {
        self.by_shape.insert(shape, entity);
        self.by_entity.insert(entity, shape);
    }

    pub fn unregister(&mut self, entity: Entity) -> Option<ShapeId> {
        let shape = self.by_entity.remove(&entity)?;
        self.by_shape.remove(&shape);
        Some(shape)
    }

    pub fn get(&self, shape: ShapeId) -> Option<Entity> {
        self.by_shape.get(&shape).copied()
    }
}

/// Система: регистрация shapes новых акторов
pub fn register_actor_shapes(
    new_actors: Query<(Entity, &ActorColliders), Added<ActorColliders>>,
    mut registry: ResMut<ActorRegistry>,
    config: Res<SimulationConfig>,
) {
    for (entity, colliders) in new_actors.iter() {
        registry.register(entity, colliders.shapes.iter().map(|shape| shape.id));
        if config.debug_ai {
            crate::logger::log(&format!(
                "📇 Actor {:?} activated ({} shapes)",
                entity,
                colliders.shapes.len()
            ));
        }
    }
}

/// Система: deregistration despawned акторов + очистка spatial
pub fn unregister_actor_shapes(
    mut removed: RemovedComponents<ActorColliders>,
    mut registry: ResMut<ActorRegistry>,
    mut spatial: ResMut<SpatialQueries>,
) {
    for entity in removed.read() {
        for shape in registry.unregister(entity) {
            spatial.remove_shape(shape);
        }
    }
}

/// Система: регистрация interaction shapes
pub fn register_interaction_shapes(
    new_interactions: Query<(Entity, &InteractionShape), Added<InteractionShape>>,
    mut registry: ResMut<InteractionRegistry>,
) {
    for (entity, shape) in new_interactions.iter() {
        registry.register(entity, shape.0.id);
    }
}

pub fn unregister_interaction_shapes(
    mut removed: RemovedComponents<InteractionShape>,
    mut registry: ResMut<InteractionRegistry>,
    mut spatial: ResMut<SpatialQueries>,
) {
    for entity in removed.read() {
        if let Some(shape) = registry.unregister(entity) {
            spatial.remove_shape(shape);
        }
    }
}

/// Система: публикуем позиции всех shapes в spatial сервис
///
/// Акторы и отражатели - домен Actors, пикапы - Interactions.
/// Отражающий shape без записи в ReflectorRegistry (снаряд уже уничтожен
/// в этом тике) не публикуем.
pub fn sync_collision_shapes(
    actors: Query<(&Transform, &ActorColliders)>,
    reflectors: Query<(&Transform, &ReflectionShape)>,
    interactions: Query<(&Transform, &InteractionShape)>,
    reflector_registry: Res<ReflectorRegistry>,
    mut spatial: ResMut<SpatialQueries>,
) {
    for (transform, colliders) in actors.iter() {
        for shape in &colliders.shapes {
            spatial.sync_shape(shape.id, transform.translation, shape.radius, CollisionDomain::Actors);
        }
    }

    for (transform, reflection) in reflectors.iter() {
        if reflector_registry.contains(reflection.shape) {
            spatial.sync_shape(reflection.shape, transform.translation, reflection.radius, CollisionDomain::Actors);
        }
    }

    for (transform, shape) in interactions.iter() {
        spatial.sync_shape(shape.0.id, transform.translation, shape.0.radius, CollisionDomain::Interactions);
    }
}

/// Registry Plugin
///
/// Lifecycle shapes в начале тика + повторная публикация позиций перед
/// снарядами (игроки и враги уже сдвинулись, новые отражатели появились).
pub struct RegistryPlugin;

impl Plugin for RegistryPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ActorRegistry>()
            .init_resource::<InteractionRegistry>();

        app.add_systems(
            FixedUpdate,
            (
                register_actor_shapes,
                unregister_actor_shapes,
                register_interaction_shapes,
                unregister_interaction_shapes,
                sync_collision_shapes,
            )
                .chain()
                .in_set(TickSet::Registry),
        );

        app.add_systems(
            FixedUpdate,
            sync_collision_shapes
                .in_set(TickSet::Projectiles)
                .before(advance_projectiles),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ActorRegistry::default();
        let actor = Entity::from_raw(5);
        registry.register(actor, [ShapeId(1), ShapeId(2)]);

        assert_eq!(registry.get(ShapeId(1)), Some(actor));
        assert_eq!(registry.get(ShapeId(2)), Some(actor));
        assert_eq!(registry.len(), 2);

        let removed = registry.unregister(actor);
        assert_eq!(removed, vec![ShapeId(1), ShapeId(2)]);
        assert!(registry.get(ShapeId(1)).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unregister_keeps_reassigned_shape() {
        let mut registry = ActorRegistry::default();
        let old = Entity::from_raw(1);
        let new = Entity::from_raw(2);
        registry.register(old, [ShapeId(10)]);
        registry.register(new, [ShapeId(10)]);

        registry.unregister(old);
        assert_eq!(registry.get(ShapeId(10)), Some(new));
    }

    #[test]
    fn test_unknown_actor_unregister_is_noop() {
        let mut registry = ActorRegistry::default();
        assert!(registry.unregister(Entity::from_raw(42)).is_empty());
    }
}
