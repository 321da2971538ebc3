//! Spatial queries module
//!
//! Физика - внешний сервис (tactical layer движка). ECS видит только узкий
//! интерфейс `SpatialQuery`:
//! - raycast_down: ground probe (есть ли пол под точкой)
//! - sweep_sphere: swept sphere вдоль направления → упорядоченный список shapes
//! - overlap_sphere: какие shapes пересекают сферу
//!
//! Все запросы ограничены `CollisionDomain` (terrain / actors / interactions).
//! Движущиеся shapes (акторы, отражающие снаряды) ECS публикует через
//! `sync_shape` / `remove_shape` каждый тик.
//!
//! Для headless режима и тестов есть `SphereWorld` (плоские полы + сферы).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

pub mod movement;
pub mod sphere_world;

pub use movement::{move_towards, step_axis_separated, GroundStep};
pub use sphere_world::{FloorRect, SphereWorld};

/// Идентификатор collision shape (выдаётся `ShapeIdAllocator` или движком)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect, Serialize, Deserialize)]
pub struct ShapeId(pub u64);

/// Collision domain (аналог physics layer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum CollisionDomain {
    Terrain,
    Actors,
    Interactions,
}

/// Результат ground probe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundHit {
    pub point: Vec3,
    pub normal: Vec3,
}

/// Внешний spatial сервис (physics engine)
///
/// Результаты `sweep_sphere` упорядочены так, как их вернул движок -
/// симуляция обрабатывает их строго в этом порядке.
pub trait SpatialQuery: Send + Sync {
    /// Луч вниз из `origin` длиной `max_distance`
    fn raycast_down(&self, origin: Vec3, max_distance: f32, domain: CollisionDomain) -> Option<GroundHit>;

    /// Swept sphere: `origin` → `origin + direction * distance`
    fn sweep_sphere(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        distance: f32,
        domain: CollisionDomain,
    ) -> Vec<ShapeId>;

    /// Все shapes, пересекающие сферу
    fn overlap_sphere(&self, center: Vec3, radius: f32, domain: CollisionDomain) -> Vec<ShapeId>;

    /// Обновить положение shape (движок с собственными коллайдерами может игнорировать)
    fn sync_shape(&mut self, _shape: ShapeId, _center: Vec3, _radius: f32, _domain: CollisionDomain) {}

    /// Shape больше не существует
    fn remove_shape(&mut self, _shape: ShapeId) {}
}

/// Resource: активный spatial сервис
#[derive(Resource)]
pub struct SpatialQueries(pub Box<dyn SpatialQuery>);

impl Default for SpatialQueries {
    fn default() -> Self {
        Self(Box::new(SphereWorld::default()))
    }
}

impl SpatialQueries {
    pub fn new(query: impl SpatialQuery + 'static) -> Self {
        Self(Box::new(query))
    }
}

impl std::ops::Deref for SpatialQueries {
    type Target = dyn SpatialQuery;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl std::ops::DerefMut for SpatialQueries {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.0.as_mut()
    }
}

/// Resource: выдача уникальных ShapeId для shapes, которые создаёт сама симуляция
#[derive(Resource, Debug)]
pub struct ShapeIdAllocator {
    next: u64,
}

impl Default for ShapeIdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl ShapeIdAllocator {
    pub fn mint(&mut self) -> ShapeId {
        let id = ShapeId(self.next);
        self.next += 1;
        id
    }
}
