//! SphereWorld - аналитический spatial backend
//!
//! Полы: горизонтальные прямоугольники (XZ) на фиксированной высоте.
//! Акторы/interactions/отражатели: сферы, позиции публикует ECS.
//! Достаточно для headless прогонов и тестов (без physics engine).

use bevy::prelude::*;
use std::collections::HashMap;

use super::{CollisionDomain, GroundHit, ShapeId, SpatialQuery};

/// Горизонтальный прямоугольник пола
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloorRect {
    pub height: f32,
    pub min: Vec2,
    pub max: Vec2,
}

impl FloorRect {
    pub fn new(height: f32, min: Vec2, max: Vec2) -> Self {
        Self { height, min, max }
    }

    /// Квадрат с центром в (0, 0)
    pub fn centered(height: f32, half_extent: f32) -> Self {
        Self::new(height, Vec2::splat(-half_extent), Vec2::splat(half_extent))
    }

    fn contains_xz(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.z >= self.min.y && point.z <= self.max.y
    }
}

#[derive(Debug, Clone, Copy)]
struct SphereShape {
    center: Vec3,
    radius: f32,
    domain: CollisionDomain,
}

#[derive(Debug, Default)]
pub struct SphereWorld {
    floors: Vec<FloorRect>,
    shapes: HashMap<ShapeId, SphereShape>,
}

impl SphereWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_floor(mut self, floor: FloorRect) -> Self {
        self.floors.push(floor);
        self
    }

    pub fn add_floor(&mut self, floor: FloorRect) {
        self.floors.push(floor);
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }
}

/// Параметр t ∈ [0, 1] ближайшей точки отрезка к center + расстояние до неё
#[inline]
fn segment_closest(p0: Vec3, p1: Vec3, center: Vec3) -> (f32, f32) {
    let d = p1 - p0;
    let a = d.dot(d);
    if a <= 1e-6 {
        return (0.0, (p0 - center).length());
    }
    let t = (-(p0 - center).dot(d) / a).clamp(0.0, 1.0);
    let closest = p0 + d * t;
    (t, (closest - center).length())
}

impl SpatialQuery for SphereWorld {
    fn raycast_down(&self, origin: Vec3, max_distance: f32, domain: CollisionDomain) -> Option<GroundHit> {
        if domain != CollisionDomain::Terrain {
            return None;
        }

        // Самый высокий пол под точкой в пределах длины луча
        self.floors
            .iter()
            .filter(|floor| floor.contains_xz(origin))
            .filter(|floor| floor.height <= origin.y && origin.y - floor.height <= max_distance)
            .max_by(|a, b| a.height.total_cmp(&b.height))
            .map(|floor| GroundHit {
                point: Vec3::new(origin.x, floor.height, origin.z),
                normal: Vec3::Y,
            })
    }

    fn sweep_sphere(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        distance: f32,
        domain: CollisionDomain,
    ) -> Vec<ShapeId> {
        let end = origin + direction.normalize_or_zero() * distance;

        let mut hits: Vec<(f32, ShapeId)> = self
            .shapes
            .iter()
            .filter(|(_, shape)| shape.domain == domain)
            .filter_map(|(id, shape)| {
                let (t, gap) = segment_closest(origin, end, shape.center);
                (gap <= radius + shape.radius).then_some((t, *id))
            })
            .collect();

        // Порядок: по ходу движения, при равенстве - по id (детерминизм)
        hits.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        hits.into_iter().map(|(_, id)| id).collect()
    }

    fn overlap_sphere(&self, center: Vec3, radius: f32, domain: CollisionDomain) -> Vec<ShapeId> {
        let mut hits: Vec<ShapeId> = self
            .shapes
            .iter()
            .filter(|(_, shape)| shape.domain == domain)
            .filter(|(_, shape)| shape.center.distance(center) <= radius + shape.radius)
            .map(|(id, _)| *id)
            .collect();
        hits.sort();
        hits
    }

    fn sync_shape(&mut self, shape: ShapeId, center: Vec3, radius: f32, domain: CollisionDomain) {
        self.shapes.insert(shape, SphereShape { center, radius, domain });
    }

    fn remove_shape(&mut self, shape: ShapeId) {
        self.shapes.remove(&shape);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raycast_picks_highest_floor_in_range() {
        let world = SphereWorld::new()
            .with_floor(FloorRect::centered(0.0, 10.0))
            .with_floor(FloorRect::centered(-30.0, 10.0));

        let hit = world.raycast_down(Vec3::new(1.0, 0.5, 1.0), 2.0, CollisionDomain::Terrain);
        assert_eq!(hit.map(|h| h.point.y), Some(0.0));

        // Пол ниже дальности луча не считается
        let miss = world.raycast_down(Vec3::new(1.0, -2.0, 1.0), 2.0, CollisionDomain::Terrain);
        assert!(miss.is_none());

        // За краем пола
        let edge = world.raycast_down(Vec3::new(11.0, 0.5, 0.0), 2.0, CollisionDomain::Terrain);
        assert!(edge.is_none());
    }

    #[test]
    fn test_sweep_orders_along_direction() {
        let mut world = SphereWorld::new();
        world.sync_shape(ShapeId(7), Vec3::new(0.0, 0.0, -5.0), 0.5, CollisionDomain::Actors);
        world.sync_shape(ShapeId(3), Vec3::new(0.0, 0.0, -2.0), 0.5, CollisionDomain::Actors);
        world.sync_shape(ShapeId(9), Vec3::new(0.0, 0.0, -3.0), 0.5, CollisionDomain::Interactions);

        let hits = world.sweep_sphere(Vec3::ZERO, 0.2, Vec3::NEG_Z, 10.0, CollisionDomain::Actors);
        assert_eq!(hits, vec![ShapeId(3), ShapeId(7)]);

        let short = world.sweep_sphere(Vec3::ZERO, 0.2, Vec3::NEG_Z, 1.0, CollisionDomain::Actors);
        assert!(short.is_empty());
    }

    #[test]
    fn test_remove_shape() {
        let mut world = SphereWorld::new();
        world.sync_shape(ShapeId(1), Vec3::ZERO, 1.0, CollisionDomain::Actors);
        assert_eq!(world.overlap_sphere(Vec3::X, 0.5, CollisionDomain::Actors), vec![ShapeId(1)]);

        world.remove_shape(ShapeId(1));
        assert!(world.overlap_sphere(Vec3::X, 0.5, CollisionDomain::Actors).is_empty());
        assert_eq!(world.shape_count(), 0);
    }
}
