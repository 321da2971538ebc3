//! Kinematic шаг для игроков и врагов
//!
//! Движение раздельно по осям (сначала X, потом Z): упёрлись в стену по
//! одной оси - продолжаем скользить по другой. Каждый шаг по оси отбрасывается,
//! если под новой точкой нет пола (не падаем с края).

use bevy::prelude::*;

use super::{CollisionDomain, SpatialQuery};

/// Параметры ground step для актора
#[derive(Debug, Clone, Copy)]
pub struct GroundStep {
    /// Высота актора (ground probe = height * 2, центр = пол + height / 2)
    pub height: f32,
    /// Летающие/призрачные враги не проверяют пол
    pub ignores_terrain: bool,
}

/// Сдвинуть позицию на `movement`, по осям X затем Z
///
/// `is_blocked(candidate)` - дополнительная проверка занятости точки
/// (например, игрок не проходит сквозь InanimateObject).
pub fn step_axis_separated(
    position: Vec3,
    movement: Vec3,
    step: GroundStep,
    spatial: &dyn SpatialQuery,
    mut is_blocked: impl FnMut(Vec3) -> bool,
) -> Vec3 {
    if movement.length_squared() <= 0.0 {
        return position;
    }

    let mut current = position;
    for axis_offset in [Vec3::new(movement.x, 0.0, 0.0), Vec3::new(0.0, 0.0, movement.z)] {
        let candidate = current + axis_offset;

        if is_blocked(candidate) {
            continue;
        }

        if step.ignores_terrain {
            current = candidate;
            continue;
        }

        if let Some(floor) = spatial.raycast_down(candidate, step.height * 2.0, CollisionDomain::Terrain) {
            current = floor.point + Vec3::Y * (step.height / 2.0);
        }
        // Нет пола → стоим на месте по этой оси
    }

    current
}

/// Сдвиг к цели не больше чем на `max_distance` (без перелёта)
pub fn move_towards(current: Vec3, target: Vec3, max_distance: f32) -> Vec3 {
    let to_target = target - current;
    let distance = to_target.length();
    if distance <= max_distance || distance <= f32::EPSILON {
        target
    } else {
        current + to_target / distance * max_distance
    }
}
