//! Глобальные параметры симуляции (resources)
//!
//! - SimulationConfig: геометрия этажей, тайминги crashdown, debug-флаги
//! - CameraBasis: оси камеры для перевода input в world space

use bevy::prelude::*;
use serde::Deserialize;

/// Параметры симуляции (загружаются из JSON или Default)
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Ожидаемая высота между этажами уровня (метры)
    pub floor_spacing: f32,
    /// Допуск по Y для "того же этажа" при поиске aggro цели
    pub same_floor_tolerance: f32,
    /// Crashdown: на сколько игрок взлетает в первой фазе
    pub crashdown_rise: f32,
    /// Crashdown: длительность фазы подъёма (секунды)
    pub crashdown_rise_duration: f32,
    /// Crashdown: полная длительность (подъём + падение)
    pub crashdown_total_duration: f32,
    /// Пропускаем первые N кадров в SessionStats (лаги инициализации)
    pub untimed_startup_frames: u32,
    pub debug_ai: bool,
    pub debug_combat: bool,
    pub debug_physics: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            floor_spacing: 30.0,
            same_floor_tolerance: 1.0,
            crashdown_rise: 20.0,
            crashdown_rise_duration: 1.0,
            crashdown_total_duration: 1.5,
            untimed_startup_frames: 2,
            debug_ai: false,
            debug_combat: false,
            debug_physics: false,
        }
    }
}

impl SimulationConfig {
    /// Enemy выше игрока больше чем на пол-этажа - остался на старом уровне
    pub fn is_left_behind(&self, enemy_y: f32, player_y: f32) -> bool {
        enemy_y - player_y > self.floor_spacing / 2.0
    }

    pub fn is_same_floor(&self, a_y: f32, b_y: f32) -> bool {
        (a_y - b_y).abs() <= self.same_floor_tolerance
    }
}

/// Оси камеры (top-down), уже "сплющенные" в горизонтальную плоскость
///
/// Input layer присылает 2D вектор: x → right, y → up экрана.
#[derive(Resource, Debug, Clone, Copy)]
pub struct CameraBasis {
    pub right: Vec3,
    pub up: Vec3,
}

impl Default for CameraBasis {
    fn default() -> Self {
        // Камера смотрит сверху вниз, верх экрана = forward (-Z)
        Self {
            right: Vec3::X,
            up: Vec3::NEG_Z,
        }
    }
}

impl CameraBasis {
    /// Построить basis из реальных осей камеры (убираем Y, нормализуем)
    pub fn from_camera_axes(right: Vec3, up: Vec3) -> Self {
        let flatten = |v: Vec3| Vec3::new(v.x, 0.0, v.z).normalize_or_zero();
        Self {
            right: flatten(right),
            up: flatten(up),
        }
    }

    /// 2D input → world space (диагональ не быстрее прямого движения)
    pub fn to_world(&self, input: Vec2) -> Vec3 {
        let input = if input.length_squared() > 1.0 {
            input.normalize()
        } else {
            input
        };
        self.right * input.x + self.up * input.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_rules() {
        let config = SimulationConfig::default();
        assert!(config.is_left_behind(16.0, 0.0));
        assert!(!config.is_left_behind(15.0, 0.0));
        assert!(config.is_same_floor(0.5, 0.0));
        assert!(!config.is_same_floor(1.5, 0.0));
    }

    #[test]
    fn test_camera_basis_clamps_diagonal() {
        let basis = CameraBasis::default();
        let world = basis.to_world(Vec2::new(1.0, 1.0));
        assert!((world.length() - 1.0).abs() < 1e-5);

        let tilted = CameraBasis::from_camera_axes(Vec3::X, Vec3::new(0.0, 0.7, -0.7));
        assert!((tilted.up - Vec3::NEG_Z).length() < 1e-5);
    }
}
