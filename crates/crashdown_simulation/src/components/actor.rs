//! Базовые компоненты акторов: Actor, Health, Facing, FrameFlags, ActorColliders

use bevy::prelude::*;

use crate::physics::ShapeId;

/// Актор (игрок или враг) - общий контракт для боевой системы
///
/// Позиция/поворот - в `Transform`, направление взгляда - в `Facing`.
/// Автоматически добавляет Facing и FrameFlags через Required Components.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(Facing, FrameFlags)]
pub struct Actor {
    /// Фракция: снаряды не бьют своих
    pub tribe: u64,
}

/// Здоровье актора
///
/// Инвариант: 0 ≤ current ≤ max
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    pub fn take_damage(&mut self, amount: f32) {
        self.current = (self.current - amount.max(0.0)).max(0.0);
    }

    pub fn heal(&mut self, amount: f32) {
        self.current = (self.current + amount.max(0.0)).min(self.max);
    }

    /// Для HUD (healthbar)
    pub fn ratio(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            self.current / self.max
        }
    }
}

/// Куда актор смотрит/идёт (горизонтальный unit vector)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Facing(pub Vec3);

impl Default for Facing {
    fn default() -> Self {
        Self(Vec3::NEG_Z)
    }
}

/// One-shot флаги текущего тика
///
/// Ставятся продюсерами в тике N, читаются в тике N, сбрасываются в конце тика.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct FrameFlags {
    pub damaged_this_frame: bool,
    pub fired_this_frame: bool,
}

impl FrameFlags {
    pub fn clear(&mut self) {
        self.damaged_this_frame = false;
        self.fired_this_frame = false;
    }
}

/// Collision shape актора
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct ColliderShape {
    pub id: ShapeId,
    pub radius: f32,
}

/// Коллайдеры актора (в домене Actors)
///
/// Появление компонента = actor-activated (регистрация в ActorRegistry),
/// удаление/despawn = actor-deactivated.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct ActorColliders {
    pub shapes: Vec<ColliderShape>,
}

impl ActorColliders {
    pub fn single(id: ShapeId, radius: f32) -> Self {
        Self {
            shapes: vec![ColliderShape { id, radius }],
        }
    }
}
