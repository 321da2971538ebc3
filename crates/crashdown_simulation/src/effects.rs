//! Cosmetic requests (ECS → движок)
//!
//! Fire-and-forget: симуляция не ждёт результата и не хранит handle эффекта.
//! Эффект, привязанный к entity (`follow`), движок удаляет по `Release`
//! или когда entity исчезает.

use bevy::prelude::*;
use serde::Deserialize;

/// Описание визуального эффекта (prefab + время жизни по умолчанию)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EffectDescriptor {
    pub name: String,
    #[serde(default = "EffectDescriptor::default_lifetime_secs")]
    pub default_lifetime: f32,
}

impl EffectDescriptor {
    pub fn new(name: impl Into<String>, default_lifetime: f32) -> Self {
        Self {
            name: name.into(),
            default_lifetime,
        }
    }

    fn default_lifetime_secs() -> f32 {
        1.0
    }
}

/// Event: запрос визуального эффекта
#[derive(Event, Debug, Clone)]
pub enum CosmeticEvent {
    /// Заспавнить эффект (опционально следовать за entity)
    Spawn {
        effect: EffectDescriptor,
        lifetime: f32,
        position: Vec3,
        rotation: Quat,
        follow: Option<Entity>,
    },

    /// Убрать эффекты, привязанные к entity (снаряд уничтожен)
    Release { owner: Entity },
}

impl CosmeticEvent {
    /// Эффект с его lifetime по умолчанию
    pub fn spawn(effect: &EffectDescriptor, position: Vec3, rotation: Quat, follow: Option<Entity>) -> Self {
        Self::Spawn {
            effect: effect.clone(),
            lifetime: effect.default_lifetime,
            position,
            rotation,
            follow,
        }
    }
}
