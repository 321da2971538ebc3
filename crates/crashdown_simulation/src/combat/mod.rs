//! Combat module: оружие, снаряды, урон
//!
//! - WeaponDefinition: immutable данные залпа (shared через Arc)
//! - WeaponFiring: протокол выстрела (веер снарядов + cosmetics)
//! - Projectile simulation: sweep → hit/reflect → move → expire
//! - TakeDamage: единый контракт урона (снаряды и hazards)
//!
//! Коллизии - внешний spatial сервис (`SpatialQueries`), ECS владеет
//! только правилами боя.

use bevy::prelude::*;

pub mod damage;
pub mod firing;
pub mod projectile;
pub mod systems;
pub mod weapon;


// Re-export основных типов
pub use damage::{apply_damage, EnemyDied, TakeDamage};
pub use firing::{volley_transforms, WeaponFired, WeaponFiring};
pub use projectile::{
    HitHistory, HitTarget, Projectile, ProjectileCounter, ProjectileId, ReflectionShape, ReflectorRegistry,
};
pub use systems::advance_projectiles;
pub use weapon::WeaponDefinition;

use crate::frame::TickSet;

/// Combat Plugin
///
/// Регистрирует shared state (счётчик волн, hit history, отражатели)
/// и projectile pass в `TickSet::Projectiles`.
///
/// Порядок выполнения:
/// 1. advance_projectiles - sweep, hit/reflect, движение, удаление
/// 2. apply_damage - TakeDamage events этого тика (в порядке записи)
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ProjectileCounter>()
            .init_resource::<HitHistory>()
            .init_resource::<ReflectorRegistry>();

        app.add_event::<TakeDamage>()
            .add_event::<EnemyDied>()
            .add_event::<WeaponFired>();

        app.add_systems(
            FixedUpdate,
            (advance_projectiles, apply_damage)
                .chain()
                .in_set(TickSet::Projectiles),
        );
    }
}
