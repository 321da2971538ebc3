//! Enemy AI module
//!
//! FSM на врага: JustSpawned → WalkingAndFighting → Dying → IsDead.
//! Aggro на ближайшего игрока того же этажа, движение со скольжением вдоль
//! стен, цикл оружия, enrage/stagger, цепочки death-spawn.

use bevy::prelude::*;

pub mod components;
pub mod systems;

// Re-export основных типов
pub use components::{AiState, AiType, EnemyBrain, EnemyConfig, EnemyTemplate};
pub use systems::{find_nearest_player, update_enemies};

use crate::frame::TickSet;

/// AI Plugin
///
/// Регистрирует `update_enemies` в `TickSet::Enemies` (после игроков,
/// до снарядов).
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, update_enemies.in_set(TickSet::Enemies));
    }
}
