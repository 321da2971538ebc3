//! Player module
//!
//! Игрок - вариант актора с input snapshot и controller state.
//! Камера, input devices и UI - внешние слои: сюда приходит только
//! `PlayerInput`, наружу уходят events и cosmetic requests.

use bevy::prelude::*;

pub mod components;
pub mod events;
pub mod systems;


pub use components::*;
pub use events::{CrashdownFailed, CrashdownLanded, InteractionUsed};
pub use systems::update_players;

use crate::frame::TickSet;

/// Player Plugin
///
/// Регистрирует player events и `update_players` в `TickSet::Players`.
pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<CrashdownLanded>()
            .add_event::<CrashdownFailed>()
            .add_event::<InteractionUsed>();

        app.add_systems(FixedUpdate, update_players.in_set(TickSet::Players));
    }
}
