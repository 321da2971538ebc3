//! Player events (ECS → внешние слои: звук, UI, смена уровня)

use bevy::prelude::*;

/// Crashdown завершён: игрок приземлился этажом ниже
#[derive(Event, Debug, Clone, Copy)]
pub struct CrashdownLanded {
    pub player: Entity,
    pub position: Vec3,
}

/// Crashdown не начался: под игроком нет этажа
#[derive(Event, Debug, Clone, Copy)]
pub struct CrashdownFailed {
    pub player: Entity,
}

/// Игрок активировал interaction
#[derive(Event, Debug, Clone)]
pub struct InteractionUsed {
    pub player: Entity,
    pub interaction: Entity,
    /// Имя типа для звука/HUD ("HealthPowerUp", "WeaponPickup"...)
    pub kind: &'static str,
}
