//! Aggro: поиск ближайшего игрока на том же этаже

use bevy::prelude::*;

use crate::config::SimulationConfig;

/// Ближайший игрок строго внутри `radius`
///
/// Любой игрок на другом этаже (`is_same_floor` = false) обрывает поиск целиком:
/// в этот тик враг не агрится ни на кого
/// (`test_off_floor_player_blocks_aggro`).
pub fn find_nearest_player(
    position: Vec3,
    radius: f32,
    config: &SimulationConfig,
    players: impl IntoIterator<Item = (Entity, Vec3)>,
) -> Option<Entity> {
    let mut best: Option<(Entity, f32)> = None;

    for (player, player_position) in players {
        if !config.is_same_floor(player_position.y, position.y) {
            return None;
        }

        let distance = position.distance(player_position);
        if distance < radius && best.map_or(true, |(_, best_distance)| distance < best_distance) {
            best = Some((player, distance));
        }
    }

    best.map(|(player, _)| player)
}
