//! Frame orchestration: порядок тика и bookkeeping
//!
//! Один тик FixedUpdate = последовательность наборов систем:
//! Registry → Players → Enemies → Projectiles → Bookkeeping.
//! Между наборами Bevy вставляет sync points, поэтому deferred
//! spawn/despawn одного набора видны следующему.
//!
//! Bookkeeping последним: статистика сессии и сброс one-shot флагов
//! (producers ставят в тике N, consumers читают в тике N).

use bevy::prelude::*;
use std::collections::HashSet;

use crate::components::FrameFlags;
use crate::config::SimulationConfig;
use crate::player::{PlayerInput, PlayerInteraction};

/// Фазы тика (строгий порядок)
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickSet {
    /// Registry sync: activation/deactivation акторов, публикация shapes
    Registry,
    Players,
    Enemies,
    Projectiles,
    Bookkeeping,
}

/// Resource: статистика забега (для high score / game over экрана)
#[derive(Resource, Debug, Clone, Default)]
pub struct SessionStats {
    pub total_frame_count: u64,
    /// Первые кадры (инициализация) не учитываются
    pub total_time_used: f32,
    pub enemies_killed: u32,
    pub final_weapon_used: Option<String>,
    pub secret_areas_found: HashSet<Entity>,
    pub all_players_dead: bool,
}

/// Система: счётчики кадров/времени
pub fn update_session_stats(time: Res<Time>, config: Res<SimulationConfig>, mut stats: ResMut<SessionStats>) {
    stats.total_frame_count += 1;
    if stats.total_frame_count > u64::from(config.untimed_startup_frames) {
        stats.total_time_used += time.delta_secs();
    }
}

/// Система: cooldown кнопок (ToggleSomething)
pub fn tick_interaction_cooldowns(time: Res<Time>, mut interactions: Query<&mut PlayerInteraction>) {
    let delta = time.delta_secs();
    for mut interaction in interactions.iter_mut() {
        if interaction.remaining_cooldown > 0.0 {
            interaction.remaining_cooldown -= delta;
        }
    }
}

/// Система: сброс one-shot флагов в конце тика
pub fn clear_frame_flags(
    mut inputs: Query<&mut PlayerInput>,
    mut flags: Query<&mut FrameFlags>,
    mut interactions: Query<&mut PlayerInteraction>,
) {
    for mut input in inputs.iter_mut() {
        input.clear_presses();
    }
    for mut frame_flags in flags.iter_mut() {
        frame_flags.clear();
    }
    for mut interaction in interactions.iter_mut() {
        interaction.clear_flags();
    }
}

/// Frame Plugin
///
/// Задаёт порядок TickSet в FixedUpdate и регистрирует bookkeeping.
pub struct FramePlugin;

impl Plugin for FramePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SessionStats>();

        app.configure_sets(
            FixedUpdate,
            (
                TickSet::Registry,
                TickSet::Players,
                TickSet::Enemies,
                TickSet::Projectiles,
                TickSet::Bookkeeping,
            )
                .chain(),
        );

        app.add_systems(
            FixedUpdate,
            (update_session_stats, tick_interaction_cooldowns, clear_frame_flags)
                .chain()
                .in_set(TickSet::Bookkeeping),
        );
    }
}
