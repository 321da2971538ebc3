//! Damage resolution: единый контракт TakeDamage(amount, attacker)
//!
//! Снаряды и внешние hazards пишут `TakeDamage`, одна система применяет
//! урон в порядке событий. Реакция зависит от варианта актора:
//! - игрок: health, regen delay, damaged flag
//! - враг: health, damaged flag, aggro на атакующего, enrage + stagger,
//!   смерть → Dying

use bevy::prelude::*;

use crate::ai::{AiState, EnemyBrain, EnemyConfig};
use crate::components::{FrameFlags, Health};
use crate::frame::SessionStats;
use crate::player::PlayerController;
use crate::DeterministicRng;

/// Event: нанести урон актору
#[derive(Event, Debug, Clone, Copy)]
pub struct TakeDamage {
    pub target: Entity,
    pub amount: f32,
    /// Кто атаковал (None = окружение или владелец снаряда исчез)
    pub attacker: Option<Entity>,
}

/// Event: враг убит (health дошёл до 0)
#[derive(Event, Debug, Clone, Copy)]
pub struct EnemyDied {
    pub enemy: Entity,
    pub killer: Option<Entity>,
}

/// Система: применить накопленный за тик урон
///
/// Stale target (despawned) игнорируется молча.
pub fn apply_damage(
    mut damage_events: EventReader<TakeDamage>,
    mut players: Query<(&mut Health, &mut FrameFlags, &mut PlayerController), Without<EnemyBrain>>,
    mut enemies: Query<(&mut Health, &mut FrameFlags, &mut EnemyBrain, &EnemyConfig), Without<PlayerController>>,
    mut rng: ResMut<DeterministicRng>,
    mut stats: ResMut<SessionStats>,
    mut died_events: EventWriter<EnemyDied>,
) {
    for event in damage_events.read() {
        if let Ok((mut health, mut flags, mut controller)) = players.get_mut(event.target) {
            if !health.is_alive() {
                continue;
            }
            health.take_damage(event.amount);
            controller.health_regen_delay = controller.tuning.health_regen_delay;
            flags.damaged_this_frame = true;

            crate::logger::log(&format!(
                "💥 Player {:?} took {:.1} damage ({:.1}/{:.1})",
                event.target, event.amount, health.current, health.max
            ));
            continue;
        }

        let Ok((mut health, mut flags, mut brain, config)) = enemies.get_mut(event.target) else {
            continue;
        };

        if !matches!(brain.state, AiState::JustSpawned | AiState::WalkingAndFighting) {
            // Уже умирает - добивать нечего
            continue;
        }

        health.take_damage(event.amount);
        flags.damaged_this_frame = true;

        if brain.aggro_target.is_none() {
            if let Some(attacker) = event.attacker {
                brain.aggro_target = Some(attacker);
            }
        }

        if config.enrage_duration_on_damage > 0.0 {
            brain.remaining_enrage = config.enrage_duration_on_damage;
            brain.stagger_amount = rng.symmetric(config.maximum_sideways_stagger);
        }

        if !health.is_alive() {
            brain.state = AiState::Dying;
            stats.enemies_killed += 1;
            died_events.write(EnemyDied {
                enemy: event.target,
                killer: event.attacker,
            });
            crate::logger::log_info(&format!(
                "💀 Enemy {:?} killed by {:?}",
                event.target, event.attacker
            ));
        }
    }
}
