//! Enemy AI компоненты
//!
//! - EnemyBrain: runtime состояние FSM (state, aggro, cooldown, enrage...)
//! - EnemyConfig: tuning архетипа (радиус aggro, скорость, оружие...)
//! - EnemyTemplate: архетип целиком (для спавна и death-spawn цепочек)

use bevy::prelude::*;
use serde::Deserialize;
use std::sync::Arc;

use crate::combat::WeaponDefinition;
use crate::components::{Actor, ActorColliders, Facing, Health};
use crate::physics::ShapeId;

/// Тип поведения врага
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Reflect)]
pub enum AiType {
    /// Бочка/стена: не двигается, блокирует игрока
    #[default]
    InanimateObject,
    /// Турель: не двигается, стреляет
    Stationary,
    /// Бежит прямо на цель
    RunAtTheKnees,
    /// Увидел цель → сразу умирает, выпуская spawn_on_death
    OneTimeEnemySpawner,
    /// Данные с неизвестным типом (warning, no-op)
    #[serde(other)]
    Unrecognized,
}

/// Состояние FSM (только вперёд; IsDead терминальное)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum AiState {
    #[default]
    JustSpawned,
    WalkingAndFighting,
    Dying,
    IsDead,
}

/// Runtime состояние врага
#[derive(Component, Debug, Clone, Default)]
pub struct EnemyBrain {
    pub state: AiState,
    /// Weak ссылка: despawned target резолвится в "нет цели"
    pub aggro_target: Option<Entity>,
    pub remaining_cooldown: f32,
    /// Индекс в EnemyConfig::weapons_cycle
    pub current_attack: usize,
    pub remaining_enrage: f32,
    /// Боковой "шатание" при enrage (знак = направление)
    pub stagger_amount: f32,
    pub time_dying: f32,
    /// Союзники, которым передаём цель при aggro
    pub friends_to_notify: Vec<Entity>,
    /// Цель, унаследованная от умершего "родителя" (применяется на входе в бой)
    pub inherited_aggro: Option<Entity>,
}

impl EnemyBrain {
    pub fn inheriting(aggro: Option<Entity>) -> Self {
        Self {
            inherited_aggro: aggro,
            ..Default::default()
        }
    }

    pub fn can_attack(&self) -> bool {
        self.remaining_cooldown <= 0.0
    }

    pub fn is_enraged(&self) -> bool {
        self.remaining_enrage > 0.0
    }

    /// Текущее оружие цикла (None = пустой цикл)
    pub fn current_weapon<'a>(&self, config: &'a EnemyConfig) -> Option<&'a Arc<WeaponDefinition>> {
        config.weapons_cycle.get(self.current_attack)
    }

    pub fn advance_to_next_attack(&mut self, cycle_len: usize) {
        self.current_attack += 1;
        if self.current_attack >= cycle_len {
            self.current_attack = 0;
        }
    }
}

/// Tuning архетипа врага
#[derive(Component, Debug, Clone)]
pub struct EnemyConfig {
    pub ai_type: AiType,
    pub aggro_radius: f32,
    pub height: f32,
    pub move_speed: f32,
    pub ignores_terrain: bool,
    pub maximum_random_attack_delay: f32,
    pub death_time: f32,
    /// Во сколько раз быстрее тикает cooldown при enrage
    pub enrage_weapon_cooldown_multiplier: f32,
    /// 0 = урон не вызывает enrage
    pub enrage_duration_on_damage: f32,
    pub maximum_sideways_stagger: f32,
    pub weapons_cycle: Vec<Arc<WeaponDefinition>>,
    pub spawn_on_death: Vec<Arc<EnemyTemplate>>,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            ai_type: AiType::InanimateObject,
            aggro_radius: 15.0,
            height: 1.0,
            move_speed: 3.0,
            ignores_terrain: false,
            maximum_random_attack_delay: 0.5,
            death_time: 0.5,
            enrage_weapon_cooldown_multiplier: 1.0,
            enrage_duration_on_damage: 0.0,
            maximum_sideways_stagger: 0.0,
            weapons_cycle: Vec::new(),
            spawn_on_death: Vec::new(),
        }
    }
}

/// Архетип врага (shared через Arc между death-spawn цепочками)
#[derive(Debug, Clone)]
pub struct EnemyTemplate {
    pub name: String,
    pub tribe: u64,
    pub max_health: f32,
    pub collider_radius: f32,
    pub config: EnemyConfig,
}

impl EnemyTemplate {
    /// Компоненты нового врага (JustSpawned)
    pub fn bundle(&self, shape: ShapeId, position: Vec3, rotation: Quat, inherited_aggro: Option<Entity>) -> impl Bundle {
        (
            Name::new(self.name.clone()),
            Transform::from_translation(position).with_rotation(rotation),
            Actor { tribe: self.tribe },
            Facing(rotation * Vec3::NEG_Z),
            Health::new(self.max_health),
            EnemyBrain::inheriting(inherited_aggro),
            self.config.clone(),
            ActorColliders::single(shape, self.collider_radius),
        )
    }

    pub fn spawn(
        &self,
        commands: &mut Commands,
        shape: ShapeId,
        position: Vec3,
        rotation: Quat,
        inherited_aggro: Option<Entity>,
    ) -> Entity {
        commands.spawn(self.bundle(shape, position, rotation, inherited_aggro)).id()
    }
}
