//! WeaponDefinition - immutable данные паттерна стрельбы
//!
//! Один и тот же `Arc<WeaponDefinition>` разделяют игроки, враги (weapons
//! cycle) и все снаряды, которые этим оружием выпущены.

use serde::Deserialize;

use crate::effects::EffectDescriptor;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WeaponDefinition {
    /// Имя для HUD/статистики ("final weapon used")
    pub name: String,
    /// Сколько снарядов в залпе (0 = оружие ничего не делает)
    pub number_to_spawn: u32,
    /// Угол между соседними снарядами веера (градусы)
    pub spread_between_shots_degrees: f32,
    /// Дистанция спавна от центра актора
    pub start_distance: f32,
    /// Cooldown после выстрела (секунды)
    pub cooldown: f32,
    /// Скорость снаряда (м/с)
    pub move_speed: f32,
    /// Время жизни снаряда (секунды)
    pub lifetime: f32,
    pub damage: f32,
    /// Радиус swept sphere (и отражающего shape)
    pub radius: f32,
    /// Hit budget снаряда
    pub maximum_enemies_hit: u32,
    /// Снаряд без визуала (melee swing, smash)
    pub hidden_attack: bool,
    /// Снаряд отражает чужие снаряды
    pub reflects_other_attacks: bool,
    /// Весь залп - одна волна (общий id → общий hit history)
    pub treat_projectiles_as_one_wave: bool,
    /// Эффект на акторе при выстреле
    pub actor_effect_on_firing: Option<EffectDescriptor>,
    /// Эффект, прикреплённый к каждому снаряду (заменяет dummy визуал)
    pub projectile_locked_effect: Option<EffectDescriptor>,
}

impl Default for WeaponDefinition {
    fn default() -> Self {
        Self {
            name: String::new(),
            number_to_spawn: 1,
            spread_between_shots_degrees: 0.0,
            start_distance: 0.5,
            cooldown: 0.5,
            move_speed: 10.0,
            lifetime: 1.0,
            damage: 1.0,
            radius: 0.25,
            maximum_enemies_hit: 1,
            hidden_attack: false,
            reflects_other_attacks: false,
            treat_projectiles_as_one_wave: false,
            actor_effect_on_firing: None,
            projectile_locked_effect: None,
        }
    }
}

impl WeaponDefinition {
    /// Полный угол веера
    pub fn total_spread_degrees(&self) -> f32 {
        self.number_to_spawn.saturating_sub(1) as f32 * self.spread_between_shots_degrees
    }

    /// Базовый бластер (одиночный выстрел)
    pub fn blaster() -> Self {
        Self {
            name: "Blaster".to_string(),
            number_to_spawn: 1,
            start_distance: 0.5,
            cooldown: 0.25,
            move_speed: 18.0,
            lifetime: 1.5,
            damage: 10.0,
            radius: 0.2,
            maximum_enemies_hit: 1,
            ..Default::default()
        }
    }

    /// Дробовик: веер из 5 снарядов
    pub fn scatter() -> Self {
        Self {
            name: "Scatter".to_string(),
            number_to_spawn: 5,
            spread_between_shots_degrees: 12.0,
            start_distance: 0.5,
            cooldown: 0.9,
            move_speed: 14.0,
            lifetime: 0.6,
            damage: 6.0,
            radius: 0.2,
            maximum_enemies_hit: 1,
            ..Default::default()
        }
    }

    /// Удар мечом: невидимая широкая волна, отражает чужие снаряды
    pub fn sword_swing() -> Self {
        Self {
            name: "Sword".to_string(),
            number_to_spawn: 3,
            spread_between_shots_degrees: 30.0,
            start_distance: 0.6,
            cooldown: 0.45,
            move_speed: 6.0,
            lifetime: 0.15,
            damage: 20.0,
            radius: 0.6,
            maximum_enemies_hit: 3,
            hidden_attack: true,
            reflects_other_attacks: true,
            treat_projectiles_as_one_wave: true,
            ..Default::default()
        }
    }

    /// Приземление после crashdown: кольцо невидимых снарядов
    pub fn crashdown_smash() -> Self {
        Self {
            name: "Crashdown Smash".to_string(),
            number_to_spawn: 12,
            spread_between_shots_degrees: 30.0,
            start_distance: 0.0,
            cooldown: 0.0,
            move_speed: 12.0,
            lifetime: 0.4,
            damage: 50.0,
            radius: 1.0,
            maximum_enemies_hit: 8,
            hidden_attack: true,
            treat_projectiles_as_one_wave: true,
            ..Default::default()
        }
    }
}
