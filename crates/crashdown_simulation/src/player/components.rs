//! Player компоненты: input snapshot, controller state, interactions

use bevy::prelude::*;
use serde::Deserialize;
use std::sync::Arc;

use crate::combat::WeaponDefinition;
use crate::components::{Actor, ActorColliders, ColliderShape, Facing, Health};
use crate::effects::EffectDescriptor;
use crate::physics::ShapeId;

/// Игрок (index 0 = "активный" игрок для floor-despawn правила)
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct Player {
    pub index: u32,
}

/// Input snapshot текущего тика (пишет input layer, сбрасывает Bookkeeping)
///
/// `*_pressed` - edge-triggered: true ровно один тик после нажатия.
#[derive(Component, Debug, Clone, Default)]
pub struct PlayerInput {
    pub movement: Vec2,
    /// Точка прицела в world space (мышь); None = целимся по facing
    pub aim_point: Option<Vec3>,
    pub attack_pressed: bool,
    pub dodge_pressed: bool,
    pub special_pressed: bool,
    pub interact_pressed: bool,
}

impl PlayerInput {
    pub fn clear_presses(&mut self) {
        self.attack_pressed = false;
        self.dodge_pressed = false;
        self.special_pressed = false;
        self.interact_pressed = false;
    }
}

/// Tuning игрока
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub starting_health: f32,
    pub height: f32,
    pub max_speed: f32,
    pub dodge_speed: f32,
    pub dodge_duration: f32,
    /// Сколько ждать после конца dodge до восстановления зарядов
    pub dodge_refresh_duration: f32,
    pub starting_dodges: u32,
    /// Задержка регена после урона
    pub health_regen_delay: f32,
    /// За сколько секунд реген заполняет всю полоску
    pub full_regen_wait: f32,
    pub health_boost_multiplier: f32,
    pub crashdown_health_drain_per_second: f32,
    pub dodge_effect: Option<EffectDescriptor>,
    pub dodge_refresh_effect: Option<EffectDescriptor>,
    pub crashdown_landing_effect: Option<EffectDescriptor>,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            starting_health: 100.0,
            height: 1.0,
            max_speed: 6.0,
            dodge_speed: 15.0,
            dodge_duration: 0.25,
            dodge_refresh_duration: 1.0,
            starting_dodges: 2,
            health_regen_delay: 3.0,
            full_regen_wait: 10.0,
            health_boost_multiplier: 1.5,
            crashdown_health_drain_per_second: 2.0,
            dodge_effect: None,
            dodge_refresh_effect: None,
            crashdown_landing_effect: None,
        }
    }
}

/// Активный crashdown (полёт к точке этажом ниже)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrashdownFlight {
    pub target: Vec3,
    pub elapsed: f32,
}

/// Runtime состояние игрока
#[derive(Component, Debug, Clone)]
pub struct PlayerController {
    pub tuning: PlayerTuning,
    /// None = безоружный (атака - no-op)
    pub weapon: Option<Arc<WeaponDefinition>>,
    pub crashdown_smash: Arc<WeaponDefinition>,
    pub remaining_weapon_cooldown: f32,
    /// > 0 = в dodge; уходит в минус до -refresh, потом заряды восстанавливаются
    pub remaining_dodge_time: f32,
    pub remaining_dodges: u32,
    pub maximum_dodges: u32,
    pub health_regen_delay: f32,
    pub has_crashdown_key: bool,
    pub crashdown: Option<CrashdownFlight>,
    /// Куда смотрит оружие (горизонтальный unit vector)
    pub aiming: Vec3,
}

impl PlayerController {
    pub fn new(tuning: PlayerTuning, weapon: Option<Arc<WeaponDefinition>>) -> Self {
        Self {
            remaining_dodges: tuning.starting_dodges,
            maximum_dodges: tuning.starting_dodges,
            tuning,
            weapon,
            crashdown_smash: Arc::new(WeaponDefinition::crashdown_smash()),
            remaining_weapon_cooldown: 0.0,
            remaining_dodge_time: 0.0,
            health_regen_delay: 0.0,
            has_crashdown_key: false,
            crashdown: None,
            aiming: Vec3::NEG_Z,
        }
    }

    pub fn is_dodging(&self) -> bool {
        self.remaining_dodge_time > 0.0
    }

    pub fn is_crashing_down(&self) -> bool {
        self.crashdown.is_some()
    }
}

/// Компоненты нового игрока
pub fn player_bundle(
    index: u32,
    tribe: u64,
    shape: ShapeId,
    position: Vec3,
    tuning: PlayerTuning,
    weapon: Option<Arc<WeaponDefinition>>,
) -> impl Bundle {
    let radius = tuning.height / 2.0;
    (
        Name::new(format!("Player {}", index)),
        Transform::from_translation(position),
        Actor { tribe },
        Facing::default(),
        Health::new(tuning.starting_health),
        Player { index },
        PlayerInput::default(),
        PlayerController::new(tuning, weapon),
        ActorColliders::single(shape, radius),
    )
}

/// Что делает interaction при нажатии "interact"
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionKind {
    /// max health × multiplier, полное лечение
    HealthPowerUp,
    WeaponPickup(Arc<WeaponDefinition>),
    /// +1 максимальный заряд dodge
    DodgePowerUp,
    /// Разрешает crashdown (и лечит, чтобы drain не убил сразу)
    CrashdownKey,
    /// Переключает `Toggled` у целей (с cooldown)
    ToggleSomething { targets: Vec<Entity>, cooldown: f32 },
    /// Только подсказка рядом, без действия
    Nothing,
    /// Секретная зона: засчитывается при входе, interact не нужен
    SecretArea,
}

/// Пикап/кнопка/секретная зона в домене Interactions
#[derive(Component, Debug, Clone)]
pub struct PlayerInteraction {
    pub kind: InteractionKind,
    pub remove_after_activation: bool,
    pub interacted_this_frame: bool,
    pub player_near_this_frame: bool,
    pub remaining_cooldown: f32,
}

impl PlayerInteraction {
    pub fn new(kind: InteractionKind, remove_after_activation: bool) -> Self {
        Self {
            kind,
            remove_after_activation,
            interacted_this_frame: false,
            player_near_this_frame: false,
            remaining_cooldown: 0.0,
        }
    }

    pub fn clear_flags(&mut self) {
        self.interacted_this_frame = false;
        self.player_near_this_frame = false;
    }
}

impl InteractionKind {
    pub fn name(&self) -> &'static str {
        match self {
            InteractionKind::HealthPowerUp => "HealthPowerUp",
            InteractionKind::WeaponPickup(_) => "WeaponPickup",
            InteractionKind::DodgePowerUp => "DodgePowerUp",
            InteractionKind::CrashdownKey => "CrashdownKey",
            InteractionKind::ToggleSomething { .. } => "ToggleSomething",
            InteractionKind::Nothing => "Nothing",
            InteractionKind::SecretArea => "SecretArea",
        }
    }
}

/// Collision shape interaction (появление = регистрация в InteractionRegistry)
#[derive(Component, Debug, Clone, Copy)]
pub struct InteractionShape(pub ColliderShape);

/// Объект, который переключают кнопки (дверь, мост)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Toggled {
    pub active: bool,
}

/// Компоненты нового interaction (пикап, кнопка, секретная зона)
pub fn interaction_bundle(
    kind: InteractionKind,
    remove_after_activation: bool,
    shape: ShapeId,
    radius: f32,
    position: Vec3,
) -> impl Bundle {
    (
        Name::new(kind.name()),
        Transform::from_translation(position),
        PlayerInteraction::new(kind, remove_after_activation),
        InteractionShape(ColliderShape { id: shape, radius }),
    )
}
