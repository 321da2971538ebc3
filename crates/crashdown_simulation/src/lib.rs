//! Crashdown Simulation Core
//!
//! ECS-симуляция боя на Bevy 0.16 (strategic layer)
//!
//! HYBRID ARCHITECTURE:
//! - ECS = strategic layer (акторы, AI, снаряды, правила боя)
//! - Движок = tactical layer (физика через SpatialQuery, рендер, звук, UI)
//!
//! Тик (FixedUpdate): Registry → Players → Enemies → Projectiles → Bookkeeping

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

// Публичные модули
pub mod ai;
pub mod combat;
pub mod components;
pub mod config;
pub mod data;
pub mod effects;
pub mod frame;
pub mod logger;
pub mod physics;
pub mod player;
pub mod registry;

// Re-export базовых типов для удобства
pub use ai::{AIPlugin, AiState, AiType, EnemyBrain, EnemyConfig, EnemyTemplate};
pub use combat::{
    CombatPlugin, EnemyDied, HitHistory, Projectile, ProjectileId, ReflectorRegistry, TakeDamage, WeaponDefinition,
    WeaponFired,
};
pub use components::*;
pub use config::{CameraBasis, SimulationConfig};
pub use effects::{CosmeticEvent, EffectDescriptor};
pub use frame::{FramePlugin, SessionStats, TickSet};
pub use logger::{log, log_error, log_info, log_warning};
pub use physics::{CollisionDomain, FloorRect, ShapeId, ShapeIdAllocator, SpatialQueries, SpatialQuery, SphereWorld};
pub use player::{
    player_bundle, CrashdownFailed, CrashdownLanded, InteractionKind, InteractionUsed, Player, PlayerController,
    PlayerInput, PlayerInteraction, PlayerPlugin, PlayerTuning,
};
pub use registry::{ActorRegistry, InteractionRegistry, RegistryPlugin};

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // Ресурсы, которые хост мог вставить заранее (seed, spatial backend, конфиг), не перетираем
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        app.init_resource::<SimulationConfig>()
            .init_resource::<CameraBasis>()
            .init_resource::<SpatialQueries>()
            .init_resource::<ShapeIdAllocator>()
            .add_event::<CosmeticEvent>()
            // Подсистемы (порядок тика задаёт FramePlugin)
            .add_plugins((FramePlugin, RegistryPlugin, PlayerPlugin, AIPlugin, CombatPlugin));
    }
}

/// Детерминистичный RNG resource (seeded ChaCha8)
///
/// Единственный источник случайности тика: задержки атак, stagger,
/// точки death-spawn. Порядок вызовов фиксирован порядком систем.
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Uniform [0, max]; max <= 0 → 0 без обращения к генератору
    pub fn up_to(&mut self, max: f32) -> f32 {
        if max > 0.0 {
            self.rng.gen_range(0.0..=max)
        } else {
            0.0
        }
    }

    /// Uniform [-max, max]; max <= 0 → 0
    pub fn symmetric(&mut self, max: f32) -> f32 {
        if max > 0.0 {
            self.rng.gen_range(-max..=max)
        } else {
            0.0
        }
    }

    /// Равномерная точка внутри единичного круга
    pub fn in_unit_disc(&mut self) -> Vec2 {
        let angle = self.rng.gen_range(0.0..std::f32::consts::TAU);
        let radius = self.rng.gen_range(0.0f32..=1.0).sqrt();
        Vec2::new(angle.cos(), angle.sin()) * radius
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    logger::init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0)); // 60Hz FixedUpdate

    app
}

/// Один тик симуляции с заданным dt (детерминированно, без wall clock)
///
/// Продвигает `Time` и запускает FixedUpdate ровно один раз.
pub fn step_tick(app: &mut App, dt: f32) {
    let world = app.world_mut();
    world
        .resource_mut::<Time>()
        .advance_by(Duration::from_secs_f32(dt.max(0.0)));
    world.run_schedule(FixedUpdate);
}

/// Snapshot компонента `T` у всех entity (для сравнения прогонов)
///
/// Формат: `index:Debug` построчно, entity по возрастанию index.
pub fn world_snapshot<T: Component + std::fmt::Debug>(world: &mut World) -> Vec<u8> {
    let mut rows: Vec<(u32, String)> = world
        .query::<(Entity, &T)>()
        .iter(world)
        .map(|(entity, component)| (entity.index(), format!("{:?}", component)))
        .collect();
    rows.sort_by(|a, b| a.0.cmp(&b.0));

    rows.into_iter()
        .flat_map(|(index, row)| format!("{}:{}\n", index, row).into_bytes())
        .collect()
}
