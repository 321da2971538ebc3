//! Per-entity trace логи
//!
//! Activation/aggro трассы пишутся только при `debug_ai`.
//! Отдельный test binary: глобальный sink логгера не делится с другими тестами.

use bevy::prelude::*;
use crashdown_simulation::logger::{set_logger, LogLevel, LogPrinter};
use crashdown_simulation::*;
use std::sync::{Arc, Mutex};

struct CapturingLogger(Arc<Mutex<Vec<String>>>);

impl LogPrinter for CapturingLogger {
    fn log(&self, _level: LogLevel, message: &str) {
        if let Ok(mut lines) = self.0.lock() {
            lines.push(message.to_string());
        }
    }
}

fn run_aggro_tick(debug_ai: bool) {
    let mut app = create_headless_app(42);
    app.insert_resource(SimulationConfig {
        debug_ai,
        ..Default::default()
    })
    .insert_resource(SpatialQueries::new(
        SphereWorld::new().with_floor(FloorRect::centered(0.0, 50.0)),
    ))
    .add_plugins(SimulationPlugin);

    let world = app.world_mut();
    let shape = world.resource_mut::<ShapeIdAllocator>().mint();
    world.spawn(player_bundle(
        0,
        1,
        shape,
        Vec3::new(0.0, 0.5, 0.0),
        PlayerTuning::default(),
        None,
    ));

    let template = EnemyTemplate {
        name: "Watcher".to_string(),
        tribe: 2,
        max_health: 10.0,
        collider_radius: 0.5,
        config: EnemyConfig {
            ai_type: AiType::Stationary,
            ..Default::default()
        },
    };
    let shape = world.resource_mut::<ShapeIdAllocator>().mint();
    let enemy = world
        .spawn(template.bundle(shape, Vec3::new(5.0, 0.5, 0.0), Quat::IDENTITY, None))
        .id();
    if let Some(mut brain) = world.get_mut::<EnemyBrain>(enemy) {
        brain.state = AiState::WalkingAndFighting;
    }

    step_tick(&mut app, 0.25);
    assert!(app.world().get::<EnemyBrain>(enemy).unwrap().aggro_target.is_some());
}

#[test]
fn test_actor_traces_follow_debug_ai() {
    let lines = Arc::new(Mutex::new(Vec::new()));
    set_logger(Box::new(CapturingLogger(lines.clone())));

    let traced = |lines: &Arc<Mutex<Vec<String>>>| {
        lines
            .lock()
            .unwrap()
            .iter()
            .filter(|line| line.contains("activated") || line.contains("aggroed"))
            .count()
    };

    run_aggro_tick(false);
    assert_eq!(traced(&lines), 0);

    run_aggro_tick(true);
    // Два актора активированы + один aggro
    assert_eq!(traced(&lines), 3);
}
