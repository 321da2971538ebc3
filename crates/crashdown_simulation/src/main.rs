//! Headless симуляция Crashdown
//!
//! Скриптованная стычка: игрок с бластером против турели, ползунов и улья.
//! Физика - встроенный SphereWorld (два этажа), input - простой автопилот.

use bevy::prelude::*;
use crashdown_simulation::data::parse_arsenal;
use crashdown_simulation::*;

const ARSENAL_JSON: &str = include_str!("../data/arsenal.json");
const TICK_DT: f32 = 1.0 / 60.0;
const TICK_COUNT: usize = 1800;

fn main() {
    let seed = 42;
    println!("Starting Crashdown headless simulation (seed: {})", seed);

    let arsenal = match parse_arsenal(ARSENAL_JSON) {
        Ok(arsenal) => arsenal,
        Err(err) => {
            eprintln!("Failed to load arsenal: {:#}", err);
            std::process::exit(1);
        }
    };

    let mut app = create_headless_app(seed);
    let floor_spacing = arsenal.simulation.floor_spacing;
    let spatial = SphereWorld::new()
        .with_floor(FloorRect::centered(0.0, 40.0))
        .with_floor(FloorRect::centered(-floor_spacing, 40.0));
    app.insert_resource(arsenal.simulation.clone())
        .insert_resource(SpatialQueries::new(spatial))
        .add_plugins(SimulationPlugin);

    let world = app.world_mut();
    let player_shape = world.resource_mut::<ShapeIdAllocator>().mint();
    let player = world
        .spawn(player_bundle(
            0,
            1,
            player_shape,
            Vec3::new(0.0, 0.5, 0.0),
            arsenal.player.clone(),
            arsenal.weapon("Blaster"),
        ))
        .id();

    let placements = [
        ("Turret", Vec3::new(8.0, 0.5, -8.0)),
        ("Crawler", Vec3::new(-6.0, 0.5, -10.0)),
        ("Hive", Vec3::new(4.0, 0.5, 6.0)),
        ("Crate", Vec3::new(2.0, 0.5, -2.0)),
    ];
    for (name, position) in placements {
        let Some(template) = arsenal.enemy(name) else {
            eprintln!("Unknown enemy archetype '{}'", name);
            continue;
        };
        let shape = world.resource_mut::<ShapeIdAllocator>().mint();
        world.spawn(template.bundle(shape, position, Quat::IDENTITY, None));
    }

    for tick in 0..TICK_COUNT {
        drive_autopilot(&mut app, player, tick);
        step_tick(&mut app, TICK_DT);

        if tick % 300 == 0 {
            let world = app.world_mut();
            let enemies = world.query::<&EnemyBrain>().iter(world).count();
            let projectiles = world.query::<&Projectile>().iter(world).count();
            let health = world.get::<Health>(player).map(|h| h.current).unwrap_or(0.0);
            println!(
                "Tick {}: {} enemies, {} projectiles, player health {:.1}",
                tick, enemies, projectiles, health
            );
        }

        if app.world().resource::<SessionStats>().all_players_dead {
            println!("Player died at tick {}", tick);
            break;
        }
    }

    let stats = app.world().resource::<SessionStats>();
    println!(
        "Simulation complete! frames: {}, time: {:.2}s, kills: {}, weapon: {}",
        stats.total_frame_count,
        stats.total_time_used,
        stats.enemies_killed,
        stats.final_weapon_used.as_deref().unwrap_or("Blaster")
    );
}

/// Автопилот: кружим вокруг центра, стреляем в ближайшего врага
fn drive_autopilot(app: &mut App, player: Entity, tick: usize) {
    let world = app.world_mut();
    let Some(player_position) = world.get::<Transform>(player).map(|t| t.translation) else {
        return;
    };

    let nearest_enemy = world
        .query_filtered::<&Transform, With<EnemyBrain>>()
        .iter(world)
        .map(|t| t.translation)
        .min_by(|a, b| {
            a.distance_squared(player_position)
                .total_cmp(&b.distance_squared(player_position))
        });

    let Some(mut input) = world.get_mut::<PlayerInput>(player) else {
        return;
    };

    let phase = tick as f32 * TICK_DT * 0.5;
    input.movement = Vec2::new(phase.cos(), phase.sin()) * 0.6;
    input.aim_point = nearest_enemy;
    input.attack_pressed = nearest_enemy.is_some() && tick % 20 == 0;
    input.dodge_pressed = tick % 240 == 120;
}
