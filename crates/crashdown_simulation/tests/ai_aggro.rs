//! Enemy AI integration test
//!
//! Проверяем FSM врагов в полном тике:
//! - aggro на ближайшего игрока того же этажа
//! - передача цели союзникам
//! - death-spawn цепочки и floor-despawn

use bevy::prelude::*;
use std::sync::Arc;
use crashdown_simulation::*;

const DT: f32 = 0.25;

/// Helper: App с одним или несколькими этажами
fn create_ai_app(floors: &[f32]) -> App {
    let mut app = create_headless_app(42);
    let mut spatial = SphereWorld::new();
    for height in floors {
        spatial.add_floor(FloorRect::centered(*height, 50.0));
    }
    app.insert_resource(SpatialQueries::new(spatial))
        .add_plugins(SimulationPlugin);
    app
}

fn spawn_player(app: &mut App, index: u32, position: Vec3) -> Entity {
    let world = app.world_mut();
    let shape = world.resource_mut::<ShapeIdAllocator>().mint();
    world
        .spawn(player_bundle(index, 1, shape, position, PlayerTuning::default(), None))
        .id()
}

fn template(ai_type: AiType) -> EnemyTemplate {
    EnemyTemplate {
        name: format!("{:?}", ai_type),
        tribe: 2,
        max_health: 20.0,
        collider_radius: 0.5,
        config: EnemyConfig {
            ai_type,
            maximum_random_attack_delay: 0.0,
            ..Default::default()
        },
    }
}

fn spawn_enemy(app: &mut App, template: &EnemyTemplate, position: Vec3, state: AiState) -> Entity {
    let world = app.world_mut();
    let shape = world.resource_mut::<ShapeIdAllocator>().mint();
    let enemy = world.spawn(template.bundle(shape, position, Quat::IDENTITY, None)).id();
    if let Some(mut brain) = world.get_mut::<EnemyBrain>(enemy) {
        brain.state = state;
    }
    enemy
}

fn brain(app: &App, enemy: Entity) -> &EnemyBrain {
    app.world().get::<EnemyBrain>(enemy).unwrap()
}

fn enemy_count(app: &mut App) -> usize {
    let world = app.world_mut();
    world.query::<&EnemyBrain>().iter(world).count()
}

/// Test: игрок в радиусе aggro становится целью за один тик
#[test]
fn test_aggro_acquired_in_one_tick() {
    let mut app = create_ai_app(&[0.0]);
    let player = spawn_player(&mut app, 0, Vec3::new(0.0, 0.5, 0.0));
    let enemy = spawn_enemy(
        &mut app,
        &template(AiType::Stationary),
        Vec3::new(10.0, 0.5, 0.0),
        AiState::WalkingAndFighting,
    );

    step_tick(&mut app, DT);

    assert_eq!(brain(&app, enemy).aggro_target, Some(player));
}

/// Test: за пределами радиуса цели нет
#[test]
fn test_no_aggro_outside_radius() {
    let mut app = create_ai_app(&[0.0]);
    spawn_player(&mut app, 0, Vec3::new(0.0, 0.5, 0.0));
    let enemy = spawn_enemy(
        &mut app,
        &template(AiType::Stationary),
        Vec3::new(20.0, 0.5, 0.0),
        AiState::WalkingAndFighting,
    );

    for _ in 0..4 {
        step_tick(&mut app, DT);
    }

    assert_eq!(brain(&app, enemy).aggro_target, None);
}

/// Test: союзник получает цель, даже если сам её не видит
#[test]
fn test_aggro_propagates_to_friends() {
    let mut app = create_ai_app(&[0.0]);
    let player = spawn_player(&mut app, 0, Vec3::new(0.0, 0.5, 0.0));

    let mut blind = template(AiType::Stationary);
    blind.config.aggro_radius = 1.0;
    let friend = spawn_enemy(&mut app, &blind, Vec3::new(-20.0, 0.5, 0.0), AiState::WalkingAndFighting);

    let scout = spawn_enemy(
        &mut app,
        &template(AiType::Stationary),
        Vec3::new(5.0, 0.5, 0.0),
        AiState::WalkingAndFighting,
    );
    app.world_mut()
        .get_mut::<EnemyBrain>(scout)
        .unwrap()
        .friends_to_notify
        .push(friend);

    step_tick(&mut app, DT);

    assert_eq!(brain(&app, scout).aggro_target, Some(player));
    assert_eq!(brain(&app, friend).aggro_target, Some(player));
}

/// Test: любой игрок на другом этаже блокирует aggro целиком
#[test]
fn test_off_floor_player_blocks_aggro() {
    let mut app = create_ai_app(&[0.0, -30.0]);
    spawn_player(&mut app, 0, Vec3::new(0.0, 0.5, 0.0));
    spawn_player(&mut app, 1, Vec3::new(0.0, -29.5, 0.0));
    let enemy = spawn_enemy(
        &mut app,
        &template(AiType::Stationary),
        Vec3::new(5.0, 0.5, 0.0),
        AiState::WalkingAndFighting,
    );

    for _ in 0..3 {
        step_tick(&mut app, DT);
    }

    assert_eq!(brain(&app, enemy).aggro_target, None);
    assert_eq!(brain(&app, enemy).state, AiState::WalkingAndFighting);
}

/// Test: враг этажом выше активного игрока удаляется
#[test]
fn test_left_behind_enemy_despawned() {
    let mut app = create_ai_app(&[0.0, -30.0]);
    spawn_player(&mut app, 0, Vec3::new(0.0, -29.5, 0.0));
    let enemy = spawn_enemy(
        &mut app,
        &template(AiType::Stationary),
        Vec3::new(5.0, 0.5, 0.0),
        AiState::WalkingAndFighting,
    );

    step_tick(&mut app, DT);

    assert!(app.world().get_entity(enemy).is_err());
}

/// Test: Dying → IsDead ровно через death_time, потомки спавнятся один раз
#[test]
fn test_death_spawns_children_once() {
    let mut app = create_ai_app(&[0.0]);
    let player = spawn_player(&mut app, 0, Vec3::new(0.0, 0.5, 0.0));

    let mut hive = template(AiType::OneTimeEnemySpawner);
    hive.config.death_time = 1.0;
    hive.config.spawn_on_death = vec![Arc::new(template(AiType::Stationary))];
    let parent = spawn_enemy(&mut app, &hive, Vec3::new(3.0, 0.5, 0.0), AiState::Dying);
    app.world_mut().get_mut::<EnemyBrain>(parent).unwrap().aggro_target = Some(player);

    for _ in 0..3 {
        step_tick(&mut app, DT);
    }
    assert_eq!(brain(&app, parent).state, AiState::Dying);
    assert_eq!(enemy_count(&mut app), 1);

    // 4 * 0.25 = death_time
    step_tick(&mut app, DT);
    assert_eq!(brain(&app, parent).state, AiState::IsDead);
    assert_eq!(enemy_count(&mut app), 2);

    step_tick(&mut app, DT);
    assert!(app.world().get_entity(parent).is_err());

    for _ in 0..5 {
        step_tick(&mut app, DT);
    }
    assert_eq!(enemy_count(&mut app), 1);

    // Потомок унаследовал цель родителя
    let world = app.world_mut();
    let child_target = world
        .query::<&EnemyBrain>()
        .iter(world)
        .next()
        .and_then(|brain| brain.aggro_target);
    assert_eq!(child_target, Some(player));
}

/// Test: спаунер сразу уходит в Dying, как только видит цель
#[test]
fn test_spawner_starts_dying_on_contact() {
    let mut app = create_ai_app(&[0.0]);
    spawn_player(&mut app, 0, Vec3::new(0.0, 0.5, 0.0));
    let hive = spawn_enemy(
        &mut app,
        &template(AiType::OneTimeEnemySpawner),
        Vec3::new(4.0, 0.5, 0.0),
        AiState::JustSpawned,
    );

    // JustSpawned → WalkingAndFighting → aggro → Dying
    for _ in 0..3 {
        step_tick(&mut app, DT);
    }

    assert_eq!(brain(&app, hive).state, AiState::Dying);
}

/// Test: RunAtTheKnees бежит к цели, Stationary стоит
#[test]
fn test_runner_closes_distance() {
    let mut app = create_ai_app(&[0.0]);
    spawn_player(&mut app, 0, Vec3::new(0.0, 0.5, 0.0));
    let runner = spawn_enemy(
        &mut app,
        &template(AiType::RunAtTheKnees),
        Vec3::new(0.0, 0.5, -10.0),
        AiState::WalkingAndFighting,
    );
    let turret = spawn_enemy(
        &mut app,
        &template(AiType::Stationary),
        Vec3::new(10.0, 0.5, 0.0),
        AiState::WalkingAndFighting,
    );

    for _ in 0..5 {
        step_tick(&mut app, DT);
    }

    let runner_z = app.world().get::<Transform>(runner).unwrap().translation.z;
    assert!(runner_z > -10.0 + 2.0, "runner should move towards the player, z = {}", runner_z);
    assert_eq!(
        app.world().get::<Transform>(turret).unwrap().translation,
        Vec3::new(10.0, 0.5, 0.0)
    );
    // Смотрит на игрока
    let facing = app.world().get::<Facing>(turret).unwrap().0;
    assert!((facing - Vec3::NEG_X).length() < 1e-4);
}

/// Test: враг стреляет по циклу оружия
#[test]
fn test_enemy_fires_weapon_cycle() {
    let mut app = create_ai_app(&[0.0]);
    spawn_player(&mut app, 0, Vec3::new(0.0, 0.5, 0.0));

    let mut turret = template(AiType::Stationary);
    let burst = Arc::new(WeaponDefinition {
        name: "Burst".to_string(),
        number_to_spawn: 3,
        spread_between_shots_degrees: 10.0,
        cooldown: 10.0,
        ..WeaponDefinition::blaster()
    });
    turret.config.weapons_cycle = vec![burst, Arc::new(WeaponDefinition::blaster())];
    let enemy = spawn_enemy(&mut app, &turret, Vec3::new(0.0, 0.5, -12.0), AiState::WalkingAndFighting);

    // Тик 1: aggro, тик 2: залп
    step_tick(&mut app, DT);
    step_tick(&mut app, DT);

    let world = app.world_mut();
    let owned = world
        .query::<&Projectile>()
        .iter(world)
        .filter(|projectile| projectile.owner == Some(enemy))
        .count();
    assert_eq!(owned, 3);
    assert_eq!(brain(&app, enemy).current_attack, 1);
    assert!(brain(&app, enemy).remaining_cooldown >= 10.0);
}

/// Test: союзник получает цель разведчика до своего хода, даже если сам видит другого игрока
#[test]
fn test_notified_ally_keeps_scout_target() {
    let mut app = create_ai_app(&[0.0]);
    let near_scout = spawn_player(&mut app, 0, Vec3::new(0.0, 0.5, 0.0));
    spawn_player(&mut app, 1, Vec3::new(20.0, 0.5, 0.0));

    let mut short_sighted = template(AiType::Stationary);
    short_sighted.config.aggro_radius = 5.0;
    // Разведчик спавнится первым → обрабатывается раньше союзника
    let scout = spawn_enemy(&mut app, &short_sighted, Vec3::new(2.0, 0.5, 0.0), AiState::WalkingAndFighting);
    let ally = spawn_enemy(&mut app, &short_sighted, Vec3::new(18.0, 0.5, 0.0), AiState::WalkingAndFighting);
    app.world_mut()
        .get_mut::<EnemyBrain>(scout)
        .unwrap()
        .friends_to_notify
        .push(ally);

    step_tick(&mut app, DT);

    assert_eq!(brain(&app, scout).aggro_target, Some(near_scout));
    assert_eq!(brain(&app, ally).aggro_target, Some(near_scout));
}

/// Helper: враг уже в бою с игроком
fn engage(app: &mut App, enemy: Entity, player: Entity, cooldown: f32, enrage: f32, stagger: f32) {
    let mut brain = app.world_mut().get_mut::<EnemyBrain>(enemy).unwrap();
    brain.aggro_target = Some(player);
    brain.remaining_cooldown = cooldown;
    brain.remaining_enrage = enrage;
    brain.stagger_amount = stagger;
}

/// Test: enrage ускоряет cooldown в multiplier раз, таймер enrage тикает каждый тик
#[test]
fn test_enrage_speeds_up_cooldown() {
    let mut app = create_ai_app(&[0.0]);
    let player = spawn_player(&mut app, 0, Vec3::new(0.0, 0.5, 0.0));

    let mut turret = template(AiType::Stationary);
    turret.config.enrage_weapon_cooldown_multiplier = 3.0;
    turret.config.weapons_cycle = vec![Arc::new(WeaponDefinition::blaster())];
    let enraged = spawn_enemy(&mut app, &turret, Vec3::new(5.0, 0.5, 0.0), AiState::WalkingAndFighting);
    let calm = spawn_enemy(&mut app, &turret, Vec3::new(-5.0, 0.5, 0.0), AiState::WalkingAndFighting);
    engage(&mut app, enraged, player, 5.0, 10.0, 0.0);
    engage(&mut app, calm, player, 5.0, 0.0, 0.0);

    step_tick(&mut app, DT);

    assert_eq!(brain(&app, enraged).remaining_cooldown, 5.0 - DT * 3.0);
    assert_eq!(brain(&app, enraged).remaining_enrage, 10.0 - DT);
    assert_eq!(brain(&app, calm).remaining_cooldown, 5.0 - DT);

    step_tick(&mut app, DT);
    assert_eq!(brain(&app, enraged).remaining_enrage, 10.0 - 2.0 * DT);
}

/// Test: RunAtTheKnees в enrage смещается вбок от линии атаки
#[test]
fn test_enraged_runner_staggers_sideways() {
    let mut app = create_ai_app(&[0.0]);
    let player = spawn_player(&mut app, 0, Vec3::new(0.0, 0.5, 0.0));

    let runner = template(AiType::RunAtTheKnees);
    let staggering = spawn_enemy(&mut app, &runner, Vec3::new(0.0, 0.5, -10.0), AiState::WalkingAndFighting);
    let steady = spawn_enemy(&mut app, &runner, Vec3::new(6.0, 0.5, -10.0), AiState::WalkingAndFighting);
    engage(&mut app, staggering, player, 1.0, 5.0, 2.0);
    engage(&mut app, steady, player, 1.0, 0.0, 2.0);

    step_tick(&mut app, DT);

    // Motor +Z, stagger перпендикулярно: +X на stagger_amount * dt
    let drifted = app.world().get::<Transform>(staggering).unwrap().translation;
    assert!((drifted.x - 2.0 * DT).abs() < 1e-4, "x = {}", drifted.x);
    assert!(drifted.z > -10.0);

    // Без enrage stagger не применяется: бежит строго к игроку
    let straight = app.world().get::<Transform>(steady).unwrap().translation;
    let heading = Vec3::new(straight.x - 6.0, 0.0, straight.z + 10.0).normalize();
    let expected = Vec3::new(-6.0, 0.0, 10.0).normalize();
    assert!((heading - expected).length() < 1e-4);
}

/// Test: неизвестный AI type → тик пропускается, состояние не меняется
#[test]
fn test_unrecognized_ai_type_skips_tick() {
    let mut app = create_ai_app(&[0.0]);
    let player = spawn_player(&mut app, 0, Vec3::new(0.0, 0.5, 0.0));

    let mut odd = template(AiType::Unrecognized);
    odd.config.weapons_cycle = vec![Arc::new(WeaponDefinition::blaster())];
    let position = Vec3::new(0.0, 0.5, -6.0);
    let enemy = spawn_enemy(&mut app, &odd, position, AiState::WalkingAndFighting);
    engage(&mut app, enemy, player, 2.0, 0.0, 0.0);
    let facing = app.world().get::<Facing>(enemy).unwrap().0;

    for _ in 0..4 {
        step_tick(&mut app, DT);
    }

    let state = brain(&app, enemy);
    assert_eq!(state.state, AiState::WalkingAndFighting);
    assert_eq!(state.aggro_target, Some(player));
    assert_eq!(state.remaining_cooldown, 2.0);
    assert_eq!(app.world().get::<Transform>(enemy).unwrap().translation, position);
    assert_eq!(app.world().get::<Facing>(enemy).unwrap().0, facing);

    let world = app.world_mut();
    assert_eq!(world.query::<&Projectile>().iter(world).count(), 0);
}

/// Test: IsDead враг посередине не сбивает обработку соседей
#[test]
fn test_dead_neighbour_does_not_skip_others() {
    let mut app = create_ai_app(&[0.0]);
    let player = spawn_player(&mut app, 0, Vec3::new(0.0, 0.5, 0.0));

    let turret = template(AiType::Stationary);
    let first = spawn_enemy(&mut app, &turret, Vec3::new(-2.0, 0.5, -5.0), AiState::WalkingAndFighting);
    let dead = spawn_enemy(&mut app, &turret, Vec3::new(0.0, 0.5, -5.0), AiState::IsDead);
    let last = spawn_enemy(&mut app, &turret, Vec3::new(2.0, 0.5, -5.0), AiState::WalkingAndFighting);
    engage(&mut app, first, player, 1.0, 0.0, 0.0);
    engage(&mut app, last, player, 1.0, 0.0, 0.0);
    let dead_shape = app.world().get::<ActorColliders>(dead).unwrap().shapes[0].id;

    step_tick(&mut app, DT);

    // Каждый сосед продвинулся ровно на один тик
    assert_eq!(brain(&app, first).remaining_cooldown, 1.0 - DT);
    assert_eq!(brain(&app, last).remaining_cooldown, 1.0 - DT);
    assert!(app.world().get_entity(dead).is_err());
    assert_eq!(enemy_count(&mut app), 2);

    // Deregistration - в Registry фазе следующего тика
    step_tick(&mut app, DT);
    assert!(!app.world().resource::<ActorRegistry>().contains(dead_shape));
    assert_eq!(brain(&app, first).remaining_cooldown, 1.0 - 2.0 * DT);
    assert_eq!(brain(&app, last).remaining_cooldown, 1.0 - 2.0 * DT);
}
