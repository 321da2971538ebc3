//! Data loading: библиотеки оружия и архетипов врагов из JSON
//!
//! Враг ссылается на оружие и death-spawn архетипы по имени; ссылки
//! резолвятся при загрузке в `Arc` (runtime не ищет ничего по строкам).

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use crate::ai::{AiType, EnemyConfig, EnemyTemplate};
use crate::combat::WeaponDefinition;
use crate::config::SimulationConfig;
use crate::player::PlayerTuning;

/// Архетип врага в JSON (ссылки по именам)
#[derive(Debug, Clone, Deserialize)]
pub struct EnemySpec {
    pub name: String,
    #[serde(default = "EnemySpec::default_tribe")]
    pub tribe: u64,
    #[serde(default = "EnemySpec::default_health")]
    pub max_health: f32,
    #[serde(default = "EnemySpec::default_radius")]
    pub collider_radius: f32,
    #[serde(default)]
    pub ai_type: AiType,
    #[serde(default)]
    pub aggro_radius: Option<f32>,
    #[serde(default)]
    pub height: Option<f32>,
    #[serde(default)]
    pub move_speed: Option<f32>,
    #[serde(default)]
    pub ignores_terrain: bool,
    #[serde(default)]
    pub maximum_random_attack_delay: Option<f32>,
    #[serde(default)]
    pub death_time: Option<f32>,
    #[serde(default)]
    pub enrage_weapon_cooldown_multiplier: Option<f32>,
    #[serde(default)]
    pub enrage_duration_on_damage: f32,
    #[serde(default)]
    pub maximum_sideways_stagger: f32,
    #[serde(default)]
    pub weapons_cycle: Vec<String>,
    #[serde(default)]
    pub spawn_on_death: Vec<String>,
}

impl EnemySpec {
    fn default_tribe() -> u64 {
        2
    }

    fn default_health() -> f32 {
        30.0
    }

    fn default_radius() -> f32 {
        0.5
    }
}

/// Корневой JSON документ
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArsenalSpec {
    #[serde(default)]
    pub simulation: Option<SimulationConfig>,
    #[serde(default)]
    pub player: Option<PlayerTuning>,
    #[serde(default)]
    pub weapons: Vec<WeaponDefinition>,
    #[serde(default)]
    pub enemies: Vec<EnemySpec>,
}

/// Загруженные и связанные данные
#[derive(Debug, Clone, Default)]
pub struct Arsenal {
    pub simulation: SimulationConfig,
    pub player: PlayerTuning,
    pub weapons: BTreeMap<String, Arc<WeaponDefinition>>,
    pub enemies: BTreeMap<String, Arc<EnemyTemplate>>,
}

impl Arsenal {
    pub fn weapon(&self, name: &str) -> Option<Arc<WeaponDefinition>> {
        self.weapons.get(name).cloned()
    }

    pub fn enemy(&self, name: &str) -> Option<Arc<EnemyTemplate>> {
        self.enemies.get(name).cloned()
    }
}

/// Прочитать и связать arsenal JSON из файла
pub fn load_arsenal(path: impl AsRef<Path>) -> Result<Arsenal> {
    let path = path.as_ref();
    let txt = std::fs::read_to_string(path).with_context(|| format!("read arsenal: {}", path.display()))?;
    parse_arsenal(&txt).with_context(|| format!("load arsenal: {}", path.display()))
}

/// Разобрать и связать arsenal JSON из строки
pub fn parse_arsenal(txt: &str) -> Result<Arsenal> {
    let spec: ArsenalSpec = serde_json::from_str(txt).context("parse arsenal json")?;
    link_arsenal(spec)
}

/// Резолв ссылок по именам (оружие, death-spawn цепочки)
pub fn link_arsenal(spec: ArsenalSpec) -> Result<Arsenal> {
    let mut weapons = BTreeMap::new();
    for weapon in spec.weapons {
        if weapon.name.is_empty() {
            bail!("weapon without a name");
        }
        let name = weapon.name.clone();
        if weapons.insert(name.clone(), Arc::new(weapon)).is_some() {
            bail!("duplicate weapon '{}'", name);
        }
    }

    let mut specs: HashMap<String, EnemySpec> = HashMap::new();
    for enemy in spec.enemies {
        let name = enemy.name.clone();
        if specs.insert(name.clone(), enemy).is_some() {
            bail!("duplicate enemy '{}'", name);
        }
    }

    let mut enemies = BTreeMap::new();
    let mut names: Vec<&String> = specs.keys().collect();
    names.sort();
    for name in names {
        let mut visiting = Vec::new();
        link_enemy(name, &specs, &weapons, &mut enemies, &mut visiting)?;
    }

    Ok(Arsenal {
        simulation: spec.simulation.unwrap_or_default(),
        player: spec.player.unwrap_or_default(),
        weapons,
        enemies,
    })
}

fn link_enemy(
    name: &str,
    specs: &HashMap<String, EnemySpec>,
    weapons: &BTreeMap<String, Arc<WeaponDefinition>>,
    linked: &mut BTreeMap<String, Arc<EnemyTemplate>>,
    visiting: &mut Vec<String>,
) -> Result<Arc<EnemyTemplate>> {
    if let Some(done) = linked.get(name) {
        return Ok(done.clone());
    }
    if visiting.iter().any(|v| v == name) {
        bail!("spawn_on_death cycle: {} -> {}", visiting.join(" -> "), name);
    }

    let spec = specs
        .get(name)
        .ok_or_else(|| anyhow!("unknown enemy '{}'", name))?;
    visiting.push(name.to_string());

    let weapons_cycle = spec
        .weapons_cycle
        .iter()
        .map(|weapon| {
            weapons
                .get(weapon)
                .cloned()
                .ok_or_else(|| anyhow!("enemy '{}' uses unknown weapon '{}'", name, weapon))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut spawn_on_death = Vec::with_capacity(spec.spawn_on_death.len());
    for child in &spec.spawn_on_death {
        let template = link_enemy(child, specs, weapons, linked, visiting)
            .with_context(|| format!("enemy '{}' spawn_on_death", name))?;
        spawn_on_death.push(template);
    }

    visiting.pop();

    let defaults = EnemyConfig::default();
    let config = EnemyConfig {
        ai_type: spec.ai_type,
        aggro_radius: spec.aggro_radius.unwrap_or(defaults.aggro_radius),
        height: spec.height.unwrap_or(defaults.height),
        move_speed: spec.move_speed.unwrap_or(defaults.move_speed),
        ignores_terrain: spec.ignores_terrain,
        maximum_random_attack_delay: spec
            .maximum_random_attack_delay
            .unwrap_or(defaults.maximum_random_attack_delay),
        death_time: spec.death_time.unwrap_or(defaults.death_time),
        enrage_weapon_cooldown_multiplier: spec
            .enrage_weapon_cooldown_multiplier
            .unwrap_or(defaults.enrage_weapon_cooldown_multiplier),
        enrage_duration_on_damage: spec.enrage_duration_on_damage,
        maximum_sideways_stagger: spec.maximum_sideways_stagger,
        weapons_cycle,
        spawn_on_death,
    };

    let template = Arc::new(EnemyTemplate {
        name: spec.name.clone(),
        tribe: spec.tribe,
        max_health: spec.max_health,
        collider_radius: spec.collider_radius,
        config,
    });
    linked.insert(name.to_string(), template.clone());
    Ok(template)
}
