//! Projectile компоненты и shared state
//!
//! - Projectile: owner (weak) + племя владельца, weapon (Arc), lifetime, hit budget, wave id
//! - HitHistory: wave id → акторы, которых эта волна уже задела
//! - ReflectorRegistry: отражающий shape → владелец отражателя
//!
//! Lifecycle: снаряд создаётся WeaponFiring с полным lifetime/budget,
//! уничтожается когда `lifetime <= 0 || hits == 0`. При уничтожении
//! hit history волны и отражающий shape удаляются.

use bevy::prelude::*;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::WeaponDefinition;
use crate::physics::ShapeId;

/// Id волны снарядов (монотонно растёт; залп "одной волной" делит id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect)]
pub struct ProjectileId(pub u32);

/// Resource: счётчик ProjectileId
#[derive(Resource, Debug, Default)]
pub struct ProjectileCounter {
    next: u32,
}

impl ProjectileCounter {
    pub fn current(&self) -> ProjectileId {
        ProjectileId(self.next)
    }

    pub fn advance(&mut self) {
        self.next = self.next.wrapping_add(1);
    }
}

/// Снаряд в полёте (направление = forward его Transform)
#[derive(Component, Debug, Clone)]
pub struct Projectile {
    pub weapon: Arc<WeaponDefinition>,
    /// Кто выстрелил (weak: может быть уже despawned)
    pub owner: Option<Entity>,
    /// Племя владельца на момент выстрела/отражения (переживает despawn владельца)
    pub owner_tribe: Option<u64>,
    pub remaining_lifetime: f32,
    pub remaining_hits: u32,
    pub id: ProjectileId,
    /// Без визуала (hidden attack или визуал заменён locked effect)
    pub hidden: bool,
}

/// Что нужно знать о цели для CanHitActor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitTarget {
    pub entity: Entity,
    pub tribe: u64,
    pub dodging: bool,
}

impl Projectile {
    pub fn new(weapon: Arc<WeaponDefinition>, owner: Option<Entity>, id: ProjectileId) -> Self {
        let hidden = weapon.hidden_attack || weapon.projectile_locked_effect.is_some();
        Self {
            remaining_lifetime: weapon.lifetime,
            remaining_hits: weapon.maximum_enemies_hit,
            weapon,
            owner,
            owner_tribe: None,
            id,
            hidden,
        }
    }

    pub fn with_owner_tribe(mut self, tribe: Option<u64>) -> Self {
        self.owner_tribe = tribe;
        self
    }

    pub fn is_lifetime_over(&self) -> bool {
        self.remaining_lifetime <= 0.0 || self.remaining_hits == 0
    }

    pub fn speed(&self) -> f32 {
        self.weapon.move_speed
    }

    /// CanHitActor: цель есть, не в dodge, не из племени владельца,
    /// и эта волна её ещё не задевала
    pub fn can_hit_actor(&self, target: Option<HitTarget>, history: &HitHistory) -> bool {
        let Some(target) = target else {
            return false;
        };

        if target.dodging {
            return false;
        }

        if self.owner_tribe == Some(target.tribe) {
            return false;
        }

        !history.contains(self.id, target.entity)
    }

    /// AddHitToActor: запоминаем цель и тратим hit budget
    pub fn add_hit_to_actor(&mut self, target: Entity, history: &mut HitHistory) {
        history.record(self.id, target);
        self.remaining_hits = self.remaining_hits.saturating_sub(1);
    }

    /// Отражающий актор становится владельцем (вместе с его племенем)
    pub fn transfer_ownership(&mut self, owner: Entity, tribe: Option<u64>) {
        self.owner = Some(owner);
        self.owner_tribe = tribe;
    }

    /// Отражение: разворот к точке + полный lifetime оружия
    pub fn redirect_towards(&mut self, transform: &mut Transform, target: Vec3) {
        transform.look_at(target, Vec3::Y);
        self.remaining_lifetime = self.weapon.lifetime;
    }
}

/// Отражающий shape снаряда (радиус = weapon.radius)
#[derive(Component, Debug, Clone, Copy)]
pub struct ReflectionShape {
    pub shape: ShapeId,
    pub radius: f32,
}

/// Resource: wave id → кого уже задели
///
/// Запись создаётся лениво (при первом попадании).
#[derive(Resource, Debug, Default)]
pub struct HitHistory {
    hits: HashMap<ProjectileId, HashSet<Entity>>,
}

impl HitHistory {
    pub fn contains(&self, id: ProjectileId, actor: Entity) -> bool {
        self.hits.get(&id).is_some_and(|actors| actors.contains(&actor))
    }

    pub fn record(&mut self, id: ProjectileId, actor: Entity) {
        self.hits.entry(id).or_default().insert(actor);
    }

    /// Снаряд уничтожен - история его волны больше не нужна
    pub fn discard(&mut self, id: ProjectileId) {
        self.hits.remove(&id);
    }

    pub fn tracked_waves(&self) -> usize {
        self.hits.len()
    }
}

/// Resource: отражающий shape → актор-отражатель (None = ничей)
#[derive(Resource, Debug, Default)]
pub struct ReflectorRegistry {
    reflectors: HashMap<ShapeId, Option<Entity>>,
}

impl ReflectorRegistry {
    pub fn register(&mut self, shape: ShapeId, reflector: Option<Entity>) {
        self.reflectors.insert(shape, reflector);
    }

    pub fn unregister(&mut self, shape: ShapeId) {
        self.reflectors.remove(&shape);
    }

    /// Some(None) - shape зарегистрирован, но отражатель без владельца
    pub fn get(&self, shape: ShapeId) -> Option<Option<Entity>> {
        self.reflectors.get(&shape).copied()
    }

    pub fn contains(&self, shape: ShapeId) -> bool {
        self.reflectors.contains_key(&shape)
    }

    pub fn len(&self) -> usize {
        self.reflectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reflectors.is_empty()
    }
}
