//! Weapon firing: общий протокол выстрела для игроков и врагов
//!
//! Веер из `number_to_spawn` снарядов вокруг текущего поворота актора:
//! первый выстрел повёрнут на `+total/2`, каждый следующий на `-spread`.
//! Cooldown здесь НЕ трогаем (ответственность вызывающего).

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use std::sync::Arc;

use super::{Projectile, ProjectileCounter, ReflectionShape, ReflectorRegistry, WeaponDefinition};
use crate::components::Actor;
use crate::effects::CosmeticEvent;
use crate::physics::{ShapeId, ShapeIdAllocator};

/// Event: актор выпустил залп
#[derive(Event, Debug, Clone)]
pub struct WeaponFired {
    pub shooter: Entity,
    pub weapon_name: String,
    pub projectiles: u32,
}

/// Transforms снарядов одного залпа (в порядке выстрела)
pub fn volley_transforms(position: Vec3, rotation: Quat, weapon: &WeaponDefinition) -> Vec<Transform> {
    let count = weapon.number_to_spawn;
    let start_angle = weapon.total_spread_degrees() / 2.0;

    (0..count)
        .map(|shot| {
            let yaw = start_angle - shot as f32 * weapon.spread_between_shots_degrees;
            let shot_rotation = rotation * Quat::from_rotation_y(yaw.to_radians());
            let spawn_position = position + shot_rotation * (Vec3::NEG_Z * weapon.start_distance);
            Transform::from_translation(spawn_position).with_rotation(shot_rotation)
        })
        .collect()
}

/// SystemParam: всё, что нужно системе для выстрела
///
/// Используется player и enemy системами. Commands доступны через
/// `commands()` (вторая Commands в той же системе не нужна).
#[derive(SystemParam)]
pub struct WeaponFiring<'w, 's> {
    commands: Commands<'w, 's>,
    counter: ResMut<'w, ProjectileCounter>,
    reflectors: ResMut<'w, ReflectorRegistry>,
    shape_ids: ResMut<'w, ShapeIdAllocator>,
    cosmetics: EventWriter<'w, CosmeticEvent>,
    fired: EventWriter<'w, WeaponFired>,
    tribes: Query<'w, 's, &'static Actor>,
}

impl<'w, 's> WeaponFiring<'w, 's> {
    /// Выстрелить оружием от лица `shooter`
    ///
    /// Возвращает количество выпущенных снарядов (0 = no-op).
    pub fn fire(&mut self, shooter: Entity, shooter_transform: &Transform, weapon: &Arc<WeaponDefinition>) -> usize {
        if weapon.number_to_spawn == 0 {
            return 0;
        }

        let volley = volley_transforms(shooter_transform.translation, shooter_transform.rotation, weapon);
        let shooter_tribe = self.tribes.get(shooter).ok().map(|actor| actor.tribe);

        for transform in &volley {
            let projectile = Projectile::new(Arc::clone(weapon), Some(shooter), self.counter.current())
                .with_owner_tribe(shooter_tribe);
            let mut entity = self.commands.spawn((*transform, projectile));

            if weapon.reflects_other_attacks {
                let shape = self.shape_ids.mint();
                self.reflectors.register(shape, Some(shooter));
                entity.insert(ReflectionShape {
                    shape,
                    radius: weapon.radius,
                });
            }

            let projectile_entity = entity.id();
            if let Some(effect) = &weapon.projectile_locked_effect {
                self.cosmetics.write(CosmeticEvent::Spawn {
                    effect: effect.clone(),
                    lifetime: weapon.lifetime,
                    position: transform.translation,
                    rotation: transform.rotation,
                    follow: Some(projectile_entity),
                });
            }

            if !weapon.treat_projectiles_as_one_wave {
                self.counter.advance();
            }
        }
        self.counter.advance();

        if let Some(effect) = &weapon.actor_effect_on_firing {
            self.cosmetics.write(CosmeticEvent::spawn(
                effect,
                shooter_transform.translation,
                shooter_transform.rotation,
                Some(shooter),
            ));
        }

        self.fired.write(WeaponFired {
            shooter,
            weapon_name: weapon.name.clone(),
            projectiles: weapon.number_to_spawn,
        });

        volley.len()
    }

    /// Отдельный cosmetic request (dodge, crashdown landing)
    pub fn cosmetic(&mut self, event: CosmeticEvent) {
        self.cosmetics.write(event);
    }

    pub fn commands(&mut self) -> &mut Commands<'w, 's> {
        &mut self.commands
    }

    /// ShapeId для актора, которого система спавнит сама (death-spawn)
    pub fn mint_shape(&mut self) -> ShapeId {
        self.shape_ids.mint()
    }
}
