/*!
Responses to contacts and explosions.

Narrow-phase code only reports what touched what. Everything here turns a
hit into velocity, rotation, damage, sounds and level changes. Object pair
responses are computed from shared borrows and applied by the caller so two
arena entries are never borrowed mutably at once.
*/

use std::f32::consts::PI;

use crate::collision::geometry::interpolate_uv;
use crate::collision::raycast::intersect_ray_level;
use crate::collision::settings::IMPACT_NOISE_FLOOR;
use crate::collision::types::{HitInfo, LevelHit, Quat, Ray, Vec3};
use crate::constants::{
    IMPACT_DAMAGE_SCALE, IMPACT_DAMAGE_THRESHOLD, IMPACT_PLAYER_SHIELD_LIMIT, IMPACT_VOLUME_RANGE,
    RESTITUTION, SCRAPE_SOUND_INTERVAL,
};
use crate::hooks::{PhysicsHooks, Sound3d, SoundId};
use crate::level::{Level, SegId, Tag};
use crate::object::{ObjId, Object, ObjectFlag, ObjectType};
use crate::resources::{LevelTexture, Resources, TextureFlag};
use crate::settings::PhysicsSettings;
use crate::tick::PhysicsContext;

/// Velocity and spin changes produced by one object striking another.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionResponse {
    /// Added to the struck object's velocity.
    pub velocity_delta: Vec3,
    /// Stored on both objects.
    pub last_hit_force: Vec3,
    /// Added to the struck object's angular acceleration. Robots only.
    pub angular_acceleration_delta: Option<Vec3>,
}

impl CollisionResponse {
    pub fn apply(&self, a: &mut Object, b: &mut Object) {
        b.physics.velocity += self.velocity_delta;
        if let Some(accel) = self.angular_acceleration_delta {
            b.physics.angular_acceleration += accel;
        }
        a.last_hit_force = self.last_hit_force;
        b.last_hit_force = self.last_hit_force;
    }
}

/// Impulse from `a` hitting `b`, with `hit.normal` pointing toward `a`.
///
/// The impulse is `-normal * speed * m1 / m2` scaled by [`RESTITUTION`], with
/// zero masses treated as one. A struck robot also picks up spin from the
/// impulse applied at the contact point, using a solid sphere's inertia.
pub fn collide_objects(hit: &HitInfo, a: &Object, b: &Object) -> Option<CollisionResponse> {
    if hit.speed <= IMPACT_NOISE_FLOOR {
        return None;
    }

    if matches!(b.ty, ObjectType::Powerup | ObjectType::Marker) {
        return None;
    }

    let m1 = if a.physics.mass == 0.0 { 1.0 } else { a.physics.mass };
    let m2 = if b.physics.mass == 0.0 { 1.0 } else { b.physics.mass };

    let force = -hit.normal * hit.speed * m1 / m2;
    let impulse = force * RESTITUTION;

    // Only robots spin. Players keep their aim.
    let inertia = 2.0 / 5.0 * m2 * b.radius * b.radius;
    let angular_acceleration_delta = (b.ty == ObjectType::Robot && inertia > 0.0).then(|| {
        let local_force = b.rotation.inverse_transform_vector(&force);
        let arm = b.rotation.inverse_transform_vector(&(hit.point - b.position));
        local_force.cross(&arm) / inertia
    });

    Some(CollisionResponse {
        velocity_delta: impulse,
        last_hit_force: impulse,
        angular_acceleration_delta,
    })
}

/// Add `force / mass` to a physics object's velocity. No-op without mass.
pub fn apply_force(obj: &mut Object, force: &Vec3) {
    if !obj.is_physics() || obj.physics.mass <= 0.0 {
        return;
    }
    obj.physics.velocity += force / obj.physics.mass;
}

pub fn bump_object(obj: &mut Object, direction: &Vec3, damage: f32) {
    apply_force(obj, &(direction * damage));
}

/// Shortest world-space rotation taking the object's forward axis onto `towards`.
fn arc_to(obj: &Object, towards: &Vec3) -> Quat {
    // Facing directly away has no unique shortest arc, so turn about up.
    Quat::rotation_between(&obj.forward(), towards)
        .unwrap_or_else(|| Quat::from_axis_angle(&(obj.rotation * Vec3::y_axis()), PI))
}

/// Rotate the object so it faces along `direction`.
pub fn face_towards(obj: &mut Object, direction: &Vec3) {
    if *direction == Vec3::zeros() {
        return;
    }
    obj.rotation = arc_to(obj, direction) * obj.rotation;
}

/// Set angular velocity so the object turns its forward axis onto `towards`
/// in `rate` seconds.
pub fn turn_towards_vector(obj: &mut Object, towards: &Vec3, rate: f32) {
    if *towards == Vec3::zeros() || rate <= 0.0 {
        return;
    }

    let rotation = arc_to(obj, towards);
    let local = obj.rotation.inverse_transform_vector(&rotation.scaled_axis());
    // Integration negates stored rates and multiplies by a full turn.
    obj.physics.angular_velocity = -local / rate / std::f32::consts::TAU;
}

/// Spin an object toward `force`. Heavier objects and weaker forces turn slower.
pub fn apply_rotation(obj: &mut Object, force: &Vec3) {
    if !obj.is_physics() || obj.physics.mass <= 0.0 {
        return;
    }

    let magnitude = force.norm() / 8.0;
    if magnitude == 0.0 {
        return;
    }

    let min_rate = if obj.ty == ObjectType::Robot { 0.25 } else { 0.5 };
    let rate = (obj.physics.mass / magnitude).max(min_rate);
    turn_towards_vector(obj, force, rate);
}

/// Splash damage and knockback.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GameExplosion {
    pub segment: SegId,
    pub position: Vec3,
    pub radius: f32,
    pub damage: f32,
    pub force: f32,
}

fn is_player_attributed(level: &Level, source: Option<ObjId>) -> bool {
    let Some(src) = source.and_then(|id| level.try_get_object(id)) else {
        return false;
    };

    match src.ty {
        ObjectType::Player => true,
        ObjectType::Weapon => src
            .parent
            .and_then(|parent| level.try_get_object(parent))
            .is_some_and(Object::is_player),
        _ => false,
    }
}

/// Apply an explosion to every live player, robot, mine and reactor in range.
///
/// Damage and force fall off linearly to zero at the radius. Distance is
/// measured to the surface for everything but players, and walls between the
/// center and the object block the explosion.
///
/// # Panics
///
/// If an object type without explosion behavior gets past the type filter.
pub fn create_explosion(
    level: &mut Level,
    resources: &Resources,
    hooks: &mut dyn PhysicsHooks,
    settings: &PhysicsSettings,
    source: Option<ObjId>,
    explosion: &GameExplosion,
) {
    let player_attributed = is_player_attributed(level, source);

    for index in 0..level.objects.len() {
        if source.is_some_and(|id| id.index() == index) {
            continue;
        }

        let obj = &level.objects[index];
        if !obj.is_alive() {
            continue;
        }

        match obj.ty {
            ObjectType::Player | ObjectType::Robot | ObjectType::Reactor => {}
            ObjectType::Weapon if resources.weapon_is_mine(obj.id) => {}
            _ => continue,
        }

        let offset = obj.position - explosion.position;
        let mut dist = offset.norm();
        if !matches!(obj.ty, ObjectType::Player | ObjectType::Coop) {
            dist -= obj.radius;
        }
        if dist >= explosion.radius {
            continue;
        }
        let dist = dist.max(0.0);

        let dir = offset.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::zeros);
        if let Some(ray) = Ray::new(explosion.position, dir) {
            let blocked = intersect_ray_level(
                level,
                resources,
                &ray,
                Some(explosion.segment),
                dist,
                true,
                true,
            );
            if blocked.is_some() {
                continue;
            }
        }

        let falloff = dist / explosion.radius;
        let damage = explosion.damage - falloff * explosion.damage;
        let force = dir * (explosion.force - falloff * explosion.force);

        let obj = &mut level.objects[index];
        match obj.ty {
            ObjectType::Weapon => apply_force(obj, &force),
            ObjectType::Robot => {
                apply_force(obj, &force);
                if !settings.disable_weapon_damage {
                    hooks.apply_damage(obj, damage);
                }
                obj.last_hit_force = force;
                apply_rotation(obj, &force);
            }
            ObjectType::Reactor => {
                if !settings.disable_weapon_damage && player_attributed {
                    hooks.apply_damage(obj, damage);
                }
            }
            // Player damage goes through the player system.
            ObjectType::Player => apply_force(obj, &force),
            ty => unreachable!("explosion reached object type {ty:?}"),
        }
    }
}

/// Detonate a weapon's splash at its current position.
pub fn explode_weapon(
    level: &mut Level,
    resources: &Resources,
    hooks: &mut dyn PhysicsHooks,
    settings: &PhysicsSettings,
    weapon: ObjId,
) {
    let Some(obj) = level.try_get_object(weapon) else {
        return;
    };
    let Some(info) = resources.weapon_info(obj.id) else {
        log::warn!("weapon {:?} has no weapon info for id {}", weapon, obj.id);
        return;
    };
    if info.splash_radius <= 0.0 {
        return;
    }

    let explosion = GameExplosion {
        segment: obj.segment,
        position: obj.position,
        radius: info.splash_radius,
        damage: info.splash_damage,
        force: info.splash_force,
    };
    create_explosion(level, resources, hooks, settings, Some(weapon), &explosion);
}

fn random_signed(ctx: &mut PhysicsContext) -> f32 {
    ctx.rng.f32() * 2.0 - 1.0
}

/// Contact with lava or water: damage over time, a throttled sound, a
/// random tumble and a small push away from the surface.
pub fn scrape_wall(
    ctx: &mut PhysicsContext,
    hooks: &mut dyn PhysicsHooks,
    obj: &mut Object,
    hit: &LevelHit,
    texture: &LevelTexture,
    dt: f32,
) {
    if !texture.is_liquid() {
        return;
    }

    let volatile = texture.flags.has(TextureFlag::Volatile);
    if volatile {
        let mut damage = texture.damage * dt;
        if ctx.settings.is_trainee() {
            damage *= 0.5;
        }

        if obj.is_player() {
            hooks.apply_player_damage(damage);
        } else {
            hooks.apply_damage(obj, damage);
        }
    }

    if ctx.time > ctx.last_scrape_time + SCRAPE_SOUND_INTERVAL || ctx.time < ctx.last_scrape_time {
        ctx.last_scrape_time = ctx.time;
        let id = if volatile {
            SoundId::TouchLava
        } else {
            SoundId::TouchWater
        };
        let segment = hit.tag.map_or(obj.segment, |tag| tag.segment);
        hooks.play_sound(Sound3d::at(id, hit.point, segment));
    }

    obj.physics.angular_velocity.x = random_signed(ctx) / 8.0;
    obj.physics.angular_velocity.z = random_signed(ctx) / 8.0;

    let jitter = Vec3::new(random_signed(ctx), random_signed(ctx), random_signed(ctx)) / 8.0;
    let dir = (hit.normal + jitter)
        .try_normalize(f32::EPSILON)
        .unwrap_or(hit.normal);
    apply_force(obj, &(dir / 8.0));
}

/// Damage and a thud when a wall stops an object sharply.
pub fn check_for_impact(hooks: &mut dyn PhysicsHooks, obj: &mut Object, hit: &LevelHit) {
    let speed = (obj.physics.velocity - obj.physics.prev_velocity).norm();
    let damage = speed / IMPACT_DAMAGE_SCALE;
    if damage <= IMPACT_DAMAGE_THRESHOLD {
        return;
    }

    let volume =
        ((speed - IMPACT_DAMAGE_SCALE * IMPACT_DAMAGE_THRESHOLD) / IMPACT_VOLUME_RANGE).clamp(0.0, 1.0);
    if volume > 0.0 {
        let segment = hit.tag.map_or(obj.segment, |tag| tag.segment);
        hooks.play_sound(Sound3d::at(SoundId::PlayerHitWall, hit.point, segment));
    }

    if obj.is_player() {
        if obj.hit_points < IMPACT_PLAYER_SHIELD_LIMIT && !obj.flags.has(ObjectFlag::Invulnerable) {
            hooks.apply_player_damage(damage);
        }
    } else {
        hooks.apply_damage(obj, damage);
    }
}

/// Destroy the overlay texture under `point` if it is destroyable and the
/// texel struck is opaque. Returns true when the overlay was destroyed.
///
/// Only players may destroy overlays on walls that carry a trigger. A
/// destroyed overlay plays its sound and activates the wall's trigger.
pub fn check_destroyable_overlay(
    level: &mut Level,
    resources: &Resources,
    hooks: &mut dyn PhysicsHooks,
    point: &Vec3,
    tag: Tag,
    tri: usize,
    is_player: bool,
) -> bool {
    let tri = tri.min(1);
    let Some(side) = level.try_get_side(tag) else {
        return false;
    };
    let Some(overlay) = side.tmap2 else {
        return false;
    };
    let Some(info) = resources.level_texture(overlay) else {
        return false;
    };
    let Some(destroyed) = info.destroyed_texture else {
        return false;
    };

    let wall = level.try_get_wall(tag);
    let trigger = wall.and_then(|w| w.trigger);
    if !is_player && trigger.is_some() {
        return false;
    }

    let Some(uv) = interpolate_uv(point, &side.triangle(tri), &side.triangle_uvs(tri)) else {
        return false;
    };
    let rotation = side.overlay_rotation;
    if resources
        .bitmap(overlay)
        .is_some_and(|bitmap| bitmap.texel(uv, rotation).is_transparent())
    {
        return false;
    }

    let sound = info.destroyed_sound.unwrap_or(SoundId::LightDestroyed);
    if let Some(side) = level.try_get_side_mut(tag) {
        side.tmap2 = Some(destroyed);
    }
    hooks.play_sound(Sound3d::at(sound, *point, tag.segment));

    if let Some(trigger) = trigger {
        log::info!("activating switch {}:{:?}", tag.segment.0, tag.side);
        hooks.activate_trigger(level, trigger);
    }

    true
}
