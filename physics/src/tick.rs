/*!
Physics tick driver.

`update_physics` advances every live physics object through
[`PHYSICS_STEPS`] sub-steps: snapshot, integrate, collide, then dispatch
side effects for the closest hit. Objects live in the level's arena, so the
moving object is taken out of its slot while it is tested against its
neighbors and written back before any hook sees the level.
*/

use crate::collision::dispatch::{CollisionType, object_can_hit_target};
use crate::collision::geometry::reflect;
use crate::collision::narrow_phase::{
    intersect_level_mesh, intersect_object_spheres, intersect_poly_sphere, intersect_sphere_poly,
};
use crate::collision::pvs::PotentialSegments;
use crate::collision::settings::PVS_RADIUS_SCALE;
use crate::collision::types::{HitInfo, LevelHit};
use crate::constants::{MIN_TRAVEL_DISTANCE, PHYSICS_STEPS};
use crate::hooks::PhysicsHooks;
use crate::integrator::{angular_physics, linear_physics, sine_weapon};
use crate::level::Level;
use crate::object::{ObjId, Object, ObjectFlag, ObjectType};
use crate::resources::Resources;
use crate::response::{
    check_destroyable_overlay, check_for_impact, collide_objects, face_towards, scrape_wall,
};
use crate::settings::PhysicsSettings;

/// State carried between physics queries and ticks.
#[derive(Clone, Debug)]
pub struct PhysicsContext {
    pub pvs: PotentialSegments,
    /// Game clock in seconds, advanced by every `update_physics`.
    pub time: f64,
    pub last_scrape_time: f64,
    pub rng: fastrand::Rng,
    pub settings: PhysicsSettings,
}

impl PhysicsContext {
    pub fn new(seed: u64) -> Self {
        Self::with_settings(seed, PhysicsSettings::default())
    }

    pub fn with_settings(seed: u64, settings: PhysicsSettings) -> Self {
        Self {
            pvs: PotentialSegments::new(),
            time: 0.0,
            last_scrape_time: f64::NEG_INFINITY,
            rng: fastrand::Rng::with_seed(seed),
            settings,
        }
    }
}

fn is_simulated(obj: &Object) -> bool {
    if !obj.is_alive() && obj.ty != ObjectType::Reactor {
        return false;
    }
    // Only the local player is simulated.
    if obj.ty == ObjectType::Player && obj.id > 0 {
        return false;
    }
    obj.is_physics()
}

/// Advance every physics object by `dt` seconds.
pub fn update_physics(
    level: &mut Level,
    resources: &Resources,
    hooks: &mut dyn PhysicsHooks,
    ctx: &mut PhysicsContext,
    dt: f32,
) {
    let step = dt / PHYSICS_STEPS as f32;

    for index in 0..level.objects.len() {
        if !is_simulated(&level.objects[index]) {
            continue;
        }
        let Ok(id) = u16::try_from(index).map(ObjId) else {
            break;
        };

        for _ in 0..PHYSICS_STEPS {
            let obj = &mut level.objects[index];
            obj.prev_position = obj.position;
            obj.prev_rotation = obj.rotation;
            obj.physics.prev_velocity = obj.physics.velocity;

            if let Some(info) = resources.weapon_info(obj.id).filter(|_| obj.weapon().is_some()) {
                sine_weapon(obj, step, info.sine_speed, info.sine_amplitude);
            }
            angular_physics(obj, step);
            linear_physics(obj, ctx.time, step);

            if obj.flags.has(ObjectFlag::Attached) {
                continue;
            }

            let hit = intersect_level(level, resources, ctx, id, step);
            if hit.is_hit() {
                resolve_hit(level, resources, hooks, ctx, id, &hit, step);
            }
        }

        if level.objects[index].physics.velocity.norm() * step > MIN_TRAVEL_DISTANCE {
            level.move_object(id);
        }
    }

    ctx.time += dt as f64;
}

/// Two-body response from `obj` against `other_id`, applied to both.
fn collide_with(level: &mut Level, obj: &mut Object, other_id: ObjId, info: &HitInfo) {
    let Some(other) = level.try_get_object_mut(other_id) else {
        return;
    };
    if let Some(response) = collide_objects(info, obj, other) {
        response.apply(obj, other);
    }
}

/// Test object `id` against nearby objects and the level mesh.
///
/// The object is resolved in place. Returns the closest hit.
pub fn intersect_level(
    level: &mut Level,
    resources: &Resources,
    ctx: &mut PhysicsContext,
    id: ObjId,
    dt: f32,
) -> LevelHit {
    let mut hit = LevelHit::from_source(id);
    let Some(slot) = level.objects.get_mut(id.index()) else {
        return hit;
    };
    let mut obj = std::mem::take(slot);

    let segments = ctx.pvs.gather(
        level,
        obj.segment,
        obj.position,
        obj.radius * PVS_RADIUS_SCALE,
    );

    for &seg_id in segments {
        let residents = level.try_get_segment(seg_id).map_or(0, |seg| seg.objects.len());

        // Segment membership only changes after the sub-steps, so indices stay valid.
        for index in 0..residents {
            let Some(other_id) = level
                .try_get_segment(seg_id)
                .and_then(|seg| seg.objects.get(index).copied())
            else {
                continue;
            };
            if other_id == id {
                continue;
            }
            let Some(other) = level.try_get_object(other_id) else {
                continue;
            };
            if other.parent == Some(id) {
                continue;
            }

            match object_can_hit_target(resources, &obj, other_id, other) {
                CollisionType::None | CollisionType::SphereRoom => {}
                CollisionType::SpherePoly => {
                    let Some(model) = other.model.and_then(|m| resources.model(m)) else {
                        log::warn!("object {:?} has no model to collide with", other_id);
                        continue;
                    };
                    if let Some(contact) = intersect_sphere_poly(&obj, other, model, dt) {
                        log::debug!("object {:?} hit model of {:?}", id, other_id);
                        contact.apply(&mut obj);
                        hit.update(&contact.hit, other_id);
                        collide_with(level, &mut obj, other_id, &contact.hit);
                    }
                }
                CollisionType::PolySphere => {
                    let Some(model) = obj.model.and_then(|m| resources.model(m)) else {
                        log::warn!("object {:?} has no model to collide with", id);
                        continue;
                    };
                    if let Some(contact) = intersect_poly_sphere(&obj, other, model, dt) {
                        log::debug!("model of {:?} hit object {:?}", id, other_id);
                        // Seen from the mesh owner, the normal points back at it.
                        let info = HitInfo {
                            normal: -contact.hit.normal,
                            ..contact.hit
                        };
                        hit.update(&info, other_id);
                        if let Some(other) = level.try_get_object_mut(other_id) {
                            contact.apply(other);
                        }
                        collide_with(level, &mut obj, other_id, &info);
                    }
                }
                CollisionType::SphereSphere => {
                    if let Some(contact) = intersect_object_spheres(&obj, other) {
                        log::debug!("object {:?} touched {:?}", id, other_id);
                        hit.update(&contact.hit, other_id);
                        if let Some(correction) = contact.correction {
                            obj.position = correction.position;
                            obj.physics.velocity = correction.velocity;
                            collide_with(level, &mut obj, other_id, &contact.hit);
                        }
                    }
                }
            }
        }
    }

    intersect_level_mesh(level, resources, &mut obj, segments, &mut hit, dt);
    level.objects[id.index()] = obj;
    hit
}

fn parent_is_player(level: &Level, id: ObjId) -> bool {
    level
        .try_get_object(id)
        .and_then(|obj| obj.parent)
        .and_then(|parent| level.try_get_object(parent))
        .is_some_and(Object::is_player)
}

/// Side effects of the closest hit of object `id` this sub-step.
fn resolve_hit(
    level: &mut Level,
    resources: &Resources,
    hooks: &mut dyn PhysicsHooks,
    ctx: &mut PhysicsContext,
    id: ObjId,
    hit: &LevelHit,
    dt: f32,
) {
    let Some(ty) = level.try_get_object(id).map(|obj| obj.ty) else {
        return;
    };

    if ty == ObjectType::Weapon {
        if let Some(target) = hit.hit_obj {
            log::debug!("weapon {:?} hit object {:?}", id, target);
            let signature = level.try_get_object(target).map(|obj| obj.signature);
            if let (Some(signature), Some(weapon)) = (signature, level.try_get_object_mut(id)) {
                weapon.record_hit(signature);
            }
            hooks.weapon_hit_object(level, hit, id);
        } else {
            log::debug!("weapon {:?} hit wall {:?}", id, hit.tag);
            if let Some(tag) = hit.tag {
                let by_player = parent_is_player(level, id);
                check_destroyable_overlay(level, resources, hooks, &hit.point, tag, hit.tri, by_player);
            }
            hooks.weapon_hit_wall(level, hit, id);
        }
    }

    if let Some(wall) = hit.tag.and_then(|tag| level.try_get_side(tag)).and_then(|side| side.wall) {
        hooks.hit_wall(level, hit.point, id, wall);
    }

    if ty == ObjectType::Player {
        if let Some(target) = hit.hit_obj {
            hooks.touch_object(level, id, target);
        }
    }

    let texture = hit
        .tag
        .and_then(|tag| level.try_get_side(tag))
        .and_then(|side| resources.level_texture(side.tmap));

    let Some(obj) = level.try_get_object_mut(id) else {
        return;
    };

    if obj.physics.can_bounce() {
        obj.physics.velocity = reflect(&obj.physics.prev_velocity, &hit.normal);
        if obj.ty == ObjectType::Weapon {
            let heading = obj.physics.velocity;
            face_towards(obj, &heading);
        }
        obj.physics.bounces -= 1;
    }

    if matches!(obj.ty, ObjectType::Player | ObjectType::Robot) {
        match texture {
            Some(texture) if texture.is_liquid() => scrape_wall(ctx, hooks, obj, hit, texture, dt),
            _ => check_for_impact(hooks, obj, hit),
        }
    }
}
