//! Level ray caster: walks a ray from segment to segment through open sides.

use std::collections::HashSet;

use crate::level::{Level, SegId, SideId, Tag};
use crate::object::{Object, ObjectType};
use crate::resources::Resources;

use super::geometry::{intersect_capsule_sphere, intersect_ray_triangle};
use super::pvs::PotentialSegments;
use super::settings::MIN_RAY_DISTANCE;
use super::types::{Capsule, LevelHit, Ray};

/// Cast `ray` through the level starting in `start`.
///
/// Each segment is tested against the front faces of its six sides and the
/// closest crossing decides what happens next: a solid side ends the walk
/// with a hit, an open side continues into the neighbor. Transparent walls
/// are passed with `pass_transparent`, or with `hit_test_textures` when the
/// struck texel is see-through. Returns `None` when the ray leaves the level,
/// revisits a segment or would hit beyond `max_distance`.
pub fn intersect_ray_level(
    level: &Level,
    resources: &Resources,
    ray: &Ray,
    start: Option<SegId>,
    max_distance: f32,
    pass_transparent: bool,
    hit_test_textures: bool,
) -> Option<LevelHit> {
    let mut next = start?;
    if max_distance <= MIN_RAY_DISTANCE {
        return None;
    }

    let mut visited = HashSet::new();

    loop {
        let seg_id = next;
        visited.insert(seg_id);
        let seg = level.try_get_segment(seg_id)?;

        let mut closest: Option<(f32, SideId, usize)> = None;
        for side_id in SideId::ALL {
            let side = seg.side(side_id);
            for tri in 0..2 {
                let Some(dist) = intersect_ray_triangle(
                    ray,
                    &side.triangle(tri),
                    &side.normals[tri],
                    f32::MAX,
                    true,
                ) else {
                    continue;
                };

                if closest.is_none_or(|(best, ..)| dist < best) {
                    closest = Some((dist, side_id, tri));
                }
            }
        }

        let (dist, side_id, tri) = closest?;
        if dist > max_distance {
            return None;
        }

        let tag = Tag::new(seg_id, side_id);
        let point = ray.at(dist);

        let is_solid = if seg.side(side_id).wall.is_some() && level.wall_is_transparent(resources, tag)
        {
            !(pass_transparent
                || (hit_test_textures
                    && level.wall_point_is_transparent(resources, tag, &point, tri)))
        } else {
            level.side_is_solid(tag)
        };

        if is_solid {
            let side = seg.side(side_id);
            return Some(LevelHit {
                point,
                normal: side.average_normal,
                tangent: side.tangents[tri],
                distance: dist,
                tag: Some(tag),
                tri,
                edge_distance: side.edge_distance(&point),
                ..LevelHit::default()
            });
        }

        match seg.connection(side_id) {
            Some(conn) if !visited.contains(&conn) => next = conn,
            _ => return None,
        }
    }
}

/// True if nothing in the level blocks the line between two objects.
pub fn object_to_object_visibility(
    level: &Level,
    resources: &Resources,
    a: &Object,
    b: &Object,
    pass_transparent: bool,
) -> bool {
    let delta = b.position - a.position;
    let Some(ray) = Ray::new(a.position, delta) else {
        return true;
    };

    intersect_ray_level(
        level,
        resources,
        &ray,
        Some(a.segment),
        delta.norm(),
        pass_transparent,
        true,
    )
    .is_none()
}

/// Sweep a debris capsule against robots, players and reactors near it.
///
/// Debris does not collide with other objects or with level geometry here.
pub fn intersect_level_debris(
    level: &Level,
    pvs: &mut PotentialSegments,
    capsule: &Capsule,
    segment: SegId,
) -> Option<LevelHit> {
    let direction = (capsule.b - capsule.a).try_normalize(f32::EPSILON)?;

    for &seg_id in pvs.gather(level, segment, capsule.a, capsule.radius) {
        let Some(seg) = level.try_get_segment(seg_id) else {
            continue;
        };

        for &other_id in &seg.objects {
            let Some(other) = level.try_get_object(other_id) else {
                continue;
            };
            if !other.is_alive() || other.segment != seg_id {
                continue;
            }
            if !matches!(
                other.ty,
                ObjectType::Player | ObjectType::Robot | ObjectType::Reactor
            ) {
                continue;
            }

            if let Some(closest) = intersect_capsule_sphere(capsule, &other.position, other.radius) {
                let distance = (closest - capsule.a).norm();
                return Some(LevelHit {
                    hit_obj: Some(other_id),
                    point: closest,
                    normal: -direction,
                    distance,
                    tag: None,
                    ..LevelHit::default()
                });
            }
        }
    }

    None
}
