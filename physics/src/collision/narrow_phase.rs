/*!
Narrow phase: a moving sphere against level sides, object models and other spheres.

All tests share one sphere-vs-triangle routine:
- inflate the triangle plane by the sphere radius and project the center onto it;
- if the projection lands inside the inflated triangle (and the sphere moves
  toward it) this is a face contact;
- otherwise fall back to the closest point on the real triangle, accepted only
  when it is within the radius and the sphere is not moving away from it.

Multiple contacts in one call are averaged into a single corrected position.
*/

use crate::collision::settings::{RAYCAST_TRAVEL_RATIO, ROBOT_SPHERE_SCALE, ROBOT_WALL_SPIN_DAMPING};
use crate::level::{Level, SegId, SideId, Tag};
use crate::object::{Object, ObjectType};
use crate::resources::{Model, Resources};

use super::geometry::{
    Tri, TriangleRegion, closest_point_on_triangle, edge_tangent, intersect_ray_triangle,
    intersect_sphere_sphere, triangle_contains_point,
};
use super::types::{HitInfo, LevelHit, Plane, Ray, Vec3};

/// A sphere touching one triangle.
#[derive(Clone, Copy, Debug, PartialEq)]
struct TriangleContact {
    /// Contact point on the triangle surface.
    point: Vec3,
    /// Points from the surface toward the sphere.
    normal: Vec3,
    /// Negative for face contacts (depth past the inflated plane), positive for edges.
    distance: f32,
    region: TriangleRegion,
}

/// Sphere vs. a single triangle.
///
/// `include_touching` accepts a center lying exactly on the inflated plane.
fn sphere_triangle_contact(
    center: &Vec3,
    radius: f32,
    direction: &Vec3,
    tri: &Tri,
    normal: &Vec3,
    include_touching: bool,
) -> Option<TriangleContact> {
    let offset = normal * radius;
    let inflated = Plane::new(tri[0] + offset, *normal);
    let plane_dist = inflated.distance(center);

    let in_front = if include_touching {
        plane_dist > 0.0
    } else {
        plane_dist >= 0.0
    };
    if in_front || plane_dist < -radius {
        return None;
    }

    let faces_sphere = direction.dot(normal) <= 0.0;
    let projected = inflated.project(center);
    if faces_sphere && triangle_contains_point(&tri.map(|p| p + offset), &projected) {
        return Some(TriangleContact {
            point: projected - offset,
            normal: *normal,
            distance: plane_dist,
            region: TriangleRegion::Face,
        });
    }

    let (closest, region) = closest_point_on_triangle(center, tri);
    let dist = (center - closest).norm();
    if dist > radius {
        return None;
    }

    let edge_normal = (center - closest).try_normalize(f32::EPSILON)?;
    if direction.dot(&edge_normal) > 0.0 {
        // Moving away from the edge.
        return None;
    }

    Some(TriangleContact {
        point: closest,
        normal: edge_normal,
        distance: dist,
        region,
    })
}

/// Test a moving object against every solid side in `pvs` and resolve it.
///
/// Weapons raycast along their path from `prev_position` instead, and pass
/// through transparent texels. The object's velocity loses its component into
/// each surface (unless piercing) and its position moves to the average of
/// the corrected positions. The closest contact is folded into `hit`.
pub fn intersect_level_mesh(
    level: &Level,
    resources: &Resources,
    obj: &mut Object,
    pvs: &[SegId],
    hit: &mut LevelHit,
    dt: f32,
) {
    let travel = obj.physics.velocity.norm() * dt;
    let direction = obj
        .physics
        .velocity
        .try_normalize(f32::EPSILON)
        .unwrap_or_else(Vec3::zeros);
    let path = Ray::new(obj.prev_position, direction);
    let is_weapon = obj.ty == ObjectType::Weapon;
    let piercing = obj.physics.is_piercing();
    let radius = obj.radius;

    let mut average = Vec3::zeros();
    let mut hits = 0u32;

    for &seg_id in pvs {
        let Some(seg) = level.try_get_segment(seg_id) else {
            continue;
        };

        for side_id in SideId::ALL {
            let tag = Tag::new(seg_id, side_id);
            if !level.side_is_solid(tag) {
                continue;
            }
            let side = seg.side(side_id);

            for tri_index in 0..2 {
                let tri = side.triangle(tri_index);
                let normal = side.normals[tri_index];

                let (contact, resolved) = if is_weapon {
                    let Some(path) = path else {
                        continue;
                    };
                    let Some(dist) = intersect_ray_triangle(&path, &tri, &normal, travel, true)
                    else {
                        continue;
                    };
                    let point = path.at(dist);
                    let contact = TriangleContact {
                        point,
                        normal,
                        distance: dist,
                        region: TriangleRegion::Face,
                    };
                    (contact, point - direction * radius)
                } else {
                    let Some(contact) = sphere_triangle_contact(
                        &obj.position,
                        radius,
                        &direction,
                        &tri,
                        &normal,
                        false,
                    ) else {
                        continue;
                    };
                    if contact.distance >= radius {
                        continue;
                    }
                    (contact, contact.point + contact.normal * radius)
                };

                if is_weapon && level.wall_point_is_transparent(resources, tag, &contact.point, tri_index)
                {
                    continue;
                }

                let hit_speed = contact.normal.dot(&obj.physics.velocity);
                if !piercing {
                    obj.physics.velocity -= contact.normal * hit_speed;
                    average += resolved;
                    hits += 1;
                }

                if obj.ty == ObjectType::Robot {
                    obj.physics.angular_acceleration *= ROBOT_WALL_SPIN_DAMPING;
                }

                if contact.distance < hit.distance {
                    hit.point = contact.point;
                    hit.normal = contact.normal;
                    hit.tangent = match contact.region {
                        TriangleRegion::Face => side.tangents[tri_index],
                        region => edge_tangent(&tri, region.edge()),
                    };
                    hit.distance = contact.distance;
                    hit.speed = hit_speed.abs();
                    hit.tag = Some(tag);
                    hit.tri = tri_index;
                    hit.edge_distance = side.edge_distance(&contact.point);
                    hit.hit_obj = None;
                }
            }
        }
    }

    if hits > 0 {
        obj.position = average / hits as f32;
    }
}

/// Resolution of a sphere against another object's model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshContact {
    /// Closest contact, in world space, with the largest speed into any surface.
    pub hit: HitInfo,
    /// Velocity after sliding along every touched surface.
    pub velocity: Vec3,
    /// Averaged corrected position, if the sphere should be moved.
    pub position: Option<Vec3>,
}

impl MeshContact {
    /// Write the resolution back to the sphere that was tested.
    pub fn apply(&self, sphere: &mut Object) {
        sphere.physics.velocity = self.velocity;
        if let Some(position) = self.position {
            sphere.position = position;
        }
    }
}

/// Sphere of `obj` against the model of `target`.
///
/// The sphere is moved into the target's model space. When it travels more
/// than `RAYCAST_TRAVEL_RATIO` radii this step, it is first moved back along
/// its path to the nearest front face the path crosses, so thin geometry
/// cannot be skipped. Weapons and
/// reactors are never repositioned.
pub fn intersect_sphere_poly(
    obj: &Object,
    target: &Object,
    model: &Model,
    dt: f32,
) -> Option<MeshContact> {
    let radius = obj.radius;
    let travel = obj.physics.velocity.norm() * dt;
    let needs_raycast = travel > radius * RAYCAST_TRAVEL_RATIO;

    if !needs_raycast && (obj.position - target.position).norm() > radius + target.radius {
        return None;
    }

    let direction = obj
        .physics
        .velocity
        .try_normalize(f32::EPSILON)
        .unwrap_or_else(Vec3::zeros);
    let local_dir = target.rotation.inverse_transform_vector(&direction);
    let local_prev = target.to_local(&obj.prev_position);
    let mut local_pos = target.to_local(&obj.position);

    let piercing = obj.physics.is_piercing();
    let repositions = !matches!(obj.ty, ObjectType::Weapon | ObjectType::Reactor);
    let mut velocity = obj.physics.velocity;
    let mut speed = 0.0f32;
    let mut average = Vec3::zeros();
    let mut hits = 0u32;
    let mut closest: Option<HitInfo> = None;

    if needs_raycast {
        if let Some(path) = Ray::new(local_prev, local_dir) {
            let nearest = model
                .triangles()
                .filter_map(|(tri, normal)| intersect_ray_triangle(&path, &tri, &normal, travel, true))
                .min_by(f32::total_cmp);
            if let Some(dist) = nearest {
                local_pos = path.at(dist - radius);
            }
        }
    }

    for (tri, normal) in model.triangles() {
        let Some(contact) =
            sphere_triangle_contact(&local_pos, radius, &local_dir, &tri, &normal, true)
        else {
            continue;
        };
        if contact.distance >= radius {
            continue;
        }

        let point = target.to_world(&contact.point);
        let normal = target.rotation * contact.normal;
        if !piercing {
            let into = normal.dot(&velocity);
            speed = speed.max(into.abs());
            velocity -= normal * into;
            if repositions {
                average += point + normal * radius;
                hits += 1;
            }
        }

        if closest.is_none_or(|c| contact.distance < c.distance) {
            closest = Some(HitInfo {
                point,
                normal,
                distance: contact.distance,
                speed: 0.0,
            });
        }
    }

    let mut hit = closest?;
    hit.speed = speed;

    Some(MeshContact {
        hit,
        velocity,
        position: (hits > 0).then(|| average / hits as f32),
    })
}

/// Mirror of [`intersect_sphere_poly`]: `target`'s sphere against `obj`'s model.
///
/// The returned contact resolves `target`, and its normal points toward it.
pub fn intersect_poly_sphere(
    obj: &Object,
    target: &Object,
    model: &Model,
    dt: f32,
) -> Option<MeshContact> {
    intersect_sphere_poly(target, obj, model, dt)
}

/// Immediate resolution of a sphere-sphere contact for the moving object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphereCorrection {
    pub position: Vec3,
    pub velocity: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphereContact {
    pub hit: HitInfo,
    /// Only set for robot and player pairs.
    pub correction: Option<SphereCorrection>,
}

fn is_ship(ty: ObjectType) -> bool {
    matches!(ty, ObjectType::Robot | ObjectType::Player)
}

/// Sphere of `obj` against sphere of `other`.
///
/// Robot pairs use shrunken spheres. When both objects are robots or players,
/// `obj` is pushed out to the contact surface and loses the part of its
/// velocity heading into `other`.
pub fn intersect_object_spheres(obj: &Object, other: &Object) -> Option<SphereContact> {
    let scale = if obj.ty == ObjectType::Robot && other.ty == ObjectType::Robot {
        ROBOT_SPHERE_SCALE
    } else {
        1.0
    };

    let mut hit = intersect_sphere_sphere(
        &obj.position,
        obj.radius * scale,
        &other.position,
        other.radius * scale,
    )?;

    // Negative when approaching. Separating spheres keep their velocity.
    let into = hit.normal.dot(&obj.physics.velocity).min(0.0);
    hit.speed = -into;

    let correction = (is_ship(obj.ty) && is_ship(other.ty)).then(|| SphereCorrection {
        position: hit.point + hit.normal * obj.radius * scale,
        velocity: obj.physics.velocity - hit.normal * into,
    });

    Some(SphereContact { hit, correction })
}
