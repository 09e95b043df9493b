//! Stateless geometry primitives used by the ray caster and narrow phase.
//!
//! Triangle queries go through parry3d (via the rapier3d re-export) so the
//! numerics match the rest of the engine. Everything else is plain nalgebra.

use rapier3d::parry::{
    query::{PointQueryWithLocation, Ray as ParryRay, RayCast},
    shape::{Triangle, TrianglePointLocation},
};

use super::types::{Capsule, HitInfo, Point, Ray, Vec2, Vec3};

/// Three world or model space vertices.
pub type Tri = [Vec3; 3];

/// Squared length below which a vector is treated as zero.
const DEGENERATE_SQ: f32 = 1.0e-12;

/// Feature of a triangle nearest to a query point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriangleRegion {
    Face,
    /// Edge `i` runs from vertex `i` to vertex `(i + 1) % 3`.
    Edge(usize),
    Vertex(usize),
}

impl TriangleRegion {
    /// Index of the edge whose direction is reported as the contact tangent.
    pub fn edge(&self) -> usize {
        match *self {
            TriangleRegion::Face => 0,
            TriangleRegion::Edge(i) | TriangleRegion::Vertex(i) => i,
        }
    }
}

#[inline]
fn to_parry(tri: &Tri) -> Triangle {
    Triangle::new(Point::from(tri[0]), Point::from(tri[1]), Point::from(tri[2]))
}

/// Unit normal following the winding `a -> b -> c`. `None` for degenerate triangles.
pub fn triangle_normal(tri: &Tri) -> Option<Vec3> {
    (tri[1] - tri[0])
        .cross(&(tri[2] - tri[0]))
        .try_normalize(f32::EPSILON)
}

/// Tangent along edge `edge` of the triangle, or zero for a collapsed edge.
pub fn edge_tangent(tri: &Tri, edge: usize) -> Vec3 {
    let start = tri[edge % 3];
    let end = tri[(edge + 1) % 3];
    (end - start)
        .try_normalize(f32::EPSILON)
        .unwrap_or_else(Vec3::zeros)
}

/// Distance along `ray` to the triangle, if it is hit within `max_distance`.
///
/// With `front_only`, triangles whose `normal` does not face the ray are rejected.
pub fn intersect_ray_triangle(
    ray: &Ray,
    tri: &Tri,
    normal: &Vec3,
    max_distance: f32,
    front_only: bool,
) -> Option<f32> {
    if front_only && ray.direction.dot(normal) >= 0.0 {
        return None;
    }

    let parry_ray = ParryRay::new(Point::from(ray.origin), ray.direction);
    to_parry(tri)
        .cast_local_ray(&parry_ray, max_distance, true)
        .filter(|d| *d >= 0.0)
}

/// Closest point on the triangle to `p` and the region it lies in.
pub fn closest_point_on_triangle(p: &Vec3, tri: &Tri) -> (Vec3, TriangleRegion) {
    let (projection, location) =
        to_parry(tri).project_local_point_and_get_location(&Point::from(*p), false);

    let region = match location {
        TrianglePointLocation::OnVertex(i) => TriangleRegion::Vertex(i as usize),
        TrianglePointLocation::OnEdge(i, _) => TriangleRegion::Edge(i as usize),
        TrianglePointLocation::OnFace(..) | TrianglePointLocation::OnSolid => {
            TriangleRegion::Face
        }
    };

    (projection.point.coords, region)
}

/// True if `p`, assumed to lie in the triangle's plane, is inside or on its border.
pub fn triangle_contains_point(tri: &Tri, p: &Vec3) -> bool {
    let n = (tri[1] - tri[0]).cross(&(tri[2] - tri[0]));
    if n.norm_squared() <= DEGENERATE_SQ {
        return false;
    }

    (0..3).all(|i| {
        let start = tri[i];
        let end = tri[(i + 1) % 3];
        (end - start).cross(&(p - start)).dot(&n) >= 0.0
    })
}

/// Barycentric weights of `p` with respect to the triangle.
pub fn barycentric(p: &Vec3, tri: &Tri) -> Option<Vec3> {
    let v0 = tri[1] - tri[0];
    let v1 = tri[2] - tri[0];
    let v2 = p - tri[0];
    let d00 = v0.dot(&v0);
    let d01 = v0.dot(&v1);
    let d11 = v1.dot(&v1);
    let d20 = v2.dot(&v0);
    let d21 = v2.dot(&v1);

    let denom = d00 * d11 - d01 * d01;
    if denom.abs() <= DEGENERATE_SQ {
        return None;
    }

    let v = (d11 * d20 - d01 * d21) / denom;
    let w = (d00 * d21 - d01 * d20) / denom;
    Some(Vec3::new(1.0 - v - w, v, w))
}

/// Texture coordinates of `p` interpolated across the triangle's vertex UVs.
pub fn interpolate_uv(p: &Vec3, tri: &Tri, uvs: &[Vec2; 3]) -> Option<Vec2> {
    let weights = barycentric(p, tri)?;
    Some(uvs[0] * weights.x + uvs[1] * weights.y + uvs[2] * weights.z)
}

/// Reflect `v` about a unit normal.
#[inline]
pub fn reflect(v: &Vec3, n: &Vec3) -> Vec3 {
    v - n * (2.0 * v.dot(n))
}

/// Closest point to `p` on the segment `a..b`.
pub fn closest_point_on_segment(a: &Vec3, b: &Vec3, p: &Vec3) -> Vec3 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq <= DEGENERATE_SQ {
        return *a;
    }

    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Shortest distance from `p` to the border of a quad.
pub fn quad_edge_distance(quad: &[Vec3; 4], p: &Vec3) -> f32 {
    (0..4)
        .map(|i| (closest_point_on_segment(&quad[i], &quad[(i + 1) % 4], p) - p).norm())
        .fold(f32::MAX, f32::min)
}

/// Distance along `ray` to a sphere. Rays starting inside report zero.
pub fn intersect_ray_sphere(ray: &Ray, center: &Vec3, radius: f32) -> Option<f32> {
    let m = ray.origin - center;
    let b = m.dot(&ray.direction);
    let c = m.norm_squared() - radius * radius;
    if c > 0.0 && b > 0.0 {
        return None;
    }

    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    Some((-b - discriminant.sqrt()).max(0.0))
}

/// Overlap test between sphere `a` and sphere `b`.
///
/// The normal points from `b` toward `a` and the point lies on `b`'s surface.
/// Coincident centers resolve along +Y rather than producing a NaN normal.
pub fn intersect_sphere_sphere(
    a_center: &Vec3,
    a_radius: f32,
    b_center: &Vec3,
    b_radius: f32,
) -> Option<HitInfo> {
    let delta = a_center - b_center;
    let dist = delta.norm();
    let reach = a_radius + b_radius;
    if dist >= reach {
        return None;
    }

    let normal = delta.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::y);
    Some(HitInfo {
        point: b_center + normal * b_radius,
        normal,
        distance: dist - reach,
        speed: 0.0,
    })
}

/// Overlap test between a capsule and a sphere. Returns the closest point on the capsule axis.
pub fn intersect_capsule_sphere(capsule: &Capsule, center: &Vec3, radius: f32) -> Option<Vec3> {
    let closest = closest_point_on_segment(&capsule.a, &capsule.b, center);
    let reach = capsule.radius + radius;
    ((closest - center).norm_squared() < reach * reach).then_some(closest)
}
