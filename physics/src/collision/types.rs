/*!
Core collision types and math aliases shared by the collision submodules.

This module contains no algorithms. It defines the data exchanged between:
- geometry (stateless primitives)
- pvs (potential segment discovery)
- raycast (segment-to-segment ray walks)
- narrow_phase (sphere vs. level mesh, model mesh and sphere)
- the tick driver and response code, which consume `LevelHit`

Sign convention: every plane distance is negative behind the plane, which for
level sides means outside the segment (inside the solid half-space).
*/

use nalgebra as na;

use crate::level::Tag;
use crate::object::ObjId;

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Vec2 = na::Vector2<f32>;
pub type Quat = na::UnitQuaternion<f32>;
pub type Point = na::Point3<f32>;

/// An oriented plane stored as a unit normal and a point on it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    pub point: Vec3,
    /// World-space unit normal. Points toward the positive half-space.
    pub normal: Vec3,
}

impl Plane {
    #[inline]
    pub fn new(point: Vec3, normal: Vec3) -> Self {
        Self { point, normal }
    }

    /// Signed distance of `p`. Negative behind the plane, zero on it.
    #[inline]
    pub fn distance(&self, p: &Vec3) -> f32 {
        self.normal.dot(&(p - self.point))
    }

    /// Closest point on the plane to `p`.
    #[inline]
    pub fn project(&self, p: &Vec3) -> Vec3 {
        p - self.normal * self.distance(p)
    }
}

/// A half-line with a unit direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Build a ray, normalizing `direction`. Returns `None` for a zero direction.
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        let direction = direction.try_normalize(f32::EPSILON)?;
        Some(Self { origin, direction })
    }

    #[inline]
    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }
}

/// A swept sphere between `a` and `b`. Used for debris paths.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Capsule {
    pub a: Vec3,
    pub b: Vec3,
    pub radius: f32,
}

/// Result of a single narrow-phase test between an object and a surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitInfo {
    /// World-space contact point on the struck surface.
    pub point: Vec3,
    /// World-space surface normal, pointing toward the moving object.
    pub normal: Vec3,
    /// Penetration measure. Face contacts are negative, edge grazes positive.
    pub distance: f32,
    /// Speed of the moving object into the surface.
    pub speed: f32,
}

/// Representative hit gathered over a full object-vs-level query.
///
/// Owned by the caller's stack frame. `distance` starts at `f32::MAX`, so a
/// query can fold any number of candidate hits into it and keep the closest.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelHit {
    /// Object that was being moved, if any.
    pub source: Option<ObjId>,
    /// Object that was struck, if the closest hit was an object.
    pub hit_obj: Option<ObjId>,
    pub point: Vec3,
    pub normal: Vec3,
    pub tangent: Vec3,
    pub distance: f32,
    pub speed: f32,
    /// Segment side touched, if the closest hit was level geometry.
    pub tag: Option<Tag>,
    /// Triangle of the side (0 or 1).
    pub tri: usize,
    /// Distance from the hit point to the nearest edge of the side.
    pub edge_distance: f32,
}

impl Default for LevelHit {
    fn default() -> Self {
        Self {
            source: None,
            hit_obj: None,
            point: Vec3::zeros(),
            normal: Vec3::zeros(),
            tangent: Vec3::zeros(),
            distance: f32::MAX,
            speed: 0.0,
            tag: None,
            tri: 0,
            edge_distance: 0.0,
        }
    }
}

impl LevelHit {
    pub fn from_source(source: ObjId) -> Self {
        Self {
            source: Some(source),
            ..Self::default()
        }
    }

    #[inline]
    pub fn is_hit(&self) -> bool {
        self.distance < f32::MAX
    }

    /// Fold an object hit into this result if it is closer than the current one.
    pub fn update(&mut self, info: &HitInfo, other: ObjId) {
        if info.distance >= self.distance {
            return;
        }

        self.point = info.point;
        self.normal = info.normal;
        self.distance = info.distance;
        self.speed = info.speed;
        self.hit_obj = Some(other);
        self.tag = None;
    }
}
