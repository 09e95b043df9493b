/*!
Collision root module.

Broad phase is a portal walk over the segment graph; narrow phase tests
spheres against side triangles, object models and other spheres. The code is
split for clarity:

- types:        shared data types (Plane, Ray, Capsule, HitInfo, LevelHit)
- settings:     collision tolerances and multipliers
- geometry:     stateless triangle, sphere and segment primitives
- pvs:          potential segment set gathered by portal flood fill
- raycast:      segment-walking level ray caster, visibility and debris tests
- narrow_phase: sphere vs. level mesh, model mesh and sphere
- dispatch:     object pair table and gameplay hit filter
*/

pub mod dispatch;
pub mod geometry;
pub mod narrow_phase;
pub mod pvs;
pub mod raycast;
pub mod settings;
pub mod types;

// Re-export commonly used types and functions.
pub use dispatch::{CollisionType, collision_type, object_can_hit_target};
pub use narrow_phase::{
    MeshContact, SphereContact, intersect_level_mesh, intersect_object_spheres,
    intersect_poly_sphere, intersect_sphere_poly,
};
pub use pvs::PotentialSegments;
pub use raycast::{intersect_level_debris, intersect_ray_level, object_to_object_visibility};
pub use types::{Capsule, HitInfo, LevelHit, Plane, Point, Quat, Ray, Vec2, Vec3};
