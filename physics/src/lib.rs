pub mod bitmask_flags;
pub mod collision;
pub mod constants;
pub mod hooks;
pub mod integrator;
pub mod level;
pub mod object;
pub mod resources;
pub mod response;
pub mod settings;
pub mod tick;

pub use collision::{
    CollisionType, HitInfo, LevelHit, PotentialSegments, Quat, Ray, Vec3, intersect_ray_level,
    object_to_object_visibility,
};
pub use constants::{PHYSICS_STEPS, TICK_RATE};
pub use hooks::{NoHooks, PhysicsHooks, Sound3d, SoundId};
pub use level::{Level, LevelError, SegId, Segment, Side, SideId, Tag, Wall, WallId, WallType};
pub use object::{ObjId, Object, ObjectFlag, ObjectType, PhysicsData, PhysicsFlag, Signature};
pub use resources::{LevelTexId, LevelTexture, Model, ModelId, Resources, TextureFlag};
pub use response::{
    GameExplosion, apply_force, apply_rotation, bump_object, check_destroyable_overlay,
    collide_objects, create_explosion, explode_weapon,
};
pub use settings::PhysicsSettings;
pub use tick::{PhysicsContext, update_physics};
