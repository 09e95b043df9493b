//! Side effects the physics core asks the rest of the game to perform.

use crate::collision::types::{LevelHit, Vec3};
use crate::level::{Level, SegId, TriggerId, WallId};
use crate::object::{ObjId, Object};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundId {
    PlayerHitWall,
    TouchLava,
    TouchWater,
    LightDestroyed,
    /// Any other sound resource by index.
    Resource(u16),
}

/// A positional sound request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sound3d {
    pub id: SoundId,
    pub position: Vec3,
    pub segment: SegId,
    /// Follow this object while playing.
    pub source: Option<ObjId>,
}

impl Sound3d {
    pub fn at(id: SoundId, position: Vec3, segment: SegId) -> Self {
        Self {
            id,
            position,
            segment,
            source: None,
        }
    }
}

/// Callbacks into gameplay, audio and wall systems.
///
/// Every method has a default so embedders only implement what they handle.
/// Hooks receiving `&mut Level` run after the colliding object has been
/// written back, so they may freely look it up.
pub trait PhysicsHooks {
    /// Damage a non-player object.
    fn apply_damage(&mut self, object: &mut Object, amount: f32) {
        object.apply_damage(amount);
    }

    /// Damage the local player. Shields and invulnerability are handled by the player system.
    fn apply_player_damage(&mut self, _amount: f32) {}

    fn play_sound(&mut self, _sound: Sound3d) {}

    fn activate_trigger(&mut self, _level: &mut Level, _trigger: TriggerId) {}

    fn weapon_hit_object(&mut self, _level: &mut Level, _hit: &LevelHit, _weapon: ObjId) {}

    fn weapon_hit_wall(&mut self, _level: &mut Level, _hit: &LevelHit, _weapon: ObjId) {}

    /// Any object touched a side that holds a wall (doors open on contact).
    fn hit_wall(&mut self, _level: &mut Level, _point: Vec3, _object: ObjId, _wall: WallId) {}

    /// The player touched another object (powerup pickup, hostage rescue).
    fn touch_object(&mut self, _level: &mut Level, _player: ObjId, _other: ObjId) {}
}

/// Hooks that only apply object damage.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHooks;

impl PhysicsHooks for NoHooks {}
