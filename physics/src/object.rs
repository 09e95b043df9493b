use crate::bitmask_flags::BitmaskFlags;
use crate::collision::types::{Quat, Vec3};
use crate::define_bitmask_flags;
use crate::level::SegId;
use crate::resources::ModelId;

/// Index of an object in `Level::objects`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjId(pub u16);

impl ObjId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Unique per spawn. Detects a reused `ObjId` slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Signature(pub u32);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ObjectType {
    /// Empty object slot.
    #[default]
    None,
    /// Level geometry. Only appears as a collision table column.
    Wall,
    Robot,
    Player,
    Weapon,
    Powerup,
    Reactor,
    Hostage,
    Clutter,
    Building,
    Marker,
    Coop,
    Door,
}

impl ObjectType {
    pub const COUNT: usize = ObjectType::Door as usize + 1;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MovementType {
    #[default]
    None,
    Physics,
}

define_bitmask_flags!(PhysicsFlag, u16, {
    /// Angular thrust accelerates angular velocity.
    UseThrust,
    /// Angular velocity is not affected by drag or angular acceleration.
    FixedAngVel,
    /// Bank around the forward axis while turning.
    TurnRoll,
    /// Passes through targets instead of sliding off them.
    Piercing,
    /// Reflects off walls while bounces remain.
    Bounce,
    /// Oscillates along its up axis.
    Wiggle,
});

pub type PhysicsFlags = BitmaskFlags<u16>;

define_bitmask_flags!(ObjectFlag, u8, {
    /// Fixed to another object. Integrated but never collided.
    Attached,
    Dead,
    Invulnerable,
});

pub type ObjectFlags = BitmaskFlags<u8>;

#[derive(Clone, Debug, PartialEq)]
pub struct PhysicsData {
    pub velocity: Vec3,
    pub prev_velocity: Vec3,
    /// Revolutions per second around each local axis.
    pub angular_velocity: Vec3,
    pub angular_acceleration: Vec3,
    pub thrust: Vec3,
    pub angular_thrust: Vec3,
    pub drag: f32,
    pub mass: f32,
    pub flags: PhysicsFlags,
    pub bounces: i16,
    /// Current bank angle in radians.
    pub turn_roll: f32,
    pub wiggle: f32,
    pub wiggle_rate: f32,
}

impl Default for PhysicsData {
    fn default() -> Self {
        Self {
            velocity: Vec3::zeros(),
            prev_velocity: Vec3::zeros(),
            angular_velocity: Vec3::zeros(),
            angular_acceleration: Vec3::zeros(),
            thrust: Vec3::zeros(),
            angular_thrust: Vec3::zeros(),
            drag: 0.0,
            mass: 0.0,
            flags: PhysicsFlags::default(),
            bounces: 0,
            turn_roll: 0.0,
            wiggle: 0.0,
            wiggle_rate: 0.0,
        }
    }
}

impl PhysicsData {
    pub fn can_bounce(&self) -> bool {
        self.flags.has(PhysicsFlag::Bounce) && self.bounces > 0
    }

    pub fn is_piercing(&self) -> bool {
        self.flags.has(PhysicsFlag::Piercing)
    }
}

/// Per-flight state of a weapon.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WeaponControl {
    /// Seconds since launch.
    pub alive_time: f32,
    /// Targets already struck during this flight.
    pub recent_hits: Vec<Signature>,
    pub sine_movement: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Control {
    #[default]
    None,
    Weapon(WeaponControl),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Object {
    pub signature: Signature,
    pub ty: ObjectType,
    /// Subtype index: robot, weapon or player number depending on `ty`.
    pub id: u8,
    pub segment: SegId,
    pub position: Vec3,
    pub prev_position: Vec3,
    pub rotation: Quat,
    pub prev_rotation: Quat,
    pub radius: f32,
    pub hit_points: f32,
    pub lifespan: f32,
    pub movement: MovementType,
    pub physics: PhysicsData,
    pub flags: ObjectFlags,
    pub parent: Option<ObjId>,
    pub control: Control,
    pub model: Option<ModelId>,
    pub last_hit_force: Vec3,
}

impl Default for Object {
    fn default() -> Self {
        Self {
            signature: Signature::default(),
            ty: ObjectType::None,
            id: 0,
            segment: SegId::default(),
            position: Vec3::zeros(),
            prev_position: Vec3::zeros(),
            rotation: Quat::identity(),
            prev_rotation: Quat::identity(),
            radius: 0.0,
            hit_points: 0.0,
            lifespan: 0.0,
            movement: MovementType::None,
            physics: PhysicsData::default(),
            flags: ObjectFlags::default(),
            parent: None,
            control: Control::None,
            model: None,
            last_hit_force: Vec3::zeros(),
        }
    }
}

impl Object {
    /// A live, physics-driven object with unit mass.
    pub fn new(ty: ObjectType, segment: SegId, position: Vec3, radius: f32) -> Self {
        let control = match ty {
            ObjectType::Weapon => Control::Weapon(WeaponControl::default()),
            _ => Control::None,
        };

        Self {
            ty,
            segment,
            position,
            prev_position: position,
            radius,
            hit_points: 100.0,
            lifespan: f32::INFINITY,
            movement: MovementType::Physics,
            physics: PhysicsData {
                mass: 1.0,
                ..PhysicsData::default()
            },
            control,
            ..Self::default()
        }
    }

    pub fn is_alive(&self) -> bool {
        self.ty != ObjectType::None
            && !self.flags.has(ObjectFlag::Dead)
            && self.hit_points > 0.0
            && self.lifespan > 0.0
    }

    #[inline]
    pub fn is_player(&self) -> bool {
        self.ty == ObjectType::Player
    }

    #[inline]
    pub fn is_physics(&self) -> bool {
        self.movement == MovementType::Physics
    }

    pub fn apply_damage(&mut self, amount: f32) {
        self.hit_points -= amount;
    }

    /// Forward axis in world space. Models face -Z after the handedness flip.
    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::z()
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::y()
    }

    /// World-space point expressed in this object's model space.
    pub fn to_local(&self, world: &Vec3) -> Vec3 {
        self.rotation.inverse_transform_vector(&(world - self.position))
    }

    pub fn to_world(&self, local: &Vec3) -> Vec3 {
        self.rotation * local + self.position
    }

    pub fn weapon(&self) -> Option<&WeaponControl> {
        match &self.control {
            Control::Weapon(weapon) => Some(weapon),
            Control::None => None,
        }
    }

    pub fn weapon_mut(&mut self) -> Option<&mut WeaponControl> {
        match &mut self.control {
            Control::Weapon(weapon) => Some(weapon),
            Control::None => None,
        }
    }

    /// Remember `target` so this weapon does not strike it again.
    pub fn record_hit(&mut self, target: Signature) {
        if let Some(weapon) = self.weapon_mut() {
            if !weapon.recent_hits.contains(&target) {
                weapon.recent_hits.push(target);
            }
        }
    }

    pub fn has_hit(&self, target: Signature) -> bool {
        self.weapon()
            .is_some_and(|weapon| weapon.recent_hits.contains(&target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_object_is_an_empty_dead_slot() {
        let obj = Object::default();
        assert_eq!(obj.ty, ObjectType::None);
        assert!(!obj.is_alive());
    }

    #[test]
    fn new_object_is_alive_and_physics_driven() {
        let obj = Object::new(ObjectType::Robot, SegId(2), Vec3::new(1.0, 2.0, 3.0), 4.0);
        assert!(obj.is_alive());
        assert!(obj.is_physics());
        assert_eq!(obj.prev_position, obj.position);
        assert_eq!(obj.physics.mass, 1.0);
    }

    #[test]
    fn object_dies_when_out_of_hit_points() {
        let mut obj = Object::new(ObjectType::Robot, SegId(0), Vec3::zeros(), 1.0);
        obj.apply_damage(100.0);
        assert!(!obj.is_alive());
    }

    #[test]
    fn local_world_transforms_round_trip() {
        let mut obj = Object::new(ObjectType::Robot, SegId(0), Vec3::new(5.0, 0.0, 0.0), 1.0);
        obj.rotation = Quat::from_axis_angle(&Vec3::y_axis(), std::f32::consts::FRAC_PI_2);

        let world = Vec3::new(5.0, 0.0, -3.0);
        let local = obj.to_local(&world);
        assert!((obj.to_world(&local) - world).norm() < 1e-5);
        assert!((local - Vec3::new(3.0, 0.0, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn weapons_remember_recent_hits_once() {
        let mut weapon = Object::new(ObjectType::Weapon, SegId(0), Vec3::zeros(), 0.5);
        weapon.record_hit(Signature(7));
        weapon.record_hit(Signature(7));
        assert!(weapon.has_hit(Signature(7)));
        assert_eq!(weapon.weapon().unwrap().recent_hits.len(), 1);

        // Non-weapons have no hit memory.
        let mut robot = Object::new(ObjectType::Robot, SegId(0), Vec3::zeros(), 1.0);
        robot.record_hit(Signature(7));
        assert!(!robot.has_hit(Signature(7)));
    }
}
