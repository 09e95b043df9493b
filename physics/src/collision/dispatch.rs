//! Object pair dispatch: which narrow-phase test, if any, applies to a pair.

use crate::constants::MINE_ARM_TIME;
use crate::object::{ObjId, Object, ObjectType};
use crate::resources::Resources;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CollisionType {
    /// Doesn't collide.
    #[default]
    None,
    /// Sphere against level mesh. Handled by the level pass, not per object pair.
    SphereRoom,
    /// Source sphere against the target's model.
    SpherePoly,
    /// Target sphere against the source's model.
    PolySphere,
    SphereSphere,
}

pub type CollisionTable = [[CollisionType; ObjectType::COUNT]; ObjectType::COUNT];

const fn build_collision_table() -> CollisionTable {
    use CollisionType as C;
    use ObjectType as T;

    let mut table = [[C::None; ObjectType::COUNT]; ObjectType::COUNT];

    table[T::Player as usize][T::Wall as usize] = C::SphereRoom;
    table[T::Player as usize][T::Robot as usize] = C::SpherePoly;
    table[T::Player as usize][T::Powerup as usize] = C::SphereSphere;
    table[T::Player as usize][T::Clutter as usize] = C::SpherePoly;
    table[T::Player as usize][T::Building as usize] = C::SpherePoly;
    table[T::Player as usize][T::Reactor as usize] = C::SpherePoly;
    table[T::Player as usize][T::Hostage as usize] = C::SphereSphere;
    table[T::Player as usize][T::Marker as usize] = C::SphereSphere;

    table[T::Powerup as usize][T::Player as usize] = C::SphereSphere;

    table[T::Robot as usize][T::Player as usize] = C::PolySphere;
    table[T::Robot as usize][T::Robot as usize] = C::SphereSphere;
    table[T::Robot as usize][T::Wall as usize] = C::SphereRoom;
    table[T::Robot as usize][T::Building as usize] = C::SpherePoly;
    table[T::Robot as usize][T::Reactor as usize] = C::SpherePoly;

    table[T::Weapon as usize][T::Weapon as usize] = C::SphereSphere;
    table[T::Weapon as usize][T::Robot as usize] = C::SpherePoly;
    table[T::Weapon as usize][T::Player as usize] = C::SpherePoly;
    table[T::Weapon as usize][T::Clutter as usize] = C::SpherePoly;
    table[T::Weapon as usize][T::Building as usize] = C::SpherePoly;
    table[T::Weapon as usize][T::Reactor as usize] = C::SpherePoly;

    table
}

/// Ordered `(source, target)` pair table. Entries are deliberately asymmetric.
pub const COLLISION_TABLE: CollisionTable = build_collision_table();

#[inline]
pub fn collision_type(source: ObjectType, target: ObjectType) -> CollisionType {
    COLLISION_TABLE[source as usize][target as usize]
}

fn is_unarmed_mine(resources: &Resources, obj: &Object) -> bool {
    obj.ty == ObjectType::Weapon
        && resources.weapon_is_mine(obj.id)
        && obj.weapon().is_some_and(|w| w.alive_time < MINE_ARM_TIME)
}

/// Gameplay filter followed by the table lookup.
///
/// Rejects dead targets (reactors excepted), reused signatures, unarmed mines
/// near the player, repeat hits of a weapon, companion robots, weapons against
/// their own launcher or other players, and weapon pairs that are not a
/// weapon hitting a mine.
pub fn object_can_hit_target(
    resources: &Resources,
    src: &Object,
    target_id: ObjId,
    target: &Object,
) -> CollisionType {
    if !target.is_alive() && target.ty != ObjectType::Reactor {
        return CollisionType::None;
    }

    if src.signature == target.signature {
        return CollisionType::None;
    }

    if src.ty == ObjectType::Player && is_unarmed_mine(resources, target) {
        return CollisionType::None;
    }

    if src.ty == ObjectType::Weapon {
        if src.has_hit(target.signature) {
            return CollisionType::None;
        }

        match target.ty {
            ObjectType::Robot => {
                if resources
                    .robot_info(target.id)
                    .is_some_and(|info| info.is_companion)
                {
                    return CollisionType::None;
                }
            }
            ObjectType::Player => {
                // Only the local player is simulated.
                if target.id > 0 || src.parent == Some(target_id) || is_unarmed_mine(resources, src)
                {
                    return CollisionType::None;
                }
            }
            ObjectType::Weapon => {
                // Only non-mine weapons can hit mines.
                if resources.weapon_is_mine(src.id) || !resources.weapon_is_mine(target.id) {
                    return CollisionType::None;
                }
            }
            _ => {}
        }
    }

    collision_type(src.ty, target.ty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::types::Vec3;
    use crate::level::SegId;
    use crate::object::Signature;
    use crate::resources::{RobotInfo, WeaponInfo};

    const LASER: u8 = 0;
    const MINE: u8 = 1;

    fn resources() -> Resources {
        Resources {
            robots: vec![
                RobotInfo::default(),
                RobotInfo { is_companion: true },
            ],
            weapons: vec![
                WeaponInfo::default(),
                WeaponInfo {
                    is_mine: true,
                    ..WeaponInfo::default()
                },
            ],
            ..Resources::default()
        }
    }

    fn spawn(ty: ObjectType, signature: u32) -> Object {
        let mut obj = Object::new(ty, SegId(0), Vec3::zeros(), 1.0);
        obj.signature = Signature(signature);
        obj
    }

    fn weapon(id: u8, signature: u32, alive_time: f32) -> Object {
        let mut obj = spawn(ObjectType::Weapon, signature);
        obj.id = id;
        if let Some(w) = obj.weapon_mut() {
            w.alive_time = alive_time;
        }
        obj
    }

    #[test]
    fn table_is_asymmetric_for_robot_player_pairs() {
        assert_eq!(
            collision_type(ObjectType::Player, ObjectType::Robot),
            CollisionType::SpherePoly
        );
        assert_eq!(
            collision_type(ObjectType::Robot, ObjectType::Player),
            CollisionType::PolySphere
        );
        assert_eq!(
            collision_type(ObjectType::Robot, ObjectType::Weapon),
            CollisionType::None
        );
        assert_eq!(
            collision_type(ObjectType::Player, ObjectType::Wall),
            CollisionType::SphereRoom
        );
    }

    #[test]
    fn dead_targets_are_ignored_except_reactors() {
        let res = resources();
        let player = spawn(ObjectType::Player, 1);

        let mut robot = spawn(ObjectType::Robot, 2);
        robot.hit_points = 0.0;
        assert_eq!(
            object_can_hit_target(&res, &player, ObjId(1), &robot),
            CollisionType::None
        );

        let mut reactor = spawn(ObjectType::Reactor, 3);
        reactor.hit_points = 0.0;
        assert_eq!(
            object_can_hit_target(&res, &player, ObjId(2), &reactor),
            CollisionType::SpherePoly
        );
    }

    #[test]
    fn same_signature_never_collides() {
        let res = resources();
        let a = spawn(ObjectType::Robot, 5);
        let b = spawn(ObjectType::Robot, 5);
        assert_eq!(object_can_hit_target(&res, &a, ObjId(1), &b), CollisionType::None);
    }

    #[test]
    fn unarmed_mines_ignore_the_player_both_ways() {
        let res = resources();
        let player = spawn(ObjectType::Player, 1);
        let fresh_mine = weapon(MINE, 2, 0.5);
        let armed_mine = weapon(MINE, 3, MINE_ARM_TIME + 0.1);

        assert_eq!(
            object_can_hit_target(&res, &player, ObjId(1), &fresh_mine),
            CollisionType::None
        );
        assert_eq!(
            object_can_hit_target(&res, &fresh_mine, ObjId(0), &player),
            CollisionType::None
        );
        assert_eq!(
            object_can_hit_target(&res, &armed_mine, ObjId(0), &player),
            CollisionType::SpherePoly
        );
    }

    #[test]
    fn weapons_skip_their_launcher_and_other_players() {
        let res = resources();
        let player = spawn(ObjectType::Player, 1);
        let mut laser = weapon(LASER, 2, 0.0);
        laser.parent = Some(ObjId(0));
        assert_eq!(
            object_can_hit_target(&res, &laser, ObjId(0), &player),
            CollisionType::None
        );

        let mut coop_player = spawn(ObjectType::Player, 3);
        coop_player.id = 1;
        laser.parent = Some(ObjId(9));
        assert_eq!(
            object_can_hit_target(&res, &laser, ObjId(4), &coop_player),
            CollisionType::None
        );
        assert_eq!(
            object_can_hit_target(&res, &laser, ObjId(0), &player),
            CollisionType::SpherePoly
        );
    }

    #[test]
    fn weapons_pass_through_companions() {
        let res = resources();
        let laser = weapon(LASER, 1, 0.0);
        let mut guide_bot = spawn(ObjectType::Robot, 2);
        guide_bot.id = 1;
        assert_eq!(
            object_can_hit_target(&res, &laser, ObjId(1), &guide_bot),
            CollisionType::None
        );

        let hostile = spawn(ObjectType::Robot, 3);
        assert_eq!(
            object_can_hit_target(&res, &laser, ObjId(2), &hostile),
            CollisionType::SpherePoly
        );
    }

    #[test]
    fn only_non_mine_weapons_hit_mines() {
        let res = resources();
        let laser = weapon(LASER, 1, 0.0);
        let other_laser = weapon(LASER, 2, 0.0);
        let mine = weapon(MINE, 3, 10.0);

        assert_eq!(
            object_can_hit_target(&res, &laser, ObjId(2), &mine),
            CollisionType::SphereSphere
        );
        assert_eq!(
            object_can_hit_target(&res, &laser, ObjId(1), &other_laser),
            CollisionType::None
        );
        assert_eq!(
            object_can_hit_target(&res, &mine, ObjId(0), &laser),
            CollisionType::None
        );
    }

    #[test]
    fn recorded_hits_are_not_repeated() {
        let res = resources();
        let mut laser = weapon(LASER, 1, 0.0);
        let robot = spawn(ObjectType::Robot, 2);
        assert_eq!(
            object_can_hit_target(&res, &laser, ObjId(1), &robot),
            CollisionType::SpherePoly
        );

        laser.record_hit(robot.signature);
        assert_eq!(
            object_can_hit_target(&res, &laser, ObjId(1), &robot),
            CollisionType::None
        );
    }
}
