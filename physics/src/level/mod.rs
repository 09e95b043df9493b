/*!
Level model consumed and mutated by the physics core.

A level is a graph of convex six-sided segments. Each side is solid, open
(connected to a neighbor) or gated by a wall whose type and state decide
whether it blocks. Connections are bidirectional and fixed after build time.

Every runtime accessor is fail-soft: out-of-range ids return `None` and
callers treat that as "no interaction". Build-time operations (`connect`,
`add_wall`, `validate`) report problems as `LevelError`.
*/

pub mod segment;
pub mod wall;

use std::collections::{HashSet, VecDeque};

use thiserror::Error;

use crate::collision::geometry::interpolate_uv;
use crate::collision::types::Vec3;
use crate::object::{ObjId, Object, Signature};
use crate::resources::{Resources, TexelMask, TextureFlag};

pub use segment::{SIDE_TRIANGLES, SegId, Segment, Side, SideId, Tag};
pub use wall::{Trigger, TriggerId, Wall, WallFlag, WallFlags, WallId, WallState, WallType};

/// Points this far outside a side plane still count as inside the segment.
const CONTAINMENT_TOLERANCE: f32 = 0.01;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LevelError {
    #[error("segment {0:?} does not exist")]
    InvalidSegment(SegId),
    #[error("side {0:?} is already connected")]
    SideAlreadyConnected(Tag),
    #[error("side {from:?} connects to {to:?}, which has no connection back")]
    OneWayConnection { from: Tag, to: SegId },
    #[error("side {tag:?} references missing wall {wall:?}")]
    InvalidWall { tag: Tag, wall: WallId },
    #[error("wall {wall:?} references missing trigger {trigger:?}")]
    InvalidTrigger { wall: WallId, trigger: TriggerId },
    #[error("level segment limit reached")]
    TooManySegments,
    #[error("level wall limit reached")]
    TooManyWalls,
    #[error("level trigger limit reached")]
    TooManyTriggers,
    #[error("level object limit reached")]
    TooManyObjects,
}

#[derive(Clone, Debug, Default)]
pub struct Level {
    pub segments: Vec<Segment>,
    pub walls: Vec<Wall>,
    pub triggers: Vec<Trigger>,
    pub objects: Vec<Object>,
    /// Last signature handed out by `add_object`.
    pub last_signature: u32,
}

impl Level {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_segment(&mut self, segment: Segment) -> Result<SegId, LevelError> {
        let id = u16::try_from(self.segments.len()).map_err(|_| LevelError::TooManySegments)?;
        self.segments.push(segment);
        Ok(SegId(id))
    }

    /// Join two sides. Both must exist and be unconnected.
    pub fn connect(&mut self, a: Tag, b: Tag) -> Result<(), LevelError> {
        for tag in [a, b] {
            let seg = self
                .try_get_segment(tag.segment)
                .ok_or(LevelError::InvalidSegment(tag.segment))?;
            if seg.side_has_connection(tag.side) {
                return Err(LevelError::SideAlreadyConnected(tag));
            }
        }

        self.segments[a.segment.index()].connections[a.side.index()] = Some(b.segment);
        self.segments[b.segment.index()].connections[b.side.index()] = Some(a.segment);
        Ok(())
    }

    /// Attach a wall to the side named by its tag.
    pub fn add_wall(&mut self, wall: Wall) -> Result<WallId, LevelError> {
        let id = u16::try_from(self.walls.len())
            .map(WallId)
            .map_err(|_| LevelError::TooManyWalls)?;
        let side = self
            .try_get_side_mut(wall.tag)
            .ok_or(LevelError::InvalidSegment(wall.tag.segment))?;
        side.wall = Some(id);
        self.walls.push(wall);
        Ok(id)
    }

    pub fn add_trigger(&mut self, trigger: Trigger) -> Result<TriggerId, LevelError> {
        let id = u16::try_from(self.triggers.len())
            .map(TriggerId)
            .map_err(|_| LevelError::TooManyTriggers)?;
        self.triggers.push(trigger);
        Ok(id)
    }

    /// Insert an object with a fresh signature and link it into its segment's object list.
    pub fn add_object(&mut self, mut object: Object) -> Result<ObjId, LevelError> {
        let id = u16::try_from(self.objects.len())
            .map(ObjId)
            .map_err(|_| LevelError::TooManyObjects)?;
        self.last_signature += 1;
        object.signature = Signature(self.last_signature);
        let segment = object.segment;
        self.objects.push(object);
        if let Some(seg) = self.try_get_segment_mut(segment) {
            seg.objects.push(id);
        }
        Ok(id)
    }

    /// Check bidirectional connections and wall/trigger references.
    pub fn validate(&self) -> Result<(), LevelError> {
        for (index, seg) in self.segments.iter().enumerate() {
            let id = u16::try_from(index)
                .map(SegId)
                .map_err(|_| LevelError::TooManySegments)?;
            for side in SideId::ALL {
                let tag = Tag::new(id, side);

                if let Some(conn) = seg.connection(side) {
                    let other = self
                        .try_get_segment(conn)
                        .ok_or(LevelError::InvalidSegment(conn))?;
                    if !other.connections.contains(&Some(id)) {
                        return Err(LevelError::OneWayConnection { from: tag, to: conn });
                    }
                }

                if let Some(wall_id) = seg.side(side).wall {
                    let wall = self
                        .try_get_wall_by_id(wall_id)
                        .ok_or(LevelError::InvalidWall { tag, wall: wall_id })?;
                    if let Some(trigger) = wall.trigger {
                        if self.try_get_trigger(trigger).is_none() {
                            return Err(LevelError::InvalidTrigger {
                                wall: wall_id,
                                trigger,
                            });
                        }
                    }
                }
            }
        }

        Ok(())
    }

    #[inline]
    pub fn try_get_segment(&self, id: SegId) -> Option<&Segment> {
        self.segments.get(id.index())
    }

    #[inline]
    pub fn try_get_segment_mut(&mut self, id: SegId) -> Option<&mut Segment> {
        self.segments.get_mut(id.index())
    }

    pub fn try_get_side(&self, tag: Tag) -> Option<&Side> {
        self.try_get_segment(tag.segment).map(|seg| seg.side(tag.side))
    }

    pub fn try_get_side_mut(&mut self, tag: Tag) -> Option<&mut Side> {
        self.try_get_segment_mut(tag.segment)
            .map(|seg| seg.side_mut(tag.side))
    }

    /// Wall on the side named by `tag`, if any.
    pub fn try_get_wall(&self, tag: Tag) -> Option<&Wall> {
        let id = self.try_get_side(tag)?.wall?;
        self.try_get_wall_by_id(id)
    }

    #[inline]
    pub fn try_get_wall_by_id(&self, id: WallId) -> Option<&Wall> {
        self.walls.get(id.index())
    }

    #[inline]
    pub fn try_get_trigger(&self, id: TriggerId) -> Option<&Trigger> {
        self.triggers.get(id.index())
    }

    #[inline]
    pub fn try_get_object(&self, id: ObjId) -> Option<&Object> {
        self.objects.get(id.index())
    }

    #[inline]
    pub fn try_get_object_mut(&mut self, id: ObjId) -> Option<&mut Object> {
        self.objects.get_mut(id.index())
    }

    /// The side of the neighbor across `tag` that connects back to `tag.segment`.
    pub fn get_connected_side(&self, tag: Tag) -> Option<Tag> {
        let conn = self.try_get_segment(tag.segment)?.connection(tag.side)?;
        let other = self.try_get_segment(conn)?;
        SideId::ALL
            .into_iter()
            .find(|&side| other.connection(side) == Some(tag.segment))
            .map(|side| Tag::new(conn, side))
    }

    /// Whether the side blocks movement. Unconnected sides are always solid.
    pub fn side_is_solid(&self, tag: Tag) -> bool {
        let Some(seg) = self.try_get_segment(tag.segment) else {
            return false;
        };

        if !seg.side_has_connection(tag.side) {
            return true;
        }

        self.try_get_wall(tag).is_some_and(Wall::is_solid)
    }

    /// Whether the wall on `tag` is drawn see-through (cloaked or a masked texture).
    pub fn wall_is_transparent(&self, resources: &Resources, tag: Tag) -> bool {
        let Some(wall) = self.try_get_wall(tag) else {
            return false;
        };
        if wall.ty == WallType::Cloaked {
            return true;
        }

        let Some(side) = self.try_get_side(tag) else {
            return false;
        };
        let masked = |id| {
            resources
                .level_texture(id)
                .is_some_and(|t| t.flags.has(TextureFlag::Transparent))
        };
        masked(side.tmap) || side.tmap2.is_some_and(masked)
    }

    /// Whether the texel of the wall on `tag` under `point` is transparent.
    ///
    /// An opaque overlay texel hides the base texture and a super-transparent
    /// one cuts through it. Sides without a wall are never transparent.
    pub fn wall_point_is_transparent(
        &self,
        resources: &Resources,
        tag: Tag,
        point: &Vec3,
        tri: usize,
    ) -> bool {
        let Some(side) = self.try_get_side(tag) else {
            return false;
        };
        if side.wall.is_none() {
            return false;
        }

        let Some(uv) = interpolate_uv(point, &side.triangle(tri), &side.triangle_uvs(tri)) else {
            return false;
        };

        if let Some(overlay) = side.tmap2.and_then(|id| resources.bitmap(id)) {
            match overlay.texel(uv, side.overlay_rotation) {
                TexelMask::Opaque => return false,
                TexelMask::SuperTransparent => return true,
                TexelMask::Transparent => {}
            }
        }

        resources
            .bitmap(side.tmap)
            .is_some_and(|bitmap| bitmap.texel(uv, 0).is_transparent())
    }

    /// Breadth-first search from `start` for the segment containing `point`.
    pub fn find_containing_segment(&self, start: SegId, point: &Vec3) -> Option<SegId> {
        let mut visited = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);

        while let Some(id) = queue.pop_front() {
            let Some(seg) = self.try_get_segment(id) else {
                continue;
            };
            if seg.contains_point(point, CONTAINMENT_TOLERANCE) {
                return Some(id);
            }

            for conn in seg.connections.iter().flatten() {
                if visited.insert(*conn) {
                    queue.push_back(*conn);
                }
            }
        }

        None
    }

    /// Relink an object into the segment that now contains its position.
    ///
    /// Objects that ended up outside every segment keep their old segment.
    pub fn move_object(&mut self, id: ObjId) {
        let Some(obj) = self.try_get_object(id) else {
            return;
        };
        let from = obj.segment;
        let Some(to) = self.find_containing_segment(from, &obj.position) else {
            log::debug!("object {:?} is outside the level near segment {:?}", id, from);
            return;
        };
        if to == from {
            return;
        }

        if let Some(seg) = self.try_get_segment_mut(from) {
            seg.objects.retain(|&o| o != id);
        }
        if let Some(seg) = self.try_get_segment_mut(to) {
            seg.objects.push(id);
        }
        if let Some(obj) = self.try_get_object_mut(id) {
            obj.segment = to;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectType;

    fn corridor(len: usize) -> Level {
        let mut level = Level::new();
        for i in 0..len {
            let z = i as f32 * 10.0;
            level
                .add_segment(Segment::cuboid(
                    Vec3::new(0.0, 0.0, z),
                    Vec3::new(10.0, 10.0, z + 10.0),
                ))
                .unwrap();
        }
        for i in 1..len {
            level
                .connect(
                    Tag::new(SegId(i as u16 - 1), SideId::Front),
                    Tag::new(SegId(i as u16), SideId::Back),
                )
                .unwrap();
        }
        level
    }

    #[test]
    fn connect_is_bidirectional_and_validates() {
        let level = corridor(3);
        assert_eq!(level.segments[0].connection(SideId::Front), Some(SegId(1)));
        assert_eq!(level.segments[1].connection(SideId::Back), Some(SegId(0)));
        assert_eq!(
            level.get_connected_side(Tag::new(SegId(1), SideId::Front)),
            Some(Tag::new(SegId(2), SideId::Back))
        );
        assert_eq!(level.validate(), Ok(()));
    }

    #[test]
    fn connecting_a_connected_side_fails() {
        let mut level = corridor(2);
        let err = level
            .connect(
                Tag::new(SegId(0), SideId::Front),
                Tag::new(SegId(1), SideId::Left),
            )
            .unwrap_err();
        assert_eq!(err, LevelError::SideAlreadyConnected(Tag::new(SegId(0), SideId::Front)));
    }

    #[test]
    fn validate_reports_one_way_connections() {
        let mut level = corridor(2);
        level.segments[1].connections[SideId::Back.index()] = None;
        assert!(matches!(
            level.validate(),
            Err(LevelError::OneWayConnection { to: SegId(1), .. })
        ));
    }

    #[test]
    fn lookups_fail_soft_on_bad_ids() {
        let level = corridor(1);
        assert!(level.try_get_segment(SegId(9)).is_none());
        assert!(level.try_get_side(Tag::new(SegId(9), SideId::Top)).is_none());
        assert!(level.try_get_wall(Tag::new(SegId(0), SideId::Top)).is_none());
        assert!(level.try_get_object(ObjId(3)).is_none());
        assert!(!level.side_is_solid(Tag::new(SegId(9), SideId::Top)));
    }

    #[test]
    fn side_solidity_follows_connections_and_walls() {
        let mut level = corridor(2);
        let portal = Tag::new(SegId(0), SideId::Front);
        assert!(level.side_is_solid(Tag::new(SegId(0), SideId::Left)));
        assert!(!level.side_is_solid(portal));

        let wall = level.add_wall(Wall::new(portal, WallType::Door)).unwrap();
        assert!(level.side_is_solid(portal));

        level.walls[wall.index()].flags.add(WallFlag::DoorOpened);
        assert!(!level.side_is_solid(portal));
    }

    #[test]
    fn super_transparent_overlay_texels_cut_through_the_base_texture() {
        use crate::resources::{Bitmap, LevelTexId};

        let mut level = corridor(1);
        let tag = Tag::new(SegId(0), SideId::Front);
        level.add_wall(Wall::new(tag, WallType::Closed)).unwrap();
        if let Some(side) = level.try_get_side_mut(tag) {
            side.tmap2 = Some(LevelTexId(1));
        }

        let masked = |mask| Bitmap {
            width: 2,
            height: 2,
            mask: vec![mask; 4],
        };
        let mut resources = Resources {
            bitmaps: vec![Bitmap::opaque(2, 2), masked(TexelMask::Transparent)],
            ..Resources::default()
        };
        let point = level.segments[0].side(SideId::Front).center;

        // A plain see-through overlay texel shows the opaque base texture.
        assert!(!level.wall_point_is_transparent(&resources, tag, &point, 0));

        resources.bitmaps[1] = masked(TexelMask::SuperTransparent);
        assert!(level.wall_point_is_transparent(&resources, tag, &point, 0));

        resources.bitmaps[1] = Bitmap::opaque(2, 2);
        resources.bitmaps[0] = masked(TexelMask::Transparent);
        assert!(!level.wall_point_is_transparent(&resources, tag, &point, 0));
    }

    #[test]
    fn element_limits_are_reported_instead_of_wrapping() {
        let mut level = corridor(1);
        level
            .objects
            .resize_with(usize::from(u16::MAX) + 1, Object::default);
        let robot = Object::new(ObjectType::Robot, SegId(0), Vec3::new(5.0, 5.0, 5.0), 1.0);
        assert_eq!(level.add_object(robot), Err(LevelError::TooManyObjects));
        assert!(level.segments[0].objects.is_empty());

        let tag = Tag::new(SegId(0), SideId::Top);
        level
            .walls
            .resize(usize::from(u16::MAX) + 1, Wall::new(tag, WallType::Closed));
        assert_eq!(
            level.add_wall(Wall::new(tag, WallType::Closed)),
            Err(LevelError::TooManyWalls)
        );
        assert!(level.try_get_side(tag).is_some_and(|side| side.wall.is_none()));
    }

    #[test]
    fn move_object_relinks_segment_membership() {
        let mut level = corridor(3);
        let id = level.add_object(Object::new(
            ObjectType::Robot,
            SegId(0),
            Vec3::new(5.0, 5.0, 5.0),
            1.0,
        )).unwrap();
        assert_eq!(level.segments[0].objects, vec![id]);

        level.objects[id.index()].position.z = 25.0;
        level.move_object(id);

        assert_eq!(level.objects[id.index()].segment, SegId(2));
        assert!(level.segments[0].objects.is_empty());
        assert_eq!(level.segments[2].objects, vec![id]);
    }

    #[test]
    fn move_object_outside_level_keeps_segment() {
        let mut level = corridor(1);
        let id = level.add_object(Object::new(
            ObjectType::Robot,
            SegId(0),
            Vec3::new(5.0, 5.0, 5.0),
            1.0,
        )).unwrap();
        level.objects[id.index()].position.x = -50.0;
        level.move_object(id);
        assert_eq!(level.objects[id.index()].segment, SegId(0));
    }
}
