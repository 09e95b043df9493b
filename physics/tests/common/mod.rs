//! Small level builders shared by the scenario tests.

use physics::{Level, Object, ObjectType, SegId, Segment, SideId, Tag, Vec3};

/// One box segment spanning `min..max`.
pub fn room(min: Vec3, max: Vec3) -> Level {
    let mut level = Level::new();
    level
        .add_segment(Segment::cuboid(min, max))
        .expect("first segment");
    level
}

/// `len` unit-depth boxes of `size` along -Z, joined Back to Front.
pub fn corridor(len: usize, size: f32) -> Level {
    let mut level = Level::new();
    for i in 0..len {
        let z = -(i as f32) * size;
        level
            .add_segment(Segment::cuboid(
                Vec3::new(0.0, 0.0, z - size),
                Vec3::new(size, size, z),
            ))
            .expect("segment");
    }
    for i in 1..len {
        level
            .connect(
                Tag::new(SegId(i as u16 - 1), SideId::Back),
                Tag::new(SegId(i as u16), SideId::Front),
            )
            .expect("connection");
    }
    level.validate().expect("valid corridor");
    level
}

pub fn spawn(ty: ObjectType, segment: SegId, position: Vec3, radius: f32) -> Object {
    Object::new(ty, segment, position, radius)
}
