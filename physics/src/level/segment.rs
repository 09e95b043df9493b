use crate::collision::geometry::{Tri, quad_edge_distance, triangle_normal};
use crate::collision::types::{Plane, Vec2, Vec3};
use crate::object::ObjId;
use crate::resources::LevelTexId;

use super::wall::WallId;

/// Index of a segment in `Level::segments`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegId(pub u16);

impl SegId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The six faces of a segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum SideId {
    Left,
    Top,
    Right,
    Bottom,
    Back,
    Front,
}

impl SideId {
    pub const ALL: [SideId; 6] = [
        SideId::Left,
        SideId::Top,
        SideId::Right,
        SideId::Bottom,
        SideId::Back,
        SideId::Front,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn opposite(self) -> SideId {
        match self {
            SideId::Left => SideId::Right,
            SideId::Top => SideId::Bottom,
            SideId::Right => SideId::Left,
            SideId::Bottom => SideId::Top,
            SideId::Back => SideId::Front,
            SideId::Front => SideId::Back,
        }
    }
}

/// A segment side address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Tag {
    pub segment: SegId,
    pub side: SideId,
}

impl Tag {
    pub fn new(segment: SegId, side: SideId) -> Self {
        Self { segment, side }
    }
}

/// Corner indices of each side, in the order of `SideId::ALL`.
///
/// Corners 0..4 are the back face and 4..8 the front face, both wound
/// (-x,-y), (+x,-y), (+x,+y), (-x,+y) for an axis-aligned box.
const SIDE_CORNERS: [[usize; 4]; 6] = [
    [0, 3, 7, 4],
    [3, 2, 6, 7],
    [1, 5, 6, 2],
    [0, 4, 5, 1],
    [0, 1, 2, 3],
    [4, 7, 6, 5],
];

/// Quad corners used by each of a side's two triangles.
pub const SIDE_TRIANGLES: [[usize; 3]; 2] = [[0, 1, 2], [0, 2, 3]];

fn default_uvs() -> [Vec2; 4] {
    [
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(0.0, 1.0),
    ]
}

/// One face of a segment.
///
/// Normals point into the owning segment, so a side plane's negative
/// half-space is outside the segment.
#[derive(Clone, Debug, PartialEq)]
pub struct Side {
    pub vertices: [Vec3; 4],
    pub normals: [Vec3; 2],
    pub tangents: [Vec3; 2],
    pub center: Vec3,
    pub average_normal: Vec3,
    pub uvs: [Vec2; 4],
    pub tmap: LevelTexId,
    /// Overlay texture drawn on top of `tmap`.
    pub tmap2: Option<LevelTexId>,
    /// Overlay rotation in quarter turns.
    pub overlay_rotation: u8,
    pub wall: Option<WallId>,
}

impl Side {
    /// Build a side from its quad, orienting normals toward `segment_center`.
    pub fn new(vertices: [Vec3; 4], segment_center: Vec3) -> Self {
        let center = vertices.iter().sum::<Vec3>() / 4.0;
        let mut normals = [Vec3::zeros(); 2];
        let mut tangents = [Vec3::zeros(); 2];

        for (tri, indices) in SIDE_TRIANGLES.iter().enumerate() {
            let points = indices.map(|i| vertices[i]);
            let mut normal = triangle_normal(&points).unwrap_or_else(Vec3::zeros);
            if normal.dot(&(segment_center - points[0])) < 0.0 {
                normal = -normal;
            }
            normals[tri] = normal;
            tangents[tri] = (points[1] - points[0])
                .try_normalize(f32::EPSILON)
                .unwrap_or_else(Vec3::zeros);
        }

        let average_normal = (normals[0] + normals[1])
            .try_normalize(f32::EPSILON)
            .unwrap_or(normals[0]);

        Self {
            vertices,
            normals,
            tangents,
            center,
            average_normal,
            uvs: default_uvs(),
            tmap: LevelTexId(0),
            tmap2: None,
            overlay_rotation: 0,
            wall: None,
        }
    }

    /// Vertices of triangle `tri` (0 or 1).
    pub fn triangle(&self, tri: usize) -> Tri {
        SIDE_TRIANGLES[tri.min(1)].map(|i| self.vertices[i])
    }

    pub fn triangle_uvs(&self, tri: usize) -> [Vec2; 3] {
        SIDE_TRIANGLES[tri.min(1)].map(|i| self.uvs[i])
    }

    /// Plane through the side center along the average normal.
    pub fn plane(&self) -> Plane {
        Plane::new(self.center, self.average_normal)
    }

    pub fn edge_distance(&self, point: &Vec3) -> f32 {
        quad_edge_distance(&self.vertices, point)
    }
}

/// A convex six-sided cell of the level.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub sides: [Side; 6],
    pub connections: [Option<SegId>; 6],
    pub center: Vec3,
    /// Objects currently inside this segment.
    pub objects: Vec<ObjId>,
}

impl Segment {
    /// Build a segment from its eight corners (see `SIDE_CORNERS` for the layout).
    pub fn from_corners(corners: [Vec3; 8]) -> Self {
        let center = corners.iter().sum::<Vec3>() / 8.0;
        let sides = SIDE_CORNERS.map(|indices| Side::new(indices.map(|i| corners[i]), center));

        Self {
            sides,
            connections: [None; 6],
            center,
            objects: Vec::new(),
        }
    }

    /// Axis-aligned box segment. Back is the `min.z` face and Front the `max.z` face.
    pub fn cuboid(min: Vec3, max: Vec3) -> Self {
        Self::from_corners([
            Vec3::new(min.x, min.y, min.z),
            Vec3::new(max.x, min.y, min.z),
            Vec3::new(max.x, max.y, min.z),
            Vec3::new(min.x, max.y, min.z),
            Vec3::new(min.x, min.y, max.z),
            Vec3::new(max.x, min.y, max.z),
            Vec3::new(max.x, max.y, max.z),
            Vec3::new(min.x, max.y, max.z),
        ])
    }

    #[inline]
    pub fn side(&self, side: SideId) -> &Side {
        &self.sides[side.index()]
    }

    #[inline]
    pub fn side_mut(&mut self, side: SideId) -> &mut Side {
        &mut self.sides[side.index()]
    }

    #[inline]
    pub fn connection(&self, side: SideId) -> Option<SegId> {
        self.connections[side.index()]
    }

    pub fn side_has_connection(&self, side: SideId) -> bool {
        self.connection(side).is_some()
    }

    /// True if `point` is on the inner side of every side plane (within `tolerance`).
    pub fn contains_point(&self, point: &Vec3, tolerance: f32) -> bool {
        self.sides
            .iter()
            .all(|side| side.plane().distance(point) >= -tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cuboid_normals_point_inward() {
        let seg = Segment::cuboid(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        let expected = [
            (SideId::Left, Vec3::x()),
            (SideId::Top, -Vec3::y()),
            (SideId::Right, -Vec3::x()),
            (SideId::Bottom, Vec3::y()),
            (SideId::Back, Vec3::z()),
            (SideId::Front, -Vec3::z()),
        ];

        for (side_id, normal) in expected {
            let side = seg.side(side_id);
            assert!((side.average_normal - normal).norm() < 1e-6, "{side_id:?}");
            for n in side.normals {
                assert!((n - normal).norm() < 1e-6, "{side_id:?}");
            }
        }
    }

    #[test]
    fn opposite_sides_pair_up() {
        for side in SideId::ALL {
            assert_eq!(side.opposite().opposite(), side);
            assert_ne!(side.opposite(), side);
        }
    }

    #[test]
    fn contains_point_uses_side_planes() {
        let seg = Segment::cuboid(Vec3::zeros(), Vec3::new(10.0, 10.0, 10.0));
        assert!(seg.contains_point(&Vec3::new(5.0, 5.0, 5.0), 0.0));
        assert!(seg.contains_point(&Vec3::new(0.0, 5.0, 5.0), 0.0));
        assert!(!seg.contains_point(&Vec3::new(-0.5, 5.0, 5.0), 0.0));
    }

    #[test]
    fn side_triangles_cover_the_quad() {
        let seg = Segment::cuboid(Vec3::zeros(), Vec3::new(2.0, 2.0, 2.0));
        let side = seg.side(SideId::Back);
        let [a, b] = [side.triangle(0), side.triangle(1)];
        assert_eq!(a[0], b[0]);
        assert_eq!(a[2], b[1]);
        assert!((side.center - Vec3::new(1.0, 1.0, 0.0)).norm() < 1e-6);
    }
}
