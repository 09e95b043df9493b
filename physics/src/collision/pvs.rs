//! Broad phase: potential segment discovery by portal flood-fill.

use std::collections::{HashSet, VecDeque};

use crate::level::{Level, SegId, SideId};

use super::types::{Plane, Vec3};

/// Reusable scratch for [`PotentialSegments::gather`].
///
/// Owned by the caller (normally the physics context) and cleared at the
/// start of every query, so no allocation happens once buffers have grown.
#[derive(Clone, Debug, Default)]
pub struct PotentialSegments {
    visited: HashSet<SegId>,
    /// Visit order. Keeps narrow-phase iteration deterministic.
    segments: Vec<SegId>,
    queue: VecDeque<SegId>,
}

impl PotentialSegments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every segment a sphere at `point` with `radius` could touch.
    ///
    /// Breadth-first from `start`. The start segment's neighbors are always
    /// included; further neighbors only when `point` is behind the side plane
    /// pushed `radius` into the segment. The result is over-inclusive.
    pub fn gather(&mut self, level: &Level, start: SegId, point: Vec3, radius: f32) -> &[SegId] {
        self.visited.clear();
        self.segments.clear();
        self.queue.clear();

        if level.try_get_segment(start).is_none() {
            return &self.segments;
        }

        self.visited.insert(start);
        self.queue.push_back(start);
        let mut depth = 0;

        while let Some(id) = self.queue.pop_front() {
            self.segments.push(id);
            let Some(seg) = level.try_get_segment(id) else {
                continue;
            };

            for side_id in SideId::ALL {
                let Some(conn) = seg.connection(side_id) else {
                    continue;
                };

                let side = seg.side(side_id);
                let inflated = Plane::new(
                    side.center + side.average_normal * radius,
                    side.average_normal,
                );

                if (depth == 0 || inflated.distance(&point) <= 0.0) && self.visited.insert(conn) {
                    self.queue.push_back(conn);
                }
            }

            depth += 1;
        }

        log::trace!("pvs from {:?}: {} segments", start, self.segments.len());
        &self.segments
    }

    /// Result of the last `gather`.
    pub fn segments(&self) -> &[SegId] {
        &self.segments
    }

    pub fn contains(&self, id: SegId) -> bool {
        self.visited.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{Segment, Tag};

    /// Five 10-unit boxes along +Z, connected Front -> Back.
    fn corridor() -> Level {
        let mut level = Level::new();
        for i in 0..5 {
            let z = i as f32 * 10.0;
            level
                .add_segment(Segment::cuboid(
                    Vec3::new(0.0, 0.0, z),
                    Vec3::new(10.0, 10.0, z + 10.0),
                ))
                .unwrap();
        }
        for i in 1..5u16 {
            level
                .connect(
                    Tag::new(SegId(i - 1), SideId::Front),
                    Tag::new(SegId(i), SideId::Back),
                )
                .unwrap();
        }
        level
    }

    #[test]
    fn start_neighbors_are_always_included() {
        let level = corridor();
        let mut pvs = PotentialSegments::new();

        // Tiny radius in the middle of segment 2: only depth-0 neighbors qualify.
        let segs = pvs.gather(&level, SegId(2), Vec3::new(5.0, 5.0, 25.0), 0.1);
        assert_eq!(segs, &[SegId(2), SegId(1), SegId(3)]);
    }

    #[test]
    fn radius_reaching_a_portal_pulls_in_the_next_segment() {
        let level = corridor();
        let mut pvs = PotentialSegments::new();

        // 2 units from segment 1's front portal, radius 3: segment 2 then 3 via segment 1.
        pvs.gather(&level, SegId(0), Vec3::new(5.0, 5.0, 8.0), 3.0);
        assert!(pvs.contains(SegId(1)));
        assert!(!pvs.contains(SegId(2)));

        pvs.gather(&level, SegId(1), Vec3::new(5.0, 5.0, 18.0), 3.0);
        assert!(pvs.contains(SegId(2)));
        assert!(pvs.contains(SegId(0)));
        assert!(!pvs.contains(SegId(3)));
    }

    #[test]
    fn large_radius_walks_the_whole_level() {
        let level = corridor();
        let mut pvs = PotentialSegments::new();
        let segs = pvs.gather(&level, SegId(0), Vec3::new(5.0, 5.0, 5.0), 100.0);
        assert_eq!(segs.len(), 5);
    }

    #[test]
    fn scratch_is_cleared_between_queries() {
        let level = corridor();
        let mut pvs = PotentialSegments::new();
        pvs.gather(&level, SegId(0), Vec3::new(5.0, 5.0, 5.0), 100.0);
        let segs = pvs.gather(&level, SegId(4), Vec3::new(5.0, 5.0, 45.0), 0.1);
        assert_eq!(segs, &[SegId(4), SegId(3)]);
    }

    #[test]
    fn invalid_start_yields_an_empty_set() {
        let level = corridor();
        let mut pvs = PotentialSegments::new();
        assert!(pvs.gather(&level, SegId(42), Vec3::zeros(), 1.0).is_empty());
    }
}
