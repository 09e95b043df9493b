/*!
Collision tolerances and heuristics.

Notes
- Distances are in level units, time in seconds.
- These are tuned to match how the original game felt rather than to be
  physically exact. Change them together with gameplay testing.
*/

/// Objects gather potential segments with this multiple of their radius so
/// large objects in adjacent segments are found.
pub const PVS_RADIUS_SCALE: f32 = 2.0;

/// Sphere-vs-model tests add a raycast pre-pass once an object travels more
/// than this multiple of its radius in one sub-step.
pub const RAYCAST_TRAVEL_RATIO: f32 = 1.5;

/// Robot spheres are oversized for their models. Robot pairs collide using
/// this fraction of their radius, so some overlap is allowed.
pub const ROBOT_SPHERE_SCALE: f32 = 0.66;

/// Rays shorter than this never hit anything.
pub const MIN_RAY_DISTANCE: f32 = 0.01;

/// Two-body response is skipped below this impact speed.
pub const IMPACT_NOISE_FLOOR: f32 = 0.1;

/// Robots touching a wall keep this fraction of their angular acceleration.
pub const ROBOT_WALL_SPIN_DAMPING: f32 = 0.5;
