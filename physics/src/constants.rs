use std::f32::consts::TAU;

/// Length of one legacy game tick in seconds.
///
/// Drag and thrust values in game data were tuned against this rate, so the
/// integrator rescales them by `dt / TICK_RATE` for any other step length.
pub const TICK_RATE: f32 = 1.0 / 64.0;

/// Number of physics sub-steps per update.
/// A single full-length step jitters in sharp corners and against other objects.
pub const PHYSICS_STEPS: u32 = 2;

/// Objects that travel less than this per update keep their segment membership.
pub const MIN_TRAVEL_DISTANCE: f32 = 0.001;

/// Seconds after launch before a mine can hit, or be hit by, the player.
pub const MINE_ARM_TIME: f32 = 2.0;

/// Fraction of the impulse transferred by a two-body collision.
pub const RESTITUTION: f32 = 0.5;

/// Impact speed is divided by this to get wall impact damage.
pub const IMPACT_DAMAGE_SCALE: f32 = 128.0;

/// Wall impacts below this damage are ignored.
pub const IMPACT_DAMAGE_THRESHOLD: f32 = 1.0 / 3.0;

/// Speed range over which the impact sound fades in.
pub const IMPACT_VOLUME_RANGE: f32 = 20.0;

/// Minimum seconds between liquid scrape sounds.
pub const SCRAPE_SOUND_INTERVAL: f64 = 0.25;

/// Players only take wall impact damage once their shields drop below this.
pub const IMPACT_PLAYER_SHIELD_LIMIT: f32 = 10.0;

/// Bank angle per unit of yaw rate for turn-roll craft (radians).
pub const TURN_ROLL_SCALE: f32 = (0x4ec4 / 2) as f32 / 65536.0 * TAU;

/// Maximum bank change per second for turn-roll craft (radians).
pub const TURN_ROLL_RATE: f32 = 0x2000 as f32 / 65536.0 * TAU;

/// Wiggle sine output is scaled by this so a 1/64 tick moves about half a unit.
pub const WIGGLE_SCALE: f32 = 20.0;
