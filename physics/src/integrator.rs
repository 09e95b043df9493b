//! Per sub-step integration of rotation and position.
//!
//! Drag and thrust values are tuned for [`TICK_RATE`] steps and are rescaled by
//! `dt / TICK_RATE` here. Angular velocity is stored in revolutions per second
//! around the object's local axes.

use std::f32::consts::TAU;

use crate::collision::types::{Quat, Vec3};
use crate::constants::{TICK_RATE, TURN_ROLL_RATE, TURN_ROLL_SCALE, WIGGLE_SCALE};
use crate::object::{Object, PhysicsData, PhysicsFlag};

/// Seconds of phase offset per signature, so wiggling objects don't move in lockstep.
const WIGGLE_PHASE_PER_SIGNATURE: f64 = 0.8191;

#[inline]
fn decay(drag: f32, scale: f32) -> f32 {
    (1.0 - drag * scale).max(0.0)
}

#[inline]
fn roll_about_forward(angle: f32) -> Quat {
    Quat::from_axis_angle(&Vec3::z_axis(), angle)
}

/// Move the bank angle toward `angular_velocity.y * scale`, at most `rate * dt` per call.
pub fn turn_roll(pd: &mut PhysicsData, scale: f32, rate: f32, dt: f32) {
    let desired = pd.angular_velocity.y * scale;
    let theta = desired - pd.turn_roll;
    let step = rate * dt;
    pd.turn_roll += theta.clamp(-step, step);
}

/// Thrust, drag and rotation for one sub-step.
pub fn angular_physics(obj: &mut Object, dt: f32) {
    let pd = &mut obj.physics;
    if pd.angular_velocity == Vec3::zeros()
        && pd.angular_thrust == Vec3::zeros()
        && pd.angular_acceleration == Vec3::zeros()
    {
        return;
    }

    let drag = if pd.drag > 0.0 { pd.drag } else { 1.0 } * 5.0 / 2.0;
    let scale = dt / TICK_RATE;

    if pd.flags.has(PhysicsFlag::UseThrust) && pd.mass > 0.0 {
        pd.angular_velocity += pd.angular_thrust / pd.mass * scale;
    }

    if !pd.flags.has(PhysicsFlag::FixedAngVel) {
        pd.angular_velocity += pd.angular_acceleration * dt;
        pd.angular_acceleration *= decay(drag, scale);
        pd.angular_velocity *= decay(drag, scale);
    }

    let banks = pd.flags.has(PhysicsFlag::TurnRoll);
    if banks {
        obj.rotation *= roll_about_forward(pd.turn_roll);
    }

    // Stored rates are left handed.
    obj.rotation *= Quat::from_scaled_axis(-pd.angular_velocity * dt * TAU);

    if banks {
        turn_roll(pd, TURN_ROLL_SCALE, TURN_ROLL_RATE, dt);
        obj.rotation *= roll_about_forward(-pd.turn_roll);
    }
}

/// Thrust, drag, position and wiggle for one sub-step. `time` is the game clock.
pub fn linear_physics(obj: &mut Object, time: f64, dt: f32) {
    let pd = &mut obj.physics;
    let scale = dt / TICK_RATE;

    if pd.velocity != Vec3::zeros() || pd.thrust != Vec3::zeros() {
        if pd.drag > 0.0 {
            if pd.thrust != Vec3::zeros() && pd.mass > 0.0 {
                pd.velocity += pd.thrust / pd.mass * scale;
            }
            pd.velocity *= decay(pd.drag, scale);
        }

        obj.position += pd.velocity * dt;
    }

    if pd.flags.has(PhysicsFlag::Wiggle) && pd.wiggle > 0.0 {
        let (amplitude, rate) = (pd.wiggle, pd.wiggle_rate);
        let phase = obj.signature.0 as f64 * WIGGLE_PHASE_PER_SIGNATURE;
        wiggle_object(obj, time + phase, dt, amplitude, rate);
    }
}

/// Push the object along its up axis following a sine of the clock.
pub fn wiggle_object(obj: &mut Object, time: f64, dt: f32, amplitude: f32, rate: f32) {
    let angle = ((time * rate as f64) as f32 * TAU).sin() * WIGGLE_SCALE;
    obj.physics.velocity += obj.up() * angle * amplitude * dt;
}

/// Offset a sine-moving weapon along its up axis by this sub-step's change in phase.
pub fn sine_weapon(obj: &mut Object, dt: f32, speed: f32, amplitude: f32) {
    let Some(weapon) = obj.weapon() else {
        return;
    };
    if !weapon.sine_movement {
        return;
    }

    let phase = weapon.alive_time * TAU * speed;
    let offset = (phase + dt * TAU * speed).sin() - phase.sin();
    obj.position += obj.up() * offset * amplitude;
}
