//! Orbiter particles
//!
//! Per-particle integration under a field sample, spawn sampling, and
//! projection of a particle into a render transform.

use glam::{Mat3, Mat4, Quat, Vec3, Vec4};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use super::field::FieldSample;
use crate::consts::*;

/// Scalars that drive one integration step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepParams {
    /// Magnitude of the random kick added each step
    pub jitter: f32,
    /// Scale of the force pulling toward the field surface
    pub attraction: f32,
}

impl Default for StepParams {
    fn default() -> Self {
        Self {
            jitter: DEFAULT_JITTER,
            attraction: DEFAULT_ATTRACTION,
        }
    }
}

/// A single orbiter particle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orbiter {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Instance tint passed through to the renderer
    pub color: Vec4,
}

impl Default for Orbiter {
    fn default() -> Self {
        Self::at(Vec3::ZERO)
    }
}

impl Orbiter {
    /// Resting orbiter at `position`
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            color: Vec4::ONE,
        }
    }

    /// Spawn at a uniformly random point inside a ball of `radius`
    pub fn spawn<R: Rng>(rng: &mut R, radius: f32) -> Self {
        Self::at(random_in_sphere(rng, radius))
    }

    /// Advance velocity and position by one step.
    ///
    /// `random_unit` is the isotropic kick for this step; the caller owns the
    /// random stream so a step is deterministic given its inputs.
    pub fn step(&mut self, sample: FieldSample, random_unit: Vec3, params: StepParams) {
        self.velocity -= sample.normal * params.attraction * sample.distance.clamp(-1.0, 1.0);
        self.velocity += random_unit * params.jitter;
        self.velocity *= DAMPING;
        self.position += self.velocity;
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// World transform: a thin sliver stretched along the direction of travel
    pub fn transform(&self) -> Mat4 {
        let forward = self.velocity.normalize_or_zero();
        let rotation = look_rotation_safe(forward, Vec3::Y);
        let scale = Vec3::new(
            SLIVER_WIDTH,
            SLIVER_HEIGHT,
            (self.speed() * SLIVER_STRETCH).max(SLIVER_MIN_LENGTH),
        );
        Mat4::from_scale_rotation_translation(scale, rotation, self.position)
    }
}

/// Rotation whose +Z axis faces `forward` with +Y as close to `up` as possible.
///
/// Falls back to identity when `forward` is zero or parallel to `up`.
pub fn look_rotation_safe(forward: Vec3, up: Vec3) -> Quat {
    let forward = forward.normalize_or_zero();
    let right = up.cross(forward).normalize_or_zero();
    if forward == Vec3::ZERO || right == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    let up = forward.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, up, forward)).normalize()
}

/// Uniformly distributed direction on the unit sphere
pub fn random_unit_vector<R: Rng>(rng: &mut R) -> Vec3 {
    let z: f32 = rng.random_range(-1.0..=1.0);
    let phi: f32 = rng.random_range(0.0..TAU);
    let ring = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(ring * phi.cos(), ring * phi.sin(), z)
}

/// Uniformly distributed point inside a ball of `radius`
pub fn random_in_sphere<R: Rng>(rng: &mut R, radius: f32) -> Vec3 {
    let r = rng.random::<f32>().cbrt() * radius;
    random_unit_vector(rng) * r
}
