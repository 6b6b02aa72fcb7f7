//! Procedural signed distance fields
//!
//! Six closed-form models, each animated by a single `time` scalar. Every
//! query returns a signed distance (negative inside) and a unit normal
//! pointing away from the surface.

use glam::{Vec2, Vec3};
use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

/// Smallest blend radius accepted by [`smooth_min`]
pub const MIN_BLEND_RADIUS: f32 = 1e-4;

/// Seed of the Perlin height field
pub const PERLIN_SEED: u32 = 0;

/// Selectable field model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FieldModel {
    Metaballs,
    SpinMixer,
    #[default]
    SpherePlane,
    SphereField,
    FigureEight,
    PerlinNoise,
}

impl FieldModel {
    /// All models in cycling order
    pub const ALL: [FieldModel; 6] = [
        FieldModel::Metaballs,
        FieldModel::SpinMixer,
        FieldModel::SpherePlane,
        FieldModel::SphereField,
        FieldModel::FigureEight,
        FieldModel::PerlinNoise,
    ];

    /// Number of models
    pub const COUNT: usize = Self::ALL.len();

    pub fn index(self) -> usize {
        self as usize
    }

    /// Model at `index`, wrapping past the end
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::COUNT]
    }

    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    /// Model selected by a continuously advancing phase.
    ///
    /// The integer part of `phase` (taken modulo the model count) picks the
    /// model, so advancing the phase by 1.0 moves to the next one.
    pub fn cycle(phase: f32) -> Self {
        if !phase.is_finite() {
            return Self::default();
        }
        let wrapped = phase.rem_euclid(Self::COUNT as f32);
        Self::from_index(wrapped.floor() as usize)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldModel::Metaballs => "Metaballs",
            FieldModel::SpinMixer => "SpinMixer",
            FieldModel::SpherePlane => "SpherePlane",
            FieldModel::SphereField => "SphereField",
            FieldModel::FigureEight => "FigureEight",
            FieldModel::PerlinNoise => "PerlinNoise",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace(['_', '-', ' '], "").as_str() {
            "metaballs" => Some(FieldModel::Metaballs),
            "spinmixer" => Some(FieldModel::SpinMixer),
            "sphereplane" => Some(FieldModel::SpherePlane),
            "spherefield" => Some(FieldModel::SphereField),
            "figureeight" | "figure8" => Some(FieldModel::FigureEight),
            "perlinnoise" | "perlin" => Some(FieldModel::PerlinNoise),
            _ => None,
        }
    }
}

/// Result of a field query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSample {
    /// Signed distance, negative inside the surface
    pub distance: f32,
    /// Unit outward normal, or zero when the direction is degenerate
    pub normal: Vec3,
}

impl FieldSample {
    /// Sample that exerts no force
    pub const NEUTRAL: FieldSample = FieldSample {
        distance: 0.0,
        normal: Vec3::ZERO,
    };
}

/// Polynomial smooth minimum of two distances.
///
/// Radii below [`MIN_BLEND_RADIUS`] are raised to it.
#[inline]
pub fn smooth_min(a: f32, b: f32, radius: f32) -> f32 {
    let radius = radius.max(MIN_BLEND_RADIUS);
    let e = (radius - (a - b).abs()).max(0.0);
    a.min(b) - e * e * 0.25 / radius
}

/// Signed distance to a sphere centered at the origin
#[inline]
pub fn sd_sphere(p: Vec3, radius: f32) -> f32 {
    p.length() - radius
}

/// Numeric field gradient using central differences
pub fn sdf_gradient<F>(p: Vec3, sdf: F) -> Vec3
where
    F: Fn(Vec3) -> f32,
{
    let eps = 1e-3;
    let dx = sdf(p + Vec3::X * eps) - sdf(p - Vec3::X * eps);
    let dy = sdf(p + Vec3::Y * eps) - sdf(p - Vec3::Y * eps);
    let dz = sdf(p + Vec3::Z * eps) - sdf(p - Vec3::Z * eps);
    Vec3::new(dx, dy, dz).normalize_or_zero()
}

/// Evaluates the six field models.
///
/// Holds the Perlin permutation table so the height field is not rebuilt on
/// every query. Cheap to share across worker threads.
#[derive(Debug, Clone)]
pub struct DistanceField {
    perlin: Perlin,
}

impl Default for DistanceField {
    fn default() -> Self {
        Self::new(PERLIN_SEED)
    }
}

impl DistanceField {
    pub fn new(perlin_seed: u32) -> Self {
        Self {
            perlin: Perlin::new(perlin_seed),
        }
    }

    /// Signed distance and outward normal of `model` at `position`.
    pub fn evaluate(&self, model: FieldModel, time: f32, position: Vec3) -> FieldSample {
        if !position.is_finite() {
            return FieldSample::NEUTRAL;
        }
        let time = if time.is_finite() { time } else { 0.0 };

        let (distance, normal) = match model {
            FieldModel::Metaballs => metaballs(time, position),
            FieldModel::SpinMixer => spin_mixer(time, position),
            FieldModel::SpherePlane => sphere_plane(time, position),
            FieldModel::SphereField => sphere_field(time, position),
            FieldModel::FigureEight => figure_eight(time, position),
            FieldModel::PerlinNoise => self.perlin_height(position),
        };

        FieldSample {
            distance,
            normal: normal.normalize_or_zero(),
        }
    }

    /// Distance only, for numeric gradients and probing
    pub fn distance(&self, model: FieldModel, time: f32, position: Vec3) -> f32 {
        self.evaluate(model, time, position).distance
    }

    /// Perlin noise remapped to [0, 1]
    pub fn perlin01(&self, p: Vec2) -> f32 {
        let n = self.perlin.get([p.x as f64, p.y as f64]) as f32;
        ((n + 1.0) * 0.5).clamp(0.0, 1.0)
    }

    fn perlin_height(&self, p: Vec3) -> (f32, Vec3) {
        let height = self.perlin01(Vec2::new(p.x * 0.2, p.z * 0.2)) * 6.0;
        (p.y - height, Vec3::Y)
    }
}

/// Five spheres on Lissajous orbits, smooth-unioned
fn metaballs(time: f32, p: Vec3) -> (f32, Vec3) {
    let mut distance = f32::MAX;
    let mut normal = Vec3::ZERO;

    for i in 0..5 {
        let fi = i as f32;
        let orbit_radius = fi * 0.5 + 2.0;
        let angle1 = time * 4.0 * (1.0 + fi * 0.1);
        let angle2 = time * 4.0 * (1.2 + fi * 0.117);
        let angle3 = time * 4.0 * (1.3 + fi * 0.1618);
        let center = Vec3::new(
            angle1.cos() * orbit_radius,
            angle2.sin() * orbit_radius,
            angle3.sin() * orbit_radius,
        );

        let offset = p - center;
        let blended = smooth_min(distance, sd_sphere(offset, 2.0), 2.0);
        if blended < distance {
            normal = offset;
            distance = blended;
        }
    }

    (distance, normal)
}

/// Six spheres spinning in the xz plane, hard union
fn spin_mixer(time: f32, p: Vec3) -> (f32, Vec3) {
    let mut distance = f32::MAX;
    let mut normal = Vec3::ZERO;

    for i in 0..6 {
        // Pairs of spheres share an orbit
        let orbit_radius = ((i / 2 + 2) * 2) as f32;
        let angle = time * 20.0 * (1.0 + i as f32 * 0.1);
        let center = Vec3::new(
            angle.cos() * orbit_radius,
            angle.sin(),
            angle.sin() * orbit_radius,
        );

        let offset = p - center;
        let d = sd_sphere(offset, 2.0);
        if d < distance {
            normal = offset;
            distance = d;
        }
    }

    (distance, normal)
}

/// Sphere of radius 5 morphing toward the y = 0 plane
fn sphere_plane(time: f32, p: Vec3) -> (f32, Vec3) {
    let sphere_dist = sd_sphere(p, 5.0);
    let sphere_normal = p.normalize_or_zero();

    let plane_dist = p.y;
    let plane_normal = Vec3::Y;

    let t = (time * 8.0).sin() * 0.4 + 0.4;
    // Normals are blended linearly, not slerped. The blend can shorten the
    // vector; only the shared final normalize restores unit length.
    (
        sphere_dist + (plane_dist - sphere_dist) * t,
        sphere_normal.lerp(plane_normal, t),
    )
}

/// Infinite lattice of radius-5 spheres with breathing spacing
fn sphere_field(time: f32, p: Vec3) -> (f32, Vec3) {
    let spacing = 5.0 + (time * 5.0).sin() * 2.0;
    let half = spacing * 0.5;
    let shifted = p + Vec3::splat(half);
    let local = shifted - (shifted / spacing).floor() * spacing - Vec3::splat(half);
    (sd_sphere(local, 5.0), local)
}

/// Two mirrored rings forming a figure eight with a travelling bulge
fn figure_eight(time: f32, p: Vec3) -> (f32, Vec3) {
    let ring_radius = 4.0;
    let (z, flipper) = if p.z < 0.0 { (-p.z, -1.0) } else { (p.z, 1.0) };

    let mut point = Vec3::new(p.x, 0.0, z - ring_radius).normalize_or_zero() * ring_radius;
    let angle = point.z.atan2(point.x) + time * 8.0;
    point.z += ring_radius;

    let normal = Vec3::new(p.x - point.x, p.y - point.y, (z - point.z) * flipper);
    let mut wave = (angle * flipper * 3.0).cos() * 0.5 + 0.5;
    wave *= wave * 0.5;

    (normal.length() - (0.5 + wave), normal)
}
