//! Simulation core
//!
//! Field evaluation, orbiter integration, and the tick loop. Nothing in here
//! touches a graphics API:
//! - Every orbiter is updated independently from the same tick inputs
//! - Seeded RNG only, one persistent stream per chunk
//! - Stable orbiter order (by index)

pub mod field;
pub mod orbiter;
pub mod tick;

pub use field::{DistanceField, FieldModel, FieldSample, sd_sphere, sdf_gradient, smooth_min};
pub use orbiter::{Orbiter, StepParams, look_rotation_safe, random_in_sphere, random_unit_vector};
pub use tick::{FrameInput, SimStats, Simulation, run_fixed};
