//! Orbit Field - orbiter particles swarming over procedural distance fields
//!
//! Core modules:
//! - `sim`: Field models, orbiter integration, and the tick loop
//! - `renderer`: Instance records and fixed-size draw batches
//! - `settings`: Configuration and wall-clock frame driving
//! - `error`: Errors raised at the host boundary

pub mod error;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::{Result, SimError};
pub use renderer::{InstanceBatches, InstanceRaw, InstanceSink};
pub use settings::{FrameDriver, SimConfig};
pub use sim::{DistanceField, FieldModel, FieldSample, FrameInput, Orbiter, Simulation, StepParams};

/// Simulation configuration constants
pub mod consts {
    /// Orbiters created by default
    pub const DEFAULT_ORBITER_COUNT: usize = 4000;
    /// Orbiters spawn inside a ball of this radius
    pub const SPAWN_RADIUS: f32 = 50.0;

    /// Instances per draw batch
    pub const DEFAULT_BATCH_SIZE: usize = 512;
    /// Orbiters per parallel work unit
    pub const DEFAULT_CHUNK_SIZE: usize = 256;

    /// Random kick per tick
    pub const DEFAULT_JITTER: f32 = 0.001;
    /// Field force scale
    pub const DEFAULT_ATTRACTION: f32 = 0.003;
    /// Velocity multiplier applied every tick
    pub const DAMPING: f32 = 0.99;

    /// Field time advanced per wall-clock second
    pub const TIME_SCALE: f32 = 0.1;
    /// Models advanced per wall-clock second (one every 10 s)
    pub const MODEL_CYCLE_RATE: f32 = 0.1;

    /// Orbiter mesh scale: x and y are fixed, z stretches with speed
    pub const SLIVER_WIDTH: f32 = 0.1;
    pub const SLIVER_HEIGHT: f32 = 0.01;
    pub const SLIVER_STRETCH: f32 = 5.0;
    pub const SLIVER_MIN_LENGTH: f32 = 0.2;

    pub const DEFAULT_SEED: u64 = 0x5EED;
}
