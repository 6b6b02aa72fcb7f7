//! Simulation loop
//!
//! Owns the orbiter array and advances it one tick at a time. A tick runs
//! three passes, each finishing before the next begins:
//! 1. integrate every orbiter against the field at this tick's time
//! 2. project orbiters into world transforms
//! 3. copy transforms into renderer batches
//!
//! Orbiters are split into fixed chunks. Each chunk owns one PCG stream for
//! the whole run, so results are reproducible for a seed regardless of how
//! many threads rayon uses.

use glam::{Mat4, Vec4};
use rand_pcg::Pcg32;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::field::{DistanceField, FieldModel};
use super::orbiter::{Orbiter, StepParams, random_unit_vector};
use crate::error::Result;
use crate::renderer::{InstanceBatches, InstanceSink};
use crate::settings::SimConfig;

/// Stream id reserved for spawning; chunk streams start after it
const SPAWN_STREAM: u64 = 0;

/// Inputs for a single tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    /// Field animation time
    pub time: f32,
    pub model: FieldModel,
    pub params: StepParams,
}

impl Default for FrameInput {
    fn default() -> Self {
        Self {
            time: 0.0,
            model: FieldModel::default(),
            params: StepParams::default(),
        }
    }
}

/// Snapshot of simulation statistics
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SimStats {
    pub ticks: u64,
    pub orbiters: usize,
    pub batches: usize,
    /// Largest distance of any orbiter from the origin
    pub max_radius: f32,
    pub mean_speed: f32,
}

/// The orbiter simulation
pub struct Simulation {
    config: SimConfig,
    field: DistanceField,
    orbiters: Vec<Orbiter>,
    transforms: Vec<Mat4>,
    colors: Vec<Vec4>,
    batches: InstanceBatches,
    /// One stream per chunk of `config.chunk_size` orbiters
    streams: Vec<Pcg32>,
    spawn_rng: Pcg32,
    ticks: u64,
    /// Set when hosts may have edited orbiter colours
    colors_dirty: bool,
}

impl Simulation {
    /// Validate `config` and spawn the initial orbiters
    pub fn init(config: SimConfig) -> Result<Self> {
        config.validate()?;

        let mut sim = Self {
            field: DistanceField::default(),
            orbiters: Vec::new(),
            transforms: Vec::new(),
            colors: Vec::new(),
            batches: InstanceBatches::new(config.batch_size),
            streams: Vec::new(),
            spawn_rng: Pcg32::new(config.seed, SPAWN_STREAM),
            ticks: 0,
            colors_dirty: false,
            config,
        };
        sim.respawn();

        log::info!(
            "Simulation initialized: {} orbiters, {} batches of {}, seed {:#x}",
            sim.orbiters.len(),
            sim.batches.len(),
            sim.config.batch_size,
            sim.config.seed
        );
        Ok(sim)
    }

    /// Destroy every orbiter and spawn a fresh set
    pub fn respawn(&mut self) {
        let count = self.config.orbiter_count;
        if count == 0 {
            log::warn!("Spawning zero orbiters; nothing will be drawn");
        }

        let radius = self.config.spawn_radius;
        self.orbiters.clear();
        self.orbiters.reserve(count);
        for _ in 0..count {
            self.orbiters.push(Orbiter::spawn(&mut self.spawn_rng, radius));
        }

        // Extend only, so existing chunks keep advancing their own streams
        let chunks = count.div_ceil(self.config.chunk_size);
        let seed = self.config.seed;
        let existing = self.streams.len();
        self.streams
            .extend((existing..chunks).map(|i| Pcg32::new(seed, SPAWN_STREAM + 1 + i as u64)));

        self.extract_colors();
        self.extract_transforms();
        self.batches.fill(&self.transforms, &self.colors);
        log::info!("Spawned {} orbiters", count);
    }

    /// Advance one tick and refresh the instance batches
    pub fn tick(&mut self, frame: &FrameInput) -> &InstanceBatches {
        self.integrate(frame);
        if self.colors_dirty {
            self.extract_colors();
        }
        self.extract_transforms();
        self.batches.fill(&self.transforms, &self.colors);
        self.ticks += 1;
        &self.batches
    }

    /// Submit the current batches to the renderer
    pub fn submit<S: InstanceSink + ?Sized>(&self, sink: &mut S) -> Result<()> {
        self.batches.submit(sink)
    }

    /// Release buffers and report final statistics
    pub fn shutdown(self) -> SimStats {
        let stats = self.stats();
        log::info!(
            "Simulation shut down after {} ticks ({} orbiters)",
            stats.ticks,
            stats.orbiters
        );
        stats
    }

    pub fn stats(&self) -> SimStats {
        let (max_radius, speed_sum) = self
            .orbiters
            .par_iter()
            .map(|o| (o.position.length(), o.speed()))
            .reduce(|| (0.0, 0.0), |a, b| (a.0.max(b.0), a.1 + b.1));

        SimStats {
            ticks: self.ticks,
            orbiters: self.orbiters.len(),
            batches: self.batches.len(),
            max_radius,
            mean_speed: if self.orbiters.is_empty() {
                0.0
            } else {
                speed_sum / self.orbiters.len() as f32
            },
        }
    }

    pub fn orbiters(&self) -> &[Orbiter] {
        &self.orbiters
    }

    /// Mutable access for hosts that place orbiters by hand
    pub fn orbiters_mut(&mut self) -> &mut [Orbiter] {
        self.colors_dirty = true;
        &mut self.orbiters
    }

    pub fn transforms(&self) -> &[Mat4] {
        &self.transforms
    }

    pub fn batches(&self) -> &InstanceBatches {
        &self.batches
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    fn integrate(&mut self, frame: &FrameInput) {
        let field = &self.field;
        let FrameInput {
            time,
            model,
            params,
        } = *frame;

        self.orbiters
            .par_chunks_mut(self.config.chunk_size)
            .zip(self.streams.par_iter_mut())
            .for_each(|(chunk, rng)| {
                for orbiter in chunk {
                    let kick = random_unit_vector(rng);
                    let sample = field.evaluate(model, time, orbiter.position);
                    orbiter.step(sample, kick, params);
                }
            });
    }

    fn extract_transforms(&mut self) {
        self.orbiters
            .par_iter()
            .map(Orbiter::transform)
            .collect_into_vec(&mut self.transforms);
    }

    /// Colours only change on respawn or through `orbiters_mut`
    fn extract_colors(&mut self) {
        self.orbiters
            .par_iter()
            .map(|o| o.color)
            .collect_into_vec(&mut self.colors);
        self.colors_dirty = false;
    }
}

/// Advance `sim` by `ticks` frames of a fixed input, for tests and tools
pub fn run_fixed(sim: &mut Simulation, frame: FrameInput, ticks: u32, dt: f32) {
    for i in 0..ticks {
        let input = FrameInput {
            time: frame.time + i as f32 * dt,
            ..frame
        };
        sim.tick(&input);
    }
}
