//! Orbit Field entry point
//!
//! Headless host loop: drives the simulation at a fixed 60 Hz and hands each
//! tick's batches to a sink that only records what it would draw.

use orbit_field::{FrameDriver, InstanceRaw, InstanceSink, Result, SimConfig, Simulation};

/// Host frame rate
const FRAME_DT: f32 = 1.0 / 60.0;
/// Frames run when no count is given
const DEFAULT_FRAMES: u64 = 600;
/// Frames between stats lines
const REPORT_EVERY: u64 = 120;

/// Counts what a real renderer would draw
#[derive(Debug, Default)]
struct DrawCounter {
    draw_calls: u64,
    instances: u64,
    bytes: u64,
}

impl InstanceSink for DrawCounter {
    fn submit(&mut self, index: usize, instances: &[InstanceRaw]) -> Result<()> {
        log::trace!("batch {}: {} instances", index, instances.len());
        self.draw_calls += 1;
        self.instances += instances.len() as u64;
        self.bytes += (instances.len() * InstanceRaw::STRIDE) as u64;
        Ok(())
    }
}

fn run() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    let frames = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(DEFAULT_FRAMES);

    let mut driver = FrameDriver::new(&config);
    let mut sim = Simulation::init(config)?;
    let mut sink = DrawCounter::default();

    for frame in 0..frames {
        // Full respawn halfway through, as the scene allows at any time
        if frame == frames / 2 && frame > 0 {
            sim.respawn();
        }

        let input = driver.frame(frame as f32 * FRAME_DT);
        sim.tick(&input);
        sim.submit(&mut sink)?;

        if (frame + 1) % REPORT_EVERY == 0 {
            let stats = sim.stats();
            log::info!(
                "frame {}: model {}, max radius {:.2}, mean speed {:.4}",
                frame + 1,
                input.model.as_str(),
                stats.max_radius,
                stats.mean_speed
            );
        }
    }

    let stats = sim.shutdown();
    log::info!(
        "Done: {} ticks, {} draw calls, {} instances ({} KiB uploaded)",
        stats.ticks,
        sink.draw_calls,
        sink.instances,
        sink.bytes / 1024
    );
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Orbit Field starting...");

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
