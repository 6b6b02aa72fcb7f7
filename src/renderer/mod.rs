//! Renderer hand-off
//!
//! Converts orbiter transforms into instance batches. Issuing the draw calls
//! is left to whatever implements [`InstanceSink`].

pub mod batch;
pub mod instance;

pub use batch::{InstanceBatches, InstanceSink, batch_count};
pub use instance::InstanceRaw;
