//! Instance batching for the renderer
//!
//! Splits the per-orbiter transforms into fixed-size batches: every batch is
//! full except the last, which holds the remainder. Buffers are reused across
//! ticks and only reallocated when the orbiter count changes.

use glam::{Mat4, Vec4};

use super::instance::InstanceRaw;
use crate::error::Result;

/// Receives instance batches, one draw call each
pub trait InstanceSink {
    /// Submit batch `index`; `instances` is never empty
    fn submit(&mut self, index: usize, instances: &[InstanceRaw]) -> Result<()>;
}

/// Number of batches needed for `count` instances
#[inline]
pub fn batch_count(count: usize, batch_size: usize) -> usize {
    count.div_ceil(batch_size.max(1))
}

/// Fixed-size instance batches
#[derive(Debug, Clone)]
pub struct InstanceBatches {
    batch_size: usize,
    batches: Vec<Vec<InstanceRaw>>,
    instance_count: usize,
}

impl InstanceBatches {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            batches: Vec::new(),
            instance_count: 0,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn instance_count(&self) -> usize {
        self.instance_count
    }

    pub fn get(&self, index: usize) -> Option<&[InstanceRaw]> {
        self.batches.get(index).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = &[InstanceRaw]> {
        self.batches.iter().map(Vec::as_slice)
    }

    /// Size of the last batch, zero when empty
    pub fn last_batch_len(&self) -> usize {
        self.batches.last().map_or(0, Vec::len)
    }

    /// Rebuild from transforms and their tints.
    ///
    /// `colors` is matched to `transforms` by index; missing entries are white.
    pub fn fill(&mut self, transforms: &[Mat4], colors: &[Vec4]) {
        self.resize(transforms.len());

        for (batch, (chunk, color_chunk)) in self.batches.iter_mut().zip(
            transforms
                .chunks(self.batch_size)
                .zip(chunk_or_empty(colors, self.batch_size)),
        ) {
            for (i, (slot, m)) in batch.iter_mut().zip(chunk).enumerate() {
                let color = color_chunk.get(i).copied().unwrap_or(Vec4::ONE);
                *slot = InstanceRaw::new(*m, color);
            }
        }
    }

    /// Hand every batch to `sink`, stopping at the first failure
    pub fn submit<S: InstanceSink + ?Sized>(&self, sink: &mut S) -> Result<()> {
        for (index, batch) in self.iter().enumerate() {
            sink.submit(index, batch)?;
        }
        Ok(())
    }

    fn resize(&mut self, count: usize) {
        if count == self.instance_count && self.batches.len() == batch_count(count, self.batch_size) {
            return;
        }

        let size = self.batch_size;
        let needed = batch_count(count, size);
        self.batches.truncate(needed);
        for (index, batch) in self.batches.iter_mut().enumerate() {
            batch.resize(Self::len_of(index, count, size), InstanceRaw::default());
        }
        while self.batches.len() < needed {
            let len = Self::len_of(self.batches.len(), count, size);
            self.batches.push(vec![InstanceRaw::default(); len]);
        }
        self.instance_count = count;

        log::debug!(
            "Instance batches: {} x {} (last {})",
            needed,
            self.batch_size,
            self.last_batch_len()
        );
    }

    fn len_of(index: usize, count: usize, size: usize) -> usize {
        (count - index * size).min(size)
    }
}

/// Chunks of `colors`, padded with empty slices so it never runs out before
/// the transforms do
fn chunk_or_empty(colors: &[Vec4], size: usize) -> impl Iterator<Item = &[Vec4]> {
    colors.chunks(size).chain(std::iter::repeat(&[][..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;
    use glam::Vec3;

    fn transforms(count: usize) -> Vec<Mat4> {
        (0..count)
            .map(|i| Mat4::from_translation(Vec3::new(i as f32, 0.0, 0.0)))
            .collect()
    }

    #[derive(Default)]
    struct Recorder {
        sizes: Vec<usize>,
        fail_at: Option<usize>,
    }

    impl InstanceSink for Recorder {
        fn submit(&mut self, index: usize, instances: &[InstanceRaw]) -> Result<()> {
            if self.fail_at == Some(index) {
                return Err(SimError::Submit {
                    batch: index,
                    reason: "draw call limit".into(),
                });
            }
            self.sizes.push(instances.len());
            Ok(())
        }
    }

    #[test]
    fn test_default_scene_batching() {
        let mut batches = InstanceBatches::new(512);
        batches.fill(&transforms(4000), &[]);
        assert_eq!(batches.len(), 8);
        assert_eq!(batches.last_batch_len(), 4000 - 7 * 512);
        assert_eq!(batches.instance_count(), 4000);
        for i in 0..7 {
            assert_eq!(batches.get(i).map(<[InstanceRaw]>::len), Some(512));
        }
    }

    #[test]
    fn test_exact_multiple_has_no_empty_batch() {
        let mut batches = InstanceBatches::new(512);
        batches.fill(&transforms(1024), &[]);
        assert_eq!(batches.len(), 2);
        assert_eq!(batches.last_batch_len(), 512);
    }

    #[test]
    fn test_empty() {
        let mut batches = InstanceBatches::new(512);
        batches.fill(&[], &[]);
        assert!(batches.is_empty());
        assert_eq!(batches.last_batch_len(), 0);
        assert_eq!(batch_count(0, 512), 0);
    }

    #[test]
    fn test_order_and_colors_preserved() {
        let red = Vec4::new(1.0, 0.0, 0.0, 1.0);
        let colors = vec![red; 5];
        let mut batches = InstanceBatches::new(4);
        batches.fill(&transforms(10), &colors);

        let flat: Vec<InstanceRaw> = batches.iter().flatten().copied().collect();
        assert_eq!(flat.len(), 10);
        for (i, instance) in flat.iter().enumerate() {
            assert_eq!(instance.model[3][0], i as f32);
            let expected = if i < 5 { red } else { Vec4::ONE };
            assert_eq!(instance.color, expected.to_array());
        }
    }

    #[test]
    fn test_refill_with_fewer_instances() {
        let mut batches = InstanceBatches::new(3);
        batches.fill(&transforms(10), &[]);
        assert_eq!(batches.len(), 4);
        batches.fill(&transforms(5), &[]);
        assert_eq!(batches.len(), 2);
        assert_eq!(batches.last_batch_len(), 2);
        batches.fill(&transforms(7), &[]);
        assert_eq!(batches.len(), 3);
        assert_eq!(batches.last_batch_len(), 1);
    }

    #[test]
    fn test_submit_all_batches() {
        let mut batches = InstanceBatches::new(512);
        batches.fill(&transforms(1100), &[]);
        let mut sink = Recorder::default();
        batches.submit(&mut sink).expect("submit");
        assert_eq!(sink.sizes, vec![512, 512, 76]);
    }

    #[test]
    fn test_submit_stops_on_error() {
        let mut batches = InstanceBatches::new(2);
        batches.fill(&transforms(6), &[]);
        let mut sink = Recorder {
            fail_at: Some(1),
            ..Default::default()
        };
        let err = batches.submit(&mut sink).unwrap_err();
        assert!(matches!(err, SimError::Submit { batch: 1, .. }));
        assert_eq!(sink.sizes, vec![2]);
    }
}
