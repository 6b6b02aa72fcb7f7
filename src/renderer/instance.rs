//! Per-instance data for instanced draws

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

/// One instance as uploaded to the renderer: column-major world matrix and tint
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl InstanceRaw {
    pub fn new(model: Mat4, color: Vec4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color: color.to_array(),
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.model)
    }

    /// Byte stride of one instance in a vertex buffer
    pub const STRIDE: usize = std::mem::size_of::<InstanceRaw>();
}

impl Default for InstanceRaw {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Vec4::ONE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_layout() {
        assert_eq!(InstanceRaw::STRIDE, 80);
        let instances = [InstanceRaw::default(); 3];
        let bytes: &[u8] = bytemuck::cast_slice(&instances);
        assert_eq!(bytes.len(), 3 * InstanceRaw::STRIDE);
    }

    #[test]
    fn test_matrix_is_column_major() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let raw = InstanceRaw::new(m, Vec4::ONE);
        assert_eq!(raw.model[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(raw.matrix(), m);
    }
}
