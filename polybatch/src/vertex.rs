//! Polygon vertex format

use bytemuck::{Pod, Zeroable};

/// Transformed polygon vertex as produced by the scene walk
///
/// Copied byte-for-byte into the vertex store and from there into the
/// batched output buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct PolyVertex {
    /// Position (x, y, z)
    pub position: [f32; 3],
    /// Texture coordinates (s, t)
    pub tex_coord: [f32; 2],
}

impl PolyVertex {
    /// Size in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    pub const fn new(x: f32, y: f32, z: f32, s: f32, t: f32) -> Self {
        Self {
            position: [x, y, z],
            tex_coord: [s, t],
        }
    }
}
