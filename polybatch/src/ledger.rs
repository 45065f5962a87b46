//! Deferred polygon storage
//!
//! The vertex store holds every submitted vertex in submission order; the
//! polygon ledger holds one entry per submitted polygon pointing into it.
//! Both are append-only during a collect cycle and are reset (not freed)
//! when the batches are flushed.

use std::ops::Range;

use crate::buffer::GrowableArray;
use crate::render_state::{PolyFlags, ShaderId, SurfaceInfo, TextureHandle};
use crate::sort_key::SortKey;
use crate::vertex::PolyVertex;

/// One deferred polygon
///
/// Captures the full render state by value at submission time, so the
/// caller is free to reuse its own surface descriptor right after.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygonEntry {
    /// Surface color/light snapshot
    pub surface: SurfaceInfo,
    /// First vertex in the vertex store
    pub vertex_start: u32,
    /// Number of fan vertices
    pub vertex_count: u32,
    /// Blend and raster flags
    pub flags: PolyFlags,
    /// Texture selected for this polygon (may be stale if untextured)
    pub texture: TextureHandle,
    /// Resolved shader selector
    pub shader: ShaderId,
    /// Skybox / horizon geometry that must keep submission order
    pub horizon_special: bool,
    /// Precomputed sort key
    pub key: SortKey,
}

impl PolygonEntry {
    /// Texture the backend actually needs bound for this polygon
    ///
    /// Untextured polygons bind nothing regardless of the stored handle.
    #[inline]
    pub fn effective_texture(&self) -> TextureHandle {
        if self.flags.is_untextured() {
            TextureHandle::NONE
        } else {
            self.texture
        }
    }

    /// Range of this polygon's vertices in the vertex store
    #[inline]
    pub fn vertex_range(&self) -> Range<usize> {
        let start = self.vertex_start as usize;
        start..start + self.vertex_count as usize
    }

    /// Number of triangles the fan expands to
    #[inline]
    pub fn triangle_count(&self) -> u32 {
        self.vertex_count.saturating_sub(2)
    }
}

/// Flat store of unsorted polygon vertices
#[derive(Debug)]
pub struct VertexStore {
    vertices: GrowableArray<PolyVertex>,
}

impl VertexStore {
    pub fn new(initial_capacity: usize) -> Self {
        Self {
            vertices: GrowableArray::new("unsorted vertices", initial_capacity),
        }
    }

    /// Current write offset (where the next polygon's vertices will land)
    pub fn write_offset(&self) -> u32 {
        self.vertices.len() as u32
    }

    /// Copy a polygon's vertices in, doubling capacity as often as needed.
    /// Returns the offset they were written at.
    pub fn append(&mut self, vertices: &[PolyVertex]) -> u32 {
        self.vertices.extend_from_slice(vertices) as u32
    }

    /// Vertices belonging to a ledger entry
    pub fn polygon_vertices(&self, entry: &PolygonEntry) -> &[PolyVertex] {
        &self.vertices.as_slice()[entry.vertex_range()]
    }

    pub fn as_slice(&self) -> &[PolyVertex] {
        self.vertices.as_slice()
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.vertices.capacity()
    }

    /// Reset for the next frame (capacity is retained)
    pub fn reset(&mut self) {
        self.vertices.reset();
    }
}

/// One entry per submitted polygon, in submission order
#[derive(Debug)]
pub struct PolygonLedger {
    entries: GrowableArray<PolygonEntry>,
}

impl PolygonLedger {
    pub fn new(initial_capacity: usize) -> Self {
        Self {
            entries: GrowableArray::new("polygons", initial_capacity),
        }
    }

    /// Submission index the next pushed polygon will get
    pub fn next_index(&self) -> u32 {
        self.entries.len() as u32
    }

    /// Record a polygon, doubling capacity if the ledger is full
    pub fn push(&mut self, entry: PolygonEntry) -> u32 {
        self.entries.push(entry) as u32
    }

    pub fn get(&self, index: u32) -> Option<&PolygonEntry> {
        self.entries.get(index as usize)
    }

    pub fn entries(&self) -> &[PolygonEntry] {
        self.entries.as_slice()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// Reset for the next frame (capacity is retained)
    pub fn reset(&mut self) {
        self.entries.reset();
    }
}
