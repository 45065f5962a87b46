//! Batch emission
//!
//! Sorts the deferred polygons by key, rebuilds every run of equal render
//! state as one indexed triangle list, and issues a single backend draw per
//! run. Only shader and texture changes are backend binds; flags and the
//! surface descriptor travel with each draw call.

use std::time::Instant;

use crate::backend::RenderBackend;
use crate::buffer::GrowableArray;
use crate::ledger::{PolygonEntry, PolygonLedger, VertexStore};
use crate::render_state::{PolyFlags, ShaderId, SurfaceInfo, TextureHandle};
use crate::stats::BatchStats;
use crate::vertex::PolyVertex;

/// Index buffer capacity per output vertex
///
/// A fan of N vertices yields N - 2 triangles, so three indices per vertex
/// always suffices.
const INDICES_PER_VERTEX: usize = 3;

/// Combined vertex/index buffers for the state run being built
#[derive(Debug)]
pub struct OutputBuffers {
    vertices: GrowableArray<PolyVertex>,
    indices: GrowableArray<u32>,
}

impl OutputBuffers {
    pub fn new(vertex_capacity: usize) -> Self {
        let vertices = GrowableArray::new("final vertices", vertex_capacity);
        let indices = GrowableArray::new("final indices", vertices.capacity() * INDICES_PER_VERTEX);
        Self { vertices, indices }
    }

    /// Append a triangle fan as an explicit triangle list
    ///
    /// The fan's vertices are copied so indices never reference another
    /// polygon's vertices. Emits `(base, base + i - 1, base + i)` for
    /// `i = 2..n`.
    pub fn write_fan(&mut self, fan: &[PolyVertex]) {
        if self.vertices.ensure_capacity(fan.len()) {
            self.indices
                .grow_to(self.vertices.capacity() * INDICES_PER_VERTEX);
        }

        let first = self.vertices.extend_from_slice(fan) as u32;
        for i in 2..fan.len() as u32 {
            self.indices.push(first);
            self.indices.push(first + i - 1);
            self.indices.push(first + i);
        }
    }

    pub fn vertices(&self) -> &[PolyVertex] {
        self.vertices.as_slice()
    }

    pub fn indices(&self) -> &[u32] {
        self.indices.as_slice()
    }

    pub fn vertex_capacity(&self) -> usize {
        self.vertices.capacity()
    }

    pub fn index_capacity(&self) -> usize {
        self.indices.capacity()
    }

    /// Reset write positions (capacity is retained)
    pub fn reset(&mut self) {
        self.vertices.reset();
        self.indices.reset();
    }
}

/// Backend-relevant state of a run
#[derive(Debug, Clone, Copy, PartialEq)]
struct RunState {
    shader: ShaderId,
    texture: TextureHandle,
    flags: PolyFlags,
    surface: SurfaceInfo,
}

impl RunState {
    fn of(entry: &PolygonEntry) -> Self {
        Self {
            shader: entry.shader,
            texture: entry.effective_texture(),
            flags: entry.flags,
            surface: entry.surface,
        }
    }
}

/// Which parts of the state differ between two consecutive polygons
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct StateChange {
    shader: bool,
    texture: bool,
    flags: bool,
    surface: bool,
}

impl StateChange {
    fn between(current: &RunState, next: &RunState, shading_active: bool) -> Self {
        Self {
            shader: shading_active && current.shader != next.shader,
            texture: current.texture != next.texture,
            flags: current.flags != next.flags,
            surface: current.surface.differs_from(&next.surface, shading_active),
        }
    }

    fn any(&self) -> bool {
        self.shader || self.texture || self.flags || self.surface
    }
}

/// Fill `order` with the ledger's submission indices sorted by key
///
/// The sort is stable: polygons with equal keys keep submission order.
pub fn sort_polygons(order: &mut GrowableArray<u32>, ledger: &PolygonLedger) {
    order.reset();
    order.extend_exact(0..ledger.len() as u32);

    let entries = ledger.entries();
    order
        .as_mut_slice()
        .sort_by_key(|&index| entries[index as usize].key);
}

/// Sort and draw every polygon in the ledger
///
/// Returns the statistics for this flush. Does not touch the backend when
/// the ledger is empty. Leaves `output` reset; the ledger and vertex store
/// are left for the caller to reset.
pub fn emit_batches<B: RenderBackend + ?Sized>(
    backend: &mut B,
    ledger: &PolygonLedger,
    store: &VertexStore,
    order: &mut GrowableArray<u32>,
    output: &mut OutputBuffers,
    shading_active: bool,
) -> BatchStats {
    let mut stats = BatchStats::default();
    if ledger.is_empty() {
        return stats;
    }
    stats.polygons = ledger.len() as u32;

    let sort_start = Instant::now();
    sort_polygons(order, ledger);
    stats.sort_time = sort_start.elapsed();

    let draw_start = Instant::now();
    let entries = ledger.entries();
    let sorted = order.as_slice();

    // State for the first batch
    let mut current = RunState::of(&entries[sorted[0] as usize]);
    if shading_active {
        backend.set_shader(current.shader);
    }
    if !current.flags.is_untextured() {
        backend.set_texture(current.texture);
    }
    stats.shader_changes = 1;
    stats.texture_changes = 1;
    stats.flag_changes = 1;
    stats.color_changes = 1;

    output.reset();
    for (position, &index) in sorted.iter().enumerate() {
        let entry = &entries[index as usize];
        output.write_fan(store.polygon_vertices(entry));

        let next = sorted
            .get(position + 1)
            .map(|&next_index| RunState::of(&entries[next_index as usize]));
        let change = next
            .as_ref()
            .map(|next| StateChange::between(&current, next, shading_active))
            .unwrap_or_default();

        if next.is_some() && !change.any() {
            // Same state, keep accumulating
            continue;
        }

        backend.draw_indexed_triangles(
            &current.surface,
            output.vertices(),
            output.indices(),
            current.flags,
        );
        stats.draw_calls += 1;
        stats.vertices += output.indices().len() as u32;
        output.reset();

        let Some(next) = next else {
            break;
        };

        if change.shader {
            backend.set_shader(next.shader);
            stats.shader_changes += 1;
        }
        if change.texture {
            // Texture was uploaded when it was selected during collection
            backend.set_texture(next.texture);
            stats.texture_changes += 1;
        }
        if change.flags {
            stats.flag_changes += 1;
        }
        if change.surface {
            stats.color_changes += 1;
        }
        current = next;
    }
    stats.draw_time = draw_start.elapsed();

    tracing::trace!(
        "Flushed {} polygons in {} draw calls ({} shader, {} texture, {} flag, {} color changes)",
        stats.polygons,
        stats.draw_calls,
        stats.shader_changes,
        stats.texture_changes,
        stats.flag_changes,
        stats.color_changes
    );

    stats
}
