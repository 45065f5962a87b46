//! Per-flush batching statistics

use std::time::Duration;

use serde::Serialize;

/// Counters gathered while emitting one frame's batches
///
/// The change counters include the initial state bind, so a non-empty
/// flush reports at least 1 for each of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BatchStats {
    /// Polygons submitted this cycle
    pub polygons: u32,
    /// Indices emitted across all draw calls
    pub vertices: u32,
    /// Indexed draw calls issued
    pub draw_calls: u32,
    /// Distinct shader states
    pub shader_changes: u32,
    /// Distinct texture states
    pub texture_changes: u32,
    /// Distinct flag states
    pub flag_changes: u32,
    /// Distinct surface color states
    pub color_changes: u32,
    /// Time spent sorting the polygon order
    pub sort_time: Duration,
    /// Time spent building buffers and issuing draws
    pub draw_time: Duration,
}

impl BatchStats {
    /// Triangles emitted (three indices each)
    pub fn triangles(&self) -> u32 {
        self.vertices / 3
    }

    /// Average polygons merged into one draw call
    pub fn polygons_per_call(&self) -> f32 {
        if self.draw_calls == 0 {
            0.0
        } else {
            self.polygons as f32 / self.draw_calls as f32
        }
    }
}
