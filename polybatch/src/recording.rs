//! Call-recording backend
//!
//! Implements `RenderBackend` by logging every call with copies of the data
//! passed to it. Useful for capturing a frame's batch output for inspection
//! and for tests.

use crate::backend::RenderBackend;
use crate::render_state::{PolyFlags, ShaderId, SurfaceInfo, TextureHandle};
use crate::vertex::PolyVertex;

/// One recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    SetTexture(TextureHandle),
    SetShader(ShaderId),
    /// Immediate (unbatched) polygon
    DrawPolygon {
        surface: Option<SurfaceInfo>,
        vertices: Vec<PolyVertex>,
        flags: PolyFlags,
    },
    /// Batched indexed triangle list
    DrawIndexedTriangles {
        surface: SurfaceInfo,
        vertices: Vec<PolyVertex>,
        indices: Vec<u32>,
        flags: PolyFlags,
    },
}

impl BackendCall {
    /// True for either kind of draw
    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            BackendCall::DrawPolygon { .. } | BackendCall::DrawIndexedTriangles { .. }
        )
    }

    /// Triangles rasterized by this call (0 for binds)
    pub fn triangle_count(&self) -> usize {
        match self {
            BackendCall::DrawPolygon { vertices, .. } => vertices.len().saturating_sub(2),
            BackendCall::DrawIndexedTriangles { indices, .. } => indices.len() / 3,
            _ => 0,
        }
    }
}

/// Backend that records calls instead of drawing
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Vec<BackendCall>,
    shaders_available: bool,
}

impl RecordingBackend {
    /// Recorder reporting no shader support
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorder reporting shader support
    pub fn with_shaders() -> Self {
        Self {
            calls: Vec::new(),
            shaders_available: true,
        }
    }

    pub fn set_shaders_available(&mut self, available: bool) {
        self.shaders_available = available;
    }

    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Take the recorded calls, leaving the log empty
    pub fn take_calls(&mut self) -> Vec<BackendCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    /// Recorded draws of either kind, in issue order
    pub fn draws(&self) -> impl Iterator<Item = &BackendCall> {
        self.calls.iter().filter(|call| call.is_draw())
    }

    pub fn draw_count(&self) -> usize {
        self.draws().count()
    }

    /// Total triangles across all recorded draws
    pub fn triangle_count(&self) -> usize {
        self.calls.iter().map(BackendCall::triangle_count).sum()
    }

    /// Textures bound, in order
    pub fn texture_binds(&self) -> Vec<TextureHandle> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                BackendCall::SetTexture(texture) => Some(*texture),
                _ => None,
            })
            .collect()
    }

    /// Shaders bound, in order
    pub fn shader_binds(&self) -> Vec<ShaderId> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                BackendCall::SetShader(shader) => Some(*shader),
                _ => None,
            })
            .collect()
    }
}

impl RenderBackend for RecordingBackend {
    fn set_texture(&mut self, texture: TextureHandle) {
        self.calls.push(BackendCall::SetTexture(texture));
    }

    fn set_shader(&mut self, shader: ShaderId) {
        self.calls.push(BackendCall::SetShader(shader));
    }

    fn draw_polygon(&mut self, surface: Option<&SurfaceInfo>, vertices: &[PolyVertex], flags: PolyFlags) {
        self.calls.push(BackendCall::DrawPolygon {
            surface: surface.copied(),
            vertices: vertices.to_vec(),
            flags,
        });
    }

    fn draw_indexed_triangles(
        &mut self,
        surface: &SurfaceInfo,
        vertices: &[PolyVertex],
        indices: &[u32],
        flags: PolyFlags,
    ) {
        self.calls.push(BackendCall::DrawIndexedTriangles {
            surface: *surface,
            vertices: vertices.to_vec(),
            indices: indices.to_vec(),
            flags,
        });
    }

    fn shaders_available(&self) -> bool {
        self.shaders_available
    }
}
