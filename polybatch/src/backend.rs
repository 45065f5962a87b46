//! Rendering backend interface
//!
//! The batcher never talks to a graphics API directly. It issues texture and
//! shader binds plus two kinds of draws through this trait; the concrete
//! OpenGL/Vulkan/wgpu binding lives outside this crate.

use crate::render_state::{PolyFlags, ShaderId, SurfaceInfo, TextureHandle};
use crate::vertex::PolyVertex;

/// Trait for hardware rendering backends
pub trait RenderBackend {
    /// Bind a texture for subsequent draws (`TextureHandle::NONE` unbinds)
    fn set_texture(&mut self, texture: TextureHandle);

    /// Bind a shader program
    ///
    /// Only called while the shader feature is active.
    fn set_shader(&mut self, shader: ShaderId);

    /// Draw a single triangle-fan polygon immediately
    fn draw_polygon(&mut self, surface: Option<&SurfaceInfo>, vertices: &[PolyVertex], flags: PolyFlags);

    /// Draw an indexed triangle list (one call per batched state run)
    fn draw_indexed_triangles(
        &mut self,
        surface: &SurfaceInfo,
        vertices: &[PolyVertex],
        indices: &[u32],
        flags: PolyFlags,
    );

    /// Whether the backend supports shader programs at all
    fn shaders_available(&self) -> bool {
        // Default implementation: fixed-function only
        false
    }
}
