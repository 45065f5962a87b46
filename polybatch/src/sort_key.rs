//! Sort keys for batching polygons by render state
//!
//! Every polygon gets a single signed 32-bit key. Textured polygons hash
//! their render state with FNV-1a and clear the sign bit, so equal states
//! collide into adjacent positions after sorting. Untextured and horizon
//! polygons instead use the negated submission index: they sort ahead of
//! every hashed polygon and keep the order they were submitted in.

use crate::render_state::{PolyFlags, ShaderId, SurfaceInfo, TextureHandle};

/// FNV-1a 32-bit offset basis
pub const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;

/// FNV-1a 32-bit prime
pub const FNV_PRIME: u32 = 0x0100_0193;

/// Streaming FNV-1a over whole 32-bit words
#[derive(Debug, Clone, Copy)]
pub struct Fnv1a(u32);

impl Fnv1a {
    pub fn new() -> Self {
        Self(FNV_OFFSET_BASIS)
    }

    #[inline]
    pub fn digest(&mut self, word: u32) {
        self.0 ^= word;
        self.0 = self.0.wrapping_mul(FNV_PRIME);
    }

    pub fn finish(self) -> u32 {
        self.0
    }
}

impl Default for Fnv1a {
    fn default() -> Self {
        Self::new()
    }
}

/// Polygon sort key (ascending order is draw order)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SortKey(pub i32);

impl SortKey {
    /// Key for polygons that keep submission order (untextured or horizon)
    ///
    /// Always negative and ascending with the submission index.
    pub fn ordered(submission_index: u32) -> Self {
        let index = i32::try_from(submission_index).unwrap_or(i32::MAX);
        SortKey(i32::MIN + index)
    }

    /// Key derived from a textured polygon's render state
    ///
    /// The shader and the tint/fade/light parameters only take part when
    /// shading is active; otherwise they are not backend state.
    pub fn hashed(
        texture: TextureHandle,
        flags: PolyFlags,
        surface: &SurfaceInfo,
        shader: ShaderId,
        shading_active: bool,
    ) -> Self {
        let mut hash = Fnv1a::new();
        hash.digest(texture.0);
        hash.digest(flags.bits());
        hash.digest(surface.poly_color.0);
        if shading_active {
            hash.digest(shader.0 as u32);
            hash.digest(surface.tint_color.0);
            hash.digest(surface.fade_color.0);
            hash.digest(surface.light.light_level as u32);
            hash.digest(surface.light.fade_start as u32);
            hash.digest(surface.light.fade_end as u32);
        }

        // Clear the sign bit so skybox and horizon keys always come first
        SortKey((hash.finish() & i32::MAX as u32) as i32)
    }

    /// Key for a submitted polygon
    pub fn for_polygon(
        submission_index: u32,
        texture: TextureHandle,
        flags: PolyFlags,
        surface: &SurfaceInfo,
        shader: ShaderId,
        horizon_special: bool,
        shading_active: bool,
    ) -> Self {
        if flags.is_untextured() || horizon_special {
            Self::ordered(submission_index)
        } else {
            Self::hashed(texture, flags, surface, shader, shading_active)
        }
    }
}
