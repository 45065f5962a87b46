//! Render state carried by each submitted polygon
//!
//! Defines texture and shader handles, polygon flags, and the surface
//! color/light descriptor. The batcher treats all of it as opaque data that
//! is only compared and hashed.

use bitflags::bitflags;

/// Handle to a texture already uploaded by the texture cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TextureHandle(pub u32);

impl TextureHandle {
    /// "No texture" (equal to the zero handle)
    pub const NONE: TextureHandle = TextureHandle(0);

    #[inline]
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

/// Resolved shader program selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShaderId(pub i32);

impl ShaderId {
    /// No shader requested for this polygon
    pub const NONE: ShaderId = ShaderId(-1);

    #[inline]
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

impl Default for ShaderId {
    fn default() -> Self {
        Self::NONE
    }
}

bitflags! {
    /// Per-polygon blend and raster flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PolyFlags: u32 {
        /// Alpha-tested (cutout)
        const MASKED = 0x0000_0001;
        /// Alpha blended
        const TRANSLUCENT = 0x0000_0002;
        /// Additive blending
        const ADDITIVE = 0x0000_0004;
        /// Environment mapped
        const ENVIRONMENT = 0x0000_0008;
        /// Subtractive blending
        const SUBTRACTIVE = 0x0000_0010;
        /// Fog volume
        const FOG = 0x0000_0020;
        /// Disable the alpha test
        const NO_ALPHA_TEST = 0x0000_0040;
        /// Writes depth only
        const OCCLUDE = 0x0000_0100;
        /// Skip the depth test
        const NO_DEPTH_TEST = 0x0000_0200;
        /// Not drawn to the color buffer
        const INVISIBLE = 0x0000_0400;
        /// Depth offset for decals
        const DECAL = 0x0000_0800;
        /// Vertex color modulates the texture
        const MODULATED = 0x0000_1000;
        /// Untextured polygon
        const NO_TEXTURE = 0x0000_2000;
        /// Corona sprite
        const CORONA = 0x0000_4000;
        /// Water ripple
        const RIPPLE = 0x0000_8000;
        /// Clamp texture V
        const REMOVE_Y_WRAP = 0x0001_0000;
        /// Force texture U wrapping
        const FORCE_WRAP_X = 0x0002_0000;
        /// Force texture V wrapping
        const FORCE_WRAP_Y = 0x0004_0000;
        /// Clip against the near plane
        const CLIP = 0x0008_0000;
        /// Disable near clipping
        const NO_Z_CLIP = 0x0010_0000;

        /// All blend mode bits
        const BLENDING = Self::MASKED.bits()
            | Self::TRANSLUCENT.bits()
            | Self::ADDITIVE.bits()
            | Self::ENVIRONMENT.bits()
            | Self::SUBTRACTIVE.bits()
            | Self::FOG.bits()
            | Self::NO_ALPHA_TEST.bits();
    }
}

impl PolyFlags {
    /// True if the polygon draws without a texture
    #[inline]
    pub fn is_untextured(self) -> bool {
        self.contains(PolyFlags::NO_TEXTURE)
    }
}

/// Packed 8-bit RGBA color (red in the lowest byte)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba(pub u32);

impl Rgba {
    pub const WHITE: Rgba = Rgba(0xFFFF_FFFF);
    pub const TRANSPARENT: Rgba = Rgba(0);

    pub const fn new(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Rgba(u32::from_le_bytes([red, green, blue, alpha]))
    }

    pub const fn red(self) -> u8 {
        self.0.to_le_bytes()[0]
    }

    pub const fn green(self) -> u8 {
        self.0.to_le_bytes()[1]
    }

    pub const fn blue(self) -> u8 {
        self.0.to_le_bytes()[2]
    }

    pub const fn alpha(self) -> u8 {
        self.0.to_le_bytes()[3]
    }
}

/// Sector light parameters consumed by the lighting shaders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LightInfo {
    /// Light level (0-255)
    pub light_level: i32,
    /// Distance at which fading begins
    pub fade_start: i32,
    /// Distance at which fading is complete
    pub fade_end: i32,
}

/// Surface color and light descriptor for one polygon
///
/// Only `poly_color` matters when the shader feature is inactive; with
/// shaders active the tint, fade and light fields are compared and hashed too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SurfaceInfo {
    /// Base (vertex) color
    pub poly_color: Rgba,
    /// Colormap tint
    pub tint_color: Rgba,
    /// Colormap fade color
    pub fade_color: Rgba,
    /// Light level and fade range
    pub light: LightInfo,
}

impl SurfaceInfo {
    /// Surface with only a base color set
    pub fn with_color(poly_color: Rgba) -> Self {
        Self {
            poly_color,
            ..Default::default()
        }
    }

    /// Compare two surfaces the way the backend observes them
    ///
    /// With shading inactive only the base color is uniform state; with it
    /// active the tint, fade and light parameters are uniforms as well.
    pub fn differs_from(&self, other: &SurfaceInfo, shading_active: bool) -> bool {
        if shading_active {
            self.poly_color != other.poly_color
                || self.tint_color != other.tint_color
                || self.fade_color != other.fade_color
                || self.light.light_level != other.light.light_level
                || self.light.fade_start != other.light.fade_start
                || self.light.fade_end != other.light.fade_end
        } else {
            self.poly_color != other.poly_color
        }
    }
}
