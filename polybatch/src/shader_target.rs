//! Shader target resolution
//!
//! Scene code asks for a shader by *target* (what kind of surface is being
//! drawn). Each target has a built-in base shader and may have a custom
//! replacement loaded from an add-on. Resolution to a concrete `ShaderId`
//! happens once, at submission; the batcher only ever sees the result.

use crate::config::ShaderMode;
use crate::render_state::ShaderId;

/// Kind of surface a shader is selected for
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderTarget {
    Floor = 0,
    Wall = 1,
    Sprite = 2,
    Model = 3,
    Water = 4,
    Fog = 5,
    Sky = 6,
    PalettePostprocess = 7,
}

impl ShaderTarget {
    /// Number of shader targets
    pub const COUNT: usize = 8;

    pub const ALL: [ShaderTarget; Self::COUNT] = [
        ShaderTarget::Floor,
        ShaderTarget::Wall,
        ShaderTarget::Sprite,
        ShaderTarget::Model,
        ShaderTarget::Water,
        ShaderTarget::Fog,
        ShaderTarget::Sky,
        ShaderTarget::PalettePostprocess,
    ];

    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Custom shader registered for a target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CustomShader {
    id: ShaderId,
    compiled: bool,
}

#[derive(Debug, Clone, Copy)]
struct TargetSlot {
    base: ShaderId,
    custom: Option<CustomShader>,
}

/// Target → shader program mapping
///
/// Shader programs are laid out as `COUNT` base shaders followed by `COUNT`
/// custom slots, so target `t` uses program `t` or program `COUNT + t`.
#[derive(Debug, Clone)]
pub struct ShaderTargetTable {
    slots: [TargetSlot; ShaderTarget::COUNT],
}

impl ShaderTargetTable {
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|i| TargetSlot {
                base: ShaderId(i as i32),
                custom: None,
            }),
        }
    }

    /// Record a custom shader for a target and whether it compiled
    pub fn set_custom(&mut self, target: ShaderTarget, compiled: bool) {
        let id = ShaderId((ShaderTarget::COUNT + target.index()) as i32);
        self.slots[target.index()].custom = Some(CustomShader { id, compiled });
        if !compiled {
            tracing::warn!("Custom {:?} shader failed to compile, using base shader", target);
        }
    }

    /// Forget a target's custom shader (e.g. add-on unloaded)
    pub fn clear_custom(&mut self, target: ShaderTarget) {
        self.slots[target.index()].custom = None;
    }

    /// Forget all custom shaders
    pub fn clear_all_custom(&mut self) {
        for slot in &mut self.slots {
            slot.custom = None;
        }
    }

    pub fn base_shader(&self, target: ShaderTarget) -> ShaderId {
        self.slots[target.index()].base
    }

    /// Resolve a target to the shader that should be bound
    ///
    /// The custom shader wins only if it exists, compiled, the shader mode
    /// uses custom shaders and the session allows them.
    pub fn resolve(&self, target: ShaderTarget, mode: ShaderMode, allow_custom: bool) -> ShaderId {
        let slot = &self.slots[target.index()];
        match slot.custom {
            Some(custom) if custom.compiled && mode.uses_custom() && allow_custom => custom.id,
            _ => slot.base,
        }
    }
}

impl Default for ShaderTargetTable {
    fn default() -> Self {
        Self::new()
    }
}
