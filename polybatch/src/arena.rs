//! Polygon collector and batch arena
//!
//! `BatchArena` owns every buffer the batcher uses plus the Idle/Collecting
//! state. While collecting, submitted polygons are deferred into the arena;
//! `flush` sorts and draws them. While idle, submissions go straight to the
//! backend. Buffers are reused frame to frame and never shrink.

use crate::backend::RenderBackend;
use crate::buffer::GrowableArray;
use crate::config::BatchConfig;
use crate::emitter::{OutputBuffers, emit_batches};
use crate::error::BatchError;
use crate::ledger::{PolygonEntry, PolygonLedger, VertexStore};
use crate::render_state::{PolyFlags, ShaderId, SurfaceInfo, TextureHandle};
use crate::shader_target::{ShaderTarget, ShaderTargetTable};
use crate::sort_key::SortKey;
use crate::stats::BatchStats;
use crate::vertex::PolyVertex;

/// Collector state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectState {
    /// Submissions draw immediately
    #[default]
    Idle,
    /// Submissions are deferred until `flush`
    Collecting,
}

/// Owned batching arena
///
/// One collect/flush cycle corresponds to one rendered view. All operations
/// take `&mut self`, so only one cycle can be in flight at a time.
#[derive(Debug)]
pub struct BatchArena {
    config: BatchConfig,
    state: CollectState,
    /// Texture for the next submitted polygon (single slot)
    pending_texture: Option<TextureHandle>,
    ledger: PolygonLedger,
    store: VertexStore,
    /// Sorted submission indices (rebuilt every flush)
    order: GrowableArray<u32>,
    output: OutputBuffers,
    last_stats: BatchStats,
}

impl BatchArena {
    /// Create an arena with buffers sized from the config
    pub fn new(config: BatchConfig) -> Self {
        Self {
            ledger: PolygonLedger::new(config.polygon_capacity),
            store: VertexStore::new(config.vertex_capacity),
            order: GrowableArray::new("polygon order", config.polygon_capacity),
            output: OutputBuffers::new(config.output_capacity),
            config,
            state: CollectState::Idle,
            pending_texture: None,
            last_stats: BatchStats::default(),
        }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Mutable settings; read on every submission and flush
    pub fn config_mut(&mut self) -> &mut BatchConfig {
        &mut self.config
    }

    pub fn state(&self) -> CollectState {
        self.state
    }

    pub fn is_collecting(&self) -> bool {
        self.state == CollectState::Collecting
    }

    /// Whether shader binds and extended surface comparison are in effect
    pub fn shading_active<B: RenderBackend + ?Sized>(&self, backend: &B) -> bool {
        self.config.shaders.is_enabled() && backend.shaders_available()
    }

    /// Start deferring submissions
    ///
    /// # Errors
    ///
    /// `BatchError::AlreadyCollecting` if a cycle is already in flight.
    pub fn begin_collecting(&mut self) -> Result<(), BatchError> {
        if self.is_collecting() {
            tracing::error!("Repeat call to begin_collecting without flush");
            return Err(BatchError::AlreadyCollecting);
        }
        self.state = CollectState::Collecting;
        Ok(())
    }

    /// Select the texture for the next polygon
    ///
    /// While collecting the choice is held for the next `submit_polygon`;
    /// otherwise it is bound on the backend right away.
    pub fn set_current_texture<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        texture: TextureHandle,
    ) {
        if self.is_collecting() {
            self.pending_texture = Some(texture);
        } else {
            backend.set_texture(texture);
        }
    }

    /// Submit a triangle-fan polygon
    ///
    /// While collecting, the surface, flags, pending texture and shader are
    /// captured by value and the vertices are copied into the arena. While
    /// idle the polygon is drawn immediately.
    ///
    /// # Errors
    ///
    /// `BatchError::MissingSurface` if collecting and `surface` is `None`.
    pub fn submit_polygon<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        surface: Option<&SurfaceInfo>,
        vertices: &[PolyVertex],
        flags: PolyFlags,
        shader: ShaderId,
        horizon_special: bool,
    ) -> Result<(), BatchError> {
        let shading_active = self.shading_active(backend);

        if !self.is_collecting() {
            if shading_active && !shader.is_none() {
                backend.set_shader(shader);
            }
            backend.draw_polygon(surface, vertices, flags);
            return Ok(());
        }

        let Some(surface) = surface else {
            tracing::error!("Got a polygon without surface info while batching");
            return Err(BatchError::MissingSurface);
        };

        let texture = self.pending_texture.take().unwrap_or(TextureHandle::NONE);
        let submission_index = self.ledger.next_index();
        let key = SortKey::for_polygon(
            submission_index,
            texture,
            flags,
            surface,
            shader,
            horizon_special,
            shading_active,
        );

        let vertex_start = self.store.append(vertices);
        self.ledger.push(PolygonEntry {
            surface: *surface,
            vertex_start,
            vertex_count: vertices.len() as u32,
            flags,
            texture,
            shader,
            horizon_special,
            key,
        });

        Ok(())
    }

    /// Submit a polygon by shader target, resolving the shader once here
    ///
    /// `None` means the polygon requests no shader.
    #[allow(clippy::too_many_arguments)]
    pub fn submit_polygon_target<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        targets: &ShaderTargetTable,
        target: Option<ShaderTarget>,
        surface: Option<&SurfaceInfo>,
        vertices: &[PolyVertex],
        flags: PolyFlags,
        horizon_special: bool,
    ) -> Result<(), BatchError> {
        let shader = match target {
            Some(target) => {
                targets.resolve(target, self.config.shaders, self.config.allow_custom_shaders)
            }
            None => ShaderId::NONE,
        };
        self.submit_polygon(backend, surface, vertices, flags, shader, horizon_special)
    }

    /// Sort and draw everything collected since `begin_collecting`
    ///
    /// Returns to idle, issues one indexed draw per run of equal state and
    /// resets the polygon and vertex buffers (capacity is kept).
    ///
    /// # Errors
    ///
    /// `BatchError::NotCollecting` if called while idle; nothing is drawn.
    pub fn flush<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
    ) -> Result<BatchStats, BatchError> {
        if !self.is_collecting() {
            tracing::error!("flush called without starting batching");
            return Err(BatchError::NotCollecting);
        }
        self.state = CollectState::Idle;
        self.pending_texture = None;

        let shading_active = self.shading_active(backend);
        let stats = emit_batches(
            backend,
            &self.ledger,
            &self.store,
            &mut self.order,
            &mut self.output,
            shading_active,
        );

        self.ledger.reset();
        self.store.reset();
        self.last_stats = stats;
        Ok(stats)
    }

    /// Begin collecting if batching is enabled
    ///
    /// Returns whether the arena is now collecting. With batching disabled
    /// every submission this frame takes the immediate path.
    pub fn start_frame(&mut self) -> Result<bool, BatchError> {
        if !self.config.batching {
            return Ok(false);
        }
        self.begin_collecting()?;
        Ok(true)
    }

    /// Flush if the frame was collecting
    pub fn end_frame<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
    ) -> Result<Option<BatchStats>, BatchError> {
        if !self.is_collecting() {
            return Ok(None);
        }
        self.flush(backend).map(Some)
    }

    /// Statistics from the most recent flush
    pub fn last_stats(&self) -> &BatchStats {
        &self.last_stats
    }

    /// Polygons collected so far this cycle, in submission order
    pub fn polygons(&self) -> &[PolygonEntry] {
        self.ledger.entries()
    }

    /// Vertices collected so far this cycle
    pub fn vertices(&self) -> &[PolyVertex] {
        self.store.as_slice()
    }

    pub fn polygon_capacity(&self) -> usize {
        self.ledger.capacity()
    }

    pub fn vertex_capacity(&self) -> usize {
        self.store.capacity()
    }

    pub fn output_capacity(&self) -> usize {
        self.output.vertex_capacity()
    }
}

impl Default for BatchArena {
    fn default() -> Self {
        Self::new(BatchConfig::default())
    }
}
