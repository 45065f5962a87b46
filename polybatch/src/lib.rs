//! Deferred polygon batching
//!
//! Collects the triangle-fan polygons of one rendered view, sorts them by a
//! render-state key and replays them as indexed triangle lists, one draw
//! per run of identical state.
//!
//! # Architecture
//!
//! **BatchArena** (collection) → **emit_batches** (sort + run detection) → **RenderBackend**
//!
//! - Scene code selects a texture and submits polygons to the arena
//! - Each submission is copied into the polygon ledger and vertex store
//! - `flush` sorts by `SortKey`, merges runs into the output buffers and
//!   issues binds and indexed draws on the backend
//! - All buffers live in the arena and are reused across frames

mod arena;
mod backend;
mod buffer;
mod config;
mod emitter;
mod error;
mod ledger;
mod recording;
mod render_state;
mod shader_target;
mod sort_key;
mod stats;
mod vertex;

pub use arena::{BatchArena, CollectState};
pub use backend::RenderBackend;
pub use buffer::{DEFAULT_CAPACITY, GrowableArray};
pub use config::{BatchConfig, ShaderMode};
pub use emitter::{OutputBuffers, emit_batches, sort_polygons};
pub use error::{BatchError, ConfigError};
pub use ledger::{PolygonEntry, PolygonLedger, VertexStore};
pub use recording::{BackendCall, RecordingBackend};
pub use render_state::{LightInfo, PolyFlags, Rgba, ShaderId, SurfaceInfo, TextureHandle};
pub use shader_target::{ShaderTarget, ShaderTargetTable};
pub use sort_key::{FNV_OFFSET_BASIS, FNV_PRIME, Fnv1a, SortKey};
pub use stats::BatchStats;
pub use vertex::PolyVertex;
