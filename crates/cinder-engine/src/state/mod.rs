//! Render-state caching core.
//!
//! Responsibilities:
//! - per-draw state objects ([`RenderState`], [`ProgramState`]) holding
//!   fixed-function settings and per-instance uniform/sampler values
//! - a per-context [`GraphicsStateTracker`] mirroring what the GPU currently
//!   has, so applying a state emits only the calls that change something
//! - cached lookups ([`UniformStateIndex`], [`SamplerStateIndex`]) for per-draw
//!   updates without name searches
//! - values shared across programs through [`SharedProgramState`]
//!
//! Everything here runs on the thread owning the graphics context.

mod data;
mod id_pool;
mod index;
mod program_state;
mod render_state;
mod shared;
mod tracker;

pub use data::RenderStateData;
pub use id_pool::{StateId, StateIdPool};
pub use index::{SamplerStateIndex, UniformStateIndex};
pub use program_state::ProgramState;
pub use render_state::RenderState;
pub use shared::{SharedProgramState, SharedUniformRegistry};
pub use tracker::{GraphicsStateTracker, RenderStats, TextureUnits, TrackerConfig};
