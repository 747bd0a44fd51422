//! Cinder engine crate.
//!
//! This crate owns the render-state caching core: state objects that describe
//! a draw, and the tracker that turns them into the minimal set of graphics
//! API calls.
//!
//! Layout:
//! - `gl`: the graphics API seam, a glow backend and a recording backend
//! - `program`: linked program, uniform, sampler and texture descriptors
//! - `state`: render/program states, the state tracker and shared values
//! - `render`: translation of render states into wgpu pipeline state
//! - `logging`: logger setup

pub mod gl;
pub mod logging;
pub mod program;
pub mod render;
pub mod state;
