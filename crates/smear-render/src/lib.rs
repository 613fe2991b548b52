//! # smear-render
//!
//! The Smear compositing engine. Keeps a ring of history surfaces and
//! composites the most recent ones back-to-front with fading opacity,
//! producing a motion trail. Surfaces come from a [`Backend`]; a CPU
//! software backend is included.

pub mod backend;
pub mod compositor;
pub mod cpu;
pub mod export;
pub mod ring;

pub use backend::{Backend, RenderTarget, Surface, TexturedQuad};
pub use compositor::{LayerDraw, TrailCompositor};
pub use cpu::{CpuBackend, CpuSurface};
pub use ring::LayerRing;
