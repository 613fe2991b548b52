//! # smear-core
//!
//! Core types and primitives for the Smear trail compositor.
//! This crate contains foundational types shared across all Smear crates:
//! pixel buffers, colors, surface extents, fade curves, configuration and
//! error types.

pub mod color;
pub mod config;
pub mod error;
pub mod frame;
pub mod hash;
pub mod types;

pub use config::TrailConfig;

pub use color::Color;
pub use error::{SmearError, SmearResult};
pub use frame::FrameBuffer;
pub use types::{AlphaScalingMode, Extent, SurfaceOptions};
