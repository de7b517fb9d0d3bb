//! Core abstractions for glasspane.
//!
//! This crate provides the CPU-side half of the planar-reflection renderer:
//! - [`math`] — checked matrix inversion, plane reflection, and the Fresnel
//!   and glass-alpha formulas the composite shader implements
//! - [`Camera`] and its per-frame [`MirroredCamera`] derivation
//! - [`GlassPlane`] — the single plane equation driving both the clip test
//!   and the mirror transform
//! - [`FrameContext`] — the explicit per-frame input handed to both passes

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]

pub mod camera;
pub mod error;
pub mod math;
pub mod plane;
pub mod scene;

pub use camera::{Camera, MirroredCamera, WORLD_UP};
pub use error::{GlasspaneError, Result};
pub use plane::GlassPlane;
pub use scene::{Drawable, FrameContext, Mesh, Surface};

// Re-export glam types for convenience
pub use glam::{Mat4, Vec2, Vec3, Vec4};
