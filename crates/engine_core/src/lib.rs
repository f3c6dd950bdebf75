//! Core spatial types shared by the terrain and water crates.
//!
//! This crate provides the foundational types used across all systems:
//! - Transform for placing meshes and cameras
//! - Clip planes describing the water surface

pub mod plane;
pub mod transform;

pub use plane::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{EulerRot, Mat4, Quat, Vec2, Vec3, Vec4};
