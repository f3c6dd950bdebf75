//! Procedural generation for terrain: noise heightfields, height curves,
//! grid meshes and heightmap textures.

pub mod curve;
pub mod error;
pub mod grid_mesh;
pub mod heightfield;
pub mod heightmap;
pub mod noise_field;

pub use curve::*;
pub use error::*;
pub use grid_mesh::*;
pub use heightfield::*;
pub use heightmap::*;
pub use noise_field::*;
