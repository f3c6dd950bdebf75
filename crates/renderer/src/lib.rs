//! Camera math for planar water and the renderer boundary (wgpu).

pub mod camera;
pub mod gpu;
pub mod mesh;
pub mod reflection;
pub mod sink;
pub mod vertex;

pub use camera::*;
pub use gpu::*;
pub use mesh::*;
pub use reflection::*;
pub use sink::*;
pub use vertex::*;
