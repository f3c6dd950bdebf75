//! Camera frames: pose plus view and projection matrices.

use bytemuck::{Pod, Zeroable};
use engine_core::Transform;
use glam::{Mat4, Quat, Vec3};

/// Perspective lens parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lens {
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
}

impl Default for Lens {
    fn default() -> Self {
        Self {
            fov_y: 70.0_f32.to_radians(),
            near: 0.1,
            far: 1000.0,
        }
    }
}

/// A camera's pose and matrices for one frame.
///
/// Right-handed, Y up, looking down local -Z. `projection` maps view depth
/// to `[0, 1]` and may be oblique (near plane replaced by an arbitrary plane).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFrame {
    pub transform: Transform,
    /// Aspect ratio (width / height).
    pub aspect: f32,
    pub lens: Lens,
    pub world_to_camera: Mat4,
    pub projection: Mat4,
}

impl CameraFrame {
    /// Camera at `position` with `rotation` and a standard perspective projection.
    pub fn new(position: Vec3, rotation: Quat, aspect: f32, lens: Lens) -> Self {
        let transform = Transform::from_position_rotation(position, rotation);
        Self {
            transform,
            aspect,
            lens,
            world_to_camera: transform.world_to_local(),
            projection: perspective(lens, aspect),
        }
    }

    /// Camera at `position` looking at `target` with +Y up.
    pub fn looking_at(position: Vec3, target: Vec3, aspect: f32, lens: Lens) -> Self {
        let mut transform = Transform::from_position(position);
        transform.look_at(target, Vec3::Y);
        Self::new(position, transform.rotation, aspect, lens)
    }

    /// Same lens and projection, different pose.
    pub fn with_pose(&self, position: Vec3, rotation: Quat) -> Self {
        let transform = Transform::from_position_rotation(position, rotation);
        Self {
            transform,
            world_to_camera: transform.world_to_local(),
            ..*self
        }
    }

    /// Same pose, different projection.
    pub fn with_projection(&self, projection: Mat4) -> Self {
        Self { projection, ..*self }
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    pub fn rotation(&self) -> Quat {
        self.transform.rotation
    }

    pub fn forward(&self) -> Vec3 {
        self.transform.forward()
    }

    /// Update aspect ratio (call on window resize). Resets the projection to the plain perspective.
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
        self.projection = self.perspective();
    }

    /// The lens' unmodified perspective projection.
    pub fn perspective(&self) -> Mat4 {
        perspective(self.lens, self.aspect)
    }

    /// Combined view-projection matrix.
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.world_to_camera
    }
}

fn perspective(lens: Lens, aspect: f32) -> Mat4 {
    Mat4::perspective_rh(lens.fov_y, aspect, lens.near, lens.far)
}

/// Camera uniform data for GPU.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub position: [f32; 4], // w unused, padding
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            view: Mat4::IDENTITY.to_cols_array_2d(),
            proj: Mat4::IDENTITY.to_cols_array_2d(),
            position: [0.0; 4],
        }
    }

    pub fn update(&mut self, frame: &CameraFrame) {
        self.view = frame.world_to_camera.to_cols_array_2d();
        self.proj = frame.projection.to_cols_array_2d();
        self.view_proj = frame.view_projection().to_cols_array_2d();
        let pos = frame.position();
        self.position = [pos.x, pos.y, pos.z, 1.0];
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&CameraFrame> for CameraUniform {
    fn from(frame: &CameraFrame) -> Self {
        let mut uniform = Self::new();
        uniform.update(frame);
        uniform
    }
}
