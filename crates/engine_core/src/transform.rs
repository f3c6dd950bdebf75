//! Rigid placement of meshes and cameras in the world.

use bytemuck::{Pod, Zeroable};
use glam::{EulerRot, Mat4, Quat, Vec3};

/// A 3D transform representing position, rotation, and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Create a new transform at the given position.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a new transform with position and rotation.
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Local-to-world matrix.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// World-to-local matrix. For a camera this is the view matrix.
    pub fn world_to_local(&self) -> Mat4 {
        self.to_matrix().inverse()
    }

    /// Forward direction (negative Z in right-handed coordinates).
    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }

    /// Decompose the rotation into `(yaw, pitch, roll)` radians.
    ///
    /// Yaw turns about world Y, pitch about the yawed X axis, roll about the
    /// resulting Z axis.
    pub fn yaw_pitch_roll(&self) -> (f32, f32, f32) {
        self.rotation.to_euler(EulerRot::YXZ)
    }

    /// Same yaw and roll, pitch negated. Used to look "up" from below a
    /// mirror plane when the original looks "down" at it.
    pub fn with_pitch_negated(&self) -> Self {
        let (yaw, pitch, roll) = self.yaw_pitch_roll();
        Self {
            rotation: Quat::from_euler(EulerRot::YXZ, yaw, -pitch, roll),
            ..*self
        }
    }

    /// Rotate so that forward points at `target`. No-op if `target` coincides with the position.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let to_target = target - self.position;
        if to_target.length_squared() > 0.0001 {
            self.rotation = Quat::from_mat4(&Mat4::look_at_rh(self.position, target, up)).inverse();
        }
    }
}

/// Raw model matrix for GPU upload.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct TransformRaw {
    pub model: [[f32; 4]; 4],
}

impl From<&Transform> for TransformRaw {
    fn from(transform: &Transform) -> Self {
        Self {
            model: transform.to_matrix().to_cols_array_2d(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_to_local_inverts_placement() {
        let t = Transform::from_position_rotation(
            Vec3::new(3.0, 5.0, -2.0),
            Quat::from_euler(EulerRot::YXZ, 0.7, -0.3, 0.0),
        );
        let p = Vec3::new(1.0, 2.0, 3.0);
        let round_trip = t.world_to_local().transform_point3(t.to_matrix().transform_point3(p));
        assert!((round_trip - p).length() < 1e-4);
    }

    #[test]
    fn negated_pitch_mirrors_forward_vertically() {
        let t = Transform::from_position_rotation(
            Vec3::ZERO,
            Quat::from_euler(EulerRot::YXZ, 0.4, -0.5, 0.0),
        );
        let f = t.forward();
        let m = t.with_pitch_negated().forward();
        assert!((f.x - m.x).abs() < 1e-5);
        assert!((f.y + m.y).abs() < 1e-5);
        assert!((f.z - m.z).abs() < 1e-5);
    }

    #[test]
    fn look_at_points_forward_at_target() {
        let mut t = Transform::from_position(Vec3::new(0.0, 10.0, 10.0));
        t.look_at(Vec3::ZERO, Vec3::Y);
        let expected = (Vec3::ZERO - t.position).normalize();
        assert!((t.forward() - expected).length() < 1e-4);
    }

    #[test]
    fn raw_model_is_column_major_placement() {
        let t = Transform::from_position(Vec3::new(1.0, -5.0, 2.0));
        let raw = TransformRaw::from(&t);
        assert_eq!(raw.model[3], [1.0, -5.0, 2.0, 1.0]);
        assert_eq!(raw.model[0], [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(bytemuck::bytes_of(&raw).len(), 64);
    }
}
