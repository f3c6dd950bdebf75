//! Oriented planes (the water surface).

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// A world-space plane given by a point on it and its unit normal.
///
/// Points with positive [`signed_distance`](Self::signed_distance) are on the
/// side the normal points to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipPlane {
    pub position: Vec3,
    pub normal: Vec3,
}

impl Default for ClipPlane {
    fn default() -> Self {
        Self::horizontal(0.0)
    }
}

impl ClipPlane {
    /// Build a plane. The normal is normalized; a zero normal falls back to +Y.
    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position,
            normal: normal.try_normalize().unwrap_or(Vec3::Y),
        }
    }

    /// Upward-facing plane at world height `y`.
    pub fn horizontal(y: f32) -> Self {
        Self {
            position: Vec3::new(0.0, y, 0.0),
            normal: Vec3::Y,
        }
    }

    /// Height of the plane's reference point.
    pub fn height(&self) -> f32 {
        self.position.y
    }

    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point - self.position)
    }

    /// Plane equation `(a, b, c, d)` with `a*x + b*y + c*z + d = 0`.
    pub fn to_vec4(&self) -> Vec4 {
        self.normal.extend(-self.normal.dot(self.position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_equation_vanishes_on_plane() {
        let plane = ClipPlane::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.3, 1.0, -0.2));
        let eq = plane.to_vec4();
        let on_plane = plane.position + plane.normal.any_orthonormal_vector() * 4.0;
        assert!(eq.dot(on_plane.extend(1.0)).abs() < 1e-5);
        assert!((plane.normal.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn signed_distance_follows_normal() {
        let plane = ClipPlane::horizontal(2.0);
        assert_eq!(plane.signed_distance(Vec3::new(5.0, 7.0, -1.0)), 5.0);
        assert_eq!(plane.signed_distance(Vec3::new(0.0, -1.0, 0.0)), -3.0);
    }
}
