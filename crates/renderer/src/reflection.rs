//! Planar water reflection/refraction cameras.
//!
//! Every frame the main camera and the water plane yield two auxiliary
//! cameras: a mirrored one that renders what the surface reflects and an
//! unmoved one that renders what lies beneath it. Both get an oblique
//! projection whose near plane is the water surface, so geometry on the wrong
//! side of the water never reaches their render targets.

use engine_core::ClipPlane;
use glam::{Mat4, Vec4};

use crate::camera::CameraFrame;

/// Lift of the clip plane along its normal, keeps the shoreline from clipping itself.
pub const CLIP_PLANE_OFFSET: f32 = 0.07;

/// Default edge length of the reflection/refraction targets in pixels.
pub const DEFAULT_TARGET_RESOLUTION: u32 = 256;

/// The two offscreen views rendered for the water surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaterView {
    Reflection,
    Refraction,
}

impl WaterView {
    pub const ALL: [WaterView; 2] = [WaterView::Reflection, WaterView::Refraction];

    /// Logical texture name the water shader samples.
    pub fn name(self) -> &'static str {
        match self {
            WaterView::Reflection => "reflection",
            WaterView::Refraction => "refraction",
        }
    }

    /// Which side of the plane survives clipping: above (+1) or below (-1).
    fn side_sign(self) -> f32 {
        match self {
            WaterView::Reflection => 1.0,
            WaterView::Refraction => -1.0,
        }
    }
}

/// Size of one offscreen render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTargetDesc {
    pub view: WaterView,
    pub width: u32,
    pub height: u32,
}

impl RenderTargetDesc {
    /// `resolution` pixels wide, height following the camera aspect.
    pub fn for_aspect(view: WaterView, resolution: u32, aspect: f32) -> Self {
        let width = resolution.max(1);
        let height = if aspect > 0.0 {
            (width as f32 / aspect).floor().max(1.0) as u32
        } else {
            width
        };
        Self {
            view,
            width,
            height,
        }
    }

    /// Shrink uniformly so neither side exceeds `max_dimension`.
    pub fn clamped(self, max_dimension: u32) -> Self {
        let max_dimension = max_dimension.max(1);
        let longest = self.width.max(self.height);
        if longest <= max_dimension {
            return self;
        }
        let shrink = |side: u32| ((side as u64 * max_dimension as u64) / longest as u64).max(1) as u32;
        Self {
            width: shrink(self.width),
            height: shrink(self.height),
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReflectionConfig {
    /// Width of both targets in pixels.
    pub resolution: u32,
    /// See [`CLIP_PLANE_OFFSET`].
    pub clip_offset: f32,
}

impl Default for ReflectionConfig {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_TARGET_RESOLUTION,
            clip_offset: CLIP_PLANE_OFFSET,
        }
    }
}

/// Output of one [`PlanarReflectionRig::update`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReflectionRigState {
    pub reflection: CameraFrame,
    pub refraction: CameraFrame,
    /// Indexed like [`WaterView::ALL`].
    pub targets: [RenderTargetDesc; 2],
}

impl ReflectionRigState {
    pub fn frame(&self, view: WaterView) -> &CameraFrame {
        match view {
            WaterView::Reflection => &self.reflection,
            WaterView::Refraction => &self.refraction,
        }
    }

    pub fn target(&self, view: WaterView) -> RenderTargetDesc {
        match view {
            WaterView::Reflection => self.targets[0],
            WaterView::Refraction => self.targets[1],
        }
    }
}

/// Per-frame reflection/refraction camera builder.
#[derive(Debug, Clone, Default)]
pub struct PlanarReflectionRig {
    config: ReflectionConfig,
    state: Option<ReflectionRigState>,
}

impl PlanarReflectionRig {
    pub fn new(config: ReflectionConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }

    pub fn config(&self) -> &ReflectionConfig {
        &self.config
    }

    pub fn set_resolution(&mut self, resolution: u32) {
        self.config.resolution = resolution;
    }

    /// State from the last [`update`](Self::update), if any.
    pub fn state(&self) -> Option<&ReflectionRigState> {
        self.state.as_ref()
    }

    /// Recompute both water cameras for this frame.
    pub fn update(&mut self, main: &CameraFrame, plane: &ClipPlane) -> &ReflectionRigState {
        let (reflection, refraction) = water_cameras(main, plane, self.config.clip_offset);
        let targets = WaterView::ALL
            .map(|view| RenderTargetDesc::for_aspect(view, self.config.resolution, main.aspect));
        self.state.insert(ReflectionRigState {
            reflection,
            refraction,
            targets,
        })
    }
}

/// Build `(reflection, refraction)` cameras for `main` and the water `plane`.
///
/// The reflection camera sits mirrored below the plane (`2 * |distance|` along
/// the normal) with its pitch negated; the refraction camera keeps the main pose.
/// Both reuse the main projection with the near plane swapped for the water.
pub fn water_cameras(main: &CameraFrame, plane: &ClipPlane, clip_offset: f32) -> (CameraFrame, CameraFrame) {
    let distance = plane.signed_distance(main.position()).abs();
    let mirrored_position = main.position() - plane.normal * (2.0 * distance);
    let mirrored_rotation = main.transform.with_pitch_negated().rotation;

    let reflection = main.with_pose(mirrored_position, mirrored_rotation);
    let refraction = main.with_pose(main.position(), main.rotation());

    let reflection = clipped_to_plane(main, reflection, plane, WaterView::Reflection, clip_offset);
    let refraction = clipped_to_plane(main, refraction, plane, WaterView::Refraction, clip_offset);
    (reflection, refraction)
}

fn clipped_to_plane(
    main: &CameraFrame,
    camera: CameraFrame,
    plane: &ClipPlane,
    view: WaterView,
    clip_offset: f32,
) -> CameraFrame {
    let clip = camera_space_plane(&camera.world_to_camera, plane, view.side_sign(), clip_offset);
    camera.with_projection(oblique_projection(main.projection, clip))
}

/// Express `plane` in camera space as `(n, d)` with `n` flipped by `side_sign`.
///
/// The plane is first pushed `offset` units along its world normal.
pub fn camera_space_plane(world_to_camera: &Mat4, plane: &ClipPlane, side_sign: f32, offset: f32) -> Vec4 {
    let offset_position = plane.position + plane.normal * offset;
    let position = world_to_camera.transform_point3(offset_position);
    let normal = world_to_camera.transform_vector3(plane.normal).normalize_or_zero() * side_sign;
    normal.extend(-position.dot(normal))
}

/// Replace the near plane of a `[0, 1]`-depth perspective `projection` with
/// the camera-space `clip_plane`, keeping the far plane and side planes.
///
/// The camera must sit on the negative side of `clip_plane`. A plane that
/// cannot be fitted (parallel to the far corner direction) leaves the
/// projection unchanged.
pub fn oblique_projection(projection: Mat4, clip_plane: Vec4) -> Mat4 {
    // Far-frustum corner opposite the plane.
    let corner = Vec4::new(sgn(clip_plane.x), sgn(clip_plane.y), 1.0, 1.0);
    let q = projection.inverse() * corner;

    let denom = clip_plane.dot(q);
    if denom.abs() <= f32::EPSILON || !denom.is_finite() {
        log::debug!("Oblique clip plane {:?} degenerate, keeping projection", clip_plane);
        return projection;
    }
    let row = clip_plane / denom;

    let mut oblique = projection;
    oblique.x_axis.z = row.x;
    oblique.y_axis.z = row.y;
    oblique.z_axis.z = row.z;
    oblique.w_axis.z = row.w;
    oblique
}

#[inline]
fn sgn(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Matrix mirroring points across the plane `a*x + b*y + c*z + d = 0`
/// (`(a, b, c)` unit length).
pub fn reflection_matrix(plane: Vec4) -> Mat4 {
    let (a, b, c, d) = (plane.x, plane.y, plane.z, plane.w);
    Mat4::from_cols(
        Vec4::new(1.0 - 2.0 * a * a, -2.0 * b * a, -2.0 * c * a, 0.0),
        Vec4::new(-2.0 * a * b, 1.0 - 2.0 * b * b, -2.0 * c * b, 0.0),
        Vec4::new(-2.0 * a * c, -2.0 * b * c, 1.0 - 2.0 * c * c, 0.0),
        Vec4::new(-2.0 * d * a, -2.0 * d * b, -2.0 * d * c, 1.0),
    )
}
