use anyhow::{bail, Result};
use engine_core::{Quat, Transform, Vec3};
use procgen::{CurveAsset, HeightmapTexture, KeyframeCurve, MeshBuffers, NoiseConfig};
use renderer::{
    CameraFrame, HeadlessSink, Lens, MeshSlot, ReflectionRigState, RenderSink, WaterView,
};
use world::{WorldConfig, WorldOrchestrator};

fn small_world() -> WorldConfig {
    WorldConfig {
        width: 16,
        length: 12,
        noise: NoiseConfig {
            scale: 3.0,
            seed: Some(2024),
            ..Default::default()
        },
        height_scale: 20.0,
        height_curve: Some(CurveAsset::Keyframes(KeyframeCurve::ease_in_out())),
        water_level: 0.25,
        reflection_resolution: 320,
    }
}

fn main_camera() -> CameraFrame {
    CameraFrame::new(
        Vec3::new(8.0, 12.0, -4.0),
        Quat::from_rotation_x(-0.5),
        2.0,
        Lens::default(),
    )
}

#[test]
fn initial_build_uploads_everything() {
    let world = WorldOrchestrator::new(small_world(), HeadlessSink::new()).unwrap();
    let sink = world.sink();

    assert_eq!(world.regenerations(), 1);
    assert_eq!(sink.mesh_uploads, 2);
    let terrain = sink.meshes[&MeshSlot::Terrain];
    let water = sink.meshes[&MeshSlot::Water];
    assert_eq!(terrain.vertices, 16 * 12);
    assert_eq!(terrain.triangles, 15 * 11 * 2);
    assert_eq!(water.vertices, 16 * 12);
    assert_eq!(terrain.placement.position, Vec3::new(0.0, -5.0, 0.0));
    assert_eq!(water.placement.position, Vec3::ZERO);
    assert_eq!(sink.heightmap_size, Some((16, 12)));
    assert_eq!(sink.height_scale, Some(20.0));
}

#[test]
fn unchanged_config_does_not_regenerate() {
    let mut world = WorldOrchestrator::new(small_world(), HeadlessSink::new()).unwrap();
    assert!(!world.apply_config(small_world()).unwrap());
    assert_eq!(world.regenerations(), 1);
    assert_eq!(world.sink().mesh_uploads, 2);

    let taller = WorldConfig {
        height_scale: 30.0,
        ..small_world()
    };
    assert!(world.apply_config(taller.clone()).unwrap());
    assert_eq!(world.regenerations(), 2);
    assert_eq!(world.sink().height_scale, Some(30.0));
    assert!(!world.apply_config(taller).unwrap());
}

#[test]
fn failed_regeneration_keeps_previous_world() {
    let mut world = WorldOrchestrator::new(small_world(), HeadlessSink::new()).unwrap();
    let before = world.world().clone();

    let broken = WorldConfig {
        noise: NoiseConfig {
            scale: 0.0,
            ..Default::default()
        },
        ..small_world()
    };
    assert!(world.apply_config(broken.clone()).is_err());
    assert_eq!(world.world(), &before);
    assert_eq!(world.regenerations(), 1);

    // Still pending, so a retry with the same config tries again.
    assert!(world.apply_config(broken).is_err());
    // Going back to the built config needs no work.
    assert!(!world.apply_config(small_world()).unwrap());
    assert_eq!(world.config(), &small_world());
    assert_eq!(world.regenerations(), 1);
}

/// Records like [`HeadlessSink`] but rejects heightmaps once `heightmaps_left` runs out.
struct FlakySink {
    inner: HeadlessSink,
    heightmaps_left: usize,
}

impl RenderSink for FlakySink {
    fn upload_mesh(&mut self, slot: MeshSlot, mesh: &MeshBuffers, placement: &Transform) -> Result<()> {
        self.inner.upload_mesh(slot, mesh, placement)
    }

    fn upload_heightmap(&mut self, texture: &HeightmapTexture) -> Result<()> {
        if self.heightmaps_left == 0 {
            bail!("heightmap upload refused");
        }
        self.heightmaps_left -= 1;
        self.inner.upload_heightmap(texture)
    }

    fn set_height_scale(&mut self, height_scale: f32) {
        self.inner.set_height_scale(height_scale);
    }

    fn submit_water_views(&mut self, state: &ReflectionRigState) -> Result<()> {
        self.inner.submit_water_views(state)
    }
}

#[test]
fn partial_upload_failure_is_repaired_by_reverting() {
    let sink = FlakySink {
        inner: HeadlessSink::new(),
        heightmaps_left: 1,
    };
    let mut world = WorldOrchestrator::new(small_world(), sink).unwrap();
    let before = world.world().clone();

    let wider = WorldConfig {
        width: 24,
        ..small_world()
    };
    assert!(world.apply_config(wider).is_err());
    assert_eq!(world.world(), &before);
    assert_eq!(world.regenerations(), 1);
    // Meshes went through before the heightmap failed.
    assert_eq!(world.sink().inner.meshes[&MeshSlot::Terrain].vertices, 24 * 12);

    world.sink_mut().heightmaps_left = 1;
    assert!(world.apply_config(small_world()).unwrap());
    assert_eq!(world.world(), &before);
    assert_eq!(world.regenerations(), 2);
    let sink = &world.sink().inner;
    assert_eq!(sink.meshes[&MeshSlot::Terrain].vertices, 16 * 12);
    assert_eq!(sink.heightmap_size, Some((16, 12)));
}

#[test]
fn invalid_initial_config_is_rejected() {
    let config = WorldConfig {
        length: 0,
        ..small_world()
    };
    assert!(WorldOrchestrator::new(config, HeadlessSink::new()).is_err());
}

#[test]
fn frames_submit_mirrored_water_views() {
    let mut world = WorldOrchestrator::new(small_world(), HeadlessSink::new()).unwrap();
    let camera = main_camera();

    let state = world.render_frame(&camera).unwrap().clone();
    assert!((state.reflection.position() - Vec3::new(8.0, -12.0, -4.0)).length() < 1e-4);
    assert_eq!(state.refraction.position(), camera.position());
    assert_eq!(state.target(WaterView::Reflection).width, 320);
    assert_eq!(state.target(WaterView::Refraction).height, 160);

    world.render_frame(&camera).unwrap();
    let sink = world.sink();
    assert_eq!(sink.water_frames, 2);
    assert_eq!(sink.last_water_views.as_ref(), Some(&state));
    assert_eq!(world.rig().state(), Some(&state));
}

#[test]
fn regeneration_is_deterministic() {
    let a = WorldOrchestrator::new(small_world(), HeadlessSink::new()).unwrap();
    let b = WorldOrchestrator::new(small_world(), HeadlessSink::new()).unwrap();
    assert_eq!(a.world(), b.world());
    assert!(a
        .heightfield()
        .samples()
        .iter()
        .all(|&h| (0.0..=1.0).contains(&h)));
}
