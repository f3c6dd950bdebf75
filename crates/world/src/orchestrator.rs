//! Sequencing of generation and water cameras.
//!
//! Parameter change: NoiseField -> heightfield -> terrain + water grids -> sink.
//! Frame: main camera + water plane -> reflection rig -> sink.

use anyhow::{Context, Result};
use engine_core::{ClipPlane, Transform, Vec3};
use procgen::{
    build, build_flat, generate, GenError, HeightCurve, Heightfield, HeightmapTexture, MeshBuffers,
};
use renderer::{
    CameraFrame, MeshSlot, PlanarReflectionRig, ReflectionConfig, ReflectionRigState, RenderSink,
};

use crate::config::WorldConfig;

/// Output of one regeneration.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedWorld {
    pub heightfield: Heightfield,
    pub terrain: MeshBuffers,
    pub water: MeshBuffers,
}

/// Run noise and meshing for `config`. Pure; touches no render state.
pub fn generate_world(config: &WorldConfig) -> Result<GeneratedWorld, GenError> {
    let heightfield = generate(config.width, config.length, &config.noise)?;
    let curve = config.height_curve.as_ref().map(|c| c as &dyn HeightCurve);
    let terrain = build(
        config.width,
        config.length,
        Some(&heightfield),
        config.height_scale,
        curve,
    )?;
    let water = build_flat(config.width, config.length)?;

    Ok(GeneratedWorld {
        heightfield,
        terrain,
        water,
    })
}

/// Owns the world state and drives a [`RenderSink`].
pub struct WorldOrchestrator<S: RenderSink> {
    config: WorldConfig,
    /// Config the sink currently holds; `None` after an upload failed partway.
    applied: Option<WorldConfig>,
    world: GeneratedWorld,
    rig: PlanarReflectionRig,
    sink: S,
    regenerations: u64,
}

impl<S: RenderSink> WorldOrchestrator<S> {
    /// Build the initial world and upload it.
    pub fn new(config: WorldConfig, mut sink: S) -> Result<Self> {
        let world = generate_world(&config).context("initial world generation")?;
        upload_world(&mut sink, &world, &config)?;
        let rig = PlanarReflectionRig::new(ReflectionConfig {
            resolution: config.reflection_resolution,
            ..Default::default()
        });

        Ok(Self {
            applied: Some(config.clone()),
            config,
            world,
            rig,
            sink,
            regenerations: 1,
        })
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Switch to `config`, regenerating unless the sink already holds the world it describes.
    /// Returns whether a regeneration happened.
    pub fn apply_config(&mut self, config: WorldConfig) -> Result<bool> {
        if self.applied.as_ref() == Some(&config) {
            // Undo a pending config that failed to build.
            self.config = config;
            return Ok(false);
        }
        self.config = config;
        self.regenerate()?;
        Ok(true)
    }

    /// Rebuild heightfield and meshes from the current config and upload them.
    ///
    /// On error `world()` keeps the previous world. If the sink failed partway
    /// it may hold a mix of both, so the next `apply_config` uploads again
    /// whatever it is given.
    pub fn regenerate(&mut self) -> Result<()> {
        let world = generate_world(&self.config)
            .with_context(|| format!("regenerating {}x{} world", self.config.width, self.config.length))?;
        if let Err(e) = upload_world(&mut self.sink, &world, &self.config) {
            self.applied = None;
            return Err(e);
        }

        self.world = world;
        self.applied = Some(self.config.clone());
        self.rig.set_resolution(self.config.reflection_resolution);
        self.regenerations += 1;
        Ok(())
    }

    /// Recompute the water cameras for `main_camera` and hand them to the sink.
    pub fn render_frame(&mut self, main_camera: &CameraFrame) -> Result<&ReflectionRigState> {
        let plane = self.water_plane();
        let state = self.rig.update(main_camera, &plane);
        self.sink.submit_water_views(state)?;
        Ok(state)
    }

    /// The water surface: world origin, facing up.
    pub fn water_plane(&self) -> ClipPlane {
        ClipPlane::horizontal(0.0)
    }

    pub fn terrain_transform(&self) -> Transform {
        terrain_placement(&self.config)
    }

    pub fn world(&self) -> &GeneratedWorld {
        &self.world
    }

    pub fn heightfield(&self) -> &Heightfield {
        &self.world.heightfield
    }

    pub fn rig(&self) -> &PlanarReflectionRig {
        &self.rig
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Successful uploads so far, the initial build included.
    pub fn regenerations(&self) -> u64 {
        self.regenerations
    }
}

/// Terrain sunk so that `water_level` of its height range lies below the water plane.
fn terrain_placement(config: &WorldConfig) -> Transform {
    Transform::from_position(Vec3::new(
        0.0,
        -config.height_scale * config.water_level,
        0.0,
    ))
}

fn upload_world<S: RenderSink>(sink: &mut S, world: &GeneratedWorld, config: &WorldConfig) -> Result<()> {
    sink.upload_mesh(MeshSlot::Terrain, &world.terrain, &terrain_placement(config))
        .context("uploading terrain mesh")?;
    sink.upload_mesh(MeshSlot::Water, &world.water, &Transform::default())
        .context("uploading water mesh")?;
    sink.upload_heightmap(&HeightmapTexture::from_heightfield(&world.heightfield))
        .context("uploading heightmap")?;
    sink.set_height_scale(config.height_scale);

    log::info!(
        "World regenerated ({}x{}, {} terrain triangles)",
        config.width,
        config.length,
        world.terrain.triangle_count()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use procgen::CurveAsset;

    #[test]
    fn generated_world_has_matching_grids() {
        let config = WorldConfig {
            width: 12,
            length: 7,
            ..Default::default()
        };
        let world = generate_world(&config).unwrap();
        assert_eq!(world.heightfield.dimensions(), (12, 7));
        assert_eq!(world.terrain.vertices.len(), 84);
        assert_eq!(world.water.vertices.len(), 84);
        assert_eq!(world.terrain.triangles, world.water.triangles);
        assert!(world.water.vertices.iter().all(|v| v.y == 0.0));
        assert!(world
            .terrain
            .vertices
            .iter()
            .all(|v| (0.0..=config.height_scale).contains(&v.y)));
    }

    #[test]
    fn curve_reshapes_terrain() {
        let flat_top = WorldConfig {
            height_curve: Some(CurveAsset::Keyframes(procgen::KeyframeCurve::new(vec![
                procgen::Keyframe::smooth(0.0, 0.3, 0.0),
                procgen::Keyframe::smooth(1.0, 0.3, 0.0),
            ]))),
            ..Default::default()
        };
        let world = generate_world(&flat_top).unwrap();
        assert!(world.terrain.vertices.iter().all(|v| (v.y - 3.0).abs() < 1e-5));
    }

    #[test]
    fn invalid_grid_is_reported() {
        let config = WorldConfig {
            width: 0,
            ..Default::default()
        };
        assert!(matches!(
            generate_world(&config),
            Err(GenError::InvalidDimension { width: 0, .. })
        ));
    }
}
