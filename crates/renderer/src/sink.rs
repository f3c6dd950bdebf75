//! Boundary between world generation and whatever draws it.

use std::collections::HashMap;

use anyhow::Result;
use engine_core::Transform;
use procgen::{HeightmapTexture, MeshBuffers};

use crate::reflection::{ReflectionRigState, WaterView};

/// Which world mesh an upload replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshSlot {
    Terrain,
    Water,
}

/// Consumer of generated geometry and per-frame water cameras.
///
/// Uploads replace the previous contents of a slot wholesale.
pub trait RenderSink {
    fn upload_mesh(&mut self, slot: MeshSlot, mesh: &MeshBuffers, placement: &Transform) -> Result<()>;

    fn upload_heightmap(&mut self, texture: &HeightmapTexture) -> Result<()>;

    /// Vertical displacement uniform for the terrain shader.
    fn set_height_scale(&mut self, height_scale: f32);

    /// Hand over this frame's reflection and refraction cameras.
    fn submit_water_views(&mut self, state: &ReflectionRigState) -> Result<()>;
}

/// Summary of one uploaded mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshStats {
    pub vertices: usize,
    pub triangles: usize,
    pub placement: Transform,
}

/// Sink without a GPU: keeps a summary of what it was given and logs it.
#[derive(Debug, Default)]
pub struct HeadlessSink {
    pub meshes: HashMap<MeshSlot, MeshStats>,
    pub mesh_uploads: usize,
    pub heightmap_size: Option<(u32, u32)>,
    pub height_scale: Option<f32>,
    pub water_frames: usize,
    pub last_water_views: Option<ReflectionRigState>,
}

impl HeadlessSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderSink for HeadlessSink {
    fn upload_mesh(&mut self, slot: MeshSlot, mesh: &MeshBuffers, placement: &Transform) -> Result<()> {
        let stats = MeshStats {
            vertices: mesh.vertices.len(),
            triangles: mesh.triangle_count(),
            placement: *placement,
        };
        log::debug!(
            "{:?} mesh: {} vertices, {} triangles",
            slot,
            stats.vertices,
            stats.triangles
        );
        self.meshes.insert(slot, stats);
        self.mesh_uploads += 1;
        Ok(())
    }

    fn upload_heightmap(&mut self, texture: &HeightmapTexture) -> Result<()> {
        self.heightmap_size = Some((texture.width, texture.height));
        Ok(())
    }

    fn set_height_scale(&mut self, height_scale: f32) {
        self.height_scale = Some(height_scale);
    }

    fn submit_water_views(&mut self, state: &ReflectionRigState) -> Result<()> {
        for view in WaterView::ALL {
            let target = state.target(view);
            log::trace!(
                "{} view at {:?} into {}x{}",
                view.name(),
                state.frame(view).position(),
                target.width,
                target.height
            );
        }
        self.water_frames += 1;
        self.last_water_views = Some(state.clone());
        Ok(())
    }
}
