//! terraform: generate the world from world.ron, run one water frame, and
//! optionally dump the heightmap.
//!
//! Usage: `terraform [heightmap.png]`

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use engine_core::Vec3;
use procgen::HeightmapTexture;
use renderer::{CameraFrame, GpuSink, HeadlessSink, Lens, RenderSink, WaterView};
use world::{WorldConfig, WorldOrchestrator};

/// Main camera placed off one corner of the grid, looking at its centre.
fn overview_camera(config: &WorldConfig) -> CameraFrame {
    let centre = Vec3::new(config.width as f32 * 0.5, 0.0, config.length as f32 * 0.5);
    let eye = Vec3::new(
        -(config.width as f32) * 0.25,
        config.height_scale * 1.5 + 1.0,
        -(config.length as f32) * 0.25,
    );
    CameraFrame::looking_at(eye, centre, 16.0 / 9.0, Lens::default())
}

fn run_frame<S: RenderSink>(world: &mut WorldOrchestrator<S>, camera: &CameraFrame) -> Result<()> {
    let state = world.render_frame(camera)?;
    for view in WaterView::ALL {
        let target = state.target(view);
        log::info!(
            "{} camera at {:.2?}, target {}x{}",
            view.name(),
            state.frame(view).position(),
            target.width,
            target.height
        );
    }
    Ok(())
}

fn write_heightmap(texture: &HeightmapTexture, path: &Path) -> Result<()> {
    let image = image::RgbaImage::from_raw(texture.width, texture.height, texture.as_bytes().to_vec())
        .context("heightmap buffer does not match its dimensions")?;
    image
        .save(path)
        .with_context(|| format!("writing heightmap to {:?}", path))?;
    log::info!("Heightmap written to {:?}", path);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let heightmap_out: Option<PathBuf> = std::env::args().nth(1).map(PathBuf::from);
    let config = WorldConfig::load();
    let camera = overview_camera(&config);

    log::info!(
        "Generating {}x{} world (scale {}, {} octaves)",
        config.width,
        config.length,
        config.noise.scale,
        config.noise.octaves
    );

    let heightmap = match pollster::block_on(GpuSink::headless()) {
        Ok(sink) => {
            let mut world = WorldOrchestrator::new(config, sink)?;
            run_frame(&mut world, &camera)?;
            // Scene drawing lives with the application; here the targets are only cleared.
            world.sink().render_water_views(|_, _, _| {});
            HeightmapTexture::from_heightfield(world.heightfield())
        }
        Err(e) => {
            log::warn!("No GPU available ({}), continuing headless", e);
            let mut world = WorldOrchestrator::new(config, HeadlessSink::new())?;
            run_frame(&mut world, &camera)?;
            HeightmapTexture::from_heightfield(world.heightfield())
        }
    };

    if let Some(path) = heightmap_out {
        write_heightmap(&heightmap, &path)?;
    }

    Ok(())
}
