//! wgpu implementation of [`RenderSink`].
//!
//! Owns the terrain/water meshes, the heightmap texture, the height-scale
//! uniform and the two offscreen water targets. Drawing the scene into the
//! targets is left to the caller through [`GpuSink::encode_water_passes`]; the
//! callback is where the water layer gets culled.

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use bytemuck::{Pod, Zeroable};
use engine_core::{Transform, TransformRaw};
use procgen::{HeightmapTexture, MeshBuffers};
use wgpu::util::DeviceExt;

use crate::camera::CameraUniform;
use crate::mesh::{GpuMesh, MeshData};
use crate::reflection::{ReflectionRigState, RenderTargetDesc, WaterView};
use crate::sink::{MeshSlot, RenderSink};

/// Color format of the reflection/refraction targets.
pub const WATER_TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Error out if a `width × height` texture would exceed the device's 2D limit.
pub fn check_texture_size(label: &str, width: u32, height: u32, max_dimension: u32) -> Result<()> {
    if width == 0 || height == 0 || width > max_dimension || height > max_dimension {
        return Err(anyhow!(
            "{} texture {}x{} is outside the device limit of {} per side",
            label,
            width,
            height,
            max_dimension
        ));
    }
    Ok(())
}

/// Height-scale uniform (16-byte aligned).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct HeightScaleUniform {
    pub height_scale: f32,
    pub _pad: [f32; 3],
}

/// A world mesh plus its model matrix uniform.
pub struct UploadedMesh {
    pub mesh: GpuMesh,
    pub model_buffer: wgpu::Buffer,
}

/// One offscreen water view: color target and camera uniform.
pub struct WaterTarget {
    pub desc: RenderTargetDesc,
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub camera_buffer: wgpu::Buffer,
}

struct HeightmapGpu {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

pub struct GpuSink {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    meshes: HashMap<MeshSlot, UploadedMesh>,
    heightmap: Option<HeightmapGpu>,
    heightmap_sampler: wgpu::Sampler,
    height_scale_buffer: wgpu::Buffer,
    /// Indexed like [`WaterView::ALL`]; empty until the first water frame.
    water_targets: Vec<WaterTarget>,
}

impl GpuSink {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        let height_scale_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Height Scale Uniform"),
            contents: bytemuck::cast_slice(&[HeightScaleUniform {
                height_scale: 1.0,
                _pad: [0.0; 3],
            }]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        // Point filtering: one texel per grid cell.
        let heightmap_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Heightmap Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            device,
            queue,
            meshes: HashMap::new(),
            heightmap: None,
            heightmap_sampler,
            height_scale_buffer,
            water_targets: Vec::new(),
        }
    }

    /// Device without a window surface, for offline generation.
    pub async fn headless() -> Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow!("Failed to find suitable GPU adapter"))?;

        log::info!("Using GPU: {:?}", adapter.get_info().name);

        // Take what the adapter offers so large grids fit in one heightmap.
        let limits = adapter.limits();
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Terrain Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: limits,
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        Ok(Self::new(device, queue))
    }

    pub fn mesh(&self, slot: MeshSlot) -> Option<&UploadedMesh> {
        self.meshes.get(&slot)
    }

    pub fn heightmap_view(&self) -> Option<&wgpu::TextureView> {
        self.heightmap.as_ref().map(|h| &h.view)
    }

    pub fn heightmap_sampler(&self) -> &wgpu::Sampler {
        &self.heightmap_sampler
    }

    pub fn height_scale_buffer(&self) -> &wgpu::Buffer {
        &self.height_scale_buffer
    }

    /// Target the water shader samples for `view`.
    pub fn water_target(&self, view: WaterView) -> Option<&WaterTarget> {
        self.water_targets.iter().find(|t| t.desc.view == view)
    }

    /// Clear each water target and let `draw` render the scene into it.
    ///
    /// `draw` receives the view, its camera uniform buffer and the open pass.
    pub fn encode_water_passes<F>(&self, encoder: &mut wgpu::CommandEncoder, mut draw: F)
    where
        F: FnMut(WaterView, &wgpu::Buffer, &mut wgpu::RenderPass<'_>),
    {
        for target in &self.water_targets {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(target.desc.view.name()),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r: 0.0, g: 0.0, b: 0.0, a: 1.0 }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            draw(target.desc.view, &target.camera_buffer, &mut pass);
        }
    }

    /// Encode and submit the water passes in one go.
    pub fn render_water_views<F>(&self, draw: F)
    where
        F: FnMut(WaterView, &wgpu::Buffer, &mut wgpu::RenderPass<'_>),
    {
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Water Views"),
        });
        self.encode_water_passes(&mut encoder, draw);
        self.queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_water_target(&self, desc: RenderTargetDesc) -> WaterTarget {
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(desc.view.name()),
            size: wgpu::Extent3d {
                width: desc.width,
                height: desc.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: WATER_TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let camera_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(desc.view.name()),
            contents: bytemuck::cast_slice(&[CameraUniform::new()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        WaterTarget {
            desc,
            texture,
            view,
            camera_buffer,
        }
    }

    fn max_texture_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }

    /// Recreate targets whose size changed (first frame, or main camera aspect change).
    /// Sizes beyond the device limit are shrunk to fit.
    fn ensure_water_targets(&mut self, state: &ReflectionRigState) {
        let max_dimension = self.max_texture_dimension();
        let requested = WaterView::ALL.map(|view| state.target(view));
        let wanted = requested.map(|desc| desc.clamped(max_dimension));
        let current: Vec<RenderTargetDesc> = self.water_targets.iter().map(|t| t.desc).collect();
        if current.as_slice() == wanted.as_slice() {
            return;
        }
        if wanted != requested {
            log::warn!(
                "Water targets {}x{} exceed device limit {}",
                requested[0].width,
                requested[0].height,
                max_dimension
            );
        }
        log::info!(
            "Water targets resized to {}x{}",
            wanted[0].width,
            wanted[0].height
        );
        self.water_targets = wanted.iter().map(|&desc| self.create_water_target(desc)).collect();
    }
}

impl RenderSink for GpuSink {
    fn upload_mesh(&mut self, slot: MeshSlot, mesh: &MeshBuffers, placement: &Transform) -> Result<()> {
        let label = format!("{slot:?}");
        let data = MeshData::from_buffers(mesh);
        let gpu_mesh = data.upload(&self.device, &label);
        let model_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Model")),
            contents: bytemuck::cast_slice(&[TransformRaw::from(placement)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        self.meshes.insert(
            slot,
            UploadedMesh {
                mesh: gpu_mesh,
                model_buffer,
            },
        );
        Ok(())
    }

    fn upload_heightmap(&mut self, texture: &HeightmapTexture) -> Result<()> {
        check_texture_size("Heightmap", texture.width, texture.height, self.max_texture_dimension())?;
        let gpu_texture = self.device.create_texture_with_data(
            &self.queue,
            &wgpu::TextureDescriptor {
                label: Some("Heightmap"),
                size: wgpu::Extent3d {
                    width: texture.width,
                    height: texture.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            texture.as_bytes(),
        );
        let view = gpu_texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.heightmap = Some(HeightmapGpu {
            _texture: gpu_texture,
            view,
        });
        Ok(())
    }

    fn set_height_scale(&mut self, height_scale: f32) {
        let uniform = HeightScaleUniform {
            height_scale,
            _pad: [0.0; 3],
        };
        self.queue
            .write_buffer(&self.height_scale_buffer, 0, bytemuck::cast_slice(&[uniform]));
    }

    fn submit_water_views(&mut self, state: &ReflectionRigState) -> Result<()> {
        self.ensure_water_targets(state);
        for target in &self.water_targets {
            let uniform = CameraUniform::from(state.frame(target.desc.view));
            self.queue
                .write_buffer(&target.camera_buffer, 0, bytemuck::cast_slice(&[uniform]));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texture_size_checked_against_limit() {
        assert!(check_texture_size("Heightmap", 2048, 16, 2048).is_ok());
        assert!(check_texture_size("Heightmap", 1, 1, 2048).is_ok());

        let err = check_texture_size("Heightmap", 3000, 4, 2048).unwrap_err();
        assert!(err.to_string().contains("3000x4"));
        assert!(check_texture_size("Heightmap", 4, 3000, 2048).is_err());
        assert!(check_texture_size("Heightmap", 0, 4, 2048).is_err());
    }
}
