//! Interleaved mesh data and GPU upload.

use glam::Vec3;
use procgen::MeshBuffers;
use wgpu::util::DeviceExt;

use crate::vertex::TerrainVertex;

/// A GPU mesh with vertex and index buffers.
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_indices: u32,
}

impl GpuMesh {
    /// Create a mesh from vertex and index data.
    pub fn new(device: &wgpu::Device, label: &str, vertices: &[TerrainVertex], indices: &[u32]) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Vertex Buffer")),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Index Buffer")),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            num_indices: indices.len() as u32,
        }
    }
}

/// Mesh data before GPU upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<TerrainVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Interleave generated buffers and derive smooth vertex normals from the triangles.
    pub fn from_buffers(buffers: &MeshBuffers) -> Self {
        let normals = vertex_normals(buffers);
        let vertices = buffers
            .vertices
            .iter()
            .zip(&buffers.uvs)
            .zip(&normals)
            .map(|((p, uv), n)| TerrainVertex::new(p.to_array(), n.to_array(), uv.to_array()))
            .collect();

        Self {
            vertices,
            indices: buffers.triangles.clone(),
        }
    }

    pub fn upload(&self, device: &wgpu::Device, label: &str) -> GpuMesh {
        GpuMesh::new(device, label, &self.vertices, &self.indices)
    }
}

/// Average of the unit face normals around each vertex. Isolated vertices
/// (strips without triangles) point straight up.
fn vertex_normals(buffers: &MeshBuffers) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; buffers.vertices.len()];

    for [a, b, c] in buffers.triangle_indices() {
        let (a, b, c) = (a as usize, b as usize, c as usize);
        let (v0, v1, v2) = (buffers.vertices[a], buffers.vertices[b], buffers.vertices[c]);
        let face = (v1 - v0).cross(v2 - v0).normalize_or_zero();
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }

    normals
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y))
        .collect()
}
