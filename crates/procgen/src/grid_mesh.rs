//! Regular grid meshes built from heightfields.

use glam::{Vec2, Vec3};

use crate::curve::HeightCurve;
use crate::error::{check_dimensions, GenError, GenResult};
use crate::heightfield::Heightfield;

/// CPU-side geometry ready for upload. Normals are left to the renderer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffers {
    pub vertices: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    /// Three indices per triangle, counter-clockwise seen from +Y.
    pub triangles: Vec<u32>,
}

impl MeshBuffers {
    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    /// Iterate triangles as vertex index triples.
    pub fn triangle_indices(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.triangles.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }
}

/// Build a `width x length` grid.
///
/// Vertex `(x, y)` sits at `(x, h, y)` where `h` is
/// `height_scale * curve(heightfield[x, y])`, or `height_scale * heightfield[x, y]`
/// without a curve, or `0` without a heightfield.
pub fn build(
    width: u32,
    length: u32,
    heightfield: Option<&Heightfield>,
    height_scale: f32,
    curve: Option<&dyn HeightCurve>,
) -> GenResult<MeshBuffers> {
    check_dimensions(width, length)?;
    if let Some(hf) = heightfield {
        if hf.dimensions() != (width, length) {
            return Err(GenError::DimensionMismatch {
                expected: (width, length),
                actual: hf.dimensions(),
            });
        }
    }

    let w = width as usize;
    let l = length as usize;
    let vertex_count = w * l;
    let mut vertices = Vec::with_capacity(vertex_count);
    let mut uvs = Vec::with_capacity(vertex_count);

    // A single column/row has nothing to interpolate across.
    let u_span = width.saturating_sub(1).max(1) as f32;
    let v_span = length.saturating_sub(1).max(1) as f32;

    for y in 0..length {
        for x in 0..width {
            let h = match heightfield {
                Some(hf) => {
                    let sample = hf.get(x, y);
                    let shaped = match curve {
                        Some(curve) => curve.evaluate(sample),
                        None => sample,
                    };
                    height_scale * shaped
                }
                None => 0.0,
            };
            vertices.push(Vec3::new(x as f32, h, y as f32));
            uvs.push(Vec2::new(x as f32 / u_span, y as f32 / v_span));
        }
    }

    let triangles = grid_triangles(w, l);

    Ok(MeshBuffers {
        vertices,
        uvs,
        triangles,
    })
}

/// Flat grid at height 0 (the water surface).
pub fn build_flat(width: u32, length: u32) -> GenResult<MeshBuffers> {
    build(width, length, None, 0.0, None)
}

fn grid_triangles(width: usize, length: usize) -> Vec<u32> {
    if width < 2 || length < 2 {
        return Vec::new();
    }

    let mut indices = Vec::with_capacity((width - 1) * (length - 1) * 6);
    for y in 0..(length - 1) {
        for x in 0..(width - 1) {
            let top_left = (y * width + x) as u32;
            let top_right = top_left + 1;
            let bottom_left = ((y + 1) * width + x) as u32;
            let bottom_right = bottom_left + 1;

            indices.push(top_left);
            indices.push(bottom_left);
            indices.push(top_right);

            indices.push(top_right);
            indices.push(bottom_left);
            indices.push(bottom_right);
        }
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise_field::{generate, NoiseConfig};

    #[test]
    fn four_by_three_grid_counts() {
        let mesh = build_flat(4, 3).unwrap();
        assert_eq!(mesh.vertices.len(), 12);
        assert_eq!(mesh.uvs.len(), 12);
        assert_eq!(mesh.triangles.len(), (4 - 1) * (3 - 1) * 6);
        assert_eq!(mesh.triangle_count(), 12);
        assert!(mesh.triangles.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }

    #[test]
    fn degenerate_strips_have_no_triangles() {
        for (w, l) in [(1, 5), (5, 1), (1, 1)] {
            let mesh = build_flat(w, l).unwrap();
            assert_eq!(mesh.vertices.len(), (w * l) as usize);
            assert!(mesh.triangles.is_empty());
            assert!(mesh.uvs.iter().all(|uv| uv.is_finite()));
        }
        let strip = build_flat(1, 3).unwrap();
        assert_eq!(strip.uvs[2], Vec2::new(0.0, 1.0));
    }

    #[test]
    fn triangles_face_up() {
        let mesh = build_flat(3, 3).unwrap();
        for [a, b, c] in mesh.triangle_indices() {
            let (a, b, c) = (
                mesh.vertices[a as usize],
                mesh.vertices[b as usize],
                mesh.vertices[c as usize],
            );
            let normal = (b - a).cross(c - a);
            assert!(normal.y > 0.0, "triangle normal {:?} points down", normal);
        }
    }

    #[test]
    fn uvs_span_unit_square() {
        let mesh = build_flat(5, 4).unwrap();
        assert_eq!(mesh.uvs[0], Vec2::ZERO);
        assert_eq!(mesh.uvs[4], Vec2::new(1.0, 0.0));
        assert_eq!(*mesh.uvs.last().unwrap(), Vec2::ONE);
        assert_eq!(mesh.vertices[5 + 2], Vec3::new(2.0, 0.0, 1.0));
    }

    #[test]
    fn heights_follow_field_and_curve() {
        let hf = generate(6, 5, &NoiseConfig { scale: 3.0, ..Default::default() }).unwrap();

        let raw = build(6, 5, Some(&hf), 4.0, None).unwrap();
        let squared = |t: f32| t * t;
        let curved = build(6, 5, Some(&hf), 4.0, Some(&squared)).unwrap();

        for y in 0..5 {
            for x in 0..6 {
                let i = hf.index(x, y);
                let h = hf.get(x, y);
                assert_eq!(raw.vertices[i].y, 4.0 * h);
                assert_eq!(curved.vertices[i].y, 4.0 * (h * h));
            }
        }
    }

    #[test]
    fn scenario_eight_by_eight_stays_under_height_scale() {
        let config = NoiseConfig {
            scale: 1.0,
            octaves: 0,
            persistence: 1.0,
            lacunarity: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            ..Default::default()
        };
        let hf = generate(8, 8, &config).unwrap();
        let identity = |t: f32| t;
        let mesh = build(8, 8, Some(&hf), 10.0, Some(&identity)).unwrap();
        assert_eq!(mesh.vertices.len(), 64);
        assert!(mesh.vertices.iter().all(|v| (0.0..=10.0).contains(&v.y)));
    }

    #[test]
    fn input_field_is_untouched_and_output_repeatable() {
        let hf = generate(7, 7, &NoiseConfig::default()).unwrap();
        let before = hf.clone();
        let a = build(7, 7, Some(&hf), 2.0, None).unwrap();
        let b = build(7, 7, Some(&hf), 2.0, None).unwrap();
        assert_eq!(hf, before);
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_bad_dimensions() {
        assert!(matches!(build_flat(0, 3), Err(GenError::InvalidDimension { .. })));
        let hf = generate(4, 4, &NoiseConfig::default()).unwrap();
        assert_eq!(
            build(4, 5, Some(&hf), 1.0, None),
            Err(GenError::DimensionMismatch { expected: (4, 5), actual: (4, 4) })
        );
    }
}
