//! Grayscale texture encoding of heightfields (debug view and shader input).

use crate::heightfield::Heightfield;

/// RGBA8 image, one pixel per heightfield cell, same row order.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightmapTexture {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[u8; 4]>,
}

impl HeightmapTexture {
    /// Encode each sample as an opaque gray level.
    pub fn from_heightfield(field: &Heightfield) -> Self {
        let pixels = field
            .samples()
            .iter()
            .map(|&h| {
                let level = (h.clamp(0.0, 1.0) * 255.0).round() as u8;
                [level, level, level, 255]
            })
            .collect();

        Self {
            width: field.width(),
            height: field.length(),
            pixels,
        }
    }

    /// Tightly packed RGBA bytes, rows in order.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x < self.width && y < self.height {
            Some(self.pixels[y as usize * self.width as usize + x as usize])
        } else {
            None
        }
    }
}
