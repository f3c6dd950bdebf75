//! Fractal noise heightfields.
//!
//! **Determinism:** the Perlin permutation and the per-octave offsets are
//! derived only from `NoiseConfig::seed`, so identical `(width, length, config)`
//! always produce bit-identical fields.

use noise::{NoiseFn, Perlin};
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{check_dimensions, GenError, GenResult};
use crate::heightfield::Heightfield;

/// Range of the seeded per-octave sampling offsets.
const OCTAVE_OFFSET_RANGE: f64 = 100_000.0;

/// Derive a deterministic u32 noise seed from a world seed and an offset.
/// Same (seed, offset) always gives the same result so terrain is reproducible.
#[inline]
fn deterministic_noise_seed(seed: u64, offset: u64) -> u32 {
    ((seed.wrapping_add(offset))
        .wrapping_mul(0x9e3779b97f4a7c15_u64)
        .wrapping_add(offset.wrapping_mul(0x6c078965_u64))
        >> 32) as u32
}

/// How grid coordinates are turned into noise coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NoiseMode {
    /// Centred, offset, multi-octave noise.
    #[default]
    Fractal,
    /// Single layer sampled at `x / width * scale`; offsets and octaves are ignored.
    Plain,
}

/// Parameters for [`generate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    /// Extent of the grid in noise space. Must be > 0.
    pub scale: f32,
    /// Extra layers on top of the base layer (`octaves + 1` layers total).
    pub octaves: u32,
    /// Amplitude multiplier per octave. Values >= 1 make later octaves louder.
    pub persistence: f32,
    /// Frequency multiplier per octave.
    pub lacunarity: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    /// When set, seeds the permutation table and scatters each octave to its own region.
    pub seed: Option<u64>,
    pub mode: NoiseMode,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            offset_x: 0.0,
            offset_y: 0.0,
            seed: None,
            mode: NoiseMode::Fractal,
        }
    }
}

impl NoiseConfig {
    /// One un-centred layer, the simplest form of the field.
    pub fn plain(scale: f32) -> Self {
        Self {
            scale,
            octaves: 0,
            persistence: 1.0,
            lacunarity: 1.0,
            mode: NoiseMode::Plain,
            ..Default::default()
        }
    }

    fn validate(&self) -> GenResult<()> {
        if !(self.scale > 0.0 && self.scale.is_finite()) {
            return Err(GenError::InvalidScale(self.scale));
        }
        Ok(())
    }
}

/// Generate a normalized heightfield.
///
/// Every returned sample lies in `[0, 1]`. A field whose raw samples are all
/// equal cannot be stretched and comes back as uniform `0.5`.
pub fn generate(width: u32, length: u32, config: &NoiseConfig) -> GenResult<Heightfield> {
    check_dimensions(width, length)?;
    config.validate()?;

    let perlin = Perlin::new(deterministic_noise_seed(config.seed.unwrap_or(0), 0));
    let offsets = octave_offsets(config);

    let mut samples = Vec::with_capacity(width as usize * length as usize);
    let mut min = f32::MAX;
    let mut max = f32::MIN;

    for y in 0..length {
        for x in 0..width {
            let u = x as f64 / width as f64;
            let v = y as f64 / length as f64;
            let sample = match config.mode {
                NoiseMode::Fractal => fractal_sample(&perlin, &offsets, u, v, config),
                NoiseMode::Plain => {
                    let scale = config.scale as f64;
                    noise_2d(&perlin, u * scale, v * scale)
                }
            } as f32;

            min = min.min(sample);
            max = max.max(sample);
            samples.push(sample);
        }
    }

    normalize_samples(&mut samples, min, max);
    log::debug!(
        "Generated {}x{} heightfield (mode {:?}, {} octaves, raw range {:.4}..{:.4})",
        width,
        length,
        config.mode,
        config.octaves + 1,
        min,
        max
    );
    Ok(Heightfield::from_samples(width, length, samples))
}

/// Perlin noise remapped from `[-1, 1]` to `[0, 1]`.
#[inline]
fn noise_2d(perlin: &Perlin, x: f64, y: f64) -> f64 {
    ((perlin.get([x, y]) + 1.0) * 0.5).clamp(0.0, 1.0)
}

fn octave_offsets(config: &NoiseConfig) -> Vec<(f64, f64)> {
    let layers = config.octaves as usize + 1;
    match config.seed {
        Some(seed) => {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..layers)
                .map(|_| {
                    (
                        rng.gen_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE),
                        rng.gen_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE),
                    )
                })
                .collect()
        }
        None => vec![(0.0, 0.0); layers],
    }
}

fn fractal_sample(
    perlin: &Perlin,
    offsets: &[(f64, f64)],
    u: f64,
    v: f64,
    config: &NoiseConfig,
) -> f64 {
    let scale = config.scale as f64;
    let xc = (u - 0.5) * scale + config.offset_x as f64;
    let yc = (v - 0.5) * scale + config.offset_y as f64;

    let mut value = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = 1.0;

    for &(ox, oy) in offsets {
        let layer = noise_2d(perlin, xc * frequency + ox, yc * frequency + oy);
        value += (layer * 2.0 - 1.0) * amplitude;

        frequency *= config.lacunarity as f64;
        amplitude *= config.persistence as f64;
    }

    value
}

/// Inverse-lerp every sample from `[min, max]` onto `[0, 1]`.
pub(crate) fn normalize_samples(samples: &mut [f32], min: f32, max: f32) {
    let range = max - min;
    if !(range > 0.0) {
        log::debug!("Flat noise range ({min} == {max}), using uniform 0.5");
        samples.fill(0.5);
        return;
    }

    for s in samples.iter_mut() {
        let t = (*s - min) / range;
        *s = if t.is_nan() { 0.5 } else { t.clamp(0.0, 1.0) };
    }
}
