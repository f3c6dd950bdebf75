//! Errors raised by terrain generation.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenError {
    /// A grid needs at least one sample along each axis.
    #[error("invalid grid dimensions {width}x{length}: both must be at least 1")]
    InvalidDimension { width: u32, length: u32 },
    #[error("noise scale must be positive and finite, got {0}")]
    InvalidScale(f32),
    /// The heightfield handed to the mesh builder does not match the requested grid.
    #[error("heightfield is {actual:?} but the mesh grid is {expected:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
}

pub type GenResult<T> = Result<T, GenError>;

/// Reject empty grids.
pub(crate) fn check_dimensions(width: u32, length: u32) -> GenResult<()> {
    if width == 0 || length == 0 {
        return Err(GenError::InvalidDimension { width, length });
    }
    Ok(())
}
