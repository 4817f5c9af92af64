//! Texture sizing
//!
//! Decides the power-of-two canvas a bitmap is decoded into, where the bitmap
//! sits inside it, and the texture-coordinate transform that maps the bitmap's
//! own [0,1] range onto that placement.
//!
//! | Category      | Canvas                                   | Offsets  |
//! |---------------|------------------------------------------|----------|
//! | Wall          | bitmap size, must already be power of 2  | 0        |
//! | Landscape     | width x (width scaled by aspect exponent)| centered |
//! | Flat landscape| 128 x 128                                | 0        |
//! | Sprites       | next power of 2 of (size + 2)            | centered |

use aleph_shared::{Bitmap, TextureCategory};
use thiserror::Error;

/// Side of the canvas used for flat-colored landscapes
pub const FLAT_LANDSCAPE_SIZE: u32 = 128;

/// Smallest power of two that is at least `n` (1 for 0), saturating at `u32::MAX`
pub fn next_power_of_two(n: u32) -> u32 {
    let mut p = 1u32;
    while p < n {
        p = p.saturating_mul(2);
    }
    p
}

/// Texture-coordinate transform: `texture = bitmap * scale + offset`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvTransform {
    pub u_scale: f64,
    pub v_scale: f64,
    pub u_offset: f64,
    pub v_offset: f64,
}

impl Default for UvTransform {
    fn default() -> Self {
        Self {
            u_scale: 1.0,
            v_scale: 1.0,
            u_offset: 0.0,
            v_offset: 0.0,
        }
    }
}

impl UvTransform {
    /// Map a bitmap-space coordinate into texture space
    pub fn apply(&self, u: f64, v: f64) -> (f64, f64) {
        (u * self.u_scale + self.u_offset, v * self.v_scale + self.v_offset)
    }

    /// Map a texture-space coordinate back into bitmap space
    pub fn invert(&self, u: f64, v: f64) -> (f64, f64) {
        ((u - self.u_offset) / self.u_scale, (v - self.v_offset) / self.v_scale)
    }
}

/// What the sizing rules need to know about a bitmap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryInput {
    /// Scanline length
    pub base_width: u32,
    /// Scanline count
    pub base_height: u32,
    /// Declared row stride, `None` when strip-encoded
    pub bytes_per_row: Option<u16>,
    pub category: TextureCategory,
    pub flat_landscape: bool,
    /// Landscape height is `width >> exponent` (or `width << -exponent`)
    pub landscape_aspect_exponent: i32,
}

impl GeometryInput {
    /// Sizing input for a bitmap; column-major bitmaps swap width and height.
    pub fn for_bitmap(
        bitmap: &Bitmap,
        category: TextureCategory,
        flat_landscape: bool,
        landscape_aspect_exponent: i32,
    ) -> Self {
        Self {
            base_width: bitmap.scanline_length() as u32,
            base_height: bitmap.scanline_count() as u32,
            bytes_per_row: bitmap.bytes_per_row(),
            category,
            flat_landscape,
            landscape_aspect_exponent,
        }
    }
}

/// Canvas size and bitmap placement for a texture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryPlan {
    pub base_width: u32,
    pub base_height: u32,
    /// Canvas width
    pub width: u32,
    /// Canvas height
    pub height: u32,
    /// Canvas column of bitmap column 0; negative when the bitmap is cropped
    pub width_offset: i32,
    /// Canvas row of bitmap row 0; negative when the bitmap is cropped
    pub height_offset: i32,
    pub uv: UvTransform,
}

/// Why a bitmap cannot be turned into a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("row stride {stride} does not match scanline length {length}")]
    StrideMismatch { stride: u16, length: u32 },

    #[error("{axis} {size} is not a power of two")]
    NotPowerOfTwo { axis: &'static str, size: u32 },

    #[error("landscape of width {width} has no height for aspect exponent {exponent}")]
    LandscapeHeight { width: u32, exponent: i32 },

    #[error("collection is not texture-mapped")]
    Untextured,
}

/// Size the canvas for a bitmap.
pub fn plan(input: &GeometryInput) -> Result<GeometryPlan, GeometryError> {
    if let Some(stride) = input.bytes_per_row
        && stride as u32 != input.base_width
    {
        return Err(GeometryError::StrideMismatch {
            stride,
            length: input.base_width,
        });
    }

    let base_width = input.base_width;
    let base_height = input.base_height;
    let mut plan = GeometryPlan {
        base_width,
        base_height,
        width: base_width,
        height: base_height,
        width_offset: 0,
        height_offset: 0,
        uv: UvTransform::default(),
    };

    match input.category {
        TextureCategory::Wall => {
            require_power_of_two("width", base_width)?;
            require_power_of_two("height", base_height)?;
        }
        TextureCategory::Landscape if input.flat_landscape => {
            plan.width = FLAT_LANDSCAPE_SIZE;
            plan.height = FLAT_LANDSCAPE_SIZE;
        }
        TextureCategory::Landscape => {
            require_power_of_two("width", base_width)?;
            let exponent = input.landscape_aspect_exponent;
            let height = if exponent >= 0 {
                base_width.checked_shr(exponent as u32).unwrap_or(0)
            } else {
                1u32.checked_shl(exponent.unsigned_abs())
                    .and_then(|factor| base_width.checked_mul(factor))
                    .unwrap_or(0)
            };
            if height == 0 {
                return Err(GeometryError::LandscapeHeight {
                    width: base_width,
                    exponent,
                });
            }
            plan.height = height;
            plan.width_offset = centered_offset(plan.width, base_width);
            plan.height_offset = centered_offset(plan.height, base_height);
        }
        TextureCategory::Inhabitant | TextureCategory::WeaponInHand => {
            plan.width = next_power_of_two(base_width + 2);
            plan.height = next_power_of_two(base_height + 2);
            plan.width_offset = centered_offset(plan.width, base_width);
            plan.height_offset = centered_offset(plan.height, base_height);
            plan.uv = UvTransform {
                u_scale: base_width as f64 / plan.width as f64,
                v_scale: base_height as f64 / plan.height as f64,
                u_offset: plan.width_offset as f64 / plan.width as f64,
                v_offset: plan.height_offset as f64 / plan.height as f64,
            };
        }
        TextureCategory::None => return Err(GeometryError::Untextured),
    }

    Ok(plan)
}

fn require_power_of_two(axis: &'static str, size: u32) -> Result<(), GeometryError> {
    if size.is_power_of_two() {
        Ok(())
    } else {
        Err(GeometryError::NotPowerOfTwo { axis, size })
    }
}

fn centered_offset(canvas: u32, base: u32) -> i32 {
    (canvas as i64 - base as i64).div_euclid(2) as i32
}
