//! Load-time downscaling for reduced texture resolutions

use image::imageops::{self, FilterType};

use crate::canvas::Canvas;

/// Size a canvas is stored at: each axis halved `resolution` times, at least 1
pub fn loaded_size(width: u32, height: u32, resolution: u8) -> (u32, u32) {
    let shrink = |size: u32| size.checked_shr(resolution as u32).unwrap_or(0).max(1);
    (shrink(width), shrink(height))
}

/// Resample a canvas to a smaller size
pub fn shrink(canvas: &Canvas, width: u32, height: u32) -> Canvas {
    if (canvas.width(), canvas.height()) == (width, height) {
        return canvas.clone();
    }
    let resized = imageops::resize(&canvas.to_image(), width, height, FilterType::Triangle);
    Canvas::from_image(&resized)
}
