//! RGBA canvases that bitmaps are decoded into

use std::ops::Range;

use image::{Rgba, RgbaImage};

/// A power-of-two (or flat-landscape) RGBA8 image, one packed color per texel.
///
/// Texels start fully transparent. Row 0 is uploaded first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl Canvas {
    /// Create a transparent canvas
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Packed color at a texel, `None` outside the canvas
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Mutable texels of one row; empty outside the canvas
    pub fn row_mut(&mut self, y: u32) -> &mut [u32] {
        let width = self.width as usize;
        let start = y as usize * width;
        self.pixels.get_mut(start..start + width).unwrap_or(&mut [])
    }

    /// Fill whole rows with one color
    pub fn fill_rows(&mut self, rows: Range<u32>, color: u32) {
        for y in rows {
            self.row_mut(y).fill(color);
        }
    }

    /// Bytes in R, G, B, A order
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|p| p.to_be_bytes()).collect()
    }

    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            Rgba(self.pixel(x, y).unwrap_or(0).to_be_bytes())
        })
    }

    pub fn from_image(image: &RgbaImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            pixels: image.pixels().map(|p| u32::from_be_bytes(p.0)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_canvas_is_transparent() {
        let canvas = Canvas::new(4, 2);
        assert_eq!(canvas.pixels().len(), 8);
        assert!(canvas.pixels().iter().all(|&p| p == 0));
        assert_eq!(canvas.pixel(4, 0), None);
    }

    #[test]
    fn test_rows() {
        let mut canvas = Canvas::new(2, 3);
        canvas.fill_rows(1..3, 0x1122_33ff);
        canvas.row_mut(0)[1] = 0xaabb_ccdd;
        assert!(canvas.row_mut(3).is_empty());

        assert_eq!(canvas.pixel(0, 0), Some(0));
        assert_eq!(canvas.pixel(1, 0), Some(0xaabb_ccdd));
        assert_eq!(canvas.pixel(0, 2), Some(0x1122_33ff));
    }

    #[test]
    fn test_byte_order() {
        let mut canvas = Canvas::new(1, 1);
        canvas.row_mut(0)[0] = 0x1122_3344;
        assert_eq!(canvas.to_rgba_bytes(), vec![0x11, 0x22, 0x33, 0x44]);

        let image = canvas.to_image();
        assert_eq!(image.get_pixel(0, 0).0, [0x11, 0x22, 0x33, 0x44]);
        assert_eq!(Canvas::from_image(&image), canvas);
    }
}
