//! Bitmap decoding into canvases
//!
//! Scanlines are translated through a color table and written at the planned
//! offsets. Negative offsets crop the bitmap instead of shifting the canvas,
//! and anything a strip would write past the canvas edge is clipped.

use aleph_shared::{Bitmap, StripHeader};

use crate::canvas::Canvas;
use crate::color_table::ColorTable;
use crate::geometry::GeometryPlan;

/// Range of one axis to copy: source start, canvas start, length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    source: usize,
    canvas: usize,
    count: usize,
}

impl Span {
    fn new(offset: i32, base: u32, canvas: u32) -> Self {
        if offset >= 0 {
            Self {
                source: 0,
                canvas: offset as usize,
                count: base as usize,
            }
        } else {
            Self {
                source: offset.unsigned_abs() as usize,
                canvas: 0,
                count: canvas as usize,
            }
        }
    }
}

/// Decode a bitmap into a fresh canvas sized by `plan`.
pub fn blit(bitmap: &Bitmap, plan: &GeometryPlan, table: &ColorTable) -> Canvas {
    let mut canvas = Canvas::new(plan.width, plan.height);
    let rows = Span::new(plan.height_offset, plan.base_height, plan.height);
    let columns = Span::new(plan.width_offset, plan.base_width, plan.width);

    for h in 0..rows.count {
        let Some(line) = bitmap.scanline(rows.source + h) else {
            break;
        };
        let y = rows.canvas + h;
        if y >= plan.height as usize {
            break;
        }
        let dest = canvas.row_mut(y as u32);

        if bitmap.is_strip_encoded() {
            blit_strip(line, plan.width_offset, dest, table);
        } else {
            let source = line.get(columns.source..).unwrap_or(&[]);
            let dest = dest.get_mut(columns.canvas..).unwrap_or(&mut []);
            for (texel, &index) in dest.iter_mut().zip(source).take(columns.count) {
                *texel = table[index as usize];
            }
        }
    }

    canvas
}

/// Decode one strip-encoded scanline into a canvas row.
fn blit_strip(line: &[u8], width_offset: i32, dest: &mut [u32], table: &ColorTable) {
    let Some(header) = StripHeader::from_bytes(line) else {
        return;
    };
    let pixels = &line[StripHeader::SIZE..];
    let first = header.first as i32;
    let last = header.last as i32;

    let mut source_start = 0;
    let mut canvas_start = width_offset + first;
    if canvas_start < 0 {
        source_start = -canvas_start;
        canvas_start = 0;
    }
    let mut source_end = last - first;
    let excess = width_offset + last - dest.len() as i32;
    if excess > 0 {
        source_end -= excess;
    }
    if source_end <= source_start {
        return;
    }

    let source = pixels
        .get(source_start as usize..source_end as usize)
        .unwrap_or(&[]);
    let dest = dest.get_mut(canvas_start as usize..).unwrap_or(&mut []);
    for (texel, &index) in dest.iter_mut().zip(source) {
        *texel = table[index as usize];
    }
}
