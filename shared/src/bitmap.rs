//! Paletted shape bitmaps
//!
//! Bitmaps store 8-bit palette indices one scanline at a time. A scanline is a
//! row for row-major bitmaps and a column for column-major ones.
//!
//! # Strip encoding
//!
//! Bitmaps without a fixed row stride store each scanline sparsely:
//! ```text
//! 0x00: first u16 (big-endian) - first stored pixel position
//! 0x02: last  u16 (big-endian) - one past the last stored pixel
//! 0x04: pixels (last - first bytes)
//! ```

use crate::ShapeError;

/// Header preceding every strip-encoded scanline (4 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripHeader {
    pub first: u16,
    pub last: u16,
}

impl StripHeader {
    pub const SIZE: usize = 4;

    pub fn new(first: u16, last: u16) -> Self {
        Self { first, last }
    }

    /// Number of pixel bytes following the header
    pub fn span(&self) -> usize {
        self.last.saturating_sub(self.first) as usize
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..2].copy_from_slice(&self.first.to_be_bytes());
        bytes[2..4].copy_from_slice(&self.last.to_be_bytes());
        bytes
    }

    /// Read header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            first: u16::from_be_bytes([bytes[0], bytes[1]]),
            last: u16::from_be_bytes([bytes[2], bytes[3]]),
        })
    }
}

/// An 8-bit paletted bitmap as supplied by the shapes file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u16,
    height: u16,
    column_order: bool,
    /// `None` for strip-encoded bitmaps
    bytes_per_row: Option<u16>,
    data: Vec<u8>,
    /// Byte offset of each scanline within `data`
    scanline_offsets: Vec<usize>,
}

impl Bitmap {
    /// Create a bitmap whose scanlines are stored at a fixed stride.
    ///
    /// `bytes_per_row` normally equals the scanline length; a different stride is
    /// accepted here and rejected later, when the bitmap is sized for a texture.
    pub fn with_stride(
        width: u16,
        height: u16,
        column_order: bool,
        bytes_per_row: u16,
        data: Vec<u8>,
    ) -> Result<Self, ShapeError> {
        if width == 0 || height == 0 {
            return Err(ShapeError::EmptyBitmap { width, height });
        }
        let count = scanline_count(width, height, column_order);
        let expected = count * bytes_per_row as usize;
        if data.len() < expected {
            return Err(ShapeError::PixelDataTooShort {
                expected,
                actual: data.len(),
            });
        }
        let scanline_offsets = (0..count).map(|i| i * bytes_per_row as usize).collect();
        Ok(Self {
            width,
            height,
            column_order,
            bytes_per_row: Some(bytes_per_row),
            data,
            scanline_offsets,
        })
    }

    /// Create a row-major bitmap with one byte per pixel and no padding
    pub fn from_rows(width: u16, height: u16, data: Vec<u8>) -> Result<Self, ShapeError> {
        Self::with_stride(width, height, false, width, data)
    }

    /// Create a strip-encoded bitmap from its scanlines laid out back to back.
    pub fn strip_encoded(
        width: u16,
        height: u16,
        column_order: bool,
        data: Vec<u8>,
    ) -> Result<Self, ShapeError> {
        if width == 0 || height == 0 {
            return Err(ShapeError::EmptyBitmap { width, height });
        }
        let count = scanline_count(width, height, column_order);
        let mut scanline_offsets = Vec::with_capacity(count);
        let mut offset = 0usize;
        for scanline in 0..count {
            let header = StripHeader::from_bytes(&data[offset.min(data.len())..])
                .ok_or(ShapeError::TruncatedStrip { scanline })?;
            if header.last < header.first {
                return Err(ShapeError::InvertedStrip {
                    scanline,
                    first: header.first,
                    last: header.last,
                });
            }
            let end = offset + StripHeader::SIZE + header.span();
            if end > data.len() {
                return Err(ShapeError::TruncatedStrip { scanline });
            }
            scanline_offsets.push(offset);
            offset = end;
        }
        Ok(Self {
            width,
            height,
            column_order,
            bytes_per_row: None,
            data,
            scanline_offsets,
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn is_column_order(&self) -> bool {
        self.column_order
    }

    /// Declared row stride; `None` means strip-encoded scanlines
    pub fn bytes_per_row(&self) -> Option<u16> {
        self.bytes_per_row
    }

    pub fn is_strip_encoded(&self) -> bool {
        self.bytes_per_row.is_none()
    }

    /// Pixels per scanline (the texture's horizontal extent)
    pub fn scanline_length(&self) -> u16 {
        if self.column_order {
            self.height
        } else {
            self.width
        }
    }

    /// Number of scanlines (the texture's vertical extent)
    pub fn scanline_count(&self) -> usize {
        self.scanline_offsets.len()
    }

    /// Raw bytes of a scanline, including the strip header when strip-encoded.
    pub fn scanline(&self, index: usize) -> Option<&[u8]> {
        let start = *self.scanline_offsets.get(index)?;
        let end = match self.bytes_per_row {
            Some(stride) => start + stride as usize,
            None => self
                .scanline_offsets
                .get(index + 1)
                .copied()
                .unwrap_or(self.data.len()),
        };
        self.data.get(start..end)
    }
}

fn scanline_count(width: u16, height: u16, column_order: bool) -> usize {
    if column_order {
        width as usize
    } else {
        height as usize
    }
}
