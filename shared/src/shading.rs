//! Shading tables
//!
//! The software renderer simulated lighting with a stack of palette slices,
//! one per illumination level. Slice 0 is the darkest; the last slice is the
//! fully lit palette. Each slice maps all 256 palette indices to packed colors.

use crate::ShapeError;

/// Palette entries per shading table
pub const SHADING_TABLE_ENTRIES: usize = 256;

/// Packed color layout of shading-table entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadingDepth {
    /// 16-bit big-endian words, 1-5-5-5 ARGB
    Rgb555,
    /// 32-bit ARGB bytes, 8-8-8-8
    Argb8888,
}

impl ShadingDepth {
    /// Map a bit depth (16 or 32) to its entry layout
    pub fn from_bit_depth(bits: u8) -> Option<Self> {
        match bits {
            16 => Some(ShadingDepth::Rgb555),
            32 => Some(ShadingDepth::Argb8888),
            _ => None,
        }
    }

    pub fn bytes_per_entry(self) -> usize {
        match self {
            ShadingDepth::Rgb555 => 2,
            ShadingDepth::Argb8888 => 4,
        }
    }
}

/// A collection's shading tables for one color table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadingTables {
    depth: ShadingDepth,
    table_count: usize,
    data: Vec<u8>,
}

impl ShadingTables {
    pub fn new(depth: ShadingDepth, table_count: usize, data: Vec<u8>) -> Result<Self, ShapeError> {
        if table_count == 0 {
            return Err(ShapeError::NoShadingTables);
        }
        let expected = table_count * SHADING_TABLE_ENTRIES * depth.bytes_per_entry();
        if data.len() != expected {
            return Err(ShapeError::ShadingTableSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            depth,
            table_count,
            data,
        })
    }

    pub fn depth(&self) -> ShadingDepth {
        self.depth
    }

    pub fn table_count(&self) -> usize {
        self.table_count
    }

    /// Raw bytes of one illumination level
    pub fn table(&self, index: usize) -> Option<&[u8]> {
        let size = SHADING_TABLE_ENTRIES * self.depth.bytes_per_entry();
        self.data.get(index * size..(index + 1) * size)
    }

    /// Least illuminated slice
    pub fn darkest(&self) -> &[u8] {
        &self.data[..SHADING_TABLE_ENTRIES * self.depth.bytes_per_entry()]
    }

    /// Fully illuminated slice
    pub fn brightest(&self) -> &[u8] {
        let size = SHADING_TABLE_ENTRIES * self.depth.bytes_per_entry();
        &self.data[(self.table_count - 1) * size..]
    }
}
