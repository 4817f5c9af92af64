//! Palette to RGBA color tables
//!
//! Every bitmap is decoded through a 256-entry table of packed colors. The
//! normal table comes from the brightest shading table; a second glow table
//! keeps the self-luminous entries (those still lit in the darkest shading
//! table) so they can be drawn over the lit surface at full brightness.
//!
//! Entry 0 is the transparent color for everything but landscapes.

use aleph_core::{OpacityType, TextureOptions};
use aleph_shared::{
    ColorTableVariant, SHADING_TABLE_ENTRIES, ShadingDepth, ShadingTables, TextureCategory,
};

use crate::color::{
    ALPHA_MASK, COLOR_MASK, OPAQUE_BLACK, alpha_from_opacity, expand_rgb555, pack_rgba8,
    rgb_channels,
};

/// 256 packed 0xRRGGBBAA colors, indexed by palette index
pub type ColorTable = [u32; SHADING_TABLE_ENTRIES];

/// Entries whose darkest shade still has any of these bits set are self-luminous
const GLOW_MASK: u32 = 0xf0f0_f000;

/// Glow entries keep half alpha until opacity is applied
const GLOW_ALPHA: u32 = 0x80;

/// Normal and glow tables for one bitmap instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorTables {
    pub normal: ColorTable,
    pub glow: ColorTable,
    /// Whether any entry glows; the glow table is unused otherwise
    pub is_glowing: bool,
}

impl ColorTables {
    /// Opaque black everywhere but the transparent entry 0
    pub fn silhouette() -> Self {
        let mut normal = [OPAQUE_BLACK; SHADING_TABLE_ENTRIES];
        normal[0] = 0;
        Self {
            normal,
            glow: [0; SHADING_TABLE_ENTRIES],
            is_glowing: false,
        }
    }
}

/// Expand one shading table to packed RGBA8 colors.
///
/// Missing entries (short input) stay transparent black.
pub fn expand_shading_table(depth: ShadingDepth, bytes: &[u8]) -> ColorTable {
    let mut table = [0u32; SHADING_TABLE_ENTRIES];
    let entries = bytes.chunks_exact(depth.bytes_per_entry());
    for (entry, raw) in table.iter_mut().zip(entries) {
        *entry = match depth {
            ShadingDepth::Rgb555 => expand_rgb555(u16::from_be_bytes([raw[0], raw[1]])),
            // Stored as A, R, G, B bytes; source alpha is ignored
            ShadingDepth::Argb8888 => pack_rgba8(raw[1], raw[2], raw[3], 0xff),
        };
    }
    table
}

/// Builds the color tables a bitmap instance is decoded with.
#[derive(Debug, Clone, Copy)]
pub struct ColorTableBuilder<'a> {
    pub category: TextureCategory,
    /// Shadeless polygons draw with the darkest shading table
    pub shadeless: bool,
    pub options: &'a TextureOptions,
}

impl ColorTableBuilder<'_> {
    /// Tables for a variant.
    ///
    /// Returns `None` when a palette variant has no shading tables to draw from.
    pub fn build(
        &self,
        variant: ColorTableVariant,
        tables: Option<&ShadingTables>,
    ) -> Option<ColorTables> {
        match variant {
            ColorTableVariant::Silhouette => Some(ColorTables::silhouette()),
            ColorTableVariant::Normal { .. } | ColorTableVariant::Infravision => {
                tables.map(|tables| self.from_shading(tables))
            }
        }
    }

    fn from_shading(&self, tables: &ShadingTables) -> ColorTables {
        let is_landscape = self.category == TextureCategory::Landscape;
        let depth = tables.depth();
        let lit = if self.shadeless {
            tables.darkest()
        } else {
            tables.brightest()
        };
        let mut normal = expand_shading_table(depth, lit);
        let mut glow = [0u32; SHADING_TABLE_ENTRIES];
        let mut is_glowing = false;

        if !self.shadeless && !is_landscape {
            let darkest = expand_shading_table(depth, tables.darkest());
            for k in 1..SHADING_TABLE_ENTRIES {
                if darkest[k] & GLOW_MASK != 0 {
                    is_glowing = true;
                    glow[k] = (normal[k] & COLOR_MASK) | GLOW_ALPHA;
                } else {
                    glow[k] = normal[k] & COLOR_MASK;
                }
            }
        }

        if !is_landscape && self.options.opacity_type != OpacityType::Crisp {
            for k in 1..SHADING_TABLE_ENTRIES {
                let entry = normal[k];
                if entry & ALPHA_MASK == 0 {
                    continue;
                }
                let opacity = (opacity_of(entry, self.options.opacity_type)
                    * self.options.opacity_scale
                    + self.options.opacity_shift)
                    .clamp(0.0, 1.0);

                let color = entry & COLOR_MASK;
                if is_glowing && glow[k] & ALPHA_MASK != 0 {
                    // Split so the layered result reaches the target opacity
                    glow[k] = (glow[k] & COLOR_MASK) | alpha_from_opacity(opacity / 2.0);
                    normal[k] = color | alpha_from_opacity(opacity / (2.0 - opacity));
                } else {
                    normal[k] = color | alpha_from_opacity(opacity);
                }
            }
        }

        if !is_landscape {
            normal[0] = 0;
            glow[0] = 0;
        }

        ColorTables {
            normal,
            glow,
            is_glowing,
        }
    }
}

fn opacity_of(color: u32, kind: OpacityType) -> f32 {
    let [r, g, b] = rgb_channels(color).map(f32::from);
    match kind {
        OpacityType::Crisp => 1.0,
        OpacityType::Average => (r + g + b) / 3.0 / 255.0,
        OpacityType::Max => r.max(g).max(b) / 255.0,
    }
}
