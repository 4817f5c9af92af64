//! Resolved per-texture-type settings
//!
//! Turns the raw option indices of [`TextureTypeConfigs`] into filter and
//! format choices once, when the texture subsystem starts.

use aleph_core::config::TextureTypeConfigs;
use aleph_core::{ColorFormat, FarFilter, NearFilter, TextureTypeConfig};
use aleph_shared::TextureCategory;
use tracing::warn;

/// Filter, resolution and format for one texture type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextureTypeInfo {
    pub near_filter: NearFilter,
    pub far_filter: FarFilter,
    /// Downscale exponent applied at load time
    pub resolution: u8,
    pub color_format: ColorFormat,
}

impl TextureTypeInfo {
    /// Resolve raw option indices; unknown indices fall back to the first option.
    pub fn resolve(config: &TextureTypeConfig, name: &str) -> Self {
        let near_filter = NearFilter::from_u8(config.near_filter).unwrap_or_else(|| {
            warn!("{} textures: unknown near filter {}", name, config.near_filter);
            NearFilter::Nearest
        });
        let far_filter = FarFilter::from_u8(config.far_filter).unwrap_or_else(|| {
            warn!("{} textures: unknown far filter {}", name, config.far_filter);
            FarFilter::Nearest
        });
        let color_format = ColorFormat::from_u8(config.color_format).unwrap_or_else(|| {
            warn!("{} textures: unknown color format {}", name, config.color_format);
            ColorFormat::Rgba8
        });
        Self {
            near_filter,
            far_filter,
            resolution: config.resolution,
            color_format,
        }
    }
}

const CATEGORIES: [(TextureCategory, &str); 4] = [
    (TextureCategory::Wall, "wall"),
    (TextureCategory::Landscape, "landscape"),
    (TextureCategory::Inhabitant, "inhabitant"),
    (TextureCategory::WeaponInHand, "weapons-in-hand"),
];

/// Resolved settings for the four texture-mapped categories
#[derive(Debug, Clone, Default)]
pub struct TypeConfigTable {
    types: [TextureTypeInfo; 4],
}

impl TypeConfigTable {
    pub fn from_config(config: &TextureTypeConfigs) -> Self {
        let mut table = Self::default();
        for (slot, (category, name)) in table.types.iter_mut().zip(CATEGORIES) {
            if let Some(raw) = config.get(category) {
                *slot = TextureTypeInfo::resolve(raw, name);
            }
        }
        table
    }

    /// Settings for a category; `None` for collections that are not texture-mapped
    pub fn get(&self, category: TextureCategory) -> Option<&TextureTypeInfo> {
        CATEGORIES
            .iter()
            .position(|(c, _)| *c == category)
            .map(|i| &self.types[i])
    }
}
