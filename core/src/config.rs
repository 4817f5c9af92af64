//! Renderer texture configuration (`textures.toml`)
//!
//! Per-texture-type filter, resolution and color-format choices, flat
//! landscape colors, opacity options and infravision tints.
//! Option choices are stored as raw indices into fixed option lists, so a
//! configuration written by a newer build still loads: unknown indices fall
//! back to safe defaults when the texture subsystem starts.

use std::path::Path;

use aleph_shared::{CollectionId, Rgb16, TextureCategory};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Texture configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Per-texture-type settings
    #[serde(default)]
    pub textures: TextureTypeConfigs,
    /// Replace landscape bitmaps with two flat colors (default: false)
    #[serde(default)]
    pub flat_landscapes: bool,
    /// Land and sky colors for each landscape context
    #[serde(default = "default_landscape_colors")]
    pub landscape_colors: Vec<LandscapeColors>,
    /// Landscape height as a power-of-two fraction of its width (default: 1)
    #[serde(default = "default_aspect_exponent")]
    pub landscape_aspect_exponent: i32,
    /// Opacity options
    #[serde(default)]
    pub opacity: OpacityConfig,
    /// Infravision tints applied at startup
    #[serde(default)]
    pub infravision: Vec<InfravisionTintConfig>,
}

/// Raw option indices for the four texture types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureTypeConfigs {
    #[serde(default = "default_wall")]
    pub wall: TextureTypeConfig,
    #[serde(default = "default_landscape")]
    pub landscape: TextureTypeConfig,
    #[serde(default = "default_sprite")]
    pub inhabitant: TextureTypeConfig,
    #[serde(default = "default_sprite")]
    pub weapons_in_hand: TextureTypeConfig,
}

impl TextureTypeConfigs {
    pub fn get(&self, category: TextureCategory) -> Option<&TextureTypeConfig> {
        match category {
            TextureCategory::Wall => Some(&self.wall),
            TextureCategory::Landscape => Some(&self.landscape),
            TextureCategory::Inhabitant => Some(&self.inhabitant),
            TextureCategory::WeaponInHand => Some(&self.weapons_in_hand),
            TextureCategory::None => None,
        }
    }
}

/// Option indices for one texture type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureTypeConfig {
    /// Index into [`NearFilter`] options
    #[serde(default)]
    pub near_filter: u8,
    /// Index into [`FarFilter`] options
    #[serde(default)]
    pub far_filter: u8,
    /// Downscale exponent: 0 is full size, 1 half size, 2 quarter size
    #[serde(default)]
    pub resolution: u8,
    /// Index into [`ColorFormat`] options
    #[serde(default)]
    pub color_format: u8,
}

/// Land and sky colors for one landscape context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandscapeColors {
    pub land: Rgb16,
    pub sky: Rgb16,
}

/// Opacity options: a default plus per-collection overrides
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OpacityConfig {
    #[serde(default)]
    pub default: TextureOptions,
    #[serde(default)]
    pub collections: Vec<CollectionOptions>,
}

/// Opacity override for a collection, optionally narrowed to one color table
/// and bitmap
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollectionOptions {
    pub collection: u8,
    /// Every color table when unset
    #[serde(default)]
    pub clut: Option<u8>,
    /// Every bitmap when unset
    #[serde(default)]
    pub bitmap: Option<usize>,
    #[serde(flatten)]
    pub options: TextureOptions,
}

/// Rendering options for a texture
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextureOptions {
    #[serde(default)]
    pub opacity_type: OpacityType,
    #[serde(default = "default_opacity_scale")]
    pub opacity_scale: f32,
    #[serde(default)]
    pub opacity_shift: f32,
}

impl Default for TextureOptions {
    fn default() -> Self {
        Self {
            opacity_type: OpacityType::Crisp,
            opacity_scale: default_opacity_scale(),
            opacity_shift: 0.0,
        }
    }
}

/// How a color's opacity is derived from its channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpacityType {
    /// Palette opacity is kept as is
    #[default]
    Crisp,
    /// Mean of red, green and blue
    Average,
    /// Brightest of red, green and blue
    Max,
}

/// Infravision tint for one collection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InfravisionTintConfig {
    pub collection: u8,
    #[serde(default)]
    pub tinted: bool,
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

/// Magnification filter choices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NearFilter {
    #[default]
    Nearest,
    Linear,
}

impl NearFilter {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(NearFilter::Nearest),
            1 => Some(NearFilter::Linear),
            _ => None,
        }
    }
}

/// Minification filter choices; the mipmap variants imply a mip chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FarFilter {
    #[default]
    Nearest,
    Linear,
    NearestMipmapNearest,
    LinearMipmapNearest,
    NearestMipmapLinear,
    LinearMipmapLinear,
}

impl FarFilter {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(FarFilter::Nearest),
            1 => Some(FarFilter::Linear),
            2 => Some(FarFilter::NearestMipmapNearest),
            3 => Some(FarFilter::LinearMipmapNearest),
            4 => Some(FarFilter::NearestMipmapLinear),
            5 => Some(FarFilter::LinearMipmapLinear),
            _ => None,
        }
    }

    pub fn is_mipmapped(self) -> bool {
        !matches!(self, FarFilter::Nearest | FarFilter::Linear)
    }
}

/// Stored GPU color format choices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorFormat {
    #[default]
    Rgba8,
    Rgb5A1,
    Rgba2,
}

impl ColorFormat {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(ColorFormat::Rgba8),
            1 => Some(ColorFormat::Rgb5A1),
            2 => Some(ColorFormat::Rgba2),
            _ => None,
        }
    }
}

fn default_wall() -> TextureTypeConfig {
    TextureTypeConfig {
        near_filter: 1,
        far_filter: 5,
        resolution: 0,
        color_format: 0,
    }
}
fn default_landscape() -> TextureTypeConfig {
    TextureTypeConfig {
        near_filter: 1,
        far_filter: 1,
        resolution: 0,
        color_format: 0,
    }
}
fn default_sprite() -> TextureTypeConfig {
    TextureTypeConfig {
        near_filter: 1,
        far_filter: 5,
        resolution: 0,
        color_format: 0,
    }
}

/// Day, night, moon and outer space
fn default_landscape_colors() -> Vec<LandscapeColors> {
    vec![
        LandscapeColors {
            land: Rgb16::new(0x4000, 0x3000, 0x2000),
            sky: Rgb16::new(0x8000, 0xc000, 0xffff),
        },
        LandscapeColors {
            land: Rgb16::new(0x1000, 0x1000, 0x1800),
            sky: Rgb16::new(0x0800, 0x0800, 0x3000),
        },
        LandscapeColors {
            land: Rgb16::new(0x6000, 0x6000, 0x6000),
            sky: Rgb16::new(0x0000, 0x0000, 0x0000),
        },
        LandscapeColors {
            land: Rgb16::new(0x0000, 0x0000, 0x0000),
            sky: Rgb16::new(0x0000, 0x0000, 0x0000),
        },
    ]
}
fn default_aspect_exponent() -> i32 {
    1
}
fn default_opacity_scale() -> f32 {
    1.0
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            textures: TextureTypeConfigs::default(),
            flat_landscapes: false,
            landscape_colors: default_landscape_colors(),
            landscape_aspect_exponent: default_aspect_exponent(),
            opacity: OpacityConfig::default(),
            infravision: Vec::new(),
        }
    }
}

impl Default for TextureTypeConfigs {
    fn default() -> Self {
        Self {
            wall: default_wall(),
            landscape: default_landscape(),
            inhabitant: default_sprite(),
            weapons_in_hand: default_sprite(),
        }
    }
}

impl RenderConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load a configuration file, falling back to defaults if it is missing or broken.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Using default texture config ({}): {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Rendering options for a bitmap.
    ///
    /// The most specific matching override wins; among equally specific ones,
    /// the last listed.
    pub fn texture_options(
        &self,
        collection: CollectionId,
        clut: u8,
        bitmap: usize,
    ) -> &TextureOptions {
        self.opacity
            .collections
            .iter()
            .filter(|entry| {
                entry.collection as usize == collection.index()
                    && entry.clut.is_none_or(|c| c == clut)
                    && entry.bitmap.is_none_or(|b| b == bitmap)
            })
            .max_by_key(|entry| entry.clut.is_some() as u8 + entry.bitmap.is_some() as u8)
            .map(|entry| &entry.options)
            .unwrap_or(&self.opacity.default)
    }

    /// Land and sky colors for a landscape context, if configured
    pub fn landscape_colors(&self, context: usize) -> Option<LandscapeColors> {
        self.landscape_colors.get(context).copied()
    }
}
