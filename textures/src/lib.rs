//! Aleph Textures - paletted shapes to GPU textures
//!
//! Every bitmap instance the renderer draws goes through the same stages:
//!
//! - [`geometry`] - power-of-two canvas size, placement and UV transform
//! - [`color_table`] - normal and glow color tables from shading tables
//! - [`blitter`] - palette decode of plain and strip-encoded bitmaps
//! - [`landscape`] - flat-colored landscape canvases
//! - [`rescale`] - load-time downscaling
//! - [`uploader`] - sampling, wrapping and blend state on upload
//!
//! [`TextureManager`] ties the stages together and tracks residency per
//! bitmap and color-table variant ([`residency`]). [`WgpuTextureBackend`]
//! implements the backend on wgpu.

pub mod blitter;
pub mod canvas;
pub mod color;
pub mod color_table;
pub mod geometry;
pub mod infravision;
pub mod landscape;
pub mod manager;
pub mod rescale;
pub mod residency;
pub mod type_config;
pub mod uploader;
pub mod wgpu_backend;

#[cfg(test)]
mod test_utils;

pub use canvas::Canvas;
pub use color_table::{ColorTable, ColorTableBuilder, ColorTables};
pub use geometry::{GeometryError, GeometryPlan, UvTransform, next_power_of_two};
pub use infravision::{InfravisionTint, InfravisionTinter};
pub use manager::{PreparedTexture, RenderedTexture, TextureKey, TextureManager, TextureRequest};
pub use residency::{TextureLayer, TextureResidencyCache, TextureState};
pub use type_config::{TextureTypeInfo, TypeConfigTable};
pub use wgpu_backend::WgpuTextureBackend;
