//! Aleph Core - configuration and collaborator traits
//!
//! This crate holds what the texture pipeline needs from the outside world:
//!
//! - [`config`] - texture type options, flat landscape colors, opacity and
//!   infravision settings, loaded from TOML
//! - [`TextureBackend`] - graphics API texture primitives
//! - [`ShapeSource`] - read access to the loaded shapes file

pub mod backend;
pub mod config;
mod error;
pub mod source;

pub use backend::{
    GpuTextureId, ImageUpload, SamplerParams, TextureBackend, TextureBlend, WrapMode,
};
pub use config::{
    ColorFormat, FarFilter, LandscapeColors, NearFilter, OpacityType, RenderConfig,
    TextureOptions, TextureTypeConfig,
};
pub use error::ConfigError;
pub use source::ShapeSource;
