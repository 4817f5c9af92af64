//! Graphics backend primitives consumed by the texture pipeline
//!
//! The pipeline never talks to a graphics API directly. It allocates and
//! releases texture objects, binds them, and pushes finished RGBA8 images
//! through this trait; a backend decides how those map onto real GPU calls.

use crate::config::{ColorFormat, FarFilter, NearFilter};

/// Handle to a backend texture object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GpuTextureId(pub u32);

impl GpuTextureId {
    /// Invalid/null texture handle
    pub const INVALID: GpuTextureId = GpuTextureId(0);
}

/// Texture coordinate wrapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
    /// Tile the texture
    #[default]
    Repeat,
    /// Clamp to the edge texels
    Clamp,
}

/// How a texture combines with what is beneath it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureBlend {
    /// Base layer: texture modulated by the vertex color
    #[default]
    Modulate,
    /// Overlay layer: texture drawn over the base by its alpha
    Decal,
}

/// Sampling state for a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SamplerParams {
    pub mag_filter: NearFilter,
    pub min_filter: FarFilter,
    pub wrap_u: WrapMode,
    pub wrap_v: WrapMode,
}

/// A finished RGBA8 image (R, G, B, A byte order, bottom row first)
#[derive(Debug, Clone, Copy)]
pub struct ImageUpload<'a> {
    pub width: u32,
    pub height: u32,
    /// Storage precision requested for the texture
    pub format: ColorFormat,
    pub pixels: &'a [u8],
}

/// Texture primitives of a graphics API.
///
/// All calls happen on the render thread.
pub trait TextureBackend {
    /// Whether the graphics context exists; texture calls are invalid otherwise
    fn is_active(&self) -> bool;

    /// Create a texture object with no image
    fn generate_texture(&mut self) -> GpuTextureId;

    /// Release a texture object and its image
    fn delete_texture(&mut self, id: GpuTextureId);

    /// Make a texture current for drawing
    fn bind_texture(&mut self, id: GpuTextureId);

    /// Upload a single-level image
    fn upload_image(&mut self, id: GpuTextureId, image: &ImageUpload<'_>) -> anyhow::Result<()>;

    /// Upload an image and build its full mip chain
    fn upload_mipmapped(&mut self, id: GpuTextureId, image: &ImageUpload<'_>)
    -> anyhow::Result<()>;

    /// Set filtering and wrapping
    fn set_sampling(&mut self, id: GpuTextureId, params: &SamplerParams);

    /// Set the texture environment blend
    fn set_blend(&mut self, id: GpuTextureId, blend: TextureBlend);
}
