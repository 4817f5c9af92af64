//! Pushing finished canvases to the backend

use aleph_core::{GpuTextureId, ImageUpload, SamplerParams, TextureBackend, TextureBlend, WrapMode};
use aleph_shared::TextureCategory;
use anyhow::Context;
use tracing::trace;

use crate::canvas::Canvas;
use crate::type_config::TextureTypeInfo;

/// Wrapping along u and v for a category
pub fn wrap_modes(category: TextureCategory) -> (WrapMode, WrapMode) {
    match category {
        TextureCategory::Wall => (WrapMode::Repeat, WrapMode::Repeat),
        TextureCategory::Landscape => (WrapMode::Repeat, WrapMode::Clamp),
        TextureCategory::Inhabitant | TextureCategory::WeaponInHand | TextureCategory::None => {
            (WrapMode::Clamp, WrapMode::Clamp)
        }
    }
}

/// Upload a canvas to the bound texture and set its sampling and blend state.
///
/// Overlaid (glow) layers use decal blending.
pub fn place_texture<B: TextureBackend>(
    backend: &mut B,
    id: GpuTextureId,
    canvas: &Canvas,
    category: TextureCategory,
    info: &TextureTypeInfo,
    overlaid: bool,
) -> anyhow::Result<()> {
    let pixels = canvas.to_rgba_bytes();
    let image = ImageUpload {
        width: canvas.width(),
        height: canvas.height(),
        format: info.color_format,
        pixels: &pixels,
    };

    let uploaded = if info.far_filter.is_mipmapped() {
        backend.upload_mipmapped(id, &image)
    } else {
        backend.upload_image(id, &image)
    };
    uploaded.with_context(|| format!("uploading {}x{} texture", image.width, image.height))?;

    let (wrap_u, wrap_v) = wrap_modes(category);
    backend.set_sampling(
        id,
        &SamplerParams {
            mag_filter: info.near_filter,
            min_filter: info.far_filter,
            wrap_u,
            wrap_v,
        },
    );

    let blend = if overlaid {
        TextureBlend::Decal
    } else {
        TextureBlend::Modulate
    };
    backend.set_blend(id, blend);

    trace!(
        "Placed texture {} ({}x{}, {:?})",
        id.0,
        image.width,
        image.height,
        blend
    );
    Ok(())
}
