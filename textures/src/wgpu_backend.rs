//! wgpu texture backend
//!
//! Implements [`TextureBackend`] on wgpu. Texture ids map to entries holding
//! the image, its sampler and blend mode; VRAM use is tracked per image.
//! Mip chains are built on the CPU and uploaded with the base level.

use aleph_core::{
    ColorFormat, FarFilter, GpuTextureId, ImageUpload, NearFilter, SamplerParams,
    TextureBackend, TextureBlend, WrapMode,
};
use anyhow::Result;
use hashbrown::HashMap;
use image::RgbaImage;
use image::imageops::{self, FilterType};
use wgpu::util::DeviceExt;

/// Uploaded image of a texture
///
/// Fields tracked for debugging and VRAM accounting.
#[allow(dead_code)]
pub(crate) struct GpuImage {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
    pub mip_levels: u32,
    /// Size in bytes of every level (for VRAM tracking)
    pub size_bytes: usize,
}

/// Internal texture data
#[derive(Default)]
pub(crate) struct TextureEntry {
    pub image: Option<GpuImage>,
    pub sampler: Option<wgpu::Sampler>,
    pub blend: TextureBlend,
}

/// Texture backend on a wgpu device.
pub struct WgpuTextureBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    textures: HashMap<u32, TextureEntry>,
    next_texture_id: u32,
    vram_used: usize,
    vram_limit: Option<usize>,
    bound: GpuTextureId,
    active: bool,
}

impl WgpuTextureBackend {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self {
            device: device.clone(),
            queue: queue.clone(),
            textures: HashMap::new(),
            next_texture_id: 1, // 0 is reserved for INVALID
            vram_used: 0,
            vram_limit: None,
            bound: GpuTextureId::INVALID,
            active: true,
        }
    }

    /// Refuse uploads that would take VRAM use past `limit` bytes
    pub fn with_vram_limit(mut self, limit: usize) -> Self {
        self.vram_limit = Some(limit);
        self
    }

    /// Mark the device lost or restored
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Texture bound for the next draw
    pub fn bound_texture(&self) -> GpuTextureId {
        self.bound
    }

    pub fn texture_view(&self, id: GpuTextureId) -> Option<&wgpu::TextureView> {
        self.textures
            .get(&id.0)
            .and_then(|t| t.image.as_ref())
            .map(|image| &image.view)
    }

    pub fn sampler(&self, id: GpuTextureId) -> Option<&wgpu::Sampler> {
        self.textures.get(&id.0).and_then(|t| t.sampler.as_ref())
    }

    pub fn blend(&self, id: GpuTextureId) -> Option<TextureBlend> {
        self.textures.get(&id.0).map(|t| t.blend)
    }

    /// Get VRAM usage in bytes
    pub fn vram_used(&self) -> usize {
        self.vram_used
    }

    /// Number of live texture objects
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    fn upload(&mut self, id: GpuTextureId, image: &ImageUpload<'_>, mipmapped: bool) -> Result<()> {
        let (width, height) = (image.width, image.height);
        let expected_size = width as usize * height as usize * 4;
        if width == 0 || height == 0 {
            anyhow::bail!("Empty texture image: {}x{}", width, height);
        }
        if image.pixels.len() != expected_size {
            anyhow::bail!(
                "Pixel data size mismatch: expected {} bytes, got {}",
                expected_size,
                image.pixels.len()
            );
        }
        let old_size = match self.textures.get(&id.0) {
            Some(entry) => entry.image.as_ref().map_or(0, |image| image.size_bytes),
            None => anyhow::bail!("Upload to unknown texture {}", id.0),
        };

        let Some(base) = RgbaImage::from_raw(width, height, image.pixels.to_vec()) else {
            anyhow::bail!("Pixel data does not form a {}x{} image", width, height);
        };
        let levels = if mipmapped {
            mip_chain(base)
        } else {
            vec![base]
        };
        let mut data: Vec<u8> = levels.iter().flat_map(|level| level.as_raw()).copied().collect();
        quantize(&mut data, image.format);
        let size_bytes = data.len();

        // Check VRAM budget
        let vram_after = self.vram_used - old_size + size_bytes;
        if let Some(limit) = self.vram_limit
            && vram_after > limit
        {
            anyhow::bail!(
                "VRAM budget exceeded: {} + {} > {} bytes",
                self.vram_used - old_size,
                size_bytes,
                limit
            );
        }

        let mip_levels = levels.len() as u32;
        let texture = self.device.create_texture_with_data(
            &self.queue,
            &wgpu::TextureDescriptor {
                label: Some("Shape Texture"),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: mip_levels,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &data,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        if let Some(entry) = self.textures.get_mut(&id.0) {
            entry.image = Some(GpuImage {
                texture,
                view,
                width,
                height,
                mip_levels,
                size_bytes,
            });
        }
        self.vram_used = vram_after;

        tracing::debug!(
            "Uploaded texture {}: {}x{}, {} levels, {} bytes (VRAM: {})",
            id.0,
            width,
            height,
            mip_levels,
            size_bytes,
            self.vram_used
        );
        Ok(())
    }
}

impl TextureBackend for WgpuTextureBackend {
    fn is_active(&self) -> bool {
        self.active
    }

    fn generate_texture(&mut self) -> GpuTextureId {
        let id = GpuTextureId(self.next_texture_id);
        self.next_texture_id += 1;
        self.textures.insert(id.0, TextureEntry::default());
        id
    }

    fn delete_texture(&mut self, id: GpuTextureId) {
        let Some(entry) = self.textures.remove(&id.0) else {
            tracing::warn!("Deleting unknown texture {}", id.0);
            return;
        };
        if let Some(image) = entry.image {
            self.vram_used -= image.size_bytes;
            image.texture.destroy();
        }
        if self.bound == id {
            self.bound = GpuTextureId::INVALID;
        }
    }

    fn bind_texture(&mut self, id: GpuTextureId) {
        if !self.textures.contains_key(&id.0) {
            tracing::warn!("Binding unknown texture {}", id.0);
        }
        self.bound = id;
    }

    fn upload_image(&mut self, id: GpuTextureId, image: &ImageUpload<'_>) -> Result<()> {
        self.upload(id, image, false)
    }

    fn upload_mipmapped(&mut self, id: GpuTextureId, image: &ImageUpload<'_>) -> Result<()> {
        self.upload(id, image, true)
    }

    fn set_sampling(&mut self, id: GpuTextureId, params: &SamplerParams) {
        let sampler = self.device.create_sampler(&sampler_descriptor(params));
        match self.textures.get_mut(&id.0) {
            Some(entry) => entry.sampler = Some(sampler),
            None => tracing::warn!("Sampling set on unknown texture {}", id.0),
        }
    }

    fn set_blend(&mut self, id: GpuTextureId, blend: TextureBlend) {
        match self.textures.get_mut(&id.0) {
            Some(entry) => entry.blend = blend,
            None => tracing::warn!("Blend set on unknown texture {}", id.0),
        }
    }
}

/// Halve an image down to 1x1, base level first
pub fn mip_chain(base: RgbaImage) -> Vec<RgbaImage> {
    let mut levels = vec![base];
    while let Some(last) = levels.last() {
        let (width, height) = last.dimensions();
        if width == 1 && height == 1 {
            break;
        }
        let next = imageops::resize(
            last,
            (width / 2).max(1),
            (height / 2).max(1),
            FilterType::Triangle,
        );
        levels.push(next);
    }
    levels
}

/// Reduce RGBA8 bytes to the precision of a stored color format
pub fn quantize(pixels: &mut [u8], format: ColorFormat) {
    match format {
        ColorFormat::Rgba8 => {}
        ColorFormat::Rgb5A1 => {
            for texel in pixels.chunks_exact_mut(4) {
                for channel in &mut texel[..3] {
                    let c = *channel >> 3;
                    *channel = (c << 3) | (c >> 2);
                }
                texel[3] = if texel[3] >= 0x80 { 0xff } else { 0 };
            }
        }
        ColorFormat::Rgba2 => {
            for channel in pixels.iter_mut() {
                *channel = (*channel >> 6) * 0x55;
            }
        }
    }
}

fn address_mode(wrap: WrapMode) -> wgpu::AddressMode {
    match wrap {
        WrapMode::Repeat => wgpu::AddressMode::Repeat,
        WrapMode::Clamp => wgpu::AddressMode::ClampToEdge,
    }
}

fn mag_filter_mode(filter: NearFilter) -> wgpu::FilterMode {
    match filter {
        NearFilter::Nearest => wgpu::FilterMode::Nearest,
        NearFilter::Linear => wgpu::FilterMode::Linear,
    }
}

/// Minification and mipmap filters for a far filter choice
fn min_filter_modes(filter: FarFilter) -> (wgpu::FilterMode, wgpu::FilterMode) {
    use wgpu::FilterMode::{Linear, Nearest};
    match filter {
        FarFilter::Nearest | FarFilter::NearestMipmapNearest => (Nearest, Nearest),
        FarFilter::Linear | FarFilter::LinearMipmapNearest => (Linear, Nearest),
        FarFilter::NearestMipmapLinear => (Nearest, Linear),
        FarFilter::LinearMipmapLinear => (Linear, Linear),
    }
}

pub fn sampler_descriptor(params: &SamplerParams) -> wgpu::SamplerDescriptor<'static> {
    let (min_filter, mipmap_filter) = min_filter_modes(params.min_filter);
    wgpu::SamplerDescriptor {
        label: Some("Shape Sampler"),
        address_mode_u: address_mode(params.wrap_u),
        address_mode_v: address_mode(params.wrap_v),
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: mag_filter_mode(params.mag_filter),
        min_filter,
        mipmap_filter,
        ..Default::default()
    }
}
