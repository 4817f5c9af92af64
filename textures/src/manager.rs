//! Texture manager
//!
//! Drives a bitmap instance from shape descriptor to bound GPU texture:
//!
//! 1. [`TextureManager::setup`] resolves the bitmap and color-table variant.
//!    A resident variant reuses the UV transform cached on its residency
//!    record; otherwise the texture is sized and decoded into normal and glow
//!    canvases.
//! 2. [`TextureManager::render_normal`] allocates and binds the normal layer,
//!    uploading the canvas on first use.
//! 3. [`TextureManager::render_glowing`] does the same for the glow layer.
//!
//! Canvases live only as long as the [`PreparedTexture`] and
//! [`RenderedTexture`] values that carry them.

use aleph_core::{GpuTextureId, LandscapeColors, RenderConfig, ShapeSource, TextureBackend};
use aleph_shared::{
    Bitmap, CollectionId, ColorTableVariant, Rgb16, ShapeDescriptor, TextureCategory,
    TransferMode,
};
use tracing::{debug, trace, warn};

use crate::blitter;
use crate::canvas::Canvas;
use crate::color_table::ColorTableBuilder;
use crate::geometry::{self, GeometryInput, GeometryPlan, UvTransform};
use crate::infravision::InfravisionTinter;
use crate::landscape;
use crate::rescale;
use crate::residency::{TextureLayer, TextureResidencyCache};
use crate::type_config::{TextureTypeInfo, TypeConfigTable};
use crate::uploader;

/// A bitmap instance to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureRequest {
    pub shape: ShapeDescriptor,
    pub transfer_mode: TransferMode,
    /// Drawn at full brightness regardless of lighting
    pub shadeless: bool,
    /// Index into the configured landscape colors
    pub landscape_context: usize,
    /// Overrides the configured landscape aspect exponent
    pub landscape_aspect_exponent: Option<i32>,
}

impl TextureRequest {
    pub fn new(shape: ShapeDescriptor) -> Self {
        Self {
            shape,
            transfer_mode: TransferMode::Normal,
            shadeless: false,
            landscape_context: 0,
            landscape_aspect_exponent: None,
        }
    }
}

/// Identifies one resident texture pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureKey {
    pub collection: CollectionId,
    pub bitmap: usize,
    pub variant: ColorTableVariant,
}

#[derive(Debug)]
struct Canvases {
    normal: Canvas,
    glow: Option<Canvas>,
}

/// Result of [`TextureManager::setup`]
#[derive(Debug)]
pub struct PreparedTexture {
    key: TextureKey,
    category: TextureCategory,
    uv: UvTransform,
    is_glowing: bool,
    /// Present only when the variant was not resident yet
    canvases: Option<Canvases>,
}

impl PreparedTexture {
    pub fn key(&self) -> TextureKey {
        self.key
    }

    pub fn category(&self) -> TextureCategory {
        self.category
    }

    /// Bitmap to texture coordinate transform
    pub fn uv(&self) -> UvTransform {
        self.uv
    }

    pub fn is_glowing(&self) -> bool {
        self.is_glowing
    }

    /// Whether the images were decoded and await upload
    pub fn is_loaded(&self) -> bool {
        self.canvases.is_some()
    }

    pub fn normal_canvas(&self) -> Option<&Canvas> {
        self.canvases.as_ref().map(|c| &c.normal)
    }

    pub fn glow_canvas(&self) -> Option<&Canvas> {
        self.canvases.as_ref()?.glow.as_ref()
    }
}

/// Result of [`TextureManager::render_normal`]; holds the glow image until drawn
#[derive(Debug)]
pub struct RenderedTexture {
    key: TextureKey,
    category: TextureCategory,
    uv: UvTransform,
    is_glowing: bool,
    texture: GpuTextureId,
    glow: Option<Canvas>,
}

impl RenderedTexture {
    pub fn key(&self) -> TextureKey {
        self.key
    }

    pub fn uv(&self) -> UvTransform {
        self.uv
    }

    /// Whether a glow layer should be drawn over the normal one
    pub fn is_glowing(&self) -> bool {
        self.is_glowing
    }

    /// The bound normal-layer texture
    pub fn texture(&self) -> GpuTextureId {
        self.texture
    }
}

/// Owns the texture backend and the residency of every bitmap instance.
pub struct TextureManager<B: TextureBackend> {
    backend: B,
    config: RenderConfig,
    types: TypeConfigTable,
    infravision: InfravisionTinter,
    cache: TextureResidencyCache,
}

impl<B: TextureBackend> TextureManager<B> {
    /// Start the texture subsystem for the loaded shapes.
    pub fn start<S: ShapeSource>(source: &S, config: RenderConfig, backend: B) -> Self {
        let types = TypeConfigTable::from_config(&config.textures);
        let infravision = InfravisionTinter::from_config(&config.infravision);
        let cache = TextureResidencyCache::new(source);
        debug!(
            "Texture manager started ({} collections loaded)",
            cache.collection_count()
        );
        Self {
            backend,
            config,
            types,
            infravision,
            cache,
        }
    }

    /// Release every texture and hand back the backend.
    pub fn stop(mut self) -> B {
        self.reset_textures();
        debug!("Texture manager stopped");
        self.backend
    }

    /// Release every texture and resize residency to newly loaded shapes.
    pub fn reload_collections<S: ShapeSource>(&mut self, source: &S) {
        self.reset_textures();
        self.cache = TextureResidencyCache::new(source);
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn type_info(&self, category: TextureCategory) -> Option<&TextureTypeInfo> {
        self.types.get(category)
    }

    pub fn infravision(&self) -> &InfravisionTinter {
        &self.infravision
    }

    pub fn infravision_mut(&mut self) -> &mut InfravisionTinter {
        &mut self.infravision
    }

    pub fn set_infravision_active(&mut self, active: bool) {
        self.infravision.set_active(active);
    }

    pub fn residency(&self) -> &TextureResidencyCache {
        &self.cache
    }

    /// Prepare a bitmap instance for drawing.
    ///
    /// Returns `None` when the shape's category is not among `categories`, the
    /// bitmap cannot be found, or it cannot be turned into a texture.
    pub fn setup<S: ShapeSource>(
        &self,
        source: &S,
        request: &TextureRequest,
        categories: &[TextureCategory],
    ) -> Option<PreparedTexture> {
        let collection = request.shape.collection();
        let category = collection.texture_category();
        if category == TextureCategory::None || !categories.contains(&category) {
            return None;
        }

        let Some(bitmap_index) = source.bitmap_index(collection, request.shape.shape()) else {
            trace!(
                "No bitmap for shape {} of collection {}",
                request.shape.shape(),
                collection.index()
            );
            return None;
        };
        let bitmap = source.bitmap(collection, bitmap_index)?;

        let variant = request
            .transfer_mode
            .color_table_variant(request.shape.clut(), self.infravision.is_active());
        let key = TextureKey {
            collection,
            bitmap: bitmap_index,
            variant,
        };

        let Some(state) = self
            .cache
            .bitmap(collection, bitmap_index)
            .map(|b| b.state(variant))
        else {
            warn!(
                "Collection {} bitmap {} has no residency record",
                collection.index(),
                bitmap_index
            );
            return None;
        };

        if let Some(uv) = state.uv() {
            return Some(PreparedTexture {
                key,
                category,
                uv,
                is_glowing: state.is_glowing(),
                canvases: None,
            });
        }

        let flat = category == TextureCategory::Landscape && self.config.flat_landscapes;
        let exponent = request
            .landscape_aspect_exponent
            .unwrap_or(self.config.landscape_aspect_exponent);
        let plan =
            match geometry::plan(&GeometryInput::for_bitmap(bitmap, category, flat, exponent)) {
                Ok(plan) => plan,
                Err(e) => {
                    debug!(
                        "Collection {} bitmap {} is not a valid texture: {}",
                        collection.index(),
                        bitmap_index,
                        e
                    );
                    return None;
                }
            };

        let canvases = self.load(source, bitmap, request, key, category, &plan)?;
        Some(PreparedTexture {
            key,
            category,
            uv: plan.uv,
            is_glowing: canvases.glow.is_some(),
            canvases: Some(canvases),
        })
    }

    /// Decode a bitmap into its normal and glow canvases at load resolution.
    fn load<S: ShapeSource>(
        &self,
        source: &S,
        bitmap: &Bitmap,
        request: &TextureRequest,
        key: TextureKey,
        category: TextureCategory,
        plan: &GeometryPlan,
    ) -> Option<Canvases> {
        let info = self.types.get(category)?;
        let flat = category == TextureCategory::Landscape && self.config.flat_landscapes;

        let (mut normal, mut glow) = if flat {
            let infravision = (key.variant == ColorTableVariant::Infravision)
                .then_some((&self.infravision, key.collection));
            let colors = self.landscape_colors(request.landscape_context);
            let canvas = landscape::flat_landscape(plan.width, plan.height, colors, infravision);
            (canvas, None)
        } else {
            let builder = ColorTableBuilder {
                category,
                shadeless: request.shadeless,
                options: self.config.texture_options(
                    key.collection,
                    request.shape.clut(),
                    key.bitmap,
                ),
            };
            let tables = source.shading_tables(key.collection, key.variant);
            let Some(tables) = builder.build(key.variant, tables) else {
                warn!(
                    "Collection {} has no shading tables for {:?}",
                    key.collection.index(),
                    key.variant
                );
                return None;
            };
            let normal = blitter::blit(bitmap, plan, &tables.normal);
            let glow = tables
                .is_glowing
                .then(|| blitter::blit(bitmap, plan, &tables.glow));
            (normal, glow)
        };

        let (width, height) = rescale::loaded_size(plan.width, plan.height, info.resolution);
        if (width, height) != (plan.width, plan.height) {
            normal = rescale::shrink(&normal, width, height);
            glow = glow.map(|g| rescale::shrink(&g, width, height));
        }

        debug!(
            "Loaded collection {} bitmap {} ({:?}): {}x{}{}",
            key.collection.index(),
            key.bitmap,
            key.variant,
            width,
            height,
            if glow.is_some() { ", glowing" } else { "" }
        );
        Some(Canvases { normal, glow })
    }

    fn landscape_colors(&self, context: usize) -> LandscapeColors {
        self.config.landscape_colors(context).unwrap_or_else(|| {
            warn!("No landscape colors for context {}", context);
            LandscapeColors {
                land: Rgb16::default(),
                sky: Rgb16::default(),
            }
        })
    }

    /// Allocate, bind and, on first use, upload the normal layer.
    pub fn render_normal(&mut self, prepared: PreparedTexture) -> RenderedTexture {
        let PreparedTexture {
            key,
            category,
            uv,
            is_glowing,
            canvases,
        } = prepared;
        let (normal, glow) = match canvases {
            Some(Canvases { normal, glow }) => (Some(normal), glow),
            None => (None, None),
        };

        let mut texture = GpuTextureId::INVALID;
        let state = self
            .cache
            .bitmap_mut(key.collection, key.bitmap)
            .map(|b| b.state_mut(key.variant));
        if let Some(state) = state {
            if state.allocate(&mut self.backend, is_glowing, uv) {
                trace!(
                    "Allocated textures for collection {} bitmap {} ({:?})",
                    key.collection.index(),
                    key.bitmap,
                    key.variant
                );
            }
            texture = state
                .texture_id(TextureLayer::Normal)
                .unwrap_or(GpuTextureId::INVALID);
            if state.use_layer(&mut self.backend, TextureLayer::Normal) == Some(true) {
                upload(
                    &mut self.backend,
                    &self.types,
                    texture,
                    normal.as_ref(),
                    category,
                    false,
                );
            }
        }

        RenderedTexture {
            key,
            category,
            uv,
            is_glowing,
            texture,
            glow,
        }
    }

    /// Bind and, on first use, upload the glow layer.
    ///
    /// Does nothing for textures without a glow layer.
    pub fn render_glowing(&mut self, rendered: &mut RenderedTexture, overlaid: bool) {
        if !rendered.is_glowing {
            return;
        }
        let glow = rendered.glow.take();
        let Some(state) = self
            .cache
            .bitmap_mut(rendered.key.collection, rendered.key.bitmap)
            .map(|b| b.state_mut(rendered.key.variant))
        else {
            return;
        };
        if state.use_layer(&mut self.backend, TextureLayer::Glowing) == Some(true) {
            let id = state
                .texture_id(TextureLayer::Glowing)
                .unwrap_or(GpuTextureId::INVALID);
            upload(
                &mut self.backend,
                &self.types,
                id,
                glow.as_ref(),
                rendered.category,
                overlaid,
            );
        }
    }

    /// Release every resident texture.
    ///
    /// Skipped entirely while the graphics context is inactive.
    pub fn reset_textures(&mut self) -> usize {
        if !self.backend.is_active() {
            return 0;
        }
        self.cache.reset_all(&mut self.backend)
    }
}

/// Upload a layer's canvas, logging failures; the layer stays blank until reset.
fn upload<B: TextureBackend>(
    backend: &mut B,
    types: &TypeConfigTable,
    id: GpuTextureId,
    canvas: Option<&Canvas>,
    category: TextureCategory,
    overlaid: bool,
) {
    let (Some(canvas), Some(info)) = (canvas, types.get(category)) else {
        warn!("Texture {} bound without an image to upload", id.0);
        return;
    };
    if let Err(e) = uploader::place_texture(backend, id, canvas, category, info, overlaid) {
        warn!("Texture {} upload failed: {:#}", id.0, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{RecordingBackend, TestShapes, gray_tables};
    use aleph_core::config::{InfravisionTintConfig, TextureTypeConfig};
    use aleph_core::{TextureBlend, WrapMode};

    const ALL: &[TextureCategory] = &[
        TextureCategory::Wall,
        TextureCategory::Landscape,
        TextureCategory::Inhabitant,
        TextureCategory::WeaponInHand,
    ];

    fn coll(i: u8) -> CollectionId {
        CollectionId::new(i).unwrap()
    }

    fn request(collection: u8, clut: u8, shape: u8) -> TextureRequest {
        TextureRequest::new(ShapeDescriptor::new(coll(collection), clut, shape))
    }

    fn manager(shapes: &TestShapes, config: RenderConfig) -> TextureManager<RecordingBackend> {
        TextureManager::start(shapes, config, RecordingBackend::new())
    }

    fn draw(
        manager: &mut TextureManager<RecordingBackend>,
        shapes: &TestShapes,
        request: &TextureRequest,
    ) -> Option<RenderedTexture> {
        let prepared = manager.setup(shapes, request, ALL)?;
        let mut rendered = manager.render_normal(prepared);
        if rendered.is_glowing() {
            manager.render_glowing(&mut rendered, true);
        }
        Some(rendered)
    }

    #[test]
    fn test_wall_uploaded_once() {
        let shapes = TestShapes::new().with_walls(17, 1);
        let mut manager = manager(&shapes, RenderConfig::default());

        let prepared = manager.setup(&shapes, &request(17, 0, 0), ALL).unwrap();
        assert!(prepared.is_loaded());
        assert_eq!(prepared.uv(), UvTransform::default());
        let rendered = manager.render_normal(prepared);
        assert!(!rendered.is_glowing());

        let backend = manager.backend();
        assert_eq!(backend.uploads.len(), 1);
        let upload = &backend.uploads[0];
        assert_eq!((upload.width, upload.height), (64, 64));
        assert_eq!(upload.id, rendered.texture());
        assert!(upload.mipmapped);
        assert_eq!(upload.pixel(10, 10), 0x0101_01ff);
        assert_eq!(backend.sampling[0].1.wrap_u, WrapMode::Repeat);

        // Drawn again: bound, not decoded or uploaded
        let prepared = manager.setup(&shapes, &request(17, 0, 0), ALL).unwrap();
        assert!(!prepared.is_loaded());
        let again = manager.render_normal(prepared);
        assert_eq!(again.texture(), rendered.texture());
        assert_eq!(manager.backend().uploads.len(), 1);
        assert_eq!(manager.backend().bound.len(), 2);
    }

    #[test]
    fn test_invalid_wall_is_rejected() {
        let bitmap = Bitmap::from_rows(70, 64, vec![1; 70 * 64]).unwrap();
        let shapes = TestShapes::new().with_bitmaps(17, vec![bitmap]);
        let manager = manager(&shapes, RenderConfig::default());
        assert!(manager.setup(&shapes, &request(17, 0, 0), ALL).is_none());
        assert!(manager.backend().generated.is_empty());
        assert_eq!(manager.residency().allocated_count(), 0);
    }

    #[test]
    fn test_category_filter_and_missing_shapes() {
        let shapes = TestShapes::new().with_walls(17, 1);
        let manager = manager(&shapes, RenderConfig::default());
        let sprites_only = &[TextureCategory::Inhabitant];
        assert!(manager.setup(&shapes, &request(17, 0, 0), sprites_only).is_none());
        // Shape past the collection's bitmaps
        assert!(manager.setup(&shapes, &request(17, 0, 5), ALL).is_none());
        // Collection not loaded
        assert!(manager.setup(&shapes, &request(18, 0, 0), ALL).is_none());
        // Interface collection is never texture-mapped
        assert!(manager.setup(&shapes, &request(0, 0, 0), ALL).is_none());
    }

    #[test]
    fn test_sprite_geometry() {
        let bitmap = Bitmap::from_rows(30, 40, vec![1; 30 * 40]).unwrap();
        let shapes = TestShapes::new().with_bitmaps(7, vec![bitmap]);
        let mut manager = manager(&shapes, RenderConfig::default());
        let rendered = draw(&mut manager, &shapes, &request(7, 0, 0)).unwrap();

        let uv = rendered.uv();
        assert_eq!((uv.u_scale, uv.v_scale), (0.9375, 0.625));
        let upload = &manager.backend().uploads[0];
        assert_eq!((upload.width, upload.height), (32, 64));
        assert_eq!(upload.pixel(0, 0), 0);
        assert_eq!(upload.pixel(1, 12), 0x0101_01ff);
        assert_eq!(upload.pixel(30, 51), 0x0101_01ff);
        assert_eq!(upload.pixel(31, 51), 0);
        assert_eq!(upload.pixel(30, 52), 0);
        assert_eq!(manager.backend().sampling[0].1.wrap_v, WrapMode::Clamp);
    }

    #[test]
    fn test_glow_layer() {
        // Every entry is still lit in the darkest table
        let shapes = TestShapes::new().with_walls(17, 1).with_tables(
            17,
            ColorTableVariant::Normal { clut: 0 },
            gray_tables(2, |t, _| if t == 0 { 0xff } else { 0x80 }),
        );
        let mut manager = manager(&shapes, RenderConfig::default());
        let prepared = manager.setup(&shapes, &request(17, 0, 0), ALL).unwrap();
        assert!(prepared.is_glowing());
        assert!(prepared.glow_canvas().is_some());

        let mut rendered = manager.render_normal(prepared);
        manager.render_glowing(&mut rendered, true);
        // A second glow pass has nothing left to upload
        manager.render_glowing(&mut rendered, true);

        let backend = manager.backend();
        assert_eq!(backend.uploads.len(), 2);
        assert_eq!(backend.uploads[0].pixel(0, 0), 0x8080_80ff);
        assert_eq!(backend.uploads[1].pixel(0, 0), 0x8080_8080);
        assert_eq!(backend.blends[0].1, TextureBlend::Modulate);
        assert_eq!(backend.blends[1].1, TextureBlend::Decal);

        // Resident glow textures are remembered
        let prepared = manager.setup(&shapes, &request(17, 0, 0), ALL).unwrap();
        assert!(prepared.is_glowing());
        assert!(!prepared.is_loaded());
    }

    #[test]
    fn test_render_glowing_without_glow_is_noop() {
        let shapes = TestShapes::new().with_walls(17, 1);
        let mut manager = manager(&shapes, RenderConfig::default());
        let prepared = manager.setup(&shapes, &request(17, 0, 0), ALL).unwrap();
        let mut rendered = manager.render_normal(prepared);
        manager.render_glowing(&mut rendered, false);
        assert_eq!(manager.backend().bound.len(), 1);
        assert_eq!(manager.backend().uploads.len(), 1);
    }

    #[test]
    fn test_flat_landscape() {
        let bitmap = Bitmap::from_rows(300, 77, vec![1; 300 * 77]).unwrap();
        let shapes = TestShapes::new().with_bitmaps(27, vec![bitmap]);
        let config = RenderConfig {
            flat_landscapes: true,
            landscape_colors: vec![LandscapeColors {
                land: Rgb16::new(0xffff, 0, 0),
                sky: Rgb16::new(0, 0, 0xffff),
            }],
            ..RenderConfig::default()
        };
        let mut manager = manager(&shapes, config);
        draw(&mut manager, &shapes, &request(27, 0, 0)).unwrap();

        let upload = &manager.backend().uploads[0];
        assert_eq!((upload.width, upload.height), (128, 128));
        assert!(!upload.mipmapped);
        assert_eq!(upload.pixel(5, 0), 0xff00_00ff);
        assert_eq!(upload.pixel(5, 63), 0xff00_00ff);
        assert_eq!(upload.pixel(5, 64), 0x0000_ffff);
        assert_eq!(upload.pixel(127, 127), 0x0000_ffff);
        let sampling = manager.backend().sampling[0].1;
        assert_eq!(
            (sampling.wrap_u, sampling.wrap_v),
            (WrapMode::Repeat, WrapMode::Clamp)
        );
    }

    #[test]
    fn test_missing_landscape_context_is_black() {
        let bitmap = Bitmap::from_rows(4, 4, vec![1; 16]).unwrap();
        let shapes = TestShapes::new().with_bitmaps(28, vec![bitmap]);
        let config = RenderConfig {
            flat_landscapes: true,
            ..RenderConfig::default()
        };
        let manager = manager(&shapes, config);
        let mut req = request(28, 0, 0);
        req.landscape_context = 99;
        let prepared = manager.setup(&shapes, &req, ALL).unwrap();
        let canvas = prepared.normal_canvas().unwrap();
        assert_eq!(canvas.pixel(0, 0), Some(0x0000_00ff));
    }

    #[test]
    fn test_infravision_landscape() {
        let bitmap = Bitmap::from_rows(4, 4, vec![1; 16]).unwrap();
        let shapes = TestShapes::new().with_bitmaps(27, vec![bitmap]);
        let config = RenderConfig {
            flat_landscapes: true,
            landscape_colors: vec![LandscapeColors {
                land: Rgb16::new(0xffff, 0xffff, 0xffff),
                sky: Rgb16::new(0xffff, 0xffff, 0xffff),
            }],
            infravision: vec![InfravisionTintConfig {
                collection: 27,
                tinted: true,
                red: 0.0,
                green: 1.0,
                blue: 0.0,
            }],
            ..RenderConfig::default()
        };
        let mut manager = manager(&shapes, config);
        manager.set_infravision_active(true);

        let prepared = manager.setup(&shapes, &request(27, 0, 0), ALL).unwrap();
        assert_eq!(prepared.key().variant, ColorTableVariant::Infravision);
        let canvas = prepared.normal_canvas().unwrap();
        assert_eq!(canvas.pixel(0, 0), Some(0x00ff_00ff));
        assert_eq!(canvas.pixel(0, 127), Some(0x00ff_00ff));
    }

    #[test]
    fn test_landscape_aspect_override() {
        let bitmap = Bitmap::from_rows(256, 128, vec![0; 256 * 128]).unwrap();
        let shapes = TestShapes::new().with_bitmaps(29, vec![bitmap]);
        let manager = manager(&shapes, RenderConfig::default());
        let mut req = request(29, 0, 0);
        let prepared = manager.setup(&shapes, &req, ALL).unwrap();
        let canvas = prepared.normal_canvas().unwrap();
        assert_eq!((canvas.width(), canvas.height()), (256, 128));
        // Landscapes keep palette entry 0 opaque
        assert_eq!(canvas.pixel(0, 0), Some(0x0000_00ff));

        req.landscape_aspect_exponent = Some(0);
        let prepared = manager.setup(&shapes, &req, ALL).unwrap();
        let canvas = prepared.normal_canvas().unwrap();
        assert_eq!((canvas.width(), canvas.height()), (256, 256));
        // Bitmap centered vertically, the rest transparent
        assert_eq!(canvas.pixel(0, 0), Some(0));
        assert_eq!(canvas.pixel(0, 64), Some(0x0000_00ff));
    }

    #[test]
    fn test_resident_texture_keeps_cached_uv() {
        let bitmap = Bitmap::from_rows(256, 128, vec![0; 256 * 128]).unwrap();
        let shapes = TestShapes::new().with_bitmaps(29, vec![bitmap]);
        let mut manager = manager(&shapes, RenderConfig::default());
        let mut req = request(29, 0, 0);
        let rendered = draw(&mut manager, &shapes, &req).unwrap();
        let cached = rendered.uv();
        assert_eq!(manager.residency().allocated_count(), 1);

        // Planning inputs change while resident: the cached transform is reused
        for exponent in [0, 3, 40] {
            req.landscape_aspect_exponent = Some(exponent);
            let prepared = manager.setup(&shapes, &req, ALL).unwrap();
            assert!(!prepared.is_loaded());
            assert_eq!(prepared.uv(), cached);
        }

        // Once released the bitmap is planned again, and an overflowing
        // exponent is rejected
        manager.reset_textures();
        assert!(manager.setup(&shapes, &req, ALL).is_none());
        req.landscape_aspect_exponent = Some(0);
        assert!(manager.setup(&shapes, &req, ALL).unwrap().is_loaded());
    }

    #[test]
    fn test_resident_sprite_keeps_cached_uv() {
        let bitmap = Bitmap::from_rows(30, 40, vec![1; 30 * 40]).unwrap();
        let shapes = TestShapes::new().with_bitmaps(7, vec![bitmap]);
        let mut manager = manager(&shapes, RenderConfig::default());
        let rendered = draw(&mut manager, &shapes, &request(7, 0, 0)).unwrap();
        let state = manager
            .residency()
            .bitmap(coll(7), 0)
            .unwrap()
            .state(ColorTableVariant::Normal { clut: 0 });
        assert_eq!(state.uv(), Some(rendered.uv()));

        let prepared = manager.setup(&shapes, &request(7, 0, 0), ALL).unwrap();
        assert!(!prepared.is_loaded());
        assert_eq!(prepared.uv(), rendered.uv());
    }

    #[test]
    fn test_silhouette_variant() {
        let shapes = TestShapes::new().with_walls(17, 1);
        let mut manager = manager(&shapes, RenderConfig::default());
        let mut req = request(17, 0, 0);
        req.transfer_mode = TransferMode::Tinted;
        let prepared = manager.setup(&shapes, &req, ALL).unwrap();
        assert_eq!(prepared.key().variant, ColorTableVariant::Silhouette);
        let rendered = manager.render_normal(prepared);
        assert_eq!(manager.backend().uploads[0].pixel(3, 3), 0x0000_00ff);

        // The normal variant is tracked separately
        let normal = draw(&mut manager, &shapes, &request(17, 0, 0)).unwrap();
        assert_ne!(normal.texture(), rendered.texture());
        assert_eq!(manager.backend().uploads.len(), 2);
        assert_eq!(manager.residency().allocated_count(), 2);
    }

    #[test]
    fn test_missing_color_table() {
        let shapes = TestShapes::new().with_walls(17, 1);
        let manager = manager(&shapes, RenderConfig::default());
        // Only CLUT 0 has shading tables
        assert!(manager.setup(&shapes, &request(17, 3, 0), ALL).is_none());
    }

    #[test]
    fn test_reduced_resolution() {
        let shapes = TestShapes::new().with_walls(17, 1);
        let mut config = RenderConfig::default();
        config.textures.wall = TextureTypeConfig {
            near_filter: 0,
            far_filter: 0,
            resolution: 1,
            color_format: 0,
        };
        let mut manager = manager(&shapes, config);
        draw(&mut manager, &shapes, &request(17, 0, 0)).unwrap();
        let upload = &manager.backend().uploads[0];
        assert_eq!((upload.width, upload.height), (32, 32));
        assert!(!upload.mipmapped);
        assert_eq!(upload.pixel(0, 0), 0x0101_01ff);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let shapes = TestShapes::new().with_walls(17, 2);
        let mut manager = manager(&shapes, RenderConfig::default());
        draw(&mut manager, &shapes, &request(17, 0, 0)).unwrap();
        draw(&mut manager, &shapes, &request(17, 0, 1)).unwrap();

        assert_eq!(manager.reset_textures(), 2);
        assert!(manager.backend().live.is_empty());
        assert_eq!(manager.reset_textures(), 0);
        assert_eq!(manager.backend().deleted.len(), 4);

        // The next draw decodes and uploads again
        draw(&mut manager, &shapes, &request(17, 0, 0)).unwrap();
        assert_eq!(manager.backend().uploads.len(), 3);
    }

    #[test]
    fn test_reset_skipped_without_context() {
        let shapes = TestShapes::new().with_walls(17, 1);
        let mut manager = manager(&shapes, RenderConfig::default());
        draw(&mut manager, &shapes, &request(17, 0, 0)).unwrap();
        manager.backend_mut().active = false;
        assert_eq!(manager.reset_textures(), 0);
        assert!(manager.backend().deleted.is_empty());
        assert_eq!(manager.residency().allocated_count(), 1);
    }

    #[test]
    fn test_upload_failure_leaves_layer_blank() {
        let shapes = TestShapes::new().with_walls(17, 1);
        let mut manager = manager(&shapes, RenderConfig::default());
        manager.backend_mut().fail_uploads = true;
        let rendered = draw(&mut manager, &shapes, &request(17, 0, 0)).unwrap();
        assert_ne!(rendered.texture(), GpuTextureId::INVALID);
        assert!(manager.backend().uploads.is_empty());
        // Still resident: not retried until the next reset
        let prepared = manager.setup(&shapes, &request(17, 0, 0), ALL).unwrap();
        assert!(!prepared.is_loaded());
    }

    #[test]
    fn test_stop_and_reload() {
        let shapes = TestShapes::new().with_walls(17, 1);
        let mut manager = manager(&shapes, RenderConfig::default());
        draw(&mut manager, &shapes, &request(17, 0, 0)).unwrap();

        let bigger = TestShapes::new().with_walls(17, 1).with_walls(18, 3);
        manager.reload_collections(&bigger);
        assert!(manager.backend().live.is_empty());
        assert!(manager.setup(&bigger, &request(18, 0, 2), ALL).is_some());

        draw(&mut manager, &bigger, &request(18, 0, 2)).unwrap();
        let backend = manager.stop();
        assert!(backend.live.is_empty());
    }
}
