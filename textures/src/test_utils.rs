//! Test doubles: a recording backend and an in-memory shapes file

use aleph_core::{
    ColorFormat, GpuTextureId, ImageUpload, SamplerParams, ShapeSource, TextureBackend,
    TextureBlend,
};
use aleph_shared::{
    Bitmap, CollectionId, ColorTableVariant, NUMBER_OF_COLLECTIONS, SHADING_TABLE_ENTRIES,
    ShadingDepth, ShadingTables,
};
use hashbrown::{HashMap, HashSet};

/// One upload as the backend received it
#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub id: GpuTextureId,
    pub width: u32,
    pub height: u32,
    pub format: ColorFormat,
    pub mipmapped: bool,
    pub pixels: Vec<u8>,
}

impl RecordedUpload {
    /// Packed color of a texel
    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        let at = ((y * self.width + x) * 4) as usize;
        u32::from_be_bytes([
            self.pixels[at],
            self.pixels[at + 1],
            self.pixels[at + 2],
            self.pixels[at + 3],
        ])
    }
}

/// Backend that records every call
#[derive(Debug)]
pub struct RecordingBackend {
    pub active: bool,
    pub fail_uploads: bool,
    next_id: u32,
    /// Generated and not yet deleted
    pub live: HashSet<GpuTextureId>,
    pub generated: Vec<GpuTextureId>,
    pub deleted: Vec<GpuTextureId>,
    pub bound: Vec<GpuTextureId>,
    pub uploads: Vec<RecordedUpload>,
    pub sampling: Vec<(GpuTextureId, SamplerParams)>,
    pub blends: Vec<(GpuTextureId, TextureBlend)>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self {
            active: true,
            fail_uploads: false,
            next_id: 1,
            live: HashSet::new(),
            generated: Vec::new(),
            deleted: Vec::new(),
            bound: Vec::new(),
            uploads: Vec::new(),
            sampling: Vec::new(),
            blends: Vec::new(),
        }
    }

    fn record(
        &mut self,
        id: GpuTextureId,
        image: &ImageUpload<'_>,
        mipmapped: bool,
    ) -> anyhow::Result<()> {
        if self.fail_uploads {
            anyhow::bail!("upload rejected");
        }
        self.uploads.push(RecordedUpload {
            id,
            width: image.width,
            height: image.height,
            format: image.format,
            mipmapped,
            pixels: image.pixels.to_vec(),
        });
        Ok(())
    }
}

impl TextureBackend for RecordingBackend {
    fn is_active(&self) -> bool {
        self.active
    }

    fn generate_texture(&mut self) -> GpuTextureId {
        let id = GpuTextureId(self.next_id);
        self.next_id += 1;
        self.live.insert(id);
        self.generated.push(id);
        id
    }

    fn delete_texture(&mut self, id: GpuTextureId) {
        assert!(self.live.remove(&id), "deleted unknown texture {:?}", id);
        self.deleted.push(id);
    }

    fn bind_texture(&mut self, id: GpuTextureId) {
        self.bound.push(id);
    }

    fn upload_image(&mut self, id: GpuTextureId, image: &ImageUpload<'_>) -> anyhow::Result<()> {
        self.record(id, image, false)
    }

    fn upload_mipmapped(
        &mut self,
        id: GpuTextureId,
        image: &ImageUpload<'_>,
    ) -> anyhow::Result<()> {
        self.record(id, image, true)
    }

    fn set_sampling(&mut self, id: GpuTextureId, params: &SamplerParams) {
        self.sampling.push((id, *params));
    }

    fn set_blend(&mut self, id: GpuTextureId, blend: TextureBlend) {
        self.blends.push((id, blend));
    }
}

/// Shading tables where entry k of table t is the gray level `shade(t, k)`
pub fn gray_tables(count: usize, shade: impl Fn(usize, usize) -> u8) -> ShadingTables {
    let mut data = Vec::with_capacity(count * SHADING_TABLE_ENTRIES * 4);
    for t in 0..count {
        for k in 0..SHADING_TABLE_ENTRIES {
            let level = shade(t, k);
            data.extend_from_slice(&[0, level, level, level]);
        }
    }
    match ShadingTables::new(ShadingDepth::Argb8888, count, data) {
        Ok(tables) => tables,
        Err(e) => panic!("bad test shading tables: {}", e),
    }
}

/// Dark and lit tables with no self-luminous entries; lit entry k is gray level k
pub fn plain_tables() -> ShadingTables {
    gray_tables(2, |t, k| if t == 0 { 0 } else { k as u8 })
}

#[derive(Debug, Default)]
struct TestCollection {
    bitmaps: Vec<Bitmap>,
    tables: HashMap<ColorTableVariant, ShadingTables>,
}

/// In-memory shapes; shape index n draws bitmap n
#[derive(Debug)]
pub struct TestShapes {
    collections: Vec<Option<TestCollection>>,
}

impl TestShapes {
    pub fn new() -> Self {
        Self {
            collections: (0..NUMBER_OF_COLLECTIONS).map(|_| None).collect(),
        }
    }

    /// Load a collection with plain tables for CLUT 0 and infravision
    pub fn with_bitmaps(mut self, collection: u8, bitmaps: Vec<Bitmap>) -> Self {
        let mut tables = HashMap::new();
        tables.insert(ColorTableVariant::Normal { clut: 0 }, plain_tables());
        tables.insert(ColorTableVariant::Infravision, plain_tables());
        self.collections[collection as usize] = Some(TestCollection { bitmaps, tables });
        self
    }

    /// Load a collection of 64x64 walls filled with palette index 1
    pub fn with_walls(self, collection: u8, count: usize) -> Self {
        let wall = match Bitmap::from_rows(64, 64, vec![1; 64 * 64]) {
            Ok(bitmap) => bitmap,
            Err(e) => panic!("bad test bitmap: {}", e),
        };
        self.with_bitmaps(collection, vec![wall; count])
    }

    pub fn with_tables(
        mut self,
        collection: u8,
        variant: ColorTableVariant,
        tables: ShadingTables,
    ) -> Self {
        if let Some(coll) = self.collections[collection as usize].as_mut() {
            coll.tables.insert(variant, tables);
        }
        self
    }

    fn collection(&self, collection: CollectionId) -> Option<&TestCollection> {
        self.collections.get(collection.index())?.as_ref()
    }
}

impl ShapeSource for TestShapes {
    fn is_collection_present(&self, collection: CollectionId) -> bool {
        self.collection(collection).is_some()
    }

    fn bitmap_count(&self, collection: CollectionId) -> usize {
        self.collection(collection).map_or(0, |c| c.bitmaps.len())
    }

    fn bitmap_index(&self, collection: CollectionId, shape: u8) -> Option<usize> {
        let count = self.bitmap_count(collection);
        ((shape as usize) < count).then_some(shape as usize)
    }

    fn bitmap(&self, collection: CollectionId, index: usize) -> Option<&Bitmap> {
        self.collection(collection)?.bitmaps.get(index)
    }

    fn shading_tables(
        &self,
        collection: CollectionId,
        variant: ColorTableVariant,
    ) -> Option<&ShadingTables> {
        self.collection(collection)?.tables.get(&variant)
    }
}
