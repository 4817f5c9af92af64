//! Texture residency tracking
//!
//! Each bitmap keeps one [`TextureState`] per color-table variant. A state
//! owns a pair of backend textures (normal and glow layers) once allocated,
//! the UV transform computed when the bitmap was first set up, and which
//! layers already hold an image, so each image is uploaded once per
//! allocation.
//!
//! ```text
//! Empty --allocate--> Allocated { uploaded: [false, false] }
//!   ^                      |
//!   |                   use_layer (first bind uploads)
//!   |                      v
//!   +------reset------ Allocated { uploaded: [..] }
//! ```

use aleph_core::{GpuTextureId, ShapeSource, TextureBackend};
use aleph_shared::{CollectionId, ColorTableVariant, NUMBER_OF_BITMAP_SETS};
use tracing::debug;

use crate::geometry::UvTransform;

/// Texture layers drawn for a bitmap instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureLayer {
    Normal = 0,
    Glowing = 1,
}

/// Residency of one bitmap in one color-table variant
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TextureState {
    #[default]
    Empty,
    Allocated {
        ids: [GpuTextureId; 2],
        is_glowing: bool,
        uv: UvTransform,
        uploaded: [bool; 2],
    },
}

impl TextureState {
    pub fn is_allocated(&self) -> bool {
        matches!(self, TextureState::Allocated { .. })
    }

    pub fn is_glowing(&self) -> bool {
        matches!(
            self,
            TextureState::Allocated {
                is_glowing: true,
                ..
            }
        )
    }

    /// Backend texture of a layer, if allocated
    pub fn texture_id(&self, layer: TextureLayer) -> Option<GpuTextureId> {
        match self {
            TextureState::Allocated { ids, .. } => Some(ids[layer as usize]),
            TextureState::Empty => None,
        }
    }

    /// UV transform cached at allocation
    pub fn uv(&self) -> Option<UvTransform> {
        match self {
            TextureState::Allocated { uv, .. } => Some(*uv),
            TextureState::Empty => None,
        }
    }

    /// Allocate both layers' textures; returns whether an allocation happened.
    pub fn allocate<B: TextureBackend>(
        &mut self,
        backend: &mut B,
        is_glowing: bool,
        uv: UvTransform,
    ) -> bool {
        if self.is_allocated() {
            return false;
        }
        let ids = [backend.generate_texture(), backend.generate_texture()];
        *self = TextureState::Allocated {
            ids,
            is_glowing,
            uv,
            uploaded: [false, false],
        };
        true
    }

    /// Bind a layer's texture.
    ///
    /// Returns `Some(true)` on the first bind since allocation, when the caller
    /// must upload the image, and `None` if nothing is allocated.
    pub fn use_layer<B: TextureBackend>(
        &mut self,
        backend: &mut B,
        layer: TextureLayer,
    ) -> Option<bool> {
        match self {
            TextureState::Allocated { ids, uploaded, .. } => {
                backend.bind_texture(ids[layer as usize]);
                let first = !uploaded[layer as usize];
                uploaded[layer as usize] = true;
                Some(first)
            }
            TextureState::Empty => None,
        }
    }

    /// Release both textures; returns whether anything was released.
    pub fn reset<B: TextureBackend>(&mut self, backend: &mut B) -> bool {
        match std::mem::take(self) {
            TextureState::Allocated { ids, .. } => {
                for id in ids {
                    backend.delete_texture(id);
                }
                true
            }
            TextureState::Empty => false,
        }
    }
}

/// Residency of one bitmap across every color-table variant
#[derive(Debug, Clone, Default)]
pub struct BitmapTextureState {
    states: [TextureState; NUMBER_OF_BITMAP_SETS],
}

impl BitmapTextureState {
    pub fn state(&self, variant: ColorTableVariant) -> &TextureState {
        &self.states[variant.slot()]
    }

    pub fn state_mut(&mut self, variant: ColorTableVariant) -> &mut TextureState {
        &mut self.states[variant.slot()]
    }
}

/// Residency of every bitmap of every loaded collection
#[derive(Debug, Clone, Default)]
pub struct TextureResidencyCache {
    /// `None` for collections that are not loaded
    collections: Vec<Option<Vec<BitmapTextureState>>>,
}

impl TextureResidencyCache {
    /// Empty states sized to the loaded collections
    pub fn new<S: ShapeSource>(source: &S) -> Self {
        let collections = CollectionId::all()
            .map(|collection| {
                source.is_collection_present(collection).then(|| {
                    vec![BitmapTextureState::default(); source.bitmap_count(collection)]
                })
            })
            .collect();
        Self { collections }
    }

    /// Number of collections with residency storage
    pub fn collection_count(&self) -> usize {
        self.collections.iter().flatten().count()
    }

    pub fn has_collection(&self, collection: CollectionId) -> bool {
        matches!(self.collections.get(collection.index()), Some(Some(_)))
    }

    pub fn bitmap(&self, collection: CollectionId, bitmap: usize) -> Option<&BitmapTextureState> {
        self.collections.get(collection.index())?.as_ref()?.get(bitmap)
    }

    pub fn bitmap_mut(
        &mut self,
        collection: CollectionId,
        bitmap: usize,
    ) -> Option<&mut BitmapTextureState> {
        self.collections
            .get_mut(collection.index())?
            .as_mut()?
            .get_mut(bitmap)
    }

    /// Number of allocated states
    pub fn allocated_count(&self) -> usize {
        self.states().filter(|state| state.is_allocated()).count()
    }

    fn states(&self) -> impl Iterator<Item = &TextureState> {
        self.collections
            .iter()
            .flatten()
            .flatten()
            .flat_map(|bitmap| bitmap.states.iter())
    }

    /// Release every allocated texture; returns how many states were released.
    pub fn reset_all<B: TextureBackend>(&mut self, backend: &mut B) -> usize {
        let mut released = 0;
        for bitmap in self.collections.iter_mut().flatten().flatten() {
            for state in bitmap.states.iter_mut() {
                if state.reset(backend) {
                    released += 1;
                }
            }
        }
        debug!("Released {} texture states", released);
        released
    }
}
