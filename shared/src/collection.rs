//! Shape collections, descriptors and texture categories
//!
//! A collection groups the bitmap frames of one monster, wall set, scenery set
//! or landscape together with its shading tables. Every collection maps to a
//! fixed texture category that decides how its bitmaps become GPU textures.

/// Number of shape collections in a shapes file
pub const NUMBER_OF_COLLECTIONS: usize = 32;

/// Color tables (CLUTs) a collection may carry
pub const MAXIMUM_CLUTS_PER_COLLECTION: usize = 8;

/// Color-table slots tracked per bitmap: every CLUT plus silhouette and infravision
pub const NUMBER_OF_BITMAP_SETS: usize = MAXIMUM_CLUTS_PER_COLLECTION + 2;

/// Index of a shape collection (0..32)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionId(u8);

impl CollectionId {
    /// Create a collection id, rejecting indices outside the collection table
    pub fn new(index: u8) -> Option<Self> {
        ((index as usize) < NUMBER_OF_COLLECTIONS).then_some(Self(index))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterate over every collection id
    pub fn all() -> impl Iterator<Item = CollectionId> {
        (0..NUMBER_OF_COLLECTIONS as u8).map(CollectionId)
    }

    /// Texture category the collection's bitmaps are rendered as
    pub fn texture_category(self) -> TextureCategory {
        COLLECTION_CATEGORIES[self.index()]
    }
}

/// How a collection's bitmaps are sized, wrapped and filtered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureCategory {
    /// Tiled wall and floor surfaces
    Wall,
    /// Panoramic sky backdrops
    Landscape,
    /// Monsters, items, scenery and effects drawn in the world
    Inhabitant,
    /// Weapons drawn in the player's hands
    WeaponInHand,
    /// Not texture-mapped (HUD interface graphics)
    #[default]
    None,
}

use TextureCategory::{Inhabitant, Landscape, Wall, WeaponInHand};

/// Category of each stock collection, indexed by collection
const COLLECTION_CATEGORIES: [TextureCategory; NUMBER_OF_COLLECTIONS] = [
    TextureCategory::None, // Interface
    WeaponInHand,          // Weapons in hand
    Inhabitant,            // Juggernaut
    Inhabitant,            // Tick
    Inhabitant,            // Explosion effects
    Inhabitant,            // Hunter
    Inhabitant,            // Player
    Inhabitant,            // Items
    Inhabitant,            // Trooper
    Inhabitant,            // Fighter
    Inhabitant,            // S'pht'Kr
    Inhabitant,            // F'lickta
    Inhabitant,            // Bob
    Inhabitant,            // VacBob
    Inhabitant,            // Enforcer
    Inhabitant,            // Drone
    Inhabitant,            // S'pht
    Wall,                  // Water
    Wall,                  // Lava
    Wall,                  // Sewage
    Wall,                  // Jjaro
    Wall,                  // Pfhor
    Inhabitant,            // Water scenery
    Inhabitant,            // Lava scenery
    Inhabitant,            // Sewage scenery
    Inhabitant,            // Jjaro scenery
    Inhabitant,            // Pfhor scenery
    Landscape,             // Day
    Landscape,             // Night
    Landscape,             // Moon
    Landscape,             // Outer space
    Inhabitant,            // Cyborg
];

/// Which palette-derived lookup table a bitmap instance is drawn with
///
/// Selected by the render transfer mode and the global infravision state,
/// never by the bitmap itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorTableVariant {
    /// The collection's own color table (CLUT 0..8)
    Normal { clut: u8 },
    /// Flat transparent-black stand-in used for invisibility and static
    Silhouette,
    /// The collection's infravision shading tables
    Infravision,
}

impl ColorTableVariant {
    /// Residency slot of this variant within a bitmap's state set
    pub fn slot(self) -> usize {
        match self {
            ColorTableVariant::Normal { clut } => {
                (clut as usize).min(MAXIMUM_CLUTS_PER_COLLECTION - 1)
            }
            ColorTableVariant::Silhouette => MAXIMUM_CLUTS_PER_COLLECTION,
            ColorTableVariant::Infravision => MAXIMUM_CLUTS_PER_COLLECTION + 1,
        }
    }
}

/// Transfer mode a shape is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferMode {
    #[default]
    Normal,
    /// Tinted transfer, used for invisibility
    Tinted,
    /// Static-distortion transfer
    Static,
}

impl TransferMode {
    /// Resolve the color-table variant for a shape drawn with this transfer mode.
    ///
    /// Invisibility wins over infravision; infravision wins over the shape's own CLUT.
    pub fn color_table_variant(self, clut: u8, infravision_active: bool) -> ColorTableVariant {
        match self {
            TransferMode::Static | TransferMode::Tinted => ColorTableVariant::Silhouette,
            TransferMode::Normal if infravision_active => ColorTableVariant::Infravision,
            TransferMode::Normal => ColorTableVariant::Normal { clut },
        }
    }
}

/// Packed 16-bit shape descriptor
///
/// ```text
/// bits 0-7:   shape (frame) index
/// bits 8-12:  collection
/// bits 13-15: color table (CLUT)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeDescriptor(pub u16);

impl ShapeDescriptor {
    pub fn new(collection: CollectionId, clut: u8, shape: u8) -> Self {
        let coll = (collection.0 as u16 & 0x1f) | ((clut as u16 & 0x07) << 5);
        Self((coll << 8) | shape as u16)
    }

    pub fn shape(self) -> u8 {
        (self.0 & 0xff) as u8
    }

    pub fn collection(self) -> CollectionId {
        // Five bits can never exceed the table
        CollectionId(((self.0 >> 8) & 0x1f) as u8)
    }

    pub fn clut(self) -> u8 {
        ((self.0 >> 13) & 0x07) as u8
    }
}
