//! Shared shape types for the Aleph texture pipeline.
//!
//! These are the types the shapes file loader hands to the renderer:
//!
//! - [`collection`] - collection ids, shape descriptors, texture categories
//! - [`bitmap`] - paletted bitmaps, plain and strip-encoded
//! - [`shading`] - per-illumination-level shading tables
//! - [`color`] - 16-bit-per-channel colors from preferences

pub mod bitmap;
pub mod collection;
pub mod color;
mod error;
pub mod shading;

pub use bitmap::{Bitmap, StripHeader};
pub use collection::{
    CollectionId, ColorTableVariant, MAXIMUM_CLUTS_PER_COLLECTION, NUMBER_OF_BITMAP_SETS,
    NUMBER_OF_COLLECTIONS, ShapeDescriptor, TextureCategory, TransferMode,
};
pub use color::Rgb16;
pub use error::ShapeError;
pub use shading::{SHADING_TABLE_ENTRIES, ShadingDepth, ShadingTables};
