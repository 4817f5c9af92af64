//! Shapes file access consumed by the texture pipeline

use aleph_shared::{Bitmap, CollectionId, ColorTableVariant, ShadingTables};

/// Read access to the loaded shapes.
///
/// Implemented by the shapes file loader; the texture pipeline only reads.
pub trait ShapeSource {
    /// Whether the collection's data is loaded
    fn is_collection_present(&self, collection: CollectionId) -> bool;

    /// Number of bitmaps in a loaded collection
    fn bitmap_count(&self, collection: CollectionId) -> usize;

    /// Bitmap drawn for a shape (frame) of a collection
    fn bitmap_index(&self, collection: CollectionId, shape: u8) -> Option<usize>;

    fn bitmap(&self, collection: CollectionId, index: usize) -> Option<&Bitmap>;

    /// Shading tables for a color-table variant.
    ///
    /// Never consulted for [`ColorTableVariant::Silhouette`].
    fn shading_tables(
        &self,
        collection: CollectionId,
        variant: ColorTableVariant,
    ) -> Option<&ShadingTables>;
}
