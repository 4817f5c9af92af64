/// Malformed shape data handed over by the shapes file loader
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    #[error("bitmap has no pixels ({width}x{height})")]
    EmptyBitmap { width: u16, height: u16 },

    #[error("pixel data too short: expected {expected} bytes, got {actual}")]
    PixelDataTooShort { expected: usize, actual: usize },

    #[error("strip-encoded scanline {scanline} is truncated")]
    TruncatedStrip { scanline: usize },

    #[error("strip-encoded scanline {scanline} ends before it starts ({first}..{last})")]
    InvertedStrip { scanline: usize, first: u16, last: u16 },

    #[error("shading table set is empty")]
    NoShadingTables,

    #[error("shading table data size mismatch: expected {expected} bytes, got {actual}")]
    ShadingTableSize { expected: usize, actual: usize },
}
