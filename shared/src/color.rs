//! Classic 16-bit-per-channel colors

use serde::{Deserialize, Serialize};

/// RGB color with 16-bit channels (0..=65535), as stored in preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb16 {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
}

impl Rgb16 {
    pub const fn new(red: u16, green: u16, blue: u16) -> Self {
        Self { red, green, blue }
    }

    /// Channels as floats in [0, 1]
    pub fn to_f32(self) -> [f32; 3] {
        let max = u16::MAX as f32;
        [
            self.red as f32 / max,
            self.green as f32 / max,
            self.blue as f32 / max,
        ]
    }
}
