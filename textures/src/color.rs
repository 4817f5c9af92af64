//! Packed 0xRRGGBBAA color helpers
//!
//! Colors travel through the pipeline as `u32` with red in the highest byte
//! and alpha in the lowest, so `to_be_bytes()` yields R, G, B, A.

use glam::Vec4;

/// Alpha byte of a packed color
pub const ALPHA_MASK: u32 = 0x0000_00ff;

/// Color bytes of a packed color
pub const COLOR_MASK: u32 = 0xffff_ff00;

/// Opaque black
pub const OPAQUE_BLACK: u32 = 0x0000_00ff;

#[inline]
pub fn pack_rgba8(r: u8, g: u8, b: u8, a: u8) -> u32 {
    u32::from_be_bytes([r, g, b, a])
}

/// Red, green and blue bytes of a packed color
#[inline]
pub fn rgb_channels(color: u32) -> [u8; 3] {
    let [r, g, b, _] = color.to_be_bytes();
    [r, g, b]
}

/// Opacity in [0, 1] to an alpha byte
#[inline]
pub fn alpha_from_opacity(opacity: f32) -> u32 {
    (255.0 * opacity + 0.5) as u32
}

/// Float channel in [0, 1] to a byte, clamping out-of-range values
#[inline]
pub fn make_eight_bit(channel: f32) -> u32 {
    ((255.0 * channel + 0.5) as i32).clamp(0, 255) as u32
}

/// Pack a float RGBA color
pub fn pack_float_color(color: Vec4) -> u32 {
    (make_eight_bit(color.x) << 24)
        | (make_eight_bit(color.y) << 16)
        | (make_eight_bit(color.z) << 8)
        | make_eight_bit(color.w)
}

/// Expand a 1-5-5-5 ARGB word to opaque RGBA 8888.
///
/// Each 5-bit channel is widened by replicating its high bits.
pub fn expand_rgb555(word: u16) -> u32 {
    let widen = |c: u16| {
        let c = (c & 0x1f) as u8;
        (c << 3) | (c >> 2)
    };
    pack_rgba8(widen(word >> 10), widen(word >> 5), widen(word), 0xff)
}
