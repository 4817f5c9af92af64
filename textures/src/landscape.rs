//! Flat-colored landscapes
//!
//! Replaces a landscape bitmap with a canvas split into land (lower rows) and
//! sky (upper rows), each a single configured color.

use aleph_core::LandscapeColors;
use aleph_shared::{CollectionId, Rgb16};
use glam::{Vec3, Vec4};

use crate::canvas::Canvas;
use crate::color::pack_float_color;
use crate::infravision::InfravisionTinter;

/// Opaque float color of a 16-bit-per-channel color
fn opaque(color: Rgb16) -> Vec4 {
    Vec3::from_array(color.to_f32()).extend(1.0)
}

/// Build a flat landscape canvas.
///
/// `infravision` tints both colors as the given collection when the
/// infravision color table is being built.
pub fn flat_landscape(
    width: u32,
    height: u32,
    colors: LandscapeColors,
    infravision: Option<(&InfravisionTinter, CollectionId)>,
) -> Canvas {
    let mut land = opaque(colors.land);
    let mut sky = opaque(colors.sky);
    if let Some((tinter, collection)) = infravision {
        land = tinter.find_infravision_version(collection, land);
        sky = tinter.find_infravision_version(collection, sky);
    }

    let half = height / 2;
    let mut canvas = Canvas::new(width, height);
    canvas.fill_rows(0..half, pack_float_color(land));
    canvas.fill_rows(half..half * 2, pack_float_color(sky));
    canvas
}
