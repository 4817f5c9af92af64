//! Infravision tinting
//!
//! While infravision is active, tinted collections are drawn as a grayscale
//! of their colors multiplied by a per-collection tint.

use aleph_core::ConfigError;
use aleph_core::config::InfravisionTintConfig;
use aleph_shared::{CollectionId, NUMBER_OF_COLLECTIONS};
use glam::{Vec3, Vec4};
use tracing::warn;

/// Tint of one collection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InfravisionTint {
    pub color: Vec3,
    pub is_tinted: bool,
}

impl Default for InfravisionTint {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            is_tinted: false,
        }
    }
}

/// Global infravision state and per-collection tints
#[derive(Debug, Clone)]
pub struct InfravisionTinter {
    active: bool,
    tints: [InfravisionTint; NUMBER_OF_COLLECTIONS],
}

impl Default for InfravisionTinter {
    fn default() -> Self {
        Self::new()
    }
}

impl InfravisionTinter {
    /// Inactive, with no collection tinted
    pub fn new() -> Self {
        Self {
            active: false,
            tints: [InfravisionTint::default(); NUMBER_OF_COLLECTIONS],
        }
    }

    /// Apply configured tints; invalid entries are logged and skipped.
    pub fn from_config(entries: &[InfravisionTintConfig]) -> Self {
        let mut tinter = Self::new();
        for entry in entries {
            if let Err(e) = tinter.set_tint(
                entry.collection,
                entry.tinted,
                entry.red,
                entry.green,
                entry.blue,
            ) {
                warn!("Ignoring infravision tint: {}", e);
            }
        }
        tinter
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn tint(&self, collection: CollectionId) -> InfravisionTint {
        self.tints[collection.index()]
    }

    /// Set the tint of a collection.
    ///
    /// # Errors
    ///
    /// Fails for collection indices outside the collection table.
    pub fn set_tint(
        &mut self,
        collection: u8,
        is_tinted: bool,
        red: f32,
        green: f32,
        blue: f32,
    ) -> Result<(), ConfigError> {
        let id = CollectionId::new(collection).ok_or(ConfigError::UnknownCollection(collection))?;
        self.tints[id.index()] = InfravisionTint {
            color: Vec3::new(red, green, blue),
            is_tinted,
        };
        Ok(())
    }

    /// Infravision rendition of a color; unchanged unless active and tinted.
    pub fn find_infravision_version(&self, collection: CollectionId, color: Vec4) -> Vec4 {
        let tint = self.tint(collection);
        if !self.active || !tint.is_tinted {
            return color;
        }
        let gray = (color.x + color.y + color.z) / 3.0;
        (tint.color * gray).extend(color.w)
    }
}
