//! Core library for concatenating images into one CSS sprite sheet.
//!
//! - Loader: decodes sources into named, ordered `ImageDescriptor`s
//! - Layout: Strip (single row) or Shelf (wrapped rows), no overlaps, tight canvas
//! - Compositor + stylesheet emitter: one RGBA sheet and one CSS class per image
//! - Output: encoded image and CSS written atomically, both or neither
//!
//! Quick example:
//! ```ignore
//! use css_sprite_core::prelude::*;
//! # fn main() -> anyhow::Result<()> {
//! let cfg = SpriteConfig::default();
//! let descriptors = load_descriptors(&["icons/a.png", "icons/b.png"], &cfg)?;
//! let sheet = build_sprite_sheet(&descriptors, &cfg, "sprites.png")?;
//! write_sprite_sheet(&sheet, "sprites.png".as_ref(), "sprites.css".as_ref(), None, &cfg)?;
//! # Ok(()) }
//! ```

pub mod compositing;
pub mod config;
pub mod error;
pub mod export;
pub mod layout;
pub mod loader;
pub mod model;
pub mod output;
pub mod packer;
pub mod pipeline;
pub mod stylesheet;

pub use config::*;
pub use error::*;
pub use export::*;
pub use layout::*;
pub use loader::*;
pub use model::*;
pub use pipeline::*;
pub use stylesheet::*;

/// Re-exported so callers build `InputImage`s against the same `image` version.
pub use image;

/// Convenience prelude for common types and functions.
/// Importing `css_sprite_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{
        LayoutStrategy, NameCase, SortOrder, SpriteConfig, SpriteConfigBuilder,
    };
    pub use crate::error::{Result, SpriteError};
    pub use crate::model::{
        ImageDescriptor, InputImage, Layout, LayoutStats, PlacedRect, Rect, StyleRule,
    };
    pub use crate::{
        SpriteSheet, build_from_images, build_sprite_sheet, load_descriptors, pack_layout,
        write_sprite_sheet, write_sprite_sheet_with,
    };
}
