use crate::config::{LayoutStrategy, SpriteConfig};
use crate::error::{Result, SpriteError};
use crate::model::{ImageDescriptor, Layout, PlacedRect};
use crate::packer::{Packer, shelf::ShelfPacker, strip::StripPacker};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Fails with `DuplicateName` on the first name seen twice.
/// Items are `(name, source)` pairs; the sources end up in the error.
pub fn ensure_unique_names<'a, I>(items: I) -> Result<()>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut seen: HashMap<&str, &str> = HashMap::new();
    for (name, source) in items {
        if let Some(first) = seen.insert(name, source) {
            return Err(SpriteError::DuplicateName {
                name: name.to_string(),
                first: first.to_string(),
                second: source.to_string(),
            });
        }
    }
    Ok(())
}

fn make_packer(cfg: &SpriteConfig) -> Box<dyn Packer> {
    match cfg.layout {
        LayoutStrategy::Strip => Box::new(StripPacker::new()),
        LayoutStrategy::Shelf => Box::new(ShelfPacker::new(cfg.max_row_width)),
    }
}

#[instrument(skip_all, fields(count = descriptors.len(), layout = ?cfg.layout))]
/// Places every descriptor exactly once, in the given order.
///
/// Notes:
/// - Duplicate names are rejected before anything is placed.
/// - An empty list yields an empty 0x0 layout.
/// - The canvas is the tight bounding box of the placements.
pub fn pack_layout(descriptors: &[ImageDescriptor], cfg: &SpriteConfig) -> Result<Layout> {
    cfg.validate()?;
    ensure_unique_names(
        descriptors
            .iter()
            .map(|d| (d.name.as_str(), d.source.as_str())),
    )?;

    let mut packer = make_packer(cfg);
    let mut placements = Vec::with_capacity(descriptors.len());
    for (index, d) in descriptors.iter().enumerate() {
        let overflow = |(w, h): (u32, u32)| SpriteError::CanvasAllocation {
            width: w as u64 + d.width as u64,
            height: h as u64 + d.height as u64,
            limit: cfg.max_dimension,
        };
        let before = packer.extent();
        if !packer.can_pack(d.width, d.height) {
            return Err(overflow(before));
        }
        let frame = packer
            .pack(d.width, d.height)
            .ok_or_else(|| overflow(before))?;
        debug!(name = %d.name, x = frame.x, y = frame.y, w = frame.w, h = frame.h, "placed");
        placements.push(PlacedRect {
            index,
            name: d.name.clone(),
            frame,
        });
    }

    let (width, height) = packer.extent();
    Ok(Layout {
        placements,
        width,
        height,
    })
}
