use crate::compositing::{check_canvas, compose_canvas};
use crate::config::SpriteConfig;
use crate::error::Result;
use crate::layout::pack_layout;
use crate::loader::descriptors_from_images;
use crate::model::{ImageDescriptor, InputImage, Layout, LayoutStats, StyleRule};
use crate::output::{encode_image, write_all_or_nothing};
use crate::stylesheet::emit_stylesheet;
use image::RgbaImage;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Everything a run produces, still in memory.
pub struct SpriteSheet {
    pub layout: Layout,
    pub canvas: RgbaImage,
    pub rules: Vec<StyleRule>,
    pub css: String,
}

impl SpriteSheet {
    /// Convenience for `layout.stats()`.
    pub fn stats(&self) -> LayoutStats {
        self.layout.stats()
    }
}

#[instrument(skip_all, fields(count = descriptors.len()))]
/// Lays out `descriptors`, then composes the sheet and emits the stylesheet.
///
/// Notes:
/// - The canvas size is checked right after layout, before any pixels are touched.
/// - With feature `parallel` and `cfg.parallel`, composing and emitting run concurrently.
/// - Nothing is written to disk; see [`write_sprite_sheet`].
pub fn build_sprite_sheet(
    descriptors: &[ImageDescriptor],
    cfg: &SpriteConfig,
    image_url: &str,
) -> Result<SpriteSheet> {
    let layout = pack_layout(descriptors, cfg)?;
    check_canvas(layout.width, layout.height, cfg)?;

    let (canvas, emitted) = compose_and_emit(&layout, descriptors, cfg, image_url);
    let canvas = canvas?;
    let (rules, css) = emitted?;

    let stats = layout.stats();
    info!(
        images = stats.num_images,
        width = stats.width,
        height = stats.height,
        occupancy = format!("{:.2}%", stats.occupancy * 100.0),
        "sprite sheet built"
    );
    Ok(SpriteSheet {
        layout,
        canvas,
        rules,
        css,
    })
}

type Emitted = Result<(Vec<StyleRule>, String)>;

fn compose_and_emit(
    layout: &Layout,
    descriptors: &[ImageDescriptor],
    cfg: &SpriteConfig,
    image_url: &str,
) -> (Result<RgbaImage>, Emitted) {
    #[cfg(feature = "parallel")]
    {
        if cfg.parallel {
            return rayon::join(
                || compose_canvas(layout, descriptors, cfg),
                || emit_stylesheet(layout, cfg, image_url),
            );
        }
    }
    (
        compose_canvas(layout, descriptors, cfg),
        emit_stylesheet(layout, cfg, image_url),
    )
}

/// In-memory variant of [`build_sprite_sheet`] for already-decoded images.
pub fn build_from_images(
    inputs: Vec<InputImage>,
    cfg: &SpriteConfig,
    image_url: &str,
) -> Result<SpriteSheet> {
    let descriptors = descriptors_from_images(inputs, cfg)?;
    build_sprite_sheet(&descriptors, cfg, image_url)
}

/// Encodes the sheet and writes the image and the CSS, both or neither.
///
/// `css` lets callers substitute their own rendering (e.g. a template);
/// `None` writes `sheet.css`.
pub fn write_sprite_sheet(
    sheet: &SpriteSheet,
    image_path: &Path,
    css_path: &Path,
    css: Option<&str>,
    cfg: &SpriteConfig,
) -> Result<Vec<PathBuf>> {
    write_sprite_sheet_with(sheet, image_path, css_path, css, &[], cfg)
}

#[instrument(skip_all, fields(image = ?image_path, css = ?css_path, extra = extra.len()))]
/// Like [`write_sprite_sheet`], with `extra` artifacts (manifest, stats, ...)
/// committed in the same batch: either every file is written or none is.
pub fn write_sprite_sheet_with(
    sheet: &SpriteSheet,
    image_path: &Path,
    css_path: &Path,
    css: Option<&str>,
    extra: &[(&Path, &[u8])],
    cfg: &SpriteConfig,
) -> Result<Vec<PathBuf>> {
    let image_bytes = encode_image(&sheet.canvas, image_path, cfg.background)?;
    let css = css.unwrap_or(&sheet.css);
    let mut artifacts: Vec<(&Path, &[u8])> = Vec::with_capacity(2 + extra.len());
    artifacts.push((image_path, image_bytes.as_slice()));
    artifacts.push((css_path, css.as_bytes()));
    artifacts.extend_from_slice(extra);
    let written = write_all_or_nothing(&artifacts)?;
    info!(
        bytes = image_bytes.len(),
        rules = sheet.rules.len(),
        files = written.len(),
        "artifacts written"
    );
    Ok(written)
}
