use crate::config::SpriteConfig;
use crate::error::{Result, SpriteError};
use crate::model::{ImageDescriptor, Layout};
use image::{Rgb, RgbImage, Rgba, RgbaImage};
use tracing::instrument;

/// Rejects canvases the compositor will not allocate.
///
/// Either side above `cfg.max_dimension`, or a byte size that does not fit in
/// `usize`, fails with `CanvasAllocation`.
pub fn check_canvas(width: u32, height: u32, cfg: &SpriteConfig) -> Result<()> {
    let too_big = || SpriteError::CanvasAllocation {
        width: width as u64,
        height: height as u64,
        limit: cfg.max_dimension,
    };
    if width > cfg.max_dimension || height > cfg.max_dimension {
        return Err(too_big());
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|px| px.checked_mul(4))
        .ok_or_else(too_big)?;
    Ok(())
}

/// Copy all of `src` into `canvas` with its top-left at (dx, dy), optionally
/// drawing a red 1px outline on the copied area.
///
/// Pixels are copied verbatim (no blending). Anything falling outside the
/// canvas is clipped.
pub fn blit_rgba(src: &RgbaImage, canvas: &mut RgbaImage, dx: u32, dy: u32, outlines: bool) {
    let (cw, ch) = canvas.dimensions();
    let (sw, sh) = src.dimensions();
    let rw = sw.min(cw.saturating_sub(dx));
    let rh = sh.min(ch.saturating_sub(dy));

    for yy in 0..rh {
        for xx in 0..rw {
            canvas.put_pixel(dx + xx, dy + yy, *src.get_pixel(xx, yy));
        }
    }

    if outlines && rw > 0 && rh > 0 {
        let red = Rgba([255, 0, 0, 255]);
        for xx in 0..rw {
            canvas.put_pixel(dx + xx, dy, red);
            canvas.put_pixel(dx + xx, dy + rh - 1, red);
        }
        for yy in 0..rh {
            canvas.put_pixel(dx, dy + yy, red);
            canvas.put_pixel(dx + rw - 1, dy + yy, red);
        }
    }
}

#[instrument(skip_all, fields(w = layout.width, h = layout.height))]
/// Builds the combined image: a transparent canvas of the layout's size with
/// every descriptor copied to its placement.
///
/// `descriptors` must be the list `layout` was built from.
pub fn compose_canvas(
    layout: &Layout,
    descriptors: &[ImageDescriptor],
    cfg: &SpriteConfig,
) -> Result<RgbaImage> {
    check_canvas(layout.width, layout.height, cfg)?;

    let mut canvas = RgbaImage::new(layout.width, layout.height);
    for p in &layout.placements {
        let desc = descriptors
            .get(p.index)
            .filter(|d| d.name == p.name)
            .ok_or_else(|| {
                SpriteError::InvalidInput(format!(
                    "placement '{}' has no matching descriptor at index {}",
                    p.name, p.index
                ))
            })?;
        if desc.pixels.dimensions() != (p.frame.w, p.frame.h) {
            return Err(SpriteError::InvalidInput(format!(
                "placement '{}' is {}x{} but its image is {}x{}",
                p.name, p.frame.w, p.frame.h, desc.width, desc.height
            )));
        }
        blit_rgba(&desc.pixels, &mut canvas, p.frame.x, p.frame.y, cfg.outlines);
    }
    Ok(canvas)
}

/// Alpha-composites `rgba` over a solid `background`, for formats without alpha.
pub fn flatten_onto(rgba: &RgbaImage, background: [u8; 3]) -> RgbImage {
    let (w, h) = rgba.dimensions();
    RgbImage::from_fn(w, h, |x, y| {
        let Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
        let a = a as u32;
        let mix = |fg: u8, bg: u8| ((fg as u32 * a + bg as u32 * (255 - a) + 127) / 255) as u8;
        Rgb([
            mix(r, background[0]),
            mix(g, background[1]),
            mix(b, background[2]),
        ])
    })
}
