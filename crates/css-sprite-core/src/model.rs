use image::{DynamicImage, RgbaImage};
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Exclusive right edge (`x + w`), widened so it never overflows.
    pub fn right(&self) -> u64 {
        self.x as u64 + self.w as u64
    }
    /// Exclusive bottom edge (`y + h`).
    pub fn bottom(&self) -> u64 {
        self.y as u64 + self.h as u64
    }
    /// True if the two rectangles share at least one pixel.
    pub fn overlaps(&self, other: &Rect) -> bool {
        (self.x as u64) < other.right()
            && (other.x as u64) < self.right()
            && (self.y as u64) < other.bottom()
            && (other.y as u64) < self.bottom()
    }
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }
}

/// In-memory image to lay out (key + decoded image).
///
/// `key` is treated like a file name: its stem becomes the image name.
pub struct InputImage {
    pub key: String,
    pub image: DynamicImage,
}

/// A decoded source image ready for layout.
#[derive(Debug, Clone)]
pub struct ImageDescriptor {
    /// Normalized name, unique within one sheet.
    pub name: String,
    /// Where the pixels came from (file name or key), for diagnostics.
    pub source: String,
    pub width: u32,
    pub height: u32,
    pub pixels: RgbaImage,
}

impl ImageDescriptor {
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Where one descriptor landed on the canvas.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlacedRect {
    /// Index of the descriptor in the list the layout was built from.
    pub index: usize,
    pub name: String,
    pub frame: Rect,
}

/// Result of the layout engine. Placements keep the descriptor order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Layout {
    pub placements: Vec<PlacedRect>,
    pub width: u32,
    pub height: u32,
}

impl Layout {
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Computes packing statistics for this layout.
    pub fn stats(&self) -> LayoutStats {
        let canvas_area = self.width as u64 * self.height as u64;
        let used_area: u64 = self.placements.iter().map(|p| p.frame.area()).sum();
        let occupancy = if canvas_area > 0 {
            used_area as f64 / canvas_area as f64
        } else {
            0.0
        };
        LayoutStats {
            num_images: self.placements.len(),
            width: self.width,
            height: self.height,
            canvas_area,
            used_area,
            occupancy,
        }
    }
}

/// One CSS rule per placement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StyleRule {
    pub class_name: String,
    /// Always `-x`, so never positive.
    pub offset_x: i64,
    /// Always `-y`, so never positive.
    pub offset_y: i64,
    pub width: u32,
    pub height: u32,
}

/// Statistics about layout efficiency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LayoutStats {
    pub num_images: usize,
    pub width: u32,
    pub height: u32,
    /// width * height of the canvas.
    pub canvas_area: u64,
    /// Sum of the placed image areas.
    pub used_area: u64,
    /// used_area / canvas_area (0.0 to 1.0). Higher is better.
    pub occupancy: f64,
}

impl LayoutStats {
    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Images: {}, Canvas: {}x{}, Occupancy: {:.2}%, Used Area: {} px², Wasted: {} px²",
            self.num_images,
            self.width,
            self.height,
            self.occupancy * 100.0,
            self.used_area,
            self.wasted_area(),
        )
    }

    /// Returns wasted space in pixels.
    pub fn wasted_area(&self) -> u64 {
        self.canvas_area.saturating_sub(self.used_area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_rects_do_not_overlap() {
        let a = Rect::new(0, 0, 10, 20);
        let b = Rect::new(10, 0, 5, 5);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&Rect::new(9, 19, 5, 5)));
    }

    #[test]
    fn empty_layout_stats() {
        let s = Layout::default().stats();
        assert_eq!(s.num_images, 0);
        assert_eq!(s.canvas_area, 0);
        assert_eq!(s.occupancy, 0.0);
    }
}
