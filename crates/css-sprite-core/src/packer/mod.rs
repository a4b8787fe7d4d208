use crate::model::Rect;

pub mod shelf;
pub mod strip;

/// A packer places rectangles onto one growing canvas.
///
/// Implementations must never hand out overlapping rectangles. `pack` returns
/// `None` only when the placement is not representable in `u32` pixel
/// coordinates.
pub trait Packer {
    fn can_pack(&self, w: u32, h: u32) -> bool;
    fn pack(&mut self, w: u32, h: u32) -> Option<Rect>;
    /// Tight bounding box of everything placed so far.
    fn extent(&self) -> (u32, u32);
}
