use super::Packer;
use crate::model::Rect;

/// Single-row packer: every rectangle goes at `(x, 0)` and `x` advances by its width.
#[derive(Debug, Default, Clone)]
pub struct StripPacker {
    x: u32,
    max_height: u32,
}

impl StripPacker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Packer for StripPacker {
    fn can_pack(&self, w: u32, _h: u32) -> bool {
        self.x.checked_add(w).is_some()
    }

    fn pack(&mut self, w: u32, h: u32) -> Option<Rect> {
        let next_x = self.x.checked_add(w)?;
        let r = Rect::new(self.x, 0, w, h);
        self.x = next_x;
        self.max_height = self.max_height.max(h);
        Some(r)
    }

    fn extent(&self) -> (u32, u32) {
        (self.x, self.max_height)
    }
}
