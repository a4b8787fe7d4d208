use super::Packer;
use crate::model::Rect;

#[derive(Clone, Debug)]
struct Shelf {
    y: u32,
    h: u32,
    /// Next free x on this shelf.
    x: u32,
}

/// Next-fit shelf packer.
///
/// Rectangles fill the open shelf left to right; when one would push the
/// shelf past `max_row_width` a new shelf opens below the tallest item of the
/// current one. Items wider than `max_row_width` get a shelf of their own.
#[derive(Debug, Clone)]
pub struct ShelfPacker {
    max_row_width: u32,
    shelves: Vec<Shelf>,
    width: u32,
}

impl ShelfPacker {
    pub fn new(max_row_width: u32) -> Self {
        Self {
            max_row_width,
            shelves: Vec::new(),
            width: 0,
        }
    }

    /// Number of shelves opened so far.
    pub fn rows(&self) -> usize {
        self.shelves.len()
    }

    fn next_y(&self) -> Option<u32> {
        match self.shelves.last() {
            Some(sh) => sh.y.checked_add(sh.h),
            None => Some(0),
        }
    }

    /// Which shelf `w` goes on: `Some(true)` for the open one, `Some(false)` for a new one.
    fn choose(&self, w: u32, h: u32) -> Option<bool> {
        if let Some(sh) = self.shelves.last() {
            let fits = sh.x == 0 || sh.x as u64 + w as u64 <= self.max_row_width as u64;
            if fits {
                sh.x.checked_add(w)?;
                sh.y.checked_add(h)?;
                return Some(true);
            }
        }
        self.next_y()?.checked_add(h)?;
        Some(false)
    }
}

impl Packer for ShelfPacker {
    fn can_pack(&self, w: u32, h: u32) -> bool {
        self.choose(w, h).is_some()
    }

    fn pack(&mut self, w: u32, h: u32) -> Option<Rect> {
        if !self.choose(w, h)? {
            let y = self.next_y()?;
            self.shelves.push(Shelf { y, h: 0, x: 0 });
        }
        let sh = self.shelves.last_mut()?;
        let r = Rect::new(sh.x, sh.y, w, h);
        sh.x += w;
        sh.h = sh.h.max(h);
        self.width = self.width.max(sh.x);
        Some(r)
    }

    fn extent(&self) -> (u32, u32) {
        let h = self.shelves.last().map(|sh| sh.y + sh.h).unwrap_or(0);
        (self.width, h)
    }
}
