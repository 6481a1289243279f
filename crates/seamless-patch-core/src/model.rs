use serde::{Deserialize, Serialize};

use crate::error::{PatchError, Result};

/// Axis-aligned rectangle (pixels) given by corners. `x1,y1` is inclusive top-left,
/// `x2,y2` is the exclusive bottom-right. Serialized as `[x1, y1, x2, y2]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "[u32; 4]", into = "[u32; 4]")]
pub struct BBox {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl BBox {
    /// Creates a rectangle, rejecting empty or inverted spans.
    pub fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Result<Self> {
        if x1 >= x2 || y1 >= y2 {
            return Err(PatchError::InvalidGeometry(format!(
                "rectangle ({x1}, {y1}, {x2}, {y2}) has non-positive area"
            )));
        }
        Ok(Self { x1, y1, x2, y2 })
    }

    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    /// Returns true if `r` is fully inside `self`.
    pub fn contains(&self, r: &BBox) -> bool {
        r.x1 >= self.x1 && r.y1 >= self.y1 && r.x2 <= self.x2 && r.y2 <= self.y2
    }

    /// Returns true if the rectangle lies within an image of the given size.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x2 <= width && self.y2 <= height
    }

    /// Grows the rectangle by `padding` on every side, clamped to `[0, width] x [0, height]`.
    pub fn padded_within(&self, padding: u32, width: u32, height: u32) -> BBox {
        BBox {
            x1: self.x1.saturating_sub(padding),
            y1: self.y1.saturating_sub(padding),
            x2: self.x2.saturating_add(padding).min(width),
            y2: self.y2.saturating_add(padding).min(height),
        }
    }
}

impl TryFrom<[u32; 4]> for BBox {
    type Error = PatchError;
    fn try_from(v: [u32; 4]) -> Result<Self> {
        BBox::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BBox> for [u32; 4] {
    fn from(b: BBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

impl std::fmt::Display for BBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {}, {})", self.x1, self.y1, self.x2, self.y2)
    }
}
