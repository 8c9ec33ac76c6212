use serde::{Deserialize, Serialize};

/// Integer pixel rectangle. A rectangle with `w == 0` is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.w == 0
    }

    /// Grow the rectangle so that it contains the given pixel.
    /// An empty rectangle becomes a 1x1 rectangle at the point.
    pub fn expand_to_include(&mut self, x: i32, y: i32) {
        if self.is_empty() {
            *self = Rect { x, y, w: 1, h: 1 };
            return;
        }
        if x < self.x {
            self.w += self.x - x;
            self.x = x;
        } else if x >= self.x + self.w {
            self.w = x - self.x + 1;
        }
        if y < self.y {
            self.h += self.y - y;
            self.y = y;
        } else if y >= self.y + self.h {
            self.h = y - self.y + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty() {
        let rect = Rect::default();
        assert!(rect.is_empty());
    }

    #[test]
    fn test_expand_from_empty() {
        let mut rect = Rect::default();
        rect.expand_to_include(5, -3);
        assert_eq!(rect, Rect::new(5, -3, 1, 1));
        assert!(!rect.is_empty());
    }

    #[test]
    fn test_expand_grows_all_sides() {
        let mut rect = Rect::new(10, 10, 1, 1);

        rect.expand_to_include(12, 10);
        assert_eq!(rect, Rect::new(10, 10, 3, 1));

        rect.expand_to_include(8, 14);
        assert_eq!(rect, Rect::new(8, 10, 5, 5));
    }

    #[test]
    fn test_expand_with_contained_point_is_noop() {
        let mut rect = Rect::new(0, 0, 10, 10);
        rect.expand_to_include(4, 4);
        assert_eq!(rect, Rect::new(0, 0, 10, 10));
    }
}
