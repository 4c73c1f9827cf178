use std::fmt::Debug;

// Frame of a web view in its host's coordinate space
#[derive(Clone, Copy, Eq, PartialEq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Debug for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Rect {{ x: {}, y: {}, width: {}, height: {} }}", self.x, self.y, self.width, self.height)
    }
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// A rect at the origin.
    pub fn sized(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sized_rect_starts_at_origin() {
        let r = Rect::sized(320, 480);
        assert_eq!(r, Rect::new(0, 0, 320, 480));
        assert!(!r.is_empty());
        assert!(Rect::default().is_empty());
    }
}
