/// Display geometry of the drawing surface, in physical pixels.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Width / height. Falls back to `1.0` for a degenerate viewport.
    #[inline]
    pub fn aspect(self) -> f32 {
        if self.is_valid() {
            self.width as f32 / self.height as f32
        } else {
            1.0
        }
    }

    /// Maps a pixel position to `[0, 1]` normalized screen coordinates (top-left origin).
    ///
    /// Returns `None` for a degenerate viewport.
    pub fn normalize(self, x: f32, y: f32) -> Option<(f32, f32)> {
        if !self.is_valid() || !x.is_finite() || !y.is_finite() {
            return None;
        }
        Some((x / self.width as f32, y / self.height as f32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_center() {
        assert_eq!(Viewport::new(480, 960).normalize(240.0, 480.0), Some((0.5, 0.5)));
    }

    #[test]
    fn normalize_degenerate_is_none() {
        assert_eq!(Viewport::new(0, 960).normalize(1.0, 1.0), None);
    }

    #[test]
    fn aspect_degenerate_falls_back() {
        assert_eq!(Viewport::default().aspect(), 1.0);
    }
}
