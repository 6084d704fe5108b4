//! Geometric primitives for page-space transforms.
//!
//! This module provides the basic geometric types used when mapping
//! destination coordinates into a page's native coordinate space.

/// A rectangle in document space, stored as two corner points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// X coordinate of the first corner
    pub x0: f32,
    /// Y coordinate of the first corner
    pub y0: f32,
    /// X coordinate of the opposite corner
    pub x1: f32,
    /// Y coordinate of the opposite corner
    pub y1: f32,
}

impl Rect {
    /// Create a new rectangle from two corner points.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_outline::geometry::Rect;
    ///
    /// let rect = Rect::new(0.0, 0.0, 612.0, 792.0);
    /// assert_eq!(rect.width(), 612.0);
    /// assert_eq!(rect.height(), 792.0);
    /// ```
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Width of the rectangle.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Height of the rectangle.
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Return an equivalent rectangle with `x0 <= x1` and `y0 <= y1`.
    pub fn normalized(&self) -> Rect {
        Rect {
            x0: self.x0.min(self.x1),
            y0: self.y0.min(self.y1),
            x1: self.x0.max(self.x1),
            y1: self.y0.max(self.y1),
        }
    }

    /// Transform all four corners by `m` and return the bounding rectangle.
    pub fn transform(&self, m: &Matrix) -> Rect {
        let corners = [
            m.apply(self.x0, self.y0),
            m.apply(self.x1, self.y0),
            m.apply(self.x0, self.y1),
            m.apply(self.x1, self.y1),
        ];
        let mut out = Rect::new(corners[0].0, corners[0].1, corners[0].0, corners[0].1);
        for &(x, y) in &corners[1..] {
            out.x0 = out.x0.min(x);
            out.y0 = out.y0.min(y);
            out.x1 = out.x1.max(x);
            out.y1 = out.y1.max(y);
        }
        out
    }
}

/// A 2D affine transform in the standard PDF form
/// `[a b c d e f]`, mapping `(x, y)` to `(a·x + c·y + e, b·x + d·y + f)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    /// Horizontal scale / rotation component
    pub a: f32,
    /// Vertical shear / rotation component
    pub b: f32,
    /// Horizontal shear / rotation component
    pub c: f32,
    /// Vertical scale / rotation component
    pub d: f32,
    /// Horizontal translation
    pub e: f32,
    /// Vertical translation
    pub f: f32,
}

impl Matrix {
    /// The identity transform.
    pub const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    /// A rotation by `degrees`, normalized to a multiple of 90.
    pub fn rotate(degrees: i64) -> Matrix {
        match degrees.rem_euclid(360) {
            90 => Matrix {
                a: 0.0,
                b: 1.0,
                c: -1.0,
                d: 0.0,
                e: 0.0,
                f: 0.0,
            },
            180 => Matrix {
                a: -1.0,
                b: 0.0,
                c: 0.0,
                d: -1.0,
                e: 0.0,
                f: 0.0,
            },
            270 => Matrix {
                a: 0.0,
                b: -1.0,
                c: 1.0,
                d: 0.0,
                e: 0.0,
                f: 0.0,
            },
            _ => Matrix::IDENTITY,
        }
    }

    /// Apply this transform to a point.
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_dimensions() {
        let r = Rect::new(0.0, 0.0, 612.0, 792.0);
        assert_eq!(r.width(), 612.0);
        assert_eq!(r.height(), 792.0);
    }

    #[test]
    fn test_rect_normalized() {
        let r = Rect::new(612.0, 792.0, 0.0, 0.0).normalized();
        assert_eq!(r.x0, 0.0);
        assert_eq!(r.y1, 792.0);
    }

    #[test]
    fn test_identity_transform() {
        let r = Rect::new(0.0, 0.0, 100.0, 200.0);
        assert_eq!(r.transform(&Matrix::IDENTITY), r);
    }

    #[test]
    fn test_rotate_90_swaps_dimensions() {
        let r = Rect::new(0.0, 0.0, 100.0, 200.0);
        let t = r.transform(&Matrix::rotate(90)).normalized();
        assert_eq!(t.width(), 200.0);
        assert_eq!(t.height(), 100.0);
    }

    #[test]
    fn test_rotate_180_preserves_dimensions() {
        let r = Rect::new(0.0, 0.0, 100.0, 200.0);
        let t = r.transform(&Matrix::rotate(180)).normalized();
        assert_eq!(t.width(), 100.0);
        assert_eq!(t.height(), 200.0);
    }

    #[test]
    fn test_rotate_normalizes_degrees() {
        assert_eq!(Matrix::rotate(450), Matrix::rotate(90));
        assert_eq!(Matrix::rotate(-90), Matrix::rotate(270));
    }
}
