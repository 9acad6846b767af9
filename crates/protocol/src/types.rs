use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }
}

/// An sRGB color with straight alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Build a color from a `0xRRGGBB` literal.
    pub const fn from_hex(hex: u32) -> Self {
        Self::rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Blank space around the plot area, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// Outer canvas geometry. The plot area is the outer size minus the margins,
/// and everything drawn in plot space is translated by `(left, top)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub margins: Margins,
}

impl Viewport {
    pub fn plot_width(&self) -> f64 {
        self.width - self.margins.left - self.margins.right
    }

    pub fn plot_height(&self) -> f64 {
        self.height - self.margins.top - self.margins.bottom
    }

    /// Top-left corner of the plot area in outer coordinates.
    pub fn plot_origin(&self) -> Point {
        Point::new(self.margins.left, self.margins.top)
    }

    /// Convert an outer (page) position into plot-space coordinates.
    pub fn to_plot(&self, outer: Point) -> Point {
        Point::new(outer.x - self.margins.left, outer.y - self.margins.top)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plot_area_excludes_margins() {
        let vp = Viewport {
            width: 800.0,
            height: 500.0,
            margins: Margins {
                top: 40.0,
                right: 200.0,
                bottom: 50.0,
                left: 60.0,
            },
        };
        assert_eq!(vp.plot_width(), 540.0);
        assert_eq!(vp.plot_height(), 410.0);
        assert_eq!(vp.to_plot(Point::new(60.0, 40.0)), Point::new(0.0, 0.0));
    }

    #[test]
    fn hex_round_trip() {
        let c = Color::from_hex(0x4e79a7);
        assert_eq!(c, Color::rgb(0x4e, 0x79, 0xa7));
        assert_eq!(c.to_hex(), "#4e79a7");
    }

    #[test]
    fn rect_contains_edges() {
        let r = Rect::new(10.0, 10.0, 20.0, 5.0);
        assert!(r.contains(Point::new(10.0, 10.0)));
        assert!(r.contains(Point::new(30.0, 15.0)));
        assert!(!r.contains(Point::new(30.1, 15.0)));
    }
}
