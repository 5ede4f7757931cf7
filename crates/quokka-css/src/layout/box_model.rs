//! CSS Box Model types.
//!
//! [CSS Box Model Module Level 3](https://www.w3.org/TR/css-box-3/)

use serde::Serialize;

use crate::style::Sides;

/// Edge sizes for padding, border, or margin, in pixels.
///
/// [§ 3 The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model)
pub type EdgeSizes = Sides<f32>;

impl EdgeSizes {
    /// Left plus right.
    #[must_use]
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    /// Top plus bottom.
    #[must_use]
    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

/// A rectangle positioned in 2D space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rect {
    /// Horizontal position of the top-left corner.
    pub x: f32,
    /// Vertical position of the top-left corner.
    pub y: f32,
    /// Width of the rectangle.
    pub width: f32,
    /// Height of the rectangle.
    pub height: f32,
}

impl Rect {
    /// Grow the rectangle outward by `edges`.
    #[must_use]
    pub fn expanded_by(&self, edges: &EdgeSizes) -> Self {
        Self {
            x: self.x - edges.left,
            y: self.y - edges.top,
            width: self.width + edges.horizontal(),
            height: self.height + edges.vertical(),
        }
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Whether the point lies inside (top/left edges inclusive).
    #[must_use]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Whether the vertical extent overlaps `[top, bottom)`.
    #[must_use]
    pub fn overlaps_vertically(&self, top: f32, bottom: f32) -> bool {
        self.y < bottom && self.bottom() > top
    }
}

/// [§ 3. The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model)
///
/// "Each box has a content area and optional surrounding padding, border,
/// and margin areas."
///
/// ```text
/// margin box  ⊃  border box  ⊃  padding box  ⊃  content box
/// ```
///
/// Only the content rectangle is stored; the outer boxes are derived by
/// expanding it one layer at a time, per side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BoxDimensions {
    /// Content area, positioned absolutely.
    pub content: Rect,
    /// Padding widths.
    pub padding: EdgeSizes,
    /// Border widths.
    pub border: EdgeSizes,
    /// Margin widths (used values; negative margins are allowed).
    pub margin: EdgeSizes,
}

impl BoxDimensions {
    /// [§ 3.2 Padding](https://www.w3.org/TR/css-box-3/#paddings)
    /// "The padding box contains both the content and padding areas."
    #[must_use]
    pub fn padding_box(&self) -> Rect {
        self.content.expanded_by(&self.padding)
    }

    /// [§ 3.3 Borders](https://www.w3.org/TR/css-box-3/#borders)
    /// "The border box contains content, padding, and border areas."
    #[must_use]
    pub fn border_box(&self) -> Rect {
        self.padding_box().expanded_by(&self.border)
    }

    /// [§ 3.1 Margins](https://www.w3.org/TR/css-box-3/#margins)
    /// "The margin box is the outermost box, and contains all four areas."
    #[must_use]
    pub fn margin_box(&self) -> Rect {
        self.border_box().expanded_by(&self.margin)
    }

    /// Horizontal space taken by margin, border and padding together.
    #[must_use]
    pub fn horizontal_edges(&self) -> f32 {
        self.margin.horizontal() + self.border.horizontal() + self.padding.horizontal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asymmetric_edges_expand_per_side() {
        let dims = BoxDimensions {
            content: Rect {
                x: 20.0,
                y: 30.0,
                width: 100.0,
                height: 50.0,
            },
            padding: Sides { top: 1.0, right: 2.0, bottom: 3.0, left: 4.0 },
            border: Sides { top: 5.0, right: 6.0, bottom: 7.0, left: 8.0 },
            margin: Sides { top: 2.0, right: 0.0, bottom: 1.0, left: 3.0 },
        };
        let border_box = dims.border_box();
        assert_eq!(border_box.x, 8.0);
        assert_eq!(border_box.y, 24.0);
        assert_eq!(border_box.width, 120.0);
        assert_eq!(border_box.height, 66.0);

        let margin_box = dims.margin_box();
        assert_eq!(margin_box.x, 5.0);
        assert_eq!(margin_box.height, 69.0);
        assert_eq!(dims.horizontal_edges(), 23.0);
    }

    #[test]
    fn test_rect_hit_testing() {
        let rect = Rect { x: 0.0, y: 0.0, width: 10.0, height: 10.0 };
        assert!(rect.contains(0.0, 9.9));
        assert!(!rect.contains(10.0, 5.0));
        assert!(rect.overlaps_vertically(5.0, 20.0));
        assert!(!rect.overlaps_vertically(10.0, 20.0));
    }
}
