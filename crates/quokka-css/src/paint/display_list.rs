//! Display List - a sequence of drawing commands
//!
//! [CSS 2.1 Appendix E](https://www.w3.org/TR/CSS2/zindex.html)
//!
//! The display list is the output of the painting phase. It contains all the
//! drawing commands needed to render a page, back to front.

use serde::Serialize;

use quokka_dom::NodeId;

use crate::layout::Rect;
use crate::style::{BorderStyle, ColorValue, Sides};

/// A single drawing command.
///
/// [CSS 2.1 Appendix E.2 Painting order](https://www.w3.org/TR/CSS2/zindex.html#painting-order)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaintCommand {
    /// Fill the border box with the background color.
    ///
    /// [§ 3.7 'background-clip'](https://www.w3.org/TR/css-backgrounds-3/#background-clip)
    /// "The initial value of 'background-clip' is 'border-box'."
    Background {
        /// Element the background belongs to.
        node: NodeId,
        /// The border box.
        rect: Rect,
        /// Fill color.
        color: ColorValue,
    },

    /// Stroke the four border sides of a box.
    ///
    /// [§ 4 Borders](https://www.w3.org/TR/css-backgrounds-3/#borders)
    Border {
        /// Element the border belongs to.
        node: NodeId,
        /// The border box; each side is drawn inward from its edge.
        rect: Rect,
        /// Used width per side.
        widths: Sides<f32>,
        /// Style per side.
        styles: Sides<BorderStyle>,
        /// Color per side.
        colors: Sides<ColorValue>,
    },

    /// Draw a run of text. `rect` is the inline box: the text's top-left
    /// corner and its measured extent.
    Text {
        /// Text node the run came from.
        node: NodeId,
        /// Where the text sits.
        rect: Rect,
        /// The text, with whitespace already collapsed.
        text: String,
        /// Font size in pixels.
        font_size: f32,
        /// Text color.
        color: ColorValue,
        /// `href` of the enclosing link, as written in the document.
        link: Option<String>,
    },
}

impl PaintCommand {
    /// The area the command paints.
    #[must_use]
    pub const fn rect(&self) -> Rect {
        match self {
            Self::Background { rect, .. } | Self::Border { rect, .. } | Self::Text { rect, .. } => *rect,
        }
    }

    /// The node the command was generated for.
    #[must_use]
    pub const fn node(&self) -> NodeId {
        match self {
            Self::Background { node, .. } | Self::Border { node, .. } | Self::Text { node, .. } => *node,
        }
    }

    /// Link target of a text command.
    #[must_use]
    pub fn link(&self) -> Option<&str> {
        match self {
            Self::Text { link, .. } => link.as_deref(),
            _ => None,
        }
    }
}

/// The border box of one layout box, recorded whether or not anything in it
/// is visible.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PaintRegion {
    /// Element (or document) of the layout box.
    pub node: NodeId,
    /// Its border box.
    pub rect: Rect,
}

/// Commands in painting order, plus one region per layout box.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DisplayList {
    commands: Vec<PaintCommand>,
    regions: Vec<PaintRegion>,
}

impl DisplayList {
    /// Create an empty display list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            commands: Vec::new(),
            regions: Vec::new(),
        }
    }

    /// Add a command to the display list.
    pub fn push(&mut self, command: PaintCommand) {
        self.commands.push(command);
    }

    /// Record the region of a layout box.
    pub fn push_region(&mut self, region: PaintRegion) {
        self.regions.push(region);
    }

    /// Get the commands in painting order.
    #[must_use]
    pub fn commands(&self) -> &[PaintCommand] {
        &self.commands
    }

    /// Regions in the same order the boxes were visited.
    #[must_use]
    pub fn regions(&self) -> &[PaintRegion] {
        &self.regions
    }

    /// Commands whose area overlaps the vertical band `[top, bottom)`.
    pub fn intersecting(&self, top: f32, bottom: f32) -> impl Iterator<Item = &PaintCommand> {
        self.commands
            .iter()
            .filter(move |command| command.rect().overlaps_vertically(top, bottom))
    }

    /// Get the number of commands.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if the display list has no commands.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
