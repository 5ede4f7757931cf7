//! The host-facing result of a render.

use serde::Serialize;

use quokka_css::{DisplayList, PaintCommand};

/// The visible band of the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Viewport {
    /// Scroll offset from the top of the document.
    pub offset: f32,
    /// Height of the visible band.
    pub visible_height: f32,
}

impl Viewport {
    /// Bottom edge of the band in document coordinates.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.offset + self.visible_height
    }
}

/// A painted document, independent of any UI toolkit.
///
/// Commands are in document coordinates; a host draws
/// [`Scene::visible_commands`] shifted up by `viewport.offset`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    /// Every paint command, back to front.
    pub display_list: DisplayList,
    /// Width the document was laid out at.
    pub width: f32,
    /// Height of the laid-out document.
    pub content_height: f32,
    /// The band the host is showing.
    pub viewport: Viewport,
}

impl Scene {
    /// All commands.
    #[must_use]
    pub fn commands(&self) -> &[PaintCommand] {
        self.display_list.commands()
    }

    /// Commands that intersect the viewport, in painting order.
    pub fn visible_commands(&self) -> impl Iterator<Item = &PaintCommand> {
        self.display_list
            .intersecting(self.viewport.offset, self.viewport.bottom())
    }

    /// Whether nothing would be drawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.display_list.is_empty()
    }
}
