//! CSS Painting
//!
//! [CSS 2.1 Appendix E - Elaborate description of Stacking Contexts](https://www.w3.org/TR/CSS2/zindex.html)
//!
//! This module implements the painting phase, which converts a layout tree into
//! a display list of drawing commands. The display list can then be executed by
//! any renderer.
//!
//! # Architecture
//!
//! ```text
//! Style → Layout → Paint → Render
//!                    ↓
//!              DisplayList
//! ```
//!
//! Everything is in normal flow, so painting order is document order: a
//! box's background and border, then its content.

mod display_list;
mod painter;

pub use display_list::{DisplayList, PaintCommand, PaintRegion};
pub use painter::Painter;
