//! CSS Layout Engine
//!
//! This module implements the normal-flow part of the CSS Visual Formatting
//! Model: block boxes stacked vertically, with inline content packed into
//! line boxes.
//!
//! # Relevant Specifications
//!
//! - [CSS 2.1 Visual Formatting Model](https://www.w3.org/TR/CSS2/visuren.html)
//! - [CSS 2.1 Visual Formatting Model Details](https://www.w3.org/TR/CSS2/visudet.html)
//! - [CSS Box Model Module Level 3](https://www.w3.org/TR/css-box-3/)
//! - [CSS Text Module Level 3](https://www.w3.org/TR/css-text-3/)
//!
//! # Module Structure
//!
//! - [`box_model`] - Box dimensions, rectangles, and edge sizes
//! - [`inline`] - Inline formatting context with line box model
//! - [`layout_box`] - Layout tree construction and block layout

pub mod box_model;
pub mod inline;
pub mod layout_box;

pub use box_model::{BoxDimensions, EdgeSizes, Rect};
pub use inline::{
    ApproximateFontMetrics, FontMetrics, InlineBox, InlineFormatter, InlineItem, LINE_WIDTH_TOLERANCE,
    LineBox,
};
pub use layout_box::{FlowItem, LayoutBox, LayoutBoxId, LayoutTree, compute_layout};

use crate::style::DisplayValue;

// [HTML Living Standard § 15 Rendering](https://html.spec.whatwg.org/multipage/rendering.html)
// defines the default CSS styles for HTML elements.

/// Returns the default display value for an HTML element.
///
/// [§ 15.3.1 Hidden elements](https://html.spec.whatwg.org/multipage/rendering.html#hidden-elements)
/// [§ 15.3.2 The page](https://html.spec.whatwg.org/multipage/rendering.html#the-page)
/// [§ 15.3.3 Flow content](https://html.spec.whatwg.org/multipage/rendering.html#flow-content-3)
#[must_use]
pub fn default_display_for_element(tag_name: &str) -> DisplayValue {
    // [§ 15.3.1 Hidden elements]
    // "The following elements must have their display set to none:"
    const HIDDEN: &[&str] = &[
        "area", "base", "basefont", "datalist", "head", "link", "meta", "noembed", "noframes",
        "param", "rp", "script", "style", "template", "title",
    ];
    // [§ 15.3.3 Flow content]
    const BLOCK: &[&str] = &[
        "address", "article", "aside", "blockquote", "body", "center", "dd", "details", "dialog",
        "dir", "div", "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2",
        "h3", "h4", "h5", "h6", "header", "hgroup", "hr", "html", "legend", "listing", "main",
        "menu", "nav", "ol", "p", "plaintext", "pre", "search", "section", "summary", "ul", "xmp",
        // Tables degrade to stacked blocks with inline cells.
        "table", "caption", "thead", "tbody", "tfoot", "tr",
    ];

    let tag_name = tag_name.to_ascii_lowercase();
    if HIDDEN.contains(&tag_name.as_str()) {
        return DisplayValue::None;
    }
    // [§ 15.3.7 Lists](https://html.spec.whatwg.org/multipage/rendering.html#lists)
    // "li { display: list-item; }"
    if tag_name == "li" || BLOCK.contains(&tag_name.as_str()) {
        return DisplayValue::Block;
    }
    DisplayValue::Inline
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_display() {
        assert_eq!(default_display_for_element("div"), DisplayValue::Block);
        assert_eq!(default_display_for_element("LI"), DisplayValue::Block);
        assert_eq!(default_display_for_element("head"), DisplayValue::None);
        assert_eq!(default_display_for_element("span"), DisplayValue::Inline);
        assert_eq!(default_display_for_element("custom-thing"), DisplayValue::Inline);
    }
}
