//! CSS parsing, cascade, box layout and display-list generation for the Quokka renderer.
//!
//! # Scope
//!
//! This crate implements:
//! - **CSS Tokenizer** ([§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization))
//!   - Idents, functions, at-keywords, hashes, strings, numbers, dimensions
//!   - Comment handling, with source locations for every token
//!
//! - **CSS Parser** ([§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing))
//!   - Stylesheets, style attributes, `!important`
//!   - Structured [`CssError`]s that point at the offending rule
//!
//! - **CSS Selectors** ([Selectors Level 4](https://www.w3.org/TR/selectors-4/))
//!   - Type, class, ID, universal and attribute selectors
//!   - Compound selectors, selector lists, combinators
//!   - Specificity calculation
//!
//! - **CSS Cascade** ([CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/))
//!   - Origins and importance, specificity and source order
//!   - Property inheritance
//!
//! - **Layout Engine** ([CSS 2.1 Visual Formatting Model](https://www.w3.org/TR/CSS2/visuren.html))
//!   - Block stacking with the § 10.3.3 width constraint
//!   - Inline formatting with whitespace collapsing and line breaking
//!
//! - **Painting** ([CSS 2.1 Appendix E](https://www.w3.org/TR/CSS2/zindex.html))
//!   - Background, border and text commands in document order
//!
//! # Not Yet Implemented
//!
//! - Margin collapsing, floats, positioning
//! - Pseudo-classes and pseudo-elements
//! - Media queries and other at-rules (parsed, then ignored)

/// CSS cascade and style computation per [CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/).
pub mod cascade;
/// Structured CSS syntax errors.
pub mod error;
/// Box layout per [CSS 2.1 § 9](https://www.w3.org/TR/CSS2/visuren.html).
pub mod layout;
/// Display list and painting per [CSS 2.1 Appendix E](https://www.w3.org/TR/CSS2/zindex.html).
pub mod paint;
/// CSS parser per [§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing).
pub mod parser;
/// CSS selector parsing and matching per [Selectors Level 4](https://www.w3.org/TR/selectors-4/).
pub mod selector;
/// Computed style representation per [CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/).
pub mod style;
/// CSS tokenizer per [§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization).
pub mod tokenizer;
/// User-agent stylesheet per [WHATWG HTML § 15 Rendering](https://html.spec.whatwg.org/multipage/rendering.html).
pub mod ua_stylesheet;

// Re-exports for convenience
pub use cascade::{Cascade, Origin, StyledTree, compute_styles};
pub use error::CssError;
pub use layout::{
    ApproximateFontMetrics, BoxDimensions, EdgeSizes, FlowItem, FontMetrics, InlineBox, LayoutBox,
    LayoutBoxId, LayoutTree, LineBox, Rect, compute_layout,
};
pub use paint::{DisplayList, PaintCommand, PaintRegion, Painter};
pub use parser::{CSSParser, ComponentValue, Declaration, Rule, Selector, StyleRule, Stylesheet};
pub use selector::{ParsedSelector, Specificity, parse_selector};
pub use style::{
    AutoLength, BorderSide, BorderStyle, ColorValue, ComputedStyle, DEFAULT_FONT_SIZE_PX,
    DisplayValue, LengthValue, Sides,
};
pub use tokenizer::{CSSToken, CSSTokenizer, SourceLocation};

use quokka_dom::{NodeId, NodeKind, RenderTree};

/// Parse a complete stylesheet.
///
/// # Errors
///
/// Returns the first syntax error: lexical errors (unterminated strings and
/// comments) take precedence over structural ones.
pub fn parse_stylesheet(css: &str) -> Result<Stylesheet, CssError> {
    let mut tokenizer = CSSTokenizer::new(css);
    tokenizer.run();
    if let Some(err) = tokenizer.take_first_error() {
        return Err(err);
    }
    CSSParser::new(tokenizer.into_spanned_tokens()).parse_stylesheet()
}

/// [§ 5.3.7 Parse a list of declarations](https://www.w3.org/TR/css-syntax-3/#parse-list-of-declarations)
///
/// Parse the contents of a `style` attribute.
///
/// # Errors
///
/// Returns the first syntax error in the attribute.
pub fn parse_inline_style(css: &str) -> Result<Vec<Declaration>, CssError> {
    let mut tokenizer = CSSTokenizer::new(css);
    tokenizer.run();
    if let Some(err) = tokenizer.take_first_error() {
        return Err(err);
    }
    CSSParser::new(tokenizer.into_spanned_tokens()).parse_declaration_list()
}

/// [HTML Standard § 4.2.6 The style element](https://html.spec.whatwg.org/multipage/semantics.html#the-style-element)
///
/// Extract CSS text from all `<style>` elements in the tree, in document order.
#[must_use]
pub fn extract_style_content(tree: &RenderTree) -> String {
    let mut css = String::new();
    collect_style_content(tree, tree.root(), &mut css);
    css
}

fn collect_style_content(tree: &RenderTree, id: NodeId, css: &mut String) {
    let Some(node) = tree.get(id) else { return };

    if let NodeKind::Element(data) = &node.kind
        && data.tag_name.eq_ignore_ascii_case("style")
    {
        for &child_id in tree.children(id) {
            if let Some(text) = tree.as_text(child_id) {
                css.push_str(text);
                css.push('\n');
            }
        }
        return;
    }

    for &child_id in tree.children(id) {
        collect_style_content(tree, child_id, css);
    }
}
