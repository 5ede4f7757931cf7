//! Painter - generates display list from layout tree
//!
//! [CSS 2.1 Appendix E.2 Painting order](https://www.w3.org/TR/CSS2/zindex.html#painting-order)
//!
//! The painter walks the layout tree depth-first and generates drawing
//! commands back to front.

use crate::cascade::StyledTree;
use crate::layout::{FlowItem, LayoutBox, LayoutTree, LineBox};
use crate::style::ComputedStyle;

use super::{DisplayList, PaintCommand, PaintRegion};

/// Painter that generates a display list from a layout tree.
///
/// [CSS 2.1 Appendix E.2](https://www.w3.org/TR/CSS2/zindex.html#painting-order)
pub struct Painter<'a> {
    /// Styled tree the layout was computed from, for colors.
    styled: &'a StyledTree,
}

impl<'a> Painter<'a> {
    /// Create a new painter with access to computed styles.
    #[must_use]
    pub const fn new(styled: &'a StyledTree) -> Self {
        Self { styled }
    }

    /// Paint a layout tree and return the display list.
    #[must_use]
    pub fn paint(&self, layout: &LayoutTree) -> DisplayList {
        let mut display_list = DisplayList::new();
        self.paint_box(layout, layout.root(), &mut display_list);
        log::debug!(
            "paint: {} commands for {} boxes",
            display_list.len(),
            display_list.regions().len()
        );
        display_list
    }

    /// Paint a single layout box and its descendants.
    ///
    /// [CSS 2.1 Appendix E.2](https://www.w3.org/TR/CSS2/zindex.html#painting-order)
    ///
    /// 1. Background color
    /// 2. Border
    /// 3. Block descendants and line boxes, in tree order
    fn paint_box(&self, layout: &LayoutTree, layout_box: &LayoutBox, display_list: &mut DisplayList) {
        let border_box = layout_box.dimensions.border_box();
        display_list.push_region(PaintRegion {
            node: layout_box.node,
            rect: border_box,
        });

        if let Some(style) = self.styled.style(layout_box.node) {
            // STEP 1: "the background color of the element"
            if let Some(color) = style.background_color
                && !color.is_transparent()
            {
                display_list.push(PaintCommand::Background {
                    node: layout_box.node,
                    rect: border_box,
                    color,
                });
            }

            // STEP 2: "the border of the element"
            paint_border(layout_box, style, display_list);
        }

        // STEP 3: content, in the order it appears in the document.
        for item in &layout_box.flow {
            match *item {
                FlowItem::Block(id) => {
                    if let Some(child) = layout.get(id) {
                        self.paint_box(layout, child, display_list);
                    }
                }
                FlowItem::Line(index) => {
                    if let Some(line) = layout_box.line_boxes.get(index) {
                        paint_line(line, display_list);
                    }
                }
            }
        }
    }
}

/// [§ 4 Borders](https://www.w3.org/TR/css-backgrounds-3/#borders)
///
/// One command carries all four sides; nothing is emitted when every used
/// width is zero.
fn paint_border(layout_box: &LayoutBox, style: &ComputedStyle, display_list: &mut DisplayList) {
    let widths = layout_box.dimensions.border;
    if widths.iter().all(|w| *w <= 0.0) {
        return;
    }
    display_list.push(PaintCommand::Border {
        node: layout_box.node,
        rect: layout_box.dimensions.border_box(),
        widths,
        styles: layout_box.border_styles,
        colors: style.border.map(|side| style.border_color(side)),
    });
}

/// "For all its in-flow, non-positioned, block-level descendants [...] inline
/// boxes and line boxes" are painted in tree order.
fn paint_line(line: &LineBox, display_list: &mut DisplayList) {
    for inline_box in &line.inline_boxes {
        if inline_box.color.is_transparent() {
            continue;
        }
        display_list.push(PaintCommand::Text {
            node: inline_box.node,
            rect: inline_box.rect,
            text: inline_box.text.clone(),
            font_size: inline_box.font_size,
            color: inline_box.color,
            link: inline_box.link.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cascade::{Cascade, Origin};
    use crate::layout::{ApproximateFontMetrics, compute_layout};
    use crate::parse_stylesheet;
    use quokka_dom::{NodeId, RenderTree};

    #[test]
    fn test_transparent_background_is_skipped() {
        let mut tree = RenderTree::new();
        let html = tree.append_element(NodeId::ROOT, "html", &[]);
        let _ = tree.append_element(html, "div", &[("style", "background: transparent")]);

        let mut cascade = Cascade::new().with_user_agent_stylesheet(false);
        cascade.add_stylesheet(Origin::Author, parse_stylesheet("html { background: #eee }").unwrap());
        let styled = StyledTree::styled(tree, &cascade);
        let layout = compute_layout(&styled, 100.0, 100.0, &ApproximateFontMetrics);
        let list = Painter::new(&styled).paint(&layout);

        assert_eq!(list.len(), 1);
        assert_eq!(list.commands()[0].node(), html);
        // Document, html and div all get a region.
        assert_eq!(list.regions().len(), 3);
    }
}
