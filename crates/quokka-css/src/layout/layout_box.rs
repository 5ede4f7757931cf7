//! Layout tree construction and block layout.
//!
//! [§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
//!
//! "In a block formatting context, boxes are laid out one after the other,
//! vertically, beginning at the top of a containing block."
//!
//! Only the document and block-level elements get a [`LayoutBox`]. Inline
//! content is flattened into line boxes owned by the nearest block ancestor.
//! A block that mixes inline content with block children keeps both in
//! [`LayoutBox::flow`], in document order, without wrapping the inline runs in
//! anonymous boxes. Vertical margins do not collapse.

use std::collections::HashMap;

use serde::Serialize;

use quokka_dom::{NodeId, NodeKind};

use super::box_model::{BoxDimensions, EdgeSizes, Rect};
use super::inline::{FontMetrics, InlineBox, InlineFormatter, InlineItem, LineBox};
use crate::cascade::StyledTree;
use crate::style::{AutoLength, BorderStyle, ComputedStyle, DisplayValue, LengthValue, Sides};

/// Index of a box within its [`LayoutTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LayoutBoxId(pub usize);

/// One entry in a block's content, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FlowItem {
    /// A block-level child box.
    Block(LayoutBoxId),
    /// An index into [`LayoutBox::line_boxes`].
    Line(usize),
}

/// [§ 9.2.1 Block-level elements and block boxes](https://www.w3.org/TR/CSS2/visuren.html#block-boxes)
///
/// "Block-level boxes are boxes that participate in a block formatting
/// context."
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutBox {
    /// The element (or document) this box was generated for.
    pub node: NodeId,
    /// Enclosing box, `None` for the root.
    pub parent: Option<LayoutBoxId>,
    /// Block-level children in document order.
    pub children: Vec<LayoutBoxId>,
    /// Resolved geometry.
    pub dimensions: BoxDimensions,
    /// Border style per side.
    pub border_styles: Sides<BorderStyle>,
    /// Lines of inline content directly inside this box.
    pub line_boxes: Vec<LineBox>,
    /// Children and lines interleaved in document order.
    pub flow: Vec<FlowItem>,
}

impl LayoutBox {
    fn new(node: NodeId, parent: Option<LayoutBoxId>) -> Self {
        Self {
            node,
            parent,
            children: Vec::new(),
            dimensions: BoxDimensions::default(),
            border_styles: Sides::default(),
            line_boxes: Vec::new(),
            flow: Vec::new(),
        }
    }

    /// Whether the box holds any line of inline content.
    #[must_use]
    pub fn has_inline_content(&self) -> bool {
        !self.line_boxes.is_empty()
    }
}

/// The result of layout: every box, addressable by id or by source node.
///
/// Box 0 is the root box for the document, sized to the viewport width.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutTree {
    boxes: Vec<LayoutBox>,
    #[serde(skip)]
    by_node: HashMap<NodeId, LayoutBoxId>,
    viewport: Rect,
}

impl LayoutTree {
    /// The root box.
    #[must_use]
    pub fn root(&self) -> &LayoutBox {
        &self.boxes[0]
    }

    /// Box by id.
    #[must_use]
    pub fn get(&self, id: LayoutBoxId) -> Option<&LayoutBox> {
        self.boxes.get(id.0)
    }

    /// The box generated for `node`, if it generated one.
    #[must_use]
    pub fn get_layout_box(&self, node: NodeId) -> Option<&LayoutBox> {
        self.by_node.get(&node).and_then(|id| self.get(*id))
    }

    /// Child boxes of `parent`, in document order.
    pub fn children<'t>(&'t self, parent: &'t LayoutBox) -> impl Iterator<Item = &'t LayoutBox> + 't {
        parent.children.iter().filter_map(|id| self.get(*id))
    }

    /// All boxes, parents before children.
    pub fn iter(&self) -> impl Iterator<Item = &LayoutBox> {
        self.boxes.iter()
    }

    /// Number of boxes, including the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Always false: the root box exists even for an empty document.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Every inline box in the tree.
    pub fn inline_boxes(&self) -> impl Iterator<Item = &InlineBox> {
        self.boxes
            .iter()
            .flat_map(|b| b.line_boxes.iter())
            .flat_map(|line| line.inline_boxes.iter())
    }

    /// The initial containing block.
    #[must_use]
    pub const fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Height of the laid-out document.
    #[must_use]
    pub fn content_height(&self) -> f32 {
        self.root().dimensions.margin_box().height
    }
}

/// Lay out a styled tree into a viewport.
///
/// [§ 10.1 Definition of "containing block"](https://www.w3.org/TR/CSS2/visudet.html#containing-block-details)
///
/// "The containing block in which the root element lives is a rectangle
/// called the initial containing block. For continuous media, it has the
/// dimensions of the viewport and is anchored at the canvas origin."
#[must_use]
pub fn compute_layout(
    styled: &StyledTree,
    viewport_width: f32,
    viewport_height: f32,
    metrics: &dyn FontMetrics,
) -> LayoutTree {
    let viewport = Rect {
        x: 0.0,
        y: 0.0,
        width: viewport_width.max(0.0),
        height: viewport_height.max(0.0),
    };

    let mut builder = LayoutBuilder {
        styled,
        metrics,
        boxes: Vec::new(),
        by_node: HashMap::new(),
    };

    let root_node = styled.dom.root();
    let root = builder.push_box(root_node, None);
    let content = Rect {
        height: 0.0,
        ..viewport
    };
    let height = builder.layout_contents(root, root_node, content, Some(viewport.height));
    builder.boxes[root.0].dimensions.content = Rect { height, ..content };

    log::debug!(
        "layout: {} boxes, content height {height} in {}x{} viewport",
        builder.boxes.len(),
        viewport.width,
        viewport.height
    );

    LayoutTree {
        boxes: builder.boxes,
        by_node: builder.by_node,
        viewport,
    }
}

struct LayoutBuilder<'a> {
    styled: &'a StyledTree,
    metrics: &'a dyn FontMetrics,
    boxes: Vec<LayoutBox>,
    by_node: HashMap<NodeId, LayoutBoxId>,
}

/// Block content being accumulated for one box.
struct FlowState<'a> {
    id: LayoutBoxId,
    x: f32,
    width: f32,
    cursor_y: f32,
    /// Height of this box when it is definite, for percentage heights.
    height: Option<f32>,
    run: Vec<InlineItem<'a>>,
}

impl<'a> LayoutBuilder<'a> {
    fn push_box(&mut self, node: NodeId, parent: Option<LayoutBoxId>) -> LayoutBoxId {
        let id = LayoutBoxId(self.boxes.len());
        self.boxes.push(LayoutBox::new(node, parent));
        let _ = self.by_node.insert(node, id);
        if let Some(parent) = parent {
            self.boxes[parent.0].children.push(id);
            self.boxes[parent.0].flow.push(FlowItem::Block(id));
        }
        id
    }

    /// Lay out the children of `node` inside `content` and return the height
    /// they occupy.
    fn layout_contents(
        &mut self,
        id: LayoutBoxId,
        node: NodeId,
        content: Rect,
        height: Option<f32>,
    ) -> f32 {
        let mut flow = FlowState {
            id,
            x: content.x,
            width: content.width,
            cursor_y: content.y,
            height,
            run: Vec::new(),
        };
        let styled = self.styled;
        for &child in styled.dom.children(node) {
            self.collect(child, &mut flow, None);
        }
        self.flush_run(&mut flow);
        flow.cursor_y - content.y
    }

    /// Walk one node of block content. Inline content is queued on the run;
    /// a block-level element ends the run and is laid out in place.
    fn collect(&mut self, node: NodeId, flow: &mut FlowState<'a>, link: Option<&'a str>) {
        let styled = self.styled;
        let Some(render_node) = styled.dom.get(node) else {
            return;
        };

        match &render_node.kind {
            NodeKind::Text(text) => {
                let style = styled.effective_style(node);
                let (font_size, color) = style.map_or_else(
                    || {
                        let initial = ComputedStyle::default();
                        (initial.font_size, initial.color)
                    },
                    |s| (s.font_size, s.color),
                );
                flow.run.push(InlineItem::Text {
                    text,
                    node,
                    font_size,
                    color,
                    link,
                });
            }
            NodeKind::Element(element) => {
                let Some(style) = styled.style(node) else {
                    return;
                };
                match style.display {
                    DisplayValue::None => {}
                    DisplayValue::Block => {
                        self.flush_run(flow);
                        let containing = Rect {
                            x: flow.x,
                            y: flow.cursor_y,
                            width: flow.width,
                            height: flow.height.unwrap_or(0.0),
                        };
                        let child = self.layout_block(node, style, flow.id, containing, flow.height);
                        flow.cursor_y = self.boxes[child.0].dimensions.margin_box().bottom();
                    }
                    DisplayValue::Inline => {
                        // [§ 4.8.4 The br element](https://html.spec.whatwg.org/multipage/text-level-semantics.html#the-br-element)
                        // "The br element represents a line break."
                        if element.tag_name.eq_ignore_ascii_case("br") {
                            flow.run.push(InlineItem::LineBreak {
                                font_size: style.font_size,
                            });
                            return;
                        }
                        let link = if element.tag_name.eq_ignore_ascii_case("a") {
                            element.attr("href").or(link)
                        } else {
                            link
                        };
                        for &child in styled.dom.children(node) {
                            self.collect(child, flow, link);
                        }
                    }
                }
            }
            NodeKind::Document | NodeKind::Comment(_) => {}
        }
    }

    /// Turn the queued inline run into line boxes at the cursor.
    fn flush_run(&mut self, flow: &mut FlowState<'a>) {
        if flow.run.is_empty() {
            return;
        }
        let lines = InlineFormatter::new(self.metrics, flow.x, flow.cursor_y, flow.width)
            .layout(&flow.run);
        flow.run.clear();

        let layout_box = &mut self.boxes[flow.id.0];
        for line in lines {
            flow.cursor_y = line.rect.bottom();
            layout_box.flow.push(FlowItem::Line(layout_box.line_boxes.len()));
            layout_box.line_boxes.push(line);
        }
    }

    /// [§ 10.3.3 Block-level, non-replaced elements in normal flow](https://www.w3.org/TR/CSS2/visudet.html#blockwidth)
    /// [§ 10.6.3 Block-level non-replaced elements in normal flow](https://www.w3.org/TR/CSS2/visudet.html#normal-block)
    fn layout_block(
        &mut self,
        node: NodeId,
        style: &ComputedStyle,
        parent: LayoutBoxId,
        containing: Rect,
        containing_height: Option<f32>,
    ) -> LayoutBoxId {
        let id = self.push_box(node, Some(parent));

        // STEP 1: Resolve the horizontal box model.
        let mut dimensions = block_width(style, containing.width);

        // STEP 2: Resolve the vertical edges and position the content box.
        // [§ 8.3](https://www.w3.org/TR/CSS2/box.html#margin-properties)
        // "The percentage is calculated with respect to the width of the
        // generated box's containing block."
        let cw = containing.width;
        dimensions.margin.top = style.margin.top.resolve(cw).unwrap_or(0.0);
        dimensions.margin.bottom = style.margin.bottom.resolve(cw).unwrap_or(0.0);
        dimensions.padding.top = style.padding.top.resolve(cw).max(0.0);
        dimensions.padding.bottom = style.padding.bottom.resolve(cw).max(0.0);
        let borders = style.border_widths();
        dimensions.border.top = borders.top;
        dimensions.border.bottom = borders.bottom;

        // "Each box's left outer edge touches the left edge of the containing block."
        dimensions.content.x =
            containing.x + dimensions.margin.left + dimensions.border.left + dimensions.padding.left;
        dimensions.content.y =
            containing.y + dimensions.margin.top + dimensions.border.top + dimensions.padding.top;

        {
            let layout_box = &mut self.boxes[id.0];
            layout_box.dimensions = dimensions;
            layout_box.border_styles = style.border.map(|side| side.style);
        }

        // STEP 3: Lay out the contents.
        let specified_height = used_height(style.height, containing_height);
        let content_height =
            self.layout_contents(id, node, dimensions.content, specified_height);

        // STEP 4: "If 'height' is 'auto', the height depends on whether the
        // element has any block-level children and whether it has padding or
        // borders." Without margin collapsing this is the height of the content.
        let height = specified_height.unwrap_or(content_height).max(0.0);
        self.boxes[id.0].dimensions.content.height = height;

        log::trace!(
            "block {:?} <{}> at ({}, {}) {}x{}",
            node,
            self.styled.dom.tag_name(node).unwrap_or("?"),
            dimensions.content.x,
            dimensions.content.y,
            dimensions.content.width,
            height
        );
        id
    }
}

/// [§ 10.3.3](https://www.w3.org/TR/CSS2/visudet.html#blockwidth)
///
/// "'margin-left' + 'border-left-width' + 'padding-left' + 'width' +
/// 'padding-right' + 'border-right-width' + 'margin-right' = width of
/// containing block"
fn block_width(style: &ComputedStyle, containing_width: f32) -> BoxDimensions {
    let cw = containing_width;
    let padding: EdgeSizes = style.padding.map(|p| p.resolve(cw).max(0.0));
    let border = style.border_widths();
    let edges = padding.left + padding.right + border.left + border.right;

    let mut margin_left = style.margin.left.resolve(cw);
    let mut margin_right = style.margin.right.resolve(cw);
    let width = style.width.resolve(cw).map(|w| w.max(0.0));

    // "If 'width' is not 'auto' and 'border-left-width' + 'padding-left' +
    // 'width' + 'padding-right' + 'border-right-width' (plus any of
    // 'margin-left' or 'margin-right' that are not 'auto') is larger than the
    // width of the containing block, then any 'auto' values for 'margin-left'
    // or 'margin-right' are, for the following rules, treated as zero."
    if let Some(width) = width {
        let total = width + edges + margin_left.unwrap_or(0.0) + margin_right.unwrap_or(0.0);
        if total > cw {
            margin_left = margin_left.or(Some(0.0));
            margin_right = margin_right.or(Some(0.0));
        }
    }

    let (used_width, used_left, used_right) = match (width, margin_left, margin_right) {
        // "If 'width' is set to 'auto', any other 'auto' values become '0' and
        // 'width' follows from the resulting equality."
        (None, left, right) => {
            let left = left.unwrap_or(0.0);
            let right = right.unwrap_or(0.0);
            ((cw - left - right - edges).max(0.0), left, right)
        }
        // "If both 'margin-left' and 'margin-right' are 'auto', their used
        // values are equal."
        (Some(width), None, None) => {
            let half = (cw - width - edges) / 2.0;
            (width, half, half)
        }
        // "If there is exactly one value specified as 'auto', its used value
        // follows from the equality."
        (Some(width), None, Some(right)) => (width, cw - width - edges - right, right),
        // "If all of the above have a computed value other than 'auto', the
        // values are said to be 'over-constrained' [...] the specified value of
        // 'margin-right' is ignored and the value is calculated so as to make
        // the equality true." The one-auto case on the right lands here too.
        (Some(width), Some(left), _) => (width, left, cw - width - edges - left),
    };

    BoxDimensions {
        content: Rect {
            width: used_width,
            ..Rect::default()
        },
        padding,
        border,
        margin: Sides {
            left: used_left,
            right: used_right,
            ..Sides::default()
        },
    }
}

/// [§ 10.5 Content height](https://www.w3.org/TR/CSS2/visudet.html#the-height-property)
///
/// "If the height of the containing block is not specified explicitly [...]
/// the value computes to 'auto'."
fn used_height(height: AutoLength, containing_height: Option<f32>) -> Option<f32> {
    match height {
        AutoLength::Auto => None,
        AutoLength::Length(LengthValue::Percent(pct)) => containing_height.map(|h| pct * h / 100.0),
        AutoLength::Length(length) => Some(length.resolve(0.0)),
    }
    .map(|h| h.max(0.0))
}
