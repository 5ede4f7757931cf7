//! CSS Inline Layout and Line Box Model.
//!
//! [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
//!
//! "In an inline formatting context, boxes are laid out horizontally, one
//! after the other, beginning at the top of a containing block."
//!
//! Inline-level content never gets a [`LayoutBox`](super::LayoutBox) of its
//! own. A run of text and inline elements is flattened into [`InlineItem`]s
//! and packed into [`LineBox`]es owned by the containing block.

use serde::Serialize;

use quokka_dom::NodeId;

use super::box_model::Rect;
use crate::style::ColorValue;

/// Relative slack allowed between a line's available width and the realized
/// width of its content, to absorb rounding differences between measuring
/// words separately and measuring the merged text.
pub const LINE_WIDTH_TOLERANCE: f32 = 0.05;

/// Font metrics interface for text measurement during layout.
///
/// [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
///
/// "CSS assumes that every font has font metrics that specify a
/// characteristic height above the baseline and a depth below it."
pub trait FontMetrics {
    /// Measure the total advance width of a text string at the given font size.
    fn text_width(&self, text: &str, font_size: f32) -> f32;

    /// [§ 10.8.1 Leading and half-leading](https://www.w3.org/TR/CSS2/visudet.html#leading)
    ///
    /// "The initial value of 'line-height' is 'normal'. We recommend a used
    /// value for 'normal' between 1.0 and 1.2."
    fn line_height(&self, font_size: f32) -> f32;
}

/// Approximate font metrics using fixed ratios: every character advances
/// 0.6em and lines are 1.2em tall.
///
/// Used when no font is available, and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproximateFontMetrics;

impl FontMetrics for ApproximateFontMetrics {
    #[allow(clippy::cast_precision_loss)]
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        const CHAR_WIDTH_RATIO: f32 = 0.6;
        text.chars().count() as f32 * font_size * CHAR_WIDTH_RATIO
    }

    fn line_height(&self, font_size: f32) -> f32 {
        const LINE_HEIGHT_RATIO: f32 = 1.2;
        font_size * LINE_HEIGHT_RATIO
    }
}

/// One piece of inline content, in document order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InlineItem<'a> {
    /// Raw (uncollapsed) text of one text node.
    Text {
        /// The text as it appears in the tree.
        text: &'a str,
        /// The text node.
        node: NodeId,
        /// Font size of the nearest element.
        font_size: f32,
        /// Text color of the nearest element.
        color: ColorValue,
        /// `href` of the enclosing link, if any.
        link: Option<&'a str>,
    },
    /// A forced line break (`<br>`).
    LineBreak {
        /// Font size of the `<br>`, which sets the height of an empty line.
        font_size: f32,
    },
}

/// A placed piece of text on a line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlineBox {
    /// The collapsed text.
    pub text: String,
    /// Position and size.
    pub rect: Rect,
    /// The text node the text came from.
    pub node: NodeId,
    /// Font size in pixels.
    pub font_size: f32,
    /// Text color.
    pub color: ColorValue,
    /// `href` of the enclosing link, unresolved.
    pub link: Option<String>,
}

/// [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
///
/// "The rectangular area that contains the boxes that form a line is called
/// a line box."
///
/// Inline boxes carry text only: backgrounds and borders set on inline
/// elements such as `<span>` are not painted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineBox {
    /// Position of the line; `rect.width` is the realized content width.
    pub rect: Rect,
    /// The width the line was wrapped against.
    pub available_width: f32,
    /// Content, left to right.
    pub inline_boxes: Vec<InlineBox>,
}

impl LineBox {
    /// Realized width of the content on this line.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.rect.width
    }
}

/// Packs [`InlineItem`]s into line boxes.
///
/// [§ 4.1.1 Phase I: Collapsing and Transformation](https://www.w3.org/TR/css-text-3/#white-space-phase-1)
/// "Any collapsible space immediately following another collapsible space,
/// even one outside the boundary of the inline containing that space, is
/// collapsed to have zero advance width."
///
/// [§ 4.1.2 Phase II](https://www.w3.org/TR/css-text-3/#white-space-phase-2)
/// "A sequence of collapsible spaces at the beginning of a line is removed."
pub struct InlineFormatter<'m> {
    metrics: &'m dyn FontMetrics,
    origin_x: f32,
    available_width: f32,
    line_top: f32,
    lines: Vec<LineBox>,
    current: Vec<InlineBox>,
    current_x: f32,
    current_height: f32,
    /// A collapsed space is waiting between the last word and the next one.
    pending_space: bool,
}

impl<'m> InlineFormatter<'m> {
    /// Start formatting at `(x, y)` with lines `available_width` wide.
    /// Negative widths are clamped to zero.
    #[must_use]
    pub fn new(metrics: &'m dyn FontMetrics, x: f32, y: f32, available_width: f32) -> Self {
        Self {
            metrics,
            origin_x: x,
            available_width: available_width.max(0.0),
            line_top: y,
            lines: Vec::new(),
            current: Vec::new(),
            current_x: 0.0,
            current_height: 0.0,
            pending_space: false,
        }
    }

    /// Lay out every item and return the finished lines.
    #[must_use]
    pub fn layout(mut self, items: &[InlineItem<'_>]) -> Vec<LineBox> {
        for item in items {
            match *item {
                InlineItem::Text {
                    text,
                    node,
                    font_size,
                    color,
                    link,
                } => {
                    let style = RunStyle {
                        node,
                        font_size,
                        color,
                        link,
                    };
                    self.add_text(text, &style);
                }
                InlineItem::LineBreak { font_size } => self.force_break(font_size),
            }
        }
        self.finish_line();
        self.lines
    }

    fn add_text(&mut self, text: &str, style: &RunStyle<'_>) {
        let mut rest = text;
        while !rest.is_empty() {
            let word_len = rest
                .find(|c: char| c.is_ascii_whitespace())
                .unwrap_or(rest.len());
            if word_len == 0 {
                // Whitespace between words; drop it at the start of a line.
                let ws_len = rest
                    .find(|c: char| !c.is_ascii_whitespace())
                    .unwrap_or(rest.len());
                if !self.current.is_empty() {
                    self.pending_space = true;
                }
                rest = &rest[ws_len..];
            } else {
                self.add_word(&rest[..word_len], style);
                rest = &rest[word_len..];
            }
        }
    }

    /// [§ 5.5 Line Breaking](https://www.w3.org/TR/css-text-3/#line-breaking)
    ///
    /// Place one word, breaking the line first when it does not fit.
    fn add_word(&mut self, word: &str, style: &RunStyle<'_>) {
        let metrics = self.metrics;
        let mut word = word;
        let mut word_width = metrics.text_width(word, style.font_size);

        loop {
            let space_width = if self.pending_space && !self.current.is_empty() {
                metrics.text_width(" ", style.font_size)
            } else {
                0.0
            };

            if self.fits(self.current_x + space_width + word_width) {
                self.place(word, space_width, style);
                return;
            }

            if !self.current.is_empty() {
                // "When an inline box exceeds the width of a line box, it is
                // split into several boxes and these boxes are distributed
                // across several line boxes."
                self.finish_line();
                continue;
            }

            // [§ 5.5 overflow-wrap](https://www.w3.org/TR/css-text-3/#overflow-wrap-property)
            // "An otherwise unbreakable sequence of characters may be broken at
            // an arbitrary point if there are no otherwise-acceptable break
            // points in the line." At least one character goes on each line.
            let split = self.longest_fitting_prefix(word, style.font_size);
            let (head, tail) = word.split_at(split);
            self.place(head, 0.0, style);
            if tail.is_empty() {
                return;
            }
            // Advances add up, so the rest is never measured again from scratch.
            word_width = (word_width - metrics.text_width(head, style.font_size)).max(0.0);
            self.finish_line();
            word = tail;
        }
    }

    fn fits(&self, width: f32) -> bool {
        // Sub-pixel slack for accumulated rounding.
        width <= self.available_width + 0.01
    }

    /// Byte length of the longest prefix of `word` that fits an empty line,
    /// never less than one character.
    fn longest_fitting_prefix(&self, word: &str, font_size: f32) -> usize {
        let mut fitting = None;
        for (idx, ch) in word.char_indices() {
            let end = idx + ch.len_utf8();
            if self.fits(self.metrics.text_width(&word[..end], font_size)) {
                fitting = Some(end);
            } else {
                break;
            }
        }
        fitting.unwrap_or_else(|| word.chars().next().map_or(word.len(), char::len_utf8))
    }

    /// Put `word` on the current line, merging it into the previous box when
    /// both come from the same text node.
    fn place(&mut self, word: &str, space_width: f32, style: &RunStyle<'_>) {
        let metrics = self.metrics;
        let height = metrics.line_height(style.font_size);
        self.current_height = self.current_height.max(height);

        if let Some(last) = self.current.last_mut()
            && last.node == style.node
            && self.pending_space
        {
            last.text.push(' ');
            last.text.push_str(word);
            last.rect.width = metrics.text_width(&last.text, last.font_size);
        } else if let Some(last) = self.current.last_mut()
            && last.node == style.node
        {
            last.text.push_str(word);
            last.rect.width = metrics.text_width(&last.text, last.font_size);
        } else {
            self.current.push(InlineBox {
                text: word.to_string(),
                rect: Rect {
                    x: self.origin_x + self.current_x + space_width,
                    y: self.line_top,
                    width: metrics.text_width(word, style.font_size),
                    height,
                },
                node: style.node,
                font_size: style.font_size,
                color: style.color,
                link: style.link.map(str::to_string),
            });
        }

        self.pending_space = false;
        if let Some(last) = self.current.last() {
            self.current_x = last.rect.right() - self.origin_x;
        }
    }

    /// `<br>`: end the line even when it is empty.
    fn force_break(&mut self, font_size: f32) {
        if self.current.is_empty() {
            self.current_height = self.current_height.max(self.metrics.line_height(font_size));
        }
        self.push_line();
    }

    fn finish_line(&mut self) {
        if !self.current.is_empty() {
            self.push_line();
        }
    }

    /// [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
    ///
    /// "The height of the line box is the distance between the uppermost box
    /// top and the lowermost box bottom." Boxes share a bottom edge, which
    /// approximates baseline alignment for a single font.
    fn push_line(&mut self) {
        let height = self.current_height;
        let mut inline_boxes = std::mem::take(&mut self.current);
        for inline_box in &mut inline_boxes {
            inline_box.rect.y = self.line_top + height - inline_box.rect.height;
        }

        let line = LineBox {
            rect: Rect {
                x: self.origin_x,
                y: self.line_top,
                width: self.current_x,
                height,
            },
            available_width: self.available_width,
            inline_boxes,
        };
        log::trace!(
            "line at y={} width={} / {} ({} boxes)",
            line.rect.y,
            line.rect.width,
            line.available_width,
            line.inline_boxes.len()
        );
        self.lines.push(line);

        self.line_top += height;
        self.current_x = 0.0;
        self.current_height = 0.0;
        self.pending_space = false;
    }
}

/// Style shared by every word of one text node.
struct RunStyle<'a> {
    node: NodeId,
    font_size: f32,
    color: ColorValue,
    link: Option<&'a str>,
}
