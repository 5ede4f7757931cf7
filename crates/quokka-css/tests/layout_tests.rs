//! Integration tests for block and inline layout.

use quokka_css::layout::LINE_WIDTH_TOLERANCE;
use quokka_css::{
    ApproximateFontMetrics, Cascade, LayoutTree, Origin, StyledTree, compute_layout,
    extract_style_content, parse_stylesheet,
};
use quokka_dom::NodeId;
use quokka_html::parse_html;

const LONG_TEXT: &str = "The quick brown fox jumps over the lazy dog and keeps running \
    across the field until the sun goes down behind the distant hills";

fn layout(html: &str, width: f32) -> (StyledTree, LayoutTree) {
    let _ = env_logger::builder().is_test(true).try_init();
    let dom = parse_html(html);
    let mut cascade = Cascade::new();
    cascade.add_stylesheet(
        Origin::Author,
        parse_stylesheet(&extract_style_content(&dom)).unwrap(),
    );
    let styled = StyledTree::styled(dom, &cascade);
    let layout = compute_layout(&styled, width, 600.0, &ApproximateFontMetrics);
    (styled, layout)
}

fn by_id(styled: &StyledTree, id: &str) -> NodeId {
    styled.dom.element_by_id(id).unwrap()
}

#[test]
fn test_long_text_wraps_within_available_width() {
    let html = format!("<style>body {{ margin: 0 }}</style><div id=\"c\">{LONG_TEXT}</div>");
    let (styled, layout) = layout(&html, 200.0);
    let container = layout.get_layout_box(by_id(&styled, "c")).unwrap();

    assert!(container.line_boxes.len() > 1);
    for line in &container.line_boxes {
        assert_eq!(line.available_width, 200.0);
        assert!(line.width() <= line.available_width * (1.0 + LINE_WIDTH_TOLERANCE));
    }
}

#[test]
fn test_available_width_excludes_box_edges() {
    let html = format!(
        "<style>body {{ margin: 0 }} #c {{ margin: 0 5px; border: 3px solid; padding: 0 12px }}</style>\
         <div id=\"c\">{LONG_TEXT}</div>"
    );
    let (styled, layout) = layout(&html, 200.0);
    let container = layout.get_layout_box(by_id(&styled, "c")).unwrap();

    assert_eq!(container.dimensions.content.width, 200.0 - 10.0 - 6.0 - 24.0);
    for line in &container.line_boxes {
        assert_eq!(line.available_width, 160.0);
        assert_eq!(line.rect.x, container.dimensions.content.x);
        assert!(line.width() <= 160.0 * 1.05);
    }
}

#[test]
fn test_whitespace_only_container_has_no_inline_boxes() {
    let (styled, layout) = layout("<div id=\"c\">   \n\t  </div>", 400.0);
    let container = layout.get_layout_box(by_id(&styled, "c")).unwrap();

    let inline_boxes: usize = container.line_boxes.iter().map(|l| l.inline_boxes.len()).sum();
    assert_eq!(inline_boxes, 0);
    assert_eq!(container.dimensions.content.height, 0.0);
}

#[test]
fn test_inline_only_container_has_lines_but_no_children() {
    let (styled, layout) = layout(
        "<div id=\"c\">Some <em>emphasised</em> and <a href=\"#\">linked</a> text</div>",
        400.0,
    );
    let container = layout.get_layout_box(by_id(&styled, "c")).unwrap();
    assert!(container.children.is_empty());
    assert!(!container.line_boxes.is_empty());

    let texts: Vec<&str> = container.line_boxes[0]
        .inline_boxes
        .iter()
        .map(|b| b.text.as_str())
        .collect();
    assert_eq!(texts, vec!["Some", "emphasised", "and", "linked", "text"]);
}

#[test]
fn test_block_only_container_has_children_but_no_lines() {
    let (styled, layout) = layout(
        "<div id=\"c\">\n  <p>one</p>\n  <div>two</div>\n</div>",
        400.0,
    );
    let container = layout.get_layout_box(by_id(&styled, "c")).unwrap();
    assert_eq!(container.children.len(), 2);
    assert!(container.line_boxes.is_empty());
}

#[test]
fn test_sibling_paragraphs_stack_vertically() {
    let (styled, layout) = layout(
        "<body><p>first</p><p>second</p><p>third</p></body>",
        400.0,
    );
    let body = layout.get_layout_box(styled.dom.body().unwrap()).unwrap();
    let children: Vec<_> = layout.children(body).collect();
    assert_eq!(children.len(), 3);

    for pair in children.windows(2) {
        let (prev, next) = (&pair[0].dimensions, &pair[1].dimensions);
        assert!(next.content.y > prev.content.y);
        assert!(next.margin_box().y >= prev.margin_box().bottom());
    }
}

#[test]
fn test_nested_blocks_mirror_the_block_subset() {
    let (styled, layout) = layout(
        "<div id=\"a\"><div id=\"b\"><span>x</span><div id=\"c\"><p id=\"d\">y</p></div></div></div>",
        400.0,
    );
    let a = layout.get_layout_box(by_id(&styled, "a")).unwrap();
    let b = layout.get_layout_box(by_id(&styled, "b")).unwrap();
    let c = layout.get_layout_box(by_id(&styled, "c")).unwrap();
    let d = layout.get_layout_box(by_id(&styled, "d")).unwrap();

    assert_eq!(layout.children(a).map(|x| x.node).collect::<Vec<_>>(), vec![b.node]);
    assert_eq!(layout.children(b).map(|x| x.node).collect::<Vec<_>>(), vec![c.node]);
    assert_eq!(layout.children(c).map(|x| x.node).collect::<Vec<_>>(), vec![d.node]);
    assert!(d.children.is_empty());
    // The span's text is a line of b, not a box of its own.
    assert_eq!(b.line_boxes.len(), 1);
}

#[test]
fn test_empty_element_has_zero_height() {
    let (styled, layout) = layout("<style>body { margin: 0 }</style><div id=\"e\"></div><p id=\"p\">x</p>", 400.0);
    let empty = layout.get_layout_box(by_id(&styled, "e")).unwrap();
    assert_eq!(empty.dimensions.content.height, 0.0);
    assert_eq!(empty.dimensions.content.width, 400.0);
}

#[test]
fn test_asymmetric_edges() {
    let (styled, layout) = layout(
        "<style>body { margin: 0 } #a { margin: 1px 2px 3px 4px; padding: 5px 6px 7px 8px; \
         border-style: solid; border-width: 9px 10px 11px 12px; height: 20px }</style>\
         <div id=\"a\"></div>",
        400.0,
    );
    let dims = layout.get_layout_box(by_id(&styled, "a")).unwrap().dimensions;
    assert_eq!(dims.content.x, 4.0 + 12.0 + 8.0);
    assert_eq!(dims.content.y, 1.0 + 9.0 + 5.0);
    assert_eq!(dims.content.width, 400.0 - (4.0 + 12.0 + 8.0) - (6.0 + 10.0 + 2.0));
    assert_eq!(dims.border_box().height, 20.0 + 5.0 + 7.0 + 9.0 + 11.0);
    assert_eq!(dims.margin_box().height, 52.0 + 4.0);
}

#[test]
fn test_line_break_element() {
    let (styled, layout) = layout("<p id=\"p\">one<br>two<br><br>three</p>", 400.0);
    let p = layout.get_layout_box(by_id(&styled, "p")).unwrap();
    let lines: Vec<usize> = p.line_boxes.iter().map(|l| l.inline_boxes.len()).collect();
    assert_eq!(lines, vec![1, 1, 0, 1]);
}

#[test]
fn test_content_height_tracks_document() {
    let (_, short) = layout("<p>x</p>", 400.0);
    let (_, tall) = layout(&format!("<p>{LONG_TEXT}</p>").repeat(5), 100.0);
    assert!(tall.content_height() > short.content_height());
    assert!(short.content_height() > 0.0);
}

#[test]
fn test_malformed_markup_still_lays_out() {
    let (_, layout) = layout("<div><p>unclosed <b>bold <div>inner</p></span>", 300.0);
    assert!(layout.inline_boxes().any(|b| b.text.contains("inner")));
    assert!(layout.len() > 1);
}
