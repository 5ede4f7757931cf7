//! Integration tests for display-list generation.

use quokka_css::{
    ApproximateFontMetrics, BorderStyle, Cascade, ColorValue, DisplayList, Origin, PaintCommand,
    Painter, StyledTree, compute_layout, extract_style_content, parse_stylesheet,
};
use quokka_html::parse_html;

fn paint(html: &str) -> (StyledTree, DisplayList) {
    let dom = parse_html(html);
    let mut cascade = Cascade::new();
    cascade.add_stylesheet(
        Origin::Author,
        parse_stylesheet(&extract_style_content(&dom)).unwrap(),
    );
    let styled = StyledTree::styled(dom, &cascade);
    let layout = compute_layout(&styled, 400.0, 300.0, &ApproximateFontMetrics);
    let list = Painter::new(&styled).paint(&layout);
    (styled, list)
}

fn texts(list: &DisplayList) -> Vec<&str> {
    list.commands()
        .iter()
        .filter_map(|c| match c {
            PaintCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_border_command_reports_every_side() {
    let (_, list) = paint(r#"<style>#b { border: 2px solid red }</style><div id="b">x</div>"#);
    let border = list
        .commands()
        .iter()
        .find(|c| matches!(c, PaintCommand::Border { .. }))
        .unwrap();
    let PaintCommand::Border {
        widths,
        styles,
        colors,
        ..
    } = border
    else {
        unreachable!()
    };
    for width in widths.iter() {
        assert_eq!(*width, 2.0);
    }
    for style in styles.iter() {
        assert_eq!(style.to_string(), "solid");
    }
    assert!(colors.iter().all(|c| *c == ColorValue::rgb(255, 0, 0)));
}

#[test]
fn test_border_command_per_side_longhands() {
    let (_, list) = paint(
        r#"<style>#b {
            border-top: 3px solid blue; border-right: 2px dashed green;
            border-bottom: 4px dotted yellow; border-left: 1px solid black;
        }</style><div id="b"></div>"#,
    );
    let Some(PaintCommand::Border {
        widths, styles, rect, ..
    }) = list.commands().iter().find(|c| matches!(c, PaintCommand::Border { .. }))
    else {
        panic!("no border command");
    };
    assert_eq!((widths.top, styles.top), (3.0, BorderStyle::Solid));
    assert_eq!((widths.right, styles.right), (2.0, BorderStyle::Dashed));
    assert_eq!((widths.bottom, styles.bottom), (4.0, BorderStyle::Dotted));
    assert_eq!((widths.left, styles.left), (1.0, BorderStyle::Solid));
    assert_eq!(rect.height, 7.0);
}

#[test]
fn test_no_border_command_without_visible_border() {
    let (_, list) = paint(r#"<style>div { border-width: 4px }</style><div>x</div>"#);
    assert!(!list.commands().iter().any(|c| matches!(c, PaintCommand::Border { .. })));
}

#[test]
fn test_parent_paints_before_descendants() {
    let (styled, list) = paint(
        r#"<style>#outer { background: #eee } #inner { background-color: #ccc }</style>
        <div id="outer"><div id="inner">text</div></div>"#,
    );
    let outer = styled.dom.element_by_id("outer").unwrap();
    let inner = styled.dom.element_by_id("inner").unwrap();
    let position = |node| list.commands().iter().position(|c| c.node() == node).unwrap();
    let text = list
        .commands()
        .iter()
        .position(|c| matches!(c, PaintCommand::Text { .. }))
        .unwrap();

    assert!(position(outer) < position(inner));
    assert!(position(inner) < text);
}

#[test]
fn test_text_commands_follow_document_order() {
    let (_, list) = paint(
        "<body>before<div>middle</div>after<p>last <b>bold</b></p></body>",
    );
    assert_eq!(texts(&list), vec!["before", "middle", "after", "last", "bold"]);
}

#[test]
fn test_inline_elements_do_not_duplicate_text() {
    let (_, list) = paint("<p><span><em>once</em></span></p>");
    assert_eq!(texts(&list), vec!["once"]);
}

#[test]
fn test_every_layout_box_has_a_region() {
    let (styled, list) = paint("<div><p>a</p><p style=\"display: none\">b</p><section></section></div>");
    let sections = styled.dom.elements_by_tag_name("section");
    assert!(list.regions().iter().any(|r| r.node == sections[0]));
    // document, html, body, div, p, section (head is display: none)
    assert_eq!(list.regions().len(), 6);
    assert_eq!(texts(&list), vec!["a"]);
}

#[test]
fn test_link_target_reaches_text_command() {
    let (_, list) = paint(r#"<p>go <a href="/next"><i>there</i></a> now</p>"#);
    let links: Vec<Option<&str>> = list
        .commands()
        .iter()
        .filter(|c| matches!(c, PaintCommand::Text { .. }))
        .map(PaintCommand::link)
        .collect();
    assert_eq!(links, vec![None, Some("/next"), None]);
}

#[test]
fn test_intersecting_filters_by_vertical_band() {
    let (_, list) = paint("<style>p { margin: 0; height: 100px }</style><p>a</p><p>b</p><p>c</p>");
    let visible: Vec<&str> = list
        .intersecting(100.0, 220.0)
        .filter_map(|c| match c {
            PaintCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(visible, vec!["b", "c"]);
}

#[test]
fn test_inline_element_background_is_not_painted() {
    let (styled, list) = paint(
        r#"<style>span { background: yellow; border: 1px solid red }</style><p>a <span id="s">b</span></p>"#,
    );
    let span = styled.dom.element_by_id("s").unwrap();
    assert_eq!(texts(&list), vec!["a", "b"]);
    assert!(!list.commands().iter().any(|c| matches!(
        c,
        PaintCommand::Background { node, .. } | PaintCommand::Border { node, .. } if *node == span
    )));
}
