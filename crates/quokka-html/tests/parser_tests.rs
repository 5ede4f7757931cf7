//! Integration tests for the HTML tree builder.

use quokka_dom::{NodeId, NodeKind, RenderTree};
use quokka_html::{MAX_OPEN_ELEMENTS, parse_html, parse_html_with_issues};

fn child_tags(tree: &RenderTree, id: NodeId) -> Vec<String> {
    tree.children(id)
        .iter()
        .filter_map(|&c| tree.tag_name(c).map(str::to_string))
        .collect()
}

#[test]
fn test_implied_html_head_body() {
    let tree = parse_html("<p>Hello</p>");
    let html = tree.document_element().expect("html element");
    assert_eq!(tree.tag_name(html), Some("html"));
    assert_eq!(child_tags(&tree, html), vec!["head", "body"]);
    let body = tree.body().expect("body element");
    assert_eq!(child_tags(&tree, body), vec!["p"]);
    assert_eq!(tree.text_content(body), "Hello");
}

#[test]
fn test_empty_input_still_has_body() {
    let tree = parse_html("");
    assert!(tree.body().is_some());
}

#[test]
fn test_style_goes_to_head() {
    let tree = parse_html("<html><head><style>p { color: red }</style></head><body></body></html>");
    let style = tree.elements_by_tag_name("style")[0];
    let head = tree.parent(style).unwrap();
    assert_eq!(tree.tag_name(head), Some("head"));
    assert_eq!(tree.text_content(style), "p { color: red }");
}

#[test]
fn test_paragraph_implicitly_closed() {
    let tree = parse_html("<body><p>One<p>Two<div>Three</div></body>");
    let body = tree.body().unwrap();
    assert_eq!(child_tags(&tree, body), vec!["p", "p", "div"]);
}

#[test]
fn test_list_items_implicitly_closed() {
    let tree = parse_html("<ul><li>a<li>b<li>c</ul>");
    let ul = tree.elements_by_tag_name("ul")[0];
    assert_eq!(child_tags(&tree, ul), vec!["li", "li", "li"]);
}

#[test]
fn test_void_elements_have_no_children() {
    let tree = parse_html("<p>a<br>b<img src=x.png>c</p>");
    let p = tree.elements_by_tag_name("p")[0];
    assert_eq!(tree.children(p).len(), 5);
    let br = tree.elements_by_tag_name("br")[0];
    assert!(tree.children(br).is_empty());
}

#[test]
fn test_adjacent_characters_coalesce_into_one_text_node() {
    let tree = parse_html("<p>a &amp; b</p>");
    let p = tree.elements_by_tag_name("p")[0];
    assert_eq!(tree.children(p).len(), 1);
    assert!(matches!(
        &tree.get(tree.children(p)[0]).unwrap().kind,
        NodeKind::Text(text) if text == "a & b"
    ));
}

#[test]
fn test_unclosed_and_misnested_markup_recovers() {
    let (tree, issues) = parse_html_with_issues("<div><span>text</div><p>after");
    let body = tree.body().unwrap();
    assert_eq!(child_tags(&tree, body), vec!["div", "p"]);
    assert!(!issues.is_empty());
}

#[test]
fn test_stray_end_tag_is_ignored() {
    let (tree, issues) = parse_html_with_issues("</span><p>x</p>");
    let body = tree.body().unwrap();
    assert_eq!(child_tags(&tree, body), vec!["p"]);
    assert_eq!(issues.len(), 1);
}

#[test]
fn test_attributes_and_classes_reach_the_tree() {
    let tree = parse_html(r#"<div id="main" class="a b" data-k="v"></div>"#);
    let div = tree.element_by_id("main").unwrap();
    let element = tree.as_element(div).unwrap();
    assert!(element.has_class("a"));
    assert!(element.has_class("b"));
    assert_eq!(element.attr("data-k"), Some("v"));
}

#[test]
fn test_nesting_depth_is_capped() {
    let html = format!("{}deep", "<div>".repeat(2_000));
    let (tree, issues) = parse_html_with_issues(&html);

    let divs = tree.elements_by_tag_name("div");
    assert_eq!(divs.len(), 2_000);
    let deepest = divs
        .iter()
        .map(|&div| tree.ancestors(div).count())
        .max()
        .unwrap();
    assert_eq!(deepest, MAX_OPEN_ELEMENTS + 1);
    assert!(tree.text_content(tree.body().unwrap()).contains("deep"));
    assert!(issues.iter().any(|i| i.message == "element nesting too deep"));
}
