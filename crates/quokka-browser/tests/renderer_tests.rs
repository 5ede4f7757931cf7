//! Integration tests for the renderer's host-facing entry points.

use std::cell::RefCell;
use std::rc::Rc;

use quokka_browser::css::{ApproximateFontMetrics, ColorValue, CssError, PaintCommand};
use quokka_browser::{RasterError, RenderError, RenderOptions, Renderer, Scene};

fn renderer_with(options: RenderOptions) -> Renderer {
    let _ = env_logger::builder().is_test(true).try_init();
    Renderer::with_metrics(options, Box::new(ApproximateFontMetrics))
}

fn renderer() -> Renderer {
    renderer_with(RenderOptions::default())
}

fn texts<'a>(commands: impl Iterator<Item = &'a PaintCommand>) -> Vec<&'a str> {
    commands
        .filter_map(|c| match c {
            PaintCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

fn stacked_paragraphs(count: usize) -> String {
    let body: String = (0..count).map(|i| format!("<p>p{i}</p>")).collect();
    format!("<style>body {{ margin: 0 }} p {{ margin: 0; height: 20px }}</style>{body}")
}

#[test]
fn test_render_produces_scene() {
    let mut renderer = renderer();
    let scene = renderer
        .render_html("<p>Hello <a href=\"/x\">world</a></p>")
        .unwrap();

    assert_eq!(texts(scene.commands().iter()), vec!["Hello", "world"]);
    assert_eq!(scene.width, 800.0);
    assert!(scene.content_height > 0.0);
    assert_eq!(renderer.content_height(), scene.content_height);
    assert_eq!(renderer.scene(), Some(scene));
}

#[test]
fn test_stylesheet_error_returns_unstyled_fallback() {
    let mut renderer = renderer();
    let err = renderer
        .render_html("<style>p { color: red }\np { color }</style><p>still here</p>")
        .unwrap_err();

    let RenderError::Stylesheet { source, .. } = &err else {
        panic!("expected a stylesheet error, got {err:?}");
    };
    assert!(matches!(source, CssError::MissingColon { rule_index: 1, .. }));
    assert_eq!(source.location().line, 2);

    let fallback = err.into_fallback().unwrap();
    assert_eq!(texts(fallback.commands().iter()), vec!["still here"]);
    // The fallback ignores every author rule, valid ones included.
    let p = renderer.styled_tree().unwrap().dom.elements_by_tag_name("p")[0];
    let style = renderer.styled_tree().unwrap().style(p).unwrap();
    assert_eq!(style.color, ColorValue::BLACK);
    assert_eq!(renderer.scene(), Some(fallback));
}

#[test]
fn test_set_size_relayouts_without_reparse() {
    let mut renderer = renderer();
    let words = "lorem ipsum dolor sit amet ".repeat(20);
    let _ = renderer.render_html(&format!("<p id=\"p\">{words}</p>")).unwrap();

    let p = renderer.styled_tree().unwrap().dom.element_by_id("p").unwrap();
    let lines_at = |renderer: &Renderer| {
        renderer
            .layout_tree()
            .unwrap()
            .get_layout_box(p)
            .unwrap()
            .line_boxes
            .len()
    };
    let wide = lines_at(&renderer);
    let wide_height = renderer.content_height();

    renderer.set_size(200.0, 600.0);
    let narrow = lines_at(&renderer);
    assert!(narrow > wide);
    assert!(renderer.content_height() > wide_height);
    assert_eq!(renderer.scene().unwrap().width, 200.0);
    // Same tree, same node ids.
    assert_eq!(renderer.styled_tree().unwrap().dom.element_by_id("p"), Some(p));
}

#[test]
fn test_set_size_before_render_is_safe() {
    let mut renderer = renderer();
    renderer.set_size(320.0, 240.0);
    assert_eq!(renderer.content_height(), 0.0);
    assert!(renderer.scene().is_none());

    let scene = renderer.render_html("<p>x</p>").unwrap();
    assert_eq!(scene.width, 320.0);
}

#[test]
fn test_viewport_selects_visible_commands() {
    let mut renderer = renderer();
    let _ = renderer.render_html(&stacked_paragraphs(40)).unwrap();
    assert_eq!(renderer.content_height(), 800.0);

    renderer.set_viewport(100.0, 50.0);
    let scene = renderer.scene().unwrap();
    assert_eq!(scene.viewport.offset, 100.0);
    assert_eq!(texts(scene.visible_commands()), vec!["p5", "p6", "p7"]);
    assert_eq!(texts(scene.commands().iter()).len(), 40);
}

#[test]
fn test_new_document_scrolls_to_top() {
    let mut renderer = renderer();
    let _ = renderer.render_html(&stacked_paragraphs(40)).unwrap();
    renderer.set_viewport(300.0, 100.0);
    let scene = renderer.render_html(&stacked_paragraphs(40)).unwrap();
    assert_eq!(scene.viewport.offset, 0.0);
}

#[test]
fn test_activate_link_resolves_against_current_url() {
    let mut renderer = renderer();
    let visited = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&visited);
    renderer.set_navigation_callback(move |url| sink.borrow_mut().push(url.to_owned()));
    renderer
        .set_current_url("https://example.com/docs/index.html")
        .unwrap();

    let _ = renderer
        .render_html(
            "<style>body { margin: 0 } p { margin: 0 }</style>\
             <p><a href=\"page2.html\">next</a> plain</p>",
        )
        .unwrap();

    assert_eq!(
        renderer.activate_at(5.0, 5.0).as_deref(),
        Some("https://example.com/docs/page2.html")
    );
    // "plain" is not a link; below the text there is nothing.
    assert_eq!(renderer.activate_at(70.0, 5.0), None);
    assert_eq!(renderer.activate_at(5.0, 300.0), None);
    assert_eq!(renderer.activate_at(-1.0, 5.0), None);
    assert_eq!(*visited.borrow(), vec!["https://example.com/docs/page2.html"]);
}

#[test]
fn test_activate_uses_scrolled_coordinates() {
    let mut renderer = renderer_with(RenderOptions {
        base_url: Some("https://example.com/".to_owned()),
        ..RenderOptions::default()
    });
    let filler = "<p>filler</p>".repeat(30);
    let _ = renderer
        .render_html(&format!(
            "<style>body {{ margin: 0 }} p {{ margin: 0; height: 20px }}</style>\
             {filler}<p><a href=\"/deep\">deep</a></p>"
        ))
        .unwrap();

    // Below the visible band.
    assert_eq!(renderer.activate_at(5.0, 605.0), None);
    renderer.set_viewport(600.0, 20.0);
    assert_eq!(
        renderer.activate_at(5.0, 5.0).as_deref(),
        Some("https://example.com/deep")
    );
}

#[test]
fn test_invalid_current_url_is_rejected() {
    let mut renderer = renderer();
    renderer.set_current_url("https://example.com/").unwrap();
    let err = renderer.set_current_url("/relative/only").unwrap_err();
    assert!(matches!(err, RenderError::InvalidUrl { .. }));
    assert_eq!(
        renderer.current_url().map(url::Url::as_str),
        Some("https://example.com/")
    );
}

#[test]
fn test_malformed_markup_still_renders() {
    let mut renderer = renderer();
    let scene = renderer
        .render_html("<div><p>unclosed <b>bold</i></span><li>item")
        .unwrap();
    assert_eq!(texts(scene.commands().iter()), vec!["unclosed", "bold", "item"]);
}

#[test]
fn test_empty_document_is_an_empty_scene() {
    let mut renderer = renderer();
    let scene = renderer.render_html("").unwrap();
    assert!(texts(scene.commands().iter()).is_empty());
    assert!(!scene.display_list.regions().is_empty());
}

#[test]
fn test_user_stylesheet_sits_below_author_rules() {
    let mut renderer = renderer();
    let _ = renderer
        .render_html("<style>p { color: blue }</style><p id=\"p\">x</p>")
        .unwrap();
    renderer
        .set_user_stylesheet("#p { color: red; background-color: yellow }")
        .unwrap();

    let styled = renderer.styled_tree().unwrap();
    let p = styled.dom.element_by_id("p").unwrap();
    let style = styled.style(p).unwrap();
    assert_eq!(style.color, ColorValue::rgb(0, 0, 255));
    assert_eq!(style.background_color, Some(ColorValue::rgb(255, 255, 0)));
    assert!(
        renderer
            .scene()
            .unwrap()
            .commands()
            .iter()
            .any(|c| matches!(c, PaintCommand::Background { node, .. } if *node == p))
    );

    let err = renderer.set_user_stylesheet("p {").unwrap_err();
    assert!(matches!(err, RenderError::UserStylesheet(CssError::UnclosedBlock { .. })));

    renderer.clear_user_stylesheet();
    let styled = renderer.styled_tree().unwrap();
    assert_eq!(styled.style(p).unwrap().background_color, None);
}

#[test]
fn test_scene_serializes_to_json() {
    let mut renderer = renderer();
    let scene: Scene = renderer
        .render_html("<p style=\"border: 1px solid red\">hi</p>")
        .unwrap();
    let json = serde_json::to_value(&scene).unwrap();

    let kinds: Vec<&str> = json["display_list"]["commands"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["border", "text"]);
    assert_eq!(json["viewport"]["offset"], 0.0);
    assert_eq!(json["width"], 800.0);
}

#[test]
fn test_screenshot_draws_visible_band() {
    let mut renderer = renderer_with(RenderOptions {
        width: 50.0,
        height: 40.0,
        ..RenderOptions::default()
    });
    let _ = renderer
        .render_html(
            "<style>body { margin: 0 }</style>\
             <div style=\"background: red; height: 10px\"></div>\
             <div style=\"background: blue; height: 50px\"></div>",
        )
        .unwrap();

    let image = renderer.screenshot().unwrap();
    assert_eq!(image.dimensions(), (50, 40));
    assert_eq!(image.get_pixel(5, 5).0, [255, 0, 0, 255]);
    assert_eq!(image.get_pixel(5, 20).0, [0, 0, 255, 255]);

    renderer.set_viewport(20.0, 40.0);
    let image = renderer.screenshot().unwrap();
    assert_eq!(image.get_pixel(5, 0).0, [0, 0, 255, 255]);
    assert_eq!(image.get_pixel(5, 39).0, [0, 0, 255, 255]);
}

#[test]
fn test_save_screenshot_reports_bad_destination() {
    let mut renderer = renderer_with(RenderOptions {
        width: 20.0,
        height: 20.0,
        ..RenderOptions::default()
    });
    let _ = renderer.render_html("<p>x</p>").unwrap();

    let path = std::env::temp_dir().join(format!("quokka-shot-{}.png", std::process::id()));
    renderer.save_screenshot(&path).unwrap();
    assert!(path.exists());
    std::fs::remove_file(&path).unwrap();

    let missing = std::env::temp_dir().join("quokka-no-such-dir").join("shot.png");
    let err = renderer.save_screenshot(&missing).unwrap_err();
    assert!(matches!(err, RasterError::Save { .. }));

    renderer.set_size(0.0, 20.0);
    assert!(matches!(
        renderer.screenshot(),
        Err(RasterError::EmptyCanvas { width: 0, .. })
    ));
}

#[test]
fn test_deeply_nested_markup_renders() {
    let mut renderer = renderer();
    let html = format!("{}bottom", "<div>".repeat(100_000));
    let scene = renderer.render_html(&html).unwrap();

    assert_eq!(texts(scene.commands().iter()), vec!["bottom"]);
    assert!(!scene.display_list.regions().is_empty());
    assert!(renderer.screenshot().is_ok());
}

#[test]
fn test_long_word_in_zero_width_block_breaks_per_character() {
    let mut renderer = renderer();
    let word = "x".repeat(20_000);
    let scene = renderer
        .render_html(&format!("<div id=\"d\" style=\"width: 0\">{word}</div>"))
        .unwrap();

    let d = renderer.styled_tree().unwrap().dom.element_by_id("d").unwrap();
    let lines = &renderer.layout_tree().unwrap().get_layout_box(d).unwrap().line_boxes;
    assert_eq!(lines.len(), 20_000);
    assert!(lines.iter().all(|line| line.inline_boxes.len() == 1));
    assert_eq!(texts(scene.commands().iter()).concat(), word);
}
