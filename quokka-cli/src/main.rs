//! Quokka CLI
//!
//! A headless host for the renderer: prints the render tree, the layout
//! tree or the scene, or saves a screenshot.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use owo_colors::OwoColorize;

use quokka_browser::{RenderOptions, Renderer, Scene};
use quokka_css::{EdgeSizes, FlowItem, LayoutBox, LayoutTree};
use quokka_dom::RenderTree;
use quokka_html::print_tree;

/// Quokka: render HTML and CSS to a display list
#[derive(Parser, Debug)]
#[command(name = "quokka")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the render tree
    quokka ./index.html

    # Print the layout tree with box dimensions
    quokka --layout ./index.html

    # Dump the scene as JSON
    quokka --json --html '<p>Hello</p>'

    # Take a screenshot with a custom viewport
    quokka -S out.png --width 1024 --height 768 ./index.html

    # Load renderer settings from a file
    quokka --config quokka.json ./index.html
"#)]
struct Cli {
    /// Path to an HTML file
    #[arg(value_name = "FILE")]
    path: Option<PathBuf>,

    /// Render an HTML string instead of a file
    #[arg(long, value_name = "HTML", conflicts_with = "path")]
    html: Option<String>,

    /// Print the layout tree with box dimensions
    #[arg(long)]
    layout: bool,

    /// Print the scene as JSON
    #[arg(long, conflicts_with = "layout")]
    json: bool,

    /// Save a screenshot of the viewport to the given file
    #[arg(short = 'S', long, value_name = "FILE")]
    screenshot: Option<PathBuf>,

    /// Viewport width (overrides the config file)
    #[arg(long)]
    width: Option<f32>,

    /// Viewport height (overrides the config file)
    #[arg(long)]
    height: Option<f32>,

    /// JSON file with renderer settings
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// URL relative links resolve against (defaults to the file's URL)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// More logging: -v for debug, -vv for trace. `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = load_options(&cli)?;
    let html = load_html(&cli)?;

    let mut renderer = Renderer::new(options);
    let scene = render(&mut renderer, &html)?;

    if let Some(ref output_path) = cli.screenshot {
        renderer.save_screenshot(output_path)?;
        println!("Screenshot saved to: {}", output_path.display());
    } else if cli.json {
        println!("{}", serde_json::to_string_pretty(&scene)?);
    } else if cli.layout {
        print_layout(&renderer);
    } else {
        print_document(&renderer, &scene);
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Settings from `--config`, then individual flags on top.
fn load_options(cli: &Cli) -> Result<RenderOptions> {
    let mut options = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => RenderOptions::default(),
    };

    if let Some(width) = cli.width {
        options.width = width;
    }
    if let Some(height) = cli.height {
        options.height = height;
    }
    if let Some(ref base_url) = cli.base_url {
        options.base_url = Some(base_url.clone());
    } else if options.base_url.is_none()
        && let Some(ref path) = cli.path
    {
        options.base_url = file_url(path);
    }

    log::debug!("render options: {options:?}");
    Ok(options)
}

fn file_url(path: &Path) -> Option<String> {
    let absolute = fs::canonicalize(path).ok()?;
    url::Url::from_file_path(absolute).ok().map(String::from)
}

fn load_html(cli: &Cli) -> Result<String> {
    if let Some(ref html) = cli.html {
        Ok(html.clone())
    } else if let Some(ref path) = cli.path {
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
    } else {
        anyhow::bail!("nothing to render: pass a FILE or --html")
    }
}

/// Render, accepting the unstyled fallback when the document's CSS is broken.
fn render(renderer: &mut Renderer, html: &str) -> Result<Scene> {
    match renderer.render_html(html) {
        Ok(scene) => Ok(scene),
        Err(err) => {
            let message = err.to_string();
            let scene = err.into_fallback().context(message.clone())?;
            eprintln!(
                "{} {message}; rendering without document styles",
                "warning:".yellow().bold()
            );
            Ok(scene)
        }
    }
}

/// Print the render tree and a summary of the scene.
fn print_document(renderer: &Renderer, scene: &Scene) {
    let Some(styled) = renderer.styled_tree() else {
        return;
    };

    println!("=== Render Tree ===");
    print_tree(&styled.dom, styled.dom.root(), 0);

    println!("\n=== Computed Styles ===");
    println!("{} styled elements", styled.styles.len());

    println!("\n=== Scene ===");
    println!("{} paint commands", scene.commands().len());
    println!("{} paint regions", scene.display_list.regions().len());
    println!("content: {:.1}x{:.1}", scene.width, scene.content_height);
}

/// Print the layout tree with computed dimensions.
fn print_layout(renderer: &Renderer) {
    let (Some(styled), Some(layout)) = (renderer.styled_tree(), renderer.layout_tree()) else {
        return;
    };
    let options = renderer.options();
    println!(
        "{}\n",
        format!(
            "=== Layout Tree (viewport: {}x{}) ===",
            options.width, options.height
        )
        .bold()
    );
    print_layout_box(layout, &styled.dom, layout.root(), 0);
}

/// Recursively print a layout box, its lines and its children in flow order.
fn print_layout_box(layout: &LayoutTree, dom: &RenderTree, layout_box: &LayoutBox, depth: usize) {
    let indent = "  ".repeat(depth);
    let dims = &layout_box.dimensions;

    let name = dom
        .tag_name(layout_box.node)
        .map_or_else(|| "Document".to_string(), |tag| format!("<{tag}>"));
    println!(
        "{indent}{} {}",
        name.cyan().bold(),
        format!("({:?})", layout_box.node).dimmed()
    );
    println!(
        "{indent}  content: x={:.1} y={:.1} w={:.1} h={:.1}",
        dims.content.x, dims.content.y, dims.content.width, dims.content.height
    );
    print_edges(&indent, "margin", &dims.margin);
    print_edges(&indent, "border", &dims.border);
    print_edges(&indent, "padding", &dims.padding);

    for item in &layout_box.flow {
        match item {
            FlowItem::Block(id) => {
                if let Some(child) = layout.get(*id) {
                    print_layout_box(layout, dom, child, depth + 1);
                }
            }
            FlowItem::Line(index) => {
                let Some(line) = layout_box.line_boxes.get(*index) else {
                    continue;
                };
                let words: Vec<String> = line
                    .inline_boxes
                    .iter()
                    .map(|b| format!("{:?}", b.text))
                    .collect();
                println!(
                    "{indent}  {} y={:.1} w={:.1}/{:.1} {}",
                    "line".green(),
                    line.rect.y,
                    line.width(),
                    line.available_width,
                    words.join(" ").yellow()
                );
            }
        }
    }
}

fn print_edges(indent: &str, label: &str, edges: &EdgeSizes) {
    if edges.iter().any(|e| *e != 0.0) {
        println!(
            "{indent}  {label}: t={:.1} r={:.1} b={:.1} l={:.1}",
            edges.top, edges.right, edges.bottom, edges.left
        );
    }
}
