//! Rendering pipeline orchestration for the Quokka renderer.
//!
//! # Scope
//!
//! This crate provides:
//! - **Renderer** - runs parse, cascade, layout and paint, and keeps the last
//!   document for relayout, scrolling and link activation
//! - **Scene** - the toolkit-independent result handed to a host
//! - **Font Metrics** - fontdue-backed text measurement for layout
//! - **Software Rendering** - headless screenshot generation
//!
//! # Not Yet Implemented
//!
//! - Resource loading (images, external stylesheets, web fonts)
//! - Fetching documents; the host supplies HTML text

pub mod error;
pub mod font_metrics;
pub mod options;
pub mod raster;
pub mod renderer;
pub mod scene;

pub use quokka_css as css;
pub use quokka_dom as dom;
pub use quokka_html as html;

pub use error::{RasterError, RenderError};
pub use font_metrics::{FontdueFontMetrics, load_font, load_system_font};
pub use options::RenderOptions;
pub use raster::Rasterizer;
pub use renderer::{NavigationCallback, Renderer};
pub use scene::{Scene, Viewport};
