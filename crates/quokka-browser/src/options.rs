//! Renderer configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use quokka_css::DEFAULT_FONT_SIZE_PX;

/// Settings for a [`Renderer`](crate::Renderer).
///
/// Every field has a default, so a partial JSON object is a valid
/// configuration:
///
/// ```
/// # use quokka_browser::RenderOptions;
/// let options: RenderOptions = serde_json::from_str(r#"{ "width": 1024 }"#).unwrap();
/// assert_eq!(options.width, 1024.0);
/// assert_eq!(options.height, 600.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Viewport width in pixels.
    pub width: f32,
    /// Viewport height in pixels.
    pub height: f32,
    /// Font size of the root element, and the base for `rem`.
    pub default_font_size: f32,
    /// Apply the built-in user-agent stylesheet.
    pub user_agent_stylesheet: bool,
    /// URL that relative links resolve against until one is set on the renderer.
    pub base_url: Option<String>,
    /// Font file to use instead of searching the system.
    pub font_path: Option<PathBuf>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            default_font_size: DEFAULT_FONT_SIZE_PX,
            user_agent_stylesheet: true,
            base_url: None,
            font_path: None,
        }
    }
}
