//! Errors surfaced to the host.
//!
//! Malformed markup is never an error: the HTML parser recovers and the
//! pipeline lays out whatever tree it produced. Only stylesheets that cannot
//! be parsed, bad URLs and rasterization failures are reported.

use std::path::PathBuf;

use thiserror::Error;

use quokka_css::CssError;

use crate::scene::Scene;

/// Failure of a [`Renderer`](crate::Renderer) operation.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The document's CSS has a syntax error. Layout still ran without the
    /// document's stylesheets; the result is in `fallback`.
    #[error("document stylesheet: {source}")]
    Stylesheet {
        /// The syntax error, with the offending rule.
        source: CssError,
        /// The document laid out without author styles.
        fallback: Box<Scene>,
    },

    /// The user stylesheet has a syntax error and was not installed.
    #[error("user stylesheet: {0}")]
    UserStylesheet(#[source] CssError),

    /// A URL that could not be parsed.
    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        /// The rejected input.
        url: String,
        /// Why it was rejected.
        source: url::ParseError,
    },
}

impl RenderError {
    /// The unstyled scene rendered alongside a stylesheet error.
    #[must_use]
    pub fn into_fallback(self) -> Option<Scene> {
        match self {
            Self::Stylesheet { fallback, .. } => Some(*fallback),
            _ => None,
        }
    }
}

/// Failure while turning a scene into pixels.
#[derive(Debug, Error)]
pub enum RasterError {
    /// The requested canvas has no pixels.
    #[error("cannot rasterize a {width}x{height} canvas")]
    EmptyCanvas {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// Writing the image failed.
    #[error("failed to save screenshot to '{}': {source}", path.display())]
    Save {
        /// Destination.
        path: PathBuf,
        /// Underlying encoder or I/O error.
        source: image::ImageError,
    },
}
