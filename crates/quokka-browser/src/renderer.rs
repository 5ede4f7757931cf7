//! The host-facing rendering pipeline.
//!
//! ```text
//! HTML ──parse──▶ RenderTree ──cascade──▶ StyledTree ──layout──▶ LayoutTree ──paint──▶ Scene
//! ```
//!
//! The last styled tree is cached, so resizing or installing a user
//! stylesheet reruns only the stages downstream of what changed.

use std::path::Path;
use std::sync::Arc;

use fontdue::Font;
use image::RgbaImage;
use url::Url;

use quokka_common::warning::clear_warnings;
use quokka_css::{
    ApproximateFontMetrics, Cascade, DisplayList, FontMetrics, LayoutTree, Origin, Painter,
    StyledTree, Stylesheet, compute_layout, extract_style_content, parse_stylesheet,
};
use quokka_html::parse_html_with_issues;

use crate::error::{RasterError, RenderError};
use crate::font_metrics::{FontdueFontMetrics, load_font, load_system_font};
use crate::options::RenderOptions;
use crate::raster::Rasterizer;
use crate::scene::{Scene, Viewport};

/// Called with the resolved URL when a link is activated.
pub type NavigationCallback = Box<dyn FnMut(&str)>;

/// The last rendered document.
struct Document {
    styled: StyledTree,
    /// `None` when the document's CSS failed to parse.
    author: Option<Stylesheet>,
    layout: LayoutTree,
    display_list: DisplayList,
}

/// Owns the pipeline and the state a host drives it with.
///
/// A `Renderer` is single-threaded: the host serializes calls to it. Each
/// [`render_html`](Self::render_html) replaces the previous document.
pub struct Renderer {
    options: RenderOptions,
    width: f32,
    height: f32,
    viewport: Viewport,
    current_url: Option<Url>,
    navigation: Option<NavigationCallback>,
    user_stylesheet: Option<Stylesheet>,
    font: Option<Arc<Font>>,
    metrics: Box<dyn FontMetrics>,
    document: Option<Document>,
}

impl Renderer {
    /// Create a renderer, measuring text with the configured font or the
    /// first system font found.
    ///
    /// Without a usable font, text is measured with
    /// [`ApproximateFontMetrics`] and screenshots draw no glyphs.
    #[must_use]
    pub fn new(options: RenderOptions) -> Self {
        let font = options
            .font_path
            .as_deref()
            .and_then(load_font)
            .or_else(load_system_font)
            .map(Arc::new);
        let metrics: Box<dyn FontMetrics> = match &font {
            Some(font) => Box::new(FontdueFontMetrics::new(Arc::clone(font))),
            None => Box::new(ApproximateFontMetrics),
        };
        let mut renderer = Self::with_metrics(options, metrics);
        renderer.font = font;
        renderer
    }

    /// Create a renderer with an explicit text measurer and no font.
    #[must_use]
    pub fn with_metrics(options: RenderOptions, metrics: Box<dyn FontMetrics>) -> Self {
        let current_url = options.base_url.as_deref().and_then(|base| {
            Url::parse(base)
                .map_err(|e| log::warn!("ignoring invalid base URL '{base}': {e}"))
                .ok()
        });
        Self {
            width: options.width.max(0.0),
            height: options.height.max(0.0),
            viewport: Viewport {
                offset: 0.0,
                visible_height: options.height.max(0.0),
            },
            options,
            current_url,
            navigation: None,
            user_stylesheet: None,
            font: None,
            metrics,
            document: None,
        }
    }

    /// Parse, style, lay out and paint a document.
    ///
    /// Malformed markup is repaired by the parser and never fails. The
    /// viewport scrolls back to the top.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Stylesheet`] when the document's `<style>`
    /// content has a syntax error. The document is then rendered with only
    /// the user-agent and user stylesheets; that scene is in the error and
    /// is also what [`scene`](Self::scene) returns afterwards.
    pub fn render_html(&mut self, html: &str) -> Result<Scene, RenderError> {
        clear_warnings();

        let (dom, issues) = parse_html_with_issues(html);
        for issue in &issues {
            log::debug!("html recovery at token {}: {}", issue.token_index, issue.message);
        }

        let css = extract_style_content(&dom);
        let (author, error) = match parse_stylesheet(&css) {
            Ok(sheet) => (Some(sheet), None),
            Err(e) => {
                log::warn!("document stylesheet rejected, rendering unstyled: {e}");
                (None, Some(e))
            }
        };

        let styled = StyledTree::styled(dom, &self.cascade(author.as_ref()));
        let document = self.lay_out(styled, author);
        self.viewport.offset = 0.0;
        let scene = self.scene_for(&document);
        self.document = Some(document);

        match error {
            Some(source) => Err(RenderError::Stylesheet {
                source,
                fallback: Box::new(scene),
            }),
            None => Ok(scene),
        }
    }

    /// Resize the layout viewport and relayout the cached document.
    ///
    /// Safe before any render. Neither HTML nor CSS is parsed again.
    pub fn set_size(&mut self, width: f32, height: f32) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self.viewport.visible_height = self.height;

        if let Some(document) = self.document.take() {
            log::debug!("relayout at {}x{}", self.width, self.height);
            self.document = Some(self.lay_out(document.styled, document.author));
        }
        self.viewport.offset = self.clamp_offset(self.viewport.offset);
    }

    /// Height of the laid-out document, or `0.0` before the first render.
    #[must_use]
    pub fn content_height(&self) -> f32 {
        self.document
            .as_ref()
            .map_or(0.0, |document| document.layout.content_height())
    }

    /// Set the visible band. The offset is clamped to the scrollable range.
    pub fn set_viewport(&mut self, offset: f32, visible_height: f32) {
        self.viewport.visible_height = visible_height.max(0.0);
        self.viewport.offset = self.clamp_offset(offset);
    }

    /// The current viewport.
    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// The last rendered document as a scene, with the current viewport.
    #[must_use]
    pub fn scene(&self) -> Option<Scene> {
        self.document.as_ref().map(|document| self.scene_for(document))
    }

    /// The styled tree of the last render.
    #[must_use]
    pub fn styled_tree(&self) -> Option<&StyledTree> {
        self.document.as_ref().map(|document| &document.styled)
    }

    /// The layout tree of the last render.
    #[must_use]
    pub fn layout_tree(&self) -> Option<&LayoutTree> {
        self.document.as_ref().map(|document| &document.layout)
    }

    /// Set the URL relative links resolve against.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidUrl`] if `url` is not an absolute URL;
    /// the previous URL is kept.
    pub fn set_current_url(&mut self, url: &str) -> Result<(), RenderError> {
        let parsed = Url::parse(url).map_err(|source| RenderError::InvalidUrl {
            url: url.to_owned(),
            source,
        })?;
        self.current_url = Some(parsed);
        Ok(())
    }

    /// The URL relative links resolve against.
    #[must_use]
    pub const fn current_url(&self) -> Option<&Url> {
        self.current_url.as_ref()
    }

    /// Register the callback invoked by [`activate_at`](Self::activate_at).
    pub fn set_navigation_callback(&mut self, callback: impl FnMut(&str) + 'static) {
        self.navigation = Some(Box::new(callback));
    }

    /// Activate whatever link is drawn at a point in viewport coordinates.
    ///
    /// Returns the resolved URL after passing it to the navigation callback,
    /// or `None` when no link is under the point or the point is outside the
    /// viewport.
    pub fn activate_at(&mut self, x: f32, y: f32) -> Option<String> {
        let document = self.document.as_ref()?;
        if !(0.0..self.width).contains(&x) || !(0.0..self.viewport.visible_height).contains(&y) {
            return None;
        }
        let y = y + self.viewport.offset;

        // Topmost first.
        let href = document
            .display_list
            .commands()
            .iter()
            .rev()
            .find_map(|command| command.link().filter(|_| command.rect().contains(x, y)))?
            .to_owned();

        let target = self.resolve_link(&href);
        log::debug!("activated link '{href}' -> {target}");
        if let Some(navigate) = self.navigation.as_mut() {
            navigate(&target);
        }
        Some(target)
    }

    /// Install a stylesheet between the user-agent and document origins and
    /// restyle the cached document.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::UserStylesheet`] on a syntax error; the previous
    /// user stylesheet stays installed.
    pub fn set_user_stylesheet(&mut self, css: &str) -> Result<(), RenderError> {
        let sheet = parse_stylesheet(css).map_err(RenderError::UserStylesheet)?;
        self.user_stylesheet = Some(sheet);
        self.restyle();
        Ok(())
    }

    /// Remove the user stylesheet and restyle the cached document.
    pub fn clear_user_stylesheet(&mut self) {
        if self.user_stylesheet.take().is_some() {
            self.restyle();
        }
    }

    /// Rasterize the visible part of the current scene.
    ///
    /// Before any render this is a blank page.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::EmptyCanvas`] when the viewport has no area.
    pub fn screenshot(&self) -> Result<RgbaImage, RasterError> {
        Ok(self.rasterize()?.into_image())
    }

    /// Rasterize the visible part of the current scene and write it to
    /// `path`, in the format its extension names.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::EmptyCanvas`] when the viewport has no area, or
    /// [`RasterError::Save`] when the image cannot be written.
    pub fn save_screenshot(&self, path: &Path) -> Result<(), RasterError> {
        self.rasterize()?.save(path)?;
        log::info!("saved screenshot to {}", path.display());
        Ok(())
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn rasterize(&self) -> Result<Rasterizer<'_>, RasterError> {
        let width = self.width.round() as u32;
        let height = self.viewport.visible_height.round() as u32;
        let mut rasterizer = Rasterizer::new(width, height, self.font.as_deref())?;
        if let Some(scene) = self.scene() {
            rasterizer.paint(&scene);
        }
        Ok(rasterizer)
    }

    /// The options the renderer was created with.
    #[must_use]
    pub const fn options(&self) -> &RenderOptions {
        &self.options
    }

    fn cascade(&self, author: Option<&Stylesheet>) -> Cascade {
        let mut cascade = Cascade::new()
            .with_user_agent_stylesheet(self.options.user_agent_stylesheet)
            .with_root_font_size(self.options.default_font_size);
        if let Some(user) = &self.user_stylesheet {
            cascade.add_stylesheet(Origin::User, user.clone());
        }
        if let Some(author) = author {
            cascade.add_stylesheet(Origin::Author, author.clone());
        }
        cascade
    }

    fn restyle(&mut self) {
        if let Some(document) = self.document.take() {
            let mut styled = document.styled;
            styled.apply_styles(&self.cascade(document.author.as_ref()));
            self.document = Some(self.lay_out(styled, document.author));
        }
    }

    fn lay_out(&self, styled: StyledTree, author: Option<Stylesheet>) -> Document {
        let layout = compute_layout(&styled, self.width, self.height, self.metrics.as_ref());
        let display_list = Painter::new(&styled).paint(&layout);
        log::debug!(
            "painted {} commands, content height {}",
            display_list.len(),
            layout.content_height()
        );
        Document {
            styled,
            author,
            layout,
            display_list,
        }
    }

    fn scene_for(&self, document: &Document) -> Scene {
        Scene {
            display_list: document.display_list.clone(),
            width: self.width,
            content_height: document.layout.content_height(),
            viewport: self.viewport,
        }
    }

    fn clamp_offset(&self, offset: f32) -> f32 {
        let max = (self.content_height() - self.viewport.visible_height).max(0.0);
        offset.clamp(0.0, max)
    }

    fn resolve_link(&self, href: &str) -> String {
        match &self.current_url {
            Some(base) => base.join(href).map_or_else(
                |e| {
                    log::warn!("cannot resolve '{href}' against {base}: {e}");
                    href.to_owned()
                },
                String::from,
            ),
            None => href.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> Renderer {
        Renderer::with_metrics(RenderOptions::default(), Box::new(ApproximateFontMetrics))
    }

    #[test]
    fn test_viewport_offset_is_clamped() {
        let mut renderer = renderer();
        renderer.set_viewport(50.0, 100.0);
        assert_eq!(renderer.viewport().offset, 0.0);

        let _ = renderer
            .render_html(&"<p>line</p>".repeat(40))
            .unwrap();
        let max = renderer.content_height() - 100.0;
        renderer.set_viewport(1.0e6, 100.0);
        assert_eq!(renderer.viewport().offset, max);
        renderer.set_viewport(-5.0, 100.0);
        assert_eq!(renderer.viewport().offset, 0.0);
    }

    #[test]
    fn test_invalid_base_url_is_ignored() {
        let options = RenderOptions {
            base_url: Some("not a url".to_owned()),
            ..RenderOptions::default()
        };
        let renderer = Renderer::with_metrics(options, Box::new(ApproximateFontMetrics));
        assert!(renderer.current_url().is_none());
    }

    #[test]
    fn test_link_without_base_is_returned_verbatim() {
        assert_eq!(renderer().resolve_link("next.html"), "next.html");
    }
}
