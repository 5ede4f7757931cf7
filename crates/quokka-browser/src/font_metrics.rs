//! Font metrics backed by fontdue for accurate text measurement during layout.
//!
//! [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
//!
//! "CSS assumes that every font has font metrics that specify a
//! characteristic height above the baseline and a depth below it."

use std::path::Path;
use std::sync::Arc;

use fontdue::{Font, FontSettings};
use quokka_css::FontMetrics;

/// Common system font paths to search for a default font.
const FONT_SEARCH_PATHS: &[&str] = &[
    // macOS
    "/System/Library/Fonts/Helvetica.ttc",
    "/System/Library/Fonts/SFNS.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    // Linux
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    // Windows
    "C:\\Windows\\Fonts\\arial.ttf",
    "C:\\Windows\\Fonts\\segoeui.ttf",
];

/// Load a font file.
#[must_use]
pub fn load_font(path: &Path) -> Option<Font> {
    let data = std::fs::read(path)
        .map_err(|e| log::debug!("cannot read font {}: {e}", path.display()))
        .ok()?;
    let font = Font::from_bytes(data, FontSettings::default())
        .map_err(|e| log::warn!("cannot parse font {}: {e}", path.display()))
        .ok()?;
    log::info!("loaded font {}", path.display());
    Some(font)
}

/// Load the first usable font from the common system locations.
#[must_use]
pub fn load_system_font() -> Option<Font> {
    let font = FONT_SEARCH_PATHS
        .iter()
        .find_map(|path| load_font(Path::new(path)));
    if font.is_none() {
        log::warn!(
            "no system font found in {} locations; text is measured approximately and not drawn",
            FONT_SEARCH_PATHS.len()
        );
    }
    font
}

/// Font metrics implementation backed by fontdue's per-glyph metrics.
///
/// Uses `Font::metrics()` rather than `Font::rasterize()`, so measuring never
/// generates bitmaps.
#[derive(Clone)]
pub struct FontdueFontMetrics {
    font: Arc<Font>,
}

impl FontdueFontMetrics {
    /// Create a new font metrics provider from a shared fontdue font.
    #[must_use]
    pub const fn new(font: Arc<Font>) -> Self {
        Self { font }
    }
}

impl FontMetrics for FontdueFontMetrics {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        // Sum per-character advance widths, matching the cursor advancement
        // in the rasterizer.
        text.chars()
            .filter(|ch| !ch.is_control())
            .map(|ch| self.font.metrics(ch, font_size).advance_width)
            .sum()
    }

    fn line_height(&self, font_size: f32) -> f32 {
        // [§ 10.8.1 Leading and half-leading](https://www.w3.org/TR/CSS2/visudet.html#leading)
        //
        // "We recommend a used value for 'normal' between 1.0 and 1.2."
        font_size * 1.2
    }
}
