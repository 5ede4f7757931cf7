//! Software rasterizer for headless screenshot generation.
//!
//! Executes the visible part of a [`Scene`] to a pixel buffer using fontdue
//! for text rasterization.
//!
//! # Architecture
//!
//! The rasterizer is the final stage in the pipeline:
//!
//! ```text
//! Style → Layout → Paint → Raster
//!                    ↓        ↓
//!              DisplayList → Pixels
//! ```
//!
//! It knows nothing about CSS, layout, or the DOM. It simply executes
//! drawing commands.

use std::path::Path;

use fontdue::Font;
use image::{ImageBuffer, Rgba, RgbaImage};

use quokka_css::{BorderStyle, ColorValue, PaintCommand, Rect, Sides};

use crate::error::RasterError;
use crate::scene::Scene;

/// Executes paint commands into an RGBA buffer.
pub struct Rasterizer<'f> {
    buffer: RgbaImage,
    font: Option<&'f Font>,
    /// Subtracted from every command's y coordinate.
    scroll: f32,
}

impl<'f> Rasterizer<'f> {
    /// Create a white canvas. Text is skipped when `font` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::EmptyCanvas`] when either dimension is zero.
    pub fn new(width: u32, height: u32, font: Option<&'f Font>) -> Result<Self, RasterError> {
        if width == 0 || height == 0 {
            return Err(RasterError::EmptyCanvas { width, height });
        }
        Ok(Self {
            buffer: ImageBuffer::from_pixel(width, height, Rgba([255, 255, 255, 255])),
            font,
            scroll: 0.0,
        })
    }

    /// Draw the scene's visible commands, shifted by the viewport offset.
    pub fn paint(&mut self, scene: &Scene) {
        self.scroll = scene.viewport.offset;
        for command in scene.visible_commands() {
            self.execute_command(command);
        }
    }

    /// Execute a single paint command.
    pub fn execute_command(&mut self, command: &PaintCommand) {
        match command {
            PaintCommand::Background { rect, color, .. } => {
                let rect = self.to_canvas(*rect);
                self.fill_rect(rect, *color);
            }
            PaintCommand::Border {
                rect,
                widths,
                styles,
                colors,
                ..
            } => {
                let rect = self.to_canvas(*rect);
                self.draw_border(rect, widths, styles, colors);
            }
            PaintCommand::Text {
                rect,
                text,
                font_size,
                color,
                ..
            } => {
                let rect = self.to_canvas(*rect);
                self.draw_text(text, rect, *font_size, *color);
            }
        }
    }

    /// The pixels drawn so far.
    #[must_use]
    pub const fn image(&self) -> &RgbaImage {
        &self.buffer
    }

    /// Take the pixel buffer.
    #[must_use]
    pub fn into_image(self) -> RgbaImage {
        self.buffer
    }

    /// Save the image to a file; the format follows the extension.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::Save`] if the image cannot be encoded or written.
    pub fn save(&self, path: &Path) -> Result<(), RasterError> {
        self.buffer.save(path).map_err(|source| RasterError::Save {
            path: path.to_path_buf(),
            source,
        })
    }

    fn to_canvas(&self, rect: Rect) -> Rect {
        Rect {
            y: rect.y - self.scroll,
            ..rect
        }
    }

    /// Fill a rectangle, blending by the color's alpha.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn fill_rect(&mut self, rect: Rect, color: ColorValue) {
        if color.is_transparent() || rect.width <= 0.0 || rect.height <= 0.0 {
            return;
        }
        let (width, height) = self.buffer.dimensions();
        let x0 = rect.x.round().clamp(0.0, width as f32) as u32;
        let y0 = rect.y.round().clamp(0.0, height as f32) as u32;
        let x1 = rect.right().round().clamp(0.0, width as f32) as u32;
        let y1 = rect.bottom().round().clamp(0.0, height as f32) as u32;

        let rgba = Rgba([color.r, color.g, color.b, 255]);
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend_pixel(px, py, rgba, color.a);
            }
        }
    }

    /// [§ 4.2 'border-style'](https://www.w3.org/TR/css-backgrounds-3/#border-style)
    ///
    /// Each side is a band along its edge of the border box. Dashes are three
    /// widths long, dots one width; `double` draws two strokes of a third of
    /// the width each. Other styles draw solid.
    fn draw_border(
        &mut self,
        rect: Rect,
        widths: &Sides<f32>,
        styles: &Sides<BorderStyle>,
        colors: &Sides<ColorValue>,
    ) {
        let top = Rect {
            height: widths.top,
            ..rect
        };
        let bottom = Rect {
            y: rect.bottom() - widths.bottom,
            height: widths.bottom,
            ..rect
        };
        let left = Rect {
            y: rect.y + widths.top,
            width: widths.left,
            height: rect.height - widths.top - widths.bottom,
            ..rect
        };
        let right = Rect {
            x: rect.right() - widths.right,
            width: widths.right,
            ..left
        };

        self.stroke_side(top, styles.top, colors.top, true);
        self.stroke_side(right, styles.right, colors.right, false);
        self.stroke_side(bottom, styles.bottom, colors.bottom, true);
        self.stroke_side(left, styles.left, colors.left, false);
    }

    fn stroke_side(&mut self, band: Rect, style: BorderStyle, color: ColorValue, horizontal: bool) {
        let thickness = if horizontal { band.height } else { band.width };
        if thickness <= 0.0 || !style.draws() {
            return;
        }

        match style {
            BorderStyle::Dashed | BorderStyle::Dotted => {
                let segment = if style == BorderStyle::Dashed {
                    thickness * 3.0
                } else {
                    thickness
                };
                let length = if horizontal { band.width } else { band.height };
                let mut offset = 0.0;
                while offset < length {
                    let piece = segment.min(length - offset);
                    let rect = if horizontal {
                        Rect {
                            x: band.x + offset,
                            width: piece,
                            ..band
                        }
                    } else {
                        Rect {
                            y: band.y + offset,
                            height: piece,
                            ..band
                        }
                    };
                    self.fill_rect(rect, color);
                    offset += segment * 2.0;
                }
            }
            BorderStyle::Double if thickness >= 3.0 => {
                let stroke = thickness / 3.0;
                let (first, second) = if horizontal {
                    (
                        Rect {
                            height: stroke,
                            ..band
                        },
                        Rect {
                            y: band.bottom() - stroke,
                            height: stroke,
                            ..band
                        },
                    )
                } else {
                    (
                        Rect {
                            width: stroke,
                            ..band
                        },
                        Rect {
                            x: band.right() - stroke,
                            width: stroke,
                            ..band
                        },
                    )
                };
                self.fill_rect(first, color);
                self.fill_rect(second, color);
            }
            _ => self.fill_rect(band, color),
        }
    }

    /// Draw a run of text with its top-left corner at the inline box origin.
    ///
    /// [§ 10.8.1 Leading and half-leading](https://www.w3.org/TR/CSS2/visudet.html#leading)
    ///
    /// "half the leading is added above A and the other half below D", so the
    /// baseline sits half the leading plus the ascent below the box top.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_possible_wrap
    )]
    fn draw_text(&mut self, text: &str, rect: Rect, font_size: f32, color: ColorValue) {
        let Some(font) = self.font else {
            return;
        };
        if color.is_transparent() {
            return;
        }

        let (ascent, descent) = font
            .horizontal_line_metrics(font_size)
            .map_or((font_size * 0.8, -font_size * 0.2), |m| (m.ascent, m.descent));
        let half_leading = (rect.height - (ascent - descent)) / 2.0;
        let baseline = rect.y + half_leading + ascent;

        let (width, height) = self.buffer.dimensions();
        let rgba = Rgba([color.r, color.g, color.b, 255]);
        let mut cursor_x = rect.x;

        for ch in text.chars().filter(|ch| !ch.is_control()) {
            let (metrics, bitmap) = font.rasterize(ch, font_size);

            // fontdue offsets the bitmap from the pen position on the baseline.
            let glyph_x = cursor_x.round() as i32 + metrics.xmin;
            let glyph_y = baseline.round() as i32 - metrics.ymin - metrics.height as i32;

            for gy in 0..metrics.height {
                for gx in 0..metrics.width {
                    let coverage = bitmap[gy * metrics.width + gx];
                    if coverage == 0 {
                        continue;
                    }
                    let px = glyph_x + gx as i32;
                    let py = glyph_y + gy as i32;
                    if px >= 0 && py >= 0 && (px as u32) < width && (py as u32) < height {
                        let alpha = (u16::from(coverage) * u16::from(color.a) / 255) as u8;
                        self.blend_pixel(px as u32, py as u32, rgba, alpha);
                    }
                }
            }

            cursor_x += metrics.advance_width;
        }
    }

    fn blend_pixel(&mut self, x: u32, y: u32, color: Rgba<u8>, alpha: u8) {
        let bg = *self.buffer.get_pixel(x, y);
        self.buffer.put_pixel(x, y, alpha_blend(color, bg, alpha));
    }
}

/// Alpha blend a foreground color onto a background color.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn alpha_blend(fg: Rgba<u8>, bg: Rgba<u8>, alpha: u8) -> Rgba<u8> {
    if alpha == 255 {
        return fg;
    }
    let a = f32::from(alpha) / 255.0;
    let inv_a = 1.0 - a;

    Rgba([
        f32::from(fg[0]).mul_add(a, f32::from(bg[0]) * inv_a).round() as u8,
        f32::from(fg[1]).mul_add(a, f32::from(bg[1]) * inv_a).round() as u8,
        f32::from(fg[2]).mul_add(a, f32::from(bg[2]) * inv_a).round() as u8,
        255,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use quokka_dom::NodeId;

    fn rect(x: f32, y: f32, width: f32, height: f32) -> Rect {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    #[test]
    fn test_empty_canvas_is_an_error() {
        assert!(matches!(
            Rasterizer::new(0, 10, None),
            Err(RasterError::EmptyCanvas { width: 0, height: 10 })
        ));
    }

    #[test]
    fn test_background_fill_is_clipped_to_canvas() {
        let mut raster = Rasterizer::new(10, 10, None).unwrap();
        raster.execute_command(&PaintCommand::Background {
            node: NodeId(1),
            rect: rect(-5.0, 5.0, 8.0, 20.0),
            color: ColorValue::rgb(255, 0, 0),
        });
        let image = raster.into_image();
        assert_eq!(image.get_pixel(2, 9).0, [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(3, 9).0, [255, 255, 255, 255]);
        assert_eq!(image.get_pixel(2, 4).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_border_sides_use_their_own_color() {
        let mut raster = Rasterizer::new(20, 20, None).unwrap();
        let red = ColorValue::rgb(255, 0, 0);
        let blue = ColorValue::rgb(0, 0, 255);
        raster.execute_command(&PaintCommand::Border {
            node: NodeId(1),
            rect: rect(0.0, 0.0, 20.0, 20.0),
            widths: Sides {
                top: 2.0,
                right: 0.0,
                bottom: 2.0,
                left: 3.0,
            },
            styles: Sides::uniform(BorderStyle::Solid),
            colors: Sides {
                top: red,
                right: red,
                bottom: red,
                left: blue,
            },
        });
        let image = raster.image();
        assert_eq!(image.get_pixel(10, 1).0, [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(1, 10).0, [0, 0, 255, 255]);
        assert_eq!(image.get_pixel(19, 10).0, [255, 255, 255, 255]);
        assert_eq!(image.get_pixel(10, 10).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_dashed_border_leaves_gaps() {
        let mut raster = Rasterizer::new(40, 10, None).unwrap();
        raster.execute_command(&PaintCommand::Border {
            node: NodeId(1),
            rect: rect(0.0, 0.0, 40.0, 10.0),
            widths: Sides {
                top: 2.0,
                right: 0.0,
                bottom: 0.0,
                left: 0.0,
            },
            styles: Sides::uniform(BorderStyle::Dashed),
            colors: Sides::uniform(ColorValue::BLACK),
        });
        let image = raster.image();
        // Dashes of 6px separated by 6px gaps.
        assert_eq!(image.get_pixel(1, 0).0, [0, 0, 0, 255]);
        assert_eq!(image.get_pixel(8, 0).0, [255, 255, 255, 255]);
        assert_eq!(image.get_pixel(13, 0).0, [0, 0, 0, 255]);
    }

    #[test]
    fn test_half_transparent_fill_blends() {
        let mut raster = Rasterizer::new(4, 4, None).unwrap();
        raster.execute_command(&PaintCommand::Background {
            node: NodeId(1),
            rect: rect(0.0, 0.0, 4.0, 4.0),
            color: ColorValue {
                r: 0,
                g: 0,
                b: 0,
                a: 128,
            },
        });
        let [r, g, b, a] = raster.image().get_pixel(0, 0).0;
        assert_eq!((r, g, b, a), (127, 127, 127, 255));
    }
}
