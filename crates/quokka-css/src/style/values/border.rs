//! CSS Border values
//!
//! [CSS Backgrounds and Borders Level 3](https://www.w3.org/TR/css-backgrounds-3/)

use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumString};

use super::color::ColorValue;
use super::length::LengthValue;
use crate::parser::ComponentValue;
use crate::tokenizer::CSSToken;

/// [§ 4.2 'border-style'](https://www.w3.org/TR/css-backgrounds-3/#border-style)
///
/// `<line-style> = none | hidden | dotted | dashed | solid | double | groove | ridge | inset | outset`
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Display, EnumString, AsRefStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    /// "No border." The initial value.
    #[default]
    None,
    /// "Same as 'none', but has different behavior in the border conflict
    /// resolution for table elements."
    Hidden,
    /// "A series of round dots."
    Dotted,
    /// "A series of square-ended dashes."
    Dashed,
    /// "A single line segment."
    Solid,
    /// "Two parallel solid lines with some space between them."
    Double,
    /// "Looks as if it were carved in the canvas."
    Groove,
    /// "Looks as if it were coming out of the canvas."
    Ridge,
    /// "Looks as if the content on the inside of the border is sunken into the canvas."
    Inset,
    /// "Looks as if the content on the inside of the border is coming out of the canvas."
    Outset,
}

impl BorderStyle {
    /// [§ 4.3](https://www.w3.org/TR/css-backgrounds-3/#border-width)
    /// "If border-style is none or hidden, the used width is 0."
    #[must_use]
    pub const fn draws(self) -> bool {
        !matches!(self, Self::None | Self::Hidden)
    }
}

/// Parse a component value as a `<line-style>` keyword.
#[must_use]
pub fn parse_border_style(v: &ComponentValue) -> Option<BorderStyle> {
    match v {
        ComponentValue::Token(CSSToken::Ident(ident)) => ident.parse().ok(),
        _ => None,
    }
}

/// [§ 4 Borders](https://www.w3.org/TR/css-backgrounds-3/#borders)
///
/// One edge of a border as specified.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BorderSide {
    /// [§ 4.3 'border-width'](https://www.w3.org/TR/css-backgrounds-3/#border-width)
    /// Initial value "medium".
    pub width: LengthValue,
    /// [§ 4.2 'border-style'](https://www.w3.org/TR/css-backgrounds-3/#border-style)
    pub style: BorderStyle,
    /// [§ 4.1 'border-color'](https://www.w3.org/TR/css-backgrounds-3/#border-color)
    /// `None` means "currentColor", the element's `color`.
    pub color: Option<ColorValue>,
}

impl BorderSide {
    /// "medium" resolves to 3px.
    pub const MEDIUM_WIDTH: LengthValue = LengthValue::Px(3.0);

    /// Resolve the used width in pixels.
    #[must_use]
    pub fn used_width(&self) -> f32 {
        if self.style.draws() {
            self.width.resolve(0.0).max(0.0)
        } else {
            0.0
        }
    }
}

impl Default for BorderSide {
    fn default() -> Self {
        Self {
            width: Self::MEDIUM_WIDTH,
            style: BorderStyle::None,
            color: None,
        }
    }
}
