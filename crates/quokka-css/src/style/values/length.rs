//! CSS Length values and parsing
//!
//! [CSS Values and Units Level 4](https://www.w3.org/TR/css-values-4/)

use serde::Serialize;

use crate::parser::ComponentValue;
use crate::tokenizer::CSSToken;
use quokka_common::warning::warn_once;

/// User agent default font size.
/// [§ 3.5 font-size](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
pub const DEFAULT_FONT_SIZE_PX: f32 = 16.0;

/// [§ 4.1 Lengths](https://www.w3.org/TR/css-values-4/#lengths)
/// "Lengths refer to distance measurements and are denoted by `<length>` in the
/// property definitions."
///
/// Font-relative units are replaced by pixels when the cascade computes a
/// style, so a [`ComputedStyle`](crate::style::ComputedStyle) only ever holds
/// `Px` and `Percent`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum LengthValue {
    /// [§ 6.1 Absolute lengths](https://www.w3.org/TR/css-values-4/#absolute-lengths)
    /// "1px = 1/96th of 1in". Points are converted on parse.
    Px(f32),
    /// [§ 5.1.1 Font-relative lengths](https://www.w3.org/TR/css-values-4/#font-relative-lengths)
    /// "Equal to the computed value of the font-size property of the element"
    Em(f32),
    /// "Equal to the computed value of the font-size property of the root element."
    Rem(f32),
    /// [§ 4.3 Percentages](https://www.w3.org/TR/css-values-4/#percentages)
    Percent(f32),
}

impl LengthValue {
    /// Zero pixels.
    pub const ZERO: Self = Self::Px(0.0);

    /// Replace font-relative units with pixels.
    #[must_use]
    pub fn to_computed(self, font_size: f32, root_font_size: f32) -> Self {
        match self {
            Self::Em(em) => Self::Px(em * font_size),
            Self::Rem(rem) => Self::Px(rem * root_font_size),
            other => other,
        }
    }

    /// Resolve to pixels, with percentages taken of `percent_base`.
    ///
    /// [§ 8.3](https://www.w3.org/TR/CSS2/box.html#margin-properties)
    /// Margin and padding percentages refer to the containing block's width,
    /// even for top and bottom. Any font-relative unit still present resolves
    /// against the default font size.
    #[must_use]
    pub fn resolve(&self, percent_base: f32) -> f32 {
        match self {
            Self::Px(px) => *px,
            Self::Em(v) | Self::Rem(v) => v * DEFAULT_FONT_SIZE_PX,
            Self::Percent(pct) => pct * percent_base / 100.0,
        }
    }
}

/// [§ 4.4 Automatic values](https://www.w3.org/TR/CSS2/cascade.html#value-def-auto)
///
/// "Some properties can take the keyword 'auto' as a value. This keyword
/// allows the user agent to compute the value based on other properties."
///
/// [§ 10.3.3 Block-level, non-replaced elements in normal flow](https://www.w3.org/TR/CSS2/visudet.html#blockwidth)
///
/// "If both 'margin-left' and 'margin-right' are 'auto', their used values
/// are equal. This horizontally centers the element with respect to the
/// edges of the containing block."
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum AutoLength {
    /// The value is 'auto' and is resolved during layout.
    Auto,
    /// A specific length value.
    Length(LengthValue),
}

impl AutoLength {
    /// Zero pixels.
    pub const ZERO: Self = Self::Length(LengthValue::ZERO);

    /// Check if the value is 'auto'.
    #[must_use]
    pub const fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }

    /// Resolve to pixels, or `None` for 'auto'.
    #[must_use]
    pub fn resolve(&self, percent_base: f32) -> Option<f32> {
        match self {
            Self::Auto => None,
            Self::Length(len) => Some(len.resolve(percent_base)),
        }
    }

    /// Replace font-relative units with pixels.
    #[must_use]
    pub fn to_computed(self, font_size: f32, root_font_size: f32) -> Self {
        match self {
            Self::Auto => Self::Auto,
            Self::Length(len) => Self::Length(len.to_computed(font_size, root_font_size)),
        }
    }
}

/// [§ 4.1 Lengths](https://www.w3.org/TR/css-values-4/#lengths)
/// Parse a single component value as a `<length>` or `<percentage>`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn parse_single_length(v: &ComponentValue) -> Option<LengthValue> {
    match v {
        ComponentValue::Token(CSSToken::Dimension { value, unit }) => {
            let value = *value as f32;
            match unit.as_str() {
                "px" => Some(LengthValue::Px(value)),
                // "1pt = 1/72nd of 1in", "1px = 1/96th of 1in"
                "pt" => Some(LengthValue::Px(value * 96.0 / 72.0)),
                "em" => Some(LengthValue::Em(value)),
                "rem" => Some(LengthValue::Rem(value)),
                _ => {
                    warn_once("CSS", &format!("unsupported unit '{unit}'"));
                    None
                }
            }
        }
        ComponentValue::Token(CSSToken::Percentage(value)) => {
            Some(LengthValue::Percent(*value as f32))
        }
        // [§ 4.2](https://www.w3.org/TR/css-values-4/#lengths)
        // "for zero lengths the unit identifier is optional"
        ComponentValue::Token(CSSToken::Number(value)) if *value == 0.0 => Some(LengthValue::ZERO),
        _ => None,
    }
}

/// [§ 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties)
/// Parse a single component value as 'auto' or a length.
#[must_use]
pub fn parse_single_auto_length(v: &ComponentValue) -> Option<AutoLength> {
    if let ComponentValue::Token(CSSToken::Ident(ident)) = v
        && ident.eq_ignore_ascii_case("auto")
    {
        return Some(AutoLength::Auto);
    }
    parse_single_length(v).map(AutoLength::Length)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dim(value: f64, unit: &str) -> ComponentValue {
        ComponentValue::Token(CSSToken::Dimension {
            value,
            unit: unit.to_string(),
        })
    }

    #[test]
    fn test_units() {
        assert_eq!(parse_single_length(&dim(12.0, "px")), Some(LengthValue::Px(12.0)));
        assert_eq!(parse_single_length(&dim(12.0, "pt")), Some(LengthValue::Px(16.0)));
        assert_eq!(parse_single_length(&dim(2.0, "vmin")), None);
        assert_eq!(
            parse_single_length(&ComponentValue::Token(CSSToken::Number(0.0))),
            Some(LengthValue::ZERO)
        );
        assert_eq!(
            parse_single_length(&ComponentValue::Token(CSSToken::Number(4.0))),
            None
        );
    }

    #[test]
    fn test_font_relative_units_compute_to_px() {
        assert_eq!(LengthValue::Em(1.5).to_computed(20.0, 16.0), LengthValue::Px(30.0));
        assert_eq!(LengthValue::Rem(2.0).to_computed(20.0, 16.0), LengthValue::Px(32.0));
        assert_eq!(LengthValue::Percent(50.0).resolve(300.0), 150.0);
        assert_eq!(AutoLength::Auto.resolve(100.0), None);
    }
}
