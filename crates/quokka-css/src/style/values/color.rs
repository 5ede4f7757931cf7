//! CSS Color values and parsing
//!
//! [CSS Color Level 4](https://www.w3.org/TR/css-color-4/)

use serde::Serialize;

use crate::parser::ComponentValue;
use crate::tokenizer::CSSToken;

/// [§ 4 Color syntax](https://www.w3.org/TR/css-color-4/#color-syntax)
/// sRGB color represented as RGBA components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ColorValue {
    /// "the red color channel" (0-255)
    pub r: u8,
    /// "the green color channel" (0-255)
    pub g: u8,
    /// "the blue color channel" (0-255)
    pub b: u8,
    /// "the alpha channel" (0-255, 255 = fully opaque)
    pub a: u8,
}

impl ColorValue {
    /// Black (#000000)
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// White (#ffffff)
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// [§ 6.1.1 transparent](https://www.w3.org/TR/css-color-4/#transparent-color)
    /// "fully transparent black"
    pub const TRANSPARENT: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    /// An opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Whether painting this color has no visible effect.
    #[must_use]
    pub const fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// [§ 4.2 The RGB hexadecimal notations](https://www.w3.org/TR/css-color-4/#hex-notation)
    /// "The syntax of a <hex-color> is a <hash-token> token whose value consists of
    /// 3, 4, 6, or 8 hexadecimal digits."
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let digit = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok();
        let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

        match hex.len() {
            // [§ 4.2]
            // "The three-digit RGB notation (#RGB) is converted into six-digit form (#RRGGBB)
            // by replicating digits, not by adding zeros."
            3 | 4 => {
                let r = digit(0)? * 17;
                let g = digit(1)? * 17;
                let b = digit(2)? * 17;
                let a = if hex.len() == 4 { digit(3)? * 17 } else { 255 };
                Some(Self { r, g, b, a })
            }
            6 | 8 => {
                let a = if hex.len() == 8 { pair(6)? } else { 255 };
                Some(Self {
                    r: pair(0)?,
                    g: pair(2)?,
                    b: pair(4)?,
                    a,
                })
            }
            _ => None,
        }
    }

    /// [§ 6.1 Named Colors](https://www.w3.org/TR/css-color-4/#named-colors)
    ///
    /// The sixteen basic HTML colors plus a handful of common extended keywords.
    #[must_use]
    pub fn from_named(name: &str) -> Option<Self> {
        let color = match name.to_ascii_lowercase().as_str() {
            "transparent" => Self::TRANSPARENT,
            "black" => Self::BLACK,
            "white" => Self::WHITE,
            "red" => Self::rgb(255, 0, 0),
            "green" => Self::rgb(0, 128, 0),
            "blue" => Self::rgb(0, 0, 255),
            "yellow" => Self::rgb(255, 255, 0),
            "gray" | "grey" => Self::rgb(128, 128, 128),
            "silver" => Self::rgb(192, 192, 192),
            "maroon" => Self::rgb(128, 0, 0),
            "purple" => Self::rgb(128, 0, 128),
            "fuchsia" | "magenta" => Self::rgb(255, 0, 255),
            "lime" => Self::rgb(0, 255, 0),
            "olive" => Self::rgb(128, 128, 0),
            "navy" => Self::rgb(0, 0, 128),
            "teal" => Self::rgb(0, 128, 128),
            "aqua" | "cyan" => Self::rgb(0, 255, 255),
            "orange" => Self::rgb(255, 165, 0),
            "pink" => Self::rgb(255, 192, 203),
            "brown" => Self::rgb(165, 42, 42),
            "lightgray" | "lightgrey" => Self::rgb(211, 211, 211),
            "darkgray" | "darkgrey" => Self::rgb(169, 169, 169),
            _ => return None,
        };
        Some(color)
    }

    /// Convert to hex string notation (#rrggbb, or #rrggbbaa if alpha != 255)
    #[must_use]
    pub fn to_hex_string(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

/// Parse the first color found in a list of component values.
#[must_use]
pub fn parse_color_value(values: &[ComponentValue]) -> Option<ColorValue> {
    values.iter().find_map(parse_single_color)
}

/// Parse a single component value as a color.
#[must_use]
pub fn parse_single_color(v: &ComponentValue) -> Option<ColorValue> {
    match v {
        ComponentValue::Token(CSSToken::Hash { value, .. }) => ColorValue::from_hex(value),
        ComponentValue::Token(CSSToken::Ident(name)) => ColorValue::from_named(name),
        ComponentValue::Function { name, value }
            if name.eq_ignore_ascii_case("rgb") || name.eq_ignore_ascii_case("rgba") =>
        {
            parse_rgb_function(value)
        }
        _ => None,
    }
}

/// [§ 4.1 The RGB Functions](https://www.w3.org/TR/css-color-4/#rgb-functions)
///
/// Accepts both the legacy comma syntax and the modern space syntax with
/// `/ alpha`. "Values outside these ranges are not invalid, but are clamped
/// to the ranges defined here at parsed-value time."
fn parse_rgb_function(args: &[ComponentValue]) -> Option<ColorValue> {
    let numbers: Vec<(f64, bool)> = args
        .iter()
        .filter_map(|arg| match arg {
            ComponentValue::Token(CSSToken::Number(n)) => Some((*n, false)),
            ComponentValue::Token(CSSToken::Percentage(p)) => Some((*p, true)),
            _ => None,
        })
        .collect();

    let channel = |(value, percent): (f64, bool)| {
        let v = if percent { value * 255.0 / 100.0 } else { value };
        clamp_to_u8(v)
    };

    match numbers.as_slice() {
        [r, g, b] => Some(ColorValue::rgb(channel(*r), channel(*g), channel(*b))),
        [r, g, b, (alpha, percent)] => {
            // "The final argument, <alpha-value>, specifies the alpha of the color."
            let a = if *percent { alpha / 100.0 } else { *alpha };
            Some(ColorValue {
                r: channel(*r),
                g: channel(*g),
                b: channel(*b),
                a: clamp_to_u8(a * 255.0),
            })
        }
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_to_u8(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::CSSTokenizer;

    fn parse(css: &str) -> Option<ColorValue> {
        let mut tokenizer = CSSTokenizer::new(css);
        tokenizer.run();
        let mut parser = crate::parser::CSSParser::new(tokenizer.into_spanned_tokens());
        let decls = parser.parse_declaration_list().ok()?;
        parse_color_value(&decls.first()?.value)
    }

    #[test]
    fn test_hex_forms() {
        assert_eq!(ColorValue::from_hex("#f00"), Some(ColorValue::rgb(255, 0, 0)));
        assert_eq!(ColorValue::from_hex("#00ff0080").map(|c| c.a), Some(128));
        assert_eq!(ColorValue::from_hex("#1234").map(|c| c.a), Some(0x44));
        assert_eq!(ColorValue::from_hex("#12345"), None);
        assert_eq!(ColorValue::from_hex("#ggg"), None);
    }

    #[test]
    fn test_rgb_functions() {
        assert_eq!(parse("color: rgb(10, 20, 30)"), Some(ColorValue::rgb(10, 20, 30)));
        assert_eq!(parse("color: rgb(100%, 0%, 0%)"), Some(ColorValue::rgb(255, 0, 0)));
        assert_eq!(
            parse("color: rgba(0, 0, 0, 0.5)"),
            Some(ColorValue { r: 0, g: 0, b: 0, a: 128 })
        );
        assert_eq!(parse("color: rgb(300 0 0 / 50%)").map(|c| (c.r, c.a)), Some((255, 128)));
        assert_eq!(parse("color: rgb(1, 2)"), None);
    }

    #[test]
    fn test_named_and_transparent() {
        assert_eq!(parse("color: Navy"), Some(ColorValue::rgb(0, 0, 128)));
        assert!(parse("color: transparent").unwrap().is_transparent());
        assert_eq!(parse("color: notacolor"), None);
    }
}
