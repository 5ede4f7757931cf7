//! CSS Computed Style
//!
//! [§ 4.4 Computed Values](https://www.w3.org/TR/css-cascade-4/#computed)
//! "The computed value is the result of resolving the specified value..."

use serde::Serialize;

use crate::parser::{ComponentValue, Declaration};
use crate::tokenizer::CSSToken;
use quokka_common::warning::warn_once;

use super::display::DisplayValue;
use super::values::{
    AutoLength, BorderSide, BorderStyle, ColorValue, DEFAULT_FONT_SIZE_PX, LengthValue, Sides,
    parse_border_style, parse_color_value, parse_single_auto_length, parse_single_color,
    parse_single_length,
};

/// Resolved style of one element.
///
/// Every property holds a value: the cascade starts from the initial values
/// (or the parent's values for inherited properties) and folds the winning
/// declarations in. After [`ComputedStyle::finish`] lengths are either `Px` or
/// `Percent`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComputedStyle {
    /// [§ 2 'display'](https://www.w3.org/TR/css-display-3/#the-display-properties)
    pub display: DisplayValue,

    /// [§ 3.1 'color'](https://www.w3.org/TR/css-color-4/#the-color-property)
    /// Inherited.
    pub color: ColorValue,

    /// [§ 3.2 'background-color'](https://www.w3.org/TR/css-backgrounds-3/#background-color)
    /// `None` is the initial `transparent`.
    pub background_color: Option<ColorValue>,

    /// [§ 3.5 'font-size'](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
    /// Inherited; always absolute pixels.
    pub font_size: f32,

    /// [§ 10.2 'width'](https://www.w3.org/TR/CSS2/visudet.html#the-width-property)
    pub width: AutoLength,

    /// [§ 10.5 'height'](https://www.w3.org/TR/CSS2/visudet.html#the-height-property)
    pub height: AutoLength,

    /// [§ 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties)
    pub margin: Sides<AutoLength>,

    /// [§ 8.4 Padding properties](https://www.w3.org/TR/CSS2/box.html#padding-properties)
    pub padding: Sides<LengthValue>,

    /// [§ 4 Borders](https://www.w3.org/TR/css-backgrounds-3/#borders)
    pub border: Sides<BorderSide>,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self::initial(DEFAULT_FONT_SIZE_PX)
    }
}

/// What a declaration may refer to while it is applied.
#[derive(Debug, Clone, Copy)]
pub struct StyleContext<'a> {
    /// The parent element's style, `None` for the root element.
    pub parent: Option<&'a ComputedStyle>,
    /// Font size of the root element, for `rem`.
    pub root_font_size: f32,
}

impl StyleContext<'_> {
    fn parent_font_size(&self) -> f32 {
        self.parent.map_or(self.root_font_size, |p| p.font_size)
    }
}

impl ComputedStyle {
    /// [§ 7.1 Initial Values](https://www.w3.org/TR/css-cascade-4/#initial-values)
    ///
    /// The initial value of every property.
    #[must_use]
    pub fn initial(font_size: f32) -> Self {
        Self {
            display: DisplayValue::Inline,
            color: ColorValue::BLACK,
            background_color: None,
            font_size,
            width: AutoLength::Auto,
            height: AutoLength::Auto,
            margin: Sides::uniform(AutoLength::ZERO),
            padding: Sides::uniform(LengthValue::ZERO),
            border: Sides::uniform(BorderSide::default()),
        }
    }

    /// [§ 7.2 Inheritance](https://www.w3.org/TR/css-cascade-4/#inheriting)
    ///
    /// Start a child's style: inherited properties (`color`, `font-size`) come
    /// from the parent, everything else starts at its initial value.
    #[must_use]
    pub fn inherit(parent: &Self, display: DisplayValue) -> Self {
        Self {
            display,
            color: parent.color,
            ..Self::initial(parent.font_size)
        }
    }

    /// Apply a CSS declaration to update this computed style.
    ///
    /// Unknown properties and unparseable values leave the style unchanged.
    pub fn apply_declaration(&mut self, decl: &Declaration, ctx: &StyleContext<'_>) {
        let name = decl.name.as_str();
        let values: Vec<&ComponentValue> =
            decl.value.iter().filter(|v| !v.is_whitespace()).collect();

        // [§ 7.3 Explicit Defaulting](https://www.w3.org/TR/css-cascade-4/#defaulting-keywords)
        if let [ComponentValue::Token(CSSToken::Ident(keyword))] = values.as_slice() {
            let keyword = keyword.to_ascii_lowercase();
            let source = match keyword.as_str() {
                "inherit" => Some(ctx.parent.cloned().unwrap_or_else(|| Self::initial(ctx.root_font_size))),
                "initial" => Some(Self::initial(ctx.root_font_size)),
                _ => None,
            };
            if let Some(source) = source {
                if !self.copy_property(name, &source) {
                    warn_once("CSS", &format!("unsupported property '{name}'"));
                }
                return;
            }
        }

        match name {
            "display" => {
                if let Some(display) = DisplayValue::parse(&decl.value) {
                    self.display = display;
                }
            }
            "color" => {
                if let Some(color) = parse_color_value(&decl.value) {
                    self.color = color;
                }
            }
            // [§ 3.10 'background'](https://www.w3.org/TR/css-backgrounds-3/#background)
            // Only the color layer is used.
            "background-color" | "background" => {
                if let Some(color) = parse_color_value(&decl.value) {
                    self.background_color = (!color.is_transparent()).then_some(color);
                } else if is_ident(&values, "none") {
                    self.background_color = None;
                }
            }
            "font-size" => {
                if let Some(size) = parse_font_size(&values, ctx) {
                    self.font_size = size;
                }
            }
            "width" => {
                if let Some(width) = single(&values).and_then(parse_single_auto_length) {
                    self.width = width;
                }
            }
            "height" => {
                if let Some(height) = single(&values).and_then(parse_single_auto_length) {
                    self.height = height;
                }
            }

            // [§ 8.3 'margin'](https://www.w3.org/TR/CSS2/box.html#propdef-margin)
            "margin" => {
                if let Some(margin) = parse_sides(&values, parse_single_auto_length) {
                    self.margin = margin;
                }
            }
            "margin-top" | "margin-right" | "margin-bottom" | "margin-left" => {
                if let Some(value) = single(&values).and_then(parse_single_auto_length) {
                    *side_mut(&mut self.margin, name) = value;
                }
            }

            // [§ 8.4 'padding'](https://www.w3.org/TR/CSS2/box.html#propdef-padding)
            // "Unlike margin properties, values for padding values cannot be negative."
            "padding" => {
                if let Some(padding) = parse_sides(&values, parse_padding) {
                    self.padding = padding;
                }
            }
            "padding-top" | "padding-right" | "padding-bottom" | "padding-left" => {
                if let Some(value) = single(&values).and_then(parse_padding) {
                    *side_mut(&mut self.padding, name) = value;
                }
            }

            // [§ 4.4 'border'](https://www.w3.org/TR/css-backgrounds-3/#the-border-shorthands)
            // "The 'border' property is a shorthand property for setting the same
            // width, color, and style for all four borders of a box."
            "border" => {
                if let Some(side) = parse_border_side(&values) {
                    self.border = Sides::uniform(side);
                }
            }
            "border-top" | "border-right" | "border-bottom" | "border-left" => {
                if let Some(side) = parse_border_side(&values) {
                    *side_mut(&mut self.border, name) = side;
                }
            }
            "border-width" => {
                if let Some(widths) = parse_sides(&values, parse_line_width) {
                    self.set_border_sides(&widths, |side, width| side.width = *width);
                }
            }
            "border-style" => {
                if let Some(styles) = parse_sides(&values, parse_border_style) {
                    self.set_border_sides(&styles, |side, style| side.style = *style);
                }
            }
            "border-color" => {
                if let Some(colors) = parse_sides(&values, parse_single_color) {
                    self.set_border_sides(&colors, |side, color| side.color = Some(*color));
                }
            }
            _ => {
                if let Some((side_name, part)) = border_longhand(name) {
                    let side = side_mut(&mut self.border, side_name);
                    let value = single(&values);
                    match part {
                        "width" => {
                            if let Some(width) = value.and_then(parse_line_width) {
                                side.width = width;
                            }
                        }
                        "style" => {
                            if let Some(style) = value.and_then(parse_border_style) {
                                side.style = style;
                            }
                        }
                        _ => {
                            if let Some(color) = value.and_then(parse_single_color) {
                                side.color = Some(color);
                            }
                        }
                    }
                } else {
                    warn_once("CSS", &format!("unsupported property '{name}'"));
                }
            }
        }
    }

    /// Turn the remaining font-relative lengths into pixels against this
    /// element's own font size.
    ///
    /// [§ 5.1.1](https://www.w3.org/TR/css-values-4/#font-relative-lengths)
    /// "when specified on other properties, they are relative to the computed
    /// font-size of the element itself."
    pub fn finish(&mut self, root_font_size: f32) {
        let font_size = self.font_size;
        self.width = self.width.to_computed(font_size, root_font_size);
        self.height = self.height.to_computed(font_size, root_font_size);
        self.margin = self.margin.map(|m| m.to_computed(font_size, root_font_size));
        self.padding = self.padding.map(|p| p.to_computed(font_size, root_font_size));
        self.border = self.border.map(|b| BorderSide {
            width: b.width.to_computed(font_size, root_font_size),
            ..*b
        });
    }

    /// Used border color of a side: "currentColor" when none was given.
    #[must_use]
    pub fn border_color(&self, side: &BorderSide) -> ColorValue {
        side.color.unwrap_or(self.color)
    }

    /// Used border widths in pixels (zero where the style draws nothing).
    #[must_use]
    pub fn border_widths(&self) -> Sides<f32> {
        self.border.map(BorderSide::used_width)
    }

    fn set_border_sides<T>(&mut self, values: &Sides<T>, mut set: impl FnMut(&mut BorderSide, &T)) {
        set(&mut self.border.top, &values.top);
        set(&mut self.border.right, &values.right);
        set(&mut self.border.bottom, &values.bottom);
        set(&mut self.border.left, &values.left);
    }

    /// Copy the fields `property` controls from `source`. Returns false for
    /// unknown properties.
    fn copy_property(&mut self, property: &str, source: &Self) -> bool {
        match property {
            "display" => self.display = source.display,
            "color" => self.color = source.color,
            "background" | "background-color" => self.background_color = source.background_color,
            "font-size" => self.font_size = source.font_size,
            "width" => self.width = source.width,
            "height" => self.height = source.height,
            "margin" => self.margin = source.margin,
            "padding" => self.padding = source.padding,
            "border" => self.border = source.border,
            "margin-top" | "margin-right" | "margin-bottom" | "margin-left" => {
                *side_mut(&mut self.margin, property) = *side_ref(&source.margin, property);
            }
            "padding-top" | "padding-right" | "padding-bottom" | "padding-left" => {
                *side_mut(&mut self.padding, property) = *side_ref(&source.padding, property);
            }
            "border-top" | "border-right" | "border-bottom" | "border-left" => {
                *side_mut(&mut self.border, property) = *side_ref(&source.border, property);
            }
            "border-width" => self.set_border_sides(&source.border, |s, from| s.width = from.width),
            "border-style" => self.set_border_sides(&source.border, |s, from| s.style = from.style),
            "border-color" => self.set_border_sides(&source.border, |s, from| s.color = from.color),
            _ => {
                let Some((side_name, part)) = border_longhand(property) else {
                    return false;
                };
                let from = *side_ref(&source.border, side_name);
                let side = side_mut(&mut self.border, side_name);
                match part {
                    "width" => side.width = from.width,
                    "style" => side.style = from.style,
                    _ => side.color = from.color,
                }
            }
        }
        true
    }
}

/// Split `border-top-width` into (`border-top`, `width`).
fn border_longhand(name: &str) -> Option<(&str, &str)> {
    let (side, part) = name.rsplit_once('-')?;
    let is_side = matches!(side, "border-top" | "border-right" | "border-bottom" | "border-left");
    (is_side && matches!(part, "width" | "style" | "color")).then_some((side, part))
}

/// The edge a `*-top`/`*-right`/`*-bottom`/`*-left` property names.
fn side_mut<'a, T>(sides: &'a mut Sides<T>, property: &str) -> &'a mut T {
    if property.ends_with("-top") {
        &mut sides.top
    } else if property.ends_with("-right") {
        &mut sides.right
    } else if property.ends_with("-bottom") {
        &mut sides.bottom
    } else {
        &mut sides.left
    }
}

fn side_ref<'a, T>(sides: &'a Sides<T>, property: &str) -> &'a T {
    if property.ends_with("-top") {
        &sides.top
    } else if property.ends_with("-right") {
        &sides.right
    } else if property.ends_with("-bottom") {
        &sides.bottom
    } else {
        &sides.left
    }
}

/// The only non-whitespace component value, if there is exactly one.
fn single<'a>(values: &[&'a ComponentValue]) -> Option<&'a ComponentValue> {
    match values {
        [value] => Some(value),
        _ => None,
    }
}

fn is_ident(values: &[&ComponentValue], keyword: &str) -> bool {
    matches!(single(values), Some(ComponentValue::Token(CSSToken::Ident(ident))) if ident.eq_ignore_ascii_case(keyword))
}

/// Parse every value with `parse` and expand the 1–4 value shorthand.
/// A single unparseable value invalidates the whole declaration.
fn parse_sides<T: Clone>(
    values: &[&ComponentValue],
    parse: impl Fn(&ComponentValue) -> Option<T>,
) -> Option<Sides<T>> {
    let parsed: Option<Vec<T>> = values.iter().map(|v| parse(v)).collect();
    Sides::from_shorthand(&parsed?)
}

fn parse_padding(v: &ComponentValue) -> Option<LengthValue> {
    parse_single_length(v).filter(|len| !is_negative(*len))
}

const fn is_negative(len: LengthValue) -> bool {
    match len {
        LengthValue::Px(v) | LengthValue::Em(v) | LengthValue::Rem(v) | LengthValue::Percent(v) => {
            v < 0.0
        }
    }
}

/// [§ 4.3 'border-width'](https://www.w3.org/TR/css-backgrounds-3/#border-width)
///
/// "`<line-width>` = `<length [0,∞]>` | thin | medium | thick"
fn parse_line_width(v: &ComponentValue) -> Option<LengthValue> {
    if let ComponentValue::Token(CSSToken::Ident(ident)) = v {
        return match ident.to_ascii_lowercase().as_str() {
            "thin" => Some(LengthValue::Px(1.0)),
            "medium" => Some(BorderSide::MEDIUM_WIDTH),
            "thick" => Some(LengthValue::Px(5.0)),
            _ => None,
        };
    }
    parse_single_length(v).filter(|len| !is_negative(*len) && !matches!(len, LengthValue::Percent(_)))
}

/// [§ 4.4 Border shorthands](https://www.w3.org/TR/css-backgrounds-3/#border-shorthands)
///
/// "`<line-width>` || `<line-style>` || `<color>`". Components may appear in
/// any order, each at most once. "Omitted values are set to their initial
/// values": medium, none, currentColor.
fn parse_border_side(values: &[&ComponentValue]) -> Option<BorderSide> {
    let mut width = None;
    let mut style: Option<BorderStyle> = None;
    let mut color = None;

    for v in values {
        if width.is_none()
            && let Some(w) = parse_line_width(v)
        {
            width = Some(w);
        } else if style.is_none()
            && let Some(s) = parse_border_style(v)
        {
            style = Some(s);
        } else if color.is_none()
            && let Some(c) = parse_single_color(v)
        {
            color = Some(c);
        } else {
            return None;
        }
    }

    (width.is_some() || style.is_some() || color.is_some()).then(|| BorderSide {
        width: width.unwrap_or(BorderSide::MEDIUM_WIDTH),
        style: style.unwrap_or_default(),
        color,
    })
}

/// [§ 3.5 'font-size'](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
///
/// "Percentages: refer to parent element's font size". Em units do too
/// when used on font-size itself.
fn parse_font_size(values: &[&ComponentValue], ctx: &StyleContext<'_>) -> Option<f32> {
    let value = single(values)?;
    let parent = ctx.parent_font_size();

    if let ComponentValue::Token(CSSToken::Ident(ident)) = value {
        // [§ 2.5.1 Absolute-size keywords](https://www.w3.org/TR/css-fonts-4/#absolute-size-value)
        let scale = match ident.to_ascii_lowercase().as_str() {
            "xx-small" => 3.0 / 5.0,
            "x-small" => 3.0 / 4.0,
            "small" => 8.0 / 9.0,
            "medium" => 1.0,
            "large" => 6.0 / 5.0,
            "x-large" => 3.0 / 2.0,
            "xx-large" => 2.0,
            // [§ 2.5.2 Relative-size keywords](https://www.w3.org/TR/css-fonts-4/#relative-size-value)
            "larger" => return Some(parent * 1.2),
            "smaller" => return Some(parent / 1.2),
            _ => return None,
        };
        return Some(ctx.root_font_size * scale);
    }

    let size = match parse_single_length(value)? {
        LengthValue::Px(px) => px,
        LengthValue::Em(em) => em * parent,
        LengthValue::Rem(rem) => rem * ctx.root_font_size,
        LengthValue::Percent(pct) => pct * parent / 100.0,
    };
    (size >= 0.0).then_some(size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::CSSParser;
    use crate::tokenizer::CSSTokenizer;

    fn style_from(css: &str, parent: Option<&ComputedStyle>) -> ComputedStyle {
        let mut tokenizer = CSSTokenizer::new(css);
        tokenizer.run();
        let decls = CSSParser::new(tokenizer.into_spanned_tokens())
            .parse_declaration_list()
            .unwrap();
        let ctx = StyleContext {
            parent,
            root_font_size: DEFAULT_FONT_SIZE_PX,
        };
        let mut style = parent.map_or_else(ComputedStyle::default, |p| {
            ComputedStyle::inherit(p, DisplayValue::Block)
        });
        for decl in &decls {
            style.apply_declaration(decl, &ctx);
        }
        style.finish(DEFAULT_FONT_SIZE_PX);
        style
    }

    #[test]
    fn test_border_shorthand_sets_all_sides() {
        let style = style_from("border: 2px solid red", None);
        for side in style.border.iter() {
            assert_eq!(side.width, LengthValue::Px(2.0));
            assert_eq!(side.style, BorderStyle::Solid);
            assert_eq!(side.color, Some(ColorValue::rgb(255, 0, 0)));
        }
        assert_eq!(style.border_widths(), Sides::uniform(2.0));
    }

    #[test]
    fn test_border_components_in_any_order() {
        let style = style_from("border: dashed blue 4px", None);
        assert_eq!(style.border.left.width, LengthValue::Px(4.0));
        assert_eq!(style.border.left.style, BorderStyle::Dashed);
        assert_eq!(style.border.left.color, Some(ColorValue::rgb(0, 0, 255)));
    }

    #[test]
    fn test_border_without_style_draws_nothing() {
        let style = style_from("border: 4px red", None);
        assert_eq!(style.border.top.style, BorderStyle::None);
        assert_eq!(style.border_widths(), Sides::uniform(0.0));
    }

    #[test]
    fn test_longhand_after_shorthand_overrides_one_side() {
        let style = style_from("border: 1px solid black; border-top-width: 6px; border-left-style: dotted", None);
        assert_eq!(style.border.top.width, LengthValue::Px(6.0));
        assert_eq!(style.border.right.width, LengthValue::Px(1.0));
        assert_eq!(style.border.left.style, BorderStyle::Dotted);
        assert_eq!(style.border.bottom.style, BorderStyle::Solid);
    }

    #[test]
    fn test_border_value_shorthands() {
        let style = style_from(
            "border-style: solid dashed; border-width: 1px 2px 3px; border-color: red green blue yellow",
            None,
        );
        assert_eq!(style.border.right.style, BorderStyle::Dashed);
        assert_eq!(style.border.bottom.width, LengthValue::Px(3.0));
        assert_eq!(style.border.left.width, LengthValue::Px(2.0));
        assert_eq!(style.border.left.color, Some(ColorValue::rgb(255, 255, 0)));
    }

    #[test]
    fn test_margin_and_padding_shorthands() {
        let style = style_from("margin: 0 auto; padding: 1px 2px 3px 4px; padding-left: 9px", None);
        assert_eq!(style.margin.top, AutoLength::ZERO);
        assert!(style.margin.left.is_auto());
        assert!(style.margin.right.is_auto());
        assert_eq!(style.padding.top, LengthValue::Px(1.0));
        assert_eq!(style.padding.left, LengthValue::Px(9.0));
    }

    #[test]
    fn test_negative_padding_is_ignored() {
        let style = style_from("padding: 5px; padding: -1px", None);
        assert_eq!(style.padding.top, LengthValue::Px(5.0));
    }

    #[test]
    fn test_em_lengths_use_own_font_size() {
        let parent = style_from("font-size: 20px; color: red", None);
        let child = style_from("font-size: 1.5em; margin-top: 2em; width: 50%", Some(&parent));
        assert_eq!(child.font_size, 30.0);
        assert_eq!(child.margin.top, AutoLength::Length(LengthValue::Px(60.0)));
        assert_eq!(child.width, AutoLength::Length(LengthValue::Percent(50.0)));
        assert_eq!(child.color, ColorValue::rgb(255, 0, 0));
    }

    #[test]
    fn test_inherit_and_initial_keywords() {
        let parent = style_from("padding: 7px; color: blue", None);
        let child = style_from("padding-top: inherit; color: initial", Some(&parent));
        assert_eq!(child.padding.top, LengthValue::Px(7.0));
        assert_eq!(child.padding.bottom, LengthValue::ZERO);
        assert_eq!(child.color, ColorValue::BLACK);
    }

    #[test]
    fn test_background_shorthand_color() {
        let style = style_from("background: #00f", None);
        assert_eq!(style.background_color, Some(ColorValue::rgb(0, 0, 255)));
        let style = style_from("background-color: red; background: transparent", None);
        assert_eq!(style.background_color, None);
    }

    #[test]
    fn test_unknown_property_is_ignored() {
        let style = style_from("frobnicate: 3px; color: red", None);
        assert_eq!(style.color, ColorValue::rgb(255, 0, 0));
    }

    #[test]
    fn test_current_color_for_border() {
        let style = style_from("color: green; border: 1px solid", None);
        assert_eq!(style.border_color(&style.border.top), ColorValue::rgb(0, 128, 0));
    }
}
