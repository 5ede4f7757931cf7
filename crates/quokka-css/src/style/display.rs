//! CSS Display property
//!
//! [§ 2 Box Layout Modes: the display property](https://www.w3.org/TR/css-display-3/#the-display-properties)

use serde::Serialize;
use strum_macros::Display;

use crate::parser::ComponentValue;
use crate::tokenizer::CSSToken;
use quokka_common::warning::warn_once;

/// The layout participation of an element's principal box.
///
/// [§ 2.1 Outer Display Roles](https://www.w3.org/TR/css-display-3/#outer-role)
/// "The `<display-outside>` keywords specify the element's outer display type,
/// which is essentially its principal box's role in flow layout."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DisplayValue {
    /// "The element generates a block-level box when placed in flow layout."
    Block,
    /// "The element generates an inline-level box when placed in flow layout."
    Inline,
    /// [§ 2.5 Box Generation](https://www.w3.org/TR/css-display-3/#box-generation)
    /// "The element and its descendants generate no boxes or text runs."
    None,
}

impl DisplayValue {
    /// [§ 2 display](https://www.w3.org/TR/css-display-3/#the-display-properties)
    ///
    /// Parse the `display` keyword. Keywords whose inner layout model is not
    /// implemented fall back to their outer role: `list-item`, `flex`, `grid`,
    /// `table` and `flow-root` lay out as blocks, `inline-block`, `inline-flex`
    /// and `inline-table` as inline content.
    #[must_use]
    pub fn parse(values: &[ComponentValue]) -> Option<Self> {
        let ident = values.iter().find_map(|v| match v {
            ComponentValue::Token(CSSToken::Ident(ident)) => Some(ident.to_ascii_lowercase()),
            _ => None,
        })?;

        match ident.as_str() {
            "block" | "list-item" | "flow-root" => Some(Self::Block),
            "inline" => Some(Self::Inline),
            "none" => Some(Self::None),
            "inline-block" | "inline-flex" | "inline-grid" | "inline-table" => {
                warn_once("CSS", &format!("display: {ident} is laid out as inline"));
                Some(Self::Inline)
            }
            "flex" | "grid" | "table" | "table-row" | "table-cell" => {
                warn_once("CSS", &format!("display: {ident} is laid out as block"));
                Some(Self::Block)
            }
            _ => None,
        }
    }

    /// Whether the box participates in block flow.
    #[must_use]
    pub const fn is_block(self) -> bool {
        matches!(self, Self::Block)
    }
}
