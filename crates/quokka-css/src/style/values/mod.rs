//! CSS Value types and parsing
//!
//! - [CSS Values and Units Level 4](https://www.w3.org/TR/css-values-4/)
//! - [CSS Color Level 4](https://www.w3.org/TR/css-color-4/)
//! - [CSS Backgrounds and Borders Level 3](https://www.w3.org/TR/css-backgrounds-3/)

mod border;
mod color;
mod length;
mod sides;

pub use border::{BorderSide, BorderStyle, parse_border_style};
pub use color::{ColorValue, parse_color_value, parse_single_color};
pub use length::{
    AutoLength, DEFAULT_FONT_SIZE_PX, LengthValue, parse_single_auto_length, parse_single_length,
};
pub use sides::Sides;
