//! CSS Computed Style representation and value parsing
//!
//! This module implements CSS value types and computed style representation per:
//! - [CSS Values and Units Level 4](https://www.w3.org/TR/css-values-4/)
//! - [CSS Color Level 4](https://www.w3.org/TR/css-color-4/)
//! - [CSS Display Module Level 3](https://www.w3.org/TR/css-display-3/)
//! - [CSS Backgrounds and Borders Level 3](https://www.w3.org/TR/css-backgrounds-3/)

pub mod computed;
mod display;
pub mod values;

pub use computed::{ComputedStyle, StyleContext};
pub use display::DisplayValue;
pub use values::{
    AutoLength, BorderSide, BorderStyle, ColorValue, DEFAULT_FONT_SIZE_PX, LengthValue, Sides,
};
