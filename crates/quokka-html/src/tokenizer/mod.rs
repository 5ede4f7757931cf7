//! HTML tokenizer: turns markup into a flat token stream.

mod character_reference;
mod token;
#[allow(clippy::module_inception)]
mod tokenizer;

pub use token::{Attribute, Token};
pub use tokenizer::{HTMLTokenizer, TokenizerState};
