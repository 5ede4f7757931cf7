//! HTML tokenizer and tree builder for the Quokka renderer.
//!
//! # Scope
//!
//! This crate is the markup front end of the pipeline. It implements:
//! - **HTML Tokenizer** ([WHATWG § 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization))
//!   - Data, RAWTEXT and tag states, attributes, comments and DOCTYPE
//!   - Numeric and common named character references
//!
//! - **Tree Builder** ([WHATWG § 13.2.6](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction))
//!   - Implied `html`/`head`/`body`, void elements
//!   - Implicit end tags for `p`, `li`, `dt`/`dd` and headings
//!
//! Parsing never fails. Malformed or unclosed markup yields a best-effort
//! [`RenderTree`] plus a list of [`ParseIssue`]s.
//!
//! # Not Yet Implemented
//!
//! - Table insertion modes and foster parenting
//! - The adoption agency algorithm
//! - Foreign content (SVG, MathML)

/// HTML tree construction.
pub mod parser;
/// HTML tokenizer for converting input into tokens.
pub mod tokenizer;

pub use parser::{HTMLParser, MAX_OPEN_ELEMENTS, ParseIssue, print_tree};
pub use tokenizer::{Attribute, HTMLTokenizer, Token};

use quokka_dom::RenderTree;

/// Tokenize and parse `html` into a render tree.
#[must_use]
pub fn parse_html(html: &str) -> RenderTree {
    parse_html_with_issues(html).0
}

/// Tokenize and parse `html`, returning the recovered parse issues as well.
#[must_use]
pub fn parse_html_with_issues(html: &str) -> (RenderTree, Vec<ParseIssue>) {
    let mut tokenizer = HTMLTokenizer::new(html);
    tokenizer.run();
    HTMLParser::new(tokenizer.into_tokens()).run_with_issues()
}
