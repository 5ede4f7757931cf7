//! CSS Parser per [§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing).
//!
//! "The input to the parsing stage is a stream of tokens from the tokenization stage."
//!
//! The algorithms follow § 5.4, with one deliberate difference: where the
//! standard silently drops malformed rules and declarations, this parser stops
//! and reports a [`CssError`], so the caller can decide whether to render the
//! document without styling.

use quokka_common::warning::warn_once;

use crate::error::CssError;
use crate::tokenizer::{CSSToken, SourceLocation, SpannedToken};

/// [§ 5.4.6 Consume a declaration](https://www.w3.org/TR/css-syntax-3/#consume-declaration)
///
/// A CSS declaration (e.g., `color: red`).
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// The property name, ASCII-lowercased.
    pub name: String,
    /// The property value as component values, without `!important` and
    /// surrounding whitespace.
    pub value: Vec<ComponentValue>,
    /// Whether the declaration has `!important`.
    pub important: bool,
}

/// [§ 5.4.8 Consume a component value](https://www.w3.org/TR/css-syntax-3/#consume-component-value)
///
/// A component value in a declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentValue {
    /// A preserved token.
    Token(CSSToken),
    /// A function with its contents.
    Function {
        /// The function name.
        name: String,
        /// The function arguments.
        value: Vec<ComponentValue>,
    },
    /// A simple block.
    Block {
        /// The opening token character.
        token: char,
        /// The block contents.
        value: Vec<ComponentValue>,
    },
}

impl ComponentValue {
    /// Whether this is a whitespace token.
    #[must_use]
    pub const fn is_whitespace(&self) -> bool {
        matches!(self, Self::Token(CSSToken::Whitespace))
    }
}

/// A CSS selector as written in the rule prelude.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    /// Raw selector text, whitespace-normalized
    pub text: String,
}

/// [§ 5.4.3 Consume a qualified rule](https://www.w3.org/TR/css-syntax-3/#consume-qualified-rule)
///
/// A CSS style rule (selector list + declarations).
#[derive(Debug, Clone, PartialEq)]
pub struct StyleRule {
    /// The list of selectors for this rule.
    pub selectors: Vec<Selector>,
    /// The declarations in this rule block.
    pub declarations: Vec<Declaration>,
    /// Where the rule's prelude starts.
    pub location: SourceLocation,
}

/// [§ 5.4.2 Consume an at-rule](https://www.w3.org/TR/css-syntax-3/#consume-at-rule)
///
/// A CSS at-rule. At-rules are parsed so their blocks are skipped correctly,
/// but none of them takes part in the cascade.
#[derive(Debug, Clone, PartialEq)]
pub struct AtRule {
    /// The at-keyword name (without the `@`).
    pub name: String,
    /// The prelude component values.
    pub prelude: Vec<ComponentValue>,
    /// The optional block contents.
    pub block: Option<Vec<ComponentValue>>,
}

/// [§ 5.4.1 Consume a list of rules](https://www.w3.org/TR/css-syntax-3/#consume-list-of-rules)
///
/// A CSS rule (either a style rule or an at-rule).
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// A style rule (qualified rule).
    Style(StyleRule),
    /// An at-rule.
    At(AtRule),
}

/// [§ 5.3.3 Parse a stylesheet](https://www.w3.org/TR/css-syntax-3/#parse-stylesheet)
///
/// A parsed CSS stylesheet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stylesheet {
    /// The list of rules in the stylesheet, in source order.
    pub rules: Vec<Rule>,
}

impl Stylesheet {
    /// Iterate over the style rules, skipping at-rules.
    pub fn style_rules(&self) -> impl Iterator<Item = &StyleRule> {
        self.rules.iter().filter_map(|rule| match rule {
            Rule::Style(style) => Some(style),
            Rule::At(_) => None,
        })
    }
}

/// CSS parser
pub struct CSSParser {
    tokens: Vec<SpannedToken>,
    position: usize,
    /// Index of the top-level rule currently being consumed.
    rule_index: usize,
}

impl CSSParser {
    /// Create a new parser from a list of positioned tokens.
    #[must_use]
    pub const fn new(tokens: Vec<SpannedToken>) -> Self {
        Self {
            tokens,
            position: 0,
            rule_index: 0,
        }
    }

    /// [§ 5.3.3 Parse a stylesheet](https://www.w3.org/TR/css-syntax-3/#parse-stylesheet)
    ///
    /// "To parse a stylesheet from input..."
    ///
    /// # Errors
    ///
    /// Returns the first syntax error that prevents splitting the input into
    /// rules and declarations.
    pub fn parse_stylesheet(&mut self) -> Result<Stylesheet, CssError> {
        // "Consume a list of rules from input, with the top-level flag set."
        let rules = self.consume_list_of_rules()?;
        Ok(Stylesheet { rules })
    }

    /// [§ 5.3.8 Parse a list of declarations](https://www.w3.org/TR/css-syntax-3/#parse-list-of-declarations)
    ///
    /// Parse declarations from a `style` attribute or similar.
    ///
    /// # Errors
    ///
    /// Returns an error for a declaration that is not `name: value`.
    pub fn parse_declaration_list(&mut self) -> Result<Vec<Declaration>, CssError> {
        let declarations = self.consume_list_of_declarations()?;
        if let Some(SpannedToken {
            token: CSSToken::RightBrace,
            location,
        }) = self.peek_spanned()
        {
            return Err(CssError::UnexpectedClosingBrace {
                location: *location,
            });
        }
        Ok(declarations)
    }

    /// [§ 5.4.1 Consume a list of rules](https://www.w3.org/TR/css-syntax-3/#consume-list-of-rules)
    fn consume_list_of_rules(&mut self) -> Result<Vec<Rule>, CssError> {
        // "Create an initially empty list of rules."
        let mut rules = Vec::new();

        loop {
            match self.peek() {
                // "<whitespace-token>" - "Do nothing."
                // "<CDO-token>" or "<CDC-token>" - "If the top-level flag is set, do nothing."
                CSSToken::Whitespace | CSSToken::CDO | CSSToken::CDC => {
                    let _ = self.consume();
                }

                // "<EOF-token>" - "Return the list of rules."
                CSSToken::EOF => return Ok(rules),

                // A `}` can only close a block; at the top level it is stray.
                CSSToken::RightBrace => {
                    return Err(CssError::UnexpectedClosingBrace {
                        location: self.location(),
                    });
                }

                // "<at-keyword-token>"
                // "Reconsume the current input token. Consume an at-rule, and append
                // the returned value to the list of rules."
                CSSToken::AtKeyword(_) => {
                    let at_rule = self.consume_at_rule()?;
                    warn_once("CSS", &format!("ignoring unsupported at-rule @{}", at_rule.name));
                    rules.push(Rule::At(at_rule));
                    self.rule_index += 1;
                }

                // "anything else"
                // "Reconsume the current input token. Consume a qualified rule. If
                // anything is returned, append it to the list of rules."
                _ => {
                    let rule = self.consume_qualified_rule()?;
                    rules.push(Rule::Style(rule));
                    self.rule_index += 1;
                }
            }
        }
    }

    /// [§ 5.4.2 Consume an at-rule](https://www.w3.org/TR/css-syntax-3/#consume-at-rule)
    fn consume_at_rule(&mut self) -> Result<AtRule, CssError> {
        // "Consume the next input token."
        let name = match self.consume() {
            CSSToken::AtKeyword(name) => name,
            _ => String::new(),
        };

        // "Create a new at-rule with its name set to the value of the current input
        // token, its prelude initially set to an empty list, and its value initially
        // set to nothing."
        let mut prelude = Vec::new();

        loop {
            match self.peek() {
                // "<semicolon-token>" - "Return the at-rule."
                CSSToken::Semicolon => {
                    let _ = self.consume();
                    return Ok(AtRule {
                        name,
                        prelude,
                        block: None,
                    });
                }
                // "<EOF-token>" - "This is a parse error. Return the at-rule."
                CSSToken::EOF => {
                    return Ok(AtRule {
                        name,
                        prelude,
                        block: None,
                    });
                }
                // "<{-token>" - "Consume a simple block and assign it to the at-rule's
                // block. Return the at-rule."
                CSSToken::LeftBrace => {
                    let block = self.consume_simple_block()?;
                    return Ok(AtRule {
                        name,
                        prelude,
                        block: Some(block),
                    });
                }
                // "anything else" - "Reconsume the current input token. Consume a
                // component value. Append the returned value to the at-rule's prelude."
                _ => prelude.push(self.consume_component_value()?),
            }
        }
    }

    /// [§ 5.4.3 Consume a qualified rule](https://www.w3.org/TR/css-syntax-3/#consume-qualified-rule)
    fn consume_qualified_rule(&mut self) -> Result<StyleRule, CssError> {
        let location = self.location();
        let mut prelude_tokens = Vec::new();

        loop {
            match self.peek() {
                // "<EOF-token>" - "This is a parse error. Return nothing."
                CSSToken::EOF => {
                    return Err(CssError::MissingBlock {
                        rule_index: self.rule_index,
                        location,
                    });
                }

                // "<{-token>" - "Consume a simple block and assign it to the
                // qualified rule's block. Return the qualified rule."
                CSSToken::LeftBrace => {
                    let brace_location = self.location();

                    // [§ 5.1 Selector Lists](https://www.w3.org/TR/selectors-4/#selector-list)
                    // "A selector list is a comma-separated list of selectors"
                    let selectors = split_selector_list(&prelude_tokens);
                    if selectors.is_empty() {
                        return Err(CssError::EmptySelector {
                            rule_index: self.rule_index,
                            location: brace_location,
                        });
                    }

                    let _ = self.consume(); // {
                    let declarations = self.consume_list_of_declarations()?;

                    // [§ 5.4.4] "<}-token>" ends the block; EOF leaves it open.
                    if self.peek() == &CSSToken::RightBrace {
                        let _ = self.consume();
                    } else {
                        return Err(CssError::UnclosedBlock {
                            rule_index: self.rule_index,
                            location: brace_location,
                        });
                    }

                    return Ok(StyleRule {
                        selectors,
                        declarations,
                        location,
                    });
                }

                // A `}` before any `{` means the prelude has no block.
                CSSToken::RightBrace => {
                    return Err(CssError::UnexpectedClosingBrace {
                        location: self.location(),
                    });
                }

                // "anything else" - "Reconsume the current input token. Consume a
                // component value. Append the returned value to the qualified rule's
                // prelude."
                _ => prelude_tokens.push(self.consume()),
            }
        }
    }

    /// [§ 5.4.7 Consume a simple block](https://www.w3.org/TR/css-syntax-3/#consume-simple-block)
    fn consume_simple_block(&mut self) -> Result<Vec<ComponentValue>, CssError> {
        let opening_location = self.location();
        let ending_token = match self.consume() {
            CSSToken::LeftBrace => CSSToken::RightBrace,
            CSSToken::LeftBracket => CSSToken::RightBracket,
            CSSToken::LeftParen => CSSToken::RightParen,
            _ => return Ok(Vec::new()),
        };

        let mut value = Vec::new();
        loop {
            match self.peek() {
                // "ending token" - "Return the block."
                token if *token == ending_token => {
                    let _ = self.consume();
                    return Ok(value);
                }
                // "<EOF-token>" - "This is a parse error. Return the block."
                CSSToken::EOF => {
                    return Err(CssError::UnclosedBlock {
                        rule_index: self.rule_index,
                        location: opening_location,
                    });
                }
                _ => value.push(self.consume_component_value()?),
            }
        }
    }

    /// [§ 5.4.5 Consume a list of declarations](https://www.w3.org/TR/css-syntax-3/#consume-list-of-declarations)
    ///
    /// Stops (without consuming) at `}` or EOF.
    fn consume_list_of_declarations(&mut self) -> Result<Vec<Declaration>, CssError> {
        let mut declarations = Vec::new();

        loop {
            match self.peek() {
                // "<whitespace-token>" or "<semicolon-token>" - "Do nothing."
                CSSToken::Whitespace | CSSToken::Semicolon => {
                    let _ = self.consume();
                }

                // "<EOF-token>" - "Return the list of declarations."
                CSSToken::EOF | CSSToken::RightBrace => return Ok(declarations),

                // "<at-keyword-token>" - "Reconsume the current input token. Consume
                // an at-rule." Nested at-rules are skipped.
                CSSToken::AtKeyword(_) => {
                    let _ = self.consume_at_rule()?;
                }

                // "<ident-token>" - "Consume a declaration."
                CSSToken::Ident(_) => declarations.push(self.consume_declaration()?),

                // "anything else" - "This is a parse error."
                _ => {
                    return Err(CssError::InvalidDeclaration {
                        rule_index: self.rule_index,
                        location: self.location(),
                    });
                }
            }
        }
    }

    /// [§ 5.4.6 Consume a declaration](https://www.w3.org/TR/css-syntax-3/#consume-declaration)
    fn consume_declaration(&mut self) -> Result<Declaration, CssError> {
        let location = self.location();
        // "Consume the next input token."
        let name = match self.consume() {
            CSSToken::Ident(name) => name.to_ascii_lowercase(),
            _ => String::new(),
        };

        // "While the next input token is a <whitespace-token>, consume the next input token."
        self.skip_whitespace();

        // "If the next input token is anything other than a <colon-token>, this is a
        // parse error. Return nothing."
        if self.peek() != &CSSToken::Colon {
            return Err(CssError::MissingColon {
                rule_index: self.rule_index,
                property: name,
                location,
            });
        }
        let _ = self.consume(); // :
        self.skip_whitespace();

        // "As long as the next input token is anything other than an <EOF-token>,
        // consume a component value and append it to the declaration's value."
        let mut value = Vec::new();
        while !matches!(
            self.peek(),
            CSSToken::EOF | CSSToken::Semicolon | CSSToken::RightBrace
        ) {
            value.push(self.consume_component_value()?);
        }

        // "If the last two non-<whitespace-token>s in the declaration's value are a
        // <delim-token> with the value "!" followed by an <ident-token> with a value
        // that is an ASCII case-insensitive match for "important", remove them from
        // the declaration's value and set the declaration's important flag to true."
        let important = check_important(&value);
        let value = trim_important(value);

        Ok(Declaration {
            name,
            value,
            important,
        })
    }

    /// [§ 5.4.8 Consume a component value](https://www.w3.org/TR/css-syntax-3/#consume-component-value)
    fn consume_component_value(&mut self) -> Result<ComponentValue, CssError> {
        match self.peek() {
            // "If the current input token is a <{-token>, <[-token>, or <(-token>,
            // consume a simple block and return it."
            CSSToken::LeftBrace | CSSToken::LeftBracket | CSSToken::LeftParen => {
                let token = match self.peek() {
                    CSSToken::LeftBrace => '{',
                    CSSToken::LeftBracket => '[',
                    _ => '(',
                };
                let value = self.consume_simple_block()?;
                Ok(ComponentValue::Block { token, value })
            }

            // "Otherwise, if the current input token is a <function-token>, consume a
            // function and return it."
            CSSToken::Function(_) => {
                let opening_location = self.location();
                let name = match self.consume() {
                    CSSToken::Function(name) => name,
                    _ => String::new(),
                };
                let mut value = Vec::new();
                loop {
                    match self.peek() {
                        CSSToken::RightParen => {
                            let _ = self.consume();
                            break;
                        }
                        CSSToken::EOF => {
                            return Err(CssError::UnclosedBlock {
                                rule_index: self.rule_index,
                                location: opening_location,
                            });
                        }
                        _ => value.push(self.consume_component_value()?),
                    }
                }
                Ok(ComponentValue::Function { name, value })
            }

            // "Otherwise, return the current input token."
            _ => Ok(ComponentValue::Token(self.consume())),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek() == &CSSToken::Whitespace {
            let _ = self.consume();
        }
    }

    /// Consume the next token. At the end of the stream this keeps returning EOF.
    fn consume(&mut self) -> CSSToken {
        match self.tokens.get(self.position) {
            Some(spanned) => {
                self.position += 1;
                spanned.token.clone()
            }
            None => CSSToken::EOF,
        }
    }

    fn peek(&self) -> &CSSToken {
        self.tokens
            .get(self.position)
            .map_or(&CSSToken::EOF, |spanned| &spanned.token)
    }

    fn peek_spanned(&self) -> Option<&SpannedToken> {
        self.tokens.get(self.position)
    }

    fn location(&self) -> SourceLocation {
        self.tokens
            .get(self.position)
            .or_else(|| self.tokens.last())
            .map_or(SourceLocation::START, |spanned| spanned.location)
    }
}

/// [§ 5.1 Selector Lists](https://www.w3.org/TR/selectors-4/#selector-list)
///
/// Split prelude tokens into a list of selectors, separated by commas.
/// "A selector list is a comma-separated list of selectors."
fn split_selector_list(tokens: &[CSSToken]) -> Vec<Selector> {
    tokens
        .split(|token| matches!(token, CSSToken::Comma))
        .map(|part| {
            part.iter()
                .map(ToString::to_string)
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|text| !text.is_empty())
        .map(|text| Selector { text })
        .collect()
}

/// Check if the value ends with !important.
///
/// [§ 6.4.2 Important declarations](https://www.w3.org/TR/css-cascade-4/#importance)
///
/// STEP 1: Skip trailing whitespace in the value.
/// STEP 2: Check for <ident-token> "important".
/// STEP 3: Skip any whitespace between "!" and "important".
/// STEP 4: Check for <delim-token> "!".
fn check_important(value: &[ComponentValue]) -> bool {
    let mut iter = value.iter().rev().filter(|v| !v.is_whitespace());

    // STEP 1 + 2
    match iter.next() {
        Some(ComponentValue::Token(CSSToken::Ident(s))) if s.eq_ignore_ascii_case("important") => {}
        _ => return false,
    }

    // STEP 3 + 4
    matches!(
        iter.next(),
        Some(ComponentValue::Token(CSSToken::Delim('!')))
    )
}

/// Remove surrounding whitespace and a trailing `!important` from a value.
///
/// STEP 1: Remove trailing whitespace.
/// STEP 2: Remove "important" and the "!" before it, if the value is important.
/// STEP 3: Remove any remaining trailing whitespace.
fn trim_important(mut value: Vec<ComponentValue>) -> Vec<ComponentValue> {
    let important = check_important(&value);

    // STEP 1
    while value.last().is_some_and(ComponentValue::is_whitespace) {
        let _ = value.pop();
    }

    // STEP 2
    if important {
        let _ = value.pop(); // important
        while value.last().is_some_and(ComponentValue::is_whitespace) {
            let _ = value.pop();
        }
        let _ = value.pop(); // !
    }

    // STEP 3
    while value.last().is_some_and(ComponentValue::is_whitespace) {
        let _ = value.pop();
    }

    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::CSSTokenizer;

    fn parse(css: &str) -> Result<Stylesheet, CssError> {
        let mut tokenizer = CSSTokenizer::new(css);
        tokenizer.run();
        CSSParser::new(tokenizer.into_spanned_tokens()).parse_stylesheet()
    }

    #[test]
    fn test_parse_rule_with_selector_list() {
        let sheet = parse("h1,  h2 .x { color: red; margin: 0 auto }").unwrap();
        let rule = sheet.style_rules().next().unwrap();
        let texts: Vec<&str> = rule.selectors.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["h1", "h2 .x"]);
        assert_eq!(rule.declarations.len(), 2);
        assert_eq!(rule.declarations[1].name, "margin");
        assert_eq!(rule.declarations[1].value.len(), 3);
    }

    #[test]
    fn test_important_is_stripped() {
        let sheet = parse("p { color: blue ! IMPORTANT ; }").unwrap();
        let decl = &sheet.style_rules().next().unwrap().declarations[0];
        assert!(decl.important);
        assert_eq!(
            decl.value,
            vec![ComponentValue::Token(CSSToken::Ident("blue".to_string()))]
        );
    }

    #[test]
    fn test_attribute_selector_text_is_preserved() {
        let sheet = parse("a[href=\"x\"] {}").unwrap();
        let rule = sheet.style_rules().next().unwrap();
        assert_eq!(rule.selectors[0].text, "a[href=\"x\"]");
    }

    #[test]
    fn test_at_rule_block_is_skipped() {
        let sheet = parse("@media screen { p { color: red } } div { color: blue }").unwrap();
        assert_eq!(sheet.rules.len(), 2);
        assert_eq!(sheet.style_rules().count(), 1);
    }

    #[test]
    fn test_unclosed_block_reports_rule_index() {
        let err = parse("p { color: red }\ndiv { color: blue").unwrap_err();
        assert_eq!(
            err,
            CssError::UnclosedBlock {
                rule_index: 1,
                location: SourceLocation { line: 2, column: 5 }
            }
        );
    }

    #[test]
    fn test_missing_colon_is_an_error() {
        let err = parse("p { color red }").unwrap_err();
        assert!(matches!(
            err,
            CssError::MissingColon { rule_index: 0, ref property, .. } if property == "color"
        ));
    }

    #[test]
    fn test_stray_closing_brace_is_an_error() {
        let err = parse("p { } }").unwrap_err();
        assert!(matches!(err, CssError::UnexpectedClosingBrace { .. }));
    }

    #[test]
    fn test_empty_selector_is_an_error() {
        let err = parse("{ color: red }").unwrap_err();
        assert!(matches!(err, CssError::EmptySelector { rule_index: 0, .. }));
    }

    #[test]
    fn test_declaration_list() {
        let mut tokenizer = CSSTokenizer::new("color: red; padding: 4px");
        tokenizer.run();
        let decls = CSSParser::new(tokenizer.into_spanned_tokens())
            .parse_declaration_list()
            .unwrap();
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].name, "color");
    }
}
