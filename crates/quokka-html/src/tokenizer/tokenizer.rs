use strum_macros::Display;

use super::character_reference;
use super::token::{Attribute, Token};

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// The subset of the tokenizer state machine this tokenizer implements. Each
/// state corresponds to a section in § 13.2.5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TokenizerState {
    /// [§ 13.2.5.1 Data state](https://html.spec.whatwg.org/multipage/parsing.html#data-state)
    Data,
    /// [§ 13.2.5.3 RAWTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-state)
    ///
    /// Used for the contents of `<style>`, `<script>`, `<title>` and `<textarea>`.
    RawText,
    /// [§ 13.2.5.6 Tag open state](https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state)
    TagOpen,
    /// [§ 13.2.5.7 End tag open state](https://html.spec.whatwg.org/multipage/parsing.html#end-tag-open-state)
    EndTagOpen,
    /// [§ 13.2.5.8 Tag name state](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state)
    TagName,
    /// [§ 13.2.5.32 Before attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state)
    BeforeAttributeName,
    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    AttributeName,
    /// [§ 13.2.5.34 After attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-name-state)
    AfterAttributeName,
    /// [§ 13.2.5.35 Before attribute value state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-value-state)
    BeforeAttributeValue,
    /// [§ 13.2.5.36 Attribute value (double-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(double-quoted)-state)
    AttributeValueDoubleQuoted,
    /// [§ 13.2.5.37 Attribute value (single-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(single-quoted)-state)
    AttributeValueSingleQuoted,
    /// [§ 13.2.5.38 Attribute value (unquoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(unquoted)-state)
    AttributeValueUnquoted,
    /// [§ 13.2.5.40 Self-closing start tag state](https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state)
    SelfClosingStartTag,
    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    MarkupDeclarationOpen,
    /// [§ 13.2.5.41 Bogus comment state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state)
    BogusComment,
}

/// Elements whose contents are tokenized as raw text up to the matching end tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["style", "script", "title", "textarea", "xmp"];

/// The tag currently being built by the tag states.
#[derive(Debug, Default)]
struct TagBuilder {
    name: String,
    is_end: bool,
    self_closing: bool,
    attributes: Vec<Attribute>,
    attr_name: String,
    attr_value: String,
    has_pending_attr: bool,
}

impl TagBuilder {
    fn start_attribute(&mut self) {
        self.flush_attribute();
        self.has_pending_attr = true;
    }

    /// [§ 13.2.5.33 Attribute name state]
    /// "When the user agent leaves the attribute name state... if there is already
    /// an attribute on the token with the exact same name, then this is a
    /// duplicate-attribute parse error and the new attribute must be removed."
    fn flush_attribute(&mut self) {
        if !self.has_pending_attr {
            return;
        }
        self.has_pending_attr = false;
        let name = std::mem::take(&mut self.attr_name);
        let value = std::mem::take(&mut self.attr_value);
        if name.is_empty() || self.attributes.iter().any(|a| a.name == name) {
            return;
        }
        self.attributes.push(Attribute { name, value });
    }

    fn into_token(mut self) -> Token {
        self.flush_attribute();
        if self.is_end {
            Token::EndTag { name: self.name }
        } else {
            Token::StartTag {
                name: self.name,
                self_closing: self.self_closing,
                attributes: self.attributes,
            }
        }
    }
}

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// "Implementations must act as if they used the following state machine to tokenize HTML."
///
/// Tokenization never fails: malformed constructs degrade to text or bogus
/// comments the way browsers recover from them.
pub struct HTMLTokenizer {
    state: TokenizerState,
    input: Vec<char>,
    position: usize,
    tag: TagBuilder,
    /// Name of the raw text element we are inside, if any.
    raw_text_end: Option<String>,
    tokens: Vec<Token>,
}

impl HTMLTokenizer {
    /// Create a new tokenizer for the given input.
    ///
    /// "The initial state is the data state."
    #[must_use]
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            state: TokenizerState::Data,
            input: input.into().chars().collect(),
            position: 0,
            tag: TagBuilder::default(),
            raw_text_end: None,
            tokens: Vec::new(),
        }
    }

    /// Run the state machine to the end of input. The last token is always
    /// [`Token::EndOfFile`].
    pub fn run(&mut self) {
        while self.position < self.input.len() {
            match self.state {
                TokenizerState::Data => self.handle_data_state(),
                TokenizerState::RawText => self.handle_raw_text_state(),
                TokenizerState::TagOpen => self.handle_tag_open_state(),
                TokenizerState::EndTagOpen => self.handle_end_tag_open_state(),
                TokenizerState::TagName => self.handle_tag_name_state(),
                TokenizerState::BeforeAttributeName => self.handle_before_attribute_name_state(),
                TokenizerState::AttributeName => self.handle_attribute_name_state(),
                TokenizerState::AfterAttributeName => self.handle_after_attribute_name_state(),
                TokenizerState::BeforeAttributeValue => self.handle_before_attribute_value_state(),
                TokenizerState::AttributeValueDoubleQuoted => self.handle_quoted_value_state('"'),
                TokenizerState::AttributeValueSingleQuoted => self.handle_quoted_value_state('\''),
                TokenizerState::AttributeValueUnquoted => self.handle_unquoted_value_state(),
                TokenizerState::SelfClosingStartTag => self.handle_self_closing_start_tag_state(),
                TokenizerState::MarkupDeclarationOpen => {
                    self.handle_markup_declaration_open_state();
                }
                TokenizerState::BogusComment => self.handle_bogus_comment_state(),
            }
        }
        self.handle_eof();
        self.tokens.push(Token::EndOfFile);
    }

    /// Consume the tokenizer and return the token stream.
    /// Call this after `run()` to get the tokens for the parser.
    #[must_use]
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    /// The current state of the state machine.
    #[must_use]
    pub const fn state(&self) -> TokenizerState {
        self.state
    }

    fn consume(&mut self) -> Option<char> {
        let c = self.input.get(self.position).copied();
        if c.is_some() {
            self.position += 1;
        }
        c
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn emit_character(&mut self, c: char) {
        // [§ 13.2.3.5 Preprocessing the input stream]
        // "U+000D CARRIAGE RETURN (CR) characters and U+000A LINE FEED (LF)
        // characters are treated specially... normalize newlines"
        if c == '\r' {
            if self.peek() == Some('\n') {
                return;
            }
            self.tokens.push(Token::Character { data: '\n' });
            return;
        }
        self.tokens.push(Token::Character { data: c });
    }

    fn emit_str(&mut self, s: &str) {
        for c in s.chars() {
            self.emit_character(c);
        }
    }

    /// Decode a character reference after an `&` that was just consumed.
    fn consume_character_reference(&mut self) -> char {
        match character_reference::decode(&self.input[self.position..]) {
            Some((ch, consumed)) => {
                self.position += consumed;
                ch
            }
            None => '&',
        }
    }

    fn emit_current_tag(&mut self) {
        let tag = std::mem::take(&mut self.tag);
        let token = tag.into_token();
        // [§ 13.2.6.2 Parsing elements that contain only text]
        // "switch the tokenizer to the RAWTEXT state" for raw text elements.
        self.state = match &token {
            Token::StartTag { name, .. } if RAW_TEXT_ELEMENTS.contains(&name.as_str()) => {
                self.raw_text_end = Some(name.clone());
                TokenizerState::RawText
            }
            _ => TokenizerState::Data,
        };
        self.tokens.push(token);
    }

    /// [§ 13.2.5.1 Data state](https://html.spec.whatwg.org/multipage/parsing.html#data-state)
    fn handle_data_state(&mut self) {
        match self.consume() {
            // "U+0026 AMPERSAND (&) - Set the return state to the data state.
            // Switch to the character reference state."
            Some('&') => {
                let c = self.consume_character_reference();
                self.emit_character(c);
            }
            // "U+003C LESS-THAN SIGN (<) - Switch to the tag open state."
            Some('<') => self.state = TokenizerState::TagOpen,
            // "U+0000 NULL - This is an unexpected-null-character parse error."
            Some('\0') => self.emit_character('\u{FFFD}'),
            // "Anything else - Emit the current input character as a character token."
            Some(c) => self.emit_character(c),
            None => {}
        }
    }

    /// [§ 13.2.5.3 RAWTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-state)
    ///
    /// Emits everything up to an "appropriate end tag token", i.e. `</name`
    /// (ASCII case-insensitive) followed by whitespace, `/` or `>`.
    fn handle_raw_text_state(&mut self) {
        let Some(end_name) = self.raw_text_end.clone() else {
            self.state = TokenizerState::Data;
            return;
        };

        if self.peek() == Some('<') && self.at_appropriate_end_tag(&end_name) {
            self.position += 2 + end_name.chars().count();
            self.raw_text_end = None;
            self.tag = TagBuilder {
                name: end_name,
                is_end: true,
                ..TagBuilder::default()
            };
            self.state = TokenizerState::BeforeAttributeName;
            return;
        }

        if let Some(c) = self.consume() {
            self.emit_character(c);
        }
    }

    fn at_appropriate_end_tag(&self, name: &str) -> bool {
        let rest = &self.input[self.position..];
        if rest.get(1) != Some(&'/') {
            return false;
        }
        let name_len = name.chars().count();
        let candidate: String = rest.iter().skip(2).take(name_len).collect();
        if !candidate.eq_ignore_ascii_case(name) {
            return false;
        }
        matches!(
            rest.get(2 + name_len),
            None | Some('\t' | '\n' | '\x0C' | ' ' | '/' | '>')
        )
    }

    /// [§ 13.2.5.6 Tag open state](https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state)
    fn handle_tag_open_state(&mut self) {
        match self.peek() {
            // "U+0021 EXCLAMATION MARK (!) - Switch to the markup declaration open state."
            Some('!') => {
                self.position += 1;
                self.state = TokenizerState::MarkupDeclarationOpen;
            }
            // "U+002F SOLIDUS (/) - Switch to the end tag open state."
            Some('/') => {
                self.position += 1;
                self.state = TokenizerState::EndTagOpen;
            }
            // "ASCII alpha - Create a new start tag token, set its tag name to the
            // empty string. Reconsume in the tag name state."
            Some(c) if c.is_ascii_alphabetic() => {
                self.tag = TagBuilder::default();
                self.state = TokenizerState::TagName;
            }
            // "U+003F QUESTION MARK (?) - This is an
            // unexpected-question-mark-instead-of-tag-name parse error."
            Some('?') => self.state = TokenizerState::BogusComment,
            // "Anything else - This is an invalid-first-character-of-tag-name parse
            // error. Emit a U+003C LESS-THAN SIGN character token. Reconsume in the
            // data state."
            _ => {
                self.emit_character('<');
                self.state = TokenizerState::Data;
            }
        }
    }

    /// [§ 13.2.5.7 End tag open state](https://html.spec.whatwg.org/multipage/parsing.html#end-tag-open-state)
    fn handle_end_tag_open_state(&mut self) {
        match self.peek() {
            Some(c) if c.is_ascii_alphabetic() => {
                self.tag = TagBuilder {
                    is_end: true,
                    ..TagBuilder::default()
                };
                self.state = TokenizerState::TagName;
            }
            // "U+003E GREATER-THAN SIGN (>) - This is a missing-end-tag-name parse
            // error. Switch to the data state."
            Some('>') => {
                self.position += 1;
                self.state = TokenizerState::Data;
            }
            _ => self.state = TokenizerState::BogusComment,
        }
    }

    /// [§ 13.2.5.8 Tag name state](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state)
    fn handle_tag_name_state(&mut self) {
        match self.consume() {
            Some('\t' | '\n' | '\x0C' | ' ' | '\r') => {
                self.state = TokenizerState::BeforeAttributeName;
            }
            Some('/') => self.state = TokenizerState::SelfClosingStartTag,
            Some('>') => self.emit_current_tag(),
            // "ASCII upper alpha - Append the lowercase version of the current input
            // character to the current tag token's tag name."
            Some(c) => self.tag.name.push(c.to_ascii_lowercase()),
            None => {}
        }
    }

    /// [§ 13.2.5.32 Before attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state)
    fn handle_before_attribute_name_state(&mut self) {
        match self.peek() {
            // "Ignore the character."
            Some('\t' | '\n' | '\x0C' | ' ' | '\r') => self.position += 1,
            Some('/') => {
                self.position += 1;
                self.state = TokenizerState::SelfClosingStartTag;
            }
            Some('>') => {
                self.position += 1;
                self.emit_current_tag();
            }
            // "Anything else - Start a new attribute in the current tag token.
            // Reconsume in the attribute name state."
            _ => {
                self.tag.start_attribute();
                if self.peek() == Some('=') {
                    // "unexpected-equals-sign-before-attribute-name parse error"
                    self.position += 1;
                    self.tag.attr_name.push('=');
                }
                self.state = TokenizerState::AttributeName;
            }
        }
    }

    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    fn handle_attribute_name_state(&mut self) {
        match self.peek() {
            Some('\t' | '\n' | '\x0C' | ' ' | '\r' | '/' | '>') | None => {
                self.state = TokenizerState::AfterAttributeName;
            }
            Some('=') => {
                self.position += 1;
                self.state = TokenizerState::BeforeAttributeValue;
            }
            Some(c) => {
                self.position += 1;
                self.tag.attr_name.push(c.to_ascii_lowercase());
            }
        }
    }

    /// [§ 13.2.5.34 After attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-name-state)
    fn handle_after_attribute_name_state(&mut self) {
        match self.peek() {
            Some('\t' | '\n' | '\x0C' | ' ' | '\r') => self.position += 1,
            Some('/') => {
                self.position += 1;
                self.state = TokenizerState::SelfClosingStartTag;
            }
            Some('=') => {
                self.position += 1;
                self.state = TokenizerState::BeforeAttributeValue;
            }
            Some('>') => {
                self.position += 1;
                self.emit_current_tag();
            }
            _ => {
                self.tag.start_attribute();
                self.state = TokenizerState::AttributeName;
            }
        }
    }

    /// [§ 13.2.5.35 Before attribute value state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-value-state)
    fn handle_before_attribute_value_state(&mut self) {
        match self.peek() {
            Some('\t' | '\n' | '\x0C' | ' ' | '\r') => self.position += 1,
            Some('"') => {
                self.position += 1;
                self.state = TokenizerState::AttributeValueDoubleQuoted;
            }
            Some('\'') => {
                self.position += 1;
                self.state = TokenizerState::AttributeValueSingleQuoted;
            }
            // "missing-attribute-value parse error... Emit the current tag token."
            Some('>') => {
                self.position += 1;
                self.emit_current_tag();
            }
            _ => self.state = TokenizerState::AttributeValueUnquoted,
        }
    }

    /// [§ 13.2.5.36 Attribute value (double-quoted) state] and
    /// [§ 13.2.5.37 Attribute value (single-quoted) state]
    fn handle_quoted_value_state(&mut self, quote: char) {
        match self.consume() {
            Some(c) if c == quote => {
                // [§ 13.2.5.39 After attribute value (quoted) state]
                self.state = TokenizerState::BeforeAttributeName;
            }
            Some('&') => {
                let c = self.consume_character_reference();
                self.tag.attr_value.push(c);
            }
            Some(c) => self.tag.attr_value.push(c),
            None => {}
        }
    }

    /// [§ 13.2.5.38 Attribute value (unquoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(unquoted)-state)
    fn handle_unquoted_value_state(&mut self) {
        match self.consume() {
            Some('\t' | '\n' | '\x0C' | ' ' | '\r') => {
                self.state = TokenizerState::BeforeAttributeName;
            }
            Some('>') => self.emit_current_tag(),
            Some('&') => {
                let c = self.consume_character_reference();
                self.tag.attr_value.push(c);
            }
            Some(c) => self.tag.attr_value.push(c),
            None => {}
        }
    }

    /// [§ 13.2.5.40 Self-closing start tag state](https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state)
    fn handle_self_closing_start_tag_state(&mut self) {
        if self.peek() == Some('>') {
            // "Set the self-closing flag of the current tag token. Switch to the
            // data state. Emit the current tag token."
            self.position += 1;
            self.tag.self_closing = true;
            self.emit_current_tag();
        } else {
            // "unexpected-solidus-in-tag parse error. Reconsume in the before
            // attribute name state."
            self.state = TokenizerState::BeforeAttributeName;
        }
    }

    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    fn handle_markup_declaration_open_state(&mut self) {
        // "If the next few characters are: Two U+002D HYPHEN-MINUS characters (-)"
        if self.starts_with("--") {
            self.position += 2;
            self.consume_comment();
            return;
        }
        // "ASCII case-insensitive match for the word "DOCTYPE""
        if self.starts_with_ignore_case("doctype") {
            self.position += "doctype".len();
            self.consume_doctype();
            return;
        }
        // "Otherwise... incorrectly-opened-comment parse error."
        self.state = TokenizerState::BogusComment;
    }

    /// [§ 13.2.5.43 Comment start state] through [§ 13.2.5.52 Comment end bang state],
    /// collapsed: everything up to the first `-->` (or EOF) is comment data.
    fn consume_comment(&mut self) {
        let mut data = String::new();
        // "U+003E GREATER-THAN SIGN (>) - This is an abrupt-closing-of-empty-comment
        // parse error."
        if self.peek() == Some('>') {
            self.position += 1;
        } else if self.starts_with("->") {
            self.position += 2;
        } else {
            while self.position < self.input.len() && !self.starts_with("-->") {
                if let Some(c) = self.consume() {
                    data.push(c);
                }
            }
            if self.starts_with("-->") {
                self.position += 3;
            }
        }
        self.tokens.push(Token::Comment { data });
        self.state = TokenizerState::Data;
    }

    /// [§ 13.2.5.53 DOCTYPE state] through [§ 13.2.5.56 After DOCTYPE name state].
    /// Public and system identifiers are skipped.
    fn consume_doctype(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_ascii_whitespace()) {
            self.position += 1;
        }
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_whitespace() || c == '>' {
                break;
            }
            self.position += 1;
            name.push(c.to_ascii_lowercase());
        }
        while let Some(c) = self.consume() {
            if c == '>' {
                break;
            }
        }
        self.tokens.push(Token::Doctype {
            name: (!name.is_empty()).then_some(name),
        });
        self.state = TokenizerState::Data;
    }

    /// [§ 13.2.5.41 Bogus comment state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state)
    fn handle_bogus_comment_state(&mut self) {
        let mut data = String::new();
        while let Some(c) = self.consume() {
            if c == '>' {
                break;
            }
            data.push(c);
        }
        self.tokens.push(Token::Comment { data });
        self.state = TokenizerState::Data;
    }

    /// End of input inside a construct: "eof-in-tag parse error. Emit an
    /// end-of-file token." A dangling `<` is kept as text.
    fn handle_eof(&mut self) {
        match self.state {
            TokenizerState::TagOpen => self.emit_str("<"),
            TokenizerState::EndTagOpen => self.emit_str("</"),
            _ => {}
        }
        self.state = TokenizerState::Data;
    }

    fn starts_with(&self, s: &str) -> bool {
        let mut i = self.position;
        for expected in s.chars() {
            if self.input.get(i) != Some(&expected) {
                return false;
            }
            i += 1;
        }
        true
    }

    fn starts_with_ignore_case(&self, s: &str) -> bool {
        let mut i = self.position;
        for expected in s.chars() {
            match self.input.get(i) {
                Some(c) if c.eq_ignore_ascii_case(&expected) => i += 1,
                _ => return false,
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> Vec<Token> {
        let mut tokenizer = HTMLTokenizer::new(input);
        tokenizer.run();
        tokenizer.into_tokens()
    }

    fn text_of(tokens: &[Token]) -> String {
        tokens
            .iter()
            .filter_map(|t| match t {
                Token::Character { data } => Some(*data),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_start_tag_with_attributes() {
        let tokens = tokenize(r#"<A HREF="x.html" class='a b' data-x=1 hidden>"#);
        let Token::StartTag {
            name, attributes, ..
        } = &tokens[0]
        else {
            panic!("expected start tag, got {:?}", tokens[0]);
        };
        assert_eq!(name, "a");
        let pairs: Vec<(&str, &str)> = attributes
            .iter()
            .map(|a| (a.name.as_str(), a.value.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("href", "x.html"),
                ("class", "a b"),
                ("data-x", "1"),
                ("hidden", "")
            ]
        );
        assert_eq!(tokens.last(), Some(&Token::EndOfFile));
    }

    #[test]
    fn test_duplicate_attribute_keeps_first() {
        let tokens = tokenize(r#"<p id="a" id="b">"#);
        let Token::StartTag { attributes, .. } = &tokens[0] else {
            panic!("expected start tag");
        };
        assert_eq!(attributes.len(), 1);
        assert_eq!(attributes[0].value, "a");
    }

    #[test]
    fn test_self_closing_and_end_tag() {
        let tokens = tokenize("<br/></P>");
        assert_eq!(
            tokens[0],
            Token::StartTag {
                name: "br".to_string(),
                self_closing: true,
                attributes: Vec::new()
            }
        );
        assert_eq!(
            tokens[1],
            Token::EndTag {
                name: "p".to_string()
            }
        );
    }

    #[test]
    fn test_raw_text_is_not_tokenized() {
        let tokens = tokenize("<style>p > a { color: red }</style>x");
        assert_eq!(text_of(&tokens), "p > a { color: red }x");
        assert!(tokens.contains(&Token::EndTag {
            name: "style".to_string()
        }));
    }

    #[test]
    fn test_comment_and_doctype() {
        let tokens = tokenize("<!DOCTYPE html><!-- hi -->");
        assert_eq!(
            tokens[0],
            Token::Doctype {
                name: Some("html".to_string())
            }
        );
        assert_eq!(
            tokens[1],
            Token::Comment {
                data: " hi ".to_string()
            }
        );
    }

    #[test]
    fn test_stray_less_than_is_text() {
        let tokens = tokenize("a < b &amp; c <");
        assert_eq!(text_of(&tokens), "a < b & c <");
    }

    #[test]
    fn test_crlf_is_normalized() {
        let tokens = tokenize("a\r\nb\rc");
        assert_eq!(text_of(&tokens), "a\nb\nc");
    }
}
