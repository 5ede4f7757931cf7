use super::token::{CSSToken, HashType, SourceLocation, SpannedToken};
use crate::error::CssError;

/// [§ 4.3 Tokenizer Algorithms](https://www.w3.org/TR/css-syntax-3/#tokenizer-algorithms)
///
/// CSS tokenizer following the CSS Syntax Module Level 3 specification.
///
/// The standard tokenizer never fails; it only records parse errors. This one
/// records the two that make a stylesheet unusable as written (a string broken
/// by a newline or EOF, and an unterminated comment) so callers can surface
/// them as [`CssError`]s.
pub struct CSSTokenizer {
    /// The input being tokenized
    input: Vec<char>,
    /// Current position in the input
    position: usize,
    /// Line/column of `position`
    location: SourceLocation,
    /// Collected tokens
    tokens: Vec<SpannedToken>,
    /// Recorded syntax errors, in source order
    errors: Vec<CssError>,
}

impl CSSTokenizer {
    /// Create a new CSS tokenizer with the given input.
    #[must_use]
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into().chars().collect(),
            position: 0,
            location: SourceLocation::START,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// [§ 4.3.1 Consume a token](https://www.w3.org/TR/css-syntax-3/#consume-token)
    ///
    /// Tokenize the whole input. The last token is always [`CSSToken::EOF`].
    pub fn run(&mut self) {
        loop {
            // "Consume comments."
            self.consume_comments();
            let location = self.location;
            let token = self.consume_token();
            let is_eof = token.is_eof();
            self.tokens.push(SpannedToken { token, location });
            if is_eof {
                break;
            }
        }
    }

    /// Return the collected tokens without positions.
    #[must_use]
    pub fn into_tokens(self) -> Vec<CSSToken> {
        self.tokens.into_iter().map(|t| t.token).collect()
    }

    /// Return the collected tokens with their source positions.
    #[must_use]
    pub fn into_spanned_tokens(self) -> Vec<SpannedToken> {
        self.tokens
    }

    /// The syntax errors recorded while tokenizing.
    #[must_use]
    pub fn errors(&self) -> &[CssError] {
        &self.errors
    }

    /// Take the first recorded syntax error, if any.
    pub fn take_first_error(&mut self) -> Option<CssError> {
        if self.errors.is_empty() {
            None
        } else {
            Some(self.errors.remove(0))
        }
    }

    fn consume_token(&mut self) -> CSSToken {
        // "Consume the next input code point."
        let Some(c) = self.consume() else {
            return CSSToken::EOF;
        };

        match c {
            // "whitespace"
            // "Consume as much whitespace as possible. Return a <whitespace-token>."
            c if is_whitespace(c) => {
                while self.peek().is_some_and(is_whitespace) {
                    let _ = self.consume();
                }
                CSSToken::Whitespace
            }

            // "U+0022 QUOTATION MARK (")" / "U+0027 APOSTROPHE (')"
            // "Consume a string token and return it."
            '"' | '\'' => self.consume_string_token(c),

            // "U+0023 NUMBER SIGN (#)"
            '#' => {
                if self.peek().is_some_and(is_ident_code_point) {
                    // "If the next 3 input code points would start an ident sequence,
                    // set the <hash-token>'s type flag to 'id'."
                    let hash_type = if self.would_start_ident_sequence(0) {
                        HashType::Id
                    } else {
                        HashType::Unrestricted
                    };
                    let value = self.consume_ident_sequence();
                    CSSToken::Hash { value, hash_type }
                } else {
                    CSSToken::Delim('#')
                }
            }

            '(' => CSSToken::LeftParen,
            ')' => CSSToken::RightParen,

            // "U+002B PLUS SIGN (+)" / "U+002E FULL STOP (.)"
            // "If the input stream starts with a number, reconsume the current
            // input code point, consume a numeric token, and return it."
            '+' | '.' => {
                if self.would_start_number(-1) {
                    self.reconsume();
                    self.consume_numeric_token()
                } else {
                    CSSToken::Delim(c)
                }
            }

            ',' => CSSToken::Comma,

            // "U+002D HYPHEN-MINUS (-)"
            '-' => {
                if self.would_start_number(-1) {
                    self.reconsume();
                    self.consume_numeric_token()
                } else if self.peek() == Some('-') && self.peek_at(1) == Some('>') {
                    // "Otherwise, if the next 2 input code points are U+002D HYPHEN-MINUS
                    // U+003E GREATER-THAN SIGN (->), consume them and return a <CDC-token>."
                    let _ = self.consume();
                    let _ = self.consume();
                    CSSToken::CDC
                } else if self.would_start_ident_sequence(-1) {
                    self.reconsume();
                    self.consume_ident_like_token()
                } else {
                    CSSToken::Delim('-')
                }
            }

            ':' => CSSToken::Colon,
            ';' => CSSToken::Semicolon,

            // "U+003C LESS-THAN SIGN (<)"
            '<' => {
                if self.peek() == Some('!')
                    && self.peek_at(1) == Some('-')
                    && self.peek_at(2) == Some('-')
                {
                    for _ in 0..3 {
                        let _ = self.consume();
                    }
                    CSSToken::CDO
                } else {
                    CSSToken::Delim('<')
                }
            }

            // "U+0040 COMMERCIAL AT (@)"
            '@' => {
                if self.would_start_ident_sequence(0) {
                    CSSToken::AtKeyword(self.consume_ident_sequence())
                } else {
                    CSSToken::Delim('@')
                }
            }

            '[' => CSSToken::LeftBracket,
            ']' => CSSToken::RightBracket,
            '{' => CSSToken::LeftBrace,
            '}' => CSSToken::RightBrace,

            // "digit"
            // "Reconsume the current input code point, consume a numeric token,
            // and return it."
            c if c.is_ascii_digit() => {
                self.reconsume();
                self.consume_numeric_token()
            }

            // "ident-start code point"
            // "Reconsume the current input code point, consume an ident-like token,
            // and return it."
            c if is_ident_start_code_point(c) || c == '\\' => {
                self.reconsume();
                self.consume_ident_like_token()
            }

            // "anything else"
            // "Return a <delim-token> with its value set to the current input code point."
            c => CSSToken::Delim(c),
        }
    }

    /// [§ 4.3.2 Consume comments](https://www.w3.org/TR/css-syntax-3/#consume-comments)
    ///
    /// "If the next two input code point are U+002F SOLIDUS (/) followed by a
    /// U+002A ASTERISK (*), consume them and all following code points up to and
    /// including the first U+002A ASTERISK (*) followed by a U+002F SOLIDUS (/),
    /// or up to an EOF code point."
    fn consume_comments(&mut self) {
        while self.peek() == Some('/') && self.peek_at(1) == Some('*') {
            let start = self.location;
            let _ = self.consume();
            let _ = self.consume();
            loop {
                match self.consume() {
                    Some('*') if self.peek() == Some('/') => {
                        let _ = self.consume();
                        break;
                    }
                    Some(_) => {}
                    None => {
                        self.errors
                            .push(CssError::UnterminatedComment { location: start });
                        return;
                    }
                }
            }
        }
    }

    /// [§ 4.3.5 Consume a string token](https://www.w3.org/TR/css-syntax-3/#consume-string-token)
    fn consume_string_token(&mut self, ending: char) -> CSSToken {
        let start = SourceLocation {
            line: self.location.line,
            column: self.location.column.saturating_sub(1),
        };
        let mut value = String::new();
        loop {
            match self.peek() {
                // "ending code point - Return the <string-token>."
                Some(c) if c == ending => {
                    let _ = self.consume();
                    return CSSToken::String(value);
                }
                // "EOF - This is a parse error. Return the <string-token>."
                None => {
                    self.errors
                        .push(CssError::UnterminatedString { location: start });
                    return CSSToken::String(value);
                }
                // "newline - This is a parse error. Reconsume the current input code
                // point, create a <bad-string-token>, and return it."
                Some('\n') => {
                    self.errors
                        .push(CssError::UnterminatedString { location: start });
                    return CSSToken::BadString;
                }
                // "U+005C REVERSE SOLIDUS (\)"
                Some('\\') => {
                    let _ = self.consume();
                    match self.peek() {
                        // "If the next input code point is EOF, do nothing."
                        None => {}
                        // "Otherwise, if the next input code point is a newline,
                        // consume it."
                        Some('\n') => {
                            let _ = self.consume();
                        }
                        Some(_) => value.push(self.consume_escaped_code_point()),
                    }
                }
                Some(c) => {
                    let _ = self.consume();
                    value.push(c);
                }
            }
        }
    }

    /// [§ 4.3.3 Consume a numeric token](https://www.w3.org/TR/css-syntax-3/#consume-numeric-token)
    fn consume_numeric_token(&mut self) -> CSSToken {
        // "Consume a number and let number be the result."
        let number = self.consume_number();

        // "If the next 3 input code points would start an ident sequence, then:
        // Create a <dimension-token>..."
        if self.would_start_ident_sequence(0) {
            let unit = self.consume_ident_sequence().to_ascii_lowercase();
            return CSSToken::Dimension {
                value: number,
                unit,
            };
        }

        // "Otherwise, if the next input code point is U+0025 PERCENTAGE SIGN (%),
        // consume it. Create a <percentage-token>..."
        if self.peek() == Some('%') {
            let _ = self.consume();
            return CSSToken::Percentage(number);
        }

        CSSToken::Number(number)
    }

    /// [§ 4.3.12 Consume a number](https://www.w3.org/TR/css-syntax-3/#consume-number)
    fn consume_number(&mut self) -> f64 {
        let mut repr = String::new();

        // "If the next input code point is U+002B PLUS SIGN (+) or U+002D
        // HYPHEN-MINUS (-), consume it and append it to repr."
        if let Some(sign @ ('+' | '-')) = self.peek() {
            let _ = self.consume();
            repr.push(sign);
        }

        // "While the next input code point is a digit, consume it and append it to repr."
        self.consume_digits(&mut repr);

        // "If the next 2 input code points are U+002E FULL STOP (.) followed by a
        // digit, then: Consume them. Append them to repr."
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            let _ = self.consume();
            repr.push('.');
            self.consume_digits(&mut repr);
        }

        // "If the next 2 or 3 input code points are U+0045 LATIN CAPITAL LETTER E (E)
        // or U+0065 LATIN SMALL LETTER E (e), optionally followed by U+002D
        // HYPHEN-MINUS (-) or U+002B PLUS SIGN (+), followed by a digit"
        if matches!(self.peek(), Some('e' | 'E')) {
            let signed = matches!(self.peek_at(1), Some('+' | '-'))
                && self.peek_at(2).is_some_and(|c| c.is_ascii_digit());
            let unsigned = self.peek_at(1).is_some_and(|c| c.is_ascii_digit());
            if signed || unsigned {
                repr.push('e');
                let _ = self.consume();
                if signed && let Some(sign) = self.consume() {
                    repr.push(sign);
                }
                self.consume_digits(&mut repr);
            }
        }

        // "Convert repr to a number"
        repr.parse().unwrap_or(0.0)
    }

    fn consume_digits(&mut self, repr: &mut String) {
        while let Some(c) = self.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            let _ = self.consume();
            repr.push(c);
        }
    }

    /// [§ 4.3.4 Consume an ident-like token](https://www.w3.org/TR/css-syntax-3/#consume-ident-like-token)
    fn consume_ident_like_token(&mut self) -> CSSToken {
        let name = self.consume_ident_sequence();
        // "Otherwise, if the next input code point is U+0028 LEFT PARENTHESIS ((),
        // consume it. Create a <function-token> with its value set to string and
        // return it."
        if self.peek() == Some('(') {
            let _ = self.consume();
            return CSSToken::Function(name);
        }
        CSSToken::Ident(name)
    }

    /// [§ 4.3.11 Consume an ident sequence](https://www.w3.org/TR/css-syntax-3/#consume-name)
    fn consume_ident_sequence(&mut self) -> String {
        let mut result = String::new();
        loop {
            match self.peek() {
                Some(c) if is_ident_code_point(c) => {
                    let _ = self.consume();
                    result.push(c);
                }
                // "the stream starts with a valid escape"
                Some('\\') if self.peek_at(1).is_some_and(|c| c != '\n') => {
                    let _ = self.consume();
                    result.push(self.consume_escaped_code_point());
                }
                _ => return result,
            }
        }
    }

    /// [§ 4.3.7 Consume an escaped code point](https://www.w3.org/TR/css-syntax-3/#consume-escaped-code-point)
    fn consume_escaped_code_point(&mut self) -> char {
        let mut hex = String::new();
        while hex.len() < 6 && self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
            if let Some(c) = self.consume() {
                hex.push(c);
            }
        }
        if hex.is_empty() {
            return self.consume().unwrap_or('\u{FFFD}');
        }
        // "If the next input code point is whitespace, consume it as well."
        if self.peek().is_some_and(is_whitespace) {
            let _ = self.consume();
        }
        u32::from_str_radix(&hex, 16)
            .ok()
            .filter(|&code| code != 0)
            .and_then(char::from_u32)
            .unwrap_or('\u{FFFD}')
    }

    /// [§ 4.3.9 Check if three code points would start an ident sequence](https://www.w3.org/TR/css-syntax-3/#would-start-an-identifier)
    ///
    /// `offset` is relative to the next input code point (-1 = the current one).
    fn would_start_ident_sequence(&self, offset: isize) -> bool {
        let first = self.code_point_at(offset);
        let second = self.code_point_at(offset + 1);
        let third = self.code_point_at(offset + 2);
        match first {
            Some('-') => {
                second.is_some_and(|c| is_ident_start_code_point(c) || c == '-')
                    || (second == Some('\\') && third != Some('\n'))
            }
            Some('\\') => second.is_some_and(|c| c != '\n'),
            Some(c) => is_ident_start_code_point(c),
            None => false,
        }
    }

    /// [§ 4.3.10 Check if three code points would start a number](https://www.w3.org/TR/css-syntax-3/#starts-with-a-number)
    fn would_start_number(&self, offset: isize) -> bool {
        let first = self.code_point_at(offset);
        let second = self.code_point_at(offset + 1);
        let third = self.code_point_at(offset + 2);
        match first {
            Some('+' | '-') => {
                second.is_some_and(|c| c.is_ascii_digit())
                    || (second == Some('.') && third.is_some_and(|c| c.is_ascii_digit()))
            }
            Some('.') => second.is_some_and(|c| c.is_ascii_digit()),
            Some(c) => c.is_ascii_digit(),
            None => false,
        }
    }

    fn code_point_at(&self, offset: isize) -> Option<char> {
        let index = self.position.checked_add_signed(offset)?;
        self.input.get(index).copied()
    }

    fn consume(&mut self) -> Option<char> {
        let c = self.input.get(self.position).copied()?;
        self.position += 1;
        if c == '\n' {
            self.location.line += 1;
            self.location.column = 1;
        } else {
            self.location.column += 1;
        }
        Some(c)
    }

    /// "Reconsume the current input code point." Never called after a newline.
    fn reconsume(&mut self) {
        if self.position > 0 {
            self.position -= 1;
            self.location.column = self.location.column.saturating_sub(1).max(1);
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }
}

/// [§ 4.2 Definitions](https://www.w3.org/TR/css-syntax-3/#whitespace)
/// "A newline, U+0009 CHARACTER TABULATION, or U+0020 SPACE."
const fn is_whitespace(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\t' | '\x0C' | ' ')
}

/// [§ 4.2 Definitions](https://www.w3.org/TR/css-syntax-3/#ident-start-code-point)
/// "A letter, a non-ASCII code point, or U+005F LOW LINE (_)."
const fn is_ident_start_code_point(c: char) -> bool {
    c.is_ascii_alphabetic() || !c.is_ascii() || c == '_'
}

/// [§ 4.2 Definitions](https://www.w3.org/TR/css-syntax-3/#ident-code-point)
/// "An ident-start code point, a digit, or U+002D HYPHEN-MINUS (-)."
const fn is_ident_code_point(c: char) -> bool {
    is_ident_start_code_point(c) || c.is_ascii_digit() || c == '-'
}
