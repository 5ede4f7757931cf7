//! [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
//!
//! Only numeric references and a handful of common named references are
//! decoded. Anything else is left in the text verbatim.

/// Named references we decode, with the code point each maps to.
const NAMED_REFERENCES: &[(&str, char)] = &[
    ("amp", '&'),
    ("lt", '<'),
    ("gt", '>'),
    ("quot", '"'),
    ("apos", '\''),
    ("nbsp", '\u{00A0}'),
    ("copy", '\u{00A9}'),
    ("reg", '\u{00AE}'),
    ("mdash", '\u{2014}'),
    ("ndash", '\u{2013}'),
    ("hellip", '\u{2026}'),
    ("laquo", '\u{00AB}'),
    ("raquo", '\u{00BB}'),
];

/// "If the character reference was consumed as part of an attribute...
/// for historical reasons" these may appear without a trailing semicolon.
const LEGACY_WITHOUT_SEMICOLON: &[&str] = &["amp", "lt", "gt", "quot"];

/// Try to decode a character reference starting right after an `&`.
///
/// Returns the decoded character and how many input characters (after the
/// ampersand) were consumed, or `None` if the ampersand is literal.
pub fn decode(input: &[char]) -> Option<(char, usize)> {
    if input.first() == Some(&'#') {
        return decode_numeric(input);
    }

    let name_len = input
        .iter()
        .take_while(|c| c.is_ascii_alphanumeric())
        .count();
    if name_len == 0 {
        return None;
    }
    let name: String = input[..name_len].iter().collect();
    let (_, ch) = NAMED_REFERENCES.iter().find(|(n, _)| *n == name)?;

    if input.get(name_len) == Some(&';') {
        Some((*ch, name_len + 1))
    } else if LEGACY_WITHOUT_SEMICOLON.contains(&name.as_str()) {
        Some((*ch, name_len))
    } else {
        None
    }
}

/// [§ 13.2.5.75 Numeric character reference state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-state)
fn decode_numeric(input: &[char]) -> Option<(char, usize)> {
    let (radix, digits_start) = match input.get(1) {
        Some('x' | 'X') => (16, 2),
        _ => (10, 1),
    };
    let digits: String = input[digits_start..]
        .iter()
        .take_while(|c| c.is_digit(radix))
        .collect();
    if digits.is_empty() {
        return None;
    }
    let mut consumed = digits_start + digits.len();
    if input.get(consumed) == Some(&';') {
        consumed += 1;
    }

    // [§ 13.2.5.80 Numeric character reference end state]
    // "If the number is 0x00... or greater than 0x10FFFF... or a surrogate,
    // set the character reference code to 0xFFFD."
    let ch = u32::from_str_radix(&digits, radix)
        .ok()
        .filter(|&code| code != 0)
        .and_then(char::from_u32)
        .unwrap_or('\u{FFFD}');
    Some((ch, consumed))
}
