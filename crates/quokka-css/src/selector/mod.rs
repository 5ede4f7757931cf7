//! CSS Selector parsing and matching
//!
//! This module implements the subset of
//! [Selectors Level 4](https://www.w3.org/TR/selectors-4/) the cascade needs:
//! type, class, id, universal and attribute selectors, compound selectors and
//! the four combinators. Anything else (pseudo-classes, pseudo-elements,
//! namespaces) makes [`parse_selector`] return `None`, so the selector never
//! matches.

use quokka_common::warning::warn_once;
use quokka_dom::{ElementData, NodeId, RenderTree};

/// [§ 5 Elemental selectors](https://www.w3.org/TR/selectors-4/#elemental-selectors)
/// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
///
/// A simple selector is a single condition on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    /// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
    /// "A type selector is the name of a document language element type,
    /// and represents an instance of that element type in the document tree."
    Type(String),

    /// [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
    /// "The class selector is given as a full stop (. U+002E) immediately
    /// followed by an identifier."
    Class(String),

    /// [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
    /// "An ID selector is a hash (#, U+0023) immediately followed by the
    /// ID value, which is an identifier."
    Id(String),

    /// [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#universal-selector)
    /// "The universal selector is a single asterisk (*) and represents the
    /// qualified name of any element type."
    Universal,

    /// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    Attribute(AttributeSelector),
}

/// Attribute selectors per [§ 6.4](https://www.w3.org/TR/selectors-4/#attribute-selectors)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeSelector {
    /// `[attr]` "Represents an element with the att attribute"
    Exists(String),
    /// `[attr=value]` "whose value is exactly 'val'."
    Equals(String, String),
    /// `[attr~=value]` "whose value is a whitespace-separated list of words,
    /// one of which is exactly 'val'."
    Includes(String, String),
    /// `[attr|=value]` "its value either being exactly 'val' or beginning with
    /// 'val' immediately followed by '-'."
    DashMatch(String, String),
    /// `[attr^=value]` "whose value begins with the prefix 'val'."
    PrefixMatch(String, String),
    /// `[attr$=value]` "whose value ends with the suffix 'val'."
    SuffixMatch(String, String),
    /// `[attr*=value]` "whose value contains at least one instance of the substring 'val'."
    SubstringMatch(String, String),
}

impl AttributeSelector {
    fn matches(&self, element: &ElementData) -> bool {
        match self {
            Self::Exists(name) => element.attr(name).is_some(),
            Self::Equals(name, val) => element.attr(name) == Some(val.as_str()),
            Self::Includes(name, val) => element
                .attr(name)
                .is_some_and(|v| v.split_ascii_whitespace().any(|w| w == val)),
            Self::DashMatch(name, val) => element.attr(name).is_some_and(|v| {
                v == val || v.strip_prefix(val.as_str()).is_some_and(|rest| rest.starts_with('-'))
            }),
            // "If 'val' is the empty string then the selector does not represent anything."
            Self::PrefixMatch(name, val) => {
                !val.is_empty() && element.attr(name).is_some_and(|v| v.starts_with(val.as_str()))
            }
            Self::SuffixMatch(name, val) => {
                !val.is_empty() && element.attr(name).is_some_and(|v| v.ends_with(val.as_str()))
            }
            Self::SubstringMatch(name, val) => {
                !val.is_empty() && element.attr(name).is_some_and(|v| v.contains(val.as_str()))
            }
        }
    }
}

impl SimpleSelector {
    /// Check if this simple selector matches the given element.
    #[must_use]
    pub fn matches(&self, element: &ElementData) -> bool {
        match self {
            Self::Type(name) => element.tag_name.eq_ignore_ascii_case(name),
            Self::Class(class_name) => element.has_class(class_name),
            Self::Id(id) => element.id() == Some(id.as_str()),
            Self::Universal => true,
            Self::Attribute(attr) => attr.matches(element),
        }
    }
}

/// [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
///
/// "A compound selector is a sequence of simple selectors that are not
/// separated by a combinator, and represents a set of simultaneous
/// conditions on a single element."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundSelector {
    /// The simple selectors, all of which must match.
    pub simple_selectors: Vec<SimpleSelector>,
}

impl CompoundSelector {
    /// Whether every simple selector matches the node. Non-elements never match.
    #[must_use]
    pub fn matches(&self, tree: &RenderTree, node: NodeId) -> bool {
        tree.as_element(node)
            .is_some_and(|element| self.simple_selectors.iter().all(|s| s.matches(element)))
    }

    fn specificity(&self) -> Specificity {
        let mut spec = Specificity::default();
        for simple in &self.simple_selectors {
            match simple {
                // "count the number of ID selectors in the selector (= A)"
                SimpleSelector::Id(_) => spec.0 += 1,
                // "count the number of class selectors, attributes selectors,
                // and pseudo-classes in the selector (= B)"
                SimpleSelector::Class(_) | SimpleSelector::Attribute(_) => spec.1 += 1,
                // "count the number of type selectors and pseudo-elements in the selector (= C)"
                SimpleSelector::Type(_) => spec.2 += 1,
                // "ignore the universal selector"
                SimpleSelector::Universal => {}
            }
        }
        spec
    }
}

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
///
/// "A combinator is punctuation that represents a particular kind of
/// relationship between the selectors on either side."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// [§ 16.1](https://www.w3.org/TR/selectors-4/#descendant-combinators) `A B`
    Descendant,
    /// [§ 16.2](https://www.w3.org/TR/selectors-4/#child-combinators) `A > B`
    Child,
    /// [§ 16.3](https://www.w3.org/TR/selectors-4/#adjacent-sibling-combinators) `A + B`
    NextSibling,
    /// [§ 16.4](https://www.w3.org/TR/selectors-4/#general-sibling-combinators) `A ~ B`
    SubsequentSibling,
}

/// [§ 4.3 Complex selectors](https://www.w3.org/TR/selectors-4/#complex)
///
/// "A complex selector is a chain of one or more compound selectors separated
/// by combinators."
///
/// For `A > B C` the subject is `C` and `combinators` is
/// `[(Descendant, B), (Child, A)]`: right to left, the order matching walks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    /// The rightmost compound selector.
    pub subject: CompoundSelector,
    /// (combinator, compound) pairs going left from the subject.
    pub combinators: Vec<(Combinator, CompoundSelector)>,
}

/// [§ 17 Calculating Specificity](https://www.w3.org/TR/selectors-4/#specificity-rules)
///
/// (ids, classes and attributes, types). "Specificities are compared by
/// comparing the three components in order."
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Specificity(pub u32, pub u32, pub u32);

/// A parsed CSS selector ready for matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSelector {
    /// The complex selector.
    pub complex: ComplexSelector,
    /// The specificity, summed over every compound in the chain.
    pub specificity: Specificity,
}

impl ParsedSelector {
    /// [§ 4.1 Selector Matching](https://www.w3.org/TR/selectors-4/#match-a-selector-against-an-element)
    ///
    /// Match against an element with full tree context.
    #[must_use]
    pub fn matches(&self, tree: &RenderTree, node: NodeId) -> bool {
        self.complex.subject.matches(tree, node)
            && matches_chain(&self.complex.combinators, tree, node)
    }
}

/// Match the remaining combinator chain starting from an already matched node.
///
/// Descendant and subsequent-sibling steps try every candidate, so `div > p span`
/// still matches when the nearest `p` ancestor is not the one inside the `div`.
fn matches_chain(chain: &[(Combinator, CompoundSelector)], tree: &RenderTree, node: NodeId) -> bool {
    let Some(((combinator, compound), rest)) = chain.split_first() else {
        return true;
    };

    match combinator {
        Combinator::Descendant => tree
            .ancestors(node)
            .any(|ancestor| compound.matches(tree, ancestor) && matches_chain(rest, tree, ancestor)),
        Combinator::Child => tree
            .parent(node)
            .is_some_and(|parent| compound.matches(tree, parent) && matches_chain(rest, tree, parent)),
        Combinator::NextSibling => preceding_element_siblings(tree, node)
            .next()
            .is_some_and(|prev| compound.matches(tree, prev) && matches_chain(rest, tree, prev)),
        Combinator::SubsequentSibling => preceding_element_siblings(tree, node)
            .any(|prev| compound.matches(tree, prev) && matches_chain(rest, tree, prev)),
    }
}

/// Element siblings before `node`, nearest first.
fn preceding_element_siblings(tree: &RenderTree, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    let siblings = tree.parent(node).map_or(&[][..], |parent| tree.children(parent));
    let position = siblings.iter().position(|&id| id == node).unwrap_or(0);
    siblings[..position]
        .iter()
        .rev()
        .copied()
        .filter(move |&id| tree.is_element(id))
}

/// [§ 4.3.10 ident-start code point](https://www.w3.org/TR/css-syntax-3/#ident-start-code-point)
const fn is_ident_start_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// [§ 4.3.9 ident code point](https://www.w3.org/TR/css-syntax-3/#ident-code-point)
const fn is_ident_char(c: char) -> bool {
    is_ident_start_char(c) || c.is_ascii_digit() || c == '-'
}

/// Character cursor over raw selector text.
struct SelectorCursor<'a> {
    chars: core::iter::Peekable<core::str::Chars<'a>>,
}

impl SelectorCursor<'_> {
    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            let _ = self.chars.next();
            true
        } else {
            false
        }
    }

    /// Skip whitespace, returning whether any was skipped.
    fn skip_whitespace(&mut self) -> bool {
        let mut skipped = false;
        while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            let _ = self.chars.next();
            skipped = true;
        }
        skipped
    }

    fn ident(&mut self) -> Option<String> {
        let mut ident = String::new();
        while let Some(c) = self.peek()
            && (is_ident_char(c) || (ident.is_empty() && c == '-'))
        {
            ident.push(c);
            let _ = self.chars.next();
        }
        (!ident.is_empty()).then_some(ident)
    }

    /// `[` has been consumed.
    fn attribute(&mut self) -> Option<AttributeSelector> {
        let _ = self.skip_whitespace();
        let name = self.ident()?.to_ascii_lowercase();
        let _ = self.skip_whitespace();

        if self.eat(']') {
            return Some(AttributeSelector::Exists(name));
        }

        let operator = match self.peek()? {
            '=' => None,
            op @ ('~' | '|' | '^' | '$' | '*') => {
                let _ = self.chars.next();
                Some(op)
            }
            _ => return None,
        };
        if !self.eat('=') {
            return None;
        }
        let _ = self.skip_whitespace();
        let value = self.attribute_value()?;
        let _ = self.skip_whitespace();
        if !self.eat(']') {
            return None;
        }

        Some(match operator {
            None => AttributeSelector::Equals(name, value),
            Some('~') => AttributeSelector::Includes(name, value),
            Some('|') => AttributeSelector::DashMatch(name, value),
            Some('^') => AttributeSelector::PrefixMatch(name, value),
            Some('$') => AttributeSelector::SuffixMatch(name, value),
            Some(_) => AttributeSelector::SubstringMatch(name, value),
        })
    }

    /// Quoted (`"val"`, `'val'`) or unquoted ident value.
    fn attribute_value(&mut self) -> Option<String> {
        match self.peek()? {
            quote @ ('"' | '\'') => {
                let _ = self.chars.next();
                let mut value = String::new();
                for c in self.chars.by_ref() {
                    if c == quote {
                        return Some(value);
                    }
                    value.push(c);
                }
                None
            }
            _ => self.ident(),
        }
    }

    /// Parse one compound selector; `None` on anything unsupported.
    fn compound(&mut self) -> Option<CompoundSelector> {
        let mut simple_selectors = Vec::new();

        // A type or universal selector may only come first.
        if self.eat('*') {
            simple_selectors.push(SimpleSelector::Universal);
        } else if let Some(name) = self.ident() {
            simple_selectors.push(SimpleSelector::Type(name.to_ascii_lowercase()));
        }

        loop {
            match self.peek() {
                Some('.') => {
                    let _ = self.chars.next();
                    simple_selectors.push(SimpleSelector::Class(self.ident()?));
                }
                Some('#') => {
                    let _ = self.chars.next();
                    simple_selectors.push(SimpleSelector::Id(self.ident()?));
                }
                Some('[') => {
                    let _ = self.chars.next();
                    simple_selectors.push(SimpleSelector::Attribute(self.attribute()?));
                }
                Some(':') => {
                    warn_once("CSS", "pseudo-classes and pseudo-elements are not supported");
                    return None;
                }
                _ => break,
            }
        }

        (!simple_selectors.is_empty()).then_some(CompoundSelector { simple_selectors })
    }
}

/// Parse a raw selector string into a `ParsedSelector`.
///
/// [§ 4 Selector syntax](https://www.w3.org/TR/selectors-4/#syntax)
///
/// Returns `None` for empty or unsupported selectors (pseudo-classes,
/// namespaces, dangling combinators).
#[must_use]
pub fn parse_selector(raw: &str) -> Option<ParsedSelector> {
    let mut cursor = SelectorCursor {
        chars: raw.trim().chars().peekable(),
    };

    let mut compounds = vec![cursor.compound()?];
    let mut combinators = Vec::new();

    loop {
        let had_whitespace = cursor.skip_whitespace();
        let combinator = match cursor.peek() {
            None => break,
            Some('>') => Combinator::Child,
            Some('+') => Combinator::NextSibling,
            Some('~') => Combinator::SubsequentSibling,
            Some(_) if had_whitespace => Combinator::Descendant,
            Some(_) => return None,
        };
        if combinator != Combinator::Descendant {
            let _ = cursor.chars.next();
            let _ = cursor.skip_whitespace();
        }
        combinators.push(combinator);
        compounds.push(cursor.compound()?);
    }

    // Reverse so the subject comes first and the chain reads right to left.
    let subject = compounds.pop()?;
    let chain: Vec<(Combinator, CompoundSelector)> =
        combinators.into_iter().rev().zip(compounds.into_iter().rev()).collect();

    let specificity = chain.iter().fold(subject.specificity(), |acc, (_, compound)| {
        let s = compound.specificity();
        Specificity(acc.0 + s.0, acc.1 + s.1, acc.2 + s.2)
    });

    Some(ParsedSelector {
        complex: ComplexSelector {
            subject,
            combinators: chain,
        },
        specificity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> (RenderTree, NodeId, NodeId) {
        let mut tree = RenderTree::new();
        let html = tree.append_element(NodeId::ROOT, "html", &[]);
        let body = tree.append_element(html, "body", &[]);
        let div = tree.append_element(body, "div", &[("class", "outer box"), ("id", "main")]);
        let p = tree.append_element(div, "p", &[]);
        let span = tree.append_element(p, "span", &[("lang", "en-US"), ("data-x", "1")]);
        (tree, div, span)
    }

    #[test]
    fn test_specificity_ordering() {
        let id = parse_selector("#a").unwrap().specificity;
        let class = parse_selector(".a").unwrap().specificity;
        let attr = parse_selector("[x=y]").unwrap().specificity;
        let tag = parse_selector("p").unwrap().specificity;
        assert!(id > class);
        assert_eq!(class, attr);
        assert!(class > tag);
        assert_eq!(
            parse_selector("div p.note#x").unwrap().specificity,
            Specificity(1, 1, 2)
        );
        assert_eq!(parse_selector("*").unwrap().specificity, Specificity(0, 0, 0));
    }

    #[test]
    fn test_compound_and_attribute_matching() {
        let (tree, div, span) = sample_tree();
        assert!(parse_selector("div.outer#main").unwrap().matches(&tree, div));
        assert!(!parse_selector("div.inner").unwrap().matches(&tree, div));
        assert!(parse_selector("[lang|=en]").unwrap().matches(&tree, span));
        assert!(parse_selector("span[data-x=\"1\"]").unwrap().matches(&tree, span));
        assert!(parse_selector("[class~=box]").unwrap().matches(&tree, div));
        assert!(!parse_selector("[missing]").unwrap().matches(&tree, span));
    }

    #[test]
    fn test_combinators() {
        let (tree, div, span) = sample_tree();
        assert!(parse_selector("div span").unwrap().matches(&tree, span));
        assert!(parse_selector("body > div").unwrap().matches(&tree, div));
        assert!(!parse_selector("div > span").unwrap().matches(&tree, span));
        assert!(parse_selector("div>p>span").unwrap().matches(&tree, span));
        assert!(parse_selector("html div p span").unwrap().matches(&tree, span));
    }

    #[test]
    fn test_descendant_backtracks_past_nearer_ancestor() {
        let mut tree = RenderTree::new();
        let section = tree.append_element(NodeId::ROOT, "section", &[]);
        let outer = tree.append_element(section, "div", &[]);
        let inner = tree.append_element(outer, "div", &[]);
        let em = tree.append_element(inner, "em", &[]);
        // The nearest `div` ancestor is not a child of `section`; the outer one is.
        assert!(parse_selector("section > div em").unwrap().matches(&tree, em));
    }

    #[test]
    fn test_sibling_combinators() {
        let mut tree = RenderTree::new();
        let body = tree.append_element(NodeId::ROOT, "body", &[]);
        let _ = tree.append_element(body, "h1", &[]);
        let _ = tree.append_text(body, " ");
        let first = tree.append_element(body, "p", &[]);
        let second = tree.append_element(body, "p", &[]);
        assert!(parse_selector("h1 + p").unwrap().matches(&tree, first));
        assert!(!parse_selector("h1 + p").unwrap().matches(&tree, second));
        assert!(parse_selector("h1 ~ p").unwrap().matches(&tree, second));
    }

    #[test]
    fn test_unsupported_selectors_are_rejected() {
        assert!(parse_selector("a:hover").is_none());
        assert!(parse_selector("p::before").is_none());
        assert!(parse_selector("div >").is_none());
        assert!(parse_selector("").is_none());
        assert!(parse_selector("[=x]").is_none());
    }
}
