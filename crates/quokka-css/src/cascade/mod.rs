//! CSS Cascading and Style Computation
//!
//! This module implements style computation per
//! [CSS Cascading and Inheritance Level 4](https://www.w3.org/TR/css-cascade-4/).

use std::collections::HashMap;

use quokka_common::warning::warn_once;
use quokka_dom::{NodeId, NodeKind, RenderTree};

use crate::layout::default_display_for_element;
use crate::parser::{Declaration, Stylesheet};
use crate::selector::{ParsedSelector, Specificity, parse_selector};
use crate::style::{ComputedStyle, DEFAULT_FONT_SIZE_PX, StyleContext};
use crate::ua_stylesheet::ua_stylesheet;

/// [§ 6.2 Cascade Origins](https://www.w3.org/TR/css-cascade-4/#origin)
///
/// "Each style rule has a cascade origin, which determines where it enters
/// the cascade." Ordered from lowest to highest precedence for normal
/// declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Origin {
    /// The renderer's built-in stylesheet.
    UserAgent,
    /// A stylesheet installed on the renderer by its host.
    User,
    /// `<style>` elements of the document.
    Author,
}

/// [§ 6.4 Cascade Sorting Order](https://www.w3.org/TR/css-cascade-4/#cascade-sort)
///
/// Origin and importance folded into one rank. "Declarations from origins
/// earlier in this list win over declarations from later origins":
///
/// 1. Important user-agent declarations
/// 2. Important user declarations
/// 3. Important author declarations (style attribute first)
/// 4. Normal author declarations (style attribute first)
/// 5. Normal user declarations
/// 6. Normal user-agent declarations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    NormalUserAgent,
    NormalUser,
    NormalAuthor,
    NormalStyleAttribute,
    ImportantAuthor,
    ImportantStyleAttribute,
    ImportantUser,
    ImportantUserAgent,
}

impl Precedence {
    const fn of(origin: Origin, important: bool) -> Self {
        match (origin, important) {
            (Origin::UserAgent, false) => Self::NormalUserAgent,
            (Origin::User, false) => Self::NormalUser,
            (Origin::Author, false) => Self::NormalAuthor,
            (Origin::Author, true) => Self::ImportantAuthor,
            (Origin::User, true) => Self::ImportantUser,
            (Origin::UserAgent, true) => Self::ImportantUserAgent,
        }
    }

    const fn of_style_attribute(important: bool) -> Self {
        if important {
            Self::ImportantStyleAttribute
        } else {
            Self::NormalStyleAttribute
        }
    }
}

/// The ordered set of stylesheets a tree is styled with.
#[derive(Debug, Clone)]
pub struct Cascade {
    sheets: Vec<(Origin, Stylesheet)>,
    user_agent: bool,
    root_font_size: f32,
}

impl Default for Cascade {
    fn default() -> Self {
        Self::new()
    }
}

impl Cascade {
    /// An empty cascade that includes the user-agent stylesheet.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sheets: Vec::new(),
            user_agent: true,
            root_font_size: DEFAULT_FONT_SIZE_PX,
        }
    }

    /// Whether the built-in user-agent stylesheet takes part.
    #[must_use]
    pub const fn with_user_agent_stylesheet(mut self, enabled: bool) -> Self {
        self.user_agent = enabled;
        self
    }

    /// Initial font size of the root element, in pixels.
    #[must_use]
    pub const fn with_root_font_size(mut self, font_size: f32) -> Self {
        self.root_font_size = font_size;
        self
    }

    /// Append a stylesheet. Sheets added later win ties on source order.
    pub fn add_stylesheet(&mut self, origin: Origin, sheet: Stylesheet) {
        self.sheets.push((origin, sheet));
    }

    /// Remove every stylesheet of one origin.
    pub fn clear_origin(&mut self, origin: Origin) {
        self.sheets.retain(|(o, _)| *o != origin);
    }

    /// Number of stylesheets added (the user-agent sheet is not counted).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.sheets.len()
    }

    /// Whether no stylesheet has been added.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Parse every selector once, in cascade source order.
    fn prepare(&self) -> Vec<CascadeRule<'_>> {
        let ua = self.user_agent.then(|| (Origin::UserAgent, ua_stylesheet()));
        let sheets = ua
            .into_iter()
            .chain(self.sheets.iter().map(|(origin, sheet)| (*origin, sheet)));

        let mut rules = Vec::new();
        for (origin, sheet) in sheets {
            for rule in sheet.style_rules() {
                let selectors: Vec<ParsedSelector> = rule
                    .selectors
                    .iter()
                    .filter_map(|sel| parse_selector(&sel.text))
                    .collect();
                if selectors.is_empty() {
                    let text = rule
                        .selectors
                        .iter()
                        .map(|s| s.text.as_str())
                        .collect::<Vec<_>>()
                        .join(", ");
                    warn_once("CSS", &format!("no supported selector in '{text}'"));
                    continue;
                }
                rules.push(CascadeRule {
                    origin,
                    selectors,
                    declarations: &rule.declarations,
                });
            }
        }
        rules
    }
}

/// A style rule with its selectors parsed.
struct CascadeRule<'a> {
    origin: Origin,
    selectors: Vec<ParsedSelector>,
    declarations: &'a [Declaration],
}

/// One declaration that applies to an element, with its cascade sort key.
struct MatchedDeclaration<'a> {
    precedence: Precedence,
    specificity: Specificity,
    order: usize,
    declaration: &'a Declaration,
}

/// [§ 6 Cascading](https://www.w3.org/TR/css-cascade-4/#cascading)
/// "The cascade takes an unordered list of declared values for a given property
/// on a given element, sorts them by their declaration's precedence..."
///
/// Compute styles for every element of the tree. Text, comment and document
/// nodes get no entry.
#[must_use]
pub fn compute_styles(tree: &RenderTree, cascade: &Cascade) -> HashMap<NodeId, ComputedStyle> {
    let rules = cascade.prepare();
    let mut styles = HashMap::new();
    let mut resolver = Resolver {
        tree,
        rules: &rules,
        styles: &mut styles,
    };
    resolver.compute_node(tree.root(), None, cascade.root_font_size);
    log::debug!("computed styles for {} elements", styles.len());
    styles
}

struct Resolver<'a, 'r> {
    tree: &'a RenderTree,
    rules: &'a [CascadeRule<'r>],
    styles: &'a mut HashMap<NodeId, ComputedStyle>,
}

impl<'r> Resolver<'_, 'r> {
    fn compute_node(&mut self, id: NodeId, parent: Option<&ComputedStyle>, root_font_size: f32) {
        let tree = self.tree;
        let Some(node) = tree.get(id) else { return };

        match &node.kind {
            NodeKind::Element(element) => {
                let display = default_display_for_element(&element.tag_name);
                let mut computed = parent.map_or_else(
                    || ComputedStyle {
                        display,
                        ..ComputedStyle::initial(root_font_size)
                    },
                    |p| ComputedStyle::inherit(p, display),
                );

                let ctx = StyleContext {
                    parent,
                    root_font_size,
                };
                let inline_declarations = element
                    .attr("style")
                    .map(parse_style_attribute)
                    .unwrap_or_default();

                // [§ 6.4 Cascade Sorting Order](https://www.w3.org/TR/css-cascade-4/#cascade-sort)
                // Sort ascending so the winner is applied last.
                let mut matched = self.matching_declarations(id, &inline_declarations);
                matched.sort_by_key(|m| (m.precedence, m.specificity, m.order));
                for m in &matched {
                    computed.apply_declaration(m.declaration, &ctx);
                }

                // [§ 5.1.1](https://www.w3.org/TR/css-values-4/#font-relative-lengths)
                // "rem unit: Equal to the computed value of font-size on the root element."
                let child_root_font_size = if parent.is_none() {
                    computed.font_size
                } else {
                    root_font_size
                };
                computed.finish(child_root_font_size);

                for &child in tree.children(id) {
                    self.compute_node(child, Some(&computed), child_root_font_size);
                }
                let _ = self.styles.insert(id, computed);
            }
            NodeKind::Document => {
                for &child in tree.children(id) {
                    self.compute_node(child, parent, root_font_size);
                }
            }
            NodeKind::Text(_) | NodeKind::Comment(_) => {}
        }
    }

    fn matching_declarations<'d>(
        &self,
        id: NodeId,
        inline_declarations: &'d [Declaration],
    ) -> Vec<MatchedDeclaration<'d>>
    where
        'r: 'd,
    {
        let mut matched = Vec::new();
        let mut order = 0;

        for rule in self.rules {
            // "A selector list matches if any of its selectors match"; the
            // most specific matching one counts.
            let Some(specificity) = rule
                .selectors
                .iter()
                .filter(|sel| sel.matches(self.tree, id))
                .map(|sel| sel.specificity)
                .max()
            else {
                order += rule.declarations.len();
                continue;
            };

            for declaration in rule.declarations {
                matched.push(MatchedDeclaration {
                    precedence: Precedence::of(rule.origin, declaration.important),
                    specificity,
                    order,
                    declaration,
                });
                order += 1;
            }
        }

        // [§ 6.4.4](https://www.w3.org/TR/css-cascade-4/#style-attr)
        // The style attribute wins over every normal author rule regardless of
        // specificity.
        for declaration in inline_declarations {
            matched.push(MatchedDeclaration {
                precedence: Precedence::of_style_attribute(declaration.important),
                specificity: Specificity::default(),
                order,
                declaration,
            });
            order += 1;
        }

        matched
    }
}

/// Parse a `style` attribute. A syntax error drops the whole attribute.
fn parse_style_attribute(css: &str) -> Vec<Declaration> {
    match crate::parse_inline_style(css) {
        Ok(declarations) => declarations,
        Err(err) => {
            log::warn!("ignoring style attribute {css:?}: {err}");
            Vec::new()
        }
    }
}

/// A render tree with the computed style of each element attached.
///
/// [`StyledTree::apply_styles`] always recomputes from scratch, so calling it
/// again with the same cascade yields identical styles.
#[derive(Debug, Clone)]
pub struct StyledTree {
    /// The render tree.
    pub dom: RenderTree,
    /// Computed style per element.
    pub styles: HashMap<NodeId, ComputedStyle>,
}

impl StyledTree {
    /// Wrap a render tree without styles.
    #[must_use]
    pub fn new(dom: RenderTree) -> Self {
        Self {
            dom,
            styles: HashMap::new(),
        }
    }

    /// Wrap a render tree and style it.
    #[must_use]
    pub fn styled(dom: RenderTree, cascade: &Cascade) -> Self {
        let mut tree = Self::new(dom);
        tree.apply_styles(cascade);
        tree
    }

    /// Attach a computed style to every element, replacing any previous styles.
    pub fn apply_styles(&mut self, cascade: &Cascade) {
        self.styles = compute_styles(&self.dom, cascade);
    }

    /// Computed style of an element.
    #[must_use]
    pub fn style(&self, id: NodeId) -> Option<&ComputedStyle> {
        self.styles.get(&id)
    }

    /// Style that applies to a node's content: its own for elements, the
    /// nearest styled ancestor's for text.
    #[must_use]
    pub fn effective_style(&self, id: NodeId) -> Option<&ComputedStyle> {
        self.style(id)
            .or_else(|| self.dom.ancestors(id).find_map(|a| self.style(a)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_stylesheet;
    use crate::style::{AutoLength, ColorValue, DisplayValue, LengthValue};

    fn cascade(css: &str) -> Cascade {
        let mut cascade = Cascade::new().with_user_agent_stylesheet(false);
        cascade.add_stylesheet(Origin::Author, parse_stylesheet(css).unwrap());
        cascade
    }

    fn tree_with_paragraph(attrs: &[(&str, &str)]) -> (RenderTree, NodeId) {
        let mut tree = RenderTree::new();
        let html = tree.append_element(NodeId::ROOT, "html", &[]);
        let body = tree.append_element(html, "body", &[]);
        let p = tree.append_element(body, "p", attrs);
        let _ = tree.append_text(p, "text");
        (tree, p)
    }

    #[test]
    fn test_specificity_beats_source_order() {
        let (tree, p) = tree_with_paragraph(&[("id", "x"), ("class", "c")]);
        let styles = compute_styles(&tree, &cascade("#x { color: red } .c { color: blue } p { color: green }"));
        assert_eq!(styles[&p].color, ColorValue::rgb(255, 0, 0));
    }

    #[test]
    fn test_later_rule_wins_on_equal_specificity() {
        let (tree, p) = tree_with_paragraph(&[("class", "a b")]);
        let styles = compute_styles(&tree, &cascade(".a { color: red } .b { color: blue }"));
        assert_eq!(styles[&p].color, ColorValue::rgb(0, 0, 255));
    }

    #[test]
    fn test_important_beats_specificity() {
        let (tree, p) = tree_with_paragraph(&[("id", "x")]);
        let styles = compute_styles(&tree, &cascade("p { color: red !important } #x { color: blue }"));
        assert_eq!(styles[&p].color, ColorValue::rgb(255, 0, 0));
    }

    #[test]
    fn test_style_attribute_beats_id_rule() {
        let (tree, p) = tree_with_paragraph(&[("id", "x"), ("style", "padding-top: 4px")]);
        let styles = compute_styles(&tree, &cascade("#x { padding-top: 9px; padding-left: 2px }"));
        assert_eq!(styles[&p].padding.top, LengthValue::Px(4.0));
        assert_eq!(styles[&p].padding.left, LengthValue::Px(2.0));
    }

    #[test]
    fn test_author_beats_user_agent() {
        let (tree, p) = tree_with_paragraph(&[]);
        let mut c = cascade("p { margin-top: 3px }");
        c = c.with_user_agent_stylesheet(true);
        let styles = compute_styles(&tree, &c);
        assert_eq!(styles[&p].margin.top, AutoLength::Length(LengthValue::Px(3.0)));
        // The UA bottom margin of 1em is untouched.
        assert_eq!(styles[&p].margin.bottom, AutoLength::Length(LengthValue::Px(16.0)));
    }

    #[test]
    fn test_color_is_inherited_but_padding_is_not() {
        let mut tree = RenderTree::new();
        let div = tree.append_element(NodeId::ROOT, "div", &[]);
        let span = tree.append_element(div, "span", &[]);
        let styles = compute_styles(&tree, &cascade("div { color: red; padding: 5px }"));
        assert_eq!(styles[&span].color, ColorValue::rgb(255, 0, 0));
        assert_eq!(styles[&span].padding.top, LengthValue::ZERO);
        assert_eq!(styles[&span].display, DisplayValue::Inline);
        assert_eq!(styles[&div].display, DisplayValue::Block);
    }

    #[test]
    fn test_rem_uses_root_font_size() {
        let mut tree = RenderTree::new();
        let html = tree.append_element(NodeId::ROOT, "html", &[]);
        let div = tree.append_element(html, "div", &[]);
        let styles = compute_styles(
            &tree,
            &cascade("html { font-size: 10px } div { font-size: 30px; padding-top: 2rem }"),
        );
        assert_eq!(styles[&div].padding.top, LengthValue::Px(20.0));
    }

    #[test]
    fn test_text_nodes_have_no_style() {
        let (tree, p) = tree_with_paragraph(&[]);
        let text = tree.children(p)[0];
        let styled = StyledTree::styled(tree, &cascade("p { color: red }"));
        assert!(styled.style(text).is_none());
        assert_eq!(styled.effective_style(text).map(|s| s.color), Some(ColorValue::rgb(255, 0, 0)));
    }

    #[test]
    fn test_selector_list_uses_most_specific_match() {
        let (tree, p) = tree_with_paragraph(&[("id", "x")]);
        let styles = compute_styles(&tree, &cascade("p, #x { color: red } .nope, p.other, p { color: blue }"));
        // `#x` (1,0,0) beats `p` (0,0,1) even though the blue rule comes later.
        assert_eq!(styles[&p].color, ColorValue::rgb(255, 0, 0));
    }
}
