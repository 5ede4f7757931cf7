//! [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
//!
//! A forgiving tree builder. It keeps the parts of the insertion-mode machinery
//! that shape the render tree (implied `html`/`head`/`body`, void elements,
//! implicit end tags for paragraphs and list items, mis-nested end tags) and
//! records everything else as a [`ParseIssue`] instead of failing.

use quokka_common::warning::warn_once;
use quokka_dom::{AttributesMap, ElementData, NodeId, NodeKind, RenderTree};

use crate::tokenizer::Token;

/// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
///
/// "The handling of parse errors is well-defined." The builder never aborts;
/// issues are collected for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    /// Description of the recovered problem.
    pub message: String,
    /// Index into the token stream where this issue was encountered.
    pub token_index: usize,
}

/// [§ 13.1.2 Elements](https://html.spec.whatwg.org/multipage/syntax.html#void-elements)
///
/// "Void elements: area, base, br, col, embed, hr, img, input, link, meta,
/// source, track, wbr"
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
const HEAD_ELEMENTS: &[&str] = &[
    "base", "link", "meta", "noscript", "script", "style", "template", "title",
];

/// Start tags that close an open `p` element ("If the stack of open elements
/// has a p element in button scope, then close a p element.")
const CLOSES_P: &[&str] = &[
    "address", "article", "aside", "blockquote", "center", "details", "dialog", "dir",
    "div", "dl", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3",
    "h4", "h5", "h6", "header", "hgroup", "hr", "li", "main", "menu", "nav", "ol", "p",
    "pre", "section", "table", "ul",
];

const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// Deepest stack of open elements the builder keeps, matching the cap
/// browsers apply. Start tags beyond it are inserted as empty children of
/// the current node, which bounds the depth of every tree walk downstream.
pub const MAX_OPEN_ELEMENTS: usize = 512;

/// [§ 13.2.4.2 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-button-scope)
///
/// Elements that bound the "has an element in scope" searches.
const SCOPE_BOUNDARIES: &[&str] = &[
    "applet", "caption", "html", "table", "td", "th", "marquee", "object", "template",
    "button",
];

/// HTML tree builder that consumes a token stream and produces a [`RenderTree`].
pub struct HTMLParser {
    tokens: Vec<Token>,
    tree: RenderTree,
    /// "The stack of open elements" (the Document is implicit at the bottom).
    open_elements: Vec<NodeId>,
    html: Option<NodeId>,
    head: Option<NodeId>,
    body: Option<NodeId>,
    issues: Vec<ParseIssue>,
    token_index: usize,
}

impl HTMLParser {
    /// Create a new parser for a token stream produced by the tokenizer.
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            tree: RenderTree::new(),
            open_elements: Vec::new(),
            html: None,
            head: None,
            body: None,
            issues: Vec::new(),
            token_index: 0,
        }
    }

    /// Build the tree, discarding parse issues.
    #[must_use]
    pub fn run(self) -> RenderTree {
        self.run_with_issues().0
    }

    /// Build the tree and return the recovered parse issues alongside it.
    #[must_use]
    pub fn run_with_issues(mut self) -> (RenderTree, Vec<ParseIssue>) {
        let tokens = std::mem::take(&mut self.tokens);
        for (index, token) in tokens.into_iter().enumerate() {
            self.token_index = index;
            match token {
                Token::Doctype { .. } => {
                    if self.html.is_some() {
                        self.issue("unexpected DOCTYPE after content");
                    }
                }
                Token::StartTag {
                    name,
                    self_closing,
                    attributes,
                } => {
                    let attrs: AttributesMap =
                        attributes.into_iter().map(|a| (a.name, a.value)).collect();
                    self.handle_start_tag(&name, attrs, self_closing);
                }
                Token::EndTag { name } => self.handle_end_tag(&name),
                Token::Comment { data } => {
                    let parent = self.current_node();
                    let id = self.tree.alloc(NodeKind::Comment(data));
                    self.tree.append_child(parent, id);
                }
                Token::Character { data } => self.handle_character(data),
                Token::EndOfFile => {
                    if self.open_elements.len() > 2 {
                        self.issue("end of file with unclosed elements");
                    }
                    break;
                }
            }
        }
        // Even an empty document gets html/head/body, as browsers build them.
        let _ = self.ensure_body();
        log::debug!(
            "built render tree with {} nodes ({} parse issues)",
            self.tree.len(),
            self.issues.len()
        );
        (self.tree, self.issues)
    }

    fn issue(&mut self, message: &str) {
        self.issues.push(ParseIssue {
            message: message.to_string(),
            token_index: self.token_index,
        });
    }

    fn current_node(&self) -> NodeId {
        self.open_elements.last().copied().unwrap_or(NodeId::ROOT)
    }

    fn current_tag(&self) -> Option<&str> {
        self.open_elements
            .last()
            .and_then(|&id| self.tree.tag_name(id))
    }

    /// [§ 13.2.6.4.2 The "before html" insertion mode]
    /// "Create an html element whose node document is the Document object."
    fn ensure_html(&mut self) -> NodeId {
        if let Some(html) = self.html {
            return html;
        }
        let html = self.insert_element(NodeId::ROOT, "html", AttributesMap::new());
        self.html = Some(html);
        self.open_elements = vec![html];
        html
    }

    /// [§ 13.2.6.4.3 The "before head" insertion mode]
    fn ensure_head(&mut self) -> NodeId {
        if let Some(head) = self.head {
            return head;
        }
        let html = self.ensure_html();
        let head = self.insert_element(html, "head", AttributesMap::new());
        self.head = Some(head);
        head
    }

    /// [§ 13.2.6.4.6 The "after head" insertion mode]
    /// "Insert an HTML element for a "body" start tag token with no attributes."
    fn ensure_body(&mut self) -> NodeId {
        if let Some(body) = self.body {
            return body;
        }
        let _ = self.ensure_head();
        let html = self.ensure_html();
        let body = self.insert_element(html, "body", AttributesMap::new());
        self.body = Some(body);
        self.open_elements = vec![html, body];
        body
    }

    fn insert_element(&mut self, parent: NodeId, tag: &str, attrs: AttributesMap) -> NodeId {
        let id = self
            .tree
            .alloc(NodeKind::Element(ElementData::new(tag, attrs)));
        self.tree.append_child(parent, id);
        id
    }

    /// Merge attributes onto an existing `html`/`body` element: "for each attribute
    /// on the token, check to see if the attribute is already present on the
    /// element. If it is not, add the attribute."
    fn merge_attributes(&mut self, target: NodeId, attrs: AttributesMap) {
        if let Some(element) = self.tree.as_element_mut(target) {
            for (name, value) in attrs {
                if !element.attrs.contains_key(&name) {
                    element.set_attr(name, value);
                }
            }
        }
    }

    fn handle_start_tag(&mut self, name: &str, attrs: AttributesMap, self_closing: bool) {
        match name {
            "html" => {
                let html = self.ensure_html();
                self.merge_attributes(html, attrs);
                return;
            }
            "head" => {
                if self.head.is_some() {
                    self.issue("unexpected head start tag");
                } else {
                    let _ = self.ensure_head();
                    if let Some(head) = self.head {
                        self.merge_attributes(head, attrs);
                    }
                }
                return;
            }
            "body" => {
                if self.body.is_some() {
                    self.issue("unexpected body start tag");
                    if let Some(body) = self.body {
                        self.merge_attributes(body, attrs);
                    }
                } else {
                    let body = self.ensure_body();
                    self.merge_attributes(body, attrs);
                }
                return;
            }
            _ => {}
        }

        // Metadata before the body goes into the head.
        let parent = if self.body.is_none() && HEAD_ELEMENTS.contains(&name) {
            self.ensure_head()
        } else {
            let _ = self.ensure_body();
            self.close_implied_by(name);
            self.current_node()
        };

        let id = self.insert_element(parent, name, attrs);
        if VOID_ELEMENTS.contains(&name) {
            return;
        }
        if self_closing {
            // "non-void-html-element-start-tag-with-trailing-solidus parse error";
            // the flag is ignored and the element stays open.
            self.issue("self-closing flag on non-void element");
        }
        if self.open_elements.len() >= MAX_OPEN_ELEMENTS {
            self.issue("element nesting too deep");
            warn_once(
                "HTML",
                &format!("nesting deeper than {MAX_OPEN_ELEMENTS} elements is flattened"),
            );
            return;
        }
        // Head children are raw text elements; the tokenizer delivers their end
        // tag right after the content, which pops them again.
        self.open_elements.push(id);
    }

    /// Implicit end tags required before inserting `name`.
    fn close_implied_by(&mut self, name: &str) {
        if CLOSES_P.contains(&name) && self.has_in_scope("p") {
            self.pop_until("p");
        }
        // "If the current node is an HTML element whose tag name is one of h1..h6,
        // then this is a parse error; pop the current node off the stack."
        if HEADINGS.contains(&name) && self.current_tag().is_some_and(|t| HEADINGS.contains(&t)) {
            self.issue("nested heading");
            let _ = self.open_elements.pop();
        }
        // [§ 13.2.6.4.7] A start tag whose tag name is "li": close an open li
        // up to the nearest list.
        if name == "li" {
            self.close_open_list_item(&["li"]);
        }
        if name == "dt" || name == "dd" {
            self.close_open_list_item(&["dt", "dd"]);
        }
        if name == "a" && self.has_in_scope("a") {
            self.issue("nested anchor");
            self.pop_until("a");
        }
    }

    fn close_open_list_item(&mut self, items: &[&str]) {
        for &id in self.open_elements.iter().rev() {
            match self.tree.tag_name(id) {
                Some(tag) if items.contains(&tag) => {
                    let tag = tag.to_string();
                    self.pop_until(&tag);
                    return;
                }
                Some("ul" | "ol" | "dl" | "div" | "address" | "p") | None => return,
                Some(tag) if SCOPE_BOUNDARIES.contains(&tag) => return,
                Some(_) => {}
            }
        }
    }

    /// [§ 13.2.4.2 has an element in scope](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-scope)
    fn has_in_scope(&self, name: &str) -> bool {
        for &id in self.open_elements.iter().rev() {
            match self.tree.tag_name(id) {
                Some(tag) if tag == name => return true,
                Some(tag) if SCOPE_BOUNDARIES.contains(&tag) => return false,
                _ => {}
            }
        }
        false
    }

    /// Pop elements until one named `name` has been popped.
    fn pop_until(&mut self, name: &str) {
        while let Some(id) = self.open_elements.pop() {
            if self.tree.tag_name(id) == Some(name) {
                break;
            }
        }
        // The html element always stays at the bottom of the stack.
        if self.open_elements.is_empty()
            && let Some(html) = self.html
        {
            self.open_elements.push(html);
        }
    }

    fn handle_end_tag(&mut self, name: &str) {
        match name {
            "html" | "body" | "head" => {
                // Kept open so trailing content still lands in the body, as in the
                // "after body" insertion mode.
                if name == "head" && self.body.is_none() {
                    let _ = self.ensure_head();
                }
            }
            // "An end tag whose tag name is "br": parse error. Act as described in
            // the next entry; i.e. act as if this was a "br" start tag token"
            "br" => {
                self.issue("end tag br");
                self.handle_start_tag("br", AttributesMap::new(), false);
            }
            // "If the stack of open elements does not have a p element in button
            // scope, then this is a parse error; insert an HTML element for a "p"
            // start tag token with no attributes."
            "p" if !self.has_in_scope("p") => {
                self.issue("end tag p without open p");
                let _ = self.ensure_body();
                let parent = self.current_node();
                let _ = self.insert_element(parent, "p", AttributesMap::new());
            }
            _ => {
                let open = self
                    .open_elements
                    .iter()
                    .any(|&id| self.tree.tag_name(id) == Some(name));
                if open {
                    if self.current_tag() != Some(name) {
                        self.issue("end tag closes mis-nested elements");
                    }
                    self.pop_until(name);
                } else {
                    self.issue("end tag without matching start tag");
                }
            }
        }
    }

    /// [§ 13.2.6.1 Creating and inserting nodes](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-character)
    ///
    /// "If there is a Text node immediately before the adjusted insertion
    /// location, then append data to that Text node's data."
    fn handle_character(&mut self, c: char) {
        let is_whitespace = matches!(c, '\t' | '\n' | '\x0C' | '\r' | ' ');
        // Whitespace before the body is dropped, as in the "before html",
        // "before head" and "after head" modes.
        if self.body.is_none() && is_whitespace {
            let in_raw_head_element = self
                .current_tag()
                .is_some_and(|t| HEAD_ELEMENTS.contains(&t));
            if !in_raw_head_element {
                return;
            }
        }
        let parent = if self.body.is_none()
            && self
                .current_tag()
                .is_some_and(|t| HEAD_ELEMENTS.contains(&t))
        {
            self.current_node()
        } else {
            let _ = self.ensure_body();
            self.current_node()
        };

        if let Some(&last) = self.tree.children(parent).last()
            && let Some(node) = self.tree.get_mut(last)
            && let NodeKind::Text(text) = &mut node.kind
        {
            text.push(c);
            return;
        }
        let id = self.tree.alloc(NodeKind::Text(c.to_string()));
        self.tree.append_child(parent, id);
    }
}

/// Print a render tree to stdout (for debugging).
pub fn print_tree(tree: &RenderTree, id: NodeId, indent: usize) {
    let prefix = "  ".repeat(indent);
    if let Some(node) = tree.get(id) {
        match &node.kind {
            NodeKind::Document => println!("{prefix}Document"),
            NodeKind::Element(data) => {
                let mut attrs: Vec<String> = data
                    .attrs
                    .iter()
                    .map(|(k, v)| {
                        if v.is_empty() {
                            k.clone()
                        } else {
                            format!("{k}=\"{v}\"")
                        }
                    })
                    .collect();
                attrs.sort();
                if attrs.is_empty() {
                    println!("{prefix}<{}>", data.tag_name);
                } else {
                    println!("{prefix}<{} {}>", data.tag_name, attrs.join(" "));
                }
            }
            NodeKind::Text(data) => {
                let display = data.replace('\n', "\\n").replace(' ', "\u{00B7}");
                println!("{prefix}\"{display}\"");
            }
            NodeKind::Comment(data) => println!("{prefix}<!-- {data} -->"),
        }
        for &child_id in tree.children(id) {
            print_tree(tree, child_id, indent + 1);
        }
    }
}
