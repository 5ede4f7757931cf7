//! Integration tests for stylesheet parsing and syntax error reporting.

use quokka_css::{CssError, Rule, parse_inline_style, parse_selector, parse_stylesheet};

#[test]
fn test_missing_colon_points_at_rule() {
    let err = parse_stylesheet("a { color: red }\nb { color }").unwrap_err();
    assert!(matches!(&err, CssError::MissingColon { property, .. } if property == "color"));
    assert_eq!(err.rule_index(), Some(1));
    assert_eq!(err.location().line, 2);
}

#[test]
fn test_unclosed_block() {
    let err = parse_stylesheet("p { color: red }\n\ndiv { margin: 0").unwrap_err();
    assert!(matches!(err, CssError::UnclosedBlock { rule_index: 1, .. }));
    assert_eq!(err.location().line, 3);
    assert!(err.to_string().contains("rule 1"));
}

#[test]
fn test_empty_selector_and_stray_brace() {
    let err = parse_stylesheet("{ color: red }").unwrap_err();
    assert!(matches!(err, CssError::EmptySelector { rule_index: 0, .. }));

    let err = parse_stylesheet("p { }\n}").unwrap_err();
    assert!(matches!(err, CssError::UnexpectedClosingBrace { .. }));
    assert_eq!(err.location().line, 2);
    assert_eq!(err.rule_index(), None);
}

#[test]
fn test_unterminated_comment() {
    let err = parse_stylesheet("p { color: red } /* open").unwrap_err();
    assert!(matches!(err, CssError::UnterminatedComment { .. }));
}

#[test]
fn test_at_rules_are_kept_but_not_styled() {
    let sheet =
        parse_stylesheet("@import url(x.css);\n@media screen { p { color: red } }\ndiv { color: blue }")
            .unwrap();
    assert_eq!(sheet.rules.len(), 3);
    assert!(matches!(&sheet.rules[1], Rule::At(at) if at.name == "media"));
    assert_eq!(sheet.style_rules().count(), 1);
}

#[test]
fn test_selector_lists_and_importance() {
    let sheet = parse_stylesheet("h1,  h2 ,\n.x > p { COLOR: red !important; margin: 0 }").unwrap();
    let rule = sheet.style_rules().next().unwrap();
    let selectors: Vec<&str> = rule.selectors.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(selectors, vec!["h1", "h2", ".x > p"]);
    assert_eq!(rule.declarations[0].name, "color");
    assert!(rule.declarations[0].important);
    assert!(!rule.declarations[1].important);
}

#[test]
fn test_inline_style_errors() {
    assert!(parse_inline_style("color: red; } margin: 0").is_err());
    assert_eq!(parse_inline_style("").unwrap().len(), 0);
}

#[test]
fn test_specificity_ordering() {
    let id = parse_selector("#a").unwrap().specificity;
    let class = parse_selector("div.b").unwrap().specificity;
    let attr = parse_selector("[type=text]").unwrap().specificity;
    let tag = parse_selector("ul li").unwrap().specificity;
    assert!(id > class);
    assert!(class > attr);
    assert!(attr > tag);
    assert!(parse_selector("a:hover").is_none());
}
