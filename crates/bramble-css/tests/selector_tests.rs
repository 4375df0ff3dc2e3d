//! Integration tests for selector parsing and matching.

use bramble_css::selector::{MatchOptions, Operator, parse_selector};
use bramble_dom::{DomTree, NodeId};
use bramble_html::Document;

const PAGE: &str = r#"<html><head><title>Shop</title></head><body>
<div id="nav" class="menu main"><a href="/">Home</a><a href="http://example.com/docs" class="external">Docs</a></div>
<ul class="items"><li>one</li><li class="hot">two</li><li>three</li></ul>
<div class="footer"><span title="Copyright">(c) Bramble</span><a name="bottom">end</a></div>
</body></html>"#;

/// Parse the shared test page.
fn page() -> Document {
    let mut doc = Document::new(PAGE);
    doc.parse().unwrap();
    doc
}

/// Run `query` against the whole tree and return matching tag names.
fn tags(tree: &DomTree, query: &str) -> Vec<String> {
    parse_selector(query)
        .find(tree, NodeId::ROOT, MatchOptions::default())
        .into_iter()
        .map(|id| tree.tag_name(id).unwrap().to_string())
        .collect()
}

/// Run `query` and return the text content of every match.
fn texts(tree: &DomTree, query: &str) -> Vec<String> {
    parse_selector(query)
        .find(tree, NodeId::ROOT, MatchOptions::default())
        .into_iter()
        .map(|id| tree.text_content(id, ""))
        .collect()
}

// ========== parsing ==========

#[test]
fn test_parse_tag_step() {
    let selector = parse_selector("div");
    assert_eq!(selector.alternatives.len(), 1);
    let step = &selector.alternatives[0][0];
    assert_eq!(step.tag.as_deref(), Some("div"));
    assert!(step.tests.is_empty());
    assert_eq!(step.position, None);
}

#[test]
fn test_parse_universal_has_no_tag() {
    let selector = parse_selector("*");
    assert_eq!(selector.alternatives[0].len(), 1);
    assert_eq!(selector.alternatives[0][0].tag, None);
}

#[test]
fn test_parse_shorthands() {
    let selector = parse_selector("a.external#home");
    let step = &selector.alternatives[0][0];
    assert_eq!(step.tag.as_deref(), Some("a"));
    assert_eq!(step.tests.len(), 2);
    assert_eq!(step.tests[0].key, "class");
    assert_eq!(step.tests[0].value.as_deref(), Some("external"));
    assert_eq!(step.tests[1].key, "id");
    assert_eq!(step.tests[1].value.as_deref(), Some("home"));
}

#[test]
fn test_parse_attribute_operators() {
    for (query, operator) in [
        ("[a=b]", Operator::Equals),
        ("[a!=b]", Operator::NotEquals),
        ("[a^=b]", Operator::Prefix),
        ("[a$=b]", Operator::Suffix),
        ("[a*=b]", Operator::Contains),
    ] {
        let selector = parse_selector(query);
        let test = &selector.alternatives[0][0].tests[0];
        assert_eq!(test.operator, operator, "{query}");
        assert_eq!(test.value.as_deref(), Some("b"), "{query}");
    }
}

#[test]
fn test_parse_quoted_value_and_negation() {
    let selector = parse_selector("input[value='a b'] [!disabled]");
    let steps = &selector.alternatives[0];
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0].tests[0].value.as_deref(), Some("a b"));
    assert!(steps[1].tests[0].negated);
    assert_eq!(steps[1].tests[0].key, "disabled");
}

#[test]
fn test_parse_alternatives_and_slashes() {
    let selector = parse_selector("div/ul li, span");
    assert_eq!(selector.alternatives.len(), 2);
    assert_eq!(selector.alternatives[0].len(), 3);
    assert_eq!(selector.alternatives[1].len(), 1);
}

#[test]
fn test_parse_position() {
    let selector = parse_selector("li[2]");
    assert_eq!(selector.alternatives[0][0].position, Some(2));
    assert!(selector.alternatives[0][0].tests.is_empty());
}

#[test]
fn test_parse_empty() {
    assert!(parse_selector("").is_empty());
    assert!(parse_selector("  , ").is_empty());
}

// ========== matching ==========

#[test]
fn test_find_by_tag() {
    let doc = page();
    assert_eq!(tags(doc.tree(), "li"), vec!["li", "li", "li"]);
}

#[test]
fn test_find_descendant_chain() {
    let doc = page();
    assert_eq!(texts(doc.tree(), "div a"), vec!["Home", "Docs", "end"]);
    assert_eq!(texts(doc.tree(), "div.footer a"), vec!["end"]);
    assert_eq!(texts(doc.tree(), "body/ul/li"), vec!["one", "two", "three"]);
}

#[test]
fn test_find_class_token_retry() {
    let doc = page();
    // "menu main" fails as a whole, the token "main" matches.
    assert_eq!(tags(doc.tree(), ".main"), vec!["div"]);
    assert_eq!(tags(doc.tree(), "div[class=menu main]"), vec!["div"]);
}

#[test]
fn test_find_by_id() {
    let doc = page();
    assert_eq!(texts(doc.tree(), "#nav a"), vec!["Home", "Docs"]);
}

#[test]
fn test_find_attribute_operators() {
    let doc = page();
    let tree = doc.tree();
    assert_eq!(texts(tree, "a[href]"), vec!["Home", "Docs"]);
    assert_eq!(texts(tree, "a[!href]"), vec!["end"]);
    assert_eq!(texts(tree, "a[href^=http]"), vec!["Docs"]);
    assert_eq!(texts(tree, "a[href$=/]"), vec!["Home"]);
    assert_eq!(texts(tree, "a[href!=/]"), vec!["Docs"]);
    assert_eq!(texts(tree, "span[title*=COPY]"), vec!["(c) Bramble"]);
    assert_eq!(texts(tree, "a[href=*]"), vec!["Home", "Docs"]);
}

#[test]
fn test_find_plaintext() {
    let doc = page();
    assert_eq!(tags(doc.tree(), "li[plaintext=two]"), vec!["li"]);
    assert_eq!(texts(doc.tree(), "li[plaintext^=t]"), vec!["two", "three"]);
}

#[test]
fn test_alternatives_merge_in_document_order() {
    let doc = page();
    // span comes after the list, but the first alternative names it.
    assert_eq!(
        texts(doc.tree(), "span, li.hot, li.hot"),
        vec!["two", "(c) Bramble"]
    );
}

#[test]
fn test_position_step() {
    let doc = page();
    assert_eq!(texts(doc.tree(), "ul li[2]"), vec!["two"]);
    assert!(texts(doc.tree(), "ul li[9]").is_empty());
    assert!(texts(doc.tree(), "ul li[0]").is_empty());
}

#[test]
fn test_find_nth_with_negative_index() {
    let doc = page();
    let tree = doc.tree();
    let selector = parse_selector("li");
    let options = MatchOptions::default();

    let first = selector.find_nth(tree, NodeId::ROOT, 0, options).unwrap();
    let last = selector.find_nth(tree, NodeId::ROOT, -1, options).unwrap();
    let second_to_last = selector.find_nth(tree, NodeId::ROOT, -2, options).unwrap();

    assert_eq!(tree.text_content(first, ""), "one");
    assert_eq!(tree.text_content(last, ""), "three");
    assert_eq!(tree.text_content(second_to_last, ""), "two");
    assert_eq!(selector.find_nth(tree, NodeId::ROOT, 3, options), None);
    assert_eq!(selector.find_nth(tree, NodeId::ROOT, -4, options), None);
}

#[test]
fn test_value_case_folding_option() {
    let doc = page();
    let tree = doc.tree();
    let selector = parse_selector("span[title=copyright]");

    assert!(selector.find(tree, NodeId::ROOT, MatchOptions::default()).is_empty());

    let folded = MatchOptions {
        ignore_value_case: true,
        ..MatchOptions::default()
    };
    assert_eq!(selector.find(tree, NodeId::ROOT, folded).len(), 1);
}

#[test]
fn test_scoped_find() {
    let doc = page();
    let tree = doc.tree();
    let options = MatchOptions::default();
    let footer = parse_selector(".footer").find_nth(tree, NodeId::ROOT, 0, options).unwrap();

    let inside = parse_selector("a").find(tree, footer, options);
    assert_eq!(inside.len(), 1);
    assert_eq!(tree.text_content(inside[0], ""), "end");
}

#[test]
fn test_empty_selector_matches_nothing() {
    let doc = page();
    assert!(tags(doc.tree(), "").is_empty());
    assert!(tags(doc.tree(), "nosuchtag").is_empty());
}
