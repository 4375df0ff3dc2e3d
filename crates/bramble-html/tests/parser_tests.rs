//! Integration tests for tree construction and its recovery rules.

use bramble_dom::{NodeId, NodeType};
use bramble_html::{Document, HtmlError, ParseOptions};

/// Parse `html` with default options, panicking on error.
fn parse(html: &str) -> Document {
    let mut doc = Document::new(html);
    doc.parse().unwrap();
    doc
}

/// Parse `html` with `options`, panicking on error.
fn parse_with(html: &str, options: ParseOptions) -> Document {
    let mut doc = Document::with_options(html, options);
    doc.parse().unwrap();
    doc
}

/// Parse `html` and return the error it must produce.
fn parse_err(html: &str) -> HtmlError {
    let mut doc = Document::new(html);
    doc.parse().unwrap_err()
}

/// Tag names of the element children of `id`.
fn child_tags(doc: &Document, id: NodeId) -> Vec<String> {
    doc.tree()
        .children(id)
        .iter()
        .filter_map(|&child| doc.tree().tag_name(child))
        .map(str::to_string)
        .collect()
}

// ========== basic structure ==========

#[test]
fn test_simple_document() {
    let doc = parse("<html><head><title>T</title></head><body><p>Hello</p></body></html>");

    assert!(doc.is_parsed());
    assert!(doc.issues().is_empty());
    assert_eq!(child_tags(&doc, doc.root()), vec!["html"]);

    let html = doc.element_by_tag_name("html").unwrap();
    assert_eq!(child_tags(&doc, html), vec!["head", "body"]);
    assert_eq!(
        doc.to_html(),
        "<html><head><title>T</title></head><body><p>Hello</p></body></html>"
    );
}

#[test]
fn test_attributes_are_parsed() {
    let doc = parse(r#"<div><a href="/x" title='say "hi"' data-n=3 hidden>go</a></div>"#);
    let a = doc.element_by_tag_name("a").unwrap();
    let attrs = &doc.tree().as_element(a).unwrap().attrs;

    assert_eq!(attrs.get_text("href").unwrap(), "/x");
    assert_eq!(attrs.get_text("title").unwrap(), "say \"hi\"");
    assert_eq!(attrs.get_text("data-n").unwrap(), "3");
    assert!(attrs.contains("hidden"));
    assert_eq!(
        doc.to_html(),
        r#"<div><a href="/x" title='say "hi"' data-n="3" hidden>go</a></div>"#
    );
}

#[test]
fn test_value_with_both_quotes_stays_one_attribute() {
    let doc = parse(r#"<p title=a"b'c>x</p>"#);
    let html = doc.to_html();
    assert_eq!(html, r#"<p title="a&quot;b'c">x</p>"#);

    let again = parse(&html);
    let p = again.element_by_tag_name("p").unwrap();
    let attrs = &again.tree().as_element(p).unwrap().attrs;
    assert_eq!(attrs.len(), 1);
    assert!(again.issues().is_empty());
}

#[test]
fn test_duplicate_attribute_keeps_first() {
    let doc = parse(r#"<p><a href="1" href="2">x</a></p>"#);
    let a = doc.element_by_tag_name("a").unwrap();

    assert_eq!(
        doc.tree().as_element(a).unwrap().attrs.get_text("href").unwrap(),
        "1"
    );
    assert_eq!(doc.issues().len(), 1);
}

#[test]
fn test_class_assignments_merge() {
    let doc = parse(r#"<p class="a" class="b c a">x</p>"#);
    let p = doc.element_by_tag_name("p").unwrap();
    let element = doc.tree().as_element(p).unwrap();

    assert_eq!(element.classes(), &["a", "b", "c"]);
    assert_eq!(element.attrs.get_text("class").unwrap(), "a b c");
    assert!(doc.issues().is_empty());
}

#[test]
fn test_tags_are_lowercased_by_default() {
    let doc = parse(r#"<DIV ID="x"><P>t</P></DIV>"#);
    assert_eq!(doc.to_html(), r#"<div id="x"><p>t</p></div>"#);
}

#[test]
fn test_case_preserved_option() {
    let doc = parse_with(
        r#"<DIV ID="x"><P>t</p></DIV>"#,
        ParseOptions::default().with_case_preserved(),
    );
    assert_eq!(doc.to_html(), r#"<DIV ID="x"><P>t</P></DIV>"#);
}

#[test]
fn test_doctype_and_comments() {
    let doc = parse("<!DOCTYPE html><div><!-- <p>not a tag</p> --></div>");
    let children = doc.tree().children(doc.root());

    assert!(matches!(
        &doc.tree().get(children[0]).unwrap().node_type,
        NodeType::Doctype(content) if content == "DOCTYPE html"
    ));
    let div = children[1];
    let comment = doc.tree().first_child(div).unwrap();
    assert!(matches!(
        &doc.tree().get(comment).unwrap().node_type,
        NodeType::Comment(content) if content == " <p>not a tag</p> "
    ));
    assert_eq!(
        doc.to_html(),
        "<!DOCTYPE html><div><!-- <p>not a tag</p> --></div>"
    );
}

#[test]
fn test_end_of_input_closes_open_elements() {
    let doc = parse("<div><p>unterminated");
    let p = doc.element_by_tag_name("p").unwrap();

    assert_eq!(doc.tree().get(p).unwrap().end, Some(doc.len()));
    assert_eq!(doc.to_html(), "<div><p>unterminated</p></div>");
}

#[test]
fn test_offsets_are_recorded() {
    let doc = parse("<div><p>hi</p></div>");
    let p = doc.element_by_tag_name("p").unwrap();
    let node = doc.tree().get(p).unwrap();

    assert_eq!(node.start, Some(5));
    assert_eq!(node.end, Some(14));
    let text = doc.tree().get(node.children[0]).unwrap();
    assert_eq!(text.start, Some(8));
}

// ========== text ==========

#[test]
fn test_stray_lt_is_text() {
    let doc = parse("<p>a < b</p>");
    let p = doc.element_by_tag_name("p").unwrap();

    assert_eq!(doc.tree().children(p).len(), 1);
    assert_eq!(doc.text(p), "a < b");
    assert_eq!(doc.issues().len(), 1);
}

#[test]
fn test_unknown_tags_become_text() {
    let doc = parse("<p><foo>bar</foo></p>");
    let p = doc.element_by_tag_name("p").unwrap();

    assert_eq!(doc.tree().children(p).len(), 1);
    assert_eq!(doc.text(p), "<foo>bar</foo>");
    assert_eq!(doc.to_html(), "<p><foo>bar</foo></p>");
}

#[test]
fn test_linebreaks_are_stripped() {
    let doc = parse("<p>a\r\nb\n</p>\n<p>c</p>");
    assert_eq!(doc.to_html(), "<p>ab</p><p>c</p>");
}

#[test]
fn test_linebreaks_kept_when_asked() {
    let doc = parse_with("<p>a\nb</p>", ParseOptions::default().with_linebreaks());
    assert_eq!(doc.to_html(), "<p>a\nb</p>");
}

#[test]
fn test_byte_order_mark_is_dropped() {
    let doc = parse("\u{FEFF}<p>x</p>");
    assert_eq!(doc.source(), "<p>x</p>");
    assert_eq!(doc.to_html(), "<p>x</p>");
}

#[test]
fn test_empty_span_gets_default_text() {
    let doc = parse_with(
        "<div><span></span><span>kept</span></div>",
        ParseOptions::default().with_span_text("&nbsp;"),
    );
    assert_eq!(
        doc.to_html(),
        "<div><span>&nbsp;</span><span>kept</span></div>"
    );
}

#[test]
fn test_empty_span_left_alone_by_default() {
    let doc = parse("<div><span></span></div>");
    assert_eq!(doc.to_html(), "<div><span></span></div>");
}

// ========== noise ==========

#[test]
fn test_script_body_is_not_tokenized() {
    let html = r#"<div><script>if (a < b) { x = "</div>"; }</script></div>"#;
    let doc = parse(html);
    let script = doc.element_by_tag_name("script").unwrap();

    assert_eq!(doc.text(script), r#"if (a < b) { x = "</div>"; }"#);
    assert_eq!(doc.to_html(), html);
    assert!(doc.issues().is_empty());
}

#[test]
fn test_noise_keeps_its_linebreaks() {
    let doc = parse("<style>\np { color: red }\n</style>\n<p>x</p>");
    let style = doc.element_by_tag_name("style").unwrap();

    assert_eq!(doc.text(style), "\np { color: red }\n");
    assert_eq!(doc.to_html(), "<style>\np { color: red }\n</style><p>x</p>");
}

#[test]
fn test_cdata_is_kept_as_text() {
    let doc = parse("<p><![CDATA[1 < 2]]></p>");
    let p = doc.element_by_tag_name("p").unwrap();
    assert_eq!(doc.text(p), "<![CDATA[1 < 2]]>");
}

#[test]
fn test_without_noise_stripping_comments_still_parse() {
    let doc = parse_with(
        "<div><!-- note --></div>",
        ParseOptions::default().without_noise_stripping(),
    );
    assert_eq!(doc.to_html(), "<div><!-- note --></div>");
}

#[test]
fn test_markup_inside_attribute_values_stays_in_the_tag() {
    let html = r#"<div><a title="<script>">x</a><p>y</p></div>"#;
    let doc = parse(html);
    assert_eq!(doc.find("p").len(), 1);
    assert_eq!(doc.to_html(), html);

    let doc = parse(r#"<div><img alt="<!--"><p>y</p></div>"#);
    assert_eq!(doc.find("p").len(), 1);
    assert_eq!(doc.to_html(), r#"<div><img alt="<!--"/><p>y</p></div>"#);
}

#[test]
fn test_unclosed_script_body_is_tokenized() {
    let doc = parse("<div><script>x<p>y</p></div>");
    assert_eq!(doc.find("p").len(), 1);
    assert_eq!(doc.to_html(), "<div><script>x<p>y</p></script></div>");
}

#[test]
fn test_abrupt_comment_is_empty() {
    let doc = parse("<div><!--><p>y</p></div>");
    assert_eq!(doc.find("p").len(), 1);
    assert_eq!(doc.to_html(), "<div><!----><p>y</p></div>");
}

#[test]
fn test_unterminated_comment_opener_is_text() {
    let html = "<div><!-- open<p>y</p></div>";
    let doc = parse(html);
    let div = doc.element_by_tag_name("div").unwrap();

    assert_eq!(child_tags(&doc, div), ["p"]);
    assert_eq!(doc.to_html(), html);
    assert_eq!(doc.issues().len(), 1);
}

#[test]
fn test_placeholder_lookalikes_in_text_survive() {
    let html = "<p>\u{1A}0\u{1A}</p><!--hidden-->";
    let doc = parse(html);
    let p = doc.element_by_tag_name("p").unwrap();

    assert_eq!(doc.text(p), "\u{1A}0\u{1A}");
    assert_eq!(doc.to_html(), html);
}

// ========== optional closing tags ==========

#[test]
fn test_list_items_close_each_other() {
    let doc = parse("<ul><li>a<li>b</ul>");
    let ul = doc.element_by_tag_name("ul").unwrap();

    assert_eq!(child_tags(&doc, ul), vec!["li", "li"]);
    for &li in doc.tree().children(ul) {
        assert_eq!(doc.tree().children(li).len(), 1);
    }
    assert_eq!(doc.to_html(), "<ul><li>a</li><li>b</li></ul>");
    assert!(doc.issues().is_empty());
}

#[test]
fn test_table_cells_and_rows_close_implicitly() {
    let doc = parse("<table><tr><td>1<td>2<tr><td>3</table>");
    assert_eq!(
        doc.to_html(),
        "<table><tr><td>1</td><td>2</td></tr><tr><td>3</td></tr></table>"
    );
}

#[test]
fn test_definition_terms_close_each_other() {
    let doc = parse("<dl><dt>term<dd>definition<dt>next</dl>");
    let dl = doc.element_by_tag_name("dl").unwrap();
    assert_eq!(child_tags(&doc, dl), vec!["dt", "dd", "dt"]);
}

#[test]
fn test_paragraph_closed_by_ancestor_end_tag() {
    let doc = parse("<ul><li><p>x</ul>");
    assert_eq!(doc.to_html(), "<ul><li><p>x</p></li></ul>");
}

#[test]
fn test_walk_up_reports_non_optional_closes() {
    let doc = parse("<div><em>x</div>");

    assert_eq!(doc.to_html(), "<div><em>x</em></div>");
    assert_eq!(doc.issues().len(), 1);
    assert!(doc.issues()[0].message.contains("<em>"));
}

// ========== stray closing tags ==========

#[test]
fn test_mismatched_close_is_structural_error() {
    match parse_err("<div><span>x</p></div>") {
        HtmlError::Structural {
            found,
            expected,
            offset,
        } => {
            assert_eq!(found, "p");
            assert_eq!(expected, "span");
            assert_eq!(offset, 12);
        }
        other => panic!("expected structural error, got {other:?}"),
    }
}

#[test]
fn test_close_at_document_level_is_structural_error() {
    let err = parse_err("text</p>");
    assert!(err.is_structural());
    assert!(matches!(err, HtmlError::Structural { expected, .. } if expected.is_empty()));
}

#[test]
fn test_unmatched_block_close_becomes_text() {
    let doc = parse("<p>a</div>b</p>");
    let p = doc.element_by_tag_name("p").unwrap();

    assert_eq!(doc.text(p), "a</div>b");
    assert_eq!(doc.issues().len(), 1);
}

#[test]
fn test_failed_parse_leaves_empty_tree() {
    let mut doc = Document::new("<div><span>x</p></div>");
    assert!(doc.parse().is_err());
    assert!(!doc.is_parsed());
    assert_eq!(doc.tree().len(), 1);
    assert!(doc.find("div").is_empty());
}

// ========== self-closing ==========

#[test]
fn test_void_elements_take_no_children() {
    let doc = parse("<p>a<br>b<img src=x.png>c</p>");
    let p = doc.element_by_tag_name("p").unwrap();

    assert_eq!(doc.tree().children(p).len(), 5);
    assert_eq!(doc.to_html(), r#"<p>a<br/>b<img src="x.png"/>c</p>"#);
}

#[test]
fn test_explicit_self_closing_inside_element() {
    let doc = parse("<div><custom-widget/><span/>x</div>");
    let div = doc.element_by_tag_name("div").unwrap();

    assert_eq!(child_tags(&doc, div), vec!["custom-widget", "span"]);
    assert_eq!(doc.text(div), "x");
}

#[test]
fn test_self_closing_at_document_level_fails() {
    let err = parse_err("<div></div><span/>");
    assert!(matches!(err, HtmlError::SelfClosingAtRoot { ref tag, offset: 11 } if tag == "span"));
    assert!(err.is_structural());
}

#[test]
fn test_void_element_without_slash_allowed_at_document_level() {
    let doc = parse("<br><hr>");
    assert_eq!(doc.to_html(), "<br/><hr/>");
}

// ========== forms ==========

#[test]
fn test_form_scope_contains_controls() {
    let doc = parse(r#"<form action="/go"><input name="q"></form><p>after</p>"#);

    assert_eq!(child_tags(&doc, doc.root()), vec!["form", "p"]);
    let form = doc.element_by_tag_name("form").unwrap();
    assert_eq!(child_tags(&doc, form), vec!["input"]);
    assert_eq!(
        doc.to_html(),
        r#"<form action="/go"><input name="q"/></form><p>after</p>"#
    );
}

#[test]
fn test_unclosed_form_is_closed_by_ancestor() {
    let doc = parse(r#"<div><form><input name="a"></div><p>x</p>"#);

    assert_eq!(
        doc.to_html(),
        r#"<div><form><input name="a"/></form></div><p>x</p>"#
    );
    let div = doc.element_by_tag_name("div").unwrap();
    assert_eq!(child_tags(&doc, div), vec!["form"]);
}

#[test]
fn test_nested_elements_inside_form() {
    let doc = parse(
        r#"<form><fieldset><label>Name <input name="n"></label></fieldset><select name="s"><option value="1">One<option value="2">Two</select></form>"#,
    );
    let select = doc.element_by_tag_name("select").unwrap();

    assert_eq!(child_tags(&doc, select), vec!["option", "option"]);
    assert_eq!(doc.elements_by_tag_name("input").len(), 1);
}

#[test]
fn test_input_outside_form_fails() {
    let err = parse_err(r#"<div><input name="x"></div>"#);
    assert!(matches!(
        err,
        HtmlError::Nesting { ref tag, required: "form", offset: 5 } if tag == "input"
    ));
    assert!(!err.is_structural());
}

#[test]
fn test_option_outside_select_fails() {
    let err = parse_err("<form><option>a</option></form>");
    assert!(matches!(err, HtmlError::Nesting { required: "select", .. }));
}

#[test]
fn test_form_inside_form_content_continues() {
    let doc = parse(r#"<div><form id="f"><textarea name="t">x</textarea></form>tail</div>"#);
    let div = doc.element_by_tag_name("div").unwrap();

    assert_eq!(doc.text(div), "xtail");
    assert_eq!(doc.tree().children(div).len(), 2);
}
