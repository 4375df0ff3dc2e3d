//! Tag tables driving the parser.

/// Tags the parser turns into elements. Anything else opening with `<name`
/// is treated as noise unless it is written self-closing.
#[must_use]
pub fn is_allowed(tag: &str) -> bool {
    matches!(
        tag,
        "a" | "abbr"
            | "address"
            | "area"
            | "article"
            | "aside"
            | "audio"
            | "b"
            | "base"
            | "bdi"
            | "bdo"
            | "blockquote"
            | "body"
            | "br"
            | "button"
            | "canvas"
            | "caption"
            | "cite"
            | "code"
            | "col"
            | "colgroup"
            | "command"
            | "datalist"
            | "dd"
            | "del"
            | "details"
            | "dfn"
            | "dialog"
            | "div"
            | "dl"
            | "dt"
            | "em"
            | "embed"
            | "fieldset"
            | "figcaption"
            | "figure"
            | "footer"
            | "form"
            | "head"
            | "header"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "hr"
            | "html"
            | "i"
            | "iframe"
            | "img"
            | "input"
            | "ins"
            | "kbd"
            | "keygen"
            | "label"
            | "legend"
            | "li"
            | "link"
            | "main"
            | "map"
            | "mark"
            | "menu"
            | "meta"
            | "meter"
            | "nav"
            | "nobr"
            | "noscript"
            | "object"
            | "ol"
            | "optgroup"
            | "option"
            | "output"
            | "p"
            | "param"
            | "pre"
            | "progress"
            | "q"
            | "rp"
            | "rt"
            | "ruby"
            | "s"
            | "samp"
            | "script"
            | "section"
            | "select"
            | "small"
            | "source"
            | "span"
            | "strong"
            | "style"
            | "sub"
            | "summary"
            | "sup"
            | "table"
            | "tbody"
            | "td"
            | "textarea"
            | "tfoot"
            | "th"
            | "thead"
            | "time"
            | "title"
            | "tr"
            | "track"
            | "u"
            | "ul"
            | "var"
            | "video"
            | "wbr"
    )
}

/// Tags that never have children, with or without a trailing `/`.
#[must_use]
pub fn is_self_closing(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "keygen"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "spacer"
            | "track"
            | "wbr"
    )
}

/// Container tags an unmatched closing tag may walk up to.
#[must_use]
pub fn is_block(tag: &str) -> bool {
    matches!(tag, "body" | "div" | "form" | "span" | "table")
}

/// Open elements implicitly closed when `tag` opens, or `None` if `tag` has
/// no optional-closing rule.
///
/// `<li>` closes an open `li`; `<td>` closes an open `td`; `<tr>` closes an
/// open `tr`, `td` or `th`.
#[must_use]
pub fn optional_closing(tag: &str) -> Option<&'static [&'static str]> {
    let closes: &'static [&'static str] = match tag {
        "tr" => &["tr", "td", "th"],
        "th" => &["th"],
        "td" => &["td"],
        "li" => &["li"],
        "dt" | "dd" | "dl" => &["dt", "dd"],
        "p" => &["p"],
        "nobr" => &["nobr"],
        "b" => &["b"],
        "option" => &["option"],
        _ => return None,
    };
    Some(closes)
}

/// Tags that must appear inside a `form`.
#[must_use]
pub fn requires_form(tag: &str) -> bool {
    matches!(
        tag,
        "input" | "select" | "textarea" | "label" | "fieldset" | "option"
    )
}

/// Tags an `option` may appear in.
#[must_use]
pub fn is_option_container(tag: &str) -> bool {
    matches!(tag, "select" | "datalist")
}
