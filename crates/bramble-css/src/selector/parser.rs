//! Parsing of `find` query strings.
//!
//! The grammar is deliberately forgiving: characters that cannot start a
//! step component act as separators, and a query that yields no steps simply
//! matches nothing.

use std::iter::Peekable;
use std::str::Chars;

use bramble_dom::attributes::CLASS;

use super::{AttributeTest, Operator, Selector, SelectorStep};

type Input<'a> = Peekable<Chars<'a>>;

/// Characters allowed in tag and attribute names.
const fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ':') || !c.is_ascii()
}

/// Characters allowed in `#id` and `.class` shorthands.
const fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-') || !c.is_ascii()
}

fn take_while(chars: &mut Input<'_>, accept: impl Fn(char) -> bool) -> String {
    let mut out = String::new();
    while let Some(c) = chars.next_if(|&c| accept(c)) {
        out.push(c);
    }
    out
}

fn skip_whitespace(chars: &mut Input<'_>) {
    while chars.next_if(|c| c.is_whitespace()).is_some() {}
}

impl AttributeTest {
    fn equals(key: &str, value: String) -> Self {
        Self {
            key: key.to_owned(),
            value: Some(value),
            operator: Operator::Equals,
            negated: false,
        }
    }
}

/// Parse a raw query into a [`Selector`].
///
/// Supports:
/// - Tag steps: `div`, `*`
/// - Shorthands: `#id`, `.class`, chained as in `a.external#home`
/// - Attribute tests: `[href]`, `[!href]`, `[@href]`, `[type=text]`,
///   `[title!="x"]`, `[href^=http]`, `[src$='.png']`, `[class*=NAV]`
/// - Positions: `li[2]`
/// - Descendant chains separated by whitespace or `/`
/// - Alternatives separated by `,`
///
/// Never fails; unsupported syntax is skipped.
#[must_use]
pub fn parse_selector(raw: &str) -> Selector {
    let mut alternatives = Vec::new();
    let mut steps: Vec<SelectorStep> = Vec::new();
    let mut step: Option<SelectorStep> = None;
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '#' | '.' => {
                let ident = take_while(&mut chars, is_ident_char);
                if !ident.is_empty() {
                    let key = if c == '#' { "id" } else { CLASS };
                    step.get_or_insert_with(SelectorStep::default)
                        .tests
                        .push(AttributeTest::equals(key, ident));
                }
            }
            '[' => parse_bracket(&mut chars, step.get_or_insert_with(SelectorStep::default)),
            ',' => {
                steps.extend(step.take());
                if !steps.is_empty() {
                    alternatives.push(std::mem::take(&mut steps));
                }
            }
            c if c == '*' || is_name_char(c) => {
                let mut tag = String::from(c);
                tag.push_str(&take_while(&mut chars, |c| c == '*' || is_name_char(c)));
                step.get_or_insert_with(SelectorStep::default).tag =
                    (tag != "*").then_some(tag);
            }
            // Whitespace, `/` and anything unsupported end the current step.
            _ => steps.extend(step.take()),
        }
    }

    steps.extend(step.take());
    if !steps.is_empty() {
        alternatives.push(steps);
    }
    Selector { alternatives }
}

/// Parse the inside of `[...]`; the opening bracket is already consumed.
fn parse_bracket(chars: &mut Input<'_>, step: &mut SelectorStep) {
    skip_whitespace(chars);
    let _ = chars.next_if_eq(&'@');
    let negated = chars.next_if_eq(&'!').is_some();
    let key = take_while(chars, is_name_char);
    skip_whitespace(chars);

    let operator = match chars.next_if(|c| matches!(c, '=' | '!' | '^' | '$' | '*')) {
        None => None,
        Some('=') => Some(Operator::Equals),
        Some(prefix) => chars
            .next_if_eq(&'=')
            .and_then(|_| format!("{prefix}=").parse::<Operator>().ok()),
    };

    let value = operator.map(|_| parse_value(chars));

    // Skip to the closing bracket, whatever is left.
    for c in chars.by_ref() {
        if c == ']' {
            break;
        }
    }

    if key.is_empty() {
        return;
    }
    if operator.is_none() && !negated && key.bytes().all(|b| b.is_ascii_digit()) {
        step.position = key.parse().ok();
        return;
    }
    step.tests.push(AttributeTest {
        key,
        value,
        operator: operator.unwrap_or(Operator::Equals),
        negated,
    });
}

/// A quoted or bare value up to the closing bracket.
fn parse_value(chars: &mut Input<'_>) -> String {
    skip_whitespace(chars);
    if let Some(quote) = chars.next_if(|c| matches!(c, '"' | '\'')) {
        return take_while(chars, |c| c != quote);
    }
    take_while(chars, |c| c != ']').trim_end().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_punctuation_separates_steps() {
        let selector = parse_selector("ul > li");
        assert_eq!(selector.alternatives.len(), 1);
        assert_eq!(selector.alternatives[0].len(), 2);
    }

    #[test]
    fn test_unterminated_bracket() {
        let selector = parse_selector("a[href=\"x");
        let test = &selector.alternatives[0][0].tests[0];
        assert_eq!(test.key, "href");
        assert_eq!(test.value.as_deref(), Some("x"));
    }

    #[test]
    fn test_bare_operator_without_equals_is_presence() {
        let selector = parse_selector("a[href^]");
        let test = &selector.alternatives[0][0].tests[0];
        assert_eq!(test.value, None);
        assert_eq!(test.operator, Operator::Equals);
    }
}
