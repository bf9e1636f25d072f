//! An in-memory style resolver.
//!
//! Holds a class → rule-text table and answers `css_for_markup` by scanning
//! the fragment for `class="…"` attributes, exactly the contract the engine
//! expects from the hosting document's stylesheets.

use tr_core::surface::StyleResolver;
use winnow::combinator::{alt, delimited};
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::token::{take_till, take_until};

#[derive(Debug, Default)]
pub struct StaticStyles {
    rules: Vec<(String, String)>,
}

impl StaticStyles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule for a class name (builder style).
    pub fn rule(mut self, class: &str, css: &str) -> Self {
        self.rules.push((class.to_string(), css.to_string()));
        self
    }
}

impl StyleResolver for StaticStyles {
    fn css_for_markup(&self, markup: &str) -> String {
        let classes = extract_classes(markup);
        self.rules
            .iter()
            .filter(|(class, _)| classes.iter().any(|c| c == class))
            .map(|(_, css)| css.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// One quoted attribute value: `"a b"` or `'a b'`.
fn quoted_value<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    alt((
        delimited('"', take_till(0.., '"'), '"'),
        delimited('\'', take_till(0.., '\''), '\''),
    ))
    .parse_next(input)
}

/// Collect every class name referenced by `class="…"` attributes in the
/// fragment, in document order.
fn extract_classes(markup: &str) -> Vec<String> {
    let mut classes = Vec::new();
    let mut rest = markup;
    loop {
        if take_until::<_, _, ContextError>(0.., "class=")
            .parse_next(&mut rest)
            .is_err()
        {
            break;
        }
        rest = &rest["class=".len()..];
        if let Ok(value) = quoted_value.parse_next(&mut rest) {
            classes.extend(value.split_whitespace().map(str::to_string));
        }
    }
    classes
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn extracts_classes_from_both_quote_styles() {
        let classes =
            extract_classes(r#"<div class="badge hot"><span class='count'>3</span></div>"#);
        assert_eq!(classes, vec!["badge", "hot", "count"]);
    }

    #[test]
    fn resolves_only_referenced_rules() {
        let styles = StaticStyles::new()
            .rule("badge", ".badge { background: gold; }")
            .rule("count", ".count { font-weight: bold; }")
            .rule("unused", ".unused { display: none; }");

        let css = styles.css_for_markup(r#"<div class="badge"><i class="count"></i></div>"#);
        assert!(css.contains(".badge { background: gold; }"));
        assert!(css.contains(".count { font-weight: bold; }"));
        assert!(!css.contains("unused"));
    }

    #[test]
    fn fragment_without_classes_resolves_to_nothing() {
        let styles = StaticStyles::new().rule("badge", ".badge {}");
        assert_eq!(styles.css_for_markup("<div>plain</div>"), "");
    }
}
