//! String helpers for writing attribute values and URLs.
use std::borrow::Cow;

/// Quotes an attribute value so the tag grammar reads it back unchanged.
///
/// Double quotes are preferred, single quotes are used when the value contains a double quote
/// but no single quote, and otherwise double quotes and backslashes are escaped.
pub fn escape_attrvalue(value: &str) -> String {
    if !value.contains('"') {
        format!("\"{}\"", escape_backslashes(value, None))
    } else if !value.contains('\'') {
        format!("'{}'", escape_backslashes(value, None))
    } else {
        format!("\"{}\"", escape_backslashes(value, Some('"')))
    }
}

/// Escapes backslashes that the grammar would otherwise read as an escape, plus `quote`.
fn escape_backslashes(value: &str, quote: Option<char>) -> Cow<'_, str> {
    if !value.contains('\\') && quote.map_or(true, |q| !value.contains(q)) {
        return Cow::Borrowed(value);
    }

    let mut out = String::with_capacity(value.len() + 4);
    for c in value.chars() {
        if c == '\\' || Some(c) == quote {
            out.push('\\');
        }
        out.push(c);
    }
    Cow::Owned(out)
}

/// HTML-escapes text content.
pub fn escape_html(text: &str) -> Cow<'_, str> {
    html_escape::encode_safe(text)
}

/// HTML-escapes a value for use inside a double-quoted attribute.
pub fn escape_html_attr(text: &str) -> Cow<'_, str> {
    html_escape::encode_double_quoted_attribute(text)
}

const UNSAFE_SCHEMES: &[&str] = &["javascript:", "vbscript:", "data:"];

/// Trims `url` and rejects schemes that can run script. Relative URLs pass.
pub fn sanitize_url(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }

    // Browsers ignore whitespace and control characters inside a scheme.
    let normalized: String = url
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .take(16)
        .collect::<String>()
        .to_ascii_lowercase();

    if UNSAFE_SCHEMES
        .iter()
        .any(|scheme| normalized.starts_with(scheme))
    {
        return None;
    }

    Some(url.to_owned())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("plain", "\"plain\"")]
    #[case("he said \"hi\"", "'he said \"hi\"'")]
    #[case("it's", "\"it's\"")]
    #[case("it's \"x\"", "\"it's \\\"x\\\"\"")]
    #[case("a\\b", "\"a\\\\b\"")]
    #[case("say \"hi\\\"", "'say \"hi\\\\\"'")]
    #[case("", "\"\"")]
    fn attribute_quoting(#[case] value: &str, #[case] expected: &str) {
        assert_eq!(escape_attrvalue(value), expected);
    }

    #[test]
    fn quoted_values_read_back() {
        use crate::parser::{parse_tag, TokenizerConfig};

        for value in [
            "he said \"hi\"",
            "it's \"x\"",
            "back\\slash",
            "mixed '\\\" end",
            "trailing\\",
            "it's\\",
        ] {
            let tag = format!("[t k={}]", escape_attrvalue(value));
            let decl = parse_tag(&tag, 0, &TokenizerConfig::default()).unwrap();
            assert_eq!(decl.attributes["k"], value, "{tag}");
        }
    }

    #[test]
    fn html_is_escaped() {
        assert_eq!(escape_html("<b>&"), "&lt;b&gt;&amp;");
        assert_eq!(escape_html_attr("a\"b"), "a&quot;b");
    }

    #[rstest]
    #[case("http://example.com", Some("http://example.com"))]
    #[case("  /relative/path ", Some("/relative/path"))]
    #[case("mailto:me@example.com", Some("mailto:me@example.com"))]
    #[case("javascript:alert(1)", None)]
    #[case("JavaScript:alert(1)", None)]
    #[case("java\tscript:alert(1)", None)]
    #[case("data:text/html;base64,xx", None)]
    #[case("   ", None)]
    fn url_sanitizing(#[case] url: &str, #[case] expected: Option<&str>) {
        assert_eq!(sanitize_url(url).as_deref(), expected);
    }
}
