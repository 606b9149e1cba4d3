use std::ops::Range;

use serde_json::{Map, Value};

const QUOTE_ENTITY: &str = "&quot;";

/// A brace-delimited span found in model output, e.g. `{"Ref": "https://..."}`.
///
/// Tokens never nest: a token closes at the first `}` and opens at the last `{`
/// seen before it. A `{` with no closing brace after it is plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationToken<'a> {
    pub span: Range<usize>,
    pub raw: &'a str,
}

impl<'a> CitationToken<'a> {
    /// Decode `&quot;` entities and parse the body as a single-level JSON object.
    /// Pair order follows the token text.
    pub fn parse(&self) -> Option<Map<String, Value>> {
        let decoded = decode_quote_entities(self.raw);
        match serde_json::from_str::<Value>(&decoded) {
            Ok(Value::Object(pairs)) => Some(pairs),
            _ => None,
        }
    }

    /// `(key, value)` when the token holds exactly one pair with a string value.
    pub fn single_citation(&self) -> Option<(String, String)> {
        let pairs = self.parse()?;
        if pairs.len() != 1 {
            return None;
        }
        match pairs.into_iter().next()? {
            (key, Value::String(value)) => Some((key, value)),
            _ => None,
        }
    }
}

pub fn decode_quote_entities(raw: &str) -> String {
    raw.replace(QUOTE_ENTITY, "\"")
}

/// Scan `text` for brace tokens, left to right, non-overlapping.
pub fn scan_tokens(text: &str) -> Vec<CitationToken<'_>> {
    // Braces are ASCII, so byte offsets are always char boundaries.
    let mut out = Vec::new();
    let mut open: Option<usize> = None;
    for (i, b) in text.bytes().enumerate() {
        match b {
            b'{' => open = Some(i),
            b'}' => {
                if let Some(start) = open.take() {
                    out.push(CitationToken {
                        span: start..i + 1,
                        raw: &text[start..i + 1],
                    });
                }
            }
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raws(text: &str) -> Vec<&str> {
        scan_tokens(text).into_iter().map(|t| t.raw).collect()
    }

    #[test]
    fn scans_non_overlapping_tokens_in_order() {
        assert_eq!(
            raws(r#"a {"x":"1"} b {"y":"2"} c"#),
            vec![r#"{"x":"1"}"#, r#"{"y":"2"}"#]
        );
    }

    #[test]
    fn unmatched_braces_are_text() {
        assert!(raws(r#"analysis {"Ref" unterminated"#).is_empty());
        assert!(raws("closing only } here").is_empty());
        assert_eq!(raws("a { b {c} d }"), vec!["{c}"]);
    }

    #[test]
    fn spans_are_byte_ranges_into_unicode_text() {
        let text = r#"수치 {"보건복지부":"https://a"} 끝"#;
        let tokens = scan_tokens(text);
        assert_eq!(tokens.len(), 1);
        assert_eq!(&text[tokens[0].span.clone()], tokens[0].raw);
    }

    #[test]
    fn parses_entity_escaped_tokens() {
        let tokens = scan_tokens("{&quot;Ref&quot;: &quot;https://r&quot;}");
        assert_eq!(
            tokens[0].single_citation(),
            Some(("Ref".to_string(), "https://r".to_string()))
        );
    }

    #[test]
    fn single_citation_rejects_other_shapes() {
        let multi = scan_tokens(r#"{"a":"1","b":"2"}"#);
        assert!(multi[0].parse().is_some());
        assert_eq!(multi[0].single_citation(), None);

        let numeric = scan_tokens(r#"{"a":1}"#);
        assert_eq!(numeric[0].single_citation(), None);

        let prose = scan_tokens("{not json}");
        assert_eq!(prose[0].parse(), None);
    }
}
