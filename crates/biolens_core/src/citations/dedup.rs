use std::collections::HashMap;

use tracing::debug;

use super::extract::CitationLink;
use super::token::scan_tokens;

/// Ordered map of citation key to its first-seen value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CitationIndex {
    entries: Vec<CitationLink>,
    positions: HashMap<String, usize>,
}

impl CitationIndex {
    /// Record `key` unless it is already known. Returns `false` for a repeat;
    /// the stored value is never replaced.
    pub fn record(&mut self, key: &str, value: &str) -> bool {
        if self.positions.contains_key(key) {
            return false;
        }
        self.positions.insert(key.to_string(), self.entries.len());
        self.entries.push(CitationLink {
            name: key.to_string(),
            url: value.to_string(),
        });
        true
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.positions
            .get(key)
            .map(|&i| self.entries[i].url.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn links(&self) -> &[CitationLink] {
        &self.entries
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deduplicated {
    pub text: String,
    pub references: CitationIndex,
}

/// Remove repeated single-pair citation tokens, keeping the first mention of each key.
pub fn dedup_citations(text: &str) -> String {
    dedup_citations_indexed(text).text
}

/// Like [`dedup_citations`], also returning the references in first-seen order.
///
/// Only tokens holding exactly one string pair take part. A repeat is deleted at
/// its own position whatever its value is; surrounding whitespace is left as is.
pub fn dedup_citations_indexed(text: &str) -> Deduplicated {
    let mut references = CitationIndex::default();
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0usize;

    for token in scan_tokens(text) {
        let Some((key, value)) = token.single_citation() else {
            continue;
        };
        if references.record(&key, &value) {
            continue;
        }
        debug!(key = %key, "dropping repeated citation");
        out.push_str(&text[cursor..token.span.start]);
        cursor = token.span.end;
    }

    out.push_str(&text[cursor..]);
    Deduplicated {
        text: out,
        references,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn keeps_first_of_identical_tokens() {
        let input = r#"정상입니다 {"보건복지부":"https://a"} 추가로 {"보건복지부":"https://a"} 참고"#;
        assert_eq!(
            dedup_citations(input),
            r#"정상입니다 {"보건복지부":"https://a"} 추가로  참고"#
        );
    }

    #[test]
    fn first_value_is_authoritative() {
        let input = r#"a {"K": "https://v1"} b {"K": "https://v2"} c"#;
        let out = dedup_citations_indexed(input);
        assert_eq!(out.text, r#"a {"K": "https://v1"} b  c"#);
        assert_eq!(out.references.get("K"), Some("https://v1"));
        assert_eq!(out.references.len(), 1);
    }

    #[test]
    fn distinct_keys_are_untouched() {
        let input = r#"{"A":"1"} and {"B":"2"} and {"C":"3"}"#;
        let out = dedup_citations_indexed(input);
        assert_eq!(out.text, input);
        let names: Vec<&str> = out.references.links().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn ignores_multi_pair_and_malformed_tokens() {
        let input = r#"{"A":"1","B":"2"} {"A":"1","B":"2"} {oops} {oops}"#;
        assert_eq!(dedup_citations(input), input);
    }

    #[test]
    fn entity_escaped_repeat_counts_as_same_key() {
        let input = r#"{"R":"https://r"} then {&quot;R&quot;:&quot;https://r&quot;}!"#;
        assert_eq!(dedup_citations(input), r#"{"R":"https://r"} then !"#);
    }
}
