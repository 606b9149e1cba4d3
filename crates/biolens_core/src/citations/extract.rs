use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::token::scan_tokens;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CitationLink {
    pub name: String,
    pub url: String,
}

/// Model output with its citation tokens lifted out.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Extraction {
    pub text: String,
    pub links: Vec<CitationLink>,
}

/// Strip every parseable citation token from `text` and collect its string pairs
/// as links, in order of appearance.
///
/// Tokens that fail to parse stay in the text. Pairs with non-string values are
/// not emitted, but their token is still removed. The result is trimmed only
/// when at least one token was removed.
pub fn extract_citations(text: &str) -> Extraction {
    let mut links = Vec::new();
    let mut cleaned = String::with_capacity(text.len());
    let mut cursor = 0usize;
    let mut removed = false;

    for token in scan_tokens(text) {
        let Some(pairs) = token.parse() else {
            warn!(token = token.raw, "citation token did not parse; keeping it as text");
            continue;
        };
        for (name, value) in pairs {
            if let Value::String(url) = value {
                links.push(CitationLink { name, url });
            }
        }
        cleaned.push_str(&text[cursor..token.span.start]);
        cursor = token.span.end;
        removed = true;
    }

    if !removed {
        return Extraction {
            text: text.to_string(),
            links,
        };
    }
    cleaned.push_str(&text[cursor..]);
    Extraction {
        text: cleaned.trim().to_string(),
        links,
    }
}
