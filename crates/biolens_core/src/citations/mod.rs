//! Citation markers emitted inline by the model, e.g. `{"보건복지부 고시": "https://..."}`.
//!
//! Both routines share one token grammar ([`token::scan_tokens`]) and never fail:
//! anything that does not parse is left in the text.

mod dedup;
mod extract;
pub mod token;

pub use dedup::{dedup_citations, dedup_citations_indexed, CitationIndex, Deduplicated};
pub use extract::{extract_citations, CitationLink, Extraction};
