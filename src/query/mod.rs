//! Query preparation for the multi-criteria search.
//!
//! The `q` parameter of the Sirene API is a Lucene-like boolean expression
//! (`etatAdministratifUniteLegale:A AND dateCreationUniteLegale:2021-03`).
//! [`normalize`] rewrites free-form input into the syntax the API accepts and
//! [`validate`] rejects structurally broken expressions before any request is
//! made. [`prepare`] chains the two.

mod normalize;
mod validate;

pub use normalize::normalize;
pub use validate::{is_operator, validate};

use crate::error::QueryError;

/// Boolean keywords recognised in queries, compared case-insensitively
pub const OPERATORS: [&str; 3] = ["AND", "OR", "NOT"];

/// Normalize then validate a query.
///
/// Returns `None` when the query is blank once normalized.
pub fn prepare(q: &str) -> Result<Option<String>, QueryError> {
    let normalized = normalize(q);
    if normalized.is_empty() {
        return Ok(None);
    }
    validate(&normalized)?;
    Ok(Some(normalized))
}
