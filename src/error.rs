//! Error types for Sirene operations.

use thiserror::Error;

use crate::config::ConfigError;

/// Structural problems found in a search query before it is sent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("unbalanced parentheses: {open} opening, {close} closing")]
    UnbalancedParentheses { open: usize, close: usize },

    #[error("query starts with boolean operator '{0}'")]
    LeadingOperator(String),

    #[error("query ends with boolean operator '{0}'")]
    TrailingOperator(String),

    #[error("consecutive boolean operators '{0} {1}'")]
    ConsecutiveOperators(String, String),
}

/// Errors returned by the Sirene client.
#[derive(Debug, Error)]
pub enum SireneError {
    /// Configuration could not be assembled
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Endpoint kind is not one of the supported resource roots
    #[error("invalid endpoint '{0}', expected 'siret' or 'siren'")]
    InvalidEndpoint(String),

    /// Query rejected by the validator
    #[error("invalid query: {0}")]
    InvalidQuery(#[from] QueryError),

    /// The provider kept answering 429 for every attempt on one page
    #[error("rate limit (429) still signalled after {attempts} attempts")]
    RateLimitExceeded { attempts: u32 },

    /// Any unsuccessful status other than 404 and 429
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Transport failure (timeout, connection refused, TLS...)
    #[error("Network error: {0}")]
    Network(String),

    /// Response body was not the expected JSON
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for SireneError {
    fn from(err: reqwest::Error) -> Self {
        SireneError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SireneError {
    fn from(err: serde_json::Error) -> Self {
        SireneError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SireneError::Http {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 500: boom");

        let err = SireneError::from(QueryError::UnbalancedParentheses { open: 2, close: 1 });
        assert_eq!(
            err.to_string(),
            "invalid query: unbalanced parentheses: 2 opening, 1 closing"
        );

        let err = SireneError::RateLimitExceeded { attempts: 5 };
        assert!(err.to_string().contains("5 attempts"));
    }
}
