//! Structural query validation.

use super::OPERATORS;
use crate::error::QueryError;

/// Whether a token is one of the boolean keywords
pub fn is_operator(token: &str) -> bool {
    OPERATORS.iter().any(|op| op.eq_ignore_ascii_case(token))
}

/// Reject queries that the API would refuse on structure alone.
///
/// Checks that parentheses counts match and that boolean operators are
/// neither leading, trailing nor adjacent. Meant to run on the output of
/// [`normalize`](super::normalize). Text inside double quotes is ignored.
pub fn validate(q: &str) -> Result<(), QueryError> {
    let (open, close) = count_parentheses(q);
    if open != close {
        return Err(QueryError::UnbalancedParentheses { open, close });
    }

    let operators = operator_flags(q);

    if let Some((token, true)) = operators.first() {
        return Err(QueryError::LeadingOperator(token.to_string()));
    }
    if let Some((token, true)) = operators.last() {
        return Err(QueryError::TrailingOperator(token.to_string()));
    }
    for pair in operators.windows(2) {
        if let [(first, true), (second, true)] = pair {
            return Err(QueryError::ConsecutiveOperators(
                first.to_string(),
                second.to_string(),
            ));
        }
    }

    Ok(())
}

fn count_parentheses(q: &str) -> (usize, usize) {
    let mut in_quotes = false;
    let (mut open, mut close) = (0, 0);
    for c in q.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            '(' if !in_quotes => open += 1,
            ')' if !in_quotes => close += 1,
            _ => {}
        }
    }
    (open, close)
}

/// Whitespace-separated tokens, each flagged when it is an operator outside quotes
fn operator_flags(q: &str) -> Vec<(&str, bool)> {
    let mut in_quotes = false;
    q.split_whitespace()
        .map(|token| {
            let flagged = !in_quotes && is_operator(token);
            if token.matches('"').count() % 2 == 1 {
                in_quotes = !in_quotes;
            }
            (token, flagged)
        })
        .collect()
}
