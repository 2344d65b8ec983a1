//! Query normalizer.

use regex::Regex;
use std::sync::OnceLock;

static WHITESPACE: OnceLock<Regex> = OnceLock::new();
static OPERATOR_AFTER_PAREN: OnceLock<Regex> = OnceLock::new();
static OPERATOR_BEFORE_PAREN: OnceLock<Regex> = OnceLock::new();
static DATE_TOKEN: OnceLock<Regex> = OnceLock::new();

fn whitespace() -> &'static Regex {
    WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern"))
}

fn operator_after_paren() -> &'static Regex {
    OPERATOR_AFTER_PAREN
        .get_or_init(|| Regex::new(r"(?i)\)(AND|OR|NOT)\b").expect("operator pattern"))
}

fn operator_before_paren() -> &'static Regex {
    OPERATOR_BEFORE_PAREN
        .get_or_init(|| Regex::new(r"(?i)\b(AND|OR|NOT)\(").expect("operator pattern"))
}

fn date_token() -> &'static Regex {
    DATE_TOKEN.get_or_init(|| Regex::new(r"[0-9]{4}-[0-9]{2}(?:-([0-9]{2}))?").expect("date pattern"))
}

/// Rewrite a free-form query into the syntax accepted by the API.
///
/// - whitespace is trimmed and runs are collapsed to one space;
/// - `AND`/`OR`/`NOT` glued to a parenthesis get one space on each side;
/// - bare `YYYY-MM-DD` dates are double-quoted;
/// - bare `YYYY-MM` months become `[YYYY-MM-01 TO YYYY-MM-31]`.
///
/// Text inside double quotes is never rewritten, and neither is text inside
/// `[...]` or `{...}` ranges, so the function is idempotent. The month range
/// always ends on day 31 whatever the month length.
///
/// ```
/// use sirene_search::query::normalize;
///
/// assert_eq!(
///     normalize("dateCreationEtablissement:2020-01-15 AND(codePostal:75001)"),
///     "dateCreationEtablissement:\"2020-01-15\" AND (codePostal:75001)"
/// );
/// ```
pub fn normalize(q: &str) -> String {
    let spaced = map_unquoted(q, |segment| {
        let segment = operator_after_paren().replace_all(segment, ") $1");
        operator_before_paren()
            .replace_all(&segment, "$1 (")
            .into_owned()
    });
    let collapsed = whitespace().replace_all(spaced.trim(), " ");
    rewrite_dates(&collapsed)
}

/// Apply `f` to the parts of `q` outside double quotes.
fn map_unquoted(q: &str, f: impl Fn(&str) -> String) -> String {
    q.split('"')
        .enumerate()
        .map(|(i, segment)| {
            if i % 2 == 0 {
                f(segment)
            } else {
                segment.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\"")
}

/// Lexical position while scanning a query left to right
#[derive(Debug, Default)]
struct Scan {
    in_quotes: bool,
    range_depth: usize,
}

impl Scan {
    fn advance(&mut self, text: &str) {
        for c in text.chars() {
            match c {
                '"' => self.in_quotes = !self.in_quotes,
                '[' | '{' if !self.in_quotes => self.range_depth += 1,
                ']' | '}' if !self.in_quotes => {
                    self.range_depth = self.range_depth.saturating_sub(1)
                }
                _ => {}
            }
        }
    }

    fn is_free(&self) -> bool {
        !self.in_quotes && self.range_depth == 0
    }
}

fn is_token_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | '"')
}

fn rewrite_dates(q: &str) -> String {
    let mut out = String::with_capacity(q.len() + 16);
    let mut scan = Scan::default();
    let mut scanned = 0;
    let mut copied = 0;

    for caps in date_token().captures_iter(q) {
        let Some(m) = caps.get(0) else { continue };
        scan.advance(&q[scanned..m.start()]);
        scanned = m.start();

        let standalone = !q[..m.start()].chars().next_back().is_some_and(is_token_char)
            && !q[m.end()..].chars().next().is_some_and(is_token_char);
        if !scan.is_free() || !standalone {
            continue;
        }

        out.push_str(&q[copied..m.start()]);
        let token = m.as_str();
        if caps.get(1).is_some() {
            out.push('"');
            out.push_str(token);
            out.push('"');
        } else {
            out.push_str(&format!("[{0}-01 TO {0}-31]", token));
        }
        copied = m.end();
    }

    out.push_str(&q[copied..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_is_collapsed() {
        assert_eq!(normalize("  a:1 \t\n AND   b:2  "), "a:1 AND b:2");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_operator_spacing() {
        assert_eq!(normalize("(a:1)AND(b:2)"), "(a:1) AND (b:2)");
        assert_eq!(normalize("(a:1)or(b:2)"), "(a:1) or (b:2)");
        assert_eq!(normalize("NOT(a:1)"), "NOT (a:1)");
        // Words merely containing an operator are left alone
        assert_eq!(normalize("(a:1)ORDER"), "(a:1)ORDER");
        assert_eq!(normalize("BRAND(x)"), "BRAND(x)");
    }

    #[test]
    fn test_operators_inside_quotes_untouched() {
        assert_eq!(
            normalize("denominationUniteLegale:\"(x)AND(y)\""),
            "denominationUniteLegale:\"(x)AND(y)\""
        );
    }

    #[test]
    fn test_full_dates_are_quoted() {
        assert_eq!(
            normalize("dateCreationEtablissement:2021-01-15"),
            "dateCreationEtablissement:\"2021-01-15\""
        );
        assert_eq!(
            normalize("dateDebut:\"2021-01-15\""),
            "dateDebut:\"2021-01-15\""
        );
    }

    #[test]
    fn test_months_are_expanded() {
        assert_eq!(
            normalize("dateCreationUniteLegale:2021-02"),
            "dateCreationUniteLegale:[2021-02-01 TO 2021-02-31]"
        );
    }

    #[test]
    fn test_full_date_is_not_treated_as_month() {
        let out = normalize("dateCreationEtablissement:2019-11-05");
        assert!(!out.contains("TO"));
        assert_eq!(out.matches("\"2019-11-05\"").count(), 1);
    }

    #[test]
    fn test_only_ascii_digits_form_dates() {
        assert_eq!(normalize("x:٢٠٢١-٠١-١٥"), "x:٢٠٢١-٠١-١٥");
        assert_eq!(normalize("x:٢٠٢١-٠١"), "x:٢٠٢١-٠١");
        assert_eq!(normalize("x:2021-01-15 y:٢٠٢١-٠١-١٥"), "x:\"2021-01-15\" y:٢٠٢١-٠١-١٥");
    }

    #[test]
    fn test_ranges_left_alone() {
        let q = "dateCreationEtablissement:[2020-01-01 TO 2020-12-31]";
        assert_eq!(normalize(q), q);
        let q = "dateCreationEtablissement:{2020-01 TO 2020-06}";
        assert_eq!(normalize(q), q);
    }

    #[test]
    fn test_tokens_inside_longer_words_untouched() {
        assert_eq!(normalize("x:2021-01-15T10:00:00"), "x:2021-01-15T10:00:00");
        assert_eq!(normalize("x:12021-01"), "x:12021-01");
        assert_eq!(normalize("x:2021-015"), "x:2021-015");
    }

    #[test]
    fn test_mixed_query() {
        assert_eq!(
            normalize("(etatAdministratifEtablissement:A)AND dateCreationEtablissement:2022-05 OR dateDebut:2022-06-30"),
            "(etatAdministratifEtablissement:A) AND dateCreationEtablissement:[2022-05-01 TO 2022-05-31] OR dateDebut:\"2022-06-30\""
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "  a:1   AND b:2 ",
            "(a:1)AND(b:2)",
            "dateCreationEtablissement:2021-01-15 OR dateCreationUniteLegale:2021-02",
            "x:\"2021-01-15\" AND y:[2021-01-01 TO 2021-02-01]",
            "unbalanced \"quote 2021-03 and 2021-03-04",
            "2021-03-04 \"tail",
            "NOT(a:2020-01)",
            "",
        ];
        for q in samples {
            let once = normalize(q);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", q);
        }
    }
}
