//! Salary normalization: scraped free text to an optional amount.
//!
//! Inputs look like "S/ 2,500.00 (aprox)", "1.500", "2500,50" or prose such
//! as "no especificado". Anything without a readable numeral resolves to
//! `None` and the record keeps flowing with the salary unset.

use std::sync::LazyLock;

use regex::Regex;

static PARENTHESIZED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(.*?\)").unwrap());
static NUMERAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d[\d.,]*").unwrap());

/// Parse one salary field. Parenthesized qualifiers are dropped first, then
/// the first numeral run is read under these separator rules:
/// both '.' and ',' present means the later one is the decimal mark; a lone
/// '.' groups thousands; a lone ',' is the decimal mark.
pub fn parse(raw: &str) -> Option<f64> {
    let stripped = PARENTHESIZED.replace_all(raw, "");
    let numeral = NUMERAL.find(&stripped)?.as_str();

    let plain = match (numeral.rfind('.'), numeral.rfind(',')) {
        (Some(dot), Some(comma)) if dot > comma => numeral.replace(',', ""),
        (Some(_), Some(_)) => numeral.replace('.', "").replace(',', "."),
        (Some(_), None) => numeral.replace('.', ""),
        (None, Some(_)) => numeral.replace(',', "."),
        (None, None) => numeral.to_string(),
    };

    plain.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_with_qualifier() {
        assert_eq!(parse("S/ 2,500.00 (aprox)"), Some(2500.0));
    }

    #[test]
    fn european_style() {
        assert_eq!(parse("S/ 2.500,50"), Some(2500.5));
        assert_eq!(parse("1.500"), Some(1500.0));
    }

    #[test]
    fn lone_comma_is_decimal() {
        assert_eq!(parse("2500,50 mensual"), Some(2500.5));
    }

    #[test]
    fn grouped_thousands() {
        assert_eq!(parse("S/. 1.234.567"), Some(1_234_567.0));
    }

    #[test]
    fn prose_and_empty_are_unset() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("no especificado"), None);
        assert_eq!(parse("a convenir"), None);
    }

    #[test]
    fn multiple_decimal_marks_are_unset() {
        assert_eq!(parse("1,2,3"), None);
    }

    #[test]
    fn takes_first_numeral_run() {
        assert_eq!(parse("entre 1800 y 2200"), Some(1800.0));
    }

    #[test]
    fn trailing_separator_still_parses() {
        assert_eq!(parse("2500,"), Some(2500.0));
    }
}
