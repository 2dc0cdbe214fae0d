//! Ordered-fallback field extraction. Pattern lists are tried in order and
//! the first non-empty, accepted capture wins; a match that fails validation
//! moves on to the next pattern rather than aborting the field.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::normalize::normalize;

static H_CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bH\d{3}\b").unwrap());
static HAZARD_CLASS_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d(\.\d+)?$").unwrap());

/// First capture group of the first matching pattern, normalized. Empty
/// captures are skipped.
pub fn first_match(scope: &str, patterns: &[Regex]) -> Option<String> {
    first_match_map(scope, patterns, Some)
}

/// As `first_match`, but each candidate must pass `accept`.
pub fn first_match_where(
    scope: &str,
    patterns: &[Regex],
    accept: impl Fn(&str) -> bool,
) -> Option<String> {
    first_match_map(scope, patterns, |v| accept(&v).then_some(v))
}

/// As `first_match`, with a per-candidate cleanup step that may reshape the
/// value or reject it (returning `None` tries the next pattern).
pub fn first_match_map(
    scope: &str,
    patterns: &[Regex],
    map: impl Fn(String) -> Option<String>,
) -> Option<String> {
    for re in patterns {
        let Some(caps) = re.captures(scope) else {
            continue;
        };
        let Some(m) = caps.get(1) else { continue };
        let value = normalize(m.as_str());
        if value.is_empty() {
            continue;
        }
        if let Some(mapped) = map(value) {
            return Some(mapped);
        }
    }
    None
}

/// UN transport numbers are four digits in [1000, 9999]; anything else is an
/// implausible capture (page number, year) and is rejected.
pub fn valid_un_number(s: &str) -> bool {
    s.len() == 4
        && s.parse::<u32>()
            .is_ok_and(|n| (1000..=9999).contains(&n))
}

pub fn valid_hazard_class(s: &str) -> bool {
    HAZARD_CLASS_SHAPE.is_match(s)
}

/// Kemler / hazard-identification numbers carry two or three digits.
pub fn valid_risk_number(s: &str) -> bool {
    (2..=3).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
}

/// Collects every GHS hazard statement code in the document, deduplicated
/// and uppercased. Unlike the other fields this scans the whole text, not
/// just the first match.
pub fn collect_h_codes(text: &str) -> BTreeSet<String> {
    H_CODE_RE
        .find_iter(text)
        .map(|m| m.as_str().to_uppercase())
        .collect()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(patterns: &[&str]) -> Vec<Regex> {
        patterns.iter().map(|p| Regex::new(p).unwrap()).collect()
    }

    #[test]
    fn first_pattern_in_order_wins() {
        let patterns = compile(&[r"specific:(\w+)", r"generic:(\w+)"]);
        let text = "generic:b specific:a";
        assert_eq!(first_match(text, &patterns).as_deref(), Some("a"));
    }

    #[test]
    fn rejected_capture_falls_through() {
        let patterns = compile(&[r"Página\s+(\d{4})", r"ONU\s*:\s*(\d{4})"]);
        let text = "Página 0003\nONU: 1830";
        let got = first_match_where(text, &patterns, valid_un_number);
        assert_eq!(got.as_deref(), Some("1830"));
    }

    #[test]
    fn empty_capture_is_skipped() {
        let patterns = compile(&[r"Nome:\s*(\S*)", r"Produto:\s*(\S+)"]);
        assert_eq!(
            first_match("Nome: \nProduto: Acetona", &patterns).as_deref(),
            Some("Acetona")
        );
    }

    #[test]
    fn un_number_bounds() {
        assert!(valid_un_number("1830"));
        assert!(valid_un_number("1000"));
        assert!(valid_un_number("9999"));
        assert!(!valid_un_number("0999"));
        assert!(!valid_un_number("10000"));
        assert!(!valid_un_number("12a4"));
        assert!(!valid_un_number(""));
    }

    #[test]
    fn hazard_class_shape() {
        assert!(valid_hazard_class("3"));
        assert!(valid_hazard_class("8.1"));
        assert!(valid_hazard_class("5.1"));
        assert!(!valid_hazard_class("III"));
        assert!(!valid_hazard_class("8."));
        assert!(!valid_hazard_class("80"));
    }

    #[test]
    fn risk_number_length() {
        assert!(valid_risk_number("80"));
        assert!(valid_risk_number("336"));
        assert!(!valid_risk_number("8"));
        assert!(!valid_risk_number("1830"));
        assert!(!valid_risk_number("8a"));
    }

    #[test]
    fn h_codes_deduplicated_and_uppercased() {
        let codes = collect_h_codes("H314 H315 h314");
        assert_eq!(codes.len(), 2);
        assert!(codes.contains("H314"));
        assert!(codes.contains("H315"));
    }

    #[test]
    fn h_codes_respect_word_boundaries() {
        let codes = collect_h_codes("H3145 XH314 H22");
        assert!(codes.is_empty());
    }

    #[test]
    fn captures_are_normalized() {
        let patterns = compile(&[r"Nome do produto:\s*([^\n]+)"]);
        let got = first_match("Nome do produto: SoluÃ§Ã£o tampÃ£o  ", &patterns);
        assert_eq!(got.as_deref(), Some("Solução tampão"));
    }
}
