use regex::Regex;

/// Builds the heading matcher for one numbered SDS section. Group 1 anchors
/// the boundary (start of text or a non-digit, non-dot character) so that
/// locating section 4 never fires inside "14." or "8.4". Group 2 is the
/// heading token itself: either "SEÇÃO n" or "n" followed by a separator.
fn heading_regex(number: u32) -> Regex {
    Regex::new(&format!(
        r"(?i)(^|[^0-9.])(SEÇÃO\s+{n}\b|{n}\s*[.\-])",
        n = number
    ))
    .unwrap()
}

/// Returns the slice of `text` from the first heading of `number` up to (not
/// including) the first heading of `number + 1`, or the end of text. `None`
/// when the heading is absent. Case-insensitive, spans newlines.
pub fn locate_section(text: &str, number: u32) -> Option<&str> {
    let caps = heading_regex(number).captures(text)?;
    let heading = caps.get(2)?;
    let rest = &text[heading.start()..];

    let head_len = heading.len();
    let end = heading_regex(number + 1)
        .captures(&rest[head_len..])
        .and_then(|c| c.get(2))
        .map(|m| head_len + m.start())
        .unwrap_or(rest.len());

    Some(&rest[..end])
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "4. A\nconteúdo da seção quatro\n5. B\nconteúdo da seção cinco\n6. C\nfim";

    #[test]
    fn section_ends_before_next_heading() {
        let section = locate_section(DOC, 4).unwrap();
        assert!(section.starts_with("4. A"));
        assert!(section.contains("conteúdo da seção quatro"));
        assert!(!section.contains("5. B"));
        assert!(!section.contains("seção cinco"));
    }

    #[test]
    fn last_section_runs_to_end() {
        let section = locate_section(DOC, 6).unwrap();
        assert!(section.contains("fim"));
    }

    #[test]
    fn missing_section_is_absent() {
        assert!(locate_section(DOC, 9).is_none());
    }

    #[test]
    fn does_not_match_inside_longer_numbers() {
        let text = "14. INFORMAÇÕES SOBRE TRANSPORTE\nNúmero ONU: 1830\n15. REGULAMENTAÇÕES\nfim";
        // Section 4 does not exist here; "14." must not satisfy it.
        assert!(locate_section(text, 4).is_none());
        let fourteen = locate_section(text, 14).unwrap();
        assert!(fourteen.contains("1830"));
        assert!(!fourteen.contains("REGULAMENTAÇÕES"));
    }

    #[test]
    fn boundary_skips_embedded_digits() {
        // "15 minutos" inside section 4 must not terminate a section-5 search,
        // and must not start one either.
        let text =
            "4. PRIMEIROS SOCORROS\nLavar durante 15 minutos.\n5. COMBATE A INCÊNDIO\nPó químico.";
        let four = locate_section(text, 4).unwrap();
        assert!(four.contains("15 minutos"));
        assert!(!four.contains("COMBATE"));
        let five = locate_section(text, 5).unwrap();
        assert!(five.contains("Pó químico"));
    }

    #[test]
    fn secao_prefix_heading() {
        let text = "SEÇÃO 14: Informações sobre transporte\nNúmero ONU: 1090\nSEÇÃO 15: Regulamentações";
        let section = locate_section(text, 14).unwrap();
        assert!(section.contains("1090"));
        assert!(!section.contains("Regulamentações"));
    }

    #[test]
    fn case_insensitive() {
        let text = "seção 5 - medidas\nespuma\n6. outra";
        assert!(locate_section(text, 5).unwrap().contains("espuma"));
    }
}
