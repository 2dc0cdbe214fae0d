//! Repairs UTF-8 text that was decoded through a Latin-1 lens somewhere in
//! the PDF toolchain ("Ã§" for "ç" and friends). Pattern-based and lossy:
//! sequences outside the table are left untouched.

/// Ordered substitution table. Constraints that keep `normalize` idempotent:
/// no target is empty or appears as (a prefix of) any key, and longer keys
/// precede the shorter keys they contain.
const SUBSTITUTIONS: &[(&str, &str)] = &[
    ("Ã¡", "á"),
    ("Ã©", "é"),
    ("Ã­", "í"),
    ("Ã³", "ó"),
    ("Ãº", "ú"),
    ("Ã¢", "â"),
    ("Ãª", "ê"),
    ("Ã´", "ô"),
    ("Ã£", "ã"),
    ("Ãµ", "õ"),
    ("Ã§", "ç"),
    ("Ã ", "à"),
    ("Ã‰", "É"),
    ("ÃŠ", "Ê"),
    ("Ã‡", "Ç"),
    ("Ãš", "Ú"),
    ("Ã€", "À"),
    ("Ã•", "Õ"),
    ("â€™", "'"),
    ("â€œ", "\""),
    ("â€“", "-"),
    ("â€", "\""),
    ("Â°", "°"),
    ("Â ", " "),
];

/// Applies the substitution table in order and trims surrounding whitespace.
/// Never fails; empty input yields an empty string.
pub fn normalize(text: &str) -> String {
    let mut out = text.to_string();
    for (from, to) in SUBSTITUTIONS {
        if out.contains(from) {
            out = out.replace(from, to);
        }
    }
    out.trim().to_string()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repairs_common_mojibake() {
        assert_eq!(normalize("Ãcido? No: Ã¡cido sulfÃºrico"), "Ãcido? No: ácido sulfúrico");
        assert_eq!(normalize("SoluÃ§Ã£o aquosa"), "Solução aquosa");
        assert_eq!(normalize("25Â°C"), "25°C");
    }

    #[test]
    fn trims_whitespace() {
        assert_eq!(normalize("  texto  \n"), "texto");
    }

    #[test]
    fn empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn idempotent() {
        let samples = [
            "Ã¡cido sulfÃºrico Â°C â€œcitaÃ§Ã£oâ€",
            "plain ascii text",
            "ÃƒÂ§ mixed garbage Ã‚Ã‚°",
            "Remover para local arejado.",
            "",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", s);
        }
    }

    #[test]
    fn untouched_text_passes_through() {
        assert_eq!(normalize("Água régia 37%"), "Água régia 37%");
    }
}
