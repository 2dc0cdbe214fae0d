use std::path::Path;

use anyhow::{Context, Result};

use crate::normalize::normalize;

/// Extracts the text layer of a PDF already in memory. Scanned sheets with no
/// text layer come back (near-)empty and simply extract nothing downstream.
pub fn text_from_pdf_bytes(bytes: &[u8]) -> Result<String> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| anyhow::anyhow!("failed to extract text from PDF: {e}"))?;
    Ok(normalize(&text))
}

/// Reads one sheet from disk: PDFs go through text extraction, anything else
/// is treated as plain text. Output is encoding-normalized either way.
pub fn read_document(path: &Path) -> Result<String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("pdf") => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            text_from_pdf_bytes(&bytes)
        }
        _ => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Ok(normalize(&text))
        }
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_file_is_read_and_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.txt");
        std::fs::write(&path, "Nome do produto: SoluÃ§Ã£o tampÃ£o\n").unwrap();
        let text = read_document(&path).unwrap();
        assert_eq!(text, "Nome do produto: Solução tampão");
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = read_document(Path::new("/nonexistent/sheet.pdf")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn garbage_pdf_bytes_are_an_error() {
        assert!(text_from_pdf_bytes(b"not a pdf at all").is_err());
    }
}
