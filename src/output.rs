//! File-based JSON outputs: one pruned record per document, a consolidated
//! batch document, and the cleanup pass for stray outputs.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::record::{now_rfc3339, ExtractedRecord};

#[derive(Serialize)]
struct Consolidated<'a> {
    processed_at: String,
    total_count: usize,
    count_with_un_number: usize,
    records: &'a [ExtractedRecord],
}

pub const CONSOLIDATED_FILE: &str = "consolidated.json";

/// Writes the per-document JSON next to the batch's other outputs, named
/// after the source file. Error stubs are written too, for auditing.
pub fn write_record(out_dir: &Path, record: &ExtractedRecord) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    let base = Path::new(&record.source_file)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    let path = out_dir.join(format!("{base}.json"));
    let json = serde_json::to_string_pretty(record)?;
    fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

pub fn write_consolidated(out_dir: &Path, records: &[ExtractedRecord]) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    let doc = Consolidated {
        processed_at: now_rfc3339(),
        total_count: records.len(),
        count_with_un_number: records.iter().filter(|r| r.un_number().is_some()).count(),
        records,
    };
    let path = out_dir.join(CONSOLIDATED_FILE);
    let json = serde_json::to_string_pretty(&doc)?;
    fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
    info!(
        "Consolidated {} records ({} with UN number) into {}",
        doc.total_count,
        doc.count_with_un_number,
        path.display()
    );
    Ok(path)
}

/// Removes per-document outputs that carry neither minimum data nor an error
/// to audit. The consolidated document and test outputs are left alone; files
/// that fail to parse are skipped, not deleted.
pub fn cleanup_invalid(out_dir: &Path) -> Result<usize> {
    let mut removed = 0;
    let entries = match fs::read_dir(out_dir) {
        Ok(entries) => entries,
        Err(_) => return Ok(0),
    };
    for entry in entries {
        let path = entry?.path();
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n,
            None => continue,
        };
        if !name.ends_with(".json") || name == CONSOLIDATED_FILE || name.starts_with("test_") {
            continue;
        }
        let record: ExtractedRecord = match fs::read_to_string(&path)
            .ok()
            .and_then(|data| serde_json::from_str(&data).ok())
        {
            Some(record) => record,
            None => continue,
        };
        if record.error.is_none() && !record.is_eligible() {
            match fs::remove_file(&path) {
                Ok(()) => {
                    removed += 1;
                    info!("Removed output without minimum data: {name}");
                }
                Err(e) => warn!("Failed to remove {name}: {e}"),
            }
        }
    }
    Ok(removed)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Identification;

    fn record(source_file: &str, un_number: Option<&str>) -> ExtractedRecord {
        let mut rec = ExtractedRecord {
            source_file: source_file.into(),
            processed_at: now_rfc3339(),
            identification: Some(Identification {
                un_number: un_number.map(String::from),
                ..Default::default()
            }),
            first_aid: None,
            fire_fighting: None,
            physical_properties: None,
            transport_info: None,
            handling_storage: None,
            error: None,
        };
        rec.prune();
        rec
    }

    #[test]
    fn per_document_file_named_after_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_record(dir.path(), &record("fispq_001_etanol.pdf", Some("1170"))).unwrap();
        assert_eq!(path.file_name().unwrap(), "fispq_001_etanol.json");
        let data = fs::read_to_string(path).unwrap();
        assert!(data.contains("1170"));
    }

    #[test]
    fn consolidated_counts() {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![
            record("a.pdf", Some("1170")),
            record("b.pdf", None),
        ];
        let path = write_consolidated(dir.path(), &records).unwrap();
        let doc: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(doc["total_count"], 2);
        assert_eq!(doc["count_with_un_number"], 1);
        assert_eq!(doc["records"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn cleanup_removes_only_dataless_outputs() {
        let dir = tempfile::tempdir().unwrap();
        write_record(dir.path(), &record("good.pdf", Some("1170"))).unwrap();
        write_record(dir.path(), &record("empty.pdf", None)).unwrap();
        write_record(
            dir.path(),
            &ExtractedRecord::error_stub("broken.pdf", "unreadable".into()),
        )
        .unwrap();
        write_consolidated(dir.path(), &[record("good.pdf", Some("1170"))]).unwrap();

        let removed = cleanup_invalid(dir.path()).unwrap();
        assert_eq!(removed, 1);
        assert!(dir.path().join("good.json").exists());
        assert!(!dir.path().join("empty.json").exists());
        // error stubs survive for auditing
        assert!(dir.path().join("broken.json").exists());
        assert!(dir.path().join(CONSOLIDATED_FILE).exists());
    }

    #[test]
    fn cleanup_on_missing_dir_is_a_noop() {
        assert_eq!(cleanup_invalid(Path::new("/nonexistent/dir")).unwrap(), 0);
    }
}
