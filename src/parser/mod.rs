pub mod extract;
pub mod fields;
pub mod profile;
pub mod sections;

use crate::record::{now_rfc3339, ExtractedRecord};
use profile::ExtractionProfile;

/// Full extraction pipeline for one document: section location → ordered
/// pattern matching per field → consolidation → pruned record.
pub fn process_document(
    source_file: &str,
    text: &str,
    profile: &ExtractionProfile,
) -> ExtractedRecord {
    tracing::debug!(
        "Extracting {} ({} chars, profile {})",
        source_file,
        text.len(),
        profile.name
    );
    let mut identification = extract::identification(text, profile);
    let transport = extract::transport_info(text, profile);
    extract::consolidate(&mut identification, transport.as_ref());

    let mut record = ExtractedRecord {
        source_file: source_file.to_string(),
        processed_at: now_rfc3339(),
        identification: Some(identification),
        first_aid: extract::first_aid(text, profile),
        fire_fighting: extract::fire_fighting(text, profile),
        physical_properties: extract::physical_properties(text, profile),
        transport_info: transport,
        handling_storage: extract::handling_storage(text, profile),
        error: None,
    };
    record.prune();
    record
}

// ── Tests ──
