use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Structured output of processing one safety data sheet. Empty groups are
/// pruned to `None` before the record is serialized or persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedRecord {
    pub source_file: String,
    pub processed_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identification: Option<Identification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_aid: Option<FirstAid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fire_fighting: Option<FireFighting>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_properties: Option<PhysicalProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport_info: Option<TransportInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handling_storage: Option<HandlingStorage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Identification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub un_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hazard_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subsidiary_risk: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub h_codes: BTreeSet<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FirstAid {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inhalation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skin_contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eye_contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingestion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symptoms: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physician_notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FireFighting {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extinguishing_media: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific_hazards: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crew_protection: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhysicalProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appearance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub odor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ph: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub melting_point: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boiling_point: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flash_point: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solubility: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransportInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub un_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hazard_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packing_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proper_shipping_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HandlingStorage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handling_precautions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_conditions: Option<String>,
}

impl ExtractedRecord {
    /// Stub written when a document could not be processed at all.
    pub fn error_stub(source_file: &str, error: String) -> Self {
        ExtractedRecord {
            source_file: source_file.to_string(),
            processed_at: now_rfc3339(),
            identification: None,
            first_aid: None,
            fire_fighting: None,
            physical_properties: None,
            transport_info: None,
            handling_storage: None,
            error: Some(error),
        }
    }

    /// A record may enter the store only when extraction succeeded and it
    /// carries at least a UN number or a substance name.
    pub fn is_eligible(&self) -> bool {
        if self.error.is_some() {
            return false;
        }
        self.identification
            .as_ref()
            .map(|id| id.un_number.is_some() || id.substance.is_some())
            .unwrap_or(false)
    }

    pub fn un_number(&self) -> Option<&str> {
        self.identification
            .as_ref()
            .and_then(|id| id.un_number.as_deref())
    }

    /// Recursively removes empty values: blank strings become absent fields,
    /// then groups that ended up with no content are dropped entirely.
    pub fn prune(&mut self) {
        if let Some(id) = &mut self.identification {
            for field in [
                &mut id.substance,
                &mut id.un_number,
                &mut id.hazard_class,
                &mut id.risk_number,
                &mut id.subsidiary_risk,
            ] {
                clear_blank(field);
            }
            id.h_codes.retain(|c| !c.trim().is_empty());
        }
        if let Some(fa) = &mut self.first_aid {
            for field in [
                &mut fa.inhalation,
                &mut fa.skin_contact,
                &mut fa.eye_contact,
                &mut fa.ingestion,
                &mut fa.symptoms,
                &mut fa.physician_notes,
            ] {
                clear_blank(field);
            }
        }
        if let Some(ff) = &mut self.fire_fighting {
            for field in [
                &mut ff.extinguishing_media,
                &mut ff.specific_hazards,
                &mut ff.crew_protection,
            ] {
                clear_blank(field);
            }
        }
        if let Some(pp) = &mut self.physical_properties {
            for field in [
                &mut pp.appearance,
                &mut pp.color,
                &mut pp.odor,
                &mut pp.ph,
                &mut pp.melting_point,
                &mut pp.boiling_point,
                &mut pp.flash_point,
                &mut pp.density,
                &mut pp.solubility,
            ] {
                clear_blank(field);
            }
        }
        if let Some(t) = &mut self.transport_info {
            for field in [
                &mut t.un_number,
                &mut t.hazard_class,
                &mut t.packing_group,
                &mut t.proper_shipping_name,
                &mut t.technical_name,
            ] {
                clear_blank(field);
            }
        }
        if let Some(hs) = &mut self.handling_storage {
            for field in [&mut hs.handling_precautions, &mut hs.storage_conditions] {
                clear_blank(field);
            }
        }

        prune_group(&mut self.identification, Identification::is_empty);
        prune_group(&mut self.first_aid, FirstAid::is_empty);
        prune_group(&mut self.fire_fighting, FireFighting::is_empty);
        prune_group(&mut self.physical_properties, PhysicalProperties::is_empty);
        prune_group(&mut self.transport_info, TransportInfo::is_empty);
        prune_group(&mut self.handling_storage, HandlingStorage::is_empty);
    }
}

fn clear_blank(field: &mut Option<String>) {
    if field.as_deref().is_some_and(|v| v.trim().is_empty()) {
        *field = None;
    }
}

fn prune_group<T>(slot: &mut Option<T>, is_empty: impl Fn(&T) -> bool) {
    if slot.as_ref().is_some_and(is_empty) {
        *slot = None;
    }
}

pub fn now_rfc3339() -> String {
    chrono::Local::now().to_rfc3339()
}

impl Identification {
    pub fn is_empty(&self) -> bool {
        self.substance.is_none()
            && self.un_number.is_none()
            && self.hazard_class.is_none()
            && self.risk_number.is_none()
            && self.subsidiary_risk.is_none()
            && self.h_codes.is_empty()
    }
}

impl FirstAid {
    pub fn is_empty(&self) -> bool {
        self.inhalation.is_none()
            && self.skin_contact.is_none()
            && self.eye_contact.is_none()
            && self.ingestion.is_none()
            && self.symptoms.is_none()
            && self.physician_notes.is_none()
    }
}

impl FireFighting {
    pub fn is_empty(&self) -> bool {
        self.extinguishing_media.is_none()
            && self.specific_hazards.is_none()
            && self.crew_protection.is_none()
    }
}

impl PhysicalProperties {
    pub fn is_empty(&self) -> bool {
        self.appearance.is_none()
            && self.color.is_none()
            && self.odor.is_none()
            && self.ph.is_none()
            && self.melting_point.is_none()
            && self.boiling_point.is_none()
            && self.flash_point.is_none()
            && self.density.is_none()
            && self.solubility.is_none()
    }
}

impl TransportInfo {
    pub fn is_empty(&self) -> bool {
        self.un_number.is_none()
            && self.hazard_class.is_none()
            && self.packing_group.is_none()
            && self.proper_shipping_name.is_none()
            && self.technical_name.is_none()
    }
}

impl HandlingStorage {
    pub fn is_empty(&self) -> bool {
        self.handling_precautions.is_none() && self.storage_conditions.is_none()
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prune_removes_hollow_groups() {
        let mut rec = ExtractedRecord {
            source_file: "x.pdf".into(),
            processed_at: now_rfc3339(),
            identification: Some(Identification {
                un_number: Some("1830".into()),
                ..Default::default()
            }),
            first_aid: Some(FirstAid::default()),
            fire_fighting: Some(FireFighting::default()),
            physical_properties: None,
            transport_info: Some(TransportInfo::default()),
            handling_storage: Some(HandlingStorage::default()),
            error: None,
        };
        rec.prune();
        assert!(rec.identification.is_some());
        assert!(rec.first_aid.is_none());
        assert!(rec.fire_fighting.is_none());
        assert!(rec.transport_info.is_none());
        assert!(rec.handling_storage.is_none());
    }

    #[test]
    fn empty_groups_never_serialized() {
        let mut rec = ExtractedRecord {
            source_file: "x.pdf".into(),
            processed_at: "2025-01-01T00:00:00-03:00".into(),
            identification: Some(Identification {
                substance: Some("Acetona".into()),
                ..Default::default()
            }),
            first_aid: Some(FirstAid::default()),
            fire_fighting: None,
            physical_properties: None,
            transport_info: None,
            handling_storage: None,
            error: None,
        };
        rec.prune();
        let json = serde_json::to_value(&rec).unwrap();
        assert!(json.get("first_aid").is_none());
        assert!(json.get("error").is_none());
        assert_eq!(json["identification"]["substance"], "Acetona");
        assert!(json["identification"].get("h_codes").is_none());
    }

    #[test]
    fn blank_strings_are_pruned_away() {
        let mut rec = ExtractedRecord {
            source_file: "x.pdf".into(),
            processed_at: now_rfc3339(),
            identification: Some(Identification {
                substance: Some("   ".into()),
                un_number: Some("".into()),
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
        assert!(rec.identification.is_none());
        assert!(!rec.is_eligible());
    }

    #[test]
    fn eligibility_requires_minimum_data() {
        let empty = ExtractedRecord {
            source_file: "x.pdf".into(),
            processed_at: now_rfc3339(),
            identification: None,
            first_aid: None,
            fire_fighting: None,
            physical_properties: None,
            transport_info: None,
            handling_storage: None,
            error: None,
        };
        assert!(!empty.is_eligible());

        let mut with_un = empty.clone();
        with_un.identification = Some(Identification {
            un_number: Some("1830".into()),
            ..Default::default()
        });
        assert!(with_un.is_eligible());

        let mut with_name = empty.clone();
        with_name.identification = Some(Identification {
            substance: Some("Acetona".into()),
            ..Default::default()
        });
        assert!(with_name.is_eligible());
    }

    #[test]
    fn error_stub_never_eligible() {
        let stub = ExtractedRecord::error_stub("bad.pdf", "unreadable".into());
        assert!(!stub.is_eligible());
        assert_eq!(stub.error.as_deref(), Some("unreadable"));
        assert!(stub.identification.is_none());
    }

    #[test]
    fn partial_json_deserializes() {
        let rec: ExtractedRecord = serde_json::from_str(
            r#"{"source_file":"a.pdf","processed_at":"2025-01-01T00:00:00-03:00",
                "identification":{"un_number":"1090"}}"#,
        )
        .unwrap();
        assert_eq!(rec.un_number(), Some("1090"));
        assert!(rec.first_aid.is_none());
    }
}
