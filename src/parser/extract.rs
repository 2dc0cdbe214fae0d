//! Field-group extraction over a located section (or the whole document for
//! identification), driven by the profile's ordered pattern lists.

use std::sync::LazyLock;

use regex::Regex;

use super::fields::{
    collect_h_codes, first_match, first_match_map, first_match_where, valid_hazard_class,
    valid_risk_number, valid_un_number,
};
use super::profile::ExtractionProfile;
use super::sections::locate_section;
use crate::record::{
    FireFighting, FirstAid, HandlingStorage, Identification, PhysicalProperties, TransportInfo,
};

/// Some sheets print UN number and class on one line ("UN-Number: 1830 Class: 8").
static UN_CLASS_COMBINED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)UN-Number:\s*(\d{4})\s+Class:\s*([1-9](?:\.\d+)?)\b").unwrap()
});

static SUBSTANCE_TAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*(?:Refer[êe]ncia|C[óo]digo|Marca|Companhia).*$").unwrap()
});
static BOILERPLATE_TAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*\b(?:ficha|fispq|safety\s+data|msds)\b.*$").unwrap()
});
static LABEL_START_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:Refer[êe]ncia|Marca|Companhia)\b").unwrap()
});

/// Product names come out of label lines with catalog references and
/// boilerplate glued on; strip those and refuse leftovers too short to be a
/// name.
fn clean_substance(raw: String) -> Option<String> {
    let name = SUBSTANCE_TAIL_RE.replace(&raw, "");
    let name = BOILERPLATE_TAIL_RE.replace(&name, "");
    let name = name.trim().trim_end_matches([':', '-']).trim();
    if name.chars().count() <= 3 || LABEL_START_RE.is_match(name) {
        return None;
    }
    Some(name.to_string())
}

/// First-aid style prose; very short captures are label fragments, not
/// instructions.
fn prose(value: String) -> Option<String> {
    (value.chars().count() > 10).then_some(value)
}

pub fn identification(text: &str, profile: &ExtractionProfile) -> Identification {
    let mut id = Identification::default();

    if let Some(caps) = UN_CLASS_COMBINED_RE.captures(text) {
        let un = caps[1].to_string();
        if valid_un_number(&un) {
            id.un_number = Some(un);
            id.hazard_class = Some(caps[2].to_string());
        }
    }

    if id.un_number.is_none() {
        id.un_number = locate_section(text, profile.sections.transport)
            .and_then(|s| first_match_where(s, &profile.un_number, valid_un_number))
            .or_else(|| first_match_where(text, &profile.un_number_anywhere, valid_un_number));
    }

    if id.hazard_class.is_none() {
        id.hazard_class = first_match_where(text, &profile.hazard_class, valid_hazard_class);
    }

    id.risk_number = first_match_where(text, &profile.risk_number, valid_risk_number);
    id.subsidiary_risk = first_match(text, &profile.subsidiary_risk);
    id.substance = first_match_map(text, &profile.substance, clean_substance);
    id.h_codes = collect_h_codes(text);

    id
}

pub fn first_aid(text: &str, profile: &ExtractionProfile) -> Option<FirstAid> {
    let section = locate_section(text, profile.sections.first_aid)?;
    Some(FirstAid {
        inhalation: first_match_map(section, &profile.inhalation, prose),
        skin_contact: first_match_map(section, &profile.skin_contact, prose),
        eye_contact: first_match_map(section, &profile.eye_contact, prose),
        ingestion: first_match_map(section, &profile.ingestion, prose),
        symptoms: first_match_map(section, &profile.symptoms, prose),
        physician_notes: first_match_map(section, &profile.physician_notes, prose),
    })
}

pub fn fire_fighting(text: &str, profile: &ExtractionProfile) -> Option<FireFighting> {
    let section = locate_section(text, profile.sections.fire_fighting)?;
    Some(FireFighting {
        extinguishing_media: first_match_map(section, &profile.extinguishing_media, prose),
        specific_hazards: first_match_map(section, &profile.specific_hazards, prose),
        crew_protection: first_match_map(section, &profile.crew_protection, prose),
    })
}

pub fn physical_properties(text: &str, profile: &ExtractionProfile) -> Option<PhysicalProperties> {
    let section = locate_section(text, profile.sections.physical_properties)?;
    Some(PhysicalProperties {
        appearance: first_match(section, &profile.appearance),
        color: first_match(section, &profile.color),
        odor: first_match(section, &profile.odor),
        ph: first_match(section, &profile.ph),
        melting_point: first_match(section, &profile.melting_point),
        boiling_point: first_match(section, &profile.boiling_point),
        flash_point: first_match(section, &profile.flash_point),
        density: first_match(section, &profile.density),
        solubility: first_match(section, &profile.solubility),
    })
}

pub fn transport_info(text: &str, profile: &ExtractionProfile) -> Option<TransportInfo> {
    let section = locate_section(text, profile.sections.transport)?;
    Some(TransportInfo {
        un_number: first_match_where(section, &profile.un_number, valid_un_number),
        hazard_class: first_match_where(section, &profile.hazard_class, valid_hazard_class),
        packing_group: first_match(section, &profile.packing_group),
        proper_shipping_name: first_match(section, &profile.proper_shipping_name),
        technical_name: first_match(section, &profile.technical_name),
    })
}

pub fn handling_storage(text: &str, profile: &ExtractionProfile) -> Option<HandlingStorage> {
    let section = locate_section(text, profile.sections.handling_storage)?;
    Some(HandlingStorage {
        handling_precautions: first_match_map(section, &profile.handling_precautions, prose),
        storage_conditions: first_match_map(section, &profile.storage_conditions, prose),
    })
}

/// Transport-section values only fill gaps in identification; a value already
/// found there is never overwritten.
pub fn consolidate(id: &mut Identification, transport: Option<&TransportInfo>) {
    let Some(t) = transport else { return };
    if id.un_number.is_none() {
        id.un_number = t.un_number.clone();
    }
    if id.hazard_class.is_none() {
        id.hazard_class = t.hazard_class.clone();
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::profile::STANDARD;

    #[test]
    fn combined_un_class_line() {
        let id = identification("UN-Number: 1830 Class: 8", &STANDARD);
        assert_eq!(id.un_number.as_deref(), Some("1830"));
        assert_eq!(id.hazard_class.as_deref(), Some("8"));
    }

    #[test]
    fn un_number_prefers_transport_section() {
        let text = "1. IDENTIFICAÇÃO\nONU: 1111\n14. TRANSPORTE\nNúmero ONU: 1830\n15. FIM";
        let id = identification(text, &STANDARD);
        assert_eq!(id.un_number.as_deref(), Some("1830"));
    }

    #[test]
    fn un_number_out_of_range_rejected() {
        let id = identification("Número ONU: 0999", &STANDARD);
        assert!(id.un_number.is_none());
    }

    #[test]
    fn substance_cleanup_drops_reference_tail() {
        let id = identification(
            "Nome do produto: Ácido Clorídrico Referência: AC-37",
            &STANDARD,
        );
        assert_eq!(id.substance.as_deref(), Some("Ácido Clorídrico"));
    }

    #[test]
    fn substance_too_short_falls_through() {
        let text = "Nome do produto: X\nNome comercial: Hidróxido de Sódio";
        let id = identification(text, &STANDARD);
        assert_eq!(id.substance.as_deref(), Some("Hidróxido de Sódio"));
    }

    #[test]
    fn transport_gap_fill_never_overwrites() {
        let mut id = Identification {
            un_number: Some("1090".into()),
            ..Default::default()
        };
        let t = TransportInfo {
            un_number: Some("1830".into()),
            hazard_class: Some("8".into()),
            ..Default::default()
        };
        consolidate(&mut id, Some(&t));
        assert_eq!(id.un_number.as_deref(), Some("1090"));
        assert_eq!(id.hazard_class.as_deref(), Some("8"));
    }

    #[test]
    fn first_aid_requires_its_section() {
        assert!(first_aid("no sections here", &STANDARD).is_none());
    }

    #[test]
    fn first_aid_prose_from_section_four() {
        let text = "4. PRIMEIROS SOCORROS\nSe for inalado: Remover para local arejado.\n5. COMBATE";
        let fa = first_aid(text, &STANDARD).unwrap();
        assert_eq!(fa.inhalation.as_deref(), Some("Remover para local arejado"));
        assert!(fa.ingestion.is_none());
    }

    #[test]
    fn short_prose_is_rejected() {
        let text = "4. PRIMEIROS SOCORROS\nSe for inalado: Ar puro.\n5. COMBATE";
        let fa = first_aid(text, &STANDARD).unwrap();
        assert!(fa.inhalation.is_none());
    }
}
