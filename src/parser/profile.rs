//! Per-source extraction configuration: ordered regex lists per field plus
//! the section numbers each field group is scoped to. The sites we scrape
//! publish sheets with slightly different wording, so each list carries the
//! union of the labels seen in the wild, most specific first.

use std::sync::LazyLock;

use regex::Regex;

/// Numbered sections each field group reads from (GHS sheet layout).
pub struct SectionNumbers {
    pub first_aid: u32,
    pub fire_fighting: u32,
    pub handling_storage: u32,
    pub physical_properties: u32,
    pub transport: u32,
}

pub struct ExtractionProfile {
    pub name: &'static str,
    pub sections: SectionNumbers,

    pub substance: Vec<Regex>,
    /// Labeled UN-number patterns, tried inside the transport section.
    pub un_number: Vec<Regex>,
    /// Labeled UN-number patterns tried over the whole document when the
    /// transport section yields nothing. There is deliberately no bare
    /// "any 4-digit token" fallback here: it matches dates and page numbers.
    pub un_number_anywhere: Vec<Regex>,
    pub hazard_class: Vec<Regex>,
    pub risk_number: Vec<Regex>,
    pub subsidiary_risk: Vec<Regex>,

    pub inhalation: Vec<Regex>,
    pub skin_contact: Vec<Regex>,
    pub eye_contact: Vec<Regex>,
    pub ingestion: Vec<Regex>,
    pub symptoms: Vec<Regex>,
    pub physician_notes: Vec<Regex>,

    pub extinguishing_media: Vec<Regex>,
    pub specific_hazards: Vec<Regex>,
    pub crew_protection: Vec<Regex>,

    pub appearance: Vec<Regex>,
    pub color: Vec<Regex>,
    pub odor: Vec<Regex>,
    pub ph: Vec<Regex>,
    pub melting_point: Vec<Regex>,
    pub boiling_point: Vec<Regex>,
    pub flash_point: Vec<Regex>,
    pub density: Vec<Regex>,
    pub solubility: Vec<Regex>,

    pub packing_group: Vec<Regex>,
    pub proper_shipping_name: Vec<Regex>,
    pub technical_name: Vec<Regex>,

    pub handling_precautions: Vec<Regex>,
    pub storage_conditions: Vec<Regex>,
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|p| Regex::new(p).unwrap()).collect()
}

/// Shared profile covering both scraped sites' sheet layouts.
pub static STANDARD: LazyLock<ExtractionProfile> = LazyLock::new(standard);

fn standard() -> ExtractionProfile {
    ExtractionProfile {
        name: "standard",
        sections: SectionNumbers {
            first_aid: 4,
            fire_fighting: 5,
            handling_storage: 7,
            physical_properties: 9,
            transport: 14,
        },

        substance: compile(&[
            r"(?i)Nome do produto\s*:?\s*([^\n\r]+)",
            r"(?i)Nome comercial\s*:?\s*([^\n\r]+)",
            r"(?i)Product name\s*:?\s*([^\n\r]+)",
            r"(?i)Identificação da substância[^:\n]*:\s*([^\n\r]+)",
            r"(?i)1\.1[^:\n]*Nome[^:\n]*:\s*([^\n\r]+)",
        ]),
        un_number: compile(&[
            r"(?i)Número\s+ONU\s*:?\s*(\d{4})\b",
            r"(?i)UN[\s-]*number\s*:?\s*(\d{4})\b",
            r"(?i)\bONU\s*:?\s*(\d{4})\b",
            r"(?i)\bUN\s*:?\s*(\d{4})\b",
            r"(?i)ADR/RID[^\d]*(\d{4})\b",
            r"(?i)IMDG[^\d]*(\d{4})\b",
            r"(?i)IATA[^\d]*(\d{4})\b",
            r"(?is)14\.1[^\d]*(\d{4})\b",
        ]),
        un_number_anywhere: compile(&[
            r"(?i)N[úu]mero\s+ONU\s*:?\s*(\d{4})\b",
            r"(?i)UN[\s-]*number\s*:?\s*(\d{4})\b",
            r"(?i)\bONU\s*:?\s*(\d{4})\b",
        ]),
        hazard_class: compile(&[
            r"(?i)Classe de risco\s*:?\s*([1-9](?:\.\d+)?)\b",
            r"(?i)\bClasse\s*:?\s*([1-9](?:\.\d+)?)\b",
            r"(?i)Hazard class\s*:?\s*([1-9](?:\.\d+)?)\b",
            r"(?i)\bClass\s*:?\s*([1-9](?:\.\d+)?)\b",
            r"(?is)14\.3[^\d]*([1-9](?:\.\d+)?)\b",
            r"(?i)Risco principal\s*:?\s*([1-9](?:\.\d+)?)\b",
        ]),
        risk_number: compile(&[
            r"(?i)Número de risco\s*:?\s*(\d{2,3})\b",
            r"(?i)Hazard identification number\s*:?\s*(\d{2,3})\b",
            r"(?i)Kemler\s*:?\s*(\d{2,3})\b",
            r"(?is)14\.2[^\d]*(\d{2,3})\b",
        ]),
        subsidiary_risk: compile(&[
            r"(?i)Risco subsidi[áa]rio\s*:?\s*(\d+(?:\.\d+)?)\b",
            r"(?i)Subsidiary risk\s*:?\s*(\d+(?:\.\d+)?)\b",
            r"(?i)Sub\.?\s*Risk\s*:?\s*(\d+(?:\.\d+)?)\b",
        ]),

        inhalation: compile(&[
            r"(?is)(?:Se for inalado|Se for respirado|If inhaled)[^:]*:\s*([^.]+(?:\.[^.]*){0,3})\.",
            r"(?is)(?:Por inala[çc][ãa]o|Inala[çc][ãa]o|Inhalation)[^:]*:\s*([^.]+(?:\.[^.]*){0,3})\.",
        ]),
        skin_contact: compile(&[
            r"(?is)(?:No caso dum contacto com a pele|If on skin|Skin contact)[^:]*:\s*([^.]+(?:\.[^.]*){0,3})\.",
            r"(?is)(?:Por contacto com a pele|Contac?to com a pele)[^:]*:\s*([^.]+(?:\.[^.]*){0,3})\.",
        ]),
        eye_contact: compile(&[
            r"(?is)(?:No caso dum contacto com os olhos|If in eyes|Eye contact)[^:]*:\s*([^.]+(?:\.[^.]*){0,3})\.",
            r"(?is)(?:Por contacto com os olhos|Contac?to com os olhos)[^:]*:\s*([^.]+(?:\.[^.]*){0,3})\.",
        ]),
        ingestion: compile(&[
            r"(?is)(?:Se for engolido|If swallowed)[^:]*:\s*([^.]+(?:\.[^.]*){0,3})\.",
            r"(?is)(?:Por ingest[ãa]o|Ingest[ãa]o|Ingestion)[^:]*:\s*([^.]+(?:\.[^.]*){0,3})\.",
        ]),
        symptoms: compile(&[
            r"(?is)(?:Sintomas e efeitos[^:\n]*|Principais sintomas|Symptoms)[^:]*:\s*([^.]+(?:\.[^.]*){0,5})\.",
        ]),
        physician_notes: compile(&[
            r"(?is)(?:Notas para o m[ée]dico|Notes? to (?:the )?physician)[^:]*:\s*([^.]+(?:\.[^.]*){0,3})\.",
        ]),

        extinguishing_media: compile(&[
            r"(?is)(?:Meios adequados de extin[çc][ãa]o|Extinguishing media)[^:]*:\s*([^.]+(?:\.[^.]*){0,2})\.",
            r"(?is)(?:Meios de extin[çc][ãa]o|Agentes extintores)[^:]*:\s*([^.]+(?:\.[^.]*){0,2})\.",
        ]),
        specific_hazards: compile(&[
            r"(?is)(?:Perigos espec[íi]ficos|Perigos especiais|Specific hazards)[^:]*:\s*([^.]+(?:\.[^.]*){0,2})\.",
        ]),
        crew_protection: compile(&[
            r"(?is)(?:Equipamento especial de prote[çc][ãa]o|Medidas de prote[çc][ãa]o da equipe|Protective equipment)[^:]*:\s*([^.]+(?:\.[^.]*){0,2})\.",
        ]),

        appearance: compile(&[
            r"(?i)(?:Aspecto|Appearance|Estado f[íi]sico)[^:\n]*:\s*([^\n\r]+)",
        ]),
        color: compile(&[r"(?i)\b(?:Cor|Colou?r)[^:\n]*:\s*([^\n\r]+)"]),
        odor: compile(&[r"(?i)\b(?:Odor|Odour)[^:\n]*:\s*([^\n\r]+)"]),
        ph: compile(&[r"(?i)\bpH\b[^:\n]*:\s*([^\n\r]+)"]),
        melting_point: compile(&[
            r"(?i)(?:Ponto de fus[ãa]o|Melting point)[^:\n]*:\s*([^\n\r]+)",
        ]),
        boiling_point: compile(&[
            r"(?i)(?:Ponto de ebuli[çc][ãa]o|Boiling point)[^:\n]*:\s*([^\n\r]+)",
        ]),
        flash_point: compile(&[
            r"(?i)(?:Ponto de fulgor|Flash point)[^:\n]*:\s*([^\n\r]+)",
        ]),
        density: compile(&[r"(?i)(?:Densidade|Density)[^:\n]*:\s*([^\n\r]+)"]),
        solubility: compile(&[
            r"(?i)(?:Hidrossolubilidade|Solubilidade|(?:Water )?solubility)[^:\n]*:\s*([^\n\r]+)",
        ]),

        packing_group: compile(&[
            r"(?i)(?:Grupo de embalagem|Packing group)\s*:?\s*(I{1,3})\b",
            r"(?is)14\.4[^IVX\n]*\b(I{1,3})\b",
        ]),
        proper_shipping_name: compile(&[
            r"(?i)(?:Nome apropriado para embarque|Denomina[çc][ãa]o de expedi[çc][ãa]o correcta|Proper shipping name)\s*:?\s*([^\n\r]+)",
        ]),
        technical_name: compile(&[
            r"(?i)(?:Nome t[ée]cnico|Technical name)\s*:?\s*([^\n\r]+)",
        ]),

        handling_precautions: compile(&[
            r"(?is)(?:Precau[çc][õo]es para um manuse(?:io|amento) seguro|Handling precautions)[^:]*:\s*([^.]+(?:\.[^.]*){0,3})\.",
            r"(?is)(?:\bManuseamento|\bManuseio)[^:]*:\s*([^.]+(?:\.[^.]*){0,3})\.",
        ]),
        storage_conditions: compile(&[
            r"(?is)(?:Condi[çc][õo]es para uma armazenagem segura|Condi[çc][õo]es de armazenamento|Storage conditions)[^:]*:\s*([^.]+(?:\.[^.]*){0,3})\.",
            r"(?is)(?:\bArmazenagem|\bArmazenamento)[^:]*:\s*([^.]+(?:\.[^.]*){0,3})\.",
        ]),
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_profile_compiles() {
        let p = &*STANDARD;
        assert_eq!(p.sections.transport, 14);
        assert!(!p.substance.is_empty());
        assert!(!p.un_number.is_empty());
    }
}
