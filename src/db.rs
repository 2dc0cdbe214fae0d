use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use tracing::{info, warn};

use crate::record::{
    ExtractedRecord, FireFighting, FirstAid, HandlingStorage, Identification, PhysicalProperties,
};

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    let conn = Connection::open(path)
        .with_context(|| format!("failed to open database {}", path.display()))?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS products (
            id              INTEGER PRIMARY KEY,
            source_file     TEXT NOT NULL,
            substance       TEXT,
            un_number       TEXT,
            hazard_class    TEXT,
            risk_number     TEXT,
            subsidiary_risk TEXT,
            processed_at    TEXT,
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(un_number, substance)
        );
        CREATE INDEX IF NOT EXISTS idx_products_un ON products(un_number);
        CREATE INDEX IF NOT EXISTS idx_products_substance ON products(substance);
        CREATE INDEX IF NOT EXISTS idx_products_class ON products(hazard_class);

        CREATE TABLE IF NOT EXISTS first_aid (
            id              INTEGER PRIMARY KEY,
            product_id      INTEGER NOT NULL UNIQUE REFERENCES products(id),
            inhalation      TEXT,
            skin_contact    TEXT,
            eye_contact     TEXT,
            ingestion       TEXT,
            symptoms        TEXT,
            physician_notes TEXT
        );

        CREATE TABLE IF NOT EXISTS fire_fighting (
            id                  INTEGER PRIMARY KEY,
            product_id          INTEGER NOT NULL UNIQUE REFERENCES products(id),
            extinguishing_media TEXT,
            specific_hazards    TEXT,
            crew_protection     TEXT
        );

        CREATE TABLE IF NOT EXISTS physical_properties (
            id            INTEGER PRIMARY KEY,
            product_id    INTEGER NOT NULL UNIQUE REFERENCES products(id),
            appearance    TEXT,
            color         TEXT,
            odor          TEXT,
            ph            TEXT,
            melting_point TEXT,
            boiling_point TEXT,
            flash_point   TEXT,
            density       TEXT,
            solubility    TEXT
        );

        CREATE TABLE IF NOT EXISTS handling_storage (
            id                   INTEGER PRIMARY KEY,
            product_id           INTEGER NOT NULL UNIQUE REFERENCES products(id),
            handling_precautions TEXT,
            storage_conditions   TEXT
        );
        ",
    )?;
    Ok(())
}

// ── Insert ──

/// Inserts one record. Returns the product id, or `None` (logged, no error)
/// when the record violates the minimum-data invariant. An existing
/// (un_number, substance) pair keeps its parent row; its detail rows are
/// replaced wholesale — last write wins, no history.
pub fn insert_record(conn: &Connection, record: &ExtractedRecord) -> Result<Option<i64>> {
    let mut record = record.clone();
    record.prune();

    if !record.is_eligible() {
        warn!(
            "Not storing {}: missing UN number and substance, or extraction error",
            record.source_file
        );
        return Ok(None);
    }
    let id_fields = record.identification.clone().unwrap_or_default();

    let tx = conn.unchecked_transaction()?;

    // IS (not =) so a missing substance or UN number still keys one row.
    let existing: Option<i64> = tx
        .query_row(
            "SELECT id FROM products WHERE un_number IS ?1 AND substance IS ?2",
            rusqlite::params![id_fields.un_number, id_fields.substance],
            |r| r.get(0),
        )
        .optional()?;

    let product_id = match existing {
        Some(id) => id,
        None => {
            tx.execute(
                "INSERT INTO products
                 (source_file, substance, un_number, hazard_class, risk_number,
                  subsidiary_risk, processed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    record.source_file,
                    id_fields.substance,
                    id_fields.un_number,
                    id_fields.hazard_class,
                    id_fields.risk_number,
                    id_fields.subsidiary_risk,
                    record.processed_at,
                ],
            )?;
            tx.last_insert_rowid()
        }
    };

    for table in [
        "first_aid",
        "fire_fighting",
        "physical_properties",
        "handling_storage",
    ] {
        tx.execute(
            &format!("DELETE FROM {table} WHERE product_id = ?1"),
            rusqlite::params![product_id],
        )?;
    }

    if let Some(fa) = &record.first_aid {
        tx.execute(
            "INSERT INTO first_aid
             (product_id, inhalation, skin_contact, eye_contact, ingestion, symptoms, physician_notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                product_id,
                fa.inhalation,
                fa.skin_contact,
                fa.eye_contact,
                fa.ingestion,
                fa.symptoms,
                fa.physician_notes,
            ],
        )?;
    }
    if let Some(ff) = &record.fire_fighting {
        tx.execute(
            "INSERT INTO fire_fighting
             (product_id, extinguishing_media, specific_hazards, crew_protection)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                product_id,
                ff.extinguishing_media,
                ff.specific_hazards,
                ff.crew_protection,
            ],
        )?;
    }
    if let Some(pp) = &record.physical_properties {
        tx.execute(
            "INSERT INTO physical_properties
             (product_id, appearance, color, odor, ph, melting_point, boiling_point,
              flash_point, density, solubility)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            rusqlite::params![
                product_id,
                pp.appearance,
                pp.color,
                pp.odor,
                pp.ph,
                pp.melting_point,
                pp.boiling_point,
                pp.flash_point,
                pp.density,
                pp.solubility,
            ],
        )?;
    }
    if let Some(hs) = &record.handling_storage {
        tx.execute(
            "INSERT INTO handling_storage
             (product_id, handling_precautions, storage_conditions)
             VALUES (?1, ?2, ?3)",
            rusqlite::params![product_id, hs.handling_precautions, hs.storage_conditions],
        )?;
    }

    tx.commit()?;
    info!("Stored product {} ({})", product_id, record.source_file);
    Ok(Some(product_id))
}

// ── Lookups ──

#[derive(Debug, Clone)]
pub struct ProductRow {
    pub id: i64,
    pub source_file: String,
    pub substance: Option<String>,
    pub un_number: Option<String>,
    pub hazard_class: Option<String>,
    pub risk_number: Option<String>,
    pub subsidiary_risk: Option<String>,
    pub processed_at: Option<String>,
    pub created_at: String,
}

const PRODUCT_COLUMNS: &str = "id, source_file, substance, un_number, hazard_class, \
                               risk_number, subsidiary_risk, processed_at, created_at";

fn product_from_row(row: &rusqlite::Row) -> rusqlite::Result<ProductRow> {
    Ok(ProductRow {
        id: row.get("id")?,
        source_file: row.get("source_file")?,
        substance: row.get("substance")?,
        un_number: row.get("un_number")?,
        hazard_class: row.get("hazard_class")?,
        risk_number: row.get("risk_number")?,
        subsidiary_risk: row.get("subsidiary_risk")?,
        processed_at: row.get("processed_at")?,
        created_at: row.get("created_at")?,
    })
}

pub fn find_by_un_number(conn: &Connection, un_number: &str) -> Result<Option<ProductRow>> {
    let row = conn
        .query_row(
            &format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE un_number = ?1 ORDER BY id LIMIT 1"),
            rusqlite::params![un_number],
            product_from_row,
        )
        .optional()?;
    Ok(row)
}

/// Case-insensitive substring match on the substance name.
pub fn find_by_substance(conn: &Connection, substance: &str) -> Result<Vec<ProductRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE substance LIKE ?1 ORDER BY id"
    ))?;
    let rows = stmt
        .query_map(
            rusqlite::params![format!("%{}%", substance)],
            product_from_row,
        )?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn find_by_hazard_class(conn: &Connection, hazard_class: &str) -> Result<Vec<ProductRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE hazard_class = ?1 ORDER BY id"
    ))?;
    let rows = stmt
        .query_map(rusqlite::params![hazard_class], product_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Stats ──

pub struct Stats {
    pub total: usize,
    pub by_hazard_class: Vec<(String, usize)>,
    pub most_recent: Vec<RecentProduct>,
}

pub struct RecentProduct {
    pub substance: Option<String>,
    pub un_number: Option<String>,
    pub processed_at: Option<String>,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let total: usize = conn.query_row("SELECT COUNT(*) FROM products", [], |r| r.get(0))?;

    let mut stmt = conn.prepare(
        "SELECT hazard_class, COUNT(*) FROM products
         WHERE hazard_class IS NOT NULL
         GROUP BY hazard_class
         ORDER BY COUNT(*) DESC, hazard_class",
    )?;
    let by_hazard_class = stmt
        .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut stmt = conn.prepare(
        "SELECT substance, un_number, processed_at FROM products
         ORDER BY created_at DESC, id DESC
         LIMIT 5",
    )?;
    let most_recent = stmt
        .query_map([], |r| {
            Ok(RecentProduct {
                substance: r.get(0)?,
                un_number: r.get(1)?,
                processed_at: r.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Stats {
        total,
        by_hazard_class,
        most_recent,
    })
}

// ── Export / load ──

/// Rebuilds the nested record shape from the parent/child join. Columns are
/// read by alias name so reordering the schema cannot silently shift fields.
pub fn export_all(conn: &Connection) -> Result<Vec<ExtractedRecord>> {
    let mut stmt = conn.prepare(
        "SELECT p.source_file, p.processed_at, p.substance, p.un_number, p.hazard_class,
                p.risk_number, p.subsidiary_risk,
                fa.inhalation AS fa_inhalation, fa.skin_contact AS fa_skin_contact,
                fa.eye_contact AS fa_eye_contact, fa.ingestion AS fa_ingestion,
                fa.symptoms AS fa_symptoms, fa.physician_notes AS fa_physician_notes,
                ff.extinguishing_media AS ff_extinguishing_media,
                ff.specific_hazards AS ff_specific_hazards,
                ff.crew_protection AS ff_crew_protection,
                pp.appearance AS pp_appearance, pp.color AS pp_color, pp.odor AS pp_odor,
                pp.ph AS pp_ph, pp.melting_point AS pp_melting_point,
                pp.boiling_point AS pp_boiling_point, pp.flash_point AS pp_flash_point,
                pp.density AS pp_density, pp.solubility AS pp_solubility,
                hs.handling_precautions AS hs_handling_precautions,
                hs.storage_conditions AS hs_storage_conditions
         FROM products p
         LEFT JOIN first_aid fa ON fa.product_id = p.id
         LEFT JOIN fire_fighting ff ON ff.product_id = p.id
         LEFT JOIN physical_properties pp ON pp.product_id = p.id
         LEFT JOIN handling_storage hs ON hs.product_id = p.id
         ORDER BY p.id",
    )?;

    let mut records = stmt
        .query_map([], |row| {
            Ok(ExtractedRecord {
                source_file: row.get("source_file")?,
                processed_at: row
                    .get::<_, Option<String>>("processed_at")?
                    .unwrap_or_default(),
                identification: Some(Identification {
                    substance: row.get("substance")?,
                    un_number: row.get("un_number")?,
                    hazard_class: row.get("hazard_class")?,
                    risk_number: row.get("risk_number")?,
                    subsidiary_risk: row.get("subsidiary_risk")?,
                    h_codes: Default::default(),
                }),
                first_aid: Some(FirstAid {
                    inhalation: row.get("fa_inhalation")?,
                    skin_contact: row.get("fa_skin_contact")?,
                    eye_contact: row.get("fa_eye_contact")?,
                    ingestion: row.get("fa_ingestion")?,
                    symptoms: row.get("fa_symptoms")?,
                    physician_notes: row.get("fa_physician_notes")?,
                }),
                fire_fighting: Some(FireFighting {
                    extinguishing_media: row.get("ff_extinguishing_media")?,
                    specific_hazards: row.get("ff_specific_hazards")?,
                    crew_protection: row.get("ff_crew_protection")?,
                }),
                physical_properties: Some(PhysicalProperties {
                    appearance: row.get("pp_appearance")?,
                    color: row.get("pp_color")?,
                    odor: row.get("pp_odor")?,
                    ph: row.get("pp_ph")?,
                    melting_point: row.get("pp_melting_point")?,
                    boiling_point: row.get("pp_boiling_point")?,
                    flash_point: row.get("pp_flash_point")?,
                    density: row.get("pp_density")?,
                    solubility: row.get("pp_solubility")?,
                }),
                transport_info: None,
                handling_storage: Some(HandlingStorage {
                    handling_precautions: row.get("hs_handling_precautions")?,
                    storage_conditions: row.get("hs_storage_conditions")?,
                }),
                error: None,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    for record in &mut records {
        record.prune();
    }
    Ok(records)
}

pub struct LoadReport {
    pub success: usize,
    pub errors: usize,
}

/// Loads a consolidated JSON file (bare array or `{ "records": [...] }`)
/// into the store, re-applying `insert_record` to every entry. Per-record
/// failures are counted, never fatal.
pub fn load_from_json_file(conn: &Connection, path: &Path) -> Result<LoadReport> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&data).with_context(|| format!("invalid JSON in {}", path.display()))?;

    let items = value
        .as_array()
        .cloned()
        .or_else(|| {
            value
                .get("records")
                .and_then(|r| r.as_array())
                .cloned()
        })
        .with_context(|| format!("{} holds neither an array nor a records object", path.display()))?;

    let mut report = LoadReport {
        success: 0,
        errors: 0,
    };
    for item in items {
        let outcome = serde_json::from_value::<ExtractedRecord>(item)
            .map_err(anyhow::Error::from)
            .and_then(|record| insert_record(conn, &record));
        match outcome {
            Ok(Some(_)) => report.success += 1,
            Ok(None) => report.errors += 1,
            Err(e) => {
                warn!("Skipping record during load: {e:#}");
                report.errors += 1;
            }
        }
    }
    info!(
        "Load finished: {} stored, {} errors",
        report.success, report.errors
    );
    Ok(report)
}

// ── Tests ──
