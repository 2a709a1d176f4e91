// Copyright (C) 2026 AURLOM
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! CSV decoding and validation for bulk line import.
//!
//! This module parses and validates line rows without persisting or
//! mutating anything; the import handlers decide what to do with the
//! result. Parsing context (which teacher, which month) comes from the
//! import request, not the CSV.

use csv::{Reader, StringRecord};
use std::collections::HashMap;
use thiserror::Error;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, Time};

use facturation_domain::{CampusId, Hours, LineDraft, Money, validate_line_draft};

use crate::error::ApiError;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const TIME_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]");

/// Required CSV column headers (case-insensitive, normalized).
const REQUIRED_HEADERS: &[&str] = &[
    "date_cours",
    "heure_debut",
    "heure_fin",
    "campus_id",
    "filiere",
    "classe",
    "intitule",
    "quantite_heures",
    "prix_unitaire",
];

/// Optional CSV column headers.
const RETARD_HEADER: &str = "retard";

/// A field-level failure while decoding one CSV row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CsvRowError {
    /// A required field is missing or empty.
    #[error("{field}: required field is missing or empty")]
    MissingField {
        /// The normalized header name.
        field: &'static str,
    },
    /// A field value could not be parsed or failed validation.
    #[error("{field}: {message}")]
    InvalidField {
        /// The normalized header name.
        field: &'static str,
        /// What was wrong with the value.
        message: String,
    },
}

/// Status of a CSV row validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvRowStatus {
    /// Row is valid and can be imported.
    Valid,
    /// Row has validation errors and cannot be imported.
    Invalid,
}

/// A single row result from CSV validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRowResult {
    /// The row number (1-based, excluding header).
    pub row_number: usize,
    /// The decoded draft (if valid).
    pub draft: Option<LineDraft>,
    /// The row status.
    pub status: CsvRowStatus,
    /// Zero or more validation errors.
    pub errors: Vec<CsvRowError>,
}

/// Result of CSV validation over a whole payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvPreviewResult {
    /// Per-row validation results.
    pub rows: Vec<CsvRowResult>,
    /// Total number of rows.
    pub total_rows: usize,
    /// Number of valid rows.
    pub valid_count: usize,
    /// Number of invalid rows.
    pub invalid_count: usize,
}

/// Normalizes a CSV header string for case-insensitive, whitespace-tolerant matching.
fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase().replace(' ', "_")
}

/// Validates that all required headers are present in the CSV.
fn validate_headers(headers: &StringRecord) -> Result<HashMap<String, usize>, ApiError> {
    let mut header_map: HashMap<String, usize> = HashMap::new();

    // Build normalized header map
    for (idx, header) in headers.iter().enumerate() {
        let normalized: String = normalize_header(header);
        header_map.insert(normalized, idx);
    }

    // Check all required headers are present
    let mut missing: Vec<String> = Vec::new();
    for required in REQUIRED_HEADERS {
        if !header_map.contains_key(*required) {
            missing.push(String::from(*required));
        }
    }

    if !missing.is_empty() {
        return Err(ApiError::InvalidCsvFormat {
            reason: format!("Missing required headers: {}", missing.join(", ")),
        });
    }

    Ok(header_map)
}

/// Extracts a required field from a CSV row.
fn required_field(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    field: &'static str,
    errors: &mut Vec<CsvRowError>,
) -> String {
    let value: Option<String> = header_map
        .get(field)
        .and_then(|&idx| record.get(idx))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string);

    value.unwrap_or_else(|| {
        errors.push(CsvRowError::MissingField { field });
        String::new()
    })
}

fn parse_date_field(
    value: &str,
    field: &'static str,
    errors: &mut Vec<CsvRowError>,
) -> Option<Date> {
    match Date::parse(value, &DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(e) => {
            errors.push(CsvRowError::InvalidField {
                field,
                message: format!("invalid date '{value}': {e}"),
            });
            None
        }
    }
}

fn parse_time_field(
    value: &str,
    field: &'static str,
    errors: &mut Vec<CsvRowError>,
) -> Option<Time> {
    match Time::parse(value, &TIME_FORMAT) {
        Ok(time) => Some(time),
        Err(e) => {
            errors.push(CsvRowError::InvalidField {
                field,
                message: format!("invalid time '{value}': {e}"),
            });
            None
        }
    }
}

/// Parses the optional `retard` flag; accepts `1`/`0`, `true`/`false`,
/// `oui`/`non`. Absent or empty means not late.
fn parse_retard(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    errors: &mut Vec<CsvRowError>,
) -> bool {
    let raw: Option<&str> = header_map
        .get(RETARD_HEADER)
        .and_then(|&idx| record.get(idx))
        .map(str::trim)
        .filter(|v| !v.is_empty());

    match raw.map(str::to_lowercase).as_deref() {
        None => false,
        Some("1" | "true" | "oui") => true,
        Some("0" | "false" | "non") => false,
        Some(other) => {
            errors.push(CsvRowError::InvalidField {
                field: "retard",
                message: format!("invalid flag '{other}': expected 0/1, true/false or oui/non"),
            });
            false
        }
    }
}

/// Parses a CSV row into a `LineDraft` if possible.
fn parse_row(
    row_number: usize,
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
) -> CsvRowResult {
    let mut errors: Vec<CsvRowError> = Vec::new();

    let date_raw: String = required_field(record, header_map, "date_cours", &mut errors);
    let debut_raw: String = required_field(record, header_map, "heure_debut", &mut errors);
    let fin_raw: String = required_field(record, header_map, "heure_fin", &mut errors);
    let campus_raw: String = required_field(record, header_map, "campus_id", &mut errors);
    let filiere: String = required_field(record, header_map, "filiere", &mut errors);
    let classe: String = required_field(record, header_map, "classe", &mut errors);
    let intitule: String = required_field(record, header_map, "intitule", &mut errors);
    let heures_raw: String = required_field(record, header_map, "quantite_heures", &mut errors);
    let prix_raw: String = required_field(record, header_map, "prix_unitaire", &mut errors);

    if !errors.is_empty() {
        return CsvRowResult {
            row_number,
            draft: None,
            status: CsvRowStatus::Invalid,
            errors,
        };
    }

    let date_cours: Option<Date> = parse_date_field(&date_raw, "date_cours", &mut errors);
    let heure_debut: Option<Time> = parse_time_field(&debut_raw, "heure_debut", &mut errors);
    let heure_fin: Option<Time> = parse_time_field(&fin_raw, "heure_fin", &mut errors);

    let campus_id: Option<CampusId> = match campus_raw.parse::<i64>() {
        Ok(id) => Some(CampusId::new(id)),
        Err(e) => {
            errors.push(CsvRowError::InvalidField {
                field: "campus_id",
                message: format!("invalid campus id '{campus_raw}': {e}"),
            });
            None
        }
    };
    let quantite_heures: Option<Hours> = match heures_raw.parse::<Hours>() {
        Ok(hours) => Some(hours),
        Err(e) => {
            errors.push(CsvRowError::InvalidField {
                field: "quantite_heures",
                message: e.to_string(),
            });
            None
        }
    };
    let prix_unitaire: Option<Money> = match prix_raw.parse::<Money>() {
        Ok(rate) => Some(rate),
        Err(e) => {
            errors.push(CsvRowError::InvalidField {
                field: "prix_unitaire",
                message: e.to_string(),
            });
            None
        }
    };
    let retard: bool = parse_retard(record, header_map, &mut errors);

    let draft: Option<LineDraft> = match (
        date_cours,
        heure_debut,
        heure_fin,
        campus_id,
        quantite_heures,
        prix_unitaire,
    ) {
        (Some(date_cours), Some(heure_debut), Some(heure_fin), Some(campus_id), Some(heures), Some(prix)) => {
            let draft = LineDraft {
                date_cours,
                heure_debut,
                heure_fin,
                campus_id,
                filiere,
                classe,
                intitule,
                retard,
                quantite_heures: heures,
                prix_unitaire: prix,
            };
            match validate_line_draft(&draft) {
                Ok(()) => Some(draft),
                Err(e) => {
                    errors.push(CsvRowError::InvalidField {
                        field: "line",
                        message: e.to_string(),
                    });
                    None
                }
            }
        }
        _ => None,
    };

    let status: CsvRowStatus = if errors.is_empty() && draft.is_some() {
        CsvRowStatus::Valid
    } else {
        CsvRowStatus::Invalid
    };

    CsvRowResult {
        row_number,
        draft,
        status,
        errors,
    }
}

/// Validates a CSV line payload without persisting or mutating anything.
///
/// # Errors
///
/// Returns `InvalidCsvFormat` if the header row is missing required
/// columns or the payload cannot be read at all. Row-level problems are
/// reported per row, never as a hard error.
pub fn preview_lines_csv(csv_text: &str) -> Result<CsvPreviewResult, ApiError> {
    let mut reader: Reader<&[u8]> = Reader::from_reader(csv_text.as_bytes());

    let headers: StringRecord = reader
        .headers()
        .map_err(|e| ApiError::InvalidCsvFormat {
            reason: format!("Failed to read CSV headers: {e}"),
        })?
        .clone();
    let header_map: HashMap<String, usize> = validate_headers(&headers)?;

    let mut rows: Vec<CsvRowResult> = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let row_number: usize = idx + 1;
        match record {
            Ok(record) => rows.push(parse_row(row_number, &record, &header_map)),
            Err(e) => rows.push(CsvRowResult {
                row_number,
                draft: None,
                status: CsvRowStatus::Invalid,
                errors: vec![CsvRowError::InvalidField {
                    field: "row",
                    message: format!("unreadable row: {e}"),
                }],
            }),
        }
    }

    let total_rows: usize = rows.len();
    let valid_count: usize = rows
        .iter()
        .filter(|row| row.status == CsvRowStatus::Valid)
        .count();
    let invalid_count: usize = total_rows - valid_count;

    Ok(CsvPreviewResult {
        rows,
        total_rows,
        valid_count,
        invalid_count,
    })
}
