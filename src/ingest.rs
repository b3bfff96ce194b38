use std::{io::Read, path::Path};

use crate::{
    error::{LanechartError, LanechartResult},
    record::{Record, Severity, canonical_action, parse_date},
};

/// One row of the collisions export, named by the dataset's own headers.
/// Every involvement (driver, pedestrian, cyclist) is its own row; extra
/// columns are ignored and missing ones default to empty.
#[derive(Debug, serde::Deserialize)]
pub struct RawRow {
    #[serde(rename = "OBJECTID", default)]
    pub object_id: String,
    #[serde(rename = "ACCNUM", default)]
    pub accident_number: String,
    #[serde(rename = "DATE", default)]
    pub date: String,
    #[serde(rename = "TIME", default)]
    pub time: String,
    #[serde(rename = "PEDESTRIAN", default)]
    pub pedestrian: String,
    #[serde(rename = "PEDACT", default)]
    pub action: String,
    #[serde(rename = "DISTRICT", default)]
    pub district: String,
    #[serde(rename = "INVAGE", default)]
    pub age_band: String,
    #[serde(rename = "ACCLASS", default)]
    pub classification: String,
}

/// Normalizes one raw row. `None` for rows the chart never shows: collisions
/// without pedestrian involvement, or involvement rows without an action
/// label.
pub fn record_from_row(row: &RawRow) -> Option<Record> {
    if !row.pedestrian.trim().eq_ignore_ascii_case("yes") {
        return None;
    }
    let action = canonical_action(row.action.trim());
    if action.is_empty() {
        return None;
    }

    let (year, month) = parse_date(&row.date);
    Some(Record {
        index: parse_id(&row.object_id),
        accident_number: parse_id(&row.accident_number),
        year,
        month,
        time: row.time.trim().to_string(),
        action: action.to_string(),
        district: row.district.trim().to_string(),
        age_band: row.age_band.trim().to_string(),
        severity: Severity::from_classification(&row.classification),
    })
}

// Ids arrive as "4271953" but occasionally as "4.271953E9" in re-exports.
fn parse_id(raw: &str) -> u64 {
    let trimmed = raw.trim();
    if let Ok(v) = trimmed.parse::<u64>() {
        return v;
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v.round() as u64)
        .unwrap_or(0)
}

/// Reads pedestrian records from any CSV source. Rows that fail to
/// deserialize are skipped with a warning rather than aborting the load.
#[tracing::instrument(skip(reader))]
pub fn records_from_reader<R: Read>(reader: R) -> LanechartResult<Vec<Record>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for row in rdr.deserialize::<RawRow>() {
        match row {
            Ok(raw) => {
                if let Some(record) = record_from_row(&raw) {
                    records.push(record);
                }
            }
            Err(err) => {
                skipped += 1;
                tracing::warn!(%err, "skipping malformed row");
            }
        }
    }

    tracing::debug!(kept = records.len(), skipped, "ingested collision rows");
    Ok(records)
}

pub fn load_records(path: &Path) -> LanechartResult<Vec<Record>> {
    let file = std::fs::File::open(path)
        .map_err(|err| LanechartError::ingest(format!("open '{}': {err}", path.display())))?;
    records_from_reader(std::io::BufReader::new(file))
}
