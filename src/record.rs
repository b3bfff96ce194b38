use chrono::Datelike as _;

/// Collision severity, derived from the dataset's free-text classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Severity {
    Fatal,
    NonFatal,
}

impl Severity {
    /// Normalizes a classification string. "non-fatal" wins over "fatal"
    /// because the latter is a substring of the former; anything unknown
    /// (including empty) is treated as non-fatal.
    pub fn from_classification(raw: &str) -> Self {
        let lower = raw.trim().to_ascii_lowercase();
        if lower.contains("non-fatal") {
            Self::NonFatal
        } else if lower.contains("fatal") {
            Self::Fatal
        } else {
            Self::NonFatal
        }
    }
}

/// One pedestrian involvement in one collision. Immutable after ingestion.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Record {
    pub index: u64,
    pub accident_number: u64, // shared by rows describing the same collision
    pub year: Option<i32>,    // None when the date string defeated every parse
    pub month: Option<u32>,   // 1..=12
    pub time: String,
    pub action: String, // display name, renamed at ingestion
    pub district: String,
    pub age_band: String,
    pub severity: Severity,
}

/// Collapses near-duplicate raw action labels into display names.
/// Unknown labels pass through unchanged.
pub fn canonical_action(raw: &str) -> &str {
    match raw {
        "Coming From Behind Parked Vehicle" => "Behind parked vehicle",
        "Crossing marked crosswalk without ROW" => "Crossing without right of way",
        "Crossing, no Traffic Control" => "Crossing with no traffic control",
        "Crossing, Pedestrian Crossover" => "Crossing with right of way",
        "On Sidewalk or Shoulder" => "On sidewalk or shoulder",
        "Person Getting on/off School Bus" => "(Un)boarding vehicle",
        "Person Getting on/off Vehicle" => "(Un)boarding vehicle",
        "Playing or Working on Highway" => "Working on highway",
        "Running onto Roadway" => "Ran onto road",
        "Walking on Roadway Against Traffic" => "Walking along road",
        "Walking on Roadway with Traffic" => "Walking along road",
        other => other,
    }
}

/// Extracts (year, month) from a collision date string.
///
/// The fast path handles the dataset's native `M/D/YYYY hh:mm:ss AM` shape;
/// anything else falls back to a set of common chrono formats. Returns
/// `(None, None)` rather than failing so callers can keep the record.
pub fn parse_date(raw: &str) -> (Option<i32>, Option<u32>) {
    if let Some((year, month)) = parse_slash_date(raw) {
        return (Some(year), Some(month));
    }

    let trimmed = raw.trim();
    for fmt in ["%m/%d/%Y %I:%M:%S %p", "%m/%d/%Y %H:%M:%S", "%m/%d/%Y %H:%M"] {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(trimmed, fmt) {
            return (Some(dt.year()), Some(dt.month()));
        }
    }
    for fmt in ["%m/%d/%Y", "%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = chrono::NaiveDate::parse_from_str(trimmed, fmt) {
            return (Some(d.year()), Some(d.month()));
        }
    }

    (None, None)
}

fn parse_slash_date(raw: &str) -> Option<(i32, u32)> {
    let mut parts = raw.trim().splitn(3, '/');
    let month: u32 = parts.next()?.trim().parse().ok()?;
    let _day: u32 = parts.next()?.trim().parse().ok()?;
    let rest = parts.next()?;

    let year_digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    if year_digits.len() != 4 {
        return None;
    }
    if !(1..=12).contains(&month) {
        return None;
    }
    let year: i32 = year_digits.parse().ok()?;
    Some((year, month))
}

pub fn month_name(month: u32) -> Option<&'static str> {
    const NAMES: [&str; 12] = [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ];
    NAMES.get(month.checked_sub(1)? as usize).copied()
}
