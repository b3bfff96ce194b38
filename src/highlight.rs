use std::collections::BTreeSet;

use rustc_hash::FxHashMap;

use crate::record::Record;

/// A factual annotation tied to one year, surfaced as a side popup the first
/// time the cursor reaches that year.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Highlight {
    pub year: i32,
    pub title: String,
    pub message: String,
}

fn highlight(year: i32, title: &str, message: &str) -> Highlight {
    Highlight {
        year,
        title: title.to_string(),
        message: message.to_string(),
    }
}

/// The static annotation table. The peak-year entry is the one piece
/// computed from data, once at load time ([`HighlightAdvisor::with_peak_year`]).
pub fn builtin_highlights() -> Vec<Highlight> {
    vec![
        highlight(
            2006,
            "Where it starts",
            "The earliest year in the dataset. Counts accumulate from here as the timeline advances.",
        ),
        highlight(
            2013,
            "Ice storm winter",
            "A December ice storm left much of the city dark and sidewalks untreated for days.",
        ),
        highlight(
            2016,
            "Vision Zero adopted",
            "The city adopted its Vision Zero road safety plan, targeting pedestrian-heavy corridors.",
        ),
        highlight(
            2020,
            "Pandemic traffic drop",
            "Lockdowns emptied the streets; collision volumes fall sharply from this year.",
        ),
    ]
}

/// Stateless lookup plus a shown-year set: each distinct year fires at most
/// once until the tracker is reset (restart, or the playback wrap).
#[derive(Clone, Debug, Default)]
pub struct HighlightAdvisor {
    by_year: FxHashMap<i32, Highlight>,
    shown: BTreeSet<i32>,
}

impl HighlightAdvisor {
    /// Later entries for the same year win, so the computed peak-year entry
    /// may override a static one.
    pub fn new(entries: Vec<Highlight>) -> Self {
        let mut by_year = FxHashMap::default();
        for entry in entries {
            by_year.insert(entry.year, entry);
        }
        Self {
            by_year,
            shown: BTreeSet::new(),
        }
    }

    /// Builtin table plus the "year with the most collisions" entry derived
    /// from the full record set. Computed once here, never per frame.
    pub fn with_peak_year(records: &[Record]) -> Self {
        let mut entries = builtin_highlights();
        if let Some((year, count)) = peak_year(records) {
            entries.push(highlight(
                year,
                "Peak year",
                &format!("{count} pedestrian involvements, the most of any single year."),
            ));
        }
        Self::new(entries)
    }

    /// The armed highlight for `year`, if any and not yet shown. Callers
    /// pair this with [`mark_shown`](Self::mark_shown) on delivery.
    pub fn check(&self, year: i32) -> Option<&Highlight> {
        if self.shown.contains(&year) {
            return None;
        }
        self.by_year.get(&year)
    }

    pub fn mark_shown(&mut self, year: i32) {
        self.shown.insert(year);
    }

    /// Re-arms every year; called on restart and on playback wrap.
    pub fn reset(&mut self) {
        self.shown.clear();
    }
}

fn peak_year(records: &[Record]) -> Option<(i32, u64)> {
    let mut per_year: FxHashMap<i32, u64> = FxHashMap::default();
    for record in records {
        if let Some(year) = record.year {
            *per_year.entry(year).or_insert(0) += 1;
        }
    }
    // Ties resolve to the earliest year.
    per_year
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
}
