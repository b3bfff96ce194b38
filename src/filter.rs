use std::collections::BTreeSet;

use crate::record::{Record, Severity};

/// Multi-select filter value: everything, or a non-empty accepted set.
/// The type never holds an empty set; building from one collapses to `All`,
/// which is also how the UI's implicit mutually-exclusive "All" box behaves.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Selection {
    All,
    AnyOf(BTreeSet<String>),
}

impl Selection {
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        if set.is_empty() {
            Self::All
        } else {
            Self::AnyOf(set)
        }
    }

    pub fn accepts(&self, value: &str) -> bool {
        match self {
            Self::All => true,
            Self::AnyOf(set) => set.contains(value),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Number of specific selections (0 for `All`), used for button labels.
    pub fn selected_count(&self) -> usize {
        match self {
            Self::All => 0,
            Self::AnyOf(set) => set.len(),
        }
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::All
    }
}

/// Single-select severity tiles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SeverityFilter {
    #[default]
    All,
    Only(Severity),
}

impl SeverityFilter {
    pub fn accepts(self, severity: Severity) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => severity == wanted,
        }
    }
}

/// The active filters, AND-combined. `accepts` is the one shared predicate:
/// aggregation and tooltip computation both go through it, so they can never
/// drift apart.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FilterState {
    pub severity: SeverityFilter,
    pub action: Selection,
    pub district: Selection,
    pub age_band: Selection,
}

impl FilterState {
    pub fn accepts(&self, record: &Record) -> bool {
        self.severity.accepts(record.severity)
            && self.action.accepts(&record.action)
            && self.district.accepts(&record.district)
            && self.age_band.accepts(&record.age_band)
    }
}

/// Year window applied alongside `FilterState`. The chart view is cumulative
/// from the dataset minimum; the tooltip's previous-year lookup is single-year.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum YearWindow {
    Cumulative { from: i32, through: i32 },
    Single(i32),
}

impl YearWindow {
    /// Records without a parseable year never match any window.
    pub fn contains(self, year: Option<i32>) -> bool {
        let Some(year) = year else { return false };
        match self {
            Self::Cumulative { from, through } => from <= year && year <= through,
            Self::Single(wanted) => year == wanted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(action: &str, district: &str, severity: Severity) -> Record {
        Record {
            index: 1,
            accident_number: 10,
            year: Some(2010),
            month: Some(3),
            time: "915".to_string(),
            action: action.to_string(),
            district: district.to_string(),
            age_band: "25 to 29".to_string(),
            severity,
        }
    }

    #[test]
    fn empty_selection_collapses_to_all() {
        let sel = Selection::from_values(Vec::<String>::new());
        assert!(sel.is_all());
        assert!(sel.accepts("anything"));
        assert_eq!(sel.selected_count(), 0);
    }

    #[test]
    fn filters_and_combine() {
        let mut filters = FilterState::default();
        let r = record("Ran onto road", "Etobicoke York", Severity::Fatal);
        assert!(filters.accepts(&r));

        filters.severity = SeverityFilter::Only(Severity::NonFatal);
        assert!(!filters.accepts(&r));

        filters.severity = SeverityFilter::Only(Severity::Fatal);
        filters.district = Selection::from_values(["Scarborough"]);
        assert!(!filters.accepts(&r));

        filters.district = Selection::from_values(["Scarborough", "Etobicoke York"]);
        assert!(filters.accepts(&r));
    }

    #[test]
    fn year_window_semantics() {
        let cumulative = YearWindow::Cumulative {
            from: 2006,
            through: 2010,
        };
        assert!(cumulative.contains(Some(2006)));
        assert!(cumulative.contains(Some(2010)));
        assert!(!cumulative.contains(Some(2011)));
        assert!(!cumulative.contains(None));

        let single = YearWindow::Single(2009);
        assert!(single.contains(Some(2009)));
        assert!(!single.contains(Some(2008)));
    }
}
