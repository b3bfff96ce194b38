use rustc_hash::FxHashMap;

use crate::{
    filter::{FilterState, YearWindow},
    record::Record,
};

/// Fixed number of ranked lanes; shorter series leave trailing slots empty.
pub const TOP_N: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
}

/// Ranked action/count series: sorted by count descending, truncated to
/// [`TOP_N`], ties broken by first-occurrence order in the record set.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CategorySeries(pub Vec<CategoryCount>);

impl CategorySeries {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CategoryCount> {
        self.0.iter()
    }

    pub fn max_count(&self) -> u64 {
        self.0.iter().map(|e| e.count).max().unwrap_or(0)
    }

    pub fn count_for(&self, category: &str) -> Option<u64> {
        self.0
            .iter()
            .find(|e| e.category == category)
            .map(|e| e.count)
    }
}

/// Pure view computation: window + filters, group by action, rank, top-N.
/// Callers own caching; this recomputes from scratch every time.
#[tracing::instrument(skip(records, filters), fields(window = ?window))]
pub fn compute_series(
    records: &[Record],
    filters: &FilterState,
    window: YearWindow,
) -> CategorySeries {
    // Grouping preserves first-occurrence order so that the later stable
    // sort breaks count ties by insertion order.
    let mut order: Vec<CategoryCount> = Vec::new();
    let mut index: FxHashMap<&str, usize> = FxHashMap::default();

    for record in records {
        if !window.contains(record.year) || !filters.accepts(record) {
            continue;
        }
        match index.get(record.action.as_str()) {
            Some(&i) => order[i].count += 1,
            None => {
                index.insert(record.action.as_str(), order.len());
                order.push(CategoryCount {
                    category: record.action.clone(),
                    count: 1,
                });
            }
        }
    }

    order.sort_by(|a, b| b.count.cmp(&a.count)); // stable: ties keep insertion order
    order.truncate(TOP_N);

    tracing::debug!(categories = order.len(), "computed series");
    CategorySeries(order)
}
