use rustc_hash::FxHashMap;

use crate::{
    filter::{FilterState, YearWindow},
    record::{Record, month_name},
};

/// Derived hover payload for one category. Computed on demand from the raw
/// record set, orthogonal to the reconciliation cycle: safe to call while
/// transitions are in flight.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct HoverInfo {
    pub category: String,
    pub current_count: u64,
    pub previous_year_count: u64,
    pub delta: i64,
    pub delta_pct: f64,
    pub share_of_total_pct: f64,
    pub top_month: Option<&'static str>,
    /// Top 3 districts by count, each with its share of the category's
    /// current-year count.
    pub top_districts: Vec<DistrictShare>,
    pub cumulative_count: u64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct DistrictShare {
    pub district: String,
    pub count: u64,
    pub share_pct: f64,
}

/// Relative change in percent, with the degenerate cases pinned: a count
/// appearing from nothing reads as +100%, nothing-to-nothing as 0%.
pub fn delta_pct(previous: u64, current: u64) -> f64 {
    if previous == 0 {
        return if current > 0 { 100.0 } else { 0.0 };
    }
    (current as f64 - previous as f64) / previous as f64 * 100.0
}

/// Builds the tooltip payload for `category` at `cursor_year`. Reapplies the
/// same `FilterState::accepts` predicate the aggregator uses; the two views
/// can never disagree about which records count.
pub fn compute_info(
    category: &str,
    cursor_year: i32,
    min_year: i32,
    filters: &FilterState,
    records: &[Record],
) -> HoverInfo {
    let current = YearWindow::Single(cursor_year);
    let previous = YearWindow::Single(cursor_year - 1);
    let cumulative = YearWindow::Cumulative {
        from: min_year,
        through: cursor_year,
    };

    let mut current_count = 0u64;
    let mut previous_year_count = 0u64;
    let mut cumulative_count = 0u64;
    let mut current_total = 0u64; // all categories, current year
    let mut month_counts: FxHashMap<u32, u64> = FxHashMap::default();
    let mut district_order: Vec<(String, u64)> = Vec::new();
    let mut district_index: FxHashMap<String, usize> = FxHashMap::default();

    for record in records {
        if !filters.accepts(record) {
            continue;
        }
        let in_current = current.contains(record.year);
        if in_current {
            current_total += 1;
        }
        if record.action != category {
            continue;
        }
        if cumulative.contains(record.year) {
            cumulative_count += 1;
        }
        if previous.contains(record.year) {
            previous_year_count += 1;
        }
        if in_current {
            current_count += 1;
            if let Some(month) = record.month {
                *month_counts.entry(month).or_insert(0) += 1;
            }
            if !record.district.is_empty() {
                match district_index.get(&record.district) {
                    Some(&i) => district_order[i].1 += 1,
                    None => {
                        district_index.insert(record.district.clone(), district_order.len());
                        district_order.push((record.district.clone(), 1));
                    }
                }
            }
        }
    }

    // Most common month; ties go to the earliest month for determinism.
    let top_month = month_counts
        .iter()
        .map(|(&month, &count)| (count, std::cmp::Reverse(month)))
        .max()
        .and_then(|(_, std::cmp::Reverse(month))| month_name(month));

    district_order.sort_by(|a, b| b.1.cmp(&a.1)); // stable: ties keep first-encounter order
    district_order.truncate(3);
    let top_districts = district_order
        .into_iter()
        .map(|(district, count)| DistrictShare {
            district,
            count,
            share_pct: if current_count > 0 {
                count as f64 / current_count as f64 * 100.0
            } else {
                0.0
            },
        })
        .collect();

    HoverInfo {
        category: category.to_string(),
        current_count,
        previous_year_count,
        delta: current_count as i64 - previous_year_count as i64,
        delta_pct: delta_pct(previous_year_count, current_count),
        share_of_total_pct: if current_total > 0 {
            current_count as f64 / current_total as f64 * 100.0
        } else {
            0.0
        },
        top_month,
        top_districts,
        cumulative_count,
    }
}
