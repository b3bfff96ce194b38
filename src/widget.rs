use std::{collections::BTreeSet, time::Duration};

use crate::{
    aggregate::{CategorySeries, compute_series},
    core::{Margin, TimeMs, Viewport, YearSpan},
    cursor::{TimerHost, YearCursor},
    error::LanechartResult,
    filter::{FilterState, Selection, SeverityFilter, YearWindow},
    highlight::{Highlight, HighlightAdvisor},
    reconcile::{ChangeSet, FrameSnapshot, Motion, Reconciler},
    record::Record,
    tooltip::{HoverInfo, compute_info},
};

/// Widget tuning. The defaults are the canonical behavior set: cumulative
/// filtering, 800 ms linear transitions, 1 s playback, top-10 lanes.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChartConfig {
    pub span: YearSpan,
    pub initial_year: i32,
    pub viewport: Viewport,
    pub margin: Margin,
    pub motion: Motion,
    pub playback_interval: Duration,
    /// How long the host keeps a highlight popup before auto-dismissing.
    pub highlight_dismiss_ms: f64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            span: YearSpan {
                min: 2006,
                max: 2023,
            },
            initial_year: 2006,
            viewport: Viewport {
                width: 810.0,
                height: 510.0,
            },
            margin: Margin::default(),
            motion: Motion::default(),
            playback_interval: Duration::from_secs(1),
            highlight_dismiss_ms: 4500.0,
        }
    }
}

/// Result of an event that may have moved the year cursor.
#[derive(Clone, Debug)]
pub struct YearUpdate {
    pub year: i32,
    pub changes: ChangeSet,
    /// Armed highlight for the new year, already marked shown. Delivery is
    /// at most once per distinct year until restart or wrap.
    pub highlight: Option<Highlight>,
}

/// The one owned context object: raw records, filter state, year cursor,
/// visual state and highlight tracking, wired together. Every entry point
/// runs synchronously to completion; animations only exist as transition
/// values sampled by [`frame`](Self::frame).
pub struct ChartWidget {
    records: Vec<Record>,
    filters: FilterState,
    cursor: YearCursor,
    reconciler: Reconciler,
    advisor: HighlightAdvisor,
    config: ChartConfig,
}

impl ChartWidget {
    pub fn new(records: Vec<Record>, config: ChartConfig) -> LanechartResult<Self> {
        // Re-run the checked constructors so a hand-built config cannot
        // smuggle in degenerate values.
        let span = YearSpan::new(config.span.min, config.span.max)?;
        let viewport = Viewport::new(config.viewport.width, config.viewport.height)?;

        let advisor = HighlightAdvisor::with_peak_year(&records);
        Ok(Self {
            records,
            filters: FilterState::default(),
            cursor: YearCursor::new(span, config.initial_year, config.playback_interval),
            reconciler: Reconciler::new(viewport, config.margin, config.motion),
            advisor,
            config,
        })
    }

    /// First reconciliation against the initial year; call once after
    /// construction, before the first frame.
    pub fn init(&mut self, now: TimeMs) -> ChangeSet {
        self.refresh(now)
    }

    pub fn year(&self) -> i32 {
        self.cursor.year()
    }

    pub fn is_playing(&self) -> bool {
        self.cursor.is_playing()
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// Position of the timeline marker in `[0, 1]`.
    pub fn timeline_fraction(&self) -> f64 {
        let span = self.cursor.span();
        if span.max == span.min {
            return 0.0;
        }
        f64::from(self.cursor.year() - span.min) / f64::from(span.max - span.min)
    }

    fn window(&self) -> YearWindow {
        YearWindow::Cumulative {
            from: self.cursor.span().min,
            through: self.cursor.year(),
        }
    }

    pub fn current_series(&self) -> CategorySeries {
        compute_series(&self.records, &self.filters, self.window())
    }

    fn refresh(&mut self, now: TimeMs) -> ChangeSet {
        let series = self.current_series();
        self.reconciler.reconcile(&series, now)
    }

    fn deliver_highlight(&mut self, year: i32) -> Option<Highlight> {
        let hit = self.advisor.check(year).cloned();
        if hit.is_some() {
            self.advisor.mark_shown(year);
        }
        hit
    }

    /// Slider drag: jump directly, clamped to the span.
    pub fn set_year(&mut self, year: i32, now: TimeMs) -> YearUpdate {
        let year = self.cursor.set(year);
        YearUpdate {
            year,
            changes: self.refresh(now),
            highlight: self.deliver_highlight(year),
        }
    }

    /// One playback timer fire: advance (wrapping re-arms highlights), then
    /// recompute and reconcile.
    pub fn play_tick(&mut self, now: TimeMs) -> YearUpdate {
        let advance = self.cursor.advance();
        if advance.wrapped {
            self.advisor.reset();
        }
        YearUpdate {
            year: advance.year,
            changes: self.refresh(now),
            highlight: self.deliver_highlight(advance.year),
        }
    }

    pub fn start_playback(&mut self, host: &mut dyn TimerHost) {
        self.cursor.start_playback(host);
    }

    pub fn stop_playback(&mut self, host: &mut dyn TimerHost) {
        self.cursor.stop_playback(host);
    }

    /// Restart control: stop playback, reset to the initial year, re-arm
    /// every highlight.
    pub fn restart(&mut self, host: &mut dyn TimerHost, now: TimeMs) -> YearUpdate {
        let year = self.cursor.restart(host);
        self.advisor.reset();
        YearUpdate {
            year,
            changes: self.refresh(now),
            highlight: self.deliver_highlight(year),
        }
    }

    pub fn set_severity(&mut self, severity: SeverityFilter, now: TimeMs) -> ChangeSet {
        self.filters.severity = severity;
        self.refresh(now)
    }

    pub fn set_action_filter(&mut self, selection: Selection, now: TimeMs) -> ChangeSet {
        self.filters.action = selection;
        self.refresh(now)
    }

    pub fn set_district_filter(&mut self, selection: Selection, now: TimeMs) -> ChangeSet {
        self.filters.district = selection;
        self.refresh(now)
    }

    pub fn set_age_band_filter(&mut self, selection: Selection, now: TimeMs) -> ChangeSet {
        self.filters.age_band = selection;
        self.refresh(now)
    }

    /// Window resize; the only path that re-raises the lane-divider dirty
    /// flag.
    pub fn resize(&mut self, viewport: Viewport, now: TimeMs) -> LanechartResult<ChangeSet> {
        let viewport = Viewport::new(viewport.width, viewport.height)?;
        self.config.viewport = viewport;
        Ok(self.reconciler.resize(viewport, now))
    }

    /// Pointer-enter payload. Pure read: safe mid-transition and never part
    /// of the reconciliation cycle.
    pub fn hover(&self, category: &str) -> HoverInfo {
        compute_info(
            category,
            self.cursor.year(),
            self.cursor.span().min,
            &self.filters,
            &self.records,
        )
    }

    /// Draw list for the host at `now`.
    pub fn frame(&mut self, now: TimeMs) -> FrameSnapshot {
        self.reconciler.sample(now)
    }

    /// Distinct values for populating the filter dropdowns, sorted.
    pub fn distinct_actions(&self) -> Vec<String> {
        self.distinct(|r| &r.action)
    }

    pub fn distinct_districts(&self) -> Vec<String> {
        self.distinct(|r| &r.district)
    }

    pub fn distinct_age_bands(&self) -> Vec<String> {
        self.distinct(|r| &r.age_band)
    }

    fn distinct(&self, field: impl Fn(&Record) -> &String) -> Vec<String> {
        let set: BTreeSet<&String> = self
            .records
            .iter()
            .map(field)
            .filter(|v| !v.is_empty())
            .collect();
        set.into_iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Severity;

    fn record(index: u64, year: i32, action: &str, severity: Severity) -> Record {
        Record {
            index,
            accident_number: index,
            year: Some(year),
            month: Some(6),
            time: "1200".to_string(),
            action: action.to_string(),
            district: "North York".to_string(),
            age_band: "20 to 24".to_string(),
            severity,
        }
    }

    fn widget() -> ChartWidget {
        let records = vec![
            record(1, 2006, "Ran onto road", Severity::NonFatal),
            record(2, 2006, "Ran onto road", Severity::NonFatal),
            record(3, 2007, "Walking along road", Severity::Fatal),
        ];
        ChartWidget::new(records, ChartConfig::default()).unwrap()
    }

    #[test]
    fn init_creates_initial_bars() {
        let mut w = widget();
        let set = w.init(TimeMs::ZERO);
        assert_eq!(set.created(), vec!["Ran onto road"]);
        assert_eq!(w.year(), 2006);
    }

    #[test]
    fn severity_filter_flows_through() {
        let mut w = widget();
        w.init(TimeMs::ZERO);
        w.set_year(2007, TimeMs(100.0));
        let set = w.set_severity(SeverityFilter::Only(Severity::Fatal), TimeMs(200.0));
        assert_eq!(set.exited(), vec!["Ran onto road"]);
        let series = w.current_series();
        assert_eq!(series.len(), 1);
        assert_eq!(series.0[0].category, "Walking along road");
    }

    #[test]
    fn timeline_fraction_tracks_cursor() {
        let mut w = widget();
        assert_eq!(w.timeline_fraction(), 0.0);
        w.set_year(2023, TimeMs::ZERO);
        assert_eq!(w.timeline_fraction(), 1.0);
    }

    #[test]
    fn hover_uses_active_filters() {
        let mut w = widget();
        w.init(TimeMs::ZERO);
        w.set_year(2007, TimeMs(0.0));
        w.set_severity(SeverityFilter::Only(Severity::NonFatal), TimeMs(0.0));
        let info = w.hover("Walking along road");
        assert_eq!(info.current_count, 0); // fatal record filtered out
    }

    #[test]
    fn distinct_values_are_sorted_and_deduped() {
        let w = widget();
        assert_eq!(
            w.distinct_actions(),
            vec!["Ran onto road".to_string(), "Walking along road".to_string()]
        );
        assert_eq!(w.distinct_districts(), vec!["North York".to_string()]);
    }

    #[test]
    fn degenerate_config_is_rejected() {
        let config = ChartConfig {
            viewport: Viewport {
                width: 0.0,
                height: 100.0,
            },
            ..ChartConfig::default()
        };
        assert!(ChartWidget::new(Vec::new(), config).is_err());
    }
}
