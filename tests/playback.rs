use std::time::Duration;

use lanechart::{
    ChartConfig, ChartWidget, Record, Severity, TimeMs, TimerHandle, TimerHost, YearSpan,
};

/// Counting host double: tracks live timers so a test can fire exactly what
/// a real event loop would fire.
#[derive(Default)]
struct CountingHost {
    next_id: u64,
    active: Vec<TimerHandle>,
    scheduled: u64,
    cancelled: u64,
}

impl TimerHost for CountingHost {
    fn schedule_repeating(&mut self, _period: Duration) -> TimerHandle {
        self.next_id += 1;
        self.scheduled += 1;
        let handle = TimerHandle(self.next_id);
        self.active.push(handle);
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.cancelled += 1;
        self.active.retain(|h| *h != handle);
    }
}

fn record(index: u64, year: i32) -> Record {
    Record {
        index,
        accident_number: index,
        year: Some(year),
        month: Some(7),
        time: "1500".to_string(),
        action: "Ran onto road".to_string(),
        district: "Scarborough".to_string(),
        age_band: "10 to 14".to_string(),
        severity: Severity::NonFatal,
    }
}

/// Three-year span, most records in 2006.
fn widget() -> ChartWidget {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let records = vec![
        record(1, 2006),
        record(2, 2006),
        record(3, 2006),
        record(4, 2007),
        record(5, 2007),
        record(6, 2008),
    ];
    let config = ChartConfig {
        span: YearSpan {
            min: 2006,
            max: 2008,
        },
        initial_year: 2006,
        ..ChartConfig::default()
    };
    let mut w = ChartWidget::new(records, config).unwrap();
    w.init(TimeMs::ZERO);
    w
}

/// Fires every live timer once per period, the way an event loop would.
fn run_periods(w: &mut ChartWidget, host: &CountingHost, periods: usize, mut now: TimeMs) -> usize {
    let mut ticks = 0;
    for _ in 0..periods {
        now = now.advanced_by(1000.0);
        for _ in 0..host.active.len() {
            w.play_tick(now);
            ticks += 1;
        }
    }
    ticks
}

#[test]
fn double_start_results_in_exactly_one_active_timer() {
    let mut w = widget();
    let mut host = CountingHost::default();

    w.start_playback(&mut host);
    w.start_playback(&mut host);
    assert!(w.is_playing());
    assert_eq!(host.scheduled, 1);
    assert_eq!(host.active.len(), 1);

    // The observable consequence: three periods advance the cursor by
    // exactly three years, not six.
    let ticks = run_periods(&mut w, &host, 3, TimeMs::ZERO);
    assert_eq!(ticks, 3);
    assert_eq!(w.year(), 2006); // 2006 -> 2007 -> 2008 -> wrap
}

#[test]
fn stop_playback_is_idempotent() {
    let mut w = widget();
    let mut host = CountingHost::default();

    w.start_playback(&mut host);
    w.stop_playback(&mut host);
    w.stop_playback(&mut host);
    assert!(!w.is_playing());
    assert_eq!(host.cancelled, 1);
    assert!(host.active.is_empty());

    // Stopped means stopped: no live timers, no ticks.
    assert_eq!(run_periods(&mut w, &host, 3, TimeMs::ZERO), 0);
    assert_eq!(w.year(), 2006);
}

#[test]
fn highlights_fire_once_per_year_and_rearm_on_wrap() {
    let mut w = widget();

    // 2006 carries the computed peak-year entry for this record set.
    let update = w.set_year(2006, TimeMs(0.0));
    let first = update.highlight.expect("peak year armed");
    assert_eq!(first.title, "Peak year");

    // Same year again: already shown.
    assert!(w.set_year(2006, TimeMs(100.0)).highlight.is_none());

    // Play through the span; the wrap back to the minimum re-arms every
    // highlight, so 2006 fires again.
    assert!(w.play_tick(TimeMs(1000.0)).highlight.is_none()); // 2007
    assert!(w.play_tick(TimeMs(2000.0)).highlight.is_none()); // 2008
    let wrapped = w.play_tick(TimeMs(3000.0));
    assert_eq!(wrapped.year, 2006);
    assert_eq!(wrapped.highlight.expect("re-armed on wrap").title, "Peak year");
}

#[test]
fn restart_stops_resets_and_rearms() {
    let mut w = widget();
    let mut host = CountingHost::default();

    w.set_year(2006, TimeMs(0.0)); // consume the 2006 highlight
    w.set_year(2008, TimeMs(500.0));
    w.start_playback(&mut host);

    let update = w.restart(&mut host, TimeMs(1000.0));
    assert_eq!(update.year, 2006);
    assert!(!w.is_playing());
    assert!(host.active.is_empty());
    assert!(update.highlight.is_some());
}

#[test]
fn playback_and_slider_share_the_cursor() {
    let mut w = widget();
    let mut host = CountingHost::default();

    w.start_playback(&mut host);
    w.play_tick(TimeMs(1000.0)); // 2007
    // A drag during playback moves the same cursor the timer advances.
    w.set_year(2008, TimeMs(1500.0));
    let update = w.play_tick(TimeMs(2000.0));
    assert_eq!(update.year, 2006); // wrapped from 2008
    assert!(w.is_playing()); // dragging does not stop the timer
}
