use std::time::Duration;

use crate::core::YearSpan;

/// Opaque handle to a repeating timer owned by the host event loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TimerHandle(pub u64);

/// Playback timer capability. The host owns the actual timer machinery; on
/// each fire it calls back into the widget (`ChartWidget::play_tick`).
/// Everything is single-threaded and synchronous: a fired tick runs to
/// completion before the next event is processed.
pub trait TimerHost {
    fn schedule_repeating(&mut self, period: Duration) -> TimerHandle;
    fn cancel(&mut self, handle: TimerHandle);
}

/// Outcome of advancing the cursor by one year.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Advance {
    pub year: i32,
    /// True when the cursor wrapped back to the span minimum; the caller
    /// resets highlight tracking on wrap.
    pub wrapped: bool,
}

/// The single source of truth for "current year", with an attached playback
/// timer. At most one timer handle exists while playing; `start_playback`
/// while already playing is a guarded no-op and `stop_playback` is
/// idempotent, which makes the pair mutually exclusive over the one shared
/// mutable resource.
#[derive(Clone, Debug)]
pub struct YearCursor {
    span: YearSpan,
    initial: i32,
    current: i32,
    playing: Option<TimerHandle>,
    interval: Duration,
}

impl YearCursor {
    pub fn new(span: YearSpan, initial: i32, interval: Duration) -> Self {
        let initial = span.clamp(initial);
        Self {
            span,
            initial,
            current: initial,
            playing: None,
            interval,
        }
    }

    pub fn year(&self) -> i32 {
        self.current
    }

    pub fn span(&self) -> YearSpan {
        self.span
    }

    pub fn is_playing(&self) -> bool {
        self.playing.is_some()
    }

    /// Jumps directly (slider drag); out-of-range input clamps silently.
    pub fn set(&mut self, year: i32) -> i32 {
        self.current = self.span.clamp(year);
        self.current
    }

    /// Increments the year, wrapping past the span maximum.
    pub fn advance(&mut self) -> Advance {
        let wrapped = self.current >= self.span.max;
        self.current = self.span.succ_wrapping(self.current);
        Advance {
            year: self.current,
            wrapped,
        }
    }

    pub fn start_playback(&mut self, host: &mut dyn TimerHost) {
        if self.playing.is_some() {
            return;
        }
        self.playing = Some(host.schedule_repeating(self.interval));
    }

    pub fn stop_playback(&mut self, host: &mut dyn TimerHost) {
        if let Some(handle) = self.playing.take() {
            host.cancel(handle);
        }
    }

    /// Stops playback and resets to the configured initial year. The caller
    /// also resets highlight tracking.
    pub fn restart(&mut self, host: &mut dyn TimerHost) -> i32 {
        self.stop_playback(host);
        self.current = self.initial;
        self.current
    }
}
