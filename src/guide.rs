//! # Lanechart guide (v0.1.0)
//!
//! A standalone walkthrough of the architecture and public API, for anyone
//! wiring the core into a host page or embedding it somewhere new.
//!
//! ---
//!
//! ## Core concepts
//!
//! - [`Record`](crate::Record): one pedestrian involvement, normalized at ingest
//! - [`FilterState`](crate::FilterState): the AND-combined predicates, with one shared `accepts`
//! - [`YearCursor`](crate::YearCursor): the single source of truth for "current year" + playback
//! - [`CategorySeries`](crate::CategorySeries): the ranked top-10 view, regenerated whole on every change
//! - [`Reconciler`](crate::Reconciler): keyed enter/update/exit diffing with interruptible tweens
//! - [`FrameSnapshot`](crate::FrameSnapshot): the resolved draw list the host renders
//! - [`ChartWidget`](crate::ChartWidget): the owned context object tying it all together
//!
//! The update path is explicitly staged:
//!
//! 1. An event moves the cursor or filters ([`ChartWidget::set_year`](crate::ChartWidget::set_year), …)
//! 2. The view recomputes: [`compute_series`](crate::compute_series)
//! 3. The keyed set reconciles: [`Reconciler::reconcile`](crate::Reconciler::reconcile), emitting [`RenderOp`](crate::RenderOp)s
//! 4. The host samples frames at its own pace: [`ChartWidget::frame`](crate::ChartWidget::frame)
//!
//! ---
//!
//! ## "No clock, no scene graph" (and why)
//!
//! The crate never reads wall time and never touches a rendering library.
//! Hosts pass a monotonic [`TimeMs`](crate::TimeMs) into every entry point,
//! and provide the playback timer through the [`TimerHost`](crate::TimerHost)
//! trait. That makes every behavior, including mid-animation interruption,
//! deterministic and testable by picking timestamps.
//!
//! The same boundary applies to output. The core describes visual primitives
//! (bars, count-up labels, legend text anchors, icon anchors, the animating
//! axis, lane dividers) as values; drawing them, styling them, and attaching
//! pointer events is the host's job. Every scene operation (create, animate,
//! destroy) is keyed by the category label, never by array position.
//!
//! ---
//!
//! ## Interruption model
//!
//! Every animated quantity is a [`Transition`](crate::Transition). Retargeting
//! samples the currently rendered value and restarts from there, so a burst
//! of slider events composes smoothly: nothing snaps, nothing races, and a
//! category that stays on screen always animates from where the user last
//! saw it. Exits are the one deferred case: an exiting bar keeps its key
//! until its collapse finishes, and only the following reconciliation emits
//! the destroy.
