use std::collections::BTreeMap;

use kurbo::{Point, Rect};
use rustc_hash::FxHashMap;

use crate::{
    aggregate::{CategorySeries, TOP_N},
    anim::Transition,
    anim_ease::Ease,
    core::{Margin, TimeMs, Viewport},
    scale::{BandScale, LinearScale},
};

/// Ordinal palette; categories keep their color for the lifetime of the
/// widget, including across a drop-out/re-entry.
pub const PALETTE: [&str; 20] = [
    "#C75B4A", "#66B2B2", "#D9C06B", "#8B4513", "#4A8B6B", "#E15759", "#76B7B2", "#59A14F",
    "#EDC948", "#B07AA1", "#FF9DA7", "#9C755F", "#BAB0AC", "#8DD3C7", "#FDB462", "#B3DE69",
    "#FCCDE5", "#80B1D3", "#BC80BD", "#4E79A7",
];

/// Fraction of the plot width the longest bar may reach, leaving room for
/// the legend column on the right.
const MAX_BAR_FRACTION: f64 = 0.75;

/// Lifecycle phase of one keyed primitive bundle:
/// `absent -> entering -> steady -> exiting -> absent`. `steady` retargets in
/// place on data changes; only a completed exit is destructive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum Phase {
    Entering,
    Steady,
    Exiting,
}

/// Animation tuning applied to every reconciliation transition.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Motion {
    pub duration_ms: f64,
    pub ease: Ease,
}

impl Default for Motion {
    fn default() -> Self {
        Self {
            duration_ms: 800.0,
            ease: Ease::Linear,
        }
    }
}

/// Typed operation for the host scene graph, keyed by category identity.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub enum RenderOp {
    /// Materialize a primitive bundle at its deterministic initial state:
    /// zero width, zero opacity, already parked in its target lane.
    Create {
        key: String,
        color: &'static str,
        lane_y: f64,
        bandwidth: f64,
    },
    /// Animate the bundle toward new targets over `duration_ms`, starting
    /// from whatever is currently rendered.
    Animate {
        key: String,
        rank: usize,
        width: f64,
        lane_y: f64,
        count: u64,
        opacity: f64,
        duration_ms: f64,
    },
    /// Fade/collapse toward removal; the key stays live until the exit
    /// animation completes.
    Exit { key: String, duration_ms: f64 },
    /// The exit animation finished; drop the node.
    Destroy { key: String },
}

/// Ordered operations produced by one reconciliation.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct ChangeSet {
    pub ops: Vec<RenderOp>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    fn keys_matching(&self, pred: impl Fn(&RenderOp) -> Option<&str>) -> Vec<&str> {
        self.ops.iter().filter_map(|op| pred(op)).collect()
    }

    pub fn created(&self) -> Vec<&str> {
        self.keys_matching(|op| match op {
            RenderOp::Create { key, .. } => Some(key),
            _ => None,
        })
    }

    pub fn animated(&self) -> Vec<&str> {
        self.keys_matching(|op| match op {
            RenderOp::Animate { key, .. } => Some(key),
            _ => None,
        })
    }

    pub fn exited(&self) -> Vec<&str> {
        self.keys_matching(|op| match op {
            RenderOp::Exit { key, .. } => Some(key),
            _ => None,
        })
    }

    pub fn destroyed(&self) -> Vec<&str> {
        self.keys_matching(|op| match op {
            RenderOp::Destroy { key } => Some(key),
            _ => None,
        })
    }
}

#[derive(Clone, Debug)]
struct BarVisual {
    color: &'static str,
    phase: Phase,
    rank: usize,
    width: Transition<f64>,
    lane_y: Transition<f64>,
    label_value: Transition<f64>,
    opacity: Transition<f64>,
}

impl BarVisual {
    fn entering(color: &'static str, lane_y: f64, rank: usize) -> Self {
        Self {
            color,
            phase: Phase::Entering,
            rank,
            width: Transition::settled(0.0),
            lane_y: Transition::settled(lane_y),
            label_value: Transition::settled(0.0),
            opacity: Transition::settled(0.0),
        }
    }
}

/// One resolved primitive bundle at a sampled instant. Corner radius, fonts
/// and the pictogram glyph are host styling; the core hands out geometry.
#[derive(Clone, Debug, serde::Serialize)]
pub struct BarFrame {
    pub key: String,
    pub phase: Phase,
    pub rank: usize,
    pub color: &'static str,
    pub rect: Rect,
    pub opacity: f64,
    /// Count-up integer for the value label.
    pub label_value: u64,
    /// End-anchored, just inside the bar tip.
    pub label_anchor: Point,
    /// End-anchored at the right edge of the plot.
    pub legend_anchor: Point,
    pub icon_anchor: Point,
}

#[derive(Clone, Debug, serde::Serialize)]
pub struct AxisTick {
    pub value: f64,
    pub x: f64,
}

/// The shared horizontal scale as currently rendered, mid-tween included.
#[derive(Clone, Debug, serde::Serialize)]
pub struct AxisFrame {
    pub scale: LinearScale,
    pub ticks: Vec<AxisTick>,
}

/// Everything the host needs to draw one frame.
#[derive(Clone, Debug, serde::Serialize)]
pub struct FrameSnapshot {
    /// Sorted by rank; exited-but-not-yet-destroyed bundles render last.
    pub bars: Vec<BarFrame>,
    pub axis: AxisFrame,
    /// Absolute divider ys, present only after a layout change.
    pub dividers: Option<Vec<f64>>,
}

/// The keyed reconciliation core. Holds the per-category primitive bundles
/// and their in-flight transitions; each `reconcile` three-way diffs the new
/// series against the keyed set and retargets from currently rendered
/// values, so rapid slider/autoplay updates compose instead of racing.
#[derive(Clone, Debug)]
pub struct Reconciler {
    motion: Motion,
    margin: Margin,
    plot: Rect,
    band: BandScale,
    axis: Transition<LinearScale>,
    bars: BTreeMap<String, BarVisual>,
    palette_index: FxHashMap<String, usize>,
    dividers_dirty: bool,
}

impl Reconciler {
    pub fn new(viewport: Viewport, margin: Margin, motion: Motion) -> Self {
        let plot = margin.plot_rect(viewport);
        Self {
            motion,
            margin,
            plot,
            band: BandScale::new(TOP_N, plot.height(), 0.1),
            axis: Transition::settled(LinearScale::new(0.0, plot.width() * MAX_BAR_FRACTION)),
            bars: BTreeMap::new(),
            palette_index: FxHashMap::default(),
            dividers_dirty: true,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.bars.contains_key(key)
    }

    pub fn phase_of(&self, key: &str) -> Option<Phase> {
        self.bars.get(key).map(|b| b.phase)
    }

    fn color_for(&mut self, key: &str) -> &'static str {
        let next = self.palette_index.len() % PALETTE.len();
        let idx = *self
            .palette_index
            .entry(key.to_string())
            .or_insert(next);
        PALETTE[idx % PALETTE.len()]
    }

    fn lane_y(&self, rank: usize) -> f64 {
        self.plot.y0 + self.band.slot(rank)
    }

    /// Three-way diff of `series` against the keyed set.
    #[tracing::instrument(skip(self, series), fields(categories = series.len()))]
    pub fn reconcile(&mut self, series: &CategorySeries, now: TimeMs) -> ChangeSet {
        let mut ops = Vec::new();

        // Deferred destruction: exits whose animation has completed leave
        // the keyed set now, never synchronously at exit time.
        self.prune_finished_exits(now, &mut ops);

        let target_scale = LinearScale::new(
            series.max_count() as f64,
            self.plot.width() * MAX_BAR_FRACTION,
        );
        self.axis
            .retarget(target_scale, now, self.motion.duration_ms, self.motion.ease);

        for (rank, entry) in series.iter().enumerate() {
            let key = entry.category.as_str();

            // A key still animating out was absent for a full step; it
            // re-enters fresh rather than resurrecting the dying node.
            if self.bars.get(key).is_some_and(|b| b.phase == Phase::Exiting) {
                self.bars.remove(key);
                ops.push(RenderOp::Destroy {
                    key: key.to_string(),
                });
            }

            let width = target_scale.apply(entry.count as f64);
            let lane_y = self.lane_y(rank);

            match self.bars.get_mut(key) {
                Some(bar) => {
                    bar.phase = Phase::Steady;
                    bar.rank = rank;
                    let mut changed = false;
                    changed |= bar
                        .width
                        .retarget(width, now, self.motion.duration_ms, self.motion.ease);
                    changed |= bar
                        .lane_y
                        .retarget(lane_y, now, self.motion.duration_ms, self.motion.ease);
                    changed |= bar.label_value.retarget(
                        entry.count as f64,
                        now,
                        self.motion.duration_ms,
                        self.motion.ease,
                    );
                    changed |= bar
                        .opacity
                        .retarget(1.0, now, self.motion.duration_ms, self.motion.ease);
                    if changed {
                        ops.push(RenderOp::Animate {
                            key: key.to_string(),
                            rank,
                            width,
                            lane_y,
                            count: entry.count,
                            opacity: 1.0,
                            duration_ms: self.motion.duration_ms,
                        });
                    }
                }
                None => {
                    let color = self.color_for(key);
                    let mut bar = BarVisual::entering(color, lane_y, rank);
                    bar.width
                        .retarget(width, now, self.motion.duration_ms, self.motion.ease);
                    bar.label_value.retarget(
                        entry.count as f64,
                        now,
                        self.motion.duration_ms,
                        self.motion.ease,
                    );
                    bar.opacity
                        .retarget(1.0, now, self.motion.duration_ms, self.motion.ease);
                    self.bars.insert(key.to_string(), bar);
                    ops.push(RenderOp::Create {
                        key: key.to_string(),
                        color,
                        lane_y,
                        bandwidth: self.band.bandwidth(),
                    });
                    ops.push(RenderOp::Animate {
                        key: key.to_string(),
                        rank,
                        width,
                        lane_y,
                        count: entry.count,
                        opacity: 1.0,
                        duration_ms: self.motion.duration_ms,
                    });
                }
            }
        }

        // Exit pass: keys no longer in the series collapse and fade.
        for (key, bar) in &mut self.bars {
            if bar.phase == Phase::Exiting || series.count_for(key).is_some() {
                continue;
            }
            bar.phase = Phase::Exiting;
            bar.width
                .retarget(0.0, now, self.motion.duration_ms, self.motion.ease);
            bar.opacity
                .retarget(0.0, now, self.motion.duration_ms, self.motion.ease);
            bar.label_value
                .retarget(0.0, now, self.motion.duration_ms, self.motion.ease);
            ops.push(RenderOp::Exit {
                key: key.clone(),
                duration_ms: self.motion.duration_ms,
            });
        }

        let set = ChangeSet { ops };
        tracing::debug!(
            created = set.created().len(),
            animated = set.animated().len(),
            exited = set.exited().len(),
            destroyed = set.destroyed().len(),
            "reconciled"
        );
        set
    }

    fn prune_finished_exits(&mut self, now: TimeMs, ops: &mut Vec<RenderOp>) {
        let finished: Vec<String> = self
            .bars
            .iter()
            .filter(|(_, bar)| bar.phase == Phase::Exiting && bar.opacity.is_complete(now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in finished {
            self.bars.remove(&key);
            ops.push(RenderOp::Destroy { key });
        }
    }

    /// Relayouts for a new viewport. Dividers are static decoration; this is
    /// the only place the dirty flag is raised, so data ticks never redraw
    /// them.
    pub fn resize(&mut self, viewport: Viewport, now: TimeMs) -> ChangeSet {
        self.plot = self.margin.plot_rect(viewport);
        self.band = BandScale::new(TOP_N, self.plot.height(), 0.1);
        self.dividers_dirty = true;

        let domain_max = self.axis.target().domain_max;
        let target_scale = LinearScale::new(domain_max, self.plot.width() * MAX_BAR_FRACTION);
        self.axis
            .retarget(target_scale, now, self.motion.duration_ms, self.motion.ease);

        let motion = self.motion;
        let band = self.band;
        let plot_y0 = self.plot.y0;
        let mut ops = Vec::new();
        for (key, bar) in &mut self.bars {
            if bar.phase == Phase::Exiting {
                continue;
            }
            let count = *bar.label_value.target();
            let width = target_scale.apply(count);
            let lane_y = plot_y0 + band.slot(bar.rank);
            let mut changed = false;
            changed |= bar.width.retarget(width, now, motion.duration_ms, motion.ease);
            changed |= bar
                .lane_y
                .retarget(lane_y, now, motion.duration_ms, motion.ease);
            if changed {
                ops.push(RenderOp::Animate {
                    key: key.clone(),
                    rank: bar.rank,
                    width,
                    lane_y,
                    count: count.round().max(0.0) as u64,
                    opacity: *bar.opacity.target(),
                    duration_ms: motion.duration_ms,
                });
            }
        }
        ChangeSet { ops }
    }

    /// Resolves every transition at `now` into drawable primitives. Clears
    /// the divider dirty flag when it hands the dividers out.
    pub fn sample(&mut self, now: TimeMs) -> FrameSnapshot {
        let mut bars: Vec<BarFrame> = self
            .bars
            .iter()
            .map(|(key, bar)| self.sample_bar(key, bar, now))
            .collect();
        bars.sort_by_key(|b| (b.phase == Phase::Exiting, b.rank));

        let scale = self.axis.value_at(now);
        let ticks = scale
            .ticks(5)
            .into_iter()
            .map(|value| AxisTick {
                value,
                x: self.plot.x0 + scale.apply(value),
            })
            .collect();

        let dividers = if self.dividers_dirty {
            self.dividers_dirty = false;
            Some(
                self.band
                    .divider_offsets()
                    .into_iter()
                    .map(|y| self.plot.y0 + y)
                    .collect(),
            )
        } else {
            None
        };

        FrameSnapshot {
            bars,
            axis: AxisFrame { scale, ticks },
            dividers,
        }
    }

    fn sample_bar(&self, key: &str, bar: &BarVisual, now: TimeMs) -> BarFrame {
        let width = bar.width.value_at(now).max(0.0);
        let y = bar.lane_y.value_at(now);
        let height = self.band.bandwidth();
        let mid_y = y + height / 2.0;
        let x0 = self.plot.x0;

        BarFrame {
            key: key.to_string(),
            phase: bar.phase,
            rank: bar.rank,
            color: bar.color,
            rect: Rect::new(x0, y, x0 + width, y + height),
            opacity: bar.opacity.value_at(now).clamp(0.0, 1.0),
            label_value: bar.label_value.value_at(now).round().max(0.0) as u64,
            label_anchor: Point::new(x0 + (width - 5.0).max(5.0), mid_y),
            legend_anchor: Point::new(self.plot.x1 - 10.0, mid_y),
            icon_anchor: Point::new(x0 + (width - 10.0).max(50.0) + 15.0, mid_y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::CategoryCount;

    fn series(entries: &[(&str, u64)]) -> CategorySeries {
        CategorySeries(
            entries
                .iter()
                .map(|(category, count)| CategoryCount {
                    category: (*category).to_string(),
                    count: *count,
                })
                .collect(),
        )
    }

    fn reconciler() -> Reconciler {
        Reconciler::new(
            Viewport::new(810.0, 510.0).unwrap(),
            Margin::uniform(5.0),
            Motion::default(),
        )
    }

    #[test]
    fn entering_bars_start_staged() {
        let mut r = reconciler();
        let set = r.reconcile(&series(&[("A", 4)]), TimeMs::ZERO);
        assert_eq!(set.created(), vec!["A"]);

        let frame = r.sample(TimeMs::ZERO);
        let bar = &frame.bars[0];
        assert_eq!(bar.rect.width(), 0.0);
        assert_eq!(bar.opacity, 0.0);
        assert_eq!(bar.label_value, 0);
        assert_eq!(bar.phase, Phase::Entering);
    }

    #[test]
    fn bars_animate_to_scaled_width() {
        let mut r = reconciler();
        r.reconcile(&series(&[("A", 4), ("B", 2)]), TimeMs::ZERO);
        let frame = r.sample(TimeMs(800.0));

        let a = frame.bars.iter().find(|b| b.key == "A").unwrap();
        let b = frame.bars.iter().find(|b| b.key == "B").unwrap();
        // Max count spans 75% of the 800px plot; B is half of A.
        assert!((a.rect.width() - 600.0).abs() < 1e-9);
        assert!((b.rect.width() - 300.0).abs() < 1e-9);
        assert_eq!(a.label_value, 4);
        assert_eq!(a.opacity, 1.0);
    }

    #[test]
    fn reconcile_is_idempotent() {
        let mut r = reconciler();
        let s = series(&[("A", 4), ("B", 2)]);
        r.reconcile(&s, TimeMs::ZERO);
        let again = r.reconcile(&s, TimeMs(100.0));
        assert!(again.is_empty());
        let after_settle = r.reconcile(&s, TimeMs(2000.0));
        assert!(after_settle.is_empty());
    }

    #[test]
    fn rank_swap_moves_lanes_without_recreating() {
        let mut r = reconciler();
        r.reconcile(&series(&[("A", 4), ("B", 2)]), TimeMs::ZERO);
        let lane_of = |frame: &FrameSnapshot, key: &str| {
            frame.bars.iter().find(|b| b.key == key).unwrap().rect.y0
        };
        let settled = r.sample(TimeMs(800.0));
        let a_y = lane_of(&settled, "A");
        let b_y = lane_of(&settled, "B");

        let set = r.reconcile(&series(&[("B", 9), ("A", 4)]), TimeMs(1000.0));
        assert!(set.created().is_empty());
        assert_eq!(set.animated().len(), 2);

        let swapped = r.sample(TimeMs(1800.0));
        assert_eq!(lane_of(&swapped, "B"), a_y);
        assert_eq!(lane_of(&swapped, "A"), b_y);
        assert_eq!(r.phase_of("A"), Some(Phase::Steady));
    }

    #[test]
    fn exits_are_deferred_until_animation_completes() {
        let mut r = reconciler();
        r.reconcile(&series(&[("A", 4), ("B", 2)]), TimeMs::ZERO);

        let set = r.reconcile(&series(&[("A", 4)]), TimeMs(1000.0));
        assert_eq!(set.exited(), vec!["B"]);
        assert!(set.destroyed().is_empty());
        assert!(r.contains("B"));
        assert_eq!(r.phase_of("B"), Some(Phase::Exiting));

        // Mid-exit the node still renders, fading.
        let mid = r.sample(TimeMs(1400.0));
        let b = mid.bars.iter().find(|b| b.key == "B").unwrap();
        assert!(b.opacity > 0.0 && b.opacity < 1.0);

        // Next reconcile after completion destroys it.
        let set = r.reconcile(&series(&[("A", 4)]), TimeMs(2000.0));
        assert_eq!(set.destroyed(), vec!["B"]);
        assert!(!r.contains("B"));
    }

    #[test]
    fn reentry_after_full_absence_enters_fresh() {
        let mut r = reconciler();
        r.reconcile(&series(&[("A", 4), ("B", 2)]), TimeMs::ZERO);
        // B drops out...
        r.reconcile(&series(&[("A", 4)]), TimeMs(1000.0));
        // ...and reappears while its exit is still animating.
        let set = r.reconcile(&series(&[("A", 4), ("B", 3)]), TimeMs(1400.0));
        assert_eq!(set.destroyed(), vec!["B"]);
        assert_eq!(set.created(), vec!["B"]);
        assert_eq!(r.phase_of("B"), Some(Phase::Entering));

        let frame = r.sample(TimeMs(1400.0));
        let b = frame.bars.iter().find(|b| b.key == "B").unwrap();
        assert_eq!(b.rect.width(), 0.0);
    }

    #[test]
    fn persisting_bar_interrupted_mid_flight_composes() {
        let mut r = reconciler();
        r.reconcile(&series(&[("A", 4)]), TimeMs::ZERO);
        // Interrupt at half the 800ms transition: rendered width is 300.
        r.reconcile(&series(&[("A", 2)]), TimeMs(400.0));
        let frame = r.sample(TimeMs(400.0));
        let a = frame.bars.iter().find(|b| b.key == "A").unwrap();
        assert!((a.rect.width() - 300.0).abs() < 1e-9);
        // New target: count 2 is now the max, so full 600px.
        let settled = r.sample(TimeMs(1200.0));
        let a = settled.bars.iter().find(|b| b.key == "A").unwrap();
        assert!((a.rect.width() - 600.0).abs() < 1e-9);
    }

    #[test]
    fn axis_tweens_with_the_bars() {
        let mut r = reconciler();
        r.reconcile(&series(&[("A", 10)]), TimeMs::ZERO);
        r.sample(TimeMs(800.0));
        r.reconcile(&series(&[("A", 30)]), TimeMs(1000.0));

        let mid = r.sample(TimeMs(1400.0));
        assert!((mid.axis.scale.domain_max - 20.0).abs() < 1e-9);
        let done = r.sample(TimeMs(1800.0));
        assert!((done.axis.scale.domain_max - 30.0).abs() < 1e-9);
    }

    #[test]
    fn dividers_only_appear_after_layout_changes() {
        let mut r = reconciler();
        r.reconcile(&series(&[("A", 1)]), TimeMs::ZERO);

        let first = r.sample(TimeMs::ZERO);
        let dividers = first.dividers.expect("initial layout is dirty");
        assert_eq!(dividers.len(), TOP_N - 1);

        let second = r.sample(TimeMs(100.0));
        assert!(second.dividers.is_none());

        r.resize(Viewport::new(410.0, 260.0).unwrap(), TimeMs(200.0));
        let resized = r.sample(TimeMs(200.0));
        assert!(resized.dividers.is_some());
    }

    #[test]
    fn colors_are_stable_across_reentry() {
        let mut r = reconciler();
        r.reconcile(&series(&[("A", 4), ("B", 2)]), TimeMs::ZERO);
        let color = r.sample(TimeMs::ZERO).bars[1].color;

        r.reconcile(&series(&[("A", 4)]), TimeMs(1000.0));
        r.reconcile(&series(&[("A", 4)]), TimeMs(3000.0)); // destroys B
        let set = r.reconcile(&series(&[("A", 4), ("B", 5)]), TimeMs(4000.0));
        assert_eq!(set.created(), vec!["B"]);

        let frame = r.sample(TimeMs(4000.0));
        let b = frame.bars.iter().find(|b| b.key == "B").unwrap();
        assert_eq!(b.color, color);
    }

    #[test]
    fn empty_series_renders_zero_bars_gracefully() {
        let mut r = reconciler();
        r.reconcile(&series(&[("A", 4)]), TimeMs::ZERO);
        r.reconcile(&CategorySeries::default(), TimeMs(1000.0));
        let set = r.reconcile(&CategorySeries::default(), TimeMs(3000.0));
        assert_eq!(set.destroyed(), vec!["A"]);
        assert!(r.is_empty());
        let frame = r.sample(TimeMs(3000.0));
        assert!(frame.bars.is_empty());
    }
}
