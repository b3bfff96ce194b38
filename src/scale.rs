use crate::anim::Lerp;

/// Linear `[0, domain_max] -> [0, range_max]` mapping shared by bars, value
/// labels and the axis. Rebuilt from the series maximum on every
/// reconciliation; implements [`Lerp`] so the axis can tween its own mapping
/// alongside the bars instead of snapping.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LinearScale {
    pub domain_max: f64,
    pub range_max: f64,
}

impl LinearScale {
    pub fn new(domain_max: f64, range_max: f64) -> Self {
        Self {
            domain_max: domain_max.max(0.0),
            range_max: range_max.max(0.0),
        }
    }

    /// An empty domain maps everything to zero width.
    pub fn apply(&self, value: f64) -> f64 {
        if self.domain_max <= 0.0 {
            return 0.0;
        }
        (value / self.domain_max) * self.range_max
    }

    /// Round tick values covering `[0, domain_max]`, roughly `count` of them.
    /// Same 1/2/5 step selection d3 uses, so ticks land on round numbers.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        if self.domain_max <= 0.0 || count == 0 {
            return vec![0.0];
        }
        let step = tick_increment(self.domain_max, count);
        let n = (self.domain_max / step).floor() as usize;
        (0..=n).map(|i| i as f64 * step).collect()
    }
}

fn tick_increment(span: f64, count: usize) -> f64 {
    let raw = span / count as f64;
    let power = raw.log10().floor();
    let base = 10f64.powf(power);
    let err = raw / base;
    if err >= 50f64.sqrt() {
        base * 10.0
    } else if err >= 10f64.sqrt() {
        base * 5.0
    } else if err >= 2f64.sqrt() {
        base * 2.0
    } else {
        base
    }
}

impl Lerp for LinearScale {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Self {
            domain_max: f64::lerp(&a.domain_max, &b.domain_max, t),
            range_max: f64::lerp(&a.range_max, &b.range_max, t),
        }
    }
}

/// Discretized vertical band scale with a fixed number of lanes. Rank i maps
/// to the i-th band; fewer categories than lanes simply leave trailing bands
/// empty, which keeps lane heights and divider decorations stable.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BandScale {
    pub lanes: usize,
    pub range: f64,
    pub padding: f64, // fraction of one step, both inner and outer
}

impl BandScale {
    pub fn new(lanes: usize, range: f64, padding: f64) -> Self {
        Self {
            lanes: lanes.max(1),
            range: range.max(0.0),
            padding: padding.clamp(0.0, 0.5),
        }
    }

    fn step(&self) -> f64 {
        self.range / (self.lanes as f64 + self.padding)
    }

    pub fn bandwidth(&self) -> f64 {
        self.step() * (1.0 - self.padding)
    }

    /// Top edge of the band for `rank`; ranks past the last lane clamp onto it.
    pub fn slot(&self, rank: usize) -> f64 {
        let rank = rank.min(self.lanes - 1);
        let step = self.step();
        step * self.padding + rank as f64 * step
    }

    /// Y offsets of the lane dividers (boundaries between equal-height
    /// lanes, independent of band padding). Static decoration: recomputed on
    /// resize only, never per data update.
    pub fn divider_offsets(&self) -> Vec<f64> {
        let lane_height = self.range / self.lanes as f64;
        (1..self.lanes).map(|i| i as f64 * lane_height).collect()
    }
}
