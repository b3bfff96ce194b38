use crate::error::{LanechartError, LanechartResult};

pub use kurbo::{Point, Rect};

/// Inclusive span of chart years.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct YearSpan {
    pub min: i32,
    pub max: i32, // inclusive
}

impl YearSpan {
    pub fn new(min: i32, max: i32) -> LanechartResult<Self> {
        if min > max {
            return Err(LanechartError::validation("YearSpan min must be <= max"));
        }
        Ok(Self { min, max })
    }

    pub fn contains(self, year: i32) -> bool {
        self.min <= year && year <= self.max
    }

    pub fn clamp(self, year: i32) -> i32 {
        year.clamp(self.min, self.max)
    }

    pub fn len_years(self) -> u32 {
        (self.max - self.min) as u32 + 1
    }

    /// Next year, wrapping back to `min` past `max`.
    pub fn succ_wrapping(self, year: i32) -> i32 {
        if year >= self.max { self.min } else { year + 1 }
    }
}

/// Monotonic host time in milliseconds. The host supplies it on every event
/// and frame sample; the crate never reads a wall clock.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
pub struct TimeMs(pub f64);

impl TimeMs {
    pub const ZERO: Self = Self(0.0);

    pub fn advanced_by(self, ms: f64) -> Self {
        Self(self.0 + ms)
    }

    pub fn since(self, earlier: Self) -> f64 {
        self.0 - earlier.0
    }
}

/// Outer pixel size of the widget area.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> LanechartResult<Self> {
        if !(width > 0.0 && height > 0.0) {
            return Err(LanechartError::validation(
                "Viewport width/height must be > 0",
            ));
        }
        Ok(Self { width, height })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margin {
    pub fn uniform(px: f64) -> Self {
        Self {
            top: px,
            right: px,
            bottom: px,
            left: px,
        }
    }

    /// Inner plot rectangle after subtracting the margin, floored at zero size.
    pub fn plot_rect(self, viewport: Viewport) -> Rect {
        let w = (viewport.width - self.left - self.right).max(0.0);
        let h = (viewport.height - self.top - self.bottom).max(0.0);
        Rect::new(self.left, self.top, self.left + w, self.top + h)
    }
}

impl Default for Margin {
    fn default() -> Self {
        Self::uniform(5.0)
    }
}
