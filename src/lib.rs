#![forbid(unsafe_code)]

pub mod aggregate;
pub mod anim;
pub mod anim_ease;
pub mod core;
pub mod cursor;
pub mod error;
pub mod filter;
pub mod guide;
pub mod highlight;
pub mod ingest;
pub mod reconcile;
pub mod record;
pub mod scale;
pub mod tooltip;
pub mod widget;

pub use aggregate::{CategoryCount, CategorySeries, TOP_N, compute_series};
pub use anim::{Lerp, Transition};
pub use anim_ease::Ease;
pub use core::{Margin, TimeMs, Viewport, YearSpan};
pub use cursor::{TimerHandle, TimerHost, YearCursor};
pub use error::{LanechartError, LanechartResult};
pub use filter::{FilterState, Selection, SeverityFilter, YearWindow};
pub use highlight::{Highlight, HighlightAdvisor};
pub use reconcile::{ChangeSet, FrameSnapshot, Motion, Phase, Reconciler, RenderOp};
pub use record::{Record, Severity};
pub use scale::{BandScale, LinearScale};
pub use tooltip::{HoverInfo, compute_info};
pub use widget::{ChartConfig, ChartWidget, YearUpdate};
