use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use lanechart::{
    ChartConfig, ChartWidget, FilterState, Severity, SeverityFilter, TimeMs, TimerHandle,
    TimerHost, YearWindow, compute_series,
};

#[derive(Parser, Debug)]
#[command(name = "lanechart", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the ranked top-10 action series for a year as JSON.
    Series(SeriesArgs),
    /// Simulate timeline playback headlessly, one line per year.
    Play(PlayArgs),
}

#[derive(Parser, Debug)]
struct SeriesArgs {
    /// Input collisions CSV.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Cutoff year (cumulative from the dataset minimum).
    #[arg(long)]
    year: i32,

    /// Restrict to one severity.
    #[arg(long, value_enum)]
    severity: Option<SeverityChoice>,

    /// Count this year alone instead of accumulating from the minimum.
    #[arg(long)]
    single_year: bool,
}

#[derive(Parser, Debug)]
struct PlayArgs {
    /// Input collisions CSV.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Leaders to print per year.
    #[arg(long, default_value_t = 3)]
    top: usize,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SeverityChoice {
    Fatal,
    Nonfatal,
}

impl SeverityChoice {
    fn to_filter(self) -> SeverityFilter {
        match self {
            Self::Fatal => SeverityFilter::Only(Severity::Fatal),
            Self::Nonfatal => SeverityFilter::Only(Severity::NonFatal),
        }
    }
}

/// The CLI has no event loop; playback is driven by hand, so scheduling is
/// bookkeeping only.
#[derive(Default)]
struct ManualTimer {
    next_id: u64,
}

impl TimerHost for ManualTimer {
    fn schedule_repeating(&mut self, _period: std::time::Duration) -> TimerHandle {
        self.next_id += 1;
        TimerHandle(self.next_id)
    }

    fn cancel(&mut self, _handle: TimerHandle) {}
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Series(args) => cmd_series(args),
        Command::Play(args) => cmd_play(args),
    }
}

fn cmd_series(args: SeriesArgs) -> anyhow::Result<()> {
    let records = lanechart::ingest::load_records(&args.in_path)
        .with_context(|| format!("load collisions '{}'", args.in_path.display()))?;

    let mut filters = FilterState::default();
    if let Some(choice) = args.severity {
        filters.severity = choice.to_filter();
    }

    let window = if args.single_year {
        YearWindow::Single(args.year)
    } else {
        YearWindow::Cumulative {
            from: ChartConfig::default().span.min,
            through: args.year,
        }
    };

    let series = compute_series(&records, &filters, window);
    println!("{}", serde_json::to_string_pretty(&series)?);
    Ok(())
}

fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    let records = lanechart::ingest::load_records(&args.in_path)
        .with_context(|| format!("load collisions '{}'", args.in_path.display()))?;

    let config = ChartConfig::default();
    let interval_ms = config.playback_interval.as_millis() as f64;
    let span = config.span;
    let mut widget = ChartWidget::new(records, config)?;
    let mut timer = ManualTimer::default();

    let mut now = TimeMs::ZERO;
    widget.init(now);
    print_year(&widget, span.min, args.top, None);

    widget.start_playback(&mut timer);
    for _ in span.min..span.max {
        now = now.advanced_by(interval_ms);
        let update = widget.play_tick(now);
        print_year(&widget, update.year, args.top, update.highlight.as_ref());
    }
    widget.stop_playback(&mut timer);
    Ok(())
}

fn print_year(
    widget: &ChartWidget,
    year: i32,
    top: usize,
    highlight: Option<&lanechart::Highlight>,
) {
    let series = widget.current_series();
    let leaders: Vec<String> = series
        .iter()
        .take(top)
        .map(|e| format!("{} ({})", e.category, e.count))
        .collect();
    match highlight {
        Some(h) => println!("{year}: {} -- {}", leaders.join(", "), h.title),
        None => println!("{year}: {}", leaders.join(", ")),
    }
}
