#[cfg(not(target_os = "linux"))]
compile_error!("edgepad reads evdev devices and only runs on Linux");

mod discovery;
mod edge_motion;
mod edge_scroll;
mod error;
mod frame;
mod input;
mod settings;
mod signals;
mod sink;
mod touchpad;

use clap::Parser;
use discovery::evdev_discovery;
use edge_motion::EdgeMotion;
use edge_scroll::EdgeScroll;
use error::Error;
use input::evdev_backend::EvdevBackend;
use settings::{
    EdgeMotionSettings, EdgeScrollSettings, HorizontalEdges, ListMode, Settings, TouchpadSettings,
    VerticalEdges, DEFAULT_EDGE_THICKNESS,
};
use signals::TerminationSignals;
use sink::uinput::{VirtualPointer, VIRTUAL_DEVICE_NAME};
use sink::MotionSink;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use touchpad::Touchpad;
use tracing::{error, info};

const EDGE_DIAGRAM: &str = "\
┌───────────────────────────────────┐
│   min_x     thickness     max_x   │
│min_y──────────────────────────┐   │
│   │                           │   │
│   │                           │   │
│   │         touchpad          │   │
│   │                           │   │
│   │                           │   │
│max_y──────────────────────────┘   │
│                                   │
└───────────────────────────────────┘";

#[derive(Parser)]
#[command(
    name = "edgepad",
    about = "Touchpad edge motion and edge scrolling",
    long_about = None,
    after_long_help = format!(
        "{EDGE_DIAGRAM}\n\n\
         While the touchpad is pressed (or double tapped) with the finger between \
         the two rectangles, the cursor keeps moving towards that edge. Unset \
         limits are derived from the touchpad size and the edge thickness \
         (default {DEFAULT_EDGE_THICKNESS})."
    )
)]
struct Cli {
    /// Edge thickness used for limits that are not set explicitly
    #[arg(short = 't', long = "thickness", allow_negative_numbers = true)]
    thickness: Option<i32>,

    #[arg(short = 'x', long, allow_negative_numbers = true)]
    minx: Option<i32>,

    #[arg(short = 'X', long, allow_negative_numbers = true)]
    maxx: Option<i32>,

    #[arg(short = 'y', long, allow_negative_numbers = true)]
    miny: Option<i32>,

    #[arg(short = 'Y', long, allow_negative_numbers = true)]
    maxy: Option<i32>,

    /// Exact name of the touchpad to use
    #[arg(short, long)]
    name: Option<String>,

    /// Also move the cursor while the touchpad is only touched
    #[arg(short, long)]
    always: bool,

    /// Accept touches and presses that start in the edge zone
    #[arg(long)]
    no_edge_protection: bool,

    /// Do not move the cursor on double tap
    #[arg(long)]
    disable_double_tap: bool,

    /// List input devices before selecting one
    #[arg(long, value_enum, default_value_t = ListMode::None)]
    list: ListMode,

    /// Cursor pixels per tick
    #[arg(long, default_value_t = 1)]
    speed: i32,

    /// Microseconds between two cursor moves along one edge
    #[arg(long, default_value_t = 3000)]
    move_interval: u64,

    /// Scroll while a touch that started on an edge slides along it
    #[arg(long)]
    scroll: bool,

    /// Left/right edges that scroll vertically
    #[arg(long, value_enum, default_value_t = VerticalEdges::Right)]
    scroll_vertical: VerticalEdges,

    /// Top/bottom edges that scroll horizontally
    #[arg(long, value_enum, default_value_t = HorizontalEdges::Bottom)]
    scroll_horizontal: HorizontalEdges,

    /// Microseconds between two scroll updates
    #[arg(long, default_value_t = 5000)]
    scroll_interval: u64,

    /// Touchpad units per 1/120 wheel detent
    #[arg(long, default_value_t = 20, allow_negative_numbers = true)]
    scroll_divisor: i32,

    /// Log coordinates and raw events
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_settings(self) -> Settings {
        Settings {
            touchpad: TouchpadSettings {
                device_name: self.name,
                min_x: self.minx,
                max_x: self.maxx,
                min_y: self.miny,
                max_y: self.maxy,
                edge_thickness: self.thickness,
                no_edge_protection: self.no_edge_protection,
                list: self.list,
            },
            motion: EdgeMotionSettings {
                speed: self.speed,
                interval: Duration::from_micros(self.move_interval),
                allow_move_while_touched: self.always,
                disable_double_tap: self.disable_double_tap,
            },
            scroll: EdgeScrollSettings {
                enabled: self.scroll,
                interval: Duration::from_micros(self.scroll_interval),
                divisor: self.scroll_divisor,
                vertical: self.scroll_vertical,
                horizontal: self.scroll_horizontal,
            },
            verbose: self.verbose,
        }
    }
}

fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "edgepad=trace"
    } else {
        "edgepad=info"
    }
}

fn init_tracing(verbose: bool) {
    let filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => tracing_subscriber::EnvFilter::new(default_filter(verbose)),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Closes the touchpad when dropped, including while a worker unwinds.
struct CloseOnExit(Arc<Touchpad>);

impl Drop for CloseOnExit {
    fn drop(&mut self) {
        self.0.close();
    }
}

/// Runs `work` on its own thread. However the thread ends, the touchpad is
/// closed so the other threads stop too.
fn spawn_worker<F>(touchpad: &Arc<Touchpad>, work: F) -> thread::JoinHandle<Result<(), Error>>
where
    F: FnOnce() -> Result<(), Error> + Send + 'static,
{
    let guard = CloseOnExit(touchpad.clone());
    thread::spawn(move || {
        let _guard = guard;
        work()
    })
}

fn run(settings: Settings) -> Result<(), Error> {
    settings.validate()?;
    let signals = TerminationSignals::block()?;

    let selected = evdev_discovery::select(&settings.touchpad)?;
    let limits = settings.touchpad.edge_limits(selected.x_range, selected.y_range);
    limits.validate()?;
    info!(
        device = %selected.resemblance.name,
        min_x = limits.min_x,
        max_x = limits.max_x,
        min_y = limits.min_y,
        max_y = limits.max_y,
        "edge limits"
    );

    let sink: Arc<dyn MotionSink> = Arc::new(VirtualPointer::open(VIRTUAL_DEVICE_NAME)?);
    let touchpad = Arc::new(Touchpad::new(limits, settings.touchpad.no_edge_protection));
    signals.spawn_watcher(touchpad.clone());

    let mut workers = Vec::new();

    let backend = EvdevBackend::new(selected.device, selected.path, settings.verbose);
    let reader_touchpad = touchpad.clone();
    workers.push(spawn_worker(&touchpad, move || {
        frame::run_reader(backend, &reader_touchpad)
    }));

    let motion = EdgeMotion::new(touchpad.clone(), sink.clone(), settings.motion.clone());
    workers.push(spawn_worker(&touchpad, move || motion.run()));

    if settings.scroll.enabled {
        let scroll = EdgeScroll::new(touchpad.clone(), sink.clone(), settings.scroll.clone());
        workers.push(spawn_worker(&touchpad, move || scroll.run()));
    }

    let mut result = Ok(());
    for worker in workers {
        match worker.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                if result.is_ok() {
                    result = Err(e);
                }
            }
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
    result
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli.into_settings()) {
        error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults_match_settings_defaults() {
        let settings = Cli::parse_from(["edgepad"]).into_settings();
        let defaults = Settings::default();
        assert_eq!(settings.motion.interval, defaults.motion.interval);
        assert_eq!(settings.motion.speed, defaults.motion.speed);
        assert_eq!(settings.scroll.interval, defaults.scroll.interval);
        assert_eq!(settings.scroll.divisor, defaults.scroll.divisor);
        assert_eq!(settings.scroll.vertical, defaults.scroll.vertical);
        assert_eq!(settings.touchpad.list, ListMode::None);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn short_options_fill_touchpad_settings() {
        let settings = Cli::parse_from([
            "edgepad", "-t", "-1", "-x", "100", "-X", "3100", "-y", "100", "-Y", "2300", "-n",
            "SYNA Touchpad", "-a",
        ])
        .into_settings();
        let t = &settings.touchpad;
        assert_eq!(t.edge_thickness, Some(-1));
        assert_eq!((t.min_x, t.max_x, t.min_y, t.max_y), (Some(100), Some(3100), Some(100), Some(2300)));
        assert_eq!(t.device_name.as_deref(), Some("SYNA Touchpad"));
        assert!(settings.motion.allow_move_while_touched);
    }

    #[test]
    fn zero_scroll_divisor_fails_before_device_access() {
        let settings = Cli::parse_from(["edgepad", "--scroll", "--scroll-divisor", "0"]).into_settings();
        assert!(matches!(run(settings), Err(Error::Configuration(_))));
    }

    #[test]
    fn panicking_worker_closes_the_touchpad() {
        let touchpad = Arc::new(Touchpad::new(settings::EdgeLimits::default(), false));
        let worker = spawn_worker(&touchpad, || panic!("worker failed"));
        assert!(worker.join().is_err());
        assert!(!touchpad.is_open());
    }

    #[test]
    fn failing_worker_closes_the_touchpad() {
        let touchpad = Arc::new(Touchpad::new(settings::EdgeLimits::default(), false));
        let worker = spawn_worker(&touchpad, || Err(Error::Configuration("bad".into())));
        assert!(matches!(worker.join().unwrap(), Err(Error::Configuration(_))));
        assert!(!touchpad.is_open());
    }

    #[test]
    fn verbose_turns_on_raw_event_tracing() {
        assert_eq!(default_filter(false), "edgepad=info");
        assert_eq!(default_filter(true), "edgepad=trace");
    }

    #[test]
    fn scroll_edges_parse() {
        let settings = Cli::parse_from([
            "edgepad",
            "--scroll-vertical",
            "both",
            "--scroll-horizontal",
            "none",
            "--list",
            "candidates",
        ])
        .into_settings();
        assert_eq!(settings.scroll.vertical, VerticalEdges::Both);
        assert_eq!(settings.scroll.horizontal, HorizontalEdges::None);
        assert_eq!(settings.touchpad.list, ListMode::Candidates);
    }
}
