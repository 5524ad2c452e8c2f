//! Polling driver for the plant moisture dashboard.
//!
//! Loads the configuration, builds the dashboard, then runs one refresh tick
//! immediately and another after every interval, forever (or `--ticks` times).
//!
//! # Output
//!
//! The scene is drawn into a `SimulatorDisplay` frame buffer matching the
//! matrix size. From there:
//!
//! - `--snapshot out.png` rewrites a scaled PNG after every redraw, so the
//!   file always shows the current dashboard.
//! - With the `window` cargo feature, an SDL window mirrors the frame buffer.
//!   Window events are pumped every frame so the window stays responsive
//!   through the long sleep between ticks; closing it exits.
//!
//! # Examples
//!
//! ```text
//! # Offline demo, five quick ticks, PNG output
//! plant-dashboard --simulate --interval 0 --ticks 5 --snapshot dash.png
//!
//! # Real feeds
//! AIO_USERNAME=me AIO_KEY=... plant-dashboard --config plants.toml
//! ```

use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics_simulator::{OutputSettings, OutputSettingsBuilder, SimulatorDisplay};
use log::{debug, error, info, warn};
use plant_dashboard::config::MIN_REFRESH_INTERVAL;
use plant_dashboard::feed::{AdafruitIoFeed, FeedSource, SimulatedFeed};
use plant_dashboard::metrics::RefreshMetrics;
use plant_dashboard::render::RenderState;
use plant_dashboard::{Dashboard, DashboardConfig, DashboardError};

/// Window event polling period.
#[cfg(feature = "window")]
const FRAME_TIME: Duration = Duration::from_millis(50);

#[derive(Debug, Parser)]
#[command(name = "plant-dashboard")]
#[command(about = "Soil-moisture dashboard for a 64x32 LED matrix")]
struct Cli {
    /// TOML configuration file (defaults are used when omitted)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Use generated readings instead of Adafruit IO
    #[arg(long, default_value_t = false)]
    simulate: bool,
    /// Stop after this many refresh ticks
    #[arg(long)]
    ticks: Option<u64>,
    /// Write a PNG of the display after every redraw
    #[arg(long)]
    snapshot: Option<PathBuf>,
    /// Refresh interval in seconds, overriding the configuration
    #[arg(long)]
    interval: Option<u64>,
    /// Pixel scale for the snapshot and the window
    #[arg(long, default_value_t = 8)]
    scale: u32,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run(Cli::parse()) {
        error!("{err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), DashboardError> {
    let config = DashboardConfig::load(cli.config.as_deref())?;

    let source: Box<dyn FeedSource> = if cli.simulate {
        info!("using simulated feeds");
        Box::new(SimulatedFeed::new())
    } else {
        let (username, key) = config.credentials()?;
        info!("polling Adafruit IO as {username} at {}", config.feed.base_url);
        Box::new(AdafruitIoFeed::new(&config.feed, username, key)?)
    };

    let interval = refresh_interval(&cli, &config);
    let dashboard = Dashboard::new(&config)?;
    let output_settings = OutputSettingsBuilder::new().scale(cli.scale.max(1)).pixel_spacing(1).build();

    let mut driver = Driver {
        display: SimulatorDisplay::new(config.screen),
        background: config.palette.background,
        dashboard,
        source,
        render_state: RenderState::new(),
        metrics: RefreshMetrics::new(),
        snapshot: cli.snapshot,
        output_settings,
        ticks_run: 0,
    };
    driver.redraw()?;

    info!("refreshing every {}s", interval.as_secs());
    run_loop(&mut driver, interval, cli.ticks)
}

/// `--interval` wins over the file. Real feeds are never polled faster than
/// the rate limit allows.
fn refresh_interval(
    cli: &Cli,
    config: &DashboardConfig,
) -> Duration {
    let interval = cli.interval.map_or(config.refresh_interval, Duration::from_secs);
    if !cli.simulate && interval < MIN_REFRESH_INTERVAL {
        warn!(
            "interval {}s is below the Adafruit IO limit, using {}s",
            interval.as_secs(),
            MIN_REFRESH_INTERVAL.as_secs()
        );
        return MIN_REFRESH_INTERVAL;
    }
    interval
}

// =============================================================================
// Driver
// =============================================================================

struct Driver {
    display: SimulatorDisplay<Rgb888>,
    background: Rgb888,
    dashboard: Dashboard,
    source: Box<dyn FeedSource>,
    render_state: RenderState,
    metrics: RefreshMetrics,
    snapshot: Option<PathBuf>,
    output_settings: OutputSettings,
    ticks_run: u64,
}

impl Driver {
    /// One refresh tick followed by a redraw if anything changed.
    fn tick(&mut self) -> Result<(), DashboardError> {
        let tick_start = Instant::now();
        let report = self.dashboard.refresh(self.source.as_mut());
        self.metrics.record_tick(&report, tick_start.elapsed());
        self.ticks_run += 1;

        let m = &self.metrics;
        debug!(
            "tick {}: {} updated, {} failed, {} fallbacks in {}ms (avg {}ms, max {}ms), uptime {}",
            m.total_ticks,
            report.updated.len(),
            report.failed.len(),
            report.fallbacks,
            m.last_tick_us / 1000,
            m.tick_time_avg_us() / 1000,
            m.tick_time_max_us / 1000,
            m.uptime_string()
        );
        if !report.is_clean() {
            debug!(
                "totals: {} updates, {} fetch failures, {} fallback inserts",
                m.updates, m.fetch_failures, m.fallback_inserts
            );
        }

        if report.changed() {
            self.render_state.mark_scene_dirty();
        }
        self.redraw()
    }

    /// Draw the scene if it changed and refresh the snapshot.
    fn redraw(&mut self) -> Result<(), DashboardError> {
        let drawn = frame_drawn(
            self.render_state
                .render(&mut self.display, self.dashboard.scene(), self.background),
        );
        if drawn {
            debug!("frame {} drawn", self.render_state.frames_drawn());
        }

        if drawn && let Some(path) = &self.snapshot {
            save_snapshot(&self.display, &self.output_settings, path)?;
            debug!("snapshot written to {}", path.display());
        }
        Ok(())
    }

    fn done(
        &self,
        max_ticks: Option<u64>,
    ) -> bool {
        max_ticks.is_some_and(|n| self.ticks_run >= n)
    }
}

/// Whether a frame reached the display. Draw errors are logged and count as
/// no frame, so no snapshot is written for them.
fn frame_drawn<E: Debug>(result: Result<bool, E>) -> bool {
    match result {
        Ok(drawn) => drawn,
        Err(e) => {
            warn!("drawing the scene failed: {e:?}");
            false
        }
    }
}

fn save_snapshot(
    display: &SimulatorDisplay<Rgb888>,
    output_settings: &OutputSettings,
    path: &Path,
) -> Result<(), DashboardError> {
    display
        .to_rgb_output_image(output_settings)
        .save_png(path)
        .map_err(|e| DashboardError::Snapshot {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

// =============================================================================
// Main Loop
// =============================================================================

#[cfg(not(feature = "window"))]
fn run_loop(
    driver: &mut Driver,
    interval: Duration,
    max_ticks: Option<u64>,
) -> Result<(), DashboardError> {
    while !driver.done(max_ticks) {
        driver.tick()?;
        if !driver.done(max_ticks) {
            thread::sleep(interval);
        }
    }
    info!("stopped after {} ticks", driver.ticks_run);
    Ok(())
}

#[cfg(feature = "window")]
fn run_loop(
    driver: &mut Driver,
    interval: Duration,
    max_ticks: Option<u64>,
) -> Result<(), DashboardError> {
    use embedded_graphics_simulator::{SimulatorEvent, Window};

    let mut window = Window::new("Plant Moisture", &driver.output_settings);
    window.update(&driver.display);

    let mut next_tick = Instant::now();
    loop {
        let frame_start = Instant::now();

        for ev in window.events() {
            if let SimulatorEvent::Quit = ev {
                info!("window closed after {} ticks", driver.ticks_run);
                return Ok(());
            }
        }

        if !driver.done(max_ticks) && frame_start >= next_tick {
            driver.tick()?;
            next_tick = frame_start + interval;
        }
        window.update(&driver.display);

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_TIME {
            thread::sleep(FRAME_TIME - elapsed);
        }
    }
}
