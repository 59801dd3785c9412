use clap::Parser;
use std::{
    path::PathBuf,
    time::{Duration, Instant},
};
use tracing::info;

use satview_lib::{
    app::AppState,
    config::Config,
    gui::GuiState,
    interrupt,
    viewer::Viewer,
};
use tracktypes::prelude::TrackerMode;

#[derive(Parser, Debug)]
#[command(version)]
struct Opts {
    /// Viewer configuration toml file.
    ///
    /// Built-in defaults are used when not provided.
    #[arg(long)]
    config: Option<PathBuf>,

    /// The tracker executable, overrides the configuration
    #[arg(long)]
    tracker: Option<PathBuf>,

    /// Equirectangular world map image drawn behind the ground track
    #[arg(long)]
    background: Option<PathBuf>,

    /// Delay between the end of a refresh and the start of the next one (e.g. '10s')
    #[arg(long, value_parser = humantime::parse_duration)]
    interval: Option<Duration>,

    /// Mode argument of the first tracker invocation ('listAll' or a category name)
    #[arg(long)]
    mode: Option<TrackerMode>,

    /// Name of the satellite to select
    #[arg(long, group = "selection")]
    satellite: Option<String>,

    /// Select the first satellite whose name matches this regex
    #[arg(long, group = "selection")]
    matches: Option<String>,

    /// Invoke the tracker once, no periodic refresh
    #[arg(long)]
    once: bool,

    /// Print the selected satellite instead of opening a window
    #[arg(long)]
    headless: bool,
}

const HEADLESS_POLL_PERIOD: Duration = Duration::from_millis(100);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let opts = Opts::parse();

    let stop = interrupt::install_handler()?;

    let cfg = load_config(&opts)?;
    info!(program = %cfg.tracker.program.display(), "Using tracker");

    let mut viewer = Viewer::new(&cfg)?;

    let mut gui = if opts.headless {
        None
    } else {
        Some(GuiState::new(
            &cfg.map.window_title,
            cfg.map.background.as_deref(),
            cfg.map.show_graticule,
        ))
    };

    viewer.start()?;

    let mut commands = Vec::new();

    'outer: loop {
        if stop.is_requested() {
            break 'outer;
        }

        let outcome = if gui.is_some() {
            viewer.poll()
        } else {
            viewer.wait(HEADLESS_POLL_PERIOD)
        };

        let applied = viewer.step(outcome, Instant::now())?;

        match gui.as_mut() {
            Some(gui) => {
                if !gui.render(viewer.app(), &mut commands) {
                    break 'outer;
                }
            }
            None => {
                if applied {
                    print_selected(viewer.app());
                }
                if viewer.is_done() {
                    break 'outer;
                }
            }
        }

        for cmd in commands.drain(..) {
            viewer.handle_command(cmd)?;
        }
    }

    info!(refreshes = viewer.app().refresh_count(), "Stopped");

    Ok(())
}

/// The configuration file, if any, with command line overrides applied
fn load_config(opts: &Opts) -> Result<Config, Box<dyn std::error::Error>> {
    let mut cfg = match &opts.config {
        Some(p) => Config::load(p)?,
        None => Config::default(),
    };

    if let Some(p) = &opts.tracker {
        cfg.tracker.program = p.clone();
    }
    if let Some(p) = &opts.background {
        cfg.map.background = Some(p.clone());
    }
    if let Some(i) = opts.interval {
        cfg.refresh.interval = i;
    }
    if let Some(m) = &opts.mode {
        cfg.refresh.mode = m.clone();
    }
    if let Some(s) = &opts.satellite {
        cfg.satellite = Some(s.clone());
        cfg.matches = None;
    }
    if let Some(m) = &opts.matches {
        cfg.matches = Some(m.clone());
        cfg.satellite = None;
    }
    cfg.refresh.once |= opts.once;

    cfg.validate()?;

    Ok(cfg)
}

fn print_selected(app: &AppState) {
    println!("{}", app.status_line());
    for line in app.info_lines() {
        println!("  {line}");
    }
}
