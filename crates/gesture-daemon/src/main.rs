// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright © 2024-2025 DataScienceBioLab

//! Two-finger touchscreen gesture daemon.
//!
//! Converts raw multi-touch evdev events from a touchscreen into synthetic
//! single-pointer X11 events, recognizing two-finger scroll/zoom/rotate/tap
//! gestures along the way.
//!
//! `tokio` appears only here, for portable async signal handling around the
//! otherwise-blocking OS threads everything below this binary uses.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use gesture_core::{ClickMode, GestureCore, ProfileSet, SystemClock};
use gesture_traits::WindowSystem as _;
use gesture_x11::{config, ingest, X11Connection, X11WindowSystem, Xtest11Output};

const DEFAULT_DEVICE_PATH: &str = "/dev/twofingtouch";

/// Two-finger touchscreen gesture daemon for X11.
#[derive(Parser, Debug)]
#[command(name = "twofingemu", version, about)]
struct Cli {
    /// Verbose (debug-level) logging.
    #[arg(long)]
    debug: bool,

    /// Wait for the touch device to appear instead of exiting if it's
    /// missing at startup.
    #[arg(long)]
    wait: bool,

    /// Which finger's warp target to use for a two-finger tap/click.
    #[arg(long, value_enum, default_value_t = ClickModeArg::Center)]
    click: ClickModeArg,

    /// Path to a `profiles.toml` configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run in the foreground instead of daemonizing (implied by `--debug`
    /// and useful under systemd).
    #[arg(long)]
    foreground: bool,

    /// The evdev touch device to read from.
    #[arg(default_value = DEFAULT_DEVICE_PATH)]
    device: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ClickModeArg {
    First,
    Second,
    Center,
}

impl From<ClickModeArg> for ClickMode {
    fn from(value: ClickModeArg) -> Self {
        match value {
            ClickModeArg::First => Self::First,
            ClickModeArg::Second => Self::Second,
            ClickModeArg::Center => Self::Center,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(err) = run(&cli) {
        error!(%err, "fatal startup failure");
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if debug {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }
}

fn run(cli: &Cli) -> Result<()> {
    wait_for_device(&cli.device, cli.wait)?;

    let profiles = load_profiles(cli.config.as_deref());

    if !cli.foreground && !cli.debug {
        daemonize()?;
    }

    let device_name = device_kernel_name(&cli.device)?;
    let connection = X11Connection::connect(&device_name)
        .context("connecting to X server / resolving XInput2 device")?;

    let blacklist = profiles.blacklist.clone();
    let output = Arc::new(Xtest11Output::new(connection_clone_for_output(&device_name)?));
    let windows = Arc::new(X11WindowSystem::new(
        connection_clone_for_output(&device_name)?,
        blacklist,
    ));
    let clock = Arc::new(SystemClock::new());

    let core = GestureCore::new(output, windows.clone(), clock, profiles, cli.click.into());

    let (width, height) = windows
        .screen_size()
        .context("querying initial screen size")?;
    core.set_screen_size(width, height);
    core.set_calibration(gesture_x11::calibration::read_calibration(&connection, width.max(height) as i32));

    info!(device = %cli.device.display(), width, height, "gesture daemon ready");

    let running = Arc::new(AtomicBool::new(true));
    let ingest_core = core.clone();
    let ingest_running = running.clone();
    let ingest_device = cli.device.clone();
    let ingest_handle = std::thread::Builder::new()
        .name("gesture-ingest".into())
        .spawn(move || ingest::run(&ingest_device, &ingest_core, &ingest_running))
        .context("spawning evdev ingest thread")?;

    block_on_shutdown_signal()?;

    info!("shutdown signal received, stopping");
    running.store(false, Ordering::SeqCst);
    let _ = ingest_handle.join();

    Ok(())
}

/// A second, independent connection for the window-system side, so the
/// ingest thread's `OutputSink` calls never contend with X event queries on
/// the same socket.
fn connection_clone_for_output(device_name: &str) -> Result<X11Connection> {
    X11Connection::connect(device_name).context("opening a second X11 connection")
}

fn wait_for_device(path: &Path, wait: bool) -> Result<()> {
    loop {
        if path.exists() {
            return Ok(());
        }
        if !wait {
            bail!("touch device {} not found", path.display());
        }
        warn!(path = %path.display(), "touch device not present yet, waiting");
        std::thread::sleep(std::time::Duration::from_secs(1));
    }
}

fn device_kernel_name(path: &Path) -> Result<String> {
    let device =
        evdev::Device::open(path).with_context(|| format!("opening {}", path.display()))?;
    Ok(device.name().unwrap_or_default().to_string())
}

fn load_profiles(explicit: Option<&Path>) -> ProfileSet {
    let candidate = explicit
        .map(PathBuf::from)
        .or_else(default_config_path);

    let Some(path) = candidate else {
        info!("no configuration file found, using built-in default profile");
        return ProfileSet::built_in();
    };

    match config::load_file(&path) {
        Ok(profiles) => {
            info!(path = %path.display(), "loaded configuration");
            profiles
        },
        Err(err) => {
            warn!(%err, path = %path.display(), "config file missing or malformed, falling back to built-in default");
            ProfileSet::built_in()
        },
    }
}

fn default_config_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    let path = base.join("twofingemu").join("profiles.toml");
    path.exists().then_some(path)
}

fn daemonize() -> Result<()> {
    daemonize::Daemonize::new()
        .working_directory("/")
        .start()
        .context("daemonizing")?;
    Ok(())
}

fn block_on_shutdown_signal() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_io()
        .build()
        .context("building signal-handling runtime")?;
    runtime.block_on(async {
        #[cfg(unix)]
        {
            let mut term = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {},
                _ = term.recv() => {},
            }
            Ok::<_, std::io::Error>(())
        }
        #[cfg(not(unix))]
        {
            tokio::signal::ctrl_c().await
        }
    })?;
    Ok(())
}
