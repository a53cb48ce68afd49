//! Binary entrypoint for the playkey daemon.

use std::{path::PathBuf, process, sync::Arc};

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::fmt;

use backend_x11::Grab;
use chord_engine::{DeviceClass, Dispatcher, Engine, EventSender, Registry};
use config::Config;

mod player;

use player::Player;

#[derive(Parser, Debug)]
#[command(name = "playkey", about = "Chord hotkey daemon for media playback", version)]
/// Command-line interface for the playkey daemon.
struct Cli {
    /// Optional subcommand.
    #[command(subcommand)]
    command: Option<Command>,

    /// Optional path to the config file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Logging controls
    #[command(flatten)]
    log: logging::LogArgs,
}

#[derive(Subcommand, Debug)]
/// Top-level CLI subcommands.
enum Command {
    /// Load and resolve the configuration, then exit.
    Check {
        /// Path to the configuration file to check
        path: Option<PathBuf>,
    },
}

/// Load, validate, and resolve the configuration at `explicit` (or the
/// default location).
fn load(explicit: Option<&PathBuf>) -> Result<(Config, Vec<config::ResolvedBinding>), config::Error> {
    let path = config::resolve_config_path(explicit.map(PathBuf::as_path))?;
    info!(path = %path.display(), "loading config");
    let cfg = config::load_from_path(&path)?;
    cfg.validate()?;
    let resolved = config::resolve(&cfg)?;
    Ok((cfg, resolved))
}

/// Build the registry, wiring every resolved binding to a player action.
fn build_registry(cfg: &Config, resolved: &[config::ResolvedBinding]) -> Registry {
    let player = Arc::new(Player::new(cfg.seek_step, cfg.volume_step));
    let mut registry = Registry::new();
    for binding in resolved {
        registry.register(
            binding.device,
            binding.code,
            binding.modifiers,
            binding.subcode,
            player.action(binding.event),
        );
    }
    registry
}

/// The X11 grab list: every primary binding on an X11 device class.
fn x11_grabs(registry: &Registry) -> Vec<Grab> {
    registry
        .bindings()
        .iter()
        .filter(|b| matches!(b.device, DeviceClass::X11Keyboard | DeviceClass::X11Mouse))
        .map(|b| Grab {
            device: b.device,
            code: b.code,
            modifiers: b.modifiers,
        })
        .collect()
}

/// Start one worker per configured input source. Returns how many actually
/// came up; a source that fails to open is logged and skipped.
fn spawn_workers(cfg: &Config, grabs: &[Grab], tx: &EventSender) -> usize {
    let mut started = 0;

    for (index, path) in cfg.listen.evdev.iter().enumerate() {
        match backend_evdev::spawn(index as u16, path, cfg.show_keycodes, tx.clone()) {
            Ok(_) => started += 1,
            Err(e) => error!(path = %path, error = %e, "cannot open evdev source"),
        }
    }

    // Named `display_name` because tracing's macro expansion shadows locals
    // named `display`.
    for display_name in &cfg.listen.x11 {
        match backend_x11::spawn(display_name, grabs.to_vec(), tx.clone()) {
            Ok(_) => started += 1,
            Err(e) => error!(display = %display_name, error = %e, "cannot open X11 source"),
        }
    }

    started
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    fmt()
        .with_env_filter(logging::env_filter_from_spec(&cli.log.spec()))
        .init();

    if let Some(Command::Check { path }) = &cli.command {
        match load(path.as_ref().or(cli.config.as_ref())) {
            Ok((_, resolved)) => {
                println!("config ok: {} bindings", resolved.len());
                return;
            }
            Err(e) => {
                eprintln!("config error: {}", e);
                process::exit(1);
            }
        }
    }

    let (cfg, resolved) = match load(cli.config.as_ref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("configuration error: {}", e);
            process::exit(1);
        }
    };

    let registry = build_registry(&cfg, &resolved);
    info!(
        primaries = registry.bindings().len(),
        bindings = resolved.len(),
        "registry built"
    );

    let grabs = x11_grabs(&registry);
    let (dispatcher, tx) = Dispatcher::new(Engine::new(registry));
    let started = spawn_workers(&cfg, &grabs, &tx);
    drop(tx);

    if started == 0 {
        error!("no input sources could be started");
        process::exit(1);
    }
    info!(sources = started, "listening for hotkeys");

    tokio::select! {
        _ = dispatcher.run() => info!("all input sources exited"),
        _ = tokio::signal::ctrl_c() => info!("interrupted; shutting down"),
    }
}
