use clap::Parser;
use std::io::BufRead;
use std::thread;
use tracing_subscriber::EnvFilter;

mod audio;
mod clock;
mod config;
mod controller;
mod interval;
mod notify;
mod render;
mod session_log;
mod ws;

use audio::alert::{AudioAlert, ClipAsset, ClipPair, Playback};
use audio::clips::{BrowserClip, DesktopClip};
use clock::ticker::IntervalTicker;
use config::{Cli, PROFILE_ENV, TimerConfig};
use controller::{BrowserSurface, ConsoleSurface, ControlCommand, Controller, Surface};
use session_log::SessionLog;
use ws::websocket_server::{self, CommandSender};

fn init_logging(config: &TimerConfig) {
    let default_level = if config.verbose {
        "debug"
    } else if config.daemon {
        "info"
    } else {
        // keep the console status line readable
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_clips<F>(config: &TimerConfig, open: F) -> Option<ClipPair>
where
    F: FnMut(ClipAsset) -> Box<dyn Playback>,
{
    match ClipPair::load(&config.assets_dir, open) {
        Ok(clips) => Some(clips),
        Err(e) => {
            tracing::warn!("Audio disabled: {}", e);
            None
        }
    }
}

fn desktop_clip(asset: ClipAsset) -> Box<dyn Playback> {
    let message = if asset.name == "alert" {
        "High intensity - go!"
    } else {
        "Low intensity - recover"
    };
    Box::new(DesktopClip::new(asset, message))
}

/// Every line on stdin is a click.
fn spawn_stdin_clicks(tx: CommandSender) {
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            if line.is_err() || tx.send(ControlCommand::Toggle).is_err() {
                break;
            }
        }
    });
}

fn print_banner(config: &TimerConfig) {
    let durations = config.plan.durations;
    println!("⏱️ Interval It - High/Low Intensity Timer");
    println!("======================================================");
    println!(
        "Phases: {}s high / {}s low, {} rounds ({:?} profile)",
        durations.high_seconds, durations.low_seconds, config.plan.total_rounds, config.profile
    );
    if config.stop_at_completion {
        println!("Timer pauses after the last round");
    }
    if let Some(ref path) = config.log_file {
        println!("Logging to: {}", path.display());
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let env_profile = std::env::var(PROFILE_ENV).ok();
    let config = TimerConfig::resolve(&cli, env_profile.as_deref())?;
    init_logging(&config);

    // Create log directory if needed
    if let Some(ref path) = config.log_file {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
    }

    print_banner(&config);

    let (command_tx, mut command_rx) = websocket_server::create_command_channel();

    let (clips, surface): (Option<ClipPair>, Box<dyn Surface>) = if config.daemon {
        let outbound = websocket_server::create_outbound_channel();
        let listener = websocket_server::bind(config.addr).await?;
        println!("Open http://{} in a browser, click to start/pause", listener.local_addr()?);
        tokio::spawn(websocket_server::serve(
            listener,
            command_tx.clone(),
            outbound.clone(),
            config.assets_dir.clone(),
        ));

        let for_clips = outbound.clone();
        let clips = load_clips(&config, |asset| {
            Box::new(BrowserClip::new(asset, for_clips.clone())) as Box<dyn Playback>
        });
        (
            clips,
            Box::new(BrowserSurface::new(outbound)) as Box<dyn Surface>,
        )
    } else {
        println!("Press Enter to start/pause, Ctrl+C to stop and see stats\n");
        spawn_stdin_clicks(command_tx.clone());
        (
            load_clips(&config, desktop_clip),
            Box::new(ConsoleSurface::default()) as Box<dyn Surface>,
        )
    };
    drop(command_tx);

    let audio = AudioAlert::new(clips);
    if !audio.is_loaded() {
        println!(
            "Audio clips not found in {}, phase changes will raise an alert",
            config.assets_dir.display()
        );
    }

    let mut controller = Controller::new(
        config.plan,
        config.stop_at_completion,
        audio,
        SessionLog::new(config.log_file.clone()),
        surface,
    );
    controller.start();

    let mut ticker = IntervalTicker::at_frame_rate();
    tokio::select! {
        _ = controller.run(&mut ticker, &mut command_rx) => {}
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::error!("Failed to listen for Ctrl+C: {}", e);
            }
        }
    }

    tracing::info!(
        frames = controller.state().total_frames,
        "Session ended"
    );
    println!("{}", controller.stats());
    Ok(())
}
