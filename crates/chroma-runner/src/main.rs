//! Frame-loop driver for the Chroma simulation.

mod input;
mod render;
mod telemetry;

use anyhow::{Context, Result};
use chroma_core::{RunId, RunnerConfig};
use chroma_world::Simulation;
use std::io::Write;
use tokio::signal;
use tokio::sync::watch;
use tokio::time::{interval, Duration, Instant, MissedTickBehavior};
use tracing::{info, info_span, warn, Instrument};

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_telemetry(telemetry::LogFormat::from_env())?;

    let config = load_config()?;
    let run_id = RunId::new();

    info!(
        run_id = %run_id,
        seed = ?config.seed,
        frames_per_second = config.frames_per_second,
        fixed_step = config.fixed_step,
        max_ticks = ?config.max_ticks,
        population_cap = config.simulation.population_cap,
        "Starting Chroma simulation"
    );

    let mut simulation = Simulation::new(config.simulation.clone(), config.seed)?;
    let background = input::shared_background(config.initial_background);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    {
        let background = background.clone();
        let shutdown_tx = shutdown_tx.clone();
        std::thread::spawn(move || {
            input::read_commands(std::io::stdin().lock(), background, shutdown_tx)
        });
    }
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    run_frames(&config, &mut simulation, &background, shutdown_rx)
        .instrument(info_span!("run", %run_id))
        .await?;

    simulation.emit_summary();
    let bg = background.read();
    info!(
        background = %bg.color,
        background_changes = bg.changes,
        last_background_change = %bg.changed_at,
        "Shutting down"
    );
    Ok(())
}

/// Defaults, overridden by the JSON file named in `CHROMA_CONFIG`
fn load_config() -> Result<RunnerConfig> {
    match std::env::var("CHROMA_CONFIG") {
        Ok(path) => {
            info!(path = %path, "Loading configuration");
            RunnerConfig::load(&path)
                .with_context(|| format!("loading config from {}", path))
        }
        Err(_) => {
            let config = RunnerConfig::default();
            config.validate()?;
            Ok(config)
        }
    }
}

/// How far the clock moves each frame
enum Pacing {
    Fixed(u64),
    /// Whole milliseconds already handed out since `start`; the sub-millisecond
    /// remainder carries into the next frame.
    RealTime { start: Instant, credited_ms: u64 },
}

impl Pacing {
    fn from_config(config: &RunnerConfig) -> Self {
        if config.fixed_step {
            Pacing::Fixed(config.frame_step_ms() as u64)
        } else {
            Pacing::RealTime {
                start: Instant::now(),
                credited_ms: 0,
            }
        }
    }

    fn next_delta_ms(&mut self) -> u64 {
        match self {
            Pacing::Fixed(step) => *step,
            Pacing::RealTime { start, credited_ms } => {
                let total = start.elapsed().as_millis() as u64;
                let delta = total - *credited_ms;
                *credited_ms = total;
                delta
            }
        }
    }
}

/// Advance the clock, tick, then draw; once per frame until shutdown
async fn run_frames(
    config: &RunnerConfig,
    simulation: &mut Simulation,
    background: &input::SharedBackground,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let mut frames = interval(Duration::from_millis(config.frame_step_ms() as u64));
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut pacing = Pacing::from_config(config);
    let mut renderer = render::FrameRenderer::new(config.canvas_width, config.canvas_height);
    let stdout = std::io::stdout();
    let mut ticks: u64 = 0;

    loop {
        if config.fixed_step {
            if *shutdown.borrow() {
                break;
            }
            tokio::task::yield_now().await;
        } else {
            tokio::select! {
                _ = frames.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            }
        }

        let environment = background.read().color;
        simulation.advance(pacing.next_delta_ms(), environment);
        ticks += 1;

        if ticks % config.report_every_ticks == 0 {
            simulation.emit_population_metrics(environment);
        }

        if config.emit_frames {
            let now = simulation.clock().now();
            let frame = renderer.render(&simulation.snapshot(), environment, now);
            let mut out = stdout.lock();
            let written = renderer
                .write_frame(&frame, &mut out)
                .and_then(|_| out.flush().map_err(anyhow::Error::from));
            if let Err(e) = written {
                warn!("Frame output closed, stopping: {}", e);
                break;
            }
        }

        if config.max_ticks.is_some_and(|max| ticks >= max) {
            info!(ticks = ticks, "Reached tick limit");
            break;
        }
    }

    info!(
        ticks = ticks,
        frames_rendered = renderer.frames_rendered(),
        "Frame loop stopped"
    );
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
