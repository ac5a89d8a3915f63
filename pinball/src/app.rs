//! # Pinball Frame Loop
//!
//! [`run`] drives a [`Simulation`] either headless, for a fixed number of
//! frames with gestures taken from an [`InputScript`], or in a window where
//! key edges come from the renderer. In both modes a config watcher can feed
//! new actuator settings to the running table.

use std::path::PathBuf;

use anyhow::Result;
use table::{InputScript, Simulation, TableConfig};
use tracing::{error, info};

use crate::watcher::{self, ConfigWatcher};

/// Everything the loop needs, gathered from the command line
pub struct RunOptions {
    pub config: TableConfig,
    pub config_path: Option<PathBuf>,
    pub frames: u64,
    pub script: InputScript,
    pub watch: bool,
    pub window: bool,
    pub log_every: u64,
}

/// Build the table and run the loop selected by `options`.
///
/// # Errors
///
/// Returns an error when the table cannot be assembled or the window cannot
/// be opened. Errors raised by a frame stop the loop and are logged instead.
pub fn run(options: RunOptions) -> Result<()> {
    let config_watcher = match (&options.config_path, options.watch) {
        (Some(path), true) => match watcher::start(path) {
            Ok(w) => Some(w),
            Err(e) => {
                error!("Failed to start config watcher: {e:?}");
                None
            }
        },
        _ => None,
    };

    info!("Assembling table...");
    let sim = Simulation::new(options.config.clone())?;
    info!(
        "Table ready: {} nodes, {} bodies",
        sim.scene().len(),
        sim.world().body_count()
    );

    if options.window {
        run_windowed(sim, &options, config_watcher.as_ref())
    } else {
        run_headless(sim, options, config_watcher.as_ref());
        Ok(())
    }
}

fn run_headless(mut sim: Simulation, mut options: RunOptions, watcher: Option<&ConfigWatcher>) {
    let dt = sim.config().physics.frame_step;
    info!(
        "Running {} headless frames with dt = {dt}...",
        options.frames
    );

    for _ in 0..options.frames {
        apply_reload(&mut sim, watcher);

        for event in options.script.due(sim.clock()) {
            if let Err(e) = sim.handle_input(event) {
                error!("Input {event:?} failed: {e}");
                return;
            }
        }

        match sim.frame(dt) {
            Ok(report) => log_progress(&sim, report.frame, options.log_every),
            Err(e) => {
                error!("Error during frame {}: {e}", sim.frame_count() + 1);
                return;
            }
        }
    }

    info!(
        "Simulation complete: {} frames, clock {:.2}s, {} balls launched",
        sim.frame_count(),
        sim.clock(),
        sim.balls().len()
    );
}

fn apply_reload(sim: &mut Simulation, watcher: Option<&ConfigWatcher>) {
    if let Some(config) = watcher.and_then(ConfigWatcher::latest) {
        info!("Applying reloaded actuator settings");
        sim.apply_tunables(&config);
    }
}

fn log_progress(sim: &Simulation, frame: u64, every: u64) {
    if every == 0 || frame % every != 0 {
        return;
    }
    let ball = sim
        .ball()
        .or_else(|| sim.balls().last().copied())
        .and_then(|ball| sim.scene().world_position(ball.node));
    match ball {
        Some(p) => info!("Frame {frame} complete. Ball at ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z),
        None => info!("Frame {frame} complete. No ball on the table"),
    }
}

#[cfg(not(feature = "render"))]
fn run_windowed(_: Simulation, _: &RunOptions, _: Option<&ConfigWatcher>) -> Result<()> {
    anyhow::bail!("--window needs the binary built with `--features render`")
}

#[cfg(feature = "render")]
fn run_windowed(
    mut sim: Simulation,
    options: &RunOptions,
    watcher: Option<&ConfigWatcher>,
) -> Result<()> {
    use std::time::{Duration, Instant};

    use render::{rgb, Camera, Renderer};
    use table::{config::vec3, KeyBindings};

    let camera_config = &sim.config().camera;
    let camera = Camera::new(
        vec3(camera_config.position),
        vec3(camera_config.target),
        camera_config.fov,
        camera_config.near,
        camera_config.far,
    );
    let mut renderer = Renderer::new(camera, rgb(camera_config.background))?;
    let bindings = KeyBindings::default();

    let frame_duration = Duration::from_secs_f32(1.0 / 60.0);
    let mut last = Instant::now();
    info!("Starting windowed loop");

    loop {
        let frame_start = Instant::now();
        let wall_dt = frame_start.duration_since(last).as_secs_f32();
        last = frame_start;

        apply_reload(&mut sim, watcher);

        match sim.frame(wall_dt) {
            Ok(report) => log_progress(&sim, report.frame, options.log_every),
            Err(e) => {
                error!("Error during frame {}: {e}", sim.frame_count() + 1);
                break;
            }
        }

        renderer.update_scene(sim.scene());
        let input = renderer.render()?;
        if input.close_requested {
            break;
        }
        // Key edges take effect from the next frame
        for edge in &input.keys {
            let Some(event) = bindings.event(&edge.key, edge.pressed) else {
                continue;
            };
            if let Err(e) = sim.handle_input(event) {
                error!("Input {event:?} failed: {e}");
                return Ok(());
            }
        }

        // Frame rate limiting
        let frame_time = frame_start.elapsed();
        if frame_time < frame_duration {
            std::thread::sleep(frame_duration - frame_time);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(frames: u64, script: &str) -> RunOptions {
        RunOptions {
            config: TableConfig::default(),
            config_path: None,
            frames,
            script: script.parse().unwrap(),
            watch: false,
            window: false,
            log_every: 30,
        }
    }

    #[test]
    fn headless_run_replays_script() {
        run(options(90, "charge@0.0-0.5,left@0.8-1.0")).unwrap();
    }

    #[test]
    fn zero_frames_is_fine() {
        run(options(0, "")).unwrap();
    }

    #[cfg(not(feature = "render"))]
    #[test]
    fn window_requires_render_feature() {
        let mut opts = options(1, "");
        opts.window = true;
        assert!(run(opts).is_err());
    }
}
