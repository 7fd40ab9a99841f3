//! Servo loop command

use std::io::{self, Write};
use std::path::Path;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use haptic_servo::prelude::*;
use tracing::{debug, info, trace, warn};

use crate::error::CliError;
use crate::output;

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Stop after this many milliseconds instead of waiting for Ctrl-C
    #[arg(long, hide = true, env = "HAPTIC_SERVO_RUN_FOR_MS")]
    pub duration_ms: Option<u64>,
}

/// Execute the servo loop against the virtual device
pub fn execute(args: &RunArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let cancel = CancellationToken::new();

    {
        let cancel = cancel.clone();
        ctrlc::set_handler(move || cancel.cancel()).context("failed to install Ctrl-C handler")?;
    }

    let timer = match args.duration_ms {
        Some(ms) => {
            let cancel = cancel.clone();
            let handle = thread::Builder::new()
                .name("hapticctl-timer".into())
                .spawn(move || {
                    if !cancel.wait_timeout(Duration::from_millis(ms)) {
                        debug!(duration_ms = ms, "run duration elapsed");
                        cancel.cancel();
                    }
                })
                .context("failed to start run timer")?;
            Some(handle)
        }
        None => None,
    };

    let display = DisplayWorker::spawn(TraceDisplay::default(), &config.display)
        .map_err(CliError::from)?;
    let session = VirtualSession::new(config.device);
    let mut servo = ControlLoop::new(session, config.clone())
        .map_err(CliError::from)?
        .with_display(display.mailbox());

    println!("Starting haptic feedback loop. Press Ctrl+C to stop.");
    let mut observer = TerminalObserver::new(config.button_count);
    let result = servo.run(&cancel, &mut observer);
    observer.finish();

    cancel.cancel();
    let stats = display.shutdown();
    debug!(
        frames = stats.frames_rendered,
        errors = stats.update_errors,
        "display worker stopped"
    );
    if let Some(handle) = timer
        && handle.join().is_err()
    {
        warn!("run timer panicked");
    }

    let report = result.map_err(CliError::from)?;
    if let Some(err) = &report.stop_error {
        warn!(error = %err, "device did not stop cleanly");
    }
    println!(
        "{} after {} samples ({} rejected force commands)",
        "Stopped".bold(),
        report.processed_samples(),
        report.rejected_commands()
    );
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<ServoConfig> {
    match path {
        Some(path) => {
            let config = ServoConfig::load(path).map_err(|source| CliError::InvalidConfiguration {
                path: path.to_path_buf(),
                source,
            })?;
            info!(path = %path.display(), "loaded servo configuration");
            Ok(config)
        }
        None => Ok(ServoConfig::default()),
    }
}

/// Prints every processed sample on one rewritten line and button changes above it.
#[derive(Debug)]
struct TerminalObserver {
    button_count: u8,
    buttons_changed: bool,
    printed: bool,
}

impl TerminalObserver {
    fn new(button_count: u8) -> Self {
        Self {
            button_count,
            buttons_changed: false,
            printed: false,
        }
    }

    /// End the rewritten position line.
    fn finish(&self) {
        if self.printed {
            println!();
        }
    }
}

impl ServoObserver for TerminalObserver {
    fn on_edge(&mut self, event: &EdgeEvent, _sample: &Sample) {
        if matches!(event.signal, SignalId::Button(_)) {
            self.buttons_changed = true;
        }
    }

    fn on_sample(&mut self, processed: &ProcessedSample) {
        if self.buttons_changed {
            self.buttons_changed = false;
            println!();
            println!("{}", output::format_buttons(&processed.sample, self.button_count));
        }
        print!("{}\r", output::format_position(processed));
        self.printed = true;
        if let Err(e) = io::stdout().flush() {
            debug!(error = %e, "stdout flush failed");
        }
    }
}

/// Display stand-in that traces the frames a plot would draw.
#[derive(Debug, Default)]
struct TraceDisplay {
    frames: u64,
}

impl DisplaySink for TraceDisplay {
    fn update(&mut self, frame: DisplayFrame) -> Result<(), DisplayError> {
        self.frames = self.frames.saturating_add(1);
        trace!(
            x = frame.pose.x,
            y = frame.pose.y,
            z = frame.pose.z,
            in_contact = frame.in_contact,
            sequence = frame.sequence,
            frame = self.frames,
            "display frame"
        );
        Ok(())
    }
}
