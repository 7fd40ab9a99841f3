//! Display hand-off at display rate.
//!
//! The control thread publishes one [`DisplayFrame`] per processed sample
//! into a single-slot mailbox and moves on. A worker thread wakes at the
//! display cadence, takes whatever frame is newest and hands it to the
//! [`DisplaySink`]. Frames published between two wakeups are dropped.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use haptic_atomic::LatestMailbox;
use haptic_errors::{ServoError, ValidationError};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::cancel::CancellationToken;
use crate::ports::{DisplayFrame, DisplaySink};

/// Display worker settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Wakeup period of the display worker (ms)
    pub refresh_interval_ms: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: 33,
        }
    }
}

impl DisplayConfig {
    /// Check the refresh interval is within 1..=1000 ms.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=1000).contains(&self.refresh_interval_ms) {
            return Err(ValidationError::out_of_range(
                "display.refresh_interval_ms",
                self.refresh_interval_ms,
                1,
                1000,
            ));
        }
        Ok(())
    }

    /// Refresh interval as a duration.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}

/// What the worker did before it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplayStats {
    /// Frames the sink accepted
    pub frames_rendered: u64,
    /// Frames the sink failed to show
    pub update_errors: u64,
    /// The sink reported itself closed
    pub closed: bool,
}

/// Thread draining the display mailbox into a sink.
#[derive(Debug)]
pub struct DisplayWorker {
    mailbox: Arc<LatestMailbox<DisplayFrame>>,
    shutdown: CancellationToken,
    handle: Option<JoinHandle<DisplayStats>>,
}

impl DisplayWorker {
    /// Start a worker feeding `sink`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad `config`, or an I/O error if the
    /// thread cannot be spawned.
    pub fn spawn<D>(sink: D, config: &DisplayConfig) -> Result<Self, ServoError>
    where
        D: DisplaySink + 'static,
    {
        config.validate()?;

        let mailbox = Arc::new(LatestMailbox::new());
        let shutdown = CancellationToken::new();
        let interval = config.refresh_interval();

        let handle = {
            let mailbox = Arc::clone(&mailbox);
            let shutdown = shutdown.clone();
            thread::Builder::new()
                .name("haptic-display".into())
                .spawn(move || drain(sink, &mailbox, &shutdown, interval))?
        };

        debug!(refresh_ms = config.refresh_interval_ms, "display worker started");
        Ok(Self {
            mailbox,
            shutdown,
            handle: Some(handle),
        })
    }

    /// The mailbox the control loop publishes into.
    pub fn mailbox(&self) -> Arc<LatestMailbox<DisplayFrame>> {
        Arc::clone(&self.mailbox)
    }

    /// Show any pending frame, stop the thread and return its statistics.
    pub fn shutdown(mut self) -> DisplayStats {
        self.stop_and_join()
    }

    fn stop_and_join(&mut self) -> DisplayStats {
        self.shutdown.cancel();
        match self.handle.take().map(JoinHandle::join) {
            Some(Ok(stats)) => stats,
            Some(Err(_)) => {
                error!("display worker panicked");
                DisplayStats::default()
            }
            None => DisplayStats::default(),
        }
    }
}

impl Drop for DisplayWorker {
    fn drop(&mut self) {
        if self.handle.is_some() {
            let _stats = self.stop_and_join();
        }
    }
}

fn drain<D: DisplaySink>(
    mut sink: D,
    mailbox: &LatestMailbox<DisplayFrame>,
    shutdown: &CancellationToken,
    interval: Duration,
) -> DisplayStats {
    let mut stats = DisplayStats::default();
    let mut failing = false;

    loop {
        let stopping = shutdown.wait_timeout(interval);

        if let Some(frame) = mailbox.take() {
            match sink.update(frame) {
                Ok(()) => {
                    stats.frames_rendered = stats.frames_rendered.saturating_add(1);
                    if failing {
                        info!("display updates recovered");
                        failing = false;
                    }
                }
                Err(err) => {
                    stats.update_errors = stats.update_errors.saturating_add(1);
                    if err.is_terminal() {
                        info!(error = %err, "display sink closed");
                        stats.closed = true;
                        break;
                    }
                    if !failing {
                        warn!(error = %err, "display update failed; continuing");
                        failing = true;
                    }
                }
            }
        }

        if stopping {
            break;
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Pose3;
    use haptic_errors::DisplayError;
    use parking_lot::Mutex;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[derive(Debug, Clone, Default)]
    struct SharedSink {
        frames: Arc<Mutex<Vec<DisplayFrame>>>,
    }

    impl DisplaySink for SharedSink {
        fn update(&mut self, frame: DisplayFrame) -> Result<(), DisplayError> {
            self.frames.lock().push(frame);
            Ok(())
        }
    }

    struct BrokenSink;

    impl DisplaySink for BrokenSink {
        fn update(&mut self, _frame: DisplayFrame) -> Result<(), DisplayError> {
            Err(DisplayError::backend("no window"))
        }
    }

    fn frame(sequence: u64) -> DisplayFrame {
        DisplayFrame {
            pose: Pose3::ORIGIN,
            in_contact: false,
            sequence,
        }
    }

    #[test]
    fn test_pending_frame_shown_on_shutdown() -> TestResult {
        let sink = SharedSink::default();
        let worker = DisplayWorker::spawn(
            sink.clone(),
            &DisplayConfig {
                refresh_interval_ms: 1000,
            },
        )?;

        let mailbox = worker.mailbox();
        for seq in 1..=50 {
            mailbox.publish(frame(seq));
        }
        let stats = worker.shutdown();

        let frames = sink.frames.lock();
        assert_eq!(frames.last().map(|f| f.sequence), Some(50));
        assert!(stats.frames_rendered >= 1);
        assert!(frames.windows(2).all(|w| matches!(w, [a, b] if a.sequence < b.sequence)));
        Ok(())
    }

    #[test]
    fn test_sink_errors_are_contained() -> TestResult {
        let worker = DisplayWorker::spawn(
            BrokenSink,
            &DisplayConfig {
                refresh_interval_ms: 1,
            },
        )?;
        worker.mailbox().publish(frame(1));
        thread::sleep(Duration::from_millis(30));
        worker.mailbox().publish(frame(2));

        let stats = worker.shutdown();
        assert_eq!(stats.frames_rendered, 0);
        assert!(stats.update_errors >= 1);
        assert!(!stats.closed);
        Ok(())
    }

    #[test]
    fn test_invalid_interval_rejected() {
        let config = DisplayConfig {
            refresh_interval_ms: 0,
        };
        assert!(matches!(
            DisplayWorker::spawn(SharedSink::default(), &config),
            Err(ServoError::Validation(_))
        ));
    }
}
