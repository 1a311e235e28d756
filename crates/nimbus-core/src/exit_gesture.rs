//! Timed multi-press gesture that ends the summary step.
//!
//! Presses are counted from the first press of a sequence. A press that
//! arrives after the window has elapsed starts a new sequence. Reaching the
//! required count does not end the summary by itself; the release of that
//! press does.

use embassy_time::{Duration, Instant};
use log::{info, warn};

#[derive(Debug, Clone)]
pub struct ExitGestureTracker {
    required: u8,
    window: Duration,
    presses: u8,
    anchor: Option<Instant>,
}

impl ExitGestureTracker {
    pub const fn new(required: u8, window: Duration) -> Self {
        Self {
            required,
            window,
            presses: 0,
            anchor: None,
        }
    }

    pub fn reset(&mut self) {
        self.presses = 0;
        self.anchor = None;
    }

    pub fn presses(&self) -> u8 {
        self.presses
    }

    pub fn is_complete(&self) -> bool {
        self.presses >= self.required
    }

    /// Count a press of the exit button.
    pub fn on_press(&mut self, now: Instant) {
        let Some(anchor) = self.anchor.filter(|_| self.presses > 0) else {
            self.start_sequence(now);
            return;
        };

        let elapsed = now.saturating_duration_since(anchor);
        if elapsed > self.window {
            warn!(
                "too slow, press {} times within {} ms",
                self.required,
                self.window.as_millis()
            );
            self.start_sequence(now);
            return;
        }

        self.presses = self.presses.saturating_add(1);
        info!(
            "exit press {}/{} ({} ms elapsed)",
            self.presses,
            self.required,
            elapsed.as_millis()
        );
        if self.is_complete() {
            info!("exit gesture complete, waiting for release");
        }
    }

    /// Handle the release of the exit button. Returns true when the gesture
    /// is complete and the summary should end.
    pub fn on_release(&mut self) -> bool {
        self.is_complete()
    }

    fn start_sequence(&mut self, now: Instant) {
        self.anchor = Some(now);
        self.presses = 1;
        info!("exit press 1/{}", self.required);
    }
}
