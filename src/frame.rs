use crate::error::Error;
use crate::input::{Axis, Button, EventKind, InputBackend, RawEvent};
use crate::touchpad::{KeyTransition, PendingFrame, Touchpad};
use std::time::Duration;
use tracing::debug;

/// How long the reader blocks on the device before checking for shutdown.
pub const POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Batches raw events per hardware report and commits each report to the
/// shared state in one step.
#[derive(Debug, Default)]
pub struct FrameReducer {
    pending: PendingFrame,
}

impl FrameReducer {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn pending(&self) -> &PendingFrame {
        &self.pending
    }

    pub fn consume(&mut self, event: &RawEvent, touchpad: &Touchpad) {
        match event.kind {
            EventKind::Axis(Axis::X, value) => self.pending.x = Some(value),
            EventKind::Axis(Axis::Y, value) => self.pending.y = Some(value),
            EventKind::Key(Button::Touch, value) => {
                self.pending.touch = Some(KeyTransition {
                    pressed: value != 0,
                    time_ms: event.millis(),
                });
            }
            EventKind::Key(Button::Press, value) => self.pending.press = Some(value != 0),
            EventKind::Sync => {
                if !self.pending.is_empty() {
                    touchpad.commit(&self.pending);
                }
                self.pending = PendingFrame::default();
            }
            EventKind::Other => {}
        }
    }
}

/// Reads the device until the touchpad is closed or a read fails.
pub fn run_reader<B: InputBackend>(mut backend: B, touchpad: &Touchpad) -> Result<(), Error> {
    let mut reducer = FrameReducer::new();
    while touchpad.is_open() {
        for event in backend.poll_events(POLL_TIMEOUT)? {
            reducer.consume(&event, touchpad);
        }
    }
    debug!("touchpad reader stopped");
    Ok(())
}
