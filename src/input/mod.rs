#[cfg(target_os = "linux")]
pub mod evdev_backend;

use crate::error::Error;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Button {
    /// Finger on the surface.
    Touch,
    /// Physical click.
    Press,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    Axis(Axis, i32),
    /// 0 is released, anything else is pressed.
    Key(Button, i32),
    /// End of one hardware report.
    Sync,
    Other,
}

/// One record read from the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawEvent {
    pub sec: i64,
    pub usec: i64,
    pub kind: EventKind,
}

impl RawEvent {
    pub fn new(kind: EventKind) -> Self {
        Self { sec: 0, usec: 0, kind }
    }

    pub fn at(mut self, sec: i64, usec: i64) -> Self {
        self.sec = sec;
        self.usec = usec;
        self
    }

    pub fn millis(&self) -> i64 {
        self.sec * 1000 + self.usec / 1000
    }
}

pub trait InputBackend: Send + 'static {
    /// Waits up to `timeout` for the device and returns what it had, which
    /// may be nothing.
    fn poll_events(&mut self, timeout: Duration) -> Result<Vec<RawEvent>, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millis_combine_seconds_and_micros() {
        let event = RawEvent::new(EventKind::Sync).at(12, 345_999);
        assert_eq!(event.millis(), 12_345);
        assert_eq!(RawEvent::new(EventKind::Sync).millis(), 0);
    }
}
