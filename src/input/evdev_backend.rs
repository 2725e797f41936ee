use super::{Axis, Button, EventKind, InputBackend, RawEvent};
use crate::error::Error;
use evdev::{AbsoluteAxisType, Device, EventType, InputEvent, InputEventKind, Key, Synchronization};
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::time::{Duration, UNIX_EPOCH};
use tracing::trace;

pub struct EvdevBackend {
    device: Device,
    path: PathBuf,
    verbose: bool,
}

impl EvdevBackend {
    pub fn new(device: Device, path: PathBuf, verbose: bool) -> Self {
        Self {
            device,
            path,
            verbose,
        }
    }
}

fn read_error(path: &Path, e: std::io::Error) -> Error {
    Error::device_io(format!("cannot read from {}", path.display()), e)
}

impl InputBackend for EvdevBackend {
    /// `SYN_DROPPED` never reaches the caller: evdev discards the damaged
    /// block and replays the current device state on the next fetch. That
    /// fetch only happens once the device has new data, so after a kernel
    /// buffer overflow a lost release stays visible until the next report.
    fn poll_events(&mut self, timeout: Duration) -> Result<Vec<RawEvent>, Error> {
        let mut pollfd = libc::pollfd {
            fd: self.device.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        };
        let ret = unsafe { libc::poll(&mut pollfd, 1, timeout.as_millis() as libc::c_int) };
        if ret < 0 {
            let err = std::io::Error::last_os_error();
            if err.kind() == std::io::ErrorKind::Interrupted {
                return Ok(Vec::new());
            }
            return Err(read_error(&self.path, err));
        }
        if ret == 0 {
            return Ok(Vec::new());
        }

        let verbose = self.verbose;
        let path = &self.path;
        match self.device.fetch_events() {
            Ok(events) => Ok(events
                .inspect(|event| {
                    if verbose {
                        trace_event(event);
                    }
                })
                .map(|event| RawEvent::from(&event))
                .collect()),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(Vec::new()),
            Err(e) => Err(read_error(path, e)),
        }
    }
}

impl From<&InputEvent> for RawEvent {
    fn from(event: &InputEvent) -> Self {
        let value = event.value();
        let kind = match event.kind() {
            InputEventKind::AbsAxis(AbsoluteAxisType::ABS_X) => EventKind::Axis(Axis::X, value),
            InputEventKind::AbsAxis(AbsoluteAxisType::ABS_Y) => EventKind::Axis(Axis::Y, value),
            InputEventKind::Key(Key::BTN_TOUCH) => EventKind::Key(Button::Touch, value),
            InputEventKind::Key(Key::BTN_LEFT) => EventKind::Key(Button::Press, value),
            InputEventKind::Synchronization(Synchronization::SYN_REPORT) => EventKind::Sync,
            _ => EventKind::Other,
        };
        let since_epoch = event.timestamp().duration_since(UNIX_EPOCH).unwrap_or_default();
        RawEvent::new(kind).at(since_epoch.as_secs() as i64, since_epoch.subsec_micros() as i64)
    }
}

fn trace_event(event: &InputEvent) {
    let type_name = match event.event_type() {
        EventType::KEY => "EV_KEY",
        EventType::ABSOLUTE => "EV_ABS",
        EventType::MISC => "EV_MSC",
        EventType::SYNCHRONIZATION => "EV_SYN",
        _ => "EV_???",
    };
    match code_lookup(event.event_type(), event.code()) {
        Some(name) => trace!("{}({}, {})", type_name, name, event.value()),
        None => trace!("{}(0x{:X}, {})", type_name, event.code(), event.value()),
    }
}

fn code_lookup(event_type: EventType, code: u16) -> Option<&'static str> {
    match (event_type, code) {
        (EventType::ABSOLUTE, 0x00) => Some("X"),
        (EventType::ABSOLUTE, 0x01) => Some("Y"),
        (EventType::ABSOLUTE, 0x18) => Some("PRESSURE"),
        (EventType::ABSOLUTE, 0x2f) => Some("MT_SLOT"),
        (EventType::ABSOLUTE, 0x35) => Some("MT_POSITION_X"),
        (EventType::ABSOLUTE, 0x36) => Some("MT_POSITION_Y"),
        (EventType::ABSOLUTE, 0x39) => Some("MT_TRACKING_ID"),
        (EventType::KEY, 0x110) => Some("BTN_LEFT"),
        (EventType::KEY, 0x111) => Some("BTN_RIGHT"),
        (EventType::KEY, 0x145) => Some("BTN_TOOL_FINGER"),
        (EventType::KEY, 0x14a) => Some("BTN_TOUCH"),
        (EventType::KEY, 0x14d) => Some("BTN_TOOL_DOUBLETAP"),
        (EventType::SYNCHRONIZATION, 0x00) => Some("SYN_REPORT"),
        (EventType::SYNCHRONIZATION, 0x03) => Some("SYN_DROPPED"),
        _ => None,
    }
}
