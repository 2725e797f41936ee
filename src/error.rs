use std::fmt;
use std::io;

/// Why device selection came up empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFound {
    NoDevices,
    NoDeviceNamed(String),
    NoTouchpad,
}

impl fmt::Display for NotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotFound::NoDevices => write!(f, "no input devices found"),
            NotFound::NoDeviceNamed(name) => write!(f, "no device named {:?} found", name),
            NotFound::NoTouchpad => write!(f, "no touchpad found"),
        }
    }
}

/// A capability the selected device must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    AbsoluteEvents,
    AbsoluteXY,
    /// Only multi-touch position axes are reported.
    MultiTouchOnly,
    KeyEvents,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::AbsoluteEvents => write!(f, "absolute value events"),
            Capability::AbsoluteXY => write!(f, "absolute x/y events"),
            Capability::MultiTouchOnly => write!(
                f,
                "absolute x/y events (multi-touch protocol is not supported yet)"
            ),
            Capability::KeyEvents => write!(f, "key events"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    DeviceNotFound(NotFound),

    #[error("device {device:?} does not support {missing}")]
    DeviceUnsupported { device: String, missing: Capability },

    #[error("{context}: {source}")]
    DeviceIo {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("virtual pointer: {context}: {source}")]
    MotionSink {
        context: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("signal handling: {0}")]
    Signal(#[source] io::Error),
}

impl Error {
    pub fn device_io(context: impl Into<String>, source: io::Error) -> Self {
        Error::DeviceIo {
            context: context.into(),
            source,
        }
    }
}
