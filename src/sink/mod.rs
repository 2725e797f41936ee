#[cfg(target_os = "linux")]
pub mod uinput;

use crate::error::Error;

/// Hi-res scroll units in one wheel detent.
pub const SCROLL_UNITS_PER_DETENT: i32 = 120;

/// Receives synthetic pointer motion. Both controllers share one sink, so
/// implementations serialize their own writes.
pub trait MotionSink: Send + Sync {
    fn move_relative(&self, dx: i32, dy: i32) -> Result<(), Error>;

    /// Positive scrolls up, in hi-res units.
    fn scroll_vertical(&self, amount: i32) -> Result<(), Error>;

    /// Positive scrolls right, in hi-res units.
    fn scroll_horizontal(&self, amount: i32) -> Result<(), Error>;
}
