use crate::error::Error;
use crate::settings::EdgeMotionSettings;
use crate::sink::MotionSink;
use crate::touchpad::{Gate, Pace, Touchpad, TouchpadSnapshot};
use std::sync::Arc;
use std::thread;
use tracing::debug;

/// Diagonal ticks are this much longer so corner motion has the same
/// perceived speed as motion along one edge.
pub const CORNER_FACTOR: f64 = 1.414;

/// Moves the cursor while a gesture is held in the edge zone.
pub struct EdgeMotion {
    touchpad: Arc<Touchpad>,
    sink: Arc<dyn MotionSink>,
    settings: EdgeMotionSettings,
}

impl EdgeMotion {
    pub fn new(touchpad: Arc<Touchpad>, sink: Arc<dyn MotionSink>, settings: EdgeMotionSettings) -> Self {
        Self {
            touchpad,
            sink,
            settings,
        }
    }

    pub fn is_active(&self, s: &TouchpadSnapshot) -> bool {
        s.pressed
            || (s.double_tapped && !self.settings.disable_double_tap)
            || (self.settings.allow_move_while_touched && s.touched)
    }

    /// One iteration: emits motion for `s` and says how to pace the next.
    pub fn step(&self, s: &TouchpadSnapshot) -> Result<Pace, Error> {
        if !self.is_active(s) {
            let gate = if self.settings.allow_move_while_touched {
                Gate::TouchOrPress
            } else {
                Gate::Press
            };
            return Ok(Pace::Wait(gate));
        }

        debug!(x = s.x, y = s.y, "edge motion active");
        let speed = self.settings.speed;
        if s.edge_x != 0 || s.edge_y != 0 {
            self.sink
                .move_relative(s.edge_x as i32 * speed, s.edge_y as i32 * speed)?;
        }

        let interval = self.settings.interval;
        if s.edge_x != 0 && s.edge_y != 0 {
            Ok(Pace::Sleep(interval.mul_f64(CORNER_FACTOR)))
        } else {
            Ok(Pace::Sleep(interval))
        }
    }

    pub fn run(&self) -> Result<(), Error> {
        while self.touchpad.is_open() {
            let snapshot = self.touchpad.snapshot();
            match self.step(&snapshot)? {
                Pace::Wait(gate) => self.touchpad.wait(gate, &snapshot),
                Pace::Sleep(duration) => thread::sleep(duration),
            }
        }
        debug!("edge motion stopped");
        Ok(())
    }
}
