//! Touchpad state shared between the frame reducer and the controllers.
//!
//! The reducer is the only writer. Controllers copy a [`TouchpadSnapshot`]
//! and, when nothing they care about is going on, block on one of the
//! [`Gate`]s until the reducer signals it. Every gate carries an epoch that
//! is bumped under the lock when it fires, so a waiter passing the snapshot
//! it acted on never sleeps through a signal that came in between.

use crate::settings::EdgeLimits;
use parking_lot::{Condvar, Mutex};
use std::time::Duration;

/// Two touches closer together than this make a double tap.
pub const DOUBLE_TAP_WINDOW_MS: i64 = 250;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct GateEpochs {
    pub(crate) touch: u64,
    pub(crate) press: u64,
    pub(crate) edge_touch: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TouchpadSnapshot {
    pub x: i32,
    pub y: i32,
    /// -1 left edge, 1 right edge, 0 inside.
    pub edge_x: i8,
    /// -1 top edge, 1 bottom edge, 0 inside.
    pub edge_y: i8,
    pub touched: bool,
    pub pressed: bool,
    pub double_tapped: bool,
    /// The current touch started in the edge zone and has not left it.
    pub edge_touched: bool,
    pub(crate) epochs: GateEpochs,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gate {
    Touch,
    Press,
    TouchOrPress,
    EdgeTouch,
}

/// What a controller does after one iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pace {
    Wait(Gate),
    Sleep(Duration),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyTransition {
    pub pressed: bool,
    pub time_ms: i64,
}

/// Changes collected from one hardware report. `None` means unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PendingFrame {
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub touch: Option<KeyTransition>,
    pub press: Option<bool>,
}

impl PendingFrame {
    pub fn is_empty(&self) -> bool {
        *self == PendingFrame::default()
    }
}

struct Shared {
    snapshot: TouchpadSnapshot,
    last_touch_ms: Option<i64>,
    open: bool,
}

#[derive(Default)]
struct Fired {
    touch: bool,
    press: bool,
    edge_touch: bool,
}

pub struct Touchpad {
    limits: EdgeLimits,
    no_edge_protection: bool,
    shared: Mutex<Shared>,
    touch: Condvar,
    press: Condvar,
    touch_or_press: Condvar,
    edge_touch: Condvar,
}

impl Touchpad {
    pub fn new(limits: EdgeLimits, no_edge_protection: bool) -> Self {
        Self {
            limits,
            no_edge_protection,
            shared: Mutex::new(Shared {
                snapshot: TouchpadSnapshot::default(),
                last_touch_ms: None,
                open: true,
            }),
            touch: Condvar::new(),
            press: Condvar::new(),
            touch_or_press: Condvar::new(),
            edge_touch: Condvar::new(),
        }
    }

    pub fn snapshot(&self) -> TouchpadSnapshot {
        self.shared.lock().snapshot
    }

    pub fn is_open(&self) -> bool {
        self.shared.lock().open
    }

    /// Wakes every waiter and makes all later waits return at once.
    pub fn close(&self) {
        self.shared.lock().open = false;
        self.touch.notify_all();
        self.press.notify_all();
        self.touch_or_press.notify_all();
        self.edge_touch.notify_all();
    }

    /// Applies one hardware report atomically and signals the gates it
    /// activated.
    pub fn commit(&self, frame: &PendingFrame) {
        let mut fired = Fired::default();
        {
            let mut shared = self.shared.lock();
            let Shared {
                snapshot: s,
                last_touch_ms,
                ..
            } = &mut *shared;

            if let Some(x) = frame.x {
                s.x = x;
                s.edge_x = self.limits.edge_x(x);
            }
            if let Some(y) = frame.y {
                s.y = y;
                s.edge_y = self.limits.edge_y(y);
            }

            let in_bounds = self.limits.contains(s.x, s.y);
            let accepted = in_bounds || self.no_edge_protection;
            if in_bounds && (frame.x.is_some() || frame.y.is_some()) {
                s.edge_touched = false;
            }

            match frame.touch {
                Some(KeyTransition { pressed: false, .. }) => {
                    s.touched = false;
                    s.double_tapped = false;
                    s.edge_touched = false;
                }
                Some(KeyTransition {
                    pressed: true,
                    time_ms,
                }) => {
                    if accepted {
                        fired.touch |= !s.touched;
                        s.touched = true;
                        let within_window = last_touch_ms
                            .is_some_and(|last| (0..DOUBLE_TAP_WINDOW_MS).contains(&(time_ms - last)));
                        if within_window {
                            fired.press |= !s.double_tapped;
                            s.double_tapped = true;
                        }
                    }
                    *last_touch_ms = Some(time_ms);
                    if !in_bounds {
                        fired.edge_touch |= !s.edge_touched;
                        s.edge_touched = true;
                    }
                }
                None => {}
            }

            match frame.press {
                Some(true) if accepted => {
                    fired.press |= !s.pressed;
                    s.pressed = true;
                }
                Some(false) => s.pressed = false,
                _ => {}
            }

            let epochs = &mut s.epochs;
            epochs.touch += fired.touch as u64;
            epochs.press += fired.press as u64;
            epochs.edge_touch += fired.edge_touch as u64;
        }

        if fired.touch {
            self.touch.notify_all();
        }
        if fired.press {
            self.press.notify_all();
        }
        if fired.touch || fired.press {
            self.touch_or_press.notify_all();
        }
        if fired.edge_touch {
            self.edge_touch.notify_all();
        }
    }

    /// Blocks until `gate` fires after `seen` was taken, or the touchpad is
    /// closed. The caller re-reads the snapshot; the condition that fired
    /// may already be over.
    pub fn wait(&self, gate: Gate, seen: &TouchpadSnapshot) {
        let seen = seen.epochs;
        let fired = |e: &GateEpochs| match gate {
            Gate::Touch => e.touch != seen.touch,
            Gate::Press => e.press != seen.press,
            Gate::TouchOrPress => e.touch != seen.touch || e.press != seen.press,
            Gate::EdgeTouch => e.edge_touch != seen.edge_touch,
        };
        let condvar = match gate {
            Gate::Touch => &self.touch,
            Gate::Press => &self.press,
            Gate::TouchOrPress => &self.touch_or_press,
            Gate::EdgeTouch => &self.edge_touch,
        };

        let mut shared = self.shared.lock();
        while shared.open && !fired(&shared.snapshot.epochs) {
            condvar.wait(&mut shared);
        }
    }
}
