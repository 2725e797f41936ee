use crate::error::Error;
use crate::settings::EdgeScrollSettings;
use crate::sink::{MotionSink, SCROLL_UNITS_PER_DETENT};
use crate::touchpad::{Gate, Pace, Touchpad, TouchpadSnapshot};
use std::sync::Arc;
use std::thread;
use tracing::debug;

/// Turns finger movement along an edge into scrolling.
pub struct EdgeScroll {
    touchpad: Arc<Touchpad>,
    sink: Arc<dyn MotionSink>,
    settings: EdgeScrollSettings,
    /// Position seen on the previous tick of the current edge touch.
    last: Option<(i32, i32)>,
}

impl EdgeScroll {
    pub fn new(touchpad: Arc<Touchpad>, sink: Arc<dyn MotionSink>, settings: EdgeScrollSettings) -> Self {
        Self {
            touchpad,
            sink,
            settings,
            last: None,
        }
    }

    fn amount(&self, delta: i32) -> i32 {
        delta * SCROLL_UNITS_PER_DETENT / self.settings.divisor
    }

    pub fn step(&mut self, s: &TouchpadSnapshot) -> Result<Pace, Error> {
        if !s.edge_touched {
            self.last = None;
            return Ok(Pace::Wait(Gate::EdgeTouch));
        }

        let interval = Pace::Sleep(self.settings.interval);
        let Some((last_x, last_y)) = self.last.replace((s.x, s.y)) else {
            return Ok(interval);
        };

        if self.settings.vertical.matches(s.edge_x) {
            let amount = self.amount(s.y - last_y);
            if amount != 0 {
                self.sink.scroll_vertical(amount)?;
            }
        } else if self.settings.horizontal.matches(s.edge_y) {
            let amount = -self.amount(s.x - last_x);
            if amount != 0 {
                self.sink.scroll_horizontal(amount)?;
            }
        }
        Ok(interval)
    }

    pub fn run(mut self) -> Result<(), Error> {
        while self.touchpad.is_open() {
            let snapshot = self.touchpad.snapshot();
            match self.step(&snapshot)? {
                Pace::Wait(gate) => self.touchpad.wait(gate, &snapshot),
                Pace::Sleep(duration) => thread::sleep(duration),
            }
        }
        debug!("edge scroll stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{EdgeLimits, HorizontalEdges, VerticalEdges};
    use crate::sink::recording::{Emitted, RecordingSink};
    use std::time::Duration;

    fn controller(vertical: VerticalEdges, horizontal: HorizontalEdges) -> (EdgeScroll, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let touchpad = Arc::new(Touchpad::new(EdgeLimits::default(), false));
        let settings = EdgeScrollSettings {
            enabled: true,
            interval: Duration::from_millis(5),
            divisor: 20,
            vertical,
            horizontal,
        };
        (EdgeScroll::new(touchpad, sink.clone(), settings), sink)
    }

    fn edge(x: i32, y: i32, edge_x: i8, edge_y: i8) -> TouchpadSnapshot {
        TouchpadSnapshot {
            x,
            y,
            edge_x,
            edge_y,
            edge_touched: true,
            ..Default::default()
        }
    }

    #[test]
    fn first_tick_only_seeds_position() {
        let (mut scroll, sink) = controller(VerticalEdges::Right, HorizontalEdges::Bottom);
        let pace = scroll.step(&edge(3150, 1000, 1, 0)).unwrap();
        assert_eq!(pace, Pace::Sleep(Duration::from_millis(5)));
        assert!(sink.take().is_empty());
    }

    #[test]
    fn right_edge_scrolls_vertically() {
        let (mut scroll, sink) = controller(VerticalEdges::Right, HorizontalEdges::Bottom);
        scroll.step(&edge(3150, 1000, 1, 0)).unwrap();
        scroll.step(&edge(3152, 1010, 1, 0)).unwrap();
        scroll.step(&edge(3152, 1010, 1, 0)).unwrap();
        scroll.step(&edge(3150, 995, 1, 0)).unwrap();
        assert_eq!(sink.take(), vec![Emitted::Vertical(60), Emitted::Vertical(-90)]);
    }

    #[test]
    fn bottom_edge_scrolls_horizontally_inverted() {
        let (mut scroll, sink) = controller(VerticalEdges::Right, HorizontalEdges::Bottom);
        scroll.step(&edge(1000, 2350, 0, 1)).unwrap();
        scroll.step(&edge(1004, 2351, 0, 1)).unwrap();
        assert_eq!(sink.take(), vec![Emitted::Horizontal(-24)]);
    }

    #[test]
    fn vertical_wins_in_a_corner() {
        let (mut scroll, sink) = controller(VerticalEdges::Both, HorizontalEdges::Both);
        scroll.step(&edge(3150, 2350, 1, 1)).unwrap();
        scroll.step(&edge(3160, 2360, 1, 1)).unwrap();
        assert_eq!(sink.take(), vec![Emitted::Vertical(60)]);
    }

    #[test]
    fn disabled_edge_does_not_scroll() {
        let (mut scroll, sink) = controller(VerticalEdges::Left, HorizontalEdges::None);
        scroll.step(&edge(3150, 1000, 1, 0)).unwrap();
        scroll.step(&edge(3150, 1100, 1, 0)).unwrap();
        scroll.step(&edge(1000, 2350, 0, 1)).unwrap();
        scroll.step(&edge(1100, 2350, 0, 1)).unwrap();
        assert!(sink.take().is_empty());
    }

    #[test]
    fn leaving_the_edge_resets_and_waits() {
        let (mut scroll, sink) = controller(VerticalEdges::Right, HorizontalEdges::Bottom);
        scroll.step(&edge(3150, 1000, 1, 0)).unwrap();
        let released = TouchpadSnapshot::default();
        assert_eq!(scroll.step(&released).unwrap(), Pace::Wait(Gate::EdgeTouch));

        scroll.step(&edge(3150, 1500, 1, 0)).unwrap();
        assert!(sink.take().is_empty());
    }
}
