use super::{MotionSink, SCROLL_UNITS_PER_DETENT};
use crate::error::Error;
use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AttributeSet, BusType, EventType, InputEvent, InputId, Key, RelativeAxisType};
use parking_lot::Mutex;

pub const VIRTUAL_DEVICE_NAME: &str = "edgepad virtual pointer";

/// Carries the part of hi-res scrolling that does not make a whole detent
/// yet, for clients that only read the legacy wheel axes.
#[derive(Debug, Default)]
struct WheelRemainder(i32);

impl WheelRemainder {
    fn push(&mut self, amount: i32) -> i32 {
        self.0 += amount;
        let detents = self.0 / SCROLL_UNITS_PER_DETENT;
        self.0 -= detents * SCROLL_UNITS_PER_DETENT;
        detents
    }
}

struct Inner {
    device: VirtualDevice,
    wheel: WheelRemainder,
    hwheel: WheelRemainder,
}

/// A uinput mouse. Destroyed when dropped.
pub struct VirtualPointer {
    inner: Mutex<Inner>,
}

impl VirtualPointer {
    pub fn open(name: &str) -> Result<Self, Error> {
        let sink_err = |context| move |source| Error::MotionSink { context, source };

        let keys: AttributeSet<Key> = [Key::BTN_LEFT].into_iter().collect();
        let axes: AttributeSet<RelativeAxisType> = [
            RelativeAxisType::REL_X,
            RelativeAxisType::REL_Y,
            RelativeAxisType::REL_WHEEL,
            RelativeAxisType::REL_HWHEEL,
            RelativeAxisType::REL_WHEEL_HI_RES,
            RelativeAxisType::REL_HWHEEL_HI_RES,
        ]
        .into_iter()
        .collect();

        let device = VirtualDeviceBuilder::new()
            .map_err(sink_err("cannot open /dev/uinput"))?
            .name(name)
            .input_id(InputId::new(BusType::BUS_USB, 0x1234, 0x5678, 0))
            .with_keys(&keys)
            .map_err(sink_err("cannot register buttons"))?
            .with_relative_axes(&axes)
            .map_err(sink_err("cannot register relative axes"))?
            .build()
            .map_err(sink_err("cannot create device"))?;

        Ok(Self {
            inner: Mutex::new(Inner {
                device,
                wheel: WheelRemainder::default(),
                hwheel: WheelRemainder::default(),
            }),
        })
    }

    /// `VirtualDevice::emit` ends the report with `SYN_REPORT` itself.
    fn emit(device: &mut VirtualDevice, events: &[InputEvent]) -> Result<(), Error> {
        device.emit(events).map_err(|source| Error::MotionSink {
            context: "cannot write to /dev/uinput",
            source,
        })
    }

    fn scroll(&self, hi_res: RelativeAxisType, legacy: RelativeAxisType, amount: i32) -> Result<(), Error> {
        let mut inner = self.inner.lock();
        let Inner {
            device,
            wheel,
            hwheel,
        } = &mut *inner;
        let remainder = if legacy == RelativeAxisType::REL_WHEEL { wheel } else { hwheel };

        let events = scroll_events(hi_res, legacy, amount, remainder.push(amount));
        Self::emit(device, &events)
    }
}

fn motion_events(dx: i32, dy: i32) -> Vec<InputEvent> {
    let mut events = Vec::with_capacity(2);
    if dx != 0 {
        events.push(relative(RelativeAxisType::REL_X, dx));
    }
    if dy != 0 {
        events.push(relative(RelativeAxisType::REL_Y, dy));
    }
    events
}

fn scroll_events(hi_res: RelativeAxisType, legacy: RelativeAxisType, amount: i32, detents: i32) -> Vec<InputEvent> {
    let mut events = vec![relative(hi_res, amount)];
    if detents != 0 {
        events.push(relative(legacy, detents));
    }
    events
}

fn relative(axis: RelativeAxisType, value: i32) -> InputEvent {
    InputEvent::new(EventType::RELATIVE, axis.0, value)
}

impl MotionSink for VirtualPointer {
    fn move_relative(&self, dx: i32, dy: i32) -> Result<(), Error> {
        let events = motion_events(dx, dy);
        if events.is_empty() {
            return Ok(());
        }
        Self::emit(&mut self.inner.lock().device, &events)
    }

    fn scroll_vertical(&self, amount: i32) -> Result<(), Error> {
        self.scroll(RelativeAxisType::REL_WHEEL_HI_RES, RelativeAxisType::REL_WHEEL, amount)
    }

    fn scroll_horizontal(&self, amount: i32) -> Result<(), Error> {
        self.scroll(RelativeAxisType::REL_HWHEEL_HI_RES, RelativeAxisType::REL_HWHEEL, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remainder_emits_whole_detents() {
        let mut remainder = WheelRemainder::default();
        assert_eq!(remainder.push(60), 0);
        assert_eq!(remainder.push(70), 1);
        assert_eq!(remainder.push(-20), 0);
        assert_eq!(remainder.push(-130), -1);
        assert_eq!(remainder.push(360), 2);
    }

    fn codes(events: &[InputEvent]) -> Vec<(EventType, u16, i32)> {
        events.iter().map(|e| (e.event_type(), e.code(), e.value())).collect()
    }

    #[test]
    fn reports_carry_no_sync_of_their_own() {
        let rel = EventType::RELATIVE;
        assert_eq!(
            codes(&motion_events(1, -1)),
            vec![(rel, RelativeAxisType::REL_X.0, 1), (rel, RelativeAxisType::REL_Y.0, -1)]
        );
        assert_eq!(codes(&motion_events(0, 2)), vec![(rel, RelativeAxisType::REL_Y.0, 2)]);
        assert!(motion_events(0, 0).is_empty());

        let wheel = scroll_events(RelativeAxisType::REL_WHEEL_HI_RES, RelativeAxisType::REL_WHEEL, 240, 2);
        assert_eq!(
            codes(&wheel),
            vec![
                (rel, RelativeAxisType::REL_WHEEL_HI_RES.0, 240),
                (rel, RelativeAxisType::REL_WHEEL.0, 2),
            ]
        );
        let partial = scroll_events(RelativeAxisType::REL_HWHEEL_HI_RES, RelativeAxisType::REL_HWHEEL, -30, 0);
        assert_eq!(codes(&partial), vec![(rel, RelativeAxisType::REL_HWHEEL_HI_RES.0, -30)]);
    }
}
