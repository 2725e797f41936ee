use super::{check_supported, not_found, select_best, Candidate, DeviceResemblance, TOUCHPAD_MARKER};
use crate::error::Error;
use crate::settings::{AxisRange, ListMode, TouchpadSettings};
use evdev::{AbsoluteAxisType, Device, EventType, Key};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const EVENT_DIR: &str = "/dev/input";
const EVENT_FILE_PREFIX: &str = "event";

/// The device chosen to read from, with its coordinate ranges.
pub struct SelectedDevice {
    pub path: PathBuf,
    pub device: Device,
    pub resemblance: DeviceResemblance,
    pub x_range: AxisRange,
    pub y_range: AxisRange,
}

pub fn resemblance_of(device: &Device) -> DeviceResemblance {
    let name = device.name().unwrap_or_default().to_string();
    let events = device.supported_events();
    let axes = device.supported_absolute_axes();
    let keys = device.supported_keys();

    DeviceResemblance {
        name_has_marker: name.contains(TOUCHPAD_MARKER),
        name,
        has_abs: events.contains(EventType::ABSOLUTE),
        has_xy: axes.is_some_and(|a| {
            a.contains(AbsoluteAxisType::ABS_X) && a.contains(AbsoluteAxisType::ABS_Y)
        }),
        has_mt: axes.is_some_and(|a| a.contains(AbsoluteAxisType::ABS_MT_POSITION_X)),
        has_keys: events.contains(EventType::KEY),
        has_touch_key: keys.is_some_and(|k| k.contains(Key::BTN_TOUCH)),
        has_press_key: keys.is_some_and(|k| k.contains(Key::BTN_LEFT)),
    }
}

fn is_event_node(file_name: &str) -> bool {
    file_name.starts_with(EVENT_FILE_PREFIX)
}

/// Probes every event node in [`EVENT_DIR`]. Order follows the directory
/// listing. A node that cannot be opened fails the whole scan.
pub fn scan() -> Result<Vec<Candidate>, Error> {
    let entries =
        fs::read_dir(EVENT_DIR).map_err(|e| Error::device_io(format!("cannot open {}", EVENT_DIR), e))?;

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::device_io(format!("cannot read from {}", EVENT_DIR), e))?;
        let is_event_node = entry
            .file_name()
            .to_str()
            .is_some_and(is_event_node);
        if !is_event_node {
            continue;
        }

        let path = entry.path();
        let device = open(&path)?;
        candidates.push(Candidate {
            resemblance: resemblance_of(&device),
            path,
        });
    }
    Ok(candidates)
}

fn open(path: &Path) -> Result<Device, Error> {
    Device::open(path).map_err(|e| Error::device_io(format!("cannot open {}", path.display()), e))
}

fn list(candidates: &[Candidate], mode: ListMode) {
    let shown = candidates.iter().filter(|c| match mode {
        ListMode::None => false,
        ListMode::Candidates => c.resemblance.score() > 0,
        ListMode::All => true,
    });
    for candidate in shown {
        println!("{}", candidate.describe());
    }
}

fn axis_ranges(device: &Device, path: &Path) -> Result<(AxisRange, AxisRange), Error> {
    let state = device
        .get_abs_state()
        .map_err(|e| Error::device_io(format!("cannot get axis limits of {}", path.display()), e))?;
    let range = |axis: AbsoluteAxisType| {
        let info = state[axis.0 as usize];
        AxisRange {
            minimum: info.minimum,
            maximum: info.maximum,
        }
    };
    Ok((range(AbsoluteAxisType::ABS_X), range(AbsoluteAxisType::ABS_Y)))
}

pub fn select(settings: &TouchpadSettings) -> Result<SelectedDevice, Error> {
    let candidates = scan()?;
    list(&candidates, settings.list);

    let device_name = settings.device_name.as_deref();
    let best = select_best(&candidates, device_name).ok_or_else(|| not_found(&candidates, device_name))?;
    info!(device = %best.resemblance.name, path = %best.path.display(), "found device");
    check_supported(&best.resemblance, device_name)?;

    let device = open(&best.path)?;
    let (x_range, y_range) = axis_ranges(&device, &best.path)?;
    Ok(SelectedDevice {
        path: best.path.clone(),
        device,
        resemblance: best.resemblance.clone(),
        x_range,
        y_range,
    })
}
