#[cfg(target_os = "linux")]
pub mod evdev_discovery;

use crate::error::{Capability, Error, NotFound};
use std::path::PathBuf;
use tracing::warn;

/// Substring expected in a touchpad's device name.
pub const TOUCHPAD_MARKER: &str = "Touchpad";

/// Added to the score of a device whose name matches the requested one, so
/// it is kept even when it is structurally unfit and can be reported as
/// unsupported instead of silently skipped.
pub const NAME_MATCH_BONUS: u32 = 100;

/// How much a device looks like a touchpad.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeviceResemblance {
    pub name: String,
    pub has_abs: bool,
    pub has_xy: bool,
    pub has_mt: bool,
    pub has_keys: bool,
    pub has_touch_key: bool,
    pub has_press_key: bool,
    pub name_has_marker: bool,
}

impl DeviceResemblance {
    /// Whether the mandatory capabilities for a candidate are all present.
    pub fn is_candidate(&self) -> bool {
        self.has_abs && (self.has_xy || self.has_mt) && self.has_keys && self.has_touch_key
    }

    pub fn score(&self) -> u32 {
        if !self.is_candidate() {
            return 0;
        }
        2 * self.name_has_marker as u32
            + 2 * self.has_xy as u32
            + self.has_mt as u32
            + self.has_press_key as u32
    }

    /// First capability without which the device cannot be driven.
    pub fn missing_capability(&self) -> Option<Capability> {
        if !self.has_abs {
            Some(Capability::AbsoluteEvents)
        } else if !self.has_xy && self.has_mt {
            Some(Capability::MultiTouchOnly)
        } else if !self.has_xy {
            Some(Capability::AbsoluteXY)
        } else if !self.has_keys {
            Some(Capability::KeyEvents)
        } else {
            None
        }
    }

    fn flags(&self) -> String {
        let flags = [
            (self.has_abs, "abs"),
            (self.has_xy, "xy"),
            (self.has_mt, "mt"),
            (self.has_keys, "keys"),
            (self.has_touch_key, "touch"),
            (self.has_press_key, "press"),
            (self.name_has_marker, "named"),
        ];
        flags
            .iter()
            .map(|(set, name)| format!("{}{}", if *set { '+' } else { '-' }, name))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Clone, Debug)]
pub struct Candidate {
    pub path: PathBuf,
    pub resemblance: DeviceResemblance,
}

impl Candidate {
    pub fn describe(&self) -> String {
        format!(
            "{:?} on {} score={} [{}]",
            self.resemblance.name,
            self.path.display(),
            self.resemblance.score(),
            self.resemblance.flags()
        )
    }

    fn rank(&self, device_name: Option<&str>) -> u32 {
        match device_name {
            None => self.resemblance.score(),
            Some(name) if self.resemblance.name == name => {
                NAME_MATCH_BONUS + self.resemblance.score()
            }
            Some(_) => 0,
        }
    }
}

/// Picks the highest ranked candidate. The first one seen wins ties.
pub fn select_best<'a>(candidates: &'a [Candidate], device_name: Option<&str>) -> Option<&'a Candidate> {
    let mut best = None;
    let mut best_rank = 0;
    for candidate in candidates {
        let rank = candidate.rank(device_name);
        if rank > best_rank {
            best = Some(candidate);
            best_rank = rank;
        }
    }
    best
}

pub fn not_found(candidates: &[Candidate], device_name: Option<&str>) -> Error {
    Error::DeviceNotFound(match device_name {
        _ if candidates.is_empty() => NotFound::NoDevices,
        Some(name) => NotFound::NoDeviceNamed(name.to_string()),
        None => NotFound::NoTouchpad,
    })
}

/// Fails on a missing mandatory capability and warns about optional ones.
pub fn check_supported(resemblance: &DeviceResemblance, device_name: Option<&str>) -> Result<(), Error> {
    if let Some(missing) = resemblance.missing_capability() {
        return Err(Error::DeviceUnsupported {
            device: resemblance.name.clone(),
            missing,
        });
    }
    if !resemblance.name_has_marker && device_name.is_none() {
        warn!(
            device = %resemblance.name,
            "selected device does not have {:?} in its name", TOUCHPAD_MARKER
        );
    }
    if !resemblance.has_touch_key {
        warn!(device = %resemblance.name, "device has no touch key, touches will not be seen");
    }
    if !resemblance.has_press_key {
        warn!(device = %resemblance.name, "device has no press key, presses will not be seen");
    }
    Ok(())
}
