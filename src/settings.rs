use crate::error::Error;
use std::time::Duration;

pub const DEFAULT_EDGE_THICKNESS: i32 = 250;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ListMode {
    #[default]
    None,
    /// Devices that look enough like a touchpad to be selected
    Candidates,
    /// Every input device
    All,
}

/// X edges that drive vertical scrolling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum VerticalEdges {
    Left,
    Right,
    Both,
    None,
}

impl VerticalEdges {
    pub fn matches(self, edge_x: i8) -> bool {
        match self {
            VerticalEdges::Left => edge_x < 0,
            VerticalEdges::Right => edge_x > 0,
            VerticalEdges::Both => edge_x != 0,
            VerticalEdges::None => false,
        }
    }
}

/// Y edges that drive horizontal scrolling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum HorizontalEdges {
    Top,
    Bottom,
    Both,
    None,
}

impl HorizontalEdges {
    pub fn matches(self, edge_y: i8) -> bool {
        match self {
            HorizontalEdges::Top => edge_y < 0,
            HorizontalEdges::Bottom => edge_y > 0,
            HorizontalEdges::Both => edge_y != 0,
            HorizontalEdges::None => false,
        }
    }
}

/// Range reported by the hardware for one absolute axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AxisRange {
    pub minimum: i32,
    pub maximum: i32,
}

/// Inner rectangle of the touchpad. Everything on or beyond its border is
/// the edge zone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EdgeLimits {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl EdgeLimits {
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    pub fn edge_x(&self, x: i32) -> i8 {
        classify(x, self.min_x, self.max_x)
    }

    pub fn edge_y(&self, y: i32) -> i8 {
        classify(y, self.min_y, self.max_y)
    }

    /// Rejects an inner rectangle that is empty once unset limits have been
    /// filled from the device.
    pub fn validate(&self) -> Result<(), Error> {
        for (axis, min, max) in [("x", self.min_x, self.max_x), ("y", self.min_y, self.max_y)] {
            if min > max {
                return Err(Error::Configuration(format!(
                    "edge limits leave no inner area: min {axis} ({min}) is greater than max {axis} ({max})"
                )));
            }
        }
        Ok(())
    }
}

fn classify(value: i32, min: i32, max: i32) -> i8 {
    if value <= min {
        -1
    } else if value >= max {
        1
    } else {
        0
    }
}

#[derive(Clone, Debug, Default)]
pub struct TouchpadSettings {
    /// Exact device name to select instead of the best-scoring device.
    pub device_name: Option<String>,
    pub min_x: Option<i32>,
    pub max_x: Option<i32>,
    pub min_y: Option<i32>,
    pub max_y: Option<i32>,
    /// Negative or unset falls back to [`DEFAULT_EDGE_THICKNESS`].
    pub edge_thickness: Option<i32>,
    pub no_edge_protection: bool,
    pub list: ListMode,
}

impl TouchpadSettings {
    pub fn effective_thickness(&self) -> i32 {
        match self.edge_thickness {
            Some(t) if t >= 0 => t,
            _ => DEFAULT_EDGE_THICKNESS,
        }
    }

    /// Fills every unset limit from the hardware axis ranges.
    pub fn edge_limits(&self, x: AxisRange, y: AxisRange) -> EdgeLimits {
        let thickness = self.effective_thickness();
        EdgeLimits {
            min_x: self.min_x.unwrap_or(x.minimum + thickness),
            max_x: self.max_x.unwrap_or(x.maximum - thickness),
            min_y: self.min_y.unwrap_or(y.minimum + thickness),
            max_y: self.max_y.unwrap_or(y.maximum - thickness),
        }
    }
}

#[derive(Clone, Debug)]
pub struct EdgeMotionSettings {
    /// Pixels per tick along each active axis.
    pub speed: i32,
    pub interval: Duration,
    pub allow_move_while_touched: bool,
    pub disable_double_tap: bool,
}

impl Default for EdgeMotionSettings {
    fn default() -> Self {
        Self {
            speed: 1,
            interval: Duration::from_micros(3000),
            allow_move_while_touched: false,
            disable_double_tap: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct EdgeScrollSettings {
    pub enabled: bool,
    pub interval: Duration,
    pub divisor: i32,
    pub vertical: VerticalEdges,
    pub horizontal: HorizontalEdges,
}

impl Default for EdgeScrollSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            interval: Duration::from_micros(5000),
            divisor: 20,
            vertical: VerticalEdges::Right,
            horizontal: HorizontalEdges::Bottom,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Settings {
    pub touchpad: TouchpadSettings,
    pub motion: EdgeMotionSettings,
    pub scroll: EdgeScrollSettings,
    pub verbose: bool,
}

impl Settings {
    /// Rejects values the run loops cannot work with. Runs before any device
    /// is touched.
    pub fn validate(&self) -> Result<(), Error> {
        if self.scroll.divisor == 0 {
            return Err(Error::Configuration("scroll divisor must not be 0".into()));
        }
        if self.motion.speed == 0 {
            return Err(Error::Configuration("cursor speed must not be 0".into()));
        }
        if self.motion.interval.is_zero() {
            return Err(Error::Configuration("move interval must not be 0".into()));
        }
        if self.scroll.interval.is_zero() {
            return Err(Error::Configuration("scroll interval must not be 0".into()));
        }
        let t = &self.touchpad;
        for (axis, min, max) in [("x", t.min_x, t.max_x), ("y", t.min_y, t.max_y)] {
            if let (Some(min), Some(max)) = (min, max) {
                if min > max {
                    return Err(Error::Configuration(format!(
                        "min {axis} ({min}) is greater than max {axis} ({max})"
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const X: AxisRange = AxisRange {
        minimum: 0,
        maximum: 3200,
    };
    const Y: AxisRange = AxisRange {
        minimum: -100,
        maximum: 2400,
    };

    #[test]
    fn unset_limits_derive_from_axis_ranges() {
        let settings = TouchpadSettings::default();
        let limits = settings.edge_limits(X, Y);
        assert_eq!(
            limits,
            EdgeLimits {
                min_x: 250,
                max_x: 2950,
                min_y: 150,
                max_y: 2150,
            }
        );
    }

    #[test]
    fn explicit_limits_win_and_negative_thickness_uses_default() {
        let settings = TouchpadSettings {
            min_x: Some(-5),
            max_y: Some(2300),
            edge_thickness: Some(-1),
            ..Default::default()
        };
        let limits = settings.edge_limits(X, Y);
        assert_eq!(limits.min_x, -5);
        assert_eq!(limits.max_x, 3200 - DEFAULT_EDGE_THICKNESS);
        assert_eq!(limits.max_y, 2300);

        let thin = TouchpadSettings {
            edge_thickness: Some(0),
            ..Default::default()
        };
        assert_eq!(thin.edge_limits(X, Y).max_x, 3200);
    }

    #[test]
    fn edge_classification_is_inclusive() {
        let limits = EdgeLimits {
            min_x: 100,
            max_x: 3100,
            min_y: 100,
            max_y: 2300,
        };
        assert_eq!(limits.edge_x(99), -1);
        assert_eq!(limits.edge_x(100), -1);
        assert_eq!(limits.edge_x(101), 0);
        assert_eq!(limits.edge_x(3099), 0);
        assert_eq!(limits.edge_x(3100), 1);
        assert_eq!(limits.edge_x(3101), 1);
        assert!(limits.contains(100, 2300));
        assert!(!limits.contains(99, 500));
    }

    #[test]
    fn zero_scroll_divisor_is_rejected() {
        let mut settings = Settings::default();
        assert!(settings.validate().is_ok());
        settings.scroll.divisor = 0;
        assert!(matches!(settings.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn inverted_limits_are_rejected() {
        let mut settings = Settings::default();
        settings.touchpad.min_y = Some(500);
        settings.touchpad.max_y = Some(400);
        assert!(matches!(settings.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn derived_limits_past_the_opposite_side_are_rejected() {
        let settings = TouchpadSettings {
            min_x: Some(5000),
            ..Default::default()
        };
        let limits = settings.edge_limits(X, Y);
        assert_eq!((limits.min_x, limits.max_x), (5000, 2950));
        assert!(matches!(limits.validate(), Err(Error::Configuration(_))));

        let thick = TouchpadSettings {
            edge_thickness: Some(2000),
            ..Default::default()
        };
        assert!(matches!(thick.edge_limits(X, Y).validate(), Err(Error::Configuration(_))));
        assert!(TouchpadSettings::default().edge_limits(X, Y).validate().is_ok());
    }

    #[test]
    fn scroll_edges_match_their_side() {
        assert!(VerticalEdges::Right.matches(1));
        assert!(!VerticalEdges::Right.matches(-1));
        assert!(VerticalEdges::Both.matches(-1));
        assert!(!VerticalEdges::None.matches(1));
        assert!(HorizontalEdges::Top.matches(-1));
        assert!(!HorizontalEdges::Bottom.matches(0));
    }
}
