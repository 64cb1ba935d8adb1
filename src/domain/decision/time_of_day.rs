//! Time-of-day tags for rules and options, and the caller's current period.

use chrono::{Local, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// The period of the day the caller is currently in.
///
/// Unlike [`TimeOfDay`], a current period is never `any`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayPeriod {
    Dawn,
    Day,
    Night,
}

impl DayPeriod {
    /// Maps a wall-clock hour (0-23) to a period.
    ///
    /// 05:00-11:59 is dawn, 12:00-17:59 is day, everything else is night.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => DayPeriod::Dawn,
            12..=17 => DayPeriod::Day,
            _ => DayPeriod::Night,
        }
    }

    /// The period for the local clock right now.
    pub fn current() -> Self {
        Self::from_hour(Local::now().hour())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DayPeriod::Dawn => "dawn",
            DayPeriod::Day => "day",
            DayPeriod::Night => "night",
        }
    }
}

impl fmt::Display for DayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayPeriod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dawn" => Ok(DayPeriod::Dawn),
            "day" => Ok(DayPeriod::Day),
            "night" => Ok(DayPeriod::Night),
            other => Err(ValidationError::invalid_format(
                "period",
                format!("expected dawn, day or night, got '{}'", other),
            )),
        }
    }
}

/// Time-of-day tag carried by rules and options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Dawn,
    Day,
    Night,
    #[default]
    Any,
}

impl TimeOfDay {
    /// True when this tag is `any` or names the given period.
    pub fn matches(&self, period: DayPeriod) -> bool {
        match self {
            TimeOfDay::Any => true,
            TimeOfDay::Dawn => period == DayPeriod::Dawn,
            TimeOfDay::Day => period == DayPeriod::Day,
            TimeOfDay::Night => period == DayPeriod::Night,
        }
    }
}

impl From<DayPeriod> for TimeOfDay {
    fn from(period: DayPeriod) -> Self {
        match period {
            DayPeriod::Dawn => TimeOfDay::Dawn,
            DayPeriod::Day => TimeOfDay::Day,
            DayPeriod::Night => TimeOfDay::Night,
        }
    }
}
