//! Meeting scheduling configuration

use chrono::{FixedOffset, NaiveTime, Weekday};
use serde::Deserialize;

use crate::domain::scheduling::SlotWindow;

use super::error::ValidationError;

/// When admission meetings can be booked
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulingConfig {
    /// School time zone as minutes east of UTC
    #[serde(default = "default_utc_offset")]
    pub utc_offset_minutes: i32,

    /// Days after today that are offered
    #[serde(default = "default_lookahead")]
    pub lookahead_days: u32,

    /// First slot start hour (local)
    #[serde(default = "default_day_start")]
    pub day_start_hour: u32,

    /// Hour at which the last slot must have ended (local, exclusive)
    #[serde(default = "default_day_end")]
    pub day_end_hour: u32,

    /// Slot length in minutes
    #[serde(default = "default_slot_minutes")]
    pub slot_minutes: u32,

    /// Comma-separated working days, e.g. `sun,mon,tue,wed,thu`
    #[serde(default = "default_weekdays")]
    pub weekdays: String,
}

impl SchedulingConfig {
    /// Parsed working days
    pub fn weekday_list(&self) -> Result<Vec<Weekday>, ValidationError> {
        self.weekdays
            .split(',')
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(|d| {
                d.parse::<Weekday>()
                    .map_err(|_| ValidationError::InvalidWeekday(d.to_string()))
            })
            .collect()
    }

    /// The slot window these settings describe
    pub fn slot_window(&self) -> Result<SlotWindow, ValidationError> {
        let utc_offset = FixedOffset::east_opt(self.utc_offset_minutes * 60)
            .ok_or(ValidationError::InvalidUtcOffset)?;
        let hour = |h: u32| {
            NaiveTime::from_hms_opt(h, 0, 0)
                .ok_or_else(|| ValidationError::InvalidMeetingHours(format!("hour {} out of range", h)))
        };

        Ok(SlotWindow {
            utc_offset,
            lookahead_days: self.lookahead_days,
            day_start: hour(self.day_start_hour)?,
            day_end: hour(self.day_end_hour)?,
            slot_minutes: self.slot_minutes,
            weekdays: self.weekday_list()?,
        })
    }

    /// Validate scheduling configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.day_start_hour >= self.day_end_hour {
            return Err(ValidationError::InvalidMeetingHours(format!(
                "start {}:00 is not before end {}:00",
                self.day_start_hour, self.day_end_hour
            )));
        }
        if self.slot_minutes == 0 || self.slot_minutes > 24 * 60 {
            return Err(ValidationError::InvalidMeetingHours(
                "slot length must be between 1 and 1440 minutes".to_string(),
            ));
        }
        if self.weekday_list()?.is_empty() {
            return Err(ValidationError::MissingRequired("SCHEDULING_WEEKDAYS"));
        }
        self.slot_window()?;
        Ok(())
    }
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: default_utc_offset(),
            lookahead_days: default_lookahead(),
            day_start_hour: default_day_start(),
            day_end_hour: default_day_end(),
            slot_minutes: default_slot_minutes(),
            weekdays: default_weekdays(),
        }
    }
}

fn default_utc_offset() -> i32 {
    4 * 60
}

fn default_lookahead() -> u32 {
    3
}

fn default_day_start() -> u32 {
    8
}

fn default_day_end() -> u32 {
    15
}

fn default_slot_minutes() -> u32 {
    30
}

fn default_weekdays() -> String {
    "sun,mon,tue,wed,thu".to_string()
}
