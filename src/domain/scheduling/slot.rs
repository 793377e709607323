//! Bookable meeting slots within a fixed weekly availability window.

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveTime, Offset, TimeZone, Timelike, Utc,
    Weekday,
};

use crate::domain::foundation::Timestamp;

/// A bookable meeting start time, in the school's local offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Slot {
    starts_at: DateTime<FixedOffset>,
}

impl Slot {
    /// Creates a slot starting at the given local time.
    pub fn new(starts_at: DateTime<FixedOffset>) -> Self {
        Self { starts_at }
    }

    /// Local start time.
    pub fn starts_at(&self) -> &DateTime<FixedOffset> {
        &self.starts_at
    }

    /// Start time as a UTC timestamp, for storage.
    pub fn timestamp(&self) -> Timestamp {
        Timestamp::from(&self.starts_at)
    }

    /// Short form used in listings: `March 5, 9:30 AM`.
    pub fn label(&self) -> String {
        self.starts_at.format("%B %-d, %-I:%M %p").to_string()
    }
}

/// Weekly availability for admission meetings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotWindow {
    pub utc_offset: FixedOffset,
    /// Number of days after today that are offered (tomorrow first).
    pub lookahead_days: u32,
    pub day_start: NaiveTime,
    /// Exclusive: the last slot starts `slot_minutes` before this.
    pub day_end: NaiveTime,
    pub slot_minutes: u32,
    pub weekdays: Vec<Weekday>,
}

impl Default for SlotWindow {
    fn default() -> Self {
        Self {
            utc_offset: FixedOffset::east_opt(4 * 3600).unwrap_or(Utc.fix()),
            lookahead_days: 3,
            day_start: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default(),
            day_end: NaiveTime::from_hms_opt(15, 0, 0).unwrap_or_default(),
            slot_minutes: 30,
            weekdays: vec![
                Weekday::Sun,
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
            ],
        }
    }
}

impl SlotWindow {
    /// Every slot in the window, ordered ascending, ignoring bookings.
    pub fn candidate_slots(&self, now: Timestamp) -> Vec<Slot> {
        let today = now.in_offset(self.utc_offset).date_naive();
        let start_min = self.day_start.num_seconds_from_midnight() / 60;
        let end_min = self.day_end.num_seconds_from_midnight() / 60;
        let step = self.slot_minutes.max(1) as usize;

        let mut slots = Vec::new();
        for offset_days in 1..=i64::from(self.lookahead_days) {
            let date = today + Duration::days(offset_days);
            if !self.weekdays.contains(&date.weekday()) {
                continue;
            }
            for minute in (start_min..end_min).step_by(step) {
                let Some(time) = NaiveTime::from_hms_opt(minute / 60, minute % 60, 0) else {
                    continue;
                };
                if let Some(local) = self
                    .utc_offset
                    .from_local_datetime(&date.and_time(time))
                    .single()
                {
                    slots.push(Slot::new(local));
                }
            }
        }
        slots
    }

    /// Candidate slots minus already booked times and anything not in the future.
    pub fn available_slots(&self, now: Timestamp, booked: &[Timestamp]) -> Vec<Slot> {
        self.candidate_slots(now)
            .into_iter()
            .filter(|slot| slot.timestamp().is_after(&now))
            .filter(|slot| !booked.contains(&slot.timestamp()))
            .collect()
    }

    /// First and last instants covered by the window, for booking lookups.
    pub fn bounds(&self, now: Timestamp) -> (Timestamp, Timestamp) {
        let from = now;
        let to = now.plus_secs(u64::from(self.lookahead_days + 1) * 24 * 3600);
        (from, to)
    }

    /// Long form used in confirmations: `Sunday, March 5 at 9:30 AM`.
    pub fn describe(&self, at: Timestamp) -> String {
        at.in_offset(self.utc_offset)
            .format("%A, %B %-d at %-I:%M %p")
            .to_string()
    }

    /// Opening hours on a 24-hour clock: `8:00–15:00`.
    pub fn hours_label(&self) -> String {
        format!(
            "{}:{:02}–{}:{:02}",
            self.day_start.hour(),
            self.day_start.minute(),
            self.day_end.hour(),
            self.day_end.minute()
        )
    }

    /// Opening hours on a 12-hour clock: `8:00 AM–3:00 PM`.
    pub fn hours_label_12h(&self) -> String {
        format!(
            "{}–{}",
            self.day_start.format("%-I:%M %p"),
            self.day_end.format("%-I:%M %p")
        )
    }

    /// Open weekdays: `Sun–Thu` for a run of consecutive days, otherwise a
    /// comma list such as `Mon, Wed, Fri`.
    pub fn days_label(&self) -> String {
        let mut days: Vec<Weekday> = Vec::new();
        for day in &self.weekdays {
            if !days.contains(day) {
                days.push(*day);
            }
        }

        match days.len() {
            0 => "no days".to_string(),
            1 => days[0].to_string(),
            7 => "every day".to_string(),
            n => {
                // A run starts on the day whose predecessor is closed.
                let run_start = days
                    .iter()
                    .find(|day| !days.contains(&day.pred()))
                    .copied()
                    .filter(|start| (0..n).all(|k| days.contains(&days_after(*start, k))));

                match run_start {
                    Some(start) => format!("{}–{}", start, days_after(start, n - 1)),
                    None => {
                        days.sort_by_key(|day| day.num_days_from_sunday());
                        days.iter()
                            .map(Weekday::to_string)
                            .collect::<Vec<_>>()
                            .join(", ")
                    }
                }
            }
        }
    }

    /// `next three days`, `next day`, `next 10 days`.
    pub fn lookahead_label(&self) -> String {
        match self.lookahead_days {
            1 => "next day".to_string(),
            n => format!("next {} days", number_word(n)),
        }
    }

    /// Days offered, counted from tomorrow: `Tomorrow and the next 2 days`.
    pub fn offered_days_label(&self) -> String {
        match self.lookahead_days {
            0 | 1 => "Tomorrow".to_string(),
            2 => "Tomorrow and the day after".to_string(),
            n => format!("Tomorrow and the next {} days", n - 1),
        }
    }
}

fn days_after(day: Weekday, count: usize) -> Weekday {
    (0..count).fold(day, |day, _| day.succ())
}

fn number_word(n: u32) -> String {
    const WORDS: [&str; 8] = ["zero", "one", "two", "three", "four", "five", "six", "seven"];
    WORDS
        .get(n as usize)
        .map(|word| word.to_string())
        .unwrap_or_else(|| n.to_string())
}

/// Numbered listing sent to the user: one `N. <label>` line per slot.
pub fn format_listing(slots: &[Slot]) -> String {
    slots
        .iter()
        .enumerate()
        .map(|(i, slot)| format!("{}. {}", i + 1, slot.label()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parses a 1-based slot choice, returning the zero-based index.
pub fn parse_slot_choice(input: &str, available: usize) -> Option<usize> {
    let chosen: usize = input.trim().parse().ok()?;
    if chosen >= 1 && chosen <= available {
        Some(chosen - 1)
    } else {
        None
    }
}
