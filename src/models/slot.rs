//! Discretization of the teaching week.
//!
//! The grid is five days of six periods each. [`SlotSpan`] models the
//! consecutive-period footprint of a placement and provides the overlap and
//! adjacency helpers the validator and searches are built on. Everything
//! here is pure and stateless.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Periods per teaching day.
pub const PERIODS_PER_DAY: u8 = 6;

/// First period of the day.
pub const FIRST_PERIOD: u8 = 1;

/// Teaching day of the week.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Day {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
}

impl Day {
    /// Week order, Monday first.
    pub const ALL: [Day; 5] = [Day::Mon, Day::Tue, Day::Wed, Day::Thu, Day::Fri];

    pub fn as_str(&self) -> &'static str {
        match self {
            Day::Mon => "Mon",
            Day::Tue => "Tue",
            Day::Wed => "Wed",
            Day::Thu => "Thu",
            Day::Fri => "Fri",
        }
    }

    /// Maps a calendar weekday onto the grid. Weekends carry no periods.
    pub fn from_weekday(weekday: chrono::Weekday) -> Option<Day> {
        match weekday {
            chrono::Weekday::Mon => Some(Day::Mon),
            chrono::Weekday::Tue => Some(Day::Tue),
            chrono::Weekday::Wed => Some(Day::Wed),
            chrono::Weekday::Thu => Some(Day::Thu),
            chrono::Weekday::Fri => Some(Day::Fri),
            chrono::Weekday::Sat | chrono::Weekday::Sun => None,
        }
    }
}

impl std::fmt::Display for Day {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wall-clock labels for the six periods. Display only, never semantics.
pub static SLOT_LABELS: Lazy<HashMap<u8, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (1, "9-10"),
        (2, "10-11"),
        (3, "11-12"),
        (4, "12-1"),
        (5, "1-2"),
        (6, "2-3"),
    ])
});

/// Display label for a period ("9-10" for P1, and so on).
pub fn slot_label(period: u8) -> &'static str {
    SLOT_LABELS.get(&period).copied().unwrap_or("?")
}

/// A (day, period) cell of the weekly grid.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
    pub day: Day,
    pub period: u8,
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} P{}", self.day, self.period)
    }
}

/// A placement footprint: `duration` consecutive periods starting at `start`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSpan {
    pub start: u8,
    pub duration: u8,
}

impl SlotSpan {
    pub fn new(start: u8, duration: u8) -> Self {
        Self { start, duration }
    }

    /// Last period of the span.
    pub fn end(&self) -> u8 {
        self.start + self.duration.saturating_sub(1)
    }

    /// The periods the span occupies, in order.
    pub fn periods(&self) -> impl Iterator<Item = u8> {
        self.start..self.start + self.duration
    }

    pub fn contains(&self, period: u8) -> bool {
        period >= self.start && period < self.start + self.duration
    }

    pub fn overlaps(&self, other: &SlotSpan) -> bool {
        self.start < other.start + other.duration && other.start < self.start + self.duration
    }

    /// Periods immediately before and after the span, clipped to the day.
    pub fn adjacent_periods(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(2);
        if self.start > FIRST_PERIOD {
            out.push(self.start - 1);
        }
        if self.end() < PERIODS_PER_DAY {
            out.push(self.end() + 1);
        }
        out
    }

    /// Whether the whole span lies inside the 1..=6 grid.
    pub fn fits_in_day(&self) -> bool {
        self.start >= FIRST_PERIOD && self.duration >= 1 && self.end() <= PERIODS_PER_DAY
    }

    /// Latest start period that still fits `duration` periods in a day.
    pub fn max_start(duration: u8) -> u8 {
        PERIODS_PER_DAY.saturating_sub(duration.saturating_sub(1))
    }
}
