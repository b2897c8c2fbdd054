//! US daylight saving time. Clocks go forward an hour at 02:00 on the second Sunday of March and
//! back an hour at 02:00 on the first Sunday of November.
//!
//! Transitions are located on an hour count (`day_number * 24 + hour`). The schedule only tracks
//! the hours left until the next transition, so the clock can feed it any number of elapsed hours
//! at once, including several years after a long stretch on battery.

use crate::record::{CalendarTime, day_number};

const TRANSITION_HOUR: u32 = 2;

/// Day of the month of the `nth` Sunday of `month`.
fn nth_sunday(year: u16, month: u8, nth: u8) -> u8 {
    let first = CalendarTime {
        day: 1,
        month,
        ..CalendarTime::new_year(year)
    };
    let to_sunday = (7 - first.weekday() as u8) % 7;
    1 + to_sunday + (nth - 1) * 7
}

fn hour_number(year: u16, month: u8, day: u8) -> u32 {
    day_number(year, month, day) * 24
}

/// Local standard time hour at which daylight saving time starts in `year`.
fn start(year: u16) -> u32 {
    hour_number(year, 3, nth_sunday(year, 3, 2)) + TRANSITION_HOUR
}

/// Local daylight time hour at which daylight saving time ends in `year`.
fn end(year: u16) -> u32 {
    hour_number(year, 11, nth_sunday(year, 11, 1)) + TRANSITION_HOUR
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) struct DstSchedule {
    active: bool,
    /// Year of the next transition.
    year: u16,
    /// Wall clock hours until the next transition.
    hours_left: u32,
}

impl DstSchedule {
    /// Schedule for a wall clock showing `time`. The repeated hour after the fall transition
    /// counts as daylight time.
    pub(crate) fn new(time: &CalendarTime) -> Self {
        let now = hour_number(time.year, time.month, time.day) + time.hour as u32;
        let year = time.year;

        let (active, year, next) = if now < start(year) {
            (false, year, start(year))
        } else if now < end(year) {
            (true, year, end(year))
        } else {
            let year = year.saturating_add(1);
            (false, year, start(year))
        };

        Self {
            active,
            year,
            hours_left: next.saturating_sub(now).max(1),
        }
    }

    pub(crate) fn active(&self) -> bool {
        self.active
    }

    /// Passes `hours` elapsed wall clock hours and returns the adjustment in hours of the
    /// transitions crossed on the way.
    pub(crate) fn advance(&mut self, mut hours: u32) -> i32 {
        let mut adjust = 0;

        while hours >= self.hours_left {
            hours -= self.hours_left;

            // wall clock hour right after the transition and the next transition
            let (from, next) = if self.active {
                let from = end(self.year) - 1;
                self.year = self.year.saturating_add(1);
                (from, start(self.year))
            } else {
                (start(self.year) + 1, end(self.year))
            };

            self.active = !self.active;
            adjust += if self.active { 1 } else { -1 };
            self.hours_left = next.saturating_sub(from).max(1);
        }

        self.hours_left -= hours;
        adjust
    }
}
