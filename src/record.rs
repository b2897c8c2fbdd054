//! Records persisted in the emulated EEPROM and the calendar rules used to validate them.

const DAYS_IN_MONTH: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Gregorian leap year: divisible by 4 and not by 100, unless also divisible by 400.
pub const fn is_leap_year(year: u16) -> bool {
    (year.is_multiple_of(4) && !year.is_multiple_of(100)) || year.is_multiple_of(400)
}

/// Length of `month` (1-12) in `year`. Returns 0 for months outside 1-12.
pub const fn days_in_month(month: u8, year: u16) -> u8 {
    if month == 0 || month > 12 {
        return 0;
    }
    let days = DAYS_IN_MONTH[month as usize - 1];
    if month == 2 && is_leap_year(year) {
        days + 1
    } else {
        days
    }
}

/// Base month length without the leap day, used by the day cascade.
pub(crate) const fn base_days_in_month(month: u8) -> u8 {
    DAYS_IN_MONTH[month as usize - 1]
}

/// Consecutive day count of a date. Only differences between two day numbers are meaningful.
pub(crate) const fn day_number(year: u16, month: u8, day: u8) -> u32 {
    // March based years put the leap day last, shifted by 400 years like `weekday`
    let year = year as u32 + 400 - (month < 3) as u32;
    let era = year / 400;
    let year_of_era = year % 400;
    let month = month as u32;
    let march_month = if month > 2 { month - 3 } else { month + 9 };
    let day_of_year = (153 * march_month + 2) / 5 + day as u32 - 1;
    era * 146_097 + year_of_era * 365 + year_of_era / 4 - year_of_era / 100 + day_of_year
}

#[derive(strum::FromRepr, strum::Display, Debug, PartialEq, Eq, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum HourFormat {
    #[default]
    H12 = 0x00,
    H24 = 0x01,
}

#[derive(strum::FromRepr, strum::Display, Debug, PartialEq, Eq, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AlarmKind {
    #[default]
    Beep = 0x00,
    Music = 0x01,
}

#[derive(strum::FromRepr, strum::Display, Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

/// Wall clock date and time.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalendarTime {
    pub second: u8,
    pub minute: u8,
    pub hour: u8,
    pub day: u8,
    pub month: u8,
    pub year: u16,
    pub format: HourFormat,
    /// Follow US daylight saving time: forward an hour at 02:00 on the second Sunday of March,
    /// back an hour at 02:00 on the first Sunday of November.
    pub dst: bool,
}

impl CalendarTime {
    /// Midnight of January 1st, 12 hour display, daylight saving time on.
    pub const fn new_year(year: u16) -> Self {
        Self {
            second: 0,
            minute: 0,
            hour: 0,
            day: 1,
            month: 1,
            year,
            format: HourFormat::H12,
            dst: true,
        }
    }

    pub fn is_valid(&self, min_year: u16) -> bool {
        self.hour < 24
            && self.minute < 60
            && self.second < 60
            && (1..=12).contains(&self.month)
            && self.day >= 1
            && self.day <= days_in_month(self.month, self.year)
            && self.year >= min_year
    }

    /// Day of the week. Only meaningful for valid dates.
    pub fn weekday(&self) -> Weekday {
        const MONTH_OFFSET: [u32; 12] = [0, 3, 2, 5, 0, 3, 5, 1, 4, 6, 2, 4];

        // shifted by a full 400 year cycle so January and February of year 0 don't underflow
        let year = self.year as u32 + 400 - (self.month < 3) as u32;
        let month = self.month.clamp(1, 12) as usize;
        let dow = (year + year / 4 - year / 100 + year / 400
            + MONTH_OFFSET[month - 1]
            + self.day as u32)
            % 7;

        Weekday::from_repr(dow as u8).unwrap_or(Weekday::Sunday)
    }

    /// Hour on a 12 hour dial and whether it is past noon.
    pub fn hour12(&self) -> (u8, bool) {
        match self.hour {
            0 => (12, false),
            h @ 1..=11 => (h, false),
            12 => (12, true),
            h => (h - 12, true),
        }
    }
}

/// Daily alarm.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Alarm {
    pub hour: u8,
    pub minute: u8,
    /// Minutes a snoozed alarm stays quiet, 1-59.
    pub snooze_minutes: u8,
    /// Minutes before the alarm time the wake up light starts, 0-59.
    pub wake_minutes: u8,
    /// Hours the alarm keeps sounding when not acknowledged, 0-23.
    pub duration_hours: u8,
    pub kind: AlarmKind,
    pub enabled: bool,
}

impl Default for Alarm {
    fn default() -> Self {
        Self {
            hour: 0,
            minute: 0,
            snooze_minutes: 10,
            wake_minutes: 10,
            duration_hours: 2,
            kind: AlarmKind::default(),
            enabled: false,
        }
    }
}

impl Alarm {
    pub fn is_valid(&self) -> bool {
        self.hour < 24
            && self.minute < 60
            && (1..60).contains(&self.snooze_minutes)
            && self.wake_minutes < 60
            && self.duration_hours < 24
    }
}

/// Countdown duration.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IntervalTimer {
    pub minutes: u8,
    pub seconds: u8,
}

impl IntervalTimer {
    pub fn is_valid(&self) -> bool {
        self.seconds < 60
    }

    pub fn total_seconds(&self) -> u16 {
        self.minutes as u16 * 60 + self.seconds as u16
    }
}

/// Earliest year the clock accepts.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MinYear(pub u16);

/// Index of the file the player resumes with.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Track(pub u16);

/// Night light color as 0x00RRGGBB.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LedColor(pub u32);

/// Touch sensing input calibration.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchCalibration {
    /// Number of scans per electrode.
    pub nscn: u8,
    /// Electrode oscillator prescaler.
    pub ps: u8,
    pub refchrg: u8,
    pub extchrg: u8,
    pub threshold: u16,
}

/// Idle times after which parts of the device power down, in seconds.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PowerTiming {
    pub mcu_secs: u32,
    pub display_secs: u32,
    pub player_secs: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: u16, month: u8, day: u8) -> CalendarTime {
        CalendarTime {
            day,
            month,
            ..CalendarTime::new_year(year)
        }
    }

    #[test]
    fn test_leap_years() {
        assert!(is_leap_year(2024));
        assert!(is_leap_year(2000));
        assert!(!is_leap_year(2023));
        assert!(!is_leap_year(1900));
        assert!(!is_leap_year(2100));
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2, 2024), 29);
        assert_eq!(days_in_month(2, 2023), 28);
        assert_eq!(days_in_month(2, 2100), 28);
        assert_eq!(days_in_month(4, 2023), 30);
        assert_eq!(days_in_month(12, 2023), 31);
        assert_eq!(days_in_month(0, 2023), 0);
        assert_eq!(days_in_month(13, 2023), 0);
    }

    #[test]
    fn test_weekday() {
        assert_eq!(date(1970, 1, 1).weekday(), Weekday::Thursday);
        assert_eq!(date(2000, 2, 29).weekday(), Weekday::Tuesday);
        assert_eq!(date(2017, 1, 1).weekday(), Weekday::Sunday);
        assert_eq!(date(2023, 12, 25).weekday(), Weekday::Monday);
        assert_eq!(date(2024, 1, 1).weekday(), Weekday::Monday);
    }

    #[test]
    fn test_hour12() {
        let at = |hour| CalendarTime {
            hour,
            ..CalendarTime::new_year(2024)
        };
        assert_eq!(at(0).hour12(), (12, false));
        assert_eq!(at(11).hour12(), (11, false));
        assert_eq!(at(12).hour12(), (12, true));
        assert_eq!(at(13).hour12(), (1, true));
        assert_eq!(at(23).hour12(), (11, true));
    }

    #[test]
    fn test_calendar_validation() {
        assert!(date(2024, 2, 29).is_valid(2017));
        assert!(!date(2023, 2, 29).is_valid(2017));
        assert!(!date(2023, 4, 31).is_valid(2017));
        assert!(!date(2023, 0, 1).is_valid(2017));
        assert!(!date(2023, 1, 0).is_valid(2017));
        assert!(!date(2016, 12, 31).is_valid(2017));
        assert!(date(2017, 1, 1).is_valid(2017));

        let late = CalendarTime {
            second: 59,
            minute: 59,
            hour: 23,
            ..date(2023, 12, 31)
        };
        assert!(late.is_valid(2017));
        assert!(!CalendarTime { hour: 24, ..late }.is_valid(2017));
        assert!(!CalendarTime { minute: 60, ..late }.is_valid(2017));
        assert!(!CalendarTime { second: 60, ..late }.is_valid(2017));
    }

    #[test]
    fn test_day_number() {
        assert_eq!(day_number(2024, 3, 1) - day_number(2024, 2, 28), 2);
        assert_eq!(day_number(2023, 3, 1) - day_number(2023, 2, 28), 1);
        assert_eq!(day_number(2024, 1, 1) - day_number(2023, 1, 1), 365);
        assert_eq!(day_number(2025, 1, 1) - day_number(2024, 1, 1), 366);
        assert_eq!(day_number(2000, 1, 1) - day_number(1970, 1, 1), 10_957);
        assert_eq!(day_number(0, 1, 1) + 1, day_number(0, 1, 2));
    }

    #[test]
    fn test_alarm_and_timer_validation() {
        assert!(Alarm::default().is_valid());
        assert!(Alarm { hour: 23, minute: 59, ..Alarm::default() }.is_valid());
        assert!(!Alarm { hour: 24, ..Alarm::default() }.is_valid());
        assert!(!Alarm { minute: 60, ..Alarm::default() }.is_valid());

        let limits = Alarm {
            snooze_minutes: 59,
            wake_minutes: 59,
            duration_hours: 23,
            ..Alarm::default()
        };
        assert!(limits.is_valid());
        let minimal = Alarm {
            snooze_minutes: 1,
            wake_minutes: 0,
            duration_hours: 0,
            ..limits
        };
        assert!(minimal.is_valid());
        assert!(!Alarm { snooze_minutes: 0, ..limits }.is_valid());
        assert!(!Alarm { snooze_minutes: 60, ..limits }.is_valid());
        assert!(!Alarm { wake_minutes: 60, ..limits }.is_valid());
        assert!(!Alarm { duration_hours: 24, ..limits }.is_valid());

        let timer = IntervalTimer { minutes: 255, seconds: 59 };
        assert!(timer.is_valid());
        assert_eq!(timer.total_seconds(), 255 * 60 + 59);
        assert!(!IntervalTimer { minutes: 0, seconds: 60 }.is_valid());
    }
}
