use crate::error::Error;
use crate::layout::Slot;
use crate::platform::FlexRam;
use crate::record::{
    Alarm, CalendarTime, IntervalTimer, LedColor, MinYear, PowerTiming, TouchCalibration, Track,
};
use crate::Eeprom;

pub trait Set<T> {
    fn set(&mut self, value: T) -> Result<(), Error>;
}

impl<T, S: Set<T>> Set<T> for &mut S {
    fn set(&mut self, value: T) -> Result<(), Error> {
        (*self).set(value)
    }
}

#[inline(always)]
const fn pack(high: u8, low: u8) -> u16 {
    ((high as u16) << 8) | low as u16
}

#[inline(always)]
const fn halves(value: u32) -> [u16; 2] {
    [(value >> 16) as u16, value as u16]
}

impl<F: FlexRam> Set<Alarm> for Eeprom<F> {
    fn set(&mut self, value: Alarm) -> Result<(), Error> {
        self.write_sealed(
            Slot::AlarmHourMinute,
            [
                pack(value.hour, value.minute),
                pack(value.snooze_minutes, value.wake_minutes),
                value.duration_hours as u16,
                pack(value.kind as u8, value.enabled as u8),
            ],
        )
    }
}

impl<F: FlexRam> Set<CalendarTime> for Eeprom<F> {
    fn set(&mut self, value: CalendarTime) -> Result<(), Error> {
        self.write_sealed(
            Slot::ClockSecond,
            [
                value.second as u16,
                pack(value.hour, value.minute),
                pack(value.month, value.day),
                value.year,
                pack(value.format as u8, value.dst as u8),
            ],
        )
    }
}

impl<F: FlexRam> Set<MinYear> for Eeprom<F> {
    fn set(&mut self, value: MinYear) -> Result<(), Error> {
        self.write(Slot::ClockMinYear, value.0)
    }
}

impl<F: FlexRam> Set<IntervalTimer> for Eeprom<F> {
    fn set(&mut self, value: IntervalTimer) -> Result<(), Error> {
        self.write(
            Slot::TimerMinutesSeconds,
            pack(value.minutes, value.seconds),
        )
    }
}

impl<F: FlexRam> Set<Track> for Eeprom<F> {
    fn set(&mut self, value: Track) -> Result<(), Error> {
        self.write(Slot::Track, value.0)
    }
}

impl<F: FlexRam> Set<LedColor> for Eeprom<F> {
    fn set(&mut self, value: LedColor) -> Result<(), Error> {
        self.write_sealed(Slot::LedsColorHigh, halves(value.0))
    }
}

impl<F: FlexRam> Set<TouchCalibration> for Eeprom<F> {
    fn set(&mut self, value: TouchCalibration) -> Result<(), Error> {
        self.write_sealed(
            Slot::TouchNscnPs,
            [
                pack(value.nscn, value.ps),
                pack(value.refchrg, value.extchrg),
                value.threshold,
            ],
        )
    }
}

impl<F: FlexRam> Set<PowerTiming> for Eeprom<F> {
    fn set(&mut self, value: PowerTiming) -> Result<(), Error> {
        let [mcu_high, mcu_low] = halves(value.mcu_secs);
        let [display_high, display_low] = halves(value.display_secs);
        let [player_high, player_low] = halves(value.player_secs);
        self.write_sealed(
            Slot::SleepMcuSecsHigh,
            [
                mcu_high,
                mcu_low,
                display_high,
                display_low,
                player_high,
                player_low,
            ],
        )
    }
}
