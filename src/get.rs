//! The `Get<T>` trait and its implementations decode the records of the slot layout, allowing a
//! single generic `get<T>()` on the store for every record type.

use crate::error::Error;
use crate::layout::{ERASED, Slot};
use crate::platform::FlexRam;
use crate::record::{
    Alarm, AlarmKind, CalendarTime, HourFormat, IntervalTimer, LedColor, MinYear, PowerTiming,
    TouchCalibration, Track,
};
use crate::Eeprom;

pub trait Get<T> {
    fn get(&mut self) -> Result<T, Error>;
}

impl<T, G: Get<T>> Get<T> for &mut G {
    fn get(&mut self) -> Result<T, Error> {
        (*self).get()
    }
}

#[inline(always)]
const fn split(word: u16) -> (u8, u8) {
    ((word >> 8) as u8, word as u8)
}

#[inline(always)]
const fn join(high: u16, low: u16) -> u32 {
    ((high as u32) << 16) | low as u32
}

impl<F: FlexRam> Get<Alarm> for Eeprom<F> {
    fn get(&mut self) -> Result<Alarm, Error> {
        let [hour_minute, snooze_wake, duration, kind_state] =
            self.read_sealed::<4>(Slot::AlarmHourMinute)?;
        let (hour, minute) = split(hour_minute);
        let (snooze_minutes, wake_minutes) = split(snooze_wake);
        let (kind, state) = split(kind_state);
        Ok(Alarm {
            hour,
            minute,
            snooze_minutes,
            wake_minutes,
            duration_hours: u8::try_from(duration).map_err(|_| Error::InvalidRecord)?,
            kind: AlarmKind::from_repr(kind).ok_or(Error::InvalidRecord)?,
            enabled: state != 0,
        })
    }
}

impl<F: FlexRam> Get<CalendarTime> for Eeprom<F> {
    fn get(&mut self) -> Result<CalendarTime, Error> {
        let [second, hour_minute, month_day, year, format_dst] =
            self.read_sealed::<5>(Slot::ClockSecond)?;
        let (hour, minute) = split(hour_minute);
        let (month, day) = split(month_day);
        let (format, dst) = split(format_dst);
        Ok(CalendarTime {
            second: u8::try_from(second).map_err(|_| Error::InvalidRecord)?,
            minute,
            hour,
            day,
            month,
            year,
            format: HourFormat::from_repr(format).ok_or(Error::InvalidRecord)?,
            dst: match dst {
                0 => false,
                1 => true,
                _ => return Err(Error::InvalidRecord),
            },
        })
    }
}

impl<F: FlexRam> Get<MinYear> for Eeprom<F> {
    fn get(&mut self) -> Result<MinYear, Error> {
        match self.read(Slot::ClockMinYear)? {
            ERASED => Err(Error::InvalidRecord),
            year => Ok(MinYear(year)),
        }
    }
}

impl<F: FlexRam> Get<IntervalTimer> for Eeprom<F> {
    fn get(&mut self) -> Result<IntervalTimer, Error> {
        let (minutes, seconds) = split(self.read(Slot::TimerMinutesSeconds)?);
        Ok(IntervalTimer { minutes, seconds })
    }
}

impl<F: FlexRam> Get<Track> for Eeprom<F> {
    fn get(&mut self) -> Result<Track, Error> {
        match self.read(Slot::Track)? {
            ERASED => Err(Error::InvalidRecord),
            track => Ok(Track(track)),
        }
    }
}

impl<F: FlexRam> Get<LedColor> for Eeprom<F> {
    fn get(&mut self) -> Result<LedColor, Error> {
        let [high, low] = self.read_sealed::<2>(Slot::LedsColorHigh)?;
        Ok(LedColor(join(high, low)))
    }
}

impl<F: FlexRam> Get<TouchCalibration> for Eeprom<F> {
    fn get(&mut self) -> Result<TouchCalibration, Error> {
        let [nscn_ps, refchrg_extchrg, threshold] = self.read_sealed::<3>(Slot::TouchNscnPs)?;
        let (nscn, ps) = split(nscn_ps);
        let (refchrg, extchrg) = split(refchrg_extchrg);
        Ok(TouchCalibration {
            nscn,
            ps,
            refchrg,
            extchrg,
            threshold,
        })
    }
}

impl<F: FlexRam> Get<PowerTiming> for Eeprom<F> {
    fn get(&mut self) -> Result<PowerTiming, Error> {
        let [mcu_high, mcu_low, display_high, display_low, player_high, player_low] =
            self.read_sealed::<6>(Slot::SleepMcuSecsHigh)?;
        Ok(PowerTiming {
            mcu_secs: join(mcu_high, mcu_low),
            display_secs: join(display_high, display_low),
            player_secs: join(player_high, player_low),
        })
    }
}
