//! Calendar clock driven by the RTC seconds interrupt.
//!
//! The interrupt handler only increments a [`SecondsCounter`]. Everything else happens on
//! [`Clock::update`]: the seconds that accumulated since the previous call are absorbed with the
//! seconds interrupt masked, then carried through minutes, hours, days, months and years using
//! the clock's own copy of the calendar. Daylight saving time transitions are applied on the
//! hour carry when the calendar has [`CalendarTime::dst`] set.

use crate::config::ClockConfig;
use crate::counter::SecondsCounter;
use crate::dst::DstSchedule;
use crate::error::Error;
use crate::get::Get;
use crate::platform::{ClockGate, InterruptControl, Irq, Peripheral, RtcHal};
use crate::record::{
    Alarm, CalendarTime, HourFormat, IntervalTimer, MinYear, base_days_in_month, is_leap_year,
};
use crate::set::Set;
#[cfg(feature = "defmt")]
use defmt::{debug, trace, warn};

/// Coarsest unit of the calendar that changed during one [`Clock::update`]. Every finer unit
/// may have changed as well.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Granularity {
    Unchanged,
    Second,
    Minute,
    Hour,
    Day,
    Month,
    Year,
}

/// Record storage the clock persists its state to, usually an [`crate::Eeprom`] or a
/// `&mut Eeprom`.
pub trait ClockStore:
    Get<Alarm>
    + Set<Alarm>
    + Get<CalendarTime>
    + Set<CalendarTime>
    + Get<IntervalTimer>
    + Set<IntervalTimer>
    + Get<MinYear>
    + Set<MinYear>
{
}

impl<T> ClockStore for T where
    T: Get<Alarm>
        + Set<Alarm>
        + Get<CalendarTime>
        + Set<CalendarTime>
        + Get<IntervalTimer>
        + Set<IntervalTimer>
        + Get<MinYear>
        + Set<MinYear>
{
}

pub struct Clock<'a, S: ClockStore, R: RtcHal, I: InterruptControl> {
    store: S,
    rtc: R,
    irq: I,
    counter: &'a SecondsCounter,

    time: CalendarTime,
    alarm: Alarm,
    timer: IntervalTimer,
    min_year: u16,
    dst: Option<DstSchedule>,

    /// Counter value up to which seconds have been added to `time`.
    absorbed: u32,
    /// RTC seconds register when [`Clock::sleep`] was called.
    asleep_at: Option<u32>,
}

impl<'a, S: ClockStore, R: RtcHal, I: InterruptControl> Clock<'a, S, R, I> {
    /// Restores minimum year, alarm, interval timer and calendar from `store`. Records that are
    /// missing or fail validation are replaced by defaults, which are written back right away.
    ///
    /// Starts the RTC oscillator if needed, unmasks the seconds interrupt and runs a first
    /// update. Time that passed between the last committed second and now (only known with a
    /// battery backed RTC) is persisted.
    pub fn new(
        store: S,
        rtc: R,
        irq: I,
        gate: &mut impl ClockGate,
        counter: &'a SecondsCounter,
        config: &ClockConfig,
    ) -> Self {
        gate.ensure_enabled(Peripheral::Rtc);

        let mut store = store;
        let min_year = load_or_default(&mut store, MinYear(config.default_min_year), |_| true).0;
        let alarm = load_or_default(&mut store, Alarm::default(), Alarm::is_valid);
        let timer = load_or_default(&mut store, IntervalTimer::default(), IntervalTimer::is_valid);

        let (time, restored) = match <S as Get<CalendarTime>>::get(&mut store) {
            Ok(time) if time.is_valid(min_year) => (time, true),
            _ => {
                #[cfg(feature = "defmt")]
                warn!("clock: no valid calendar stored, starting over in {}", min_year);

                let time = CalendarTime::new_year(min_year);
                if <S as Set<CalendarTime>>::set(&mut store, time).is_err() {
                    #[cfg(feature = "defmt")]
                    warn!("clock: failed to store default calendar");
                }
                (time, false)
            }
        };

        let mut clock = Self {
            store,
            rtc,
            irq,
            counter,
            time,
            alarm,
            timer,
            min_year,
            dst: time.dst.then(|| DstSchedule::new(&time)),
            absorbed: 0,
            asleep_at: None,
        };

        if !clock.rtc.is_running() {
            clock.rtc.start();
        }

        if config.battery_backed && restored && clock.rtc.time_valid() {
            // the seconds register was loaded with the committed second when the calendar was
            // last stored and kept counting since
            let second = clock.time.second as u32;
            clock.masked(|clock| {
                let elapsed = clock.rtc.seconds().wrapping_sub(second);
                clock.counter.set(elapsed);
                clock.absorbed = 0;
            });

            #[cfg(feature = "defmt")]
            debug!("clock: {} seconds passed on battery", clock.counter.get());
        } else {
            clock.reset();
        }

        if !clock.irq.is_enabled(Irq::RtcSeconds) {
            clock.irq.enable_interrupt(Irq::RtcSeconds);
        }

        if clock.update() != Granularity::Unchanged {
            clock.commit_time();
        }

        clock
    }

    /// Absorbs the seconds counted by the interrupt since the previous call and reports the
    /// coarsest calendar unit that changed. Cheap when no second passed.
    pub fn update(&mut self) -> Granularity {
        // A tick racing this comparison is picked up on the next call.
        if self.counter.get() == self.absorbed {
            return Granularity::Unchanged;
        }

        let delta = self.masked(|clock| {
            let now = clock.counter.get();
            let delta = now.wrapping_sub(clock.absorbed);
            clock.absorbed = now;
            delta
        });

        #[cfg(feature = "defmt")]
        trace!("clock: absorbing {} seconds", delta);

        let mut second = self.time.second as u32 + delta % 60;
        let mut carry = delta / 60;
        if second >= 60 {
            second -= 60;
            carry += 1;
        }
        self.time.second = second as u8;
        if carry == 0 {
            return Granularity::Second;
        }

        let minutes = self.time.minute as u32 + carry;
        self.time.minute = (minutes % 60) as u8;
        carry = minutes / 60;
        if carry == 0 {
            return Granularity::Minute;
        }

        let adjust = self.dst.as_mut().map_or(0, |dst| dst.advance(carry));
        #[cfg(feature = "defmt")]
        if adjust != 0 {
            debug!("clock: daylight saving time moves the hour by {}", adjust);
        }
        let hours = (self.time.hour as u32 + carry).saturating_add_signed(adjust);
        self.time.hour = (hours % 24) as u8;
        carry = hours / 24;
        if carry == 0 {
            return Granularity::Hour;
        }

        self.advance_days(carry)
    }

    /// Carries `days` into day, month and year.
    fn advance_days(&mut self, days: u32) -> Granularity {
        let mut granularity = Granularity::Day;
        let mut day = self.time.day as u32 + days;
        let mut month = self.time.month;
        let mut year = self.time.year;
        let mut leap = is_leap_year(year);

        loop {
            let length = base_days_in_month(month) as u32;
            if day <= length {
                break;
            }

            if month == 2 && leap {
                // the 29th is a valid date in a leap year
                if day == length + 1 {
                    break;
                }
                day -= 1;
            }
            day -= length;

            granularity = granularity.max(Granularity::Month);
            month += 1;
            if month == 13 {
                month = 1;
                year = year.saturating_add(1);
                leap = is_leap_year(year);
                granularity = Granularity::Year;
            }
        }

        self.time.day = day as u8;
        self.time.month = month;
        self.time.year = year;
        granularity
    }

    /// Call right before the MCU enters a low power mode with interrupts disabled. The RTC keeps
    /// counting on its own and [`Clock::wake`] applies the difference.
    pub fn sleep(&mut self) {
        self.asleep_at = Some(self.rtc.seconds());
    }

    /// Applies the seconds the RTC counted since [`Clock::sleep`] and returns them. A no-op
    /// returning 0 without a preceding sleep.
    pub fn wake(&mut self) -> u32 {
        let Some(asleep_at) = self.asleep_at.take() else {
            return 0;
        };

        self.masked(|clock| {
            let elapsed = clock.rtc.seconds().wrapping_sub(asleep_at);
            clock.counter.advance(elapsed);
            elapsed
        })
    }

    /// Sets and stores the calendar. The set second becomes the new zero point of the RTC.
    pub fn set_time(&mut self, time: CalendarTime) -> Result<(), Error> {
        if !time.is_valid(self.min_year) {
            return Err(Error::InvalidRecord);
        }

        self.time = time;
        self.dst = time.dst.then(|| DstSchedule::new(&time));
        self.commit_time();
        Ok(())
    }

    pub fn set_alarm(&mut self, alarm: Alarm) -> Result<(), Error> {
        if !alarm.is_valid() {
            return Err(Error::InvalidRecord);
        }

        if <S as Set<Alarm>>::set(&mut self.store, alarm).is_err() {
            #[cfg(feature = "defmt")]
            warn!("clock: failed to store alarm");
        }
        self.alarm = alarm;
        Ok(())
    }

    pub fn set_timer(&mut self, timer: IntervalTimer) -> Result<(), Error> {
        if !timer.is_valid() {
            return Err(Error::InvalidRecord);
        }

        if <S as Set<IntervalTimer>>::set(&mut self.store, timer).is_err() {
            #[cfg(feature = "defmt")]
            warn!("clock: failed to store timer");
        }
        self.timer = timer;
        Ok(())
    }

    /// The calendar as of the last [`Clock::update`].
    pub fn time(&self) -> CalendarTime {
        self.time
    }

    pub fn alarm(&self) -> Alarm {
        self.alarm
    }

    pub fn timer(&self) -> IntervalTimer {
        self.timer
    }

    pub fn min_year(&self) -> u16 {
        self.min_year
    }

    pub fn is_12h(&self) -> bool {
        self.time.format == HourFormat::H12
    }

    /// Whether the calendar currently shows daylight saving time.
    pub fn is_dst_active(&self) -> bool {
        self.dst.is_some_and(|dst| dst.active())
    }

    /// The record storage, for the other records it holds.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_parts(self) -> (S, R, I) {
        (self.store, self.rtc, self.irq)
    }

    /// Stores the calendar and restarts the RTC at the stored second.
    fn commit_time(&mut self) {
        if <S as Set<CalendarTime>>::set(&mut self.store, self.time).is_err() {
            #[cfg(feature = "defmt")]
            warn!("clock: failed to store calendar");
        }
        self.reset();
    }

    /// Makes the current second the zero point of the seconds counter and the RTC.
    fn reset(&mut self) {
        let second = self.time.second as u32;
        self.masked(|clock| {
            clock.counter.set(0);
            clock.absorbed = 0;
            clock.rtc.restart(second);
        });
    }

    /// Runs `f` with the seconds interrupt masked, if it is enabled at all.
    fn masked<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let enabled = self.irq.is_enabled(Irq::RtcSeconds);
        if enabled {
            self.irq.disable_interrupt(Irq::RtcSeconds);
        }

        let result = f(self);

        if enabled {
            self.irq.enable_interrupt(Irq::RtcSeconds);
        }
        result
    }
}

fn load_or_default<S, T>(store: &mut S, default: T, valid: impl Fn(&T) -> bool) -> T
where
    S: Get<T> + Set<T>,
    T: Copy,
{
    match <S as Get<T>>::get(store) {
        Ok(value) if valid(&value) => value,
        _ => {
            #[cfg(feature = "defmt")]
            debug!("clock: restoring default record");

            if <S as Set<T>>::set(store, default).is_err() {
                #[cfg(feature = "defmt")]
                warn!("clock: failed to store default record");
            }
            default
        }
    }
}
