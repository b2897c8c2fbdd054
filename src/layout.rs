//! Slot layout of the emulated EEPROM.
//!
//! The ordinal of a [`Slot`] is its word offset inside the FlexRAM aperture. Fields of a sealed
//! record occupy consecutive slots, closed by the seal. A record that no longer decodes after a
//! layout change fails validation and the clock falls back to its defaults.

use strum::EnumCount;

/// Value of an erased, never written slot.
pub const ERASED: u16 = u16::MAX;

/// Seal value written before the fields of a multi-slot record are touched.
pub(crate) const SEAL_OPEN: u16 = 0x0000;

/// Seal value written after the last field of a multi-slot record was stored.
pub(crate) const SEAL_COMMITTED: u16 = 0x5A5A;

/// Width of a single slot in bytes.
pub const SLOT_SIZE: usize = 2;

#[derive(
    strum::FromRepr, strum::EnumCount, strum::Display, Debug, PartialEq, Eq, Clone, Copy,
)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Slot {
    // alarm
    AlarmHourMinute = 0,
    AlarmSnoozeWake,
    AlarmDuration,
    AlarmKindState,
    AlarmSeal,

    // clock
    ClockSecond,
    ClockHourMinute,
    ClockMonthDay,
    ClockYear,
    // hour format in the high byte, daylight saving time enabled in the low byte
    ClockFormatDst,
    ClockSeal,

    ClockMinYear,

    // interval timer, minutes in the high byte
    TimerMinutesSeconds,

    // index of the file the player resumes with
    Track,

    LedsColorHigh,
    LedsColorLow,
    LedsColorSeal,

    // touch sensor calibration
    TouchNscnPs,
    TouchRefchrgExtchrg,
    TouchThreshold,
    TouchSeal,

    // power timing, all in seconds
    SleepMcuSecsHigh,
    SleepMcuSecsLow,
    SleepDisplaySecsHigh,
    SleepDisplaySecsLow,
    SleepPlayerSecsHigh,
    SleepPlayerSecsLow,
    SleepSeal,
}

impl Slot {
    pub const fn index(self) -> u16 {
        self as u16
    }
}

const _: () = assert!(Slot::COUNT <= EepromSize::Bytes2048.slots() as usize);

/// EEPROM size codes as programmed into the EESIZE field of FCCOB4 and reported back by
/// SIM_FCFG1. Smaller sizes trade capacity for write endurance.
#[derive(strum::FromRepr, strum::Display, Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum EepromSize {
    Bytes2048 = 0x03,
    Bytes1024 = 0x04,
    Bytes512 = 0x05,
    Bytes256 = 0x06,
    Bytes128 = 0x07,
    Bytes64 = 0x08,
    Bytes32 = 0x09,
    /// FlexRAM is not used for EEPROM emulation.
    Disabled = 0x0F,
}

impl EepromSize {
    pub const fn bytes(self) -> usize {
        match self {
            EepromSize::Bytes2048 => 2048,
            EepromSize::Bytes1024 => 1024,
            EepromSize::Bytes512 => 512,
            EepromSize::Bytes256 => 256,
            EepromSize::Bytes128 => 128,
            EepromSize::Bytes64 => 64,
            EepromSize::Bytes32 => 32,
            EepromSize::Disabled => 0,
        }
    }

    /// Number of 16-bit slots backed by this size.
    pub const fn slots(self) -> u16 {
        (self.bytes() / SLOT_SIZE) as u16
    }

    /// Whether every [`Slot`] of the layout fits. Smaller sizes still work, records beyond the
    /// capacity fail with [`crate::error::Error::SlotOutOfRange`].
    pub const fn holds_layout(self) -> bool {
        self.slots() as usize >= Slot::COUNT
    }
}
