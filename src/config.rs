use crate::layout::EepromSize;

/// Number of times the EEPROM-ready flag is polled before a read or write gives up.
pub const DEFAULT_READY_POLL_LIMIT: u32 = 96_000;

/// Configuration of the emulated EEPROM.
///
/// Only applied on the very first boot, when FlexRAM is still plain RAM. Partitioning can't be
/// undone without a mass erase, so pick `size` and `dataflash` for the lifetime of the device.
/// Smaller sizes give higher write endurance.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EepromConfig {
    pub size: EepromSize,
    /// DEPART code for FCCOB5. `0x03` dedicates the whole 32K of data flash to EEPROM backup.
    pub dataflash: u8,
    /// EEESPLIT bits OR'ed into the size code. Has to be `0x30` on the K20.
    pub split: u8,
    pub ready_poll_limit: u32,
}

impl Default for EepromConfig {
    fn default() -> Self {
        Self {
            size: EepromSize::Bytes2048,
            dataflash: 0x03,
            split: 0x30,
            ready_poll_limit: DEFAULT_READY_POLL_LIMIT,
        }
    }
}

impl EepromConfig {
    pub(crate) fn size_code(&self) -> u8 {
        self.split | self.size as u8
    }
}

/// Configuration of the calendar clock.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockConfig {
    /// Minimum year used when the EEPROM doesn't hold one yet. Also the year of the default clock.
    pub default_min_year: u16,
    /// The RTC keeps counting from VBAT while the MCU is unpowered. When set and the RTC reports
    /// a valid time on boot, the seconds it counted since the last committed clock are applied
    /// instead of restarting from the persisted second.
    pub battery_backed: bool,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            default_min_year: 2017,
            battery_backed: false,
        }
    }
}
