#![doc = include_str!("../README.md")]
#![cfg_attr(not(target_arch = "x86_64"), no_std)]

pub mod clock;
pub mod config;
mod counter;
mod dst;
pub mod error;
mod get;
pub mod layout;
pub mod platform;
pub mod record;
mod set;
mod storage;

pub use clock::{Clock, Granularity};
pub use config::{ClockConfig, EepromConfig};
pub use counter::SecondsCounter;
pub use get::Get;
pub use layout::{EepromSize, Slot};
pub use set::Set;

use crate::error::Error;
use crate::layout::{SEAL_COMMITTED, SEAL_OPEN};
use crate::platform::{ClockGate, FlexRam, Peripheral};
#[cfg(feature = "defmt")]
use defmt::{debug, trace, warn};

/// FSTAT error flags: read collision, access error and protection violation.
const FSTAT_ERRORS: u8 = 0x70;

/// Outcome of the one-time FlexRAM partitioning check done by [`Eeprom::new`].
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Provisioning {
    /// FlexRAM was already set up for EEPROM emulation on an earlier boot.
    Existing,
    /// FlexRAM was partitioned during this boot.
    Partitioned,
    /// The partition command reported the contained FSTAT error flags. Nothing is retried, the
    /// store stays unavailable until the next power cycle.
    Failed { status: u8 },
}

/// EEPROM emulated on FlexRAM: a flat array of 16-bit slots addressed by [`Slot`].
///
/// Every access first waits for the EEPROM state machine with a bounded number of polls, writes
/// are skipped when the slot already holds the value to save on endurance.
pub struct Eeprom<F: FlexRam> {
    pub(crate) hal: F,
    pub(crate) size: Option<EepromSize>,
    ready_poll_limit: u32,
    provisioning: Provisioning,
}

impl<F: FlexRam> Eeprom<F> {
    /// Takes ownership of the flash controller and, on the very first boot of a device,
    /// partitions FlexRAM as EEPROM according to `config`.
    ///
    /// Partitioning is permanent. A failure is not retried and leaves the store without
    /// capacity for the rest of this boot, every access then fails with [`Error::Unavailable`].
    pub fn new(mut hal: F, gate: &mut impl ClockGate, config: &EepromConfig) -> Self {
        gate.ensure_enabled(Peripheral::Ftfl);

        let provisioning = if hal.is_plain_ram() {
            #[cfg(feature = "defmt")]
            debug!("partitioning flexram: size code {:#04x}", config.size_code());

            let status = hal.program_partition(config.size_code(), config.dataflash);
            let errors = status & FSTAT_ERRORS;
            if errors != 0 {
                hal.clear_status(errors);

                #[cfg(feature = "defmt")]
                warn!("flexram partitioning failed: fstat {:#04x}", status);

                return Self {
                    hal,
                    size: None,
                    ready_poll_limit: config.ready_poll_limit,
                    provisioning: Provisioning::Failed { status: errors },
                };
            }
            Provisioning::Partitioned
        } else {
            Provisioning::Existing
        };

        let size = EepromSize::from_repr(hal.eeprom_size_code())
            .filter(|size| *size != EepromSize::Disabled);

        #[cfg(feature = "defmt")]
        trace!("eeprom size: {}", size);
        #[cfg(feature = "defmt")]
        if size.is_some_and(|size| !size.holds_layout()) {
            warn!("eeprom size {} can't hold every record", size);
        }

        Self {
            hal,
            size,
            ready_poll_limit: config.ready_poll_limit,
            provisioning,
        }
    }

    /// Whether FlexRAM is backed by EEPROM emulation.
    pub fn valid(&self) -> bool {
        self.size.is_some()
    }

    pub fn provisioning(&self) -> Provisioning {
        self.provisioning
    }

    pub fn size(&self) -> Option<EepromSize> {
        self.size
    }

    /// Number of usable slots, 0 when the store is unavailable.
    pub fn capacity(&self) -> u16 {
        self.size.map_or(0, EepromSize::slots)
    }

    /// Reads a single slot. Never written slots read as [`layout::ERASED`].
    pub fn read(&mut self, slot: Slot) -> Result<u16, Error> {
        self.read_index(slot.index())
    }

    /// Writes a single slot unless it already holds `value`.
    pub fn write(&mut self, slot: Slot, value: u16) -> Result<(), Error> {
        self.write_index(slot.index(), value)
    }

    /// Reads a 32-bit value from `high` and the slot after it.
    pub fn read_u32(&mut self, high: Slot) -> Result<u32, Error> {
        let index = high.index();
        self.check(index + 1)?;
        let high = self.read_index(index)?;
        let low = self.read_index(index + 1)?;
        Ok(((high as u32) << 16) | low as u32)
    }

    /// Writes a 32-bit value to `high` and the slot after it.
    pub fn write_u32(&mut self, high: Slot, value: u32) -> Result<(), Error> {
        let index = high.index();
        self.check(index + 1)?;
        self.write_index(index, (value >> 16) as u16)?;
        self.write_index(index + 1, value as u16)
    }

    /// Get a record.
    ///
    /// Multi-slot records are only returned when their last write completed, a half written
    /// record is reported as [`Error::IncompleteRecord`].
    pub fn get<R>(&mut self) -> Result<R, Error>
    where
        Eeprom<F>: Get<R>,
    {
        Get::get(self)
    }

    /// Set a record. Either every slot of the record is written or the record reads as
    /// incomplete afterwards, a mixture of old and new fields is never returned by [`Eeprom::get`].
    pub fn set<R>(&mut self, value: R) -> Result<(), Error>
    where
        Eeprom<F>: Set<R>,
    {
        Set::set(self, value)
    }

    /// Fails fast for unavailable stores and indices beyond the capacity, without touching
    /// the hardware.
    fn check(&self, index: u16) -> Result<(), Error> {
        match self.size {
            None => Err(Error::Unavailable),
            Some(size) if index >= size.slots() => Err(Error::SlotOutOfRange),
            Some(_) => Ok(()),
        }
    }

    fn ready(&mut self) -> Result<(), Error> {
        let hal = &mut self.hal;
        if (0..self.ready_poll_limit).any(|_| hal.eeprom_ready()) {
            Ok(())
        } else {
            #[cfg(feature = "defmt")]
            warn!("eeprom not ready after {} polls", self.ready_poll_limit);
            Err(Error::NotReady)
        }
    }

    pub(crate) fn read_index(&mut self, index: u16) -> Result<u16, Error> {
        self.check(index)?;
        self.ready()?;
        Ok(self.hal.read_word(index))
    }

    pub(crate) fn write_index(&mut self, index: u16, value: u16) -> Result<(), Error> {
        self.check(index)?;
        self.ready()?;

        if self.hal.read_word(index) != value {
            #[cfg(feature = "defmt")]
            trace!("write: [{}] = {:#06x}", index, value);

            #[cfg(feature = "debug-logs")]
            println!("  eeprom: write [{index:>4}] = 0x{value:04X}");

            self.hal.write_word(index, value);
        }
        Ok(())
    }

    /// Reads the `N` fields starting at `first` followed by their seal slot.
    pub(crate) fn read_sealed<const N: usize>(&mut self, first: Slot) -> Result<[u16; N], Error> {
        let first = first.index();
        let seal = first + N as u16;
        self.check(seal)?;

        if self.read_index(seal)? != SEAL_COMMITTED {
            return Err(Error::IncompleteRecord);
        }

        let mut words = [0u16; N];
        for (offset, word) in words.iter_mut().enumerate() {
            *word = self.read_index(first + offset as u16)?;
        }
        Ok(words)
    }

    /// Writes `words` starting at `first` and commits them through the seal slot following
    /// them. A record that is already stored and committed costs no writes.
    pub(crate) fn write_sealed<const N: usize>(
        &mut self,
        first: Slot,
        words: [u16; N],
    ) -> Result<(), Error> {
        let start = first.index();
        let seal = start + N as u16;
        self.check(seal)?;

        match self.read_sealed::<N>(first) {
            Ok(current) if current == words => return Ok(()),
            Ok(_) | Err(Error::IncompleteRecord) => {}
            Err(e) => return Err(e),
        }

        self.write_index(seal, SEAL_OPEN)?;
        for (offset, word) in words.into_iter().enumerate() {
            self.write_index(start + offset as u16, word)?;
        }
        self.write_index(seal, SEAL_COMMITTED)
    }
}
