//! Byte addressed view of the slot array through the `embedded-storage` traits. Offsets are in
//! bytes, slot `n` covers bytes `2n` (low byte) and `2n + 1` (high byte).

use embedded_storage::{ReadStorage, Storage};

use crate::error::Error;
use crate::layout::SLOT_SIZE;
use crate::platform::FlexRam;
use crate::Eeprom;

impl<F: FlexRam> Eeprom<F> {
    fn check_bytes(&self, offset: u32, len: usize) -> Result<(), Error> {
        if !self.valid() {
            return Err(Error::Unavailable);
        }
        match (offset as usize).checked_add(len) {
            Some(end) if end <= self.capacity() as usize * SLOT_SIZE => Ok(()),
            _ => Err(Error::SlotOutOfRange),
        }
    }
}

impl<F: FlexRam> ReadStorage for Eeprom<F> {
    type Error = Error;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        self.check_bytes(offset, bytes.len())?;

        let mut address = offset as usize;
        for byte in bytes.iter_mut() {
            let [low, high] = self.read_index((address / SLOT_SIZE) as u16)?.to_le_bytes();
            *byte = if address.is_multiple_of(SLOT_SIZE) { low } else { high };
            address += 1;
        }
        Ok(())
    }

    fn capacity(&self) -> usize {
        Eeprom::capacity(self) as usize * SLOT_SIZE
    }
}

impl<F: FlexRam> Storage for Eeprom<F> {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        self.check_bytes(offset, bytes.len())?;

        let mut address = offset as usize;
        let mut remaining = bytes;
        while let Some((&first, rest)) = remaining.split_first() {
            let index = (address / SLOT_SIZE) as u16;
            let [mut low, mut high] = self.read_index(index)?.to_le_bytes();

            if address.is_multiple_of(SLOT_SIZE) {
                low = first;
                remaining = rest;
                if let Some((&second, rest)) = remaining.split_first() {
                    high = second;
                    remaining = rest;
                }
            } else {
                high = first;
                remaining = rest;
            }

            let consumed = bytes.len() - remaining.len();
            address = offset as usize + consumed;
            self.write_index(index, u16::from_le_bytes([low, high]))?;
        }
        Ok(())
    }
}
