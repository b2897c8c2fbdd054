use thiserror::Error;

/// Errors that can occur while talking to the emulated EEPROM or while handing records to the
/// clock. Every error leaves the persisted and in-memory state as it was before the call, so a
/// caller can simply retry or keep using the previous value.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Error {
    /// FlexRAM is not backed by EEPROM emulation. Either partitioning failed during this boot or
    /// the part was partitioned without an EEPROM region. Sticky until the next power cycle.
    #[error("eeprom emulation unavailable")]
    Unavailable,

    /// The EEPROM-ready flag did not come up within the configured number of polls.
    #[error("eeprom not ready")]
    NotReady,

    /// The slot ordinal or byte offset lies beyond the configured EEPROM size.
    #[error("slot out of range")]
    SlotOutOfRange,

    /// A record failed validation or contains a code that doesn't decode.
    #[error("invalid record")]
    InvalidRecord,

    /// A multi-slot record was never completely written. Either it has never been set or a
    /// previous write was interrupted half way.
    #[error("incomplete record")]
    IncompleteRecord,
}
