use core::sync::atomic::{AtomicU32, Ordering};

/// Seconds counted by the RTC seconds interrupt.
///
/// The interrupt handler is the only producer and calls [`SecondsCounter::tick`] once per
/// second. The clock reads it on every update and only rewrites it while the seconds interrupt
/// is masked, so a tick is never lost, it is merely observed one update later.
///
/// ```ignore
/// static SECONDS: SecondsCounter = SecondsCounter::new();
///
/// #[unsafe(no_mangle)]
/// extern "C" fn rtc_seconds_isr() {
///     SECONDS.tick();
/// }
/// ```
#[derive(Debug, Default)]
pub struct SecondsCounter(AtomicU32);

impl SecondsCounter {
    pub const fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    /// Called from the seconds interrupt.
    #[inline]
    pub fn tick(&self) {
        self.0.fetch_add(1, Ordering::AcqRel);
    }

    #[inline]
    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Acquire)
    }

    /// Only call with the seconds interrupt masked.
    #[inline]
    pub(crate) fn set(&self, value: u32) {
        self.0.store(value, Ordering::Release);
    }

    /// Only call with the seconds interrupt masked.
    #[inline]
    pub(crate) fn advance(&self, seconds: u32) {
        self.0.fetch_add(seconds, Ordering::AcqRel);
    }
}
