//! Hardware seams of the crate. The store and the clock only ever talk to the chip through the
//! traits in this module; `tests/common.rs` shows host implementations, the `mk20dx256` feature
//! provides register level ones.

/// Flash memory module (FTFL) and the FlexRAM aperture it turns into emulated EEPROM.
pub trait FlexRam {
    /// RAMRDY: FlexRAM is plain RAM, i.e. it has never been partitioned for EEPROM emulation.
    fn is_plain_ram(&mut self) -> bool;

    /// Launches the program partition command with the given EEPROM size code (FCCOB4) and data
    /// flash partition code (FCCOB5) and returns FSTAT once the command completed.
    ///
    /// Implementations must run the launch-and-wait sequence from RAM with interrupts disabled,
    /// the flash is unavailable while the command executes.
    fn program_partition(&mut self, eeprom_size: u8, dataflash: u8) -> u8;

    /// Clears the given error flags in FSTAT (write one to clear).
    fn clear_status(&mut self, flags: u8);

    /// EESIZE as reported by SIM_FCFG1.
    fn eeprom_size_code(&mut self) -> u8;

    /// EEERDY: the EEPROM state machine accepts reads and writes.
    fn eeprom_ready(&mut self) -> bool;

    fn read_word(&mut self, index: u16) -> u16;

    fn write_word(&mut self, index: u16, value: u16);
}

impl<T: FlexRam> FlexRam for &mut T {
    fn is_plain_ram(&mut self) -> bool {
        T::is_plain_ram(self)
    }

    fn program_partition(&mut self, eeprom_size: u8, dataflash: u8) -> u8 {
        T::program_partition(self, eeprom_size, dataflash)
    }

    fn clear_status(&mut self, flags: u8) {
        T::clear_status(self, flags)
    }

    fn eeprom_size_code(&mut self) -> u8 {
        T::eeprom_size_code(self)
    }

    fn eeprom_ready(&mut self) -> bool {
        T::eeprom_ready(self)
    }

    fn read_word(&mut self, index: u16) -> u16 {
        T::read_word(self, index)
    }

    fn write_word(&mut self, index: u16, value: u16) {
        T::write_word(self, index, value)
    }
}

/// Peripherals with a clock gate in SIM_SCGCx.
#[derive(strum::FromRepr, strum::Display, Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Peripheral {
    Dac0,
    Ftm2,
    Adc1,
    Ewm,
    Cmt,
    I2c0,
    I2c1,
    Uart0,
    Uart1,
    Uart2,
    UsbOtg,
    Cmp,
    Vref,
    LpTimer,
    Tsi,
    PortA,
    PortB,
    PortC,
    PortD,
    PortE,
    Ftfl,
    DmaMux,
    FlexCan0,
    Spi0,
    Spi1,
    I2s,
    Crc,
    UsbDcd,
    Pdb,
    Pit,
    Ftm0,
    Ftm1,
    Adc0,
    Rtc,
    Dma,
}

/// Module clock gating.
pub trait ClockGate {
    fn enable(&mut self, peripheral: Peripheral);
    fn enabled(&self, peripheral: Peripheral) -> bool;
    fn disable(&mut self, peripheral: Peripheral);

    /// Enables the gate unless it already is.
    fn ensure_enabled(&mut self, peripheral: Peripheral) {
        if !self.enabled(peripheral) {
            self.enable(peripheral);
        }
    }
}

impl<T: ClockGate> ClockGate for &mut T {
    fn enable(&mut self, peripheral: Peripheral) {
        T::enable(self, peripheral)
    }

    fn enabled(&self, peripheral: Peripheral) -> bool {
        T::enabled(self, peripheral)
    }

    fn disable(&mut self, peripheral: Peripheral) {
        T::disable(self, peripheral)
    }
}

/// Interrupt lines the crate masks and unmasks. The discriminant is the NVIC number.
#[derive(strum::FromRepr, strum::Display, Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum Irq {
    RtcAlarm = 66,
    RtcSeconds = 67,
}

/// Interrupt controller. Masking [`Irq::RtcSeconds`] is the only mutual exclusion the clock
/// relies on.
pub trait InterruptControl {
    fn enable_interrupt(&mut self, irq: Irq);
    fn disable_interrupt(&mut self, irq: Irq);
    fn is_enabled(&self, irq: Irq) -> bool;
}

impl<T: InterruptControl> InterruptControl for &mut T {
    fn enable_interrupt(&mut self, irq: Irq) {
        T::enable_interrupt(self, irq)
    }

    fn disable_interrupt(&mut self, irq: Irq) {
        T::disable_interrupt(self, irq)
    }

    fn is_enabled(&self, irq: Irq) -> bool {
        T::is_enabled(self, irq)
    }
}

/// The battery backed real time clock module.
pub trait RtcHal {
    /// The 32 kHz oscillator is enabled.
    fn is_running(&mut self) -> bool;

    /// Enables the oscillator and waits for it to settle.
    fn start(&mut self);

    /// The time invalid flag is clear, i.e. the seconds register kept counting since it was last
    /// written.
    fn time_valid(&mut self) -> bool;

    /// Current value of the time seconds register.
    fn seconds(&mut self) -> u32;

    /// Stops the counter, loads the seconds register with `seconds` and a zero prescaler, enables
    /// the seconds interrupt and restarts the counter.
    fn restart(&mut self, seconds: u32);
}

impl<T: RtcHal> RtcHal for &mut T {
    fn is_running(&mut self) -> bool {
        T::is_running(self)
    }

    fn start(&mut self) {
        T::start(self)
    }

    fn time_valid(&mut self) -> bool {
        T::time_valid(self)
    }

    fn seconds(&mut self) -> u32 {
        T::seconds(self)
    }

    fn restart(&mut self, seconds: u32) {
        T::restart(self, seconds)
    }
}

#[cfg(all(feature = "mk20dx256", target_arch = "arm"))]
mod chip;
#[cfg(any(test, all(feature = "mk20dx256", target_arch = "arm")))]
mod launch;

#[cfg(all(feature = "mk20dx256", target_arch = "arm"))]
pub use chip::*;
