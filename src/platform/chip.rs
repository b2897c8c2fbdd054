//! Register level implementation of the platform traits for the MK20DX256.

use core::marker::PhantomData;
use core::ptr::{read_volatile, write_volatile};

use cortex_m::interrupt::InterruptNumber;
use cortex_m::peripheral::NVIC;

use crate::platform::launch;
use crate::platform::{ClockGate, FlexRam, InterruptControl, Irq, Peripheral, RtcHal};

/// A single memory mapped register. Only constructed from the fixed addresses below.
#[derive(Clone, Copy)]
struct Reg<T: Copy> {
    addr: usize,
    _width: PhantomData<T>,
}

impl<T: Copy> Reg<T> {
    const fn at(addr: usize) -> Self {
        Self {
            addr,
            _width: PhantomData,
        }
    }

    #[inline(always)]
    fn read(self) -> T {
        // Safety: every `Reg` is built from a documented peripheral address of this part
        unsafe { read_volatile(self.addr as *const T) }
    }

    #[inline(always)]
    fn write(self, value: T) {
        // Safety: see `read`
        unsafe { write_volatile(self.addr as *mut T, value) }
    }

    #[inline(always)]
    fn modify(self, f: impl FnOnce(T) -> T) {
        self.write(f(self.read()))
    }
}

const FTFL_BASE: usize = 0x4002_0000;
const FSTAT: Reg<u8> = Reg::at(FTFL_BASE);
const FCNFG: Reg<u8> = Reg::at(FTFL_BASE + 0x01);
const FCCOB0: Reg<u8> = Reg::at(FTFL_BASE + 0x07);
const FCCOB5: Reg<u8> = Reg::at(FTFL_BASE + 0x0A);
const FCCOB4: Reg<u8> = Reg::at(FTFL_BASE + 0x0B);

const SIM_FCFG1: Reg<u32> = Reg::at(0x4004_804C);
const SIM_SCGC1: usize = 0x4004_8028;

const FLEXRAM_BASE: usize = 0x1400_0000;

const FCNFG_EEERDY: u8 = 1 << 0;
const FCNFG_RAMRDY: u8 = 1 << 1;
const CMD_PROGRAM_PARTITION: u8 = 0x80;

#[repr(C, align(4))]
struct Launcher([u16; 8]);

/// Launcher for the command loaded into FCCOB. `.data` is copied to RAM by the startup code.
#[unsafe(link_section = ".data.flexclock.launch_command")]
static LAUNCH_COMMAND: Launcher = Launcher(launch::CODE);

/// Flash memory module and FlexRAM.
pub struct Ftfl {
    _private: (),
}

impl Ftfl {
    /// # Safety
    /// Must exist at most once, it hands out access to the flash controller.
    pub const unsafe fn steal() -> Self {
        Self { _private: () }
    }

    fn flexram_word(index: u16) -> Reg<u16> {
        Reg::at(FLEXRAM_BASE + index as usize * 2)
    }
}

impl FlexRam for Ftfl {
    fn is_plain_ram(&mut self) -> bool {
        FCNFG.read() & FCNFG_RAMRDY != 0
    }

    fn program_partition(&mut self, eeprom_size: u8, dataflash: u8) -> u8 {
        FCCOB0.write(CMD_PROGRAM_PARTITION);
        FCCOB4.write(eeprom_size);
        FCCOB5.write(dataflash);

        // Safety: the launcher is a complete Thumb routine following the C calling convention,
        // bit 0 of the address selects Thumb state
        let launch_command = unsafe {
            core::mem::transmute::<*const (), unsafe extern "C" fn(*mut u8)>(
                LAUNCH_COMMAND.0.as_ptr().cast::<u8>().wrapping_add(1).cast(),
            )
        };
        cortex_m::interrupt::free(|_| {
            // Safety: FSTAT is the command register of this very controller
            unsafe { launch_command(FSTAT.addr as *mut u8) }
        });

        FSTAT.read()
    }

    fn clear_status(&mut self, flags: u8) {
        FSTAT.write(flags);
    }

    fn eeprom_size_code(&mut self) -> u8 {
        ((SIM_FCFG1.read() & 0x000F_0000) >> 16) as u8
    }

    fn eeprom_ready(&mut self) -> bool {
        FCNFG.read() & FCNFG_EEERDY != 0
    }

    fn read_word(&mut self, index: u16) -> u16 {
        Self::flexram_word(index).read()
    }

    fn write_word(&mut self, index: u16, value: u16) {
        Self::flexram_word(index).write(value)
    }
}

/// System clock gating control registers SIM_SCGC1..SIM_SCGC7.
pub struct Sim {
    _private: (),
}

impl Sim {
    /// # Safety
    /// Must exist at most once.
    pub const unsafe fn steal() -> Self {
        Self { _private: () }
    }

    fn gate(peripheral: Peripheral) -> (Reg<u32>, u32) {
        // (SCGC register number, bit)
        let (scgc, bit) = match peripheral {
            Peripheral::Dac0 => (2, 12),
            Peripheral::Ftm2 => (3, 24),
            Peripheral::Adc1 => (3, 27),
            Peripheral::Ewm => (4, 1),
            Peripheral::Cmt => (4, 2),
            Peripheral::I2c0 => (4, 6),
            Peripheral::I2c1 => (4, 7),
            Peripheral::Uart0 => (4, 10),
            Peripheral::Uart1 => (4, 11),
            Peripheral::Uart2 => (4, 12),
            Peripheral::UsbOtg => (4, 18),
            Peripheral::Cmp => (4, 19),
            Peripheral::Vref => (4, 20),
            Peripheral::LpTimer => (5, 0),
            Peripheral::Tsi => (5, 5),
            Peripheral::PortA => (5, 9),
            Peripheral::PortB => (5, 10),
            Peripheral::PortC => (5, 11),
            Peripheral::PortD => (5, 12),
            Peripheral::PortE => (5, 13),
            Peripheral::Ftfl => (6, 0),
            Peripheral::DmaMux => (6, 1),
            Peripheral::FlexCan0 => (6, 4),
            Peripheral::Spi0 => (6, 12),
            Peripheral::Spi1 => (6, 13),
            Peripheral::I2s => (6, 15),
            Peripheral::Crc => (6, 18),
            Peripheral::UsbDcd => (6, 21),
            Peripheral::Pdb => (6, 22),
            Peripheral::Pit => (6, 23),
            Peripheral::Ftm0 => (6, 24),
            Peripheral::Ftm1 => (6, 25),
            Peripheral::Adc0 => (6, 27),
            Peripheral::Rtc => (6, 29),
            Peripheral::Dma => (7, 1),
        };
        (Reg::at(SIM_SCGC1 + (scgc - 1) * 4), 1 << bit)
    }
}

impl ClockGate for Sim {
    fn enable(&mut self, peripheral: Peripheral) {
        let (reg, mask) = Self::gate(peripheral);
        reg.modify(|v| v | mask);
    }

    fn enabled(&self, peripheral: Peripheral) -> bool {
        let (reg, mask) = Self::gate(peripheral);
        reg.read() & mask != 0
    }

    fn disable(&mut self, peripheral: Peripheral) {
        let (reg, mask) = Self::gate(peripheral);
        reg.modify(|v| v & !mask);
    }
}

// Safety: the discriminants are the NVIC numbers of the MK20DX256
unsafe impl InterruptNumber for Irq {
    fn number(self) -> u16 {
        self as u16
    }
}

/// NVIC backed interrupt control.
pub struct Nvic {
    _private: (),
}

impl Nvic {
    /// # Safety
    /// Unmasking interrupts may break critical sections established elsewhere.
    pub const unsafe fn steal() -> Self {
        Self { _private: () }
    }
}

impl InterruptControl for Nvic {
    fn enable_interrupt(&mut self, irq: Irq) {
        // Safety: the handlers for the RTC lines only touch the seconds counter
        unsafe { NVIC::unmask(irq) }
    }

    fn disable_interrupt(&mut self, irq: Irq) {
        NVIC::mask(irq)
    }

    fn is_enabled(&self, irq: Irq) -> bool {
        NVIC::is_enabled(irq)
    }
}

const RTC_BASE: usize = 0x4003_D000;
const RTC_TSR: Reg<u32> = Reg::at(RTC_BASE);
const RTC_TPR: Reg<u32> = Reg::at(RTC_BASE + 0x04);
const RTC_CR: Reg<u32> = Reg::at(RTC_BASE + 0x10);
const RTC_SR: Reg<u32> = Reg::at(RTC_BASE + 0x14);
const RTC_IER: Reg<u32> = Reg::at(RTC_BASE + 0x1C);

const RTC_CR_OSCE: u32 = 1 << 8;
const RTC_CR_SC16P: u32 = 1 << 10;
const RTC_CR_SC4P: u32 = 1 << 12;
const RTC_SR_TIF: u32 = 1 << 0;
const RTC_SR_TCE: u32 = 1 << 4;
const RTC_IER_TSIE: u32 = 1 << 4;

/// The RTC module. Its clock gate has to be enabled before any method is called.
pub struct Rtc {
    startup_cycles: u32,
}

impl Rtc {
    /// `core_hz` is used to wait about a millisecond for the oscillator to start.
    ///
    /// # Safety
    /// Must exist at most once.
    pub const unsafe fn steal(core_hz: u32) -> Self {
        Self {
            startup_cycles: core_hz / 1000,
        }
    }
}

impl RtcHal for Rtc {
    fn is_running(&mut self) -> bool {
        RTC_CR.read() & RTC_CR_OSCE != 0
    }

    fn start(&mut self) {
        // 20pF load on the 32 kHz crystal
        RTC_CR.write(RTC_CR_SC16P | RTC_CR_SC4P);
        RTC_CR.modify(|v| v | RTC_CR_OSCE);
        cortex_m::asm::delay(self.startup_cycles);
    }

    fn time_valid(&mut self) -> bool {
        RTC_SR.read() & RTC_SR_TIF == 0
    }

    fn seconds(&mut self) -> u32 {
        RTC_TSR.read()
    }

    fn restart(&mut self, seconds: u32) {
        // TCE must be clear to write TSR and TPR
        RTC_SR.write(0);
        RTC_TPR.write(0);
        RTC_TSR.write(seconds);
        RTC_IER.write(RTC_IER_TSIE);
        RTC_SR.write(RTC_SR_TCE);
    }
}
