#![allow(dead_code)]

// filename according to https://doc.rust-lang.org/book/ch11-03-test-organization.html
use std::cell::{Cell, RefCell};

use flexclock::platform::{ClockGate, FlexRam, InterruptControl, Irq, Peripheral, RtcHal};
use flexclock::{Eeprom, EepromConfig, EepromSize, SecondsCounter};

/// Words in the FlexRAM aperture of the MK20DX256 (2 KiB).
pub const FLEXRAM_WORDS: usize = 1024;

/// FSTAT after a successful command: only CCIF set.
pub const FSTAT_OK: u8 = 0x80;
pub const FSTAT_ACCERR: u8 = 0x20;

#[derive(Debug, PartialEq, Clone)]
pub enum Operation {
    Partition { eeprom_size: u8, dataflash: u8 },
    Read { index: u16 },
    Write { index: u16, value: u16 },
}

/// FlexRAM and flash controller of a device. Interior mutability lets a test inspect it while
/// the store holds a reference.
pub struct Flash {
    pub words: RefCell<Vec<u16>>,
    pub plain_ram: Cell<bool>,
    pub size_code: Cell<u8>,
    pub partition_status: Cell<u8>,
    pub cleared: Cell<u8>,
    /// The ready flag stays low once this many operations have been logged.
    pub fail_after_operation: Cell<usize>,
    pub ready_polls: Cell<usize>,
    pub operations: RefCell<Vec<Operation>>,
}

impl Flash {
    /// A device fresh from the factory, FlexRAM still plain RAM.
    pub fn new() -> Self {
        Self {
            words: RefCell::new(vec![0xFFFF; FLEXRAM_WORDS]),
            plain_ram: Cell::new(true),
            size_code: Cell::new(0x0F),
            partition_status: Cell::new(FSTAT_OK),
            cleared: Cell::new(0),
            fail_after_operation: Cell::new(usize::MAX),
            ready_polls: Cell::new(0),
            operations: RefCell::new(Vec::new()),
        }
    }

    /// A device partitioned on an earlier boot.
    pub fn partitioned(size: EepromSize) -> Self {
        let flash = Self::new();
        flash.plain_ram.set(false);
        flash.size_code.set(size as u8);
        flash
    }

    /// Lets the next `operations` succeed, then the ready flag never comes up again.
    pub fn fail_after(&self, operations: usize) {
        self.fail_after_operation
            .set(self.operations.borrow().len() + operations);
    }

    pub fn disable_faults(&self) {
        self.fail_after_operation.set(usize::MAX);
    }

    pub fn word(&self, index: u16) -> u16 {
        self.words.borrow()[index as usize]
    }

    pub fn writes(&self) -> usize {
        self.operations
            .borrow()
            .iter()
            .filter(|op| matches!(op, Operation::Write { .. }))
            .count()
    }

    pub fn dump_operations(&self) {
        println!("Operations:");
        for op in self.operations.borrow().iter() {
            println!("  {:?}", op);
        }
    }
}

impl FlexRam for &Flash {
    fn is_plain_ram(&mut self) -> bool {
        self.plain_ram.get()
    }

    fn program_partition(&mut self, eeprom_size: u8, dataflash: u8) -> u8 {
        println!("    flexram: partition size 0x{eeprom_size:02X} dataflash 0x{dataflash:02X}");
        self.operations.borrow_mut().push(Operation::Partition {
            eeprom_size,
            dataflash,
        });

        let status = self.partition_status.get();
        if status & 0x70 == 0 {
            self.plain_ram.set(false);
            self.size_code.set(eeprom_size & 0x0F);
        }
        status
    }

    fn clear_status(&mut self, flags: u8) {
        self.cleared.set(self.cleared.get() | flags);
    }

    fn eeprom_size_code(&mut self) -> u8 {
        self.size_code.get()
    }

    fn eeprom_ready(&mut self) -> bool {
        self.ready_polls.set(self.ready_polls.get() + 1);
        self.operations.borrow().len() < self.fail_after_operation.get()
    }

    fn read_word(&mut self, index: u16) -> u16 {
        assert!(!self.plain_ram.get(), "read from unpartitioned flexram");
        self.operations.borrow_mut().push(Operation::Read { index });
        self.words.borrow()[index as usize]
    }

    fn write_word(&mut self, index: u16, value: u16) {
        assert!(!self.plain_ram.get(), "write to unpartitioned flexram");
        println!("    flexram: write [{index:>4}] = 0x{value:04X}");
        self.operations
            .borrow_mut()
            .push(Operation::Write { index, value });
        self.words.borrow_mut()[index as usize] = value;
    }
}

#[derive(Default)]
pub struct Gate {
    pub enabled: Vec<Peripheral>,
}

impl ClockGate for Gate {
    fn enable(&mut self, peripheral: Peripheral) {
        if !self.enabled.contains(&peripheral) {
            self.enabled.push(peripheral);
        }
    }

    fn enabled(&self, peripheral: Peripheral) -> bool {
        self.enabled.contains(&peripheral)
    }

    fn disable(&mut self, peripheral: Peripheral) {
        self.enabled.retain(|p| *p != peripheral);
    }
}

/// Battery backed RTC. `tsr` keeps counting whatever the MCU does.
pub struct Rtc {
    pub running: Cell<bool>,
    pub starts: Cell<usize>,
    pub time_valid: Cell<bool>,
    pub tsr: Cell<u32>,
    pub restarts: RefCell<Vec<u32>>,
}

impl Rtc {
    pub fn new() -> Self {
        Self {
            running: Cell::new(false),
            starts: Cell::new(0),
            time_valid: Cell::new(false),
            tsr: Cell::new(0),
            restarts: RefCell::new(Vec::new()),
        }
    }

    /// An RTC that kept running on VBAT while the MCU was off.
    pub fn on_battery(tsr: u32) -> Self {
        let rtc = Self::new();
        rtc.running.set(true);
        rtc.time_valid.set(true);
        rtc.tsr.set(tsr);
        rtc
    }

    pub fn advance(&self, seconds: u32) {
        self.tsr.set(self.tsr.get().wrapping_add(seconds));
    }
}

impl RtcHal for &Rtc {
    fn is_running(&mut self) -> bool {
        self.running.get()
    }

    fn start(&mut self) {
        self.running.set(true);
        self.starts.set(self.starts.get() + 1);
    }

    fn time_valid(&mut self) -> bool {
        self.time_valid.get()
    }

    fn seconds(&mut self) -> u32 {
        self.tsr.get()
    }

    fn restart(&mut self, seconds: u32) {
        self.tsr.set(seconds);
        self.time_valid.set(true);
        self.restarts.borrow_mut().push(seconds);
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum IrqOp {
    Enable(Irq),
    Disable(Irq),
}

#[derive(Default)]
pub struct Nvic {
    pub enabled: RefCell<Vec<Irq>>,
    pub log: RefCell<Vec<IrqOp>>,
}

impl Nvic {
    pub fn clear_log(&self) {
        self.log.borrow_mut().clear();
    }
}

impl InterruptControl for &Nvic {
    fn enable_interrupt(&mut self, irq: Irq) {
        self.log.borrow_mut().push(IrqOp::Enable(irq));
        let mut enabled = self.enabled.borrow_mut();
        if !enabled.contains(&irq) {
            enabled.push(irq);
        }
    }

    fn disable_interrupt(&mut self, irq: Irq) {
        self.log.borrow_mut().push(IrqOp::Disable(irq));
        self.enabled.borrow_mut().retain(|i| *i != irq);
    }

    fn is_enabled(&self, irq: Irq) -> bool {
        self.enabled.borrow().contains(&irq)
    }
}

pub fn eeprom(flash: &Flash) -> Eeprom<&Flash> {
    Eeprom::new(flash, &mut Gate::default(), &EepromConfig::default())
}

/// Simulates `seconds` runs of the seconds interrupt.
pub fn tick(counter: &SecondsCounter, seconds: u32) {
    for _ in 0..seconds {
        counter.tick();
    }
}
