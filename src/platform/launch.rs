//! Flash command launcher executed from RAM.
//!
//! The FTFL can't serve instruction fetches while a command runs, so nothing between starting a
//! command and seeing it complete may be fetched from flash. The routine is kept as finished
//! Thumb-2 machine code, independent of what the compiler emits at any optimization level.

/// `extern "C" fn(fstat: *mut u8)`: writes CCIF to FSTAT, then polls FSTAT until CCIF is set
/// again.
pub(crate) const CODE: [u16; 8] = [
    0xF06F, 0x037F, // mvn.w r3, #127
    0x7003, // strb r3, [r0]
    0x7803, // ldrb r3, [r0]
    0xF013, 0x0F80, // tst.w r3, #128
    0xD0FB, // beq <ldrb>
    0x4770, // bx lr
];
