// src/cpu/mod.rs

use crate::debugger::{RegisterAccess, RegisterSnapshot};

/// Number of general purpose registers
pub const NUM_GPRS: usize = 32;

/// Address the PC is loaded with on reset
pub const RESET_VECTOR: u64 = 0x8000_0000;

/// Initial value of x31 at power-on
const INITIAL_X31: u64 = 0x7fff_ffff;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cpu {
    // Registers
    pub gpr: [u64; NUM_GPRS], // General purpose registers
    pub pc: u64,              // Program counter
}

impl Cpu {
    pub fn new() -> Self {
        let mut cpu = Self {
            gpr: [0; NUM_GPRS],
            pc: RESET_VECTOR,
        };

        cpu.gpr[31] = INITIAL_X31;

        cpu
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterAccess for Cpu {
    fn snapshot(&self) -> RegisterSnapshot {
        RegisterSnapshot {
            gpr: self.gpr,
            pc: self.pc,
        }
    }
}
