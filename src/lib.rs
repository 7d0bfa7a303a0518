//! rv64-gdbstub - GDB remote stub for an emulated 64-bit CPU
//!
//! This library exposes the CPU register file to an external debugger over
//! the GDB Remote Serial Protocol.

pub mod cpu;
pub mod debugger;

pub use cpu::Cpu;
pub use debugger::GdbServer;
