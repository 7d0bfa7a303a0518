//! Command dispatch
//!
//! Every supported request is an entry in [`COMMANDS`]. Lookup is keyed
//! on the first payload byte and then prefix-matched against the rest,
//! in table order; the first hit wins. Anything without a hit gets the
//! empty reply, which GDB reads as "unsupported".

use super::gdb::{RegisterAccess, StopReason};
use super::packet::push_hex_byte;

/// What to send back for a matched command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Fixed reply payload
    Reply(&'static str),
    /// Dump all general purpose registers followed by the PC
    ReadRegisters,
    /// Report why the target is stopped
    StopReason,
}

struct Command {
    key: u8,
    prefix: &'static str,
    action: Action,
}

impl Command {
    const fn new(key: u8, prefix: &'static str, action: Action) -> Self {
        Self {
            key,
            prefix,
            action,
        }
    }

    fn matches(&self, payload: &[u8]) -> bool {
        match payload.split_first() {
            Some((&key, rest)) => key == self.key && rest.starts_with(self.prefix.as_bytes()),
            None => false,
        }
    }
}

/// Ordered dispatch table. An empty prefix matches any payload with that key.
const COMMANDS: &[Command] = &[
    Command::new(b'q', "Supported", Action::Reply("hwbreak+")),
    Command::new(b'q', "fThreadInfo", Action::Reply("")),
    Command::new(b'q', "L", Action::Reply("")),
    Command::new(b'q', "C", Action::Reply("")),
    // "1" means we attached to an existing process, so quitting GDB
    // detaches instead of killing the target
    Command::new(b'q', "Attached", Action::Reply("1")),
    Command::new(b'q', "", Action::Reply("")),
    Command::new(b'v', "MustReplyEmpty", Action::Reply("")),
    Command::new(b'v', "", Action::Reply("")),
    // Single implicit thread, selection is a no-op
    Command::new(b'H', "g0", Action::Reply("")),
    Command::new(b'H', "c-1", Action::Reply("")),
    Command::new(b'g', "", Action::ReadRegisters),
    Command::new(b'?', "", Action::StopReason),
];

const UNSUPPORTED: Action = Action::Reply("");

/// Find the action for a payload
pub fn lookup(payload: &[u8]) -> Action {
    COMMANDS
        .iter()
        .find(|cmd| cmd.matches(payload))
        .map_or(UNSUPPORTED, |cmd| cmd.action)
}

/// Produce the reply payload for a validated request
pub fn dispatch<R: RegisterAccess + ?Sized>(
    payload: &[u8],
    target: &R,
    stop_reason: StopReason,
) -> Vec<u8> {
    match lookup(payload) {
        Action::Reply(reply) => reply.as_bytes().to_vec(),
        Action::ReadRegisters => read_registers(target),
        Action::StopReason => format!("S{:02x}", stop_reason.signal()).into_bytes(),
    }
}

/// Little-endian hex dump of x0..x31 then pc, two digits per byte
fn read_registers<R: RegisterAccess + ?Sized>(target: &R) -> Vec<u8> {
    let regs = target.snapshot();
    let mut result = Vec::with_capacity(REGISTER_DUMP_LEN);

    for value in regs.gpr.iter().chain(std::iter::once(&regs.pc)) {
        for byte in value.to_le_bytes() {
            push_hex_byte(&mut result, byte);
        }
    }

    result
}

/// Length of a `g` reply: 33 registers, 8 bytes each, 2 hex digits per byte
pub const REGISTER_DUMP_LEN: usize = 33 * 8 * 2;
