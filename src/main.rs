use std::process::ExitCode;

use log::error;

use rv64_gdbstub::cpu::Cpu;
use rv64_gdbstub::debugger::{self, DEFAULT_PORT};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let port = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_PORT.to_string());

    let cpu = Cpu::new();

    match debugger::start(&port, &cpu) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("gdbserver start fail: {}", e);
            ExitCode::FAILURE
        }
    }
}
