#![no_main]
use libfuzzer_sys::fuzz_target;
use rv64_gdbstub::cpu::Cpu;
use rv64_gdbstub::debugger::Session;

fuzz_target!(|reads: Vec<Vec<u8>>| {
    let cpu = Cpu::new();
    let mut session = Session::new(&cpu);

    for buf in reads {
        let framed = buf.first() == Some(&b'$');
        if let Some(reply) = session.handle(&buf) {
            // Anything we send is either a bare nak or an ack plus frame
            assert!(reply == b"-" || reply.starts_with(b"+$"));
            if reply == b"-" {
                assert!(framed);
            }
        }
    }
});
