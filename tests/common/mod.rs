#![allow(dead_code)]

use basic::mach::{BufferHost, Runtime, Status};

pub struct Basic {
    pub runtime: Runtime,
    pub host: BufferHost,
}

impl Basic {
    pub fn new() -> Basic {
        let host = BufferHost::default();
        Basic {
            runtime: Runtime::new(Box::new(host.clone())),
            host,
        }
    }

    pub fn enter(&mut self, line: &str) -> Status {
        self.runtime.enter(line)
    }

    /// Queues a line for INPUT.
    pub fn input(&mut self, line: &str) {
        self.host.push_input(line);
    }
}

pub fn exec(r: &mut Basic) -> String {
    r.host.take_output()
}

/// Enters every line of a program.
pub fn program(r: &mut Basic, lines: &[&str]) {
    for line in lines {
        assert_eq!(r.enter(line), Status::Programmed, "{}", line);
    }
}
