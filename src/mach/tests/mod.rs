use crate::mach::{BufferHost, Runtime};

mod gosub_test;

fn runtime() -> (Runtime, BufferHost) {
    let host = BufferHost::default();
    (Runtime::new(Box::new(host.clone())), host)
}

/// Enters each line and returns everything printed.
fn run(runtime: &mut Runtime, host: &BufferHost, lines: &[&str]) -> String {
    for line in lines {
        runtime.enter(line);
    }
    host.take_output()
}
