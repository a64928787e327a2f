use crate::error;
use crate::lang::Error;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

/// ## Everything the interpreter asks of the outside world
///
/// Blocking reads return a `BREAK` error when input is interrupted
/// or exhausted.

pub trait Host {
    fn print(&mut self, text: &str);
    fn print_error(&mut self, text: &str) {
        self.print(text)
    }
    fn read_line(&mut self) -> Result<String>;
    fn read_key(&mut self) -> Result<char>;
    fn key_available(&mut self) -> bool;
    /// Polled between statements.
    fn interrupted(&mut self) -> bool;
    /// Milliseconds since start.
    fn ticks(&self) -> u64;
    fn sleep(&mut self, ms: u64);
    fn file_exists(&self, name: &str) -> bool;
    fn read_file(&mut self, name: &str) -> Result<String>;
    fn write_file(&mut self, name: &str, text: &str) -> Result<()>;
    fn clear_screen(&mut self) {}
}

#[derive(Debug, Default)]
struct Buffers {
    output: String,
    input: VecDeque<String>,
    keys: VecDeque<char>,
    files: HashMap<String, String>,
    clock: u64,
    interrupt: bool,
}

/// In-memory host. Clones share the same buffers so a caller can keep
/// a handle after giving one to the runtime.
#[derive(Debug, Clone, Default)]
pub struct BufferHost {
    buffers: Rc<RefCell<Buffers>>,
}

impl BufferHost {
    /// Drains everything printed so far.
    pub fn take_output(&self) -> String {
        std::mem::take(&mut self.buffers.borrow_mut().output)
    }

    pub fn push_input(&self, line: &str) {
        self.buffers.borrow_mut().input.push_back(line.to_string());
    }

    pub fn push_key(&self, key: char) {
        self.buffers.borrow_mut().keys.push_back(key);
    }

    pub fn insert_file(&self, name: &str, text: &str) {
        self.buffers
            .borrow_mut()
            .files
            .insert(name.to_string(), text.to_string());
    }

    pub fn file(&self, name: &str) -> Option<String> {
        self.buffers.borrow().files.get(name).cloned()
    }

    /// Requests a BREAK at the next statement boundary.
    pub fn interrupt(&self) {
        self.buffers.borrow_mut().interrupt = true;
    }
}

impl Host for BufferHost {
    fn print(&mut self, text: &str) {
        self.buffers.borrow_mut().output.push_str(text);
    }

    fn read_line(&mut self) -> Result<String> {
        match self.buffers.borrow_mut().input.pop_front() {
            Some(line) => Ok(line),
            None => Err(error!(Break; "NO MORE INPUT")),
        }
    }

    fn read_key(&mut self) -> Result<char> {
        match self.buffers.borrow_mut().keys.pop_front() {
            Some(key) => Ok(key),
            None => Err(error!(Break; "NO MORE KEYS")),
        }
    }

    fn key_available(&mut self) -> bool {
        !self.buffers.borrow().keys.is_empty()
    }

    fn interrupted(&mut self) -> bool {
        std::mem::take(&mut self.buffers.borrow_mut().interrupt)
    }

    fn ticks(&self) -> u64 {
        self.buffers.borrow().clock
    }

    fn sleep(&mut self, ms: u64) {
        self.buffers.borrow_mut().clock += ms;
    }

    fn file_exists(&self, name: &str) -> bool {
        self.buffers.borrow().files.contains_key(name)
    }

    fn read_file(&mut self, name: &str) -> Result<String> {
        match self.buffers.borrow().files.get(name) {
            Some(text) => Ok(text.clone()),
            None => Err(error!(FileNotFound)),
        }
    }

    fn write_file(&mut self, name: &str, text: &str) -> Result<()> {
        self.insert_file(name, text);
        Ok(())
    }
}
