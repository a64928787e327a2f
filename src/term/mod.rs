/*!
## Rust Terminal Module

Runs the interpreter on an interactive terminal. Lines are edited with
linefeed, single keys for GET come from mortal, and Ctrl-C raises BREAK
at the next statement.

*/

use crate::error;
use crate::lang::{Error, LineNumber, Options};
use crate::mach::{Host, Runtime, Status};
use ansi_term::Style;
use linefeed::{
    Completer, Completion, DefaultTerminal, Interface, Prompter, ReadResult, Signal, Terminal,
};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::{self, ErrorKind};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

type Result<T> = std::result::Result<T, Error>;

struct Inner {
    interface: Interface<DefaultTerminal>,
    /// Output after the last newline. Becomes the prompt of the next read.
    partial: RefCell<String>,
    pending_key: RefCell<Option<char>>,
    interrupted: Arc<AtomicBool>,
    started: Instant,
}

/// Terminal host. Clones share one terminal.
#[derive(Clone)]
pub struct Console {
    inner: Rc<Inner>,
}

impl Console {
    pub fn new() -> io::Result<Console> {
        let interface = Interface::new("BASIC")?;
        interface.set_report_signal(Signal::Interrupt, true);
        let interrupted = Arc::new(AtomicBool::new(false));
        let flag = interrupted.clone();
        ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
            .map_err(|e| io::Error::new(ErrorKind::Other, e.to_string()))?;
        Ok(Console {
            inner: Rc::new(Inner {
                interface,
                partial: RefCell::default(),
                pending_key: RefCell::default(),
                interrupted,
                started: Instant::now(),
            }),
        })
    }

    fn write(&self, text: &str) {
        if let Err(error) = self.inner.interface.write_fmt(format_args!("{}", text)) {
            log::debug!("terminal write failed: {}", error);
        }
    }

    /// Writes out any unfinished line so it is not lost.
    fn flush_partial(&self) {
        let partial = std::mem::take(&mut *self.inner.partial.borrow_mut());
        if !partial.is_empty() {
            self.write(&partial);
        }
    }

    /// Reads one line, showing the unfinished output line as the prompt.
    fn prompt_line(&self, buffer: &str) -> io::Result<Option<String>> {
        let prompt = std::mem::take(&mut *self.inner.partial.borrow_mut());
        let interface = &self.inner.interface;
        interface.set_prompt(&prompt)?;
        interface.set_buffer(buffer)?;
        match interface.read_line()? {
            ReadResult::Input(line) => Ok(Some(line)),
            ReadResult::Signal(Signal::Interrupt) => {
                interface.set_buffer("")?;
                self.inner.interrupted.store(true, Ordering::SeqCst);
                Ok(None)
            }
            ReadResult::Signal(_) | ReadResult::Eof => Ok(None),
        }
    }

    fn poll_key(&self, timeout: Option<Duration>) -> io::Result<Option<char>> {
        let terminal = mortal::Terminal::new()?;
        let state = terminal.prepare(mortal::PrepareConfig::default())?;
        let event = terminal.read_event(timeout);
        terminal.restore(state)?;
        Ok(match event? {
            Some(mortal::Event::Key(mortal::Key::Char(c))) => Some(c.to_ascii_uppercase()),
            Some(mortal::Event::Key(mortal::Key::Enter)) => Some('\r'),
            _ => None,
        })
    }
}

fn terminal_error(error: io::Error) -> Error {
    log::debug!("terminal error: {}", error);
    error!(Internal; "TERMINAL ERROR")
}

impl Host for Console {
    fn print(&mut self, text: &str) {
        let mut partial = self.inner.partial.borrow_mut();
        partial.push_str(text);
        if let Some(index) = partial.rfind('\n') {
            let rest = partial.split_off(index + 1);
            let done = std::mem::replace(&mut *partial, rest);
            drop(partial);
            self.write(&done);
        }
    }

    fn print_error(&mut self, text: &str) {
        self.flush_partial();
        self.write(&Style::new().bold().paint(text).to_string());
    }

    fn read_line(&mut self) -> Result<String> {
        match self.prompt_line("").map_err(terminal_error)? {
            Some(line) => Ok(line),
            None => Err(error!(Break)),
        }
    }

    fn read_key(&mut self) -> Result<char> {
        if let Some(key) = self.inner.pending_key.borrow_mut().take() {
            return Ok(key);
        }
        self.flush_partial();
        loop {
            if self.inner.interrupted.swap(false, Ordering::SeqCst) {
                return Err(error!(Break));
            }
            let key = self
                .poll_key(Some(Duration::from_millis(100)))
                .map_err(terminal_error)?;
            if let Some(key) = key {
                return Ok(key);
            }
        }
    }

    fn key_available(&mut self) -> bool {
        if self.inner.pending_key.borrow().is_some() {
            return true;
        }
        match self.poll_key(Some(Duration::from_millis(0))) {
            Ok(key) => {
                *self.inner.pending_key.borrow_mut() = key;
                key.is_some()
            }
            Err(error) => {
                log::debug!("key poll failed: {}", error);
                false
            }
        }
    }

    fn interrupted(&mut self) -> bool {
        self.inner.interrupted.swap(false, Ordering::SeqCst)
    }

    fn ticks(&self) -> u64 {
        self.inner.started.elapsed().as_millis() as u64
    }

    fn sleep(&mut self, ms: u64) {
        self.flush_partial();
        std::thread::sleep(Duration::from_millis(ms));
    }

    fn file_exists(&self, name: &str) -> bool {
        std::path::Path::new(name).exists()
    }

    fn read_file(&mut self, name: &str) -> Result<String> {
        std::fs::read_to_string(name).map_err(|error| {
            log::debug!("reading {}: {}", name, error);
            match error.kind() {
                ErrorKind::NotFound => error!(FileNotFound),
                _ => error!(IllegalDevice; "CANNOT READ FILE"),
            }
        })
    }

    fn write_file(&mut self, name: &str, text: &str) -> Result<()> {
        std::fs::write(name, text).map_err(|error| {
            log::debug!("writing {}: {}", name, error);
            error!(IllegalDevice; "CANNOT WRITE FILE")
        })
    }

    fn clear_screen(&mut self) {
        self.inner.partial.borrow_mut().clear();
        let cleared = mortal::Terminal::new().and_then(|terminal| terminal.clear_screen());
        if let Err(error) = cleared {
            log::debug!("clear screen failed: {}", error);
        }
    }
}

/// Completes a bare line number with the text stored under it.
struct LineCompleter {
    lines: BTreeMap<LineNumber, String>,
}

impl<Term: Terminal> Completer<Term> for LineCompleter {
    fn complete(
        &self,
        _word: &str,
        prompter: &Prompter<Term>,
        _start: usize,
        _end: usize,
    ) -> Option<Vec<Completion>> {
        let number = prompter.buffer().trim().parse::<LineNumber>().ok()?;
        let text = self.lines.get(&number)?;
        let mut completion = Completion::simple(format!("{} {}", number, text));
        completion.suffix = linefeed::complete::Suffix::None;
        Some(vec![completion])
    }
}

/// Runs the READY loop until QUIT or end of input. Returns the exit code.
pub fn main(options: Options, program: Option<PathBuf>) -> io::Result<i32> {
    let console = Console::new()?;
    let mut runtime = Runtime::with_options(Box::new(console.clone()), options);
    console.write("BASIC WITH MODULES\n");
    if let Some(program) = program {
        let load = format!("LOAD \"{}\"", program.display());
        match runtime.enter(&load) {
            Status::Error => {}
            _ => {
                if let Status::Quit(code) = runtime.enter("RUN") {
                    return Ok(code);
                }
            }
        }
    }
    let mut ready = true;
    loop {
        if ready {
            console.flush_partial();
            if runtime.column() != 0 {
                console.write("\n");
            }
            console.write("READY.\n");
        }
        let lines = runtime
            .listing()
            .lines(0..=LineNumber::MAX)
            .map(|(n, text)| (n, text.to_string()))
            .collect();
        console
            .inner
            .interface
            .set_completer(Arc::new(LineCompleter { lines }));
        let buffer = match runtime.auto_line() {
            Some(line_number) => format!("{} ", line_number),
            None => String::new(),
        };
        let line = match console.prompt_line(&buffer)? {
            Some(line) => line,
            None if console.inner.interrupted.swap(false, Ordering::SeqCst) => {
                ready = true;
                continue;
            }
            None => return Ok(0),
        };
        if !line.trim().is_empty() {
            console.inner.interface.add_history_unique(line.clone());
        }
        ready = match runtime.enter(&line) {
            Status::Quit(code) => return Ok(code),
            Status::Programmed | Status::Idle => false,
            Status::Executed | Status::Error => true,
        };
    }
}
