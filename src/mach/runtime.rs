use super::registry::{CommandFn, FunctionFn, Registry};
use super::{
    command, function, BufferHost, Host, Item, Listing, Module, ModuleId, ProgramCounter, Scopes,
    Val, IMMEDIATE_END, IMMEDIATE_LINE, ROOT_MODULE,
};
use crate::error;
use crate::lang::{
    check_line, lex, line_number_prefix, uppercase_program, Error, Lexicon, LineNumber, Options,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

/// Bytes of scratch memory for PEEK and POKE.
pub const MEMORY_SIZE: usize = 0x20000;

/// Outcome of entering one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// A statement line ran to completion.
    Executed,
    /// A numbered line was stored or deleted.
    Programmed,
    /// Nothing was entered.
    Idle,
    /// An error was reported.
    Error,
    /// QUIT ran with this exit code.
    Quit(i32),
}

#[derive(Debug)]
pub(super) enum OpenFile {
    Read { lines: VecDeque<String> },
    Write { name: String, text: String },
}

/// ## Interpreter state
///
/// Every line typed at the prompt goes through [`Runtime::enter`],
/// which either stores it in the current module's listing or
/// executes it right away.
pub struct Runtime {
    pub(super) host: Box<dyn Host>,
    pub(super) modules: Vec<Module>,
    pub(super) module_names: HashMap<Rc<str>, ModuleId>,
    pub(super) scopes: Scopes,
    pub(super) registry: Registry,
    pub(super) lexicon: Lexicon,
    pub(super) options: Options,
    pub(super) files: HashMap<i64, OpenFile>,
    pub(super) print_file: Option<i64>,
    pub(super) column: usize,
    pub(super) memory: Vec<u8>,
    pub(super) rng: StdRng,
    pub(super) last_rnd: f64,
    pub(super) quit: Option<i32>,
    pub(super) fn_depth: usize,
    token_count: usize,
}

impl Default for Runtime {
    fn default() -> Self {
        Runtime::new(Box::new(BufferHost::default()))
    }
}

impl Runtime {
    pub fn new(host: Box<dyn Host>) -> Runtime {
        Runtime::with_options(host, Options::default())
    }

    pub fn with_options(host: Box<dyn Host>, options: Options) -> Runtime {
        let mut registry = Registry::default();
        command::register(&mut registry);
        function::register(&mut registry);
        let mut lexicon = Lexicon::default();
        for name in registry.command_names() {
            lexicon.add_command(name);
        }
        let mut module_names = HashMap::default();
        module_names.insert("".into(), ROOT_MODULE);
        Runtime {
            host,
            modules: vec![Module::new("")],
            module_names,
            scopes: Scopes::default(),
            registry,
            lexicon,
            options,
            files: HashMap::default(),
            print_file: None,
            column: 0,
            memory: vec![0; MEMORY_SIZE],
            rng: StdRng::seed_from_u64(0),
            last_rnd: 0.0,
            quit: None,
            fn_depth: 0,
            token_count: 0,
        }
    }

    pub fn options(&self) -> Options {
        self.options
    }

    pub fn host(&self) -> &dyn Host {
        self.host.as_ref()
    }

    pub fn host_mut(&mut self) -> &mut dyn Host {
        self.host.as_mut()
    }

    /// Registers a command and teaches the lexer its name.
    pub fn add_command<F>(&mut self, name: &str, command: F)
    where
        F: Fn(&mut Runtime, &[Item]) -> Result<()> + 'static,
    {
        let command: CommandFn = Rc::new(command);
        self.registry.add_command(name, command);
        self.lexicon.add_command(name);
    }

    pub fn add_function<F>(&mut self, name: &str, function: F)
    where
        F: Fn(&mut Runtime, &[Val]) -> Result<Val> + 'static,
    {
        let function: FunctionFn = Rc::new(function);
        self.registry.add_function(name, function);
    }

    /// Name of the module unqualified identifiers address.
    pub fn current_module(&self) -> &str {
        self.modules[self.scopes.variables()].name()
    }

    /// Line number to offer next while AUTO is on.
    pub fn auto_line(&self) -> Option<LineNumber> {
        self.modules[self.scopes.variables()].auto_line()
    }

    /// Listing of the current module.
    pub fn listing(&self) -> &Listing {
        &self.modules[self.scopes.variables()].listing
    }

    /// Text of a line in the current module.
    pub fn listing_line(&self, line_number: LineNumber) -> Option<Rc<str>> {
        if line_number < 0 {
            return None;
        }
        self.modules[self.scopes.variables()]
            .listing
            .get(line_number)
            .cloned()
    }

    pub fn column(&self) -> usize {
        self.column
    }

    /// Prints to the screen or to the file selected by `PRINT #`.
    pub fn print(&mut self, text: &str) {
        if let Some(handle) = self.print_file {
            if let Some(OpenFile::Write { text: buffer, .. }) = self.files.get_mut(&handle) {
                buffer.push_str(text);
            }
            return;
        }
        match text.rfind('\n') {
            Some(index) => self.column = text[index + 1..].chars().count(),
            None => self.column += text.chars().count(),
        }
        self.host.print(text);
    }

    pub fn enter(&mut self, line: &str) -> Status {
        let line = uppercase_program(line.trim_end_matches(|c| c == '\r' || c == '\n'));
        if line.trim().is_empty() {
            return Status::Idle;
        }
        if let Some((line_number, len)) = line_number_prefix(&line) {
            return match self.store_line(line_number, line[len..].trim_start()) {
                Ok(()) => Status::Programmed,
                Err(error) => {
                    self.report(error);
                    Status::Error
                }
            };
        }
        self.quit = None;
        match self.immediate(&line) {
            Ok(()) => match self.quit.take() {
                Some(code) => Status::Quit(code),
                None => Status::Executed,
            },
            Err(error) => {
                self.report(error);
                Status::Error
            }
        }
    }

    fn store_line(&mut self, line_number: LineNumber, text: &str) -> Result<()> {
        let module = &mut self.modules[self.scopes.variables()];
        if text.is_empty() {
            module.listing.remove(line_number);
            module.auto_numbering = 0;
        } else {
            module.listing.insert(line_number, text);
        }
        module.last_entered = line_number;
        check_line(text, &self.lexicon, &self.options).map_err(|e| e.in_line_number(line_number))
    }

    fn immediate(&mut self, line: &str) -> Result<()> {
        self.enter_code();
        let module = &mut self.modules[self.scopes.code()];
        // Frames resuming in the previous immediate line point into text
        // that is about to be replaced.
        let stale = |pc: ProgramCounter| pc.line == Some(IMMEDIATE_LINE);
        if let Some(at) = module.for_stack.iter().position(|l| stale(l.resume)) {
            module.for_stack.truncate(at);
        }
        if let Some(at) = module.gosub_stack.iter().position(|g| stale(g.resume)) {
            module.gosub_stack.truncate(at);
        }
        module.listing.insert(IMMEDIATE_LINE, line);
        module.listing.insert(IMMEDIATE_END, "");
        module.pc = ProgramCounter::at(IMMEDIATE_LINE);
        self.execute()
    }

    fn execute(&mut self) -> Result<()> {
        loop {
            let code = self.scopes.code();
            let pc = self.modules[code].pc;
            let line_number = match pc.line {
                Some(line_number) => line_number,
                None => return Ok(()),
            };
            let text = match self.modules[code].listing.get(line_number) {
                Some(text) => text.clone(),
                None => {
                    self.modules[code].pc = ProgramCounter::end();
                    return Ok(());
                }
            };
            let (tokens, next) = lex(&text, pc.offset, &self.lexicon, &self.options)?;
            if tokens.is_empty() {
                match self.modules[code].listing.next_after(line_number) {
                    Some(next_line) if next_line != IMMEDIATE_END => {
                        self.modules[code].pc = ProgramCounter::at(next_line);
                    }
                    _ => {
                        self.modules[code].pc = ProgramCounter::end();
                        if line_number < 0 {
                            return Ok(());
                        }
                        self.end_module();
                    }
                }
                continue;
            }
            self.modules[code].pc.offset = next;
            self.refresh_clock();
            if self.modules[code].trace && line_number >= 0 && pc.offset == 0 {
                self.print(&format!("[{}]", line_number));
            }
            if !self.modules[code].fast {
                self.token_count += tokens.len();
                if self.token_count >= 20 {
                    self.token_count = 0;
                    self.host.sleep(5);
                }
            }
            log::trace!("{} {:?}", line_number, tokens);
            self.dispatch(&tokens)?;
            if self.quit.is_some() {
                return Ok(());
            }
            if self.host.interrupted() {
                return Err(error!(Break));
            }
        }
    }

    fn refresh_clock(&mut self) {
        let jiffies = self.host.ticks().saturating_mul(60) / 1000;
        let time = chrono::Local::now().format("%H%M%S").to_string();
        let var = &mut self.modules[self.scopes.variables()].var;
        var.store_raw("TI", Val::Integer(jiffies as i64));
        var.store_raw("TI$", Val::Text(time.into()));
    }

    fn report(&mut self, error: Error) {
        log::debug!("{:?}", error);
        self.print_file = None;
        let (module, line_number) = match error.line_number() {
            Some(line_number) => (self.scopes.variables(), Some(line_number)),
            None => {
                let code = self.scopes.code();
                (code, self.modules[code].pc.line)
            }
        };
        let mut text = String::new();
        if self.column != 0 {
            text.push('\n');
        }
        match line_number {
            Some(line_number) if line_number >= 0 => {
                let listed = if error.is_break() {
                    None
                } else {
                    self.modules[module].listing.list_line(line_number)
                };
                if error.line_number().is_none() {
                    self.scopes.reset();
                }
                text.push_str(&format!("?{}\n", error.in_line_number(line_number)));
                if let Some(listed) = listed {
                    text.push_str(&listed);
                    text.push('\n');
                }
            }
            _ => text.push_str(&format!("?{}\n", error)),
        }
        self.host.print_error(&text);
        self.column = 0;
    }

    /// Looks up a module, creating it on first reference.
    pub(super) fn module_id(&mut self, name: &str) -> ModuleId {
        if let Some(id) = self.module_names.get(name) {
            return *id;
        }
        let id = self.modules.len();
        log::debug!("creating module {}", name);
        self.modules.push(Module::new(name));
        self.module_names.insert(name.into(), id);
        id
    }

    pub(super) fn find_module(&self, name: &str) -> Result<ModuleId> {
        match self.module_names.get(name) {
            Some(id) => Ok(*id),
            None => Err(error!(UndefdModule)),
        }
    }

    /// Pushes the code scope when it lags the variable scope.
    pub(super) fn enter_code(&mut self) -> bool {
        match self.scopes.enter_code() {
            Some(id) => {
                log::debug!("entering module {:?}", self.modules[id].name());
                self.modules[id].pc = ProgramCounter::end();
                true
            }
            None => false,
        }
    }

    pub(super) fn end_module(&mut self) {
        if let Some(id) = self.scopes.end() {
            log::debug!("leaving module {:?}", self.modules[id].name());
            let module = &mut self.modules[id];
            module.pc = ProgramCounter::end();
            if let Some(at) = module.gosub_stack.iter().position(|g| g.resume.is_end()) {
                module.gosub_stack.truncate(at);
            }
        }
    }

    pub(super) fn var_module(&mut self) -> &mut Module {
        let id = self.scopes.variables();
        &mut self.modules[id]
    }

    pub(super) fn code_module(&mut self) -> &mut Module {
        let id = self.scopes.code();
        &mut self.modules[id]
    }
}
