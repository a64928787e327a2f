use super::{Item, Runtime, Val};
use crate::lang::Error;
use std::collections::HashMap;
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

pub type CommandFn = Rc<dyn Fn(&mut Runtime, &[Item]) -> Result<()>>;
pub type FunctionFn = Rc<dyn Fn(&mut Runtime, &[Val]) -> Result<Val>>;

/// ## Built-in commands and functions by name

#[derive(Default)]
pub struct Registry {
    commands: HashMap<Rc<str>, CommandFn>,
    functions: HashMap<Rc<str>, FunctionFn>,
}

impl Registry {
    pub fn add_command(&mut self, name: &str, command: CommandFn) {
        self.commands.insert(name.into(), command);
    }

    pub fn add_function(&mut self, name: &str, function: FunctionFn) {
        self.functions.insert(name.into(), function);
    }

    pub fn command(&self, name: &str) -> Option<CommandFn> {
        self.commands.get(name).cloned()
    }

    pub fn function(&self, name: &str) -> Option<FunctionFn> {
        self.functions.get(name).cloned()
    }

    pub fn command_names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(|name| &**name)
    }
}
