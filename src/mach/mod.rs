/*!
## Rust Machine Module

This Rust module is a statement-at-a-time interpreter for BASIC.
Each named module owns a listing, variables, and loop state. Two scope
stacks decide which module's variables are visible and which module's
listing is running.

*/

mod array;
mod command;
mod eval;
mod function;
mod host;
mod listing;
mod module;
mod operation;
mod registry;
mod runtime;
mod scope;
mod stack;
mod statement;
mod using;
mod val;
mod var;

pub use array::Array;
pub use eval::Place;
pub use host::{BufferHost, Host};
pub use listing::{Listing, IMMEDIATE_END, IMMEDIATE_LINE};
pub use module::{
    DataCursor, ForLoop, FunctionDef, Gosub, Module, ModuleId, ProgramCounter, ROOT_MODULE,
};
pub use operation::Operation;
pub use registry::{CommandFn, FunctionFn, Registry};
pub use runtime::{Runtime, Status, MEMORY_SIZE};
pub use scope::Scopes;
pub use stack::Stack;
pub use using::format_using;
pub use val::{format_real, Item, Val};
pub use var::Var;

#[cfg(test)]
mod tests;
