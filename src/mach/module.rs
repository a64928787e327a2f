use super::{Listing, Stack, Var};
use crate::lang::{LineNumber, Token};
use std::collections::HashMap;
use std::rc::Rc;

pub type ModuleId = usize;

/// The unnamed module every session starts in.
pub const ROOT_MODULE: ModuleId = 0;

const MAX_LOOPS: usize = 256;
const MAX_GOSUBS: usize = 256;

/// ## Position of execution inside a listing

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgramCounter {
    /// `None` is the end of the listing.
    pub line: Option<LineNumber>,
    /// Byte offset into the line's text.
    pub offset: usize,
}

impl ProgramCounter {
    pub fn at(line: LineNumber) -> ProgramCounter {
        ProgramCounter {
            line: Some(line),
            offset: 0,
        }
    }

    pub fn end() -> ProgramCounter {
        ProgramCounter::default()
    }

    pub fn is_end(&self) -> bool {
        self.line.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct ForLoop {
    pub var_name: Rc<str>,
    pub module: ModuleId,
    pub end: f64,
    pub step: f64,
    pub resume: ProgramCounter,
}

#[derive(Debug, Clone, Copy)]
pub struct Gosub {
    pub resume: ProgramCounter,
    pub for_depth: usize,
}

/// Where READ takes its next DATA item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DataCursor {
    /// `None` until the first READ.
    pub line: Option<LineNumber>,
    /// Items already read from the DATA statements of `line`.
    pub index: usize,
}

/// A `DEF FN` definition.
#[derive(Debug)]
pub struct FunctionDef {
    pub params: Vec<Rc<str>>,
    pub body: Vec<Token>,
}

/// ## Module
///
/// Everything a named sub-program owns. The root module has an empty name.

#[derive(Debug)]
pub struct Module {
    name: Rc<str>,
    pub listing: Listing,
    pub var: Var,
    pub functions: HashMap<Rc<str>, Rc<FunctionDef>>,
    pub for_stack: Stack<ForLoop>,
    pub gosub_stack: Stack<Gosub>,
    pub pc: ProgramCounter,
    pub data: DataCursor,
    pub auto_numbering: LineNumber,
    pub last_entered: LineNumber,
    pub file_name: Option<String>,
    pub fast: bool,
    pub trace: bool,
}

impl Module {
    pub fn new(name: &str) -> Module {
        Module {
            name: name.into(),
            listing: Listing::default(),
            var: Var::new(),
            functions: HashMap::default(),
            for_stack: Stack::new("TOO MANY FOR LOOPS", MAX_LOOPS),
            gosub_stack: Stack::new("TOO MANY GOSUBS", MAX_GOSUBS),
            pc: ProgramCounter::end(),
            data: DataCursor::default(),
            auto_numbering: 0,
            last_entered: 0,
            file_name: None,
            fast: true,
            trace: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// NEW: empties the module but keeps its identity.
    pub fn clear(&mut self) {
        self.listing.clear();
        self.var.clear();
        self.functions.clear();
        self.for_stack.clear();
        self.gosub_stack.clear();
        self.pc = ProgramCounter::end();
        self.data = DataCursor::default();
        self.auto_numbering = 0;
        self.last_entered = 0;
        self.file_name = None;
    }

    /// Innermost FOR loop visible to NEXT.
    pub fn loop_floor(&self) -> usize {
        self.gosub_stack.last().map_or(0, |frame| frame.for_depth)
    }

    /// Next AUTO line number, when auto numbering is on.
    pub fn auto_line(&self) -> Option<LineNumber> {
        if self.auto_numbering > 0 {
            self.last_entered.checked_add(self.auto_numbering)
        } else {
            None
        }
    }
}
