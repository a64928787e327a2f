/*!
# Rust Language Module

This Rust module provides lexical analysis of the BASIC language.
Lines are lexed one statement at a time so execution can resume
at any byte offset inside a line.

*/

pub type LineNumber = i64;

#[macro_use]
mod error;
mod lex;
mod token;

pub use error::Error;
pub use error::ErrorCode;
pub use lex::{
    check_line, lex, line_number_prefix, scan_integer, scan_real, uppercase_program,
};
pub use token::{Lexicon, Operator, Token, Word};

/// Lexer switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    /// Recognize keywords glued to names, as in `FORI=1TO9`.
    pub packed_keywords: bool,
    /// Read a lone `.` as the number zero.
    pub dot_as_zero: bool,
}
