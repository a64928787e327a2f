//! # BASIC
//!
//! Line-numbered BASIC with modules, on the terminal.
//!

use basic::lang::Options;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "basic", version, about = "BASIC with modules")]
struct Args {
    /// Program to load and run at startup
    program: Option<PathBuf>,

    /// Recognize keywords glued to names, as in FORI=1TO9
    #[arg(long)]
    packed: bool,

    /// Read a lone "." as the number zero
    #[arg(long)]
    dot_as_zero: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    let options = Options {
        packed_keywords: args.packed,
        dot_as_zero: args.dot_as_zero,
    };
    match basic::term::main(options, args.program) {
        Ok(code) => std::process::exit(code),
        Err(error) => {
            eprintln!("{}", error);
            std::process::exit(1);
        }
    }
}
