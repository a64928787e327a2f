//! # BASIC with Modules
//!
//! A line-numbered BASIC interpreter in the 8-bit tradition, extended
//! with named modules and `DEF FN` macros.
//!
//! Begin by running the executable in a terminal. If you get the
//! following, you have achieved success.
//! ```text
//! BASIC WITH MODULES
//! READY.
//! █
//! ```
//!
//! Programs load with `LOAD "filename.bas"` and run with `RUN`.
//! `MODULE NAME` switches to a separate listing and variable space.
//! A variable in another module is reached as `NAME.X`, and
//! `GOTO`/`GOSUB` from inside a module run that module's own lines.
//!
//! The interpreter can also be embedded. [`mach::Runtime`] takes any
//! [`mach::Host`], and [`mach::BufferHost`] keeps everything in memory.
//! ```
//! use basic::mach::{BufferHost, Runtime};
//! let host = BufferHost::default();
//! let mut runtime = Runtime::new(Box::new(host.clone()));
//! runtime.enter("10 PRINT \"HELLO\"");
//! runtime.enter("RUN");
//! assert_eq!(host.take_output(), "HELLO\n");
//! ```

pub mod lang;
pub mod mach;
pub mod term;
