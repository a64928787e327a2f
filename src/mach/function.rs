use super::registry::{FunctionFn, Registry};
use super::{Runtime, Val, MEMORY_SIZE};
use crate::error;
use crate::lang::Error;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

type Builtin = fn(&mut Runtime, &[Val]) -> Result<Val>;

const FUNCTIONS: &[(&str, Builtin)] = &[
    ("ABS", Function::abs),
    ("ASC", Function::asc),
    ("ATN", Function::atn),
    ("CHR$", Function::chr),
    ("COS", Function::cos),
    ("DEC", Function::dec),
    ("EXP", Function::exp),
    ("HEX$", Function::hex),
    ("INSTR", Function::instr),
    ("INT", Function::int),
    ("LCASE$", Function::lcase),
    ("LEFT$", Function::left),
    ("LEN", Function::len),
    ("LOG", Function::log),
    ("MAX", Function::max),
    ("MID$", Function::mid),
    ("MIN", Function::min),
    ("MOD", Function::r#mod),
    ("PEEK", Function::peek),
    ("POS", Function::pos),
    ("RIGHT$", Function::right),
    ("RND", Function::rnd),
    ("SGN", Function::sgn),
    ("SIN", Function::sin),
    ("SPC", Function::spc),
    ("SQR", Function::sqr),
    ("STR$", Function::str),
    ("TAB", Function::tab),
    ("TAN", Function::tan),
    ("UCASE$", Function::ucase),
    ("VAL", Function::val),
    ("XOR", Function::xor),
];

pub fn register(registry: &mut Registry) {
    for (name, builtin) in FUNCTIONS {
        let function: FunctionFn = Rc::new(*builtin);
        registry.add_function(name, function);
    }
}

fn arity(args: &[Val], range: RangeInclusive<usize>) -> Result<()> {
    if range.contains(&args.len()) {
        Ok(())
    } else {
        Err(error!(ArgumentCount))
    }
}

fn number(val: &Val) -> Result<f64> {
    match val {
        Val::Text(_) => Err(error!(TypeMismatch; "EXPECTED A NUMBER")),
        _ => val.to_f64(),
    }
}

fn integer(val: &Val) -> Result<i64> {
    match val {
        Val::Text(_) => Err(error!(TypeMismatch; "EXPECTED A NUMBER")),
        _ => val.to_int(),
    }
}

fn text(val: &Val) -> Result<&str> {
    match val {
        Val::Text(s) => Ok(&**s),
        _ => Err(error!(TypeMismatch; "EXPECTED TEXT")),
    }
}

/// A count that must not be negative.
fn count(val: &Val) -> Result<usize> {
    match integer(val)? {
        n if n < 0 => Err(error!(IllegalQuantity)),
        n => Ok(n as usize),
    }
}

/// Widest padding SPC and TAB will produce.
const MAX_SPACES: usize = 0xFFFF;

fn spaces(n: usize) -> Result<Val> {
    if n > MAX_SPACES {
        return Err(error!(IllegalQuantity));
    }
    Ok(Val::Text(" ".repeat(n).into()))
}

fn real(args: &[Val], f: fn(f64) -> f64) -> Result<Val> {
    arity(args, 1..=1)?;
    Ok(Val::Real(f(number(&args[0])?)))
}

/// Largest or smallest argument, keeping its kind.
fn extreme(args: &[Val], larger: bool) -> Result<Val> {
    arity(args, 1..=usize::MAX)?;
    let mut best = &args[0];
    let mut best_n = number(best)?;
    for val in &args[1..] {
        let n = number(val)?;
        if (larger && n > best_n) || (!larger && n < best_n) {
            best = val;
            best_n = n;
        }
    }
    Ok(best.clone())
}

/// ## Built-in functions
///
/// Each receives its argument values with separators already removed.

pub struct Function {}

impl Function {
    fn abs(_: &mut Runtime, args: &[Val]) -> Result<Val> {
        real(args, f64::abs)
    }

    fn asc(_: &mut Runtime, args: &[Val]) -> Result<Val> {
        arity(args, 1..=1)?;
        let code = text(&args[0])?.chars().next().map_or(0, |c| c as i64);
        Ok(Val::Integer(code))
    }

    fn atn(_: &mut Runtime, args: &[Val]) -> Result<Val> {
        real(args, f64::atan)
    }

    fn chr(_: &mut Runtime, args: &[Val]) -> Result<Val> {
        arity(args, 1..=1)?;
        let code = integer(&args[0])?;
        match u32::try_from(code).ok().and_then(char::from_u32) {
            Some(c) => Ok(Val::Text(c.to_string().into())),
            None => Err(error!(IllegalQuantity; "NOT A CHARACTER CODE")),
        }
    }

    fn cos(_: &mut Runtime, args: &[Val]) -> Result<Val> {
        real(args, f64::cos)
    }

    fn dec(_: &mut Runtime, args: &[Val]) -> Result<Val> {
        arity(args, 1..=1)?;
        match u64::from_str_radix(text(&args[0])?.trim(), 16) {
            Ok(n) => Ok(Val::Integer(n as i64)),
            Err(_) => Err(error!(IllegalQuantity; "NOT A HEX NUMBER")),
        }
    }

    fn exp(_: &mut Runtime, args: &[Val]) -> Result<Val> {
        real(args, f64::exp)
    }

    fn hex(_: &mut Runtime, args: &[Val]) -> Result<Val> {
        arity(args, 1..=1)?;
        Ok(Val::Text(format!("{:016X}", integer(&args[0])?).into()))
    }

    fn instr(_: &mut Runtime, args: &[Val]) -> Result<Val> {
        arity(args, 2..=3)?;
        let haystack: Vec<char> = text(&args[0])?.chars().collect();
        let needle: Vec<char> = text(&args[1])?.chars().collect();
        let start = match args.get(2) {
            Some(val) => integer(val)?,
            None => 1,
        };
        if start < 1 {
            return Err(error!(IllegalQuantity));
        }
        let start = start as usize - 1;
        if start + needle.len() > haystack.len() {
            return Ok(Val::Integer(0));
        }
        let found = (start..=haystack.len() - needle.len())
            .find(|&i| haystack[i..i + needle.len()] == needle[..]);
        Ok(Val::Integer(found.map_or(0, |i| i as i64 + 1)))
    }

    fn int(_: &mut Runtime, args: &[Val]) -> Result<Val> {
        arity(args, 1..=1)?;
        Ok(Val::Integer(number(&args[0])?.floor() as i64))
    }

    fn lcase(_: &mut Runtime, args: &[Val]) -> Result<Val> {
        arity(args, 1..=1)?;
        Ok(Val::Text(text(&args[0])?.to_lowercase().into()))
    }

    fn left(_: &mut Runtime, args: &[Val]) -> Result<Val> {
        arity(args, 2..=2)?;
        let s: String = text(&args[0])?.chars().take(count(&args[1])?).collect();
        Ok(Val::Text(s.into()))
    }

    fn len(_: &mut Runtime, args: &[Val]) -> Result<Val> {
        arity(args, 1..=1)?;
        Ok(Val::Integer(text(&args[0])?.chars().count() as i64))
    }

    fn log(_: &mut Runtime, args: &[Val]) -> Result<Val> {
        real(args, f64::ln)
    }

    fn max(_: &mut Runtime, args: &[Val]) -> Result<Val> {
        extreme(args, true)
    }

    fn mid(_: &mut Runtime, args: &[Val]) -> Result<Val> {
        arity(args, 2..=3)?;
        let s = text(&args[0])?;
        let start = integer(&args[1])?;
        if start < 1 {
            return Err(error!(IllegalQuantity));
        }
        let len = match args.get(2) {
            Some(val) => count(val)?,
            None => usize::MAX,
        };
        let s: String = s.chars().skip(start as usize - 1).take(len).collect();
        Ok(Val::Text(s.into()))
    }

    fn min(_: &mut Runtime, args: &[Val]) -> Result<Val> {
        extreme(args, false)
    }

    fn r#mod(_: &mut Runtime, args: &[Val]) -> Result<Val> {
        arity(args, 2..=2)?;
        let (a, b) = (integer(&args[0])?, integer(&args[1])?);
        if b == 0 {
            return Err(error!(IllegalQuantity; "MOD BY ZERO"));
        }
        Ok(Val::Integer(a.wrapping_rem(b)))
    }

    fn peek(runtime: &mut Runtime, args: &[Val]) -> Result<Val> {
        arity(args, 1..=1)?;
        let address = integer(&args[0])?;
        if address < 0 || address as usize >= MEMORY_SIZE {
            return Err(error!(IllegalQuantity; "ADDRESS OUT OF RANGE"));
        }
        Ok(Val::Integer(runtime.memory[address as usize] as i64))
    }

    fn pos(runtime: &mut Runtime, args: &[Val]) -> Result<Val> {
        arity(args, 0..=1)?;
        Ok(Val::Integer(runtime.column as i64))
    }

    fn right(_: &mut Runtime, args: &[Val]) -> Result<Val> {
        arity(args, 2..=2)?;
        let s = text(&args[0])?;
        let n = count(&args[1])?;
        let len = s.chars().count();
        let s: String = s.chars().skip(len.saturating_sub(n)).collect();
        Ok(Val::Text(s.into()))
    }

    fn rnd(runtime: &mut Runtime, args: &[Val]) -> Result<Val> {
        arity(args, 1..=1)?;
        let x = number(&args[0])?;
        if x == 0.0 {
            return Ok(Val::Real(runtime.last_rnd));
        }
        if x < 0.0 {
            runtime.rng = StdRng::seed_from_u64(x.to_bits());
        }
        runtime.last_rnd = runtime.rng.gen::<f64>();
        Ok(Val::Real(runtime.last_rnd))
    }

    fn sgn(_: &mut Runtime, args: &[Val]) -> Result<Val> {
        arity(args, 1..=1)?;
        let n = number(&args[0])?;
        let sign = if n > 0.0 {
            1
        } else if n < 0.0 {
            -1
        } else {
            0
        };
        Ok(Val::Integer(sign))
    }

    fn sin(_: &mut Runtime, args: &[Val]) -> Result<Val> {
        real(args, f64::sin)
    }

    fn spc(_: &mut Runtime, args: &[Val]) -> Result<Val> {
        arity(args, 1..=1)?;
        spaces(count(&args[0])?)
    }

    fn sqr(_: &mut Runtime, args: &[Val]) -> Result<Val> {
        real(args, f64::sqrt)
    }

    fn str(_: &mut Runtime, args: &[Val]) -> Result<Val> {
        arity(args, 1..=1)?;
        Ok(Val::Text(args[0].to_string().into()))
    }

    fn tab(runtime: &mut Runtime, args: &[Val]) -> Result<Val> {
        arity(args, 1..=1)?;
        let column = count(&args[0])?;
        if column > MAX_SPACES {
            return Err(error!(IllegalQuantity));
        }
        spaces(column.saturating_sub(runtime.column))
    }

    fn tan(_: &mut Runtime, args: &[Val]) -> Result<Val> {
        real(args, f64::tan)
    }

    fn ucase(_: &mut Runtime, args: &[Val]) -> Result<Val> {
        arity(args, 1..=1)?;
        Ok(Val::Text(text(&args[0])?.to_uppercase().into()))
    }

    fn val(_: &mut Runtime, args: &[Val]) -> Result<Val> {
        arity(args, 1..=1)?;
        let s = text(&args[0])?.trim();
        let n = Val::Text(s.into()).to_f64().unwrap_or(0.0);
        Ok(Val::Real(n))
    }

    fn xor(_: &mut Runtime, args: &[Val]) -> Result<Val> {
        arity(args, 2..=2)?;
        Ok(Val::Integer(integer(&args[0])? ^ integer(&args[1])?))
    }
}
