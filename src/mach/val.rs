use crate::error;
use crate::lang::{scan_integer, scan_real, Error};
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

/// ## Values

#[derive(Debug, Clone, PartialEq)]
pub enum Val {
    Integer(i64),
    Real(f64),
    Text(Rc<str>),
}

impl Val {
    pub fn is_text(&self) -> bool {
        matches!(self, Val::Text(_))
    }

    pub fn to_int(&self) -> Result<i64> {
        match self {
            Val::Integer(n) => Ok(*n),
            Val::Real(n) => Ok(*n as i64),
            Val::Text(s) => {
                let s = s.trim_start();
                match scan_integer(s) {
                    Some((n, len)) if len == s.len() => Ok(n),
                    _ => Err(error!(TypeMismatch; "TEXT IS NOT AN INTEGER")),
                }
            }
        }
    }

    pub fn to_f64(&self) -> Result<f64> {
        match self {
            Val::Integer(n) => Ok(*n as f64),
            Val::Real(n) => Ok(*n),
            Val::Text(s) => {
                let s = s.trim_start();
                if let Some((n, len)) = scan_integer(s) {
                    if len == s.len() {
                        return Ok(n as f64);
                    }
                }
                match scan_real(s) {
                    Some((n, len)) if len == s.len() => Ok(n),
                    _ => Err(error!(TypeMismatch; "TEXT IS NOT A NUMBER")),
                }
            }
        }
    }

    /// Zero value for a variable name's type suffix.
    pub fn zero_for(name: &str) -> Val {
        if name.ends_with('$') {
            Val::Text("".into())
        } else if name.ends_with('%') {
            Val::Integer(0)
        } else {
            Val::Real(0.0)
        }
    }

    /// Converts a value for storage under a variable name.
    pub fn coerce_for(name: &str, val: Val) -> Result<Val> {
        if name.ends_with('$') {
            match val {
                Val::Text(_) => Ok(val),
                _ => Err(error!(TypeMismatch; "NUMBER IN TEXT VARIABLE")),
            }
        } else if name.ends_with('%') {
            match val {
                Val::Integer(_) => Ok(val),
                _ => Ok(Val::Integer(val.to_int()?)),
            }
        } else {
            match val {
                Val::Real(_) => Ok(val),
                _ => Ok(Val::Real(val.to_f64()?)),
            }
        }
    }
}

impl std::fmt::Display for Val {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Val::Integer(n) => write!(f, "{}", n),
            Val::Real(n) => write!(f, "{}", format_real(*n)),
            Val::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Nine significant digits, trailing zeros dropped, exponent form
/// outside 1e-4..1e9.
pub fn format_real(n: f64) -> String {
    if n.is_nan() {
        return "nan".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    let sci = format!("{:.8e}", n);
    let (mantissa, exp) = match sci.split_once('e') {
        Some(parts) => parts,
        None => return sci,
    };
    let exp: i32 = exp.parse().unwrap_or(0);
    if !(-4..9).contains(&exp) {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exp.abs())
    } else {
        let decimals = (8 - exp).max(0) as usize;
        trim_fraction(&format!("{:.*}", decimals, n)).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// One entry of an evaluated list: a value or the `,`/`;` between values.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Val(Val),
    Separator(Rc<str>),
}

impl Item {
    pub fn val(&self) -> Result<&Val> {
        match self {
            Item::Val(val) => Ok(val),
            Item::Separator(_) => Err(error!(Internal; "SEPARATOR IS NOT A VALUE")),
        }
    }

    pub fn is_separator(&self) -> bool {
        matches!(self, Item::Separator(_))
    }

    /// The values of a list with separators removed.
    pub fn values(items: &[Item]) -> Vec<Val> {
        items
            .iter()
            .filter_map(|item| match item {
                Item::Val(val) => Some(val.clone()),
                Item::Separator(_) => None,
            })
            .collect()
    }

    /// The only value of a list, or a syntax error.
    pub fn single(items: &[Item]) -> Result<Val> {
        match items {
            [Item::Val(val)] => Ok(val.clone()),
            _ => Err(error!(Syntax; "EXPECTED ONE VALUE")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_real() {
        assert_eq!(format_real(4.0), "4");
        assert_eq!(format_real(-2.5), "-2.5");
        assert_eq!(format_real(1.0 / 3.0), "0.333333333");
        assert_eq!(format_real(123456789.0), "123456789");
        assert_eq!(format_real(1234567890.0), "1.23456789e+09");
        assert_eq!(format_real(0.0001), "0.0001");
        assert_eq!(format_real(0.00001), "1e-05");
        assert_eq!(format_real(f64::INFINITY), "inf");
    }

    #[test]
    fn test_text_conversion_needs_whole_string() {
        assert_eq!(Val::Text(" 42".into()).to_int().unwrap(), 42);
        assert_eq!(Val::Text("2.5".into()).to_f64().unwrap(), 2.5);
        assert!(Val::Text("2.5".into()).to_int().is_err());
        assert!(Val::Text("12AB".into()).to_f64().is_err());
    }

    #[test]
    fn test_coerce_by_suffix() {
        assert_eq!(Val::coerce_for("A%", Val::Real(3.7)).unwrap(), Val::Integer(3));
        assert_eq!(Val::coerce_for("A", Val::Integer(3)).unwrap(), Val::Real(3.0));
        assert!(Val::coerce_for("A$", Val::Integer(3)).is_err());
    }

    #[test]
    fn test_separator_is_not_a_value() {
        let sep = Item::Separator(",".into());
        assert!(sep.val().is_err());
        let items = vec![Item::Val(Val::Integer(1)), sep, Item::Val(Val::Integer(2))];
        assert_eq!(Item::values(&items), vec![Val::Integer(1), Val::Integer(2)]);
        assert!(Item::single(&items).is_err());
    }
}
