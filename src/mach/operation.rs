use super::Val;
use crate::error;
use crate::lang::{Error, Operator};

type Result<T> = std::result::Result<T, Error>;

/// ## Binary and unary operators over values

pub struct Operation {}

impl Operation {
    pub fn binary(op: Operator, lhs: Val, rhs: Val) -> Result<Val> {
        use Val::*;
        match (lhs, rhs) {
            (Integer(l), Integer(r)) => Operation::integers(op, l, r),
            (Real(l), Real(r)) => Operation::reals(op, l, r),
            (Integer(l), Real(r)) => Operation::reals(op, l as f64, r),
            (Real(l), Integer(r)) => Operation::reals(op, l, r as f64),
            (Text(l), Text(r)) => Operation::texts(op, &l, &r),
            (Text(l), r) => Operation::texts(op, &l, &r.to_string()),
            (l, Text(r)) => Operation::texts(op, &l.to_string(), &r),
        }
    }

    pub fn negate(val: Val) -> Result<Val> {
        Operation::binary(Operator::Minus, Val::Real(0.0), val)
    }

    pub fn not(val: Val) -> Result<Val> {
        Ok(Val::Integer(!val.to_int()?))
    }

    fn truth(b: bool) -> Val {
        Val::Integer(if b { -1 } else { 0 })
    }

    fn integers(op: Operator, l: i64, r: i64) -> Result<Val> {
        use Operator::*;
        let checked = match op {
            Plus => l.checked_add(r),
            Minus => l.checked_sub(r),
            Multiply => l.checked_mul(r),
            Divide => return Ok(Val::Real(l as f64 / r as f64)),
            Caret => return Ok(Val::Integer((l as f64).powf(r as f64) as i64)),
            Equal => return Ok(Operation::truth(l == r)),
            NotEqual => return Ok(Operation::truth(l != r)),
            Less => return Ok(Operation::truth(l < r)),
            LessEqual => return Ok(Operation::truth(l <= r)),
            Greater => return Ok(Operation::truth(l > r)),
            GreaterEqual => return Ok(Operation::truth(l >= r)),
            And => return Ok(Val::Integer(l & r)),
            Or => return Ok(Val::Integer(l | r)),
            Semicolon | Not => return Err(error!(Syntax)),
        };
        match checked {
            Some(n) => Ok(Val::Integer(n)),
            None => Operation::reals(op, l as f64, r as f64),
        }
    }

    fn reals(op: Operator, l: f64, r: f64) -> Result<Val> {
        use Operator::*;
        Ok(match op {
            Plus => Val::Real(l + r),
            Minus => Val::Real(l - r),
            Multiply => Val::Real(l * r),
            Divide => Val::Real(l / r),
            Caret => Val::Real(l.powf(r)),
            Equal => Operation::truth(l == r),
            NotEqual => Operation::truth(l != r),
            Less => Operation::truth(l < r),
            LessEqual => Operation::truth(l <= r),
            Greater => Operation::truth(l > r),
            GreaterEqual => Operation::truth(l >= r),
            And => Val::Integer(l as i64 & r as i64),
            Or => Val::Integer(l as i64 | r as i64),
            Semicolon | Not => return Err(error!(Syntax)),
        })
    }

    fn texts(op: Operator, l: &str, r: &str) -> Result<Val> {
        use Operator::*;
        Ok(match op {
            Plus | Semicolon => Val::Text(format!("{}{}", l, r).into()),
            Equal => Operation::truth(l == r),
            NotEqual => Operation::truth(l != r),
            Less => Operation::truth(l < r),
            LessEqual => Operation::truth(l <= r),
            Greater => Operation::truth(l > r),
            GreaterEqual => Operation::truth(l >= r),
            Minus | Multiply | Divide | Caret | And | Or => {
                return Err(error!(TypeMismatch; "ARITHMETIC ON TEXT"))
            }
            Not => return Err(error!(Syntax)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Operator::*;

    #[test]
    fn test_integer_division_is_real() {
        assert_eq!(
            Operation::binary(Divide, Val::Integer(7), Val::Integer(2)).unwrap(),
            Val::Real(3.5)
        );
        assert_eq!(
            Operation::binary(Divide, Val::Integer(6), Val::Real(2.0)).unwrap(),
            Val::Real(3.0)
        );
    }

    #[test]
    fn test_comparisons_are_minus_one_or_zero() {
        let pairs = vec![
            (Val::Integer(1), Val::Integer(2)),
            (Val::Real(1.0), Val::Integer(2)),
            (Val::Integer(1), Val::Real(2.0)),
            (Val::Text("A".into()), Val::Text("B".into())),
            (Val::Text("1".into()), Val::Integer(2)),
        ];
        for (l, r) in pairs {
            for op in [Equal, NotEqual, Less, LessEqual, Greater, GreaterEqual] {
                let v = Operation::binary(op, l.clone(), r.clone()).unwrap();
                assert!(v == Val::Integer(0) || v == Val::Integer(-1));
            }
            assert_eq!(
                Operation::binary(Less, l.clone(), r.clone()).unwrap(),
                Val::Integer(-1)
            );
        }
    }

    #[test]
    fn test_power_truncates_for_integers() {
        assert_eq!(
            Operation::binary(Caret, Val::Integer(2), Val::Integer(10)).unwrap(),
            Val::Integer(1024)
        );
        assert_eq!(
            Operation::binary(Caret, Val::Integer(2), Val::Integer(-1)).unwrap(),
            Val::Integer(0)
        );
    }

    #[test]
    fn test_and_or_truncate_reals() {
        assert_eq!(
            Operation::binary(And, Val::Real(7.9), Val::Integer(3)).unwrap(),
            Val::Integer(3)
        );
        assert_eq!(
            Operation::binary(Or, Val::Real(4.2), Val::Real(1.0)).unwrap(),
            Val::Integer(5)
        );
    }

    #[test]
    fn test_text_rules() {
        assert_eq!(
            Operation::binary(Plus, Val::Text("A".into()), Val::Integer(1)).unwrap(),
            Val::Text("A1".into())
        );
        assert_eq!(
            Operation::binary(Semicolon, Val::Text("A".into()), Val::Text("B".into())).unwrap(),
            Val::Text("AB".into())
        );
        assert!(Operation::binary(Semicolon, Val::Integer(1), Val::Integer(2)).is_err());
        assert!(Operation::binary(Minus, Val::Text("A".into()), Val::Integer(1)).is_err());
    }

    #[test]
    fn test_overflow_promotes() {
        assert_eq!(
            Operation::binary(Plus, Val::Integer(i64::MAX), Val::Integer(1)).unwrap(),
            Val::Real(i64::MAX as f64 + 1.0)
        );
        assert_eq!(Operation::negate(Val::Integer(5)).unwrap(), Val::Real(-5.0));
        assert_eq!(Operation::not(Val::Integer(0)).unwrap(), Val::Integer(-1));
    }
}
