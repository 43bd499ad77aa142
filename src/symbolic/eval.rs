//! Numeric evaluation of symbolic trees at a point.

use std::f64::consts;

use crate::lang::error::{ErrorKind, LangError, LangResult};
use crate::symbolic::expr::{MathConst, SymExpr, SymOp};

/// Values for the two free variables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bindings {
    pub x: f64,
    pub y: f64,
}

impl Bindings {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Evaluate `expr` with the variables bound to `at`.
///
/// Fails with a division-by-zero error for `a/0` and `0^-n`, and with a
/// domain error for any other non-finite intermediate result.
pub fn evaluate(expr: &SymExpr, at: &Bindings) -> LangResult<f64> {
    let value = match expr {
        SymExpr::Int { value } => *value as f64,
        SymExpr::Float { value } => *value,
        SymExpr::Const { name } => match name {
            MathConst::Pi => consts::PI,
            MathConst::E => consts::E,
        },
        SymExpr::Sym { name } => match name.as_str() {
            "x" => at.x,
            "y" => at.y,
            other => return Err(LangError::name(format!("undefined variable '{}'", other))),
        },
        SymExpr::Neg { expr } => -evaluate(expr, at)?,
        SymExpr::BinOp { op, lhs, rhs } => {
            let l = evaluate(lhs, at)?;
            let r = evaluate(rhs, at)?;
            binary(*op, l, r)?
        }
        SymExpr::Func { name, args } => {
            let vals = args
                .iter()
                .map(|a| evaluate(a, at))
                .collect::<LangResult<Vec<f64>>>()?;
            apply_function(name, &vals)?
        }
    };

    if value.is_finite() {
        Ok(value)
    } else {
        Err(LangError::domain(format!("'{}' is not finite here", expr)))
    }
}

fn binary(op: SymOp, l: f64, r: f64) -> LangResult<f64> {
    Ok(match op {
        SymOp::Add => l + r,
        SymOp::Sub => l - r,
        SymOp::Mul => l * r,
        SymOp::Div => {
            if r == 0.0 {
                return Err(LangError::division_by_zero());
            }
            l / r
        }
        SymOp::Pow => {
            if l == 0.0 && r < 0.0 {
                return Err(LangError::new(ErrorKind::DivisionByZero, "zero raised to a negative power"));
            }
            if r.fract() == 0.0 && r.abs() <= i32::MAX as f64 {
                l.powi(r as i32)
            } else {
                l.powf(r)
            }
        }
    })
}

fn apply_function(name: &str, vals: &[f64]) -> LangResult<f64> {
    let v = vals[0];
    let checked = |ok: bool, what: &str| {
        if ok {
            Ok(())
        } else {
            Err(LangError::domain(format!("{}({}) is undefined", what, v)))
        }
    };

    Ok(match name {
        "sin" => v.sin(),
        "cos" => v.cos(),
        "tan" => v.tan(),
        "asin" => {
            checked((-1.0..=1.0).contains(&v), name)?;
            v.asin()
        }
        "acos" => {
            checked((-1.0..=1.0).contains(&v), name)?;
            v.acos()
        }
        "atan" => v.atan(),
        "sinh" => v.sinh(),
        "cosh" => v.cosh(),
        "tanh" => v.tanh(),
        "exp" => v.exp(),
        "ln" => {
            checked(v > 0.0, name)?;
            v.ln()
        }
        "sqrt" => {
            checked(v >= 0.0, name)?;
            v.sqrt()
        }
        "abs" => v.abs(),
        "floor" => v.floor(),
        "ceil" => v.ceil(),
        "round" => v.round(),
        "sign" => {
            if v == 0.0 {
                0.0
            } else {
                v.signum()
            }
        }
        other => return Err(LangError::name(format!("unknown function '{}'", other))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::Expression;

    fn eval_at(source: &str, x: f64, y: f64) -> LangResult<f64> {
        evaluate(Expression::parse(source).unwrap().tree(), &Bindings::new(x, y))
    }

    #[test]
    fn test_polynomial() {
        assert_eq!(eval_at("x^2 + y^2", 1.0, 2.0).unwrap(), 5.0);
        assert_eq!(eval_at("x*y - 3", 2.0, 4.0).unwrap(), 5.0);
    }

    #[test]
    fn test_constants() {
        assert!((eval_at("pi", 0.0, 0.0).unwrap() - consts::PI).abs() < 1e-15);
        assert!((eval_at("ln(e)", 0.0, 0.0).unwrap() - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_division_by_zero() {
        let err = eval_at("1/x", 0.0, 1.0).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DivisionByZero);
        let err = eval_at("x^(-1)", 0.0, 1.0).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DivisionByZero);
    }

    #[test]
    fn test_domain_errors() {
        assert_eq!(eval_at("sqrt(x)", -1.0, 0.0).unwrap_err().kind, ErrorKind::DomainError);
        assert_eq!(eval_at("ln(x)", 0.0, 0.0).unwrap_err().kind, ErrorKind::DomainError);
        assert_eq!(eval_at("asin(x)", 2.0, 0.0).unwrap_err().kind, ErrorKind::DomainError);
        assert_eq!(eval_at("exp(x)", 1000.0, 0.0).unwrap_err().kind, ErrorKind::DomainError);
    }

    #[test]
    fn test_negative_base_integer_power() {
        assert_eq!(eval_at("x^3", -2.0, 0.0).unwrap(), -8.0);
    }

    #[test]
    fn test_sign_and_round() {
        assert_eq!(eval_at("sign(x)", 0.0, 0.0).unwrap(), 0.0);
        assert_eq!(eval_at("sign(x)", -3.0, 0.0).unwrap(), -1.0);
        assert_eq!(eval_at("round(x)", 2.5, 0.0).unwrap(), 3.0);
    }
}
