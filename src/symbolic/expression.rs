use std::f64::consts;
use std::fmt;

use crate::lang::ast::{BinOpKind, Expr, NumberLit};
use crate::lang::error::{LangError, LangResult};
use crate::lang::parser::parse_source;
use crate::symbolic::diff;
use crate::symbolic::eval::{self, Bindings};
use crate::symbolic::expr::{MathConst, SymExpr, SymOp};

/// Functions a formula may call, with their accepted argument counts.
const FUNCTIONS: &[(&str, usize, usize)] = &[
    ("sin", 1, 1),
    ("cos", 1, 1),
    ("tan", 1, 1),
    ("asin", 1, 1),
    ("acos", 1, 1),
    ("atan", 1, 1),
    ("sinh", 1, 1),
    ("cosh", 1, 1),
    ("tanh", 1, 1),
    ("exp", 1, 1),
    ("ln", 1, 1),
    ("log", 1, 2),
    ("sqrt", 1, 1),
    ("abs", 1, 1),
    ("floor", 1, 1),
    ("ceil", 1, 1),
    ("round", 1, 1),
    ("sign", 1, 1),
];

/// A validated formula in `x` and `y`.
///
/// Keeps the exact text it was built from next to the lowered tree, so two
/// expressions that print the same may still have different sources.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    tree: SymExpr,
}

impl Expression {
    pub fn parse(source: &str) -> LangResult<Self> {
        let ast = parse_source(source)?;
        let tree = lower(&ast)?;
        Ok(Self {
            source: source.to_string(),
            tree,
        })
    }

    fn from_tree(tree: SymExpr) -> Self {
        Self {
            source: tree.to_string(),
            tree,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tree(&self) -> &SymExpr {
        &self.tree
    }

    /// Partial derivative with respect to `var` ("x" or "y").
    pub fn derivative(&self, var: &str) -> Expression {
        Expression::from_tree(diff::derivative(&self.tree, var))
    }

    pub fn evaluate(&self, at: Bindings) -> LangResult<f64> {
        eval::evaluate(&self.tree, &at)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tree)
    }
}

/// Lower a parsed AST into the symbolic tree, resolving names.
fn lower(expr: &Expr) -> LangResult<SymExpr> {
    match expr {
        Expr::Number(NumberLit::Int(n), _) => Ok(SymExpr::int(*n)),
        Expr::Number(NumberLit::Float(v), _) => Ok(SymExpr::float(*v)),
        Expr::Ident(name, span) => match name.as_str() {
            "x" | "y" => Ok(SymExpr::sym(name)),
            "pi" => Ok(SymExpr::Const { name: MathConst::Pi }),
            "e" => Ok(SymExpr::Const { name: MathConst::E }),
            "tau" => Ok(SymExpr::float(consts::TAU)),
            _ => Err(LangError::name(format!("unknown name '{}'", name)).with_span(*span)),
        },
        Expr::Neg { operand, .. } => {
            let inner = lower(operand)?;
            Ok(match inner {
                SymExpr::Int { value } if value != i64::MIN => SymExpr::int(-value),
                SymExpr::Float { value } => SymExpr::float(-value),
                other => SymExpr::neg(other),
            })
        }
        Expr::BinOp { op, lhs, rhs, .. } => {
            let op = match op {
                BinOpKind::Add => SymOp::Add,
                BinOpKind::Sub => SymOp::Sub,
                BinOpKind::Mul => SymOp::Mul,
                BinOpKind::Div => SymOp::Div,
                BinOpKind::Pow => SymOp::Pow,
            };
            Ok(SymExpr::binop(op, lower(lhs)?, lower(rhs)?))
        }
        Expr::Call { name, args, span } => {
            let (_, min, max) = FUNCTIONS
                .iter()
                .find(|(n, _, _)| *n == name.as_str())
                .copied()
                .ok_or_else(|| {
                    LangError::name(format!("unknown function '{}'", name)).with_span(*span)
                })?;
            if args.len() < min || args.len() > max {
                let expected = if min == max {
                    format!("{}", min)
                } else {
                    format!("{} or {}", min, max)
                };
                return Err(LangError::arity(format!(
                    "{}() takes {} argument(s), got {}",
                    name,
                    expected,
                    args.len()
                ))
                .with_span(*span));
            }

            let mut lowered = args.iter().map(lower).collect::<LangResult<Vec<_>>>()?;
            match (name.as_str(), lowered.len()) {
                ("log", 1) => Ok(SymExpr::func("ln", lowered)),
                ("log", _) => {
                    // log(b, x) = ln(x) / ln(b)
                    let value = lowered.pop().unwrap_or_else(|| SymExpr::int(1));
                    let base = lowered.pop().unwrap_or_else(|| SymExpr::int(1));
                    Ok(SymExpr::binop(
                        SymOp::Div,
                        SymExpr::func("ln", vec![value]),
                        SymExpr::func("ln", vec![base]),
                    ))
                }
                _ => Ok(SymExpr::func(name, lowered)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::error::ErrorKind;

    #[test]
    fn test_source_is_kept_verbatim() {
        let expr = Expression::parse("x^2 +   y^2").unwrap();
        assert_eq!(expr.source(), "x^2 +   y^2");
        assert_eq!(expr.to_string(), "x^2 + y^2");
    }

    #[test]
    fn test_unknown_name() {
        let err = Expression::parse("x + z").unwrap_err();
        assert_eq!(err.kind, ErrorKind::NameError);
        assert!(err.message.contains("'z'"));
    }

    #[test]
    fn test_unknown_function() {
        let err = Expression::parse("foo(x)").unwrap_err();
        assert_eq!(err.kind, ErrorKind::NameError);
    }

    #[test]
    fn test_arity() {
        assert_eq!(Expression::parse("sin(x, y)").unwrap_err().kind, ErrorKind::ArityError);
        assert_eq!(Expression::parse("log()").unwrap_err().kind, ErrorKind::ArityError);
    }

    #[test]
    fn test_log_forms() {
        let natural = Expression::parse("log(x)").unwrap();
        assert_eq!(natural.to_string(), "ln(x)");
        let base2 = Expression::parse("log(2, x)").unwrap();
        assert_eq!(base2.to_string(), "ln(x)/ln(2)");
        let v = base2.evaluate(Bindings::new(8.0, 0.0)).unwrap();
        assert!((v - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_negative_literal_folds() {
        let expr = Expression::parse("-3").unwrap();
        assert_eq!(expr.tree(), &SymExpr::int(-3));
    }

    #[test]
    fn test_derivative_source_is_display() {
        let fx = Expression::parse("x^2 + y^2").unwrap().derivative("x");
        assert_eq!(fx.source(), "2*x");
        assert_eq!(fx.evaluate(Bindings::new(1.0, 2.0)).unwrap(), 2.0);
    }

    #[test]
    fn test_tau() {
        let v = Expression::parse("tau").unwrap().evaluate(Bindings::new(0.0, 0.0)).unwrap();
        assert_eq!(v, consts::TAU);
    }
}
