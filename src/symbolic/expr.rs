use serde::{Deserialize, Serialize};
use std::fmt;

/// Symbolic expression tree over the variables x and y.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SymExpr {
    /// A free variable: x, y
    Sym { name: String },
    /// An integer constant (exact)
    Int { value: i64 },
    /// A floating-point constant
    Float { value: f64 },
    /// Known constant: pi, e
    Const { name: MathConst },
    /// Binary operation
    BinOp {
        op: SymOp,
        lhs: Box<SymExpr>,
        rhs: Box<SymExpr>,
    },
    /// Unary negation
    Neg { expr: Box<SymExpr> },
    /// Function application: sin(x), ln(x), etc.
    Func { name: String, args: Vec<SymExpr> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MathConst {
    Pi,
    E,
}

// --- Constructors ---

impl SymExpr {
    pub fn sym(name: &str) -> Self {
        SymExpr::Sym {
            name: name.to_string(),
        }
    }

    pub fn int(value: i64) -> Self {
        SymExpr::Int { value }
    }

    pub fn float(value: f64) -> Self {
        SymExpr::Float { value }
    }

    pub fn binop(op: SymOp, lhs: SymExpr, rhs: SymExpr) -> Self {
        SymExpr::BinOp {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn neg(expr: SymExpr) -> Self {
        SymExpr::Neg {
            expr: Box::new(expr),
        }
    }

    pub fn func(name: &str, args: Vec<SymExpr>) -> Self {
        SymExpr::Func {
            name: name.to_string(),
            args,
        }
    }

    /// Exact numeric value when this node is a plain number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            SymExpr::Int { value } => Some(*value as f64),
            SymExpr::Float { value } => Some(*value),
            _ => None,
        }
    }

    pub fn is_int(&self, n: i64) -> bool {
        match self {
            SymExpr::Int { value } => *value == n,
            SymExpr::Float { value } => *value == n as f64,
            _ => false,
        }
    }

    /// Whether `name` occurs anywhere in this expression.
    pub fn depends_on(&self, name: &str) -> bool {
        match self {
            SymExpr::Sym { name: n } => n == name,
            SymExpr::BinOp { lhs, rhs, .. } => lhs.depends_on(name) || rhs.depends_on(name),
            SymExpr::Neg { expr } => expr.depends_on(name),
            SymExpr::Func { args, .. } => args.iter().any(|a| a.depends_on(name)),
            _ => false,
        }
    }

    /// Printing precedence; higher binds tighter.
    fn precedence(&self) -> u8 {
        match self {
            SymExpr::BinOp { op: SymOp::Add | SymOp::Sub, .. } => 1,
            SymExpr::BinOp { op: SymOp::Mul | SymOp::Div, .. } => 2,
            SymExpr::Neg { .. } => 3,
            SymExpr::Int { value } if *value < 0 => 3,
            SymExpr::Float { value } if *value < 0.0 => 3,
            SymExpr::BinOp { op: SymOp::Pow, .. } => 4,
            _ => 5,
        }
    }
}

// --- Display (pretty-print) ---

/// Write `expr`, parenthesized when it binds looser than `min_prec`.
fn write_operand(f: &mut fmt::Formatter<'_>, expr: &SymExpr, min_prec: u8) -> fmt::Result {
    if expr.precedence() < min_prec {
        write!(f, "({})", expr)
    } else {
        write!(f, "{}", expr)
    }
}

fn write_float(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        write!(f, "{:.1}", value)
    } else {
        write!(f, "{}", value)
    }
}

impl fmt::Display for SymExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymExpr::Sym { name } => write!(f, "{}", name),
            SymExpr::Int { value } => write!(f, "{}", value),
            SymExpr::Float { value } => write_float(f, *value),
            SymExpr::Const { name } => write!(f, "{}", name),
            SymExpr::BinOp { op, lhs, rhs } => match op {
                SymOp::Add => {
                    write_operand(f, lhs, 1)?;
                    // a + (-b) reads better as a - b
                    match rhs.as_ref() {
                        SymExpr::Neg { expr } => {
                            write!(f, " - ")?;
                            write_operand(f, expr, 2)
                        }
                        SymExpr::Int { value } if *value < 0 => write!(f, " - {}", value.unsigned_abs()),
                        SymExpr::Float { value } if *value < 0.0 => {
                            write!(f, " - ")?;
                            write_float(f, -value)
                        }
                        _ => {
                            write!(f, " + ")?;
                            write_operand(f, rhs, 1)
                        }
                    }
                }
                SymOp::Sub => {
                    write_operand(f, lhs, 1)?;
                    write!(f, " - ")?;
                    write_operand(f, rhs, 2)
                }
                SymOp::Mul => {
                    write_operand(f, lhs, 2)?;
                    write!(f, "*")?;
                    write_operand(f, rhs, 4)
                }
                SymOp::Div => {
                    write_operand(f, lhs, 2)?;
                    write!(f, "/")?;
                    write_operand(f, rhs, 4)
                }
                SymOp::Pow => {
                    write_operand(f, lhs, 5)?;
                    write!(f, "^")?;
                    write_operand(f, rhs, 4)
                }
            },
            SymExpr::Neg { expr } => {
                write!(f, "-")?;
                write_operand(f, expr, 4)
            }
            SymExpr::Func { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for MathConst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MathConst::Pi => write!(f, "pi"),
            MathConst::E => write!(f, "e"),
        }
    }
}
