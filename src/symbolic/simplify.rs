//! Folding constructors used while building derivatives.
//!
//! Each function builds the node it names but folds numeric constants and
//! drops additive/multiplicative identities, so `d/dx x^2` comes out as
//! `2*x` rather than `2*x^1*1 + 0`.

use crate::symbolic::expr::{SymExpr, SymOp};

/// Combine two literal numbers, staying in integers while exact.
fn fold(op: SymOp, a: &SymExpr, b: &SymExpr) -> Option<SymExpr> {
    if let (SymExpr::Int { value: l }, SymExpr::Int { value: r }) = (a, b) {
        let exact = match op {
            SymOp::Add => l.checked_add(*r),
            SymOp::Sub => l.checked_sub(*r),
            SymOp::Mul => l.checked_mul(*r),
            SymOp::Div if l.checked_rem(*r) == Some(0) => l.checked_div(*r),
            SymOp::Pow if (0..=62).contains(r) => u32::try_from(*r).ok().and_then(|e| l.checked_pow(e)),
            _ => None,
        };
        if let Some(value) = exact {
            return Some(SymExpr::int(value));
        }
        // Leave inexact integer division and negative powers symbolic
        if matches!(op, SymOp::Div | SymOp::Pow) {
            return None;
        }
    }

    let l = a.as_number()?;
    let r = b.as_number()?;
    let value = match op {
        SymOp::Add => l + r,
        SymOp::Sub => l - r,
        SymOp::Mul => l * r,
        SymOp::Div if r != 0.0 => l / r,
        SymOp::Pow => l.powf(r),
        _ => return None,
    };
    value.is_finite().then(|| SymExpr::float(value))
}

pub fn add(a: SymExpr, b: SymExpr) -> SymExpr {
    if let Some(folded) = fold(SymOp::Add, &a, &b) {
        return folded;
    }
    if a.is_int(0) {
        return b;
    }
    if b.is_int(0) {
        return a;
    }
    if let SymExpr::Neg { expr } = b {
        return sub(a, *expr);
    }
    SymExpr::binop(SymOp::Add, a, b)
}

pub fn sub(a: SymExpr, b: SymExpr) -> SymExpr {
    if let Some(folded) = fold(SymOp::Sub, &a, &b) {
        return folded;
    }
    if b.is_int(0) {
        return a;
    }
    if a.is_int(0) {
        return neg(b);
    }
    if a == b {
        return SymExpr::int(0);
    }
    SymExpr::binop(SymOp::Sub, a, b)
}

pub fn mul(a: SymExpr, b: SymExpr) -> SymExpr {
    if let Some(folded) = fold(SymOp::Mul, &a, &b) {
        return folded;
    }
    if a.is_int(0) || b.is_int(0) {
        return SymExpr::int(0);
    }
    if a.is_int(1) {
        return b;
    }
    if b.is_int(1) {
        return a;
    }
    if a.is_int(-1) {
        return neg(b);
    }
    if b.is_int(-1) {
        return neg(a);
    }
    // Keep numeric coefficients in front: x*2 -> 2*x
    if b.as_number().is_some() && a.as_number().is_none() {
        return SymExpr::binop(SymOp::Mul, b, a);
    }
    SymExpr::binop(SymOp::Mul, a, b)
}

pub fn div(a: SymExpr, b: SymExpr) -> SymExpr {
    if let Some(folded) = fold(SymOp::Div, &a, &b) {
        return folded;
    }
    if b.is_int(1) {
        return a;
    }
    if a.is_int(0) && !b.is_int(0) {
        return SymExpr::int(0);
    }
    SymExpr::binop(SymOp::Div, a, b)
}

pub fn pow(base: SymExpr, exp: SymExpr) -> SymExpr {
    if let Some(folded) = fold(SymOp::Pow, &base, &exp) {
        return folded;
    }
    if exp.is_int(0) {
        return SymExpr::int(1);
    }
    if exp.is_int(1) {
        return base;
    }
    SymExpr::binop(SymOp::Pow, base, exp)
}

pub fn neg(a: SymExpr) -> SymExpr {
    match a {
        SymExpr::Int { value } => match value.checked_neg() {
            Some(v) => SymExpr::int(v),
            None => SymExpr::float(-(value as f64)),
        },
        SymExpr::Float { value } => SymExpr::float(-value),
        SymExpr::Neg { expr } => *expr,
        other => SymExpr::neg(other),
    }
}

pub fn func(name: &str, arg: SymExpr) -> SymExpr {
    SymExpr::func(name, vec![arg])
}
