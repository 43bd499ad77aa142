//! Symbolic partial derivatives.

use crate::symbolic::expr::{MathConst, SymExpr, SymOp};
use crate::symbolic::simplify::{add, div, func, mul, neg, pow, sub};

/// Differentiate `expr` with respect to the variable `var`.
///
/// Every function accepted by the lowering step has a rule here, so this
/// never fails for an `Expression` that parsed.
pub fn derivative(expr: &SymExpr, var: &str) -> SymExpr {
    if !expr.depends_on(var) {
        return SymExpr::int(0);
    }

    match expr {
        SymExpr::Sym { name } => SymExpr::int(if name == var { 1 } else { 0 }),
        SymExpr::Int { .. } | SymExpr::Float { .. } | SymExpr::Const { .. } => SymExpr::int(0),
        SymExpr::Neg { expr } => neg(derivative(expr, var)),
        SymExpr::BinOp { op, lhs, rhs } => {
            let u = lhs.as_ref();
            let v = rhs.as_ref();
            match op {
                SymOp::Add => add(derivative(u, var), derivative(v, var)),
                SymOp::Sub => sub(derivative(u, var), derivative(v, var)),
                // (uv)' = u'v + uv'
                SymOp::Mul => add(
                    mul(derivative(u, var), v.clone()),
                    mul(u.clone(), derivative(v, var)),
                ),
                // (u/v)' = (u'v - uv') / v^2
                SymOp::Div => {
                    if !v.depends_on(var) {
                        return div(derivative(u, var), v.clone());
                    }
                    div(
                        sub(
                            mul(derivative(u, var), v.clone()),
                            mul(u.clone(), derivative(v, var)),
                        ),
                        pow(v.clone(), SymExpr::int(2)),
                    )
                }
                SymOp::Pow => power_rule(u, v, var),
            }
        }
        SymExpr::Func { name, args } => {
            // log(b, x) is lowered to a quotient, so only unary functions reach here
            let u = &args[0];
            let outer = function_rule(name, u);
            mul(outer, derivative(u, var))
        }
    }
}

fn power_rule(base: &SymExpr, exp: &SymExpr, var: &str) -> SymExpr {
    let base_varies = base.depends_on(var);
    let exp_varies = exp.depends_on(var);

    if !exp_varies {
        // (u^n)' = n * u^(n-1) * u'
        let reduced = pow(base.clone(), sub(exp.clone(), SymExpr::int(1)));
        return mul(mul(exp.clone(), reduced), derivative(base, var));
    }

    let power = SymExpr::binop(SymOp::Pow, base.clone(), exp.clone());
    if !base_varies {
        // (a^v)' = a^v * ln(a) * v'
        let ln_a = match base {
            SymExpr::Const { name: MathConst::E } => SymExpr::int(1),
            _ => func("ln", base.clone()),
        };
        return mul(mul(power, ln_a), derivative(exp, var));
    }

    // (u^v)' = u^v * (v' ln(u) + v u' / u)
    let inner = add(
        mul(derivative(exp, var), func("ln", base.clone())),
        div(mul(exp.clone(), derivative(base, var)), base.clone()),
    );
    mul(power, inner)
}

/// d/du of the named unary function, evaluated at `u`.
fn function_rule(name: &str, u: &SymExpr) -> SymExpr {
    let one = || SymExpr::int(1);
    let u_sq = || pow(u.clone(), SymExpr::int(2));
    match name {
        "sin" => func("cos", u.clone()),
        "cos" => neg(func("sin", u.clone())),
        "tan" => pow(func("cos", u.clone()), SymExpr::int(-2)),
        "asin" => div(one(), func("sqrt", sub(one(), u_sq()))),
        "acos" => neg(div(one(), func("sqrt", sub(one(), u_sq())))),
        "atan" => div(one(), add(one(), u_sq())),
        "sinh" => func("cosh", u.clone()),
        "cosh" => func("sinh", u.clone()),
        "tanh" => pow(func("cosh", u.clone()), SymExpr::int(-2)),
        "exp" => func("exp", u.clone()),
        "ln" => div(one(), u.clone()),
        "sqrt" => div(one(), mul(SymExpr::int(2), func("sqrt", u.clone()))),
        "abs" => func("sign", u.clone()),
        // Piecewise constant away from their jumps
        "floor" | "ceil" | "round" | "sign" => SymExpr::int(0),
        other => unreachable!("no derivative rule for '{}'", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::Expression;

    fn d(source: &str, var: &str) -> String {
        let expr = Expression::parse(source).unwrap();
        format!("{}", derivative(expr.tree(), var))
    }

    #[test]
    fn test_polynomial() {
        assert_eq!(d("x^2 + y^2", "x"), "2*x");
        assert_eq!(d("x^2 + y^2", "y"), "2*y");
        assert_eq!(d("x^3", "x"), "3*x^2");
    }

    #[test]
    fn test_product() {
        assert_eq!(d("x*y", "x"), "y");
        assert_eq!(d("x*y", "y"), "x");
    }

    #[test]
    fn test_constant_wrt_other_var() {
        assert_eq!(d("sin(y)", "x"), "0");
    }

    #[test]
    fn test_chain_rule() {
        assert_eq!(d("sin(x*y)", "x"), "cos(x*y)*y");
        assert_eq!(d("exp(2x)", "x"), "2*exp(2*x)");
    }

    #[test]
    fn test_quotient_with_constant_denominator() {
        assert_eq!(d("x/2", "x"), "1/2");
    }

    #[test]
    fn test_reciprocal() {
        assert_eq!(d("1/x", "x"), "-1/x^2");
    }

    #[test]
    fn test_exponential_base() {
        assert_eq!(d("e^x", "x"), "e^x");
        assert_eq!(d("2^x", "x"), "2^x*ln(2)");
    }

    #[test]
    fn test_coefficient_at_integer_limit() {
        // -(i64::MAX) - 1 folds to i64::MIN, then gets divided by -1
        let out = d("(-9223372036854775807*x - x)/-1", "x");
        assert!(!out.is_empty());
    }

    #[test]
    fn test_general_power() {
        // x^x -> x^x * (ln(x) + x*1/x) in some folded form
        let out = d("x^x", "x");
        assert!(out.starts_with("x^x*("), "{}", out);
    }
}
