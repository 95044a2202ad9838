use crate::symbolic::symbolic_engine::Expr;

/// integers up to 2^53 are exact in `f64`
const EXACT_LIMIT: f64 = 9_007_199_254_740_992.0;

fn is_exact_integer(value: f64) -> bool {
    value.fract() == 0.0 && value.abs() <= EXACT_LIMIT
}

/// Fold only integer arithmetic whose result is an exact integer: anything else is left for
/// the evaluation at the working precision, so `1/3` or `1/0` stay symbolic.
fn folded(a: f64, b: f64, value: f64) -> Option<Expr> {
    if is_exact_integer(a) && is_exact_integer(b) && is_exact_integer(value) {
        Some(Expr::Const(value))
    } else {
        None
    }
}

fn folded_quotient(a: f64, b: f64) -> Option<Expr> {
    if b != 0.0 && (a % b) == 0.0 {
        folded(a, b, a / b)
    } else {
        None
    }
}

fn folded_power(a: f64, b: f64) -> Option<Expr> {
    if b >= 0.0 && b <= 64.0 {
        folded(a, b, a.powi(b as i32))
    } else {
        None
    }
}

impl Expr {
    /// Algebraic simplification: constant folding plus the basic identities.
    ///
    /// ## Rules Applied
    /// - integer arithmetic with an exact integer result is evaluated
    /// - `x + 0 = x`, `0 + x = x`, `x - 0 = x`, `x - x = 0`, `0 - x = (-1) * x`
    /// - `x * 1 = x`, `1 * x = x`, `x * 0 = 0`, `c1 * (c2 * x) = (c1 * c2) * x`
    /// - `0 / x = 0`, `x / 1 = x`
    /// - `x ^ 1 = x`, `x ^ 0 = 1`
    ///
    /// Constants are moved to the left of products so derivatives read as `3 * (x ^ 2)`.
    pub fn simplify(&self) -> Expr {
        match self {
            Expr::Var(_) | Expr::Const(_) | Expr::Named(_) => self.clone(),
            Expr::Add(lhs, rhs) => {
                let lhs = lhs.simplify();
                let rhs = rhs.simplify();
                match (&lhs, &rhs) {
                    (Expr::Const(a), Expr::Const(b)) => {
                        folded(*a, *b, a + b).unwrap_or(Expr::Add(lhs.boxed(), rhs.boxed()))
                    }
                    _ if lhs.is_zero() => rhs,
                    _ if rhs.is_zero() => lhs,
                    _ => Expr::Add(lhs.boxed(), rhs.boxed()),
                }
            }
            Expr::Sub(lhs, rhs) => {
                let lhs = lhs.simplify();
                let rhs = rhs.simplify();
                match (&lhs, &rhs) {
                    (Expr::Const(a), Expr::Const(b)) => {
                        folded(*a, *b, a - b).unwrap_or(Expr::Sub(lhs.boxed(), rhs.boxed()))
                    }
                    _ if rhs.is_zero() => lhs,
                    _ if lhs.is_zero() => (-rhs).simplify(),
                    _ if lhs == rhs => Expr::Const(0.0),
                    _ => Expr::Sub(lhs.boxed(), rhs.boxed()),
                }
            }
            Expr::Mul(lhs, rhs) => Self::simplify_product(lhs.simplify(), rhs.simplify()),
            Expr::Div(lhs, rhs) => {
                let lhs = lhs.simplify();
                let rhs = rhs.simplify();
                match (&lhs, &rhs) {
                    (Expr::Const(a), Expr::Const(b)) => {
                        folded_quotient(*a, *b).unwrap_or(Expr::Div(lhs.boxed(), rhs.boxed()))
                    }
                    (_, Expr::Const(b)) if *b == 1.0 => lhs,
                    _ if lhs.is_zero() && !rhs.is_zero() => Expr::Const(0.0),
                    _ => Expr::Div(lhs.boxed(), rhs.boxed()),
                }
            }
            Expr::Pow(base, exp) => {
                let base = base.simplify();
                let exp = exp.simplify();
                match (&base, &exp) {
                    (Expr::Const(a), Expr::Const(b)) => {
                        folded_power(*a, *b).unwrap_or(Expr::Pow(base.boxed(), exp.boxed()))
                    }
                    (_, Expr::Const(b)) if *b == 1.0 => base,
                    (_, Expr::Const(b)) if *b == 0.0 => Expr::Const(1.0),
                    _ => Expr::Pow(base.boxed(), exp.boxed()),
                }
            }
            Expr::Func(func, arg) => Expr::Func(*func, arg.simplify().boxed()),
            Expr::Func2(func, a, b) => Expr::Func2(*func, a.simplify().boxed(), b.simplify().boxed()),
        }
    }

    fn simplify_product(lhs: Expr, rhs: Expr) -> Expr {
        match (&lhs, &rhs) {
            (Expr::Const(a), Expr::Const(b)) => {
                folded(*a, *b, a * b).unwrap_or(Expr::Mul(lhs.boxed(), rhs.boxed()))
            }
            _ if lhs.is_zero() || rhs.is_zero() => Expr::Const(0.0),
            (Expr::Const(a), _) if *a == 1.0 => rhs,
            (_, Expr::Const(b)) if *b == 1.0 => lhs,
            // c1 * (c2 * x) = (c1 * c2) * x
            (Expr::Const(c1), Expr::Mul(inner_lhs, inner_rhs)) => match inner_lhs.as_ref() {
                Expr::Const(c2) => match folded(*c1, *c2, c1 * c2) {
                    Some(product) => Self::simplify_product(product, *inner_rhs.clone()),
                    None => Expr::Mul(lhs.boxed(), rhs.boxed()),
                },
                _ => Expr::Mul(lhs.boxed(), rhs.boxed()),
            },
            // x * c = c * x
            (_, Expr::Const(_)) => Self::simplify_product(rhs, lhs),
            _ => Expr::Mul(lhs.boxed(), rhs.boxed()),
        }
    }
}
