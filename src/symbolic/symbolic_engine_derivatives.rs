//! # Symbolic Engine Derivatives Module
//!
//! Analytical differentiation of `Expr` trees.
//!
//! ## Key Methods
//! - `diff(var)` - partial/total derivative, `Err(DiffError)` for nodes without a closed form
//! - `diff_simplified(var)` - the same followed by `simplify()`, the form stored in equations
//!
//! ## Notes
//!
//! 1. **General power rule**: `u^v` with a variable exponent is differentiated as
//!    `u^v * (v' * ln(u) + v * u' / u)`; a constant exponent keeps the usual `v * u^(v-1) * u'`.
//! 2. **Step functions**: `floor`, `ceil` and `trunc` have no symbolic derivative. The caller
//!    decides what to do, equations switch to finite differences.
//! 3. **Constants stay exact**: factors such as `ln(10)` or `180 / pi` are kept as expressions
//!    and only evaluated at the working precision.

use crate::error::DiffError;
use crate::symbolic::symbolic_engine::{Expr, MathFn, MathFn2, NamedConst};

impl Expr {
    /// DIFFERENTIATION

    /// Computes the analytical derivative of the expression with respect to a variable.
    ///
    /// Implements the standard rules: power, product, quotient and chain rule.
    /// For multivariable functions, computes partial derivatives.
    ///
    /// # Examples
    /// ```rust, ignore
    /// let x = Expr::Var("x".to_string());
    /// let f = x.clone().pow(Expr::Const(2.0)); // x^2
    /// let df_dx = f.diff("x").unwrap(); // 2*x^(2-1)*1
    /// ```
    pub fn diff(&self, var: &str) -> Result<Expr, DiffError> {
        let derivative = match self {
            Expr::Var(name) => {
                if name == var {
                    Expr::Const(1.0)
                } else {
                    Expr::Const(0.0)
                }
            }
            Expr::Const(_) | Expr::Named(_) => Expr::Const(0.0),
            Expr::Add(lhs, rhs) => lhs.diff(var)? + rhs.diff(var)?,
            Expr::Sub(lhs, rhs) => lhs.diff(var)? - rhs.diff(var)?,
            Expr::Mul(lhs, rhs) => {
                lhs.diff(var)? * *rhs.clone() + *lhs.clone() * rhs.diff(var)?
            }
            Expr::Div(lhs, rhs) => {
                (lhs.diff(var)? * *rhs.clone() - rhs.diff(var)? * *lhs.clone())
                    / (*rhs.clone() * *rhs.clone())
            }
            Expr::Pow(base, exp) => {
                if exp.contains_variable(var) {
                    // d(u^v) = u^v * (v' * ln(u) + v * u' / u)
                    let log_base = base.as_ref().clone().apply_fn(MathFn::ln);
                    self.clone()
                        * (exp.diff(var)? * log_base
                            + *exp.clone() * base.diff(var)? / *base.clone())
                } else {
                    *exp.clone()
                        * base.as_ref().clone().pow(*exp.clone() - Expr::Const(1.0))
                        * base.diff(var)?
                }
            }
            Expr::Func(func, arg) => Self::diff_fn(*func, arg)? * arg.diff(var)?,
            Expr::Func2(func, a, b) => {
                let (u, v) = (a.as_ref().clone(), b.as_ref().clone());
                let (du, dv) = (a.diff(var)?, b.diff(var)?);
                match func {
                    // (u u' + v v') / hypot(u, v)
                    MathFn2::hypot => {
                        (u.clone() * du + v.clone() * dv) / u.apply_fn2(MathFn2::hypot, v)
                    }
                    // (v u' - u v') / (u^2 + v^2)
                    MathFn2::atan2 => {
                        let two = Expr::Const(2.0);
                        (v.clone() * du - u.clone() * dv) / (u.pow(two.clone()) + v.pow(two))
                    }
                }
            }
        };
        Ok(derivative)
    }

    /// outer derivative f'(u) of a whitelisted function, to be multiplied by u'
    fn diff_fn(func: MathFn, arg: &Expr) -> Result<Expr, DiffError> {
        let u = arg.clone();
        let one = Expr::Const(1.0);
        let two = Expr::Const(2.0);
        let ln_of = |c: f64| Expr::Const(c).apply_fn(MathFn::ln);
        let pi = Expr::Named(NamedConst::pi);
        let outer = match func {
            MathFn::sqrt => one / (two * u.apply_fn(MathFn::sqrt)),
            MathFn::cbrt => one / (Expr::Const(3.0) * u.apply_fn(MathFn::cbrt).pow(two)),
            MathFn::exp => u.apply_fn(MathFn::exp),
            MathFn::exp2 => u.apply_fn(MathFn::exp2) * ln_of(2.0),
            MathFn::expm1 => u.apply_fn(MathFn::exp),
            MathFn::log | MathFn::ln => one / u,
            MathFn::log10 => one / (u * ln_of(10.0)),
            MathFn::log2 => one / (u * ln_of(2.0)),
            MathFn::log1p => one.clone() / (one + u),
            MathFn::sin => u.apply_fn(MathFn::cos),
            MathFn::cos => -u.apply_fn(MathFn::sin),
            MathFn::tan => one / u.apply_fn(MathFn::cos).pow(two),
            MathFn::asin => one.clone() / (one - u.pow(two)).apply_fn(MathFn::sqrt),
            MathFn::acos => -(one.clone() / (one - u.pow(two)).apply_fn(MathFn::sqrt)),
            MathFn::atan => one.clone() / (one + u.pow(two)),
            MathFn::sinh => u.apply_fn(MathFn::cosh),
            MathFn::cosh => u.apply_fn(MathFn::sinh),
            MathFn::tanh => one / u.apply_fn(MathFn::cosh).pow(two),
            MathFn::asinh => one.clone() / (u.pow(two) + one).apply_fn(MathFn::sqrt),
            MathFn::acosh => one.clone() / (u.pow(two) - one).apply_fn(MathFn::sqrt),
            MathFn::atanh => one.clone() / (one - u.pow(two)),
            // d|u|/du = u / |u|
            MathFn::fabs => u.clone() / u.apply_fn(MathFn::fabs),
            MathFn::degrees => Expr::Const(180.0) / pi,
            MathFn::radians => pi / Expr::Const(180.0),
            MathFn::floor | MathFn::ceil | MathFn::trunc => {
                return Err(DiffError::NotDifferentiable {
                    function: func.to_string(),
                });
            }
        };
        Ok(outer)
    }

    /// derivative followed by simplification
    pub fn diff_simplified(&self, var: &str) -> Result<Expr, DiffError> {
        Ok(self.diff(var)?.simplify())
    }
}
