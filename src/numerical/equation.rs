//! # Single-variable equation f(x) = 0
//!
//! `Equation` owns everything the scalar solvers need:
//! - `f` as a symbolic expression and a compiled closure
//! - `f'`, `f''`: symbolic derivatives, or central differences when `f` contains a function
//!   without a closed-form derivative (`floor`, `ceil`, `trunc`)
//! - the fixed-point transform `phi` and its derivative, either given by the user or derived
//!   automatically: `phi(x) = x + m * f(x)` with `m = -sign(f'(mid)) / max|f'|`. When `max|f'|`
//!   is zero or not finite there is no automatic transform; only the fixed-point solver needs
//!   one and reports the reason
//! - the search interval `[l, r]` and the `NumericContext` every closure evaluates with
//!
//! The object is immutable after construction; solvers only read it.
//!
//! # Example
//! ```
//! use RustedRoots::numerical::equation::Equation;
//! use RustedRoots::numerical::numeric_context::NumericContext;
//! let ctx = NumericContext::default();
//! let eq = Equation::from_str("x^3 - x - 2", 1.0, 2.0, &ctx).unwrap();
//! assert_eq!(eq.df_str(), "((3 * (x ^ 2)) - 1)");
//! assert_eq!(eq.f(&ctx.real(2.0)).to_f64(), 4.0);
//! assert!(eq.check_single_root());
//! ```
use crate::error::ValidationError;
use crate::numerical::interval_sampler::IntervalSampler;
use crate::numerical::num_diff::{first_derivative_fn, second_derivative_fn};
use crate::numerical::numeric_context::NumericContext;
use crate::numerical::real::Real;
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_lambdify::Fn1D;
use crate::symbolic::validation::{
    EQUATION_SYMBOL, check_single_variable, validate_and_parse_equation,
};
use log::{debug, warn};
use std::fmt;
use std::sync::Arc;

/// A function of `x` derived from `f`: symbolic when possible, a numeric closure otherwise.
#[derive(Clone)]
pub enum DerivedFn {
    Symbolic { expr: Expr, func: Fn1D },
    Numeric { description: String, func: Fn1D },
}

impl DerivedFn {
    pub fn symbolic(expr: Expr, ctx: &NumericContext) -> Result<Self, ValidationError> {
        let func = expr.lambdify1D(EQUATION_SYMBOL, ctx)?;
        Ok(DerivedFn::Symbolic { expr, func })
    }

    pub fn numeric(description: String, func: Fn1D) -> Self {
        DerivedFn::Numeric { description, func }
    }

    pub fn eval(&self, x: &Real) -> Real {
        self.func()(x)
    }

    pub fn func(&self) -> &Fn1D {
        match self {
            DerivedFn::Symbolic { func, .. } | DerivedFn::Numeric { func, .. } => func,
        }
    }

    pub fn expr(&self) -> Option<&Expr> {
        match self {
            DerivedFn::Symbolic { expr, .. } => Some(expr),
            DerivedFn::Numeric { .. } => None,
        }
    }

    pub fn is_approximate(&self) -> bool {
        matches!(self, DerivedFn::Numeric { .. })
    }
}

impl fmt::Display for DerivedFn {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DerivedFn::Symbolic { expr, .. } => write!(f, "{}", expr),
            DerivedFn::Numeric { description, .. } => write!(f, "{}", description),
        }
    }
}

impl fmt::Debug for DerivedFn {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DerivedFn::Symbolic { expr, .. } => write!(f, "Symbolic({})", expr),
            DerivedFn::Numeric { description, .. } => write!(f, "Numeric({})", description),
        }
    }
}

/// derivative of `source` with respect to x, falling back to a central difference of `source`
fn derivative_of(source: &DerivedFn, ctx: &NumericContext) -> Result<DerivedFn, ValidationError> {
    if let Some(expr) = source.expr() {
        match expr.diff_simplified(EQUATION_SYMBOL) {
            Ok(derivative) => return DerivedFn::symbolic(derivative, ctx),
            Err(e) => warn!("{}; using central differences with step {}", e, ctx.fd_step()),
        }
    }
    Ok(DerivedFn::numeric(
        format!("d/dx[{}] (numeric)", source),
        first_derivative_fn(source.func().clone(), ctx.fd_step()),
    ))
}

/// `x = phi(x)` together with `phi'`
#[derive(Clone, Debug)]
pub struct FixedPointTransform {
    pub phi: DerivedFn,
    pub dphi: DerivedFn,
}

impl FixedPointTransform {
    pub fn phi(&self, x: &Real) -> Real {
        self.phi.eval(x)
    }

    pub fn dphi(&self, x: &Real) -> Real {
        self.dphi.eval(x)
    }
}

#[derive(Clone, Debug)]
pub struct Equation {
    ctx: NumericContext,
    f: DerivedFn,
    df: DerivedFn,
    d2f: DerivedFn,
    transform: Result<FixedPointTransform, ValidationError>,
    interval_l: Real,
    interval_r: Real,
}

impl Equation {
    /// Parse and validate `f`, then derive everything else.
    pub fn from_str(
        f: &str,
        interval_l: f64,
        interval_r: f64,
        ctx: &NumericContext,
    ) -> Result<Self, ValidationError> {
        let expr = validate_and_parse_equation(f)?;
        Self::from_expr(expr, interval_l, interval_r, ctx)
    }

    /// Build from a ready expression; it must depend on `x` only.
    pub fn from_expr(
        f: Expr,
        interval_l: f64,
        interval_r: f64,
        ctx: &NumericContext,
    ) -> Result<Self, ValidationError> {
        check_single_variable(&f, EQUATION_SYMBOL)?;
        if !(interval_l.is_finite() && interval_r.is_finite()) || interval_l > interval_r {
            return Err(ValidationError::InvalidInterval {
                l: interval_l,
                r: interval_r,
            });
        }
        let f = DerivedFn::symbolic(f, ctx)?;
        let df = derivative_of(&f, ctx)?;
        let d2f = if df.is_approximate() {
            DerivedFn::numeric(
                format!("d2/dx2[{}] (numeric)", f),
                second_derivative_fn(f.func().clone(), ctx.fd_step()),
            )
        } else {
            derivative_of(&df, ctx)?
        };
        debug!("f = {}, f' = {}, f'' = {}", f, df, d2f);
        let (interval_l, interval_r) = (ctx.real(interval_l), ctx.real(interval_r));
        let transform = Self::automatic_phi(&f, &df, &interval_l, &interval_r, ctx);
        if let Err(e) = &transform {
            warn!("{}; only the fixed-point solver needs it", e);
        }
        Ok(Equation {
            ctx: *ctx,
            f,
            df,
            d2f,
            transform,
            interval_l,
            interval_r,
        })
    }

    /// `phi(x) = x + m * f(x)`, `phi'(x) = 1 + m * f'(x)` with `m = -sign(f'(mid)) / max|f'|`
    fn automatic_phi(
        f: &DerivedFn,
        df: &DerivedFn,
        l: &Real,
        r: &Real,
        ctx: &NumericContext,
    ) -> Result<FixedPointTransform, ValidationError> {
        let sampler = IntervalSampler::new(l.clone(), r.clone());
        let abs_df: Vec<Real> = sampler.points().map(|x| df.eval(&x).abs()).collect();
        if abs_df.iter().any(|v| !v.is_finite()) {
            return Err(ValidationError::DegenerateDerivative(
                "max |f'| is not finite".to_string(),
            ));
        }
        let max_df = abs_df
            .into_iter()
            .fold(Real::zero(ctx.bits()), |acc, v| acc.max(v));
        if !max_df.is_positive() {
            return Err(ValidationError::DegenerateDerivative(
                "f' vanishes on the whole interval".to_string(),
            ));
        }
        let mid = &(l + r) / &ctx.real(2.0);
        let m = if df.eval(&mid).is_positive() {
            -(&ctx.one() / &max_df)
        } else {
            &ctx.one() / &max_df
        };
        let m = m.to_f64();
        debug!("automatic fixed-point transform: m = {}", m);

        match (f.expr(), df.expr()) {
            (Some(f_expr), Some(df_expr)) => {
                let x = Expr::Var(EQUATION_SYMBOL.to_string());
                let phi = (x + Expr::Const(m) * f_expr.clone()).simplify();
                let dphi = (Expr::Const(1.0) + Expr::Const(m) * df_expr.clone()).simplify();
                Ok(FixedPointTransform {
                    phi: DerivedFn::symbolic(phi, ctx)?,
                    dphi: DerivedFn::symbolic(dphi, ctx)?,
                })
            }
            _ => {
                let f_fn = f.func().clone();
                let df_fn = df.func().clone();
                let (m_phi, m_dphi) = (ctx.real(m), ctx.real(m));
                let phi: Fn1D = Arc::new(move |x: &Real| x + &(&m_phi * &f_fn(x)));
                let one = ctx.one();
                let dphi: Fn1D = Arc::new(move |x: &Real| &one + &(&m_dphi * &df_fn(x)));
                Ok(FixedPointTransform {
                    phi: DerivedFn::numeric(format!("(x + ({} * {}))", m, f), phi),
                    dphi: DerivedFn::numeric(format!("(1 + ({} * {}))", m, df), dphi),
                })
            }
        }
    }

    /// Replace the automatic transform by a user-supplied `phi`.
    pub fn with_phi_str(self, phi: &str, ctx: &NumericContext) -> Result<Self, ValidationError> {
        let phi = validate_and_parse_equation(phi)?;
        self.with_phi_expr(phi, ctx)
    }

    pub fn with_phi_expr(self, phi: Expr, ctx: &NumericContext) -> Result<Self, ValidationError> {
        check_single_variable(&phi, EQUATION_SYMBOL)?;
        let phi = DerivedFn::symbolic(phi, ctx)?;
        let dphi = derivative_of(&phi, ctx)?;
        debug!("phi = {}, phi' = {}", phi, dphi);
        Ok(Equation {
            transform: Ok(FixedPointTransform { phi, dphi }),
            ..self
        })
    }

    pub fn ctx(&self) -> &NumericContext {
        &self.ctx
    }

    pub fn f(&self, x: &Real) -> Real {
        self.f.eval(x)
    }

    pub fn df(&self, x: &Real) -> Real {
        self.df.eval(x)
    }

    pub fn d2f(&self, x: &Real) -> Real {
        self.d2f.eval(x)
    }

    /// the transform the fixed-point solver iterates, or why there is none
    pub fn fixed_point_transform(&self) -> Result<&FixedPointTransform, ValidationError> {
        self.transform.as_ref().map_err(Clone::clone)
    }

    pub fn f_str(&self) -> String {
        self.f.to_string()
    }

    pub fn df_str(&self) -> String {
        self.df.to_string()
    }

    pub fn d2f_str(&self) -> String {
        self.d2f.to_string()
    }

    pub fn phi_str(&self) -> Option<String> {
        self.transform.as_ref().ok().map(|t| t.phi.to_string())
    }

    pub fn dphi_str(&self) -> Option<String> {
        self.transform.as_ref().ok().map(|t| t.dphi.to_string())
    }

    pub fn interval(&self) -> (&Real, &Real) {
        (&self.interval_l, &self.interval_r)
    }

    pub fn interval_l(&self) -> &Real {
        &self.interval_l
    }

    pub fn interval_r(&self) -> &Real {
        &self.interval_r
    }

    pub fn sampler(&self) -> IntervalSampler {
        IntervalSampler::new(self.interval_l.clone(), self.interval_r.clone())
    }

    /// true if any derivative (f', f'', phi') is a finite-difference estimate
    pub fn is_derivative_approximate(&self) -> bool {
        let dphi_approximate = self
            .transform
            .as_ref()
            .is_ok_and(|t| t.dphi.is_approximate());
        self.df.is_approximate() || self.d2f.is_approximate() || dphi_approximate
    }

    /// single root heuristic over the equation's own interval
    pub fn check_single_root(&self) -> bool {
        self.sampler()
            .check_single_root(&|x| self.f(x), &|x| self.df(x))
    }
}
