//! # Systems of nonlinear equations in fixed-point form
//!
//! Every row of a system is a `MultivariableEquation`: a residual `f(x_1..x_n)` plus the
//! rewritten form `phi_lhs = phi(...)`. The system checks that every symbol used by the
//! residuals is defined by exactly one row and precomputes the partial derivatives of each
//! `phi` needed by the convergence check. Points are `Real` values at the precision of the
//! `NumericContext` the system was built with.
//!
//! # Example
//! ```
//! use RustedRoots::numerical::equation_system::{EquationSystem, MultivariableEquation};
//! use RustedRoots::numerical::numeric_context::NumericContext;
//! let rows = vec![
//!     MultivariableEquation::from_str("x1 - 0.5*x2", "x1", "0.5*x2").unwrap(),
//!     MultivariableEquation::from_str("x2 - 0.5*x1 - 1", "x2", "0.5*x1 + 1").unwrap(),
//! ];
//! let system = EquationSystem::new(rows, &NumericContext::default()).unwrap();
//! assert_eq!(system.symbols(), &["x1".to_string(), "x2".to_string()]);
//! ```
use crate::error::ValidationError;
use crate::numerical::num_diff::partial_derivative_fn;
use crate::numerical::numeric_context::NumericContext;
use crate::numerical::real::Real;
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_lambdify::FnND;
use crate::symbolic::validation::validate_expression;
use log::{debug, warn};
use std::collections::{BTreeMap, BTreeSet};

/// Value of every system symbol, ordered by name.
pub type EquationSystemSolution = BTreeMap<String, Real>;
/// Starting values as typed by the user, before they are read at the working precision.
pub type StartingValues = BTreeMap<String, f64>;

/// read every starting value as a decimal at the precision of `ctx`
pub fn starting_point(values: &StartingValues, ctx: &NumericContext) -> EquationSystemSolution {
    values
        .iter()
        .map(|(name, value)| (name.clone(), ctx.real(*value)))
        .collect()
}

/// One row of a system: `f = 0` rewritten as `phi_lhs = phi`.
#[derive(Debug, Clone, PartialEq)]
pub struct MultivariableEquation {
    pub f: Expr,
    pub phi_lhs: String,
    pub phi: Expr,
}

impl MultivariableEquation {
    pub fn new(f: Expr, phi_lhs: &str, phi: Expr) -> Self {
        MultivariableEquation {
            f,
            phi_lhs: phi_lhs.trim().to_string(),
            phi,
        }
    }

    /// parse both sides, any symbols are allowed at this point
    pub fn from_str(f: &str, phi_lhs: &str, phi: &str) -> Result<Self, ValidationError> {
        let f = validate_expression(f)?;
        let phi = validate_expression(phi)?;
        Ok(Self::new(f, phi_lhs, phi))
    }
}

/// compiled part of one row
#[derive(Clone)]
struct CompiledRow {
    f: FnND,
    phi: FnND,
    /// |d phi / d s| for every system symbol s, same order as `EquationSystem::symbols`
    dphi: Vec<FnND>,
}

#[derive(Clone)]
pub struct EquationSystem {
    ctx: NumericContext,
    equations: Vec<MultivariableEquation>,
    symbols: Vec<String>,
    compiled: Vec<CompiledRow>,
    derivative_is_approximate: bool,
}

impl std::fmt::Debug for EquationSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EquationSystem")
            .field("equations", &self.equations)
            .field("symbols", &self.symbols)
            .finish()
    }
}

impl EquationSystem {
    pub fn new(
        equations: Vec<MultivariableEquation>,
        ctx: &NumericContext,
    ) -> Result<Self, ValidationError> {
        if equations.is_empty() {
            return Err(ValidationError::EmptySystem);
        }

        let mut defined = BTreeSet::new();
        for eq in &equations {
            if !defined.insert(eq.phi_lhs.clone()) {
                return Err(ValidationError::DuplicatePhi(eq.phi_lhs.clone()));
            }
        }
        let used: BTreeSet<String> = equations.iter().flat_map(|eq| eq.f.free_symbols()).collect();
        if used != defined {
            return Err(ValidationError::UncoveredSymbols {
                missing: used.difference(&defined).cloned().collect(),
                extra: defined.difference(&used).cloned().collect(),
            });
        }
        let symbols: Vec<String> = used.into_iter().collect();
        let vars: Vec<&str> = symbols.iter().map(|s| s.as_str()).collect();

        let mut compiled = Vec::with_capacity(equations.len());
        let mut derivative_is_approximate = false;
        for eq in &equations {
            let f = eq.f.lambdify_borrowed_thread_safe(&vars, ctx)?;
            let phi = eq.phi.lambdify_borrowed_thread_safe(&vars, ctx)?;
            let mut dphi = Vec::with_capacity(symbols.len());
            for (index, symbol) in symbols.iter().enumerate() {
                let partial = match eq.phi.diff_simplified(symbol) {
                    Ok(expr) => {
                        debug!("d({})/d{} = {}", eq.phi_lhs, symbol, expr);
                        expr.lambdify_borrowed_thread_safe(&vars, ctx)?
                    }
                    Err(e) => {
                        warn!(
                            "{}; using central differences for d({})/d{}",
                            e, eq.phi_lhs, symbol
                        );
                        derivative_is_approximate = true;
                        partial_derivative_fn(phi.clone(), index, ctx.fd_step())
                    }
                };
                dphi.push(partial);
            }
            compiled.push(CompiledRow { f, phi, dphi });
        }

        Ok(EquationSystem {
            ctx: *ctx,
            equations,
            symbols,
            compiled,
            derivative_is_approximate,
        })
    }

    pub fn ctx(&self) -> &NumericContext {
        &self.ctx
    }

    pub fn equations(&self) -> &[MultivariableEquation] {
        &self.equations
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn is_derivative_approximate(&self) -> bool {
        self.derivative_is_approximate
    }

    /// the starting point must name exactly the system symbols
    pub fn check_point(&self, xs: &EquationSystemSolution) -> Result<(), ValidationError> {
        if xs.keys().eq(self.symbols.iter()) {
            Ok(())
        } else {
            Err(ValidationError::StartingPointMismatch {
                found: xs.keys().cloned().collect(),
                expected: self.symbols.clone(),
            })
        }
    }

    fn to_args(&self, xs: &EquationSystemSolution) -> Vec<Real> {
        self.symbols
            .iter()
            .map(|s| xs.get(s).cloned().unwrap_or_else(|| Real::nan(self.ctx.bits())))
            .collect()
    }

    /// one Jacobi step: every `phi_lhs` gets `phi` evaluated at `xs`
    pub fn apply_phi(&self, xs: &EquationSystemSolution) -> EquationSystemSolution {
        let args = self.to_args(xs);
        self.equations
            .iter()
            .zip(&self.compiled)
            .map(|(eq, row)| (eq.phi_lhs.clone(), (row.phi)(&args)))
            .collect()
    }

    /// residuals f_i(xs), in row order
    pub fn apply(&self, xs: &EquationSystemSolution) -> Vec<Real> {
        let args = self.to_args(xs);
        self.compiled.iter().map(|row| (row.f)(&args)).collect()
    }

    /// sum over symbols of |d phi_i / d s| at `xs`, one value per row
    pub fn phi_derivative_sums(&self, xs: &EquationSystemSolution) -> Vec<Real> {
        let args = self.to_args(xs);
        self.compiled
            .iter()
            .map(|row| {
                row.dphi
                    .iter()
                    .fold(self.ctx.zero(), |acc, d| acc + d(&args).abs())
            })
            .collect()
    }

    /// largest |f_i(xs)|
    pub fn max_residual(&self, xs: &EquationSystemSolution) -> Real {
        self.apply(xs)
            .into_iter()
            .fold(self.ctx.zero(), |acc, y| acc.max(y.abs()))
    }
}
