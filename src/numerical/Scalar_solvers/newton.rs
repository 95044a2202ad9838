//! Newton's method started from the left end of the interval.
use crate::error::SolveError;
use crate::numerical::Scalar_solvers::solver_traits::{Solution, SolutionMethod, Solver};
use crate::numerical::equation::Equation;
use crate::numerical::numeric_context::NumericContext;
use crate::numerical::real::Real;
use log::{debug, error, info, warn};

pub const NEWTON_MAX_ITERATIONS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonSolver {
    pub ctx: NumericContext,
    pub max_iterations: usize,
}

impl NewtonSolver {
    pub fn new(ctx: &NumericContext) -> Self {
        NewtonSolver {
            ctx: *ctx,
            max_iterations: NEWTON_MAX_ITERATIONS,
        }
    }

    pub fn with_max_iterations(self, max_iterations: usize) -> Self {
        NewtonSolver {
            max_iterations,
            ..self
        }
    }
}

impl Solver for NewtonSolver {
    fn method(&self) -> SolutionMethod {
        SolutionMethod::Newton
    }

    /// f' and f'' keep their sign on [l, r] and f' does not vanish at the ends
    fn check_convergence(&self, equation: &Equation) -> bool {
        let sampler = equation.sampler();
        let (l, r) = equation.interval();
        let df_keeps_sign = sampler.keeps_sign(&|x| equation.df(x));
        let d2f_keeps_sign = sampler.keeps_sign(&|x| equation.d2f(x));
        let ends_regular = !equation.df(l).is_zero() && !equation.df(r).is_zero();
        if !df_keeps_sign {
            warn!("f' changes sign on [{}, {}]", l, r);
        }
        if !d2f_keeps_sign {
            warn!("f'' changes sign on [{}, {}]", l, r);
        }
        df_keeps_sign && d2f_keeps_sign && ends_regular
    }

    fn solve_observed(
        &self,
        equation: &Equation,
        precision: f64,
        observer: &mut dyn FnMut(&Real, usize),
    ) -> Result<Solution, SolveError> {
        let eps = self.ctx.real(precision);
        let mut x = equation.interval_l().clone();
        let mut prev_x = &x - &(&self.ctx.real(10.0) * &eps);
        info!("Newton method from x0 = {} with precision {}", x, precision);
        for iteration in 1..=self.max_iterations {
            let dfx = equation.df(&x);
            if dfx.is_zero() {
                return Err(SolveError::ZeroDerivative { x: x.to_f64() });
            }
            x = &x - &(equation.f(&x) / dfx);
            if !x.is_finite() {
                return Err(SolveError::NonFinite { iteration });
            }
            observer(&x, iteration);
            let fx = equation.f(&x);
            let dfx = equation.df(&x);
            debug!("iteration = {}, x = {}, f(x) = {}", iteration, x, fx);
            if (&x - &prev_x).abs() <= eps || (&fx / &dfx).abs() <= eps || fx.abs() <= eps {
                info!("Newton method converged to {} in {} iterations", x, iteration);
                return Ok(Solution {
                    x,
                    iterations: iteration,
                });
            }
            prev_x = x.clone();
        }
        error!("Maximum number of iterations reached. No solution found.");
        Err(SolveError::NoConvergence {
            iterations: self.max_iterations,
        })
    }
}
