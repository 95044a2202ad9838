//! Chord method: secant steps that keep the root bracketed (regula falsi).
use crate::error::SolveError;
use crate::numerical::Scalar_solvers::solver_traits::{Solution, SolutionMethod, Solver};
use crate::numerical::equation::Equation;
use crate::numerical::interval_sampler::signs_equal;
use crate::numerical::numeric_context::NumericContext;
use crate::numerical::real::Real;
use log::{debug, error, info};

pub const CHORD_MAX_ITERATIONS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChordSolver {
    pub ctx: NumericContext,
    pub max_iterations: usize,
}

impl ChordSolver {
    pub fn new(ctx: &NumericContext) -> Self {
        ChordSolver {
            ctx: *ctx,
            max_iterations: CHORD_MAX_ITERATIONS,
        }
    }

    pub fn with_max_iterations(self, max_iterations: usize) -> Self {
        ChordSolver {
            max_iterations,
            ..self
        }
    }
}

impl Solver for ChordSolver {
    fn method(&self) -> SolutionMethod {
        SolutionMethod::Chord
    }

    /// bracketing keeps the method convergent once the single root gate has passed
    fn check_convergence(&self, _equation: &Equation) -> bool {
        true
    }

    fn solve_observed(
        &self,
        equation: &Equation,
        precision: f64,
        observer: &mut dyn FnMut(&Real, usize),
    ) -> Result<Solution, SolveError> {
        let (a, b) = equation.interval();
        let (mut a, mut b) = (a.clone(), b.clone());
        if a == b {
            return Err(SolveError::DegenerateInterval(format!(
                "chord method needs l < r, got [{}, {}]",
                a, b
            )));
        }
        let eps = self.ctx.real(precision);
        info!("chord method on [{}, {}] with precision {}", a, b, precision);
        let mut prev_x = &a - &(&self.ctx.real(10.0) * &eps);
        for iteration in 1..=self.max_iterations {
            let fa = equation.f(&a);
            let fb = equation.f(&b);
            if fa == fb {
                return Err(SolveError::DegenerateInterval(format!(
                    "f(a) = f(b) = {} at a = {}, b = {}",
                    fa, a, b
                )));
            }
            let x = &a - &(&(&(&b - &a) / &(&fb - &fa)) * &fa);
            if !x.is_finite() {
                return Err(SolveError::NonFinite { iteration });
            }
            let fx = equation.f(&x);
            if signs_equal(&fx, &fa) {
                a = x.clone();
            } else {
                b = x.clone();
            }
            observer(&x, iteration);
            debug!("iteration = {}, x = {}, f(x) = {}", iteration, x, fx);
            if (&x - &prev_x).abs() <= eps || (&a - &b).abs() <= eps || fx.abs() <= eps {
                info!("chord method converged to {} in {} iterations", x, iteration);
                return Ok(Solution {
                    x,
                    iterations: iteration,
                });
            }
            prev_x = x;
        }
        error!("Maximum number of iterations reached. No solution found.");
        Err(SolveError::NoConvergence {
            iterations: self.max_iterations,
        })
    }
}
