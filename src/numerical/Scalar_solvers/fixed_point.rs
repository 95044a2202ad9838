//! Simple iteration x = phi(x) from the middle of the interval.
use crate::error::SolveError;
use crate::numerical::Scalar_solvers::solver_traits::{Solution, SolutionMethod, Solver};
use crate::numerical::equation::Equation;
use crate::numerical::numeric_context::NumericContext;
use crate::numerical::real::Real;
use log::{debug, error, info, warn};

pub const FIXED_POINT_MAX_ITERATIONS: usize = 100_000;
/// bound on |phi'| over the interval
pub const CONTRACTION_BOUND: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPointIterationSolver {
    pub ctx: NumericContext,
    pub max_iterations: usize,
}

impl FixedPointIterationSolver {
    pub fn new(ctx: &NumericContext) -> Self {
        FixedPointIterationSolver {
            ctx: *ctx,
            max_iterations: FIXED_POINT_MAX_ITERATIONS,
        }
    }

    pub fn with_max_iterations(self, max_iterations: usize) -> Self {
        FixedPointIterationSolver {
            max_iterations,
            ..self
        }
    }
}

impl Solver for FixedPointIterationSolver {
    fn method(&self) -> SolutionMethod {
        SolutionMethod::FixedPointIteration
    }

    /// |phi'(x)| <= 1 at every sample; exactly 1 is accepted
    fn check_convergence(&self, equation: &Equation) -> bool {
        let transform = match equation.fixed_point_transform() {
            Ok(transform) => transform,
            Err(e) => {
                warn!("{}", e);
                return false;
            }
        };
        let bound = self.ctx.real(CONTRACTION_BOUND);
        let violation = equation.sampler().points().find_map(|x| {
            let slope = transform.dphi(&x).abs();
            // NaN fails the comparison too
            if slope <= bound { None } else { Some((x, slope)) }
        });
        match violation {
            Some((x, slope)) => {
                warn!("|phi'({})| = {} exceeds {}", x, slope, CONTRACTION_BOUND);
                false
            }
            None => true,
        }
    }

    fn solve_observed(
        &self,
        equation: &Equation,
        precision: f64,
        observer: &mut dyn FnMut(&Real, usize),
    ) -> Result<Solution, SolveError> {
        let transform = equation.fixed_point_transform()?;
        let eps = self.ctx.real(precision);
        let (l, r) = equation.interval();
        let mut prev_x = &(l + r) / &self.ctx.real(2.0);
        info!("fixed point iteration from x0 = {} with precision {}", prev_x, precision);
        for iteration in 1..=self.max_iterations {
            let x = transform.phi(&prev_x);
            if !x.is_finite() {
                return Err(SolveError::NonFinite { iteration });
            }
            observer(&x, iteration);
            debug!("iteration = {}, x = {}", iteration, x);
            if (&x - &prev_x).abs() <= eps {
                info!("fixed point iteration converged to {} in {} iterations", x, iteration);
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
