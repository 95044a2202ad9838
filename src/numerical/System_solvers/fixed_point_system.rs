//! Jacobi-style fixed-point iteration `x_i <- phi_i(x)` for systems.
use crate::error::SolveError;
use crate::numerical::System_solvers::system_solver_traits::{
    SystemSolution, SystemSolutionMethod, SystemSolver,
};
use crate::numerical::equation_system::{EquationSystem, EquationSystemSolution};
use crate::numerical::numeric_context::NumericContext;
use crate::numerical::real::Real;
use log::{debug, error, info, warn};

pub const SYSTEM_MAX_ITERATIONS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPointIterationSystemSolver {
    pub ctx: NumericContext,
    pub max_iterations: usize,
}

impl FixedPointIterationSystemSolver {
    pub fn new(ctx: &NumericContext) -> Self {
        FixedPointIterationSystemSolver {
            ctx: *ctx,
            max_iterations: SYSTEM_MAX_ITERATIONS,
        }
    }

    pub fn with_max_iterations(self, max_iterations: usize) -> Self {
        FixedPointIterationSystemSolver {
            max_iterations,
            ..self
        }
    }

    /// largest componentwise change between two iterates, NaN when a component is missing
    fn max_change(&self, xs: &EquationSystemSolution, prev: &EquationSystemSolution) -> Real {
        xs.iter()
            .map(|(name, value)| match prev.get(name) {
                Some(old) => (value - old).abs(),
                None => Real::nan(self.ctx.bits()),
            })
            .fold(self.ctx.zero(), |acc, change| {
                if acc.is_nan() || change.is_nan() {
                    Real::nan(self.ctx.bits())
                } else {
                    acc.max(change)
                }
            })
    }
}

fn display(xs: &EquationSystemSolution) -> String {
    let values: Vec<String> = xs
        .iter()
        .map(|(name, value)| format!("{} = {}", name, value))
        .collect();
    values.join(", ")
}

impl SystemSolver for FixedPointIterationSystemSolver {
    fn method(&self) -> SystemSolutionMethod {
        SystemSolutionMethod::FixedPointIteration
    }

    /// every row must satisfy sum_s |d phi_i / d s| < 1 at `start`
    fn check_convergence(
        &self,
        system: &EquationSystem,
        start: &EquationSystemSolution,
    ) -> Result<bool, SolveError> {
        system.check_point(start)?;
        let sums = system.phi_derivative_sums(start);
        let one = self.ctx.one();
        let mut ok = true;
        for (eq, sum) in system.equations().iter().zip(&sums) {
            if !(*sum < one) {
                warn!(
                    "sum of |d phi / d x| for {} is {} at the starting point",
                    eq.phi_lhs, sum
                );
                ok = false;
            }
        }
        Ok(ok)
    }

    fn solve_observed(
        &self,
        system: &EquationSystem,
        start: &EquationSystemSolution,
        precision: f64,
        observer: &mut dyn FnMut(&EquationSystemSolution, usize),
    ) -> Result<SystemSolution, SolveError> {
        system.check_point(start)?;
        info!(
            "fixed point iteration for {} equations, precision {}",
            system.equations().len(),
            precision
        );
        let eps = self.ctx.real(precision);
        let mut prev = start.clone();
        for iteration in 1..=self.max_iterations {
            let xs = system.apply_phi(&prev);
            if xs.values().any(|v| !v.is_finite()) {
                return Err(SolveError::NonFinite { iteration });
            }
            observer(&xs, iteration);
            let change = self.max_change(&xs, &prev);
            debug!("iteration = {}, {}, change = {}", iteration, display(&xs), change);
            if change <= eps {
                info!("system converged in {} iterations", iteration);
                return Ok(SystemSolution {
                    solution: xs,
                    iterations: iteration,
                });
            }
            prev = xs;
        }
        error!("Maximum number of iterations reached. No solution found.");
        Err(SolveError::NoConvergence {
            iterations: self.max_iterations,
        })
    }
}
