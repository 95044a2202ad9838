use crate::error::SolveError;
use crate::numerical::System_solvers::fixed_point_system::FixedPointIterationSystemSolver;
use crate::numerical::equation_system::{EquationSystem, EquationSystemSolution};
use crate::numerical::numeric_context::NumericContext;
use enum_dispatch::enum_dispatch;
use strum_macros::{Display, EnumIter, EnumString};

/// Approximate solution of a system and the number of completed iterations.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemSolution {
    pub solution: EquationSystemSolution,
    pub iterations: usize,
}

#[enum_dispatch]
pub trait SystemSolver {
    fn method(&self) -> SystemSolutionMethod;

    /// convergence precondition at the starting point
    fn check_convergence(
        &self,
        system: &EquationSystem,
        start: &EquationSystemSolution,
    ) -> Result<bool, SolveError>;

    fn solve_observed(
        &self,
        system: &EquationSystem,
        start: &EquationSystemSolution,
        precision: f64,
        observer: &mut dyn FnMut(&EquationSystemSolution, usize),
    ) -> Result<SystemSolution, SolveError>;

    fn solve(
        &self,
        system: &EquationSystem,
        start: &EquationSystemSolution,
        precision: f64,
    ) -> Result<SystemSolution, SolveError> {
        self.solve_observed(system, start, precision, &mut |_, _| {})
    }
}

#[enum_dispatch(SystemSolver)]
#[derive(Debug, Clone, Copy)]
pub enum SystemSolverEnum {
    FixedPointIterationSystemSolver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display)]
pub enum SystemSolutionMethod {
    #[strum(serialize = "fixed-point", serialize = "fixed_point")]
    FixedPointIteration,
}

impl SystemSolutionMethod {
    pub fn solver(&self, ctx: &NumericContext) -> SystemSolverEnum {
        match self {
            SystemSolutionMethod::FixedPointIteration => {
                FixedPointIterationSystemSolver::new(ctx).into()
            }
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            SystemSolutionMethod::FixedPointIteration => "Fixed point iteration",
        }
    }
}
