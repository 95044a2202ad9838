//! Common interface of the single-variable root finders.
//!
//! Solvers are stateless strategies: everything about the problem lives in the `Equation`
//! passed to every call, the solver struct only carries the numeric context it iterates with
//! and its iteration budget. The concrete solver is picked at runtime through `SolutionMethod`
//! and dispatched with `enum_dispatch`.
use crate::error::SolveError;
use crate::numerical::Scalar_solvers::chord::ChordSolver;
use crate::numerical::Scalar_solvers::fixed_point::FixedPointIterationSolver;
use crate::numerical::Scalar_solvers::newton::NewtonSolver;
use crate::numerical::equation::Equation;
use crate::numerical::numeric_context::NumericContext;
use crate::numerical::real::Real;
use enum_dispatch::enum_dispatch;
use strum_macros::{Display, EnumIter, EnumString};

/// Approximate root and the number of completed iterations.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub x: Real,
    pub iterations: usize,
}

#[enum_dispatch]
pub trait Solver {
    fn method(&self) -> SolutionMethod;

    /// precondition of the method over the equation's interval
    fn check_convergence(&self, equation: &Equation) -> bool;

    /// `observer(x, iteration)` is called once per completed iteration, before the stop test.
    /// `precision` is read as a decimal at the solver's working precision.
    fn solve_observed(
        &self,
        equation: &Equation,
        precision: f64,
        observer: &mut dyn FnMut(&Real, usize),
    ) -> Result<Solution, SolveError>;

    fn solve(&self, equation: &Equation, precision: f64) -> Result<Solution, SolveError> {
        self.solve_observed(equation, precision, &mut |_, _| {})
    }
}

#[enum_dispatch(Solver)]
#[derive(Debug, Clone, Copy)]
pub enum SolverEnum {
    ChordSolver,
    NewtonSolver,
    FixedPointIterationSolver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display)]
pub enum SolutionMethod {
    #[strum(serialize = "chord")]
    Chord,
    #[strum(serialize = "newton")]
    Newton,
    #[strum(serialize = "fixed-point", serialize = "fixed_point")]
    FixedPointIteration,
}

impl SolutionMethod {
    pub fn solver(&self, ctx: &NumericContext) -> SolverEnum {
        match self {
            SolutionMethod::Chord => ChordSolver::new(ctx).into(),
            SolutionMethod::Newton => NewtonSolver::new(ctx).into(),
            SolutionMethod::FixedPointIteration => FixedPointIterationSolver::new(ctx).into(),
        }
    }

    /// name used in reports
    pub fn title(&self) -> &'static str {
        match self {
            SolutionMethod::Chord => "Chord",
            SolutionMethod::Newton => "Newton",
            SolutionMethod::FixedPointIteration => "Fixed point iteration",
        }
    }
}
