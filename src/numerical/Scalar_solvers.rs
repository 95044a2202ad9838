pub mod chord;
pub mod fixed_point;
pub mod newton;
///  Example
/// ```
/// use RustedRoots::numerical::equation::Equation;
/// use RustedRoots::numerical::numeric_context::NumericContext;
/// use RustedRoots::numerical::Scalar_solvers::solver_traits::{SolutionMethod, Solver};
/// let ctx = NumericContext::default();
/// let eq = Equation::from_str("x^3 - x - 2", 1.0, 2.0, &ctx).unwrap();
/// let solver = SolutionMethod::Newton.solver(&ctx);
/// assert!(solver.check_convergence(&eq));
/// let solution = solver.solve(&eq, 1e-6).unwrap();
/// assert!((solution.x.to_f64() - 1.5213797).abs() < 1e-5);
/// ```
pub mod solver_traits;
