//! Solvers for systems written in fixed-point form.
///  Example
/// ```
/// use RustedRoots::numerical::numeric_context::NumericContext;
/// use RustedRoots::numerical::presets::SystemPreset;
/// use RustedRoots::numerical::System_solvers::system_solver_traits::{SystemSolutionMethod, SystemSolver};
/// let ctx = NumericContext::default();
/// let preset = SystemPreset::QuadraticPair;
/// let system = preset.system(&ctx).unwrap();
/// let result = SystemSolutionMethod::FixedPointIteration
///     .solver(&ctx)
///     .solve(&system, &preset.starting_point(&ctx), 1e-4)
///     .unwrap();
/// assert!(system.max_residual(&result.solution) < ctx.real(1e-3));
/// ```
pub mod fixed_point_system;
pub mod system_solver_traits;
