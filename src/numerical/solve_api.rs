//! Entry points that run the pre-solve gates before handing the problem to a solver.
//!
//! The gates, in order: the precision must be usable, a single equation must have exactly
//! one root on its interval, and the method's convergence precondition must hold. The last
//! gate only warns when `Settings::force_solve` is on.
use crate::error::SolveError;
use crate::Utils::settings::Settings;
use crate::numerical::Scalar_solvers::solver_traits::{Solution, SolutionMethod, Solver};
use crate::numerical::System_solvers::system_solver_traits::{
    SystemSolution, SystemSolutionMethod, SystemSolver,
};
use crate::numerical::equation::Equation;
use crate::numerical::equation_system::{EquationSystem, EquationSystemSolution};
use crate::numerical::real::Real;
use log::{info, warn};
use tabled::{builder::Builder, settings::Style};

pub fn solve_equation(
    equation: &Equation,
    method: SolutionMethod,
    settings: &Settings,
    observer: &mut dyn FnMut(&Real, usize),
) -> Result<Solution, SolveError> {
    let ctx = settings.numeric_context()?;
    ctx.check_precision(settings.precision)?;
    if !equation.check_single_root() {
        return Err(SolveError::NotExactlyOneRoot);
    }
    let solver = method.solver(&ctx);
    if !solver.check_convergence(equation) {
        if settings.force_solve {
            warn!(
                "convergence condition of the {} method is not satisfied, solving anyway",
                method.title()
            );
        } else {
            return Err(SolveError::DoesNotConverge {
                method: method.title().to_string(),
            });
        }
    }
    let solution = solver.solve_observed(equation, settings.precision, observer)?;
    statistics(vec![
        ("method", method.title().to_string()),
        ("precision", format!("{:e}", settings.precision)),
        ("iterations", solution.iterations.to_string()),
        ("x", ctx.format(&solution.x)),
        ("f(x)", ctx.format(&equation.f(&solution.x))),
        (
            "approximate derivatives",
            equation.is_derivative_approximate().to_string(),
        ),
    ]);
    Ok(solution)
}

pub fn solve_system(
    system: &EquationSystem,
    start: &EquationSystemSolution,
    method: SystemSolutionMethod,
    settings: &Settings,
    observer: &mut dyn FnMut(&EquationSystemSolution, usize),
) -> Result<SystemSolution, SolveError> {
    let ctx = settings.numeric_context()?;
    ctx.check_precision(settings.precision)?;
    let solver = method.solver(&ctx);
    if !solver.check_convergence(system, start)? {
        if settings.force_solve {
            warn!("convergence condition is not satisfied at the starting point, solving anyway");
        } else {
            return Err(SolveError::DoesNotConverge {
                method: method.title().to_string(),
            });
        }
    }
    let result = solver.solve_observed(system, start, settings.precision, observer)?;
    let mut stats = vec![
        ("method", method.title().to_string()),
        ("precision", format!("{:e}", settings.precision)),
        ("iterations", result.iterations.to_string()),
    ];
    let residual = system.max_residual(&result.solution);
    stats.push(("max |residual|", ctx.format(&residual)));
    statistics(stats);
    Ok(result)
}

fn statistics(rows: Vec<(&str, String)>) {
    let mut builder = Builder::default();
    for (key, value) in rows {
        builder.push_record([key.to_string(), value]);
    }
    let mut table = builder.build();
    table.with(Style::modern_rounded());
    info!("\n \n CALC STATISTICS \n \n {}", table);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::numerical::numeric_context::NumericContext;
    use crate::numerical::presets::SystemPreset;
    use approx::assert_relative_eq;
    use strum::IntoEnumIterator;

    fn equation(f: &str, l: f64, r: f64) -> Equation {
        Equation::from_str(f, l, r, &NumericContext::default()).unwrap()
    }

    #[test]
    fn test_newton_and_chord_agree() {
        let settings = Settings::default();
        let eq = equation("x^3 - x - 2", 1.0, 2.0);
        let newton =
            solve_equation(&eq, SolutionMethod::Newton, &settings, &mut |_, _| {}).unwrap();
        let chord = solve_equation(&eq, SolutionMethod::Chord, &settings, &mut |_, _| {}).unwrap();
        assert_relative_eq!(newton.x.to_f64(), 1.5214, epsilon = 1e-4);
        let gap = (&newton.x - &chord.x).abs();
        assert!(gap <= NumericContext::default().real(2.0 * settings.precision));
    }

    #[test]
    fn test_single_root_gate() {
        let settings = Settings::default();
        // f(l) and f(r) share sign
        let eq = equation("x^2 - 1", 2.0, 3.0);
        for method in SolutionMethod::iter() {
            assert_eq!(
                solve_equation(&eq, method, &settings, &mut |_, _| {}),
                Err(SolveError::NotExactlyOneRoot)
            );
        }
    }

    #[test]
    fn test_force_solve() {
        let eq = equation("sin(x)", 3.0, 3.5);
        let settings = Settings {
            precision: 1e-6,
            ..Settings::default()
        };
        assert!(matches!(
            solve_equation(&eq, SolutionMethod::Newton, &settings, &mut |_, _| {}),
            Err(SolveError::DoesNotConverge { .. })
        ));
        let forced = Settings {
            force_solve: true,
            ..settings
        };
        let solution =
            solve_equation(&eq, SolutionMethod::Newton, &forced, &mut |_, _| {}).unwrap();
        assert_relative_eq!(solution.x.to_f64(), std::f64::consts::PI, epsilon = 1e-8);
    }

    #[test]
    fn test_bad_precision() {
        let eq = equation("x^3 - x - 2", 1.0, 2.0);
        let settings = Settings {
            precision: -1.0,
            ..Settings::default()
        };
        assert!(matches!(
            solve_equation(&eq, SolutionMethod::Chord, &settings, &mut |_, _| {}),
            Err(SolveError::Validation(ValidationError::InvalidPrecision(_)))
        ));
    }

    #[test]
    fn test_tight_precision_still_terminates() {
        let eq = equation("x^3 - x - 2", 1.0, 2.0);
        let settings = Settings {
            precision: 1e-30,
            ..Settings::default()
        };
        for method in SolutionMethod::iter() {
            assert!(solve_equation(&eq, method, &settings, &mut |_, _| {}).is_ok());
        }
    }

    #[test]
    fn test_reported_root_has_every_digit() {
        let settings = Settings {
            precision: 1e-25,
            ..Settings::default()
        };
        let ctx = settings.numeric_context().unwrap();
        let eq = Equation::from_str("x^2 - 2", 1.0, 2.0, &ctx).unwrap();
        let solution =
            solve_equation(&eq, SolutionMethod::Newton, &settings, &mut |_, _| {}).unwrap();
        let digits = ctx.format(&solution.x);
        assert!(digits.starts_with("1.41421356237309504880168872"));
        assert!(digits.len() > 30);
    }

    #[test]
    fn test_solve_preset_system() {
        let ctx = NumericContext::default();
        let preset = SystemPreset::QuadraticPair;
        let system = preset.system(&ctx).unwrap();
        let mut count = 0;
        let result = solve_system(
            &system,
            &preset.starting_point(&ctx),
            SystemSolutionMethod::FixedPointIteration,
            &Settings::default(),
            &mut |_, _| count += 1,
        )
        .unwrap();
        assert_eq!(count, result.iterations);
        assert!(system.max_residual(&result.solution) < ctx.real(1e-3));
    }
}
