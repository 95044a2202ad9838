/// arbitrary-precision real numbers
pub mod real;
/// significant-digit budget and finite-difference step shared by all numeric code
pub mod numeric_context;
/// central finite differences used when a symbolic derivative is unavailable
pub mod num_diff;
/// uniform sampling of [l, r] for sign, extremum and single-root checks
pub mod interval_sampler;
///  Example
/// ```
/// use RustedRoots::numerical::equation::Equation;
/// use RustedRoots::numerical::numeric_context::NumericContext;
/// let eq = Equation::from_str("x^3 - x - 2", 1.0, 2.0, &NumericContext::default()).unwrap();
/// assert_eq!(eq.df_str(), "((3 * (x ^ 2)) - 1)");
/// assert!(eq.check_single_root());
/// ```
pub mod equation;
/// systems in fixed-point form
pub mod equation_system;
/// built-in systems with starting points
pub mod presets;
/// chord, Newton and fixed-point iteration for a single equation
pub mod Scalar_solvers;
/// fixed-point iteration for systems
pub mod System_solvers;
/// pre-solve gates and the statistics table
pub mod solve_api;
