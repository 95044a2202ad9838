#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// a module turns a String expression into a symbolic expression
///
///# Example
/// ```
/// use RustedRoots::numerical::numeric_context::NumericContext;
/// use RustedRoots::symbolic::symbolic_engine::Expr;
/// let ctx = NumericContext::default();
/// let input = "x^3 - x - 2";
/// let parsed_expression = Expr::parse_expression(input).unwrap();
/// println!(" parsed_expression {}", parsed_expression);
/// let parsed_function = parsed_expression.lambdify1D("x", &ctx).unwrap();
/// println!("{}, Rust function: {}  \n", input, parsed_function(&ctx.real(2.0)));
/// ```
/// ________________________________________________________________________________________________________________________________
pub mod parse_expr;
///____________________________________________________________________________________________________________________________
/// # Symbolic engine
/// a module
/// 1) keeps the expression tree `Expr` and the whitelist of functions `MathFn`, `MathFn2`
/// 2) differentiates expressions analytically
/// 3) turns a symbolic expression into a Rust function
///# Example
/// ```
/// use RustedRoots::numerical::numeric_context::NumericContext;
/// use RustedRoots::symbolic::symbolic_engine::Expr;
/// let ctx = NumericContext::default();
/// let f = Expr::parse_expression("x^2 - 1").unwrap();
/// // differentiate with respect to x
/// let df_dx = f.diff_simplified("x").unwrap();
/// assert_eq!(df_dx.to_string(), "(2 * x)");
/// // convert symbolic expression to a Rust function and evaluate the function
/// let df = df_dx.lambdify1D("x", &ctx).unwrap();
/// assert_eq!(df(&ctx.real(3.0)).to_f64(), 6.0);
/// ```
/// ________________________________________________________________________________________________________________________________________________
pub mod symbolic_engine;
pub mod symbolic_engine_derivatives;
pub mod symbolic_lambdify;
pub mod symbolic_simplify;
///______________________________________________________________________________________________________________________________________________
/// checks user input before it is parsed: allowed characters, known functions, variables
/// ```
/// use RustedRoots::symbolic::validation::validate_and_parse_equation;
/// assert!(validate_and_parse_equation("x^3 - x - 2").is_ok());
/// assert!(validate_and_parse_equation("x + y").is_err());
/// ```
/// _____________________________________________________________________________________________________________________________________________
pub mod validation;
#[cfg(test)]
mod symbolic_engine_tests;
