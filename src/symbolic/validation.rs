//! Validation pipeline for user-typed expressions.
//!
//! 1. normalize decimal commas and `^`
//! 2. character whitelist
//! 3. every called identifier must be a known function
//! 4. parse
//! 5. check the free symbols
use crate::error::ValidationError;
use crate::symbolic::parse_expr::parse_expression_func;
use crate::symbolic::symbolic_engine::{Expr, MathFn, MathFn2};
use log::debug;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;
use strum::IntoEnumIterator;

/// the only symbol allowed in a single-variable equation
pub const EQUATION_SYMBOL: &str = "x";

static ALLOWED_CHARACTERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9A-Za-z_+\-*/.,()\s]*$").expect("allowed characters pattern is valid")
});
static FUNCTION_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z_][A-Za-z0-9_]*)\s*\(").expect("function call pattern is valid")
});
static DECIMAL_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d),(\d)").expect("decimal comma pattern is valid"));

/// `,` between two digits is a decimal separator, `^` is power.
/// Arguments of `hypot`, `atan2` and `pow` are separated by `, ` or by a comma next to a name.
pub fn sanitize(input: &str) -> String {
    DECIMAL_COMMA
        .replace_all(input.trim(), "$1.$2")
        .replace('^', "**")
}

/// names accepted in front of an opening bracket
pub fn allowed_functions() -> BTreeSet<String> {
    MathFn::iter()
        .map(|f| f.to_string())
        .chain(MathFn2::iter().map(|f| f.to_string()))
        .chain(std::iter::once("pow".to_string()))
        .collect()
}

/// Steps 1-4: returns the parsed expression, any free symbols are allowed.
pub fn validate_expression(input: &str) -> Result<Expr, ValidationError> {
    let sanitized = sanitize(input);

    if !ALLOWED_CHARACTERS.is_match(&sanitized) {
        let bad: String = sanitized
            .chars()
            .filter(|c| {
                !(c.is_ascii_alphanumeric() || c.is_whitespace() || "_+-*/.,()".contains(*c))
            })
            .collect();
        return Err(ValidationError::InvalidCharacters(format!(
            "'{}' in '{}'",
            bad, input
        )));
    }

    let functions = allowed_functions();
    for capture in FUNCTION_CALL.captures_iter(&sanitized) {
        let name = &capture[1];
        if !functions.contains(name) {
            return Err(ValidationError::InvalidCharacters(format!(
                "unknown function '{}' in '{}'",
                name, input
            )));
        }
    }

    let expr = parse_expression_func(&sanitized)
        .map_err(|e| ValidationError::InvalidFormat(format!("{} in '{}'", e, input)))?;
    debug!("parsed '{}' into {}", input, expr);
    Ok(expr)
}

/// Free symbols must be exactly `{var}`; a constant expression is rejected too.
pub fn check_single_variable(expr: &Expr, var: &str) -> Result<(), ValidationError> {
    let symbols = expr.free_symbols();
    if symbols.len() == 1 && symbols.contains(var) {
        Ok(())
    } else {
        Err(ValidationError::InvalidVariables {
            found: symbols.into_iter().collect(),
            expected: vec![var.to_string()],
        })
    }
}

/// Full pipeline for single-variable equations in `x`.
pub fn validate_and_parse_equation(input: &str) -> Result<Expr, ValidationError> {
    let expr = validate_expression(input)?;
    check_single_variable(&expr, EQUATION_SYMBOL)?;
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize(" 0,5*x^2 "), "0.5*x**2");
        // argument separators are left alone
        assert_eq!(sanitize("atan2(x,1)"), "atan2(x,1)");
        assert_eq!(sanitize("hypot(2, x)"), "hypot(2, x)");
        assert_eq!(sanitize("pow(x, 0,5)"), "pow(x, 0.5)");
    }

    #[test]
    fn test_valid_equation() {
        let expr = validate_and_parse_equation("x^3 - x - 2").unwrap();
        assert_eq!(expr.to_string(), "(((x ^ 3) - x) - 2)");
        assert!(validate_and_parse_equation("sqrt(x) + log10(x) - tau").is_ok());
    }

    #[test]
    fn test_invalid_characters() {
        assert!(matches!(
            validate_and_parse_equation("x + 1; rm"),
            Err(ValidationError::InvalidCharacters(_))
        ));
        assert!(matches!(
            validate_and_parse_equation("x = 1"),
            Err(ValidationError::InvalidCharacters(_))
        ));
    }

    #[test]
    fn test_function_whitelist() {
        assert!(matches!(
            validate_and_parse_equation("__import__(x)"),
            Err(ValidationError::InvalidCharacters(_))
        ));
        assert!(matches!(
            validate_and_parse_equation("inf(x)"),
            Err(ValidationError::InvalidCharacters(_))
        ));
        assert!(matches!(
            validate_and_parse_equation("pi(x)"),
            Err(ValidationError::InvalidCharacters(_))
        ));
        let names = allowed_functions();
        assert!(names.contains("sin") && names.contains("floor") && names.contains("log1p"));
        assert!(!names.contains("nan"));
    }

    #[test]
    fn test_whitelist_boundary() {
        for accepted in [
            "cbrt(x) - 1",
            "exp2(x) - 3",
            "pow(x, 3) - 2",
            "hypot(x, 1) - 2",
            "atan2(x, 1) - 0,5",
            "hypot(x,1) - 2",
        ] {
            assert!(
                validate_and_parse_equation(accepted).is_ok(),
                "{} should be accepted",
                accepted
            );
        }
        // outside the supported subset of the math library
        for rejected in ["gamma(x)", "erf(x)", "factorial(x)", "comb(x, 2)", "isqrt(x)"] {
            assert!(matches!(
                validate_and_parse_equation(rejected),
                Err(ValidationError::InvalidCharacters(_))
            ));
        }
        // known name, wrong arity
        assert!(matches!(
            validate_and_parse_equation("hypot(x)"),
            Err(ValidationError::InvalidFormat(_))
        ));
        let names = allowed_functions();
        for name in ["cbrt", "exp2", "pow", "hypot", "atan2"] {
            assert!(names.contains(name));
        }
    }

    #[test]
    fn test_invalid_format() {
        assert!(matches!(
            validate_and_parse_equation("x + * 2"),
            Err(ValidationError::InvalidFormat(_))
        ));
        assert!(matches!(
            validate_and_parse_equation("sin(x"),
            Err(ValidationError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_invalid_variables() {
        match validate_and_parse_equation("x + y") {
            Err(ValidationError::InvalidVariables { found, .. }) => {
                assert_eq!(found, vec!["x".to_string(), "y".to_string()])
            }
            other => panic!("unexpected result {:?}", other),
        }
        // constant expressions have no variable at all
        assert!(matches!(
            validate_and_parse_equation("2 + 2"),
            Err(ValidationError::InvalidVariables { .. })
        ));
        assert!(validate_expression("x1 + x2").is_ok());
    }
}
