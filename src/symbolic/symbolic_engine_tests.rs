use crate::error::DiffError;
use crate::numerical::numeric_context::NumericContext;
use crate::numerical::real::Real;
use crate::symbolic::symbolic_engine::{Expr, MathFn, NamedConst};
//___________________________________TESTS____________________________________

mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn x() -> Expr {
        Expr::Var("x".to_string())
    }

    #[test]
    fn test_neg() {
        let neg_expr = -x();
        let expected = Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(x()));
        assert_eq!(neg_expr, expected);
    }

    #[test]
    fn test_symbols() {
        let vars = Expr::Symbols("x1, x2");
        assert_eq!(
            vars,
            vec![Expr::Var("x1".to_string()), Expr::Var("x2".to_string())]
        );
    }

    #[test]
    fn test_free_symbols() {
        let expr = Expr::parse_expression("0.1*x1^2 + x1 + 0.2*x2^2 - 0.3").unwrap();
        let symbols: Vec<String> = expr.free_symbols().into_iter().collect();
        assert_eq!(symbols, vec!["x1".to_string(), "x2".to_string()]);
        assert!(expr.contains_variable("x2"));
        assert!(!expr.contains_variable("x"));
        assert!(Expr::Named(NamedConst::pi).free_symbols().is_empty());
    }

    fn ctx() -> NumericContext {
        NumericContext::default()
    }

    fn at(f: &crate::symbolic::symbolic_lambdify::Fn1D, x: f64) -> f64 {
        f(&ctx().real(x)).to_f64()
    }

    #[test]
    fn test_diff_polynomial() {
        let f = Expr::parse_expression("x**3 - x - 2").unwrap();
        let df = f.diff_simplified("x").unwrap();
        assert_eq!(df.to_string(), "((3 * (x ^ 2)) - 1)");
        let d2f = df.diff_simplified("x").unwrap();
        assert_eq!(d2f.to_string(), "(6 * x)");
    }

    #[test]
    fn test_diff_x_squared_minus_one() {
        let f = x().pow(Expr::Const(2.0)) - Expr::Const(1.0);
        let df = f.diff_simplified("x").unwrap();
        assert_eq!(df, Expr::Const(2.0) * x());
        assert_eq!(df.diff_simplified("x").unwrap(), Expr::Const(2.0));
    }

    #[test]
    fn test_partial_derivative() {
        let f = Expr::parse_expression("0.2*x1^2 + x2 + 0.1*x1*x2").unwrap();
        let df_dx2 = f.diff_simplified("x2").unwrap();
        let df_dx2 = df_dx2
            .lambdify_borrowed_thread_safe(&["x1", "x2"], &ctx())
            .unwrap();
        let value = df_dx2(&[ctx().real(2.0), ctx().real(5.0)]);
        assert_relative_eq!(value.to_f64(), 1.2, epsilon = 1e-15);
    }

    #[test]
    fn test_diff_against_finite_differences() {
        let cases = [
            "sqrt(x)",
            "cbrt(x)",
            "exp(2*x)",
            "exp2(x)",
            "log(x)",
            "ln(x)",
            "log10(x)",
            "log2(x)",
            "log1p(x)",
            "expm1(x)",
            "sin(x^2)",
            "cos(x)",
            "tan(x)",
            "asin(x)",
            "acos(x)",
            "atan(x)",
            "sinh(x)",
            "cosh(x)",
            "tanh(x)",
            "asinh(x)",
            "acosh(1 + x)",
            "atanh(x)",
            "fabs(x - 1)",
            "degrees(x)",
            "radians(x)",
            "x^x",
            "2^x",
            "x/(1 + x^2)",
            "pow(x, 3)",
            "hypot(x, 1)",
            "hypot(2, x^2)",
            "atan2(x, 1)",
            "atan2(2, x)",
        ];
        let ctx = ctx();
        let x0 = ctx.real(0.4);
        let h = ctx.real(1e-20);
        for case in cases {
            let f = Expr::parse_expression(case).unwrap();
            let f_fn = f.lambdify1D("x", &ctx).unwrap();
            let df_fn = f.diff_simplified("x").unwrap().lambdify1D("x", &ctx).unwrap();
            let numeric = (f_fn(&(&x0 + &h)) - f_fn(&(&x0 - &h))) / (&h + &h);
            assert_relative_eq!(
                df_fn(&x0).to_f64(),
                numeric.to_f64(),
                max_relative = 1e-15
            );
        }
    }

    #[test]
    fn test_derivative_constants_keep_full_precision() {
        let ctx = ctx();
        let f = Expr::parse_expression("log10(x)").unwrap();
        let df = f.diff_simplified("x").unwrap();
        assert_eq!(df.to_string(), "(1 / (x * ln(10)))");
        let df = df.lambdify1D("x", &ctx).unwrap();
        // d/dx log10(x) at x = 1 is 1 / ln(10) to all 69 digits
        let expected = &ctx.one() / &ctx.real(10.0).ln();
        assert_eq!(df(&ctx.one()), expected);
    }

    #[test]
    fn test_general_power_rule() {
        let f = Expr::parse_expression("x^x").unwrap();
        let df = f.diff_simplified("x").unwrap().lambdify1D("x", &ctx()).unwrap();
        assert_relative_eq!(at(&df, 2.0), 4.0 * (2.0_f64.ln() + 1.0), epsilon = 1e-14);
    }

    #[test]
    fn test_step_functions_are_not_differentiable() {
        let f = Expr::parse_expression("x + floor(x) - 2.5").unwrap();
        assert_eq!(
            f.diff("x"),
            Err(DiffError::NotDifferentiable {
                function: "floor".to_string()
            })
        );
        let g = x().apply_fn(MathFn::trunc);
        assert!(g.diff("x").is_err());
    }

    #[test]
    fn test_lambdify() {
        let f = Expr::parse_expression("x^3 - x - 2")
            .unwrap()
            .lambdify1D("x", &ctx())
            .unwrap();
        assert_eq!(at(&f, 2.0), 4.0);
        // integer powers of negative numbers stay real
        assert_eq!(at(&f, -2.0), -8.0);
        let g = Expr::parse_expression("x + y").unwrap();
        assert!(g.lambdify1D("x", &ctx()).is_err());
    }

    #[test]
    fn test_lambdify_evaluates_at_working_precision() {
        let ctx = ctx();
        // 0.1 is read as a decimal, so the sum is exactly representable to 69 digits
        let f = Expr::parse_expression("x + 0.1 + 0.2 - 0.3")
            .unwrap()
            .lambdify1D("x", &ctx)
            .unwrap();
        assert!(f(&ctx.zero()).abs() < ctx.real(1e-68));
        let g = Expr::parse_expression("sin(pi * x)")
            .unwrap()
            .lambdify1D("x", &ctx)
            .unwrap();
        assert!(g(&ctx.one()).abs() < ctx.real(1e-68));
        let pi: Real = NamedConst::pi.value(ctx.bits());
        assert!(ctx.format(&pi).starts_with("3.14159265358979323846264338327950288"));
    }
}
