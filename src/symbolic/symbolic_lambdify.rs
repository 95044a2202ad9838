use crate::error::ValidationError;
use crate::numerical::numeric_context::NumericContext;
use crate::numerical::real::Real;
use crate::symbolic::symbolic_engine::Expr;
use std::sync::Arc;

/// Compiled function of one argument, shareable between equation parts.
pub type Fn1D = Arc<dyn Fn(&Real) -> Real + Send + Sync>;
/// Compiled function of several arguments, ordered as the `vars` slice it was built with.
pub type FnND = Arc<dyn Fn(&[Real]) -> Real + Send + Sync>;

type Compiled = Box<dyn Fn(&[Real]) -> Real + Send + Sync>;

impl Expr {
    /// LAMBDIFICATION - Converting Symbolic Expressions to Executable Functions

    /// Converts the expression into a closure of one argument `var`, evaluated with the
    /// precision of `ctx`. Literals are read as decimals, `pi` and `e` are computed to the
    /// working precision.
    ///
    /// Fails if the expression references any other symbol.
    ///
    /// # Examples
    /// ```rust, ignore
    /// let ctx = NumericContext::default();
    /// let x = Expr::Var("x".to_string());
    /// let f = x.pow(Expr::Const(2.0)); // x^2
    /// let func = f.lambdify1D("x", &ctx).unwrap();
    /// assert_eq!(func(&ctx.real(3.0)).to_f64(), 9.0);
    /// ```
    pub fn lambdify1D(&self, var: &str, ctx: &NumericContext) -> Result<Fn1D, ValidationError> {
        let compiled_func = self.lambdify_borrowed_thread_safe(&[var], ctx)?;
        Ok(Arc::new(move |x: &Real| compiled_func(std::slice::from_ref(x))))
    }

    /// Converts the expression into a closure over an argument slice ordered as `vars`.
    pub fn lambdify_borrowed_thread_safe(
        &self,
        vars: &[&str],
        ctx: &NumericContext,
    ) -> Result<FnND, ValidationError> {
        let unknown: Vec<String> = self
            .free_symbols()
            .into_iter()
            .filter(|s| !vars.contains(&s.as_str()))
            .collect();
        if !unknown.is_empty() {
            return Err(ValidationError::InvalidVariables {
                found: unknown,
                expected: vars.iter().map(|v| v.to_string()).collect(),
            });
        }
        Ok(Arc::from(self.lambdify1(vars, ctx)))
    }

    // every symbol is known to be in `vars` here
    fn lambdify1(&self, vars: &[&str], ctx: &NumericContext) -> Compiled {
        match self {
            Expr::Var(name) => match vars.iter().position(|&x| x == name.as_str()) {
                Some(index) => Box::new(move |args| args[index].clone()),
                None => {
                    let nan = Real::nan(ctx.bits());
                    Box::new(move |_| nan.clone())
                }
            },
            Expr::Const(val) => {
                let val = ctx.real(*val);
                Box::new(move |_| val.clone())
            }
            Expr::Named(constant) => {
                let val = constant.value(ctx.bits());
                Box::new(move |_| val.clone())
            }
            Expr::Add(lhs, rhs) => {
                let lhs_fn = lhs.lambdify1(vars, ctx);
                let rhs_fn = rhs.lambdify1(vars, ctx);
                Box::new(move |args| lhs_fn(args) + rhs_fn(args))
            }
            Expr::Sub(lhs, rhs) => {
                let lhs_fn = lhs.lambdify1(vars, ctx);
                let rhs_fn = rhs.lambdify1(vars, ctx);
                Box::new(move |args| lhs_fn(args) - rhs_fn(args))
            }
            Expr::Mul(lhs, rhs) => {
                let lhs_fn = lhs.lambdify1(vars, ctx);
                let rhs_fn = rhs.lambdify1(vars, ctx);
                Box::new(move |args| lhs_fn(args) * rhs_fn(args))
            }
            Expr::Div(lhs, rhs) => {
                let lhs_fn = lhs.lambdify1(vars, ctx);
                let rhs_fn = rhs.lambdify1(vars, ctx);
                Box::new(move |args| lhs_fn(args) / rhs_fn(args))
            }
            Expr::Pow(base, exp) => {
                let base_fn = base.lambdify1(vars, ctx);
                match exp.as_ref() {
                    // integer exponents keep negative bases real: (-2)^3 = -8
                    Expr::Const(n) if n.fract() == 0.0 && n.abs() <= i32::MAX as f64 => {
                        let n = *n as i64;
                        Box::new(move |args| base_fn(args).powi(n))
                    }
                    _ => {
                        let exp_fn = exp.lambdify1(vars, ctx);
                        Box::new(move |args| base_fn(args).pow(&exp_fn(args)))
                    }
                }
            }
            Expr::Func(func, arg) => {
                let func = *func;
                let arg_fn = arg.lambdify1(vars, ctx);
                Box::new(move |args| func.apply(&arg_fn(args)))
            }
            Expr::Func2(func, a, b) => {
                let func = *func;
                let a_fn = a.lambdify1(vars, ctx);
                let b_fn = b.lambdify1(vars, ctx);
                Box::new(move |args| func.apply(&a_fn(args), &b_fn(args)))
            }
        }
    }
}
