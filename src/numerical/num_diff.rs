//! Central finite differences, the fallback when a symbolic derivative does not exist.
use crate::numerical::real::Real;
use crate::symbolic::symbolic_lambdify::{Fn1D, FnND};
use std::sync::Arc;

/// (f(x+h) - f(x-h)) / 2h
pub fn central_first(f: &dyn Fn(&Real) -> Real, x: &Real, h: &Real) -> Real {
    let two_h = h + h;
    (f(&(x + h)) - f(&(x - h))) / two_h
}

/// (f(x+h) - 2f(x) + f(x-h)) / h^2
pub fn central_second(f: &dyn Fn(&Real) -> Real, x: &Real, h: &Real) -> Real {
    let fx = f(x);
    (f(&(x + h)) - &fx - &fx + f(&(x - h))) / (h * h)
}

pub fn first_derivative_fn(f: Fn1D, h: Real) -> Fn1D {
    Arc::new(move |x: &Real| central_first(f.as_ref(), x, &h))
}

pub fn second_derivative_fn(f: Fn1D, h: Real) -> Fn1D {
    Arc::new(move |x: &Real| central_second(f.as_ref(), x, &h))
}

/// central difference along one coordinate of a function of several variables
pub fn partial_derivative_fn(f: FnND, index: usize, h: Real) -> FnND {
    Arc::new(move |args: &[Real]| {
        let mut shifted = args.to_vec();
        shifted[index] = &args[index] + &h;
        let forward = f(&shifted);
        shifted[index] = &args[index] - &h;
        let backward = f(&shifted);
        (forward - backward) / (&h + &h)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical::numeric_context::NumericContext;
    use approx::assert_relative_eq;

    #[test]
    fn test_central_differences() {
        let ctx = NumericContext::default();
        let f = |x: &Real| x.powi(3);
        let (x, h) = (ctx.real(2.0), ctx.fd_step());
        assert_relative_eq!(central_first(&f, &x, &h).to_f64(), 12.0, epsilon = 1e-6);
        assert_relative_eq!(central_second(&f, &x, &h).to_f64(), 12.0, epsilon = 1e-6);
    }

    #[test]
    fn test_derivative_closures() {
        let ctx = NumericContext::default();
        let f: Fn1D = Arc::new(|x: &Real| x.sin());
        let df = first_derivative_fn(f.clone(), ctx.fd_step());
        let d2f = second_derivative_fn(f, ctx.fd_step());
        let x = ctx.real(0.3);
        assert_relative_eq!(df(&x).to_f64(), 0.3_f64.cos(), epsilon = 1e-7);
        assert_relative_eq!(d2f(&x).to_f64(), -(0.3_f64.sin()), epsilon = 1e-7);
    }

    #[test]
    fn test_partial_derivative() {
        let ctx = NumericContext::default();
        let f: FnND = Arc::new(|args: &[Real]| &(&args[0] * &args[0]) * &args[1]);
        let df_dy = partial_derivative_fn(f.clone(), 1, ctx.fd_step());
        let df_dx = partial_derivative_fn(f, 0, ctx.fd_step());
        let point = [ctx.real(3.0), ctx.real(2.0)];
        assert_relative_eq!(df_dy(&point).to_f64(), 9.0, epsilon = 1e-8);
        assert_relative_eq!(df_dx(&point).to_f64(), 12.0, epsilon = 1e-6);
    }
}
