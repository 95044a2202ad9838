//! Scanning of a closed interval at a fixed resolution.
//!
//! All interval-wide checks of the solvers (sign preservation of derivatives, the maximum of
//! |f'| for the fixed-point transform, the single root heuristic) look at the same
//! `SUBDIVISIONS + 1` points `x_i = l + i * (r - l) / SUBDIVISIONS`. Points are computed from
//! the index, so the last one is exactly `r`.
use crate::numerical::real::Real;

/// number of equal subdivisions of the interval
pub const SUBDIVISIONS: usize = 1000;

/// true when both values are strictly positive or both strictly negative
pub fn signs_equal(a: &Real, b: &Real) -> bool {
    (a.is_positive() && b.is_positive()) || (a.is_negative() && b.is_negative())
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntervalSampler {
    l: Real,
    r: Real,
}

impl IntervalSampler {
    pub fn new(l: Real, r: Real) -> Self {
        IntervalSampler { l, r }
    }

    pub fn point(&self, i: usize) -> Real {
        if i == SUBDIVISIONS {
            return self.r.clone();
        }
        let bits = self.l.bits();
        let fraction = Real::from_f64(i as f64, bits) / Real::from_f64(SUBDIVISIONS as f64, bits);
        &self.l + &(&(&self.r - &self.l) * &fraction)
    }

    pub fn points(&self) -> impl Iterator<Item = Real> + '_ {
        (0..=SUBDIVISIONS).map(move |i| self.point(i))
    }

    /// every adjacent pair of samples of `g` has strictly the same sign
    pub fn keeps_sign(&self, g: &dyn Fn(&Real) -> Real) -> bool {
        let values: Vec<Real> = self.points().map(|x| g(&x)).collect();
        values.windows(2).all(|w| signs_equal(&w[0], &w[1]))
    }

    pub fn max_in_interval(&self, g: &dyn Fn(&Real) -> Real) -> Real {
        self.points().skip(1).fold(g(&self.l), |acc, x| acc.max(g(&x)))
    }

    pub fn min_in_interval(&self, g: &dyn Fn(&Real) -> Real) -> Real {
        self.points().skip(1).fold(g(&self.l), |acc, x| acc.min(g(&x)))
    }

    /// Heuristic: does `f` have exactly one root in the interval?
    ///
    /// Ends must differ in sign. A monotone `f` (sign-preserving `df`) has one root, otherwise
    /// the samples of `f` may change sign at most once.
    pub fn check_single_root(
        &self,
        f: &dyn Fn(&Real) -> Real,
        df: &dyn Fn(&Real) -> Real,
    ) -> bool {
        if signs_equal(&f(&self.l), &f(&self.r)) {
            return false;
        }
        if self.keeps_sign(df) {
            return true;
        }
        let values: Vec<Real> = self.points().map(|x| f(&x)).collect();
        let sign_changes = values
            .windows(2)
            .filter(|w| !signs_equal(&w[0], &w[1]))
            .count();
        sign_changes <= 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical::numeric_context::NumericContext;
    use approx::assert_relative_eq;

    fn sampler(l: f64, r: f64) -> (IntervalSampler, NumericContext) {
        let ctx = NumericContext::default();
        (IntervalSampler::new(ctx.real(l), ctx.real(r)), ctx)
    }

    #[test]
    fn test_signs_equal() {
        let ctx = NumericContext::default();
        let r = |v: f64| ctx.real(v);
        assert!(signs_equal(&r(1.0), &r(2.0)));
        assert!(signs_equal(&r(-1.0), &r(-0.5)));
        assert!(!signs_equal(&r(-1.0), &r(2.0)));
        assert!(!signs_equal(&r(0.0), &r(0.0)));
        assert!(!signs_equal(&r(0.0), &r(1.0)));
        assert!(!signs_equal(&r(f64::NAN), &r(1.0)));
    }

    #[test]
    fn test_points() {
        let (sampler, ctx) = sampler(1.0, 2.0);
        let points: Vec<Real> = sampler.points().collect();
        assert_eq!(points.len(), SUBDIVISIONS + 1);
        assert_eq!(points[0], ctx.real(1.0));
        assert_eq!(points[SUBDIVISIONS], ctx.real(2.0));
        assert_eq!(points[500], ctx.real(1.5));
        assert_relative_eq!(points[1].to_f64(), 1.001, epsilon = 1e-15);
    }

    #[test]
    fn test_keeps_sign() {
        let (sampler, ctx) = sampler(1.0, 2.0);
        let one = ctx.one();
        let three = ctx.real(3.0);
        assert!(sampler.keeps_sign(&|x| &(&three * &(x * x)) - &one));
        let mid = ctx.real(1.5);
        assert!(!sampler.keeps_sign(&|x| x - &mid));
        // an exact zero on an end point breaks sign preservation
        assert!(!sampler.keeps_sign(&|x| x - &one));
    }

    #[test]
    fn test_extrema() {
        let (wide, ctx) = sampler(-1.0, 2.0);
        assert_relative_eq!(wide.max_in_interval(&|x| x * x).to_f64(), 4.0);
        let (symmetric, _) = sampler(-1.0, 1.0);
        assert!(symmetric.min_in_interval(&|x| x * x).is_zero());
        let (flat, _) = sampler(3.0, 3.0);
        let two = ctx.real(2.0);
        assert_eq!(flat.max_in_interval(&|x| &two * x), ctx.real(6.0));
    }

    #[test]
    fn test_single_root() {
        let ctx = NumericContext::default();
        let c = |v: f64| ctx.real(v);
        let cubic = |x: &Real| &(&x.powi(3) - x) - &c(2.0);
        let d_cubic = |x: &Real| &(&c(3.0) * &(x * x)) - &c(1.0);
        let (s, _) = sampler(1.0, 2.0);
        assert!(s.check_single_root(&cubic, &d_cubic));
        // same sign on both ends
        let square = |x: &Real| &(x * x) - &c(1.0);
        let d_square = |x: &Real| &c(2.0) * x;
        let (s, _) = sampler(-2.0, 2.0);
        assert!(!s.check_single_root(&square, &d_square));
        // three roots, ends of different sign
        let (s, _) = sampler(-2.0, 2.5);
        assert!(!s.check_single_root(&|x: &Real| &x.powi(3) - x, &d_cubic));
        let (s, _) = sampler(3.0, 3.5);
        assert!(s.check_single_root(&|x: &Real| x.sin(), &|x: &Real| x.cos()));
        // derivative changes sign but f crosses zero once
        let (s, _) = sampler(-0.5, 2.1);
        assert!(s.check_single_root(&square, &d_square));
    }
}
