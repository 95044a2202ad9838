//! Arbitrary-precision real numbers used by every numeric part of the crate.
//!
//! `Real` is a binary floating point number with a mantissa of `bits` bits (`astro-float`'s
//! `BigFloat`). The precision is picked by `NumericContext` from the significant-digit budget
//! and travels with every value; an operation on two values keeps the larger precision.
//! Like `f64`, invalid operations give NaN and division by zero gives an infinity, so
//! lambdified expressions never panic.
//!
//! ```
//! use RustedRoots::numerical::real::Real;
//! let two = Real::from_f64(2.0, 256);
//! let root = two.sqrt();
//! let back = &root * &root;
//! assert!((&back - &two).abs() < Real::from_f64(1e-70, 256));
//! ```
use astro_float::{BigFloat, Consts, RoundingMode};
use std::cell::RefCell;
use std::cmp::Ordering;
use std::f64::consts::LOG10_2;
use std::fmt;

pub const ROUNDING: RoundingMode = RoundingMode::ToEven;

thread_local! {
    /// cache of pi, e, ln 2 ... used by the transcendental functions
    static CONSTS: RefCell<Option<Consts>> = RefCell::new(Consts::new().ok());
}

#[derive(Clone, Debug)]
pub struct Real {
    value: BigFloat,
    bits: usize,
}

/// sign, digits `d1 d2 ...` and exponent `e` of `0.d1d2... * 10^e`, no leading or trailing zeros
#[derive(Debug, Clone, PartialEq)]
struct DecimalParts {
    negative: bool,
    digits: Vec<u8>,
    point: i64,
}

impl DecimalParts {
    /// reads `[-]ddd[.ddd][e[+-]ddd]`
    fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (negative, body) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };
        let (mantissa, exponent) = match body.find(['e', 'E']) {
            Some(pos) => (&body[..pos], body[pos + 1..].parse::<i64>().ok()?),
            None => (body, 0),
        };
        let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        if !int_part
            .chars()
            .chain(frac_part.chars())
            .all(|c| c.is_ascii_digit())
        {
            return None;
        }
        let mut digits: Vec<u8> = int_part
            .bytes()
            .chain(frac_part.bytes())
            .map(|b| b - b'0')
            .collect();
        let mut point = exponent + int_part.len() as i64;
        let leading = digits.iter().take_while(|&&d| d == 0).count();
        digits.drain(..leading);
        point -= leading as i64;
        while digits.last() == Some(&0) {
            digits.pop();
        }
        if digits.is_empty() {
            point = 0;
        }
        Some(DecimalParts {
            negative,
            digits,
            point,
        })
    }

    /// round half up to at most `n` significant digits
    fn round(mut self, n: usize) -> Self {
        let n = n.max(1);
        if self.digits.len() <= n {
            return self;
        }
        let round_up = self.digits[n] >= 5;
        self.digits.truncate(n);
        if round_up {
            let mut i = n;
            loop {
                if i == 0 {
                    self.digits.insert(0, 1);
                    self.digits.truncate(n);
                    self.point += 1;
                    break;
                }
                i -= 1;
                if self.digits[i] == 9 {
                    self.digits[i] = 0;
                } else {
                    self.digits[i] += 1;
                    break;
                }
            }
        }
        while self.digits.last() == Some(&0) {
            self.digits.pop();
        }
        self
    }

    fn digit_string(&self) -> String {
        self.digits.iter().map(|d| char::from(b'0' + d)).collect()
    }

    /// fixed notation for moderate magnitudes, scientific otherwise
    fn render(&self, n: usize) -> String {
        if self.digits.is_empty() {
            return "0".to_string();
        }
        let sign = if self.negative { "-" } else { "" };
        let magnitude = self.point - 1;
        let digits = self.digit_string();
        if (-5..n.max(1) as i64).contains(&magnitude) {
            let len = digits.len() as i64;
            let body = if self.point <= 0 {
                format!("0.{}{}", "0".repeat((-self.point) as usize), digits)
            } else if self.point >= len {
                format!("{}{}", digits, "0".repeat((self.point - len) as usize))
            } else {
                let (int, frac) = digits.split_at(self.point as usize);
                format!("{}.{}", int, frac)
            };
            format!("{}{}", sign, body)
        } else {
            let (first, rest) = digits.split_at(1);
            if rest.is_empty() {
                format!("{}{}e{}", sign, first, magnitude)
            } else {
                format!("{}{}.{}e{}", sign, first, rest, magnitude)
            }
        }
    }
}

impl Real {
    /// exact binary value of `value`
    pub fn from_f64(value: f64, bits: usize) -> Self {
        Real {
            value: BigFloat::from_f64(value, bits),
            bits,
        }
    }

    /// The decimal number `value` was written as: `0.1` becomes 0.1 to the full precision
    /// rather than the binary neighbour of 0.1 an `f64` holds.
    pub fn from_decimal(value: f64, bits: usize) -> Self {
        if !value.is_finite() || (value.fract() == 0.0 && value.abs() < 9.0e15) {
            return Real::from_f64(value, bits);
        }
        // `{:e}` prints the shortest digits that round-trip, e.g. "1.5e-7"
        match DecimalParts::parse(&format!("{:e}", value)) {
            Some(parts) => Real::from_parts(&parts, bits),
            None => Real::from_f64(value, bits),
        }
    }

    /// decimal literal with any number of digits, `None` when `text` is not a number
    pub fn parse(text: &str, bits: usize) -> Option<Self> {
        DecimalParts::parse(text).map(|parts| Real::from_parts(&parts, bits))
    }

    fn from_parts(parts: &DecimalParts, bits: usize) -> Self {
        let mut mantissa = Real::zero(bits);
        let ten = Real::from_f64(10.0, bits);
        for d in &parts.digits {
            mantissa = &(&mantissa * &ten) + &Real::from_f64(*d as f64, bits);
        }
        let scale = parts.point - parts.digits.len() as i64;
        let power = ten.powi(scale.abs());
        let magnitude = if scale >= 0 {
            &mantissa * &power
        } else {
            &mantissa / &power
        };
        if parts.negative { -magnitude } else { magnitude }
    }

    pub fn zero(bits: usize) -> Self {
        Real::from_f64(0.0, bits)
    }

    pub fn one(bits: usize) -> Self {
        Real::from_f64(1.0, bits)
    }

    pub fn nan(bits: usize) -> Self {
        Real::from_f64(f64::NAN, bits)
    }

    pub fn pi(bits: usize) -> Self {
        Real::nan(bits).with_consts(|_, p, cc| cc.pi(p, ROUNDING))
    }

    pub fn e(bits: usize) -> Self {
        Real::nan(bits).with_consts(|_, p, cc| cc.e(p, ROUNDING))
    }

    pub fn bits(&self) -> usize {
        self.bits
    }

    pub fn is_nan(&self) -> bool {
        self.value.is_nan()
    }

    pub fn is_finite(&self) -> bool {
        !self.value.is_nan() && !self.value.is_inf()
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// strictly greater than zero
    pub fn is_positive(&self) -> bool {
        self.value.partial_cmp(&BigFloat::from_f64(0.0, self.bits)) == Some(Ordering::Greater)
    }

    /// strictly less than zero
    pub fn is_negative(&self) -> bool {
        self.value.partial_cmp(&BigFloat::from_f64(0.0, self.bits)) == Some(Ordering::Less)
    }

    fn decimal_parts(&self) -> Option<DecimalParts> {
        if !self.is_finite() {
            return None;
        }
        if self.is_zero() {
            return Some(DecimalParts {
                negative: false,
                digits: Vec::new(),
                point: 0,
            });
        }
        DecimalParts::parse(&self.value.to_string())
    }

    /// nearest `f64`, for reports and for tests
    pub fn to_f64(&self) -> f64 {
        if self.is_nan() {
            return f64::NAN;
        }
        if !self.is_finite() {
            return if self.is_positive() {
                f64::INFINITY
            } else {
                f64::NEG_INFINITY
            };
        }
        match self.decimal_parts() {
            Some(parts) if parts.digits.is_empty() => 0.0,
            Some(parts) => {
                let sign = if parts.negative { "-" } else { "" };
                format!("{}0.{}e{}", sign, parts.digit_string(), parts.point)
                    .parse::<f64>()
                    .unwrap_or(f64::NAN)
            }
            None => f64::NAN,
        }
    }

    /// decimal rendering with at most `significant_digits` digits
    pub fn to_decimal_string(&self, significant_digits: usize) -> String {
        if !self.is_finite() {
            return self.to_f64().to_string();
        }
        match self.decimal_parts() {
            Some(parts) => parts
                .round(significant_digits)
                .render(significant_digits),
            None => self.value.to_string(),
        }
    }

    /// number of decimal digits the mantissa carries
    pub fn decimal_digits(&self) -> usize {
        ((self.bits as f64) * LOG10_2).floor() as usize
    }

    fn map(&self, f: impl FnOnce(&BigFloat, usize) -> BigFloat) -> Real {
        Real {
            value: f(&self.value, self.bits),
            bits: self.bits,
        }
    }

    fn with_consts(&self, f: impl FnOnce(&BigFloat, usize, &mut Consts) -> BigFloat) -> Real {
        let bits = self.bits;
        let value = CONSTS.with(|cell| match cell.borrow_mut().as_mut() {
            Some(cc) => f(&self.value, bits, cc),
            None => BigFloat::from_f64(f64::NAN, bits),
        });
        Real { value, bits }
    }

    pub fn abs(&self) -> Real {
        self.map(|v, _| v.abs())
    }

    /// larger of the two, a NaN operand loses like in `f64::max`
    pub fn max(self, other: Real) -> Real {
        if self.is_nan() || other > self {
            other
        } else {
            self
        }
    }

    pub fn min(self, other: Real) -> Real {
        if self.is_nan() || other < self {
            other
        } else {
            self
        }
    }

    /// integer power, exact sign for negative bases
    pub fn powi(&self, n: i64) -> Real {
        let positive = self.map(|v, p| v.powi(n.unsigned_abs() as usize, p, ROUNDING));
        if n >= 0 {
            positive
        } else {
            &Real::one(self.bits) / &positive
        }
    }

    pub fn pow(&self, exponent: &Real) -> Real {
        if exponent.is_finite() && exponent.trunc() == *exponent {
            let n = exponent.to_f64();
            if n.abs() <= i32::MAX as f64 {
                return self.powi(n as i64);
            }
        }
        let bits = self.bits.max(exponent.bits);
        let exponent = exponent.value.clone();
        Real {
            bits,
            ..self.with_consts(|v, _, cc| v.pow(&exponent, bits, ROUNDING, cc))
        }
    }

    pub fn sqrt(&self) -> Real {
        self.map(|v, p| v.sqrt(p, ROUNDING))
    }

    pub fn cbrt(&self) -> Real {
        self.map(|v, p| v.cbrt(p, ROUNDING))
    }

    pub fn exp(&self) -> Real {
        self.with_consts(|v, p, cc| v.exp(p, ROUNDING, cc))
    }

    pub fn exp2(&self) -> Real {
        Real::from_f64(2.0, self.bits).pow(self)
    }

    pub fn exp_m1(&self) -> Real {
        &self.exp() - &Real::one(self.bits)
    }

    pub fn ln(&self) -> Real {
        self.with_consts(|v, p, cc| v.ln(p, ROUNDING, cc))
    }

    pub fn ln_1p(&self) -> Real {
        (&Real::one(self.bits) + self).ln()
    }

    pub fn log10(&self) -> Real {
        self.with_consts(|v, p, cc| v.log10(p, ROUNDING, cc))
    }

    pub fn log2(&self) -> Real {
        self.with_consts(|v, p, cc| v.log2(p, ROUNDING, cc))
    }

    pub fn sin(&self) -> Real {
        self.with_consts(|v, p, cc| v.sin(p, ROUNDING, cc))
    }

    pub fn cos(&self) -> Real {
        self.with_consts(|v, p, cc| v.cos(p, ROUNDING, cc))
    }

    pub fn tan(&self) -> Real {
        self.with_consts(|v, p, cc| v.tan(p, ROUNDING, cc))
    }

    pub fn asin(&self) -> Real {
        self.with_consts(|v, p, cc| v.asin(p, ROUNDING, cc))
    }

    pub fn acos(&self) -> Real {
        self.with_consts(|v, p, cc| v.acos(p, ROUNDING, cc))
    }

    pub fn atan(&self) -> Real {
        self.with_consts(|v, p, cc| v.atan(p, ROUNDING, cc))
    }

    pub fn sinh(&self) -> Real {
        self.with_consts(|v, p, cc| v.sinh(p, ROUNDING, cc))
    }

    pub fn cosh(&self) -> Real {
        self.with_consts(|v, p, cc| v.cosh(p, ROUNDING, cc))
    }

    pub fn tanh(&self) -> Real {
        self.with_consts(|v, p, cc| v.tanh(p, ROUNDING, cc))
    }

    pub fn asinh(&self) -> Real {
        self.with_consts(|v, p, cc| v.asinh(p, ROUNDING, cc))
    }

    pub fn acosh(&self) -> Real {
        self.with_consts(|v, p, cc| v.acosh(p, ROUNDING, cc))
    }

    pub fn atanh(&self) -> Real {
        self.with_consts(|v, p, cc| v.atanh(p, ROUNDING, cc))
    }

    pub fn floor(&self) -> Real {
        self.map(|v, _| v.floor())
    }

    pub fn ceil(&self) -> Real {
        self.map(|v, _| v.ceil())
    }

    /// integer part, rounding towards zero
    pub fn trunc(&self) -> Real {
        self.map(|v, _| v.int())
    }

    pub fn hypot(&self, other: &Real) -> Real {
        (&(self * self) + &(other * other)).sqrt()
    }

    /// angle of the point (other, self), `self` is the ordinate as in `f64::atan2`
    pub fn atan2(&self, other: &Real) -> Real {
        let bits = self.bits.max(other.bits);
        if self.is_nan() || other.is_nan() {
            return Real::nan(bits);
        }
        if other.is_zero() {
            let half_pi = &Real::pi(bits) / &Real::from_f64(2.0, bits);
            return if self.is_positive() {
                half_pi
            } else if self.is_negative() {
                -half_pi
            } else {
                Real::zero(bits)
            };
        }
        let angle = (self / other).atan();
        if other.is_positive() {
            angle
        } else if self.is_negative() {
            &angle - &Real::pi(bits)
        } else {
            &angle + &Real::pi(bits)
        }
    }
}

impl PartialEq for Real {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl PartialOrd for Real {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.value.partial_cmp(&other.value)
    }
}

impl fmt::Display for Real {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal_string(self.decimal_digits()))
    }
}

/// `a / 0` is a signed infinity, `0 / 0` is NaN
fn quotient(a: &BigFloat, b: &BigFloat, bits: usize) -> BigFloat {
    if !b.is_zero() {
        return BigFloat::div(a, b, bits, ROUNDING);
    }
    let zero = BigFloat::from_f64(0.0, bits);
    match a.partial_cmp(&zero) {
        Some(Ordering::Greater) => BigFloat::from_f64(f64::INFINITY, bits),
        Some(Ordering::Less) => BigFloat::from_f64(f64::NEG_INFINITY, bits),
        _ => BigFloat::from_f64(f64::NAN, bits),
    }
}

macro_rules! impl_binary_op {
    ($op:ident, $method:ident, $eval:expr) => {
        impl std::ops::$op<&Real> for &Real {
            type Output = Real;

            fn $method(self, rhs: &Real) -> Real {
                let bits = self.bits.max(rhs.bits);
                Real {
                    value: $eval(&self.value, &rhs.value, bits),
                    bits,
                }
            }
        }

        impl std::ops::$op<Real> for Real {
            type Output = Real;

            fn $method(self, rhs: Real) -> Real {
                std::ops::$op::$method(&self, &rhs)
            }
        }

        impl std::ops::$op<&Real> for Real {
            type Output = Real;

            fn $method(self, rhs: &Real) -> Real {
                std::ops::$op::$method(&self, rhs)
            }
        }
    };
}

impl_binary_op!(Add, add, |a: &BigFloat, b: &BigFloat, p: usize| {
    BigFloat::add(a, b, p, ROUNDING)
});
impl_binary_op!(Sub, sub, |a: &BigFloat, b: &BigFloat, p: usize| {
    BigFloat::sub(a, b, p, ROUNDING)
});
impl_binary_op!(Mul, mul, |a: &BigFloat, b: &BigFloat, p: usize| {
    BigFloat::mul(a, b, p, ROUNDING)
});
impl_binary_op!(Div, div, quotient);

impl std::ops::Neg for &Real {
    type Output = Real;

    fn neg(self) -> Real {
        &Real::zero(self.bits) - self
    }
}

impl std::ops::Neg for Real {
    type Output = Real;

    fn neg(self) -> Real {
        -&self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const BITS: usize = 256;

    fn real(v: f64) -> Real {
        Real::from_decimal(v, BITS)
    }

    #[test]
    fn test_decimal_literals() {
        // 0.1 + 0.2 is 0.3 in decimal, unlike f64
        let sum = &real(0.1) + &real(0.2);
        assert!((&sum - &real(0.3)).abs() < real(1e-70));
        assert_eq!(real(-2.5).to_f64(), -2.5);
        assert_eq!(real(1e-25).to_f64(), 1e-25);
        assert_eq!(real(3.0), Real::from_f64(3.0, BITS));
    }

    #[test]
    fn test_precision_beyond_f64() {
        let third = &real(1.0) / &real(3.0);
        let digits = third.to_decimal_string(60);
        assert_eq!(digits, format!("0.{}", "3".repeat(60)));
        let tiny = &(&real(1.0) + &real(1e-40)) - &real(1.0);
        assert_relative_eq!(tiny.to_f64(), 1e-40, max_relative = 1e-12);
    }

    #[test]
    fn test_functions() {
        let x = real(0.4);
        assert_relative_eq!(x.sin().to_f64(), 0.4_f64.sin(), epsilon = 1e-15);
        assert_relative_eq!(x.exp().ln().to_f64(), 0.4, epsilon = 1e-15);
        assert_relative_eq!(real(27.0).cbrt().to_f64(), 3.0, epsilon = 1e-15);
        assert_relative_eq!(real(3.0).exp2().to_f64(), 8.0, epsilon = 1e-14);
        assert_relative_eq!(real(3.0).hypot(&real(4.0)).to_f64(), 5.0, epsilon = 1e-15);
        assert_eq!(real(-2.0).powi(3).to_f64(), -8.0);
        assert_eq!(real(2.0).powi(-2).to_f64(), 0.25);
        assert_eq!(real(-2.7).trunc().to_f64(), -2.0);
        assert_eq!(real(-2.7).floor().to_f64(), -3.0);
    }

    #[test]
    fn test_atan2_quadrants() {
        for (y, x) in [(1.0, 1.0), (1.0, -1.0), (-1.0, -1.0), (-1.0, 1.0), (1.0, 0.0), (-2.0, 0.0)]
        {
            assert_relative_eq!(
                real(y).atan2(&real(x)).to_f64(),
                f64::atan2(y, x),
                epsilon = 1e-15
            );
        }
    }

    #[test]
    fn test_invalid_operations() {
        assert!(real(-1.0).sqrt().is_nan());
        assert!(!(&real(1.0) / &real(0.0)).is_finite());
        assert!((&real(1.0) / &real(0.0)).is_positive());
        assert!(real(-1.0).ln().is_nan());
        let nan = Real::nan(BITS);
        assert!(!(nan.clone() > real(0.0)) && !(nan < real(0.0)));
        assert_eq!(Real::nan(BITS).max(real(2.0)), real(2.0));
    }

    #[test]
    fn test_formatting() {
        assert_eq!(real(1.52144146510).to_decimal_string(6), "1.52144");
        assert_eq!(real(-0.5).to_decimal_string(6), "-0.5");
        assert_eq!(real(2.0).to_decimal_string(6), "2");
        assert_eq!(real(0.0).to_decimal_string(6), "0");
        assert_eq!(real(1.0e-30).to_decimal_string(6), "1e-30");
        assert_eq!(real(-2.5e-12).to_decimal_string(6), "-2.5e-12");
        assert_eq!(real(0.00125).to_decimal_string(6), "0.00125");
        assert_eq!(real(9.9999999).to_decimal_string(3), "10");
        assert_eq!(real(123456.0).to_decimal_string(3), "1.23e5");
    }

    #[test]
    fn test_parse_keeps_every_digit() {
        let long = Real::parse("1.52137970680456756960408083225", BITS).unwrap();
        let short = real(1.5213797068045676);
        assert_eq!(long.to_decimal_string(30), "1.52137970680456756960408083225");
        assert!((&long - &short).abs() > real(1e-20));
        assert_eq!(Real::parse("-2.5e-3", BITS).unwrap(), real(-0.0025));
        assert!(Real::parse("abc", BITS).is_none());
    }

    #[test]
    fn test_decimal_parts() {
        let parts = DecimalParts::parse("-0.00125e+2").unwrap();
        assert!(parts.negative);
        assert_eq!(parts.digits, vec![1, 2, 5]);
        assert_eq!(parts.point, 0);
        assert!(DecimalParts::parse("1.2.3").is_none());
        assert!(DecimalParts::parse("e5").is_none());
    }
}
