//! Numeric precision budget shared by equations, solvers and the output layer.
//!
//! The budget is a number of significant decimal digits. Every value the crate computes is a
//! [`Real`] whose binary mantissa is wide enough for that many digits plus a few guard bits,
//! and every literal entering the computation goes through [`NumericContext::real`].
use crate::error::ValidationError;
use crate::numerical::real::Real;
use log::warn;
use std::f64::consts::LOG2_10;

/// default number of significant decimal digits of every computation
pub const DEFAULT_SIGNIFICANT_DIGITS: u32 = 69;
/// step of the central finite differences used when no symbolic derivative exists
pub const FINITE_DIFFERENCE_STEP: f64 = 1e-4;
/// extra mantissa bits on top of the decimal budget
const GUARD_BITS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericContext {
    significant_digits: u32,
    bits: usize,
    fd_step: f64,
}

impl Default for NumericContext {
    fn default() -> Self {
        NumericContext {
            significant_digits: DEFAULT_SIGNIFICANT_DIGITS,
            bits: Self::bits_for(DEFAULT_SIGNIFICANT_DIGITS),
            fd_step: FINITE_DIFFERENCE_STEP,
        }
    }
}

impl NumericContext {
    pub fn new(significant_digits: u32) -> Result<Self, ValidationError> {
        if significant_digits == 0 {
            return Err(ValidationError::InvalidPrecision(
                "number of significant digits must be positive".to_string(),
            ));
        }
        Ok(NumericContext {
            significant_digits,
            bits: Self::bits_for(significant_digits),
            fd_step: FINITE_DIFFERENCE_STEP,
        })
    }

    fn bits_for(significant_digits: u32) -> usize {
        (significant_digits as f64 * LOG2_10).ceil() as usize + GUARD_BITS
    }

    pub fn significant_digits(&self) -> u32 {
        self.significant_digits
    }

    /// mantissa width of every `Real` made by this context
    pub fn bits(&self) -> usize {
        self.bits
    }

    /// `value` read as the decimal literal it was written as
    pub fn real(&self, value: f64) -> Real {
        Real::from_decimal(value, self.bits)
    }

    pub fn zero(&self) -> Real {
        Real::zero(self.bits)
    }

    pub fn one(&self) -> Real {
        Real::one(self.bits)
    }

    pub fn fd_step(&self) -> Real {
        self.real(self.fd_step)
    }

    /// smallest relative difference the digit budget can express
    pub fn resolution(&self) -> f64 {
        10f64.powi(-(self.significant_digits as i32 - 1))
    }

    /// warn when the requested tolerance is finer than the digit budget; iteration still runs
    pub fn check_precision(&self, precision: f64) -> Result<(), ValidationError> {
        if !(precision.is_finite() && precision > 0.0) {
            return Err(ValidationError::InvalidPrecision(format!(
                "precision must be a positive finite number, got {}",
                precision
            )));
        }
        if precision < self.resolution() {
            warn!(
                "precision {:e} is below the numeric resolution {:e}; \
                 the iteration may stop on the iteration budget",
                precision,
                self.resolution()
            );
        }
        Ok(())
    }

    /// render a value with the budgeted number of significant digits
    pub fn format(&self, value: &Real) -> String {
        value.to_decimal_string(self.significant_digits as usize)
    }
}
