use crate::error::ValidationError;
use crate::numerical::numeric_context::{DEFAULT_SIGNIFICANT_DIGITS, NumericContext};
use log::LevelFilter;

pub const DEFAULT_PRECISION: f64 = 1e-4;

/// Run-wide options, filled from defaults, a task document or the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// stop tolerance of the solvers
    pub precision: f64,
    /// solve even when the convergence precondition fails
    pub force_solve: bool,
    pub significant_digits: u32,
    pub log_level: LevelFilter,
    pub log_file: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            precision: DEFAULT_PRECISION,
            force_solve: false,
            significant_digits: DEFAULT_SIGNIFICANT_DIGITS,
            log_level: LevelFilter::Info,
            log_file: None,
        }
    }
}

impl Settings {
    pub fn numeric_context(&self) -> Result<NumericContext, ValidationError> {
        NumericContext::new(self.significant_digits)
    }
}
