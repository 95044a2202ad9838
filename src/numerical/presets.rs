//! Built-in nonlinear systems with default starting points.
use crate::error::ValidationError;
use crate::numerical::equation_system::{
    EquationSystem, EquationSystemSolution, MultivariableEquation, StartingValues,
    starting_point,
};
use crate::numerical::numeric_context::NumericContext;
use strum_macros::{Display, EnumIter, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, EnumString, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SystemPreset {
    /// 0.1*x1^2 + x1 + 0.2*x2^2 - 0.3 = 0, 0.2*x1^2 + x2 + 0.1*x1*x2 - 0.7 = 0
    QuadraticPair,
    /// x = 0.5*cos(y), y = 0.5*sin(x) + 0.2
    TrigContraction,
}

impl SystemPreset {
    /// rows as (f, phi_lhs, phi) strings plus the default starting point
    pub fn setup(&self) -> (Vec<(&'static str, &'static str, &'static str)>, Vec<(&'static str, f64)>) {
        match self {
            SystemPreset::QuadraticPair => (
                vec![
                    (
                        "0.1*x1^2 + x1 + 0.2*x2^2 - 0.3",
                        "x1",
                        "0.3 - 0.1*x1^2 - 0.2*x2^2",
                    ),
                    (
                        "0.2*x1^2 + x2 + 0.1*x1*x2 - 0.7",
                        "x2",
                        "0.7 - 0.2*x1^2 - 0.1*x1*x2",
                    ),
                ],
                vec![("x1", 1.0), ("x2", 1.0)],
            ),
            SystemPreset::TrigContraction => (
                vec![
                    ("x - 0.5*cos(y)", "x", "0.5*cos(y)"),
                    ("y - 0.5*sin(x) - 0.2", "y", "0.5*sin(x) + 0.2"),
                ],
                vec![("x", 0.0), ("y", 0.0)],
            ),
        }
    }

    pub fn system(&self, ctx: &NumericContext) -> Result<EquationSystem, ValidationError> {
        let (rows, _) = self.setup();
        let equations = rows
            .into_iter()
            .map(|(f, lhs, phi)| MultivariableEquation::from_str(f, lhs, phi))
            .collect::<Result<Vec<_>, _>>()?;
        EquationSystem::new(equations, ctx)
    }

    /// default starting values as written, before they are read at working precision
    pub fn starting_values(&self) -> StartingValues {
        let (_, start) = self.setup();
        start
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }

    pub fn starting_point(&self, ctx: &NumericContext) -> EquationSystemSolution {
        starting_point(&self.starting_values(), ctx)
    }

    /// human-readable listing of the rows
    pub fn describe(&self) -> String {
        let (rows, start) = self.setup();
        let rows: Vec<String> = rows
            .iter()
            .map(|(f, lhs, phi)| format!("{} = 0  =>  {} = {}", f, lhs, phi))
            .collect();
        let start: Vec<String> = start.iter().map(|(n, v)| format!("{} = {}", n, v)).collect();
        format!("{}; start: {}", rows.join("; "), start.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_all_presets_validate() {
        let ctx = NumericContext::default();
        for preset in SystemPreset::iter() {
            let system = preset.system(&ctx).unwrap();
            assert!(system.check_point(&preset.starting_point(&ctx)).is_ok());
            assert!(!preset.describe().is_empty());
        }
    }

    #[test]
    fn test_preset_names() {
        assert_eq!(SystemPreset::QuadraticPair.to_string(), "quadratic_pair");
        assert_eq!(
            "trig_contraction".parse::<SystemPreset>().unwrap(),
            SystemPreset::TrigContraction
        );
    }
}
