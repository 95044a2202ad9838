//! Saving and printing of solver results.
//!
//! The format follows the extension of the target path: `.toml` and `.json` get structured
//! documents, anything else gets plain text. `summary` renders the same data as a table for
//! the terminal. Numbers are written as decimal strings carrying every significant digit of
//! the numeric context.
use crate::error::RootsError;
use crate::numerical::Scalar_solvers::solver_traits::{Solution, SolutionMethod};
use crate::numerical::System_solvers::system_solver_traits::{
    SystemSolution, SystemSolutionMethod,
};
use crate::numerical::equation::Equation;
use crate::numerical::equation_system::{EquationSystem, EquationSystemSolution};
use crate::numerical::numeric_context::NumericContext;
use crate::numerical::real::Real;
use log::info;
use serde_json::json;
use std::fs;
use std::path::Path;
use tabled::{builder::Builder, settings::Style};

pub trait Report {
    fn to_text(&self, ctx: &NumericContext) -> String;
    fn to_toml(&self, ctx: &NumericContext) -> toml::Table;
    fn to_json(&self, ctx: &NumericContext) -> serde_json::Value;
    /// (name, value) pairs shown in the terminal summary
    fn summary_rows(&self, ctx: &NumericContext) -> Vec<(String, String)>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct EquationReport {
    pub f: String,
    /// `None` when no fixed-point transform could be built
    pub phi: Option<String>,
    pub df: String,
    pub dphi: Option<String>,
    pub interval_l: Real,
    pub interval_r: Real,
    pub x: Real,
    pub y: Real,
    pub iterations: usize,
    pub method: String,
    pub approximate_derivatives: bool,
}

impl EquationReport {
    pub fn new(equation: &Equation, method: SolutionMethod, solution: &Solution) -> Self {
        EquationReport {
            f: equation.f_str(),
            phi: equation.phi_str(),
            df: equation.df_str(),
            dphi: equation.dphi_str(),
            interval_l: equation.interval_l().clone(),
            interval_r: equation.interval_r().clone(),
            x: solution.x.clone(),
            y: equation.f(&solution.x),
            iterations: solution.iterations,
            method: method.title().to_string(),
            approximate_derivatives: equation.is_derivative_approximate(),
        }
    }
}

impl Report for EquationReport {
    fn to_text(&self, ctx: &NumericContext) -> String {
        let mut lines = vec![
            format!("Equation: {} = 0", self.f),
            format!("phi(x) = {}", self.phi.as_deref().unwrap_or("none")),
            format!("f'(x) = {}", self.df),
            format!("phi'(x) = {}", self.dphi.as_deref().unwrap_or("none")),
            format!(
                "Interval: [{}, {}]",
                ctx.format(&self.interval_l),
                ctx.format(&self.interval_r)
            ),
            format!("x = {}", ctx.format(&self.x)),
            format!("y = f(x) = {}", ctx.format(&self.y)),
            format!("Iterations: {}", self.iterations),
            format!("Method: {}", self.method),
        ];
        if self.approximate_derivatives {
            lines.push("Derivatives are finite-difference estimates".to_string());
        }
        lines.join("\n") + "\n"
    }

    fn to_toml(&self, ctx: &NumericContext) -> toml::Table {
        let mut table = toml::Table::new();
        table.insert("f".into(), self.f.clone().into());
        if let Some(phi) = &self.phi {
            table.insert("phi".into(), phi.clone().into());
        }
        table.insert("df".into(), self.df.clone().into());
        if let Some(dphi) = &self.dphi {
            table.insert("dphi".into(), dphi.clone().into());
        }
        table.insert(
            "interval".into(),
            toml::Value::Array(vec![
                ctx.format(&self.interval_l).into(),
                ctx.format(&self.interval_r).into(),
            ]),
        );
        table.insert("x".into(), ctx.format(&self.x).into());
        table.insert("y".into(), ctx.format(&self.y).into());
        table.insert("iterations".into(), (self.iterations as i64).into());
        table.insert("method".into(), self.method.clone().into());
        table.insert(
            "approximate_derivatives".into(),
            self.approximate_derivatives.into(),
        );
        table
    }

    fn to_json(&self, ctx: &NumericContext) -> serde_json::Value {
        json!({
            "f": self.f,
            "phi": self.phi,
            "df": self.df,
            "dphi": self.dphi,
            "interval": [ctx.format(&self.interval_l), ctx.format(&self.interval_r)],
            "x": ctx.format(&self.x),
            "y": ctx.format(&self.y),
            "iterations": self.iterations,
            "method": self.method,
            "approximate_derivatives": self.approximate_derivatives,
        })
    }

    fn summary_rows(&self, ctx: &NumericContext) -> Vec<(String, String)> {
        vec![
            ("method".to_string(), self.method.clone()),
            ("f(x)".to_string(), self.f.clone()),
            ("x".to_string(), ctx.format(&self.x)),
            ("f(x) at root".to_string(), ctx.format(&self.y)),
            ("iterations".to_string(), self.iterations.to_string()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SystemReport {
    /// (f, phi_lhs, phi) per row
    pub rows: Vec<(String, String, String)>,
    pub solution: EquationSystemSolution,
    pub residuals: Vec<Real>,
    pub max_residual: Real,
    pub iterations: usize,
    pub method: String,
}

impl SystemReport {
    pub fn new(
        system: &EquationSystem,
        method: SystemSolutionMethod,
        result: &SystemSolution,
    ) -> Self {
        SystemReport {
            rows: system
                .equations()
                .iter()
                .map(|eq| (eq.f.to_string(), eq.phi_lhs.clone(), eq.phi.to_string()))
                .collect(),
            solution: result.solution.clone(),
            residuals: system.apply(&result.solution),
            max_residual: system.max_residual(&result.solution),
            iterations: result.iterations,
            method: method.title().to_string(),
        }
    }
}

impl Report for SystemReport {
    fn to_text(&self, ctx: &NumericContext) -> String {
        let mut lines = vec!["System:".to_string()];
        for (f, lhs, phi) in &self.rows {
            lines.push(format!("  {} = 0  =>  {} = {}", f, lhs, phi));
        }
        lines.push("Solution:".to_string());
        for (name, value) in &self.solution {
            lines.push(format!("  {} = {}", name, ctx.format(value)));
        }
        lines.push("Residuals:".to_string());
        for (i, y) in self.residuals.iter().enumerate() {
            lines.push(format!("  y{} = {}", i + 1, ctx.format(y)));
        }
        lines.push(format!("Iterations: {}", self.iterations));
        lines.push(format!("Method: {}", self.method));
        lines.join("\n") + "\n"
    }

    fn to_toml(&self, ctx: &NumericContext) -> toml::Table {
        let mut table = toml::Table::new();
        let rows = self
            .rows
            .iter()
            .map(|(f, lhs, phi)| {
                let mut row = toml::Table::new();
                row.insert("f".into(), f.clone().into());
                row.insert("lhs".into(), lhs.clone().into());
                row.insert("phi".into(), phi.clone().into());
                toml::Value::Table(row)
            })
            .collect();
        table.insert("equations".into(), toml::Value::Array(rows));
        let solution: toml::Table = self
            .solution
            .iter()
            .map(|(name, value)| (name.clone(), toml::Value::String(ctx.format(value))))
            .collect();
        table.insert("solution".into(), toml::Value::Table(solution));
        table.insert(
            "residuals".into(),
            toml::Value::Array(self.residuals.iter().map(|y| ctx.format(y).into()).collect()),
        );
        table.insert("iterations".into(), (self.iterations as i64).into());
        table.insert("method".into(), self.method.clone().into());
        table
    }

    fn to_json(&self, ctx: &NumericContext) -> serde_json::Value {
        let equations: Vec<serde_json::Value> = self
            .rows
            .iter()
            .map(|(f, lhs, phi)| json!({ "f": f, "lhs": lhs, "phi": phi }))
            .collect();
        let solution: serde_json::Map<String, serde_json::Value> = self
            .solution
            .iter()
            .map(|(name, value)| (name.clone(), ctx.format(value).into()))
            .collect();
        let residuals: Vec<String> = self.residuals.iter().map(|y| ctx.format(y)).collect();
        json!({
            "equations": equations,
            "solution": solution,
            "residuals": residuals,
            "iterations": self.iterations,
            "method": self.method,
        })
    }

    fn summary_rows(&self, ctx: &NumericContext) -> Vec<(String, String)> {
        let mut rows = vec![("method".to_string(), self.method.clone())];
        for (name, value) in &self.solution {
            rows.push((name.clone(), ctx.format(value)));
        }
        rows.push(("max |residual|".to_string(), ctx.format(&self.max_residual)));
        rows.push(("iterations".to_string(), self.iterations.to_string()));
        rows
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Toml,
    Json,
}

impl OutputFormat {
    fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => OutputFormat::Toml,
            Some(ext) if ext.eq_ignore_ascii_case("json") => OutputFormat::Json,
            _ => OutputFormat::Text,
        }
    }
}

pub struct ResultWriter {
    ctx: NumericContext,
}

impl ResultWriter {
    pub fn new(ctx: NumericContext) -> Self {
        ResultWriter { ctx }
    }

    /// text that would be written to `path`
    pub fn render(&self, report: &dyn Report, path: &Path) -> Result<String, RootsError> {
        match OutputFormat::for_path(path) {
            OutputFormat::Toml => Ok(toml::to_string(&report.to_toml(&self.ctx))?),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&report.to_json(&self.ctx))?),
            OutputFormat::Text => Ok(report.to_text(&self.ctx)),
        }
    }

    pub fn write(&self, report: &dyn Report, path: &Path) -> Result<(), RootsError> {
        let content = self.render(report, path)?;
        fs::write(path, content)?;
        info!("result saved to {}", path.display());
        Ok(())
    }

    /// terminal table of the report
    pub fn summary(&self, report: &dyn Report) -> String {
        let mut builder = Builder::default();
        for (name, value) in report.summary_rows(&self.ctx) {
            builder.push_record([name, value]);
        }
        let mut table = builder.build();
        table.with(Style::modern_rounded());
        table.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical::Scalar_solvers::solver_traits::Solver;
    use crate::numerical::System_solvers::system_solver_traits::SystemSolver;
    use crate::numerical::presets::SystemPreset;

    fn equation_report() -> EquationReport {
        let ctx = NumericContext::default();
        let eq = Equation::from_str("x^3 - x - 2", 1.0, 2.0, &ctx).unwrap();
        let solution = SolutionMethod::Newton.solver(&ctx).solve(&eq, 1e-6).unwrap();
        EquationReport::new(&eq, SolutionMethod::Newton, &solution)
    }

    fn system_report() -> SystemReport {
        let ctx = NumericContext::default();
        let preset = SystemPreset::QuadraticPair;
        let system = preset.system(&ctx).unwrap();
        let method = SystemSolutionMethod::FixedPointIteration;
        let result = method
            .solver(&ctx)
            .solve(&system, &preset.starting_point(&ctx), 1e-4)
            .unwrap();
        SystemReport::new(&system, method, &result)
    }

    #[test]
    fn test_equation_text() {
        let report = equation_report();
        let phi = report.phi.clone().unwrap();
        let text = report.to_text(&NumericContext::default());
        assert!(text.starts_with("Equation: "));
        assert!(text.contains(&format!("phi(x) = {}", phi)));
        assert!(text.contains("Method: Newton"));
        assert!(!text.contains("finite-difference"));
    }

    #[test]
    fn test_report_without_fixed_point_transform() {
        let ctx = NumericContext::default();
        let eq = Equation::from_str("sqrt(x) - 0.5", 0.0, 1.0, &ctx).unwrap();
        let solution = SolutionMethod::Chord.solver(&ctx).solve(&eq, 1e-6).unwrap();
        let report = EquationReport::new(&eq, SolutionMethod::Chord, &solution);
        assert_eq!(report.phi, None);
        let text = report.to_text(&ctx);
        assert!(text.contains("phi(x) = none"));
        let parsed: toml::Table = toml::to_string(&report.to_toml(&ctx))
            .unwrap()
            .parse()
            .unwrap();
        assert!(!parsed.contains_key("phi"));
        assert!(report.to_json(&ctx)["phi"].is_null());
    }

    #[test]
    fn test_write_text_and_toml() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = NumericContext::default();
        let writer = ResultWriter::new(ctx);
        let report = equation_report();

        let txt = dir.path().join("result.txt");
        writer.write(&report, &txt).unwrap();
        let content = fs::read_to_string(&txt).unwrap();
        assert!(content.contains("Iterations: "));

        let path = dir.path().join("result.toml");
        writer.write(&report, &path).unwrap();
        let parsed: toml::Table = fs::read_to_string(&path).unwrap().parse().unwrap();
        assert_eq!(parsed["method"].as_str(), Some("Newton"));
        assert_eq!(parsed["x"].as_str(), Some(ctx.format(&report.x).as_str()));
        assert_eq!(
            parsed["iterations"].as_integer(),
            Some(report.iterations as i64)
        );
    }

    #[test]
    fn test_write_json() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = NumericContext::default();
        let writer = ResultWriter::new(ctx);
        let report = equation_report();

        let path = dir.path().join("result.JSON");
        writer.write(&report, &path).unwrap();
        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed["method"], "Newton");
        assert_eq!(parsed["x"], ctx.format(&report.x));
        assert_eq!(parsed["iterations"], report.iterations);
        assert_eq!(parsed["interval"], json!(["1", "2"]));
        assert_eq!(parsed["approximate_derivatives"], false);
        // full working precision survives the round through the file
        let x = parsed["x"].as_str().unwrap();
        assert!(x.starts_with("1.52137970973314812622812353"));
        assert!(x.len() > 60);
    }

    #[test]
    fn test_system_report() {
        let ctx = NumericContext::default();
        let report = system_report();
        assert_eq!(report.rows.len(), 2);
        assert!(report.max_residual < ctx.real(1e-3));
        let text = report.to_text(&ctx);
        assert!(text.contains("  x1 = "));
        assert!(text.contains("  y2 = "));

        let writer = ResultWriter::new(ctx);
        let rendered = writer.render(&report, Path::new("system.toml")).unwrap();
        let parsed: toml::Table = rendered.parse().unwrap();
        let solution = parsed["solution"].as_table().unwrap();
        assert_eq!(
            solution["x2"].as_str(),
            Some(ctx.format(&report.solution["x2"]).as_str())
        );
        assert_eq!(parsed["equations"].as_array().map(|a| a.len()), Some(2));

        let rendered = writer.render(&report, Path::new("system.json")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["equations"][1]["lhs"], "x2");
        assert_eq!(parsed["residuals"].as_array().map(|a| a.len()), Some(2));
        assert_eq!(parsed["solution"]["x1"], ctx.format(&report.solution["x1"]));
    }

    #[test]
    fn test_summary_table() {
        let writer = ResultWriter::new(NumericContext::default());
        let table = writer.summary(&system_report());
        assert!(table.contains("max |residual|"));
        assert!(table.contains("x2"));
    }

    #[test]
    fn test_write_to_missing_directory() {
        let writer = ResultWriter::new(NumericContext::default());
        let result = writer.write(&equation_report(), Path::new("no/such/dir/out.txt"));
        assert!(matches!(result, Err(RootsError::Io(_))));
    }
}
