//! parse task document with structure like " title1 key1: value1, value2 key2: value2 title2 key3:value3, value4" which has titles and
//! pairs key-vector of values. Values are numbers, booleans, bare words or "quoted strings" (quotes let an equation carry spaces
//! and commas). The parsed document is then turned into a `Task` and `Settings`.
//!
//! ```
//! use RustedRoots::Utils::task_parser::{parse_task, Task};
//! let doc = r#"
//! equation
//!   f: "x^3 - x - 2"
//!   interval: 1, 2
//!   method: newton
//! solver
//!   precision: 1e-6
//! "#;
//! let (task, settings) = parse_task(doc).unwrap();
//! assert!(matches!(task, Task::Equation(_)));
//! assert_eq!(settings.precision, 1e-6);
//! ```
use crate::Utils::settings::Settings;
use crate::error::{RootsError, ValidationError};
use crate::numerical::Scalar_solvers::solver_traits::SolutionMethod;
use crate::numerical::equation::Equation;
use crate::numerical::equation_system::{
    EquationSystem, EquationSystemSolution, MultivariableEquation, StartingValues,
    starting_point,
};
use crate::numerical::numeric_context::NumericContext;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{alpha1, alphanumeric1, char, multispace0, space0},
    combinator::{map, recognize},
    multi::{many0, many1, separated_list0},
    sequence::{delimited, pair, separated_pair, terminated},
};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use std::path::Path;

type DocumentMap = HashMap<String, SectionMap>;
type SectionMap = BTreeMap<String, Vec<Value>>;

/// enum to represent different value types:
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Float(f64),
    Integer(i64),
    Boolean(bool),
}

impl Value {
    /// integers are accepted where a float is expected
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        if let Value::Integer(i) = self {
            Some(*i)
        } else {
            None
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        if let Value::Boolean(b) = self {
            Some(*b)
        } else {
            None
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            Value::Float(val) => write!(f, "{}", val),
            Value::Integer(val) => write!(f, "{}", val),
            Value::Boolean(val) => write!(f, "{}", val),
        }
    }
}

fn identifier(input: &str) -> IResult<&str, String> {
    let parser = recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ));
    let mut parser = map(parser, String::from);
    parser.parse(input)
}

/// Parses a title, trailing whitespace and line breaks are dropped
fn parse_title(input: &str) -> IResult<&str, String> {
    let (input, result) = identifier(input)?;
    Ok((input.trim(), result))
}

fn parse_key(input: &str) -> IResult<&str, String> {
    identifier(input)
}

fn parse_quoted(input: &str) -> IResult<&str, Value> {
    let mut parser = map(
        delimited(char('"'), take_while(|c: char| c != '"'), char('"')),
        |s: &str| Value::String(s.to_string()),
    );
    parser.parse(input)
}

fn parse_bare(input: &str) -> IResult<&str, Value> {
    // a single value excludes commas, whitespace, newlines, semicolons and quotes
    let value_parser = take_while1(|c: char| !matches!(c, ',' | ' ' | '\t' | '\r' | '\n' | ';' | '"'));
    let mut value_parser = map(value_parser, |s: &str| {
        if let Ok(val) = s.parse::<i64>() {
            Value::Integer(val)
        } else if let Ok(val) = s.parse::<f64>() {
            Value::Float(val)
        } else if let Ok(val) = s.parse::<bool>() {
            Value::Boolean(val)
        } else {
            Value::String(s.to_string())
        }
    });
    value_parser.parse(input)
}

fn parse_value(input: &str) -> IResult<&str, Value> {
    alt((parse_quoted, parse_bare)).parse(input)
}

/// comma separated values, never crossing a line break
fn parse_value_list(input: &str) -> IResult<&str, Vec<Value>> {
    let (input, _) = space0(input)?;
    let separator_coma = delimited(space0, tag(","), space0);
    let mut value_parser = separated_list0(separator_coma, parse_value);
    value_parser.parse(input)
}

fn parse_key_value_pair(input: &str) -> IResult<&str, (String, Vec<Value>)> {
    let colon_separator = delimited(space0, tag(":"), space0);
    let mut parser = separated_pair(parse_key, colon_separator, parse_value_list);
    let (input, result) = parser.parse(input)?;
    Ok((input.trim(), result))
}

fn parse_section(input: &str) -> IResult<&str, (String, SectionMap)> {
    let (input, _) = space0(input)?;
    let (input, title) = parse_title(input)?;
    let (input, _) = multispace0(input)?;
    let mut parser = many1(terminated(parse_key_value_pair, space0));
    let (input, pairs) = parser.parse(input)?;
    Ok((input, (title, pairs.into_iter().collect())))
}

/// Filters out comment lines (starting with //, #, %, or ;) and blank lines
fn filter_comments(input: &str) -> String {
    input
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.starts_with("//")
                && !trimmed.starts_with('#')
                && !trimmed.starts_with('%')
                && !trimmed.starts_with(';')
                && !trimmed.is_empty()
        })
        .collect::<Vec<&str>>()
        .join("\n")
}

fn parse_sections(input: &str) -> IResult<&str, DocumentMap> {
    let mut parser = many1(delimited(space0, parse_section, multispace0));
    let (input, sections) = parser.parse(input)?;
    Ok((input, sections.into_iter().collect()))
}

/// Parses the entire document, comments included; leftover input is an error
pub fn parse_document(input: &str) -> Result<DocumentMap, RootsError> {
    let filtered = filter_comments(input);
    match parse_sections(filtered.trim_start()) {
        Ok((remaining, parsed)) => {
            if !remaining.trim().is_empty() {
                return Err(RootsError::Task(format!(
                    "failed to parse entire document, remaining: '{}'",
                    remaining
                )));
            }
            Ok(parsed)
        }
        Err(e) => Err(RootsError::Task(format!("parsing error: {:?}", e))),
    }
}

//////////////////////////////////////////////////////////////////////////////////////////////
//                  TASKS
//////////////////////////////////////////////////////////////////////////////////////////////

/// single equation `f(x) = 0` on `[interval_l, interval_r]`
#[derive(Debug, Clone, PartialEq)]
pub struct EquationTask {
    pub f: String,
    pub interval_l: f64,
    pub interval_r: f64,
    pub method: SolutionMethod,
    pub phi: Option<String>,
}

impl EquationTask {
    pub fn build(&self, ctx: &NumericContext) -> Result<Equation, ValidationError> {
        let equation = Equation::from_str(&self.f, self.interval_l, self.interval_r, ctx)?;
        match &self.phi {
            Some(phi) => equation.with_phi_str(phi, ctx),
            None => Ok(equation),
        }
    }
}

/// system rows as (f, phi_lhs, phi) plus the starting values as written
#[derive(Debug, Clone, PartialEq)]
pub struct SystemTask {
    pub rows: Vec<(String, String, String)>,
    pub start: StartingValues,
}

impl SystemTask {
    pub fn build(&self, ctx: &NumericContext) -> Result<EquationSystem, ValidationError> {
        let equations = self
            .rows
            .iter()
            .map(|(f, lhs, phi)| MultivariableEquation::from_str(f, lhs, phi))
            .collect::<Result<Vec<_>, _>>()?;
        EquationSystem::new(equations, ctx)
    }

    pub fn starting_point(&self, ctx: &NumericContext) -> EquationSystemSolution {
        starting_point(&self.start, ctx)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    Equation(EquationTask),
    System(SystemTask),
}

fn task_error(msg: String) -> RootsError {
    RootsError::Task(msg)
}

fn single<'a>(section: &'a SectionMap, title: &str, key: &str) -> Result<&'a Value, RootsError> {
    match section.get(key).map(|v| v.as_slice()) {
        Some([value]) => Ok(value),
        Some(values) => Err(task_error(format!(
            "{}.{} expects one value, got {}",
            title,
            key,
            values.len()
        ))),
        None => Err(task_error(format!("{}.{} is missing", title, key))),
    }
}

fn text(value: &Value) -> String {
    value.to_string()
}

fn float(value: &Value, what: &str) -> Result<f64, RootsError> {
    value
        .as_float()
        .ok_or_else(|| task_error(format!("{} must be a number, got '{}'", what, value)))
}

fn parse_settings(section: Option<&SectionMap>) -> Result<Settings, RootsError> {
    let mut settings = Settings::default();
    let Some(section) = section else {
        return Ok(settings);
    };
    for key in section.keys() {
        let value = single(section, "solver", key)?;
        match key.as_str() {
            "precision" => settings.precision = float(value, "solver.precision")?,
            "force_solve" => {
                settings.force_solve = value.as_boolean().ok_or_else(|| {
                    task_error(format!("solver.force_solve must be true or false, got '{}'", value))
                })?
            }
            "significant_digits" => {
                settings.significant_digits = value
                    .as_integer()
                    .and_then(|d| u32::try_from(d).ok())
                    .ok_or_else(|| {
                        task_error(format!(
                            "solver.significant_digits must be a non-negative integer, got '{}'",
                            value
                        ))
                    })?
            }
            other => return Err(task_error(format!("unknown key solver.{}", other))),
        }
    }
    Ok(settings)
}

fn parse_equation_task(section: &SectionMap) -> Result<EquationTask, RootsError> {
    let f = text(single(section, "equation", "f")?);
    let interval = section
        .get("interval")
        .ok_or_else(|| task_error("equation.interval is missing".to_string()))?;
    let (interval_l, interval_r) = match interval.as_slice() {
        [l, r] => (
            float(l, "equation.interval")?,
            float(r, "equation.interval")?,
        ),
        other => {
            return Err(task_error(format!(
                "equation.interval expects two values, got {}",
                other.len()
            )));
        }
    };
    let method = match section.get("method") {
        Some(_) => {
            let name = text(single(section, "equation", "method")?);
            name.parse::<SolutionMethod>()
                .map_err(|_| task_error(format!("unknown method '{}'", name)))?
        }
        None => SolutionMethod::Newton,
    };
    let phi = match section.get("phi") {
        Some(_) => Some(text(single(section, "equation", "phi")?)),
        None => None,
    };
    Ok(EquationTask {
        f,
        interval_l,
        interval_r,
        method,
        phi,
    })
}

fn parse_system_task(
    section: &SectionMap,
    start: Option<&SectionMap>,
) -> Result<SystemTask, RootsError> {
    let mut rows = Vec::with_capacity(section.len());
    for (key, values) in section {
        match values.as_slice() {
            [f, lhs, phi] => rows.push((text(f), text(lhs), text(phi))),
            other => {
                return Err(task_error(format!(
                    "system.{} expects f, lhs, phi, got {} values",
                    key,
                    other.len()
                )));
            }
        }
    }
    let start = start.ok_or_else(|| task_error("start section is missing".to_string()))?;
    let mut point = StartingValues::new();
    for key in start.keys() {
        let value = single(start, "start", key)?;
        point.insert(key.clone(), float(value, &format!("start.{}", key))?);
    }
    Ok(SystemTask { rows, start: point })
}

/// Turn a task document into a task and the run settings.
pub fn parse_task(input: &str) -> Result<(Task, Settings), RootsError> {
    let document = parse_document(input)?;
    for title in document.keys() {
        if !matches!(title.as_str(), "equation" | "system" | "start" | "solver") {
            return Err(task_error(format!("unknown section '{}'", title)));
        }
    }
    let settings = parse_settings(document.get("solver"))?;
    let task = match (document.get("equation"), document.get("system")) {
        (Some(equation), None) => Task::Equation(parse_equation_task(equation)?),
        (None, Some(system)) => Task::System(parse_system_task(system, document.get("start"))?),
        (Some(_), Some(_)) => {
            return Err(task_error(
                "a task holds either an equation or a system, not both".to_string(),
            ));
        }
        (None, None) => {
            return Err(task_error(
                "task needs an equation or a system section".to_string(),
            ));
        }
    };
    Ok((task, settings))
}

pub fn parse_task_file(path: &Path) -> Result<(Task, Settings), RootsError> {
    let content = std::fs::read_to_string(path)?;
    parse_task(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_title_and_key() {
        let (remaining, title) = parse_title("title_1\n key1: value1").unwrap();
        assert_eq!(title, "title_1");
        assert_eq!(remaining, "key1: value1");
        let (remaining, key) = parse_key("key123: value1").unwrap();
        assert_eq!(key, "key123");
        assert_eq!(remaining, ": value1");
    }

    #[test]
    fn test_parse_value() {
        let (remaining, value) = parse_value("value1, value2").unwrap();
        assert_eq!(value, Value::String("value1".to_string()));
        assert_eq!(remaining, ", value2");
        let (_, value) = parse_value("123, next").unwrap();
        assert_eq!(value, Value::Integer(123));
        let (_, value) = parse_value("1e-4").unwrap();
        assert_eq!(value, Value::Float(1e-4));
        let (_, value) = parse_value("true").unwrap();
        assert_eq!(value, Value::Boolean(true));
        let (remaining, value) = parse_value("\"x^2 - 1, y\", next").unwrap();
        assert_eq!(value, Value::String("x^2 - 1, y".to_string()));
        assert_eq!(remaining, ", next");
    }

    #[test]
    fn test_value_list_stops_at_line_end() {
        let (remaining, values) = parse_value_list("1, 2 ,3\nkey: 4").unwrap();
        assert_eq!(
            values,
            vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]
        );
        assert_eq!(remaining, "\nkey: 4");
    }

    #[test]
    fn test_parse_document() {
        let doc = "
        // comment
        first
          a: 1, 2
          b: \"text with spaces\"
        # another comment
        second
          c: true
        ";
        let parsed = parse_document(doc).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(
            parsed["first"]["a"],
            vec![Value::Integer(1), Value::Integer(2)]
        );
        assert_eq!(
            parsed["first"]["b"],
            vec![Value::String("text with spaces".to_string())]
        );
        assert_eq!(parsed["second"]["c"], vec![Value::Boolean(true)]);
    }

    #[test]
    fn test_parse_document_malformed() {
        assert!(parse_document("").is_err());
        assert!(parse_document("title\n key value").is_err());
    }

    #[test]
    fn test_equation_task() {
        let doc = r#"
        equation
          f: "x^3 - x - 2"
          interval: 1, 2.0
          method: chord
        solver
          precision: 1e-6
          force_solve: true
          significant_digits: 10
        "#;
        let (task, settings) = parse_task(doc).unwrap();
        assert_eq!(
            task,
            Task::Equation(EquationTask {
                f: "x^3 - x - 2".to_string(),
                interval_l: 1.0,
                interval_r: 2.0,
                method: SolutionMethod::Chord,
                phi: None,
            })
        );
        assert_eq!(settings.precision, 1e-6);
        assert!(settings.force_solve);
        assert_eq!(settings.significant_digits, 10);
        if let Task::Equation(task) = task {
            assert!(task.build(&NumericContext::default()).is_ok());
        }
    }

    #[test]
    fn test_equation_task_defaults_and_phi() {
        let doc = "equation\n f: x^2-x-1\n interval: 1, 2\n phi: \"1 + 1/x\"";
        let (task, settings) = parse_task(doc).unwrap();
        assert_eq!(settings, Settings::default());
        let Task::Equation(task) = task else {
            panic!("expected an equation task");
        };
        assert_eq!(task.method, SolutionMethod::Newton);
        assert_eq!(task.phi.as_deref(), Some("1 + 1/x"));
        let equation = task.build(&NumericContext::default()).unwrap();
        assert_eq!(equation.phi_str().as_deref(), Some("(1 + (1 / x))"));
    }

    #[test]
    fn test_system_task() {
        let doc = r#"
        system
          eq1: "0.1*x1^2 + x1 + 0.2*x2^2 - 0.3", x1, "0.3 - 0.1*x1^2 - 0.2*x2^2"
          eq2: "0.2*x1^2 + x2 + 0.1*x1*x2 - 0.7", x2, "0.7 - 0.2*x1^2 - 0.1*x1*x2"
        start
          x1: 1
          x2: 1.0
        "#;
        let (task, _) = parse_task(doc).unwrap();
        let Task::System(task) = task else {
            panic!("expected a system task");
        };
        assert_eq!(task.rows.len(), 2);
        assert_eq!(task.rows[0].1, "x1");
        assert_eq!(task.start["x1"], 1.0);
        let ctx = NumericContext::default();
        let system = task.build(&ctx).unwrap();
        assert!(system.check_point(&task.starting_point(&ctx)).is_ok());
    }

    #[test]
    fn test_task_errors() {
        let missing_f = "equation\n interval: 1, 2";
        assert!(matches!(parse_task(missing_f), Err(RootsError::Task(_))));
        let bad_interval = "equation\n f: x\n interval: 1";
        assert!(matches!(parse_task(bad_interval), Err(RootsError::Task(_))));
        let bad_method = "equation\n f: x\n interval: 0, 1\n method: bisection";
        assert!(matches!(parse_task(bad_method), Err(RootsError::Task(_))));
        let no_start = "system\n eq1: x-1, x, 1";
        assert!(matches!(parse_task(no_start), Err(RootsError::Task(_))));
        let both = "equation\n f: x\n interval: 0, 1\nsystem\n eq1: x-1, x, 1\nstart\n x: 0";
        assert!(matches!(parse_task(both), Err(RootsError::Task(_))));
        let unknown = "solver\n tolerance: 1e-3";
        assert!(matches!(parse_task(unknown), Err(RootsError::Task(_))));
    }

    #[test]
    fn test_parse_task_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "equation\n  f: \"sin(x)\"\n  interval: 3, 3.5").unwrap();
        let (task, _) = parse_task_file(file.path()).unwrap();
        assert!(matches!(task, Task::Equation(_)));
        assert!(matches!(
            parse_task_file(Path::new("definitely/not/here.task")),
            Err(RootsError::Io(_))
        ));
    }
}
