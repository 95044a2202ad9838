//! Command line front end: solve one equation, a system, or a task file.
use clap::{Parser, Subcommand};
use log::LevelFilter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use strum::IntoEnumIterator;

use RustedRoots::Utils::logger::init_logger;
use RustedRoots::Utils::settings::Settings;
use RustedRoots::Utils::task_parser::{EquationTask, SystemTask, Task, parse_task_file};
use RustedRoots::Utils::writer::{EquationReport, Report, ResultWriter, SystemReport};
use RustedRoots::error::{Result, RootsError};
use RustedRoots::numerical::Scalar_solvers::solver_traits::SolutionMethod;
use RustedRoots::numerical::System_solvers::system_solver_traits::SystemSolutionMethod;
use RustedRoots::numerical::equation_system::{EquationSystem, StartingValues, starting_point};
use RustedRoots::numerical::presets::SystemPreset;
use RustedRoots::numerical::solve_api::{solve_equation, solve_system};

/// Root finder for nonlinear equations and systems
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Debug level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Solve even when the convergence condition of the method fails
    #[arg(long, global = true)]
    force_solve_system: bool,

    /// Also write the log to this file
    #[arg(long, global = true, value_name = "FILE")]
    log_file: Option<String>,

    /// Significant decimal digits of every computation
    #[arg(long, global = true)]
    digits: Option<u32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Solve f(x) = 0 on [left, right]
    Equation {
        /// Left-hand side of f(x) = 0
        #[arg(allow_hyphen_values = true)]
        f: String,
        #[arg(long, allow_negative_numbers = true)]
        left: f64,
        #[arg(long, allow_negative_numbers = true)]
        right: f64,
        /// chord, newton or fixed-point
        #[arg(long, default_value = "newton")]
        method: SolutionMethod,
        /// Fixed-point form x = phi(x), built automatically when omitted
        #[arg(long, allow_hyphen_values = true)]
        phi: Option<String>,
        #[arg(long)]
        precision: Option<f64>,
        /// Report file; `.toml` and `.json` select the format, anything else is plain text
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
        /// Print every iterate
        #[arg(long)]
        trace: bool,
    },
    /// Solve a system by fixed-point iteration
    System {
        /// Built-in system, see `presets`
        #[arg(long, conflicts_with = "task", required_unless_present = "task")]
        preset: Option<SystemPreset>,
        /// Task file with `system` and `start` sections
        #[arg(long, value_name = "FILE")]
        task: Option<PathBuf>,
        /// Override a starting value, e.g. --start x1=0.5
        #[arg(long, value_parser = parse_start, allow_hyphen_values = true)]
        start: Vec<(String, f64)>,
        #[arg(long)]
        precision: Option<f64>,
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
        #[arg(long)]
        trace: bool,
    },
    /// Run a task file
    Task {
        file: PathBuf,
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
        #[arg(long)]
        trace: bool,
    },
    /// List the built-in systems
    Presets,
}

fn parse_start(s: &str) -> std::result::Result<(String, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", s))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("bad value for {}: {}", name, e))?;
    Ok((name.trim().to_string(), value))
}

fn emit(
    report: &dyn Report,
    settings: &Settings,
    output: Option<&Path>,
) -> Result<()> {
    let writer = ResultWriter::new(settings.numeric_context()?);
    println!("{}", writer.summary(report));
    if let Some(path) = output {
        writer.write(report, path)?;
    }
    Ok(())
}

fn run_equation(
    task: &EquationTask,
    settings: &Settings,
    output: Option<&Path>,
    trace: bool,
) -> Result<()> {
    let ctx = settings.numeric_context()?;
    let equation = task.build(&ctx)?;
    let solution = solve_equation(&equation, task.method, settings, &mut |x, i| {
        if trace {
            println!("{:>4}  x = {}", i, ctx.format(x));
        }
    })?;
    let report = EquationReport::new(&equation, task.method, &solution);
    emit(&report, settings, output)
}

fn run_system(
    system: &EquationSystem,
    start: &StartingValues,
    settings: &Settings,
    output: Option<&Path>,
    trace: bool,
) -> Result<()> {
    let ctx = settings.numeric_context()?;
    let method = SystemSolutionMethod::FixedPointIteration;
    let start = starting_point(start, &ctx);
    let result = solve_system(system, &start, method, settings, &mut |xs, i| {
        if trace {
            let values: Vec<String> = xs
                .iter()
                .map(|(name, value)| format!("{} = {}", name, ctx.format(value)))
                .collect();
            println!("{:>4}  {}", i, values.join(", "));
        }
    })?;
    let report = SystemReport::new(system, method, &result);
    emit(&report, settings, output)
}

fn system_task_from_file(path: &Path) -> Result<(SystemTask, Settings)> {
    match parse_task_file(path)? {
        (Task::System(task), settings) => Ok((task, settings)),
        (Task::Equation(_), _) => Err(RootsError::Task(format!(
            "{} describes a single equation, not a system",
            path.display()
        ))),
    }
}

fn run(cli: Cli) -> Result<()> {
    let log_level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    init_logger(log_level, cli.log_file.as_deref())?;
    let defaults = Settings::default();
    let base = Settings {
        force_solve: cli.force_solve_system,
        significant_digits: cli.digits.unwrap_or(defaults.significant_digits),
        log_level,
        log_file: cli.log_file.clone(),
        ..defaults
    };

    match cli.command {
        Command::Equation {
            f,
            left,
            right,
            method,
            phi,
            precision,
            output,
            trace,
        } => {
            let settings = Settings {
                precision: precision.unwrap_or(base.precision),
                ..base
            };
            let task = EquationTask {
                f,
                interval_l: left,
                interval_r: right,
                method,
                phi,
            };
            run_equation(&task, &settings, output.as_deref(), trace)
        }
        Command::System {
            preset,
            task,
            start,
            precision,
            output,
            trace,
        } => {
            let (system, mut point, settings) = match (preset, task) {
                (Some(preset), _) => {
                    let ctx = base.numeric_context()?;
                    (preset.system(&ctx)?, preset.starting_values(), base)
                }
                (None, Some(path)) => {
                    let (task, file_settings) = system_task_from_file(&path)?;
                    let settings = Settings {
                        force_solve: file_settings.force_solve || base.force_solve,
                        significant_digits: cli.digits.unwrap_or(file_settings.significant_digits),
                        log_level: base.log_level,
                        log_file: base.log_file,
                        ..file_settings
                    };
                    let ctx = settings.numeric_context()?;
                    (task.build(&ctx)?, task.start, settings)
                }
                (None, None) => {
                    return Err(RootsError::Task(
                        "either --preset or --task is required".to_string(),
                    ));
                }
            };
            for (name, value) in start {
                point.insert(name, value);
            }
            let settings = Settings {
                precision: precision.unwrap_or(settings.precision),
                ..settings
            };
            run_system(&system, &point, &settings, output.as_deref(), trace)
        }
        Command::Task {
            file,
            output,
            trace,
        } => {
            let (task, file_settings) = parse_task_file(&file)?;
            let settings = Settings {
                force_solve: file_settings.force_solve || base.force_solve,
                significant_digits: cli.digits.unwrap_or(file_settings.significant_digits),
                log_level: base.log_level,
                log_file: base.log_file,
                ..file_settings
            };
            match task {
                Task::Equation(task) => run_equation(&task, &settings, output.as_deref(), trace),
                Task::System(task) => {
                    let system = task.build(&settings.numeric_context()?)?;
                    run_system(&system, &task.start, &settings, output.as_deref(), trace)
                }
            }
        }
        Command::Presets => {
            for preset in SystemPreset::iter() {
                println!("{}: {}", preset, preset.describe());
            }
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
