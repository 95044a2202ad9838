//! Error types shared by the symbolic layer, the solvers and the command line front end.
use thiserror::Error;

/// Errors raised while turning user input into an `Equation` or an `EquationSystem`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("invalid characters in expression: {0}")]
    InvalidCharacters(String),

    #[error("invalid expression format: {0}")]
    InvalidFormat(String),

    #[error("invalid variables {found:?}, expected {expected:?}")]
    InvalidVariables {
        found: Vec<String>,
        expected: Vec<String>,
    },

    #[error("invalid interval [{l}, {r}]")]
    InvalidInterval { l: f64, r: f64 },

    #[error("the fixed-point transform cannot be built: {0}")]
    DegenerateDerivative(String),

    #[error("symbols {missing:?} have no phi, phi is given for unknown symbols {extra:?}")]
    UncoveredSymbols {
        missing: Vec<String>,
        extra: Vec<String>,
    },

    #[error("symbol '{0}' is defined by more than one phi")]
    DuplicatePhi(String),

    #[error("starting point symbols {found:?} do not match system symbols {expected:?}")]
    StartingPointMismatch {
        found: Vec<String>,
        expected: Vec<String>,
    },

    #[error("equation system is empty")]
    EmptySystem,

    #[error("invalid precision settings: {0}")]
    InvalidPrecision(String),
}

/// Raised by symbolic differentiation for nodes without a closed-form derivative.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiffError {
    #[error("function '{function}' has no symbolic derivative")]
    NotDifferentiable { function: String },
}

/// Errors raised while iterating.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error("no convergence after {iterations} iterations")]
    NoConvergence { iterations: usize },

    #[error("degenerate interval: {0}")]
    DegenerateInterval(String),

    #[error("derivative is zero at x = {x}")]
    ZeroDerivative { x: f64 },

    #[error("iterate became non-finite at iteration {iteration}")]
    NonFinite { iteration: usize },

    #[error("interval does not contain exactly one root")]
    NotExactlyOneRoot,

    #[error("convergence condition of the {method} method is not satisfied")]
    DoesNotConverge { method: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Top-level error of the crate.
#[derive(Error, Debug)]
pub enum RootsError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Solve(#[from] SolveError),

    #[error("task file error: {0}")]
    Task(String),

    #[error("failed to serialize result: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("failed to serialize result: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RootsError>;
