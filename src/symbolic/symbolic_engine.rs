//! # Symbolic Engine Module
//!
//! Core expression tree used by every other part of the crate. Equations typed by the user are
//! parsed into `Expr`, differentiated symbolically, simplified for display and finally turned into
//! plain Rust closures for the numerical solvers.
//!
//! ## Main Structures
//!
//! ### `Expr` Enum
//! - **Variables**: `Var(String)` - symbolic variables like "x", "x1"
//! - **Constants**: `Const(f64)` - numerical literals, `Named(NamedConst)` - `pi`, `e` and `tau`,
//!   kept symbolic so they are evaluated to the full working precision
//! - **Operations**: `Add`, `Sub`, `Mul`, `Div`, `Pow` - basic arithmetic
//! - **Functions**: `Func(MathFn, arg)` and `Func2(MathFn2, arg, arg)` - functions from the whitelist
//!
//! ### `MathFn` and `MathFn2` Enums
//! The whitelist of callable functions. The set of names accepted in user input is derived from
//! these enums with `strum`, so adding a variant makes it parseable, printable and evaluable at once.
//! `pow(a, b)` is accepted too and parsed into `a ^ b`.
//!
//! ## Interesting Code Features
//!
//! 1. **Operator Overloading**: `std::ops` traits give natural syntax: `x.clone() * x - Expr::Const(1.0)`
//! 2. **Negation**: `-e` is stored as `(-1) * e`, so the tree keeps only binary arithmetic nodes
//! 3. **Fully parenthesized Display**: printed expressions can be parsed back without
//!    precedence ambiguity

#![allow(non_camel_case_types)]

use crate::numerical::real::Real;
use std::collections::BTreeSet;
use std::fmt;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// One-argument functions that may appear in an expression.
///
/// `log` and `ln` are both the natural logarithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display, AsRefStr)]
pub enum MathFn {
    sqrt,
    cbrt,
    exp,
    exp2,
    log,
    ln,
    log10,
    log2,
    log1p,
    expm1,
    sin,
    cos,
    tan,
    asin,
    acos,
    atan,
    sinh,
    cosh,
    tanh,
    asinh,
    acosh,
    atanh,
    fabs,
    floor,
    ceil,
    trunc,
    degrees,
    radians,
}

impl MathFn {
    /// evaluate the function at a point
    pub fn apply(self, v: &Real) -> Real {
        match self {
            MathFn::sqrt => v.sqrt(),
            MathFn::cbrt => v.cbrt(),
            MathFn::exp => v.exp(),
            MathFn::exp2 => v.exp2(),
            MathFn::log | MathFn::ln => v.ln(),
            MathFn::log10 => v.log10(),
            MathFn::log2 => v.log2(),
            MathFn::log1p => v.ln_1p(),
            MathFn::expm1 => v.exp_m1(),
            MathFn::sin => v.sin(),
            MathFn::cos => v.cos(),
            MathFn::tan => v.tan(),
            MathFn::asin => v.asin(),
            MathFn::acos => v.acos(),
            MathFn::atan => v.atan(),
            MathFn::sinh => v.sinh(),
            MathFn::cosh => v.cosh(),
            MathFn::tanh => v.tanh(),
            MathFn::asinh => v.asinh(),
            MathFn::acosh => v.acosh(),
            MathFn::atanh => v.atanh(),
            MathFn::fabs => v.abs(),
            MathFn::floor => v.floor(),
            MathFn::ceil => v.ceil(),
            MathFn::trunc => v.trunc(),
            MathFn::degrees => {
                let half_turn = Real::from_f64(180.0, v.bits());
                &(v * &half_turn) / &Real::pi(v.bits())
            }
            MathFn::radians => {
                let half_turn = Real::from_f64(180.0, v.bits());
                &(v * &Real::pi(v.bits())) / &half_turn
            }
        }
    }
}

/// Two-argument functions. `atan2(y, x)` takes the ordinate first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display, AsRefStr)]
pub enum MathFn2 {
    hypot,
    atan2,
}

impl MathFn2 {
    pub fn apply(self, a: &Real, b: &Real) -> Real {
        match self {
            MathFn2::hypot => a.hypot(b),
            MathFn2::atan2 => a.atan2(b),
        }
    }
}

/// Mathematical constants accepted by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display, AsRefStr)]
pub enum NamedConst {
    pi,
    e,
    tau,
}

impl NamedConst {
    pub fn value(self, bits: usize) -> Real {
        match self {
            NamedConst::pi => Real::pi(bits),
            NamedConst::e => Real::e(bits),
            NamedConst::tau => &Real::pi(bits) + &Real::pi(bits),
        }
    }
}

/// Symbolic expression tree.
///
/// # Examples
/// ```rust, ignore
/// use RustedRoots::symbolic::symbolic_engine::Expr;
/// let x = Expr::Var("x".to_string());
/// let expr = x.clone() * x - Expr::Const(1.0);
/// assert_eq!(expr.to_string(), "((x * x) - 1)");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Symbolic variable with a name (e.g., "x", "x1")
    Var(String),
    /// Numerical constant value
    Const(f64),
    /// `pi`, `e` or `tau`
    Named(NamedConst),
    /// Addition operation: left + right
    Add(Box<Expr>, Box<Expr>),
    /// Subtraction operation: left - right
    Sub(Box<Expr>, Box<Expr>),
    /// Multiplication operation: left * right
    Mul(Box<Expr>, Box<Expr>),
    /// Division operation: left / right
    Div(Box<Expr>, Box<Expr>),
    /// Power operation: base ^ exponent
    Pow(Box<Expr>, Box<Expr>),
    /// Whitelisted one-argument function
    Func(MathFn, Box<Expr>),
    /// Whitelisted two-argument function
    Func2(MathFn2, Box<Expr>, Box<Expr>),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Const(val) => write!(f, "{}", val),
            Expr::Named(name) => write!(f, "{}", name),
            Expr::Add(lhs, rhs) => write!(f, "({} + {})", lhs, rhs),
            Expr::Sub(lhs, rhs) => write!(f, "({} - {})", lhs, rhs),
            Expr::Mul(lhs, rhs) => write!(f, "({} * {})", lhs, rhs),
            Expr::Div(lhs, rhs) => write!(f, "({} / {})", lhs, rhs),
            Expr::Pow(base, exp) => write!(f, "({} ^ {})", base, exp),
            Expr::Func(func, arg) => write!(f, "{}({})", func, arg),
            Expr::Func2(func, a, b) => write!(f, "{}({}, {})", func, a, b),
        }
    }
}

impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::Add(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::Sub(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::Mul(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Expr::Div(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(self))
    }
}

impl Expr {
    /// Create multiple variables from a comma-separated string: `Expr::Symbols("x1, x2")`
    pub fn Symbols(symbols: &str) -> Vec<Expr> {
        symbols
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| Expr::Var(s.to_string()))
            .collect()
    }

    /// Wrap expression in Box for recursive structures.
    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    pub fn pow(self, rhs: Expr) -> Expr {
        Expr::Pow(self.boxed(), rhs.boxed())
    }

    /// apply a whitelisted function to the expression
    pub fn apply_fn(self, func: MathFn) -> Expr {
        Expr::Func(func, self.boxed())
    }

    pub fn apply_fn2(self, func: MathFn2, other: Expr) -> Expr {
        Expr::Func2(func, self.boxed(), other.boxed())
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Const(val) if *val == 0.0)
    }

    /// check if the expression contains a variable
    pub fn contains_variable(&self, var_name: &str) -> bool {
        match self {
            Expr::Var(name) => name == var_name,
            Expr::Const(_) | Expr::Named(_) => false,
            Expr::Add(lhs, rhs)
            | Expr::Sub(lhs, rhs)
            | Expr::Mul(lhs, rhs)
            | Expr::Div(lhs, rhs)
            | Expr::Pow(lhs, rhs)
            | Expr::Func2(_, lhs, rhs) => {
                lhs.contains_variable(var_name) || rhs.contains_variable(var_name)
            }
            Expr::Func(_, arg) => arg.contains_variable(var_name),
        }
    }

    /// Sorted set of free symbols of the expression.
    pub fn free_symbols(&self) -> BTreeSet<String> {
        let mut symbols = BTreeSet::new();
        self.collect_symbols(&mut symbols);
        symbols
    }

    fn collect_symbols(&self, acc: &mut BTreeSet<String>) {
        match self {
            Expr::Var(name) => {
                acc.insert(name.clone());
            }
            Expr::Const(_) | Expr::Named(_) => {}
            Expr::Add(lhs, rhs)
            | Expr::Sub(lhs, rhs)
            | Expr::Mul(lhs, rhs)
            | Expr::Div(lhs, rhs)
            | Expr::Pow(lhs, rhs)
            | Expr::Func2(_, lhs, rhs) => {
                lhs.collect_symbols(acc);
                rhs.collect_symbols(acc);
            }
            Expr::Func(_, arg) => arg.collect_symbols(acc),
        }
    }
}
