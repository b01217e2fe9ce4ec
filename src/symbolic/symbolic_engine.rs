//! # Symbolic Engine Module
//!
//! Expression tree produced by the parser and consumed by the binder and the
//! numeric compiler. The tree is immutable once built: every transformation
//! (validation, compilation) walks it by reference and builds its own output.
//!
//! ## Main Structures
//!
//! ### `Expr` Enum
//! - **Constants**: `Const(f64)` - numeric literals and named constants (`pi`, `e`)
//! - **Variables**: `Var(String)` - free variables, `x` and `y` when produced by the parser
//! - **Unary operations**: `Unary(UnaryOp, operand)` - negation
//! - **Binary operations**: `Binary(BinaryOp, left, right)` - `+ - * / ^`
//! - **Function calls**: `Call(Func, args)` - closed whitelist of elementary functions
//!
//! ### `Func` Enum
//! The whitelist of callable functions. Names are mapped to variants with
//! `strum`, so the set of accepted identifiers is exactly the set of variants.
//!
//! ## Interesting Code Features
//!
//! 1. **Operator Overloading**: `std::ops` traits build trees with natural syntax,
//!    `x.clone() * x + Expr::Const(1.0)`
//!
//! 2. **Re-parseable Display**: printing brackets every operator node (a chain of
//!    one precedence level shares one pair), so the printed form parses back to
//!    the same tree

#![allow(non_camel_case_types)]

use itertools::Itertools;
use std::fmt;
use strum_macros::{Display, EnumIter, EnumString};

/// Names of the free variables the parser recognises.
pub const VARIABLE_X: &str = "x";
pub const VARIABLE_Y: &str = "y";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Arithmetic negation: -operand
    Neg,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    /// Exponentiation, right-associative: a ^ b ^ c == a ^ (b ^ c)
    Pow,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
        }
    }

    /// True when `self` continues a left-leaning chain of `parent` without
    /// brackets: `a - b + c` reads as `(a - b) + c`.
    pub fn chains_with(&self, parent: BinaryOp) -> bool {
        match (self, parent) {
            (BinaryOp::Add | BinaryOp::Sub, BinaryOp::Add | BinaryOp::Sub) => true,
            (BinaryOp::Mul | BinaryOp::Div, BinaryOp::Mul | BinaryOp::Div) => true,
            _ => false,
        }
    }

    /// IEEE-754 semantics, never panics: 1/0 = inf, 0/0 = NaN, (-8)^(1/3) = NaN
    #[inline(always)]
    pub fn apply(&self, lhs: f64, rhs: f64) -> f64 {
        match self {
            BinaryOp::Add => lhs + rhs,
            BinaryOp::Sub => lhs - rhs,
            BinaryOp::Mul => lhs * rhs,
            BinaryOp::Div => lhs / rhs,
            BinaryOp::Pow => lhs.powf(rhs),
        }
    }
}

/// Whitelisted functions. Every variant takes exactly one argument.
///
/// `ln` is accepted as a spelling of `log` (natural logarithm) and prints as `log`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Func {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Exp,
    #[strum(to_string = "log", serialize = "ln")]
    Log,
    Sqrt,
    Abs,
}

impl Func {
    pub fn arity(&self) -> usize {
        1
    }

    /// Domain errors surface as NaN (log(-1), sqrt(-1), asin(2)) and poles as
    /// infinities (log(0) = -inf), following f64 semantics.
    #[inline(always)]
    pub fn apply(&self, arg: f64) -> f64 {
        match self {
            Func::Sin => arg.sin(),
            Func::Cos => arg.cos(),
            Func::Tan => arg.tan(),
            Func::Asin => arg.asin(),
            Func::Acos => arg.acos(),
            Func::Atan => arg.atan(),
            Func::Sinh => arg.sinh(),
            Func::Cosh => arg.cosh(),
            Func::Tanh => arg.tanh(),
            Func::Exp => arg.exp(),
            Func::Log => arg.ln(),
            Func::Sqrt => arg.sqrt(),
            Func::Abs => arg.abs(),
        }
    }
}

/// Core symbolic expression enum representing a formula as a syntax tree.
///
/// # Examples
/// ```
/// use MathCanvas::symbolic::symbolic_engine::{Expr, Func};
/// let x = Expr::var("x");
/// let expr = Expr::call(Func::Sin, x.clone()) * x;
/// assert_eq!(expr.to_string(), "(sin(x) * x)");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Numerical constant value
    Const(f64),
    /// Free variable with a name (e.g., "x", "y")
    Var(String),
    /// Unary operation applied to an operand
    Unary(UnaryOp, Box<Expr>),
    /// Binary operation: left op right
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// Whitelisted function applied to an ordered list of arguments
    Call(Func, Vec<Expr>),
}

/// Parenthesized printing: every operator node is bracketed, except that a
/// left-leaning chain of one precedence level shares a single pair,
/// `x + 2 - y` prints as `(x + 2 - y)`. `parse` accepts everything printed
/// here, so `parse(&expr.to_string())` rebuilds the same tree.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Const(val) if *val < 0.0 => write!(f, "(-{})", -val),
            Expr::Const(val) => write!(f, "{}", val),
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Unary(UnaryOp::Neg, operand) => write!(f, "(-{})", operand),
            Expr::Binary(op, lhs, rhs) => {
                write!(f, "(")?;
                lhs.fmt_chain(f, *op)?;
                write!(f, " {} {})", op.symbol(), rhs)
            }
            Expr::Call(func, args) => write!(f, "{}({})", func, args.iter().join(", ")),
        }
    }
}

impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::Binary(BinaryOp::Add, self.boxed(), rhs.boxed())
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::Binary(BinaryOp::Sub, self.boxed(), rhs.boxed())
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::Binary(BinaryOp::Mul, self.boxed(), rhs.boxed())
    }
}

impl std::ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Expr::Binary(BinaryOp::Div, self.boxed(), rhs.boxed())
    }
}

impl std::ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Expr::Unary(UnaryOp::Neg, self.boxed())
    }
}

impl Expr {
    /// Creates a variable node.
    pub fn var(name: &str) -> Expr {
        Expr::Var(name.to_string())
    }

    /// Creates a one-argument function call node.
    pub fn call(func: Func, arg: Expr) -> Expr {
        Expr::Call(func, vec![arg])
    }

    /// Creates power expression self^rhs.
    pub fn pow(self, rhs: Expr) -> Expr {
        Expr::Binary(BinaryOp::Pow, self.boxed(), rhs.boxed())
    }

    /// Convenience method to wrap expression in Box for recursive structures.
    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    /// Extracts all unique variable names from the expression.
    ///
    /// # Returns
    /// Vector of unique variable names in alphabetical order
    ///
    /// # Examples
    /// ```
    /// use MathCanvas::symbolic::symbolic_engine::Expr;
    /// let expr = Expr::var("y") * Expr::var("x") + Expr::var("x");
    /// assert_eq!(expr.all_arguments_are_variables(), vec!["x", "y"]);
    /// ```
    pub fn all_arguments_are_variables(&self) -> Vec<String> {
        let mut vars = Vec::new();
        self.collect_variables(&mut vars);
        vars.sort();
        vars.dedup();
        vars
    }

    fn collect_variables(&self, vars: &mut Vec<String>) {
        match self {
            Expr::Var(name) => vars.push(name.clone()),
            Expr::Const(_) => {}
            Expr::Unary(_, operand) => operand.collect_variables(vars),
            Expr::Binary(_, lhs, rhs) => {
                lhs.collect_variables(vars);
                rhs.collect_variables(vars);
            }
            Expr::Call(_, args) => args.iter().for_each(|arg| arg.collect_variables(vars)),
        }
    }

    fn fmt_chain(&self, f: &mut fmt::Formatter, parent: BinaryOp) -> fmt::Result {
        match self {
            Expr::Binary(op, lhs, rhs) if op.chains_with(parent) => {
                lhs.fmt_chain(f, *op)?;
                write!(f, " {} {}", op.symbol(), rhs)
            }
            other => write!(f, "{}", other),
        }
    }

    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        match self {
            Expr::Const(_) | Expr::Var(_) => 1,
            Expr::Unary(_, operand) => 1 + operand.node_count(),
            Expr::Binary(_, lhs, rhs) => 1 + lhs.node_count() + rhs.node_count(),
            Expr::Call(_, args) => 1 + args.iter().map(Expr::node_count).sum::<usize>(),
        }
    }
}
