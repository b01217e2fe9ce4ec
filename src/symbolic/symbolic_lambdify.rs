//! LAMBDIFICATION - turns a validated expression into a function over arrays.
//!
//! Compilation resolves variable names to argument slots once, producing an
//! index-based [`Lambda`] tree. Evaluating the tree maps every node to one
//! elementwise array operation, so the whole grid is processed per node instead
//! of walking the tree once per point.
use crate::errors::PlotError;
use crate::symbolic::symbolic_engine::{BinaryOp, Expr, Func, UnaryOp};
use crate::symbolic::symbolic_validate::{BindError, PlotKind, validate};
use log::debug;
use ndarray::{ArrayD, ArrayViewD, IxDyn, Zip};
use std::fmt;
use std::time::Instant;

/// Failure while applying a compiled function. These indicate a broken
/// contract between compiler and sampler (or an exceeded deadline), never bad
/// numeric data: NaN and infinities are ordinary results.
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationError {
    ArgumentCount { expected: usize, found: usize },
    ShapeMismatch { expected: Vec<usize>, found: Vec<usize> },
    Timeout,
}

impl EvaluationError {
    pub fn reason(&self) -> &'static str {
        match self {
            EvaluationError::ArgumentCount { .. } => "argument count mismatch",
            EvaluationError::ShapeMismatch { .. } => "shape mismatch",
            EvaluationError::Timeout => "timeout",
        }
    }
}

impl fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EvaluationError::ArgumentCount { expected, found } => write!(
                f,
                "evaluation failed: {} (expected {}, got {})",
                self.reason(),
                expected,
                found
            ),
            EvaluationError::ShapeMismatch { expected, found } => write!(
                f,
                "evaluation failed: {} (expected {:?}, got {:?})",
                self.reason(),
                expected,
                found
            ),
            EvaluationError::Timeout => write!(f, "evaluation failed: {}", self.reason()),
        }
    }
}

impl std::error::Error for EvaluationError {}

/// Expression tree with variables replaced by argument indices.
#[derive(Clone, Debug, PartialEq)]
pub enum Lambda {
    Var(usize),
    Const(f64),
    Unary(UnaryOp, Box<Lambda>),
    Binary(BinaryOp, Box<Lambda>, Box<Lambda>),
    Call(Func, Box<Lambda>),
}

fn check_deadline(deadline: Option<Instant>) -> Result<(), EvaluationError> {
    match deadline {
        Some(at) if Instant::now() > at => Err(EvaluationError::Timeout),
        _ => Ok(()),
    }
}

impl Lambda {
    /// Scalar evaluation at a single point. `args` must cover every index the
    /// tree refers to; [`EvaluableFn::eval_point`] checks that.
    #[inline(always)]
    pub(crate) fn eval(&self, args: &[f64]) -> f64 {
        match self {
            Lambda::Var(i) => args[*i],
            Lambda::Const(v) => *v,
            Lambda::Unary(UnaryOp::Neg, e) => -e.eval(args),
            Lambda::Binary(op, a, b) => op.apply(a.eval(args), b.eval(args)),
            Lambda::Call(func, e) => func.apply(e.eval(args)),
        }
    }

    /// Elementwise evaluation; every argument has shape `shape`.
    pub(crate) fn eval_array(
        &self,
        args: &[ArrayViewD<f64>],
        shape: &[usize],
        deadline: Option<Instant>,
    ) -> Result<ArrayD<f64>, EvaluationError> {
        check_deadline(deadline)?;
        match self {
            Lambda::Var(i) => Ok(args[*i].to_owned()),
            Lambda::Const(v) => Ok(ArrayD::from_elem(IxDyn(shape), *v)),
            Lambda::Unary(UnaryOp::Neg, e) => {
                let mut values = e.eval_array(args, shape, deadline)?;
                values.mapv_inplace(|v| -v);
                Ok(values)
            }
            Lambda::Binary(op, a, b) => {
                let mut lhs = a.eval_array(args, shape, deadline)?;
                let rhs = b.eval_array(args, shape, deadline)?;
                Zip::from(&mut lhs)
                    .and(&rhs)
                    .for_each(|l, &r| *l = op.apply(*l, r));
                Ok(lhs)
            }
            Lambda::Call(func, e) => {
                let mut values = e.eval_array(args, shape, deadline)?;
                values.mapv_inplace(|v| func.apply(v));
                Ok(values)
            }
        }
    }
}

/// Pure function produced by [`compile`]: one array argument for curves, two
/// same-shaped arrays (x then y) for surfaces.
#[derive(Clone, Debug)]
pub struct EvaluableFn {
    kind: PlotKind,
    lambda: Lambda,
}

impl EvaluableFn {
    pub fn kind(&self) -> PlotKind {
        self.kind
    }

    pub fn arity(&self) -> usize {
        self.kind.arity()
    }

    pub fn lambda(&self) -> &Lambda {
        &self.lambda
    }

    /// Applies the function to whole arrays at once.
    pub fn call(&self, args: &[ArrayViewD<f64>]) -> Result<ArrayD<f64>, EvaluationError> {
        self.call_with_deadline(args, None)
    }

    /// As [`EvaluableFn::call`], giving up with [`EvaluationError::Timeout`] once
    /// `deadline` has passed. The deadline is checked before every array operation.
    pub fn call_with_deadline(
        &self,
        args: &[ArrayViewD<f64>],
        deadline: Option<Instant>,
    ) -> Result<ArrayD<f64>, EvaluationError> {
        if args.len() != self.arity() {
            return Err(EvaluationError::ArgumentCount {
                expected: self.arity(),
                found: args.len(),
            });
        }
        let shape = args[0].shape();
        if let Some(other) = args.iter().find(|a| a.shape() != shape) {
            return Err(EvaluationError::ShapeMismatch {
                expected: shape.to_vec(),
                found: other.shape().to_vec(),
            });
        }
        self.lambda.eval_array(args, shape, deadline)
    }

    /// Evaluates at a single point given in argument order.
    pub fn eval_point(&self, point: &[f64]) -> Result<f64, EvaluationError> {
        if point.len() != self.arity() {
            return Err(EvaluationError::ArgumentCount {
                expected: self.arity(),
                found: point.len(),
            });
        }
        Ok(self.lambda.eval(point))
    }
}

impl Expr {
    /// Resolves variables to the argument slots declared by `kind`.
    fn to_lambda(&self, kind: PlotKind) -> Result<Lambda, PlotError> {
        Ok(match self {
            Expr::Var(name) => match kind.variables().iter().position(|v| *v == name.as_str()) {
                Some(index) => Lambda::Var(index),
                None => {
                    return Err(PlotError::Bind(BindError {
                        symbol: name.clone(),
                        kind,
                    }));
                }
            },
            Expr::Const(v) => Lambda::Const(*v),
            Expr::Unary(op, e) => Lambda::Unary(*op, Box::new(e.to_lambda(kind)?)),
            Expr::Binary(op, a, b) => Lambda::Binary(
                *op,
                Box::new(a.to_lambda(kind)?),
                Box::new(b.to_lambda(kind)?),
            ),
            Expr::Call(func, args) => match args.as_slice() {
                [arg] => Lambda::Call(*func, Box::new(arg.to_lambda(kind)?)),
                _ => {
                    return Err(PlotError::Evaluation(EvaluationError::ArgumentCount {
                        expected: func.arity(),
                        found: args.len(),
                    }));
                }
            },
        })
    }
}

/// Validates `expr` against `kind` and compiles it into an [`EvaluableFn`].
///
/// Compilation does not evaluate anything. Fails with a bind error for
/// undeclared variables, and with an evaluation error for calls built with the
/// wrong number of arguments (only possible for trees built by hand).
///
/// # Examples
/// ```
/// use MathCanvas::symbolic::parse_expr::parse;
/// use MathCanvas::symbolic::symbolic_lambdify::compile;
/// use MathCanvas::symbolic::symbolic_validate::PlotKind;
/// let f = compile(&parse("2x + 1").unwrap(), PlotKind::Curve2D).unwrap();
/// assert_eq!(f.eval_point(&[3.0]).unwrap(), 7.0);
/// ```
pub fn compile(expr: &Expr, kind: PlotKind) -> Result<EvaluableFn, PlotError> {
    validate(expr, kind)?;
    let lambda = expr.to_lambda(kind)?;
    debug!(
        "compiled {} ({} nodes) for a {} plot",
        expr,
        expr.node_count(),
        kind
    );
    Ok(EvaluableFn { kind, lambda })
}
