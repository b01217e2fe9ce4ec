//! Applies a compiled function to a sample grid and tags each ordinate as
//! finite or undefined.
use crate::plotting::grid::Grid;
use crate::symbolic::symbolic_lambdify::{EvaluableFn, EvaluationError};
use log::{debug, warn};
use ndarray::{ArrayD, IxDyn};
use rayon::prelude::*;
use std::fmt;
use std::time::{Duration, Instant};

/// Default wall-clock budget for one evaluation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// One evaluated ordinate. NaN and both infinities become `Undefined`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Sample {
    Finite(f64),
    Undefined,
}

impl Sample {
    pub fn value(&self) -> Option<f64> {
        match self {
            Sample::Finite(v) => Some(*v),
            Sample::Undefined => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Sample::Finite(_))
    }
}

impl From<f64> for Sample {
    fn from(v: f64) -> Self {
        if v.is_finite() {
            Sample::Finite(v)
        } else {
            Sample::Undefined
        }
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Sample::Finite(v) => write!(f, "{}", v),
            Sample::Undefined => write!(f, "undefined"),
        }
    }
}

/// A grid paired with the value at each of its points; `values` has the grid's shape.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleSet {
    grid: Grid,
    values: ArrayD<Sample>,
}

impl SampleSet {
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn values(&self) -> &ArrayD<Sample> {
        &self.values
    }

    pub fn shape(&self) -> &[usize] {
        self.values.shape()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Sample at a multi-index (`[i]` for curves, `[row, col]` for surfaces).
    pub fn get(&self, index: &[usize]) -> Option<Sample> {
        self.values.get(IxDyn(index)).copied()
    }

    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|s| s.is_defined()).count()
    }

    pub fn undefined_count(&self) -> usize {
        self.len() - self.defined_count()
    }

    /// Smallest and largest finite value, `None` when nothing is defined.
    pub fn finite_bounds(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .filter_map(Sample::value)
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Rows of (coordinates..., sample) in row-major grid order.
    pub fn rows(&self) -> impl Iterator<Item = (Vec<f64>, Sample)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(index, sample)| (self.grid.point(index), *sample))
    }
}

/// Evaluation settings: an optional wall-clock budget and row parallelism for surfaces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Evaluator {
    pub timeout: Option<Duration>,
    pub parallel: bool,
}

impl Default for Evaluator {
    fn default() -> Self {
        Evaluator {
            timeout: Some(DEFAULT_TIMEOUT),
            parallel: true,
        }
    }
}

impl Evaluator {
    pub fn new(timeout: Option<Duration>, parallel: bool) -> Self {
        Evaluator { timeout, parallel }
    }

    /// Evaluates `f` over the whole grid.
    ///
    /// The function's arity has to match the grid dimensionality. Parallel and
    /// sequential paths give identical results.
    pub fn evaluate(&self, f: &EvaluableFn, grid: Grid) -> Result<SampleSet, EvaluationError> {
        let expected = grid.arguments().len();
        if f.arity() != expected {
            return Err(EvaluationError::ArgumentCount {
                expected,
                found: f.arity(),
            });
        }
        let deadline = self.timeout.map(|t| Instant::now() + t);
        let begin = Instant::now();
        let raw = match &grid {
            Grid::Surface { x, y } if self.parallel && x.nrows() > 1 => {
                let rows: Vec<ArrayD<f64>> = (0..x.nrows())
                    .into_par_iter()
                    .map(|i| {
                        f.call_with_deadline(&[x.row(i).into_dyn(), y.row(i).into_dyn()], deadline)
                    })
                    .collect::<Result<_, _>>()?;
                let mut flat = Vec::with_capacity(grid.len());
                for row in &rows {
                    flat.extend(row.iter().copied());
                }
                let found = vec![flat.len()];
                ArrayD::from_shape_vec(IxDyn(grid.shape()), flat).map_err(|_| {
                    EvaluationError::ShapeMismatch {
                        expected: grid.shape().to_vec(),
                        found,
                    }
                })?
            }
            _ => f.call_with_deadline(&grid.arguments(), deadline)?,
        };
        if raw.shape() != grid.shape() {
            return Err(EvaluationError::ShapeMismatch {
                expected: grid.shape().to_vec(),
                found: raw.shape().to_vec(),
            });
        }
        let values = raw.mapv(Sample::from);
        let samples = SampleSet { grid, values };
        let undefined = samples.undefined_count();
        if undefined == samples.len() && !samples.is_empty() {
            warn!("no point of the {} grid is defined", samples.grid.kind());
        }
        debug!(
            "evaluated {} points ({} undefined) in {:?}",
            samples.len(),
            undefined,
            begin.elapsed()
        );
        Ok(samples)
    }
}

/// Evaluates `f` over `grid` with the default settings.
///
/// # Examples
/// ```
/// use MathCanvas::plotting::evaluator::{evaluate, Sample};
/// use MathCanvas::plotting::grid::Grid;
/// use MathCanvas::symbolic::parse_expr::parse;
/// use MathCanvas::symbolic::symbolic_lambdify::compile;
/// use MathCanvas::symbolic::symbolic_validate::PlotKind;
/// use ndarray::array;
/// let f = compile(&parse("1/x").unwrap(), PlotKind::Curve2D).unwrap();
/// let samples = evaluate(&f, Grid::curve_from_points(array![0.0, 2.0])).unwrap();
/// assert_eq!(samples.get(&[0]), Some(Sample::Undefined));
/// assert_eq!(samples.get(&[1]), Some(Sample::Finite(0.5)));
/// ```
pub fn evaluate(f: &EvaluableFn, grid: Grid) -> Result<SampleSet, EvaluationError> {
    Evaluator::default().evaluate(f, grid)
}
