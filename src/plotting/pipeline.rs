//! Request/response boundary of the core: an immutable [`PlotRequest`] goes in,
//! a [`SampleSet`] or a tagged [`PlotError`] comes out.
use crate::errors::PlotError;
use crate::plotting::evaluator::{Evaluator, SampleSet};
use crate::plotting::grid::{Axis, Range, Ranges, make_grid};
use crate::symbolic::parse_expr::parse;
use crate::symbolic::symbolic_lambdify::compile;
use crate::symbolic::symbolic_validate::PlotKind;
use log::{info, warn};
use std::time::Instant;

pub const DEFAULT_EXPRESSION: &str = "sin(x) * x";
pub const DEFAULT_BOUNDS: (&str, &str) = ("-10", "10");

/// Everything the UI shell collects for one plot: formula text, kind and range
/// bounds as typed. The y range is only read for surfaces.
#[derive(Clone, Debug, PartialEq)]
pub struct PlotRequest {
    pub text: String,
    pub kind: PlotKind,
    pub x_range: (String, String),
    pub y_range: Option<(String, String)>,
}

impl Default for PlotRequest {
    fn default() -> Self {
        let bounds = (DEFAULT_BOUNDS.0.to_string(), DEFAULT_BOUNDS.1.to_string());
        PlotRequest {
            text: DEFAULT_EXPRESSION.to_string(),
            kind: PlotKind::Curve2D,
            x_range: bounds.clone(),
            y_range: Some(bounds),
        }
    }
}

impl PlotRequest {
    pub fn new(text: &str, kind: PlotKind) -> Self {
        PlotRequest {
            text: text.to_string(),
            kind,
            ..PlotRequest::default()
        }
    }

    pub fn with_x_range(mut self, min: &str, max: &str) -> Self {
        self.x_range = (min.to_string(), max.to_string());
        self
    }

    pub fn with_y_range(mut self, min: &str, max: &str) -> Self {
        self.y_range = Some((min.to_string(), max.to_string()));
        self
    }

    pub fn without_y_range(mut self) -> Self {
        self.y_range = None;
        self
    }

    /// Converts the textual bounds; y is skipped for curves.
    pub fn ranges(&self) -> Result<Ranges, PlotError> {
        let x = Range::from_text(Axis::X, &self.x_range.0, &self.x_range.1)?;
        let y = match (self.kind, &self.y_range) {
            (PlotKind::Surface3D, Some((min, max))) => Some(Range::from_text(Axis::Y, min, max)?),
            _ => None,
        };
        Ok(Ranges { x, y })
    }
}

/// Runs parse, bind, compile, sample and evaluate for one request.
pub fn run(request: &PlotRequest, evaluator: &Evaluator) -> Result<SampleSet, PlotError> {
    let begin = Instant::now();
    let outcome = run_stages(request, evaluator);
    match &outcome {
        Ok(samples) => info!(
            "plotted '{}' as {}: {} points, {} undefined, {} ms",
            request.text,
            request.kind,
            samples.len(),
            samples.undefined_count(),
            begin.elapsed().as_millis()
        ),
        Err(e) => warn!("{} stage failed for '{}': {}", e.stage(), request.text, e),
    }
    outcome
}

fn run_stages(request: &PlotRequest, evaluator: &Evaluator) -> Result<SampleSet, PlotError> {
    let expr = parse(&request.text)?;
    info!("parsed '{}' as {}", request.text, expr);
    let f = compile(&expr, request.kind)?;
    let ranges = request.ranges()?;
    let grid = make_grid(request.kind, &ranges)?;
    info!("sampling {} points for a {} plot", grid.len(), request.kind);
    Ok(evaluator.evaluate(&f, grid)?)
}

/// [`run`] with the default evaluator.
///
/// # Examples
/// ```
/// use MathCanvas::plotting::pipeline::{plot, PlotRequest};
/// use MathCanvas::symbolic::symbolic_validate::PlotKind;
/// let samples = plot(&PlotRequest::new("x^2 + y^2", PlotKind::Surface3D)).unwrap();
/// assert_eq!(samples.shape(), &[50, 50]);
/// ```
pub fn plot(request: &PlotRequest) -> Result<SampleSet, PlotError> {
    run(request, &Evaluator::default())
}
