//! From a compiled expression to plot-ready sample data
/// evenly spaced abscissas and x-y meshes over checked ranges
pub mod grid;
/// applies a compiled function to a grid, NaN/Inf become undefined samples
pub mod evaluator;
/// one plot request in, a sample set or a tagged error out
///
/// Example#
/// ```
/// use MathCanvas::plotting::pipeline::{plot, PlotRequest};
/// use MathCanvas::symbolic::symbolic_validate::PlotKind;
/// let request = PlotRequest::new("1/x", PlotKind::Curve2D).with_x_range("-1", "1");
/// let samples = plot(&request).unwrap();
/// println!("{} points, {} undefined", samples.len(), samples.undefined_count());
/// ```
pub mod pipeline;
