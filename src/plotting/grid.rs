//! Sample grids: evenly spaced abscissas for curves, a meshgrid for surfaces.
use crate::symbolic::symbolic_validate::PlotKind;
use log::debug;
use ndarray::{Array1, Array2, ArrayViewD};
use std::fmt;
use strum_macros::Display;

/// Number of samples along x for a curve.
pub const CURVE_SAMPLES: usize = 400;
/// Number of samples per axis for a surface (the mesh is SURFACE_SAMPLES^2).
pub const SURFACE_SAMPLES: usize = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
pub enum Axis {
    #[strum(to_string = "x")]
    X,
    #[strum(to_string = "y")]
    Y,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RangeReason {
    /// min == max
    Empty,
    /// min > max
    Inverted,
    NotNumeric(String),
    NotFinite,
    /// the axis is required by the plot kind but no range was given
    Missing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangeError {
    pub axis: Axis,
    pub reason: RangeReason,
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let axis = self.axis;
        match &self.reason {
            RangeReason::Empty => write!(f, "{} range is empty: min must be less than max", axis),
            RangeReason::Inverted => write!(f, "{} range is inverted: min must be less than max", axis),
            RangeReason::NotNumeric(text) => write!(f, "{} range bound '{}' is not a number", axis, text),
            RangeReason::NotFinite => write!(f, "{} range bounds must be finite", axis),
            RangeReason::Missing => write!(f, "{} range is required", axis),
        }
    }
}

impl std::error::Error for RangeError {}

/// Bounds of one axis as given by the caller; checked when a grid is built.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub fn new(min: f64, max: f64) -> Self {
        Range { min, max }
    }

    /// Reads both bounds from text, as typed into a form field.
    pub fn from_text(axis: Axis, min: &str, max: &str) -> Result<Range, RangeError> {
        let read = |text: &str| {
            text.trim().parse::<f64>().map_err(|_| RangeError {
                axis,
                reason: RangeReason::NotNumeric(text.trim().to_string()),
            })
        };
        Ok(Range::new(read(min)?, read(max)?))
    }

    pub fn check(&self, axis: Axis) -> Result<(), RangeError> {
        let reason = if !self.min.is_finite() || !self.max.is_finite() {
            RangeReason::NotFinite
        } else if self.min == self.max {
            RangeReason::Empty
        } else if self.min > self.max {
            RangeReason::Inverted
        } else {
            return Ok(());
        };
        Err(RangeError { axis, reason })
    }
}

/// Ranges of a request. `y` is only consulted for surfaces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ranges {
    pub x: Range,
    pub y: Option<Range>,
}

impl Ranges {
    pub fn curve(x: Range) -> Self {
        Ranges { x, y: None }
    }

    pub fn surface(x: Range, y: Range) -> Self {
        Ranges { x, y: Some(y) }
    }
}

/// `num_values` evenly spaced values from `start` to `end`, both endpoints exact.
///
/// A span wider than `f64::MAX` (say `-1e308..1e308`) is interpolated from the
/// endpoints instead of stepping by the overflowed width.
pub fn linspace(start: f64, end: f64, num_values: usize) -> Array1<f64> {
    if num_values == 1 {
        return Array1::from_elem(1, start);
    }
    let last = num_values - 1;
    let width = end - start;
    let step = width / last as f64;
    Array1::from_shape_fn(num_values, |i| {
        if i == 0 {
            start
        } else if i == last {
            end
        } else if width.is_finite() {
            start + i as f64 * step
        } else {
            let t = i as f64 / last as f64;
            start * (1.0 - t) + end * t
        }
    })
}

/// Coordinate matrices of the mesh: `x[[i, j]] = xs[j]`, `y[[i, j]] = ys[i]`.
pub fn meshgrid(xs: &Array1<f64>, ys: &Array1<f64>) -> (Array2<f64>, Array2<f64>) {
    let shape = (ys.len(), xs.len());
    let x = Array2::from_shape_fn(shape, |(_, j)| xs[j]);
    let y = Array2::from_shape_fn(shape, |(i, _)| ys[i]);
    (x, y)
}

#[derive(Clone, Debug, PartialEq)]
pub enum Grid {
    Curve { x: Array1<f64> },
    Surface { x: Array2<f64>, y: Array2<f64> },
}

impl Grid {
    /// Curve grid over explicit abscissas, no range checks.
    pub fn curve_from_points(x: Array1<f64>) -> Grid {
        Grid::Curve { x }
    }

    /// Surface grid over the mesh of explicit axis samples, no range checks.
    pub fn surface_from_axes(xs: &Array1<f64>, ys: &Array1<f64>) -> Grid {
        let (x, y) = meshgrid(xs, ys);
        Grid::Surface { x, y }
    }

    pub fn kind(&self) -> PlotKind {
        match self {
            Grid::Curve { .. } => PlotKind::Curve2D,
            Grid::Surface { .. } => PlotKind::Surface3D,
        }
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            Grid::Curve { x } => x.shape(),
            Grid::Surface { x, .. } => x.shape(),
        }
    }

    /// Number of grid points.
    pub fn len(&self) -> usize {
        self.shape().iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Coordinate arrays in argument order (x, then y).
    pub fn arguments(&self) -> Vec<ArrayViewD<'_, f64>> {
        match self {
            Grid::Curve { x } => vec![x.view().into_dyn()],
            Grid::Surface { x, y } => vec![x.view().into_dyn(), y.view().into_dyn()],
        }
    }

    /// Coordinates of the point at flat (row-major) index `index`.
    pub fn point(&self, index: usize) -> Vec<f64> {
        match self {
            Grid::Curve { x } => vec![x[index]],
            Grid::Surface { x, y } => {
                let ncols = x.ncols();
                let at = [index / ncols, index % ncols];
                vec![x[at], y[at]]
            }
        }
    }
}

/// Builds the sample grid for `kind` over `ranges`.
///
/// Deterministic: identical inputs give identical grids.
pub fn make_grid(kind: PlotKind, ranges: &Ranges) -> Result<Grid, RangeError> {
    ranges.x.check(Axis::X)?;
    let grid = match kind {
        PlotKind::Curve2D => {
            Grid::curve_from_points(linspace(ranges.x.min, ranges.x.max, CURVE_SAMPLES))
        }
        PlotKind::Surface3D => {
            let y_range = ranges.y.ok_or(RangeError {
                axis: Axis::Y,
                reason: RangeReason::Missing,
            })?;
            y_range.check(Axis::Y)?;
            let xs = linspace(ranges.x.min, ranges.x.max, SURFACE_SAMPLES);
            let ys = linspace(y_range.min, y_range.max, SURFACE_SAMPLES);
            Grid::surface_from_axes(&xs, &ys)
        }
    };
    debug!("built {} grid of shape {:?}", kind, grid.shape());
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_curve_grid_endpoints_exact() {
        for (min, max) in [(-10.0, 10.0), (0.1, 0.3), (-1e-7, 3.3), (1e6, 1e6 + 0.7)] {
            let grid = make_grid(PlotKind::Curve2D, &Ranges::curve(Range::new(min, max))).unwrap();
            let Grid::Curve { x } = grid else {
                panic!("expected a curve grid")
            };
            assert_eq!(x.len(), CURVE_SAMPLES);
            assert_eq!(x[0], min);
            assert_eq!(x[CURVE_SAMPLES - 1], max);
        }
    }

    #[test]
    fn test_curve_grid_even_spacing() {
        let grid = make_grid(PlotKind::Curve2D, &Ranges::curve(Range::new(0.0, 399.0))).unwrap();
        let Grid::Curve { x } = grid else {
            panic!("expected a curve grid")
        };
        for (i, xi) in x.iter().enumerate() {
            assert_relative_eq!(*xi, i as f64, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_degenerate_and_inverted_ranges() {
        let err = make_grid(PlotKind::Curve2D, &Ranges::curve(Range::new(5.0, 5.0))).unwrap_err();
        assert_eq!(err, RangeError { axis: Axis::X, reason: RangeReason::Empty });
        let err = make_grid(PlotKind::Curve2D, &Ranges::curve(Range::new(5.0, 1.0))).unwrap_err();
        assert_eq!(err.reason, RangeReason::Inverted);
        let err = make_grid(
            PlotKind::Surface3D,
            &Ranges::surface(Range::new(0.0, 1.0), Range::new(2.0, 2.0)),
        )
        .unwrap_err();
        assert_eq!(err.axis, Axis::Y);
    }

    #[test]
    fn test_non_finite_ranges() {
        let err = make_grid(PlotKind::Curve2D, &Ranges::curve(Range::new(f64::NAN, 1.0))).unwrap_err();
        assert_eq!(err.reason, RangeReason::NotFinite);
        let err = make_grid(
            PlotKind::Curve2D,
            &Ranges::curve(Range::new(0.0, f64::INFINITY)),
        )
        .unwrap_err();
        assert_eq!(err.reason, RangeReason::NotFinite);
    }

    #[test]
    fn test_surface_requires_y() {
        let err = make_grid(PlotKind::Surface3D, &Ranges::curve(Range::new(0.0, 1.0))).unwrap_err();
        assert_eq!(err, RangeError { axis: Axis::Y, reason: RangeReason::Missing });
        // a curve ignores any y range
        assert!(
            make_grid(
                PlotKind::Curve2D,
                &Ranges::surface(Range::new(0.0, 1.0), Range::new(3.0, 1.0))
            )
            .is_ok()
        );
    }

    #[test]
    fn test_surface_mesh_layout() {
        let ranges = Ranges::surface(Range::new(-1.0, 1.0), Range::new(10.0, 20.0));
        let grid = make_grid(PlotKind::Surface3D, &ranges).unwrap();
        assert_eq!(grid.shape(), &[SURFACE_SAMPLES, SURFACE_SAMPLES]);
        assert_eq!(grid.len(), SURFACE_SAMPLES * SURFACE_SAMPLES);
        let Grid::Surface { x, y } = &grid else {
            panic!("expected a surface grid")
        };
        // x varies along columns, y along rows
        assert_eq!(x[[0, 0]], -1.0);
        assert_eq!(x[[7, SURFACE_SAMPLES - 1]], 1.0);
        assert_eq!(y[[0, 13]], 10.0);
        assert_eq!(y[[SURFACE_SAMPLES - 1, 0]], 20.0);
        assert_eq!(x.row(3), x.row(40));
        assert_eq!(y.column(3), y.column(40));
        assert_eq!(grid.point(SURFACE_SAMPLES + 2), vec![x[[1, 2]], y[[1, 2]]]);
    }

    #[test]
    fn test_grid_is_deterministic() {
        let ranges = Ranges::surface(Range::new(-3.3, 7.1), Range::new(-0.5, 0.25));
        assert_eq!(
            make_grid(PlotKind::Surface3D, &ranges).unwrap(),
            make_grid(PlotKind::Surface3D, &ranges).unwrap()
        );
    }

    #[test]
    fn test_range_from_text() {
        assert_eq!(Range::from_text(Axis::X, " -10", "10 ").unwrap(), Range::new(-10.0, 10.0));
        assert_eq!(Range::from_text(Axis::X, "1e-3", "2.5").unwrap(), Range::new(0.001, 2.5));
        let err = Range::from_text(Axis::Y, "abc", "1").unwrap_err();
        assert_eq!(err.axis, Axis::Y);
        assert_eq!(err.reason, RangeReason::NotNumeric("abc".to_string()));
        assert!(err.to_string().contains("'abc'"));
        assert!(Range::from_text(Axis::X, "", "1").is_err());
    }

    #[test]
    fn test_linspace() {
        assert_eq!(linspace(0.0, 1.0, 5).to_vec(), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(2.0, 3.0, 1).to_vec(), vec![2.0]);
        assert!(linspace(2.0, 3.0, 0).is_empty());
    }

    #[test]
    fn test_range_wider_than_f64_max() {
        let grid = make_grid(PlotKind::Curve2D, &Ranges::curve(Range::new(-1e308, 1e308))).unwrap();
        let Grid::Curve { x } = grid else {
            panic!("expected a curve grid")
        };
        assert_eq!(x[0], -1e308);
        assert_eq!(x[CURVE_SAMPLES - 1], 1e308);
        assert!(x.iter().all(|v| v.is_finite()));
        assert!(x.windows(2).into_iter().all(|w| w[0] < w[1]));

        let ranges = Ranges::surface(Range::new(-f64::MAX, f64::MAX), Range::new(0.0, 1.0));
        let Grid::Surface { x, .. } = make_grid(PlotKind::Surface3D, &ranges).unwrap() else {
            panic!("expected a surface grid")
        };
        assert_eq!(x[[0, 0]], -f64::MAX);
        assert_eq!(x[[0, SURFACE_SAMPLES - 1]], f64::MAX);
        assert!(x.iter().all(|v| v.is_finite()));
    }
}
