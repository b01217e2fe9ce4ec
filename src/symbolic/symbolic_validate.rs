//! Checks that an expression only references the free variables declared by the
//! plot kind: `{x}` for curves, `{x, y}` for surfaces.
use crate::symbolic::symbolic_engine::{Expr, VARIABLE_X, VARIABLE_Y};
use log::debug;
use std::fmt;
use strum_macros::{Display, EnumString};

/// What is being plotted; decides the declared variables and the grid shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString)]
pub enum PlotKind {
    /// y = f(x)
    #[strum(
        to_string = "2D",
        serialize = "2d",
        serialize = "curve",
        serialize = "Curve2D"
    )]
    Curve2D,
    /// z = f(x, y)
    #[strum(
        to_string = "3D",
        serialize = "3d",
        serialize = "surface",
        serialize = "Surface3D"
    )]
    Surface3D,
}

impl PlotKind {
    /// Declared free variables, in argument order.
    pub fn variables(&self) -> &'static [&'static str] {
        match self {
            PlotKind::Curve2D => &[VARIABLE_X],
            PlotKind::Surface3D => &[VARIABLE_X, VARIABLE_Y],
        }
    }

    pub fn arity(&self) -> usize {
        self.variables().len()
    }
}

/// A variable outside the declared set was referenced.
#[derive(Debug, Clone, PartialEq)]
pub struct BindError {
    pub symbol: String,
    pub kind: PlotKind,
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "variable '{}' cannot be used in a {} plot (allowed: {})",
            self.symbol,
            self.kind,
            self.kind.variables().join(", ")
        )
    }
}

impl std::error::Error for BindError {}

/// Walks the tree and rejects any variable not declared by `kind`.
///
/// Surfaces may use only one of their variables (the surface is then constant
/// along the other axis). When several symbols are illegal the alphabetically
/// first one is reported.
pub fn validate(expr: &Expr, kind: PlotKind) -> Result<(), BindError> {
    let used = expr.all_arguments_are_variables();
    debug!("{} plot references variables {:?}", kind, used);
    match used
        .into_iter()
        .find(|name| !kind.variables().contains(&name.as_str()))
    {
        Some(symbol) => Err(BindError { symbol, kind }),
        None => Ok(()),
    }
}
