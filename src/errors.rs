//! Tagged error returned for a failed plot request. Each stage keeps its own
//! error type; this enum only collects them so stages chain with `?`.
use crate::plotting::grid::RangeError;
use crate::symbolic::parse_expr::ParseError;
use crate::symbolic::symbolic_lambdify::EvaluationError;
use crate::symbolic::symbolic_validate::BindError;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum PlotError {
    Parse(ParseError),
    Bind(BindError),
    Range(RangeError),
    Evaluation(EvaluationError),
}

impl PlotError {
    /// Short tag naming the failed stage, for logs and UI prefixes.
    pub fn stage(&self) -> &'static str {
        match self {
            PlotError::Parse(_) => "parse",
            PlotError::Bind(_) => "bind",
            PlotError::Range(_) => "range",
            PlotError::Evaluation(_) => "evaluation",
        }
    }
}

impl fmt::Display for PlotError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PlotError::Parse(e) => write!(f, "{}", e),
            PlotError::Bind(e) => write!(f, "{}", e),
            PlotError::Range(e) => write!(f, "{}", e),
            PlotError::Evaluation(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for PlotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlotError::Parse(e) => Some(e),
            PlotError::Bind(e) => Some(e),
            PlotError::Range(e) => Some(e),
            PlotError::Evaluation(e) => Some(e),
        }
    }
}

impl From<ParseError> for PlotError {
    fn from(e: ParseError) -> Self {
        PlotError::Parse(e)
    }
}

impl From<BindError> for PlotError {
    fn from(e: BindError) -> Self {
        PlotError::Bind(e)
    }
}

impl From<RangeError> for PlotError {
    fn from(e: RangeError) -> Self {
        PlotError::Range(e)
    }
}

impl From<EvaluationError> for PlotError {
    fn from(e: EvaluationError) -> Self {
        PlotError::Evaluation(e)
    }
}
