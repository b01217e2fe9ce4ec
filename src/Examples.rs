//! examples of usage of MathCanvas
/// plotting pipeline examples: curves, surfaces, gaps and errors
pub mod plot_examples;
