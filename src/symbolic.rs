#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// a module turns a String expression into a symbolic expression
///
///# Example
/// ```
/// use MathCanvas::symbolic::parse_expr::parse;
/// let input = "2x + sin(x)^2";
/// let parsed_expression = parse(input).unwrap();
/// println!(" parsed_expression {}", parsed_expression);
/// // unknown names are rejected, the namespace is closed
/// let err = parse("foo(x)").unwrap_err();
/// println!(" error {}", err);
///  ```
/// ________________________________________________________________________________________________________________________________
pub mod parse_expr;
///____________________________________________________________________________________________________________________________
/// # Symbolic engine
/// a module
/// 1) holds the expression tree: constants, the variables x and y, operators and whitelisted functions
/// 2) prints a tree back to a bracketed string that parses to the same tree
///# Example#
/// ```
/// use MathCanvas::symbolic::symbolic_engine::Expr;
/// let parsed_expression = Expr::parse_expression("x^2 + y^2").unwrap();
/// println!(" parsed_expression {}", parsed_expression);
/// // return vec of all arguments
/// let all = parsed_expression.all_arguments_are_variables();
/// assert_eq!(all, vec!["x".to_string(), "y".to_string()]);
/// ```
/// ________________________________________________________________________________________________________________________________________________
pub mod symbolic_engine;
#[cfg(test)]
mod symbolic_engine_tests;
///________________________________________________________________________________________________________________________________________________
/// checks that an expression only uses the variables of its plot kind
pub mod symbolic_validate;
///________________________________________________________________________________________________________________________________________________
/// turns a symbolic expression into a function evaluated over whole ndarray arrays
/// Example#
/// ```
/// use MathCanvas::symbolic::parse_expr::parse;
/// use MathCanvas::symbolic::symbolic_lambdify::compile;
/// use MathCanvas::symbolic::symbolic_validate::PlotKind;
/// use ndarray::array;
/// let f = compile(&parse("x * y").unwrap(), PlotKind::Surface3D).unwrap();
/// let x = array![1.0, 2.0].into_dyn();
/// let y = array![3.0, 4.0].into_dyn();
/// let z = f.call(&[x.view(), y.view()]).unwrap();
/// assert_eq!(z, array![3.0, 8.0].into_dyn());
/// ```
pub mod symbolic_lambdify;
