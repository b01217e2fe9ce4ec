use crate::symbolic::parse_expr::{MAX_DEPTH, MAX_HEIGHT, ParseReason, parse};
use crate::symbolic::symbolic_engine::{BinaryOp, Expr, Func, UnaryOp};
//___________________________________TESTS____________________________________

mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use strum::IntoEnumIterator;

    fn eval(text: &str, x: f64, y: f64) -> f64 {
        let expr = parse(text).unwrap();
        eval_tree(&expr, x, y)
    }

    // plain recursive walk, independent of the compiled lambda
    fn eval_tree(expr: &Expr, x: f64, y: f64) -> f64 {
        match expr {
            Expr::Const(v) => *v,
            Expr::Var(name) if name == "x" => x,
            Expr::Var(_) => y,
            Expr::Unary(UnaryOp::Neg, e) => -eval_tree(e, x, y),
            Expr::Binary(op, a, b) => op.apply(eval_tree(a, x, y), eval_tree(b, x, y)),
            Expr::Call(func, args) => func.apply(eval_tree(&args[0], x, y)),
        }
    }

    const ROUND_TRIP_CASES: &[&str] = &[
        "x",
        "-x",
        "--x",
        "2x + 1",
        "2(x + 1)",
        "3sin(x) * cos(y)",
        "x^2 + y^2",
        "2^3^2",
        "-x^2",
        "x ** 2 ** 0.5",
        "(x - y) / (x + y)",
        "1 - 2 - 3",
        "x - 1 + y - 2",
        "x - (1 + y) - 2",
        "x * y / 2 * x",
        "8 / 4 / 2",
        "sin(x) * x",
        "exp(-x^2 - y^2)",
        "log(abs(x)) + ln(y)",
        "sqrt(x) / tan(y)",
        "asin(x) + acos(y) + atan(x * y)",
        "sinh(x) - cosh(y) * tanh(x)",
        "pi * e",
        "0.5x",
        ".25 + 1.",
        "1 / (x - 2)",
        "((((x))))",
        "-(-(x + y))",
        "x^-1",
        "2^-x^2",
        "123456789.125 * x",
    ];

    #[test]
    fn test_print_then_parse_is_identity() {
        for text in ROUND_TRIP_CASES {
            let expr = parse(text).unwrap();
            let printed = expr.to_string();
            let reparsed = parse(&printed)
                .unwrap_or_else(|e| panic!("'{}' printed as '{}': {}", text, printed, e));
            assert_eq!(reparsed, expr, "round trip of '{}' via '{}'", text, printed);
            // printing is stable once parenthesized
            assert_eq!(reparsed.to_string(), printed);
        }
    }

    #[test]
    fn test_hand_built_trees_round_trip() {
        let x = Expr::var("x");
        let y = Expr::var("y");
        let trees = vec![
            Expr::Const(-2.5) * x.clone(),
            -(x.clone() - y.clone()),
            Expr::call(Func::Exp, x.clone().pow(Expr::Const(2.0))) / y.clone(),
            Expr::Const(0.1) + Expr::Const(0.2),
            Expr::Const(1e-7) * Expr::Const(3e15),
        ];
        for tree in trees {
            let reparsed = parse(&tree.to_string()).unwrap();
            assert_relative_eq!(
                eval_tree(&reparsed, 1.3, -0.7),
                eval_tree(&tree, 1.3, -0.7),
                epsilon = 1e-12
            );
            assert_eq!(reparsed.to_string(), parse(&reparsed.to_string()).unwrap().to_string());
        }
    }

    #[test]
    fn test_every_function_round_trips() {
        for func in Func::iter() {
            let text = format!("{}(x + 1)", func);
            let expr = parse(&text).unwrap();
            assert_eq!(expr, Expr::call(func, Expr::var("x") + Expr::Const(1.0)));
            assert_eq!(parse(&expr.to_string()).unwrap(), expr);
        }
    }

    #[test]
    fn test_precedence_by_value() {
        assert_relative_eq!(eval("1 + 2 * 3", 0.0, 0.0), 7.0);
        assert_relative_eq!(eval("(1 + 2) * 3", 0.0, 0.0), 9.0);
        assert_relative_eq!(eval("2^3^2", 0.0, 0.0), 512.0);
        assert_relative_eq!(eval("-2^2", 0.0, 0.0), -4.0);
        assert_relative_eq!(eval("1 - 2 - 3", 0.0, 0.0), -4.0);
        assert_relative_eq!(eval("8 / 4 / 2", 0.0, 0.0), 1.0);
        assert_relative_eq!(eval("2x + 1", 3.0, 0.0), 7.0);
        assert_relative_eq!(eval("2(x + 1)", 3.0, 0.0), 8.0);
        assert_relative_eq!(eval("2x^2", 3.0, 0.0), 18.0);
        assert_relative_eq!(eval("x / 2y", 8.0, 2.0), 2.0);
        assert_relative_eq!(eval("x * y - y / x", 2.0, 4.0), 6.0);
        assert_relative_eq!(eval("ln(e)", 0.0, 0.0), 1.0, epsilon = 1e-15);
        assert_relative_eq!(eval("cos(pi)", 0.0, 0.0), -1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_ieee_semantics() {
        assert!(eval("1 / x", 0.0, 0.0).is_infinite());
        assert!(eval("0 / x", 0.0, 0.0).is_nan());
        assert!(eval("log(x)", -1.0, 0.0).is_nan());
        assert_eq!(eval("log(x)", 0.0, 0.0), f64::NEG_INFINITY);
        assert!(eval("sqrt(x)", -4.0, 0.0).is_nan());
        assert!(eval("x^0.5", -4.0, 0.0).is_nan());
        assert!(eval("asin(x)", 2.0, 0.0).is_nan());
        assert_eq!(eval("exp(x)", 1000.0, 0.0), f64::INFINITY);
    }

    #[test]
    fn test_tree_shape() {
        let expr = parse("-x^2").unwrap();
        assert_eq!(
            expr,
            Expr::Unary(
                UnaryOp::Neg,
                Box::new(Expr::Binary(
                    BinaryOp::Pow,
                    Box::new(Expr::var("x")),
                    Box::new(Expr::Const(2.0))
                ))
            )
        );
        assert_eq!(expr.node_count(), 4);
    }

    #[test]
    fn test_long_sum_round_trips() {
        let text = vec!["x"; 300].join(" + ");
        let expr = parse(&text).unwrap();
        assert_eq!(expr.node_count(), 599);
        let printed = expr.to_string();
        let reparsed = parse(&printed).unwrap();
        assert_eq!(reparsed, expr);
        assert_eq!(reparsed.to_string(), printed);

        let mixed = (0..300)
            .map(|i| if i % 2 == 0 { "x * y / 2" } else { "sin(x - y)" })
            .collect::<Vec<_>>()
            .join(" - ");
        let expr = parse(&mixed).unwrap();
        assert_eq!(parse(&expr.to_string()).unwrap(), expr);
    }

    #[test]
    fn test_longest_accepted_chain_round_trips() {
        let text = vec!["x"; MAX_HEIGHT].join(" * ");
        let expr = parse(&text).unwrap();
        assert_eq!(parse(&expr.to_string()).unwrap(), expr);
        let too_long = vec!["x"; MAX_HEIGHT + 1].join(" * ");
        assert_eq!(parse(&too_long).unwrap_err().reason, ParseReason::TooDeep);
    }

    #[test]
    fn test_accepted_nesting_reads_back() {
        // deepest nesting the parser accepts: every level is a call
        let mut text = "x".to_string();
        let mut levels = 0;
        while parse(&format!("sin({})", text)).is_ok() {
            text = format!("sin({})", text);
            levels += 1;
        }
        assert!(levels >= MAX_DEPTH / 2 - 1);
        let expr = parse(&text).unwrap();
        assert_eq!(parse(&expr.to_string()).unwrap(), expr);

        // accepted text whose bracketed print would nest past the limit is refused
        let nested_negations = format!("{}x", "-".repeat(MAX_DEPTH - 10));
        assert_eq!(
            parse(&nested_negations).unwrap_err().reason,
            ParseReason::TooDeep
        );
        let negations = format!("{}x", "-".repeat(MAX_DEPTH / 2 - 1));
        let expr = parse(&negations).unwrap();
        assert_eq!(parse(&expr.to_string()).unwrap(), expr);
    }
}
