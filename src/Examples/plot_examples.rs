// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
#![allow(non_snake_case)]

use crate::Utils::task_parser::PlotTask;
use crate::plotting::evaluator::{Evaluator, evaluate};
use crate::plotting::grid::Grid;
use crate::plotting::pipeline::{PlotRequest, plot, run};
use crate::symbolic::parse_expr::parse;
use crate::symbolic::symbolic_lambdify::compile;
use crate::symbolic::symbolic_validate::PlotKind;
use ndarray::Array1;
use std::time::Duration;

#[allow(dead_code)]
pub fn plot_examples(example: usize) {
    match example {
        0 => {
            // CURVE WITH DEFAULT SETTINGS
            // sin(x) * x over -10..10 with 400 samples
            let request = PlotRequest::default();
            match plot(&request) {
                Ok(samples) => println!(
                    "{} points, bounds {:?}",
                    samples.len(),
                    samples.finite_bounds()
                ),
                Err(e) => println!("{} error: {}", e.stage(), e),
            }
        }
        1 => {
            // SURFACE
            let request = PlotRequest::new("exp(-x^2 - y^2)", PlotKind::Surface3D)
                .with_x_range("-2", "2")
                .with_y_range("-2", "2");
            match plot(&request) {
                Ok(samples) => {
                    println!("shape {:?}", samples.shape());
                    println!("value at the corner {:?}", samples.get(&[0, 0]));
                }
                Err(e) => println!("{} error: {}", e.stage(), e),
            }
        }
        2 => {
            // GAPS: points where the function is undefined are kept as gaps
            let request = PlotRequest::new("1/(x - 1) + sqrt(x)", PlotKind::Curve2D)
                .with_x_range("-3", "3");
            if let Ok(samples) = plot(&request) {
                println!(
                    "{} defined, {} undefined",
                    samples.defined_count(),
                    samples.undefined_count()
                );
            }
        }
        3 => {
            // ERRORS from every stage
            let requests = vec![
                PlotRequest::new("2x + foo(x)", PlotKind::Curve2D),
                PlotRequest::new("x + y", PlotKind::Curve2D),
                PlotRequest::new("x", PlotKind::Curve2D).with_x_range("5", "1"),
            ];
            for request in requests {
                if let Err(e) = plot(&request) {
                    println!("'{}': {} error: {}", request.text, e.stage(), e);
                }
            }
            // a very tight budget
            let evaluator = Evaluator::new(Some(Duration::from_nanos(1)), true);
            let request = PlotRequest::new("sin(cos(tan(x * y)))", PlotKind::Surface3D);
            if let Err(e) = run(&request, &evaluator) {
                println!("{}", e);
            }
        }
        4 => {
            // STEP BY STEP: parse, compile, sample at chosen points, evaluate
            let Ok(expr) = parse("2x + 1") else {
                return;
            };
            println!("parsed: {}", expr);
            let Ok(f) = compile(&expr, PlotKind::Curve2D) else {
                return;
            };
            println!("f(3) = {:?}", f.eval_point(&[3.0]));
            let grid = Grid::curve_from_points(Array1::from(vec![0.0, 0.5, 3.0]));
            if let Ok(samples) = evaluate(&f, grid) {
                for (point, sample) in samples.rows() {
                    println!("{:?} -> {}", point, sample);
                }
            }
        }
        5 => {
            // TASK DOCUMENT
            let document = r#"
            plot
              expression: x^2 - y^2
              kind: 3D
              x_range: -1, 1
              y_range: -1, 1
            settings
              timeout_ms: 1000
              parallel: true
            "#;
            match PlotTask::from_text(document) {
                Ok(task) => {
                    let samples = run(&task.request, &task.settings.evaluator());
                    println!("{:?}", samples.map(|s| s.finite_bounds()));
                }
                Err(e) => println!("{}", e),
            }
        }
        _ => {
            println!("example not found");
        }
    }
}
