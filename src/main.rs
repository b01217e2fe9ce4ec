#![allow(non_snake_case)]
use MathCanvas::Utils::logger::{init_logger, save_samples_to_csv};
use MathCanvas::Utils::summary::summary_table;
use MathCanvas::Utils::task_parser::PlotTask;
use MathCanvas::plotting::pipeline::{PlotRequest, run};
use MathCanvas::symbolic::symbolic_validate::PlotKind;
use log::info;
use std::env;
use std::error::Error;
use std::path::Path;
use std::process;
use std::str::FromStr;

const USAGE: &str = "usage: MathCanvas <task-file>\n       MathCanvas <expression> [2D|3D] [xmin xmax [ymin ymax]]";

/// A single existing file is a task document, anything else is an ad-hoc request.
fn task_from_args(args: &[String]) -> Result<PlotTask, Box<dyn Error>> {
    let (text, rest) = args.split_first().ok_or(USAGE)?;
    if rest.is_empty() && Path::new(text).is_file() {
        return Ok(PlotTask::from_file(Path::new(text))?);
    }
    let kind = match rest.first() {
        Some(kind) => PlotKind::from_str(kind)
            .map_err(|_| format!("unknown plot kind '{}'\n{}", kind, USAGE))?,
        None => PlotKind::Curve2D,
    };
    let mut request = PlotRequest::new(text, kind);
    match rest.get(1..).unwrap_or_default() {
        [] => {}
        [xmin, xmax] => request = request.with_x_range(xmin, xmax),
        [xmin, xmax, ymin, ymax] => {
            request = request.with_x_range(xmin, xmax).with_y_range(ymin, ymax)
        }
        _ => return Err(USAGE.into()),
    }
    Ok(PlotTask {
        request,
        ..PlotTask::default()
    })
}

fn run_cli(args: &[String]) -> Result<(), Box<dyn Error>> {
    let task = task_from_args(args)?;
    let settings = &task.settings;
    init_logger(settings.loglevel, settings.log_dir.as_deref())?;
    let samples = run(&task.request, &settings.evaluator())?;
    println!("{}", summary_table(&task.request, &samples));
    if let Some(path) = &settings.csv {
        save_samples_to_csv(&samples, path)?;
    }
    info!("Program ended");
    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    if let Err(e) = run_cli(&args) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}
