use crate::plotting::evaluator::{Sample, SampleSet};
use chrono::Local;
use csv::Writer;
use log::{debug, info};
use simplelog::{
    ColorChoice, CombinedLogger, Config, LevelFilter, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// Reads a log level: off (or none), error, warn, info, debug, trace.
pub fn parse_log_level(text: &str) -> Option<LevelFilter> {
    match text.trim().to_lowercase().as_str() {
        "off" | "none" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

/// `log_<date>_<time>.txt`, the name used for file logs.
pub fn log_file_name() -> String {
    let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
    format!("log_{}.txt", date_and_time)
}

/// Installs the global logger: a terminal logger and, when `log_dir` is given,
/// a file logger writing to a timestamped file inside it.
///
/// Only the first call installs anything; later calls are ignored (the log
/// file is still created). Returns the path of the log file, if any.
pub fn init_logger(level: LevelFilter, log_dir: Option<&Path>) -> io::Result<Option<PathBuf>> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    let log_path = match log_dir {
        Some(dir) => {
            let path = dir.join(log_file_name());
            loggers.push(WriteLogger::new(level, Config::default(), File::create(&path)?));
            Some(path)
        }
        None => None,
    };
    match CombinedLogger::init(loggers) {
        Ok(()) => info!("logging at level {}", level),
        Err(_) => debug!("logger already initialised, keeping the existing one"),
    }
    Ok(log_path)
}

/// Writes one row per grid point: `x,f` for curves, `x,y,f` for surfaces.
/// Undefined samples leave the `f` field empty.
pub fn save_samples_to_csv(samples: &SampleSet, path: &Path) -> Result<(), csv::Error> {
    let mut writer = Writer::from_path(path)?;
    let mut headers: Vec<&str> = samples.grid().kind().variables().to_vec();
    headers.push("f");
    writer.write_record(&headers)?;

    for (point, sample) in samples.rows() {
        let mut row_data: Vec<String> = point.iter().map(|v| v.to_string()).collect();
        row_data.push(match sample {
            Sample::Finite(v) => v.to_string(),
            Sample::Undefined => String::new(),
        });
        writer.write_record(&row_data)?;
    }

    writer.flush()?;
    info!("saved {} samples to {}", samples.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plotting::evaluator::evaluate;
    use crate::plotting::grid::Grid;
    use crate::symbolic::parse_expr::parse;
    use crate::symbolic::symbolic_lambdify::compile;
    use crate::symbolic::symbolic_validate::PlotKind;
    use ndarray::array;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("none"), Some(LevelFilter::Off));
        assert_eq!(parse_log_level(" INFO "), Some(LevelFilter::Info));
        assert_eq!(parse_log_level("debug"), Some(LevelFilter::Debug));
        assert_eq!(parse_log_level("loud"), None);
    }

    #[test]
    fn test_curve_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("curve.csv");
        let f = compile(&parse("1/x").unwrap(), PlotKind::Curve2D).unwrap();
        let samples = evaluate(&f, Grid::curve_from_points(array![-1.0, 0.0, 2.0])).unwrap();
        save_samples_to_csv(&samples, &path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "x,f\n-1,-1\n0,\n2,0.5\n");
    }

    #[test]
    fn test_surface_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("surface.csv");
        let f = compile(&parse("x * y").unwrap(), PlotKind::Surface3D).unwrap();
        let grid = Grid::surface_from_axes(&array![1.0, 2.0], &array![3.0]);
        save_samples_to_csv(&evaluate(&f, grid).unwrap(), &path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "x,y,f\n1,3,3\n2,3,6\n");
    }

    #[test]
    fn test_init_logger_twice_with_file() {
        let dir = tempdir().unwrap();
        let first = init_logger(LevelFilter::Warn, Some(dir.path())).unwrap();
        let second = init_logger(LevelFilter::Warn, None).unwrap();
        let path = first.unwrap();
        assert!(path.exists());
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("log_"));
        assert_eq!(second, None);
    }
}
