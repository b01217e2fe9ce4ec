/// parse task document with structure like
/// ```text
/// plot
///   expression: sin(x) * x
///   x_range: -10, 10
/// settings
///   loglevel: info
/// ```
/// which has titles and `key: value` lines, into a map of sections, and turns it into a plot task.
/*
 a title stands alone on its line; every key line belongs to the nearest title above it.
 values run to the end of the line so that formulas may hold spaces and commas;
 list values ("-10, 10") are split afterwards with parse_value_list.
*/
use crate::Utils::logger::parse_log_level;
use crate::plotting::evaluator::{DEFAULT_TIMEOUT, Evaluator};
use crate::plotting::pipeline::PlotRequest;
use crate::symbolic::symbolic_validate::PlotKind;
use log::info;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{alpha1, alphanumeric1, line_ending, not_line_ending, space0},
    combinator::{eof, map, recognize},
    multi::{many0, many1, separated_list1},
    sequence::{delimited, pair, separated_pair, terminated},
};
use simplelog::LevelFilter;
use std::collections::HashMap;
use std::fmt::{self, Display};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub type SectionMap = HashMap<String, String>;
pub type DocumentMap = HashMap<String, SectionMap>;

/// sections and the keys each of them accepts
pub const KNOWN_KEYS: &[(&str, &[&str])] = &[
    ("plot", &["expression", "kind", "x_range", "y_range"]),
    (
        "settings",
        &["loglevel", "timeout_ms", "parallel", "csv", "log_dir"],
    ),
];

/// enum to represent different value types:
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Float(f64),
    Integer(i64),
    Boolean(bool),
}

impl Value {
    /// Try parsing as different types in order
    pub fn from_text(text: &str) -> Value {
        let s = text.trim();
        if let Ok(val) = s.parse::<i64>() {
            Value::Integer(val)
        } else if let Ok(val) = s.parse::<f64>() {
            Value::Float(val)
        } else if let Ok(val) = s.parse::<bool>() {
            Value::Boolean(val)
        } else {
            Value::String(s.to_string())
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        if let Value::Integer(i) = self {
            Some(*i)
        } else {
            None
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        if let Value::Boolean(b) = self {
            Some(*b)
        } else {
            None
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            Value::Float(val) => write!(f, "{}", val),
            Value::Integer(val) => write!(f, "{}", val),
            Value::Boolean(val) => write!(f, "{}", val),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TaskError {
    Io(String),
    Syntax(String),
    DuplicateSection(String),
    DuplicateKey { section: String, key: String },
    UnknownSection(String),
    UnknownKey { section: String, key: String },
    InvalidValue {
        section: String,
        key: String,
        value: String,
        expected: &'static str,
    },
}

impl Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskError::Io(e) => write!(f, "cannot read task file: {}", e),
            TaskError::Syntax(line) => write!(f, "cannot parse task document near '{}'", line),
            TaskError::DuplicateSection(s) => write!(f, "section '{}' appears twice", s),
            TaskError::DuplicateKey { section, key } => {
                write!(f, "key '{}' appears twice in section '{}'", key, section)
            }
            TaskError::UnknownSection(s) => write!(f, "unknown section '{}'", s),
            TaskError::UnknownKey { section, key } => {
                write!(f, "unknown key '{}' in section '{}'", key, section)
            }
            TaskError::InvalidValue {
                section,
                key,
                value,
                expected,
            } => write!(
                f,
                "invalid value '{}' for {}.{}: expected {}",
                value, section, key, expected
            ),
        }
    }
}

impl std::error::Error for TaskError {}

impl From<std::io::Error> for TaskError {
    fn from(e: std::io::Error) -> Self {
        TaskError::Io(e.to_string())
    }
}

/// Parses a name (word characters without spaces)
fn parse_identifier(input: &str) -> IResult<&str, String> {
    let parser = recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ));
    map(parser, String::from).parse(input)
}

fn end_of_line(input: &str) -> IResult<&str, &str> {
    alt((line_ending, eof)).parse(input)
}

/// Parses a title: a name alone on its line
pub(crate) fn parse_title(input: &str) -> IResult<&str, String> {
    delimited(space0, parse_identifier, pair(space0, end_of_line)).parse(input)
}

/// Parses a `key: value` line; the value is the rest of the line, trimmed
pub(crate) fn parse_key_value_pair(input: &str) -> IResult<&str, (String, String)> {
    let colon_separator = delimited(space0, tag(":"), space0);
    let mut parser = delimited(
        space0,
        separated_pair(parse_identifier, colon_separator, not_line_ending),
        end_of_line,
    );
    let (input, (key, value)) = parser.parse(input)?;
    Ok((input, (key, value.trim().to_string())))
}

/// Parses a section with a title and its key-value lines
pub(crate) fn parse_section(input: &str) -> IResult<&str, (String, Vec<(String, String)>)> {
    pair(parse_title, many0(parse_key_value_pair)).parse(input)
}

/// Filters out comment lines (starting with //, #, %, or ;) and blank lines
fn filter_comments(input: &str) -> String {
    input
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.starts_with("//")
                && !trimmed.starts_with('#')
                && !trimmed.starts_with('%')
                && !trimmed.starts_with(';')
                && !trimmed.is_empty()
        })
        .collect::<Vec<&str>>()
        .join("\n")
}

/// Parses the entire document into a map of sections. An empty document
/// (or one made only of comments) gives an empty map.
pub fn parse_document(input: &str) -> Result<DocumentMap, TaskError> {
    let filtered = filter_comments(input);
    if filtered.is_empty() {
        return Ok(HashMap::new());
    }
    let sections = match many1(parse_section).parse(filtered.as_str()) {
        Ok((remaining, sections)) if remaining.trim().is_empty() => sections,
        Ok((remaining, _)) => return Err(TaskError::Syntax(first_line(remaining))),
        Err(_) => return Err(TaskError::Syntax(first_line(&filtered))),
    };

    let mut result = HashMap::new();
    for (title, pairs) in sections {
        if result.contains_key(&title) {
            return Err(TaskError::DuplicateSection(title));
        }
        let mut section_map = HashMap::new();
        for (key, value) in pairs {
            if section_map.insert(key.clone(), value).is_some() {
                return Err(TaskError::DuplicateKey {
                    section: title,
                    key,
                });
            }
        }
        result.insert(title, section_map);
    }
    Ok(result)
}

fn first_line(text: &str) -> String {
    text.trim().lines().next().unwrap_or("").to_string()
}

/// Splits a comma separated list: "-10, 10" -> ["-10", "10"]
pub fn parse_value_list(text: &str) -> Option<Vec<String>> {
    let separator_coma = delimited(space0, tag(","), space0);
    let item = take_while1(|c: char| c != ',');
    let mut parser = terminated(separated_list1(separator_coma, item), eof);
    let result: IResult<&str, Vec<&str>> = parser.parse(text.trim());
    match result {
        Ok((_, items)) => Some(items.into_iter().map(|s| s.trim().to_string()).collect()),
        Err(_) => None,
    }
}

/// Rejects sections and keys that a plot task does not know.
pub fn check_known_keys(document: &DocumentMap) -> Result<(), TaskError> {
    for (section, keys) in document {
        let known = KNOWN_KEYS
            .iter()
            .find(|(name, _)| name == section)
            .map(|(_, keys)| *keys)
            .ok_or_else(|| TaskError::UnknownSection(section.clone()))?;
        if let Some(key) = keys.keys().find(|key| !known.contains(&key.as_str())) {
            return Err(TaskError::UnknownKey {
                section: section.clone(),
                key: key.clone(),
            });
        }
    }
    Ok(())
}

/// Run-time settings of a task.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSettings {
    pub loglevel: LevelFilter,
    pub timeout: Option<Duration>,
    pub parallel: bool,
    pub csv: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
}

impl Default for PlotSettings {
    fn default() -> Self {
        PlotSettings {
            loglevel: LevelFilter::Info,
            timeout: Some(DEFAULT_TIMEOUT),
            parallel: true,
            csv: None,
            log_dir: None,
        }
    }
}

impl PlotSettings {
    pub fn evaluator(&self) -> Evaluator {
        Evaluator::new(self.timeout, self.parallel)
    }
}

/// A plot request together with the settings to run it with.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlotTask {
    pub request: PlotRequest,
    pub settings: PlotSettings,
}

fn invalid(section: &str, key: &str, value: &str, expected: &'static str) -> TaskError {
    TaskError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        expected,
    }
}

fn read_pair(section: &str, key: &str, value: &str) -> Result<(String, String), TaskError> {
    match parse_value_list(value).as_deref() {
        Some([min, max]) => Ok((min.clone(), max.clone())),
        _ => Err(invalid(section, key, value, "two values 'min, max'")),
    }
}

impl PlotTask {
    /// Builds a task from a parsed document; missing keys keep their defaults.
    pub fn from_document(document: &DocumentMap) -> Result<PlotTask, TaskError> {
        check_known_keys(document)?;
        let mut task = PlotTask::default();

        if let Some(plot) = document.get("plot") {
            let request = &mut task.request;
            if let Some(expression) = plot.get("expression") {
                request.text = expression.clone();
            }
            if let Some(kind) = plot.get("kind") {
                request.kind = PlotKind::from_str(kind)
                    .map_err(|_| invalid("plot", "kind", kind, "2D or 3D"))?;
            }
            if let Some(x_range) = plot.get("x_range") {
                request.x_range = read_pair("plot", "x_range", x_range)?;
            }
            if let Some(y_range) = plot.get("y_range") {
                request.y_range = Some(read_pair("plot", "y_range", y_range)?);
            }
        }

        if let Some(section) = document.get("settings") {
            let settings = &mut task.settings;
            if let Some(level) = section.get("loglevel") {
                settings.loglevel = parse_log_level(level).ok_or_else(|| {
                    invalid("settings", "loglevel", level, "off, error, warn, info or debug")
                })?;
            }
            if let Some(timeout) = section.get("timeout_ms") {
                settings.timeout = match Value::from_text(timeout) {
                    Value::Integer(0) => None,
                    Value::Integer(ms) if ms > 0 => Some(Duration::from_millis(ms as u64)),
                    Value::String(s) if s == "none" => None,
                    _ => {
                        return Err(invalid(
                            "settings",
                            "timeout_ms",
                            timeout,
                            "milliseconds, 0 or none",
                        ));
                    }
                };
            }
            if let Some(parallel) = section.get("parallel") {
                settings.parallel = Value::from_text(parallel)
                    .as_boolean()
                    .ok_or_else(|| invalid("settings", "parallel", parallel, "true or false"))?;
            }
            if let Some(csv) = section.get("csv") {
                settings.csv = Some(PathBuf::from(csv));
            }
            if let Some(dir) = section.get("log_dir") {
                settings.log_dir = Some(PathBuf::from(dir));
            }
        }
        Ok(task)
    }

    pub fn from_text(input: &str) -> Result<PlotTask, TaskError> {
        PlotTask::from_document(&parse_document(input)?)
    }

    pub fn from_file(path: &Path) -> Result<PlotTask, TaskError> {
        let contents = fs::read_to_string(path)?;
        let task = PlotTask::from_text(&contents)?;
        info!("loaded plot task from {}", path.display());
        Ok(task)
    }
}
