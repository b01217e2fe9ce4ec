/*
Pretty printing of a sample set: what was plotted, the grid shape and how much of it is defined.
*/
use crate::plotting::evaluator::SampleSet;
use crate::plotting::pipeline::PlotRequest;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Debug, PartialEq, Tabled)]
pub struct SummaryRow {
    key: &'static str,
    value: String,
}

pub fn sample_summary(request: &PlotRequest, samples: &SampleSet) -> Vec<SummaryRow> {
    let shape = samples
        .shape()
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(" x ");
    let (min, max) = match samples.finite_bounds() {
        Some((min, max)) => (min.to_string(), max.to_string()),
        None => ("-".to_string(), "-".to_string()),
    };
    vec![
        SummaryRow { key: "Expression", value: request.text.clone() },
        SummaryRow { key: "Kind", value: request.kind.to_string() },
        SummaryRow { key: "Grid", value: shape },
        SummaryRow { key: "Defined", value: samples.defined_count().to_string() },
        SummaryRow { key: "Undefined", value: samples.undefined_count().to_string() },
        SummaryRow { key: "Min", value: min },
        SummaryRow { key: "Max", value: max },
    ]
}

pub fn summary_table(request: &PlotRequest, samples: &SampleSet) -> String {
    let mut table = Table::new(sample_summary(request, samples));
    table.with(Style::modern_rounded());
    table.to_string()
}
