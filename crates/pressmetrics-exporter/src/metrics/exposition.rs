use pressmetrics_common::LabelSet;

use crate::metrics::{
    catalog::{EXPORTER_ERROR, EXPORTER_ERROR_HELP},
    registry::MetricRegistry,
    types::{MetricKind, MetricSnapshot, SeriesValue},
};

pub const CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Renders every registered metric that has at least one series, in
/// definition order. Snapshot entries without a definition are not rendered.
pub fn render(snapshot: &MetricSnapshot, registry: &MetricRegistry) -> String {
    let mut output = String::new();

    for definition in registry.definitions() {
        let Some(series) = snapshot.get(&definition.name) else {
            continue;
        };
        if series.is_empty() {
            continue;
        }

        render_family(
            &mut output,
            &definition.name,
            definition.kind,
            &definition.help,
            series,
        );
        output.push('\n');
    }

    output
}

/// The whole body of a scrape that could not collect anything.
pub fn render_error(reason: &str) -> String {
    let mut output = String::new();
    render_family(
        &mut output,
        EXPORTER_ERROR,
        MetricKind::Gauge,
        EXPORTER_ERROR_HELP,
        &[SeriesValue {
            labels: LabelSet::new().with("type", reason),
            value: 1.0,
        }],
    );
    output
}

fn render_family(
    output: &mut String,
    name: &str,
    kind: MetricKind,
    help: &str,
    series: &[SeriesValue],
) {
    output.push_str("# HELP ");
    output.push_str(name);
    output.push(' ');
    output.push_str(&escape_help(help));
    output.push('\n');

    output.push_str("# TYPE ");
    output.push_str(name);
    output.push(' ');
    output.push_str(kind.as_prometheus_type());
    output.push('\n');

    for entry in series {
        output.push_str(&render_sample_line(name, &entry.labels, entry.value));
    }
}

fn render_sample_line(name: &str, labels: &LabelSet, value: f64) -> String {
    let mut rendered = String::new();
    rendered.push_str(name);
    rendered.push_str(&labels.to_exposition());
    rendered.push(' ');
    rendered.push_str(&format_metric_value(value));
    rendered.push('\n');
    rendered
}

fn format_metric_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value.is_sign_positive() {
            "+Inf".to_string()
        } else {
            "-Inf".to_string()
        }
    } else if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

fn escape_help(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\n', "\\n")
}
