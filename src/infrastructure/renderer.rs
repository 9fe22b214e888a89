use std::fmt::Write;
use std::time::Duration;
use crate::domain::millis::as_ms;
use crate::domain::*;
use crate::ports::Renderer;

const SINGLE_RULE: &str = "────────────────────────────────────────────────────";
const STATS_RULE: &str = "──────────────────────────────────────────────────────────────────────────────────";
const COMPARE_RULE: &str = "────────────────────────────────────────────────────────────────────";

#[derive(Debug, Clone, Copy, Default)]
pub struct PrettyRenderer;

impl PrettyRenderer {
    pub fn new() -> Self { Self }
}

impl Renderer for PrettyRenderer {
    fn render(&self, report: &Report) -> String {
        let mut out = String::new();
        match report {
            Report::Single(r) => render_single(&mut out, r),
            Report::Multi(r) => render_multi(&mut out, r),
            Report::Comparison(r) => render_comparison(&mut out, r),
        }
        out
    }
}

fn render_single(out: &mut String, r: &SingleReport) {
    let _ = writeln!(out, "ttff results for: {} ({})", r.url, r.transport);
    let _ = writeln!(out, "{}", SINGLE_RULE);
    for row in &r.rows {
        let _ = writeln!(out, "{:<29}{:>12}", format!("{}:", row.phase.label()), format_ms(row.value));
    }
    let _ = writeln!(out, "{}", SINGLE_RULE);
    let _ = writeln!(out, "{:<29}{:>12}", format!("{}:", r.total_label), format_ms(r.total));
}

fn render_multi(out: &mut String, r: &MultiReport) {
    let _ = writeln!(out, "ttff results for: {} ({} samples, {})", r.url, r.samples, r.transport);
    let _ = writeln!(out, "{}", STATS_RULE);
    let _ = writeln!(out, "{:<20} {:>12} {:>12} {:>12} {:>12} {:>12}", "", r.mean_label(), "Min", "Max", "Median", "StdDev");
    let _ = writeln!(out, "{}", STATS_RULE);
    for row in &r.rows {
        stats_line(out, row.phase.label(), &row.stats);
    }
    let _ = writeln!(out, "{}", STATS_RULE);
    stats_line(out, r.total_label, &r.total);

    if r.outliers.is_empty() {
        return;
    }
    out.push('\n');
    out.push_str(if r.outliers_excluded { "* Outliers excluded from average: " } else { "Outliers detected: " });
    let listed: Vec<String> = r.outliers.iter()
        .map(|o| {
            let sign = if o.deviation_pct < 0.0 { "" } else { "+" };
            format!("sample {} ({}, {}{:.1}%)", o.index + 1, format_ms(o.value), sign, o.deviation_pct)
        })
        .collect();
    out.push_str(&listed.join(", "));
    out.push('\n');
}

fn stats_line(out: &mut String, label: &str, s: &Stats) {
    let _ = writeln!(
        out,
        "{:<20} {:>12} {:>12} {:>12} {:>12} {:>12}",
        format!("{}:", label),
        format_ms(s.mean),
        format_ms(s.min),
        format_ms(s.max),
        format_ms(s.median),
        format_ms(s.std_dev),
    );
}

fn render_comparison(out: &mut String, r: &ComparisonReport) {
    if r.samples > 1 {
        let _ = writeln!(out, "ttff comparison for: {} ({} samples each)", r.url, r.samples);
    } else {
        let _ = writeln!(out, "ttff comparison for: {}", r.url);
    }
    let _ = writeln!(out, "{}", COMPARE_RULE);
    let _ = writeln!(out, "{:<20} {:>14} {:>14} {:>14}", "", r.first.label(), r.second.label(), "Delta");
    let _ = writeln!(out, "{}", COMPARE_RULE);
    for row in &r.rows {
        comparison_line(out, row);
    }
    let _ = writeln!(out, "{}", COMPARE_RULE);
    comparison_line(out, &r.total);
}

fn comparison_line(out: &mut String, row: &ComparisonRow) {
    let cell = |d: Option<Duration>| d.map(format_ms).unwrap_or_else(|| "N/A".to_string());
    let delta = row.delta_ms().map(format_delta).unwrap_or_else(|| "N/A".to_string());
    let _ = writeln!(out, "{:<20} {:>14} {:>14} {:>14}", format!("{}:", row.label), cell(row.first), cell(row.second), delta);
}

pub fn format_ms(d: Duration) -> String {
    format!("{:.2}ms", as_ms(d))
}

pub fn format_delta(delta_ms: f64) -> String {
    if delta_ms >= 0.0 {
        format!("+{:.2}ms", delta_ms)
    } else {
        format!("{:.2}ms", delta_ms)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl JsonRenderer {
    pub fn new() -> Self { Self }
}

impl Renderer for JsonRenderer {
    fn render(&self, report: &Report) -> String {
        match serde_json::to_string_pretty(report) {
            Ok(mut json) => {
                json.push('\n');
                json
            }
            Err(e) => format!("{{\"error\": {:?}}}\n", e.to_string()),
        }
    }
}
