use std::collections::HashSet;
use std::time::Duration;
use crate::domain::*;

pub fn single_report(url: &str, measurement: &Measurement) -> SingleReport {
    let rows = measurement.kind().phases().iter()
        .filter_map(|&phase| measurement.phase(phase).map(|value| PhaseValue { phase, value }))
        .collect();

    SingleReport {
        url: url.to_string(),
        transport: measurement.transport(),
        rows,
        total_label: measurement.kind().total_label(),
        total: measurement.total(),
    }
}

/// Outliers are detected on the per-sample totals only. When `exclude` is
/// set, a flagged sample is dropped from every row, not just the total.
pub fn multi_report(
    url: &str,
    kind: MeasurementKind,
    transport: TransportKind,
    measurements: &[Measurement],
    exclude: bool,
) -> MultiReport {
    let all_totals = totals(measurements);
    let outliers = detect_outliers(&all_totals);
    let excluding = exclude && !outliers.is_empty();

    let kept: Vec<Measurement> = if excluding {
        let flagged: HashSet<usize> = outliers.iter().map(|o| o.index).collect();
        measurements.iter().enumerate()
            .filter(|(i, _)| !flagged.contains(i))
            .map(|(_, m)| *m)
            .collect()
    } else {
        measurements.to_vec()
    };

    let rows = kind.phases().iter()
        .filter_map(|&phase| {
            let values = phase_values(&kept, phase);
            (!values.is_empty()).then(|| StatsRow { phase, stats: compute_stats(&values) })
        })
        .collect();

    let total_values = if exclude { exclude_outliers(&all_totals, &outliers) } else { all_totals.as_slice().into() };

    MultiReport {
        url: url.to_string(),
        transport,
        samples: measurements.len(),
        outliers_excluded: excluding,
        rows,
        total_label: kind.total_label(),
        total: compute_stats(&total_values),
        outliers,
    }
}

/// With more than one sample per side the compared value is the phase mean.
pub fn comparison_report(
    url: &str,
    kind: MeasurementKind,
    first: (TransportKind, &[Measurement]),
    second: (TransportKind, &[Measurement]),
) -> ComparisonReport {
    let rows = kind.phases().iter()
        .filter_map(|&phase| {
            let row = ComparisonRow {
                label: phase.label(),
                first: representative(&phase_values(first.1, phase)),
                second: representative(&phase_values(second.1, phase)),
            };
            (row.first.is_some() || row.second.is_some()).then_some(row)
        })
        .collect();

    let total = ComparisonRow {
        label: kind.total_label(),
        first: representative(&totals(first.1)),
        second: representative(&totals(second.1)),
    };

    ComparisonReport {
        url: url.to_string(),
        samples: first.1.len().max(second.1.len()),
        first: first.0,
        second: second.0,
        rows,
        total,
    }
}

fn representative(values: &[Duration]) -> Option<Duration> {
    match values {
        [] => None,
        [only] => Some(*only),
        _ => Some(compute_stats(values).mean),
    }
}
