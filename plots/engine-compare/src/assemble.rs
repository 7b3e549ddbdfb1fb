use common::{
    config::TimeUnit,
    group::GroupedRuns,
    record::Metric,
    run::{RunConfig, RunMeasurements},
};
use tracing::debug;

use crate::{
    chart::{ChartBuilder, ChartModel},
    page::CHART_CLASS,
    script::toggle_error_bars,
};

pub const RATE_AXIS: &str = "ops/s";
pub const DURATION_AXIS: &str = "duration (ms)";
pub const HIGHER_IS_BETTER: &str = "higher is better";
pub const LOWER_IS_BETTER: &str = "lower is better";

/// Builds every chart of the page: configurations in grouping order, and for
/// each of them all metrics in [`Metric::ALL`] order.
pub fn assemble_all(grouped: &GroupedRuns, time_unit: TimeUnit) -> Vec<ChartModel> {
    grouped
        .iter()
        .flat_map(|(config, runs)| {
            Metric::ALL
                .into_iter()
                .map(move |metric| assemble_chart(config, metric, runs, time_unit))
        })
        .collect()
}

/// Overlays the `metric` series of every run measured under `config`.
///
/// Each run keeps its own offsets, scaled to `time_unit`, so runs sampled at
/// different instants still share the x axis. Latency charts additionally get
/// one hidden error bar series per run and the page-wide toggle.
pub fn assemble_chart(
    config: &RunConfig,
    metric: Metric,
    runs: &[RunMeasurements],
    time_unit: TimeUnit,
) -> ChartModel {
    let (axis, hint) = if metric.is_rate() {
        (RATE_AXIS, HIGHER_IS_BETTER)
    } else {
        (DURATION_AXIS, LOWER_IS_BETTER)
    };

    let mut chart = ChartBuilder::new(metric, *config, format!("{config}\n{hint}"), time_unit)
        .with_y_axis(axis);
    if !metric.is_rate() {
        chart = chart.with_error_bar_toggle(toggle_error_bars(CHART_CLASS));
    }

    for run in runs {
        let data = series_data(run, metric, time_unit);
        debug!(
            "metric={} engine={} {config} points={}",
            metric.name(),
            run.engine,
            data.len()
        );
        chart = if metric.is_rate() {
            chart.add_line_series(&run.engine, data)
        } else {
            chart
                .add_line_series(&run.engine, data.clone())
                .add_error_bar_series(&run.engine, data)
        };
    }

    chart.build()
}

/// `[x, value...]` items of one run, with x in `time_unit`.
fn series_data(run: &RunMeasurements, metric: Metric, time_unit: TimeUnit) -> Vec<Vec<f64>> {
    run.points(metric)
        .map(|(offset, sample)| {
            let mut item = vec![time_unit.scale(offset)];
            item.extend(sample.values());
            item
        })
        .collect()
}
