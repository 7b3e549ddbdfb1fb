use std::{collections::BTreeMap, fmt, time::Duration};

use chrono::{DateTime, FixedOffset};
use tracing::{debug, warn};

use crate::{
    error::PlotError,
    record::{LogRecord, Metric, RecordKind},
    util::format_size,
};

/// Workload configuration shared by comparable runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunConfig {
    pub writers: usize,
    pub readers: usize,
    /// Value size in bytes
    pub size: u64,
    /// Whether value sizes vary around `size`
    pub vary: bool,
}

impl fmt::Display for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "writers={} readers={} size={} vary={}",
            self.writers,
            self.readers,
            format_size(self.size),
            self.vary
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    Rate(f64),
    Latency { mean: f64, min: f64, max: f64 },
}

impl Sample {
    pub fn values(&self) -> Vec<f64> {
        match *self {
            Sample::Rate(rate) => vec![rate],
            Sample::Latency { mean, min, max } => vec![mean, min, max],
        }
    }
}

/// Reconciled time series of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunMeasurements {
    pub engine: String,
    pub config: RunConfig,
    /// Elapsed time since the first timestamped record, strictly increasing
    pub offsets: Vec<Duration>,
    pub data: BTreeMap<Metric, Vec<Sample>>,
}

impl RunMeasurements {
    /// Samples of `metric`, empty when the run never reported it.
    pub fn series(&self, metric: Metric) -> &[Sample] {
        self.data.get(&metric).map(Vec::as_slice).unwrap_or_default()
    }

    /// Samples of `metric` paired with the offset they were reported at.
    pub fn points(&self, metric: Metric) -> impl Iterator<Item = (Duration, &Sample)> {
        self.offsets.iter().copied().zip(self.series(metric))
    }
}

/// Folds the records of one run into [`RunMeasurements`].
#[derive(Debug, Default)]
pub struct RunAccumulator {
    marker: Option<(String, RunConfig)>,
    start: Option<DateTime<FixedOffset>>,
    offsets: Vec<Duration>,
    data: BTreeMap<Metric, Vec<Sample>>,
}

impl RunAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: LogRecord) -> Result<(), PlotError> {
        if let Some(timestamp) = record.timestamp {
            self.push_timestamp(record.line, timestamp);
        }

        match record.kind {
            RecordKind::Marker { engine, config } => {
                if self.marker.is_some() {
                    return Err(PlotError::DuplicateMarker {
                        line: record.line,
                        engine,
                    });
                }
                self.marker = Some((engine, config));
            }
            RecordKind::Throughput { metric, rate } => {
                self.data.entry(metric).or_default().push(Sample::Rate(rate));
            }
            RecordKind::Latency {
                metric,
                mean,
                min,
                max,
            } => {
                self.data
                    .entry(metric)
                    .or_default()
                    .push(Sample::Latency { mean, min, max });
            }
            RecordKind::Other { .. } => {}
        }
        Ok(())
    }

    fn push_timestamp(&mut self, line: usize, timestamp: DateTime<FixedOffset>) {
        let Some(start) = self.start else {
            self.start = Some(timestamp);
            self.offsets.push(Duration::ZERO);
            return;
        };

        let Ok(offset) = (timestamp - start).to_std() else {
            warn!("Timestamp on line {line} is before the first timestamp, ignoring it");
            return;
        };
        // Offsets are never empty once `start` is set
        let last = self.offsets.last().copied().unwrap_or_default();
        if offset > last {
            self.offsets.push(offset);
        } else if offset < last {
            warn!("Timestamp on line {line} goes back in time, ignoring it");
        }
    }

    /// Truncates every series, offsets included, to the shortest one.
    pub fn finish(self) -> Result<RunMeasurements, PlotError> {
        let Self {
            marker,
            mut offsets,
            mut data,
            ..
        } = self;
        let (engine, config) = marker.ok_or(PlotError::MissingMarker)?;

        let length = data
            .values()
            .map(Vec::len)
            .chain([offsets.len()])
            .min()
            .unwrap_or_default();

        let dropped: usize = data.values().map(|series| series.len() - length).sum();
        offsets.truncate(length);
        for series in data.values_mut() {
            series.truncate(length);
        }

        debug!(
            "engine={engine} {config} points={length} dropped_samples={dropped} metrics={}",
            data.len()
        );

        Ok(RunMeasurements {
            engine,
            config,
            offsets,
            data,
        })
    }
}

/// Accumulates a whole record stream into a single run.
pub fn accumulate<I>(records: I) -> Result<RunMeasurements, PlotError>
where
    I: IntoIterator<Item = Result<LogRecord, PlotError>>,
{
    let mut accumulator = RunAccumulator::new();
    for record in records {
        accumulator.push(record?)?;
    }
    accumulator.finish()
}
