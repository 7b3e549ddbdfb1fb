use std::io::{self, BufRead, Lines};

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

use crate::{error::PlotError, run::RunConfig, util::parse_timestamp};

/// Message of the record declaring a run's engine and configuration.
pub const MARKER_TAG: &str = "running";

/// The measured metrics, in the order charts are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    GetRate,
    SetRate,
    GetReady,
    GetFirst,
    GetTotal,
    Set,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::GetRate,
        Metric::SetRate,
        Metric::GetReady,
        Metric::GetFirst,
        Metric::GetTotal,
        Metric::Set,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::GetRate => "get rate",
            Metric::SetRate => "set rate",
            Metric::GetReady => "get ready",
            Metric::GetFirst => "get first",
            Metric::GetTotal => "get total",
            Metric::Set => "set",
        }
    }

    /// Message tag of the records carrying this metric
    pub fn tag(&self) -> &'static str {
        match self {
            Metric::GetRate => "counter get",
            Metric::SetRate => "counter set",
            Metric::GetReady => "sample get.ready",
            Metric::GetFirst => "sample get.first",
            Metric::GetTotal => "sample get.total",
            Metric::Set => "sample set",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Metric> {
        Metric::ALL.into_iter().find(|metric| metric.tag() == tag)
    }

    /// Throughput metrics are the ones named after a rate, everything else is a latency.
    pub fn is_rate(&self) -> bool {
        self.name().contains("rate")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordKind {
    Marker { engine: String, config: RunConfig },
    Throughput { metric: Metric, rate: f64 },
    Latency { metric: Metric, mean: f64, min: f64, max: f64 },
    Other { message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    /// 1-based line the record was read from
    pub line: usize,
    pub timestamp: Option<DateTime<FixedOffset>>,
    pub kind: RecordKind,
}

/// Wire shape of a zerolog line; which fields are required depends on the message.
#[derive(Debug, Default, Deserialize)]
struct RawRecord {
    #[serde(default)]
    message: String,
    timestamp: Option<String>,

    engine: Option<String>,
    writers: Option<usize>,
    readers: Option<usize>,
    size: Option<u64>,
    vary: Option<bool>,

    mean: Option<f64>,
    min: Option<f64>,
    max: Option<f64>,
    rate: Option<f64>,
}

macro_rules! required {
    ($raw:expr, $line:expr, $field:ident) => {
        $raw.$field.ok_or_else(|| {
            PlotError::decode(
                $line,
                format!(
                    "{:?} record is missing field '{}'",
                    $raw.message,
                    stringify!($field)
                ),
            )
        })?
    };
}

/// Decodes and classifies a single record.
pub fn decode_record(line: usize, text: &str) -> Result<LogRecord, PlotError> {
    let raw: RawRecord =
        serde_json::from_str(text).map_err(|err| PlotError::decode(line, err))?;

    let timestamp = match raw.timestamp.as_deref() {
        None | Some("") => None,
        Some(ts) => Some(parse_timestamp(ts).map_err(|err| PlotError::decode(line, err))?),
    };

    let kind = if raw.message == MARKER_TAG {
        RecordKind::Marker {
            engine: required!(raw, line, engine),
            config: RunConfig {
                writers: required!(raw, line, writers),
                readers: required!(raw, line, readers),
                size: required!(raw, line, size),
                vary: required!(raw, line, vary),
            },
        }
    } else {
        match Metric::from_tag(&raw.message) {
            Some(metric) if metric.is_rate() => RecordKind::Throughput {
                metric,
                rate: required!(raw, line, rate),
            },
            Some(metric) => RecordKind::Latency {
                metric,
                mean: required!(raw, line, mean),
                min: required!(raw, line, min),
                max: required!(raw, line, max),
            },
            None => RecordKind::Other {
                message: raw.message,
            },
        }
    };

    Ok(LogRecord {
        line,
        timestamp,
        kind,
    })
}

/// Streams records out of a line-delimited log, one per non-blank line.
pub struct RecordStream<R> {
    lines: Lines<R>,
    line: usize,
}

impl<R: BufRead> RecordStream<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
        }
    }
}

impl<R: BufRead> Iterator for RecordStream<R> {
    type Item = Result<LogRecord, PlotError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let text = self.lines.next()?;
            self.line += 1;
            let text = match text {
                Ok(text) => text,
                Err(err) if err.kind() == io::ErrorKind::InvalidData => {
                    return Some(Err(PlotError::decode(self.line, err)));
                }
                Err(err) => return Some(Err(err.into())),
            };
            if text.trim().is_empty() {
                continue;
            }
            return Some(decode_record(self.line, &text));
        }
    }
}
