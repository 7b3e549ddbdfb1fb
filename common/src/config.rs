use std::{fmt, path::PathBuf, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

pub const DEFAULT_OUTPUT: &str = "results.html";
pub const DEFAULT_ASSETS: &str = "https://go-echarts.github.io/go-echarts-assets/assets/";
pub const DEFAULT_PAGE_TITLE: &str = "Results";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Where the rendered page is written
    pub output: PathBuf,
    /// Base URL the page loads `echarts.min.js` from
    pub assets: String,
    /// Unit of the shared x axis
    pub time_unit: TimeUnit,
    pub page_title: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT),
            assets: DEFAULT_ASSETS.to_owned(),
            time_unit: TimeUnit::default(),
            page_title: DEFAULT_PAGE_TITLE.to_owned(),
        }
    }
}

impl Settings {
    pub fn from_yaml(data: &str) -> Result<Self, serde_yml::Error> {
        serde_yml::from_str(data)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeUnit {
    #[serde(rename = "ms")]
    Milliseconds,
    #[default]
    #[serde(rename = "s")]
    Seconds,
    #[serde(rename = "min")]
    Minutes,
}

impl TimeUnit {
    pub fn duration(&self) -> Duration {
        match self {
            TimeUnit::Milliseconds => Duration::from_millis(1),
            TimeUnit::Seconds => Duration::from_secs(1),
            TimeUnit::Minutes => Duration::from_secs(60),
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            TimeUnit::Milliseconds => "ms",
            TimeUnit::Seconds => "s",
            TimeUnit::Minutes => "min",
        }
    }

    /// Expresses `offset` as a (possibly fractional) number of this unit.
    pub fn scale(&self, offset: Duration) -> f64 {
        offset.as_secs_f64() / self.duration().as_secs_f64()
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

impl FromStr for TimeUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ms" => Ok(TimeUnit::Milliseconds),
            "s" => Ok(TimeUnit::Seconds),
            "min" => Ok(TimeUnit::Minutes),
            _ => Err(format!("Unsupported time unit {s}, expected one of ms, s, min")),
        }
    }
}
