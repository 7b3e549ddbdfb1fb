use common::{config::TimeUnit, record::Metric, run::RunConfig};
use serde::Serialize;

use crate::script::{HIDE_ERROR_BARS, Script};

const ERROR_BARS_ICON: &str = "path://M 11.359041,7.5285047 V 4.5670261 H 2.4746032 v 2.9614786 h 2.9614791 c -0.021137,11.0157323 0,11.0155383 0,20.7303553 H 2.4746032 v 2.961479 H 11.359041 V 28.25886 H 8.397562 c 0.165371,-14.351131 0,0 0,-20.7303553 z M 26.856729,4.3174113 V 1.3559322 h -8.884437 v 2.9614791 h 2.96148 V 22.086287 h -2.96148 v 2.961478 h 8.884437 v -2.961478 h -2.961478 c 0,-17.7688757 0,0 0,-17.7688757 z";

/// One chart of the page: the ECharts option plus what it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartModel {
    pub metric: Metric,
    pub config: RunConfig,
    pub option: ChartOption,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOption {
    pub title: Title,
    pub legend: Legend,
    pub grid: Grid,
    pub x_axis: Axis,
    pub y_axis: Axis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toolbox: Option<Toolbox>,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
    pub subtext: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub show: bool,
    pub left: String,
    pub right: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid {
    pub top: String,
    pub left: String,
    pub right: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Axis {
    pub name: String,
    pub name_location: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub name_gap: u32,
}

impl Axis {
    fn value(name: String, name_gap: u32) -> Self {
        Self {
            name,
            name_location: "center",
            kind: "value",
            name_gap,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Toolbox {
    pub show: bool,
    pub feature: ToolboxFeature,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolboxFeature {
    pub restore: Restore,
    /// ECharts only accepts custom toolbox buttons named `my*`
    #[serde(rename = "myErrorBars")]
    pub error_bars: ToggleControl,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Restore {
    pub show: bool,
}

/// Toolbox button switching the error bars of every latency chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToggleControl {
    pub show: bool,
    pub title: String,
    pub icon: &'static str,
    pub onclick: Script,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Series {
    Line(LineSeries),
    Custom(ErrorBarSeries),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    pub name: String,
    pub smooth: bool,
    /// `[x, y, ...]` items, extra dimensions are ignored by the line
    pub data: Vec<Vec<f64>>,
}

/// Auxiliary series drawing `[x, mean, min, max]` items as whiskers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBarSeries {
    pub name: String,
    pub render_item: Script,
    pub encode: Encode,
    pub item_style: ItemStyle,
    pub data: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Encode {
    pub x: Vec<usize>,
    pub y: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemStyle {
    pub border_width: f64,
}

/// Builds a [`ChartModel`] step by step.
pub struct ChartBuilder {
    metric: Metric,
    config: RunConfig,
    option: ChartOption,
}

impl ChartBuilder {
    /// A chart with title, legend and grid, and a value x axis in `time_unit`.
    pub fn new(metric: Metric, config: RunConfig, subtext: String, time_unit: TimeUnit) -> Self {
        let option = ChartOption {
            title: Title {
                text: metric.name().to_owned(),
                subtext,
            },
            legend: Legend {
                show: true,
                left: "280".to_owned(),
                right: "140".to_owned(),
            },
            grid: Grid {
                top: "75".to_owned(),
                left: "8%".to_owned(),
                right: "2%".to_owned(),
            },
            x_axis: Axis::value(format!("duration ({time_unit})"), 30),
            y_axis: Axis::value(String::new(), 50),
            toolbox: None,
            series: Vec::new(),
        };
        Self {
            metric,
            config,
            option,
        }
    }

    pub fn with_y_axis(mut self, name: &str) -> Self {
        self.option.y_axis.name = name.to_owned();
        self
    }

    /// Adds the restore button and the error bar toggle to the toolbox.
    pub fn with_error_bar_toggle(mut self, onclick: Script) -> Self {
        self.option.toolbox = Some(Toolbox {
            show: true,
            feature: ToolboxFeature {
                restore: Restore { show: true },
                error_bars: ToggleControl {
                    show: true,
                    title: "Toggle error bars".to_owned(),
                    icon: ERROR_BARS_ICON,
                    onclick,
                },
            },
        });
        self
    }

    pub fn add_line_series(mut self, name: &str, data: Vec<Vec<f64>>) -> Self {
        self.option.series.push(Series::Line(LineSeries {
            name: name.to_owned(),
            smooth: true,
            data,
        }));
        self
    }

    /// Adds hidden whiskers for `[x, mean, min, max]` items.
    pub fn add_error_bar_series(mut self, name: &str, data: Vec<Vec<f64>>) -> Self {
        self.option.series.push(Series::Custom(ErrorBarSeries {
            name: name.to_owned(),
            render_item: Script::from_static(HIDE_ERROR_BARS),
            encode: Encode {
                x: vec![0],
                y: vec![2, 3],
            },
            item_style: ItemStyle { border_width: 1.5 },
            data,
        }));
        self
    }

    pub fn build(self) -> ChartModel {
        ChartModel {
            metric: self.metric,
            config: self.config,
            option: self.option,
        }
    }
}
