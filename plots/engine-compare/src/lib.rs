//! Comparative charts of storage engines measured under the same workload.
//!
//! Runs are assembled into one ECharts option per (configuration, metric)
//! pair by [`assemble`], then laid out on a single HTML page by [`page`].

pub mod assemble;
pub mod chart;
pub mod page;
pub mod script;

pub use assemble::{assemble_all, assemble_chart};
pub use chart::ChartModel;
pub use page::{HtmlPage, Renderer, write_page};
