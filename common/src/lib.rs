pub mod config;
pub mod error;
pub mod group;
pub mod record;
pub mod run;
pub mod util;

pub use error::PlotError;
