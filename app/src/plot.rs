use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    time::Instant,
};

use common::{
    config::Settings,
    group::GroupedRuns,
    record::RecordStream,
    run::{RunMeasurements, accumulate},
};
use engine_compare::{HtmlPage, Renderer, assemble_all, write_page};
use eyre::{Result, WrapErr};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::{debug, info};

/// Reconciles every log file, then renders all comparisons into one page.
///
/// Nothing is written unless every file reconciles.
pub fn plot(files: &[PathBuf], settings: &Settings) -> Result<()> {
    let start = Instant::now();
    // Collecting keeps file order, which is the order runs appear in a chart
    // and the order failures are reported in
    let runs = files
        .par_iter()
        .map(|path| load_run(path))
        .collect::<Vec<_>>()
        .into_iter()
        .collect::<Result<Vec<_>>>()?;
    let grouped: GroupedRuns = runs.into_iter().collect();
    debug!(
        "Loaded {} runs into {} configurations",
        files.len(),
        grouped.len()
    );

    let charts = assemble_all(&grouped, settings.time_unit);
    let page = HtmlPage::new(settings).render(&charts)?;
    write_page(&page, &settings.output)?;

    info!(
        "Wrote {} charts to {} in {:.2?}",
        charts.len(),
        settings.output.display(),
        start.elapsed()
    );
    Ok(())
}

fn load_run(path: &Path) -> Result<RunMeasurements> {
    let file = File::open(path).wrap_err_with(|| format!("Open log {}", path.display()))?;
    let measurements = accumulate(RecordStream::new(BufReader::new(file)))
        .wrap_err_with(|| format!("Process log {}", path.display()))?;
    info!(
        "{}: engine={} {} points={}",
        path.display(),
        measurements.engine,
        measurements.config,
        measurements.offsets.len()
    );
    Ok(measurements)
}
