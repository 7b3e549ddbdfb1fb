use std::{io::Write, path::Path};

use common::{PlotError, config::Settings};
use handlebars::Handlebars;
use itertools::Itertools;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::{chart::ChartModel, script::inline_scripts};

/// Class of every chart container, the error bar toggle looks charts up by it.
pub const CHART_CLASS: &str = "item";

const PAGE_TEMPLATE: &str = "page";

/// Turns assembled charts into a complete document.
pub trait Renderer {
    fn render(&self, charts: &[ChartModel]) -> Result<String, PlotError>;
}

/// Flex layout of fixed size ECharts containers, loading ECharts from `assets`.
#[derive(Debug, Clone)]
pub struct HtmlPage {
    pub title: String,
    pub assets: String,
    pub width: u32,
    pub height: u32,
}

impl HtmlPage {
    pub fn new(settings: &Settings) -> Self {
        Self {
            title: settings.page_title.clone(),
            assets: settings.assets.clone(),
            width: 900,
            height: 500,
        }
    }
}

#[derive(Serialize)]
struct PageContext<'a> {
    title: &'a str,
    assets: &'a str,
    chart_class: &'a str,
    width: u32,
    height: u32,
    charts: Vec<ChartContext>,
}

#[derive(Serialize)]
struct ChartContext {
    id: String,
    option: String,
}

impl Renderer for HtmlPage {
    fn render(&self, charts: &[ChartModel]) -> Result<String, PlotError> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars
            .register_template_string(PAGE_TEMPLATE, include_str!("page.template.html"))
            .map_err(|err| PlotError::Render(err.to_string()))?;

        let charts = charts
            .iter()
            .enumerate()
            .map(|(i, chart)| {
                let json = serde_json::to_string(&chart.option)
                    .map_err(|err| PlotError::Render(err.to_string()))?;
                // Keep engine names like "</script>" from closing the script block
                let option = inline_scripts(&json.replace("</", "<\\/"))?;
                Ok(ChartContext {
                    id: format!("chart-{i}"),
                    option,
                })
            })
            .collect::<Result<Vec<_>, PlotError>>()?;
        debug!(
            "Rendering {} charts: {}",
            charts.len(),
            charts.iter().map(|c| &c.id).join(", ")
        );

        let context = PageContext {
            title: &self.title,
            assets: &self.assets,
            chart_class: CHART_CLASS,
            width: self.width,
            height: self.height,
            charts,
        };
        handlebars
            .render(PAGE_TEMPLATE, &context)
            .map_err(|err| PlotError::Render(err.to_string()))
    }
}

/// Writes `page` to a temporary file next to `path` and moves it over `path`
/// once complete. On failure `path` is left as it was and the temporary file
/// is removed.
pub fn write_page(page: &str, path: &Path) -> Result<(), PlotError> {
    let write_error = |source, cleanup| PlotError::Write {
        path: path.to_path_buf(),
        source,
        cleanup,
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut file = NamedTempFile::new_in(dir).map_err(|err| write_error(err, None))?;
    if let Err(err) = file
        .write_all(page.as_bytes())
        .and_then(|()| file.as_file().sync_all())
    {
        return Err(write_error(err, file.close().err()));
    }
    file.persist(path)
        .map_err(|err| write_error(err.error, err.file.close().err()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, fs, time::Duration};

    use common::{
        config::TimeUnit,
        record::Metric,
        run::{RunConfig, RunMeasurements, Sample},
    };

    use super::*;
    use crate::assemble::assemble_chart;

    fn page() -> HtmlPage {
        HtmlPage {
            title: "Results".to_owned(),
            assets: "https://cdn.example/assets/".to_owned(),
            width: 900,
            height: 500,
        }
    }

    fn latency_chart(engine: &str) -> ChartModel {
        let config = RunConfig {
            writers: 1,
            readers: 1,
            size: 1 << 20,
            vary: true,
        };
        let run = RunMeasurements {
            engine: engine.to_owned(),
            config,
            offsets: vec![Duration::ZERO],
            data: BTreeMap::from([(
                Metric::GetFirst,
                vec![Sample::Latency {
                    mean: 1.0,
                    min: 0.5,
                    max: 2.0,
                }],
            )]),
        };
        assemble_chart(&config, Metric::GetFirst, &[run], TimeUnit::Seconds)
    }

    #[test]
    fn renders_one_container_per_chart() {
        let html = page()
            .render(&[latency_chart("X"), latency_chart("Y")])
            .unwrap();
        assert!(html.contains(r#"<script src="https://cdn.example/assets/echarts.min.js">"#));
        assert!(html.contains(r#"<div class="item" id="chart-0""#));
        assert!(html.contains(r#"<div class="item" id="chart-1""#));
        assert_eq!(html.matches("chart.setOption(").count(), 2);
        assert!(html.contains(r#""renderItem":function () { return null; }"#));
        assert!(html.contains(r#""onclick":function () {"#));
        assert!(!html.contains("__script__"));
    }

    #[test]
    fn empty_page_has_no_charts() {
        let html = page().render(&[]).unwrap();
        assert!(html.contains("<title>Results</title>"));
        assert!(!html.contains("setOption"));
    }

    #[test]
    fn engine_names_cannot_close_the_script_block() {
        let html = page().render(&[latency_chart("</script>")]).unwrap();
        assert_eq!(html.matches("</script>").count(), 2);
    }

    #[test]
    fn engine_names_shaped_like_scripts_stay_text() {
        let html = page()
            .render(&[
                latency_chart("__script__alert(document.cookie)__script__"),
                latency_chart(r#"{"__script__":"alert(1)"}"#),
            ])
            .unwrap();
        assert!(html.contains(r#""name":"__script__alert(document.cookie)__script__""#));
        assert!(html.contains(r#""name":"{\"__script__\":\"alert(1)\"}""#));
        assert!(!html.contains(":alert("));
    }

    #[test]
    fn writes_page_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.html");
        write_page("<html></html>", &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "<html></html>");
    }

    #[test]
    fn unwritable_destination_is_a_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("results.html");
        let err = write_page("<html></html>", &path).unwrap_err();
        match err {
            PlotError::Write { cleanup, .. } => assert!(cleanup.is_none()),
            other => panic!("unexpected error {other:?}"),
        }
        assert!(!path.exists());
    }

    #[test]
    fn replaces_an_existing_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.html");
        fs::write(&path, "old page").unwrap();
        write_page("<html></html>", &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "<html></html>");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn failed_write_keeps_the_destination() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory cannot be replaced by a file
        let path = dir.path().join("results.html");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("kept"), "previous").unwrap();

        let err = write_page("<html></html>", &path).unwrap_err();
        match err {
            PlotError::Write { cleanup, .. } => assert!(cleanup.is_none()),
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(fs::read_to_string(path.join("kept")).unwrap(), "previous");
        // No temporary file is left behind
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
