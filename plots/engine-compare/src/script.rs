//! JavaScript carried inside chart options.
//!
//! A [`Script`] serializes as the object `{"__script__": source}`. The page
//! composer swaps every such object for its raw source with
//! [`inline_scripts`] once the option has been serialized, so the browser sees
//! a function instead of an object. Strings taken from the logs always
//! serialize as JSON strings, so they can never take the shape of a script.

use std::{borrow::Cow, sync::LazyLock};

use common::PlotError;
use regex::Regex;
use serde::{Serialize, Serializer, ser::SerializeMap};

const SCRIPT_MARK: &str = "__script__";

// Inside a JSON string every quote is escaped, so `{"` only ever opens an object
static SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r#"\{{"{SCRIPT_MARK}":"((?:[^"\\]|\\.)*)"\}}"#)).unwrap()
});

/// Draws a min-max whisker with end caps at the x position of a
/// `[x, mean, min, max]` data item.
pub const RENDER_ERROR_BARS: &str = r#"function (params, api) {
	var x = api.value(0);
	var minPoint = api.coord([x, api.value(2)]);
	var maxPoint = api.coord([x, api.value(3)]);
	var halfWidth = 5;
	var style = api.style({
		stroke: api.visual('color'),
		fill: undefined
	});
	function segment(x1, y1, x2, y2) {
		return {
			type: 'line',
			transition: ['shape'],
			shape: { x1: x1, y1: y1, x2: x2, y2: y2 },
			style: style
		};
	}
	return {
		type: 'group',
		children: [
			segment(maxPoint[0] - halfWidth, maxPoint[1], maxPoint[0] + halfWidth, maxPoint[1]),
			segment(maxPoint[0], maxPoint[1], minPoint[0], minPoint[1]),
			segment(minPoint[0] - halfWidth, minPoint[1], minPoint[0] + halfWidth, minPoint[1])
		]
	};
}"#;

/// Renders nothing, the initial state of every error bar series.
pub const HIDE_ERROR_BARS: &str = "function () { return null; }";

/// Opaque JavaScript source embedded in a chart option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script(Cow<'static, str>);

impl Script {
    pub const fn from_static(source: &'static str) -> Self {
        Self(Cow::Borrowed(source))
    }

    pub fn new(source: String) -> Self {
        Self(Cow::Owned(source))
    }

    pub fn source(&self) -> &str {
        &self.0
    }
}

impl Serialize for Script {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(SCRIPT_MARK, self.source())?;
        map.end()
    }
}

/// Toolbox callback flipping the error bars of every latency chart found in
/// elements of `chart_class` at once.
///
/// The visibility flag lives on `window`, so all charts of a page toggle in
/// lock-step no matter which chart's button was clicked. The toolbox restore
/// button resets a chart's option, so each chart reapplies the flag after a
/// restore.
pub fn toggle_error_bars(chart_class: &str) -> Script {
    Script::new(format!(
        r#"function () {{
	var state = window.engineCompareErrorBars || (window.engineCompareErrorBars = {{ shown: false }});
	state.shown = !state.shown;
	function apply(chart) {{
		var renderItem = state.shown ? {RENDER_ERROR_BARS} : {HIDE_ERROR_BARS};
		var custom = false;
		var series = chart.getOption().series.map(function (s) {{
			if (s.type === 'custom') {{
				custom = true;
				return {{ renderItem: renderItem }};
			}}
			return {{}};
		}});
		if (custom) {{
			chart.setOption({{ series: series }});
		}}
	}}
	var elements = document.getElementsByClassName('{chart_class}');
	for (var i = 0; i < elements.length; i++) {{
		var chart = echarts.getInstanceByDom(elements[i]);
		if (!chart) {{
			continue;
		}}
		if (!chart.engineCompareRestore) {{
			chart.engineCompareRestore = true;
			chart.on('restore', (function (target) {{
				return function () {{
					setTimeout(function () {{ apply(target); }}, 0);
				}};
			}})(chart));
		}}
		apply(chart);
	}}
}}"#
    ))
}

/// Replaces every serialized [`Script`] in `json` with its raw source.
pub fn inline_scripts(json: &str) -> Result<String, PlotError> {
    let mut inlined = String::with_capacity(json.len());
    let mut last = 0;
    for caps in SCRIPT_RE.captures_iter(json) {
        let whole = caps.get_match();
        let source: String = serde_json::from_str(&format!("\"{}\"", &caps[1]))
            .map_err(|err| PlotError::Render(format!("Corrupt script payload: {err}")))?;
        inlined.push_str(&json[last..whole.start()]);
        inlined.push_str(&source);
        last = whole.end();
    }
    inlined.push_str(&json[last..]);
    Ok(inlined)
}
