use std::{
    fs,
    path::{Path, PathBuf},
};

use assert_cmd::Command;
use tempfile::TempDir;

fn marker(engine: &str) -> String {
    format!(
        r#"{{"level":"info","engine":"{engine}","writers":2,"readers":4,"size":1024,"vary":false,"time":"2024-03-01T12:00:00Z","message":"running"}}"#
    )
}

fn counter_get(second: u32, rate: f64) -> String {
    format!(
        r#"{{"level":"info","timestamp":"2024-03-01 12:00:{second:02}.000000000 +0000 UTC","count":1,"rate":{rate},"message":"counter get"}}"#
    )
}

fn write_log(dir: &Path, name: &str, lines: &[String]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, lines.join("\n") + "\n").unwrap();
    path
}

fn engine_plot() -> Command {
    Command::cargo_bin("engine-plot").unwrap()
}

#[test]
fn compares_engines_sharing_a_configuration() {
    let dir = TempDir::new().unwrap();
    let a = write_log(
        dir.path(),
        "a.log",
        &[
            marker("X"),
            counter_get(0, 100.0),
            counter_get(1, 150.0),
            counter_get(2, 130.0),
        ],
    );
    let b = write_log(
        dir.path(),
        "b.log",
        &[
            marker("Y"),
            counter_get(0, 90.0),
            counter_get(1, 95.0),
            counter_get(2, 100.0),
        ],
    );
    let output = dir.path().join("out.html");

    engine_plot()
        .arg(&a)
        .arg(&b)
        .arg("-O")
        .arg(&output)
        .assert()
        .success();

    let html = fs::read_to_string(&output).unwrap();
    // one configuration, six metrics
    assert_eq!(html.matches("chart.setOption(").count(), 6);
    assert!(html.contains(r#""text":"get rate""#));
    assert!(html.contains(
        r#""data":[[0.0,100.0],[1.0,150.0],[2.0,130.0]]"#
    ));
    assert!(html.contains(r#""data":[[0.0,90.0],[1.0,95.0],[2.0,100.0]]"#));
    assert!(html.contains("writers=2 readers=4 size=1KB vary=false\\nhigher is better"));
}

#[test]
fn missing_marker_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let log = write_log(
        dir.path(),
        "a.log",
        &[counter_get(0, 1.0), counter_get(1, 2.0)],
    );
    let output = dir.path().join("out.html");

    let assert = engine_plot().arg(&log).arg("-O").arg(&output).assert().failure();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
    assert!(stderr.contains("Missing \"running\" record"), "{stderr}");
    assert!(!output.exists());
}

#[test]
fn one_malformed_file_fails_the_batch() {
    let dir = TempDir::new().unwrap();
    let good = write_log(dir.path(), "a.log", &[marker("X"), counter_get(0, 1.0)]);
    let bad = write_log(dir.path(), "b.log", &[marker("Y"), "{\"message\":".to_owned()]);
    let output = dir.path().join("out.html");

    let assert = engine_plot()
        .arg(&good)
        .arg(&bad)
        .arg("-O")
        .arg(&output)
        .assert()
        .failure();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
    assert!(stderr.contains("Malformed record on line 2"), "{stderr}");
    assert!(!output.exists());
}

#[test]
fn first_failing_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let unmarked = write_log(dir.path(), "a.log", &[counter_get(0, 1.0)]);
    let malformed = write_log(dir.path(), "b.log", &[marker("Y"), "{\"message\":".to_owned()]);
    let output = dir.path().join("out.html");

    let assert = engine_plot()
        .arg(&unmarked)
        .arg(&malformed)
        .arg("-O")
        .arg(&output)
        .assert()
        .failure();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
    assert!(stderr.contains("Missing \"running\" record"), "{stderr}");
    assert!(!stderr.contains("Malformed record"), "{stderr}");
    assert!(!output.exists());
}

#[test]
fn failed_run_keeps_the_previous_page() {
    let dir = TempDir::new().unwrap();
    let log = write_log(dir.path(), "a.log", &[counter_get(0, 1.0)]);
    let output = dir.path().join("out.html");
    fs::write(&output, "previous").unwrap();

    engine_plot().arg(&log).arg("-O").arg(&output).assert().failure();
    assert_eq!(fs::read_to_string(&output).unwrap(), "previous");
}

#[test]
fn no_files_render_an_empty_page() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.html");

    engine_plot()
        .arg("-O")
        .arg(&output)
        .arg("--title")
        .arg("Nightly")
        .assert()
        .success();

    let html = fs::read_to_string(&output).unwrap();
    assert!(html.contains("<title>Nightly</title>"));
    assert!(!html.contains("setOption"));
}

#[test]
fn settings_file_is_overridden_by_flags() {
    let dir = TempDir::new().unwrap();
    let log = write_log(dir.path(), "a.log", &[marker("X"), counter_get(0, 1.0)]);
    let config = dir.path().join("settings.yaml");
    let from_config = dir.path().join("from-config.html");
    let from_flag = dir.path().join("from-flag.html");
    fs::write(
        &config,
        format!(
            "output: {}\nassets: https://cdn.example/\ntime_unit: ms\n",
            from_config.display()
        ),
    )
    .unwrap();

    engine_plot()
        .arg(&log)
        .arg("-c")
        .arg(&config)
        .arg("-O")
        .arg(&from_flag)
        .assert()
        .success();

    assert!(!from_config.exists());
    let html = fs::read_to_string(&from_flag).unwrap();
    assert!(html.contains(r#"src="https://cdn.example/echarts.min.js""#));
    assert!(html.contains(
        r#""xAxis":{"name":"duration (ms)","nameLocation":"center","type":"value","nameGap":30}"#
    ));
}
