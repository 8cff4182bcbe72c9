//! Runs the scanner binary against temp product folders.

use serde_json::Value;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;
use test_utils::{scene_dir, DimBuilder, MtlBuilder, PlanetBuilder};

fn scanner(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_scanner"))
        .args(args)
        .env_remove("SCANNER_CONFIG")
        .output()
        .expect("run scanner")
}

fn json_lines(output: &Output) -> Vec<Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("stdout line is JSON"))
        .collect()
}

fn arg(path: &Path) -> &str {
    path.to_str().expect("utf-8 temp path")
}

// ============================================================================
// Scanning
// ============================================================================

#[test]
fn test_scan_single_family() {
    let root = TempDir::new().unwrap();
    DimBuilder::deimos2().write_with_raster(root.path(), "scene.dim");

    let output = scanner(&["--family", "deimos-2", arg(root.path())]);
    assert!(output.status.success());

    let items = json_lines(&output);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["sourceTag"], "MS");
    assert_eq!(items[0]["keyProperties"]["sensorName"], "DEIMOS-2");
}

#[test]
fn test_scan_every_family_recursively() {
    let root = TempDir::new().unwrap();
    DimBuilder::deimos1().write_with_raster(&scene_dir(root.path(), "d1"), "d1.dim");
    MtlBuilder::landsat8().write_with_rasters(&scene_dir(root.path(), "l8"));
    PlanetBuilder::default_scene().write_with_raster(&scene_dir(root.path(), "pl"), "analytic");

    let output = scanner(&["--recursive", "--parallel", arg(root.path())]);
    assert!(output.status.success());

    let mut sensors: Vec<String> = json_lines(&output)
        .iter()
        .map(|item| item["keyProperties"]["sensorName"].as_str().unwrap().to_string())
        .collect();
    sensors.sort();
    assert_eq!(sensors, vec!["DEIMOS-1", "Landsat 8", "Landsat 8", "PlanetLabs"]);
}

#[test]
fn test_logs_stay_off_stdout() {
    let root = TempDir::new().unwrap();
    std::fs::write(
        root.path().join("broken.dim"),
        "<Dimap_Document><MISSION>Deimos 2</MISSION>",
    )
    .unwrap();
    DimBuilder::deimos2().write_with_raster(root.path(), "good.dim");

    let output = scanner(&["--family", "deimos-2", "--log-level", "debug", arg(root.path())]);
    assert!(output.status.success());
    assert_eq!(json_lines(&output).len(), 1);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to enumerate tags"));
    assert!(stderr.contains("\"category\":\"malformed\""));
}

#[test]
fn test_scan_job_file_with_overrides() {
    let root = TempDir::new().unwrap();
    let data = scene_dir(root.path(), "data");
    DimBuilder::deimos2().write_with_raster(&data, "madrid.dim");
    let job = root.path().join("job.yaml");
    std::fs::write(
        &job,
        format!("family: deimos-2\nroots: [\"{}\"]\nwithin: \"10,50,11,51\"\n", arg(&data)),
    )
    .unwrap();

    let filtered = scanner(&["--config", arg(&job)]);
    assert!(filtered.status.success());
    assert!(json_lines(&filtered).is_empty());

    let widened = scanner(&["--config", arg(&job), "--within", "-4,40,-3,41"]);
    assert!(widened.status.success());
    assert_eq!(json_lines(&widened).len(), 1);
}

// ============================================================================
// Describe and errors
// ============================================================================

#[test]
fn test_describe() {
    let output = scanner(&["--describe", "--family", "dzz-hr"]);
    assert!(output.status.success());
    let descriptor: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(descriptor["name"], "Kazakhstan");
    assert_eq!(descriptor["dataSourceFilter"], "*.dim");
}

#[test]
fn test_missing_roots_fail_fast() {
    let output = scanner(&["--family", "landsat-8"]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn test_unknown_family_fails() {
    let root = TempDir::new().unwrap();
    let output = scanner(&["--family", "sentinel-2", arg(root.path())]);
    assert!(!output.status.success());
}
