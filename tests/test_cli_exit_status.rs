use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Write an ESPA XML declaring `bands` (8-bit) plus a 16-bit qa_pixel band.
/// The band files themselves are not created.
fn write_xml(dir: &TempDir, instrument: &str, bands: &[&str]) -> PathBuf {
    let mut band_elements = String::new();
    for name in bands.iter().copied().chain(std::iter::once("qa_pixel")) {
        let data_type = if name == "qa_pixel" { "UINT16" } else { "UINT8" };
        writeln!(
            band_elements,
            r#"        <band name="{name}" data_type="{data_type}" nlines="2" nsamps="2"><file_name>{name}.img</file_name></band>"#
        )
        .unwrap();
    }

    let xml = format!(
        "<espa_metadata>\n    <global_metadata>\n        <satellite>LANDSAT_5</satellite>\n        <instrument>{}</instrument>\n    </global_metadata>\n    <bands>\n{}    </bands>\n</espa_metadata>\n",
        instrument, band_elements
    );

    let xml_path = dir.path().join("scene.xml");
    std::fs::write(&xml_path, xml).unwrap();
    xml_path
}

fn run_cli(xml: Option<&Path>) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_clip_band_misalignment"));
    cmd.env_remove("RUST_LOG");
    if let Some(xml) = xml {
        cmd.arg(format!("--xml={}", xml.display()));
    }
    cmd.output().unwrap()
}

#[test]
fn test_unsupported_instrument_exits_successfully() {
    let dir = TempDir::new().unwrap();
    let xml = write_xml(&dir, "MSS", &["b1"]);

    let output = run_cli(Some(&xml));
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn test_band_count_failure_exits_with_error() {
    let dir = TempDir::new().unwrap();
    let xml = write_xml(&dir, "TM", &["b1", "b2", "b3", "b4", "b5", "b6"]);

    let output = run_cli(Some(&xml));
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("6 bands found"), "stderr: {}", stderr);
}

#[test]
fn test_missing_xml_file_exits_with_error() {
    let dir = TempDir::new().unwrap();
    let output = run_cli(Some(&dir.path().join("absent.xml")));
    assert!(!output.status.success());
}

#[test]
fn test_missing_xml_argument_exits_with_error() {
    let output = run_cli(None);
    assert!(!output.status.success());
}
