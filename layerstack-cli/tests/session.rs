//! Integration tests for headless runs (layerstack-cli).

use std::path::{Path, PathBuf};

use layerstack_cli::{run, HostConfig};

fn png_fixture(dir: &Path, name: &str, size: u32, rgba: [u8; 4]) -> PathBuf {
    let path = dir.join(name);
    image::RgbaImage::from_pixel(size, size, image::Rgba(rgba))
        .save(&path)
        .expect("write fixture");
    path
}

#[test]
fn test_run_imports_and_exports() {
    let dir = tempfile::tempdir().expect("tempdir");
    let images = vec![
        png_fixture(dir.path(), "a.png", 10, [255, 0, 0, 255]),
        png_fixture(dir.path(), "b.png", 20, [0, 0, 255, 255]),
        dir.path().join("missing.png"),
    ];
    let output = dir.path().join("out.png");

    let report = run(&HostConfig::new(images, output.clone())).expect("run");
    assert_eq!(report.imported, 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!((report.export.width, report.export.height), (20, 20));
    assert!(output.exists());
}

#[test]
fn test_run_replays_scale_script() {
    let dir = tempfile::tempdir().expect("tempdir");
    let images = vec![png_fixture(dir.path(), "a.png", 50, [255, 0, 0, 255])];
    let script = dir.path().join("events.json");
    std::fs::write(
        &script,
        r#"[
            {"type": "click", "x": 25, "y": 25},
            {"type": "pointer_down", "x": 50, "y": 50},
            {"type": "pointer_move", "x": 60, "y": 60},
            {"type": "pointer_up", "x": 75, "y": 75}
        ]"#,
    )
    .expect("write script");

    let mut config = HostConfig::new(images, dir.path().join("out.png"));
    config.events = Some(script);
    config.preview = Some(dir.path().join("preview.png"));

    let report = run(&config).expect("run");
    assert_eq!(report.events_applied, 4);
    assert_eq!((report.export.width, report.export.height), (75, 75));

    let preview = image::open(dir.path().join("preview.png"))
        .expect("decode preview")
        .to_rgba8();
    assert_eq!(preview.dimensions(), (800, 600));
}

#[test]
fn test_run_with_everything_hidden_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let images = vec![png_fixture(dir.path(), "a.png", 4, [255, 0, 0, 255])];
    let output = dir.path().join("out.png");

    let mut config = HostConfig::new(images, output.clone());
    config.hide = vec![0];

    let err = run(&config).expect_err("nothing visible");
    assert!(err.to_string().contains("Nothing to export"));
    assert!(!output.exists());
}
