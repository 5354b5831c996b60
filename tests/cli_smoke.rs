use std::path::PathBuf;

const DECK: &str = r##"<svg xmlns="http://www.w3.org/2000/svg"
     xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape"
     width="16" height="16">
  <g inkscape:groupmode="layer" inkscape:label="_bg">
    <rect width="16" height="16" fill="#202020"/>
  </g>
  <g inkscape:groupmode="layer" inkscape:label="one">
    <rect width="8" height="8" fill="#ff0000"/>
  </g>
  <g inkscape:groupmode="layer" inkscape:label="+two">
    <rect x="8" y="8" width="8" height="8" fill="#00ff00"/>
  </g>
  <g inkscape:groupmode="layer" inkscape:label=".notes"/>
</svg>
"##;

fn exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_layerdeck")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "layerdeck.exe"
            } else {
                "layerdeck"
            });
            p
        })
}

fn fixture_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("cli_smoke").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn cli_without_input_prints_usage() {
    let output = std::process::Command::new(exe()).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"));
}

#[test]
fn cli_plan_prints_pages_as_json() {
    let dir = fixture_dir("plan");
    let src = dir.join("deck.svg");
    std::fs::write(&src, DECK).unwrap();

    let output = std::process::Command::new(exe())
        .arg(&src)
        .arg("--plan")
        .arg("--flatten")
        .output()
        .unwrap();
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let pages = plan.as_array().unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0]["page"], 0);
    assert_eq!(pages[0]["slide"], 1);
    assert_eq!(pages[0]["layers"], serde_json::json!(["_bg", "one", "+two"]));
}

#[test]
fn cli_cpu_backend_writes_png_pages() {
    let dir = fixture_dir("cpu");
    let src = dir.join("deck.svg");
    std::fs::write(&src, DECK).unwrap();
    let work = dir.join("work");

    let status = std::process::Command::new(exe())
        .arg(&src)
        .args(["--backend", "cpu", "--work-dir"])
        .arg(&work)
        .status()
        .unwrap();
    assert!(status.success());

    let out = dir.join("deck.slides");
    assert!(out.join("slide-000.png").exists());
    assert!(out.join("slide-001.png").exists());
    assert!(!out.join("slide-002.png").exists());
    assert!(!work.join("temp.svg").exists());

    let first = image::open(out.join("slide-000.png")).unwrap().to_rgba8();
    assert_eq!(first.dimensions(), (16, 16));
    assert_eq!(first.get_pixel(2, 2).0, [255, 0, 0, 255]);
    assert_eq!(first.get_pixel(12, 12).0, [32, 32, 32, 255]);

    let second = image::open(out.join("slide-001.png")).unwrap().to_rgba8();
    assert_eq!(second.get_pixel(12, 12).0, [0, 255, 0, 255]);

    // The source document is left as it was.
    assert_eq!(std::fs::read_to_string(&src).unwrap(), DECK);
}

#[test]
fn cli_rejects_unlabelled_layer() {
    let dir = fixture_dir("malformed");
    let src = dir.join("bad.svg");
    std::fs::write(
        &src,
        r#"<svg xmlns="http://www.w3.org/2000/svg"
             xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape">
             <g inkscape:groupmode="layer" id="layer1"/></svg>"#,
    )
    .unwrap();

    let output = std::process::Command::new(exe())
        .arg(&src)
        .arg("--plan")
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("malformed document"));
}
