use std::fs;
use std::process::Command;

fn tfa() -> Command {
    Command::new(env!("CARGO_BIN_EXE_tfa"))
}

fn grid_file(dir: &std::path::Path) -> std::path::PathBuf {
    let mut text = String::from("# x y\n");
    for i in 0..20 {
        for j in 0..20 {
            text.push_str(&format!("{} {}\n", i as f64 / 19.0, j as f64 / 19.0));
        }
    }
    let path = dir.join("grid.txt");
    fs::write(&path, text).expect("write");
    path
}

#[test]
fn estimate_prints_a_dimension() {
    let dir = tempfile::tempdir().expect("tmp");
    let path = grid_file(dir.path());
    let output = tfa()
        .args(["estimate", "--columns", "x,y", "--feature", "x", "--feature", "y"])
        .arg("--input")
        .arg(&path)
        .args(["--bootstrap", "5", "--threads", "2"])
        .output()
        .expect("run tfa estimate");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Events: 400 in 2 dimension(s), 79800 pairs"), "{stdout}");
    assert!(stdout.contains("D2 = "), "{stdout}");
    assert!(stdout.contains("Bootstrap: "), "{stdout}");
}

#[test]
fn estimate_fails_on_unknown_columns() {
    let dir = tempfile::tempdir().expect("tmp");
    let path = grid_file(dir.path());
    let output = tfa()
        .args(["estimate", "--columns", "x,y", "--feature", "z"])
        .arg("--input")
        .arg(&path)
        .output()
        .expect("run tfa estimate");
    assert!(!output.status.success());
}

#[test]
fn compare_classifies_references() {
    let output = tfa()
        .args([
            "compare",
            "--value",
            "1.48",
            "--uncertainty",
            "0.03",
            "--reference",
            "lattice=1.45:0.04",
            "--reference",
            "embedding=2.0:0.1",
        ])
        .output()
        .expect("run tfa compare");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("EXCELLENT AGREEMENT (< 1 sigma)"), "{stdout}");
    assert!(stdout.contains("SIGNIFICANT DEVIATION (> 3 sigma)"), "{stdout}");
    assert!(stdout.contains("Closest reference: lattice"), "{stdout}");
}

#[test]
fn analyze_writes_reports() {
    let dir = tempfile::tempdir().expect("tmp");
    grid_file(dir.path());
    let config = dir.path().join("grid.yaml");
    fs::write(
        &config,
        concat!(
            "name: Grid\n",
            "data:\n  paths: [grid.txt]\n  columns: [x, y]\n",
            "features:\n  - column: x\n  - column: y\n",
            "references:\n  - { label: plane, value: 2.0, uncertainty: 0.1 }\n",
        ),
    )
    .expect("write");
    let out = dir.path().join("out");
    let output = tfa()
        .arg("analyze")
        .arg("--config")
        .arg(&config)
        .arg("--out")
        .arg(&out)
        .output()
        .expect("run tfa analyze");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stdout).contains("GRASSBERGER-PROCACCIA ANALYSIS"));
    assert!(out.join("analysis_report.json").exists());
    assert!(out.join("analysis_report.txt").exists());
}

#[test]
fn compare_rejects_negative_uncertainty() {
    let output = tfa()
        .args([
            "compare",
            "--value",
            "1.48",
            "--uncertainty",
            "-0.03",
            "--reference",
            "lattice=1.45:0.04",
        ])
        .output()
        .expect("run tfa compare");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("measurement-value"));
}
