use report_sheets::Table;
use report_sheets::Value;
use report_sheets::Workbook;
use std::fs;
use std::path::Path;
use std::process::Command;
use std::process::Output;
use tempfile::TempDir;

fn run(binary: &str, dir: &Path, args: &[&str]) -> Output {
    Command::new(binary)
        .args(args)
        .current_dir(dir)
        .output()
        .expect("run binary")
}

fn describe(output: &Output) -> String {
    format!(
        "status: {}\nstdout:\n{}\nstderr:\n{}",
        output.status,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr),
    )
}

fn save_ids(dir: &Path, name: &str, ids: &[f64]) {
    let rows = ids.iter().map(|id| vec![Value::Number(*id)]).collect();
    let mut workbook = Workbook::new();
    workbook.insert("data", Table::new(vec!["id".to_owned()], rows));
    workbook.write(&dir.join(name)).unwrap();
}

#[test]
fn extract_applies_positional_defaults() {
    let dir = TempDir::new().unwrap();
    let html = "<h3>Stats</h3><table><tr><td>1</td></tr></table>";
    fs::write(dir.path().join("report.html"), html).unwrap();

    let output = run(env!("CARGO_BIN_EXE_extract"), dir.path(), &["report.html"]);
    assert!(output.status.success(), "expected exit 0\n{}", describe(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Tables extracted to: report.xlsx"), "unexpected stdout:\n{stdout}");

    let workbook = Workbook::read(&dir.path().join("report.xlsx")).unwrap();
    let stats = workbook.get("Stats").unwrap();
    assert_eq!(stats.rows()[0][..2], [Value::from("UnknownSource"), Value::from("UnknownAssay")]);
}

#[test]
fn extract_fails_on_missing_report() {
    let dir = TempDir::new().unwrap();

    let args = ["missing.html", "RNAseq", "LabX"];
    let output = run(env!("CARGO_BIN_EXE_extract"), dir.path(), &args);
    assert!(!output.status.success(), "expected non-zero exit\n{}", describe(&output));

    let stderr = String::from_utf8_lossy(&output.stderr);
    let reported = stderr.contains("Error:") && stderr.contains("missing.html");
    assert!(reported, "unexpected stderr:\n{stderr}");
    assert!(!dir.path().join("missing.xlsx").exists());
}

#[test]
fn batch_merge_needs_two_workbooks() {
    let dir = TempDir::new().unwrap();
    save_ids(dir.path(), "only.xlsx", &[1.0]);

    let output = run(env!("CARGO_BIN_EXE_merge"), dir.path(), &[]);
    assert_eq!(output.status.code(), Some(1), "expected exit 1\n{}", describe(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let message = "Need at least 2 Excel files to merge";
    assert!(stdout.contains(message), "unexpected stdout:\n{stdout}");
    assert!(!dir.path().join("merged_results.xlsx").exists());
}

#[test]
fn batch_merge_writes_results() {
    let dir = TempDir::new().unwrap();
    save_ids(dir.path(), "a.xlsx", &[1.0]);
    save_ids(dir.path(), "b.xlsx", &[2.0]);

    let output = run(env!("CARGO_BIN_EXE_merge"), dir.path(), &[]);
    assert!(output.status.success(), "expected exit 0\n{}", describe(&output));

    let merged = Workbook::read(&dir.path().join("merged_results.xlsx")).unwrap();
    assert_eq!(merged.get("data").unwrap().height(), 2);
}

#[test]
fn merge_dedupes_on_subset() {
    let dir = TempDir::new().unwrap();
    save_ids(dir.path(), "run1.xlsx", &[42.0, 7.0]);
    save_ids(dir.path(), "run2.xlsx", &[42.0, 8.0]);

    let args = ["run1.xlsx", "run2.xlsx", "--dedupe", "--dedupe-subset", "id"];
    let output = run(env!("CARGO_BIN_EXE_merge"), dir.path(), &args);
    assert!(output.status.success(), "expected exit 0\n{}", describe(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let message = "Merged workbook saved to: merged_run1.xlsx";
    assert!(stdout.contains(message), "unexpected stdout:\n{stdout}");

    let merged = Workbook::read(&dir.path().join("merged_run1.xlsx")).unwrap();
    let ids = merged.get("data").unwrap().column("id").unwrap();
    assert_eq!(ids, vec![&Value::Number(42.0), &Value::Number(7.0), &Value::Number(8.0)]);
}

#[test]
fn dedupe_subset_requires_dedupe() {
    let dir = TempDir::new().unwrap();
    save_ids(dir.path(), "run1.xlsx", &[1.0]);

    let args = ["run1.xlsx", "--dedupe-subset", "id"];
    let output = run(env!("CARGO_BIN_EXE_merge"), dir.path(), &args);
    assert!(!output.status.success(), "expected usage error\n{}", describe(&output));
    assert!(!dir.path().join("merged_run1.xlsx").exists());
}
