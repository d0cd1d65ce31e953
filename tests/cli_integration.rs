//! Integration tests for the scan command.

use std::path::PathBuf;

use methodscan::cli::{run_scan_to, ScanArgs, EXIT_ERROR, EXIT_FAILED, EXIT_SUCCESS};
use methodscan::report::JsonReport;

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

/// Write an empty config so tests never pick up one from the working directory.
fn empty_config(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("methodscan.yaml");
    std::fs::write(&path, "{}\n").unwrap();
    path
}

fn run(args: &ScanArgs) -> (i32, String) {
    let mut out = Vec::new();
    let code = run_scan_to(args, &mut out, false).expect("scan should not error");
    (code, String::from_utf8(out).unwrap())
}

#[test]
fn test_text_output_for_single_file() {
    let dir = tempfile::tempdir().unwrap();
    let args = ScanArgs {
        paths: vec![testdata_path().join("Person.java")],
        sections: vec!["declarations".to_string()],
        config: Some(empty_config(&dir)),
        ..Default::default()
    };

    let (code, text) = run(&args);
    assert_eq!(code, EXIT_SUCCESS);
    assert!(!text.contains("== "), "single file should have no header");
    assert!(text.contains(
        "Method Declaration: addTag\nStart Line: 18\nEnd Line: 24\nVariables declared in method : trimmed, before, after\n"
    ));
    assert!(text.contains("Method Declaration: getName\nStart Line: 14\nEnd Line: 16\nVariables declared in method : No Variables\n"));
    assert!(!text.contains("Method Signature:"));
}

#[test]
fn test_json_output_for_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("A.java"), "class A { void f() { x.g(1); } }").unwrap();
    std::fs::write(dir.path().join("B.java"), "class B { int h() { return 2; } }").unwrap();
    std::fs::write(dir.path().join("README.md"), "# not java").unwrap();

    let args = ScanArgs {
        paths: vec![dir.path().to_path_buf()],
        format: Some("json".to_string()),
        config: Some(empty_config(&dir)),
        ..Default::default()
    };

    let (code, text) = run(&args);
    assert_eq!(code, EXIT_SUCCESS);

    let report: JsonReport = serde_json::from_str(&text).unwrap();
    assert_eq!(report.files.len(), 2);
    assert!(report.files[0].path.ends_with("A.java"));
    assert!(report.files[1].path.ends_with("B.java"));

    let a = &report.files[0];
    assert_eq!(a.declarations.as_ref().unwrap()[0].name, "f");
    assert_eq!(a.signatures.as_ref().unwrap()[0].argument_texts, vec!["1"]);
    assert_eq!(a.receiver_calls.as_ref().unwrap()["x"], vec!["g"]);
}

#[test]
fn test_parse_failure_sets_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let args = ScanArgs {
        paths: vec![
            testdata_path().join("Broken.java"),
            testdata_path().join("Shapes.java"),
        ],
        config: Some(empty_config(&dir)),
        ..Default::default()
    };

    let (code, text) = run(&args);
    assert_eq!(code, EXIT_FAILED);
    assert!(text.contains("Broken.java ==\nerror: parse error"));
    // The other file is still reported.
    assert!(text.contains("Shapes.java =="));
    assert!(text.contains("r -> run"));
}

#[test]
fn test_config_format_and_flag_override() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("custom.yaml");
    std::fs::write(&config, "format: json\nsections: [receivers]\n").unwrap();
    let file = dir.path().join("C.java");
    std::fs::write(&file, "class C { void f() { a.b(); } }").unwrap();

    let args = ScanArgs {
        paths: vec![file.clone()],
        config: Some(config.clone()),
        ..Default::default()
    };
    let (_, text) = run(&args);
    let report: JsonReport = serde_json::from_str(&text).unwrap();
    assert!(report.files[0].declarations.is_none());
    assert!(report.files[0].receiver_calls.is_some());

    let args = ScanArgs {
        paths: vec![file],
        config: Some(config),
        format: Some("text".to_string()),
        ..Default::default()
    };
    let (_, text) = run(&args);
    assert_eq!(text, "Method Receivers\na -> b\n\n");
}

#[test]
fn test_invalid_arguments() {
    let dir = tempfile::tempdir().unwrap();

    let bad_format = ScanArgs {
        paths: vec![testdata_path().join("Person.java")],
        format: Some("xml".to_string()),
        config: Some(empty_config(&dir)),
        ..Default::default()
    };
    assert_eq!(run(&bad_format).0, EXIT_ERROR);

    let missing = ScanArgs {
        paths: vec![dir.path().join("Nope.java")],
        config: Some(empty_config(&dir)),
        ..Default::default()
    };
    assert_eq!(run(&missing).0, EXIT_ERROR);

    let bad_config = dir.path().join("bad.yaml");
    std::fs::write(&bad_config, "sections: [everything]\n").unwrap();
    let args = ScanArgs {
        paths: vec![testdata_path().join("Person.java")],
        config: Some(bad_config),
        ..Default::default()
    };
    assert_eq!(run(&args).0, EXIT_ERROR);
}

#[test]
fn test_directory_without_sources_is_success() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("notes.txt"), "nothing here").unwrap();

    let args = ScanArgs {
        paths: vec![dir.path().to_path_buf()],
        config: Some(empty_config(&dir)),
        ..Default::default()
    };
    let (code, text) = run(&args);
    assert_eq!(code, EXIT_SUCCESS);
    assert!(text.is_empty());
}
