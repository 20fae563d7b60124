use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const BATCH: &str = r#"{
  "files": [
    {
      "key": "module_key:src/Foo.java",
      "line_count": 3,
      "line_offsets": [0, 4, 7],
      "highlighting": [
        {"start": 0, "end": 4, "type": "annotation"},
        {"start": 7, "end": 16, "type": "constant"},
        {"start": 8, "end": 15, "type": "keyword"}
      ],
      "symbols": [{"start": 4, "end": 6, "references": [7]}],
      "duplications": [
        {"origin": {"resource": "module_key:src/Foo.java", "start_line": 1, "length": 10}}
      ],
      "scm": {
        "changesets": [{"revision": "ABC", "author": "him", "date": 123456}, {}],
        "index_by_line": [0, 1, 0]
      },
      "measures": {"coverage_line_hits_data": "1=10;3=4;30=42"}
    }
  ]
}"#;

fn write_batch(content: &str) -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("batch.json");
    fs::write(&path, content).unwrap();
    (dir, path)
}

#[test]
fn consolidate_json_from_file() {
    let (_dir, path) = write_batch(BATCH);
    let mut cmd = assert_cmd::Command::cargo_bin("linedata").unwrap();
    let assert = cmd
        .arg("consolidate")
        .arg("--input")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("module_key:src/Foo.java"));

    let stdout = String::from_utf8_lossy(assert.get_output().stdout.as_ref()).to_string();
    let v: serde_json::Value = serde_json::from_str(&stdout).expect("valid json");
    let lines = v[0]["lines"].as_array().expect("lines");
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["scm_revision"], "ABC");
    assert!(lines[1].get("scm_revision").is_none());
    assert_eq!(lines[2]["ut_line_hits"], 4);
    assert_eq!(lines[2]["highlighting"][1]["codes"], "ck");
    assert_eq!(lines[2]["symbols"][0]["symbol"], 1);
}

#[test]
fn consolidate_text_from_stdin_with_skip() {
    let mut cmd = assert_cmd::Command::cargo_bin("linedata").unwrap();
    cmd.args(["--format", "text", "consolidate", "--skip", "highlighting"])
        .write_stdin(BATCH)
        .assert()
        .success()
        .stdout(predicate::str::contains("# module_key:src/Foo.java"))
        .stdout(predicate::str::contains("1\tABC\thim\t123456\t10\t"))
        .stdout(predicate::str::contains("ck").not());
}

#[test]
fn hash_prints_one_row_per_file() {
    let (_dir, path) = write_batch(BATCH);
    let mut cmd = assert_cmd::Command::cargo_bin("linedata").unwrap();
    cmd.args(["-f", "text", "hash", "--input"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^[0-9a-f]{64}\t3\tmodule_key:src/Foo.java\n$").unwrap());
}

#[test]
fn missing_line_count_fails() {
    let batch = r#"{"files": [{"key": "a.rs", "line_offsets": [0]}]}"#;
    let (_dir, path) = write_batch(batch);
    let mut cmd = assert_cmd::Command::cargo_bin("linedata").unwrap();
    cmd.arg("consolidate")
        .arg("--input")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("line count is missing"));
}

#[test]
fn failed_file_does_not_hide_the_rest_of_the_batch() {
    let batch = r#"{"files": [
        {"key": "a.rs", "line_offsets": [0]},
        {"key": "b.rs", "line_count": 2, "line_offsets": [0, 3], "measures": {"coverage_line_hits_data": "2=5"}}
    ]}"#;
    let (_dir, path) = write_batch(batch);
    let mut cmd = assert_cmd::Command::cargo_bin("linedata").unwrap();
    cmd.args(["-f", "text", "consolidate", "--input"])
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("# b.rs"))
        .stdout(predicate::str::contains("2\t\t\t\t5\t"))
        .stdout(predicate::str::contains("a.rs").not())
        .stderr(predicate::str::contains("a.rs: line count is missing"))
        .stderr(predicate::str::contains("1 of 2 files failed"));
}
