//! Tests for the `mknn` binary.
#![cfg(feature = "cli")]

use std::fs;
use std::process::Command;

fn mknn() -> Command {
    Command::new(env!("CARGO_BIN_EXE_mknn"))
}

#[test]
fn writes_default_output_next_to_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("pairs.csv");
    fs::write(&input, "0,0\n0,1\n5,5\n5,6\n").unwrap();

    let status = mknn().arg("-f").arg(&input).args(["-k", "1", "-t", "2"]).status().unwrap();
    assert!(status.success());
    assert_eq!(
        fs::read_to_string(dir.path().join("pairs-mknn1.ncol")).unwrap(),
        "0 1 0.5\n2 3 0.5\n"
    );
}

#[test]
fn creates_output_directory_and_honours_config() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("labelled.txt");
    fs::write(&input, "0 0 a\n0 1 a\n5 5 b\n5 6 b\n").unwrap();
    let config = dir.path().join("params.json");
    fs::write(&config, r#"{ "k": 3 }"#).unwrap();
    let out_dir = dir.path().join("out/nested");

    let status = mknn()
        .arg("-f")
        .arg(&input)
        .arg("-d")
        .arg(&out_dir)
        .args(["-o", "g.pajek", "-e", "pajek", "-c"])
        .arg("--config")
        .arg(&config)
        .status()
        .unwrap();
    assert!(status.success());
    let text = fs::read_to_string(out_dir.join("g.pajek")).unwrap();
    assert!(text.starts_with("*Vertices 4\n"));
    // k = 3 from the config: complete graph on 4 vertices.
    assert_eq!(text.lines().skip_while(|l| *l != "*Edges").count(), 7);
}

#[test]
fn negative_threads_fail_with_exit_code_1() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("p.csv");
    fs::write(&input, "0,0\n1,1\n").unwrap();
    let output = mknn().arg("-f").arg(&input).args(["-k", "1", "-t", "-2"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("threads"));
}

#[test]
fn k_out_of_range_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("p.csv");
    fs::write(&input, "0,0\n1,1\n").unwrap();
    let status = mknn().arg("-f").arg(&input).args(["-k", "5"]).status().unwrap();
    assert_eq!(status.code(), Some(1));
}

#[test]
fn negative_k_fails_with_exit_code_1() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("p.csv");
    fs::write(&input, "0,0\n1,1\n").unwrap();
    let output = mknn().arg("-f").arg(&input).args(["-k", "-1"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("k must be >= 0"));
}

#[test]
fn exhaustive_index_gives_the_same_graph() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("pairs.csv");
    fs::write(&input, "0,0\n0,1\n5,5\n5,6\n").unwrap();

    let status = mknn()
        .arg("-f")
        .arg(&input)
        .args(["-k", "1", "-o", "flat.ncol", "--index", "exhaustive"])
        .status()
        .unwrap();
    assert!(status.success());
    assert_eq!(
        fs::read_to_string(dir.path().join("flat.ncol")).unwrap(),
        "0 1 0.5\n2 3 0.5\n"
    );

    let status = mknn().arg("-f").arg(&input).args(["--index", "balltree"]).status().unwrap();
    assert!(!status.success());
}
