use std::fs;
use std::process::{Command, Output};

fn ecosort(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ecosort"))
        .args(args)
        .output()
        .expect("run failed")
}

#[test]
fn sorts_given_values() {
    let out = ecosort(&["sort", "merge", "--values", "3 1 2"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("algorithm: Merge Sort"));
    assert!(stdout.contains("result: [1, 2, 3]"));
}

#[test]
fn bogo_refuses_eleven_values() {
    let out = ecosort(&["sort", "bogo", "--values", "10 9 8 7 6 5 4 3 2 1 0"]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("at most 10 elements"));
}

#[test]
fn unknown_algorithm() {
    let out = ecosort(&["sort", "heap", "--values", "1"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("unknown algorithm"));
}

#[test]
fn compare_all_writes_csv() {
    let dir = tempfile::tempdir().unwrap();
    let runs = dir.path().join("runs.csv");
    let stats = dir.path().join("stats");
    let out = ecosort(&[
        "compare-all",
        "--size",
        "200",
        "--seed",
        "7",
        "--repeat",
        "2",
        "--csv",
        runs.to_str().unwrap(),
        "--stats-csv",
        stats.to_str().unwrap(),
    ]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("skipping Bogosort"));

    let text = fs::read_to_string(&runs).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines[0], "algoritmo,tempo,cpu,energia,co2");
    assert_eq!(lines.len(), 1 + 8);

    let text = fs::read_to_string(dir.path().join("stats.csv")).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 1 + 4);
    assert!(lines[1].starts_with("Merge Sort,"));
    assert!(lines[1].ends_with(",2"));
}

#[test]
fn reference_with_given_time() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("cmp.csv");
    let out = ecosort(&[
        "reference",
        "Quick Sort",
        "--size",
        "100000",
        "--time",
        "0.05",
        "--csv",
        csv.to_str().unwrap(),
    ]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    for lang in ["rust", "c", "java", "go"] {
        assert!(stdout.lines().any(|l| l.starts_with(&format!("{lang} "))), "{lang}");
    }
    let text = fs::read_to_string(&csv).unwrap();
    assert_eq!(text.lines().count(), 4);
}

#[test]
fn reference_snaps_size() {
    let out = ecosort(&["reference", "merge", "--size", "5000", "--time", "0.01"]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("approximated to the 1000"));
}

#[test]
fn bogo_has_no_reference() {
    let out = ecosort(&["reference", "bogo", "--time", "0.01"]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("no reference data"));
}

#[test]
fn references_table() {
    let out = ecosort(&["references"]);
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout).lines().count(), 1 + 36);
}

#[test]
fn bad_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = dir.path().join("cfg.json");
    fs::write(&cfg, r#"{ "cpu_power_watts": -1 }"#).unwrap();
    let out = ecosort(&["--config", cfg.to_str().unwrap(), "references"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("cpu_power_watts must be positive"));
}

#[cfg(unix)]
#[test]
fn llm_against_fake_runner() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("runner.sh");
    fs::write(
        &script,
        "case \"$1\" in\n  list) printf 'NAME ID\\ntiny abc\\n' ;;\n  run) echo 'sorted(xs)' ;;\nesac\n",
    )
    .unwrap();
    let cfg = dir.path().join("cfg.json");
    fs::write(
        &cfg,
        format!(r#"{{ "llm_command": "sh", "llm_args": [{:?}] }}"#, script.to_str().unwrap()),
    )
    .unwrap();

    let out = ecosort(&["--config", cfg.to_str().unwrap(), "llm", "--size", "50", "--seed", "3"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Quick Sort"));
    assert!(stdout.contains("tiny"));
    assert!(stdout.contains("response: sorted(xs)"));
}

#[test]
fn lists_follow_configured_sizes() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = dir.path().join("cfg.json");
    fs::write(&cfg, r#"{ "list_sizes": [3, 12], "max_value": 9 }"#).unwrap();
    let out = ecosort(&["--config", cfg.to_str().unwrap(), "lists", "--seed", "1", "--show", "5"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].trim_start().starts_with("3: ["));
    assert!(!lines[0].ends_with("..."));
    assert!(lines[1].trim_start().starts_with("12: ["));
    assert!(lines[1].ends_with(" ..."));
}
