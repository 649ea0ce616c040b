mod common;

use common::{run_crosstalk, TestEnv};

const SEGMENTS_JSON: &str = r#"[
  {"start": 0.0, "end": 10.0, "text": "hello everyone"},
  {"start": 10.5, "end": 12.0, "text": "hi"}
]"#;

const TURNS_JSON: &str = r#"[
  {"start": 0.0, "end": 3.0, "speaker_id": "A"},
  {"start": 3.0, "end": 10.0, "speaker_id": "B"},
  {"start": 10.2, "end": 12.5, "speaker_id": "A"}
]"#;

#[test]
fn crosstalk_help_shows_usage() {
    let output = run_crosstalk(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(
        output.status.success(),
        "--help should succeed\nstdout:\n{}\nstderr:\n{}",
        stdout,
        stderr
    );
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("Commands:"));
}

#[test]
fn crosstalk_version_shows_version() {
    let output = run_crosstalk(&["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(
        output.status.success(),
        "--version should succeed\nstdout:\n{}\nstderr:\n{}",
        stdout,
        stderr
    );
    assert!(stdout.contains("crosstalk "));
}

#[test]
fn completions_bash_outputs_script() {
    let output = run_crosstalk(&["completions", "bash"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(
        output.status.success(),
        "completions bash should succeed\nstdout:\n{}\nstderr:\n{}",
        stdout,
        stderr
    );
    assert!(
        stdout.contains("crosstalk"),
        "expected completion output to reference command name\nstdout:\n{}",
        stdout
    );
}

#[test]
fn config_show_works() {
    let output = run_crosstalk(&["config", "show"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(
        output.status.success(),
        "config show should succeed\nstdout:\n{}\nstderr:\n{}",
        stdout,
        stderr
    );
    assert!(stdout.contains("[alignment]"));
    assert!(stdout.contains("overlap_threshold"));
    assert!(stdout.contains("max_concurrent_jobs"));
}

#[test]
fn config_path_returns_valid_path() {
    let output = run_crosstalk(&["config", "path"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(
        output.status.success(),
        "config path should succeed\nstdout:\n{}\nstderr:\n{}",
        stdout,
        stderr
    );
    assert!(stdout.contains("config.toml"));
}

#[test]
fn align_labels_segments_from_fixture_files() {
    let env = TestEnv::new();
    let transcript = env.write_fixture("segments.json", SEGMENTS_JSON);
    let diarization = env.write_fixture("turns.json", TURNS_JSON);

    let output = env.run(&[
        "align",
        "--transcript",
        transcript.to_str().expect("utf-8 path"),
        "--diarization",
        diarization.to_str().expect("utf-8 path"),
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(
        output.status.success(),
        "align should succeed\nstdout:\n{}\nstderr:\n{}",
        stdout,
        stderr
    );

    // Turn B covers 70% of the first segment; turn A owns the second.
    let aligned: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON output");
    let segments = aligned.as_array().expect("array of segments");
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0]["speaker"], "B");
    assert_eq!(segments[1]["speaker"], "A");
    assert!(stderr.contains("Aligned 2 segments"));
}

#[test]
fn align_writes_srt_to_output_file() {
    let env = TestEnv::new();
    let transcript = env.write_fixture("segments.json", SEGMENTS_JSON);
    let diarization = env.write_fixture("turns.json", TURNS_JSON);
    let out_path = env.data_path("aligned.srt");

    let output = env.run(&[
        "align",
        "--transcript",
        transcript.to_str().expect("utf-8 path"),
        "--diarization",
        diarization.to_str().expect("utf-8 path"),
        "--format",
        "srt",
        "--output",
        out_path.to_str().expect("utf-8 path"),
    ]);

    assert!(
        output.status.success(),
        "align --format srt should succeed\nstderr:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let srt = std::fs::read_to_string(&out_path).expect("output file written");
    assert!(srt.starts_with("1\n00:00:00,000 --> 00:00:10,000\n"));
    assert!(srt.contains("B: hello everyone"));
}

#[test]
fn align_rejects_unknown_format() {
    let env = TestEnv::new();
    let transcript = env.write_fixture("segments.json", SEGMENTS_JSON);
    let diarization = env.write_fixture("turns.json", TURNS_JSON);

    let output = env.run(&[
        "align",
        "--transcript",
        transcript.to_str().expect("utf-8 path"),
        "--diarization",
        diarization.to_str().expect("utf-8 path"),
        "--format",
        "docx",
    ]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(
        stderr.contains("Unsupported format"),
        "stderr should explain the failure:\n{}",
        stderr
    );
}

#[test]
fn align_fails_cleanly_on_missing_input() {
    let env = TestEnv::new();
    let output = env.run(&[
        "align",
        "--transcript",
        "/nonexistent/segments.json",
        "--diarization",
        "/nonexistent/turns.json",
    ]);

    assert!(!output.status.success());
}
