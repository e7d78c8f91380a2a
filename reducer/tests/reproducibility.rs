// Reproducibility tests for the glsl-reduce binary.
//
// These tests verify that reducing the same job twice produces byte-identical
// output, that written jobs reload, and that the CLI's filters and exit codes
// behave as documented.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use glsl_reduce::registry::{FLOAT_LITERAL_UNIFORM_VALUES, INT_LITERAL_UNIFORM_VALUES};
use glsl_reduce::{ShaderJob, ShaderKind};

fn reduce_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_glsl-reduce"))
}

fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .to_path_buf()
}

fn sample_job() -> PathBuf {
    project_root().join("samples").join("literals.json")
}

fn run(args: &[&str]) -> Output {
    Command::new(reduce_binary())
        .args(args)
        .output()
        .expect("failed to run glsl-reduce")
}

fn run_ok(args: &[&str]) -> String {
    let output = run(args);
    assert!(
        output.status.success(),
        "glsl-reduce failed with args {:?}\nstderr: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("non-UTF8 output")
}

// ── Determinism ─────────────────────────────────────────────────────────────

/// Reducing the same job twice produces byte-identical GLSL.
#[test]
fn same_job_identical_glsl() {
    let job = sample_job();
    let job = job.to_str().unwrap();
    let first = run_ok(&[job]);
    let second = run_ok(&[job]);
    assert_eq!(first, second, "GLSL output should be byte-identical across runs");
    assert!(first.contains("// vert"));
    assert!(first.contains("// frag"));
    assert!(first.contains(FLOAT_LITERAL_UNIFORM_VALUES));
}

/// Metadata output is identical across runs.
#[test]
fn same_job_identical_metadata() {
    let job = sample_job();
    let job = job.to_str().unwrap();
    let first = run_ok(&["--emit", "metadata", job]);
    let second = run_ok(&["--emit", "metadata", job]);
    assert_eq!(first, second);
    let value: serde_json::Value = serde_json::from_str(&first).unwrap();
    assert_eq!(value["injectionSwitch"]["binding"], 0);
    assert_eq!(value["resolution"]["binding"], 1);
    assert!(value[INT_LITERAL_UNIFORM_VALUES]["binding"].is_number());
}

/// The fingerprint is stable for a given job and changes once literals move.
#[test]
fn info_fingerprints_are_stable_and_track_changes() {
    let job = sample_job();
    let job = job.to_str().unwrap();
    let first: serde_json::Value = serde_json::from_str(&run_ok(&["--emit", "info", job])).unwrap();
    let second: serde_json::Value = serde_json::from_str(&run_ok(&["--emit", "info", job])).unwrap();
    assert_eq!(first, second);
    assert_eq!(first["stages"], 2);
    assert_eq!(first["applied"], first["opportunities"]);
    assert_ne!(first["fingerprint_before"], first["fingerprint_after"]);
    assert_eq!(first["fingerprint_before"].as_str().unwrap().len(), 64);
}

#[test]
fn zero_limit_leaves_stages_unchanged() {
    let job = sample_job();
    let glsl = run_ok(&["--limit", "0", job.to_str().unwrap()]);
    assert!(!glsl.contains(INT_LITERAL_UNIFORM_VALUES));
    assert!(!glsl.contains(FLOAT_LITERAL_UNIFORM_VALUES));
    assert!(glsl.contains("return x * 0.5 + 0.25;"));
}

// ── Written jobs ────────────────────────────────────────────────────────────

/// `--emit job` writes a job that loads back with the promoted arrays.
#[test]
fn written_job_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("reduced.json");
    run_ok(&[
        "--emit",
        "job",
        "-o",
        out.to_str().unwrap(),
        sample_job().to_str().unwrap(),
    ]);

    assert!(dir.path().join("reduced.vert").exists());
    assert!(dir.path().join("reduced.frag").exists());
    assert!(!dir.path().join("reduced.comp").exists());

    let mut reloaded = ShaderJob::load(&out).unwrap();
    let info = reloaded.pipeline_info();
    assert!(info.has_uniform(INT_LITERAL_UNIFORM_VALUES));
    assert!(info.has_uniform(FLOAT_LITERAL_UNIFORM_VALUES));
    assert!(glsl_reduce::find_opportunities(&mut reloaded).is_empty());
}

/// Reducing a written job again is a no-op on its stages.
#[test]
fn reducing_written_job_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("reduced.json");
    run_ok(&[
        "--emit",
        "job",
        "-o",
        out.to_str().unwrap(),
        sample_job().to_str().unwrap(),
    ]);
    let frag = std::fs::read_to_string(dir.path().join("reduced.frag")).unwrap();

    let again = run_ok(&[out.to_str().unwrap()]);
    let section = again.split("// frag\n").nth(1).unwrap();
    assert_eq!(section, frag);
}

// ── Filters ─────────────────────────────────────────────────────────────────

#[test]
fn stage_filter_lists_only_that_stage() {
    let job = sample_job();
    let listing = run_ok(&["--emit", "opportunities", "--stage", "vert", job.to_str().unwrap()]);
    let lines: Vec<&str> = listing.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines.iter().all(|l| l.starts_with("vert: ")));
}

#[test]
fn limit_caps_applied_opportunities() {
    let job = sample_job();
    let info: serde_json::Value = serde_json::from_str(&run_ok(&[
        "--emit",
        "info",
        "--limit",
        "2",
        job.to_str().unwrap(),
    ]))
    .unwrap();
    assert_eq!(info["applied"], 2);
    assert!(info["opportunities"].as_u64().unwrap() > 2);
}

#[test]
fn stage_filter_leaves_other_stages_literals() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("vert_only.json");
    run_ok(&[
        "--emit",
        "job",
        "--stage",
        "vert",
        "-o",
        out.to_str().unwrap(),
        sample_job().to_str().unwrap(),
    ]);
    let job = ShaderJob::load(&out).unwrap();
    let frag = job.shader(ShaderKind::Fragment).unwrap().to_string();
    assert!(frag.contains("return x * 0.5 + 0.25;"));
    // The fragment stage still declares the array the vertex stage now reads.
    assert!(frag.contains(FLOAT_LITERAL_UNIFORM_VALUES));
}

// ── Logging ─────────────────────────────────────────────────────────────────

#[test]
fn quiet_by_default() {
    let output = Command::new(reduce_binary())
        .arg(sample_job())
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run glsl-reduce");
    assert!(output.status.success());
    assert!(output.stderr.is_empty(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn rust_log_enables_library_events() {
    let output = Command::new(reduce_binary())
        .arg(sample_job())
        .env("RUST_LOG", "glsl_reduce=debug")
        .output()
        .expect("failed to run glsl-reduce");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("promoted literal to uniform"), "stderr: {}", stderr);
}

#[test]
fn verbose_overrides_rust_log() {
    let output = Command::new(reduce_binary())
        .args(["--verbose", "--limit", "1"])
        .arg(sample_job())
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run glsl-reduce");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("promoted literal to uniform"), "stderr: {}", stderr);
}

// ── Exit codes ──────────────────────────────────────────────────────────────

#[test]
fn missing_job_exits_with_2() {
    let output = run(&["/nonexistent/job.json"]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("glsl-reduce: error:"), "stderr: {}", stderr);
}

#[test]
fn emit_job_without_output_exits_with_2() {
    let output = run(&["--emit", "job", sample_job().to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn job_without_stages_exits_with_2() {
    let dir = tempfile::tempdir().unwrap();
    let json = dir.path().join("empty.json");
    std::fs::write(&json, "{}\n").unwrap();
    let output = run(&[json.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
}
