//! Integration tests for vbuild invocation behavior
//!
//! These tests drive the `vb` binary end-to-end in temporary directories.
//! None of them require iverilog: dry runs never spawn, and failure-path
//! tests point the manifest at a compiler that does not exist.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

use vbuild::config::SourceManifest;

/// Get the path to the vb binary
fn get_vb_binary() -> PathBuf {
    let target_dir = std::env::var_os("CARGO_TARGET_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("target"));

    let bin_name = if cfg!(windows) { "vb.exe" } else { "vb" };
    target_dir.join("debug").join(bin_name)
}

/// Lay out a fake design tree with every catalogued file plus testbenches.
fn create_design_tree(dir: &Path) {
    for file in SourceManifest::builtin().files() {
        let path = dir.join(file);
        fs::create_dir_all(path.parent().unwrap()).expect("Failed to create rtl dir");
        fs::write(&path, "// stub\n").expect("Failed to write source stub");
    }
    for tb in ["tb/MyCPU_soc_tb.v", "tb/compliance_test/MyCPU_soc_tb.v"] {
        let path = dir.join(tb);
        fs::create_dir_all(path.parent().unwrap()).expect("Failed to create tb dir");
        fs::write(&path, "// stub\n").expect("Failed to write tb stub");
    }
}

fn run_vb(work_dir: &Path, args: &[&str]) -> Option<std::process::Output> {
    let vb = get_vb_binary();
    if !vb.exists() {
        eprintln!("Skipping test: vb binary not found at {:?}", vb);
        return None;
    }
    Some(
        Command::new(&vb)
            .args(args)
            .current_dir(work_dir)
            .output()
            .expect("Failed to execute vb"),
    )
}

#[test]
fn test_dry_run_prints_exact_command() {
    let temp = TempDir::new().unwrap();
    let Some(output) = run_vb(temp.path(), &["build", "/design", "--dry-run"]) else {
        return;
    };

    assert!(
        output.status.success(),
        "Dry run failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Would execute"));
    assert!(stdout.contains("iverilog -o out.vvp -I /design/rtl/core"));
    assert!(stdout.contains(r#"-D OUTPUT="signature.output""#));
    // Non-parent root selects the compliance testbench.
    assert!(stdout.contains("/design/tb/compliance_test/MyCPU_soc_tb.v"));
    // No artifacts from a dry run.
    assert!(!temp.path().join("out.vvp").exists());
}

#[test]
fn test_parent_root_selects_local_testbench() {
    let temp = TempDir::new().unwrap();
    let Some(output) = run_vb(temp.path(), &["build", "..", "--dry-run"]) else {
        return;
    };

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("../tb/MyCPU_soc_tb.v"));
    assert!(!stdout.contains("compliance_test"));
}

#[test]
fn test_explicit_mode_beats_inference() {
    let temp = TempDir::new().unwrap();
    let Some(output) = run_vb(
        temp.path(),
        &["build", "..", "--mode", "compliance", "--dry-run"],
    ) else {
        return;
    };

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("../tb/compliance_test/MyCPU_soc_tb.v"));
}

#[test]
fn test_missing_compiler_is_a_spawn_failure() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("sim.toml"),
        r#"
[design]
name = "MyCPU"

[compiler]
program = "vbuild-test-no-such-tool"
"#,
    )
    .unwrap();

    let Some(output) = run_vb(temp.path(), &["build", ".."]) else {
        return;
    };

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Failed to launch 'vbuild-test-no-such-tool'"),
        "Unexpected stderr: {}",
        stderr
    );
    assert!(!temp.path().join("out.vvp").exists());
}

#[test]
fn test_manifest_list_prints_full_catalogue() {
    let temp = TempDir::new().unwrap();
    let Some(output) = run_vb(temp.path(), &["manifest", "list"]) else {
        return;
    };

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("33 files"));
    assert!(stdout.contains("rtl/core/clint.v"));
    assert!(stdout.contains("rtl/utils/gen_dff.v"));
    assert!(stdout.contains("tb/compliance_test/MyCPU_soc_tb.v"));
}

#[test]
fn test_manifest_check_passes_on_complete_tree() {
    let temp = TempDir::new().unwrap();
    let design = temp.path().join("design");
    create_design_tree(&design);

    let Some(output) = run_vb(temp.path(), &["manifest", "check", "design"]) else {
        return;
    };

    assert!(
        output.status.success(),
        "Check failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Catalogue complete"));
}

#[test]
fn test_manifest_check_fails_on_missing_file() {
    let temp = TempDir::new().unwrap();
    let design = temp.path().join("design");
    create_design_tree(&design);
    fs::remove_file(design.join("rtl/core/div.v")).unwrap();

    let Some(output) = run_vb(temp.path(), &["manifest", "check", "design"]) else {
        return;
    };

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("rtl/core/div.v"));
}

#[test]
fn test_clean_removes_artifacts() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("out.vvp"), b"image").unwrap();
    fs::write(temp.path().join("signature.output"), b"deadbeef").unwrap();
    fs::write(temp.path().join("dump.vcd"), b"waves").unwrap();

    let Some(output) = run_vb(temp.path(), &["clean", "--all"]) else {
        return;
    };

    assert!(output.status.success());
    assert!(!temp.path().join("out.vvp").exists());
    assert!(!temp.path().join("signature.output").exists());
    assert!(!temp.path().join("dump.vcd").exists());
}

#[test]
fn test_custom_manifest_drives_the_command() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("sim.toml"),
        r#"
[design]
name = "tiny"
include_dir = "hdl"
output_macro = 'OUTPUT="sig.txt"'

[testbench]
default = "bench/top_tb.v"
compliance = "bench/rv/top_tb.v"

[compiler]
output = "tiny.vvp"

[sources]
core = ["hdl/alu.v", "hdl/top.v"]
soc = []
debug = []
utils = []
"#,
    )
    .unwrap();

    let Some(output) = run_vb(temp.path(), &["build", "..", "--dry-run"]) else {
        return;
    };

    assert!(
        output.status.success(),
        "Dry run failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(
        r#"iverilog -o tiny.vvp -I ../hdl -D OUTPUT="sig.txt" ../bench/top_tb.v ../hdl/alu.v ../hdl/top.v"#
    ));
}
