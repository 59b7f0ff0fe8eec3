//! Child-process invocation with a bounded wait.
//!
//! The compiler runs with inherited stdio; its diagnostics go straight to
//! the terminal and are never parsed here. The wait is bounded: a compile
//! that blows past the limit is killed and reaped before the timeout is
//! reported, so no invocation path leaks a background process.

use super::command::{CommandSpec, TbMode};
use crate::config::SimConfig;
use anyhow::{Context, Result};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::Path;
use std::process::{Child, Command, ExitStatus};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Failure modes of one external-tool invocation. All are terminal: the
/// runner never retries.
#[derive(Debug)]
pub enum InvokeError {
    /// The executable could not be launched (not installed, not on PATH,
    /// permission denied).
    Spawn(String, std::io::Error),
    /// The child outlived the wait bound. It has already been killed and
    /// reaped by the time this is observed.
    Timeout(String, Duration),
    /// The child ran to completion with a non-zero status. The status is
    /// propagated uninterpreted.
    Failed(String, ExitStatus),
}

impl std::fmt::Display for InvokeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvokeError::Spawn(program, e) => {
                write!(f, "Failed to launch '{}': {}", program, e)
            }
            InvokeError::Timeout(program, bound) => {
                write!(f, "'{}' did not finish within {:?}", program, bound)
            }
            InvokeError::Failed(program, status) => {
                write!(f, "'{}' exited with {}", program, status)
            }
        }
    }
}

impl std::error::Error for InvokeError {}

/// Owns the child for the duration of the wait. Dropping the guard kills
/// and reaps the child; on an already-exited child both calls are no-ops,
/// so every exit path (timeout, panic, early return) is covered.
struct ChildGuard(Child);

impl Drop for ChildGuard {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

/// Spawn `spec` and wait at most `bound` for it to finish.
///
/// With `progress`, a spinner ticks while the wait blocks. Returns the
/// child's exit status without interpreting it.
pub fn invoke(
    spec: &CommandSpec,
    bound: Duration,
    progress: Option<&str>,
) -> Result<ExitStatus, InvokeError> {
    let child = Command::new(&spec.program)
        .args(&spec.args)
        .spawn()
        .map_err(|e| InvokeError::Spawn(spec.program.clone(), e))?;
    let mut guard = ChildGuard(child);

    let pb = progress.map(|msg| {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} ({elapsed})")
                .unwrap(),
        );
        pb.set_message(msg.to_string());
        pb
    });

    let start = Instant::now();
    let status = loop {
        match guard.0.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if start.elapsed() >= bound {
                    if let Some(pb) = &pb {
                        pb.finish_and_clear();
                    }
                    // Guard drop kills and reaps before the caller sees this.
                    return Err(InvokeError::Timeout(spec.program.clone(), bound));
                }
                if let Some(pb) = &pb {
                    pb.tick();
                }
                std::thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                if let Some(pb) = &pb {
                    pb.finish_and_clear();
                }
                return Err(InvokeError::Spawn(spec.program.clone(), e));
            }
        }
    };

    if let Some(pb) = &pb {
        pb.finish_and_clear();
    }

    if status.success() {
        Ok(status)
    } else {
        Err(InvokeError::Failed(spec.program.clone(), status))
    }
}

/// Options threaded from the CLI into a build.
#[derive(Debug, Default, Clone)]
pub struct BuildOptions {
    /// Explicit testbench mode; inferred from the root when absent.
    pub mode: Option<TbMode>,
    pub verbose: bool,
    pub dry_run: bool,
    /// Override for the configured wait bound, in seconds.
    pub timeout: Option<u64>,
}

/// Compile the design at `root` into a simulation image.
pub fn build_design(config: &SimConfig, root: &str, options: &BuildOptions) -> Result<()> {
    let start_time = Instant::now();
    let mode = options.mode.unwrap_or_else(|| TbMode::infer(root));
    let spec = CommandSpec::compile(config, root, mode);

    if options.dry_run {
        println!("{} Would execute:", "DRY RUN".yellow().bold());
        println!("   {}", spec.display_line());
        return Ok(());
    }

    if options.verbose {
        println!("   {} {}", "$".dimmed(), spec.display_line());
    }

    let tb_label = match mode {
        TbMode::Default => "default",
        TbMode::Compliance => "compliance",
    };
    println!(
        "{} Compiling {} ({} sources, {} testbench)...",
        "⚙".cyan(),
        config.design.name.bold(),
        config.sources.len(),
        tb_label
    );

    let bound = Duration::from_secs(options.timeout.unwrap_or(config.compiler.timeout_secs));
    invoke(&spec, bound, Some("Waiting for compiler"))
        .with_context(|| format!("Compile of '{}' failed", config.design.name))?;

    println!(
        "{} Compile finished in {:.2?} -> {}",
        "✓".green(),
        start_time.elapsed(),
        config.compiler.output.cyan()
    );
    Ok(())
}

/// Compile, then run the image under vvp. With `check`, compare the
/// simulation's signature dump against a reference file afterwards.
pub fn build_and_run(
    config: &SimConfig,
    root: &str,
    options: &BuildOptions,
    check: Option<&Path>,
) -> Result<()> {
    build_design(config, root, options)?;

    let spec = CommandSpec::simulate(config);
    if options.dry_run {
        println!("   {}", spec.display_line());
        return Ok(());
    }

    println!("{} Running simulation...\n", "▶".green());
    // The simulation itself is unbounded; only the compile carries the
    // timeout. Stdio is inherited so the testbench prints directly.
    let status = Command::new(&spec.program)
        .args(&spec.args)
        .status()
        .map_err(|e| InvokeError::Spawn(spec.program.clone(), e))?;
    if !status.success() {
        return Err(InvokeError::Failed(spec.program, status).into());
    }

    if let Some(reference) = check {
        check_signature(config, reference)?;
    }
    Ok(())
}

/// The signature filename the testbench writes, recovered from the macro
/// definition (`OUTPUT="signature.output"`).
pub fn signature_file(config: &SimConfig) -> &str {
    config
        .design
        .output_macro
        .split('"')
        .nth(1)
        .unwrap_or("signature.output")
}

/// Byte-compare the produced signature against a reference dump.
fn check_signature(config: &SimConfig, reference: &Path) -> Result<()> {
    let produced = signature_file(config);
    let ours = fs::read(produced)
        .with_context(|| format!("Simulation produced no '{}' signature", produced))?;
    let theirs = fs::read(reference)
        .with_context(|| format!("Failed to read reference signature {}", reference.display()))?;

    if ours == theirs {
        println!("{} Signature matches {}", "✓".green(), reference.display());
        Ok(())
    } else {
        anyhow::bail!(
            "Signature mismatch: {} differs from reference {}",
            produced,
            reference.display()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_spec(program: &str, args: &[&str]) -> CommandSpec {
        CommandSpec {
            program: program.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn missing_executable_is_a_spawn_failure() {
        let spec = raw_spec("vbuild-test-no-such-tool", &[]);
        let err = invoke(&spec, Duration::from_secs(1), None).unwrap_err();
        assert!(matches!(err, InvokeError::Spawn(_, _)));
        assert!(err.to_string().contains("vbuild-test-no-such-tool"));
    }

    #[cfg(unix)]
    #[test]
    fn hung_child_times_out_within_the_bound() {
        let spec = raw_spec("sleep", &["30"]);
        let start = Instant::now();
        let err = invoke(&spec, Duration::from_millis(200), None).unwrap_err();
        assert!(matches!(err, InvokeError::Timeout(_, _)));
        // Bound plus generous scheduling tolerance; nowhere near the 30s
        // the child asked for, and the child is dead by now.
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_is_an_external_tool_failure() {
        let spec = raw_spec("false", &[]);
        let err = invoke(&spec, Duration::from_secs(5), None).unwrap_err();
        match err {
            InvokeError::Failed(program, status) => {
                assert_eq!(program, "false");
                assert!(!status.success());
            }
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn successful_exit_propagates_the_status() {
        let spec = raw_spec("true", &[]);
        let status = invoke(&spec, Duration::from_secs(5), None).unwrap();
        assert!(status.success());
    }

    #[test]
    fn signature_filename_comes_from_the_macro() {
        let config = SimConfig::default();
        assert_eq!(signature_file(&config), "signature.output");

        let mut custom = SimConfig::default();
        custom.design.output_macro = r#"OUTPUT="run.sig""#.to_string();
        assert_eq!(signature_file(&custom), "run.sig");
    }

    #[test]
    fn dry_run_spawns_nothing() {
        // A dry run against a compiler that does not exist must still
        // succeed: the command is printed, never launched.
        let mut config = SimConfig::default();
        config.compiler.program = "vbuild-test-no-such-tool".to_string();
        let options = BuildOptions {
            dry_run: true,
            ..Default::default()
        };
        build_design(&config, "..", &options).unwrap();
    }
}
