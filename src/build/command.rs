//! Compile command assembly.
//!
//! Everything here is pure: given a config, a design root, and a testbench
//! mode, produce the exact iverilog argument vector. Spawning lives in
//! [`super::invoke`].
//!
//! Argument order is load-bearing. iverilog resolves module definitions and
//! `include` paths in the order files appear on the command line, so the
//! assembled vector is always: output flag, include path, macro definition,
//! testbench, then the catalogue in manifest order.

use crate::config::SimConfig;
use clap::ValueEnum;

/// Which top-level testbench drives the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TbMode {
    /// Local testbench (`tb/MyCPU_soc_tb.v`), used with firmware images.
    Default,
    /// riscv-compliance harness testbench (`tb/compliance_test/MyCPU_soc_tb.v`).
    Compliance,
}

impl TbMode {
    /// Legacy convention from the original flow: the compliance harness
    /// invokes the runner with an absolute design path, while local runs
    /// invoke it from `sim/` with the root spelled `..`.
    pub fn infer(root: &str) -> Self {
        if root == ".." { TbMode::Default } else { TbMode::Compliance }
    }

    pub fn testbench<'a>(&self, config: &'a SimConfig) -> &'a str {
        match self {
            TbMode::Default => &config.testbench.default,
            TbMode::Compliance => &config.testbench.compliance,
        }
    }
}

/// A fully assembled external-tool invocation: program name plus ordered
/// argument vector.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Build the compile invocation for `root` in the given mode.
    ///
    /// Paths are forward-slash string concatenations of root + suffix, not
    /// platform joins: iverilog accepts `/` everywhere and the compliance
    /// harness compares command lines textually.
    pub fn compile(config: &SimConfig, root: &str, mode: TbMode) -> Self {
        let mut args = Vec::with_capacity(7 + config.sources.len());

        args.push("-o".to_string());
        args.push(config.compiler.output.clone());
        args.push("-I".to_string());
        args.push(format!("{}/{}", root, config.design.include_dir));
        args.push("-D".to_string());
        args.push(config.design.output_macro.clone());
        args.push(format!("{}/{}", root, mode.testbench(config)));

        for file in config.sources.files() {
            args.push(format!("{}/{}", root, file));
        }

        Self {
            program: config.compiler.program.clone(),
            args,
        }
    }

    /// Invocation of the vvp runtime on the compiled image.
    pub fn simulate(config: &SimConfig) -> Self {
        Self {
            program: "vvp".to_string(),
            args: vec![config.compiler.output.clone()],
        }
    }

    /// The command as it would be typed in a shell, for `--verbose` and
    /// `--dry-run` output.
    pub fn display_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}
