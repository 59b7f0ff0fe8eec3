//! Configuration file parsing (`sim.toml`).
//!
//! The source catalogue and tool settings live in a declarative manifest so
//! the invoker is not tied to one design's file layout. When no `sim.toml`
//! exists in the working directory, the built-in MyCPU catalogue is used.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SimConfig {
    pub design: DesignConfig,
    #[serde(default)]
    pub testbench: TestbenchConfig,
    #[serde(default)]
    pub compiler: CompilerConfig,
    #[serde(default = "SourceManifest::builtin")]
    pub sources: SourceManifest,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct DesignConfig {
    pub name: String,
    /// Directory (root-relative) handed to the compiler as include path.
    #[serde(default = "default_include_dir")]
    pub include_dir: String,
    /// Macro definition passed verbatim via `-D`. The inner quotes matter:
    /// the testbench expects a Verilog string literal.
    #[serde(default = "default_output_macro")]
    pub output_macro: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct TestbenchConfig {
    /// Testbench used when running against local firmware images.
    #[serde(default = "default_tb")]
    pub default: String,
    /// Testbench used by the riscv-compliance harness.
    #[serde(default = "compliance_tb")]
    pub compliance: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CompilerConfig {
    #[serde(default = "default_program")]
    pub program: String,
    /// Compiled simulation image filename.
    #[serde(default = "default_output")]
    pub output: String,
    /// Bound on the wait for the compile to finish, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Ordered source-file catalogue. Group order and file order within each
/// group are significant: iverilog resolves includes and module definitions
/// in argument order.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SourceManifest {
    pub core: Vec<String>,
    pub soc: Vec<String>,
    pub debug: Vec<String>,
    pub utils: Vec<String>,
}

impl Default for TestbenchConfig {
    fn default() -> Self {
        Self {
            default: default_tb(),
            compliance: compliance_tb(),
        }
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            output: default_output(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_include_dir() -> String {
    "rtl/core".to_string()
}

fn default_output_macro() -> String {
    r#"OUTPUT="signature.output""#.to_string()
}

fn default_tb() -> String {
    "tb/MyCPU_soc_tb.v".to_string()
}

fn compliance_tb() -> String {
    "tb/compliance_test/MyCPU_soc_tb.v".to_string()
}

fn default_program() -> String {
    "iverilog".to_string()
}

fn default_output() -> String {
    "out.vvp".to_string()
}

fn default_timeout() -> u64 {
    5
}

impl SourceManifest {
    /// The MyCPU SoC catalogue. `defines.v` sits early in the core group so
    /// later files see its macros.
    pub fn builtin() -> Self {
        let group = |dir: &str, files: &[&str]| -> Vec<String> {
            files.iter().map(|f| format!("rtl/{}/{}.v", dir, f)).collect()
        };

        Self {
            core: group(
                "core",
                &[
                    "clint",
                    "csr_reg",
                    "ctrl",
                    "defines",
                    "div",
                    "ex",
                    "id",
                    "id_ex",
                    "if_id",
                    "pc_reg",
                    "regs",
                    "rib",
                    "wb",
                    "mem",
                    "ex_mem",
                    "mem_wb",
                    "branch_prediction",
                    "MyCPU",
                ],
            ),
            soc: group(
                "soc",
                &["ram", "rom", "timer", "uart", "gpio", "spi", "MyCPU_soc_top"],
            ),
            debug: group("debug", &["jtag_dm", "jtag_driver", "jtag_top", "uart_debug"]),
            utils: group(
                "utils",
                &["full_handshake_rx", "full_handshake_tx", "gen_buf", "gen_dff"],
            ),
        }
    }

    /// All catalogued files in compile order.
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.core
            .iter()
            .chain(&self.soc)
            .chain(&self.debug)
            .chain(&self.utils)
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.core.len() + self.soc.len() + self.debug.len() + self.utils.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            design: DesignConfig {
                name: "MyCPU".to_string(),
                include_dir: default_include_dir(),
                output_macro: default_output_macro(),
            },
            testbench: TestbenchConfig::default(),
            compiler: CompilerConfig::default(),
            sources: SourceManifest::builtin(),
        }
    }
}

/// Load `sim.toml` from the working directory, falling back to the built-in
/// MyCPU configuration when none exists.
pub fn load_config() -> Result<SimConfig> {
    load_config_from(Path::new("sim.toml"))
}

pub fn load_config_from(path: &Path) -> Result<SimConfig> {
    if !path.exists() {
        return Ok(SimConfig::default());
    }
    let config_str = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} - check file permissions", path.display()))?;
    let config: SimConfig = toml::from_str(&config_str).with_context(|| {
        format!(
            "Failed to parse {} - check for syntax errors (missing quotes, brackets)",
            path.display()
        )
    })?;

    if config.sources.is_empty() {
        anyhow::bail!(
            "{}: [sources] lists no files.\n\n\
            💡 Tip: Run 'vb init' to regenerate a manifest with the default catalogue.",
            path.display()
        );
    }

    Ok(config)
}
