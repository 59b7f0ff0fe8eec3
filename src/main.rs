//! # vbuild CLI Entry Point
//!
//! This is the main executable for the `vb` command-line tool.
//! It parses CLI arguments using clap and routes commands to the appropriate handlers.
//!
//! ## Command Structure
//!
//! - **Build**: `build`, `run`, `clean`, `watch`
//! - **Manifest**: `init`, `manifest list`, `manifest check`
//! - **Environment**: `doctor`, `completion`

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use colored::*;
use inquire::Text;
use std::fs;
use std::path::{Path, PathBuf};

use vbuild::build::{self, BuildOptions, TbMode};
use vbuild::commands;
use vbuild::config::{self, SimConfig};

#[derive(Parser)]
#[command(name = "vb")]
#[command(about = "The iverilog simulation build runner", version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile the design into a simulation image
    Build {
        /// Root directory of the design tree
        root: String,
        /// Testbench selection (inferred from the root when omitted)
        #[arg(long, value_enum)]
        mode: Option<TbMode>,
        /// Echo the full compiler command before spawning
        #[arg(short, long)]
        verbose: bool,
        /// Show what would be executed without running
        #[arg(long)]
        dry_run: bool,
        /// Override the compile wait bound, in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Compile and run the simulation under vvp
    Run {
        /// Root directory of the design tree
        root: String,
        /// Testbench selection (inferred from the root when omitted)
        #[arg(long, value_enum)]
        mode: Option<TbMode>,
        /// Echo the full compiler command before spawning
        #[arg(short, long)]
        verbose: bool,
        /// Show what would be executed without running
        #[arg(long)]
        dry_run: bool,
        /// Compare the produced signature against a reference dump
        #[arg(long)]
        check: Option<PathBuf>,
        /// Override the compile wait bound, in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Watch RTL and testbench sources, recompile on change
    Watch {
        /// Root directory of the design tree
        root: String,
        /// Testbench selection (inferred from the root when omitted)
        #[arg(long, value_enum)]
        mode: Option<TbMode>,
    },
    /// Remove the simulation image, signature, and wave dumps
    Clean {
        /// Also remove waveform dumps (vcd/fst/lxt)
        #[arg(long)]
        all: bool,
    },
    /// Inspect the source catalogue
    Manifest {
        #[command(subcommand)]
        op: Option<ManifestOp>,
    },
    /// Write a sim.toml manifest seeded with the built-in catalogue
    Init,
    /// Diagnose the simulation toolchain
    Doctor,
    /// Generate shell completion scripts
    Completion { shell: Shell },
}

#[derive(Subcommand)]
enum ManifestOp {
    /// Print the catalogue in compile order
    List,
    /// Verify the catalogue against a design tree
    Check {
        /// Root directory of the design tree
        root: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Build {
            root,
            mode,
            verbose,
            dry_run,
            timeout,
        }) => {
            let config = config::load_config()?;
            let options = BuildOptions {
                mode: *mode,
                verbose: *verbose,
                dry_run: *dry_run,
                timeout: *timeout,
            };
            build::build_design(&config, root, &options)
        }

        Some(Commands::Run {
            root,
            mode,
            verbose,
            dry_run,
            check,
            timeout,
        }) => {
            let config = config::load_config()?;
            let options = BuildOptions {
                mode: *mode,
                verbose: *verbose,
                dry_run: *dry_run,
                timeout: *timeout,
            };
            build::build_and_run(&config, root, &options, check.as_deref())
        }

        Some(Commands::Watch { root, mode }) => {
            let config = config::load_config()?;
            let options = BuildOptions {
                mode: *mode,
                ..Default::default()
            };
            build::watch(&config, root, &options)
        }

        Some(Commands::Clean { all }) => {
            let config = config::load_config()?;
            build::clean(&config, *all)
        }

        Some(Commands::Manifest { op }) => {
            let config = config::load_config()?;
            let local_op = match op {
                Some(ManifestOp::Check { root }) => {
                    commands::manifest::ManifestOp::Check { root: root.clone() }
                }
                Some(ManifestOp::List) | None => commands::manifest::ManifestOp::List,
            };
            commands::manifest::handle_manifest_command(&config, &local_op)
        }

        Some(Commands::Init) => init_manifest(),
        Some(Commands::Doctor) => commands::doctor::run_doctor(),

        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, bin_name, &mut std::io::stdout());
            Ok(())
        }

        None => {
            print_splash();
            Ok(())
        }
    }
}

fn print_splash() {
    println!();
    println!("   {}", "vbuild".cyan().bold());
    println!(
        "   {}",
        "The iverilog Simulation Build Runner".dimmed().italic()
    );
    println!("   {}", format!("v{}", env!("CARGO_PKG_VERSION")).green());
    println!();
    println!(
        "   {}  {}, {}, {}, {}",
        "Build".bold().yellow(),
        "build".cyan(),
        "run".cyan(),
        "watch".cyan(),
        "clean".cyan()
    );
    println!(
        "   {}  {}, {}, {}",
        "Setup".bold().green(),
        "init".cyan(),
        "manifest".cyan(),
        "doctor".cyan()
    );
    println!();
    println!("   Run {} for detailed usage.", "vb --help".white().bold());
    println!();
}

fn init_manifest() -> Result<()> {
    if Path::new("sim.toml").exists() {
        println!(
            "{} Error: Manifest already exists (sim.toml).",
            "x".red()
        );
        return Ok(());
    }

    let name = Text::new("Design name?").with_default("MyCPU").prompt()?;

    let mut config = SimConfig::default();
    config.design.name = name;

    let toml_str = toml::to_string_pretty(&config)?;
    fs::write("sim.toml", toml_str)?;

    println!(
        "{} Wrote sim.toml with the built-in catalogue. Run {} to compile.",
        "✓".green(),
        "vb build <root>".bold().white()
    );
    Ok(())
}
