//! Doctor command handler
//!
//! Handles `vb doctor`: probes the simulation toolchain on PATH.

use anyhow::Result;
use colored::*;
use std::process::Command;

/// Run the `vb doctor` command to diagnose the simulation environment
pub fn run_doctor() -> Result<()> {
    println!("{} Running System Doctor...", "🚑".red());
    println!("-------------------------------");

    print!("Checking OS... ");
    println!(
        "{} ({})",
        std::env::consts::OS.green(),
        std::env::consts::ARCH.cyan()
    );

    probe("iverilog", &["-V"], "Icarus Verilog compiler", true);
    probe("vvp", &["-V"], "Icarus Verilog runtime", true);
    probe("gtkwave", &["--version"], "Waveform viewer", false);

    Ok(())
}

fn probe(bin: &str, args: &[&str], description: &str, required: bool) {
    print!("Checking {}... ", bin);
    let output = Command::new(bin).args(args).output();
    match output {
        Ok(out) if out.status.success() => {
            let stdout = String::from_utf8_lossy(&out.stdout);
            let first_line = stdout.lines().next().unwrap_or("Detected").trim();
            println!("{} ({})", "Found".green(), first_line);
        }
        _ if required => {
            println!("{}", format!("Not Found (Install {})", description).red());
        }
        _ => {
            println!("{}", format!("Not Found ({}, optional)", description).yellow());
        }
    }
}
