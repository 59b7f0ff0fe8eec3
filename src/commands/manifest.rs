//! Manifest command handler
//!
//! Handles `vb manifest list` and `vb manifest check`. The catalogue order
//! shown by `list` is the order files are handed to the compiler.

use anyhow::Result;
use colored::*;
use std::collections::HashSet;
use std::path::Path;
use walkdir::WalkDir;

use crate::config::SimConfig;

pub enum ManifestOp {
    List,
    Check { root: String },
}

pub fn handle_manifest_command(config: &SimConfig, op: &ManifestOp) -> Result<()> {
    match op {
        ManifestOp::List => list(config),
        ManifestOp::Check { root } => check(config, root),
    }
}

fn list(config: &SimConfig) -> Result<()> {
    println!(
        "{} Source catalogue for {} ({} files, compile order):",
        "📋".blue(),
        config.design.name.bold(),
        config.sources.len()
    );

    let groups = [
        ("core", &config.sources.core),
        ("soc", &config.sources.soc),
        ("debug", &config.sources.debug),
        ("utils", &config.sources.utils),
    ];
    for (name, files) in groups {
        println!("\n  [{}] ({} files)", name.cyan().bold(), files.len());
        for file in files {
            println!("    {}", file);
        }
    }

    println!("\n  [{}]", "testbench".cyan().bold());
    println!("    default:    {}", config.testbench.default);
    println!("    compliance: {}", config.testbench.compliance);
    Ok(())
}

fn check(config: &SimConfig, root: &str) -> Result<()> {
    println!(
        "{} Checking catalogue against {}...",
        "🔍".blue(),
        root.bold()
    );

    let mut missing = 0;
    let mut catalogued = HashSet::new();

    for file in config.sources.files() {
        let full = format!("{}/{}", root, file);
        catalogued.insert(full.clone());
        if !Path::new(&full).exists() {
            println!("{} Missing: {}", "x".red(), full);
            missing += 1;
        }
    }

    for tb in [&config.testbench.default, &config.testbench.compliance] {
        let full = format!("{}/{}", root, tb);
        if !Path::new(&full).exists() {
            println!("{} Missing testbench: {}", "x".red(), full);
            missing += 1;
        }
    }

    // Stray sources are a warning, not an error: the design tree may carry
    // experiments that are deliberately kept out of the build.
    let rtl_root = format!("{}/rtl", root);
    let mut strays = 0;
    for entry in WalkDir::new(&rtl_root).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "v") {
            let normalized = path.to_string_lossy().replace('\\', "/");
            if !catalogued.contains(&normalized) {
                println!("{} Not in catalogue: {}", "!".yellow(), normalized);
                strays += 1;
            }
        }
    }

    if missing > 0 {
        anyhow::bail!(
            "{} catalogued file(s) missing from the design tree at '{}'",
            missing,
            root
        );
    }

    if strays > 0 {
        println!(
            "{} Catalogue complete ({} files), {} stray source(s) ignored.",
            "✓".green(),
            config.sources.len(),
            strays
        );
    } else {
        println!(
            "{} Catalogue complete ({} files).",
            "✓".green(),
            config.sources.len()
        );
    }
    Ok(())
}
