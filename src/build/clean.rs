//! Build artifact cleanup.
//!
//! `vb clean` removes the compiled simulation image and the signature dump;
//! `vb clean --all` also sweeps waveform dumps out of the working directory.

use anyhow::{Context, Result};
use colored::*;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::build::invoke::signature_file;
use crate::config::SimConfig;

pub fn clean(config: &SimConfig, all: bool) -> Result<()> {
    let mut cleaned = false;

    let image = Path::new(&config.compiler.output);
    if image.exists() {
        fs::remove_file(image)
            .with_context(|| format!("Failed to remove {}", image.display()))?;
        cleaned = true;
    }

    let signature = Path::new(signature_file(config));
    if signature.exists() {
        fs::remove_file(signature)
            .with_context(|| format!("Failed to remove {}", signature.display()))?;
        cleaned = true;
    }

    if all {
        // Wave dumps land wherever the testbench was run from; only the
        // working directory is swept, never the design tree.
        for entry in WalkDir::new(".")
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            let is_wave = path
                .extension()
                .is_some_and(|ext| ext == "vcd" || ext == "fst" || ext == "lxt");
            if is_wave {
                fs::remove_file(path)
                    .with_context(|| format!("Failed to remove {}", path.display()))?;
                println!("{} Removed {}", "🗑️".red(), path.display());
                cleaned = true;
            }
        }
    }

    if cleaned {
        println!("{} Clean complete.", "✓".green());
    } else {
        println!("{} Nothing to clean", "!".yellow());
    }
    Ok(())
}
