use super::invoke::{BuildOptions, build_design};
use crate::config::SimConfig;
use anyhow::Result;
use colored::*;
use notify::{Config, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::mpsc::channel;
use std::time::Duration;

/// Recompile on every change under `<root>/rtl` and `<root>/tb`.
pub fn watch(config: &SimConfig, root: &str, options: &BuildOptions) -> Result<()> {
    println!("{} Watching {}/rtl and {}/tb for changes...", "👀".cyan(), root, root);

    let (tx, rx) = channel();
    let config_notify = Config::default().with_poll_interval(Duration::from_secs(1));
    let mut watcher = notify::RecommendedWatcher::new(tx, config_notify)?;

    let rtl_dir = format!("{}/rtl", root);
    let tb_dir = format!("{}/tb", root);
    watcher.watch(Path::new(&rtl_dir), RecursiveMode::Recursive)?;
    if Path::new(&tb_dir).exists() {
        watcher.watch(Path::new(&tb_dir), RecursiveMode::Recursive)?;
    }

    // First run
    run_and_clear(config, root, options);

    while rx.recv().is_ok() {
        // Debounce simple
        std::thread::sleep(Duration::from_millis(100));
        while rx.try_recv().is_ok() {}
        run_and_clear(config, root, options);
    }
    Ok(())
}

fn run_and_clear(config: &SimConfig, root: &str, options: &BuildOptions) {
    print!("\x1B[2J\x1B[1;1H");
    println!("{} File changed. Recompiling...", "🔄".yellow());

    if let Err(e) = build_design(config, root, options) {
        println!("{} Error: {}", "x".red(), e);
    }
}
