//! # vbuild - iverilog Simulation Build Runner
//!
//! vbuild (binary name `vb`) compiles an RTL design tree into a runnable
//! iverilog simulation image with a single command.
//!
//! ## Features
//!
//! - **One-Shot Compiles**: Fixed-order source catalogue, correct flags, no
//!   Makefile archaeology
//! - **Declarative Manifest**: The catalogue lives in `sim.toml`, not in code
//! - **Dual Testbenches**: Local and riscv-compliance harness modes
//! - **Bounded Waits**: A hung compiler is killed, never orphaned
//!
//! ## Quick Start
//!
//! ```bash
//! # Compile the design tree one level up
//! vb build ..
//!
//! # Compile and simulate, checking the signature
//! vb run .. --check expected.sig
//! ```
//!
//! ## Module Organization
//!
//! - [`build`] - Command assembly, process invocation, cleanup, watch mode
//! - [`config`] - Manifest parsing (`sim.toml`)
//! - [`commands`] - CLI command handlers

/// Compile command assembly and bounded process invocation.
pub mod build;

/// CLI command handlers extracted from main.
pub mod commands;

/// Manifest parsing (`sim.toml`).
pub mod config;
