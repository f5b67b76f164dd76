use anyhow::{Context, Result};
use colored::Colorize;
use std::process::Command;
use std::time::Instant;

/// `(label, cargo args)` for every build the libraries must pass.
const BUILDS: &[(&str, &[&str])] = &[
    (
        "platform crate (no_std, STM32H7)",
        &["check", "-p", "platform", "--target", "thumbv7em-none-eabihf", "--no-default-features"],
    ),
    (
        "playback crate (no_std, STM32H7, defmt)",
        &["check", "-p", "playback", "--target", "thumbv7em-none-eabihf", "--features", "defmt"],
    ),
    (
        "playback crate (host, tracing)",
        &["check", "-p", "playback", "--all-targets", "--features", "tracing"],
    ),
];

pub fn run() -> Result<()> {
    println!();
    println!("{}", "🔍 Checking library builds...".cyan().bold());
    println!();

    let total_start = Instant::now();

    for (label, args) in BUILDS {
        println!("{}", format!("  Checking {label}...").cyan());
        let start = Instant::now();

        let output = Command::new("cargo")
            .args(*args)
            .output()
            .with_context(|| format!("Failed to check {label}"))?;

        if !output.status.success() {
            eprintln!("{}", format!("  ✗ {label} check failed").red().bold());
            eprintln!();
            eprintln!("{}", String::from_utf8_lossy(&output.stderr));
            anyhow::bail!("{label} check failed");
        }

        println!(
            "{}",
            format!("  ✓ {label} passed in {:.2}s", start.elapsed().as_secs_f64()).green()
        );
        println!();
    }

    println!("{}", "  Running clippy lints...".cyan());
    let clippy_start = Instant::now();

    let clippy_output = Command::new("cargo")
        .args([
            "clippy",
            "--workspace",
            "--all-targets",
            "--features",
            "playback/tracing",
            "--",
            "-D",
            "warnings",
        ])
        .output()
        .context("Failed to run clippy")?;

    if !clippy_output.status.success() {
        eprintln!("{}", "  ⚠ Clippy warnings found".yellow().bold());
        eprintln!();
        eprintln!("{}", String::from_utf8_lossy(&clippy_output.stderr));
        // Don't fail on clippy warnings, just show them
    } else {
        println!(
            "{}",
            format!(
                "  ✓ Clippy passed in {:.2}s",
                clippy_start.elapsed().as_secs_f64()
            )
            .green()
        );
    }
    println!();

    println!("{}", "  Checking code formatting...".cyan());

    let fmt_output = Command::new("cargo")
        .args(["fmt", "--all", "--check"])
        .output()
        .context("Failed to run cargo fmt")?;

    if !fmt_output.status.success() {
        eprintln!("{}", "  ⚠ Formatting issues found".yellow().bold());
        eprintln!("     Run 'cargo fmt --all' to fix");
    } else {
        println!("{}", "  ✓ Formatting check passed".green());
    }
    println!();

    println!(
        "{}",
        format!(
            "✓ All checks completed in {:.2}s",
            total_start.elapsed().as_secs_f64()
        )
        .green()
        .bold()
    );
    println!();

    Ok(())
}
