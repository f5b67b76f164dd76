use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use std::process::Command;
use std::time::Instant;

/// Library crates whose docs are built; xtask itself is skipped.
const DOC_CRATES: &[&str] = &["platform", "playback"];

pub fn run(open: bool, private: bool) -> Result<()> {
    println!();
    println!("{}", "📚 Building library documentation...".cyan().bold());
    println!();

    let start = Instant::now();

    let mut cmd = Command::new("cargo");
    cmd.arg("doc").arg("--no-deps");
    for krate in DOC_CRATES {
        cmd.args(["-p", krate]);
    }
    // Document the host-facing surface: mocks and the tracing build.
    cmd.args(["--features", "platform/std,playback/tracing"]);
    if private {
        cmd.arg("--document-private-items");
    }
    if open {
        cmd.arg("--open");
    }

    let output = cmd.output().context("Failed to build documentation")?;

    if !output.status.success() {
        eprintln!("{}", "✗ Documentation build failed".red().bold());
        eprintln!();
        eprintln!("{}", String::from_utf8_lossy(&output.stderr));
        anyhow::bail!("Documentation build failed");
    }

    println!(
        "{}",
        format!(
            "✓ Documentation built in {:.2}s",
            start.elapsed().as_secs_f64()
        )
        .green()
    );

    if !open {
        println!();
        for krate in DOC_CRATES {
            let index = Path::new("target/doc").join(krate).join("index.html");
            println!("   {}", index.display().to_string().dimmed());
        }
        println!(
            "   {}",
            "Or run 'cargo run -p xtask -- doc --open'".dimmed()
        );
    }

    println!();

    Ok(())
}
