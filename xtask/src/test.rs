use anyhow::{Context, Result};
use colored::Colorize;
use std::process::Command;
use std::time::Instant;

/// Which `xtask test` filter a suite belongs to.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Kind {
    Unit,
    Integration,
    Doc,
}

/// One `cargo test` invocation.
struct Suite {
    label: &'static str,
    kind: Kind,
    args: &'static [&'static str],
    /// A failure is reported but does not fail the run.
    advisory: bool,
}

const SUITES: &[Suite] = &[
    Suite {
        label: "unit tests",
        kind: Kind::Unit,
        args: &["test", "--lib", "--workspace"],
        advisory: false,
    },
    Suite {
        label: "integration tests",
        kind: Kind::Integration,
        args: &["test", "--workspace", "--tests", "--features", "playback/tracing"],
        advisory: false,
    },
    Suite {
        label: "doc tests",
        kind: Kind::Doc,
        args: &["test", "--doc", "--workspace"],
        advisory: true,
    },
];

fn selected(kind: Kind, unit_only: bool, integration_only: bool) -> bool {
    match kind {
        Kind::Unit => !integration_only,
        Kind::Integration => !unit_only,
        Kind::Doc => true,
    }
}

pub fn run(unit_only: bool, integration_only: bool) -> Result<()> {
    println!();
    println!("{}", "🧪 Running tests...".cyan().bold());
    println!();

    let total_start = Instant::now();

    for suite in SUITES
        .iter()
        .filter(|s| selected(s.kind, unit_only, integration_only))
    {
        run_suite(suite)?;
    }

    println!(
        "{}",
        format!(
            "✓ All tests completed in {:.2}s",
            total_start.elapsed().as_secs_f64()
        )
        .green()
        .bold()
    );
    println!();

    Ok(())
}

fn run_suite(suite: &Suite) -> Result<()> {
    let label = suite.label;
    println!("{}", format!("  Running {label}...").cyan());
    let start = Instant::now();

    let output = Command::new("cargo")
        .args(suite.args)
        .output()
        .with_context(|| format!("Failed to run {label}"))?;
    let stdout = String::from_utf8_lossy(&output.stdout);

    if output.status.success() {
        println!(
            "{}",
            format!(
                "  ✓ {label} passed {} in {:.2}s",
                extract_test_summary(&stdout),
                start.elapsed().as_secs_f64()
            )
            .green()
        );
    } else if suite.advisory {
        eprintln!("{}", format!("  ⚠ {label} failed").yellow().bold());
    } else {
        eprintln!("{}", format!("  ✗ {label} failed").red().bold());
        eprintln!();
        for line in stdout.lines() {
            eprintln!("  {line}");
        }
        anyhow::bail!("{label} failed");
    }
    println!();
    Ok(())
}

/// Sum the `test result:` lines of a multi-crate run into one summary.
fn extract_test_summary(output: &str) -> String {
    let mut passed = 0u32;
    let mut failed = 0u32;
    let mut seen = false;
    for line in output.lines() {
        let Some(result) = line.split("test result:").nth(1) else {
            continue;
        };
        seen = true;
        for part in result.split(';') {
            let mut words = part.split_whitespace().rev();
            let (Some(kind), Some(count)) = (words.next(), words.next()) else {
                continue;
            };
            let Ok(count) = count.parse::<u32>() else {
                continue;
            };
            match kind {
                "passed" => passed = passed.saturating_add(count),
                "failed" => failed = failed.saturating_add(count),
                _ => {}
            }
        }
    }
    if seen {
        format!("({passed} passed, {failed} failed)")
    } else {
        "(summary not available)".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{extract_test_summary, selected, Kind, SUITES};

    #[test]
    fn filters_pick_matching_suites() {
        let picked = |unit, integration| -> Vec<&str> {
            SUITES
                .iter()
                .filter(|s| selected(s.kind, unit, integration))
                .map(|s| s.label)
                .collect()
        };
        assert_eq!(picked(false, false).len(), 3);
        assert_eq!(picked(true, false), ["unit tests", "doc tests"]);
        assert_eq!(picked(false, true), ["integration tests", "doc tests"]);
        assert!(SUITES.iter().any(|s| s.kind == Kind::Doc && s.advisory));
    }

    #[test]
    fn sums_results_across_crates() {
        let out = "\
test result: ok. 5 passed; 0 failed; 0 ignored; 0 measured; 0 filtered out
running 3 tests
test result: ok. 3 passed; 1 failed; 0 ignored; 0 measured; 0 filtered out";
        assert_eq!(extract_test_summary(out), "(8 passed, 1 failed)");
    }

    #[test]
    fn missing_summary_is_reported() {
        assert_eq!(extract_test_summary("no tests"), "(summary not available)");
    }
}
