//! Development automation for n64rx
//!
//! `cargo x ci` runs the same steps as the CI job: formatting, clippy, every
//! test suite, doc tests and a compile-only pass over the benchmarks.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::process::Command;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "x")]
#[command(about = "Development automation for n64rx")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Format check, clippy, all test suites, doc tests, bench compile
    Ci {
        /// Print step timings
        #[arg(long)]
        verbose: bool,
    },
    /// Format code (or check formatting)
    Fmt {
        #[arg(long)]
        check: bool,
    },
    /// Run clippy with warnings denied
    Clippy {
        #[arg(long)]
        fix: bool,
    },
    /// Run test suites (all of them when none are named)
    Test {
        /// Suites to run
        #[arg(value_enum)]
        suites: Vec<Suite>,
        /// Run doc tests only
        #[arg(long, conflicts_with = "suites")]
        doc: bool,
    },
    /// Run the criterion benchmarks
    Bench {
        /// Only compile the benchmarks
        #[arg(long)]
        no_run: bool,
        /// Benchmark name filter
        filter: Option<String>,
    },
    /// Run a raw program image through the n64rx runner
    Run {
        /// Program image (big-endian)
        program: String,
        /// Number of cycles to execute
        #[arg(short = 'n', long, default_value = "100000")]
        cycles: u64,
        /// Write an execution trace to this file
        #[arg(long)]
        trace: Option<String>,
        /// Dump the final CPU state as JSON
        #[arg(long)]
        dump_state: Option<String>,
        /// Build in release mode
        #[arg(long)]
        release: bool,
    },
}

/// Test groups, matching the unit-test directories and `tests/`
#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Suite {
    Cpu,
    Memory,
    System,
    /// End-to-end programs in tests/integration_test.rs
    Integration,
    /// Runner binary in tests/cli.rs
    Cli,
}

impl Suite {
    const ALL: [Suite; 5] = [
        Suite::Cpu,
        Suite::Memory,
        Suite::System,
        Suite::Integration,
        Suite::Cli,
    ];

    fn label(self) -> &'static str {
        match self {
            Suite::Cpu => "cpu",
            Suite::Memory => "memory",
            Suite::System => "system",
            Suite::Integration => "integration",
            Suite::Cli => "cli",
        }
    }

    fn command(self) -> Command {
        let mut cmd = cargo("test");
        match self {
            Suite::Cpu => cmd.args(["--lib", "core::cpu"]),
            Suite::Memory => cmd.args(["--lib", "core::memory"]),
            Suite::System => cmd.args(["--lib", "--", "core::system::", "core::save_state"]),
            Suite::Integration => cmd.args(["--test", "integration_test"]),
            Suite::Cli => cmd.args(["--test", "cli"]),
        };
        cmd
    }
}

fn main() -> Result<()> {
    match Cli::parse().command {
        Commands::Ci { verbose } => ci(verbose),
        Commands::Fmt { check } => run(fmt(check)),
        Commands::Clippy { fix } => run(clippy(fix)),
        Commands::Test { suites, doc } => {
            if doc {
                return run(doc_tests());
            }
            let suites = if suites.is_empty() {
                Suite::ALL.to_vec()
            } else {
                suites
            };
            test(&suites, false)
        }
        Commands::Bench { no_run, filter } => {
            let mut cmd = cargo("bench");
            if no_run {
                cmd.arg("--no-run");
            }
            if let Some(filter) = filter {
                cmd.arg("--").arg(filter);
            }
            run(cmd)
        }
        Commands::Run {
            program,
            cycles,
            trace,
            dump_state,
            release,
        } => run_program(&program, cycles, trace, dump_state, release),
    }
}

fn cargo(subcommand: &str) -> Command {
    let mut cmd = Command::new(std::env::var("CARGO").unwrap_or_else(|_| "cargo".into()));
    cmd.arg(subcommand);
    cmd
}

fn fmt(check: bool) -> Command {
    let mut cmd = cargo("fmt");
    cmd.arg("--all");
    if check {
        cmd.args(["--", "--check"]);
    }
    cmd
}

fn clippy(fix: bool) -> Command {
    let mut cmd = cargo("clippy");
    cmd.args(["--workspace", "--all-targets"]);
    if fix {
        cmd.args(["--fix", "--allow-dirty"]);
    } else {
        cmd.args(["--", "-D", "warnings"]);
    }
    cmd
}

fn doc_tests() -> Command {
    let mut cmd = cargo("test");
    cmd.arg("--doc");
    cmd
}

/// Run a command with inherited stdio, failing on a non-zero exit
fn run(mut cmd: Command) -> Result<()> {
    let status = cmd
        .status()
        .with_context(|| format!("failed to spawn {:?}", cmd.get_program()))?;
    if !status.success() {
        bail!("{:?} exited with {}", cmd, status);
    }
    Ok(())
}

/// Run each suite, reporting every failure before returning
fn test(suites: &[Suite], verbose: bool) -> Result<()> {
    let mut failed = Vec::new();
    for &suite in suites {
        if step(&format!("test {}", suite.label()), suite.command(), verbose).is_err() {
            failed.push(suite.label());
        }
    }
    if !failed.is_empty() {
        bail!("failing suites: {}", failed.join(", "));
    }
    Ok(())
}

fn step(name: &str, cmd: Command, verbose: bool) -> Result<()> {
    println!("{} {}", "→".blue(), name.bold());
    let start = Instant::now();
    let result = run(cmd);
    let timing = if verbose {
        format!(" ({:.2}s)", start.elapsed().as_secs_f64())
    } else {
        String::new()
    };
    match &result {
        Ok(()) => println!("{} {}{}\n", "✓".green().bold(), name, timing),
        Err(_) => println!("{} {}{}\n", "✗".red().bold(), name, timing),
    }
    result
}

fn ci(verbose: bool) -> Result<()> {
    println!("{}", "=== n64rx CI ===".bold().blue());
    let start = Instant::now();

    step("fmt --check", fmt(true), verbose)?;
    step("clippy", clippy(false), verbose)?;
    test(&Suite::ALL, verbose)?;
    step("doc tests", doc_tests(), verbose)?;
    let mut bench = cargo("bench");
    bench.arg("--no-run");
    step("bench compile", bench, verbose)?;

    println!(
        "{} {}",
        "✓ CI passed in".green().bold(),
        format!("{:.2}s", start.elapsed().as_secs_f64()).bold()
    );
    Ok(())
}

fn run_program(
    program: &str,
    cycles: u64,
    trace: Option<String>,
    dump_state: Option<String>,
    release: bool,
) -> Result<()> {
    let size = std::fs::metadata(program)
        .with_context(|| format!("program image not found: {}", program))?
        .len();
    if size % 4 != 0 {
        println!(
            "{} {} is {} bytes; the last word is zero-padded",
            "ℹ".blue(),
            program,
            size
        );
    }
    println!(
        "{} {} ({} bytes, {} cycles, {})",
        "→".blue(),
        program.cyan(),
        size,
        cycles,
        if release { "release" } else { "debug" }
    );

    let mut cmd = cargo("run");
    cmd.args(["--bin", "n64rx"]);
    if release {
        cmd.arg("--release");
    }
    cmd.arg("--").arg(program).arg("-n").arg(cycles.to_string());
    if let Some(trace) = trace {
        cmd.arg("--trace").arg(trace);
    }
    if let Some(path) = dump_state {
        cmd.arg("--dump-state").arg(path);
    }
    run(cmd)
}
