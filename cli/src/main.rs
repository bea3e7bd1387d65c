//! Tribunal host CLI.
//!
//! Loads configuration, runs one claim through the standard pipeline, and
//! prints each step as it settles followed by the verdict.
//!
//! Usage:
//!   tribunal review "The sky is blue." --config tribunal.toml
//!   tribunal parse --file reply.txt
//!   echo '{"adversarial_verdict":"PASS"}' | tribunal parse
//!
//! Exit codes: 0 PROCEED (or PASS), 2 HALT (or FAIL), 1 configuration or
//! input error.

use std::{
    io::Read,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use tribunal_config::TribunalConfig;
use tribunal_contracts::{
    error::{TribunalError, TribunalResult},
    run::SessionSnapshot,
    step::StepStatus,
    verdict::Verdict,
};
use tribunal_session::TribunalSession;
use tribunal_witness::{ParsedVerdict, VerdictParser};

const EXIT_HALT: u8 = 2;

// ── CLI definition ────────────────────────────────────────────────────────────

/// Tribunal: fail-closed claim verification.
#[derive(Parser)]
#[command(
    name = "tribunal",
    about = "Fail-closed claim verification pipeline",
    long_about = "Runs a claim through an ordered pipeline of verification steps.\n\
                  Any failure, error, or unreadable oracle reply halts the claim."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Review one claim with the standard five-step pipeline.
    Review {
        /// The claim under review.
        claim: String,
        /// TOML configuration file. TRIBUNAL_* environment variables override it.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Decode an oracle reply offline and print the verdict.
    Parse {
        /// File holding the reply. Reads stdin when omitted.
        #[arg(long)]
        file: Option<PathBuf>,
        /// Treat the input as a full chat-completion response body.
        #[arg(long)]
        envelope: bool,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> ExitCode {
    // Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Review { claim, config } => review(&claim, config.as_deref()).await,
        Command::Parse { file, envelope } => parse(file.as_deref(), envelope),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("tribunal: {e}");
            ExitCode::FAILURE
        }
    }
}

// ── review ────────────────────────────────────────────────────────────────────

async fn review(claim: &str, config_path: Option<&Path>) -> TribunalResult<ExitCode> {
    let config = TribunalConfig::load(config_path)?;
    debug!(oracle = ?config.oracle, "configuration loaded");

    let session = TribunalSession::from_config(&config)?;
    let mut rx = session.subscribe();
    let run_id = session.start(claim)?;

    println!();
    println!("Tribunal review {run_id}");
    println!("Claim: {claim}");
    println!();

    // Print each step once, when it settles.
    let mut printed = 0;
    let outcome = loop {
        let snapshot = rx.borrow_and_update().clone();
        if snapshot.run_id != Some(run_id) {
            break None;
        }
        printed = print_settled(&snapshot, printed);
        if snapshot.verdict.is_some() {
            break Some(snapshot);
        }
        if rx.changed().await.is_err() {
            break None;
        }
    };

    let snapshot = outcome.ok_or_else(|| TribunalError::Superseded {
        generation: session.snapshot().generation,
    })?;

    println!();
    let verdict = snapshot.verdict.unwrap_or(Verdict::Halt);
    println!("Verdict: {verdict}");
    if let Some(reason) = &snapshot.failure_reason {
        println!("Reason:  {reason}");
    }
    if let Some(log) = session.last_audit_log() {
        println!("Transcript: {} events, terminal hash {}", log.events.len(), log.terminal_hash);
    }
    println!();

    Ok(match verdict {
        Verdict::Proceed => ExitCode::SUCCESS,
        Verdict::Halt => ExitCode::from(EXIT_HALT),
    })
}

/// Print steps `from..` that have settled, in order. Returns the index of
/// the first step not printed yet.
fn print_settled(snapshot: &SessionSnapshot, from: usize) -> usize {
    let mut next = from;
    for (index, step) in snapshot.steps.iter().enumerate().skip(from) {
        if !step.status.is_terminal() {
            break;
        }
        let marker = match step.status {
            StepStatus::Completed => "+",
            StepStatus::Failed => "x",
            _ => "-",
        };
        println!("  [{marker}] {:<22} {}", step.label, step.status.label());
        next = index + 1;
    }
    next
}

// ── parse ─────────────────────────────────────────────────────────────────────

fn parse(file: Option<&Path>, envelope: bool) -> TribunalResult<ExitCode> {
    let raw = read_input(file)?;
    let parsed: ParsedVerdict = if envelope {
        VerdictParser::parse_response(&raw)
    } else {
        VerdictParser::parse(&raw)
    };

    if parsed.is_pass() {
        println!("PASS");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("FAIL: {}", parsed.reason.as_deref().unwrap_or_default());
        Ok(ExitCode::from(EXIT_HALT))
    }
}

fn read_input(file: Option<&Path>) -> TribunalResult<String> {
    match file {
        Some(path) => std::fs::read_to_string(path).map_err(|e| TribunalError::Config {
            reason: format!("failed to read '{}': {e}", path.display()),
        }),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| TribunalError::Config {
                    reason: format!("failed to read stdin: {e}"),
                })?;
            Ok(buf)
        }
    }
}
