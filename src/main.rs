// SPDX-License-Identifier: MIT

use clap::Parser;
use orgadd::{onboard, report, OnboardRequest, RunOutcome};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

#[derive(Parser)]
#[command(
    name = "orgadd",
    about = "Add an organization to the MVDS data-space configuration corpus",
    version,
    after_help = "Exit codes:\n  \
        0  success (including dry run)\n  \
        2  usage error\n  \
        3  validation failure\n  \
        4  organization already onboarded\n  \
        5  registry corrupt\n  \
        6  patch failure (rollback already performed)\n  \
        1  unexpected I/O failure\n\n\
        Concurrent runs against the same corpus are not coordinated; ensure\n\
        exclusive access for the duration of a run."
)]
struct Args {
    /// Organization name (lowercase alphanumeric, starts with a letter, 3-63 chars)
    #[arg(long)]
    org_name: String,

    /// Business Partner Number (BPNL + 12 digits). Allocated if omitted.
    #[arg(long)]
    bpn: Option<String>,

    /// Human-readable display name. Title-cased org name if omitted.
    #[arg(long)]
    display_name: Option<String>,

    /// Data-space domain (e.g. example.com)
    #[arg(long)]
    domain: String,

    /// Corpus root containing deployment/ and data-sharing/
    #[arg(long, env = "ORGADD_ROOT", default_value = ".")]
    root: PathBuf,

    /// Preview changes as diffs without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Suppress the report; errors still go to stderr
    #[arg(long, short = 'q')]
    quiet: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Init once — must happen before any tracing calls.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .compact()
        .init();

    let request = OnboardRequest {
        org_name: &args.org_name,
        bpn: args.bpn.as_deref(),
        display_name: args.display_name.as_deref(),
        domain: &args.domain,
        dry_run: args.dry_run,
    };

    match onboard(&args.root, &request) {
        Ok((record, outcome)) => {
            if !args.quiet {
                let rendered = match &outcome {
                    RunOutcome::Preview(changes) => report::render_preview(&record, changes),
                    RunOutcome::Applied { changes, backups } => {
                        report::render_summary(&record, changes, backups)
                    }
                };
                print!("{rendered}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "onboarding failed");
            eprintln!("error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
