//! # dsbootstrap
//!
//! Reads delegations (or ancestor zones to scan) from the input, checks
//! that their DNS operator signals an authenticated CDS RRset, and prints
//! the DS records to add at the parent.

mod bootstrap;
mod di;
mod runner;

use clap::Parser;
use dsboot_domain::{CliOverrides, QuorumThreshold, SignalingScheme};
use futures::stream::{self, Stream, StreamExt};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

/// Exit status after a forced stop, as a shell reports death by SIGINT.
const FORCED_EXIT_STATUS: i32 = 130;

#[derive(Parser)]
#[command(name = "dsbootstrap")]
#[command(version)]
#[command(about = "Bootstrap DS records from authenticated CDS signals")]
struct Cli {
    /// Path to configuration file
    #[arg(short = 'c', long)]
    config: Option<String>,

    /// Read directives from this file instead of standard input
    #[arg(short = 'i', long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Write DS records to this file instead of standard output
    #[arg(short = 'o', long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Increase verbosity (use twice for debug info)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,

    /// Number of delegations processed concurrently
    #[arg(short = 't', long, value_name = "INT", value_parser = clap::value_parser!(usize))]
    workers: Option<usize>,

    /// Use this validating resolver: IP, IP:PORT, HOST or HOST:PORT
    /// (may be used multiple times)
    #[arg(long = "ns", value_name = "ADDR")]
    ns: Vec<String>,

    /// Nameservers that must signal a delegation: N, "majority" or "all"
    #[arg(long, value_name = "QUORUM")]
    quorum: Option<QuorumThreshold>,

    /// Signaling name layout: "draft-hashed" or "rfc9615"
    #[arg(long, value_name = "SCHEME")]
    scheme: Option<SignalingScheme>,

    /// Dump per-state zone lists to a JSON file
    #[arg(long, value_name = "FILE")]
    dump_stats: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            servers: self.ns.clone(),
            workers: self.workers,
            auth_quorum: self.quorum,
            signaling_scheme: self.scheme,
            verbosity: self.verbose,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = bootstrap::load_config(cli.config.as_deref(), cli.overrides())?;
    bootstrap::init_logging(&config);
    bootstrap::log_config(cli.config.as_deref(), &config);

    let services = di::Services::build(&config).await?;

    let shutdown = CancellationToken::new();
    let on_signal = shutdown.clone();
    tokio::spawn(async move {
        if watch_interrupts(interrupts(), on_signal).await {
            std::process::exit(FORCED_EXIT_STATUS);
        }
    });

    let options = runner::RunOptions {
        input: cli.input,
        output: cli.output,
        on_malformed_input: config.bootstrap.on_malformed_input,
    };
    let stats = runner::run(&services, options, shutdown).await?;

    if let Some(path) = cli.dump_stats.as_deref() {
        runner::dump_stats(path, &stats).await?;
    }

    Ok(())
}

/// One item per Ctrl-C; ends if the handler cannot be installed.
fn interrupts() -> impl Stream<Item = ()> {
    stream::unfold((), |()| async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => Some(((), ())),
            Err(e) => {
                error!(error = %e, "Failed to listen for interrupts");
                None
            }
        }
    })
}

/// The first interrupt cancels `shutdown` so in-flight delegations drain.
/// Returns true on a second interrupt, when the caller should stop at once.
async fn watch_interrupts<S>(interrupts: S, shutdown: CancellationToken) -> bool
where
    S: Stream<Item = ()>,
{
    futures::pin_mut!(interrupts);
    if interrupts.next().await.is_none() {
        return false;
    }
    warn!("Interrupt received, draining in-flight delegations (interrupt again to quit now)");
    shutdown.cancel();

    if interrupts.next().await.is_none() {
        return false;
    }
    warn!("Second interrupt, exiting without waiting for in-flight delegations");
    true
}
