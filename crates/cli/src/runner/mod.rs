pub mod input;
pub mod output;

use crate::di::Services;
use dsboot_domain::{Directive, MalformedInputPolicy, ScanStats};
use futures::stream::{self, BoxStream, StreamExt};
use input::{DirectiveReader, ReadFailure};
use output::OutputSink;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub struct RunOptions {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub on_malformed_input: MalformedInputPolicy,
}

/// Feeds the input through the bootstrap pipeline and writes every DS set
/// as it completes. Cancelling `shutdown` stops reading input; delegations
/// already in flight still finish and are written.
///
/// An input read error ends the run like an interrupt does, but the run
/// then fails so the exit status shows that input was left unprocessed.
pub async fn run(
    services: &Services,
    options: RunOptions,
    shutdown: CancellationToken,
) -> anyhow::Result<ScanStats> {
    let reader = DirectiveReader::open(options.input.as_deref(), options.on_malformed_input).await?;
    let (directives, failure): (BoxStream<'static, Directive>, ReadFailure) =
        match options.on_malformed_input {
            MalformedInputPolicy::Abort => (
                stream::iter(reader.read_all().await?).boxed(),
                ReadFailure::default(),
            ),
            MalformedInputPolicy::Skip => {
                let (directives, failure) = reader.into_stream();
                (directives.boxed(), failure)
            }
        };

    let sink = OutputSink::create(options.output.as_deref()).await?;
    drive(services, directives, failure, sink, shutdown).await
}

async fn drive(
    services: &Services,
    directives: BoxStream<'static, Directive>,
    failure: ReadFailure,
    mut sink: OutputSink,
    shutdown: CancellationToken,
) -> anyhow::Result<ScanStats> {
    let directives = directives.take_until(shutdown.clone().cancelled_owned());
    let mut outcomes = Arc::clone(&services.bootstrap).run(directives);
    let mut stats = ScanStats::new();

    while let Some(outcome) = outcomes.next().await {
        stats.record(&outcome);
        if let Err(e) = sink.write_records(outcome.records()).await {
            sink.abandon().await;
            return Err(e);
        }
    }
    sink.finish().await?;

    if shutdown.is_cancelled() {
        warn!("Interrupted: remaining input was not processed");
    }
    info!(
        delegations = stats.total(),
        records = stats.records_emitted(),
        "Finished. Here are some stats:\n{}",
        stats.report()
    );

    if let Some(e) = failure.take() {
        return Err(e.context(format!(
            "input ended early after {} delegations; the rest was not processed",
            stats.total()
        )));
    }
    Ok(stats)
}

/// Writes the per-state zone lists as JSON.
pub async fn dump_stats(path: &Path, stats: &ScanStats) -> anyhow::Result<()> {
    let dump = serde_json::json!({
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "total": stats.total(),
        "stats": stats,
    });
    let body = serde_json::to_vec_pretty(&dump)?;
    output::write_atomically(path, &body).await?;
    info!(path = %path.display(), "Statistics written");
    Ok(())
}
