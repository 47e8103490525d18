use anyhow::Context;
use dsboot_domain::{Directive, MalformedInputPolicy};
use futures::stream::{self, Stream};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{error, warn};

type Source = Box<dyn AsyncBufRead + Send + Unpin>;

/// Read error that ended a directive stream early. The stream fills it in;
/// the runner checks it once the stream is drained.
#[derive(Clone, Default)]
pub struct ReadFailure(Arc<Mutex<Option<anyhow::Error>>>);

impl ReadFailure {
    fn set(&self, error: anyhow::Error) {
        let mut slot = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(error);
    }

    pub fn take(&self) -> Option<anyhow::Error> {
        self.0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }
}

/// Reads directives line by line. Input is treated as bytes and decoded
/// lossily, so a stray Latin-1 octet spoils one line at most.
pub struct DirectiveReader {
    source: Source,
    policy: MalformedInputPolicy,
    line_number: usize,
    skipped: usize,
    buf: Vec<u8>,
}

impl DirectiveReader {
    pub fn new<R>(source: R, policy: MalformedInputPolicy) -> Self
    where
        R: AsyncBufRead + Send + Unpin + 'static,
    {
        Self {
            source: Box::new(source),
            policy,
            line_number: 0,
            skipped: 0,
            buf: Vec::with_capacity(256),
        }
    }

    /// Reads `path`, or stdin when no path is given.
    pub async fn open(path: Option<&Path>, policy: MalformedInputPolicy) -> anyhow::Result<Self> {
        match path {
            Some(path) => {
                let file = tokio::fs::File::open(path)
                    .await
                    .with_context(|| format!("Failed to open input {}", path.display()))?;
                Ok(Self::new(BufReader::new(file), policy))
            }
            None => Ok(Self::new(BufReader::new(tokio::io::stdin()), policy)),
        }
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Next directive, or `None` at end of input. Blank and comment lines
    /// are passed over; malformed lines follow the configured policy.
    pub async fn next_directive(&mut self) -> anyhow::Result<Option<Directive>> {
        loop {
            self.buf.clear();
            let read = self
                .source
                .read_until(b'\n', &mut self.buf)
                .await
                .context("Failed to read input")?;
            if read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let line = String::from_utf8_lossy(&self.buf);
            match Directive::parse_line(&line, self.line_number) {
                Ok(Some(directive)) => return Ok(Some(directive)),
                Ok(None) => continue,
                Err(e) => match self.policy {
                    MalformedInputPolicy::Skip => {
                        warn!(line = self.line_number, error = %e, "Skipping malformed input line");
                        self.skipped += 1;
                    }
                    MalformedInputPolicy::Abort => return Err(e.into()),
                },
            }
        }
    }

    /// Reads the whole input up front, so a malformed line fails the run
    /// before any query goes out.
    pub async fn read_all(mut self) -> anyhow::Result<Vec<Directive>> {
        let mut directives = Vec::new();
        while let Some(directive) = self.next_directive().await? {
            directives.push(directive);
        }
        Ok(directives)
    }

    /// Streams directives as they are read. A read error ends the stream
    /// and is left in the returned `ReadFailure`.
    pub fn into_stream(self) -> (impl Stream<Item = Directive> + Send + 'static, ReadFailure) {
        let failure = ReadFailure::default();
        let slot = failure.clone();
        let directives = stream::unfold(self, move |mut reader| {
            let slot = slot.clone();
            async move {
                match reader.next_directive().await {
                    Ok(Some(directive)) => Some((directive, reader)),
                    Ok(None) => {
                        if reader.skipped() > 0 {
                            warn!(skipped = reader.skipped(), "Malformed input lines were skipped");
                        }
                        None
                    }
                    Err(e) => {
                        error!(line = reader.line_number + 1, error = %e, "Input ended early");
                        slot.set(e);
                        None
                    }
                }
            }
        });
        (directives, failure)
    }
}

/// Reader whose every read fails, standing in for a device that goes away.
#[cfg(test)]
pub(crate) struct FailingRead;

#[cfg(test)]
impl tokio::io::AsyncRead for FailingRead {
    fn poll_read(
        self: std::pin::Pin<&mut Self>,
        _cx: &mut std::task::Context<'_>,
        _buf: &mut tokio::io::ReadBuf<'_>,
    ) -> std::task::Poll<std::io::Result<()>> {
        std::task::Poll::Ready(Err(std::io::Error::other("device unplugged")))
    }
}
