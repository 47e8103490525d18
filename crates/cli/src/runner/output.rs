use anyhow::Context;
use dsboot_domain::DsRecord;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::warn;

/// Single writer for DS records. A file target is written to a hidden
/// sibling and renamed into place by `finish`, so readers never see a
/// partial file.
pub struct OutputSink {
    writer: BufWriter<Box<dyn AsyncWrite + Send + Unpin>>,
    target: Option<(PathBuf, PathBuf)>,
}

impl OutputSink {
    pub fn stdout() -> Self {
        Self {
            writer: BufWriter::new(Box::new(tokio::io::stdout())),
            target: None,
        }
    }

    pub async fn create(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::stdout());
        };
        let tmp = temporary_sibling(path);
        let file = File::create(&tmp)
            .await
            .with_context(|| format!("Failed to create {}", tmp.display()))?;
        Ok(Self {
            writer: BufWriter::new(Box::new(file)),
            target: Some((tmp, path.to_path_buf())),
        })
    }

    /// Writes one delegation's DS set in a single buffered write.
    pub async fn write_records(&mut self, records: &[DsRecord]) -> anyhow::Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let block: String = records.iter().map(|r| format!("{}\n", r)).collect();
        self.writer
            .write_all(block.as_bytes())
            .await
            .context("Failed to write DS records")?;
        Ok(())
    }

    pub async fn finish(mut self) -> anyhow::Result<()> {
        self.writer.flush().await.context("Failed to flush output")?;
        if let Some((tmp, path)) = self.target.take() {
            self.writer
                .get_mut()
                .shutdown()
                .await
                .context("Failed to close output")?;
            tokio::fs::rename(&tmp, &path)
                .await
                .with_context(|| format!("Failed to move output into {}", path.display()))?;
        }
        Ok(())
    }

    /// Drops the temporary file of a run that did not complete.
    pub async fn abandon(mut self) {
        if let Some((tmp, _)) = self.target.take() {
            if let Err(e) = tokio::fs::remove_file(&tmp).await {
                warn!(path = %tmp.display(), error = %e, "Failed to remove partial output");
            }
        }
    }
}

/// Writes `contents` to `path` through the same temporary-then-rename
/// step as the record output.
pub async fn write_atomically(path: &Path, contents: &[u8]) -> anyhow::Result<()> {
    let tmp = temporary_sibling(path);
    tokio::fs::write(&tmp, contents)
        .await
        .with_context(|| format!("Failed to write {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("Failed to move {} into place", path.display()))?;
    Ok(())
}

fn temporary_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    path.with_file_name(format!(".{}.{}.tmp", name, std::process::id()))
}
