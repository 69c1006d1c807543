//! Newline-delimited JSON writer.

use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};

use crate::errors::OutputError;
use crate::models::{ArticleRecord, BodyKey};
use crate::utils::ensure_parent_dir;

/// Appends one record per line to any async writer.
#[derive(Debug)]
pub struct JsonlWriter<W> {
    inner: W,
    written: usize,
}

impl<W: AsyncWrite + Unpin> JsonlWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    /// Serialize `record` with its body under `key`, write it as one line and flush.
    pub async fn append(&mut self, record: &ArticleRecord, key: BodyKey) -> Result<(), OutputError> {
        let mut line = serde_json::to_string(&record.as_line(key))?;
        line.push('\n');
        self.inner.write_all(line.as_bytes()).await?;
        self.inner.flush().await?;
        self.written += 1;
        debug!(url = %record.url, written = self.written, "Record written");
        Ok(())
    }

    /// Records written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl JsonlWriter<BufWriter<File>> {
    /// Create (or truncate) `path`, creating missing parent directories first.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn create(path: &Path) -> Result<Self, OutputError> {
        let open_err = |source| OutputError::Open {
            path: path.display().to_string(),
            source,
        };
        ensure_parent_dir(path).await.map_err(open_err)?;
        let file = File::create(path).await.map_err(open_err)?;
        info!("Output file ready");
        Ok(Self::new(BufWriter::new(file)))
    }
}
