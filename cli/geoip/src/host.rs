//! NDJSON host loop: reads records, runs them through a transform, writes them back.

use anyhow::{Context, Result};
use gf_traits::Transform;
use gf_types::Record;
use std::future::Future;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

/// Counters for one host run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostStats {
    /// Lines read, including blank and invalid ones
    pub lines_read: u64,

    /// Lines dropped because they were not JSON objects
    pub invalid_lines: u64,

    /// Records written
    pub records_written: u64,

    /// Batches passed through the transform
    pub batches: u64,
}

/// Drives records from a line reader through a [`Transform`] into a writer.
///
/// Records are grouped into batches of `batch_size`. A partial batch is
/// flushed when input ends or the shutdown future resolves.
pub struct Host<'a> {
    transform: &'a dyn Transform,
    batch_size: usize,
}

impl<'a> Host<'a> {
    pub fn new(transform: &'a dyn Transform, batch_size: usize) -> Self {
        Self {
            transform,
            batch_size: batch_size.max(1),
        }
    }

    /// Runs until end of input or shutdown.
    ///
    /// Only I/O failures on the reader or writer are returned as errors.
    pub async fn run<R, W, S>(&self, mut reader: R, mut writer: W, shutdown: S) -> Result<HostStats>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
        S: Future<Output = ()>,
    {
        let mut stats = HostStats::default();
        let mut line = Vec::new();
        let mut batch = Vec::with_capacity(self.batch_size);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    info!("Shutdown requested, flushing pending records");
                    break;
                }

                read = reader.read_until(b'\n', &mut line) => {
                    if read.context("Failed to read input")? == 0 {
                        debug!("End of input");
                        break;
                    }
                    stats.lines_read += 1;

                    match parse_line(&line, stats.lines_read) {
                        ParsedLine::Record(record) => batch.push(record),
                        ParsedLine::Invalid => stats.invalid_lines += 1,
                        ParsedLine::Blank => {}
                    }
                    line.clear();

                    if batch.len() >= self.batch_size {
                        self.flush(&mut batch, &mut writer, &mut stats).await?;
                    }
                }
            }
        }

        self.flush(&mut batch, &mut writer, &mut stats).await?;
        writer.flush().await.context("Failed to flush output")?;

        Ok(stats)
    }

    async fn flush<W>(
        &self,
        batch: &mut Vec<Record>,
        writer: &mut W,
        stats: &mut HostStats,
    ) -> Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        if batch.is_empty() {
            return Ok(());
        }

        let records = self.transform.apply(std::mem::take(batch));
        stats.batches += 1;

        let mut buf = Vec::with_capacity(records.len() * 128);
        for record in &records {
            serde_json::to_writer(&mut buf, record).context("Failed to serialize record")?;
            buf.push(b'\n');
        }

        writer
            .write_all(&buf)
            .await
            .context("Failed to write output")?;
        stats.records_written += records.len() as u64;

        Ok(())
    }
}

/// Outcome of reading one input line.
enum ParsedLine {
    Record(Record),
    Blank,
    Invalid,
}

/// Parses one raw input line as a record.
///
/// Blank lines are skipped silently; anything that is not a UTF-8 JSON object
/// is logged and dropped.
fn parse_line(raw: &[u8], line_number: u64) -> ParsedLine {
    let text = match std::str::from_utf8(raw) {
        Ok(text) => text.trim(),
        Err(e) => {
            warn!(line = line_number, error = %e, "Dropping input line that is not valid UTF-8");
            return ParsedLine::Invalid;
        }
    };
    if text.is_empty() {
        return ParsedLine::Blank;
    }

    match serde_json::from_str::<Record>(text) {
        Ok(record) => ParsedLine::Record(record),
        Err(e) => {
            warn!(line = line_number, error = %e, "Dropping input line that is not a JSON object");
            ParsedLine::Invalid
        }
    }
}
