//! Raw record log.

use crate::{Record, Result};
use tokio::io::{AsyncWrite, AsyncWriteExt};


/// Writes each [`Record`] on its own line, exactly as it was received.
///
/// The writer is flushed after every record so that a log file stays usable if the process is
/// interrupted mid-session.
///
/// # Examples
///
/// Basic usage:
///
/// ```rust
/// # tokio_test::block_on(async {
/// use eyetracker::{Record, RecordLog};
///
/// let mut log = RecordLog::new(Vec::new());
/// log.write(&Record::new(&b"<REC CNT=\"1\" />"[..])).await.unwrap();
/// log.write(&Record::new(&b"<REC CNT=\"2\" />"[..])).await.unwrap();
///
/// assert_eq!(log.records_written(), 2);
/// assert_eq!(log.into_inner(), b"<REC CNT=\"1\" />\n<REC CNT=\"2\" />\n");
/// # });
/// ```
#[derive(Debug)]
pub struct RecordLog<W> {
    writer: W,
    written: u64,
}

impl<W> RecordLog<W>
where
    W: AsyncWrite + Unpin,
{
    /// Creates a new [`RecordLog`] writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Appends the `record` to the log.
    ///
    /// # Errors
    ///
    /// Returns an error if the record could not be written or flushed.
    pub async fn write(&mut self, record: &Record) -> Result<()> {
        self.writer.write_all(record.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        self.written += 1;
        Ok(())
    }

    /// Returns the number of records written so far.
    pub fn records_written(&self) -> u64 {
        self.written
    }

    /// Consumes the log, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
