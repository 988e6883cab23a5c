//! Background readers for a running process's stdout and stderr.
//!
//! One reader task per stream. A reader ends only when its stream reports
//! end-of-file, which normally happens when the process exits. A grandchild
//! that inherited the pipe can keep it open past that point; [`OutputStreamer::finish`]
//! bounds the wait and aborts whatever is still blocked.

use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;

use crate::domain::models::{OutputLine, Role, StreamKind};
use crate::domain::ports::OutputSink;

/// Reader tasks attached to one running process.
pub struct OutputStreamer {
    role: Role,
    readers: Vec<JoinHandle<()>>,
}

impl OutputStreamer {
    /// Spawn one reader per provided stream.
    pub fn attach<O, E>(
        role: Role,
        stdout: Option<O>,
        stderr: Option<E>,
        sink: Arc<dyn OutputSink>,
    ) -> Self
    where
        O: AsyncRead + Unpin + Send + 'static,
        E: AsyncRead + Unpin + Send + 'static,
    {
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = stdout {
            readers.push(Self::spawn_reader(role, StreamKind::Stdout, stdout, sink.clone()));
        }
        if let Some(stderr) = stderr {
            readers.push(Self::spawn_reader(role, StreamKind::Stderr, stderr, sink));
        }
        Self { role, readers }
    }

    fn spawn_reader<R>(
        role: Role,
        stream: StreamKind,
        reader: R,
        sink: Arc<dyn OutputSink>,
    ) -> JoinHandle<()>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        tokio::spawn(async move {
            let mut lines = BufReader::new(reader).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => sink.forward(OutputLine::new(role, stream, line)),
                    Ok(None) => break,
                    Err(e) => {
                        tracing::debug!(role = %role, stream = %stream, error = %e, "Output reader stopped");
                        break;
                    }
                }
            }
            tracing::trace!(role = %role, stream = %stream, "Output reader reached end of stream");
        })
    }

    /// Number of reader tasks that have not finished yet.
    pub fn active_readers(&self) -> usize {
        self.readers.iter().filter(|r| !r.is_finished()).count()
    }

    /// Wait up to `drain` for every reader to reach end of stream, then abort
    /// the rest. Returns `true` when all readers ended on their own.
    pub async fn finish(self, drain: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + drain;
        let mut clean = true;

        for mut reader in self.readers {
            match tokio::time::timeout_at(deadline, &mut reader).await {
                Ok(_) => {}
                Err(_) => {
                    clean = false;
                    reader.abort();
                }
            }
        }

        if !clean {
            tracing::warn!(
                role = %self.role,
                drain_ms = drain.as_millis() as u64,
                "Output stream still open after process exit; reader abandoned"
            );
        }
        clean
    }
}
