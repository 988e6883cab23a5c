//! Line input for the command loop.
//!
//! Reading stdin blocks, so it happens on a plain OS thread that forwards
//! lines into a bounded channel. The thread is never joined; it ends at end
//! of input, when the receiver is dropped, or with the process.

use std::io::{self, BufRead};
use tokio::sync::mpsc;

/// Lines buffered between the reader thread and the command loop.
pub const INPUT_BUFFER: usize = 16;

/// Forward stdin lines into a channel.
pub fn spawn_stdin_reader() -> io::Result<mpsc::Receiver<String>> {
    spawn_line_reader(io::BufReader::new(io::stdin()), INPUT_BUFFER)
}

/// Forward every line of `reader` into a channel from a dedicated thread.
///
/// The channel closes at end of input or on the first read error.
pub fn spawn_line_reader<R>(reader: R, buffer: usize) -> io::Result<mpsc::Receiver<String>>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(buffer.max(1));
    std::thread::Builder::new()
        .name("devsup-input".to_string())
        .spawn(move || {
            for line in reader.lines() {
                match line {
                    Ok(line) => {
                        if tx.blocking_send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, "Input read failed");
                        break;
                    }
                }
            }
            tracing::debug!("Input reader finished");
        })?;
    Ok(rx)
}
