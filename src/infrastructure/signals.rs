//! OS signal interception.
//!
//! SIGINT and SIGTERM (ctrl-c elsewhere) cancel the shared shutdown token.
//! The launcher races [`SignalHandler::listen`] against the command loop, so
//! the signal path and the quit command end in the same
//! [`Supervisor::shutdown`](crate::services::Supervisor::shutdown).

use std::fmt;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Interrupt,
    Terminate,
}

impl ShutdownSignal {
    /// Conventional exit status for a process ended by this signal.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Interrupt => 130,
            Self::Terminate => 143,
        }
    }
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupt => f.write_str("SIGINT"),
            Self::Terminate => f.write_str("SIGTERM"),
        }
    }
}

pub struct SignalHandler {
    token: CancellationToken,
}

impl SignalHandler {
    pub fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Resolve on the first interrupt or termination signal, after
    /// cancelling the shutdown token.
    pub async fn listen(&self) -> anyhow::Result<ShutdownSignal> {
        let signal = Self::wait_for_signal().await?;
        tracing::info!(signal = %signal, "Received shutdown signal");
        self.token.cancel();
        Ok(signal)
    }

    #[cfg(unix)]
    async fn wait_for_signal() -> anyhow::Result<ShutdownSignal> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut interrupt = signal(SignalKind::interrupt())?;
        let mut terminate = signal(SignalKind::terminate())?;

        tokio::select! {
            _ = interrupt.recv() => Ok(ShutdownSignal::Interrupt),
            _ = terminate.recv() => Ok(ShutdownSignal::Terminate),
        }
    }

    #[cfg(not(unix))]
    async fn wait_for_signal() -> anyhow::Result<ShutdownSignal> {
        tokio::signal::ctrl_c().await?;
        Ok(ShutdownSignal::Interrupt)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use nix::sys::signal::{raise, Signal};
    use std::time::Duration;

    #[tokio::test]
    async fn test_sigterm_cancels_token() {
        let token = CancellationToken::new();
        let handler = SignalHandler::new(token.clone());

        let listen = tokio::spawn(async move { handler.listen().await });
        // Give the listener time to install its handlers before raising.
        tokio::time::sleep(Duration::from_millis(100)).await;
        raise(Signal::SIGTERM).expect("raise SIGTERM");

        let signal = tokio::time::timeout(Duration::from_secs(5), listen)
            .await
            .expect("listener should resolve")
            .expect("listener task")
            .expect("signal registration");
        assert_eq!(signal, ShutdownSignal::Terminate);
        assert!(token.is_cancelled());
    }
}
