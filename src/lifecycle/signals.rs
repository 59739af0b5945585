//! OS signal handling.
//!
//! SIGTERM and SIGINT both request a graceful stop. On non-unix targets only
//! Ctrl-C is observed.

/// Which signal ended the wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopSignal {
    Interrupt,
    Terminate,
}

/// Wait until the process is asked to stop.
pub async fn wait_for_stop_signal() -> std::io::Result<StopSignal> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                res?;
                Ok(StopSignal::Interrupt)
            }
            _ = terminate.recv() => Ok(StopSignal::Terminate),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        Ok(StopSignal::Interrupt)
    }
}
