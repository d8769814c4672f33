//! Signal utilities and constants.

/// Signals that end the timer the same way the quit key does
pub const SHUTDOWN_SIGNALS: [i32; 3] = [
    signal_hook::consts::SIGTERM,
    signal_hook::consts::SIGHUP,
    signal_hook::consts::SIGINT,
];

/// Build a signal stream for async handling of shutdown signals.
///
/// # Errors
///
/// Returns an error if signal registration fails
pub fn build_signal_stream() -> anyhow::Result<signal_hook_tokio::Signals> {
    let signals = signal_hook_tokio::Signals::new(SHUTDOWN_SIGNALS)?;
    Ok(signals)
}
