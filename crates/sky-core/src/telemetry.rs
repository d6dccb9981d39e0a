//! Error reporting
//!
//! The observer session reports failures through an explicit collaborator
//! rather than a process-global hook, so the core carries no implicit
//! dependency on a globally-initialized reporter. The session invokes the
//! reporter exactly once, at its top-level failure boundary.

/// Sink for session-level failures
pub trait ErrorReporter {
    /// Report a failure. Must not panic; reporting is fire-and-forget.
    fn report(&self, error: &dyn std::error::Error);
}

/// Default reporter: emits a structured log event
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, error: &dyn std::error::Error) {
        tracing::error!(error = %error, "observer session failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_reporter_does_not_panic() {
        let err = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        LogReporter.report(&err);
    }
}
