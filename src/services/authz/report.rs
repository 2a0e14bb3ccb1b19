/*
 * Responsibility
 * - 判定エラーを外部の error tracking sink に送る (best-effort)
 * - decision path を block / fail させない (bounded channel + try_send)
 */
use tokio::sync::mpsc::{self, error::TrySendError};

use super::error::CheckError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub request_id: String,
    pub kind: &'static str,
    pub message: String,
}

impl ErrorReport {
    pub fn new(request_id: &str, err: &CheckError) -> Self {
        Self {
            request_id: request_id.to_string(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Error-tracking sink.
///
/// `report` is called on the request path and must return immediately.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, report: ErrorReport);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl ErrorReporter for NoopReporter {
    fn report(&self, _report: ErrorReport) {}
}

/// Queues reports for a background drain task. Drops reports when full.
#[derive(Debug, Clone)]
pub struct BufferedReporter {
    tx: mpsc::Sender<ErrorReport>,
}

impl BufferedReporter {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ErrorReport>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Create the reporter and spawn its drain task on the current runtime.
    pub fn spawn(capacity: usize) -> Self {
        let (reporter, rx) = Self::channel(capacity);
        tokio::spawn(drain(rx));
        reporter
    }
}

impl ErrorReporter for BufferedReporter {
    fn report(&self, report: ErrorReport) {
        match self.tx.try_send(report) {
            Ok(()) => {}
            Err(TrySendError::Full(report)) => {
                tracing::warn!(
                    request_id = %report.request_id,
                    kind = report.kind,
                    "error report buffer full, dropping report"
                );
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!("error report sink closed");
            }
        }
    }
}

/// Forward queued reports to the `error_report` tracing target.
pub async fn drain(mut rx: mpsc::Receiver<ErrorReport>) {
    while let Some(report) = rx.recv().await {
        tracing::info!(
            target: "error_report",
            request_id = %report.request_id,
            kind = report.kind,
            message = %report.message,
            "authorization error"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::authz::error::ValidationFailure;

    fn report(id: &str) -> ErrorReport {
        ErrorReport::new(id, &CheckError::InvalidToken(ValidationFailure::Expired))
    }

    #[test]
    fn report_carries_kind_and_message() {
        let report = report("100");

        assert_eq!(report.request_id, "100");
        assert_eq!(report.kind, "expired");
        assert_eq!(report.message, "invalid token: token expired");
    }

    #[test]
    fn full_buffer_drops_instead_of_blocking() {
        let (reporter, mut rx) = BufferedReporter::channel(1);

        reporter.report(report("1"));
        reporter.report(report("2"));

        assert_eq!(rx.try_recv().map(|r| r.request_id), Ok("1".to_string()));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn closed_sink_is_ignored() {
        let (reporter, rx) = BufferedReporter::channel(4);
        drop(rx);

        reporter.report(report("1"));
    }
}
