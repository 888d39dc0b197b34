use crate::backend::{SaveStatus, ScoreBackend};
use std::sync::{
    mpsc::{self, Receiver, TryRecvError},
    Arc,
};
use tracing::{info, warn};

/// How a best-effort score save settled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    Saved,
    Rejected(SaveStatus),
    Failed(String),
}

/// Hands final scores to the backend on a detached thread.
///
/// At most one attempt per score, no retries; the caller never waits.
#[derive(Clone)]
pub struct ScoreReporter {
    backend: Arc<dyn ScoreBackend>,
}

impl ScoreReporter {
    pub fn new(backend: Arc<dyn ScoreBackend>) -> Self {
        Self { backend }
    }

    pub fn report(&self, wpm: u32) -> PendingReport {
        let (tx, rx) = mpsc::channel();
        let backend = Arc::clone(&self.backend);

        std::thread::spawn(move || {
            let outcome = match backend.save_score(wpm) {
                Ok(SaveStatus::Saved) => {
                    info!(wpm, "score saved");
                    ReportOutcome::Saved
                }
                Ok(status) => {
                    warn!(wpm, %status, "score not saved");
                    ReportOutcome::Rejected(status)
                }
                Err(err) => {
                    warn!(wpm, error = %format!("{err:#}"), "score save failed");
                    ReportOutcome::Failed(err.to_string())
                }
            };
            // receiver may be gone after a restart
            let _ = tx.send(outcome);
        });

        PendingReport {
            rx,
            wpm,
            outcome: None,
        }
    }
}

/// Handle to an in-flight report; polling it never blocks
#[derive(Debug)]
pub struct PendingReport {
    rx: Receiver<ReportOutcome>,
    wpm: u32,
    outcome: Option<ReportOutcome>,
}

impl PendingReport {
    /// Score this report was created for
    pub fn wpm(&self) -> u32 {
        self.wpm
    }

    /// The settled outcome, if the worker has finished
    pub fn poll(&mut self) -> Option<&ReportOutcome> {
        if self.outcome.is_none() {
            match self.rx.try_recv() {
                Ok(outcome) => self.outcome = Some(outcome),
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    self.outcome = Some(ReportOutcome::Failed("reporter exited".to_string()))
                }
            }
        }
        self.outcome.as_ref()
    }

    pub fn is_settled(&mut self) -> bool {
        self.poll().is_some()
    }

    /// Block until settled; only meant for tests and shutdown
    pub fn wait(mut self) -> ReportOutcome {
        if let Some(outcome) = self.outcome.take() {
            return outcome;
        }
        self.rx
            .recv()
            .unwrap_or_else(|_| ReportOutcome::Failed("reporter exited".to_string()))
    }
}
