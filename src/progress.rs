// Progress payload and sinks

use serde::Serialize;

/// Progress of one pipeline phase. Observational only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobProgress {
    pub phase: String,
    pub current: f64,
    pub total: f64,
    pub percent: f64,
    pub message: String,
}

impl JobProgress {
    /// A zero total counts as complete.
    pub fn new(phase: impl Into<String>, current: f64, total: f64) -> Self {
        let fraction = if total > 0.0 { current / total } else { 1.0 };
        Self {
            phase: phase.into(),
            current,
            total,
            percent: (fraction * 100.0).clamp(0.0, 100.0),
            message: String::new(),
        }
    }

    pub fn with_message(mut self, msg: impl Into<String>) -> Self {
        self.message = msg.into();
        self
    }

    pub fn fraction(&self) -> f64 {
        self.percent / 100.0
    }
}

/// Receives progress events from long-running stages.
pub trait ProgressSink {
    fn report(&self, progress: &JobProgress);
}

/// Writes one log line per event, e.g. `[ 42.0%] Screenshot at 0:01:05`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&self, progress: &JobProgress) {
        log::info!("  [{:5.1}%] {}", progress.percent, progress.message);
    }
}

/// Emit when a sink is present. No-op otherwise.
pub fn emit_progress_opt(sink: Option<&dyn ProgressSink>, progress: &JobProgress) {
    if let Some(sink) = sink {
        sink.report(progress);
    }
}
