//! Execution context handed to filters, and the pipeline's outbound
//! status channel.
//!
//! The context tells a filter which phase it is running in, gives it a
//! fire-and-forget message channel to report status and progress on, and
//! carries the shared cancellation flag. Messages are never used for
//! synchronization; a host may subscribe or ignore them freely.

use crossbeam_channel::Sender;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Result, VoxelPipeError};

/// Which pass of the two-phase execution contract is running.
///
/// Preflight performs every lookup, type, and shape check and creates the
/// output arrays execution will need, but no numeric computation. Execute
/// runs the same plan with computation committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Preflight,
    Execute,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Preflight => write!(f, "preflight"),
            Phase::Execute => write!(f, "execute"),
        }
    }
}

/// Fire-and-forget status messages emitted while a pipeline runs.
#[derive(Debug, Clone)]
pub enum PipelineMessage {
    FilterStarted {
        index: usize,
        name: String,
        phase: Phase,
    },
    FilterStatus {
        index: usize,
        name: String,
        message: String,
    },
    FilterProgress {
        index: usize,
        name: String,
        percent: f32,
    },
    FilterCompleted {
        index: usize,
        name: String,
        phase: Phase,
    },
    FilterFailed {
        index: usize,
        name: String,
        code: i32,
        message: String,
    },
    /// Every filter passed preflight; execution may begin.
    PreflightPassed { filter_count: usize },
    /// Every filter executed.
    PipelineCompleted { filter_count: usize },
    /// The run stopped at `index` because the cancel flag was set.
    PipelineCanceled { index: usize },
}

/// Per-invocation context handed to [`Filter::plan`](crate::filter::Filter::plan).
///
/// Cheap to construct; the pipeline builds a fresh one for every filter
/// call. Tests can build one directly with [`FilterContext::new`].
#[derive(Debug, Clone)]
pub struct FilterContext {
    phase: Phase,
    index: usize,
    name: String,
    status_tx: Option<Sender<PipelineMessage>>,
    cancel: Arc<AtomicBool>,
}

impl FilterContext {
    /// A context with no listener and a fresh, unset cancel flag.
    pub fn new(phase: Phase, index: usize, name: impl Into<String>) -> Self {
        Self {
            phase,
            index,
            name: name.into(),
            status_tx: None,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Attach a status listener channel.
    pub fn with_listener(mut self, tx: Sender<PipelineMessage>) -> Self {
        self.status_tx = Some(tx);
        self
    }

    /// Share a cancel flag owned by the host or pipeline.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_preflight(&self) -> bool {
        self.phase == Phase::Preflight
    }

    pub fn is_execute(&self) -> bool {
        self.phase == Phase::Execute
    }

    /// Position of the running filter in its pipeline.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Whether the host has requested cancellation.
    pub fn is_canceled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Cancellation is cooperative: filters call this between expensive
    /// inner-loop iterations (per slice in a volume) and bail out early.
    pub fn check_canceled(&self) -> Result<()> {
        if self.is_canceled() {
            Err(VoxelPipeError::Canceled)
        } else {
            Ok(())
        }
    }

    /// Report a human-readable status line.
    pub fn update_status(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(filter = %self.name, "{}", message);
        if let Some(tx) = &self.status_tx {
            let _ = tx.send(PipelineMessage::FilterStatus {
                index: self.index,
                name: self.name.clone(),
                message,
            });
        }
    }

    /// Report progress in percent (0–100).
    pub fn update_progress(&self, percent: f32) {
        if let Some(tx) = &self.status_tx {
            let _ = tx.send(PipelineMessage::FilterProgress {
                index: self.index,
                name: self.name.clone(),
                percent,
            });
        }
    }
}
