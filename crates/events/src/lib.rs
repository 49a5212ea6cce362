#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for async communication in liftoff
//!
//! Library crates never print. They log through `tracing` and emit domain
//! events on an optional channel; the CLI decides how to render them.

pub mod events;
pub use events::{AppEvent, DownloadEvent, FailureContext, GeneralEvent, GitEvent};

use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// Type alias for event sender
pub type EventSender = UnboundedSender<AppEvent>;

/// Type alias for event receiver
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<AppEvent>;

/// Create a new event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting events throughout liftoff
///
/// Implemented for the raw `EventSender`, for `Option<EventSender>`, and by
/// any struct that carries one.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Emit an event through this emitter
    fn emit(&self, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            // Ignore send errors - if receiver is dropped, we just continue
            let _ = sender.send(event);
        }
    }

    /// Emit a debug log event
    fn emit_debug(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::debug(message)));
    }

    /// Emit a warning event
    fn emit_warning(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning(message)));
    }

    /// Emit an error event
    fn emit_error(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::error(message)));
    }

    /// Emit an operation started event
    fn emit_operation_started(&self, operation: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::OperationStarted {
            operation: operation.into(),
        }));
    }

    /// Emit an operation completed event
    fn emit_operation_completed(&self, operation: impl Into<String>, success: bool) {
        self.emit(AppEvent::General(GeneralEvent::OperationCompleted {
            operation: operation.into(),
            success,
        }));
    }

    /// Emit a download started event
    fn emit_download_started(&self, url: impl Into<String>, dest: impl Into<PathBuf>) {
        self.emit(AppEvent::Download(DownloadEvent::Started {
            url: url.into(),
            dest: dest.into(),
        }));
    }

    /// Emit an attempt failure
    fn emit_attempt_failed(
        &self,
        url: impl Into<String>,
        attempt: u32,
        max_attempts: u32,
        reason: impl Into<String>,
    ) {
        self.emit(AppEvent::Download(DownloadEvent::AttemptFailed {
            url: url.into(),
            attempt,
            max_attempts,
            reason: reason.into(),
        }));
    }

    /// Emit a download completed event
    fn emit_download_completed(
        &self,
        url: impl Into<String>,
        path: impl Into<PathBuf>,
        size: u64,
        attempts: u32,
        total_time: Duration,
    ) {
        self.emit(AppEvent::Download(DownloadEvent::Completed {
            url: url.into(),
            path: path.into(),
            size,
            attempts,
            total_time,
        }));
    }

    /// Emit a terminal download failure
    fn emit_download_failed(&self, url: impl Into<String>, failure: FailureContext) {
        self.emit(AppEvent::Download(DownloadEvent::Failed {
            url: url.into(),
            failure,
        }));
    }
}

/// Implementation of `EventEmitter` for the raw `EventSender`
impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}

impl EventEmitter for Option<EventSender> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.as_ref()
    }
}
