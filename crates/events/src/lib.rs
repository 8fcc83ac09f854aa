#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for async communication in depbuild
//!
//! Library crates never print. Everything an operator should see (package
//! banners, download progress, the commands being run) travels as an
//! [`AppEvent`] over an unbounded channel and is rendered by the CLI.

pub mod events;
pub use events::{
    AppEvent, BuildEvent, DownloadEvent, FailureContext, GeneralEvent, PackageEvent, PackageStage,
};

use tokio::sync::mpsc::UnboundedSender;

/// Type alias for event sender using the `AppEvent` system
pub type EventSender = UnboundedSender<AppEvent>;

/// Type alias for event receiver using the `AppEvent` system
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<AppEvent>;

/// Create a new event channel with the `AppEvent` system
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting events throughout depbuild
///
/// Implemented for a raw [`EventSender`] and for any struct that carries one.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Emit an event through this emitter
    fn emit(&self, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            // Receiver gone means nobody is rendering; the build carries on.
            let _ = sender.send(event);
        }
    }

    /// Emit a warning event
    fn emit_warning(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning(message)));
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

    /// Emit the banner that precedes each package build
    fn emit_package_banner(&self, name: impl Into<String>) {
        self.emit(AppEvent::Package(PackageEvent::Banner { name: name.into() }));
    }

    /// Emit a package stage transition
    fn emit_package_stage(&self, name: impl Into<String>, stage: PackageStage) {
        self.emit(AppEvent::Package(PackageEvent::StageChanged {
            name: name.into(),
            stage,
        }));
    }
}

impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}
