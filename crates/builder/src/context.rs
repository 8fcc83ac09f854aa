//! Shared state handed to every package build

use crate::BuildEnvironment;
use depbuild_events::{EventEmitter, EventSender};
use depbuild_net::NetClient;
use depbuild_platform::ProcessOperations;
use std::sync::Arc;

/// Read-only view of the run shared by all packages
#[derive(Clone)]
pub struct BuildContext {
    env: BuildEnvironment,
    client: NetClient,
    runner: Arc<dyn ProcessOperations>,
    event_sender: EventSender,
}

impl BuildContext {
    #[must_use]
    pub fn new(
        env: BuildEnvironment,
        client: NetClient,
        runner: Arc<dyn ProcessOperations>,
        event_sender: EventSender,
    ) -> Self {
        Self {
            env,
            client,
            runner,
            event_sender,
        }
    }

    #[must_use]
    pub fn env(&self) -> &BuildEnvironment {
        &self.env
    }

    #[must_use]
    pub fn client(&self) -> &NetClient {
        &self.client
    }

    /// Channel the run reports progress on
    #[must_use]
    pub fn events(&self) -> &EventSender {
        &self.event_sender
    }

    /// Runner used for `tar` and every build command
    #[must_use]
    pub fn runner(&self) -> &dyn ProcessOperations {
        self.runner.as_ref()
    }
}

impl std::fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildContext")
            .field("env", &self.env)
            .finish_non_exhaustive()
    }
}

impl EventEmitter for BuildContext {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(&self.event_sender)
    }
}
