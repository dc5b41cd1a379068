//! # Service Lifecycle State Machine
//!
//! ```text
//!                 BeginInit          InitSucceeded
//! [Registered] ─────────────→ [Initializing] ─────────────→ [Started] ⇄ [Degraded]
//!                                   │                          │            │
//!                                   │ InitFailed               │ HealthFailed
//!                                   ↓                          ↓            │
//!                               [Failed] ←─────────────────────┴────────────┘
//!                                   │
//!                                   │ Stop (also from Started / Degraded)
//!                                   ↓
//!                               [Stopped]
//! ```
//!
//! Every (state, event) pair is handled. Pairs not drawn above are rejected
//! with [`InvalidTransition`].

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse status of a service instance inside the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleState {
    Registered,
    Initializing,
    Started,
    Degraded,
    Stopped,
    Failed,
}

/// Inputs that drive the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleEvent {
    BeginInit,
    InitSucceeded,
    InitFailed,
    HealthDegraded,
    HealthRecovered,
    HealthFailed,
    Stop,
    Deregister,
}

/// Rejected (state, event) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid lifecycle transition: {event:?} while {from:?}")]
pub struct InvalidTransition {
    pub from: LifecycleState,
    pub event: LifecycleEvent,
}

impl LifecycleState {
    /// Apply `event`, returning the next state.
    ///
    /// `Deregister` never changes state; it is accepted from every state except
    /// `Initializing` so the container can validate removal with the same table.
    pub fn transition(self, event: LifecycleEvent) -> Result<Self, InvalidTransition> {
        use LifecycleEvent as E;
        use LifecycleState as S;

        let next = match (self, event) {
            (S::Registered, E::BeginInit) => S::Initializing,
            (S::Initializing, E::InitSucceeded) => S::Started,
            (S::Initializing, E::InitFailed) => S::Failed,
            (S::Started, E::HealthDegraded) | (S::Degraded, E::HealthDegraded) => S::Degraded,
            (S::Degraded, E::HealthRecovered) | (S::Started, E::HealthRecovered) => S::Started,
            (S::Started, E::HealthFailed) | (S::Degraded, E::HealthFailed) => S::Failed,
            (S::Started, E::Stop) | (S::Degraded, E::Stop) | (S::Failed, E::Stop) => S::Stopped,
            (state, E::Deregister) if state != S::Initializing => state,
            (from, event) => return Err(InvalidTransition { from, event }),
        };
        Ok(next)
    }

    /// Stopped and Failed entries may be replaced by a new registration.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Stopped | Self::Failed)
    }

    /// States whose capabilities remain discoverable.
    #[must_use]
    pub fn is_discoverable(self) -> bool {
        matches!(self, Self::Initializing | Self::Started | Self::Degraded)
    }

    /// States in which a capability may be published.
    #[must_use]
    pub fn accepts_capabilities(self) -> bool {
        matches!(self, Self::Initializing | Self::Started)
    }

    /// States that satisfy a dependent's start precondition.
    #[must_use]
    pub fn satisfies_dependency(self) -> bool {
        matches!(self, Self::Started | Self::Degraded)
    }

    /// Whether the service is serving traffic.
    #[must_use]
    pub fn is_running(self) -> bool {
        matches!(self, Self::Started | Self::Degraded)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Outcome of a bulk start.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartReport {
    /// Services that reached Started, in the order they got there.
    pub started: Vec<String>,
    /// Services whose initialization failed, with the reason.
    pub failed: Vec<(String, String)>,
    /// Services not attempted, with the reason (failed dependency, terminal state).
    pub skipped: Vec<(String, String)>,
}

impl StartReport {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty()
    }

    /// Position of `name` in the started sequence.
    #[must_use]
    pub fn start_position(&self, name: &str) -> Option<usize> {
        self.started.iter().position(|s| s == name)
    }
}
