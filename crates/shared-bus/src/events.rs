//! # Kernel Events
//!
//! Every state change inside the kernel is announced on the bus so that
//! background workers (compliance scanner, operators' dashboards) can react
//! without polling the registries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{CapabilityKey, ComplianceFinding, LifecycleState, TenantScope};

/// Component tag of the lifecycle container.
pub const SOURCE_LIFECYCLE: &str = "lifecycle-container";
/// Component tag of the capability registry.
pub const SOURCE_REGISTRY: &str = "capability-registry";
/// Component tag of the compliance engine.
pub const SOURCE_COMPLIANCE: &str = "compliance-engine";

/// All events that can be published to the event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum KernelEvent {
    // =========================================================================
    // LIFECYCLE CONTAINER
    // =========================================================================
    /// A service instance entered the container.
    ServiceRegistered {
        name: String,
        dependencies: Vec<String>,
        tenant_scope: TenantScope,
    },

    /// A service moved between lifecycle states.
    ServiceStateChanged {
        name: String,
        from: LifecycleState,
        to: LifecycleState,
        at: DateTime<Utc>,
    },

    /// A service was removed from the container.
    ServiceDeregistered { name: String },

    // =========================================================================
    // CAPABILITY REGISTRY
    // =========================================================================
    /// A capability was inserted or superseded. Ignored downgrades are not announced.
    CapabilityRegistered {
        key: CapabilityKey,
        service_name: String,
        version: String,
        /// Version replaced by this registration, if any.
        previous_version: Option<String>,
    },

    /// A capability left the registry.
    CapabilityRemoved {
        key: CapabilityKey,
        service_name: String,
    },

    // =========================================================================
    // COMPLIANCE ENGINE
    // =========================================================================
    /// A finding was recorded.
    ComplianceFindingRaised(ComplianceFinding),

    // =========================================================================
    // CRITICAL EVENTS (DLQ)
    // =========================================================================
    /// Critical error requiring operator attention.
    CriticalError { component: String, error: String },
}

impl KernelEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::ServiceRegistered { .. }
            | Self::ServiceStateChanged { .. }
            | Self::ServiceDeregistered { .. } => EventTopic::Lifecycle,
            Self::CapabilityRegistered { .. } | Self::CapabilityRemoved { .. } => {
                EventTopic::Capability
            }
            Self::ComplianceFindingRaised(_) => EventTopic::Compliance,
            Self::CriticalError { .. } => EventTopic::DeadLetterQueue,
        }
    }

    /// Get the originating component.
    #[must_use]
    pub fn source_component(&self) -> &str {
        match self {
            Self::ServiceRegistered { .. }
            | Self::ServiceStateChanged { .. }
            | Self::ServiceDeregistered { .. } => SOURCE_LIFECYCLE,
            Self::CapabilityRegistered { .. } | Self::CapabilityRemoved { .. } => SOURCE_REGISTRY,
            Self::ComplianceFindingRaised(_) => SOURCE_COMPLIANCE,
            Self::CriticalError { component, .. } => component,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Service registration and state changes.
    Lifecycle,
    /// Capability registration and removal.
    Capability,
    /// Compliance findings.
    Compliance,
    /// Dead Letter Queue for critical errors.
    DeadLetterQueue,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Source components to include. Empty means all sources.
    pub source_components: Vec<String>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            source_components: Vec::new(),
        }
    }

    /// Create a filter for events from specific components.
    #[must_use]
    pub fn from_components(components: Vec<String>) -> Self {
        Self {
            topics: Vec::new(),
            source_components: components,
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &KernelEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let source = event.source_component();
        let source_match =
            self.source_components.is_empty() || self.source_components.iter().any(|s| s == source);

        topic_match && source_match
    }
}
