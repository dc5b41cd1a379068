//! # Shared Bus - Kernel Event Bus
//!
//! Carries lifecycle, capability and compliance events between kernel
//! components and their background workers.
//!
//! ```text
//! ┌──────────────────┐                    ┌───────────────────┐
//! │ LifecycleContainer│                   │ ComplianceEngine  │
//! │ CapabilityRegistry│    publish()      │ scanner task      │
//! │                   │ ──────┐           │                   │
//! └──────────────────┘       │           └───────────────────┘
//!                            ▼                    ↑
//!                      ┌──────────────┐          │
//!                      │  Event Bus   │ ─────────┘
//!                      └──────────────┘  subscribe()
//! ```
//!
//! Publication is fire-and-forget. Registries never wait on subscribers, so a
//! slow scanner cannot stall the registration hot path; it lags and catches up
//! with a full rescan instead.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{EventFilter, EventTopic, KernelEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, EventSubscriber, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
