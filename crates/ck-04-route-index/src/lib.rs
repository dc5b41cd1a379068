//! # Route Index
//!
//! A derived, read-only view of the capability registry keyed by
//! `(realm, domain, service_name)`. Every entry corresponds to exactly one
//! live capability; the registry updates it synchronously inside each
//! registration call.
//!
//! ## Domain derivation
//!
//! | Source | Example | Domain |
//! |--------|---------|--------|
//! | explicit `domain` | `insights` | `insights` |
//! | semantic API | `/api/v1/content-pillar/upload` | `content` |
//! | fallback | realm `journey` | `journey` |

pub mod domain;
pub mod index;

pub use domain::*;
pub use index::RouteIndex;
