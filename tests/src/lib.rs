//! # Curator Kernel Test Suite
//!
//! Cross-component tests that run against a fully assembled
//! [`kernel_runtime::Kernel`].
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs        # Kernel builders, recording services, definitions
//! └── integration/
//!     ├── scenarios.rs   # Acceptance scenarios
//!     ├── versioning.rs  # Overwrite and downgrade policies
//!     ├── security.rs    # Authorization and tenancy
//!     ├── lifecycle.rs   # Health, failure propagation, deregistration
//!     └── compliance.rs  # Background scanning and violation queries
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ck-tests
//! cargo test -p ck-tests integration::scenarios::
//! cargo bench -p ck-tests
//! ```

pub mod fixtures;
pub mod integration;
