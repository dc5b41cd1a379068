//! Rule implementations.
//!
//! | Rule | Kind | Severity |
//! |------|------|----------|
//! | `empty_contracts` | structural | Error |
//! | `blank_field` | structural | Error |
//! | `contract_kind_mismatch` | structural | Error |
//! | `contract_shape` | structural | Error |
//! | `invalid_version` | structural | Error |
//! | `tenant_scope_mismatch` | structural | Error |
//! | `non_standard_realm` | structural | Warning |
//! | `self_constructed_dependency` | corpus | Warning |
//! | `protocol_drift` | corpus | Warning |
//! | `orphaned_capability` | corpus | Warning |

pub mod corpus;
pub mod structural;

pub use corpus::CorpusScan;
pub use structural::{StructuralValidator, ALLOWED_METHODS};
