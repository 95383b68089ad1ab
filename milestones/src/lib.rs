//! Active milestone registry for the project's build configuration.
//!
//! The registry maps release milestone numbers to the branch metadata the
//! build configuration consumes. This crate owns the record types, the two
//! editing operations (activate / deactivate), and the on-disk JSON form.
//!
//! ```text
//! milestones.json ──read_registry──▶ MilestoneRegistry ──add/remove──▶ write_registry
//! ```
//!
//! The registry is keyed by [`MilestoneNumber`] internally and is always kept
//! in ascending numeric order; the decimal string keys only exist in the
//! serialized file.

#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod error;
pub mod io;
pub mod record;
pub mod registry;

pub use error::{MilestoneError, ParseMilestoneError, Result};
pub use io::{RegistryIoError, read_registry, to_json_string, write_registry};
pub use record::{DEFAULT_PLATFORMS, MilestoneNumber, MilestoneRecord, REF_PREFIX};
pub use registry::MilestoneRegistry;

/// Location of the registry file relative to the repository root.
pub const DEFAULT_REGISTRY_RELATIVE_PATH: &str = "infra/config/global/milestones.json";

/// Build the default registry path for a repository root.
pub fn default_registry_path(repo_root: &std::path::Path) -> std::path::PathBuf {
    repo_root.join(DEFAULT_REGISTRY_RELATIVE_PATH)
}
