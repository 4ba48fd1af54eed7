//! ngm-git - git plumbing for the nested git manager
//!
//! This crate turns git's machine-readable output into typed records and
//! runs git across many repositories at once.
//!
//! # Features
//!
//! - Predicate-driven text scanner ([`scan`])
//! - `git status --porcelain=v2 -b` parser ([`status`])
//! - Unified diff parser ([`diff`])
//! - Repository discovery with an on-disk index ([`discovery`])
//! - Bounded parallel execution with per-repository results ([`tasks`])
//!
//! # Example
//!
//! ```no_run
//! use ngm_git::{GitCli, Repository};
//! use std::path::Path;
//!
//! let repo = Repository::fetch(&GitCli::new(), Path::new(".")).unwrap();
//! println!("{} {}", repo.status.branch.summary(), repo.status.glance());
//! ```

pub mod backend;
pub mod diff;
pub mod discovery;
pub mod error;
pub mod repo;
pub mod scan;
pub mod status;
pub mod tasks;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use backend::{GitBackend, GitCli};
pub use diff::{parse_diff, FileDiff};
pub use discovery::{find_repositories, DiscoveryCache, DiscoveryOptions, IndexDiff};
pub use error::{GitError, GitResult};
pub use repo::{fetch_all, Repository};
pub use status::{parse_status, Branch, Change, ChangeKind, Status, UnmergedChange, Upstream};
pub use tasks::{NoopObserver, TaskObserver, TaskRunner};
