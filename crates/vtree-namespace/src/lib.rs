//! The hierarchical namespace behind vtree.
//!
//! The backing stores are flat: a document collection and a blob
//! collection. This crate builds folders, versioned files, and cascading
//! structural changes on top of them.
//!
//! # Components
//!
//! - [`names`] — name validation against the forbidden character set
//! - [`VersionChain`] — upload, rename, metadata and delete for versioned files;
//!   keeps at most one latest record per path
//! - [`SubtreeEnumerator`] — the closed set of folders and latest files below a path
//! - [`DirectoryOperations`] — create, change-directory, rename (cascading),
//!   delete (cascading), and listing
//!
//! # Consistency
//!
//! The stores offer no multi-document transactions and this crate does not
//! pretend otherwise. Multi-step operations (demote-then-insert on upload,
//! enumerate-then-mutate on rename and delete) can race with concurrent
//! writers. Every step is an idempotent point write, so an interrupted
//! cascade converges when the same call is retried, and
//! [`VersionChain::repair_latest`] restores the single-latest invariant
//! after a lost upload race.

pub mod content;
pub mod directory;
pub mod error;
pub mod names;
pub mod subtree;
pub mod version;

pub use content::ContentSource;
pub use directory::{DirectoryOperations, Listing};
pub use error::{NamespaceError, NamespaceResult, ReservedField};
pub use names::validate_name;
pub use subtree::{Subtree, SubtreeEnumerator};
pub use version::VersionChain;
