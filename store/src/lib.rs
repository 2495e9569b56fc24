//! ToolStore - JSON-file persistence for the toolshed
//!
//! Two building blocks, both rooted in a data directory owned by the caller:
//!
//! - [`JsonStore`] - a whole-file JSON array store with a read-all / mutate /
//!   write-all cycle serialized by an advisory file lock, so concurrent
//!   writers never lose updates.
//! - [`ArtifactStore`] - a flat directory of text artifacts with path
//!   containment: reads reject any relative path that resolves outside the
//!   store root.
//!
//! # Layout
//!
//! ```text
//! <base-dir>/
//! ├── registry.json    # JsonStore<ToolDefinition>
//! ├── history.json     # JsonStore<HistoryRecord>
//! └── data/            # ArtifactStore root
//!     ├── my_tool_20250101_120000.txt
//!     └── ...
//! ```

mod artifact;
mod error;
mod store;

pub use artifact::ArtifactStore;
pub use error::StoreError;
pub use store::JsonStore;
