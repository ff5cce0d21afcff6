//! Error types for the linehist core library.
//!
//! Each subsystem has its own error type derived with `thiserror`, and a
//! top-level [`CoreError`] enum unifies them for callers that want a single
//! error type. Merge conflicts are not errors in this sense; see
//! [`crate::merge::MergeConflict`].

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Unified error type for the entire core library.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Annotate(#[from] AnnotateError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// History errors
// ---------------------------------------------------------------------------

/// Errors from the revision graph and content store collaborators.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// No revision with this id is known.
    #[error("revision not found: {0}")]
    RevisionNotFound(String),

    /// A revision with this id was already recorded.
    #[error("duplicate revision: {0}")]
    DuplicateRevision(String),

    /// A revision names a parent that has not been recorded.
    #[error("revision '{revision}' names unknown parent '{parent}'")]
    UnknownParent {
        revision: String,
        parent: String,
    },

    /// The path does not exist in the revision.
    #[error("path '{path}' not found in revision {revision}")]
    PathNotFound {
        revision: String,
        path: String,
    },

    /// No content is stored under this file id.
    #[error("file content not found: {0}")]
    FileNotFound(String),

    /// The history manifest could not be parsed.
    #[error("history manifest parse error: {0}")]
    ManifestParse(String),

    /// The history manifest parsed but describes an impossible history.
    #[error("invalid history manifest: {0}")]
    ManifestInvalid(String),

    /// Generic I/O error reading a manifest or its sources.
    #[error("history I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Annotate errors
// ---------------------------------------------------------------------------

/// Errors from the annotate traversal.
///
/// An attribution that could not be completed is not an error; it is
/// reported on [`crate::annotate::AnnotateReport::complete`].
#[derive(Debug, Error)]
pub enum AnnotateError {
    /// A collaborator lookup failed.
    #[error("annotate history error: {0}")]
    History(#[from] HistoryError),

    /// A parent edge claims the file changed but the parent has no file at
    /// the edge's path.
    #[error("edge {revision} -> {parent} marks '{path}' modified but the parent has no such file")]
    MalformedEdge {
        revision: String,
        parent: String,
        path: String,
    },
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// A config value is invalid.
    #[error("invalid configuration value for '{field}': {detail}")]
    InvalidValue {
        field: String,
        detail: String,
    },

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
