//! Error types for the core domain

use thiserror::Error;

use crate::auth::Action;
use crate::types::{EthicsStatus, ManuscriptStatus, ModuleStage, UserRole};

/// Authorization failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// No user is logged in
    #[error("not authenticated")]
    NotAuthenticated,

    /// The actor's role does not permit the action
    #[error("role {role} is not permitted to {action}")]
    Forbidden {
        /// Role of the acting user
        role: UserRole,
        /// Action that was denied
        action: Action,
    },
}

/// Project store failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Authorization failed
    #[error(transparent)]
    Access(#[from] AccessError),

    /// No active project to mutate
    #[error("no active project")]
    NoActiveProject,

    /// Stage regression attempted
    #[error("cannot move from stage '{from}' back to '{to}'")]
    StageRegression {
        /// Current stage
        from: ModuleStage,
        /// Requested earlier stage
        to: ModuleStage,
    },

    /// Ethics status transition not in the allowed table
    #[error("invalid ethics transition from '{from}' to '{to}'")]
    InvalidEthicsTransition {
        /// Current status
        from: EthicsStatus,
        /// Requested status
        to: EthicsStatus,
    },

    /// Manuscript status transition not in the allowed table
    #[error("invalid manuscript transition from '{from}' to '{to}'")]
    InvalidManuscriptTransition {
        /// Current status
        from: ManuscriptStatus,
        /// Requested status
        to: ManuscriptStatus,
    },

    /// Operation requires a sub-record that is missing
    #[error("project has no {0} record")]
    MissingRecord(&'static str),
}

/// Tabular import failures
#[derive(Debug, Error)]
pub enum ImportError {
    /// Input had a header but no usable data rows
    #[error("CSV must have a header and at least one data row")]
    EmptyOrMalformed,

    /// File name does not end in .csv
    #[error("unsupported file type: {0} (expected .csv)")]
    UnsupportedFileType(String),

    /// Underlying file read failed
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
}
