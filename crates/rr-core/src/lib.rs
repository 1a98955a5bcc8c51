//! Domain model and state store for the research record platform
//!
//! This crate owns the project lifecycle: the typed data model for a clinical
//! research project, the single-project state store with centralized
//! authorization, the stage and status transition rules, the identity/session
//! store, tabular import, and the simulated fixtures that stand in for
//! institutional infrastructure.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod auth;
pub mod error;
pub mod fixtures;
pub mod stage;
pub mod store;
pub mod tabular;
pub mod types;

pub use auth::{authorize, Action, SessionStore};
pub use error::{AccessError, ImportError, StoreError};
pub use store::{
    AnalysisPatch, DataSetPatch, IdeaPatch, ManuscriptPatch, ProjectPatch, ProjectStore,
    ProposalPatch,
};
pub use tabular::{import_csv_file, parse_delimited, DataTable};
pub use types::{
    AiReport, ArticleRequirements, DataSet, EthicsStatus, ExpertKind, IdeationMode,
    JournalSuggestion, Manuscript, ManuscriptStatus, ModuleStage, NoveltyRating, ProjectId,
    Proposal, ResearchIdea, ResearchProject, SectionInfo, StatisticalAnalysis, User, UserId,
    UserRole,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Commonly used types
pub mod prelude {
    pub use crate::auth::{authorize, Action, SessionStore};
    pub use crate::error::{AccessError, ImportError, StoreError};
    pub use crate::store::{
        AnalysisPatch, DataSetPatch, IdeaPatch, ManuscriptPatch, ProjectPatch, ProjectStore,
        ProposalPatch,
    };
    pub use crate::tabular::DataTable;
    pub use crate::types::{
        AiReport, DataSet, EthicsStatus, ExpertKind, IdeationMode, Manuscript, ManuscriptStatus,
        ModuleStage, NoveltyRating, ProjectId, Proposal, ResearchIdea, ResearchProject,
        StatisticalAnalysis, User, UserId, UserRole,
    };
}
