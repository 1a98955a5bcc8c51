//! Stage workflows for the research lifecycle
//!
//! Each lifecycle stage gets a workflow struct that is generic over an
//! [`rr_gemini::AiGateway`], builds the stage's prompts, decodes and
//! validates AI output, and commits results through the
//! [`rr_core::ProjectStore`]. Workflows also own the per-stage notification
//! banner and the stage-advance prerequisites.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod chat;
pub mod data;
pub mod error;
pub mod idea;
pub mod manuscript;
pub mod notify;
pub mod proposal;

pub use chat::{ChatMessage, ChatSession, MessageId, Sender};
pub use data::{DataWorkflow, GraphRequest};
pub use error::WorkflowError;
pub use idea::{AutonomousIdea, IdeaWorkflow, SearchCriteria, NOVELTY_THRESHOLD};
pub use manuscript::{ArticleType, JournalFilter, ManuscriptWorkflow};
pub use notify::{Notification, Severity};
pub use proposal::ProposalWorkflow;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Commonly used types
pub mod prelude {
    pub use crate::chat::ChatSession;
    pub use crate::data::DataWorkflow;
    pub use crate::error::WorkflowError;
    pub use crate::idea::IdeaWorkflow;
    pub use crate::manuscript::ManuscriptWorkflow;
    pub use crate::notify::{Notification, Severity};
    pub use crate::proposal::ProposalWorkflow;
}
