//! Identity, sessions and authorization
//!
//! Role selection stands in for authentication: logging in as a role yields
//! that role's fixture persona. All permission checks funnel through
//! [`authorize`] so the role matrix lives in exactly one place.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AccessError;
use crate::fixtures;
use crate::types::{User, UserRole};

/// Store-level actions subject to authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Start a new project
    StartProject,
    /// Edit the idea sub-record
    EditIdea,
    /// Edit the proposal sub-record
    EditProposal,
    /// Edit the data set sub-record
    EditDataSet,
    /// Edit the analysis sub-record
    EditAnalysis,
    /// Mark the analysis validated
    ValidateAnalysis,
    /// Edit the manuscript sub-record
    EditManuscript,
    /// Assign a simulated expert
    AssignExpert,
    /// Advance the lifecycle stage
    AdvanceStage,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Action::StartProject => "start a project",
            Action::EditIdea => "edit the research idea",
            Action::EditProposal => "edit the proposal",
            Action::EditDataSet => "edit the data set",
            Action::EditAnalysis => "edit the analysis",
            Action::ValidateAnalysis => "validate the analysis",
            Action::EditManuscript => "edit the manuscript",
            Action::AssignExpert => "assign an expert",
            Action::AdvanceStage => "advance the project stage",
        };
        f.write_str(s)
    }
}

/// Roles permitted to perform an action
#[must_use]
pub fn permitted_roles(action: Action) -> &'static [UserRole] {
    use UserRole::*;
    match action {
        Action::StartProject => &[HealthcareProfessional],
        Action::EditIdea | Action::EditProposal | Action::EditManuscript => {
            &[HealthcareProfessional, ExperiencedResearcher]
        }
        Action::EditDataSet | Action::EditAnalysis => {
            &[HealthcareProfessional, ExperiencedResearcher, Statistician]
        }
        Action::ValidateAnalysis => &[Statistician],
        Action::AssignExpert | Action::AdvanceStage => &[
            HealthcareProfessional,
            ExperiencedResearcher,
            Statistician,
            DataEngineer,
            Administrator,
        ],
    }
}

/// Check whether the actor may perform the action
///
/// `None` means no session; every action requires authentication.
pub fn authorize(actor: Option<&User>, action: Action) -> Result<(), AccessError> {
    let user = actor.ok_or(AccessError::NotAuthenticated)?;
    if permitted_roles(action).contains(&user.role) {
        Ok(())
    } else {
        Err(AccessError::Forbidden {
            role: user.role,
            action,
        })
    }
}

/// Current login session
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    current: Option<User>,
}

impl SessionStore {
    /// Create an empty (logged-out) session store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Log in as the fixture persona for the role
    pub fn login(&mut self, role: UserRole) -> &User {
        let user = fixtures::user_for_role(role);
        info!(user = %user.name, role = %role, "user logged in");
        self.current.insert(user)
    }

    /// End the current session
    pub fn logout(&mut self) {
        if let Some(user) = self.current.take() {
            info!(user = %user.name, "user logged out");
        }
    }

    /// The logged-in user, if any
    #[inline]
    #[must_use]
    pub fn current_user(&self) -> Option<&User> {
        self.current.as_ref()
    }

    /// Whether a user is logged in
    #[inline]
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }
}
