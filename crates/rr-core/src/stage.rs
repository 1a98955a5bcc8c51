//! Lifecycle transition rules
//!
//! Explicit allowed-transition tables for the project stage machine and the
//! two sub-record status machines. The store consults these before applying
//! any status change.

use crate::error::StoreError;
use crate::types::{EthicsStatus, ManuscriptStatus, ModuleStage};

/// Valid next statuses for an ethics review state
///
/// `Rejected` is declared for parity with committee vocabulary but is not
/// reachable through any workflow transition.
#[must_use]
pub fn allowed_ethics_transitions(from: EthicsStatus) -> &'static [EthicsStatus] {
    match from {
        EthicsStatus::NotSubmitted => &[EthicsStatus::Submitted],
        EthicsStatus::Submitted => &[EthicsStatus::FeedbackReceived, EthicsStatus::Approved],
        EthicsStatus::FeedbackReceived => &[EthicsStatus::Submitted],
        EthicsStatus::Approved => &[],
        EthicsStatus::Rejected => &[],
    }
}

/// Valid next statuses for a manuscript state
#[must_use]
pub fn allowed_manuscript_transitions(from: ManuscriptStatus) -> &'static [ManuscriptStatus] {
    match from {
        ManuscriptStatus::Drafting => &[ManuscriptStatus::ReadyForSubmission],
        ManuscriptStatus::Review => &[ManuscriptStatus::ReadyForSubmission],
        ManuscriptStatus::ReadyForSubmission => &[],
    }
}

/// Validate an ethics status change, allowing no-op re-assertion
pub fn check_ethics_transition(
    from: EthicsStatus,
    to: EthicsStatus,
) -> Result<(), StoreError> {
    if from == to || allowed_ethics_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(StoreError::InvalidEthicsTransition { from, to })
    }
}

/// Validate a manuscript status change, allowing no-op re-assertion
pub fn check_manuscript_transition(
    from: ManuscriptStatus,
    to: ManuscriptStatus,
) -> Result<(), StoreError> {
    if from == to || allowed_manuscript_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(StoreError::InvalidManuscriptTransition { from, to })
    }
}

/// Validate a stage change: forward or same-stage only
///
/// Prerequisite completeness (ethics approval, validated analysis) is the
/// workflows' responsibility; the store only enforces direction.
pub fn check_stage_transition(from: ModuleStage, to: ModuleStage) -> Result<(), StoreError> {
    if to >= from {
        Ok(())
    } else {
        Err(StoreError::StageRegression { from, to })
    }
}
