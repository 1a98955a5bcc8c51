//! Project state store
//!
//! Holds at most one active project. Every mutating operation authorizes the
//! actor at the boundary, applies a typed patch, bumps `updated_at`, and on
//! failure records the error message in a store-wide slot without touching the
//! project.

use chrono::Utc;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::auth::{authorize, Action};
use crate::error::StoreError;
use crate::stage::{check_ethics_transition, check_manuscript_transition, check_stage_transition};
use crate::types::{
    AiReport, ArticleRequirements, DataSet, EthicsStatus, ExpertKind, IdeationMode, Manuscript,
    ManuscriptStatus, ModuleStage, Proposal, ResearchIdea, ResearchProject, SectionInfo,
    StatisticalAnalysis, User, UserId,
};
use crate::tabular::DataTable;

/// Shallow patch for top-level project fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectPatch {
    /// New title
    pub title: Option<String>,
}

/// Patch for the idea sub-record
///
/// `ai_report` is the one field that deep-merges instead of replacing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdeaPatch {
    /// Core concept text
    pub concept: Option<String>,
    /// Background text
    pub background: Option<String>,
    /// Objective text
    pub objective: Option<String>,
    /// Methodology text
    pub methodology: Option<String>,
    /// Significance text
    pub significance: Option<String>,
    /// Expected outcomes text
    pub expected_outcomes: Option<String>,
    /// Partial AI report, merged field by field
    pub ai_report: Option<AiReport>,
    /// Novelty flag
    pub is_novel: Option<bool>,
    /// Expert assignment flag
    pub expert_assigned: Option<bool>,
    /// Ideation mode
    pub ideation_mode: Option<IdeationMode>,
    /// Numeric novelty score
    pub novelty_score: Option<u8>,
    /// Clear any existing report and score before applying the rest
    ///
    /// Used when the ideation mode changes: a report generated for one mode
    /// must not carry over to another.
    #[serde(default)]
    pub reset_report: bool,
}

/// Patch for the proposal sub-record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProposalPatch {
    /// New title
    pub title: Option<String>,
    /// Replacement section map
    pub sections: Option<IndexMap<String, String>>,
    /// New ethics status (validated against the transition table)
    pub ethics_status: Option<EthicsStatus>,
    /// Committee feedback text
    pub ethics_feedback: Option<String>,
    /// Statistician assignment flag
    pub statistician_assigned: Option<bool>,
    /// Selected study design id
    pub proposal_type: Option<String>,
    /// Sections required for the selected design
    pub required_sections: Option<Vec<SectionInfo>>,
}

/// Patch for the data set sub-record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataSetPatch {
    /// Data set name
    pub name: Option<String>,
    /// Description text
    pub description: Option<String>,
    /// Generated source query
    pub source_query: Option<String>,
    /// Extracted or uploaded table
    pub simulated_data: Option<DataTable>,
    /// Data engineer reviewed flag
    pub data_engineer_reviewed: Option<bool>,
    /// Data engineer approved flag
    pub data_engineer_approved: Option<bool>,
}

/// Patch for the analysis sub-record
///
/// `is_validated` is deliberately absent; validation goes through
/// [`ProjectStore::validate_analysis`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisPatch {
    /// Analysis plan text
    pub plan: Option<String>,
    /// Selected inferential test ids
    pub test_types: Option<Vec<String>>,
    /// Selected descriptive measure ids
    pub measures_to_report: Option<Vec<String>>,
    /// Generated results text
    pub results: Option<String>,
    /// Generated tables (markdown)
    pub tables: Option<String>,
    /// Statistician interpretation notes
    pub statistician_interpretation: Option<String>,
}

/// Patch for the manuscript sub-record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManuscriptPatch {
    /// Working title
    pub title: Option<String>,
    /// Target journal name
    pub target_journal: Option<String>,
    /// Selected article type
    pub article_type: Option<String>,
    /// Journal guidelines
    pub article_requirements: Option<ArticleRequirements>,
    /// Replacement section map
    pub sections: Option<IndexMap<String, String>>,
    /// Reference list text
    pub references: Option<String>,
    /// Keywords
    pub keywords: Option<String>,
    /// New status (validated against the transition table)
    pub status: Option<ManuscriptStatus>,
}

/// The single-project state store
#[derive(Debug, Clone, Default)]
pub struct ProjectStore {
    project: Option<ResearchProject>,
    last_error: Option<String>,
    is_loading: bool,
}

macro_rules! apply_field {
    ($target:expr, $patch:expr, $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = $patch.$field {
                $target.$field = Some(value);
            }
        )+
    };
}

impl ProjectStore {
    /// Create an empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The active project, if any
    #[inline]
    #[must_use]
    pub fn current_project(&self) -> Option<&ResearchProject> {
        self.project.as_ref()
    }

    /// Last recorded error message, if any
    #[inline]
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Whether a long-running operation is in flight
    #[inline]
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Set the loading flag
    pub fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    /// Record an error message (last error wins)
    pub fn set_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(error = %message, "store error recorded");
        self.last_error = Some(message);
    }

    /// Clear the error slot
    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Drop the active project and reset the error/loading flags
    pub fn clear(&mut self) {
        info!("project store cleared");
        self.project = None;
        self.last_error = None;
        self.is_loading = false;
    }

    fn record<T>(&mut self, result: Result<T, StoreError>) -> Result<T, StoreError> {
        if let Err(err) = &result {
            self.set_error(err.to_string());
        }
        result
    }

    /// Start a new project, replacing any active one
    ///
    /// HCP only. The new project starts at the idea stage with the optional
    /// initial idea attached.
    pub fn start_new_project(
        &mut self,
        actor: Option<&User>,
        title: impl Into<String>,
        initial_idea: Option<ResearchIdea>,
    ) -> Result<&ResearchProject, StoreError> {
        let title = title.into();
        let result = (|| {
            authorize(actor, Action::StartProject)?;
            let hcp = actor.ok_or(crate::error::AccessError::NotAuthenticated)?;
            let project = ResearchProject::new(title.clone(), hcp.id.clone(), initial_idea);
            info!(project_id = %project.id, title = %project.title, "started new project");
            Ok(project)
        })();
        let project = self.record(result)?;
        Ok(self.project.insert(project))
    }

    fn with_project<T>(
        &mut self,
        actor: Option<&User>,
        action: Action,
        f: impl FnOnce(&mut ResearchProject) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let result = (|| {
            authorize(actor, action)?;
            let project = self.project.as_mut().ok_or(StoreError::NoActiveProject)?;
            let value = f(project)?;
            project.updated_at = Utc::now();
            Ok(value)
        })();
        self.record(result)
    }

    /// Apply a shallow top-level patch
    pub fn update_project(
        &mut self,
        actor: Option<&User>,
        patch: ProjectPatch,
    ) -> Result<(), StoreError> {
        self.with_project(actor, Action::EditIdea, |project| {
            if let Some(title) = patch.title {
                project.title = title;
            }
            Ok(())
        })
    }

    /// Merge a patch into the idea sub-record, creating it if absent
    pub fn update_idea(&mut self, actor: Option<&User>, patch: IdeaPatch) -> Result<(), StoreError> {
        self.with_project(actor, Action::EditIdea, |project| {
            let idea = project.idea.get_or_insert_with(ResearchIdea::default);
            if patch.reset_report {
                idea.ai_report = None;
                idea.novelty_score = None;
            }
            if let Some(concept) = patch.concept {
                idea.concept = concept;
            }
            apply_field!(
                idea, patch,
                background, objective, methodology, significance, expected_outcomes,
                is_novel, expert_assigned, ideation_mode, novelty_score,
            );
            if let Some(incoming) = patch.ai_report {
                let existing = idea.ai_report.take().unwrap_or_default();
                idea.ai_report = Some(existing.merge(incoming));
            }
            debug!("idea updated");
            Ok(())
        })
    }

    /// Merge a patch into the proposal sub-record, creating it if absent
    pub fn update_proposal(
        &mut self,
        actor: Option<&User>,
        patch: ProposalPatch,
    ) -> Result<(), StoreError> {
        self.with_project(actor, Action::EditProposal, |project| {
            let title = project.title.clone();
            let proposal = project
                .proposal
                .get_or_insert_with(|| Proposal::for_project(&title));
            if let Some(status) = patch.ethics_status {
                check_ethics_transition(proposal.ethics_status, status)?;
                info!(from = %proposal.ethics_status, to = %status, "ethics status changed");
                proposal.ethics_status = status;
            }
            if let Some(t) = patch.title {
                proposal.title = t;
            }
            if let Some(sections) = patch.sections {
                proposal.sections = sections;
            }
            apply_field!(
                proposal, patch,
                ethics_feedback, statistician_assigned, proposal_type, required_sections,
            );
            Ok(())
        })
    }

    /// Merge a patch into the data set sub-record, creating it if absent
    pub fn update_data_set(
        &mut self,
        actor: Option<&User>,
        patch: DataSetPatch,
    ) -> Result<(), StoreError> {
        self.with_project(actor, Action::EditDataSet, |project| {
            let title = project.title.clone();
            let data_set = project
                .data_set
                .get_or_insert_with(|| DataSet::for_project(&title));
            if let Some(name) = patch.name {
                data_set.name = name;
            }
            if let Some(description) = patch.description {
                data_set.description = description;
            }
            apply_field!(
                data_set, patch,
                source_query, simulated_data, data_engineer_reviewed, data_engineer_approved,
            );
            Ok(())
        })
    }

    /// Merge a patch into the analysis sub-record, creating it if absent
    pub fn update_analysis(
        &mut self,
        actor: Option<&User>,
        patch: AnalysisPatch,
    ) -> Result<(), StoreError> {
        self.with_project(actor, Action::EditAnalysis, |project| {
            let analysis = project
                .analysis
                .get_or_insert_with(StatisticalAnalysis::default);
            if let Some(plan) = patch.plan {
                analysis.plan = plan;
            }
            apply_field!(
                analysis, patch,
                test_types, measures_to_report, results, tables, statistician_interpretation,
            );
            Ok(())
        })
    }

    /// Mark the analysis validated (Statistician only)
    pub fn validate_analysis(
        &mut self,
        actor: Option<&User>,
        interpretation: Option<String>,
    ) -> Result<(), StoreError> {
        self.with_project(actor, Action::ValidateAnalysis, |project| {
            let analysis = project
                .analysis
                .as_mut()
                .ok_or(StoreError::MissingRecord("analysis"))?;
            analysis.is_validated = Some(true);
            if interpretation.is_some() {
                analysis.statistician_interpretation = interpretation;
            }
            info!("analysis validated");
            Ok(())
        })
    }

    /// Merge a patch into the manuscript sub-record, creating it if absent
    pub fn update_manuscript(
        &mut self,
        actor: Option<&User>,
        patch: ManuscriptPatch,
    ) -> Result<(), StoreError> {
        self.with_project(actor, Action::EditManuscript, |project| {
            let title = project.title.clone();
            let manuscript = project
                .manuscript
                .get_or_insert_with(|| Manuscript::for_project(&title));
            if let Some(status) = patch.status {
                check_manuscript_transition(manuscript.status, status)?;
                info!(from = %manuscript.status, to = %status, "manuscript status changed");
                manuscript.status = status;
            }
            if let Some(t) = patch.title {
                manuscript.title = t;
            }
            if let Some(sections) = patch.sections {
                manuscript.sections = sections;
            }
            apply_field!(
                manuscript, patch,
                target_journal, article_type, article_requirements, references, keywords,
            );
            Ok(())
        })
    }

    /// Assign a simulated expert and flip the companion flag
    ///
    /// Idempotent: repeating an assignment overwrites with the same values.
    pub fn assign_expert(
        &mut self,
        actor: Option<&User>,
        kind: ExpertKind,
        expert_id: UserId,
    ) -> Result<(), StoreError> {
        self.with_project(actor, Action::AssignExpert, |project| {
            match kind {
                ExpertKind::Researcher => {
                    project.assigned_researcher = Some(expert_id.clone());
                    if let Some(idea) = project.idea.as_mut() {
                        idea.expert_assigned = Some(true);
                    }
                }
                ExpertKind::Statistician => {
                    project.assigned_statistician = Some(expert_id.clone());
                    if let Some(proposal) = project.proposal.as_mut() {
                        proposal.statistician_assigned = Some(true);
                    }
                }
                ExpertKind::DataEngineer => {
                    project.assigned_data_engineer = Some(expert_id.clone());
                }
            }
            info!(kind = ?kind, expert = %expert_id, "expert assigned");
            Ok(())
        })
    }

    /// Move the project to a later (or the same) stage
    ///
    /// Regression is rejected. Sub-records for the destination stage are
    /// lazily initialized and never overwritten if already present.
    pub fn advance_stage(
        &mut self,
        actor: Option<&User>,
        stage: ModuleStage,
    ) -> Result<(), StoreError> {
        self.with_project(actor, Action::AdvanceStage, |project| {
            check_stage_transition(project.current_stage, stage)?;
            let title = project.title.clone();
            match stage {
                ModuleStage::IdeaGeneration => {}
                ModuleStage::ProposalDevelopment => {
                    project
                        .proposal
                        .get_or_insert_with(|| Proposal::for_project(&title));
                }
                ModuleStage::DataCollectionAnalysis => {
                    project
                        .data_set
                        .get_or_insert_with(|| DataSet::for_project(&title));
                    project
                        .analysis
                        .get_or_insert_with(StatisticalAnalysis::default);
                }
                ModuleStage::ManuscriptWriting => {
                    project
                        .manuscript
                        .get_or_insert_with(|| Manuscript::for_project(&title));
                }
            }
            if stage != project.current_stage {
                info!(from = %project.current_stage, to = %stage, "stage advanced");
            }
            project.current_stage = stage;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AccessError;
    use crate::types::UserRole;
    use pretty_assertions::assert_eq;

    fn hcp() -> User {
        User::new("user_hcp_1", "Dr. Alice Smith", UserRole::HealthcareProfessional)
    }

    fn statistician() -> User {
        User::new("user_statistician_1", "Dr. Carol White", UserRole::Statistician)
    }

    fn store_with_project() -> ProjectStore {
        let mut store = ProjectStore::new();
        store
            .start_new_project(Some(&hcp()), "Hypertension Study", None)
            .unwrap();
        store
    }

    #[test]
    fn start_requires_hcp() {
        let mut store = ProjectStore::new();
        let err = store
            .start_new_project(Some(&statistician()), "X", None)
            .unwrap_err();
        assert!(matches!(err, StoreError::Access(AccessError::Forbidden { .. })));
        assert!(store.current_project().is_none());
        assert!(store.last_error().is_some());
    }

    #[test]
    fn start_replaces_active_project() {
        let mut store = store_with_project();
        let first_id = store.current_project().unwrap().id;
        store
            .start_new_project(Some(&hcp()), "Second Study", None)
            .unwrap();
        let project = store.current_project().unwrap();
        assert_ne!(project.id, first_id);
        assert_eq!(project.title, "Second Study");
        assert_eq!(project.current_stage, ModuleStage::IdeaGeneration);
    }

    #[test]
    fn update_without_project_fails() {
        let mut store = ProjectStore::new();
        let err = store
            .update_idea(Some(&hcp()), IdeaPatch::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::NoActiveProject));
        assert_eq!(store.last_error(), Some("no active project"));
    }

    #[test]
    fn idea_patch_creates_and_merges() {
        let mut store = store_with_project();
        store
            .update_idea(
                Some(&hcp()),
                IdeaPatch {
                    concept: Some("Beta blockers in elderly patients".into()),
                    novelty_score: Some(85),
                    ..IdeaPatch::default()
                },
            )
            .unwrap();
        store
            .update_idea(
                Some(&hcp()),
                IdeaPatch {
                    background: Some("Known literature...".into()),
                    ..IdeaPatch::default()
                },
            )
            .unwrap();

        let idea = store.current_project().unwrap().idea.as_ref().unwrap();
        assert_eq!(idea.concept, "Beta blockers in elderly patients");
        assert_eq!(idea.novelty_score, Some(85));
        assert_eq!(idea.background.as_deref(), Some("Known literature..."));
    }

    #[test]
    fn ai_report_deep_merges_across_patches() {
        let mut store = store_with_project();
        store
            .update_idea(
                Some(&hcp()),
                IdeaPatch {
                    ai_report: Some(AiReport {
                        literature_summary: Some("summary".into()),
                        ..AiReport::default()
                    }),
                    ..IdeaPatch::default()
                },
            )
            .unwrap();
        store
            .update_idea(
                Some(&hcp()),
                IdeaPatch {
                    ai_report: Some(AiReport {
                        research_gaps: Some("gaps".into()),
                        ..AiReport::default()
                    }),
                    ..IdeaPatch::default()
                },
            )
            .unwrap();

        let report = store
            .current_project()
            .unwrap()
            .idea
            .as_ref()
            .unwrap()
            .ai_report
            .as_ref()
            .unwrap();
        assert_eq!(report.literature_summary.as_deref(), Some("summary"));
        assert_eq!(report.research_gaps.as_deref(), Some("gaps"));
    }

    #[test]
    fn reset_report_clears_report_and_score() {
        let mut store = store_with_project();
        store
            .update_idea(
                Some(&hcp()),
                IdeaPatch {
                    novelty_score: Some(90),
                    ai_report: Some(AiReport {
                        literature_summary: Some("s".into()),
                        ..AiReport::default()
                    }),
                    ..IdeaPatch::default()
                },
            )
            .unwrap();
        store
            .update_idea(
                Some(&hcp()),
                IdeaPatch {
                    ideation_mode: Some(IdeationMode::AutonomousAi),
                    reset_report: true,
                    ..IdeaPatch::default()
                },
            )
            .unwrap();
        let idea = store.current_project().unwrap().idea.as_ref().unwrap();
        assert!(idea.ai_report.is_none());
        assert!(idea.novelty_score.is_none());
        assert_eq!(idea.ideation_mode, Some(IdeationMode::AutonomousAi));
    }

    #[test]
    fn ethics_transitions_enforced() {
        let mut store = store_with_project();
        store
            .advance_stage(Some(&hcp()), ModuleStage::ProposalDevelopment)
            .unwrap();

        // Approval without submission is rejected
        let err = store
            .update_proposal(
                Some(&hcp()),
                ProposalPatch {
                    ethics_status: Some(EthicsStatus::Approved),
                    ..ProposalPatch::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidEthicsTransition { .. }));

        store
            .update_proposal(
                Some(&hcp()),
                ProposalPatch {
                    ethics_status: Some(EthicsStatus::Submitted),
                    ..ProposalPatch::default()
                },
            )
            .unwrap();
        store
            .update_proposal(
                Some(&hcp()),
                ProposalPatch {
                    ethics_status: Some(EthicsStatus::Approved),
                    ..ProposalPatch::default()
                },
            )
            .unwrap();
        let proposal = store.current_project().unwrap().proposal.as_ref().unwrap();
        assert_eq!(proposal.ethics_status, EthicsStatus::Approved);
    }

    #[test]
    fn failed_patch_leaves_project_untouched() {
        let mut store = store_with_project();
        store
            .advance_stage(Some(&hcp()), ModuleStage::ProposalDevelopment)
            .unwrap();
        let before = store.current_project().unwrap().clone();

        let _ = store.update_proposal(
            Some(&hcp()),
            ProposalPatch {
                title: Some("should not apply".into()),
                ethics_status: Some(EthicsStatus::Approved),
                ..ProposalPatch::default()
            },
        );

        let after = store.current_project().unwrap();
        assert_eq!(after.proposal, before.proposal);
    }

    #[test]
    fn advance_stage_initializes_sub_records() {
        let mut store = store_with_project();
        store
            .advance_stage(Some(&hcp()), ModuleStage::ProposalDevelopment)
            .unwrap();
        let project = store.current_project().unwrap();
        let proposal = project.proposal.as_ref().unwrap();
        assert_eq!(proposal.ethics_status, EthicsStatus::NotSubmitted);

        store
            .advance_stage(Some(&hcp()), ModuleStage::DataCollectionAnalysis)
            .unwrap();
        let project = store.current_project().unwrap();
        assert!(project.data_set.is_some());
        assert!(project.analysis.is_some());

        store
            .advance_stage(Some(&hcp()), ModuleStage::ManuscriptWriting)
            .unwrap();
        let manuscript = store
            .current_project()
            .unwrap()
            .manuscript
            .as_ref()
            .unwrap();
        assert_eq!(manuscript.status, ManuscriptStatus::Drafting);
    }

    #[test]
    fn advance_stage_keeps_existing_records() {
        let mut store = store_with_project();
        store
            .advance_stage(Some(&hcp()), ModuleStage::ProposalDevelopment)
            .unwrap();
        store
            .update_proposal(
                Some(&hcp()),
                ProposalPatch {
                    title: Some("Custom Title".into()),
                    ..ProposalPatch::default()
                },
            )
            .unwrap();
        // Re-entering the same stage must not reset the record
        store
            .advance_stage(Some(&hcp()), ModuleStage::ProposalDevelopment)
            .unwrap();
        let proposal = store.current_project().unwrap().proposal.as_ref().unwrap();
        assert_eq!(proposal.title, "Custom Title");
    }

    #[test]
    fn stage_regression_rejected() {
        let mut store = store_with_project();
        store
            .advance_stage(Some(&hcp()), ModuleStage::DataCollectionAnalysis)
            .unwrap();
        let err = store
            .advance_stage(Some(&hcp()), ModuleStage::IdeaGeneration)
            .unwrap_err();
        assert!(matches!(err, StoreError::StageRegression { .. }));
        assert_eq!(
            store.current_project().unwrap().current_stage,
            ModuleStage::DataCollectionAnalysis
        );
    }

    #[test]
    fn assign_researcher_flips_idea_flag() {
        let mut store = store_with_project();
        store
            .update_idea(Some(&hcp()), IdeaPatch::default())
            .unwrap();
        store
            .assign_expert(
                Some(&hcp()),
                ExpertKind::Researcher,
                UserId::new("user_researcher_1"),
            )
            .unwrap();
        let project = store.current_project().unwrap();
        assert_eq!(
            project.assigned_researcher,
            Some(UserId::new("user_researcher_1"))
        );
        assert_eq!(project.idea.as_ref().unwrap().expert_assigned, Some(true));
    }

    #[test]
    fn assign_statistician_flips_proposal_flag() {
        let mut store = store_with_project();
        store
            .advance_stage(Some(&hcp()), ModuleStage::ProposalDevelopment)
            .unwrap();
        store
            .assign_expert(
                Some(&hcp()),
                ExpertKind::Statistician,
                UserId::new("user_statistician_1"),
            )
            .unwrap();
        // Repeating the assignment is a no-op in effect
        store
            .assign_expert(
                Some(&hcp()),
                ExpertKind::Statistician,
                UserId::new("user_statistician_1"),
            )
            .unwrap();
        let project = store.current_project().unwrap();
        assert_eq!(
            project.assigned_statistician,
            Some(UserId::new("user_statistician_1"))
        );
        assert_eq!(
            project.proposal.as_ref().unwrap().statistician_assigned,
            Some(true)
        );
    }

    #[test]
    fn validate_analysis_statistician_only() {
        let mut store = store_with_project();
        store
            .advance_stage(Some(&hcp()), ModuleStage::DataCollectionAnalysis)
            .unwrap();

        let err = store.validate_analysis(Some(&hcp()), None).unwrap_err();
        assert!(matches!(err, StoreError::Access(_)));

        store
            .validate_analysis(Some(&statistician()), Some("Findings are sound.".into()))
            .unwrap();
        let analysis = store.current_project().unwrap().analysis.as_ref().unwrap();
        assert_eq!(analysis.is_validated, Some(true));
        assert_eq!(
            analysis.statistician_interpretation.as_deref(),
            Some("Findings are sound.")
        );
    }

    #[test]
    fn error_slot_last_wins_and_clears() {
        let mut store = ProjectStore::new();
        store.set_error("first");
        store.set_error("second");
        assert_eq!(store.last_error(), Some("second"));
        store.clear_error();
        assert_eq!(store.last_error(), None);
    }

    #[test]
    fn clear_resets_everything() {
        let mut store = store_with_project();
        store.set_error("boom");
        store.set_loading(true);
        store.clear();
        assert!(store.current_project().is_none());
        assert!(store.last_error().is_none());
        assert!(!store.is_loading());
    }

    #[test]
    fn updated_at_bumps_on_mutation() {
        let mut store = store_with_project();
        let before = store.current_project().unwrap().updated_at;
        std::thread::sleep(std::time::Duration::from_millis(2));
        store
            .update_idea(
                Some(&hcp()),
                IdeaPatch {
                    concept: Some("x".into()),
                    ..IdeaPatch::default()
                },
            )
            .unwrap();
        assert!(store.current_project().unwrap().updated_at > before);
    }
}
