//! Core domain types for the research lifecycle
//!
//! Defines the aggregate root and its sub-records:
//! - User identity and roles
//! - Research project with its ordered module stages
//! - Stage-specific sub-records (idea, proposal, data set, analysis, manuscript)

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::tabular::DataTable;

/// Unique project identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProjectId(pub Ulid);

impl ProjectId {
    /// Generate new project ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for ProjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// User identifier
///
/// Fixture users carry stable, human-readable ids; synthesized users derive
/// theirs from the selected role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    /// Create a user id from any string-like value
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Platform roles
///
/// Selected at login; there is no real authentication behind them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserRole {
    /// Initiates and conducts research projects
    HealthcareProfessional,
    /// Provides mentorship and methodological input
    ExperiencedResearcher,
    /// Defines analysis plans and validates outputs
    Statistician,
    /// Reviews and approves data queries, manages data access
    DataEngineer,
    /// Manages platform settings and users
    Administrator,
}

impl UserRole {
    /// Human-readable role label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            UserRole::HealthcareProfessional => "Healthcare Professional (HCP)",
            UserRole::ExperiencedResearcher => "Experienced Researcher",
            UserRole::Statistician => "Statistician",
            UserRole::DataEngineer => "Data Engineer/Custodian",
            UserRole::Administrator => "System Administrator",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A platform user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User identifier
    pub id: UserId,
    /// Display name
    pub name: String,
    /// Platform role
    pub role: UserRole,
}

impl User {
    /// Create new user
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: UserRole) -> Self {
        Self {
            id: UserId::new(id),
            name: name.into(),
            role,
        }
    }
}

/// Ordered lifecycle stages
///
/// The ordering is load-bearing: the store rejects stage regression.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ModuleStage {
    /// Idea generation and validation
    IdeaGeneration,
    /// Proposal development and ethics review
    ProposalDevelopment,
    /// Data collection, aggregation and analysis
    DataCollectionAnalysis,
    /// Manuscript writing and publication
    ManuscriptWriting,
}

impl ModuleStage {
    /// Human-readable stage label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            ModuleStage::IdeaGeneration => "Idea Generation & Validation",
            ModuleStage::ProposalDevelopment => "Proposal Development & Ethics",
            ModuleStage::DataCollectionAnalysis => "Data Collection, Aggregation & Analysis",
            ModuleStage::ManuscriptWriting => "Manuscript Writing & Publication",
        }
    }

    /// All stages in lifecycle order
    #[must_use]
    pub fn ordered() -> [ModuleStage; 4] {
        [
            ModuleStage::IdeaGeneration,
            ModuleStage::ProposalDevelopment,
            ModuleStage::DataCollectionAnalysis,
            ModuleStage::ManuscriptWriting,
        ]
    }
}

impl std::fmt::Display for ModuleStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// How the research idea is developed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdeationMode {
    /// HCP inputs the initial idea, AI refines
    ClinicianLed,
    /// Collaborative chat-based brainstorming with AI
    AiCoCreation,
    /// AI proposes novel research questions on its own
    AutonomousAi,
}

impl IdeationMode {
    /// Human-readable mode label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            IdeationMode::ClinicianLed => "Clinician-Led Ideation (AI-Assisted)",
            IdeationMode::AiCoCreation => "AI Co-Creation Partnership",
            IdeationMode::AutonomousAi => "Autonomous AI Exploration",
        }
    }
}

impl std::fmt::Display for IdeationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Qualitative novelty rating derived from the numeric score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoveltyRating {
    /// Score above 80
    High,
    /// Score above 60
    Medium,
    /// Everything else
    Low,
}

impl NoveltyRating {
    /// Derive the rating from a 0-100 novelty score
    ///
    /// Boundaries are exclusive: 60 is Low, 80 is Medium.
    #[inline]
    #[must_use]
    pub fn from_score(score: u8) -> Self {
        if score > 80 {
            NoveltyRating::High
        } else if score > 60 {
            NoveltyRating::Medium
        } else {
            NoveltyRating::Low
        }
    }
}

impl std::fmt::Display for NoveltyRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NoveltyRating::High => "High",
            NoveltyRating::Medium => "Medium",
            NoveltyRating::Low => "Low",
        };
        f.write_str(s)
    }
}

/// AI-generated literature analysis report
///
/// All fields are optional so the report can be built up from partial
/// generations; see [`AiReport::merge`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiReport {
    /// Summary of relevant literature
    pub literature_summary: Option<String>,
    /// Identified research gaps
    pub research_gaps: Option<String>,
    /// Qualitative novelty rating
    pub novelty_rating: Option<NoveltyRating>,
    /// Preliminary feasibility assessment
    pub feasibility_assessment: Option<String>,
    /// Actionable refinement suggestions
    pub ai_suggestions: Option<String>,
}

impl AiReport {
    /// Merge an incoming partial report into this one, field by field
    ///
    /// Incoming populated fields win; absent incoming fields keep the
    /// existing value. This is the one sub-record field that is not
    /// replaced wholesale on update.
    #[must_use]
    pub fn merge(mut self, incoming: AiReport) -> AiReport {
        if incoming.literature_summary.is_some() {
            self.literature_summary = incoming.literature_summary;
        }
        if incoming.research_gaps.is_some() {
            self.research_gaps = incoming.research_gaps;
        }
        if incoming.novelty_rating.is_some() {
            self.novelty_rating = incoming.novelty_rating;
        }
        if incoming.feasibility_assessment.is_some() {
            self.feasibility_assessment = incoming.feasibility_assessment;
        }
        if incoming.ai_suggestions.is_some() {
            self.ai_suggestions = incoming.ai_suggestions;
        }
        self
    }
}

/// Research idea sub-record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchIdea {
    /// Core research concept or question
    pub concept: String,
    /// What is already known
    pub background: Option<String>,
    /// Objective or hypothesis
    pub objective: Option<String>,
    /// Brief methodology idea
    pub methodology: Option<String>,
    /// Significance / potential impact
    pub significance: Option<String>,
    /// Anticipated findings
    pub expected_outcomes: Option<String>,
    /// AI literature analysis report
    pub ai_report: Option<AiReport>,
    /// Whether the idea cleared the novelty threshold
    pub is_novel: Option<bool>,
    /// Whether an experienced researcher has been assigned
    pub expert_assigned: Option<bool>,
    /// How the idea was developed
    pub ideation_mode: Option<IdeationMode>,
    /// Numeric novelty score (0-100)
    pub novelty_score: Option<u8>,
}

/// Ethics committee review status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EthicsStatus {
    /// Not yet submitted to the committee
    NotSubmitted,
    /// Submitted, awaiting review
    Submitted,
    /// Committee requested changes
    FeedbackReceived,
    /// Approved; terminal for this sub-flow
    Approved,
    /// Declared but unreachable in the observed workflow
    Rejected,
}

impl std::fmt::Display for EthicsStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EthicsStatus::NotSubmitted => "Not Submitted",
            EthicsStatus::Submitted => "Submitted",
            EthicsStatus::FeedbackReceived => "Feedback Received",
            EthicsStatus::Approved => "Approved",
            EthicsStatus::Rejected => "Rejected",
        };
        f.write_str(s)
    }
}

/// A named document section with an optional editing hint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SectionInfo {
    /// Stable section id (lowercase slug)
    pub id: String,
    /// Display name
    pub name: String,
    /// Editing prompt shown to the author
    #[serde(default)]
    pub placeholder: Option<String>,
}

impl SectionInfo {
    /// Create new section info
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            placeholder: None,
        }
    }

    /// With placeholder text
    #[inline]
    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }
}

/// Proposal sub-record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    /// Proposal title
    pub title: String,
    /// Section body text keyed by section id; keys are AI-determined
    pub sections: IndexMap<String, String>,
    /// Ethics committee status
    pub ethics_status: EthicsStatus,
    /// Latest committee feedback text
    pub ethics_feedback: Option<String>,
    /// Whether a statistician has been assigned
    pub statistician_assigned: Option<bool>,
    /// Selected proposal/study type
    pub proposal_type: Option<String>,
    /// Required sections fetched from AI for the selected type
    pub required_sections: Option<Vec<SectionInfo>>,
}

impl Proposal {
    /// Create an empty proposal for a project title
    #[must_use]
    pub fn for_project(project_title: &str) -> Self {
        Self {
            title: format!("Proposal for {project_title}"),
            sections: IndexMap::new(),
            ethics_status: EthicsStatus::NotSubmitted,
            ethics_feedback: None,
            statistician_assigned: None,
            proposal_type: None,
            required_sections: None,
        }
    }
}

/// Data set sub-record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSet {
    /// Data set name
    pub name: String,
    /// Free-text description
    pub description: String,
    /// Generated source query (e.g. SQL)
    pub source_query: Option<String>,
    /// Extracted or uploaded tabular data
    pub simulated_data: Option<DataTable>,
    /// Data engineer review flags
    pub data_engineer_reviewed: Option<bool>,
    /// Data engineer approval flag
    pub data_engineer_approved: Option<bool>,
}

impl DataSet {
    /// Create an empty data set for a project title
    #[must_use]
    pub fn for_project(project_title: &str) -> Self {
        Self {
            name: format!("Data for {project_title}"),
            ..Self::default()
        }
    }
}

/// Statistical analysis sub-record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticalAnalysis {
    /// Analysis plan description
    pub plan: String,
    /// Selected inferential test ids
    pub test_types: Option<Vec<String>>,
    /// Selected descriptive measure ids
    pub measures_to_report: Option<Vec<String>>,
    /// AI-generated results text
    pub results: Option<String>,
    /// AI-generated tables (markdown)
    pub tables: Option<String>,
    /// Statistician's interpretation notes
    pub statistician_interpretation: Option<String>,
    /// Set only through statistician validation
    pub is_validated: Option<bool>,
}

/// Manuscript lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManuscriptStatus {
    /// Being written
    Drafting,
    /// Declared but unused in the observed workflow
    Review,
    /// Final state before journal submission
    ReadyForSubmission,
}

impl std::fmt::Display for ManuscriptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ManuscriptStatus::Drafting => "Drafting",
            ManuscriptStatus::Review => "Review",
            ManuscriptStatus::ReadyForSubmission => "Ready for Submission",
        };
        f.write_str(s)
    }
}

/// Journal author guidelines fetched from AI
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRequirements {
    /// Word limit, if the journal publishes one
    #[serde(default)]
    pub word_count: Option<u32>,
    /// Figure limit
    #[serde(default)]
    pub figure_limit: Option<u32>,
    /// Reference limit
    #[serde(default)]
    pub reference_limit: Option<u32>,
    /// Citation style (e.g. Vancouver, APA)
    #[serde(default)]
    pub reference_style: Option<String>,
    /// Required manuscript sections
    pub required_sections: Vec<SectionInfo>,
    /// Key constraints summarized as a checklist
    pub checklist: Vec<String>,
}

/// AI journal suggestion with filter metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JournalSuggestion {
    /// Journal name
    pub name: String,
    /// Aims and scope summary
    pub scope: String,
    /// Simulated impact factor
    #[serde(default)]
    pub impact_factor: Option<String>,
    /// Country of publication
    #[serde(default)]
    pub country: Option<String>,
    /// Journal quartile (Q1-Q4)
    #[serde(default)]
    pub quartile: Option<String>,
    /// Open access policy
    #[serde(default)]
    pub open_access: Option<String>,
    /// Why this journal fits the abstract
    #[serde(default)]
    pub rationale: Option<String>,
}

/// Manuscript sub-record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manuscript {
    /// Working title
    pub title: String,
    /// Target journal name
    pub target_journal: Option<String>,
    /// Selected article type
    pub article_type: Option<String>,
    /// Journal guidelines for the selected article type
    pub article_requirements: Option<ArticleRequirements>,
    /// Section body text keyed by section id
    pub sections: IndexMap<String, String>,
    /// Reference list text
    pub references: Option<String>,
    /// Keywords
    pub keywords: Option<String>,
    /// Lifecycle status
    pub status: ManuscriptStatus,
}

impl Manuscript {
    /// Create an empty manuscript for a project title
    #[must_use]
    pub fn for_project(project_title: &str) -> Self {
        Self {
            title: format!("Manuscript for {project_title}"),
            target_journal: None,
            article_type: None,
            article_requirements: None,
            sections: IndexMap::new(),
            references: None,
            keywords: None,
            status: ManuscriptStatus::Drafting,
        }
    }
}

/// Which simulated expert is being assigned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpertKind {
    /// Experienced researcher mentor
    Researcher,
    /// Statistician
    Statistician,
    /// Data engineer
    DataEngineer,
}

/// The aggregate root: a single active research project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchProject {
    /// Project identifier
    pub id: ProjectId,
    /// Project title
    pub title: String,
    /// Owning healthcare professional
    pub hcp_id: UserId,
    /// Current lifecycle stage
    pub current_stage: ModuleStage,
    /// Idea sub-record
    pub idea: Option<ResearchIdea>,
    /// Proposal sub-record
    pub proposal: Option<Proposal>,
    /// Data set sub-record
    pub data_set: Option<DataSet>,
    /// Statistical analysis sub-record
    pub analysis: Option<StatisticalAnalysis>,
    /// Manuscript sub-record
    pub manuscript: Option<Manuscript>,
    /// Assigned experienced researcher
    pub assigned_researcher: Option<UserId>,
    /// Assigned statistician
    pub assigned_statistician: Option<UserId>,
    /// Assigned data engineer
    pub assigned_data_engineer: Option<UserId>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl ResearchProject {
    /// Create a new project at the idea stage
    #[must_use]
    pub fn new(title: impl Into<String>, hcp_id: UserId, initial_idea: Option<ResearchIdea>) -> Self {
        let now = Utc::now();
        Self {
            id: ProjectId::new(),
            title: title.into(),
            hcp_id,
            current_stage: ModuleStage::IdeaGeneration,
            idea: initial_idea,
            proposal: None,
            data_set: None,
            analysis: None,
            manuscript: None,
            assigned_researcher: None,
            assigned_statistician: None,
            assigned_data_engineer: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn project_id_generation() {
        let id1 = ProjectId::new();
        let id2 = ProjectId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn stage_ordering() {
        assert!(ModuleStage::IdeaGeneration < ModuleStage::ProposalDevelopment);
        assert!(ModuleStage::DataCollectionAnalysis < ModuleStage::ManuscriptWriting);
        assert_eq!(ModuleStage::ordered()[0], ModuleStage::IdeaGeneration);
    }

    #[test]
    fn novelty_rating_thresholds() {
        assert_eq!(NoveltyRating::from_score(85), NoveltyRating::High);
        assert_eq!(NoveltyRating::from_score(70), NoveltyRating::Medium);
        assert_eq!(NoveltyRating::from_score(50), NoveltyRating::Low);
        // Boundaries are exclusive
        assert_eq!(NoveltyRating::from_score(60), NoveltyRating::Low);
        assert_eq!(NoveltyRating::from_score(80), NoveltyRating::Medium);
    }

    #[test]
    fn ai_report_merge_union() {
        let first = AiReport {
            literature_summary: Some("A".to_string()),
            research_gaps: Some("B".to_string()),
            ..AiReport::default()
        };
        let second = AiReport {
            literature_summary: Some("A2".to_string()),
            ..AiReport::default()
        };

        let merged = first.merge(second);
        assert_eq!(merged.literature_summary.as_deref(), Some("A2"));
        assert_eq!(merged.research_gaps.as_deref(), Some("B"));
    }

    #[test]
    fn ai_report_merge_keeps_existing_when_incoming_empty() {
        let first = AiReport {
            feasibility_assessment: Some("feasible".to_string()),
            ..AiReport::default()
        };
        let merged = first.clone().merge(AiReport::default());
        assert_eq!(merged, first);
    }

    #[test]
    fn proposal_defaults_not_submitted() {
        let proposal = Proposal::for_project("Hypertension Study");
        assert_eq!(proposal.ethics_status, EthicsStatus::NotSubmitted);
        assert_eq!(proposal.title, "Proposal for Hypertension Study");
        assert!(proposal.sections.is_empty());
    }

    #[test]
    fn manuscript_defaults_drafting() {
        let manuscript = Manuscript::for_project("Hypertension Study");
        assert_eq!(manuscript.status, ManuscriptStatus::Drafting);
        assert_eq!(manuscript.title, "Manuscript for Hypertension Study");
    }

    #[test]
    fn article_requirements_accepts_ai_casing() {
        let json = r#"{
            "wordCount": 3000,
            "figureLimit": 5,
            "referenceLimit": null,
            "referenceStyle": "Vancouver",
            "requiredSections": [{"id": "abstract", "name": "Abstract"}],
            "checklist": ["Max 3000 words"]
        }"#;
        let reqs: ArticleRequirements = serde_json::from_str(json).unwrap();
        assert_eq!(reqs.word_count, Some(3000));
        assert_eq!(reqs.reference_limit, None);
        assert_eq!(reqs.required_sections[0].id, "abstract");
    }

    proptest::proptest! {
        #[test]
        fn novelty_rating_total_over_scores(score in 0u8..=100) {
            let rating = NoveltyRating::from_score(score);
            match rating {
                NoveltyRating::High => proptest::prop_assert!(score > 80),
                NoveltyRating::Medium => proptest::prop_assert!(score > 60 && score <= 80),
                NoveltyRating::Low => proptest::prop_assert!(score <= 60),
            }
        }
    }
}
