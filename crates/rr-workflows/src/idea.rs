//! Idea generation and validation workflow
//!
//! Three ideation modes feed the same report pipeline: a clinician-entered
//! concept, chat-based co-creation, or AI-proposed research questions. The
//! analysis report is a JSON-constrained call grounded in the simulated
//! knowledge bases; a score of 60 or more assigns a mentor and marks the
//! idea novel on stage exit.

use schemars::JsonSchema;
use serde::Deserialize;
use tracing::info;

use rr_core::fixtures;
use rr_core::prelude::*;
use rr_gemini::{decode_validated, AiGateway};

use crate::error::WorkflowError;
use crate::notify::Notification;

/// Score at or above which an idea is considered worth pursuing
pub const NOVELTY_THRESHOLD: u8 = 60;

/// Literature search criteria for the report prompt
#[derive(Debug, Clone, Default)]
pub struct SearchCriteria {
    /// Databases to search (e.g. PubMed, Embase)
    pub databases: Vec<String>,
    /// Prioritized literature types (e.g. RCTs, systematic reviews)
    pub literature_types: Vec<String>,
    /// Earliest publication year
    pub year_from: Option<u16>,
    /// Latest publication year
    pub year_to: Option<u16>,
}

impl SearchCriteria {
    fn describe(&self) -> String {
        let databases = if self.databases.is_empty() {
            "PubMed".to_string()
        } else {
            self.databases.join(", ")
        };
        let types = if self.literature_types.is_empty() {
            "All types considered".to_string()
        } else {
            self.literature_types.join(", ")
        };
        let from = self
            .year_from
            .map_or_else(|| "any".to_string(), |y| y.to_string());
        let to = self
            .year_to
            .map_or_else(|| "present".to_string(), |y| y.to_string());
        format!(
            "Search Criteria:\n- Databases: {databases}\n- Prioritized Literature Types: {types}\n- Year Range: from {from} to {to}."
        )
    }
}

/// Report shape requested from the model
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct ReportPayload {
    literature_summary: String,
    research_gaps: String,
    novelty_score: u8,
    feasibility_assessment: String,
    #[serde(default)]
    ai_suggestions: Option<String>,
}

/// An AI-proposed research question
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, JsonSchema)]
pub struct AutonomousIdea {
    /// Stable id within the suggestion batch
    pub id: String,
    /// The proposed research question
    pub question: String,
    /// Why this question is worth investigating
    pub rationale: String,
}

const REPORT_SYSTEM_INSTRUCTION: &str = "You are an AI assistant specialized in clinical research ideation. Analyze the provided research concept against the knowledge base context. Provide a concise report in JSON format with fields: literatureSummary (string), researchGaps (string), noveltyScore (number 0-100, where 100 is highly novel), feasibilityAssessment (string, preliminary), aiSuggestions (string, actionable points for refinement, if applicable).";

const AUTONOMOUS_SYSTEM_INSTRUCTION: &str = "You are an AI that generates novel research hypotheses by synthesizing diverse data sources (simulated). Generate three distinct novel research questions suitable for an HCP to investigate. Output as a JSON array: [{ 'id': 'idea_1', 'question': '...', 'rationale': '...' }, ...]";

/// The idea stage workflow
pub struct IdeaWorkflow<G> {
    gateway: G,
    notification: Option<Notification>,
    autonomous_ideas: Vec<AutonomousIdea>,
}

impl<G: AiGateway> IdeaWorkflow<G> {
    /// Create the workflow over a gateway
    #[must_use]
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            notification: None,
            autonomous_ideas: Vec::new(),
        }
    }

    /// Current banner, if any
    #[inline]
    #[must_use]
    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    /// Dismiss the banner
    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    /// Previously loaded AI idea suggestions
    #[inline]
    #[must_use]
    pub fn autonomous_ideas(&self) -> &[AutonomousIdea] {
        &self.autonomous_ideas
    }

    /// Switch ideation mode, clearing any report generated for the old mode
    pub fn set_ideation_mode(
        &mut self,
        store: &mut ProjectStore,
        actor: Option<&User>,
        mode: IdeationMode,
    ) -> Result<(), WorkflowError> {
        store.update_idea(
            actor,
            IdeaPatch {
                ideation_mode: Some(mode),
                reset_report: true,
                ..IdeaPatch::default()
            },
        )?;
        Ok(())
    }

    /// Run the literature analysis and attach the report to the idea
    ///
    /// A score of [`NOVELTY_THRESHOLD`] or more assigns the fixture
    /// researcher, once.
    pub async fn generate_report(
        &mut self,
        store: &mut ProjectStore,
        actor: Option<&User>,
        criteria: &SearchCriteria,
    ) -> Result<(), WorkflowError> {
        let project = store
            .current_project()
            .ok_or(StoreError::NoActiveProject)?;
        let idea = project.idea.clone().unwrap_or_default();
        let already_assigned = project.assigned_researcher.is_some();
        let mode = idea.ideation_mode.unwrap_or(IdeationMode::ClinicianLed);

        if mode == IdeationMode::ClinicianLed && idea.concept.trim().is_empty() {
            let message = format!(
                "Please provide an initial research concept for {mode}."
            );
            store.set_error(message.clone());
            return Err(WorkflowError::validation(message));
        }

        self.notification = Some(Notification::info("AI is analyzing your idea..."));
        store.set_loading(true);

        let rag_context = format!(
            "Knowledge Base Context:\n- {}\n- Trends: Increased interest in telehealth, AI in diagnostics.\n- Gaps: Long-term effects of new drug X, comparative effectiveness of Y vs Z.",
            fixtures::PUBMED_API_SIM
        );
        let missing = "Not provided";
        let prompt = format!(
            "{rag_context}\n\nResearch Concept:\nBackground: {}\nObjective/Hypothesis: {}\nMethodology Idea: {}\nSignificance: {}\nExpected Outcomes: {}\nCore Concept: {}\n{}\n\nAnalyze this concept using the provided knowledge base context and search criteria. Output must be JSON.",
            idea.background.as_deref().unwrap_or(missing),
            idea.objective.as_deref().unwrap_or(missing),
            idea.methodology.as_deref().unwrap_or(missing),
            idea.significance.as_deref().unwrap_or(missing),
            idea.expected_outcomes.as_deref().unwrap_or(missing),
            idea.concept,
            criteria.describe(),
        );

        let response = self
            .gateway
            .generate_json(&prompt, Some(REPORT_SYSTEM_INSTRUCTION))
            .await;
        store.set_loading(false);

        let payload: ReportPayload = match decode_validated(response) {
            Ok(payload) => payload,
            Err(err) => {
                let message = err.to_string();
                store.set_error(message.clone());
                self.notification = Some(Notification::error(format!(
                    "Error generating report: {message}"
                )));
                return Err(WorkflowError::Ai(message));
            }
        };

        let score = payload.novelty_score;
        let report = AiReport {
            literature_summary: Some(payload.literature_summary),
            research_gaps: Some(payload.research_gaps),
            novelty_rating: Some(NoveltyRating::from_score(score)),
            feasibility_assessment: Some(payload.feasibility_assessment),
            ai_suggestions: payload.ai_suggestions,
        };
        store.update_idea(
            actor,
            IdeaPatch {
                ai_report: Some(report),
                novelty_score: Some(score),
                ..IdeaPatch::default()
            },
        )?;
        info!(score, "analysis report attached to idea");
        self.notification = Some(Notification::success(
            "AI analysis report generated successfully!",
        ));

        if score >= NOVELTY_THRESHOLD && !already_assigned {
            let researcher = fixtures::user_for_role(UserRole::ExperiencedResearcher);
            store.assign_expert(actor, ExpertKind::Researcher, researcher.id.clone())?;
            self.notification = Some(Notification::info(format!(
                "Potential idea! Experienced Researcher \"{}\" has been notionally assigned.",
                researcher.name
            )));
        }

        Ok(())
    }

    /// Ask the model for three novel research questions
    pub async fn load_autonomous_ideas(
        &mut self,
        store: &mut ProjectStore,
    ) -> Result<&[AutonomousIdea], WorkflowError> {
        if store.current_project().is_none() {
            let message = "Please start a project first to review AI-generated ideas in context.";
            store.set_error(message);
            return Err(WorkflowError::validation(message));
        }

        let prompt = "Simulated Data Sources Review:\n- Literature Trends: PubMed API (keywords: emerging diseases, treatment gaps, AI in medicine)\n- EHR Metadata (de-identified): Increased incidence of condition X in demographic Y. Correlation between factor A and outcome B.\n- Public Health Data: Outbreak of Z in region A.\n- News Feeds: Reports on environmental factor B. Technological advancements in area C.\nGenerate three novel research questions.";

        store.set_loading(true);
        let response = self
            .gateway
            .generate_json(prompt, Some(AUTONOMOUS_SYSTEM_INSTRUCTION))
            .await;
        store.set_loading(false);

        let ideas: Vec<AutonomousIdea> = match decode_validated(response) {
            Ok(ideas) => ideas,
            Err(err) => {
                let message = err.to_string();
                store.set_error(message.clone());
                self.notification = Some(Notification::error(format!("Error: {message}")));
                return Err(WorkflowError::Ai(message));
            }
        };

        self.notification = Some(Notification::info(format!(
            "Loaded {} AI-generated idea suggestions.",
            ideas.len()
        )));
        self.autonomous_ideas = ideas;
        Ok(&self.autonomous_ideas)
    }

    /// Adopt an AI-proposed question as the project idea
    pub fn select_autonomous_idea(
        &mut self,
        store: &mut ProjectStore,
        actor: Option<&User>,
        idea: &AutonomousIdea,
    ) -> Result<(), WorkflowError> {
        store.update_idea(
            actor,
            IdeaPatch {
                concept: Some(idea.question.clone()),
                background: Some(idea.rationale.clone()),
                ideation_mode: Some(IdeationMode::AutonomousAi),
                reset_report: true,
                ..IdeaPatch::default()
            },
        )?;
        self.notification = Some(Notification::info(format!(
            "Selected AI Idea: \"{}\". You can now request an AI Analysis Report.",
            idea.question
        )));
        Ok(())
    }

    /// Close the idea stage and move to proposal development
    ///
    /// Requires an analysis report except in co-creation mode; an autonomous
    /// idea needs at least an adopted concept. Sets `is_novel` from the
    /// recorded score.
    pub fn proceed_to_proposal(
        &mut self,
        store: &mut ProjectStore,
        actor: Option<&User>,
    ) -> Result<(), WorkflowError> {
        let project = store
            .current_project()
            .ok_or(StoreError::NoActiveProject)?;
        let Some(idea) = project.idea.clone() else {
            let message = "Please select an ideation mode and develop an idea before proceeding.";
            store.set_error(message);
            return Err(WorkflowError::validation(message));
        };
        let mode = idea.ideation_mode.unwrap_or(IdeationMode::ClinicianLed);

        let report_missing = idea.ai_report.is_none();
        let prerequisite_met = match mode {
            IdeationMode::AiCoCreation => true,
            IdeationMode::AutonomousAi => !report_missing || !idea.concept.trim().is_empty(),
            IdeationMode::ClinicianLed => !report_missing,
        };
        if !prerequisite_met {
            let message =
                "Please generate and review the AI Analysis Report for your selected idea before proceeding.";
            store.set_error(message);
            return Err(WorkflowError::validation(message));
        }

        let is_novel = idea.novelty_score.unwrap_or(0) >= NOVELTY_THRESHOLD;
        store.update_idea(
            actor,
            IdeaPatch {
                is_novel: Some(is_novel),
                ..IdeaPatch::default()
            },
        )?;
        store.advance_stage(actor, ModuleStage::ProposalDevelopment)?;
        self.notification = Some(Notification::success(
            "Idea stage complete! Proceeding to Proposal Development.",
        ));
        Ok(())
    }
}
