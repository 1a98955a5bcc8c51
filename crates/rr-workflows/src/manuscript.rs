//! Manuscript writing and publication workflow
//!
//! Drives the publication strategy loop: journal suggestions filtered by
//! the author's criteria, article types for the chosen journal, then the
//! journal's author guidelines which shape the section editor.

use schemars::JsonSchema;
use serde::Deserialize;
use tracing::info;

use rr_core::prelude::*;
use rr_core::types::{ArticleRequirements, JournalSuggestion};
use rr_gemini::{decode_validated, AiGateway};

use crate::error::WorkflowError;
use crate::notify::Notification;

const JOURNAL_SYSTEM_INSTRUCTION: &str = "You are an AI research assistant for publication strategy. Based on the abstract/summary and filters, suggest 3-5 suitable journals. Provide name, scope, impact factor (simulated), country, journal quartile (e.g., Q1, Q2), and open access policy (e.g., 'Fully Open Access', 'Hybrid'). Provide a rationale for each suggestion. Output as JSON: [{name, scope, impactFactor, country, quartile, openAccess, rationale}, ...]";

/// Filters applied to journal suggestions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JournalFilter {
    /// Lowest acceptable impact factor
    pub min_impact_factor: Option<f32>,
    /// Highest acceptable impact factor
    pub max_impact_factor: Option<f32>,
    /// Acceptable countries/regions
    pub countries: Vec<String>,
    /// Acceptable quartiles (Q1-Q4)
    pub quartiles: Vec<String>,
    /// Open access policy, `None` meaning any
    pub open_access: Option<String>,
}

impl JournalFilter {
    fn describe(&self) -> String {
        let min = self
            .min_impact_factor
            .map(|v| v.to_string())
            .unwrap_or_else(|| "any".to_string());
        let max = self
            .max_impact_factor
            .map(|v| v.to_string())
            .unwrap_or_else(|| "any".to_string());
        let countries = if self.countries.is_empty() {
            "any".to_string()
        } else {
            self.countries.join(", ")
        };
        let quartiles = if self.quartiles.is_empty() {
            "any".to_string()
        } else {
            self.quartiles.join(", ")
        };
        let open_access = self.open_access.as_deref().unwrap_or("any");
        format!(
            "FILTER CRITERIA (adhere to these strictly): Min Impact Factor: {min}, Max Impact Factor: {max}, Country/Region: {countries}, Journal Quartile: {quartiles}, Open Access: {open_access}"
        )
    }
}

/// An article type a journal publishes
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, JsonSchema)]
pub struct ArticleType {
    /// Name, e.g. "Original Article"
    pub name: String,
    /// One-line description
    pub description: String,
}

/// The manuscript stage workflow
pub struct ManuscriptWorkflow<G> {
    gateway: G,
    notification: Option<Notification>,
}

impl<G: AiGateway> ManuscriptWorkflow<G> {
    /// Create the workflow over a gateway
    #[must_use]
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            notification: None,
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

    /// Suggest journals matching the study abstract and the given filters
    pub async fn suggest_journals(
        &mut self,
        store: &mut ProjectStore,
        filter: &JournalFilter,
    ) -> Result<Vec<JournalSuggestion>, WorkflowError> {
        let project = store.current_project().ok_or(StoreError::NoActiveProject)?;
        let study_abstract = study_abstract(project);
        let prompt = format!(
            "Study Abstract/Summary: --- {study_abstract} --- {}. Suggest journals that match the abstract and ALL specified filters.",
            filter.describe()
        );

        store.set_loading(true);
        let response = self
            .gateway
            .generate_json(&prompt, Some(JOURNAL_SYSTEM_INSTRUCTION))
            .await;
        store.set_loading(false);

        match decode_validated::<Vec<JournalSuggestion>>(response) {
            Ok(suggestions) => {
                info!(count = suggestions.len(), "journal suggestions received");
                self.notification = Some(Notification::success(
                    "AI suggested potential journals based on your criteria.",
                ));
                Ok(suggestions)
            }
            Err(err) => {
                let message = err.to_string();
                store.set_error(message.clone());
                self.notification = Some(Notification::error(format!("Error: {message}")));
                Err(WorkflowError::Ai(message))
            }
        }
    }

    /// List the article types a journal publishes
    pub async fn fetch_article_types(
        &mut self,
        store: &mut ProjectStore,
        journal_name: &str,
    ) -> Result<Vec<ArticleType>, WorkflowError> {
        self.notification = Some(Notification::info(format!(
            "Fetching article types for {journal_name}..."
        )));
        let system_instruction = format!(
            "For the journal '{journal_name}', list the common article types they publish (e.g., Original Article, Research Letter, Case Report, Review, Editorial). Provide a brief description for each. Output as a JSON array using this exact structure: [{{ \"name\": \"string\", \"description\": \"string\" }}]."
        );
        let prompt = format!("List article types for {journal_name}.");

        store.set_loading(true);
        let response = self
            .gateway
            .generate_json(&prompt, Some(&system_instruction))
            .await;
        store.set_loading(false);

        match decode_validated::<Vec<ArticleType>>(response) {
            Ok(types) => Ok(types),
            Err(err) => {
                let message = err.to_string();
                store.set_error(message.clone());
                Err(WorkflowError::Ai(message))
            }
        }
    }

    /// Fetch author guidelines and commit the journal/type selection
    pub async fn fetch_article_requirements(
        &mut self,
        store: &mut ProjectStore,
        actor: Option<&User>,
        journal_name: &str,
        article_type_name: &str,
    ) -> Result<ArticleRequirements, WorkflowError> {
        self.notification = Some(Notification::info(format!(
            "Fetching guidelines for {article_type_name}..."
        )));
        let system_instruction = format!(
            "For an '{article_type_name}' in '{journal_name}', provide specific author guidelines. Output as a JSON object with this exact structure: {{ \"wordCount\": number | null, \"figureLimit\": number | null, \"referenceLimit\": number | null, \"referenceStyle\": \"string (e.g., Vancouver, APA)\", \"requiredSections\": [{{\"id\": \"string_lowercase_no_spaces\", \"name\": \"string\"}}, ...], \"checklist\": [\"string\", ...] }}. The checklist should summarize key constraints. For 'requiredSections', 'id' must be a lowercase slug version of the name. Use null if a value isn't applicable."
        );
        let prompt = format!("Get guidelines for {article_type_name} in {journal_name}.");

        store.set_loading(true);
        let response = self
            .gateway
            .generate_json(&prompt, Some(&system_instruction))
            .await;
        store.set_loading(false);

        let requirements = match decode_validated::<ArticleRequirements>(response) {
            Ok(requirements) => requirements,
            Err(err) => {
                let message = err.to_string();
                store.set_error(message.clone());
                return Err(WorkflowError::Ai(message));
            }
        };

        store.update_manuscript(
            actor,
            ManuscriptPatch {
                target_journal: Some(journal_name.to_string()),
                article_type: Some(article_type_name.to_string()),
                article_requirements: Some(requirements.clone()),
                ..ManuscriptPatch::default()
            },
        )?;
        Ok(requirements)
    }

    /// Persist edited section bodies (and references/keywords when given)
    pub fn save_draft(
        &mut self,
        store: &mut ProjectStore,
        actor: Option<&User>,
        patch: ManuscriptPatch,
    ) -> Result<(), WorkflowError> {
        store.update_manuscript(actor, patch)?;
        self.notification = Some(Notification::success("Manuscript draft saved!"));
        Ok(())
    }

    /// Freeze the draft for submission
    pub fn mark_ready_for_submission(
        &mut self,
        store: &mut ProjectStore,
        actor: Option<&User>,
    ) -> Result<(), WorkflowError> {
        store.update_manuscript(
            actor,
            ManuscriptPatch {
                status: Some(ManuscriptStatus::ReadyForSubmission),
                ..ManuscriptPatch::default()
            },
        )?;
        self.notification = Some(Notification::success(
            "Manuscript marked as 'Ready for Submission'.",
        ));
        Ok(())
    }
}

/// Best available abstract text for journal matching
///
/// Falls back through abstract section, introduction section, idea concept,
/// then a stub built from the project title.
fn study_abstract(project: &ResearchProject) -> String {
    let from_sections = project.manuscript.as_ref().and_then(|m| {
        m.sections
            .get("abstract")
            .or_else(|| m.sections.get("introduction"))
            .filter(|s| !s.trim().is_empty())
            .cloned()
    });
    if let Some(text) = from_sections {
        return text;
    }
    if let Some(idea) = &project.idea {
        if !idea.concept.trim().is_empty() {
            return idea.concept.clone();
        }
    }
    format!(
        "Abstract not yet available. The study is about {}",
        project.title
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;
    use rr_test_utils::{test_hcp, MockGateway, RecordedCall};
    use serde_json::json;

    fn store_at_manuscript(hcp: &User) -> ProjectStore {
        let mut store = ProjectStore::new();
        store
            .start_new_project(Some(hcp), "Sepsis Outcomes", None)
            .unwrap();
        store
            .advance_stage(Some(hcp), ModuleStage::ManuscriptWriting)
            .unwrap();
        store
    }

    #[tokio::test]
    async fn suggestions_carry_filter_criteria_in_prompt() {
        let hcp = test_hcp();
        let mut store = store_at_manuscript(&hcp);
        let mock = MockGateway::new();
        mock.push_json(json!([{
            "name": "Critical Care Medicine",
            "scope": "Intensive care research",
            "impactFactor": "8.8",
            "country": "USA",
            "quartile": "Q1",
            "openAccess": "Hybrid",
            "rationale": "Strong sepsis focus."
        }]));
        let mut workflow = ManuscriptWorkflow::new(mock);

        let filter = JournalFilter {
            min_impact_factor: Some(5.0),
            quartiles: vec!["Q1".to_string()],
            ..JournalFilter::default()
        };
        let suggestions = workflow.suggest_journals(&mut store, &filter).await.unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].name, "Critical Care Medicine");

        let calls = workflow.gateway.calls();
        let RecordedCall::Json { prompt, .. } = &calls[0] else {
            panic!("expected a json call");
        };
        assert!(prompt.contains("Min Impact Factor: 5"));
        assert!(prompt.contains("Journal Quartile: Q1"));
        assert!(prompt.contains("Abstract not yet available. The study is about Sepsis Outcomes"));
    }

    #[tokio::test]
    async fn abstract_prefers_sections_over_concept() {
        let hcp = test_hcp();
        let mut store = store_at_manuscript(&hcp);
        let mut sections = IndexMap::new();
        sections.insert("abstract".to_string(), "We studied sepsis.".to_string());
        store
            .update_manuscript(
                Some(&hcp),
                ManuscriptPatch {
                    sections: Some(sections),
                    ..ManuscriptPatch::default()
                },
            )
            .unwrap();

        let mock = MockGateway::new();
        mock.push_json(json!([{ "name": "J", "scope": "s" }]));
        let mut workflow = ManuscriptWorkflow::new(mock);
        workflow
            .suggest_journals(&mut store, &JournalFilter::default())
            .await
            .unwrap();

        let calls = workflow.gateway.calls();
        let RecordedCall::Json { prompt, .. } = &calls[0] else {
            panic!("expected a json call");
        };
        assert!(prompt.contains("We studied sepsis."));
    }

    #[tokio::test]
    async fn suggestion_failure_sets_store_error() {
        let hcp = test_hcp();
        let mut store = store_at_manuscript(&hcp);
        let mock = MockGateway::new();
        mock.push_json_error("Failed to parse AI JSON response.");
        let mut workflow = ManuscriptWorkflow::new(mock);

        let err = workflow
            .suggest_journals(&mut store, &JournalFilter::default())
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Ai(_)));
        assert!(store.last_error().is_some());
    }

    #[tokio::test]
    async fn article_types_decode() {
        let hcp = test_hcp();
        let mut store = store_at_manuscript(&hcp);
        let mock = MockGateway::new();
        mock.push_json(json!([
            { "name": "Original Article", "description": "Full-length research." },
            { "name": "Research Letter", "description": "Brief report." }
        ]));
        let mut workflow = ManuscriptWorkflow::new(mock);

        let types = workflow
            .fetch_article_types(&mut store, "The Lancet")
            .await
            .unwrap();
        assert_eq!(types.len(), 2);
        assert_eq!(types[0].name, "Original Article");
    }

    #[tokio::test]
    async fn requirements_commit_journal_and_type() {
        let hcp = test_hcp();
        let mut store = store_at_manuscript(&hcp);
        let mock = MockGateway::new();
        mock.push_json(json!({
            "wordCount": 3500,
            "figureLimit": 5,
            "referenceStyle": "Vancouver",
            "requiredSections": [
                { "id": "abstract", "name": "Abstract" },
                { "id": "methods", "name": "Methods" }
            ],
            "checklist": ["Max 3500 words", "Vancouver references"]
        }));
        let mut workflow = ManuscriptWorkflow::new(mock);

        let requirements = workflow
            .fetch_article_requirements(&mut store, Some(&hcp), "The Lancet", "Original Article")
            .await
            .unwrap();
        assert_eq!(requirements.word_count, Some(3500));
        assert_eq!(requirements.required_sections.len(), 2);

        let manuscript = store.current_project().unwrap().manuscript.as_ref().unwrap();
        assert_eq!(manuscript.target_journal.as_deref(), Some("The Lancet"));
        assert_eq!(manuscript.article_type.as_deref(), Some("Original Article"));
        assert_eq!(
            manuscript
                .article_requirements
                .as_ref()
                .unwrap()
                .reference_style
                .as_deref(),
            Some("Vancouver")
        );
    }

    #[tokio::test]
    async fn ready_for_submission_flips_status() {
        let hcp = test_hcp();
        let mut store = store_at_manuscript(&hcp);
        let mut workflow = ManuscriptWorkflow::new(MockGateway::new());

        workflow
            .mark_ready_for_submission(&mut store, Some(&hcp))
            .unwrap();
        let manuscript = store.current_project().unwrap().manuscript.as_ref().unwrap();
        assert_eq!(manuscript.status, ManuscriptStatus::ReadyForSubmission);

        // Frozen drafts stay frozen
        let err = workflow
            .save_draft(
                &mut store,
                Some(&hcp),
                ManuscriptPatch {
                    status: Some(ManuscriptStatus::Drafting),
                    ..ManuscriptPatch::default()
                },
            )
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Store(StoreError::InvalidManuscriptTransition { .. })
        ));
    }
}
