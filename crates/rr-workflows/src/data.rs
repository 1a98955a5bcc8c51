//! Data collection and statistical analysis workflow
//!
//! Natural-language requests become SQL through the gateway; extraction is
//! simulated against fixture cohort rows, or real data arrives via CSV
//! upload. The analysis plan selects from the descriptive/inferential
//! catalogs and runs with a minimal reasoning budget.

use std::path::Path;

use tracing::info;

use rr_core::fixtures;
use rr_core::prelude::*;
use rr_core::tabular;
use rr_gemini::{strip_code_fence, AiGateway, ReasoningBudget, TextRequest};

use crate::error::WorkflowError;
use crate::notify::Notification;

/// A graph to request from the analysis engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphRequest {
    /// Chart kind (one of [`fixtures::GRAPH_TYPES`])
    pub graph_type: String,
    /// X-axis variable
    pub x: String,
    /// Y-axis variable
    pub y: String,
    /// Optional grouping variable
    pub group: Option<String>,
}

const SQL_SYSTEM_INSTRUCTION: &str = "You are an AI data assistant. Translate the user's natural language request into an SQL query. Assume a generic relational database schema. Output only the SQL query.";

const ANALYSIS_SYSTEM_INSTRUCTION: &str = "You are an AI statistical analysis engine. Based on the data and user's test/graph selections, generate a detailed report. Include results, interpretations, and markdown tables.";

/// The data stage workflow
pub struct DataWorkflow<G> {
    gateway: G,
    notification: Option<Notification>,
}

impl<G: AiGateway> DataWorkflow<G> {
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

    /// Translate a natural-language request into a source query
    pub async fn generate_query(
        &mut self,
        store: &mut ProjectStore,
        actor: Option<&User>,
        natural_language: &str,
    ) -> Result<String, WorkflowError> {
        if natural_language.trim().is_empty() {
            let message = "Please provide a natural language query for data extraction.";
            store.set_error(message);
            return Err(WorkflowError::validation(message));
        }

        store.set_loading(true);
        let prompt = format!(
            "Natural Language Request: \"{natural_language}\" \nTranslate this into an SQL query."
        );
        let response = self
            .gateway
            .generate_text(TextRequest::new(prompt).with_system_instruction(SQL_SYSTEM_INSTRUCTION))
            .await;
        store.set_loading(false);

        if let Some(error) = response.error {
            store.set_error(error.clone());
            self.notification = Some(Notification::error(format!("Error: {error}")));
            return Err(WorkflowError::Ai(error));
        }

        let sql = strip_code_fence(&response.text);
        store.update_data_set(
            actor,
            DataSetPatch {
                name: Some("Extracted Dataset".to_string()),
                description: Some(format!("Data from query: {natural_language}")),
                source_query: Some(sql.clone()),
                ..DataSetPatch::default()
            },
        )?;
        self.notification = Some(Notification::info(
            "SQL query generated. Review before 'execution'.",
        ));
        Ok(sql)
    }

    /// Pretend to run the generated query against the warehouse
    pub fn simulate_extraction(
        &mut self,
        store: &mut ProjectStore,
        actor: Option<&User>,
    ) -> Result<(), WorkflowError> {
        let has_query = store
            .current_project()
            .and_then(|p| p.data_set.as_ref())
            .and_then(|d| d.source_query.as_ref())
            .is_some();
        if !has_query {
            let message = "No SQL query to execute.";
            store.set_error(message);
            return Err(WorkflowError::validation(message));
        }

        let table = fixtures::simulated_extraction();
        info!(rows = table.len(), "simulated data extraction");
        store.update_data_set(
            actor,
            DataSetPatch {
                simulated_data: Some(table),
                ..DataSetPatch::default()
            },
        )?;
        self.notification = Some(Notification::success(
            "Data extraction simulated successfully. Preview below.",
        ));
        Ok(())
    }

    /// Attach uploaded CSV text as the project data set
    pub fn import_csv_text(
        &mut self,
        store: &mut ProjectStore,
        actor: Option<&User>,
        csv_text: &str,
        file_name: &str,
    ) -> Result<(), WorkflowError> {
        let table = match tabular::parse_delimited(csv_text) {
            Ok(table) => table,
            Err(err) => {
                let message = err.to_string();
                store.set_error(message.clone());
                self.notification = Some(Notification::error(message.clone()));
                return Err(WorkflowError::validation(message));
            }
        };
        store.update_data_set(
            actor,
            DataSetPatch {
                simulated_data: Some(table),
                name: Some(format!("Uploaded: {file_name}")),
                ..DataSetPatch::default()
            },
        )?;
        self.notification = Some(Notification::success(format!(
            "Successfully loaded and previewing \"{file_name}\"."
        )));
        Ok(())
    }

    /// Attach a `.csv` file from disk as the project data set
    pub fn import_csv_file(
        &mut self,
        store: &mut ProjectStore,
        actor: Option<&User>,
        path: impl AsRef<Path>,
    ) -> Result<(), WorkflowError> {
        let path = path.as_ref();
        let table = match tabular::import_csv_file(path) {
            Ok(table) => table,
            Err(err) => {
                let message = err.to_string();
                store.set_error(message.clone());
                self.notification = Some(Notification::error(message.clone()));
                return Err(WorkflowError::validation(message));
            }
        };
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        store.update_data_set(
            actor,
            DataSetPatch {
                simulated_data: Some(table),
                name: Some(format!("Uploaded: {file_name}")),
                ..DataSetPatch::default()
            },
        )?;
        self.notification = Some(Notification::success(format!(
            "Successfully loaded and previewing \"{file_name}\"."
        )));
        Ok(())
    }

    /// Run the selected analysis plan against the attached data
    ///
    /// Runs with a minimal reasoning budget: result turnaround matters more
    /// than marginal quality here.
    pub async fn run_analysis(
        &mut self,
        store: &mut ProjectStore,
        actor: Option<&User>,
        descriptives: &[String],
        inferentials: &[String],
        graphs: &[GraphRequest],
    ) -> Result<(), WorkflowError> {
        let data = store
            .current_project()
            .ok_or(StoreError::NoActiveProject)?
            .data_set
            .as_ref()
            .and_then(|d| d.simulated_data.clone());
        let Some(data) = data else {
            let message =
                "Please define an analysis plan by selecting tests and ensure data is 'extracted' or uploaded.";
            store.set_error(message);
            return Err(WorkflowError::validation(message));
        };
        if descriptives.is_empty() && inferentials.is_empty() {
            let message =
                "Please define an analysis plan by selecting tests and ensure data is 'extracted' or uploaded.";
            store.set_error(message);
            return Err(WorkflowError::validation(message));
        }

        let descriptive_text = join_catalog_names(fixtures::DESCRIPTIVE_STATS, descriptives);
        let inferential_text = join_catalog_names(fixtures::INFERENTIAL_TESTS, inferentials);
        let graph_text = if graphs.is_empty() {
            "None requested.".to_string()
        } else {
            graphs
                .iter()
                .map(|g| {
                    let group = g
                        .group
                        .as_deref()
                        .map(|v| format!(" grouped by '{v}'"))
                        .unwrap_or_default();
                    format!(
                        "- A {} chart for Y-axis:'{}' and X-axis:'{}'{group}",
                        g.graph_type, g.y, g.x
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        };

        let sample: Vec<_> = data.rows.iter().take(3).collect();
        let sample_json = serde_json::to_string_pretty(&sample).unwrap_or_default();
        let prompt = format!(
            "Analysis Plan:\n---\nDescriptive Statistics to run: {descriptive_text}\nInferential Tests to run: {inferential_text}\nGraphs to generate/describe: \n{graph_text}\n---\nData Context:\nData Sample (first 3 rows):\n{sample_json}\nData Columns: {}\n\nExecute this plan. For each test, provide the result and a brief interpretation. Format tables in Markdown. Provide a summary for each requested graph.",
            data.headers.join(", ")
        );

        store.set_loading(true);
        let response = self
            .gateway
            .generate_text(
                TextRequest::new(prompt)
                    .with_system_instruction(ANALYSIS_SYSTEM_INSTRUCTION)
                    .with_reasoning_budget(ReasoningBudget::Minimal),
            )
            .await;
        store.set_loading(false);

        if let Some(error) = response.error {
            store.set_error(error.clone());
            self.notification = Some(Notification::error(format!("Error: {error}")));
            return Err(WorkflowError::Ai(error));
        }

        store.update_analysis(
            actor,
            AnalysisPatch {
                plan: Some(format!(
                    "Descriptives: {descriptive_text}. Inferentials: {inferential_text}."
                )),
                results: Some(response.text),
                tables: Some("See results section for Markdown tables.".to_string()),
                test_types: Some(inferentials.to_vec()),
                measures_to_report: Some(descriptives.to_vec()),
                ..AnalysisPatch::default()
            },
        )?;
        self.notification = Some(Notification::info(
            "AI statistical analysis performed. Results ready for review.",
        ));
        Ok(())
    }

    /// Validate the analysis (Statistician only)
    pub fn validate(
        &mut self,
        store: &mut ProjectStore,
        actor: Option<&User>,
        interpretation: Option<String>,
    ) -> Result<(), WorkflowError> {
        let interpretation =
            interpretation.or_else(|| Some("Validated by Statistician.".to_string()));
        store.validate_analysis(actor, interpretation)?;
        self.notification = Some(Notification::success(
            "Statistical analysis validated by Statistician (Simulated).",
        ));
        Ok(())
    }

    /// Close the data stage and move to manuscript writing
    pub fn proceed_to_manuscript(
        &mut self,
        store: &mut ProjectStore,
        actor: Option<&User>,
    ) -> Result<(), WorkflowError> {
        store.advance_stage(actor, ModuleStage::ManuscriptWriting)?;
        self.notification = Some(Notification::success("Proceeding to Manuscript Writing."));
        Ok(())
    }
}

fn join_catalog_names(catalog: &[fixtures::StatCatalogEntry], ids: &[String]) -> String {
    let names: Vec<&str> = ids
        .iter()
        .filter_map(|id| fixtures::catalog_name(catalog, id))
        .collect();
    if names.is_empty() {
        "None selected.".to_string()
    } else {
        names.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rr_test_utils::{test_hcp, test_statistician, MockGateway, RecordedCall};

    fn store_at_data(hcp: &User) -> ProjectStore {
        let mut store = ProjectStore::new();
        store
            .start_new_project(Some(hcp), "Hypertension Study", None)
            .unwrap();
        store
            .advance_stage(Some(hcp), ModuleStage::DataCollectionAnalysis)
            .unwrap();
        store
    }

    #[tokio::test]
    async fn query_generation_strips_sql_fence() {
        let hcp = test_hcp();
        let mut store = store_at_data(&hcp);

        let mock = MockGateway::new();
        mock.push_text("```sql\nSELECT * FROM patients WHERE age > 65;\n```");
        let mut workflow = DataWorkflow::new(mock);
        let sql = workflow
            .generate_query(&mut store, Some(&hcp), "patients over 65")
            .await
            .unwrap();

        assert_eq!(sql, "SELECT * FROM patients WHERE age > 65;");
        let data_set = store.current_project().unwrap().data_set.as_ref().unwrap();
        assert_eq!(data_set.source_query.as_deref(), Some(sql.as_str()));
        assert_eq!(data_set.name, "Extracted Dataset");
    }

    #[tokio::test]
    async fn empty_query_is_rejected() {
        let hcp = test_hcp();
        let mut store = store_at_data(&hcp);
        let mut workflow = DataWorkflow::new(MockGateway::new());

        let err = workflow
            .generate_query(&mut store, Some(&hcp), "   ")
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }

    #[tokio::test]
    async fn extraction_requires_query() {
        let hcp = test_hcp();
        let mut store = store_at_data(&hcp);
        let mut workflow = DataWorkflow::new(MockGateway::new());

        let err = workflow
            .simulate_extraction(&mut store, Some(&hcp))
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }

    #[tokio::test]
    async fn extraction_attaches_simulated_rows() {
        let hcp = test_hcp();
        let mut store = store_at_data(&hcp);

        let mock = MockGateway::new();
        mock.push_text("SELECT 1;");
        let mut workflow = DataWorkflow::new(mock);
        workflow
            .generate_query(&mut store, Some(&hcp), "everything")
            .await
            .unwrap();
        workflow.simulate_extraction(&mut store, Some(&hcp)).unwrap();

        let table = store
            .current_project()
            .unwrap()
            .data_set
            .as_ref()
            .unwrap()
            .simulated_data
            .as_ref()
            .unwrap();
        assert_eq!(table.len(), 5);
        assert!(table.rows[0]["diagnosis_code"].starts_with("ICD10-"));
    }

    #[tokio::test]
    async fn csv_import_names_data_set_after_file() {
        let hcp = test_hcp();
        let mut store = store_at_data(&hcp);
        let mut workflow = DataWorkflow::new(MockGateway::new());

        workflow
            .import_csv_text(
                &mut store,
                Some(&hcp),
                "id,hba1c\n1,6.5\n2,7.1",
                "cohort.csv",
            )
            .unwrap();
        let data_set = store.current_project().unwrap().data_set.as_ref().unwrap();
        assert_eq!(data_set.name, "Uploaded: cohort.csv");
        assert_eq!(data_set.simulated_data.as_ref().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn malformed_csv_is_rejected() {
        let hcp = test_hcp();
        let mut store = store_at_data(&hcp);
        let mut workflow = DataWorkflow::new(MockGateway::new());

        let err = workflow
            .import_csv_text(&mut store, Some(&hcp), "only_a_header", "bad.csv")
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
        assert!(store
            .current_project()
            .unwrap()
            .data_set
            .as_ref()
            .unwrap()
            .simulated_data
            .is_none());
    }

    #[tokio::test]
    async fn analysis_requires_data_and_selections() {
        let hcp = test_hcp();
        let mut store = store_at_data(&hcp);
        let mut workflow = DataWorkflow::new(MockGateway::new());

        let err = workflow
            .run_analysis(&mut store, Some(&hcp), &[], &[], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }

    #[tokio::test]
    async fn analysis_commits_plan_and_results() {
        let hcp = test_hcp();
        let mut store = store_at_data(&hcp);
        let mut workflow = DataWorkflow::new(MockGateway::new());
        workflow
            .import_csv_text(&mut store, Some(&hcp), "group,hba1c\nA,6.5\nB,7.1", "d.csv")
            .unwrap();

        workflow.gateway.push_text("T-test: p = 0.03. | group | mean |");
        workflow
            .run_analysis(
                &mut store,
                Some(&hcp),
                &["central_tendency".to_string()],
                &["ttest".to_string()],
                &[GraphRequest {
                    graph_type: "Bar".into(),
                    x: "group".into(),
                    y: "hba1c".into(),
                    group: None,
                }],
            )
            .await
            .unwrap();

        let analysis = store.current_project().unwrap().analysis.as_ref().unwrap();
        assert!(analysis.plan.contains("Central Tendency"));
        assert!(analysis.plan.contains("Independent T-Test"));
        assert!(analysis.results.as_deref().unwrap().contains("p = 0.03"));
        assert_eq!(analysis.test_types.as_ref().unwrap(), &["ttest"]);
        assert_eq!(analysis.is_validated, None);

        // Prompt carried the data sample and graph request
        let calls = workflow.gateway.calls();
        let RecordedCall::Text { prompt, .. } = &calls[0] else {
            panic!("expected a text call");
        };
        assert!(prompt.contains("Data Columns: group, hba1c"));
        assert!(prompt.contains("A Bar chart"));
    }

    #[tokio::test]
    async fn validation_is_statistician_gated() {
        let hcp = test_hcp();
        let statistician = test_statistician();
        let mut store = store_at_data(&hcp);
        let mut workflow = DataWorkflow::new(MockGateway::new());

        let err = workflow
            .validate(&mut store, Some(&hcp), None)
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Store(StoreError::Access(_))));

        workflow
            .validate(&mut store, Some(&statistician), None)
            .unwrap();
        let analysis = store.current_project().unwrap().analysis.as_ref().unwrap();
        assert_eq!(analysis.is_validated, Some(true));
        assert_eq!(
            analysis.statistician_interpretation.as_deref(),
            Some("Validated by Statistician.")
        );
    }

    #[tokio::test]
    async fn proceed_advances_to_manuscript() {
        let hcp = test_hcp();
        let mut store = store_at_data(&hcp);
        let mut workflow = DataWorkflow::new(MockGateway::new());
        workflow
            .proceed_to_manuscript(&mut store, Some(&hcp))
            .unwrap();
        let project = store.current_project().unwrap();
        assert_eq!(project.current_stage, ModuleStage::ManuscriptWriting);
        assert!(project.manuscript.is_some());
    }
}
