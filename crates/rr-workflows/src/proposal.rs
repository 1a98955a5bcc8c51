//! Proposal development and ethics workflow
//!
//! Selecting a study design fetches the required sections from the model,
//! falling back to the institutional default set. The ethics sub-flow walks
//! the committee status machine; approval assigns the fixture statistician
//! exactly once.

use indexmap::IndexMap;
use tracing::{info, warn};

use rr_core::fixtures;
use rr_core::prelude::*;
use rr_core::types::SectionInfo;
use rr_gemini::{decode_validated, AiGateway};

use crate::error::WorkflowError;
use crate::notify::Notification;

/// The proposal stage workflow
pub struct ProposalWorkflow<G> {
    gateway: G,
    notification: Option<Notification>,
}

impl<G: AiGateway> ProposalWorkflow<G> {
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

    /// Select a study design and configure the proposal's sections
    ///
    /// The section list comes from the model; on failure the default eight
    /// sections are used instead. Background and objective text from the idea
    /// seeds matching sections.
    pub async fn select_proposal_type(
        &mut self,
        store: &mut ProjectStore,
        actor: Option<&User>,
        type_name: &str,
    ) -> Result<(), WorkflowError> {
        let idea = store
            .current_project()
            .ok_or(StoreError::NoActiveProject)?
            .idea
            .clone();

        self.notification = Some(Notification::info(format!(
            "Configuring proposal for: {type_name}..."
        )));
        store.set_loading(true);

        let system_instruction = format!(
            "For a \"{type_name}\" research proposal, provide the standard sections. Output as a JSON array of objects, where each object has \"id\" (string, lowercase_snake_case), \"name\" (string, Title Case), and \"placeholder\" (string, a helpful prompt for the user)."
        );
        let prompt = format!("List the sections for a {type_name} proposal.");
        let response = self
            .gateway
            .generate_json(&prompt, Some(&system_instruction))
            .await;
        store.set_loading(false);

        let sections: Vec<SectionInfo> = match decode_validated::<Vec<SectionInfo>>(response) {
            Ok(sections) if !sections.is_empty() => sections,
            Ok(_) | Err(_) => {
                warn!("section fetch failed, using default proposal sections");
                store.set_error("Failed to fetch proposal structure. Using default sections.");
                fixtures::default_proposal_sections()
            }
        };

        // Seed section text from the idea where ids line up
        let mut content: IndexMap<String, String> = IndexMap::new();
        if let Some(idea) = &idea {
            if let Some(background) = &idea.background {
                if let Some(section) = sections.iter().find(|s| s.id.contains("background")) {
                    content.insert(section.id.clone(), background.clone());
                }
            }
            if let Some(objective) = &idea.objective {
                if let Some(section) = sections.iter().find(|s| s.id.contains("objective")) {
                    content.insert(section.id.clone(), objective.clone());
                }
            }
        }

        store.update_proposal(
            actor,
            ProposalPatch {
                proposal_type: Some(type_name.to_string()),
                required_sections: Some(sections),
                sections: Some(content),
                ..ProposalPatch::default()
            },
        )?;
        self.notification = Some(Notification::success(format!(
            "Proposal configured for {type_name}."
        )));
        Ok(())
    }

    /// Save edited section text
    pub fn save_sections(
        &mut self,
        store: &mut ProjectStore,
        actor: Option<&User>,
        sections: IndexMap<String, String>,
    ) -> Result<(), WorkflowError> {
        store.update_proposal(
            actor,
            ProposalPatch {
                sections: Some(sections),
                ..ProposalPatch::default()
            },
        )?;
        self.notification = Some(Notification::success("Proposal draft saved successfully!"));
        Ok(())
    }

    /// Submit (or resubmit) the proposal to the ethics committee
    pub fn submit_to_ethics(
        &mut self,
        store: &mut ProjectStore,
        actor: Option<&User>,
    ) -> Result<(), WorkflowError> {
        store.update_proposal(
            actor,
            ProposalPatch {
                ethics_status: Some(EthicsStatus::Submitted),
                ..ProposalPatch::default()
            },
        )?;
        self.notification = Some(Notification::success(
            "Proposal submitted to Ethics Committee/IRB (Simulated).",
        ));
        Ok(())
    }

    /// Record committee feedback, moving the proposal back to editing
    pub fn record_feedback(
        &mut self,
        store: &mut ProjectStore,
        actor: Option<&User>,
        feedback: impl Into<String>,
    ) -> Result<(), WorkflowError> {
        store.update_proposal(
            actor,
            ProposalPatch {
                ethics_status: Some(EthicsStatus::FeedbackReceived),
                ethics_feedback: Some(feedback.into()),
                ..ProposalPatch::default()
            },
        )?;
        self.notification = Some(Notification::info(
            "Simulated feedback received from Ethics Committee.",
        ));
        Ok(())
    }

    /// Mark the proposal approved and assign the statistician
    ///
    /// The assignment happens once; re-approving an already-approved proposal
    /// is a no-op.
    pub fn mark_approved(
        &mut self,
        store: &mut ProjectStore,
        actor: Option<&User>,
    ) -> Result<(), WorkflowError> {
        let already_assigned = store
            .current_project()
            .ok_or(StoreError::NoActiveProject)?
            .assigned_statistician
            .is_some();

        store.update_proposal(
            actor,
            ProposalPatch {
                ethics_status: Some(EthicsStatus::Approved),
                ethics_feedback: Some(
                    "Congratulations! Your proposal has been approved.".to_string(),
                ),
                ..ProposalPatch::default()
            },
        )?;
        info!("proposal approved by ethics committee");

        if already_assigned {
            self.notification = Some(Notification::success("Proposal Approved!"));
        } else {
            let statistician = fixtures::user_for_role(UserRole::Statistician);
            store.assign_expert(actor, ExpertKind::Statistician, statistician.id.clone())?;
            self.notification = Some(Notification::success(format!(
                "Proposal Approved! Statistician \"{}\" has been assigned.",
                statistician.name
            )));
        }
        Ok(())
    }

    /// Close the proposal stage; requires ethics approval
    pub fn proceed_to_data_collection(
        &mut self,
        store: &mut ProjectStore,
        actor: Option<&User>,
    ) -> Result<(), WorkflowError> {
        let approved = store
            .current_project()
            .and_then(|p| p.proposal.as_ref())
            .is_some_and(|p| p.ethics_status == EthicsStatus::Approved);
        if !approved {
            let message = "Proposal must be approved by the Ethics Committee before proceeding.";
            store.set_error(message);
            return Err(WorkflowError::validation(message));
        }

        store.advance_stage(actor, ModuleStage::DataCollectionAnalysis)?;
        self.notification = Some(Notification::success(
            "Proceeding to Data Collection & Analysis.",
        ));
        Ok(())
    }
}
