//! Simulated personas, knowledge bases and catalogs
//!
//! The platform runs against simulated institutional infrastructure: fixture
//! users stand in for a directory, the knowledge-base strings feed the RAG
//! prompts, and the catalogs drive proposal and analysis-plan selection.

use indexmap::IndexMap;
use rand::Rng;

use crate::tabular::DataTable;
use crate::types::{SectionInfo, User, UserRole};

/// Application title
pub const APP_TITLE: &str = "Electronic Research Records";
/// Application subtitle
pub const APP_SUBTITLE: &str = "AI-Driven End-to-End Automation of Clinical Research";

/// All fixture personas, one per role
#[must_use]
pub fn fixture_users() -> Vec<User> {
    vec![
        User::new("user_hcp_1", "Dr. Alice Smith", UserRole::HealthcareProfessional),
        User::new("user_researcher_1", "Prof. Bob Johnson", UserRole::ExperiencedResearcher),
        User::new("user_statistician_1", "Dr. Carol White", UserRole::Statistician),
        User::new("user_data_engineer_1", "Mr. David Lee", UserRole::DataEngineer),
        User::new("user_admin_1", "Admin User", UserRole::Administrator),
    ]
}

/// The fixture persona for a role, synthesizing one if the directory has none
#[must_use]
pub fn user_for_role(role: UserRole) -> User {
    fixture_users()
        .into_iter()
        .find(|u| u.role == role)
        .unwrap_or_else(|| User::new(format!("user_{}", role.label().to_lowercase()), role.label(), role))
}

/// Simulated PubMed literature source, fed into idea-stage RAG prompts
pub const PUBMED_API_SIM: &str =
    "Simulated PubMed API providing summaries of relevant medical literature.";
/// Simulated institutional guidelines source
pub const INSTITUTIONAL_GUIDELINES_SIM: &str =
    "Simulated Institutional Research Guidelines for proposal development and ethics.";
/// Simulated journal database source
pub const JOURNAL_DATABASE_SIM: &str =
    "Simulated database of journal aims, scopes, and impact factors.";

/// Default proposal sections used when the AI section fetch fails
#[must_use]
pub fn default_proposal_sections() -> Vec<SectionInfo> {
    vec![
        SectionInfo::new("background", "Detailed Background")
            .with_placeholder("Expand on the literature, identify gaps..."),
        SectionInfo::new("objectives", "Research Objectives/Hypotheses")
            .with_placeholder("Clearly state primary and secondary objectives or testable hypotheses."),
        SectionInfo::new("methodology", "Methodology")
            .with_placeholder("Study design, patient population, data collection methods, variables..."),
        SectionInfo::new("sampleSize", "Sample Size Justification")
            .with_placeholder("How was the sample size determined? Power calculations?"),
        SectionInfo::new("dataAnalysisPlan", "Data Analysis Plan")
            .with_placeholder("Statistical methods to be used for each objective."),
        SectionInfo::new("budget", "Budget (Brief Outline)")
            .with_placeholder("Estimated costs for personnel, supplies, etc. (if applicable)."),
        SectionInfo::new("ethics", "Ethical Considerations")
            .with_placeholder("Patient consent, data privacy, potential risks and mitigation."),
        SectionInfo::new("dissemination", "Dissemination Plan")
            .with_placeholder("How will findings be shared? (e.g., publication, presentation)."),
    ]
}

/// A selectable study design
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalType {
    /// Stable id
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Short description
    pub description: &'static str,
}

/// Selectable study designs for proposal development
pub const PROPOSAL_TYPES: &[ProposalType] = &[
    ProposalType {
        id: "observational",
        name: "Observational Study",
        description: "Observe subjects and measure variables without assigning treatments. Good for identifying associations.",
    },
    ProposalType {
        id: "prospective",
        name: "Prospective Cohort Study",
        description: "Follow a group over time to see how factors affect outcomes. Powerful for causality.",
    },
    ProposalType {
        id: "rct",
        name: "Randomized Controlled Trial",
        description: "Randomly assign subjects to treatment or control groups. The gold standard for intervention studies.",
    },
    ProposalType {
        id: "case_report",
        name: "Case Report / Series",
        description: "Detailed report on individual patients. Useful for rare conditions or novel treatments.",
    },
    ProposalType {
        id: "systematic_review",
        name: "Systematic Review",
        description: "Review existing literature to answer a specific question using systematic methods.",
    },
];

/// A selectable statistical catalog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatCatalogEntry {
    /// Stable id
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Short description (inferential tests only)
    pub description: Option<&'static str>,
}

/// Descriptive statistics available for the analysis plan
pub const DESCRIPTIVE_STATS: &[StatCatalogEntry] = &[
    StatCatalogEntry {
        id: "central_tendency",
        name: "Central Tendency (Mean, Median, Mode)",
        description: None,
    },
    StatCatalogEntry {
        id: "dispersion",
        name: "Dispersion (Standard Deviation, Variance, Range)",
        description: None,
    },
    StatCatalogEntry {
        id: "frequency",
        name: "Frequency Counts & Percentages (for categorical data)",
        description: None,
    },
];

/// Inferential tests available for the analysis plan
pub const INFERENTIAL_TESTS: &[StatCatalogEntry] = &[
    StatCatalogEntry {
        id: "ttest",
        name: "Independent T-Test",
        description: Some("Compare means of two independent groups."),
    },
    StatCatalogEntry {
        id: "anova",
        name: "ANOVA",
        description: Some("Compare means of three or more groups."),
    },
    StatCatalogEntry {
        id: "chi2",
        name: "Chi-Square Test",
        description: Some("Test association between two categorical variables."),
    },
    StatCatalogEntry {
        id: "linreg",
        name: "Linear Regression",
        description: Some("Model the relationship between variables."),
    },
    StatCatalogEntry {
        id: "logreg",
        name: "Logistic Regression",
        description: Some("Model the probability of a binary outcome."),
    },
];

/// Graph types offered for analysis output
pub const GRAPH_TYPES: &[&str] = &["Bar", "Line", "Scatter", "Histogram", "BoxPlot"];

/// Look up a catalog entry name by id
#[must_use]
pub fn catalog_name(catalog: &[StatCatalogEntry], id: &str) -> Option<&'static str> {
    catalog.iter().find(|e| e.id == id).map(|e| e.name)
}

/// Produce a simulated extraction result for a generated query
///
/// Five cohort rows with randomized record ids and ICD-10-style diagnosis
/// codes, mimicking a warehouse pull.
#[must_use]
pub fn simulated_extraction() -> DataTable {
    let mut rng = rand::rng();
    let headers: Vec<String> = ["name", "value", "pv", "amt", "hba1c", "id", "diagnosis_code"]
        .iter()
        .map(|s| (*s).to_string())
        .collect();
    let base = [
        ("Group A", 400, 2400, 2400, 6.5),
        ("Group B", 300, 1398, 2210, 7.1),
        ("Group C", 200, 9800, 2290, 8.2),
        ("Group D", 278, 3908, 2000, 6.9),
        ("Group E", 189, 4800, 2181, 7.5),
    ];
    let rows = base
        .iter()
        .map(|(name, value, pv, amt, hba1c)| {
            let record_id: u32 = rng.random_range(100_000..1_000_000);
            let code: u8 = rng.random_range(0..100);
            let mut row = IndexMap::new();
            row.insert("name".to_string(), (*name).to_string());
            row.insert("value".to_string(), value.to_string());
            row.insert("pv".to_string(), pv.to_string());
            row.insert("amt".to_string(), amt.to_string());
            row.insert("hba1c".to_string(), hba1c.to_string());
            row.insert("id".to_string(), format!("rec{record_id}"));
            row.insert("diagnosis_code".to_string(), format!("ICD10-{code}"));
            row
        })
        .collect();
    DataTable { headers, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn one_fixture_user_per_role() {
        let users = fixture_users();
        assert_eq!(users.len(), 5);
        for role in [
            UserRole::HealthcareProfessional,
            UserRole::ExperiencedResearcher,
            UserRole::Statistician,
            UserRole::DataEngineer,
            UserRole::Administrator,
        ] {
            assert_eq!(users.iter().filter(|u| u.role == role).count(), 1);
        }
    }

    #[test]
    fn user_for_role_picks_fixture() {
        let user = user_for_role(UserRole::Statistician);
        assert_eq!(user.name, "Dr. Carol White");
        assert_eq!(user.id.0, "user_statistician_1");
    }

    #[test]
    fn eight_default_proposal_sections() {
        let sections = default_proposal_sections();
        assert_eq!(sections.len(), 8);
        assert_eq!(sections[0].id, "background");
        assert_eq!(sections[7].id, "dissemination");
        assert!(sections.iter().all(|s| s.placeholder.is_some()));
    }

    #[test]
    fn catalog_lookup() {
        assert_eq!(
            catalog_name(INFERENTIAL_TESTS, "anova"),
            Some("ANOVA")
        );
        assert_eq!(catalog_name(DESCRIPTIVE_STATS, "missing"), None);
    }

    #[test]
    fn simulated_extraction_shape() {
        let table = simulated_extraction();
        assert_eq!(table.len(), 5);
        assert_eq!(table.headers.len(), 7);
        for row in &table.rows {
            assert!(row["diagnosis_code"].starts_with("ICD10-"));
            assert!(row["id"].starts_with("rec"));
        }
    }
}
