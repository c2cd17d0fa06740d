use serde::{Deserialize, Serialize};

/// Counters returned by the import endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportSummary {
    pub successful_imports: u32,
    pub failed_imports: u32,
    pub total_records: u32,
    pub skipped_records: u32,
    pub errors: Vec<String>,
}

/// How an import went, as far as the user is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ImportOutcome {
    /// Every record was imported.
    Complete(ImportSummary),
    /// Some records were imported, some failed or were skipped.
    Partial(ImportSummary),
    /// Nothing was imported.
    Failed(ImportSummary),
}

impl ImportSummary {
    pub fn outcome(self) -> ImportOutcome {
        if self.successful_imports == 0 {
            ImportOutcome::Failed(self)
        } else if self.failed_imports == 0 && self.skipped_records == 0 {
            ImportOutcome::Complete(self)
        } else {
            ImportOutcome::Partial(self)
        }
    }
}

impl ImportOutcome {
    pub fn summary(&self) -> &ImportSummary {
        match self {
            ImportOutcome::Complete(summary)
            | ImportOutcome::Partial(summary)
            | ImportOutcome::Failed(summary) => summary,
        }
    }

    /// The import page moves on to the list once anything was imported.
    pub fn navigates_away(&self) -> bool {
        self.summary().successful_imports > 0
    }

    pub fn message(&self) -> String {
        let summary = self.summary();
        match self {
            ImportOutcome::Complete(_) => format!(
                "Imported all {} record(s)",
                summary.successful_imports
            ),
            ImportOutcome::Partial(_) => format!(
                "Imported {} record(s); {} failed, {} skipped",
                summary.successful_imports, summary.failed_imports, summary.skipped_records
            ),
            ImportOutcome::Failed(_) => format!(
                "No records imported; {} failed, {} skipped",
                summary.failed_imports, summary.skipped_records
            ),
        }
    }
}
