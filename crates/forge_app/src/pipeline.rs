//! Pipeline Driver.
//!
//! Documents are processed one at a time: extract → prompt → generate →
//! normalize. A failure in any step is logged against the document and the
//! batch moves on; the workbook is rendered once at the end from whatever
//! succeeded.

use std::path::{Path, PathBuf};

use forge_ai::{GenerationClient, GenerationError};
use forge_core::ForgeConfig;
use forge_docs::{ExtractError, RenderError, RequirementExtractor, write_workbook};
use forge_qa::{DocumentPlan, MalformedResponseError, Normalizer, build_prompt};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::summary::RunSummary;

/// Why a single document was skipped.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("extraction failed: {0}")]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Malformed(#[from] MalformedResponseError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFailure {
    pub document: String,
    pub error: String,
}

/// Plans gathered from a batch, before rendering.
#[derive(Debug, Default)]
pub struct Collected {
    pub plans: Vec<(String, DocumentPlan)>,
    pub failures: Vec<DocumentFailure>,
}

pub struct Pipeline<'a, E> {
    client: &'a GenerationClient,
    normalizer: &'a Normalizer,
    extractor: E,
    output_path: PathBuf,
    manual_min_per_test: u32,
    ai_min_per_test: u32,
}

impl<'a, E: RequirementExtractor> Pipeline<'a, E> {
    pub fn new(
        config: &ForgeConfig,
        client: &'a GenerationClient,
        normalizer: &'a Normalizer,
        extractor: E,
    ) -> Self {
        Self {
            client,
            normalizer,
            extractor,
            output_path: config.output_path.clone(),
            manual_min_per_test: config.manual_min_per_test,
            ai_min_per_test: config.ai_min_per_test,
        }
    }

    /// Run one document through extraction, generation and normalization.
    pub async fn process_document(&self, path: &Path) -> Result<DocumentPlan, DocumentError> {
        let name = document_name(path);
        let requirements = self.extractor.extract(path)?;
        let prompt = build_prompt(&requirements);
        let raw = self.client.generate(&prompt).await?;
        let plan = self.normalizer.normalize(&raw, &name)?;
        info!(
            document = %name,
            scenarios = plan.scenario_count(),
            "Document processed"
        );
        Ok(plan)
    }

    /// Process every source in order, isolating per-document failures.
    pub async fn collect(&self, sources: &[PathBuf]) -> Collected {
        let mut collected = Collected::default();
        for path in sources {
            let name = document_name(path);
            match self.process_document(path).await {
                Ok(plan) => collected.plans.push((name, plan)),
                Err(e) => {
                    error!(document = %name, error = %e, "Failed to process document");
                    collected.failures.push(DocumentFailure {
                        document: name,
                        error: e.to_string(),
                    });
                }
            }
        }
        collected
    }

    /// Process the batch and write the workbook when anything succeeded.
    ///
    /// Only a render failure aborts the run.
    pub async fn run(&self, sources: &[PathBuf]) -> Result<RunSummary, RenderError> {
        let Collected { plans, failures } = self.collect(sources).await;

        let mut summary = RunSummary {
            processed: plans.iter().map(|(name, _)| name.clone()).collect(),
            total_cases: plans.iter().map(|(_, plan)| plan.scenario_count()).sum(),
            failures,
            output: None,
            manual_min_per_test: self.manual_min_per_test,
            ai_min_per_test: self.ai_min_per_test,
        };

        if plans.is_empty() {
            warn!(
                documents = sources.len(),
                "No plans generated; skipping workbook"
            );
            return Ok(summary);
        }

        write_workbook(&self.output_path, &plans)?;
        summary.output = Some(self.output_path.clone());
        Ok(summary)
    }
}

/// File stem used for sheet titles, logs and diagnostic dumps.
pub fn document_name(path: &Path) -> String {
    path.file_stem()
        .or_else(|| path.file_name())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
