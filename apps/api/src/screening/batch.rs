//! Batch Screening Orchestrator.
//!
//! Resolves the job description once, then screens each resume strictly one at a
//! time in submission order. A failing resume becomes an `error` ledger entry and the
//! batch moves on; only precondition failures and an unreadable job description abort
//! the whole run. At most one scoring request is ever in flight.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::extract::{extract_text_async, UploadedDocument};
use crate::screening::models::ScreeningResult;
use crate::screening::validation::{ContentSource, PreconditionError, ScreeningRequest, ValidBatch};

/// The remote scoring operation as seen by the orchestrator.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, job_description: &str, resume: &str) -> Result<ScreeningResult, AppError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Success,
    Error,
}

/// Outcome for one resume. Never mutated after it is appended.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub file_name: String,
    pub status: EntryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ScreeningResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LedgerEntry {
    fn success(file_name: &str, data: ScreeningResult) -> Self {
        Self {
            file_name: file_name.to_string(),
            status: EntryStatus::Success,
            data: Some(data),
            error: None,
        }
    }

    fn failure(file_name: &str, error: String) -> Self {
        Self {
            file_name: file_name.to_string(),
            status: EntryStatus::Error,
            data: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == EntryStatus::Success
    }
}

/// Monotonic `(processed, total)` pair reported after every entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchProgress {
    pub processed: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_ledger(ledger: &[LedgerEntry]) -> Self {
        let succeeded = ledger.iter().filter(|e| e.is_success()).count();
        Self {
            total: ledger.len(),
            succeeded,
            failed: ledger.len() - succeeded,
        }
    }
}

/// Runs a validated batch. `on_entry` is called once per resume, in order, right after
/// its entry is created.
pub async fn run_batch<F>(
    batch: &ValidBatch,
    analyzer: &dyn Analyzer,
    mut on_entry: F,
) -> Result<Vec<LedgerEntry>, AppError>
where
    F: FnMut(BatchProgress, &LedgerEntry) + Send,
{
    let job_description = resolve_job_description(batch.job_description()).await?;

    let total = batch.resumes().len();
    info!(total, "Starting batch screening");

    let mut ledger = Vec::with_capacity(total);
    for resume in batch.resumes() {
        let entry = match screen_resume(&job_description, resume, analyzer).await {
            Ok(result) => LedgerEntry::success(&resume.name, result),
            Err(e) => {
                warn!(file = %resume.name, "Resume screening failed: {e}");
                LedgerEntry::failure(&resume.name, e.to_string())
            }
        };

        on_entry(
            BatchProgress {
                processed: ledger.len() + 1,
                total,
            },
            &entry,
        );
        ledger.push(entry);
    }

    let summary = BatchSummary::from_ledger(&ledger);
    info!(
        total = summary.total,
        succeeded = summary.succeeded,
        failed = summary.failed,
        "Batch screening finished"
    );

    Ok(ledger)
}

/// An unreadable or blank job description aborts the batch before any resume is read.
async fn resolve_job_description(source: &ContentSource) -> Result<String, AppError> {
    let text = source.resolve().await?;
    if text.trim().is_empty() {
        return Err(PreconditionError::EmptyJobDescription.into());
    }
    Ok(text)
}

async fn screen_resume(
    job_description: &str,
    resume: &UploadedDocument,
    analyzer: &dyn Analyzer,
) -> Result<ScreeningResult, AppError> {
    let resume_text = extract_text_async(resume).await?;
    let request = ScreeningRequest::new(job_description.to_string(), resume_text)?;
    analyzer
        .analyze(&request.job_description, &request.resume)
        .await
}
