//! Single screening: one job description against one resume.

use tracing::info;

use crate::errors::AppError;
use crate::screening::batch::Analyzer;
use crate::screening::models::ScreeningResult;
use crate::screening::validation::{ScreeningRequest, ValidSingle};

/// Resolves both sides and calls the analyzer once. Unlike a batch, an unreadable
/// file here aborts the operation.
pub async fn run_single(
    request: &ValidSingle,
    analyzer: &dyn Analyzer,
) -> Result<ScreeningResult, AppError> {
    let job_description = request.job_description().resolve().await?;
    let resume = request.resume().resolve().await?;
    let request = ScreeningRequest::new(job_description, resume)?;

    let result = analyzer
        .analyze(&request.job_description, &request.resume)
        .await?;
    info!(score = result.score, "Single screening finished");
    Ok(result)
}
