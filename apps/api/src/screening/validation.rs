//! Explicit precondition checks, run once before any extraction or remote call.

use thiserror::Error;

use crate::extract::{extract_text_async, UnreadableFileError, UploadedDocument};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
    #[error("Please provide a Job Description (pasted text or a file)")]
    MissingJobDescription,

    #[error("Please upload at least one resume")]
    MissingResumes,

    #[error("Please provide a resume (pasted text or a file)")]
    MissingResume,

    #[error("The job description contains no readable text")]
    EmptyJobDescription,

    #[error("The resume contains no readable text")]
    EmptyResume,
}

/// Where a piece of text comes from: typed into a field, or uploaded as a file.
#[derive(Debug, Clone)]
pub enum ContentSource {
    Text(String),
    File(UploadedDocument),
}

impl ContentSource {
    /// Picks the uploaded file when both are supplied. Blank text counts as absent.
    pub fn from_parts(text: Option<String>, file: Option<UploadedDocument>) -> Option<Self> {
        match (file, text) {
            (Some(file), _) => Some(ContentSource::File(file)),
            (None, Some(text)) if !text.trim().is_empty() => Some(ContentSource::Text(text)),
            _ => None,
        }
    }

    /// Pasted text is used verbatim; files go through the extractor.
    pub async fn resolve(&self) -> Result<String, UnreadableFileError> {
        match self {
            ContentSource::Text(text) => Ok(text.clone()),
            ContentSource::File(document) => extract_text_async(document).await,
        }
    }
}

/// A (job description, resume) text pair, both non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreeningRequest {
    pub job_description: String,
    pub resume: String,
}

impl ScreeningRequest {
    pub fn new(job_description: String, resume: String) -> Result<Self, PreconditionError> {
        if job_description.trim().is_empty() {
            return Err(PreconditionError::EmptyJobDescription);
        }
        if resume.trim().is_empty() {
            return Err(PreconditionError::EmptyResume);
        }
        Ok(Self {
            job_description,
            resume,
        })
    }
}

/// Unvalidated batch input, as read from the request.
#[derive(Debug, Default)]
pub struct BatchRequest {
    pub job_description: Option<ContentSource>,
    pub resumes: Vec<UploadedDocument>,
}

/// A batch that passed `validate_batch`. Only constructible through validation.
#[derive(Debug, Clone)]
pub struct ValidBatch {
    job_description: ContentSource,
    resumes: Vec<UploadedDocument>,
}

impl ValidBatch {
    pub fn job_description(&self) -> &ContentSource {
        &self.job_description
    }

    pub fn resumes(&self) -> &[UploadedDocument] {
        &self.resumes
    }
}

pub fn validate_batch(request: BatchRequest) -> Result<ValidBatch, PreconditionError> {
    let job_description = request
        .job_description
        .ok_or(PreconditionError::MissingJobDescription)?;
    if request.resumes.is_empty() {
        return Err(PreconditionError::MissingResumes);
    }
    Ok(ValidBatch {
        job_description,
        resumes: request.resumes,
    })
}

#[derive(Debug, Default)]
pub struct SingleRequest {
    pub job_description: Option<ContentSource>,
    pub resume: Option<ContentSource>,
}

#[derive(Debug, Clone)]
pub struct ValidSingle {
    job_description: ContentSource,
    resume: ContentSource,
}

impl ValidSingle {
    pub fn job_description(&self) -> &ContentSource {
        &self.job_description
    }

    pub fn resume(&self) -> &ContentSource {
        &self.resume
    }
}

pub fn validate_single(request: SingleRequest) -> Result<ValidSingle, PreconditionError> {
    let job_description = request
        .job_description
        .ok_or(PreconditionError::MissingJobDescription)?;
    let resume = request.resume.ok_or(PreconditionError::MissingResume)?;
    Ok(ValidSingle {
        job_description,
        resume,
    })
}
