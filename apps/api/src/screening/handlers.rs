use std::convert::Infallible;

use axum::{
    extract::{Multipart, Path, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_stream::{wrappers::UnboundedReceiverStream, Stream, StreamExt};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::{AuthUser, Identity};
use crate::errors::AppError;
use crate::extract::UploadedDocument;
use crate::screening::batch::{run_batch, BatchProgress, BatchSummary, LedgerEntry};
use crate::screening::models::ScreeningResult;
use crate::screening::scorer::ScreeningSession;
use crate::screening::single::run_single;
use crate::screening::validation::{
    validate_batch, validate_single, BatchRequest, ContentSource, SingleRequest,
};
use crate::state::AppState;
use crate::webhook::EmailType;

/// Multipart form fields, collected before validation.
#[derive(Debug, Default)]
struct ScreeningForm {
    jd_text: Option<String>,
    jd_file: Option<UploadedDocument>,
    resume_text: Option<String>,
    resume_file: Option<UploadedDocument>,
    resumes: Vec<UploadedDocument>,
}

impl ScreeningForm {
    async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = ScreeningForm::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("Malformed upload: {e}")))?
        {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read field '{name}': {e}")))?;

            let as_text = || {
                String::from_utf8(bytes.to_vec())
                    .map_err(|_| AppError::Validation(format!("Field '{name}' must be UTF-8 text")))
            };
            let as_document = || {
                let document_name = file_name.clone().unwrap_or_else(|| name.clone());
                UploadedDocument::new(document_name, bytes.clone())
            };

            match name.as_str() {
                "jd_text" => form.jd_text = Some(as_text()?),
                "resume_text" => form.resume_text = Some(as_text()?),
                // Browsers send an empty part for an untouched file input.
                "jd_file" if !bytes.is_empty() => form.jd_file = Some(as_document()),
                "resume_file" if !bytes.is_empty() => form.resume_file = Some(as_document()),
                "resumes" if !bytes.is_empty() || file_name.is_some() => {
                    form.resumes.push(as_document())
                }
                "jd_file" | "resume_file" | "resumes" => {}
                other => warn!("Ignoring unexpected form field '{other}'"),
            }
        }
        Ok(form)
    }

    fn into_batch_request(self) -> BatchRequest {
        BatchRequest {
            job_description: ContentSource::from_parts(self.jd_text, self.jd_file),
            resumes: self.resumes,
        }
    }

    fn into_single_request(self) -> SingleRequest {
        SingleRequest {
            job_description: ContentSource::from_parts(self.jd_text, self.jd_file),
            resume: ContentSource::from_parts(self.resume_text, self.resume_file),
        }
    }
}

async fn open_session(state: &AppState, identity: Identity) -> ScreeningSession {
    let user_id = identity.user_id;
    let session = ScreeningSession::open(
        state.scorer.clone(),
        state.screenings.clone(),
        state.settings.as_ref(),
        identity,
    )
    .await;
    debug!(%user_id, provider = session.provider(), "Screening session opened");
    session
}

/// POST /api/v1/screenings/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    multipart: Multipart,
) -> Result<Json<ScreeningResult>, AppError> {
    let request = validate_single(ScreeningForm::read(multipart).await?.into_single_request())?;
    let session = open_session(&state, identity).await;
    let result = run_single(&request, &session).await?;
    Ok(Json(result))
}

#[derive(Serialize)]
pub struct BatchResponse {
    pub summary: BatchSummary,
    pub results: Vec<LedgerEntry>,
}

/// POST /api/v1/screenings/batch
pub async fn handle_batch(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    multipart: Multipart,
) -> Result<Json<BatchResponse>, AppError> {
    let batch = validate_batch(ScreeningForm::read(multipart).await?.into_batch_request())?;
    let session = open_session(&state, identity).await;

    let results = run_batch(&batch, &session, |progress, entry| {
        info!(
            "Processed {}/{}: {} ({:?})",
            progress.processed, progress.total, entry.file_name, entry.status
        );
    })
    .await?;

    Ok(Json(BatchResponse {
        summary: BatchSummary::from_ledger(&results),
        results,
    }))
}

#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
enum BatchEvent {
    Entry {
        #[serde(flatten)]
        progress: BatchProgress,
        entry: LedgerEntry,
    },
    Done {
        summary: BatchSummary,
    },
    Error {
        code: &'static str,
        message: String,
    },
}

impl BatchEvent {
    fn name(&self) -> &'static str {
        match self {
            BatchEvent::Entry { .. } => "entry",
            BatchEvent::Done { .. } => "done",
            BatchEvent::Error { .. } => "error",
        }
    }

    fn into_sse(self) -> Event {
        let event = Event::default().event(self.name());
        match event.json_data(&self) {
            Ok(event) => event,
            Err(e) => Event::default()
                .event("error")
                .data(format!("failed to encode batch event: {e}")),
        }
    }
}

/// POST /api/v1/screenings/batch/stream
///
/// Streams one `entry` event per resume as it finishes, then `done`. The batch runs
/// on its own task and completes even if the client disconnects.
pub async fn handle_batch_stream(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    multipart: Multipart,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let batch = validate_batch(ScreeningForm::read(multipart).await?.into_batch_request())?;
    let session = open_session(&state, identity).await;

    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let outcome = run_batch(&batch, &session, |progress, entry| {
            let _ = tx.send(BatchEvent::Entry {
                progress,
                entry: entry.clone(),
            });
        })
        .await;

        let last = match outcome {
            Ok(ledger) => BatchEvent::Done {
                summary: BatchSummary::from_ledger(&ledger),
            },
            Err(e) => BatchEvent::Error {
                code: e.code(),
                message: e.to_string(),
            },
        };
        let _ = tx.send(last);
    });

    let stream =
        UnboundedReceiverStream::new(rx).map(|event| Ok::<_, Infallible>(event.into_sse()));
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

#[derive(Debug, Deserialize)]
pub struct SendEmailRequest {
    #[serde(rename = "type")]
    pub email_type: EmailType,
}

/// POST /api/v1/screenings/:id/email
pub async fn handle_send_email(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(screening_id): Path<Uuid>,
    Json(req): Json<SendEmailRequest>,
) -> Result<Json<Value>, AppError> {
    ensure_screening_exists(&state, &identity, screening_id).await?;
    let reply = state
        .webhook
        .send_email(
            Some(&identity.access_token),
            identity.user_id,
            screening_id,
            req.email_type,
        )
        .await?;
    info!("Sent {:?} email for screening {screening_id}", req.email_type);
    Ok(Json(reply))
}

#[derive(Debug, Deserialize)]
pub struct ScheduleInterviewRequest {
    pub datetime: String,
}

/// POST /api/v1/screenings/:id/schedule
pub async fn handle_schedule_interview(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(screening_id): Path<Uuid>,
    Json(req): Json<ScheduleInterviewRequest>,
) -> Result<Json<Value>, AppError> {
    let datetime = parse_interview_time(&req.datetime)?;
    ensure_screening_exists(&state, &identity, screening_id).await?;
    let reply = state
        .webhook
        .schedule_interview(
            Some(&identity.access_token),
            identity.user_id,
            screening_id,
            datetime,
        )
        .await?;
    info!("Scheduled interview for screening {screening_id} at {datetime}");
    Ok(Json(reply))
}

fn parse_interview_time(raw: &str) -> Result<DateTime<FixedOffset>, AppError> {
    DateTime::parse_from_rfc3339(raw.trim()).map_err(|_| {
        AppError::Validation(format!(
            "datetime must be an RFC 3339 timestamp (e.g. 2026-11-02T15:30:00Z), got '{raw}'"
        ))
    })
}

async fn ensure_screening_exists(
    state: &AppState,
    identity: &Identity,
    screening_id: Uuid,
) -> Result<(), AppError> {
    state
        .screenings
        .get_screening(identity.user_id, screening_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::NotFound(format!("Screening {screening_id} not found")))
}
