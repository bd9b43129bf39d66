//! Shared fixtures and fakes for unit tests.

use std::collections::VecDeque;
use std::io::{Cursor, Write};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use tokio::sync::Notify;
use uuid::Uuid;

use crate::account::profile::{Profile, ProfileStore, ProfileUpdate, DEFAULT_ROLE};
use crate::account::settings::{SettingsStore, UserSettings};
use crate::auth::{Identity, IdentityProvider};
use crate::config::Config;
use crate::errors::AppError;
use crate::history::store::{NewScreening, ScreeningQuery, ScreeningStore, SortBy};
use crate::models::screening::ScreeningRow;
use crate::screening::batch::Analyzer;
use crate::screening::models::{parse_scoring_response, ScreeningResult};
use crate::screening::scorer::{Scorer, ScoringRequest};
use crate::state::AppState;
use crate::webhook::WebhookClient;

// ────────────────────────────────────────────────────────────────────────────
// Document fixtures
// ────────────────────────────────────────────────────────────────────────────

/// A PDF with one page per entry, each page showing its text in a single `Tj`.
pub fn pdf_with_pages(page_texts: &[&str]) -> Vec<u8> {
    let streams: Vec<String> = page_texts
        .iter()
        .map(|text| {
            format!(
                "BT /F1 12 Tf 100 700 Td ({}) Tj ET",
                text.replace('\\', "\\\\")
                    .replace('(', "\\(")
                    .replace(')', "\\)")
            )
        })
        .collect();
    let refs: Vec<&str> = streams.iter().map(String::as_str).collect();
    pdf_with_content_streams(&refs)
}

/// A PDF with one page per raw content stream, all sharing a Helvetica `/F1`.
pub fn pdf_with_content_streams(contents: &[&str]) -> Vec<u8> {
    pdf_with_font(
        |_| {
            dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Helvetica",
            }
        },
        contents,
    )
}

/// Like `pdf_with_content_streams`, with `/F1` built by `font` (which may add its own
/// objects, e.g. a `ToUnicode` stream).
pub fn pdf_with_font(font: impl FnOnce(&mut Document) -> Dictionary, contents: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.4");

    let font = font(&mut doc);
    let font_id = doc.add_object(font);
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let pages_id = doc.new_object_id();
    let mut page_ids = Vec::new();
    for content in contents {
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.as_bytes().to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => resources_id,
            "Contents" => content_id,
        });
        page_ids.push(page_id);
    }

    let kids: Vec<Object> = page_ids.iter().map(|&id| id.into()).collect();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_ids.len() as i64,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

pub fn zip_with_entry(name: &str, content: &str) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file(name, zip::write::SimpleFileOptions::default())
        .unwrap();
    writer.write_all(content.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

pub fn docx_from_document_xml(xml: &str) -> Vec<u8> {
    zip_with_entry("word/document.xml", xml)
}

pub fn docx_with_paragraphs(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{p}</w:t></w:r></w:p>"))
        .collect();
    docx_from_document_xml(&format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
    ))
}

// ────────────────────────────────────────────────────────────────────────────
// Domain fixtures
// ────────────────────────────────────────────────────────────────────────────

pub fn sample_result(score: i32) -> ScreeningResult {
    parse_scoring_response(serde_json::json!({
        "score": score,
        "summary": "Strong match",
        "recommendation": "Interview",
        "details": [],
    }))
    .unwrap()
}

pub fn identity() -> Identity {
    Identity {
        user_id: Uuid::new_v4(),
        email: Some("recruiter@example.com".to_string()),
        access_token: "test-token".to_string(),
    }
}

pub fn screening_row(score: i32, recommendation: Option<&str>) -> ScreeningRow {
    ScreeningRow {
        id: Uuid::new_v4(),
        user_id: Uuid::nil(),
        candidate_name: "Jane Doe".to_string(),
        candidate_email: Some("jane@example.com".to_string()),
        position_title: "Senior Engineer".to_string(),
        score,
        recommendation: recommendation.map(str::to_string),
        summary: "Summary".to_string(),
        details: serde_json::json!([]),
        raw_jd: "Senior Engineer".to_string(),
        raw_resume: "Resume".to_string(),
        created_at: Utc::now(),
    }
}

pub fn config() -> Config {
    Config {
        database_url: "postgres://localhost/screener_test".to_string(),
        supabase_url: "http://127.0.0.1:9".to_string(),
        supabase_anon_key: "anon".to_string(),
        scoring_webhook_url: "http://127.0.0.1:9/webhook".to_string(),
        use_mock: true,
        mock_delay_ms: 0,
        max_upload_bytes: 1024 * 1024,
        run_migrations: false,
        port: 0,
        rust_log: "debug".to_string(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Fakes
// ────────────────────────────────────────────────────────────────────────────

/// Analyzer that replays scripted outcomes in order and records every call.
#[derive(Default)]
pub struct ScriptedAnalyzer {
    outcomes: Mutex<VecDeque<Result<ScreeningResult, AppError>>>,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedAnalyzer {
    pub fn new(outcomes: Vec<Result<ScreeningResult, AppError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Analyzer for ScriptedAnalyzer {
    async fn analyze(&self, job_description: &str, resume: &str) -> Result<ScreeningResult, AppError> {
        self.calls
            .lock()
            .unwrap()
            .push((job_description.to_string(), resume.to_string()));
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(sample_result(50)))
    }
}

/// Scorer that returns a fixed webhook body after running it through response validation.
pub struct StaticResponseScorer {
    pub body: serde_json::Value,
    pub providers_seen: Mutex<Vec<String>>,
}

impl StaticResponseScorer {
    pub fn new(body: serde_json::Value) -> Self {
        Self {
            body,
            providers_seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Scorer for StaticResponseScorer {
    async fn score(&self, request: &ScoringRequest<'_>) -> Result<ScreeningResult, AppError> {
        self.providers_seen
            .lock()
            .unwrap()
            .push(request.provider.to_string());
        parse_scoring_response(self.body.clone())
    }
}

/// In-memory screening history. `saved` is notified after every successful save.
#[derive(Default)]
pub struct MemoryScreeningStore {
    pub rows: Mutex<Vec<ScreeningRow>>,
    pub saved: Notify,
    pub fail_saves: bool,
}

impl MemoryScreeningStore {
    pub fn failing() -> Self {
        Self {
            fail_saves: true,
            ..Default::default()
        }
    }

    pub fn insert_row(&self, row: ScreeningRow) {
        self.rows.lock().unwrap().push(row);
    }
}

#[async_trait]
impl ScreeningStore for MemoryScreeningStore {
    async fn save_screening(&self, screening: NewScreening) -> Result<ScreeningRow, AppError> {
        if self.fail_saves {
            self.saved.notify_one();
            return Err(AppError::Internal(anyhow::anyhow!("storage offline")));
        }
        let row = ScreeningRow {
            id: Uuid::new_v4(),
            user_id: screening.user_id,
            candidate_name: screening.candidate_name,
            candidate_email: screening.candidate_email,
            position_title: screening.position_title,
            score: screening.score,
            recommendation: screening.recommendation,
            summary: screening.summary,
            details: screening.details,
            raw_jd: screening.raw_jd,
            raw_resume: screening.raw_resume,
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(row.clone());
        self.saved.notify_one();
        Ok(row)
    }

    async fn list_screenings(
        &self,
        user_id: Uuid,
        query: &ScreeningQuery,
    ) -> Result<Vec<ScreeningRow>, AppError> {
        let wanted = query.status.recommendation().map(|r| r.as_str());
        let mut rows: Vec<ScreeningRow> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id)
            .filter(|r| wanted.is_none() || r.recommendation.as_deref() == wanted)
            .cloned()
            .collect();
        match query.sort_by {
            SortBy::Date => rows.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortBy::Score => rows.sort_by(|a, b| b.score.cmp(&a.score)),
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit.max(0) as usize);
        }
        Ok(rows)
    }

    async fn get_screening(
        &self,
        user_id: Uuid,
        screening_id: Uuid,
    ) -> Result<Option<ScreeningRow>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.user_id == user_id && r.id == screening_id)
            .cloned())
    }
}

#[derive(Default)]
pub struct MemorySettingsStore {
    pub settings: Mutex<Vec<(Uuid, UserSettings)>>,
    pub fail_reads: bool,
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn get_settings(&self, user_id: Uuid) -> Result<Option<UserSettings>, AppError> {
        if self.fail_reads {
            return Err(AppError::Internal(anyhow::anyhow!("settings unavailable")));
        }
        Ok(self
            .settings
            .lock()
            .unwrap()
            .iter()
            .find(|(id, _)| *id == user_id)
            .map(|(_, s)| s.clone()))
    }

    async fn upsert_settings(&self, user_id: Uuid, settings: &UserSettings) -> Result<(), AppError> {
        let mut all = self.settings.lock().unwrap();
        all.retain(|(id, _)| *id != user_id);
        all.push((user_id, settings.clone()));
        Ok(())
    }
}

/// In-memory profiles. Like the database store, the first write for a user also
/// creates their default settings in `settings`.
pub struct MemoryProfileStore {
    pub profiles: Mutex<Vec<Profile>>,
    pub settings: Arc<MemorySettingsStore>,
}

impl MemoryProfileStore {
    pub fn new(settings: Arc<MemorySettingsStore>) -> Self {
        Self {
            profiles: Mutex::new(Vec::new()),
            settings,
        }
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == user_id)
            .cloned())
    }

    async fn upsert_profile(&self, user_id: Uuid, update: ProfileUpdate) -> Result<Profile, AppError> {
        let update = update.normalize()?;
        let profile = Profile {
            id: user_id,
            name: update.name,
            email: update.email,
            avatar_url: update.avatar_url,
            role: update.role.unwrap_or_else(|| DEFAULT_ROLE.to_string()),
        };
        {
            let mut profiles = self.profiles.lock().unwrap();
            profiles.retain(|p| p.id != user_id);
            profiles.push(profile.clone());
        }
        let mut settings = self.settings.settings.lock().unwrap();
        if !settings.iter().any(|(id, _)| *id == user_id) {
            settings.push((user_id, UserSettings::default()));
        }
        Ok(profile)
    }
}

/// Identity provider that accepts exactly one bearer token.
pub struct StaticIdentity {
    pub token: String,
    pub identity: Identity,
}

impl StaticIdentity {
    pub fn new(identity: Identity) -> Self {
        Self {
            token: identity.access_token.clone(),
            identity,
        }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn resolve(&self, access_token: &str) -> Result<Identity, AppError> {
        if access_token == self.token {
            Ok(self.identity.clone())
        } else {
            Err(AppError::Unauthorized)
        }
    }
}

/// Fakes wired into an `AppState`.
pub struct TestApp {
    pub state: AppState,
    pub identity: Identity,
    pub screenings: Arc<MemoryScreeningStore>,
    pub settings: Arc<MemorySettingsStore>,
}

pub fn test_app(scorer: Arc<dyn Scorer>) -> TestApp {
    let config = config();
    let identity = identity();
    let screenings = Arc::new(MemoryScreeningStore::default());
    let settings = Arc::new(MemorySettingsStore::default());

    let state = AppState {
        webhook: WebhookClient::new(config.scoring_webhook_url.clone()),
        config,
        scorer,
        screenings: screenings.clone(),
        settings: settings.clone(),
        profiles: Arc::new(MemoryProfileStore::new(settings.clone())),
        identity: Arc::new(StaticIdentity::new(identity.clone())),
    };
    TestApp {
        state,
        identity,
        screenings,
        settings,
    }
}

pub const MULTIPART_BOUNDARY: &str = "screener-test-boundary";

/// A `multipart/form-data` body. Parts with a file name are sent as file uploads.
pub fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, file_name, content) in parts {
        body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
        match file_name {
            Some(file_name) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}
