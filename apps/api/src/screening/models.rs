//! Screening result types and validation of the scorer's response body.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::AppError;

/// Binary outcome attached to a screening. Parsed case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Recommendation {
    Interview,
    Reject,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Interview => "Interview",
            Recommendation::Reject => "Reject",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Recommendation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "interview" => Ok(Recommendation::Interview),
            "reject" => Ok(Recommendation::Reject),
            other => Err(format!("unknown recommendation '{other}'")),
        }
    }
}

impl<'de> Deserialize<'de> for Recommendation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchStatus {
    Match,
    Partial,
    NoMatch,
    #[serde(other)]
    Unknown,
}

/// One row of the per-criterion breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionDetail {
    pub criteria: String,
    pub status: MatchStatus,
    #[serde(default)]
    pub reason: String,
}

/// The remote scorer's verdict for one resume against one job description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreeningResult {
    #[serde(deserialize_with = "deserialize_score")]
    pub score: i32, // nominally 0 – 100
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<Recommendation>,
    #[serde(default)]
    pub details: Vec<CriterionDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate_email: Option<String>,
}

/// Scores arrive as integers, floats, or numeric strings (`"85"`) depending on the
/// workflow engine. Any finite value is rounded to the nearest integer.
fn deserialize_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawScore {
        Number(f64),
        Text(String),
    }

    let raw = match RawScore::deserialize(deserializer)? {
        RawScore::Number(n) => n,
        RawScore::Text(text) => text.trim().parse::<f64>().map_err(|_| {
            serde::de::Error::custom(format!("score '{text}' is not a number"))
        })?,
    };
    if !raw.is_finite() {
        return Err(serde::de::Error::custom("score must be a finite number"));
    }
    Ok(raw.round().clamp(i32::MIN as f64, i32::MAX as f64) as i32)
}

/// Envelope keys a workflow engine may wrap its output in.
const ENVELOPE_KEYS: &[&str] = &["json", "result"];

/// Unwraps one level of array and one level of `{json}` / `{result}` envelope, then
/// checks that `score` and a non-empty `summary` are present before deserializing.
pub fn parse_scoring_response(body: Value) -> Result<ScreeningResult, AppError> {
    let mut body = match body {
        Value::Array(items) => {
            debug!("Unwrapping array response ({} items)", items.len());
            items.into_iter().next().unwrap_or(Value::Null)
        }
        other => other,
    };

    let envelope = ENVELOPE_KEYS
        .iter()
        .copied()
        .find(|key| body.get(*key).map(Value::is_object).unwrap_or(false));
    if let Some(key) = envelope {
        debug!("Unwrapping '{key}' envelope");
        body = body[key].take();
    }

    let has_score = body.get("score").map(|s| !s.is_null()).unwrap_or(false);
    let has_summary = body
        .get("summary")
        .and_then(Value::as_str)
        .map(|s| !s.is_empty())
        .unwrap_or(false);
    if !has_score || !has_summary {
        warn!(has_score, has_summary, "Invalid analysis result: {body}");
        return Err(AppError::InvalidScreeningResult);
    }

    serde_json::from_value(body).map_err(|e| {
        warn!("Analysis result failed to deserialize: {e}");
        AppError::InvalidScreeningResult
    })
}
