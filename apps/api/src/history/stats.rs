use serde::Serialize;

use crate::models::screening::ScreeningRow;
use crate::screening::models::Recommendation;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    pub total_screenings: usize,
    /// Rounded mean score.
    pub avg_score: i64,
    /// Rounded percentage of screenings recommended for interview.
    pub interview_rate: i64,
}

pub fn compute_stats(rows: &[ScreeningRow]) -> HistoryStats {
    if rows.is_empty() {
        return HistoryStats::default();
    }

    let total = rows.len() as f64;
    let score_sum: f64 = rows.iter().map(|r| r.score as f64).sum();
    let interviews = rows
        .iter()
        .filter(|r| r.recommendation.as_deref() == Some(Recommendation::Interview.as_str()))
        .count() as f64;

    HistoryStats {
        total_screenings: rows.len(),
        avg_score: round_half_up(score_sum / total),
        interview_rate: round_half_up(interviews / total * 100.0),
    }
}

fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}
