use chrono::{DateTime, Datelike, Utc};

use crate::history::position::UNKNOWN_POSITION;
use crate::history::store::UNKNOWN_CANDIDATE;
use crate::models::screening::ScreeningRow;

const HEADER: [&str; 6] = ["Candidate", "Email", "Position", "Score", "Recommendation", "Date"];

/// Renders screenings as CSV. Every cell is quoted.
pub fn export_csv(rows: &[ScreeningRow]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(HEADER.join(","));

    for row in rows {
        let cells = [
            non_empty_or(&row.candidate_name, UNKNOWN_CANDIDATE),
            non_empty_or(row.candidate_email.as_deref().unwrap_or_default(), "N/A"),
            non_empty_or(&row.position_title, UNKNOWN_POSITION),
            row.score.to_string(),
            row.recommendation.clone().unwrap_or_default(),
            short_date(&row.created_at),
        ];
        let quoted: Vec<String> = cells.iter().map(|cell| quote(cell)).collect();
        lines.push(quoted.join(","));
    }

    lines.join("\n")
}

/// `recruit-ai-screenings-YYYY-MM-DD.csv` for the given export time.
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("recruit-ai-screenings-{}.csv", now.format("%Y-%m-%d"))
}

fn non_empty_or(value: &str, placeholder: &str) -> String {
    if value.trim().is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    }
}

fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

/// `M/D/YYYY`, without zero padding.
fn short_date(timestamp: &DateTime<Utc>) -> String {
    format!("{}/{}/{}", timestamp.month(), timestamp.day(), timestamp.year())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::screening_row;
    use chrono::TimeZone;

    #[test]
    fn test_header_only_for_no_rows() {
        assert_eq!(export_csv(&[]), "Candidate,Email,Position,Score,Recommendation,Date");
    }

    #[test]
    fn test_rows_are_quoted_with_placeholders() {
        let mut row = screening_row(91, Some("Interview"));
        row.candidate_name = "Jane \"JD\" Doe".to_string();
        row.candidate_email = None;
        row.position_title = String::new();
        row.created_at = Utc.with_ymd_and_hms(2026, 3, 7, 18, 0, 0).unwrap();

        let csv = export_csv(&[row]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            r#""Jane ""JD"" Doe","N/A","Unknown Position","91","Interview","3/7/2026""#
        );
    }

    #[test]
    fn test_file_name_uses_iso_date() {
        let now = Utc.with_ymd_and_hms(2026, 10, 4, 1, 2, 3).unwrap();
        assert_eq!(export_file_name(now), "recruit-ai-screenings-2026-10-04.csv");
    }
}
