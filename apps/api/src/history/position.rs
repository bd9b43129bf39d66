use std::sync::LazyLock;

use regex::Regex;

pub const UNKNOWN_POSITION: &str = "Unknown Position";

const MAX_TITLE_CHARS: usize = 100;

static LABELLED_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:position|role|title|job):\s*(.+)").expect("valid position title regex")
});

/// Best-effort position title for a job description.
///
/// A short first line without a colon is taken as the title. Otherwise the first
/// `Position:` / `Role:` / `Title:` / `Job:` label wins.
pub fn extract_position_title(job_description: &str) -> String {
    let first_line = job_description.split('\n').next().unwrap_or_default().trim();
    if !first_line.is_empty()
        && first_line.chars().count() < MAX_TITLE_CHARS
        && !first_line.contains(':')
    {
        return first_line.to_string();
    }

    job_description
        .split('\n')
        .find_map(|line| LABELLED_TITLE.captures(line))
        .map(|caps| caps[1].trim().to_string())
        .unwrap_or_else(|| UNKNOWN_POSITION.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_line_is_title() {
        assert_eq!(
            extract_position_title("  Senior Engineer  \nSQL required"),
            "Senior Engineer"
        );
    }

    #[test]
    fn test_labelled_line_when_first_line_has_colon() {
        let jd = "About us: we build things\nTeam: Platform\nRole: Staff Data Engineer \n";
        // "Team:" does not match the label set; "Role:" does.
        assert_eq!(extract_position_title(jd), "Staff Data Engineer");
    }

    #[test]
    fn test_label_is_case_insensitive() {
        assert_eq!(
            extract_position_title("JOB TITLE: Product Manager"),
            "Product Manager"
        );
    }

    #[test]
    fn test_long_first_line_falls_through() {
        let jd = format!("{}\nPosition: Analyst", "x".repeat(120));
        assert_eq!(extract_position_title(&jd), "Analyst");
    }

    #[test]
    fn test_unknown_position() {
        assert_eq!(extract_position_title(""), UNKNOWN_POSITION);
        assert_eq!(extract_position_title("Summary: none\n\n"), UNKNOWN_POSITION);
    }
}
