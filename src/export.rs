//! CSV export of attempt results, one row per result.

use std::borrow::Cow;

use crate::domain::{AttemptResult, Band};

pub const CSV_FILENAME: &str = "ielts-attempts.csv";

const HEADER: &str =
    "Attempt ID,User ID,Test ID,Listening,Reading,Writing,Speaking,Final Band,Submitted At";

/// Quotes a field when it contains a separator, quote or line break.
fn escape(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

fn band_cell(band: Option<Band>) -> String {
    band.map(|b| b.to_string()).unwrap_or_default()
}

/// Absent bands become empty cells. A present zero band is written as `0.0`; raw counts as `0`.
pub fn results_csv(results: &[AttemptResult]) -> String {
    let mut out = String::from(HEADER);
    for r in results {
        let row = [
            escape(&r.attempt_id).into_owned(),
            escape(&r.user_id).into_owned(),
            escape(&r.test_id).into_owned(),
            r.auto_scores.listening.to_string(),
            r.auto_scores.reading.to_string(),
            band_cell(r.manual_scores.writing),
            band_cell(r.manual_scores.speaking),
            band_cell(r.final_band),
            r.submitted_at.to_rfc3339(),
        ];
        out.push('\n');
        out.push_str(&row.join(","));
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Answers, AttemptStatus, AutoScores, ManualScores, WordCounts};
    use chrono::{TimeZone, Utc};

    fn result(user: &str, graded: bool) -> AttemptResult {
        let b = |v: f64| Band::from_score(v).expect("band");
        AttemptResult {
            attempt_id: "attempt-1".into(),
            user_id: user.into(),
            test_id: "demo-1".into(),
            submitted_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap(),
            answers: Answers::default(),
            auto_scores: AutoScores { listening: 0, listening_band: b(1.0), reading: 20, reading_band: b(5.0) },
            manual_scores: if graded {
                ManualScores { writing: Some(b(6.5)), speaking: Some(Band::ZERO) }
            } else {
                ManualScores::default()
            },
            writing_word_counts: WordCounts::default(),
            final_band: graded.then(|| b(3.0)),
            status: if graded { AttemptStatus::Completed } else { AttemptStatus::Processing },
            graded_at: None,
        }
    }

    #[test]
    fn header_only_when_empty() {
        assert_eq!(results_csv(&[]), format!("{HEADER}\n"));
    }

    #[test]
    fn rows_keep_zero_and_blank_missing() {
        let csv = results_csv(&[result("user-1", false), result("user-2", true)]);
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "attempt-1,user-1,demo-1,0,20,,,,2026-03-01T09:30:00+00:00");
        assert_eq!(lines[2], "attempt-1,user-2,demo-1,0,20,6.5,0.0,3.0,2026-03-01T09:30:00+00:00");
    }

    #[test]
    fn fields_with_commas_are_quoted() {
        let csv = results_csv(&[result("Smith, \"Jo\"", false)]);
        assert!(csv.contains(",\"Smith, \"\"Jo\"\"\",demo-1,"));
    }
}
