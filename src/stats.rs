//! Admin dashboard analytics computed over the result collection.

use std::collections::HashSet;

use serde::Serialize;

use crate::domain::{AttemptResult, AttemptStatus, Band};

/// Final-band ranges shown on the dashboard pie chart, in half points (inclusive).
const BAND_BUCKETS: [(&str, u8, u8); 6] = [
    ("0-4.0", 0, 8),
    ("4.5-5.0", 9, 10),
    ("5.5-6.0", 11, 12),
    ("6.5-7.0", 13, 14),
    ("7.5-8.0", 15, 16),
    ("8.5-9.0", 17, 18),
];

#[derive(Debug, Serialize, PartialEq)]
pub struct BandBucket {
    pub name: &'static str,
    pub value: usize,
}

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct SectionAverages {
    pub listening: f64,
    pub reading: f64,
    pub writing: f64,
    pub speaking: f64,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestAttempts {
    pub test_id: String,
    pub attempts: usize,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub total_attempts: usize,
    pub graded: usize,
    pub pending: usize,
    pub unique_users: usize,
    /// Mean final band of graded attempts, one decimal; 0 when nothing is graded.
    pub average_band: f64,
    pub highest_band: Option<Band>,
    pub lowest_band: Option<Band>,
    pub band_distribution: Vec<BandBucket>,
    pub section_averages: SectionAverages,
    pub attempts_by_test: Vec<TestAttempts>,
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Mean of the present bands, one decimal; 0 when none are present.
fn mean_band(bands: impl Iterator<Item = Option<Band>>) -> f64 {
    let (sum, n) = bands
        .flatten()
        .fold((0.0, 0usize), |(sum, n), b| (sum + b.value(), n + 1));
    if n == 0 {
        0.0
    } else {
        round1(sum / n as f64)
    }
}

pub fn summarize(results: &[AttemptResult]) -> StatsSummary {
    let finals: Vec<Band> = results.iter().filter_map(|r| r.final_band).collect();
    let graded = results
        .iter()
        .filter(|r| r.status == AttemptStatus::Completed)
        .count();
    let unique_users = results
        .iter()
        .map(|r| r.user_id.as_str())
        .collect::<HashSet<_>>()
        .len();

    let band_distribution = BAND_BUCKETS
        .iter()
        .map(|&(name, lo, hi)| BandBucket {
            name,
            value: finals
                .iter()
                .filter(|b| (lo..=hi).contains(&b.half_points()))
                .count(),
        })
        .collect();

    let mut attempts_by_test: Vec<TestAttempts> = Vec::new();
    for r in results {
        match attempts_by_test.iter_mut().find(|t| t.test_id == r.test_id) {
            Some(t) => t.attempts += 1,
            None => attempts_by_test.push(TestAttempts { test_id: r.test_id.clone(), attempts: 1 }),
        }
    }

    StatsSummary {
        total_attempts: results.len(),
        graded,
        pending: results.len() - graded,
        unique_users,
        average_band: mean_band(finals.iter().copied().map(Some)),
        highest_band: finals.iter().copied().max(),
        lowest_band: finals.iter().copied().min(),
        band_distribution,
        section_averages: SectionAverages {
            listening: mean_band(results.iter().map(|r| Some(r.auto_scores.listening_band))),
            reading: mean_band(results.iter().map(|r| Some(r.auto_scores.reading_band))),
            writing: mean_band(results.iter().map(|r| r.manual_scores.writing)),
            speaking: mean_band(results.iter().map(|r| r.manual_scores.speaking)),
        },
        attempts_by_test,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Answers, AutoScores, ManualScores, WordCounts};
    use chrono::Utc;

    fn band(v: f64) -> Band {
        Band::from_score(v).expect("band")
    }

    fn result(user: &str, test: &str, l: f64, r: f64, manual: Option<(f64, f64, f64)>) -> AttemptResult {
        let (manual_scores, final_band, status) = match manual {
            Some((w, s, f)) => (
                ManualScores { writing: Some(band(w)), speaking: Some(band(s)) },
                Some(band(f)),
                AttemptStatus::Completed,
            ),
            None => (ManualScores::default(), None, AttemptStatus::Processing),
        };
        AttemptResult {
            attempt_id: format!("attempt-{user}-{test}"),
            user_id: user.into(),
            test_id: test.into(),
            submitted_at: Utc::now(),
            answers: Answers::default(),
            auto_scores: AutoScores { listening: 0, listening_band: band(l), reading: 0, reading_band: band(r) },
            manual_scores,
            writing_word_counts: WordCounts::default(),
            final_band,
            status,
            graded_at: None,
        }
    }

    #[test]
    fn empty_collection() {
        let s = summarize(&[]);
        assert_eq!(s.total_attempts, 0);
        assert_eq!(s.average_band, 0.0);
        assert_eq!(s.highest_band, None);
        assert!(s.band_distribution.iter().all(|b| b.value == 0));
        assert!(s.attempts_by_test.is_empty());
    }

    #[test]
    fn mixed_results() {
        let results = vec![
            result("u1", "demo-1", 7.0, 5.0, Some((6.5, 7.0, 6.5))),
            result("u2", "demo-1", 8.0, 8.0, Some((7.0, 7.0, 7.5))),
            result("u1", "mock-2", 4.0, 4.5, None),
        ];
        let s = summarize(&results);
        assert_eq!(s.total_attempts, 3);
        assert_eq!(s.graded, 2);
        assert_eq!(s.pending, 1);
        assert_eq!(s.unique_users, 2);
        assert_eq!(s.average_band, 7.0);
        assert_eq!(s.highest_band, Some(band(7.5)));
        assert_eq!(s.lowest_band, Some(band(6.5)));
        let dist: Vec<_> = s.band_distribution.iter().map(|b| b.value).collect();
        assert_eq!(dist, vec![0, 0, 0, 1, 1, 0]);
        assert_eq!(s.section_averages.listening, 6.3);
        assert_eq!(s.section_averages.writing, 6.8);
        assert_eq!(
            s.attempts_by_test,
            vec![
                TestAttempts { test_id: "demo-1".into(), attempts: 2 },
                TestAttempts { test_id: "mock-2".into(), attempts: 1 },
            ]
        );
    }
}
