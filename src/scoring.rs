//! Pure scoring functions: raw-score to band conversion, positional auto-grading,
//! overall band averaging, and writing word counts.
//!
//! Nothing here touches state or logs; the orchestrator in `logic` composes them.

use serde::Serialize;

use crate::domain::{AttemptResult, Band, RichText};

/// Listening and reading papers have 40 questions each.
pub const MAX_RAW_SCORE: u32 = 40;

/// Band (in half points) indexed by raw score 0..=40.
const RAW_TO_HALF_BANDS: [u8; 41] = [
    2, // 0
    4, 4, // 1-2
    5, 5, 5, // 3-5
    6, 6, 6, // 6-8
    7, 7, 7, // 9-11
    8, 8, 8, // 12-14
    9, 9, 9, // 15-17
    10, 10, 10, // 18-20
    11, 11, 11, // 21-23
    12, 12, 12, // 24-26
    13, 13, 13, // 27-29
    14, 14, 14, // 30-32
    15, 15, // 33-34
    16, 16, 16, // 35-37
    17, 17, // 38-39
    18, // 40
];

/// Converts a raw correct-answer count into a band. Anything above 40 maps to 0.
pub fn band_for_raw(raw: u32) -> Band {
    usize::try_from(raw)
        .ok()
        .and_then(|idx| RAW_TO_HALF_BANDS.get(idx))
        .and_then(|half| Band::from_half_points(*half))
        .unwrap_or(Band::ZERO)
}

/// Trimmed, lowercased form of an answer; blank answers count as unanswered.
pub fn normalize_answer(answer: &str) -> Option<String> {
    let trimmed = answer.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Counts positions where the submitted answer equals the key after normalization.
///
/// Positions are compared up to the longer of the two sequences; a position missing on
/// either side never matches, so length mismatches only lower the score.
pub fn auto_grade<A: AsRef<str>, K: AsRef<str>>(submitted: &[Option<A>], key: &[K]) -> u32 {
    let positions = submitted.len().max(key.len());
    let matched = (0..positions)
        .filter(|&idx| {
            let given = submitted
                .get(idx)
                .and_then(Option::as_ref)
                .and_then(|a| normalize_answer(a.as_ref()));
            let expected = key.get(idx).and_then(|k| normalize_answer(k.as_ref()));
            matches!((given, expected), (Some(g), Some(e)) if g == e)
        })
        .count();
    u32::try_from(matched).unwrap_or(u32::MAX)
}

/// The four component bands of an attempt; any of them may still be missing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ComponentBands {
    pub listening: Option<Band>,
    pub reading: Option<Band>,
    pub writing: Option<Band>,
    pub speaking: Option<Band>,
}

impl From<&AttemptResult> for ComponentBands {
    fn from(result: &AttemptResult) -> Self {
        Self {
            listening: Some(result.auto_scores.listening_band),
            reading: Some(result.auto_scores.reading_band),
            writing: result.manual_scores.writing,
            speaking: result.manual_scores.speaking,
        }
    }
}

/// Mean of the four bands rounded to the nearest 0.5 (halves round up).
/// `None` unless every component is present; a band of 0 counts as present.
pub fn overall_band(bands: &ComponentBands) -> Option<Band> {
    let parts = [bands.listening?, bands.reading?, bands.writing?, bands.speaking?];
    let total: u32 = parts.iter().map(|b| u32::from(b.half_points())).sum();
    // round(mean * 2) / 2 in half points: round(total / 4) with .5 going up
    let rounded = (total + 2) / 4;
    u8::try_from(rounded).ok().and_then(Band::from_half_points)
}

/// Drops markup tags and decodes the handful of entities the editor emits.
/// Each tag becomes a space so adjacent paragraphs do not glue words together.
pub fn strip_markup(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => {
                in_tag = true;
                out.push(' ');
            }
            '>' if in_tag => in_tag = false,
            _ if in_tag => {}
            _ => out.push(ch),
        }
    }
    out.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

impl RichText {
    pub fn plain_text(&self) -> String {
        strip_markup(self.as_str())
    }

    pub fn word_count(&self) -> usize {
        self.plain_text().split_whitespace().count()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordCountCheck {
    pub word_count: usize,
    pub valid: bool,
    pub message: String,
}

/// UI feedback only: nothing blocks a submission below the threshold.
pub fn validate_word_count(text: &RichText, min_words: usize) -> WordCountCheck {
    let word_count = text.word_count();
    let valid = word_count >= min_words;
    let message = if valid {
        format!("{word_count} words")
    } else {
        format!("Minimum {min_words} words required. Current: {word_count}")
    };
    WordCountCheck { word_count, valid, message }
}
