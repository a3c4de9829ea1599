//! Built-in demo content so the service is usable without any config file.

use crate::catalog::TestEntry;
use crate::domain::AnswerKey;

pub const DEMO_TEST_ID: &str = "demo-1";

const DEMO_LISTENING: [&str; 40] = [
  // Part 1: form completion
  "Hendricks", "27", "Station Road", "BN4 7JS", "Tuesday",
  "bicycle", "45", "library", "towel", "cash",
  // Part 2: multiple choice + map labelling
  "B", "C", "A", "C", "B",
  "F", "D", "G", "A", "E",
  // Part 3: matching
  "C", "A", "B", "B", "C",
  "E", "G", "B", "D", "F",
  // Part 4: note completion
  "coral", "temperature", "oxygen", "fishing", "pollution",
  "satellite", "volunteers", "algae", "tourism", "funding",
];

const DEMO_READING: [&str; 40] = [
  // Passage 1
  "TRUE", "FALSE", "NOT GIVEN", "TRUE", "FALSE",
  "NOT GIVEN", "iron", "canals", "merchants", "steam",
  "1784", "Manchester", "cotton",
  // Passage 2
  "iv", "vii", "i", "ix", "iii",
  "vi", "B", "D", "A", "C",
  "E", "memory", "sleep",
  // Passage 3
  "YES", "NO", "NOT GIVEN", "NO", "YES",
  "C", "A", "D", "B", "habitat",
  "migration", "predators", "genes", "A",
];

/// The demo test served by the front end's test list (`demo-1`).
pub fn demo_test() -> TestEntry {
  TestEntry::new(
    DEMO_TEST_ID,
    "IELTS Academic Mock Test 1",
    "Full IELTS Computer-Delivered Mock Test with all four sections",
    165,
    AnswerKey {
      listening: DEMO_LISTENING.iter().map(|s| s.to_string()).collect(),
      reading: DEMO_READING.iter().map(|s| s.to_string()).collect(),
    },
  )
}
