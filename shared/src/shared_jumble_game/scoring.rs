use serde::{Deserialize, Serialize};

use super::puzzle::WordSlot;

pub fn points_for_length(length: usize) -> u64 {
    match length {
        3 => 100,
        4 => 150,
        5 => 200,
        6 => 250,
        7 => 300,
        other => other as u64 * 100,
    }
}

/// Letters of `slot` read from the grid, or `None` if any of its cells is empty.
pub fn extract_word(grid: &[Option<char>], slot: &WordSlot) -> Option<String> {
    slot.positions
        .iter()
        .map(|&position| grid.get(position).copied().flatten())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WordVerdict {
    Incomplete,
    Correct,
    Incorrect,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordResult {
    pub target: String,
    pub submitted: Option<String>,
    pub verdict: WordVerdict,
    pub points: u64,
}

impl WordResult {
    pub fn incomplete(target: &str) -> Self {
        Self {
            target: target.to_string(),
            submitted: None,
            verdict: WordVerdict::Incomplete,
            points: 0,
        }
    }

    pub fn judged(target: &str, submitted: String, correct: bool) -> Self {
        let points = if correct { points_for_length(submitted.chars().count()) } else { 0 };
        Self {
            target: target.to_string(),
            submitted: Some(submitted),
            verdict: if correct { WordVerdict::Correct } else { WordVerdict::Incorrect },
            points,
        }
    }

    pub fn is_correct(&self) -> bool {
        self.verdict == WordVerdict::Correct
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundOutcome {
    LevelComplete,
    NoWordsCompleted,
    PartialCredit,
}

impl RoundOutcome {
    pub fn classify(results: &[WordResult]) -> Self {
        if !results.is_empty() && results.iter().all(WordResult::is_correct) {
            Self::LevelComplete
        } else if results.iter().all(|r| r.verdict == WordVerdict::Incomplete) {
            Self::NoWordsCompleted
        } else {
            Self::PartialCredit
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundReport {
    pub correct_count: usize,
    pub total_words: usize,
    pub points_earned: u64,
    pub per_word: Vec<WordResult>,
    pub outcome: RoundOutcome,
}

impl RoundReport {
    pub fn from_results(per_word: Vec<WordResult>) -> Self {
        Self {
            correct_count: per_word.iter().filter(|r| r.is_correct()).count(),
            total_words: per_word.len(),
            points_earned: per_word.iter().map(|r| r.points).sum(),
            outcome: RoundOutcome::classify(&per_word),
            per_word,
        }
    }
}
