use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::fallback_words::fallback_words;
use super::layout::{layout_for_level, PuzzleLayout};

/// A target word and the grid cells it occupies, in reading order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordSlot {
    pub word: String,
    pub positions: Vec<usize>,
}

/// Where the words of a puzzle came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WordOrigin {
    Remote,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Puzzle {
    pub level: u32,
    pub words: Vec<WordSlot>,
    pub grid_sizes: [usize; 3],
    pub total_cells: usize,
    pub origin: WordOrigin,
}

impl Puzzle {
    pub fn layout(&self) -> PuzzleLayout {
        PuzzleLayout { rows: self.grid_sizes }
    }

    /// Letter expected at each cell, indexed by cell. `None` marks a cell no
    /// slot covers.
    pub fn solution_letters(&self) -> Vec<Option<char>> {
        let mut letters = vec![None; self.total_cells];
        for slot in &self.words {
            for (letter, &position) in slot.word.chars().zip(slot.positions.iter()) {
                if let Some(cell) = letters.get_mut(position) {
                    *cell = Some(letter);
                }
            }
        }
        letters
    }

    /// True when the slots cover every cell exactly once.
    pub fn covers_grid(&self) -> bool {
        let mut seen = HashSet::new();
        for slot in &self.words {
            if slot.word.chars().count() != slot.positions.len() {
                return false;
            }
            for &position in &slot.positions {
                if position >= self.total_cells || !seen.insert(position) {
                    return false;
                }
            }
        }
        seen.len() == self.total_cells
    }
}

/// Builds a puzzle from per-row candidate lists.
///
/// Returns `None` when a row has no candidate of the row's exact length; the
/// caller is expected to fall back to [`fallback_puzzle`].
pub fn assemble_puzzle<R: Rng + ?Sized>(
    level: u32,
    layout: PuzzleLayout,
    candidates: &[Vec<String>; 3],
    origin: WordOrigin,
    rng: &mut R,
) -> Option<Puzzle> {
    let mut chosen: Vec<String> = Vec::with_capacity(3);

    for (row, &length) in layout.rows.iter().enumerate() {
        let matching: Vec<&String> = candidates[row]
            .iter()
            .filter(|word| word.chars().count() == length)
            .collect();
        if matching.is_empty() {
            return None;
        }

        let fresh: Vec<&String> = matching
            .iter()
            .copied()
            .filter(|word| !chosen.iter().any(|taken| taken.eq_ignore_ascii_case(word)))
            .collect();
        // Repeat a word only when the row offers nothing else.
        let pool = if fresh.is_empty() { &matching } else { &fresh };
        let word = pool.choose(rng)?;
        chosen.push(word.to_ascii_uppercase());
    }

    let words = layout
        .row_ranges()
        .into_iter()
        .zip(chosen)
        .map(|(range, word)| WordSlot {
            word,
            positions: range.collect(),
        })
        .collect();

    let puzzle = Puzzle {
        level,
        words,
        grid_sizes: layout.rows,
        total_cells: layout.total_cells(),
        origin,
    };

    if !puzzle.covers_grid() {
        log::warn!(
            "Puzzle for level {} does not cover its {} cells exactly",
            level,
            puzzle.total_cells
        );
    }

    Some(puzzle)
}

/// Puzzle built purely from the local word table. Never fails.
pub fn fallback_puzzle<R: Rng + ?Sized>(level: u32, rng: &mut R) -> Puzzle {
    let layout = layout_for_level(level);
    let candidates = [
        fallback_words(layout.rows[0]),
        fallback_words(layout.rows[1]),
        fallback_words(layout.rows[2]),
    ];

    match assemble_puzzle(level, layout, &candidates, WordOrigin::Fallback, rng) {
        Some(puzzle) => puzzle,
        None => {
            // Layout rows are always clamped to lengths the table covers, so
            // this only runs if the table itself is broken.
            log::error!("Fallback table is missing words for layout {:?}", layout.rows);
            let words = layout
                .row_ranges()
                .into_iter()
                .map(|range| WordSlot {
                    word: "A".repeat(range.len()),
                    positions: range.collect(),
                })
                .collect();
            Puzzle {
                level,
                words,
                grid_sizes: layout.rows,
                total_cells: layout.total_cells(),
                origin: WordOrigin::Fallback,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_fallback_puzzle_covers_grid_for_all_levels() {
        let mut rng = StdRng::seed_from_u64(7);
        for level in 1..=60 {
            let puzzle = fallback_puzzle(level, &mut rng);
            assert!(puzzle.covers_grid(), "level {} does not cover grid", level);
            assert_eq!(puzzle.total_cells, puzzle.grid_sizes.iter().sum::<usize>());
            assert_eq!(puzzle.words.len(), 3);
            assert_eq!(puzzle.origin, WordOrigin::Fallback);
        }
    }

    #[test]
    fn test_level_one_fallback_uses_short_rows() {
        let mut rng = StdRng::seed_from_u64(1);
        let puzzle = fallback_puzzle(1, &mut rng);
        assert!(puzzle.grid_sizes.iter().all(|&len| len == 3 || len == 4));
        assert_eq!(puzzle.total_cells, 10);
        assert_eq!(puzzle.words[1].positions, vec![3, 4, 5, 6]);
    }

    #[test]
    fn test_assemble_rejects_row_without_matching_length() {
        let mut rng = StdRng::seed_from_u64(3);
        let candidates = [
            vec!["CAT".to_string()],
            vec!["DOG".to_string()],
            vec!["OWL".to_string()],
        ];
        let layout = PuzzleLayout { rows: [3, 4, 3] };
        assert!(assemble_puzzle(1, layout, &candidates, WordOrigin::Remote, &mut rng).is_none());
    }

    #[test]
    fn test_assemble_avoids_repeats_when_possible() {
        let mut rng = StdRng::seed_from_u64(11);
        let shared = vec!["CAT".to_string(), "DOG".to_string(), "OWL".to_string()];
        let candidates = [shared.clone(), shared.clone(), shared];
        let layout = PuzzleLayout { rows: [3, 3, 3] };
        let puzzle = assemble_puzzle(4, layout, &candidates, WordOrigin::Remote, &mut rng).unwrap();
        let words: HashSet<_> = puzzle.words.iter().map(|slot| slot.word.clone()).collect();
        assert_eq!(words.len(), 3);
    }

    #[test]
    fn test_assemble_repeats_when_only_one_word() {
        let mut rng = StdRng::seed_from_u64(5);
        let candidates = [
            vec!["CAT".to_string()],
            vec!["CAT".to_string()],
            vec!["CAT".to_string()],
        ];
        let layout = PuzzleLayout { rows: [3, 3, 3] };
        let puzzle = assemble_puzzle(4, layout, &candidates, WordOrigin::Remote, &mut rng).unwrap();
        assert!(puzzle.words.iter().all(|slot| slot.word == "CAT"));
        assert!(puzzle.covers_grid());
    }

    #[test]
    fn test_solution_letters_follow_positions() {
        let puzzle = Puzzle {
            level: 1,
            words: vec![
                WordSlot { word: "CAT".into(), positions: vec![0, 1, 2] },
                WordSlot { word: "GOLD".into(), positions: vec![3, 4, 5, 6] },
                WordSlot { word: "OWL".into(), positions: vec![7, 8, 9] },
            ],
            grid_sizes: [3, 4, 3],
            total_cells: 10,
            origin: WordOrigin::Fallback,
        };
        let letters: String = puzzle.solution_letters().into_iter().flatten().collect();
        assert_eq!(letters, "CATGOLDOWL");
    }
}
