use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::puzzle::Puzzle;
use crate::constants::{DISTRACTOR_RATIO, MAX_PREFILL_RATIO, PREFILL_PROBABILITY};

/// What the player currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Selection {
    #[default]
    Nothing,
    Rack(usize),
    Grid(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    RackIndexOutOfRange(usize),
    GridIndexOutOfRange(usize),
    EmptyRackSlot(usize),
    EmptyGridCell(usize),
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RackIndexOutOfRange(i) => write!(f, "Rack slot {} does not exist", i),
            Self::GridIndexOutOfRange(i) => write!(f, "Grid cell {} does not exist", i),
            Self::EmptyRackSlot(i) => write!(f, "Rack slot {} is empty", i),
            Self::EmptyGridCell(i) => write!(f, "Grid cell {} is empty", i),
        }
    }
}

impl std::error::Error for BoardError {}

/// Result of a single player interaction with the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardAction {
    Selected(Selection),
    Deselected,
    Placed { rack_index: usize, grid_index: usize, letter: char },
    PickedUp(usize),
    Moved { from: usize, to: usize },
    Swapped { from: usize, to: usize },
    Ignored,
}

/// A letter placed by a hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HintPlacement {
    pub grid_index: usize,
    pub letter: char,
    pub rack_index: Option<usize>,
}

/// Mutable puzzle board: the letter grid plus the rack of loose letters.
///
/// Rack slots are never removed; a consumed slot becomes `None` so that rack
/// indices held by the player stay valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub grid: Vec<Option<char>>,
    pub rack: Vec<Option<char>>,
    pub selection: Selection,
}

impl Board {
    /// Seeds a board for `puzzle`: pre-fills part of the grid and builds a
    /// shuffled rack holding every missing letter plus some distractors.
    pub fn setup<R: Rng + ?Sized>(puzzle: &Puzzle, rng: &mut R) -> Self {
        let solution = puzzle.solution_letters();
        let mut grid: Vec<Option<char>> = vec![None; puzzle.total_cells];

        for slot in &puzzle.words {
            for (letter, &position) in slot.word.chars().zip(slot.positions.iter()) {
                if position < grid.len() && rng.gen_bool(PREFILL_PROBABILITY) {
                    grid[position] = Some(letter);
                }
            }
        }

        for slot in &puzzle.words {
            let cells: Vec<usize> = slot
                .positions
                .iter()
                .copied()
                .filter(|&p| p < grid.len())
                .collect();
            if cells.is_empty() {
                continue;
            }

            // Every row gets at least one visible letter.
            if cells.iter().all(|&p| grid[p].is_none()) {
                let valid: Vec<usize> = cells.iter().copied().filter(|&p| solution[p].is_some()).collect();
                let force = rng.gen_range(1..=2).min(valid.len());
                for &p in valid.choose_multiple(rng, force) {
                    grid[p] = solution[p];
                }
            }

            let max_filled = ((cells.len() as f64) * MAX_PREFILL_RATIO).floor() as usize;
            let mut filled: Vec<usize> = cells.iter().copied().filter(|&p| grid[p].is_some()).collect();
            if filled.len() > max_filled {
                filled.shuffle(rng);
                for &p in &filled[..filled.len() - max_filled] {
                    grid[p] = None;
                }
            }
        }

        let mut letters: Vec<char> = Vec::new();
        for (index, cell) in grid.iter().enumerate() {
            if cell.is_some() {
                continue;
            }
            match solution[index] {
                Some(letter) => letters.push(letter),
                None => {
                    log::warn!("No letter mapped to grid cell {}; adding a random one", index);
                    if let Some(letter) = random_puzzle_letter(puzzle, rng) {
                        letters.push(letter);
                    }
                }
            }
        }

        let extra = ((letters.len() as f64) * DISTRACTOR_RATIO).round() as usize;
        for _ in 0..extra {
            if let Some(letter) = random_puzzle_letter(puzzle, rng) {
                letters.push(letter);
            }
        }
        letters.shuffle(rng);

        Self {
            grid,
            rack: letters.into_iter().map(Some).collect(),
            selection: Selection::Nothing,
        }
    }

    pub fn empty_cell_count(&self) -> usize {
        self.grid.iter().filter(|cell| cell.is_none()).count()
    }

    pub fn is_full(&self) -> bool {
        self.grid.iter().all(Option::is_some)
    }

    /// Letters still sitting in the rack, in slot order.
    pub fn rack_letters(&self) -> Vec<char> {
        self.rack.iter().flatten().copied().collect()
    }

    pub fn select_letter_from_rack(&mut self, index: usize) -> Result<BoardAction, BoardError> {
        match self.rack.get(index) {
            None => Err(BoardError::RackIndexOutOfRange(index)),
            Some(None) => Err(BoardError::EmptyRackSlot(index)),
            Some(Some(_)) => {
                if self.selection == Selection::Rack(index) {
                    self.selection = Selection::Nothing;
                    Ok(BoardAction::Deselected)
                } else {
                    self.selection = Selection::Rack(index);
                    Ok(BoardAction::Selected(self.selection))
                }
            }
        }
    }

    /// Handles a tap on a grid cell, depending on what is currently selected:
    /// a rack letter is dropped into an empty cell, a picked-up grid letter is
    /// moved or swapped, and with nothing selected a filled cell is picked up.
    pub fn select_grid_cell(&mut self, index: usize) -> Result<BoardAction, BoardError> {
        let target = *self.grid.get(index).ok_or(BoardError::GridIndexOutOfRange(index))?;

        match self.selection {
            Selection::Rack(rack_index) => {
                if target.is_none() {
                    self.place_letter(rack_index, index)
                } else {
                    self.selection = Selection::Grid(index);
                    Ok(BoardAction::PickedUp(index))
                }
            }
            Selection::Grid(from) if from == index => {
                self.selection = Selection::Nothing;
                Ok(BoardAction::Deselected)
            }
            Selection::Grid(from) => {
                self.grid.swap(from, index);
                self.selection = Selection::Nothing;
                if target.is_none() {
                    Ok(BoardAction::Moved { from, to: index })
                } else {
                    Ok(BoardAction::Swapped { from, to: index })
                }
            }
            Selection::Nothing => {
                if target.is_some() {
                    self.selection = Selection::Grid(index);
                    Ok(BoardAction::PickedUp(index))
                } else {
                    Ok(BoardAction::Ignored)
                }
            }
        }
    }

    /// Moves the rack letter at `letter_index` into `grid_index`, overwriting
    /// whatever the cell held. The rack slot is emptied, not removed.
    pub fn place_letter(&mut self, letter_index: usize, grid_index: usize) -> Result<BoardAction, BoardError> {
        if grid_index >= self.grid.len() {
            return Err(BoardError::GridIndexOutOfRange(grid_index));
        }
        let letter = self
            .rack
            .get(letter_index)
            .ok_or(BoardError::RackIndexOutOfRange(letter_index))?
            .ok_or(BoardError::EmptyRackSlot(letter_index))?;

        self.grid[grid_index] = Some(letter);
        self.rack[letter_index] = None;
        self.selection = Selection::Nothing;

        Ok(BoardAction::Placed {
            rack_index: letter_index,
            grid_index,
            letter,
        })
    }

    /// Takes the letter out of `grid_index` and returns it to the first free
    /// rack slot. Returns the rack index it landed in.
    pub fn return_letter_to_rack(&mut self, grid_index: usize) -> Result<usize, BoardError> {
        let letter = self
            .grid
            .get(grid_index)
            .ok_or(BoardError::GridIndexOutOfRange(grid_index))?
            .ok_or(BoardError::EmptyGridCell(grid_index))?;

        self.grid[grid_index] = None;
        self.selection = Selection::Nothing;

        match self.rack.iter().position(Option::is_none) {
            Some(slot) => {
                self.rack[slot] = Some(letter);
                Ok(slot)
            }
            None => {
                self.rack.push(Some(letter));
                Ok(self.rack.len() - 1)
            }
        }
    }

    /// Fills the first empty cell, scanning word by word, with its correct
    /// letter and spends one matching rack letter if there is one.
    pub fn apply_hint(&mut self, puzzle: &Puzzle) -> Option<HintPlacement> {
        let (grid_index, letter) = puzzle.words.iter().find_map(|slot| {
            slot.word
                .chars()
                .zip(slot.positions.iter())
                .find(|(_, position)| matches!(self.grid.get(**position), Some(None)))
                .map(|(letter, &position)| (position, letter))
        })?;

        self.grid[grid_index] = Some(letter);
        let rack_index = self.rack.iter().position(|slot| *slot == Some(letter));
        if let Some(slot) = rack_index {
            self.rack[slot] = None;
        }
        self.selection = Selection::Nothing;

        Some(HintPlacement {
            grid_index,
            letter,
            rack_index,
        })
    }

    /// Reorders the letters still in the rack. Empty slots keep their place.
    pub fn shuffle_rack<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let occupied: Vec<usize> = self
            .rack
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.map(|_| i))
            .collect();
        let mut letters: Vec<char> = occupied.iter().filter_map(|&i| self.rack[i]).collect();
        letters.shuffle(rng);

        for (slot, letter) in occupied.into_iter().zip(letters) {
            self.rack[slot] = Some(letter);
        }
        self.selection = Selection::Nothing;
    }
}

fn random_puzzle_letter<R: Rng + ?Sized>(puzzle: &Puzzle, rng: &mut R) -> Option<char> {
    let slot = puzzle.words.choose(rng)?;
    let letters: Vec<char> = slot.word.chars().collect();
    letters.choose(rng).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared_jumble_game::puzzle::{fallback_puzzle, WordOrigin, WordSlot};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn sample_puzzle() -> Puzzle {
        Puzzle {
            level: 1,
            words: vec![
                WordSlot { word: "CAT".into(), positions: vec![0, 1, 2] },
                WordSlot { word: "GOLD".into(), positions: vec![3, 4, 5, 6] },
                WordSlot { word: "OWL".into(), positions: vec![7, 8, 9] },
            ],
            grid_sizes: [3, 4, 3],
            total_cells: 10,
            origin: WordOrigin::Fallback,
        }
    }

    fn counts(letters: impl IntoIterator<Item = char>) -> HashMap<char, usize> {
        let mut map = HashMap::new();
        for letter in letters {
            *map.entry(letter).or_insert(0) += 1;
        }
        map
    }

    #[test]
    fn test_rack_holds_every_missing_letter() {
        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            let puzzle = fallback_puzzle((seed % 30 + 1) as u32, &mut rng);
            let board = Board::setup(&puzzle, &mut rng);
            let solution = puzzle.solution_letters();

            let needed = counts(
                board
                    .grid
                    .iter()
                    .enumerate()
                    .filter(|(_, cell)| cell.is_none())
                    .filter_map(|(i, _)| solution[i]),
            );
            let available = counts(board.rack_letters());
            for (letter, count) in needed {
                assert!(
                    available.get(&letter).copied().unwrap_or(0) >= count,
                    "seed {} missing {}",
                    seed,
                    letter
                );
            }
        }
    }

    #[test]
    fn test_setup_keeps_rows_partially_filled() {
        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            let puzzle = fallback_puzzle((seed % 20 + 1) as u32, &mut rng);
            let board = Board::setup(&puzzle, &mut rng);
            for slot in &puzzle.words {
                let filled = slot.positions.iter().filter(|&&p| board.grid[p].is_some()).count();
                let cap = ((slot.positions.len() as f64) * MAX_PREFILL_RATIO).floor() as usize;
                assert!(filled >= 1, "seed {} row {} empty", seed, slot.word);
                assert!(filled <= cap, "seed {} row {} over-filled", seed, slot.word);
            }
            // Pre-filled letters are always the correct ones.
            let solution = puzzle.solution_letters();
            for (i, cell) in board.grid.iter().enumerate() {
                if let Some(letter) = cell {
                    assert_eq!(Some(*letter), solution[i]);
                }
            }
        }
    }

    #[test]
    fn test_rack_then_empty_cell_places_letter() {
        let mut board = Board {
            grid: vec![Some('C'), None, Some('T')],
            rack: vec![Some('X'), Some('A')],
            selection: Selection::Nothing,
        };
        board.select_letter_from_rack(1).unwrap();
        let action = board.select_grid_cell(1).unwrap();
        assert_eq!(action, BoardAction::Placed { rack_index: 1, grid_index: 1, letter: 'A' });
        assert_eq!(board.grid, vec![Some('C'), Some('A'), Some('T')]);
        assert_eq!(board.rack, vec![Some('X'), None]);
        assert_eq!(board.selection, Selection::Nothing);
    }

    #[test]
    fn test_rack_selection_then_filled_cell_picks_it_up() {
        let mut board = Board {
            grid: vec![Some('C'), None, Some('T')],
            rack: vec![Some('A')],
            selection: Selection::Nothing,
        };
        board.select_letter_from_rack(0).unwrap();
        assert_eq!(board.select_grid_cell(2).unwrap(), BoardAction::PickedUp(2));
        assert_eq!(board.selection, Selection::Grid(2));
        assert_eq!(board.grid, vec![Some('C'), None, Some('T')]);
        assert_eq!(board.rack, vec![Some('A')]);

        assert_eq!(board.select_grid_cell(1).unwrap(), BoardAction::Moved { from: 2, to: 1 });
        assert_eq!(board.grid, vec![Some('C'), Some('T'), None]);
        assert_eq!(board.rack, vec![Some('A')]);
    }

    #[test]
    fn test_grid_pick_up_and_swap() {
        let mut board = Board {
            grid: vec![Some('T'), Some('A'), Some('C')],
            rack: vec![],
            selection: Selection::Nothing,
        };
        assert_eq!(board.select_grid_cell(0).unwrap(), BoardAction::PickedUp(0));
        assert_eq!(board.grid, vec![Some('T'), Some('A'), Some('C')]);
        assert_eq!(board.select_grid_cell(2).unwrap(), BoardAction::Swapped { from: 0, to: 2 });
        assert_eq!(board.grid, vec![Some('C'), Some('A'), Some('T')]);
        assert_eq!(board.selection, Selection::Nothing);
    }

    #[test]
    fn test_grid_move_into_empty_cell() {
        let mut board = Board {
            grid: vec![Some('A'), None],
            rack: vec![],
            selection: Selection::Nothing,
        };
        board.select_grid_cell(0).unwrap();
        assert_eq!(board.select_grid_cell(1).unwrap(), BoardAction::Moved { from: 0, to: 1 });
        assert_eq!(board.grid, vec![None, Some('A')]);
    }

    #[test]
    fn test_invalid_indices_are_errors() {
        let mut board = Board {
            grid: vec![None],
            rack: vec![None],
            selection: Selection::Nothing,
        };
        assert_eq!(board.select_letter_from_rack(0), Err(BoardError::EmptyRackSlot(0)));
        assert_eq!(board.select_letter_from_rack(4), Err(BoardError::RackIndexOutOfRange(4)));
        assert_eq!(board.select_grid_cell(9), Err(BoardError::GridIndexOutOfRange(9)));
        assert_eq!(board.select_grid_cell(0), Ok(BoardAction::Ignored));
        assert_eq!(board.return_letter_to_rack(0), Err(BoardError::EmptyGridCell(0)));
    }

    #[test]
    fn test_return_letter_reuses_empty_slot() {
        let mut board = Board {
            grid: vec![Some('Q'), None],
            rack: vec![Some('A'), None],
            selection: Selection::Nothing,
        };
        assert_eq!(board.return_letter_to_rack(0), Ok(1));
        assert_eq!(board.rack, vec![Some('A'), Some('Q')]);
        assert_eq!(board.grid, vec![None, None]);
    }

    #[test]
    fn test_hint_fills_first_gap_and_spends_rack_letter() {
        let puzzle = sample_puzzle();
        let mut board = Board {
            grid: vec![
                Some('C'), Some('A'), Some('T'),
                Some('G'), None, Some('L'), None,
                None, Some('W'), None,
            ],
            rack: vec![Some('D'), Some('O'), Some('O'), Some('L')],
            selection: Selection::Rack(0),
        };
        let hint = board.apply_hint(&puzzle).unwrap();
        assert_eq!(hint, HintPlacement { grid_index: 4, letter: 'O', rack_index: Some(1) });
        assert_eq!(board.grid[4], Some('O'));
        assert_eq!(board.rack, vec![Some('D'), None, Some('O'), Some('L')]);
        assert_eq!(board.selection, Selection::Nothing);
    }

    #[test]
    fn test_hint_on_full_board_does_nothing() {
        let puzzle = sample_puzzle();
        let mut board = Board {
            grid: "CATGOLDOWL".chars().map(Some).collect(),
            rack: vec![Some('Z')],
            selection: Selection::Nothing,
        };
        assert!(board.apply_hint(&puzzle).is_none());
        assert_eq!(board.rack, vec![Some('Z')]);
    }

    #[test]
    fn test_shuffle_keeps_empty_slots_fixed() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut board = Board {
            grid: vec![],
            rack: vec![Some('A'), None, Some('B'), Some('C'), None, Some('D')],
            selection: Selection::Nothing,
        };
        board.shuffle_rack(&mut rng);
        assert_eq!(board.rack[1], None);
        assert_eq!(board.rack[4], None);
        let mut letters = board.rack_letters();
        letters.sort();
        assert_eq!(letters, vec!['A', 'B', 'C', 'D']);
    }
}
