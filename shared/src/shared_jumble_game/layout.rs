use serde::{Deserialize, Serialize};

use crate::constants::{LEVEL_TO_REACH_MAX, MAX_ROW_LENGTH, MIN_ROW_LENGTH, SLOW_VARIATION_PERIOD};

/// Row lengths of the three-row puzzle grid for one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleLayout {
    pub rows: [usize; 3],
}

impl PuzzleLayout {
    pub fn total_cells(&self) -> usize {
        self.rows.iter().sum()
    }

    /// Cell index ranges of each row, laid out contiguously.
    pub fn row_ranges(&self) -> [std::ops::Range<usize>; 3] {
        let first = 0..self.rows[0];
        let second = first.end..first.end + self.rows[1];
        let third = second.end..second.end + self.rows[2];
        [first, second, third]
    }
}

/// Computes the grid shape for `level` (levels start at 1; 0 is treated as 1).
///
/// All rows start at a base size that grows linearly from `MIN_ROW_LENGTH` at
/// level 1 to `MAX_ROW_LENGTH` at `LEVEL_TO_REACH_MAX`. Before that level a
/// three-level cycle widens either the middle row or the outer rows. Past it,
/// a slower cycle trims rows back to `MAX_ROW_LENGTH - 1`, alternating on level
/// parity, with every `SLOW_VARIATION_PERIOD`-th level left as a full board.
pub fn layout_for_level(level: u32) -> PuzzleLayout {
    let level = level.max(1);
    let progress = ((level - 1) as f64 / (LEVEL_TO_REACH_MAX - 1) as f64).clamp(0.0, 1.0);
    let base = MIN_ROW_LENGTH + (progress * (MAX_ROW_LENGTH - MIN_ROW_LENGTH) as f64).floor() as usize;

    let mut rows = [base; 3];

    if level < LEVEL_TO_REACH_MAX {
        match level % 3 {
            1 => rows[1] += 1,
            2 => {
                rows[0] += 1;
                rows[2] += 1;
            }
            _ => {}
        }
    } else if level > LEVEL_TO_REACH_MAX {
        let cycle_position = (level - LEVEL_TO_REACH_MAX) % SLOW_VARIATION_PERIOD;
        if cycle_position != 0 {
            if level % 2 == 0 {
                rows[0] = MAX_ROW_LENGTH - 1;
                rows[2] = MAX_ROW_LENGTH - 1;
            } else {
                rows[1] = MAX_ROW_LENGTH - 1;
            }
        }
    }

    for row in rows.iter_mut() {
        *row = (*row).clamp(MIN_ROW_LENGTH, MAX_ROW_LENGTH);
    }

    PuzzleLayout { rows }
}
