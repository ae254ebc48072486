use futures::future::join_all;
use rand::Rng;
use shared::profanity::ProfanityFilter;
use shared::shared_jumble_game::{assemble_puzzle, fallback_puzzle, layout_for_level, Puzzle, WordOrigin};
use tracing::{info, warn};

use crate::services::WordSource;

/// Builds the puzzle for `level`. Candidates for the three rows are fetched
/// concurrently; any failed fetch or empty row switches the whole puzzle to
/// the local word table. Never fails.
pub async fn generate_puzzle<W, R>(words: &W, level: u32, rng: &mut R) -> Puzzle
where
    W: WordSource,
    R: Rng + ?Sized,
{
    let layout = layout_for_level(level);
    let fetches = layout.rows.iter().map(|&length| words.candidates(length));
    let results = join_all(fetches).await;

    let mut candidates: [Vec<String>; 3] = Default::default();
    for (row, (result, &length)) in results.into_iter().zip(layout.rows.iter()).enumerate() {
        match result {
            Ok(raw) => {
                let playable = ProfanityFilter::playable_candidates(raw, length);
                if playable.is_empty() {
                    warn!("No usable {}-letter words for row {}, using local words", length, row + 1);
                    return fallback_puzzle(level, rng);
                }
                candidates[row] = playable;
            }
            Err(e) => {
                warn!("Word fetch for row {} failed: {}, using local words", row + 1, e);
                return fallback_puzzle(level, rng);
            }
        }
    }

    match assemble_puzzle(level, layout, &candidates, WordOrigin::Remote, rng) {
        Some(puzzle) => {
            info!("🧩 Level {} puzzle ready with rows {:?}", level, puzzle.grid_sizes);
            puzzle
        }
        None => fallback_puzzle(level, rng),
    }
}
