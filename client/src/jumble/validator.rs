use shared::shared_jumble_game::{extract_word, RoundReport, WordResult, WordSlot};
use tracing::{debug, warn};

use crate::services::Dictionary;

/// Judges every slot of the grid. Incomplete slots score nothing and never
/// reach the dictionary; a failed lookup falls back to comparing with the
/// target word.
pub async fn validate_and_score<D: Dictionary>(
    dictionary: &D,
    grid: &[Option<char>],
    slots: &[WordSlot],
) -> RoundReport {
    let mut per_word = Vec::with_capacity(slots.len());

    for slot in slots {
        let Some(submitted) = extract_word(grid, slot) else {
            debug!("Slot for {} is incomplete", slot.word);
            per_word.push(WordResult::incomplete(&slot.word));
            continue;
        };

        let correct = match dictionary.is_word(&submitted).await {
            Ok(valid) => valid,
            Err(e) => {
                warn!("Dictionary lookup for {} failed: {}, comparing with target", submitted, e);
                submitted.eq_ignore_ascii_case(&slot.word)
            }
        };
        per_word.push(WordResult::judged(&slot.word, submitted, correct));
    }

    RoundReport::from_results(per_word)
}
