use once_cell::sync::Lazy;
use std::collections::HashMap;

// Local word table used whenever the word service can't supply a full puzzle.
const WORDS_3: &[&str] = &["CAT", "DOG", "SUN", "MAP", "BOX", "CUP", "HAT", "KEY", "PEN", "JAR", "OWL", "ICE"];
const WORDS_4: &[&str] = &["COIN", "GAME", "STAR", "WAVE", "TREE", "MOON", "BELL", "GOLD", "LAMP", "SHIP", "RING", "LEAF"];
const WORDS_5: &[&str] = &["TOKEN", "JEWEL", "PLANT", "CLOUD", "RIVER", "HOUSE", "PRIZE", "SMILE", "BREAD", "CHAIR", "LIGHT", "STONE"];
const WORDS_6: &[&str] = &["WALLET", "PUZZLE", "BRIDGE", "CASTLE", "GARDEN", "ROCKET", "SILVER", "WINTER", "PLANET", "MARKET", "JUNGLE", "BASKET"];
const WORDS_7: &[&str] = &["JOURNEY", "DIAMOND", "CRYSTAL", "VICTORY", "RAINBOW", "BALANCE", "HARVEST", "LANTERN", "MYSTERY", "FREEDOM", "DOLPHIN", "PICTURE"];

static FALLBACK_INDEX: Lazy<HashMap<usize, Vec<&'static str>>> = Lazy::new(|| {
    let mut map: HashMap<usize, Vec<&'static str>> = HashMap::new();
    for table in [WORDS_3, WORDS_4, WORDS_5, WORDS_6, WORDS_7] {
        for &word in table {
            map.entry(word.len()).or_default().push(word);
        }
    }
    map
});

/// Fallback candidates of exactly `length` letters, uppercased.
///
/// Every length in `MIN_ROW_LENGTH..=MAX_ROW_LENGTH` has at least one word.
pub fn fallback_words(length: usize) -> Vec<String> {
    FALLBACK_INDEX
        .get(&length)
        .map(|words| words.iter().map(|w| w.to_string()).collect())
        .unwrap_or_default()
}
