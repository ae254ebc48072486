use once_cell::sync::Lazy;
use regex::Regex;
use rustrict::CensorStr;

static PLAIN_WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z]+$").expect("static word pattern")
});

#[derive(Debug)]
pub struct ProfanityFilter;

impl ProfanityFilter {
    pub fn contains_profanity(text: &str) -> bool {
        text.is_inappropriate()
    }

    /// A word is playable when it is plain ASCII letters and would not be
    /// flagged by the content filter.
    pub fn is_playable_word(word: &str) -> bool {
        PLAIN_WORD.is_match(word) && !Self::contains_profanity(word)
    }

    /// Normalises raw candidates from the word service: keeps playable words of
    /// exactly `length` letters, uppercased, without duplicates, in the order
    /// the service returned them.
    pub fn playable_candidates<I, S>(raw: I, length: usize) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut words: Vec<String> = Vec::new();
        for candidate in raw {
            let candidate = candidate.as_ref().trim();
            if candidate.len() != length || !Self::is_playable_word(candidate) {
                continue;
            }
            let upper = candidate.to_ascii_uppercase();
            if !words.contains(&upper) {
                words.push(upper);
            }
        }
        words
    }

    pub fn get_censored_text(text: &str) -> String {
        text.censor()
    }
}
