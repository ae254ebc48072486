use std::time::Duration;

pub const API_BASE_URL: &str = "http://localhost:3000/api";
pub const WORD_API_BASE_URL: &str = "https://api.datamuse.com";
pub const DICTIONARY_API_BASE_URL: &str = "https://api.datamuse.com";

pub const NETWORK_ERROR: &str = "Network error. Please try again";
pub const AD_ERROR: &str = "Ad could not be shown. Please try again later";
pub const NOT_ENOUGH_GEMS_ERROR: &str = "Not enough gems";

// Row sizing
pub const MIN_ROW_LENGTH: usize = 3;
pub const MAX_ROW_LENGTH: usize = 7;
pub const LEVEL_TO_REACH_MAX: u32 = 10;
pub const SLOW_VARIATION_PERIOD: u32 = 15;
pub const MAX_WORD_CANDIDATES: usize = 20;

// Board setup
pub const PREFILL_PROBABILITY: f64 = 0.6;
pub const MAX_PREFILL_RATIO: f64 = 0.6;
pub const DISTRACTOR_RATIO: f64 = 0.3;

// Round timer
pub const MIN_ROUND_SECS: u32 = 15;
pub const MAX_ROUND_SECS: u32 = 60;
pub const TIMER_EXTENSION_SECS: u32 = 10;

// Economy
pub const FREE_ALLOTMENT: u32 = 3;
pub const RESET_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);
pub const HINT_COST_GEMS: u32 = 5;
pub const SHUFFLE_COST_GEMS: u32 = 3;
pub const TRIAL_COST_GEMS: u32 = 10;
pub const AD_GEM_BONUS: u32 = 3;
