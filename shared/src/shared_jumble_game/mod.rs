//! Rules of the Jumble-Jester puzzle game, free of any I/O.
//!
//! The session controller in the client drives these types; everything here
//! is deterministic given the injected random source and clock values.

pub mod board;
pub mod countdown;
pub mod economy;
pub mod fallback_words;
pub mod layout;
pub mod puzzle;
pub mod scoring;
pub mod session_state;
pub mod user_record;

pub use board::{Board, BoardAction, BoardError, HintPlacement, Selection};
pub use countdown::{round_duration_secs, Countdown, CountdownState, TickOutcome};
pub use economy::{
    purchase, CooldownStatus, Consumption, PurchaseOutcome, RefreshOutcome, ResourceCounter, ResourceKind, Wallet,
};
pub use layout::{layout_for_level, PuzzleLayout};
pub use puzzle::{assemble_puzzle, fallback_puzzle, Puzzle, WordOrigin, WordSlot};
pub use scoring::{extract_word, points_for_length, RoundOutcome, RoundReport, WordResult, WordVerdict};
pub use session_state::{PhaseError, SessionPhase};
pub use user_record::{NewUser, UserExistsResponse, UserField, UserRecord, UserUpdate};
