pub mod constants;
pub mod profanity;
pub mod shared_jumble_game;
