use std::fmt;

use shared::shared_jumble_game::{BoardError, PhaseError};

#[derive(Debug)]
pub enum ClientError {
    Http(reqwest::Error),
    Status { status: reqwest::StatusCode, url: String },
    Decode(serde_json::Error),
    Config(String),
    Ad(String),
    Phase(PhaseError),
    Board(BoardError),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "HTTP error: {}", e),
            Self::Status { status, url } => write!(f, "Unexpected status {} from {}", status, url),
            Self::Decode(e) => write!(f, "Failed to decode response: {}", e),
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
            Self::Ad(msg) => write!(f, "Ad error: {}", msg),
            Self::Phase(e) => write!(f, "{}", e),
            Self::Board(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            Self::Decode(e) => Some(e),
            Self::Phase(e) => Some(e),
            Self::Board(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err)
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err)
    }
}

impl From<PhaseError> for ClientError {
    fn from(err: PhaseError) -> Self {
        Self::Phase(err)
    }
}

impl From<BoardError> for ClientError {
    fn from(err: BoardError) -> Self {
        Self::Board(err)
    }
}

impl ClientError {
    /// Rule violations caused by the player rather than a collaborator.
    pub fn is_player_error(&self) -> bool {
        matches!(self, Self::Phase(_) | Self::Board(_))
    }
}
