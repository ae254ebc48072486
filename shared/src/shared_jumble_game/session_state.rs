use serde::{Deserialize, Serialize};
use std::fmt;

use super::scoring::RoundOutcome;

/// Lifecycle of one play session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionPhase {
    #[default]
    NotStarted,
    Playing,
    Submitting,
    LevelComplete,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseError {
    pub from: SessionPhase,
    pub action: &'static str,
}

impl fmt::Display for PhaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cannot {} while {:?}", self.action, self.from)
    }
}

impl std::error::Error for PhaseError {}

impl SessionPhase {
    fn reject(self, action: &'static str) -> PhaseError {
        PhaseError { from: self, action }
    }

    /// A fresh game (new or restarted) begins at level 1.
    pub fn start(self) -> Result<Self, PhaseError> {
        match self {
            Self::NotStarted | Self::GameOver => Ok(Self::Playing),
            other => Err(other.reject("start a game")),
        }
    }

    pub fn advance(self) -> Result<Self, PhaseError> {
        match self {
            Self::LevelComplete => Ok(Self::Playing),
            other => Err(other.reject("advance to the next level")),
        }
    }

    pub fn submit(self) -> Result<Self, PhaseError> {
        match self {
            Self::Playing => Ok(Self::Submitting),
            other => Err(other.reject("submit")),
        }
    }

    pub fn settle(self, outcome: RoundOutcome) -> Result<Self, PhaseError> {
        match (self, outcome) {
            (Self::Submitting, RoundOutcome::LevelComplete) => Ok(Self::LevelComplete),
            (Self::Submitting, _) => Ok(Self::GameOver),
            (other, _) => Err(other.reject("settle a round")),
        }
    }

    /// Quit or restart: always allowed.
    pub fn reset(self) -> Self {
        Self::NotStarted
    }

    pub fn accepts_moves(&self) -> bool {
        *self == Self::Playing
    }
}
