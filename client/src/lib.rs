pub mod clock;
pub mod config;
pub mod display;
pub mod error;
pub mod jumble;
pub mod logging;
pub mod services;

pub use config::ClientConfig;
pub use error::ClientError;
pub use jumble::JumbleSession;
