use super::room::RoomMode;
use serde::{Deserialize, Serialize};

/// Authentication requirement the server was started with.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    None,
    Turn,
    All,
}

impl AuthMode {
    /// Default room mode the UI should offer for this auth mode.
    /// Anonymous users on a turn-gated server only get STUN.
    pub fn room_mode(self, logged_in: bool) -> RoomMode {
        if logged_in {
            return RoomMode::Turn;
        }
        match self {
            AuthMode::Turn => RoomMode::Stun,
            AuthMode::All | AuthMode::None => RoomMode::Turn,
        }
    }
}

/// Response contract of `GET config`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiConfig {
    pub auth_mode: AuthMode,
    pub user: String,
    pub logged_in: bool,
    pub version: String,
}

/// Error body returned by `POST login` on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}
