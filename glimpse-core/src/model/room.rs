use super::ids::UserId;
use serde::{Deserialize, Serialize};

/// Transport mode the room was created with; decides which ICE servers the
/// server hands out per session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoomMode {
    Turn,
    Stun,
    Local,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ShareMode {
    #[default]
    Everyone,
    Selected,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomUser {
    pub id: UserId,
    pub name: String,
    pub streaming: bool,
    /// True on the entry describing the receiving client itself.
    pub you: bool,
    pub owner: bool,
}

/// Room metadata as broadcast by the server on every membership change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomInfo {
    pub id: String,
    #[serde(default)]
    pub share: ShareMode,
    pub mode: RoomMode,
    pub users: Vec<RoomUser>,
}
