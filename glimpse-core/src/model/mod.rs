mod config;
mod ids;
mod room;
mod signaling;

pub use config::{AuthMode, ErrorResponse, UiConfig};
pub use ids::{SessionId, UserId};
pub use room::{RoomInfo, RoomMode, RoomUser, ShareMode};
pub use signaling::{
    CreateRoom, IceCandidate, IceServer, IncomingMessage, JoinRoom, OutgoingMessage, P2pMessage,
    P2pSession, RoomRequest, SdpKind, SessionDescription, StringMessage,
};
