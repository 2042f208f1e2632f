use super::ids::{SessionId, UserId};
use super::room::{RoomInfo, RoomMode};
use crate::error::ProtocolError;
use serde::{Deserialize, Serialize};

/// One ICE server entry handed out by the signaling server per session.
/// Opaque to the engine beyond passing it to the connection constructor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IceServer {
    pub urls: Vec<String>,
    #[serde(default)]
    pub credential: String,
    #[serde(default)]
    pub username: String,
}

/// Payload of `hostsession`/`clientsession`: one negotiation instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct P2pSession {
    pub id: SessionId,
    pub peer: UserId,
    pub ice_servers: Vec<IceServer>,
}

/// Session-scoped negotiation payload: ICE candidates, offers, answers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct P2pMessage<T> {
    pub sid: SessionId,
    pub value: T,
}

/// Serialized `RTCIceCandidate`, forwarded verbatim between peers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidate {
    pub candidate: String,
    pub sdp_mid: Option<String>,
    pub sdp_m_line_index: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username_fragment: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SdpKind {
    Offer,
    Answer,
    Pranswer,
    Rollback,
}

/// Serialized `RTCSessionDescription`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub kind: SdpKind,
    pub sdp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StringMessage {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoom {
    pub id: String,
    pub mode: RoomMode,
    pub close_on_owner_leave: bool,
    pub join_if_exist: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JoinRoom {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Every message received over the signaling socket. The envelope on the
/// wire is `{"type": <tag>, "payload": <data>}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum IncomingMessage {
    Room(RoomInfo),
    #[serde(rename = "Error")]
    Error(StringMessage),
    HostSession(P2pSession),
    ClientSession(P2pSession),
    HostIce(P2pMessage<IceCandidate>),
    ClientIce(P2pMessage<IceCandidate>),
    HostOffer(P2pMessage<SessionDescription>),
    EndShare(SessionId),
    ClientAnswer(P2pMessage<SessionDescription>),
}

impl IncomingMessage {
    pub fn parse(frame: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(frame)?)
    }

    /// Classifies the first frame of a connection: only a `room` message
    /// opens the session. Anything else is rejected with its tag, which
    /// the transport reports and closes on.
    pub fn into_first_frame(self) -> Result<RoomInfo, &'static str> {
        match self {
            IncomingMessage::Room(info) => Ok(info),
            other => Err(other.tag()),
        }
    }

    /// Wire tag of this message, for diagnostics.
    pub fn tag(&self) -> &'static str {
        match self {
            IncomingMessage::Room(_) => "room",
            IncomingMessage::Error(_) => "Error",
            IncomingMessage::HostSession(_) => "hostsession",
            IncomingMessage::ClientSession(_) => "clientsession",
            IncomingMessage::HostIce(_) => "hostice",
            IncomingMessage::ClientIce(_) => "clientice",
            IncomingMessage::HostOffer(_) => "hostoffer",
            IncomingMessage::EndShare(_) => "endshare",
            IncomingMessage::ClientAnswer(_) => "clientanswer",
        }
    }
}

/// Every message the engine sends over the signaling socket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum OutgoingMessage {
    Create(CreateRoom),
    Join(JoinRoom),
    Name { username: String },
    HostIce(P2pMessage<IceCandidate>),
    ClientIce(P2pMessage<IceCandidate>),
    HostOffer(P2pMessage<SessionDescription>),
    StopShare {},
    ClientAnswer(P2pMessage<SessionDescription>),
    Share {},
}

impl OutgoingMessage {
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// The two requests a connect call accepts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum RoomRequest {
    Create(CreateRoom),
    Join(JoinRoom),
}

impl RoomRequest {
    pub fn is_join(&self) -> bool {
        matches!(self, RoomRequest::Join(_))
    }

    /// Attaches the locally configured display name before the request goes
    /// out as the first frame on the socket.
    pub fn set_username(&mut self, name: Option<String>) {
        match self {
            RoomRequest::Create(create) => create.username = name,
            RoomRequest::Join(join) => join.username = name,
        }
    }
}

impl From<RoomRequest> for OutgoingMessage {
    fn from(request: RoomRequest) -> Self {
        match request {
            RoomRequest::Create(create) => OutgoingMessage::Create(create),
            RoomRequest::Join(join) => OutgoingMessage::Join(join),
        }
    }
}
