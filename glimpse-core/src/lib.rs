pub mod codec;
pub mod error;
pub mod model;
pub mod settings;
pub mod state;

pub use error::{EngineError, ProtocolError, Severity};
pub use model::{
    AuthMode, CreateRoom, IceCandidate, IceServer, IncomingMessage, JoinRoom, OutgoingMessage,
    P2pMessage, P2pSession, RoomInfo, RoomMode, RoomRequest, RoomUser, SessionDescription,
    SessionId, ShareMode, UiConfig, UserId,
};
pub use settings::{PreferredCodec, Settings, VideoDisplayMode};
pub use state::{ClientStream, ConnectedRoom, RoomState, SelectedStream, SessionRegistry};
